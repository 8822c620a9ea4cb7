//! Command runners backed by the host.

use std::process::Command;

use ifroute_reconcile::{CommandError, CommandRunner};
use tracing::info;

/// Runs commands as child processes and waits for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError> {
        let Some((program, args)) = argv.split_first() else {
            panic!("command {:?} invalid; need argv[0]", argv);
        };

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                argv: argv.to_vec(),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if !output.status.success() {
            return Err(CommandError::Failed {
                argv: argv.to_vec(),
                code: output.status.code(),
                output: combined,
            });
        }

        Ok(combined)
    }
}

/// Logs commands instead of running them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError> {
        if argv.is_empty() {
            panic!("command {:?} invalid; need argv[0]", argv);
        }

        info!(command = %argv.join(" "), "[DRY RUN] would run");
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_combines_output() {
        let out = SystemRunner
            .run(&argv(&["sh", "-c", "echo out; echo err >&2"]))
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out), "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_non_zero_exit() {
        let err = SystemRunner
            .run(&argv(&["sh", "-c", "echo nope >&2; exit 3"]))
            .unwrap_err();
        match err {
            CommandError::Failed { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(output, b"nope\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run(&argv(&["/nonexistent/ifroute-test-binary"]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    #[should_panic(expected = "need argv[0]")]
    fn test_system_runner_empty_argv_panics() {
        let _ = SystemRunner.run(&[]);
    }

    #[test]
    fn test_dry_run_succeeds() {
        assert!(DryRunRunner.run(&argv(&["ifconfig", "tun0", "up"])).unwrap().is_empty());
    }
}
