//! Command execution capability and a recording mock.
//!
//! The reconciler never spawns processes itself. It hands argument vectors
//! to a `CommandRunner`, which the host binary backs with real processes and
//! tests back with `MockRunner`.

use std::sync::{Mutex, PoisonError};

use crate::error::CommandError;

/// Runs external commands synchronously.
pub trait CommandRunner {
    /// Run `argv` to completion and return its combined output.
    ///
    /// `argv[0]` is the program. Implementations may panic on an empty
    /// vector: every caller builds argv through `Command`, so an empty one
    /// is a bug rather than a runtime condition.
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError> {
        (**self).run(argv)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError> {
        (**self).run(argv)
    }
}

/// Mock runner for testing and development.
///
/// Records every argv it is given and fails the ones it was told to.
#[derive(Debug, Default)]
pub struct MockRunner {
    calls: Mutex<Vec<Vec<String>>>,

    /// Exact command lines (space-joined) that should fail.
    failing: Vec<String>,

    /// Whether every command should fail.
    fail_all: bool,
}

impl MockRunner {
    /// Create a mock runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock runner that fails every command.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Fail the command whose space-joined argv equals `command_line`.
    pub fn fail_on(mut self, command_line: &str) -> Self {
        self.failing.push(command_line.to_string());
        self
    }

    /// Every argv seen so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock().clone()
    }

    /// Every command seen so far as a space-joined line.
    pub fn command_lines(&self) -> Vec<String> {
        self.lock().iter().map(|argv| argv.join(" ")).collect()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<String>>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, argv: &[String]) -> Result<Vec<u8>, CommandError> {
        if argv.is_empty() {
            panic!("MockRunner::run({:?}) invalid; need argv[0]", argv);
        }

        self.lock().push(argv.to_vec());

        let line = argv.join(" ");
        if self.fail_all || self.failing.contains(&line) {
            return Err(CommandError::Failed {
                argv: argv.to_vec(),
                code: Some(1),
                output: format!("{}: mock failure\n", argv[0]).into_bytes(),
            });
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split(' ').map(String::from).collect()
    }

    #[test]
    fn test_records_calls() {
        let runner = MockRunner::new();
        runner.run(&argv("ifconfig tun0 up")).unwrap();
        runner.run(&argv("ifconfig tun0 down")).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec!["ifconfig tun0 up", "ifconfig tun0 down"]
        );

        runner.clear();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_fail_on_exact_line() {
        let runner = MockRunner::new().fail_on("ifconfig tun0 up");

        let err = runner.run(&argv("ifconfig tun0 up")).unwrap_err();
        assert_eq!(err.argv(), argv("ifconfig tun0 up").as_slice());
        assert!(runner.run(&argv("ifconfig tun0 down")).is_ok());

        // Failed commands are still recorded.
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_failing_fails_everything() {
        let runner = MockRunner::failing();
        assert!(runner.run(&argv("route -q -n add")).is_err());
    }

    #[test]
    #[should_panic(expected = "need argv[0]")]
    fn test_empty_argv_panics() {
        let _ = MockRunner::new().run(&[]);
    }

    #[test]
    fn test_runner_through_reference() {
        let runner = MockRunner::new();
        let by_ref: &dyn CommandRunner = &runner;
        by_ref.run(&argv("ifconfig tun0 up")).unwrap();
        assert_eq!(runner.calls().len(), 1);
    }
}
