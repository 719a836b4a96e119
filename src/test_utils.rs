//! Shared test utilities for the provisioner crate.

use crate::error::Result;
use crate::runner::CommandRunner;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    output_with_code(0)
}

/// Creates a command `Output` carrying the given exit code.
#[must_use]
pub fn output_with_code(code: i32) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "msiexec").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of `CommandRunner` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubRunner {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubRunner {
    /// Creates a new `StubRunner` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandRunner for StubRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.cmd, cmd);
        assert_eq!(call.args.as_slice(), args);
        call.result
    }
}

/// A command runner that records every invocation verbatim.
///
/// Unlike [`StubRunner`] it asserts nothing up front, so tests whose command
/// lines contain paths not known until runtime (temporary reference
/// directories, tempdir destinations) can inspect the recording afterwards.
/// Each invocation consumes the next queued output; when the queue is empty
/// a zero exit code is returned.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<(String, Vec<String>)>>,
    outputs: RefCell<VecDeque<Output>>,
}

impl RecordingRunner {
    /// Creates a recorder that reports success for every invocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that replays the given outputs in order.
    #[must_use]
    pub fn with_outputs(outputs: Vec<Output>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            outputs: RefCell::new(outputs.into()),
        }
    }

    /// Returns the recorded invocations as `(command, arguments)` pairs.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.calls.borrow_mut().push((
            cmd.to_owned(),
            args.iter().map(|a| (*a).to_owned()).collect(),
        ));
        let output = self
            .outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(success_output);
        Ok(output)
    }
}
