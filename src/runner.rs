//! Native command execution with exit-code classification.
//!
//! All external executables the provisioner needs (archive extraction,
//! directory mirroring, package installation) run through this module.
//! Success is decided by a caller-supplied predicate over the exit code so
//! that utilities with unconventional conventions (robocopy's 0..=7 success
//! family, taskkill's not-running code) can be classified correctly.

use crate::error::{ProvisionError, Result};
use std::process::{Command, Output};

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command.
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        Command::new(cmd)
            .args(args)
            .output()
            .map_err(ProvisionError::from)
    }
}

/// A pure predicate over a command's exit code.
///
/// The description is carried into [`ProvisionError::CommandFailed`] so a
/// rejected code reports what was expected alongside what was observed.
#[derive(Debug, Clone, Copy)]
pub struct ExitCheck {
    /// Human-readable description of the acceptance criterion.
    pub description: &'static str,
    /// Returns `true` when the exit code counts as success.
    pub accepts: fn(i32) -> bool,
}

fn exit_zero(code: i32) -> bool {
    code == 0
}

fn below_eight(code: i32) -> bool {
    code < 8
}

impl ExitCheck {
    /// The default predicate: exit code equals zero.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            description: "exit code 0",
            accepts: exit_zero,
        }
    }

    /// The robocopy success family: exit codes 0 through 7 indicate that
    /// mirroring completed, possibly with files copied or extras removed.
    #[must_use]
    pub const fn below_eight() -> Self {
        Self {
            description: "exit code below 8",
            accepts: below_eight,
        }
    }
}

impl Default for ExitCheck {
    fn default() -> Self {
        Self::success()
    }
}

/// Runs a command and classifies its exit code with the given predicate.
///
/// The exit code is captured immediately from the returned [`Output`];
/// nothing else may run in between, as exit-code retrieval is a single-shot
/// read. Processes terminated by a signal report code -1.
///
/// # Errors
///
/// Returns [`ProvisionError::CommandFailed`] (a hard stop) when the
/// predicate rejects the exit code, or any error from the runner itself.
pub fn run_checked(
    runner: &dyn CommandRunner,
    cmd: &str,
    args: &[&str],
    check: ExitCheck,
) -> Result<Output> {
    log::trace!("running {cmd} {}", args.join(" "));
    let output = runner.run(cmd, args)?;
    let code = output.status.code().unwrap_or(-1);

    if (check.accepts)(code) {
        Ok(output)
    } else {
        Err(ProvisionError::CommandFailed {
            command: render_command(cmd, args),
            expectation: check.description.to_owned(),
            code,
        })
    }
}

/// Renders a command and its arguments for error messages.
fn render_command(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        cmd.to_owned()
    } else {
        format!("{cmd} {}", args.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubRunner, output_with_code, success_output};
    use rstest::rstest;

    #[test]
    fn zero_exit_code_passes_default_predicate() {
        let runner = StubRunner::new(vec![ExpectedCall {
            cmd: "expand",
            args: vec!["-F:*", "kit.cab", "dest"],
            result: Ok(success_output()),
        }]);

        let output = run_checked(
            &runner,
            "expand",
            &["-F:*", "kit.cab", "dest"],
            ExitCheck::success(),
        )
        .expect("expected exit code 0 to pass");
        assert!(output.status.success());
        runner.assert_finished();
    }

    #[test]
    fn rejected_exit_code_reports_command_and_code() {
        let runner = StubRunner::new(vec![ExpectedCall {
            cmd: "expand",
            args: vec!["-F:*", "kit.cab", "dest"],
            result: Ok(output_with_code(1)),
        }]);

        let err = run_checked(
            &runner,
            "expand",
            &["-F:*", "kit.cab", "dest"],
            ExitCheck::success(),
        )
        .expect_err("expected exit code 1 to be rejected");

        match err {
            ProvisionError::CommandFailed {
                command,
                expectation,
                code,
            } => {
                assert_eq!(command, "expand -F:* kit.cab dest");
                assert_eq!(expectation, "exit code 0");
                assert_eq!(code, 1);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
        runner.assert_finished();
    }

    #[rstest]
    #[case::zero(0, true)]
    #[case::partial_copy(3, true)]
    #[case::mismatch_boundary(7, true)]
    #[case::failure(8, false)]
    #[case::fatal(16, false)]
    fn below_eight_predicate_matches_robocopy_convention(
        #[case] code: i32,
        #[case] accepted: bool,
    ) {
        let check = ExitCheck::below_eight();
        assert_eq!((check.accepts)(code), accepted);
    }

    #[test]
    fn render_command_omits_trailing_space_without_args() {
        assert_eq!(render_command("msiexec", &[]), "msiexec");
        assert_eq!(render_command("expand", &["-F:*"]), "expand -F:*");
    }
}
