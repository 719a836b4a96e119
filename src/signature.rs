//! Publisher signature verification for the downloaded kit.
//!
//! Verification collapses every non-valid outcome (unsigned, tampered,
//! untrusted chain, revoked) into a single invalid status. On failure the
//! offending file is deleted before the error is reported, so a bad
//! artifact cannot be consumed by a later step even if the caller
//! mishandles the error.

use crate::error::{ProvisionError, Result};
use crate::runner::CommandRunner;
use camino::Utf8Path;

/// Outcome of a signature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// The file carries a valid trusted publisher signature.
    Valid,
    /// Anything else; the detail is the checker's diagnostic.
    Invalid(String),
}

/// Trait for checking a file's publisher signature, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait SignatureChecker {
    /// Reports the signature status of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the check itself could not run; an
    /// invalid signature is a status, not an error.
    fn status(&self, path: &Utf8Path) -> Result<SignatureStatus>;
}

/// Production checker shelling out to `osslsigncode verify`.
///
/// Exit code zero means the Authenticode signature verified against a
/// trusted chain; any other code is reported as invalid with the tool's
/// first diagnostic line.
pub struct ToolSignatureChecker<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ToolSignatureChecker<'a> {
    /// Creates a checker over the given command runner.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl SignatureChecker for ToolSignatureChecker<'_> {
    fn status(&self, path: &Utf8Path) -> Result<SignatureStatus> {
        // Non-zero means "not valid" here, not a command failure, so this
        // does not go through run_checked.
        let output = self
            .runner
            .run("osslsigncode", &["verify", "-in", path.as_str()])?;

        if output.status.success() {
            Ok(SignatureStatus::Valid)
        } else {
            Ok(SignatureStatus::Invalid(first_diagnostic_line(&output)))
        }
    }
}

/// Extracts the first non-empty diagnostic line from a tool's output.
fn first_diagnostic_line(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map_or_else(
            || format!("exit code {}", output.status.code().unwrap_or(-1)),
            str::to_owned,
        )
}

/// Confirms that `path` carries a valid trusted publisher signature.
///
/// # Errors
///
/// - [`ProvisionError::FileNotFound`] when the path does not exist.
/// - [`ProvisionError::SignatureInvalid`] when the status is anything other
///   than valid; the file is deleted first (best-effort, deletion failure
///   suppressed so it never masks the signature error).
pub fn verify_file(checker: &dyn SignatureChecker, path: &Utf8Path) -> Result<()> {
    if !path.exists() {
        return Err(ProvisionError::FileNotFound {
            path: path.to_owned(),
        });
    }

    match checker.status(path)? {
        SignatureStatus::Valid => Ok(()),
        SignatureStatus::Invalid(detail) => {
            let _ = std::fs::remove_file(path.as_std_path());
            Err(ProvisionError::SignatureInvalid {
                path: path.to_owned(),
                status: detail,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubRunner, failure_output, success_output};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_tempdir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir was not UTF-8")
    }

    fn valid_checker() -> MockSignatureChecker {
        let mut checker = MockSignatureChecker::new();
        checker
            .expect_status()
            .returning(|_| Ok(SignatureStatus::Valid));
        checker
    }

    fn invalid_checker(detail: &'static str) -> MockSignatureChecker {
        let mut checker = MockSignatureChecker::new();
        checker
            .expect_status()
            .returning(move |_| Ok(SignatureStatus::Invalid(detail.to_owned())));
        checker
    }

    #[test]
    fn missing_file_fails_before_any_check_runs() {
        let mut checker = MockSignatureChecker::new();
        checker.expect_status().times(0);

        let err = verify_file(&checker, Utf8Path::new("/nonexistent/kit.msi"))
            .expect_err("expected missing file to fail");
        assert!(matches!(err, ProvisionError::FileNotFound { .. }));
    }

    #[test]
    fn valid_signature_leaves_file_untouched() {
        let dir = TempDir::new().expect("failed to create tempdir");
        let path = utf8_tempdir(&dir).join("kit.msi");
        std::fs::write(path.as_std_path(), "signed content").expect("failed to seed file");

        let checker = valid_checker();
        verify_file(&checker, &path).expect("expected valid signature to pass");
        assert!(path.exists(), "verified file must not be deleted");
    }

    #[test]
    fn invalid_signature_deletes_file_and_reports_status() {
        let dir = TempDir::new().expect("failed to create tempdir");
        let path = utf8_tempdir(&dir).join("kit.msi");
        std::fs::write(path.as_std_path(), "tampered content").expect("failed to seed file");

        let checker = invalid_checker("no signature found");
        let err = verify_file(&checker, &path).expect_err("expected invalid signature to fail");

        match err {
            ProvisionError::SignatureInvalid { path: named, status } => {
                assert_eq!(named, path);
                assert_eq!(status, "no signature found");
            }
            other => panic!("expected SignatureInvalid, got {other:?}"),
        }
        assert!(!path.exists(), "offending file must be deleted");
    }

    #[test]
    fn tool_checker_maps_exit_zero_to_valid() {
        let runner = StubRunner::new(vec![ExpectedCall {
            cmd: "osslsigncode",
            args: vec!["verify", "-in", "/srv/depkit/kit.msi"],
            result: Ok(success_output()),
        }]);

        let checker = ToolSignatureChecker::new(&runner);
        let status = checker
            .status(Utf8Path::new("/srv/depkit/kit.msi"))
            .expect("expected check to run");
        assert_eq!(status, SignatureStatus::Valid);
        runner.assert_finished();
    }

    #[test]
    fn tool_checker_maps_nonzero_to_invalid_with_diagnostic() {
        let runner = StubRunner::new(vec![ExpectedCall {
            cmd: "osslsigncode",
            args: vec!["verify", "-in", "/srv/depkit/kit.msi"],
            result: Ok(failure_output("Signature verification: failed\n")),
        }]);

        let checker = ToolSignatureChecker::new(&runner);
        let status = checker
            .status(Utf8Path::new("/srv/depkit/kit.msi"))
            .expect("expected check to run");
        assert_eq!(
            status,
            SignatureStatus::Invalid("Signature verification: failed".to_owned())
        );
    }

    #[test]
    fn diagnostic_falls_back_to_exit_code_when_output_is_empty() {
        let output = crate::test_utils::output_with_code(3);
        assert_eq!(first_diagnostic_line(&output), "exit code 3");
    }
}
