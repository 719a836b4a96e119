//! Robust recursive directory removal.
//!
//! Deeply nested trees can exceed the platform path-length limit, where
//! ordinary recursive deletes fail partway down. Mirroring an empty
//! reference directory onto the target clears its contents regardless of
//! nesting depth, after which the target and the reference are removed as
//! plain directory deletes. There is no partial-success state: either the
//! target ends up gone or the mirroring failure propagates as a hard stop.

use crate::error::Result;
use crate::runner::{CommandRunner, ExitCheck, run_checked};
use camino::Utf8Path;

/// Recursively deletes `target` and all contents.
///
/// An absent target is a no-op. The empty reference directory is
/// materialized adjacent to the target so the mirror never crosses
/// filesystems.
///
/// # Errors
///
/// Returns [`ProvisionError::CommandFailed`](crate::error::ProvisionError::CommandFailed)
/// (a hard stop) when the mirroring step fails, or
/// [`ProvisionError::Io`](crate::error::ProvisionError::Io) from the final
/// directory deletes.
pub fn remove_dir_robust(runner: &dyn CommandRunner, target: &Utf8Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }

    let parent = target.parent().unwrap_or_else(|| Utf8Path::new("."));
    let reference = tempfile::Builder::new()
        .prefix(".empty-ref")
        .tempdir_in(parent.as_std_path())?;
    let reference_path = reference.path().to_string_lossy().into_owned();

    // Robocopy reports 0..=7 for the success family, 8+ for failure.
    run_checked(
        runner,
        "robocopy",
        &[&reference_path, target.as_str(), "/MIR", "/NJH", "/NJS"],
        ExitCheck::below_eight(),
    )?;

    std::fs::remove_dir(target.as_std_path())?;
    reference.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::test_utils::{RecordingRunner, output_with_code};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_tempdir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir was not UTF-8")
    }

    #[test]
    fn absent_target_is_a_no_op() {
        let runner = RecordingRunner::new();
        remove_dir_robust(&runner, Utf8Path::new("/nonexistent/depkit"))
            .expect("expected absent target to succeed");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn mirrors_an_empty_reference_onto_the_target() {
        let dir = TempDir::new().expect("failed to create tempdir");
        let base = utf8_tempdir(&dir);
        let target = base.join("kit");
        std::fs::create_dir(target.as_std_path()).expect("failed to create target");

        // The stubbed robocopy reports "extras removed" (exit code 2); the
        // target is already empty so the final delete succeeds.
        let runner = RecordingRunner::with_outputs(vec![output_with_code(2)]);
        remove_dir_robust(&runner, &target).expect("expected removal to succeed");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        let (cmd, args) = &calls[0];
        assert_eq!(cmd, "robocopy");
        assert_eq!(args[1], target.as_str());
        assert!(args.contains(&"/MIR".to_owned()));
        assert!(
            args[0].starts_with(base.as_str()),
            "reference directory must be adjacent to the target"
        );
        assert!(!target.exists(), "target must be removed");
        assert!(
            !Utf8Path::new(&args[0]).exists(),
            "reference directory must be removed"
        );
    }

    #[test]
    fn failed_mirroring_is_a_hard_stop_and_leaves_the_target() {
        let dir = TempDir::new().expect("failed to create tempdir");
        let base = utf8_tempdir(&dir);
        let target = base.join("kit");
        std::fs::create_dir(target.as_std_path()).expect("failed to create target");

        let runner = RecordingRunner::with_outputs(vec![output_with_code(16)]);
        let err =
            remove_dir_robust(&runner, &target).expect_err("expected mirroring failure to error");

        match &err {
            ProvisionError::CommandFailed {
                expectation, code, ..
            } => {
                assert_eq!(expectation, "exit code below 8");
                assert_eq!(*code, 16);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
        assert!(err.is_hard_stop());
        assert!(target.exists(), "target is left in place on failure");
    }
}
