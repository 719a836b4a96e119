//! External package-installer collaborator.
//!
//! The installer is a black box that either succeeds or fails fatally. The
//! production implementation force-terminates any conflicting running
//! instance of the target application first, then installs each dependency
//! package followed by the application package itself.

use crate::error::Result;
use crate::runner::{CommandRunner, ExitCheck, run_checked};
use camino::{Utf8Path, Utf8PathBuf};

/// taskkill exit code when no matching process was running.
const PROCESS_NOT_FOUND: i32 = 128;

fn zero_or_not_found(code: i32) -> bool {
    code == 0 || code == PROCESS_NOT_FOUND
}

/// Predicate accepting "terminated" and "was not running" alike.
const TERMINATE_CHECK: ExitCheck = ExitCheck {
    description: "exit code 0 or 128",
    accepts: zero_or_not_found,
};

/// Trait for installing the application package, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller {
    /// Installs `dependencies` in order, then `package`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ProvisionError::CommandFailed`] (a hard
    /// stop) for the
    /// first package whose installer run fails; the command text names the
    /// offending package.
    fn install(&self, package: &Utf8Path, dependencies: &[Utf8PathBuf]) -> Result<()>;
}

/// Production installer driving `msiexec` through the command runner.
pub struct MsiexecInstaller<'a> {
    runner: &'a dyn CommandRunner,
    conflicting_process: Option<String>,
}

impl<'a> MsiexecInstaller<'a> {
    /// Creates an installer; `conflicting_process` names a running
    /// application image to force-terminate before installing.
    #[must_use]
    pub fn new(runner: &'a dyn CommandRunner, conflicting_process: Option<String>) -> Self {
        Self {
            runner,
            conflicting_process,
        }
    }

    fn terminate_conflicting_instance(&self) -> Result<()> {
        if let Some(process) = &self.conflicting_process {
            run_checked(
                self.runner,
                "taskkill",
                &["/IM", process, "/F"],
                TERMINATE_CHECK,
            )?;
        }
        Ok(())
    }

    fn install_one(&self, package: &Utf8Path) -> Result<()> {
        run_checked(
            self.runner,
            "msiexec",
            &["/i", package.as_str(), "/qn", "/norestart"],
            ExitCheck::success(),
        )?;
        Ok(())
    }
}

impl PackageInstaller for MsiexecInstaller<'_> {
    fn install(&self, package: &Utf8Path, dependencies: &[Utf8PathBuf]) -> Result<()> {
        self.terminate_conflicting_instance()?;
        for dependency in dependencies {
            self.install_one(dependency)?;
        }
        self.install_one(package)
    }
}
