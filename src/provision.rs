//! Top-level provisioning pipeline.
//!
//! A linear sequence: fetch the deployment kit, verify its publisher
//! signature, clear and repopulate the extraction directory, install the
//! dependency packages and the application package, then overwrite the
//! completion log with a single timestamp line.

use crate::archive;
use crate::download::{Downloader, HttpTransfer};
use crate::error::Result;
use crate::install::{MsiexecInstaller, PackageInstaller};
use crate::output::{completion_message, write_stderr_line};
use crate::remover::remove_dir_robust;
use crate::resolver::HttpProbe;
use crate::runner::{CommandRunner, SystemCommandRunner};
use crate::signature::{SignatureChecker, ToolSignatureChecker, verify_file};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Directory under the base where the kit archive is extracted.
pub const KIT_DIR_NAME: &str = "kit";

/// Name of the completion log, written adjacent to the downloads.
pub const LOG_FILE_NAME: &str = "provision.log";

/// Human-readable description used in download progress messages.
const KIT_DESCRIPTION: &str = "deployment kit";

/// Everything a provisioning run needs, threaded explicitly.
///
/// There is no global fixed-path state: the base directory and every file
/// name are configuration, which keeps the components testable in
/// isolation.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// The (possibly redirect-chained) deployment-kit download URL.
    pub kit_url: String,
    /// Base directory for downloads, extraction, and the completion log.
    pub base_dir: Utf8PathBuf,
    /// Explicit kit file name; derived from the resolved URL when `None`.
    pub kit_file_name: Option<String>,
    /// Application package path, relative to the extraction directory.
    pub package_file: String,
    /// Dependency package paths, relative to the extraction directory,
    /// installed in order before the application package.
    pub dependency_files: Vec<String>,
    /// Image name of a running application instance to force-terminate
    /// before installing.
    pub conflicting_process: Option<String>,
    /// When true, suppress progress output.
    pub quiet: bool,
}

impl ProvisionConfig {
    /// Path of the extraction directory for this configuration.
    #[must_use]
    pub fn kit_dir(&self) -> Utf8PathBuf {
        self.base_dir.join(KIT_DIR_NAME)
    }

    /// Path of the completion log for this configuration.
    #[must_use]
    pub fn log_path(&self) -> Utf8PathBuf {
        self.base_dir.join(LOG_FILE_NAME)
    }
}

/// The injected collaborators behind a provisioning run.
///
/// The production entry point [`provision`] wires real implementations;
/// tests inject stubs and mocks.
pub struct Collaborators<'a> {
    /// Channel for all external-process invocations.
    pub runner: &'a dyn CommandRunner,
    /// Redirect-chain resolution seam.
    pub probe: &'a dyn crate::resolver::RedirectProbe,
    /// Download transfer seam.
    pub transfer: &'a dyn crate::download::KitTransfer,
    /// Publisher signature check seam.
    pub checker: &'a dyn SignatureChecker,
    /// Package installation seam.
    pub installer: &'a dyn PackageInstaller,
}

/// Runs the full provisioning sequence with production collaborators.
///
/// # Errors
///
/// Propagates the first failure from any step; see
/// [`ProvisionError`](crate::error::ProvisionError) for the variants and
/// their hard-stop classification.
pub fn provision(config: &ProvisionConfig, stderr: &mut dyn Write) -> Result<()> {
    let runner = SystemCommandRunner;
    let probe = HttpProbe;
    let transfer = HttpTransfer;
    let checker = ToolSignatureChecker::new(&runner);
    let installer = MsiexecInstaller::new(&runner, config.conflicting_process.clone());
    let collaborators = Collaborators {
        runner: &runner,
        probe: &probe,
        transfer: &transfer,
        checker: &checker,
        installer: &installer,
    };
    provision_with(config, &collaborators, stderr)
}

/// Testable inner pipeline with injected collaborators.
///
/// # Errors
///
/// As for [`provision`].
pub fn provision_with(
    config: &ProvisionConfig,
    collaborators: &Collaborators<'_>,
    stderr: &mut dyn Write,
) -> Result<()> {
    let mut sink = std::io::sink();
    let observer: &mut dyn Write = if config.quiet { &mut sink } else { stderr };

    std::fs::create_dir_all(config.base_dir.as_std_path())?;

    // Step 1: Acquire the kit (idempotent, crash-safe).
    let downloader = Downloader::new(collaborators.probe, collaborators.transfer);
    let kit_path = downloader.fetch(
        &config.kit_url,
        KIT_DESCRIPTION,
        config.kit_file_name.as_deref(),
        &config.base_dir,
        observer,
    )?;

    // Step 2: Verify the publisher signature before anything consumes it.
    verify_file(collaborators.checker, &kit_path)?;

    // Step 3: Extract into a clean directory.
    let kit_dir = config.kit_dir();
    remove_dir_robust(collaborators.runner, &kit_dir)?;
    archive::expand(collaborators.runner, &kit_path, &kit_dir)?;

    // Step 4: Install dependencies, then the application package.
    let package = kit_dir.join(&config.package_file);
    let dependencies: Vec<Utf8PathBuf> = config
        .dependency_files
        .iter()
        .map(|name| kit_dir.join(name))
        .collect();
    collaborators.installer.install(&package, &dependencies)?;

    // Step 5: Overwrite the one-line completion log.
    let log_path = config.log_path();
    write_completion_log(&log_path)?;
    write_stderr_line(observer, completion_message(&log_path));

    Ok(())
}

/// Overwrites the completion log with a single timestamp line.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`](crate::error::ProvisionError::Io) if the
/// log cannot be written.
pub fn write_completion_log(path: &Utf8Path) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    std::fs::write(path.as_std_path(), format!("{timestamp}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn utf8_tempdir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir was not UTF-8")
    }

    #[test]
    fn completion_log_is_overwritten_with_one_timestamp_line() {
        let dir = TempDir::new().expect("failed to create tempdir");
        let path = utf8_tempdir(&dir).join(LOG_FILE_NAME);
        std::fs::write(path.as_std_path(), "stale line one\nstale line two\n")
            .expect("failed to seed stale log");

        write_completion_log(&path).expect("expected log write to succeed");

        let content = std::fs::read_to_string(path.as_std_path()).expect("missing log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1, "log must contain exactly one line");
        assert!(
            lines[0].chars().next().is_some_and(char::is_numeric),
            "log line must start with a timestamp"
        );
    }

    #[test]
    fn config_paths_hang_off_the_base_directory() {
        let config = ProvisionConfig {
            kit_url: "http://example.test/kit.msi".to_owned(),
            base_dir: Utf8PathBuf::from("/srv/depkit"),
            kit_file_name: None,
            package_file: "app.msi".to_owned(),
            dependency_files: Vec::new(),
            conflicting_process: None,
            quiet: false,
        };
        assert_eq!(config.kit_dir(), Utf8PathBuf::from("/srv/depkit/kit"));
        assert_eq!(
            config.log_path(),
            Utf8PathBuf::from("/srv/depkit/provision.log")
        );
    }
}
