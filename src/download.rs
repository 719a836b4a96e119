//! Idempotent, crash-safe download of the deployment kit.
//!
//! The transfer body is written to a distinctly-named in-progress path and
//! only renamed to the final name once complete, so a file bearing the
//! final name is never partially written. A file already present at the
//! final name short-circuits the transfer entirely; integrity is deferred
//! to signature verification, which runs afterwards regardless.

use crate::error::{ProvisionError, Result};
use crate::output::{
    already_present_message, fetch_done_message, fetch_start_message, write_stderr_line,
};
use crate::resolver::{RedirectProbe, resolve};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

/// Reserved suffix marking an in-progress download artifact.
pub const IN_PROGRESS_SUFFIX: &str = ".downloading";

/// File name used when the resolved URL has no usable last path segment.
pub const FALLBACK_FILE_NAME: &str = "deployment-kit";

/// Network timeout for the kit transfer.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for transferring a resolved URL's body to a file, enabling test
/// mocking.
#[cfg_attr(test, mockall::automock)]
pub trait KitTransfer {
    /// Streams the body of `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Network`] on transport failure and
    /// [`ProvisionError::Io`] if the file cannot be written.
    fn transfer(&self, url: &str, dest: &Utf8Path) -> Result<()>;
}

/// Production transfer using `ureq` with a shared agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransfer;

impl KitTransfer for HttpTransfer {
    fn transfer(&self, url: &str, dest: &Utf8Path) -> Result<()> {
        let response = transfer_agent()
            .get(url)
            .call()
            .map_err(|e| ProvisionError::Network {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        let mut file = std::fs::File::create(dest.as_std_path())?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(ProvisionError::Io)?;
        Ok(())
    }
}

/// Shared `ureq` agent for body transfers.
fn transfer_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(TRANSFER_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Resolves and fetches a URL to a local file, at most once per target.
pub struct Downloader<'a> {
    probe: &'a dyn RedirectProbe,
    transfer: &'a dyn KitTransfer,
}

impl<'a> Downloader<'a> {
    /// Creates a downloader over the given resolution and transfer seams.
    #[must_use]
    pub fn new(probe: &'a dyn RedirectProbe, transfer: &'a dyn KitTransfer) -> Self {
        Self { probe, transfer }
    }

    /// Fetches `url` into `dest_dir`, returning the final file path.
    ///
    /// The URL is resolved through its redirect chain first; when no
    /// explicit `output_name` is given the file name is derived from the
    /// last path segment of the resolved URL. An existing file at the
    /// destination is returned as-is without any transfer. A stale
    /// in-progress artifact is discarded, never resumed.
    ///
    /// # Errors
    ///
    /// Resolution errors propagate unchanged; transfer and filesystem
    /// failures surface as [`ProvisionError::Network`] or
    /// [`ProvisionError::Io`].
    pub fn fetch(
        &self,
        url: &str,
        description: &str,
        output_name: Option<&str>,
        dest_dir: &Utf8Path,
        stderr: &mut dyn Write,
    ) -> Result<Utf8PathBuf> {
        let resolved = resolve(self.probe, url)?;
        let name = output_name.map_or_else(|| derive_file_name(&resolved), str::to_owned);
        let final_path = dest_dir.join(name);

        if final_path.exists() {
            write_stderr_line(stderr, already_present_message(&final_path));
            return Ok(final_path);
        }

        let in_progress = Utf8PathBuf::from(format!("{final_path}{IN_PROGRESS_SUFFIX}"));
        if in_progress.exists() {
            // A leftover from an interrupted run; discard rather than resume.
            std::fs::remove_file(in_progress.as_std_path())?;
        }

        write_stderr_line(stderr, fetch_start_message(description, &resolved));
        self.transfer.transfer(&resolved, &in_progress)?;
        std::fs::rename(in_progress.as_std_path(), final_path.as_std_path())?;
        write_stderr_line(stderr, fetch_done_message(&final_path));

        Ok(final_path)
    }
}

/// Derives a file name from the last path segment of a resolved URL.
///
/// Query and fragment are stripped first. Falls back to
/// [`FALLBACK_FILE_NAME`] when the segment is empty (trailing slash or
/// bare origin).
fn derive_file_name(resolved: &str) -> String {
    let without_fragment = resolved.split('#').next().unwrap_or(resolved);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    match after_scheme.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => segment.to_owned(),
        _ => FALLBACK_FILE_NAME.to_owned(),
    }
}
