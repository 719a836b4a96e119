//! Deployment-kit archive extraction.
//!
//! The extraction strategy is dispatched on a closed tagged variant
//! resolved once from the file extension, with an explicit unsupported
//! variant rather than a fallthrough branch. Extraction itself runs
//! synchronously through the command runner: installer packages are
//! extracted as an administrative image rather than installed, and cabinet
//! archives through the file-expansion utility with wildcard selection.

use crate::error::{ProvisionError, Result};
use crate::runner::{CommandRunner, ExitCheck, run_checked};
use camino::Utf8Path;

/// The supported deployment-kit archive formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A Windows Installer package, extracted via administrative image.
    InstallerPackage,
    /// A cabinet archive, extracted via the expansion utility.
    CabinetArchive,
    /// Anything else; expansion refuses it as a hard stop.
    Unsupported {
        /// The extension that failed to dispatch (may be empty).
        extension: String,
    },
}

impl ArchiveKind {
    /// Resolves the archive kind from a path's extension,
    /// case-insensitively.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        let extension = path.extension().unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "msi" => Self::InstallerPackage,
            "cab" => Self::CabinetArchive,
            other => Self::Unsupported {
                extension: other.to_owned(),
            },
        }
    }
}

/// Extracts `archive` into `dest`, creating the directory if absent.
///
/// The external extraction process is waited on; control does not return
/// until it completes.
///
/// # Errors
///
/// - [`ProvisionError::UnsupportedArchiveType`] (hard stop) when the
///   archive's extension matches no supported format; the destination is
///   not created in that case, so a fresh destination never holds partial
///   output.
/// - [`ProvisionError::CommandFailed`] (hard stop) when the extraction
///   command exits non-zero.
pub fn expand(runner: &dyn CommandRunner, archive: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    let target_dir = format!("TARGETDIR={dest}");
    let (cmd, args): (&str, Vec<&str>) = match ArchiveKind::from_path(archive) {
        ArchiveKind::Unsupported { extension } => {
            return Err(ProvisionError::UnsupportedArchiveType {
                path: archive.to_owned(),
                extension,
            });
        }
        ArchiveKind::InstallerPackage => {
            ("msiexec", vec!["/a", archive.as_str(), "/qn", &target_dir])
        }
        ArchiveKind::CabinetArchive => ("expand", vec!["-F:*", archive.as_str(), dest.as_str()]),
    };

    std::fs::create_dir_all(dest.as_std_path())?;
    run_checked(runner, cmd, &args, ExitCheck::success())?;
    Ok(())
}
