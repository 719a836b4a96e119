//! Platform base-directory resolution.
//!
//! The base directory is an explicit configuration value threaded through
//! every component; this module only supplies the platform default used
//! when the caller does not override it.

use camino::Utf8PathBuf;
use directories_next::ProjectDirs;

/// Returns the platform-specific default base directory.
///
/// - Linux: `~/.local/share/depkit`
/// - macOS: `~/Library/Application Support/depkit`
/// - Windows: `%LOCALAPPDATA%\depkit\data`
///
/// Returns `None` if the platform's data directory cannot be determined or
/// is not valid UTF-8.
#[must_use]
pub fn default_base_dir() -> Option<Utf8PathBuf> {
    ProjectDirs::from("", "", "depkit")
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_local_dir().to_path_buf()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_dir_ends_with_application_name() {
        if let Some(dir) = default_base_dir() {
            assert!(dir.as_str().contains("depkit"));
        }
    }
}
