//! Progress and status output for the provisioner CLI.
//!
//! Progress notifications are a side effect, not part of any functional
//! contract, so the pipeline threads a `&mut dyn Write` observer through
//! the operations that emit them and writes are best-effort.

use camino::Utf8Path;
use std::io::Write;

/// Writes a single line to the observer, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Message announcing the start of a download.
#[must_use]
pub fn fetch_start_message(description: &str, url: &str) -> String {
    format!("Downloading {description} from {url}...")
}

/// Message announcing that a prior download is being reused.
#[must_use]
pub fn already_present_message(path: &Utf8Path) -> String {
    format!("{path} already present; skipping download")
}

/// Message announcing a completed download.
#[must_use]
pub fn fetch_done_message(path: &Utf8Path) -> String {
    format!("Saved to {path}")
}

/// Message announcing a successful provisioning run.
#[must_use]
pub fn completion_message(log_path: &Utf8Path) -> String {
    format!("Provisioning complete; log written to {log_path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};

    #[fixture]
    fn kit_path() -> Utf8PathBuf {
        Utf8PathBuf::from("/srv/depkit/deployment-kit.msi")
    }

    #[test]
    fn start_message_names_description_and_url() {
        let msg = fetch_start_message("deployment kit", "http://example.test/kit.msi");
        assert!(msg.contains("deployment kit"));
        assert!(msg.contains("http://example.test/kit.msi"));
    }

    #[rstest]
    fn already_present_message_names_path(kit_path: Utf8PathBuf) {
        let msg = already_present_message(&kit_path);
        assert!(msg.contains(kit_path.as_str()));
        assert!(msg.contains("skipping"));
    }

    #[rstest]
    fn done_message_names_path(kit_path: Utf8PathBuf) {
        assert!(fetch_done_message(&kit_path).contains(kit_path.as_str()));
    }

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut sink = Vec::new();
        write_stderr_line(&mut sink, "done");
        assert_eq!(sink, b"done\n");
    }
}
