//! CLI argument definitions for the provisioner.
//!
//! Separated from the main entrypoint to keep the binary small and focused
//! on orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

/// Fetch, verify, and install a deployment kit.
#[derive(Parser, Debug, Default)]
#[command(name = "depkit-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch, verify, and install a deployment kit.\n\n",
    "The kit URL is resolved through its redirect chain, the archive is ",
    "downloaded once (re-runs reuse a completed download), its publisher ",
    "signature is verified, and its contents are extracted and installed ",
    "along with the dependency packages. A one-line completion log is ",
    "written on success.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Provision from a vendor link:\n",
    "    $ depkit-installer https://vendor.test/latest --package setup/app.msi\n\n",
    "  With dependency packages and a conflicting process to stop:\n",
    "    $ depkit-installer https://vendor.test/latest \\\n",
    "        --package setup/app.msi \\\n",
    "        --dependency setup/runtime.msi --dependency setup/driver.msi \\\n",
    "        --terminate-process app.exe\n\n",
    "  Preview without side effects:\n",
    "    $ depkit-installer https://vendor.test/latest --package setup/app.msi --dry-run",
))]
pub struct Cli {
    /// Deployment-kit download URL (redirects are followed).
    pub url: String,

    /// Base directory for downloads, extraction, and the completion log
    /// [default: platform-specific].
    #[arg(short, long, value_name = "DIR")]
    pub base_dir: Option<Utf8PathBuf>,

    /// Explicit file name for the downloaded kit archive [default: derived
    /// from the resolved URL].
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Application package within the extracted kit.
    #[arg(long, value_name = "FILE")]
    pub package: String,

    /// Dependency package within the extracted kit, installed before the
    /// application package (can be repeated).
    #[arg(long = "dependency", value_name = "FILE")]
    pub dependencies: Vec<String>,

    /// Running process image to force-terminate before installing.
    #[arg(long, value_name = "IMAGE")]
    pub terminate_process: Option<String>,

    /// Show what would be done without side effects.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("expected arguments to parse")
    }

    #[test]
    fn url_and_package_are_sufficient() {
        let cli = parse(&[
            "depkit-installer",
            "http://example.test/kit",
            "--package",
            "app.msi",
        ]);
        assert_eq!(cli.url, "http://example.test/kit");
        assert_eq!(cli.package, "app.msi");
        assert!(cli.dependencies.is_empty());
        assert!(!cli.dry_run);
    }

    #[test]
    fn dependencies_accumulate_in_order() {
        let cli = parse(&[
            "depkit-installer",
            "http://example.test/kit",
            "--package",
            "app.msi",
            "--dependency",
            "runtime.msi",
            "--dependency",
            "driver.msi",
        ]);
        assert_eq!(cli.dependencies, vec!["runtime.msi", "driver.msi"]);
    }

    #[test]
    fn package_is_required() {
        let result = Cli::try_parse_from(["depkit-installer", "http://example.test/kit"]);
        assert!(result.is_err());
    }

    #[test]
    fn base_dir_parses_as_utf8_path() {
        let cli = parse(&[
            "depkit-installer",
            "http://example.test/kit",
            "--package",
            "app.msi",
            "--base-dir",
            "/srv/depkit",
        ]);
        assert_eq!(cli.base_dir, Some(Utf8PathBuf::from("/srv/depkit")));
    }
}
