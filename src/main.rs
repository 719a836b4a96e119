//! Provisioner CLI entrypoint.
//!
//! Parses arguments, assembles the provisioning configuration, and maps the
//! run outcome to a process exit status: 0 on success, 2 for hard stops
//! (unsupported archive type, rejected native-command exit code), 1 for
//! every other failure.

use camino::Utf8PathBuf;
use clap::Parser;
use depkit_installer::cli::Cli;
use depkit_installer::dirs::default_base_dir;
use depkit_installer::error::{ProvisionError, Result};
use depkit_installer::output::write_stderr_line;
use depkit_installer::provision::{ProvisionConfig, provision};
use std::io::Write;

/// Exit code for hard stops.
const HARD_STOP_EXIT_CODE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(&run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = config_for_cli(cli)?;

    if cli.dry_run {
        print_dry_run_info(&config, stderr);
        return Ok(());
    }

    provision(&config, stderr)
}

/// Assembles the provisioning configuration from CLI arguments.
fn config_for_cli(cli: &Cli) -> Result<ProvisionConfig> {
    let base_dir = determine_base_dir(cli.base_dir.clone())?;
    Ok(ProvisionConfig {
        kit_url: cli.url.clone(),
        base_dir,
        kit_file_name: cli.output.clone(),
        package_file: cli.package.clone(),
        dependency_files: cli.dependencies.clone(),
        conflicting_process: cli.terminate_process.clone(),
        quiet: cli.quiet,
    })
}

/// Determines the base directory from the CLI or the platform default.
fn determine_base_dir(cli_base: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    cli_base.or_else(default_base_dir).ok_or_else(|| {
        ProvisionError::Io(std::io::Error::other(
            "could not determine default base directory",
        ))
    })
}

/// Prints the resolved configuration without side effects.
fn print_dry_run_info(config: &ProvisionConfig, stderr: &mut dyn Write) {
    write_stderr_line(stderr, "Dry run - no files will be modified");
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("Kit URL: {}", config.kit_url));
    write_stderr_line(stderr, format!("Base directory: {}", config.base_dir));
    write_stderr_line(
        stderr,
        format!(
            "Kit file name: {}",
            config.kit_file_name.as_deref().unwrap_or("(derived)")
        ),
    );
    write_stderr_line(stderr, format!("Extraction directory: {}", config.kit_dir()));
    write_stderr_line(stderr, format!("Package: {}", config.package_file));
    write_stderr_line(stderr, "Dependencies:");
    for dependency in &config.dependency_files {
        write_stderr_line(stderr, format!("  - {dependency}"));
    }
    if let Some(process) = &config.conflicting_process {
        write_stderr_line(stderr, format!("Terminate process: {process}"));
    }
    write_stderr_line(stderr, format!("Completion log: {}", config.log_path()));
}

fn exit_code_for_run_result(result: &Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            if err.is_hard_stop() {
                HARD_STOP_EXIT_CODE
            } else {
                1
            }
        }
    }
}
