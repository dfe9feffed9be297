use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use igem_parts_import::app::{App, ImportReport};
use igem_parts_import::config::ConfigLoader;
use igem_parts_import::error::PartsError;
use igem_parts_import::output::{ConsoleOutput, JsonOutput, OutputMode};
use igem_parts_import::sources::SourceRegistry;

#[derive(Parser)]
#[command(name = "parts-import")]
#[command(about = "Find and download the parts an iGEM distribution package is missing")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Config file (default: <package>/parts-import.json)")]
    config: Option<Utf8PathBuf>,

    #[arg(long, global = true, help = "Print machine-readable JSON")]
    json: bool,

    #[arg(long, global = true)]
    timings: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Reconcile the package specification with local records and fetch the gaps")]
    Import { package: Utf8PathBuf },
    #[command(about = "List the part identifiers found in the package directory")]
    Inventory { package: Utf8PathBuf },
    #[command(about = "Fetch specific parts into the package caches")]
    Fetch {
        package: Utf8PathBuf,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Command {
    fn package(&self) -> &Utf8PathBuf {
        match self {
            Command::Import { package }
            | Command::Inventory { package }
            | Command::Fetch { package, .. } => package,
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<PartsError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PartsError) -> u8 {
    match error {
        PartsError::PackageNotFound(_)
        | PartsError::MissingSpecification(_)
        | PartsError::MissingCollection { .. }
        | PartsError::ConfigRead(_)
        | PartsError::ConfigParse(_)
        | PartsError::UnknownSource(_)
        | PartsError::UnknownRetriever { .. } => 2,
        PartsError::NcbiHttp(_)
        | PartsError::NcbiStatus { .. }
        | PartsError::SynBioHubHttp(_)
        | PartsError::SynBioHubStatus { .. }
        | PartsError::RegistryHttp(_)
        | PartsError::RegistryStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let config = ConfigLoader::resolve(cli.config.as_deref(), cli.command.package())?;
    let sources = SourceRegistry::from_config(&config)?;
    let app = App::new(config, sources);
    let console = ConsoleOutput {
        show_timings: cli.timings,
    };

    match cli.command {
        Command::Import { package } => {
            let package = app.open_package(&package)?;
            match output_mode {
                OutputMode::Json => {
                    let report = app.import_parts(&package, &JsonOutput)?;
                    JsonOutput::print_import(&report).into_diagnostic()?;
                }
                OutputMode::Text => {
                    println!("Importing parts for package {}", package.name());
                    let report = app.import_parts(&package, &console)?;
                    print_import_summary(&report);
                }
            }
        }
        Command::Inventory { package } => {
            let package = app.open_package(&package)?;
            match output_mode {
                OutputMode::Json => {
                    let result = app.inventory(&package, &JsonOutput)?;
                    JsonOutput::print_inventory(&result).into_diagnostic()?;
                }
                OutputMode::Text => {
                    let result = app.inventory(&package, &console)?;
                    ConsoleOutput::print_inventory(&result);
                }
            }
        }
        Command::Fetch { package, ids } => {
            let package = app.open_package(&package)?;
            match output_mode {
                OutputMode::Json => {
                    let result = app.fetch(&package, &ids, &JsonOutput);
                    JsonOutput::print_fetch(&result).into_diagnostic()?;
                }
                OutputMode::Text => {
                    let result = app.fetch(&package, &ids, &console);
                    ConsoleOutput::print_fetch(&result);
                }
            }
        }
    }
    Ok(())
}

fn print_import_summary(report: &ImportReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}parts-import summary{reset}");
    println!(
        "{green}declared: {}  with sequence: {}  available: {}{reset}",
        report.declared, report.with_sequence, report.available
    );
    println!(
        "{green}retrieved: {} of {} missing{reset}",
        report.retrieved.len(),
        report.missing.len()
    );
    if !report.still_missing.is_empty() {
        println!(
            "{yellow}still missing: {}{reset}",
            report.still_missing.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_problems_exit_with_two() {
        let errors = [
            PartsError::ConfigRead(Utf8PathBuf::from("parts-import.json")),
            PartsError::ConfigParse("expected value".to_string()),
            PartsError::UnknownSource("https://example.org/".to_string()),
            PartsError::UnknownRetriever {
                prefix: "https://example.org/".to_string(),
                retriever: "addgene".to_string(),
            },
            PartsError::MissingSpecification(Utf8PathBuf::from("export/package_specification.nt")),
        ];
        for error in &errors {
            assert_eq!(map_exit_code(error), 2, "{error}");
        }
    }

    #[test]
    fn remote_and_other_failures() {
        let remote = PartsError::NcbiStatus {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(map_exit_code(&remote), 3);
        assert_eq!(map_exit_code(&PartsError::Filesystem("disk full".to_string())), 1);
    }
}
