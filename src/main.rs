//! YOLAT command-line entry point.

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use yolat::Dataset;
use yolat::config::{AppConfig, ConfigError};
use yolat::constants::{DEFAULT_CLASS_COLOR, DEFAULT_JOB_NAME};
use yolat::dataset::DatasetError;
use yolat::format::InterchangeError;
use yolat::model::ClassDef;

#[derive(Parser, Debug)]
#[command(name = "yolat", version, about = "YOLO annotation job store")]
struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to the platform config dir)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Data directory, overriding the config file")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List jobs with their image counts
    Jobs,
    /// Create a job and print its id
    Create {
        #[arg(default_value = DEFAULT_JOB_NAME)]
        name: String,
    },
    /// Copy an image file into a job
    Add { job: String, image: PathBuf },
    /// Print a job's classes, images and boxes
    Show { job: String },
    /// Import a YOLO ZIP archive into a job
    Import { job: String, archive: PathBuf },
    /// Export one job, or all jobs, as a YOLO ZIP archive
    Export {
        #[arg(long)]
        job: Option<String>,
        output: PathBuf,
    },
    /// Print the class registry
    Classes,
    /// Replace the class registry, e.g. `car:#ff0000 person`
    SetClasses {
        #[arg(required = true)]
        classes: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Interchange(#[from] InterchangeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load_from_default_path(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // RUST_LOG takes precedence over the configured level
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<(), CliError> {
    let data_dir = cli.data_dir.unwrap_or(config.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    log::debug!("Using data directory {:?}", data_dir);
    let dataset = Dataset::open(data_dir);

    match cli.command {
        Commands::Jobs => print_json(&dataset.jobs().list()?),
        Commands::Create { name } => {
            let id = dataset.jobs().create(&name)?;
            println!("{}", id);
            Ok(())
        }
        Commands::Add { job, image } => {
            let data = std::fs::read(&image)?;
            let name = image.to_string_lossy();
            print_json(&dataset.add_image(&job, &name, &data)?)
        }
        Commands::Show { job } => print_json(&dataset.job_snapshot(&job)?),
        Commands::Import { job, archive } => {
            let bytes = std::fs::read(&archive)?;
            print_json(&dataset.importer().import(&bytes, &job)?)
        }
        Commands::Export { job, output } => {
            let archive = dataset.exporter().export(job.as_deref())?;
            std::fs::write(&output, &archive.bytes)?;
            print_json(&archive.summary)
        }
        Commands::Classes => print_json(&dataset.classes().load()),
        Commands::SetClasses { classes } => {
            let classes: Vec<ClassDef> = classes.iter().map(|spec| parse_class(spec)).collect();
            dataset.classes().save(&classes)?;
            print_json(&classes)
        }
    }
}

/// Parse `name` or `name:#color`; a bare name gets the default color.
fn parse_class(spec: &str) -> ClassDef {
    match spec.rsplit_once(':') {
        Some((name, color)) if color.starts_with('#') => ClassDef::new(name, color),
        _ => ClassDef::new(spec, DEFAULT_CLASS_COLOR),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
