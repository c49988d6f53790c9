mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use prv_core::{
    policy_from_env_values, sort_records, validate_with, PatientRecord, PatientSummary, SortKey,
    SortOrder, ValidationError, ValidationPolicy,
};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "prv")]
#[command(about = "Patient record validator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a patient record and print its normalised form
    Validate {
        /// JSON or YAML file holding one raw record
        file: PathBuf,
        /// Output format for the validated record
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate a patient summary with a nested address
    ValidateSummary {
        /// JSON or YAML file holding one raw summary
        file: PathBuf,
    },
    /// Validate a file of records and list them ordered by a measurement
    Sort {
        /// JSON or YAML mapping of patient id to raw record
        file: PathBuf,
        /// height, weight or bmi
        #[arg(long)]
        by: SortKey,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prv_cli=info".parse()?)
                .add_directive("prv_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let policy = policy_from_env_values(
        std::env::var("PRV_MAX_AGE").ok(),
        std::env::var("PRV_ALLOWED_EMAIL_DOMAINS").ok(),
        std::env::var("PRV_STRICT_FIELDS").ok(),
        std::env::var("PRV_EMERGENCY_CONTACT_AGE").ok(),
    )?;

    match cli.command {
        Some(Commands::Validate { file, format }) => validate_record(&file, format, &policy),
        Some(Commands::ValidateSummary { file }) => validate_summary(&file),
        Some(Commands::Sort { file, by, order }) => sort_roster(&file, by, order, &policy),
        None => {
            println!("Use 'prv --help' for commands");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn validate_record(
    file: &std::path::Path,
    format: OutputFormat,
    policy: &ValidationPolicy,
) -> anyhow::Result<ExitCode> {
    let raw = input::load_value(file)?;

    match validate_with(&raw, policy) {
        Ok(record) => {
            tracing::info!(file = %file.display(), "record accepted");
            let text = match format {
                OutputFormat::Json => record.to_json()?,
                OutputFormat::Yaml => record.to_yaml()?,
            };
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_rejection(file, &err),
    }
}

fn validate_summary(file: &std::path::Path) -> anyhow::Result<ExitCode> {
    let raw = input::load_value(file)?;

    match PatientSummary::validate(&raw) {
        Ok(summary) => {
            tracing::info!(file = %file.display(), "summary accepted");
            println!("{}", serde_json::to_string_pretty(&summary.to_json_value()?)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_rejection(file, &err),
    }
}

/// Valid roster entries in sorted order, plus the entries that failed validation.
struct RankedRoster {
    ranked: Vec<(String, PatientRecord)>,
    skipped: Vec<(String, ValidationError)>,
}

impl RankedRoster {
    fn exit_code(&self) -> ExitCode {
        if self.skipped.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }
}

fn rank_roster(
    roster: Vec<(String, Value)>,
    by: SortKey,
    order: SortOrder,
    policy: &ValidationPolicy,
) -> RankedRoster {
    let mut ranked = Vec::with_capacity(roster.len());
    let mut skipped = Vec::new();
    for (id, raw) in roster {
        match validate_with(&raw, policy) {
            Ok(record) => ranked.push((id, record)),
            Err(err) => skipped.push((id, err)),
        }
    }

    sort_records(&mut ranked, by, order);
    RankedRoster { ranked, skipped }
}

fn sort_roster(
    file: &std::path::Path,
    by: SortKey,
    order: SortOrder,
    policy: &ValidationPolicy,
) -> anyhow::Result<ExitCode> {
    let roster = input::load_roster(file)?;
    let total = roster.len();
    let outcome = rank_roster(roster, by, order, policy);

    for (id, err) in &outcome.skipped {
        tracing::warn!(%id, "skipping invalid record");
        eprintln!("Skipping {id}: {err}");
    }
    tracing::info!(valid = outcome.ranked.len(), total, "sorted roster");

    for (id, record) in &outcome.ranked {
        println!(
            "ID: {}, Name: {}, Height: {}, Weight: {}, BMI: {}",
            id,
            record.name(),
            record.height(),
            record.weight(),
            record.bmi()
        );
    }

    Ok(outcome.exit_code())
}

fn report_rejection(file: &std::path::Path, err: &ValidationError) -> anyhow::Result<ExitCode> {
    tracing::warn!(file = %file.display(), "record rejected");
    eprintln!("Validation failed: {err}");
    println!("{}", serde_json::to_string_pretty(err)?);
    Ok(ExitCode::from(1))
}
