//! SaaS Auth CLI - query and inspect role policies from the terminal.
//!
//! Provides commands for checking a single permission, explaining a decision,
//! listing policies and printing the role/subject matrix.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{check, matrix, policy};
use output::OutputFormat;
use saas_auth::config::Settings;
use saas_auth::telemetry;

/// SaaS Auth - role-based ability engine CLI
#[derive(Parser)]
#[command(
    name = "saas-auth",
    version = "0.1.0",
    about = "SaaS Auth - role-based ability engine",
    long_about = "Query abilities, explain decisions and inspect the role policy table.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// TOML policy document replacing the built-in policy table
    #[arg(long, global = true, env = "SAAS_AUTH_POLICY")]
    policy: Option<PathBuf>,

    /// Log every decision at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a role may perform an action on a subject
    Check(check::CheckArgs),

    /// Show the decision and the rule that produced it
    Explain(check::CheckArgs),

    /// List the ordered rules of each role
    Policy(policy::PolicyArgs),

    /// Print the type-level permissions of every role
    Matrix(matrix::MatrixArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut settings = Settings::load().context("failed to load settings")?;
    if let Some(path) = cli.policy {
        settings.policy.file = Some(path);
    }
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }
    telemetry::init_logging(&settings.logging)?;

    let format = cli.output;
    let result = settings
        .registry()
        .map_err(|e| {
            e.log();
            anyhow::Error::new(e)
        })
        .and_then(|registry| match cli.command {
            Commands::Check(args) => check::execute(args, &registry, format),
            Commands::Explain(args) => check::explain(args, &registry, format).map(|_| true),
            Commands::Policy(args) => policy::execute(args, &registry, format).map(|_| true),
            Commands::Matrix(args) => matrix::execute(args, &registry, format).map(|_| true),
        });

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(2),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
