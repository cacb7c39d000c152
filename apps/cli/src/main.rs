//! `rampart`: validate JSON documents against rule files.
//!
//! Exit status: 0 when every document is valid, 1 when violations were
//! found, 2 on any error (bad rules, unreadable input, failed services).

mod check;
mod config;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rampart_validator::codes;
use tracing_subscriber::EnvFilter;

use crate::check::CheckArgs;
use crate::config::Config;

/// Environment variable holding a log filter; overrides `log_level`.
const LOG_ENV: &str = "RAMPART_LOG";

#[derive(Debug, Parser)]
#[command(name = "rampart", version, about = "Validate JSON documents against rule files")]
struct Cli {
    /// Configuration file [default: ./rampart.toml if present]
    #[arg(long, global = true, env = "RAMPART_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `rampart_validator=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate documents against a rule file
    Check(CheckArgs),

    /// List known error codes
    Codes {
        /// Only show codes whose constraint, name or code contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show which constraint raises an error code
    Explain {
        /// The code, e.g. `9ff3fdc4-b214-49db-8718-39c315e33d45`
        code: String,
    },
}

enum Outcome {
    Clean,
    Violations,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Violations) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref(), &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Check(args) => {
            let clean = check::run(&args, &config, &mut out)?;
            Ok(if clean { Outcome::Clean } else { Outcome::Violations })
        }
        Command::Codes { filter } => {
            print_codes(filter.as_deref(), &mut out)?;
            Ok(Outcome::Clean)
        }
        Command::Explain { code } => {
            let Some(entry) = codes::lookup(code.trim()) else {
                bail!("unknown error code \"{code}\"");
            };
            writeln!(out, "{}::{}", entry.constraint, entry.name)?;
            Ok(Outcome::Clean)
        }
    }
}

/// Logs go to stderr so that `check --format json` output stays parseable.
fn init_logging(flag: Option<&str>, config: &Config) -> Result<()> {
    let from_env = std::env::var(LOG_ENV).ok();
    let directives = flag
        .or(from_env.as_deref())
        .unwrap_or(&config.log_level);
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter \"{directives}\""))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn print_codes(filter: Option<&str>, out: &mut impl Write) -> io::Result<()> {
    let needle = filter.map(str::to_ascii_lowercase);
    for entry in codes::entries() {
        let shown = needle.as_deref().is_none_or(|needle| {
            [entry.code, entry.constraint, entry.name]
                .iter()
                .any(|field| field.to_ascii_lowercase().contains(needle))
        });
        if shown {
            writeln!(out, "{}  {}::{}", entry.code, entry.constraint, entry.name)?;
        }
    }
    Ok(())
}
