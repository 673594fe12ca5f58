//! CLI for inspecting container artifact references.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod endpoint;

use anyhow::{Context, Result};
use artref::{Error, Reference};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "artref", version, about = "Parse container artifact references")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split one or more references into registry, repository, tag and digest.
    Parse {
        /// Artifact references (e.g., registry.example.com/ns/app:v1.0).
        #[arg(required = true, num_args = 1..)]
        references: Vec<String>,

        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Report whether each reference is syntactically valid.
    Check {
        /// Artifact references to validate.
        #[arg(required = true, num_args = 1..)]
        references: Vec<String>,
    },

    /// Print the registry manifest URL for a reference, filling in defaults.
    Endpoint(endpoint::EndpointArgs),

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for `parse`.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = cli.dispatch() {
        eprintln!("artref: {e:#}");
        std::process::exit(1);
    }
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        match self.command {
            Command::Parse { references, format } => parse(&references, format),
            Command::Check { references } => check(&references),
            Command::Endpoint(args) => args.run(),
            Command::Completion { shell } => {
                let mut command = Self::command();
                clap_complete::generate(shell, &mut command, "artref", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}

/// Parses every reference, naming the offending input on failure.
fn parse_all(inputs: &[String]) -> Result<Vec<Reference>> {
    inputs
        .iter()
        .map(|input| Reference::parse(input).with_context(|| format!("cannot parse {input:?}")))
        .collect()
}

fn parse(inputs: &[String], format: OutputFormat) -> Result<()> {
    let references = parse_all(inputs)?;

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&to_json(&references))?);
        return Ok(());
    }

    println!("{:<30} {:<40} {:<20} {}", "REGISTRY", "REPOSITORY", "TAG", "DIGEST");
    for r in &references {
        println!(
            "{:<30} {:<40} {:<20} {}",
            r.registry().unwrap_or("-"),
            r.repository(),
            r.tag().unwrap_or("-"),
            r.digest().unwrap_or("-")
        );
    }
    Ok(())
}

fn to_json(references: &[Reference]) -> serde_json::Value {
    references
        .iter()
        .map(|r| {
            serde_json::json!({
                "registry": r.registry(),
                "repository": r.repository(),
                "tag": r.tag(),
                "digest": r.digest(),
            })
        })
        .collect()
}

fn check(inputs: &[String]) -> Result<()> {
    let mut invalid = 0usize;
    for input in inputs {
        match Reference::parse(input) {
            Ok(_) => println!("{} {input}", "ok".green()),
            Err(Error::InvalidReferenceSyntax { reason, .. }) => {
                invalid += 1;
                println!("{} {input}: {reason}", "invalid".red());
            }
            Err(e) => return Err(e.into()),
        }
    }
    if invalid > 0 {
        anyhow::bail!("{invalid} of {} references are invalid", inputs.len());
    }
    Ok(())
}
