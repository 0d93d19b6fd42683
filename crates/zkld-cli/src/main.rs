//! # zkld CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkld_cli::diff::{run_diff, DiffArgs};
use zkld_cli::load_config;
use zkld_cli::prepare::{run_prepare, PrepareArgs};

/// Selective disclosure tooling for JSON-LD Verifiable Credentials.
///
/// Compares signed credentials with their redacted variants and prepares
/// the pseudonym maps and rewritten documents a proof engine consumes.
#[derive(Parser, Debug)]
#[command(name = "zkld", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML transform configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diff an original credential against its disclosed variant.
    Diff(DiffArgs),

    /// Diff, rewrite, and merge the pseudonym maps of several credential pairs.
    Prepare(PrepareArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Diff(args) => run_diff(args, &config),
        Commands::Prepare(args) => run_prepare(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_diff() {
        let cli = Cli::try_parse_from([
            "zkld",
            "diff",
            "--original",
            "vc.json",
            "--disclosed",
            "d.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff(args) => {
                assert_eq!(args.original, PathBuf::from("vc.json"));
                assert_eq!(args.disclosed, PathBuf::from("d.json"));
            }
            other => panic!("expected diff, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_repeated_pairs() {
        let cli = Cli::try_parse_from([
            "zkld", "prepare", "--pair", "a.json", "b.json", "--pair", "c.json", "d.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Prepare(args) => {
                let names: Vec<_> = args
                    .pair
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect();
                assert_eq!(names, ["a.json", "b.json", "c.json", "d.json"]);
            }
            other => panic!("expected prepare, got {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_half_pair() {
        assert!(Cli::try_parse_from(["zkld", "prepare", "--pair", "a.json"]).is_err());
    }

    #[test]
    fn cli_requires_a_pair() {
        assert!(Cli::try_parse_from(["zkld", "prepare"]).is_err());
    }

    #[test]
    fn cli_verbosity_and_config_are_global() {
        let cli = Cli::try_parse_from([
            "zkld",
            "diff",
            "-vv",
            "--config",
            "zkld.yaml",
            "--original",
            "a.json",
            "--disclosed",
            "b.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("zkld.yaml")));
    }
}
