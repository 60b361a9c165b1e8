//! Reactree CLI - export component-tree snapshots as cycle-free JSON.
//!
//! # Commands
//!
//! - `reactree init` - Initialize a new configuration file
//! - `reactree dump` - Serialize a snapshot fixture to `data.json`
//!
//! # Usage
//!
//! ```bash
//! # Write data.json from a snapshot, starting at root.current
//! reactree dump snapshot.json
//!
//! # Print the whole snapshot as a data URI
//! reactree dump snapshot.json --no-entry --data-uri --stdout
//! ```

use clap::{ArgAction, Parser, Subcommand};
use reactree_cli::commands::{self, DumpOptions, InitOptions};
use reactree_cli::{ReactreeError, output};
use tracing_subscriber::EnvFilter;

/// Reactree - export UI component trees as cycle-free JSON
#[derive(Parser)]
#[command(name = "reactree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new reactree.yaml configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short)]
        output: Option<String>,

        /// Overwrite existing configuration file
        #[arg(long, short)]
        force: bool,
    },

    /// Serialize a snapshot fixture with cycle pruning
    Dump {
        /// Snapshot fixture (JSON with $ref/$fn/$opaque markers)
        fixture: String,

        /// Path to the configuration file
        #[arg(long, short)]
        config: Option<String>,

        /// Export file (default: data.json)
        #[arg(long, short, conflicts_with = "stdout")]
        output: Option<String>,

        /// Write the payload to stdout instead of a file
        #[arg(long)]
        stdout: bool,

        /// Wrap the payload as a data:text/json URI
        #[arg(long)]
        data_uri: bool,

        /// Field of the snapshot root to export (default: current)
        #[arg(long, conflicts_with = "no_entry")]
        entry_field: Option<String>,

        /// Export the snapshot root itself
        #[arg(long)]
        no_entry: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Fail on functions outside the type-descriptor field
        #[arg(long)]
        strict_functions: bool,
    },
}

fn init_logging(verbose: u8) {
    // Logs go to stderr so a payload on stdout stays clean.
    let level = match verbose {
        0 => "warn",
        1 => "warn,reactree_cli=debug,reactree_graph=debug",
        _ => "warn,reactree_cli=trace,reactree_graph=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    output::set_verbosity(cli.verbose);
    output::set_quiet(cli.quiet);

    let result: Result<(), ReactreeError> = match cli.command {
        Commands::Init { output, force } => {
            commands::run_init(InitOptions { output, force }).map_err(ReactreeError::from)
        }
        Commands::Dump {
            fixture,
            config,
            output,
            stdout,
            data_uri,
            entry_field,
            no_entry,
            pretty,
            strict_functions,
        } => {
            let options = DumpOptions {
                fixture,
                config,
                output,
                stdout,
                data_uri,
                entry_field,
                no_entry,
                pretty,
                strict_functions,
            };
            commands::run_dump(options).map(|_| ())
        }
    };

    if let Err(e) = result {
        e.report();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dump_flags() {
        let cli = Cli::try_parse_from([
            "reactree",
            "-v",
            "dump",
            "snapshot.json",
            "--no-entry",
            "--data-uri",
            "--stdout",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Dump {
                fixture,
                no_entry,
                data_uri,
                stdout,
                ..
            } => {
                assert_eq!(fixture, "snapshot.json");
                assert!(no_entry && data_uri && stdout);
            }
            Commands::Init { .. } => panic!("expected dump"),
        }
    }

    #[test]
    fn test_output_conflicts_with_stdout() {
        let result = Cli::try_parse_from([
            "reactree",
            "dump",
            "snapshot.json",
            "--stdout",
            "--output",
            "x.json",
        ]);
        assert!(result.is_err());
    }
}
