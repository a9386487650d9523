//! Command-line interface for sdstock.
//!
//! This module provides the CLI structure for the `sdstock` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CardsCommand, CheckoutCommand, ConfigCommand, ReturnCommand, StatusCommand, StatusFilter,
};

/// sdstock - Keep track of who has which SD card
///
/// Check cards out to borrowers in batches, take them back one at a time,
/// and list what is where. Without a subcommand an interactive session starts.
#[derive(Debug, Parser)]
#[command(name = "sdstock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive session (the default)
    Interactive,

    /// List container labels
    Containers,

    /// List the cards in a container
    Cards(CardsCommand),

    /// Check out a batch of cards
    Checkout(CheckoutCommand),

    /// Return a checked-out card
    Return(ReturnCommand),

    /// Seed the card table if it is empty
    Seed,

    /// Show database and per-container counts
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: None,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "sdstock");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Debug);
        assert_eq!(cli(5, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_without_command() {
        let cli = Cli::try_parse_from(["sdstock"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_cards() {
        let cli =
            Cli::try_parse_from(["sdstock", "cards", "SD1", "--status", "checked-out", "--json"])
                .unwrap();
        match cli.command {
            Some(Command::Cards(cmd)) => {
                assert_eq!(cmd.container, "SD1");
                assert_eq!(cmd.status, StatusFilter::CheckedOut);
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_checkout() {
        let cli = Cli::try_parse_from([
            "sdstock",
            "checkout",
            "SD1-1",
            "SD1-2",
            "--borrower",
            "Alice",
            "--equipment",
            "CamA",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Checkout(cmd)) => {
                assert_eq!(cmd.labels, vec!["SD1-1", "SD1-2"]);
                assert_eq!(cmd.borrower, "Alice");
                assert_eq!(cmd.note, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_checkout_requires_labels() {
        let result = Cli::try_parse_from(["sdstock", "checkout", "-b", "Alice", "-e", "CamA"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_return() {
        let cli = Cli::try_parse_from(["sdstock", "return", "SD2-7"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Return(ref r)) if r.label == "SD2-7"));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["sdstock", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let args = vec!["sdstock", "-vv", "containers"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["sdstock", "config", "validate", "-f", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Validate { file: Some(_) }))
        ));
    }
}
