//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for listing the cards of one container.
#[derive(Debug, Args)]
pub struct CardsCommand {
    /// Container label, e.g. SD1
    pub container: String,

    /// Which cards to show
    #[arg(short, long, value_enum, default_value = "all")]
    pub status: StatusFilter,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for checking out a batch of cards.
#[derive(Debug, Args)]
pub struct CheckoutCommand {
    /// Card labels, e.g. SD1-3 SD1-4
    #[arg(required = true)]
    pub labels: Vec<String>,

    /// Who takes the cards
    #[arg(short, long)]
    pub borrower: String,

    /// Equipment the cards go into
    #[arg(short, long)]
    pub equipment: String,

    /// Free-form note
    #[arg(short, long, default_value = "")]
    pub note: String,
}

/// Arguments for returning one card.
#[derive(Debug, Args)]
pub struct ReturnCommand {
    /// Card label, e.g. SD2-7
    pub label: String,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Card status filter for `cards`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    /// Cards on the shelf
    Available,
    /// Cards with a borrower
    CheckedOut,
    /// Every card
    #[default]
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_default() {
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }

    #[test]
    fn test_status_filter_value_names() {
        let names: Vec<String> = StatusFilter::value_variants()
            .iter()
            .filter_map(ValueEnum::to_possible_value)
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["available", "checked-out", "all"]);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
