//! CLI module for Dropdeck
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `resolve`: Print the bundle of one screen and language
//! - `migrate`: Copy normalized dropdown content into JSONB documents
//! - `flags`: Show which dropdown source is active

use crate::server::config::AppConfig;
use clap::{Parser, Subcommand};

pub mod flags;
pub mod migrate;
pub mod resolve;

/// Dropdeck dropdown service CLI
#[derive(Parser, Debug)]
#[command(name = "dropdeck")]
#[command(about = "Localized dropdown configuration service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Resolve the dropdowns of a screen and print them as JSON
    Resolve {
        /// Screen location, e.g. mortgage_step1
        screen: String,
        /// Language code
        #[arg(default_value = "en")]
        language: String,
        /// Read dropdown_configs regardless of the configured switch
        #[arg(long, conflicts_with = "normalized")]
        jsonb: bool,
        /// Read content_items/content_translations regardless of the switch
        #[arg(long)]
        normalized: bool,
    },
    /// Migrate normalized dropdown content to dropdown_configs
    Migrate {
        /// Only this screen (all screens with dropdown content otherwise)
        #[arg(long)]
        screen: Option<String>,
        /// Build documents without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the dropdown source switch
    Flags,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => crate::server::run(config).await,
        Some(Commands::Resolve {
            screen,
            language,
            jsonb,
            normalized,
        }) => {
            let force = resolve::forced_representation(jsonb, normalized);
            resolve::run(&config, &screen, &language, force).await
        }
        Some(Commands::Migrate { screen, dry_run }) => {
            migrate::run(&config, screen.as_deref(), dry_run).await
        }
        Some(Commands::Flags) => flags::run(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_means_serve() {
        let cli = Cli::parse_from(["dropdeck"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_resolve_arguments() {
        let cli = Cli::parse_from(["dropdeck", "resolve", "mortgage_step1", "he", "--jsonb"]);
        match cli.command {
            Some(Commands::Resolve {
                screen,
                language,
                jsonb,
                normalized,
            }) => {
                assert_eq!(screen, "mortgage_step1");
                assert_eq!(language, "he");
                assert!(jsonb);
                assert!(!normalized);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_representations_rejected() {
        let result = Cli::try_parse_from([
            "dropdeck",
            "resolve",
            "mortgage_step1",
            "--jsonb",
            "--normalized",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_migrate_arguments() {
        let cli = Cli::parse_from(["dropdeck", "migrate", "--screen", "mortgage_step2", "--dry-run"]);
        match cli.command {
            Some(Commands::Migrate { screen, dry_run }) => {
                assert_eq!(screen.as_deref(), Some("mortgage_step2"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
