// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Triage - routes each chat message to the persona best suited to answer it.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;

/// Triage - routes each chat message to the persona best suited to answer it.
#[derive(Parser, Debug)]
#[command(name = "triage", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this TOML file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Chat,
    /// Send a single message and print the reply.
    Ask {
        /// Message text.
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Classify a message without generating a reply.
    Classify {
        /// Message text.
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// List the registered personas.
    Personas,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => triage_config::load_and_validate_path(path),
        None => triage_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            triage_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat) => shell::run_shell(config).await,
        Some(Commands::Ask { text }) => commands::run_ask(&config, &text.join(" ")).await,
        Some(Commands::Classify { text }) => {
            commands::run_classify(&config, &text.join(" ")).await
        }
        Some(Commands::Personas) => commands::run_personas(&config).await,
        Some(Commands::Config) => commands::run_config(&config),
        None => {
            println!("triage: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Installs the stderr tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("triage={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_multi_word_messages() {
        let cli = Cli::try_parse_from(["triage", "ask", "Help", "me", "plan"]).unwrap();
        match cli.command {
            Some(Commands::Ask { text }) => assert_eq!(text.join(" "), "Help me plan"),
            other => panic!("expected ask, got {other:?}"),
        }
    }

    #[test]
    fn cli_accepts_global_config_flag() {
        let cli =
            Cli::try_parse_from(["triage", "classify", "--config", "/tmp/t.toml", "hi"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(cli.command, Some(Commands::Classify { .. })));
    }

    #[test]
    fn cli_requires_message_text() {
        assert!(Cli::try_parse_from(["triage", "ask"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = triage_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "triage");
    }
}
