//! PromptShield - Defensive policy engine for prompt and command injection
//!
//! Command-line front end over the policy engine: evaluate commands,
//! sanitize external content, classify and verify memory, and inspect the
//! audit trail of a single invocation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use promptshield::{
    memory::verify_before_use,
    shield::Shield,
    ShieldConfig,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "promptshield")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Defensive policy engine for prompt and command injection")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROMPTSHIELD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a command against the policy (nonzero exit when blocked)
    Check {
        /// The command string to evaluate
        command: String,

        /// Source of the command
        #[arg(short, long, default_value = "user")]
        source: String,
    },

    /// Sanitize externally sourced content
    Sanitize {
        /// The content to sanitize
        content: String,

        /// Source of the content
        #[arg(short, long, default_value = "unknown")]
        source: String,
    },

    /// Classify memory content by trust
    Classify {
        /// The memory content to classify
        memory: String,

        /// Source of the memory
        #[arg(short, long, default_value = "unknown")]
        source: String,
    },

    /// Classify memory content, then run the verification gate over it
    Verify {
        /// The memory content to verify
        memory: String,

        /// Source of the memory
        #[arg(short, long, default_value = "unknown")]
        source: String,
    },

    /// Show engine counters and the alert summary
    Stats,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("promptshield={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ShieldConfig::load(path)?,
        None => ShieldConfig::default(),
    };

    match cli.command {
        Commands::Check { command, source } => {
            let shield = Shield::new(config)?;
            let decision = shield.evaluate_command(&command, &source);
            if let Some(alert) = &decision.alert {
                println!("{}", alert);
            }
            if decision.allowed {
                println!("allowed");
            } else {
                println!("blocked");
                std::process::exit(1);
            }
        }

        Commands::Sanitize { content, source } => {
            let shield = Shield::new(config)?;
            println!("{}", shield.sanitize_content(&content, &source));
        }

        Commands::Classify { memory, source } => {
            let shield = Shield::new(config)?;
            let record = shield.classify_memory(&memory, &source);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Verify { memory, source } => {
            let shield = Shield::new(config)?;
            let record = shield.classify_memory(&memory, &source);
            let gate = verify_before_use(&record);
            let detection = shield.verify_memory(&record);

            println!("{}", serde_json::to_string_pretty(&gate)?);
            if !detection.safe {
                if let Some(alert) = &detection.alert {
                    println!("{}", promptshield::audit::format_human(alert));
                }
                std::process::exit(1);
            }
        }

        Commands::Stats => {
            let shield = Shield::new(config)?;
            println!("{}", serde_json::to_string_pretty(&shield.get_stats())?);
        }

        Commands::Config { default } => {
            let shown = if default {
                ShieldConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}
