mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::ScopeArgs;
use conceptscope::config::Config;
use conceptscope::time::WindowUnit;

#[derive(Parser)]
#[command(
    name = "conceptscope",
    version,
    about = "Concept trend analytics over a course knowledge graph",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a free-text query and extract its key terms
    Intent {
        /// Query text
        query: String,
    },

    /// Ranked concept frequencies in a window
    Frequency {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Concepts growing against the preceding window
    Trending {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Concepts new to a window
    Emerging {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Concept overlap across the given modules (two or more --module)
    Overlap {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Bucketed history of one concept
    Evolution {
        /// Concept id
        concept: String,

        /// Bucket size (day, week, month, semester)
        #[arg(short, long, default_value = "week")]
        granularity: WindowUnit,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Compare the concepts of two modules
    Compare {
        /// First module id
        module_a: String,

        /// Second module id
        module_b: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Report cache and graph health
    Health {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Also print Prometheus metrics
        #[arg(long, default_value = "false")]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = conceptscope::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    tracing::debug!(config = ?cli.config, "conceptscope starting");

    match cli.command {
        Commands::Intent { query } => {
            commands::intent(&query)?;
        }

        Commands::Frequency { scope } => {
            commands::frequency(&config, scope).await?;
        }

        Commands::Trending { scope } => {
            commands::trending(&config, scope).await?;
        }

        Commands::Emerging { scope } => {
            commands::emerging(&config, scope).await?;
        }

        Commands::Overlap { scope } => {
            commands::overlap(&config, scope).await?;
        }

        Commands::Evolution {
            concept,
            granularity,
            scope,
        } => {
            tracing::info!(
                concept = %concept,
                granularity = %granularity,
                "Starting evolution command"
            );
            commands::evolution(&config, concept, granularity, scope).await?;
        }

        Commands::Compare {
            module_a,
            module_b,
            scope,
        } => {
            tracing::info!(
                module_a = %module_a,
                module_b = %module_b,
                "Starting compare command"
            );
            commands::compare(&config, module_a, module_b, scope).await?;
        }

        Commands::Health { scope, metrics } => {
            commands::health(&config, scope, metrics).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("conceptscope=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("conceptscope={level},warn")))
    };

    // Logs go to stderr so stdout stays machine-readable JSON
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
