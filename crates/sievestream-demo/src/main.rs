//! Command-line demo for sievestream
//!
//! Wires a rule set and a fragment source into the sanitizing pipeline;
//! contains no matching logic of its own.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use sievestream_core::StreamHistory;
use sievestream_engine::{
    actions, sanitize, sanitize_stream, KeywordRegistry, OutputMode, PipelineConfig, RuleSet,
};

#[derive(Parser, Debug)]
#[command(name = "sievestream-demo")]
#[command(author, version, about = "Sanitize a text stream with keyword rules")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitize stdin line by line with a YAML rule set
    Run {
        /// Rule file path
        #[arg(short, long)]
        rules: String,

        /// Output granularity
        #[arg(short, long, default_value = "chunk")]
        mode: OutputMode,

        /// Disable history recording
        #[arg(long)]
        no_history: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Play a built-in sample stream through the async pipeline
    Sample {
        /// Output granularity
        #[arg(short, long, default_value = "token")]
        mode: OutputMode,

        /// Delay between emitted units, in milliseconds
        #[arg(short, long, default_value = "150")]
        delay_ms: u64,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            rules,
            mode,
            no_history,
            verbose,
        } => {
            init_logging(verbose);
            run_stdin(&rules, mode, !no_history)
        }
        Commands::Sample {
            mode,
            delay_ms,
            verbose,
        } => {
            init_logging(verbose);
            run_sample(mode, delay_ms).await
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_stdin(rules_path: &str, mode: OutputMode, record_history: bool) -> anyhow::Result<()> {
    let rules = RuleSet::from_file(rules_path)
        .with_context(|| format!("loading rule set from {rules_path}"))?;
    let registry = Arc::new(rules.compile()?);
    tracing::info!(rules = %rules_path, keywords = registry.len(), "sanitizing stdin");

    let config = PipelineConfig {
        mode,
        record_history,
        ..PipelineConfig::default()
    };
    let stdin = std::io::stdin();
    let fragments = stdin.lock().lines().map_while(|line| match line {
        Ok(mut l) => {
            l.push('\n');
            Some(l)
        }
        Err(_) => None,
    });

    let mut pipeline = sanitize(registry, fragments, config)?;
    let mut stdout = std::io::stdout().lock();
    for unit in pipeline.by_ref() {
        write!(stdout, "{}", unit?)?;
        stdout.flush()?;
    }
    if pipeline.is_halted() {
        tracing::info!("stream halted by rule");
    }
    log_summary(pipeline.history());
    Ok(())
}

async fn run_sample(mode: OutputMode, delay_ms: u64) -> anyhow::Result<()> {
    let mut registry = KeywordRegistry::new();
    registry.register("secret", actions::replace("[REDACTED]"))?;
    registry.register("halt", actions::halt())?;

    let fragments = futures::stream::iter(
        [
            "This is a secret message. ",
            "Now we will halt the stream here.",
            "You should not see this.",
        ]
        .map(String::from),
    );

    let config = PipelineConfig {
        mode,
        ..PipelineConfig::default()
    };
    let mut pipeline = sanitize_stream(Arc::new(registry), fragments, config)?;

    let mut stdout = std::io::stdout().lock();
    while let Some(unit) = pipeline.next().await {
        write!(stdout, "{}", unit?)?;
        stdout.flush()?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    println!();
    if pipeline.is_halted() {
        tracing::info!("stream halted by rule");
    }
    log_summary(pipeline.history());
    Ok(())
}

fn log_summary(history: &StreamHistory) {
    for record in history.actions() {
        tracing::debug!(
            keyword = %record.keyword,
            start = record.start,
            end = record.end,
            decision = ?record.decision,
            "rule applied"
        );
    }
}
