//! sbechat - chat-command bot for SBE chat
//!
//! Reads chat lines from stdin, answers `!` commands, and prints outbound messages to stdout.

mod commands;
mod config;
mod console;
mod transcript;

use anyhow::{Context, Result};
use clap::Parser;
use config::{BotConfig, DEFAULT_CONFIG_PATH};
use console::ConsoleInput;
use rand::{rngs::StdRng, SeedableRng};
use sbechat_core::{Outbound, SystemClock};
use sbechat_dispatch::{BotContext, Dispatcher};
use sbechat_stats::HttpStatsProvider;
use sbechat_store::Store;
use sbechat_templates::{load_catalog_or_empty, TemplateEngine};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use transcript::Transcript;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat-command bot for SBE chat", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Operator username; overrides the config file
    #[arg(short, long)]
    operator: Option<String>,

    /// Persistent store path; overrides the config file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Template catalog path; overrides the config file
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Append outbound messages to this JSONL file
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Seed the random source for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = BotConfig::load_from_path(&args.config);
    if let Some(operator) = args.operator {
        cfg.dispatch.operator = operator;
    }
    if let Some(path) = args.store {
        cfg.store_path = path;
    }
    if let Some(path) = args.templates {
        cfg.templates_path = path;
    }
    if let Some(path) = args.transcript {
        cfg.transcript_path = Some(path);
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }

    if args.write_config {
        cfg.save_to_path(&args.config)?;
        info!("Wrote {}", args.config.display());
        return Ok(());
    }

    info!("Starting sbechat v{}", env!("CARGO_PKG_VERSION"));
    if cfg.dispatch.operator.trim().is_empty() {
        warn!("No operator configured; meow tracking and achievements are inactive");
    }

    let store = Store::open(&cfg.store_path);
    let templates = TemplateEngine::new(load_catalog_or_empty(&cfg.templates_path));
    let stats = HttpStatsProvider::new(&cfg.stats).context("Invalid stats gateway settings")?;
    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut transcript = match &cfg.transcript_path {
        Some(path) => Some(Transcript::open(path)?),
        None => None,
    };

    let (outbox, mut rx) = sbechat_core::Outbox::channel();
    let ctx = BotContext::new(
        cfg.dispatch.clone(),
        store,
        templates,
        Arc::new(stats),
        outbox,
        Box::new(SystemClock),
        rng,
    );
    let mut dispatcher = Dispatcher::with_builtins(ctx);
    dispatcher.startup();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => handle_line(&mut dispatcher, &line),
                    None => break,
                }
            }
            Some(item) = rx.recv() => emit(&mut stdout, transcript.as_mut(), &item).await?,
        }
    }

    while let Ok(item) = rx.try_recv() {
        emit(&mut stdout, transcript.as_mut(), &item).await?;
    }
    info!("stdin closed; shutting down");
    Ok(())
}

fn handle_line(dispatcher: &mut Dispatcher, line: &str) {
    match console::parse_line(line) {
        ConsoleInput::Chat(event) => {
            let disposition = dispatcher.handle(&event);
            debug!(sender = %event.sender, ?disposition, "chat line");
        }
        ConsoleInput::Operator(input) => {
            let lines = match commands::parse_command(&input) {
                Ok(cmd) => commands::execute_command(dispatcher, cmd).lines,
                Err(err) => vec![err.to_string()],
            };
            let outbox = dispatcher.context().outbox();
            for line in lines {
                outbox.notice(line);
            }
        }
        ConsoleInput::Skip => {}
    }
}

async fn emit(
    stdout: &mut tokio::io::Stdout,
    transcript: Option<&mut Transcript>,
    item: &Outbound,
) -> Result<()> {
    let mut line = console::render(item);
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    if let Some(transcript) = transcript {
        if let Err(err) = transcript.record(item) {
            warn!("Failed to write transcript: {err:#}");
        }
    }
    Ok(())
}
