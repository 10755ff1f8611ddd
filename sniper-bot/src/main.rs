//! Sniper bot entry point.
//!
//! Commands:
//! - `run` — the full bot: analysis scheduler, trade monitor, Telegram
//!   command poller, and the liveness HTTP endpoint
//! - `analyse` — a single forced analysis cycle, for smoke-testing a
//!   deployment

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sniper_bot::binance::BinanceFeed;
use sniper_bot::config::{BotConfig, Secrets};
use sniper_bot::engine::SniperEngine;
use sniper_bot::groq::GroqScorer;
use sniper_bot::health::spawn_health_server;
use sniper_bot::report;
use sniper_bot::telegram::{spawn_command_poller, Command as BotCommand, TelegramClient};
use sniper_core::sources::Notifier;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sniper-bot", about = "Crypto signal engine with paper-trade tracking")]
struct Cli {
    /// Path to the TOML config file. Missing file means defaults.
    #[arg(long, default_value = "sniper.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: schedulers, Telegram poller, health endpoint.
    Run,
    /// Run one forced analysis cycle and exit.
    Analyse,
}

type Engine = SniperEngine<BinanceFeed, BinanceFeed, GroqScorer, TelegramClient>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let secrets = Secrets::from_env();

    let (engine, telegram) = build_engine(config, &secrets)?;
    let engine = Arc::new(engine);

    match cli.command {
        Commands::Analyse => {
            engine.analysis_cycle(true);
            Ok(())
        }
        Commands::Run => run(engine, telegram),
    }
}

fn build_engine(config: BotConfig, secrets: &Secrets) -> Result<(Engine, TelegramClient)> {
    let (Some(token), Some(chat_id)) = (
        secrets.telegram_token.clone(),
        secrets.telegram_chat_id.clone(),
    ) else {
        bail!("missing Telegram credentials: set TG_TOKEN and TG_CHAT_ID");
    };
    let telegram = TelegramClient::new(token, chat_id);

    let scorer = match &secrets.groq_api_key {
        Some(key) => Some(GroqScorer::new(key.clone(), config.groq_model.clone())),
        None => {
            tracing::warn!("GROQ_API_KEY not set; advisory gate disabled");
            None
        }
    };

    let engine = SniperEngine::new(
        BinanceFeed::new(),
        BinanceFeed::new(),
        scorer,
        telegram.clone(),
        config,
    );
    Ok((engine, telegram))
}

fn run(engine: Arc<Engine>, telegram: TelegramClient) -> Result<()> {
    let config = engine.config().clone();
    tracing::info!(
        symbol = %config.symbol,
        interval = %config.interval,
        analysis_interval_secs = config.analysis_interval_secs,
        "starting sniper bot"
    );

    telegram.publish(&report::startup(
        &config.symbol,
        &config.interval,
        config.analysis_interval_secs,
    ));

    // Analysis scheduler
    let analysis_engine = Arc::clone(&engine);
    let analysis_interval = Duration::from_secs(config.analysis_interval_secs);
    thread::Builder::new()
        .name("sniper-analysis".into())
        .spawn(move || loop {
            analysis_engine.analysis_cycle(false);
            thread::sleep(analysis_interval);
        })
        .expect("failed to spawn analysis thread");

    // Open-trade monitor
    let monitor_engine = Arc::clone(&engine);
    let monitor_interval = Duration::from_secs(config.monitor_interval_secs);
    thread::Builder::new()
        .name("sniper-monitor".into())
        .spawn(move || loop {
            monitor_engine.monitor_cycle();
            thread::sleep(monitor_interval);
        })
        .expect("failed to spawn monitor thread");

    // Telegram command poller
    let command_engine = Arc::clone(&engine);
    spawn_command_poller(telegram, move |command| match command {
        BotCommand::Start => report::help(),
        BotCommand::Analyse => {
            command_engine.analysis_cycle(true);
            "Forced analysis complete; report delivered.".to_string()
        }
        BotCommand::Status => command_engine.status_message(),
        BotCommand::Stats => command_engine.stats_message(),
    });

    // Liveness endpoint keeps the hosting platform happy; it also keeps
    // this thread parked for the lifetime of the process.
    let handle = spawn_health_server(config.health_port, engine.state_handle());
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("health server thread panicked"))?;
    Ok(())
}
