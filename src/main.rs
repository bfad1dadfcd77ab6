//! # Nudge — personal reminder bot
//!
//! Reads a weekly JSON schedule, tracks subscriber chats, and pushes
//! due-task reminders to Telegram on a one-minute tick.
//!
//! Usage:
//!   nudge                      # run with ~/.nudge/config.toml
//!   nudge --config ./dev.toml  # explicit config file
//!   nudge --port 8080          # override the gateway port

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing_subscriber::EnvFilter;

use nudge_bot::CommandHandler;
use nudge_channels::{TelegramChannel, TelegramConfig};
use nudge_core::NudgeConfig;
use nudge_core::traits::Channel;
use nudge_core::types::IncomingMessage;
use nudge_gateway::AppState;
use nudge_scheduler::{EngineOptions, ReminderEngine, run_reminder_loop};
use nudge_store::{ScheduleStore, SubscriberStore};

#[derive(Parser)]
#[command(name = "nudge", version, about = "🔔 Nudge — personal Telegram reminder bot")]
struct Cli {
    /// Config file (default: ~/.nudge/config.toml, or $NUDGE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the gateway port
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "nudge=debug,tower_http=debug"
    } else {
        "nudge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .or_else(|| std::env::var("NUDGE_CONFIG").map(PathBuf::from).ok())
        .unwrap_or_else(NudgeConfig::default_path);
    let mut config = if config_path.exists() {
        NudgeConfig::load_from(&config_path)?
    } else {
        NudgeConfig::default()
    };
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let bot_token = config.telegram.token();
    if bot_token.is_empty() {
        anyhow::bail!(
            "no bot token: set NUDGE_BOT_TOKEN or [telegram].bot_token in {}",
            config_path.display()
        );
    }

    let tz: chrono_tz::Tz = config.scheduler.timezone.parse().map_err(|_| {
        anyhow::anyhow!(
            "invalid timezone '{}' (IANA name expected)",
            config.scheduler.timezone
        )
    })?;

    let data_dir = config.storage.data_dir();
    let schedule = ScheduleStore::new(&data_dir);
    let subscribers = SubscriberStore::new(&data_dir);
    tracing::info!(
        "📂 Data dir: {} ({} subscriber(s))",
        data_dir.display(),
        subscribers.load().len()
    );

    let telegram_config = TelegramConfig {
        bot_token: bot_token.clone(),
        poll_interval: config.telegram.poll_interval,
    };
    let mut telegram = TelegramChannel::new(telegram_config.clone());
    telegram.connect().await.context("Telegram connect failed")?;
    // separate instance for outbound sends; the polling variant consumes the first
    let sender = Arc::new(TelegramChannel::new(telegram_config));

    // One inbound pipeline for both delivery modes.
    let (updates_tx, updates_rx) = tokio::sync::mpsc::unbounded_channel::<IncomingMessage>();
    let mut inbound: Box<dyn Stream<Item = IncomingMessage> + Send + Unpin> =
        match config.telegram.mode.as_str() {
            "polling" => {
                if let Err(e) = telegram.delete_webhook().await {
                    tracing::warn!("⚠️ deleteWebhook failed: {e}");
                }
                tracing::info!("📡 Delivery mode: long polling");
                Box::new(telegram.start_polling())
            }
            "webhook" => {
                let base = config.telegram.webhook_url.trim_end_matches('/').to_string();
                if base.is_empty() {
                    anyhow::bail!("webhook mode needs [telegram].webhook_url");
                }
                telegram
                    .set_webhook(&format!("{base}/webhook/bot/{bot_token}"))
                    .await
                    .context("setWebhook failed")?;
                tracing::info!("📡 Delivery mode: webhook via {base}");
                Box::new(UnboundedReceiverStream::new(updates_rx))
            }
            other => anyhow::bail!("unknown delivery mode '{other}' (use \"polling\" or \"webhook\")"),
        };

    // Command pipeline.
    let handler = CommandHandler::new(schedule.clone(), subscribers.clone(), tz);
    let reply_sender = sender.clone();
    tokio::spawn(async move {
        while let Some(message) = inbound.next().await {
            let Some(reply) = handler.handle(&message) else {
                continue;
            };
            if let Err(e) = reply_sender.send_message(message.chat_id, &reply).await {
                tracing::error!("❌ Reply to {} failed: {e}", message.chat_id);
            }
        }
        tracing::warn!("📴 Inbound message stream ended");
    });

    // Notification loop.
    let engine = Arc::new(tokio::sync::Mutex::new(ReminderEngine::new(
        schedule.clone(),
        subscribers.clone(),
        EngineOptions {
            reset_time: config.scheduler.reset_time.clone(),
            lead_minutes: config.scheduler.lead_minutes,
        },
    )));
    tokio::spawn(run_reminder_loop(
        engine,
        sender.clone(),
        tz,
        config.scheduler.tick_interval_secs,
    ));

    // Gateway: /health for uptime checks, webhook inbound in webhook mode.
    let state = AppState {
        start_time: std::time::Instant::now(),
        delivery_mode: config.telegram.mode.clone(),
        bot_token,
        schedule,
        subscribers,
        updates_tx,
    };
    nudge_gateway::start(&config.gateway, state).await
}
