mod assistant;
mod config;

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use assistant::{ApifyClient, AssistantEngine, NotionClient, OpenAiClient, TelegramClient};
use config::Config;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "digesto.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("digesto.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting digesto...");
    info!("Loaded config from {config_path}");
    if config.openai_api_key.is_none() {
        warn!("No OpenAI API key; translation, summaries and transcription disabled");
    }
    if config.apify_api_token.is_none() {
        warn!("No Apify token; scraping disabled");
    }
    if config.notion.is_none() {
        info!("No Notion config; summaries will not be persisted");
    }

    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    let openai = config.openai_api_key.clone().map(OpenAiClient::new);
    let apify = config.apify_api_token.clone().map(ApifyClient::new);
    let notion = config
        .notion
        .clone()
        .map(|(key, db)| NotionClient::new(key, db));

    let engine = Arc::new(AssistantEngine::new(telegram, openai, apify, notion));
    engine.start_sweeper();

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, engine: Arc<AssistantEngine>) -> ResponseResult<()> {
    let user_id = match msg.from {
        Some(ref user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let chat_id = msg.chat.id.0;
    let message_id = msg.id.0 as i64;

    if let Some(voice) = msg.voice() {
        let file_id = voice.file.id.clone();
        engine.handle_voice(chat_id, message_id, &file_id.0).await;
        return Ok(());
    }

    if let Some(text) = msg.text() {
        engine.handle_text(user_id, chat_id, message_id, text).await;
    }

    Ok(())
}
