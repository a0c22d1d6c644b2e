//! Assistant module - classifies Telegram messages and runs the matching
//! translation, scraping or summarization flow.

pub mod engine;
pub mod lexicon;
pub mod maps;
pub mod normalize;
pub mod notion;
pub mod openai;
pub mod patterns;
pub mod router;
pub mod scrape;
pub mod session;
pub mod summary;
pub mod telegram;
pub mod transcript;
pub mod webpage;

#[cfg(test)]
mod tests;

pub use engine::AssistantEngine;
pub use notion::NotionClient;
pub use openai::OpenAiClient;
pub use scrape::ApifyClient;
pub use telegram::TelegramClient;
