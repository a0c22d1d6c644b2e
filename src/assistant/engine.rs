//! Assistant engine: routes inbound messages, runs the resulting actions and
//! owns the session sweeper.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::assistant::lexicon;
use crate::assistant::maps;
use crate::assistant::normalize::{self, CanonicalPost};
use crate::assistant::notion::NotionClient;
use crate::assistant::openai::OpenAiClient;
use crate::assistant::patterns::Platform;
use crate::assistant::router::Action;
use crate::assistant::scrape::ApifyClient;
use crate::assistant::session::{self, SessionStore, SWEEP_INTERVAL_SECS};
use crate::assistant::summary;
use crate::assistant::telegram::TelegramClient;
use crate::assistant::transcript;
use crate::assistant::webpage;

const LANGUAGE_MENU_TEXT: &str =
    "🌐 已進入翻譯模式！\n請選擇目標語言，或直接輸入語言名稱。\n（輸入「取消」可隨時離開）";
const LEAVE_MODE_TEXT: &str = "已離開翻譯模式 👋";
const CANCEL_TEXT: &str = "已取消 👋";
const ASK_SCRAPE_COUNT_TEXT: &str = "請問要爬取幾篇貼文？（1-20）";
const MODE_TIMEOUT_TEXT: &str = "⏰ 翻譯模式已逾時，已自動離開。";
const UNSUPPORTED_SCRAPE_TEXT: &str = "❌ 目前只支援爬取 Facebook 粉絲專頁的貼文連結。";
const VOICE_REJECTED_TEXT: &str = "⚠️ 無法辨識這段語音，請再試一次。";

/// The assistant engine. Collaborator clients are optional so the bot can
/// run with a partial config; unconfigured features reply with a fixed
/// notice instead of erroring.
pub struct AssistantEngine {
    telegram: Arc<TelegramClient>,
    sessions: Arc<SessionStore>,
    openai: Option<Arc<OpenAiClient>>,
    apify: Option<Arc<ApifyClient>>,
    notion: Option<Arc<NotionClient>>,
    http: reqwest::Client,
}

impl AssistantEngine {
    pub fn new(
        telegram: Arc<TelegramClient>,
        openai: Option<OpenAiClient>,
        apify: Option<ApifyClient>,
        notion: Option<NotionClient>,
    ) -> Self {
        Self {
            telegram,
            sessions: Arc::new(SessionStore::new()),
            openai: openai.map(Arc::new),
            apify: apify.map(Arc::new),
            notion: notion.map(Arc::new),
            http: reqwest::Client::new(),
        }
    }

    /// Spawn the background task that expires stale sessions and notifies
    /// their users. Notification is best-effort.
    pub fn start_sweeper(&self) {
        let sessions = self.sessions.clone();
        let telegram = self.telegram.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let evicted = session::sweep_expired(&sessions, Utc::now()).await;
                for user_id in evicted {
                    info!("⏰ Session expired for user {user_id}");
                    // Best-effort; the client logs delivery failures.
                    let _ = telegram.send_message(user_id, MODE_TIMEOUT_TEXT, None).await;
                }
            }
        });
    }

    /// Handle one inbound text message.
    pub async fn handle_text(&self, user_id: i64, chat_id: i64, message_id: i64, text: &str) {
        let preview: String = text.chars().take(50).collect();
        info!("📨 {user_id}: \"{preview}\"");

        let action = self.sessions.dispatch(user_id, text, Utc::now()).await;
        self.run_action(chat_id, message_id, action).await;
    }

    /// Handle one inbound voice message.
    pub async fn handle_voice(&self, chat_id: i64, message_id: i64, file_id: &str) {
        info!("🎤 Voice message in chat {chat_id}");

        let Some(openai) = &self.openai else {
            self.reply(chat_id, message_id, "語音辨識功能未設定，請改用文字訊息。").await;
            return;
        };

        let audio = match self.telegram.download_voice(file_id).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Voice download failed: {e}");
                self.reply(chat_id, message_id, "❌ 下載語音失敗，請再試一次。").await;
                return;
            }
        };

        match openai.transcribe(audio, "voice.ogg").await {
            Ok(text) if transcript::is_hallucination(&text) => {
                info!("🎤 Transcript rejected as hallucination");
                self.reply(chat_id, message_id, VOICE_REJECTED_TEXT).await;
            }
            Ok(text) => {
                self.reply(chat_id, message_id, &format!("🎤 語音內容：\n{text}")).await;
            }
            Err(e) => {
                warn!("Transcription failed: {e}");
                self.reply(chat_id, message_id, "❌ 語音辨識失敗，請再試一次。").await;
            }
        }
    }

    async fn run_action(&self, chat_id: i64, message_id: i64, action: Action) {
        match action {
            Action::Silent => {}
            Action::ShowLanguageMenu => {
                let buttons: Vec<&str> = lexicon::QUICK_REPLY_LANGUAGES
                    .iter()
                    .map(|(label, _)| *label)
                    .collect();
                let _ = self
                    .telegram
                    .send_with_keyboard(chat_id, LANGUAGE_MENU_TEXT, &buttons)
                    .await;
            }
            Action::PromptForContent { label } => {
                self.reply(
                    chat_id,
                    message_id,
                    &format!("好的，接下來的訊息都會翻譯成{label}。\n（輸入「取消」可離開翻譯模式）"),
                )
                .await;
            }
            Action::LeaveTranslateMode => {
                self.reply(chat_id, message_id, LEAVE_MODE_TEXT).await;
            }
            Action::AcknowledgeCancel => {
                self.reply(chat_id, message_id, CANCEL_TEXT).await;
            }
            Action::Translate { text, language, in_mode } => {
                self.do_translate(chat_id, message_id, &text, &language, in_mode).await;
            }
            Action::AskScrapeCount => {
                self.reply(chat_id, message_id, ASK_SCRAPE_COUNT_TEXT).await;
            }
            Action::Scrape { url, platform, count } => {
                self.spawn_scrape(chat_id, message_id, url, platform, count);
            }
            Action::AnalyzeSocialPost { url, platform } => {
                self.spawn_post_analysis(chat_id, message_id, url, platform);
            }
            Action::AnalyzeMapPlace { url } => {
                self.do_map_place(chat_id, message_id, &url).await;
            }
            Action::SummarizeWebpage { url } => {
                self.do_webpage(chat_id, message_id, &url).await;
            }
            Action::SummarizeText { text } => {
                self.do_text_summary(chat_id, message_id, &text).await;
            }
            Action::UnsupportedScrapeTarget => {
                self.reply(chat_id, message_id, UNSUPPORTED_SCRAPE_TEXT).await;
            }
        }
    }

    /// Send failures are logged by the Telegram client; callers only decide
    /// the reply shape.
    async fn reply(&self, chat_id: i64, message_id: i64, text: &str) {
        let _ = self.telegram.send_message(chat_id, text, Some(message_id)).await;
    }

    /// Push without a reply target, for results of long-running scrapes
    /// whose triggering message may be far up the chat by the time they
    /// finish.
    async fn push(&self, chat_id: i64, text: &str) {
        let _ = self.telegram.send_message(chat_id, text, None).await;
    }

    async fn do_translate(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        language: &str,
        in_mode: bool,
    ) {
        let Some(openai) = &self.openai else {
            self.reply(chat_id, message_id, "翻譯功能未設定，請先設定 OpenAI API key。").await;
            return;
        };

        match openai.translate(text, language).await {
            Ok(translated) => {
                let reply = if in_mode {
                    format!("🌐 翻譯結果（{language}）\n{translated}\n\n（輸入「取消」可離開翻譯模式）")
                } else {
                    format!("🌐 翻譯結果（{language}）\n{translated}")
                };
                self.reply(chat_id, message_id, &reply).await;
            }
            Err(e) => {
                warn!("Translation failed: {e}");
                self.reply(chat_id, message_id, "❌ 翻譯失敗，請稍後再試。").await;
            }
        }
    }

    async fn do_webpage(&self, chat_id: i64, message_id: i64, url: &str) {
        let Some(openai) = &self.openai else {
            self.reply(chat_id, message_id, "網頁摘要功能未設定，請先設定 OpenAI API key。").await;
            return;
        };

        let content = match webpage::fetch_webpage_content(&self.http, url).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Webpage fetch failed: {e}");
                self.reply(chat_id, message_id, &format!("❌ {e}")).await;
                return;
            }
        };

        match openai.summarize_webpage(&content).await {
            Ok(reply_text) => {
                self.reply(chat_id, message_id, &format!("🔗 網頁摘要\n\n{reply_text}")).await;
                self.save_parsed_summary(&reply_text, "網頁", url).await;
            }
            Err(e) => {
                warn!("Webpage summary failed: {e}");
                self.reply(chat_id, message_id, "❌ 摘要失敗，請稍後再試。").await;
            }
        }
    }

    async fn do_text_summary(&self, chat_id: i64, message_id: i64, text: &str) {
        let Some(openai) = &self.openai else {
            self.reply(chat_id, message_id, "摘要功能未設定，請先設定 OpenAI API key。").await;
            return;
        };

        match openai.summarize_text(text).await {
            Ok(reply_text) => {
                self.reply(chat_id, message_id, &format!("📝 文字摘要\n\n{reply_text}")).await;
                self.save_parsed_summary(&reply_text, "文字", "").await;
            }
            Err(e) => {
                warn!("Text summary failed: {e}");
                self.reply(chat_id, message_id, "❌ 摘要失敗，請稍後再試。").await;
            }
        }
    }

    async fn do_map_place(&self, chat_id: i64, message_id: i64, url: &str) {
        let (Some(openai), Some(apify)) = (&self.openai, &self.apify) else {
            self.reply(chat_id, message_id, "地點查詢功能未設定，請先設定 API keys。").await;
            return;
        };

        self.reply(chat_id, message_id, "🗺️ 正在查詢地點資訊，請稍候...").await;

        let place = match apify.scrape_map_place(url).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                self.push(chat_id, "❌ 找不到這個地點的資訊。").await;
                return;
            }
            Err(e) => {
                warn!("Map scrape failed: {e}");
                self.push(chat_id, "❌ 地點查詢失敗，請稍後再試。").await;
                return;
            }
        };

        let report = maps::format_place(&place);
        match openai.summarize_map_place(&report, url).await {
            Ok(reply_text) => {
                self.push(chat_id, &format!("{report}\n\n{reply_text}")).await;
                self.save_parsed_summary(&reply_text, "地點", url).await;
            }
            Err(e) => {
                warn!("Map summary failed: {e}");
                // The raw report is still useful on its own.
                self.push(chat_id, &report).await;
            }
        }
    }

    /// Single-post analysis runs detached; post scrapes take a while.
    fn spawn_post_analysis(&self, chat_id: i64, message_id: i64, url: String, platform: Platform) {
        let (Some(openai), Some(apify)) = (self.openai.clone(), self.apify.clone()) else {
            let telegram = self.telegram.clone();
            tokio::spawn(async move {
                let _ = telegram
                    .send_message(chat_id, "爬取功能未設定，請先設定 API keys。", Some(message_id))
                    .await;
            });
            return;
        };
        let telegram = self.telegram.clone();
        let notion = self.notion.clone();

        tokio::spawn(async move {
            let _ = telegram
                .send_message(
                    chat_id,
                    &format!("🔍 正在分析 {} 貼文，請稍候...", platform.display_name()),
                    Some(message_id),
                )
                .await;

            let items = match scrape_post(&apify, &url, platform).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Post scrape failed: {e}");
                    let _ = telegram.send_message(chat_id, "❌ 貼文爬取失敗，請稍後再試。", None).await;
                    return;
                }
            };

            let Some(raw) = items.first() else {
                let _ = telegram.send_message(chat_id, "❌ 找不到這則貼文的內容。", None).await;
                return;
            };

            let post = normalize::normalize_post(platform.as_str(), raw);
            match openai.summarize_social_post(&post, platform.as_str()).await {
                Ok(reply_text) => {
                    let _ = telegram.send_message(chat_id, &reply_text, None).await;
                    if let Some(notion) = notion {
                        save_social_summary(&notion, platform, &post, &reply_text, &url).await;
                    }
                }
                Err(e) => {
                    warn!("Post summary failed: {e}");
                    let _ = telegram.send_message(chat_id, "❌ 貼文摘要失敗，請稍後再試。", None).await;
                }
            }
        });
    }

    /// Multi-post page scrapes run detached as well. Each post gets its own
    /// summary message; one failing post does not abort the rest.
    fn spawn_scrape(
        &self,
        chat_id: i64,
        message_id: i64,
        url: String,
        platform: Platform,
        count: u32,
    ) {
        let (Some(openai), Some(apify)) = (self.openai.clone(), self.apify.clone()) else {
            let telegram = self.telegram.clone();
            tokio::spawn(async move {
                let _ = telegram
                    .send_message(chat_id, "爬取功能未設定，請先設定 API keys。", Some(message_id))
                    .await;
            });
            return;
        };
        let telegram = self.telegram.clone();
        let notion = self.notion.clone();

        tokio::spawn(async move {
            let _ = telegram
                .send_message(
                    chat_id,
                    &format!("🕷️ 開始爬取 {count} 篇貼文，完成後會逐篇摘要，請稍候..."),
                    Some(message_id),
                )
                .await;

            let items = match apify.scrape_facebook_posts(&url, count).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Page scrape failed: {e}");
                    let _ = telegram.send_message(chat_id, "❌ 爬取失敗，請稍後再試。", None).await;
                    return;
                }
            };

            if items.is_empty() {
                let _ = telegram.send_message(chat_id, "❌ 沒有爬到任何貼文。", None).await;
                return;
            }

            let total = items.len().min(count as usize);
            for (i, raw) in items.iter().take(total).enumerate() {
                let post = normalize::normalize_post(platform.as_str(), raw);
                match openai.summarize_social_post(&post, platform.as_str()).await {
                    Ok(reply_text) => {
                        let header = format!("📄 第 {}/{} 篇", i + 1, total);
                        let _ = telegram
                            .send_message(chat_id, &format!("{header}\n\n{reply_text}"), None)
                            .await;
                        if let Some(ref notion) = notion {
                            save_social_summary(notion, platform, &post, &reply_text, &url).await;
                        }
                    }
                    Err(e) => {
                        warn!("Summary of post {} failed: {e}", i + 1);
                        let _ = telegram
                            .send_message(chat_id, &format!("❌ 第 {}/{} 篇摘要失敗。", i + 1, total), None)
                            .await;
                    }
                }
            }

            let _ = telegram
                .send_message(chat_id, &format!("✅ 已完成 {total} 篇貼文的摘要。"), None)
                .await;
        });
    }

    /// Parse the model reply and persist it. Failures are already logged by
    /// the Notion client.
    async fn save_parsed_summary(&self, reply_text: &str, content_type: &str, source_url: &str) {
        let Some(notion) = &self.notion else {
            return;
        };
        let parsed = summary::parse_summary(reply_text);
        let title = if parsed.title.is_empty() {
            content_type.to_string()
        } else {
            parsed.title.clone()
        };
        notion
            .save_summary(
                &title,
                content_type,
                &parsed.category,
                &parsed.keywords,
                source_url,
                reply_text,
            )
            .await;
    }
}

async fn scrape_post(
    apify: &ApifyClient,
    url: &str,
    platform: Platform,
) -> Result<Vec<Value>, String> {
    match platform {
        Platform::Facebook => apify.scrape_facebook_post(url).await,
        Platform::Threads => apify.scrape_threads_post(url).await,
    }
}

async fn save_social_summary(
    notion: &NotionClient,
    platform: Platform,
    post: &CanonicalPost,
    reply_text: &str,
    url: &str,
) {
    let parsed = summary::parse_social_summary(reply_text);
    notion
        .save_social(
            platform.display_name(),
            &post.username,
            &parsed.summary,
            &parsed.keywords,
            post.likes,
            post.comments,
            post.shares,
            url,
            &post.text,
        )
        .await;
}
