//! OpenAI API client: chat completions for translation and summarization,
//! Whisper for voice transcription.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assistant::normalize::CanonicalPost;

const CHAT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TRANSCRIPTION_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const CHAT_MODEL: &str = "gpt-4o-mini";
const TRANSCRIPTION_MODEL: &str = "whisper-1";

pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, String> {
        let request = ChatRequest {
            model: CHAT_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(CHAT_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        debug!("OpenAI chat response status: {status}");

        if !status.is_success() {
            return Err(format!("API error {status}: {body}"));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {e}"))?;

        if let Some(error) = parsed.error {
            return Err(format!("OpenAI error: {}", error.message));
        }

        let choices = parsed.choices.ok_or("No choices in response")?;
        let choice = choices.first().ok_or("Empty choices array")?;
        Ok(choice.message.content.trim().to_string())
    }

    /// Translate `text` into `language`.
    pub async fn translate(&self, text: &str, language: &str) -> Result<String, String> {
        info!("🌐 Translating into {language}");
        let system = format!(
            "你是專業翻譯。請將使用者提供的內容翻譯成{language}，只輸出譯文，不要任何說明。"
        );
        self.chat(&system, text).await
    }

    /// Summarize a cleaned webpage report into the labeled template.
    pub async fn summarize_webpage(&self, content: &str) -> Result<String, String> {
        info!("🔗 Summarizing webpage content ({} chars)", content.chars().count());
        let system = "你是內容整理助手。請用繁體中文整理以下網頁內容，依照這個格式輸出：\n\
                      🏷️ 分類：（科技/新聞/美食/旅遊/教育/娛樂/其他，擇一）\n\
                      📌 主題：（一句話的標題）\n\
                      🔑 關鍵字：（3-5 個，用、分隔）\n\
                      📝 摘要：（3-5 句重點摘要）";
        self.chat(system, content).await
    }

    /// Summarize free text into the same labeled template.
    pub async fn summarize_text(&self, text: &str) -> Result<String, String> {
        info!("📝 Summarizing free text ({} chars)", text.chars().count());
        let system = "你是內容整理助手。請用繁體中文整理使用者提供的文字，依照這個格式輸出：\n\
                      🏷️ 分類：（科技/新聞/美食/旅遊/教育/娛樂/其他，擇一）\n\
                      📌 主題：（一句話的標題）\n\
                      🔑 關鍵字：（3-5 個，用、分隔）\n\
                      📝 摘要：（3-5 句重點摘要）";
        self.chat(system, text).await
    }

    /// Summarize a map place report.
    pub async fn summarize_map_place(&self, report: &str, url: &str) -> Result<String, String> {
        info!("🗺️ Summarizing map place");
        let system = "你是地點整理助手。請用繁體中文整理這個地點的資訊，依照這個格式輸出：\n\
                      🏷️ 分類：地點\n\
                      📌 地點名稱：（店名或地點名）\n\
                      🔑 關鍵字：（3-5 個，用、分隔）\n\
                      📝 摘要：（特色、評價重點、適合的場合）";
        let user = format!("{report}\n\n來源：{url}");
        self.chat(system, &user).await
    }

    /// Summarize one normalized social post.
    pub async fn summarize_social_post(
        &self,
        post: &CanonicalPost,
        platform: &str,
    ) -> Result<String, String> {
        info!("📄 Summarizing {platform} post by {}", post.username);
        let system = "你是社群貼文整理助手。請用繁體中文整理這則貼文，依照這個格式輸出：\n\
                      帳號：（發文帳號）\n\
                      📝 摘要：（2-4 句重點摘要）\n\
                      🔑 關鍵字：（3-5 個，用、分隔）\n\
                      🎯 貼文類型：（推薦/心得/新聞/活動/廣告/其他，擇一）";
        let user = format!(
            "平台：{platform}\n帳號：{}\n內容：{}\n讚數：{}　留言：{}　分享：{}",
            post.username, post.text, post.likes, post.comments, post.shares
        );
        self.chat(system, &user).await
    }

    /// Transcribe a voice message with Whisper.
    pub async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, String> {
        info!("🎤 Transcribing voice message ({} bytes)", audio.len());

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/ogg")
            .map_err(|e| format!("Invalid audio part: {e}"))?;

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", "zh")
            .part("file", part);

        let response = self
            .client
            .post(TRANSCRIPTION_API_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("API error {status}: {body}"));
        }

        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {e}"))?;

        Ok(parsed.text.trim().to_string())
    }
}
