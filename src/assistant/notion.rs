//! Notion persistence for parsed summaries.
//!
//! Saving is strictly best-effort: the user already has the summary in chat,
//! so a failed save is logged and swallowed instead of surfacing as an error
//! reply. Both save methods therefore return a plain bool.

use serde_json::{Value, json};
use tracing::{info, warn};

const NOTION_API_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion titles are capped; longer titles are truncated.
const MAX_TITLE_CHARS: usize = 100;

pub struct NotionClient {
    api_key: String,
    database_id: String,
    client: reqwest::Client,
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        title.chars().take(MAX_TITLE_CHARS).collect()
    } else {
        title.to_string()
    }
}

fn multi_select(values: &[String]) -> Value {
    let options: Vec<Value> = values.iter().map(|v| json!({ "name": v })).collect();
    json!({ "multi_select": options })
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

impl NotionClient {
    pub fn new(api_key: String, database_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, database_id, client }
    }

    async fn create_page(&self, properties: Value) -> bool {
        let request = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });

        let result = self
            .client
            .post(NOTION_API_URL)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&request)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("📚 Saved to Notion");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("📚 Notion save failed: {status}: {body}");
                false
            }
            Err(e) => {
                warn!("📚 Notion save failed: {e}");
                false
            }
        }
    }

    /// Save a webpage/text/map summary.
    pub async fn save_summary(
        &self,
        title: &str,
        content_type: &str,
        category: &str,
        keywords: &[String],
        source_url: &str,
        content: &str,
    ) -> bool {
        let url_value = if source_url.is_empty() { Value::Null } else { json!(source_url) };
        let properties = json!({
            "標題": { "title": [{ "text": { "content": truncate_title(title) } }] },
            "類型": { "select": { "name": content_type } },
            "分類": { "select": { "name": category } },
            "關鍵字": multi_select(keywords),
            "來源連結": { "url": url_value },
            "內容": rich_text(content),
        });
        self.create_page(properties).await
    }

    /// Save a social-post summary with its engagement counts.
    #[allow(clippy::too_many_arguments)]
    pub async fn save_social(
        &self,
        platform: &str,
        username: &str,
        summary: &str,
        keywords: &[String],
        likes: u64,
        comments: u64,
        shares: u64,
        source_url: &str,
        original_text: &str,
    ) -> bool {
        let title = if username.is_empty() {
            platform.to_string()
        } else {
            format!("{platform} @{username}")
        };
        let properties = json!({
            "標題": { "title": [{ "text": { "content": truncate_title(&title) } }] },
            "類型": { "select": { "name": "社群貼文" } },
            "平台": { "select": { "name": platform } },
            "帳號": rich_text(username),
            "摘要": rich_text(summary),
            "關鍵字": multi_select(keywords),
            "讚數": { "number": likes },
            "留言數": { "number": comments },
            "分享數": { "number": shares },
            "來源連結": { "url": source_url },
            "原文": rich_text(original_text),
        });
        self.create_page(properties).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_title() {
        let short = "短標題";
        assert_eq!(truncate_title(short), short);

        let long = "標".repeat(150);
        let truncated = truncate_title(&long);
        assert_eq!(truncated.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_multi_select_shape() {
        let v = multi_select(&["一".to_string(), "二".to_string()]);
        assert_eq!(v["multi_select"][0]["name"], "一");
        assert_eq!(v["multi_select"][1]["name"], "二");
    }
}
