//! Apify scraping client for Facebook posts, Threads posts and Google Maps
//! places.
//!
//! Every call goes through the synchronous run-and-wait endpoint, which runs
//! the actor and returns its dataset items in one response. Scrapes are slow,
//! so callers run them off the message-handling path.

use serde_json::{Value, json};
use tracing::{debug, info};

const APIFY_BASE_URL: &str = "https://api.apify.com/v2/acts";

const FACEBOOK_POSTS_ACTOR: &str = "apify~facebook-posts-scraper";
const THREADS_ACTOR: &str = "apify~threads-scraper";
const MAPS_ACTOR: &str = "compass~crawler-google-places";

pub struct ApifyClient {
    api_token: String,
    client: reqwest::Client,
}

impl ApifyClient {
    pub fn new(api_token: String) -> Self {
        // Actor runs routinely take minutes.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_token, client }
    }

    async fn run_actor(&self, actor: &str, input: Value) -> Result<Vec<Value>, String> {
        let url = format!(
            "{APIFY_BASE_URL}/{actor}/run-sync-get-dataset-items?token={}",
            self.api_token
        );

        let response = self
            .client
            .post(&url)
            .json(&input)
            .send()
            .await
            .map_err(|e| format!("HTTP error: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {e}"))?;

        debug!("Apify {actor} response status: {status}");

        if !status.is_success() {
            return Err(format!("Apify error {status}: {body}"));
        }

        let items: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| format!("Failed to parse response: {e}"))?;

        info!("🕷️ Apify {actor} returned {} items", items.len());
        Ok(items)
    }

    /// Scrape up to `limit` recent posts from a Facebook page.
    pub async fn scrape_facebook_posts(
        &self,
        url: &str,
        limit: u32,
    ) -> Result<Vec<Value>, String> {
        info!("🕷️ Scraping {limit} Facebook posts from {url}");
        let input = json!({
            "startUrls": [{ "url": url }],
            "resultsLimit": limit,
        });
        self.run_actor(FACEBOOK_POSTS_ACTOR, input).await
    }

    /// Scrape a single Threads post.
    pub async fn scrape_threads_post(&self, url: &str) -> Result<Vec<Value>, String> {
        info!("🕷️ Scraping Threads post {url}");
        let input = json!({
            "urls": [url],
            "postsPerProfile": 1,
        });
        self.run_actor(THREADS_ACTOR, input).await
    }

    /// Scrape a single Facebook post.
    pub async fn scrape_facebook_post(&self, url: &str) -> Result<Vec<Value>, String> {
        info!("🕷️ Scraping Facebook post {url}");
        let input = json!({
            "startUrls": [{ "url": url }],
            "resultsLimit": 1,
        });
        self.run_actor(FACEBOOK_POSTS_ACTOR, input).await
    }

    /// Scrape a Google Maps place. At most one item is expected.
    pub async fn scrape_map_place(&self, url: &str) -> Result<Option<Value>, String> {
        info!("🕷️ Scraping map place {url}");
        let input = json!({
            "startUrls": [{ "url": url }],
            "maxCrawledPlacesPerSearch": 1,
            "language": "zh-TW",
        });
        let items = self.run_actor(MAPS_ACTOR, input).await?;
        Ok(items.into_iter().next())
    }
}
