//! Webpage fetching and HTML cleanup for the summarization flow.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

/// Some sites serve an empty shell to unknown clients, so the fetch uses a
/// browser user agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const FETCH_TIMEOUT_SECS: u64 = 5;

/// Only lines at least this long survive cleanup; shorter ones are nav
/// items, button labels and similar chrome.
const MIN_LINE_CHARS: usize = 20;

/// Cap on the extracted body, to keep the prompt bounded.
const MAX_CONTENT_CHARS: usize = 2000;

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

static META_DESCRIPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#)
        .unwrap()
});

static OG_DESCRIPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*property=["']og:description["'][^>]*content=["']([^"']*)["']"#)
        .unwrap()
});

static SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());

static STYLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

fn extract_title(html: &str) -> Option<String> {
    TITLE_PATTERN
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_description(html: &str) -> Option<String> {
    META_DESCRIPTION_PATTERN
        .captures(html)
        .or_else(|| OG_DESCRIPTION_PATTERN.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Strip script and style blocks, then all remaining tags, and keep only
/// lines long enough to be prose. The result is capped.
fn clean_html(html: &str) -> String {
    let without_scripts = SCRIPT_PATTERN.replace_all(html, " ");
    let without_styles = STYLE_PATTERN.replace_all(&without_scripts, " ");
    let text = TAG_PATTERN.replace_all(&without_styles, "\n");

    let mut content = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join("\n");

    if content.chars().count() > MAX_CONTENT_CHARS {
        content = content.chars().take(MAX_CONTENT_CHARS).collect::<String>() + "...";
    }
    content
}

/// Assemble the report passed to the summarization prompt.
fn build_report(html: &str) -> String {
    let title = extract_title(html).unwrap_or_default();
    let description = extract_description(html).unwrap_or_default();
    let content = clean_html(html);
    format!("標題：{title}\n\n描述：{description}\n\n內文：\n{content}")
}

/// Fetch a page and reduce it to title, meta description and cleaned body
/// text.
pub async fn fetch_webpage_content(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let response = client
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| format!("無法連線到網頁: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("網頁回應異常: HTTP {}", response.status().as_u16()));
    }

    let html = response
        .text()
        .await
        .map_err(|e| format!("讀取網頁內容失敗: {e}"))?;

    Ok(build_report(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title> 測試頁面標題 </title></head></html>";
        assert_eq!(extract_title(html), Some("測試頁面標題".to_string()));
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[test]
    fn test_extract_description_name_before_og() {
        let html = r#"<meta name="description" content="一般描述">
                      <meta property="og:description" content="og 描述">"#;
        assert_eq!(extract_description(html), Some("一般描述".to_string()));
    }

    #[test]
    fn test_extract_description_og_fallback() {
        let html = r#"<meta property="og:description" content="只有 og 描述">"#;
        assert_eq!(extract_description(html), Some("只有 og 描述".to_string()));
    }

    #[test]
    fn test_clean_html_strips_scripts_and_styles() {
        let html = "<script>var x = 'this script line is definitely long enough';</script>\
                    <style>.c { color: red; margin: 0 auto; padding: 10px; }</style>\
                    <p>這一段正文內容足夠長，應該要被保留下來才對。</p>";
        let cleaned = clean_html(html);
        assert!(cleaned.contains("這一段正文內容"));
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("color"));
    }

    #[test]
    fn test_clean_html_drops_short_lines() {
        let html = "<nav>首頁</nav><p>這是一段足夠長的正文，超過二十個字元的門檻沒有問題。</p>";
        let cleaned = clean_html(html);
        assert!(!cleaned.contains("首頁"));
        assert!(cleaned.contains("足夠長的正文"));
    }

    #[test]
    fn test_clean_html_caps_length() {
        let long_line = "長".repeat(3000);
        let html = format!("<p>{long_line}</p>");
        let cleaned = clean_html(&html);
        assert!(cleaned.ends_with("..."));
        assert_eq!(cleaned.chars().count(), MAX_CONTENT_CHARS + 3);
    }

    #[test]
    fn test_build_report_shape() {
        let html = "<html><head><title>標題A</title>\
                    <meta name=\"description\" content=\"描述B\"></head>\
                    <body><p>這是一段足夠長的內文，會出現在報告的內文區塊裡。</p></body></html>";
        let report = build_report(html);
        assert!(report.starts_with("標題：標題A\n\n描述：描述B\n\n內文：\n"));
        assert!(report.contains("報告的內文區塊"));
    }
}
