//! Recognizers for inbound text: URLs, command shapes, platform classification.

use std::sync::LazyLock;

use regex::Regex;

use crate::assistant::lexicon;

/// Generic scheme://host/path matcher. Only the first match in a message is used.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[-\w.]|(?:%[\da-fA-F]{2}))+[/\w.\-]*(?:\?[^\s]*)?").unwrap()
});

/// Direct translation command: 翻譯成英文：你好 / 幫我翻譯成日文 你好 / 翻譯英文:你好.
/// The body may span multiple lines, hence `(?s)`.
static TRANSLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:幫我|請幫我|請)?翻譯成?\s*(.+?)\s*[：:\s]\s*(.+)$").unwrap()
});

/// Multi-post scrape command: 爬 5 篇 https://... / 幫我爬取 10 篇 https://...
static SCRAPE_MULTI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:幫我|請幫我|請)?爬(?:取)?\s*(\d+)\s*篇\s*(https?://\S+)").unwrap()
});

/// Facebook permalink to a single post, video, photo, reel or story.
static FACEBOOK_POST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.|m\.|web\.)?facebook\.com/(?:[^/]+/(?:posts|videos|photos)/|watch/?\?v=|story\.php|reel/|share/)",
    )
    .unwrap()
});

/// Facebook page or profile root (no further path segments).
static FACEBOOK_PAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|m\.|web\.)?facebook\.com/[\w.\-]+/?$").unwrap()
});

/// Threads single-post permalink. Threads profile roots are deliberately
/// absent: there is no page-level scrape for Threads.
static THREADS_POST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?threads\.net/@[\w.]+/post/[\w\-]+").unwrap()
});

/// URL fragments identifying map-service links.
const MAP_URL_FRAGMENTS: &[&str] = &[
    "maps.google.com",
    "google.com/maps",
    "goo.gl/maps",
    "maps.app.goo.gl",
    "/maps/",
    "maps.app",
];

/// Keywords that leave any conversational mode.
const CANCEL_KEYWORDS: &[&str] = &["取消", "離開", "結束", "exit", "cancel"];

/// Keywords that enter translation mode.
const TRANSLATE_TRIGGERS: &[&str] = &["翻譯", "翻譯模式"];

/// Social platforms with a scraping backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Facebook,
    Threads,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Threads => "threads",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Threads => "Threads",
        }
    }
}

/// Whether a social URL points at a single post or a page/profile root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Post,
    Page,
}

/// Extract the first URL from a message, if any.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}

pub fn is_cancel(text: &str) -> bool {
    CANCEL_KEYWORDS.contains(&text)
}

pub fn is_translate_trigger(text: &str) -> bool {
    TRANSLATE_TRIGGERS.contains(&text)
}

/// Parse a direct translation command into (target language, body).
///
/// The language token is resolved through the lexicon; an unknown token is
/// passed through literally and left for the model to interpret.
pub fn parse_translate_command(text: &str) -> Option<(String, String)> {
    let caps = TRANSLATE_PATTERN.captures(text.trim())?;
    let token = caps.get(1)?.as_str().trim();
    let body = caps.get(2)?.as_str().trim();
    let language = lexicon::resolve(token).unwrap_or(token);
    Some((language.to_string(), body.to_string()))
}

/// Parse a multi-post scrape command into (count, url). The count is not yet
/// clamped here; the router applies the 1..=20 bound.
pub fn parse_scrape_command(text: &str) -> Option<(u32, String)> {
    let caps = SCRAPE_MULTI_PATTERN.captures(text.trim())?;
    // Overflowing digit strings saturate rather than fail the match.
    let count = caps.get(1)?.as_str().parse::<u32>().unwrap_or(u32::MAX);
    let url = caps.get(2)?.as_str().to_string();
    Some((count, url))
}

/// Classify a URL as a social post or page. Post shapes win over page shapes
/// so that `facebook.com/user/posts/123` is never treated as a page root.
pub fn detect_social_platform(url: &str) -> Option<(Platform, UrlKind)> {
    if FACEBOOK_POST_PATTERN.is_match(url) {
        return Some((Platform::Facebook, UrlKind::Post));
    }
    if THREADS_POST_PATTERN.is_match(url) {
        return Some((Platform::Threads, UrlKind::Post));
    }
    if FACEBOOK_PAGE_PATTERN.is_match(url) {
        return Some((Platform::Facebook, UrlKind::Page));
    }
    None
}

/// Membership test against known map-service URL fragments. Only consulted
/// after social classification has failed.
pub fn is_map_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    MAP_URL_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}
