//! Normalization of raw scraper payloads into one canonical post shape.
//!
//! Scrapers for different platforms disagree on field names and sometimes on
//! value types (counts arrive as numbers or as digit strings). Each platform
//! gets an alias list per field, probed in order, with fixed defaults when
//! nothing matches.

use serde_json::Value;

/// Fallback for a missing author name.
const UNKNOWN_USERNAME: &str = "未知";

/// One scraped post in canonical form, platform differences erased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPost {
    pub username: String,
    pub text: String,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl Default for CanonicalPost {
    fn default() -> Self {
        Self {
            username: UNKNOWN_USERNAME.to_string(),
            text: String::new(),
            likes: 0,
            comments: 0,
            shares: 0,
        }
    }
}

/// First non-empty string among the aliases. Dotted aliases descend into
/// nested objects.
fn probe_str(raw: &Value, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        let mut node = Some(raw);
        for part in alias.split('.') {
            node = node.and_then(|n| n.get(part));
        }
        if let Some(s) = node.and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// First coercible count among the aliases. Numbers are taken as-is, digit
/// strings are parsed, anything else counts as absent.
fn probe_count(raw: &Value, aliases: &[&str]) -> u64 {
    for alias in aliases {
        match raw.get(alias) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    return v;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<u64>() {
                    return v;
                }
            }
            _ => {}
        }
    }
    0
}

/// Normalize one raw post. Total over its input: an unknown platform tag or
/// a payload with no recognized fields yields the all-defaults record.
pub fn normalize_post(platform: &str, raw: &Value) -> CanonicalPost {
    let (username_aliases, text_aliases, likes_aliases, comments_aliases, shares_aliases): (
        &[&str],
        &[&str],
        &[&str],
        &[&str],
        &[&str],
    ) = match platform {
        "facebook" => (
            &["pageName", "userName", "username", "name"],
            &["text", "postText", "message"],
            &["likes", "likesCount"],
            &["comments", "commentsCount"],
            &["shares", "sharesCount"],
        ),
        "threads" => (
            // author.username is the nested shape the Threads scraper emits.
            &["author.username", "ownerUsername", "username"],
            &["text", "caption"],
            &["likeCount", "likesCount"],
            &["replyCount", "commentsCount"],
            &["repostCount", "sharesCount"],
        ),
        _ => return CanonicalPost::default(),
    };

    CanonicalPost {
        username: probe_str(raw, username_aliases)
            .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
        text: probe_str(raw, text_aliases).unwrap_or_default(),
        likes: probe_count(raw, likes_aliases),
        comments: probe_count(raw, comments_aliases),
        shares: probe_count(raw, shares_aliases),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facebook_primary_fields() {
        let raw = json!({
            "pageName": "測試專頁",
            "text": "今天的貼文",
            "likes": 42,
            "comments": 7,
            "shares": 3
        });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.username, "測試專頁");
        assert_eq!(post.text, "今天的貼文");
        assert_eq!(post.likes, 42);
        assert_eq!(post.comments, 7);
        assert_eq!(post.shares, 3);
    }

    #[test]
    fn test_facebook_alias_fields() {
        let raw = json!({
            "userName": "某人",
            "postText": "別名欄位",
            "likesCount": 10,
            "commentsCount": 2,
            "sharesCount": 1
        });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.username, "某人");
        assert_eq!(post.text, "別名欄位");
        assert_eq!(post.likes, 10);
    }

    #[test]
    fn test_facebook_alias_precedence() {
        let raw = json!({
            "pageName": "主要",
            "userName": "次要",
            "text": "primary",
            "postText": "secondary"
        });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.username, "主要");
        assert_eq!(post.text, "primary");
    }

    #[test]
    fn test_threads_nested_author() {
        let raw = json!({
            "author": { "username": "thread_user" },
            "text": "a thread",
            "likeCount": 5,
            "replyCount": 2,
            "repostCount": 1
        });
        let post = normalize_post("threads", &raw);
        assert_eq!(post.username, "thread_user");
        assert_eq!(post.text, "a thread");
        assert_eq!(post.likes, 5);
        assert_eq!(post.comments, 2);
        assert_eq!(post.shares, 1);
    }

    #[test]
    fn test_threads_flat_fallbacks() {
        let raw = json!({
            "ownerUsername": "flat_user",
            "caption": "caption text",
            "likesCount": 9
        });
        let post = normalize_post("threads", &raw);
        assert_eq!(post.username, "flat_user");
        assert_eq!(post.text, "caption text");
        assert_eq!(post.likes, 9);
    }

    #[test]
    fn test_string_counts_are_parsed() {
        let raw = json!({ "pageName": "p", "likes": "123", "comments": "0" });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.likes, 123);
        assert_eq!(post.comments, 0);
    }

    #[test]
    fn test_garbage_counts_default_to_zero() {
        let raw = json!({ "likes": "many", "comments": null, "shares": [1, 2] });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.likes, 0);
        assert_eq!(post.comments, 0);
        assert_eq!(post.shares, 0);
    }

    #[test]
    fn test_empty_payload_defaults() {
        let post = normalize_post("facebook", &json!({}));
        assert_eq!(post.username, "未知");
        assert_eq!(post.text, "");
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_unknown_platform_defaults() {
        let raw = json!({ "username": "someone", "text": "hello" });
        let post = normalize_post("instagram", &raw);
        assert_eq!(post, CanonicalPost::default());
    }

    #[test]
    fn test_empty_string_username_falls_through() {
        let raw = json!({ "pageName": "", "userName": "actual" });
        let post = normalize_post("facebook", &raw);
        assert_eq!(post.username, "actual");
    }
}
