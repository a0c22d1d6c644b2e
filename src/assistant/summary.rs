//! Extraction of structured fields from the model's templated replies.
//!
//! The summarization prompts ask for a fixed emoji-labeled template. The
//! model mostly complies but drifts on ordering, blank lines and extra prose,
//! so parsing is label-anchored line scanning rather than a rigid grammar.
//! Every field has a default and parsing never fails.

/// Maximum length kept for a single keyword entry.
const MAX_KEYWORD_CHARS: usize = 30;

/// Delimiters the model uses between keywords.
const KEYWORD_SEPARATORS: &[char] = &['，', '、', ',', '・', '·', '•'];

/// Fields extracted from a webpage/text/map summary reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSummary {
    pub category: String,
    pub title: String,
    pub keywords: Vec<String>,
}

impl Default for ParsedSummary {
    fn default() -> Self {
        Self {
            category: "其他".to_string(),
            title: String::new(),
            keywords: Vec::new(),
        }
    }
}

/// Fields extracted from a social-post summary reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSummary {
    pub summary: String,
    pub keywords: Vec<String>,
    pub post_type: String,
}

impl Default for SocialSummary {
    fn default() -> Self {
        Self {
            summary: String::new(),
            keywords: Vec::new(),
            post_type: "其他".to_string(),
        }
    }
}

/// Strip an optional emoji prefix and match `label` at the start of a line,
/// returning the remainder after the label and its separator.
fn match_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let trimmed = line.trim();
    let idx = trimmed.find(label)?;
    // The label must sit at the front, allowing only an emoji/symbol prefix.
    if trimmed[..idx].chars().count() > 3 {
        return None;
    }
    let rest = &trimmed[idx + label.len()..];
    Some(rest.trim_start_matches(['：', ':', ' ', '\u{3000}']).trim())
}

fn is_any_label(line: &str, labels: &[&str]) -> bool {
    labels.iter().any(|l| match_label(line, l).is_some())
}

/// Collect the value for a label: the rest of its own line plus following
/// lines until the next recognized label.
fn collect_value(lines: &[&str], start: usize, first: &str, all_labels: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !first.is_empty() {
        parts.push(first);
    }
    for line in &lines[start + 1..] {
        if is_any_label(line, all_labels) {
            break;
        }
        let t = line.trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }
    parts.join("\n")
}

/// Keywords live on the label's own line; trailing free-form lines are not
/// keyword material even when no recognized label follows. An empty
/// remainder falls back to the first following non-empty line, unless that
/// line is itself a label.
fn keyword_value(lines: &[&str], start: usize, first: &str, all_labels: &[&str]) -> String {
    if !first.is_empty() {
        return first.to_string();
    }
    lines[start + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .filter(|l| !is_any_label(l, all_labels))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Split a keyword line on the known delimiters, trimming and dropping empty
/// or oversized entries.
fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(KEYWORD_SEPARATORS)
        .map(str::trim)
        .filter(|k| !k.is_empty() && k.chars().count() <= MAX_KEYWORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// A category value like `地點/美食` is reduced to its first alternative.
fn reduce_category(value: &str) -> String {
    value
        .split('/')
        .next()
        .unwrap_or(value)
        .trim()
        .to_string()
}

/// Parse a webpage/text/map summary reply. Labels recognized: 分類,
/// 主題 or 地點名稱 (both feed the title), 關鍵字.
pub fn parse_summary(text: &str) -> ParsedSummary {
    const LABELS: &[&str] = &["分類", "主題", "地點名稱", "關鍵字", "摘要"];
    let lines: Vec<&str> = text.lines().collect();
    let mut parsed = ParsedSummary::default();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = match_label(line, "分類") {
            let value = collect_value(&lines, i, rest, LABELS);
            if !value.is_empty() {
                parsed.category = reduce_category(&value);
            }
        } else if let Some(rest) = match_label(line, "主題") {
            if parsed.title.is_empty() {
                parsed.title = collect_value(&lines, i, rest, LABELS);
            }
        } else if let Some(rest) = match_label(line, "地點名稱") {
            if parsed.title.is_empty() {
                parsed.title = collect_value(&lines, i, rest, LABELS);
            }
        } else if let Some(rest) = match_label(line, "關鍵字") {
            parsed.keywords = split_keywords(&keyword_value(&lines, i, rest, LABELS));
        }
    }
    parsed
}

/// Parse a social-post summary reply. Labels recognized: 帳號, 摘要
/// (multi-line), 關鍵字, 貼文類型.
pub fn parse_social_summary(text: &str) -> SocialSummary {
    const LABELS: &[&str] = &["帳號", "摘要", "關鍵字", "貼文類型"];
    let lines: Vec<&str> = text.lines().collect();
    let mut parsed = SocialSummary::default();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = match_label(line, "貼文類型") {
            let value = collect_value(&lines, i, rest, LABELS);
            if !value.is_empty() {
                parsed.post_type = reduce_category(&value);
            }
        } else if let Some(rest) = match_label(line, "摘要") {
            parsed.summary = collect_value(&lines, i, rest, LABELS);
        } else if let Some(rest) = match_label(line, "關鍵字") {
            parsed.keywords = split_keywords(&keyword_value(&lines, i, rest, LABELS));
        }
    }
    parsed
}
