//! Heuristics for rejecting hallucinated voice transcripts.
//!
//! Whisper on silence or noise tends to emit stock phrases lifted from its
//! training subtitles (channel sign-offs, subtitle credits). These are
//! filtered before the transcript reaches the user.

/// Substrings that mark a transcript as hallucinated. Matched lowercased.
const HALLUCINATION_PATTERNS: &[&str] = &[
    "请不吝点赞",
    "點贊訂閱",
    "订阅转发",
    "訂閱轉發",
    "打赏支持",
    "打賞支持",
    "明镜与点点",
    "明鏡與點點",
    "感谢观看",
    "感謝觀看",
    "谢谢收看",
    "謝謝收看",
    "欢迎订阅",
    "歡迎訂閱",
    "like and subscribe",
    "thanks for watching",
    "字幕由",
    "字幕提供",
    "subtitles by",
    "amara.org",
];

/// Whether a transcript looks like a Whisper hallucination rather than real
/// speech. Empty and very short transcripts are rejected too.
pub fn is_hallucination(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let lower = trimmed.to_lowercase();
    if HALLUCINATION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    if trimmed.chars().count() < 5 {
        return true;
    }

    // Silence often yields the same token repeated over and over.
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() > 2 && words.iter().all(|w| *w == words[0]) {
        return true;
    }

    false
}
