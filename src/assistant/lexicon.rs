//! Static language lexicon: human-readable names → identifiers the model understands.

/// Language name → target-language identifier. Both 文 and 語 variants map
/// to the same identifier.
pub const LANGUAGE_MAP: &[(&str, &str)] = &[
    // 常用語言
    ("英文", "English"),
    ("英語", "English"),
    ("日文", "Japanese"),
    ("日語", "Japanese"),
    ("韓文", "Korean"),
    ("韓語", "Korean"),
    ("中文", "Traditional Chinese"),
    ("繁體中文", "Traditional Chinese"),
    ("繁中", "Traditional Chinese"),
    ("簡體中文", "Simplified Chinese"),
    ("簡中", "Simplified Chinese"),
    // 東南亞語言
    ("越南文", "Vietnamese"),
    ("越南語", "Vietnamese"),
    ("泰文", "Thai"),
    ("泰語", "Thai"),
    ("印尼文", "Indonesian"),
    ("印尼語", "Indonesian"),
    ("馬來文", "Malay"),
    ("馬來語", "Malay"),
    ("菲律賓文", "Filipino"),
    ("菲律賓語", "Filipino"),
    ("緬甸文", "Burmese"),
    ("緬甸語", "Burmese"),
    ("柬埔寨文", "Khmer"),
    ("柬埔寨語", "Khmer"),
    ("高棉文", "Khmer"),
    ("寮文", "Lao"),
    ("寮語", "Lao"),
    ("寮國文", "Lao"),
    // 歐洲語言
    ("法文", "French"),
    ("法語", "French"),
    ("德文", "German"),
    ("德語", "German"),
    ("西班牙文", "Spanish"),
    ("西班牙語", "Spanish"),
    ("葡萄牙文", "Portuguese"),
    ("葡萄牙語", "Portuguese"),
    ("義大利文", "Italian"),
    ("義大利語", "Italian"),
    ("俄文", "Russian"),
    ("俄語", "Russian"),
    ("荷蘭文", "Dutch"),
    ("荷蘭語", "Dutch"),
    // 其他語言
    ("阿拉伯文", "Arabic"),
    ("阿拉伯語", "Arabic"),
    ("印度文", "Hindi"),
    ("印地語", "Hindi"),
    ("土耳其文", "Turkish"),
    ("土耳其語", "Turkish"),
    ("波蘭文", "Polish"),
    ("波蘭語", "Polish"),
    ("瑞典文", "Swedish"),
    ("瑞典語", "Swedish"),
    ("希臘文", "Greek"),
    ("希臘語", "Greek"),
];

/// Languages offered on the reply keyboard when entering translation mode.
pub const QUICK_REPLY_LANGUAGES: &[(&str, &str)] = &[
    ("英文", "English"),
    ("日文", "Japanese"),
    ("韓文", "Korean"),
    ("越南文", "Vietnamese"),
    ("泰文", "Thai"),
    ("印尼文", "Indonesian"),
    ("簡體中文", "Simplified Chinese"),
    ("法文", "French"),
    ("西班牙文", "Spanish"),
    ("德文", "German"),
];

/// Look up a language label, returning the canonical identifier on a hit.
pub fn resolve(label: &str) -> Option<&'static str> {
    LANGUAGE_MAP
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_languages() {
        assert_eq!(resolve("英文"), Some("English"));
        assert_eq!(resolve("日文"), Some("Japanese"));
        assert_eq!(resolve("韓文"), Some("Korean"));
    }

    #[test]
    fn test_chinese_variants() {
        assert_eq!(resolve("繁體中文"), Some("Traditional Chinese"));
        assert_eq!(resolve("繁中"), Some("Traditional Chinese"));
        assert_eq!(resolve("簡體中文"), Some("Simplified Chinese"));
        assert_eq!(resolve("簡中"), Some("Simplified Chinese"));
    }

    #[test]
    fn test_wen_and_yu_forms_agree() {
        assert_eq!(resolve("英文"), resolve("英語"));
        assert_eq!(resolve("日文"), resolve("日語"));
        assert_eq!(resolve("韓文"), resolve("韓語"));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(resolve("火星文"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_quick_reply_subset_of_map() {
        for (label, code) in QUICK_REPLY_LANGUAGES {
            assert_eq!(resolve(label), Some(*code), "missing quick-reply label {label}");
        }
    }
}
