//! End-to-end scenario tests for the assistant module: full conversations
//! driven through the session store and router together.
//!
//! Run with: cargo test assistant

use chrono::{Duration, Utc};
use serde_json::json;

use super::lexicon;
use super::normalize::normalize_post;
use super::patterns::Platform;
use super::router::Action;
use super::session::{sweep_expired, SessionStore, SESSION_TIMEOUT_SECS};
use super::summary::{parse_social_summary, parse_summary};

// =============================================================================
// CONVERSATION SCENARIOS
// =============================================================================

mod conversations {
    use super::*;

    const USER: i64 = 42;

    #[tokio::test]
    async fn test_translation_mode_full_flow() {
        let store = SessionStore::new();
        let now = Utc::now();

        // Enter the mode, pick a language, translate twice, leave.
        assert_eq!(store.dispatch(USER, "翻譯", now).await, Action::ShowLanguageMenu);
        assert_eq!(
            store.dispatch(USER, "日文", now).await,
            Action::PromptForContent { label: "日文".into() }
        );
        assert_eq!(
            store.dispatch(USER, "早安", now).await,
            Action::Translate { text: "早安".into(), language: "Japanese".into(), in_mode: true }
        );
        assert_eq!(
            store.dispatch(USER, "晚安", now).await,
            Action::Translate { text: "晚安".into(), language: "Japanese".into(), in_mode: true }
        );
        assert_eq!(store.dispatch(USER, "取消", now).await, Action::LeaveTranslateMode);
        assert!(store.get(USER).await.is_none());
    }

    #[tokio::test]
    async fn test_language_switch_mid_mode() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.dispatch(USER, "翻譯", now).await;
        store.dispatch(USER, "英文", now).await;
        // Saying the trigger again reopens the menu instead of translating it.
        assert_eq!(store.dispatch(USER, "翻譯", now).await, Action::ShowLanguageMenu);
        store.dispatch(USER, "韓文", now).await;
        assert_eq!(
            store.dispatch(USER, "你好", now).await,
            Action::Translate { text: "你好".into(), language: "Korean".into(), in_mode: true }
        );
    }

    #[tokio::test]
    async fn test_junk_language_choice_keeps_menu_open() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.dispatch(USER, "翻譯", now).await;
        assert_eq!(store.dispatch(USER, "不是語言", now).await, Action::Silent);
        // The menu is still open so a valid choice still works.
        assert_eq!(
            store.dispatch(USER, "泰文", now).await,
            Action::PromptForContent { label: "泰文".into() }
        );
    }

    #[tokio::test]
    async fn test_page_url_then_count_flow() {
        let store = SessionStore::new();
        let now = Utc::now();

        assert_eq!(
            store.dispatch(USER, "https://www.facebook.com/somepage", now).await,
            Action::AskScrapeCount
        );
        assert_eq!(
            store.dispatch(USER, "5", now).await,
            Action::Scrape {
                url: "https://www.facebook.com/somepage".into(),
                platform: Platform::Facebook,
                count: 5,
            }
        );
        // The pending-count session is gone once the count arrives.
        assert!(store.get(USER).await.is_none());
    }

    #[tokio::test]
    async fn test_pending_count_cancelled() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.dispatch(USER, "https://www.facebook.com/somepage", now).await;
        assert_eq!(store.dispatch(USER, "取消", now).await, Action::AcknowledgeCancel);
        assert!(store.get(USER).await.is_none());

        // After the cancel a URL starts a fresh flow.
        assert_eq!(
            store.dispatch(USER, "https://example.com/post", now).await,
            Action::SummarizeWebpage { url: "https://example.com/post".into() }
        );
    }

    #[tokio::test]
    async fn test_mode_swallows_urls_and_commands() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.dispatch(USER, "翻譯", now).await;
        store.dispatch(USER, "英文", now).await;
        // Inside translation mode a URL is content, not a summarize request.
        let action = store.dispatch(USER, "https://example.com", now).await;
        assert!(matches!(action, Action::Translate { in_mode: true, .. }));
    }

    #[tokio::test]
    async fn test_users_do_not_share_sessions() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.dispatch(1, "翻譯", now).await;
        store.dispatch(1, "英文", now).await;

        // User 2 is idle, so their text goes to free-text summarization.
        assert_eq!(
            store.dispatch(2, "今天的筆記", now).await,
            Action::SummarizeText { text: "今天的筆記".into() }
        );
        // User 1 is still in translation mode.
        assert!(matches!(
            store.dispatch(1, "你好", now).await,
            Action::Translate { in_mode: true, .. }
        ));
    }
}

// =============================================================================
// SESSION EXPIRY
// =============================================================================

mod expiry {
    use super::*;

    #[tokio::test]
    async fn test_activity_extends_the_deadline() {
        let store = SessionStore::new();
        let start = Utc::now();

        store.dispatch(7, "翻譯", start).await;
        store.dispatch(7, "英文", start).await;

        // A translation 4 minutes in refreshes the session.
        let later = start + Duration::seconds(240);
        store.dispatch(7, "你好", later).await;

        // 4 more minutes pass; without the refresh this would be past the
        // 300-second deadline.
        let sweep_at = start + Duration::seconds(480);
        assert!(sweep_expired(&store, sweep_at).await.is_empty());
        assert!(store.get(7).await.is_some());
    }

    #[tokio::test]
    async fn test_idle_session_is_evicted() {
        let store = SessionStore::new();
        let start = Utc::now();

        store.dispatch(7, "翻譯", start).await;
        let sweep_at = start + Duration::seconds(SESSION_TIMEOUT_SECS + 1);
        assert_eq!(sweep_expired(&store, sweep_at).await, vec![7]);
        assert!(store.get(7).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_reports_each_eviction_once() {
        let store = SessionStore::new();
        let start = Utc::now();

        store.dispatch(1, "翻譯", start).await;
        store.dispatch(2, "翻譯", start).await;

        let sweep_at = start + Duration::seconds(SESSION_TIMEOUT_SECS + 1);
        let mut evicted = sweep_expired(&store, sweep_at).await;
        evicted.sort();
        assert_eq!(evicted, vec![1, 2]);

        // A second pass finds nothing.
        assert!(sweep_expired(&store, sweep_at).await.is_empty());
    }
}

// =============================================================================
// LEXICON ROUND-TRIP
// =============================================================================

mod lexicon_round_trip {
    use super::*;
    use super::super::patterns::parse_translate_command;

    #[test]
    fn test_every_language_label_parses_in_command_form() {
        for (label, code) in lexicon::LANGUAGE_MAP {
            let command = format!("翻譯成{label}：測試內容");
            let (language, body) =
                parse_translate_command(&command).unwrap_or_else(|| panic!("no parse: {command}"));
            assert_eq!(language, *code, "label {label}");
            assert_eq!(body, "測試內容");
        }
    }
}

// =============================================================================
// NORMALIZATION AND PARSING
// =============================================================================

mod payloads {
    use super::*;

    #[test]
    fn test_platforms_converge_on_one_shape() {
        let fb = normalize_post(
            "facebook",
            &json!({ "pageName": "page", "text": "hi", "likes": 1, "comments": 2, "shares": 3 }),
        );
        let th = normalize_post(
            "threads",
            &json!({
                "author": { "username": "page" },
                "text": "hi",
                "likeCount": 1,
                "replyCount": 2,
                "repostCount": 3
            }),
        );
        assert_eq!(fb, th);
    }

    #[test]
    fn test_unknown_platform_never_panics() {
        let post = normalize_post("instagram", &json!({ "likes": "many", "text": 42 }));
        assert_eq!(post.username, "未知");
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_summary_parse_survives_extra_prose() {
        let reply = "好的，以下是整理結果：\n\n\
                     🏷️ 分類：旅遊\n\
                     📌 主題：京都三日遊\n\
                     🔑 關鍵字：京都、神社、美食\n\
                     📝 摘要：行程涵蓋了主要景點。\n\n\
                     希望對你有幫助！";
        let parsed = parse_summary(reply);
        assert_eq!(parsed.category, "旅遊");
        assert_eq!(parsed.title, "京都三日遊");
        assert_eq!(parsed.keywords, vec!["京都", "神社", "美食"]);
    }

    #[test]
    fn test_social_parse_multiline_summary() {
        let reply = "帳號：foodie_tw\n\
                     📝 摘要：介紹了一家新開的拉麵店。\n\
                     湯頭濃郁，排隊人潮多。\n\
                     🔑 關鍵字：拉麵、台北\n\
                     🎯 貼文類型：推薦";
        let parsed = parse_social_summary(reply);
        assert!(parsed.summary.contains("拉麵店"));
        assert!(parsed.summary.contains("排隊人潮"));
        assert_eq!(parsed.post_type, "推薦");
    }
}
