//! Intent classification: decides which handler owns an inbound message.
//!
//! `route` is a pure function over (current session, message text). It never
//! touches the store itself; the caller applies the returned transition.
//! Rule order matters and is load-bearing: session-scoped rules come first so
//! a user inside a flow is never reinterpreted as issuing a new top-level
//! command (cancel and switch-language are the only escape hatches), and URL
//! detection comes last among the stateless rules because structured commands
//! may themselves contain a URL.

use crate::assistant::lexicon;
use crate::assistant::patterns::{self, Platform};
use crate::assistant::session::{Session, SessionMode, Transition};

/// Hard ceiling on posts per scrape request.
pub const MAX_SCRAPE_COUNT: u32 = 20;

/// The action a routed message resolves to. Exactly one per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the target-language menu.
    ShowLanguageMenu,
    /// A language was chosen; ask for the content to translate.
    PromptForContent { label: String },
    /// Leave translation mode.
    LeaveTranslateMode,
    /// Acknowledge a cancel outside any mode.
    AcknowledgeCancel,
    /// Translate `text` into `language`. `in_mode` selects the reply shape
    /// (continuous-mode replies carry the keep-going hint and keyboard).
    Translate { text: String, language: String, in_mode: bool },
    /// A page URL arrived without a count; ask how many posts to scrape.
    AskScrapeCount,
    /// Scrape up to `count` posts and summarize them.
    Scrape { url: String, platform: Platform, count: u32 },
    /// A scrape command whose URL is not a supported platform.
    UnsupportedScrapeTarget,
    /// Scrape and summarize a single social post.
    AnalyzeSocialPost { url: String, platform: Platform },
    /// Scrape and summarize a map place.
    AnalyzeMapPlace { url: String },
    /// Fetch and summarize a webpage.
    SummarizeWebpage { url: String },
    /// Summarize free text.
    SummarizeText { text: String },
    /// Tolerated no-op: nothing is sent and the session is untouched.
    Silent,
}

/// The outcome of routing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub action: Action,
    pub transition: Transition,
}

fn routed(action: Action, transition: Transition) -> Routed {
    Routed { action, transition }
}

/// Classify one message given the user's current session. Total: every input
/// yields exactly one action (possibly `Silent`).
pub fn route(session: Option<&Session>, text: &str) -> Routed {
    let text = text.trim();

    // Rule 1: inside translation mode everything is content, except the
    // cancel and switch-language escape hatches.
    if let Some(Session { mode: SessionMode::AwaitingTranslationInput { language }, .. }) = session {
        if patterns::is_cancel(text) {
            return routed(Action::LeaveTranslateMode, Transition::Clear);
        }
        if patterns::is_translate_trigger(text) {
            return routed(
                Action::ShowLanguageMenu,
                Transition::Enter(SessionMode::AwaitingLanguageChoice),
            );
        }
        return routed(
            Action::Translate {
                text: text.to_string(),
                language: language.clone(),
                in_mode: true,
            },
            Transition::Refresh,
        );
    }

    // Rule 2: language menu open. A lexicon hit locks in the language; a
    // cancel keyword falls through to rule 4; anything else is a tolerated
    // no-op that leaves the menu open.
    if let Some(Session { mode: SessionMode::AwaitingLanguageChoice, .. }) = session {
        if let Some(code) = lexicon::resolve(text) {
            return routed(
                Action::PromptForContent { label: text.to_string() },
                Transition::Enter(SessionMode::AwaitingTranslationInput {
                    language: code.to_string(),
                }),
            );
        }
        if !patterns::is_cancel(text) {
            return routed(Action::Silent, Transition::Keep);
        }
    }

    // Rule 3: enter translation mode.
    if patterns::is_translate_trigger(text) {
        return routed(
            Action::ShowLanguageMenu,
            Transition::Enter(SessionMode::AwaitingLanguageChoice),
        );
    }

    // Rule 4: cancel anywhere else. Clearing an absent session is a no-op;
    // the acknowledgment is sent either way.
    if patterns::is_cancel(text) {
        return routed(Action::AcknowledgeCancel, Transition::Clear);
    }

    // Rule 5: direct translation command, stateless.
    if let Some((language, body)) = patterns::parse_translate_command(text) {
        return routed(
            Action::Translate { text: body, language, in_mode: false },
            Transition::Keep,
        );
    }

    // Rule 6: pending scrape count. Only a digit string completes the flow;
    // anything else (cancel was already caught by rule 4) is a tolerated
    // no-op.
    if let Some(Session { mode: SessionMode::AwaitingScrapeCount { url, platform }, .. }) = session {
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            let count = text.parse::<u32>().unwrap_or(u32::MAX).clamp(1, MAX_SCRAPE_COUNT);
            return routed(
                Action::Scrape { url: url.clone(), platform: *platform, count },
                Transition::Clear,
            );
        }
        return routed(Action::Silent, Transition::Keep);
    }

    // Rule 7: fully-specified scrape command. Matched before generic URL
    // handling because the command itself contains a URL. Multi-post scrapes
    // only work against Facebook page roots; post permalinks and other
    // platforms have no page-level scraper.
    if let Some((count, url)) = patterns::parse_scrape_command(text) {
        return match patterns::detect_social_platform(&url) {
            Some((Platform::Facebook, patterns::UrlKind::Page)) => routed(
                Action::Scrape {
                    url,
                    platform: Platform::Facebook,
                    count: count.clamp(1, MAX_SCRAPE_COUNT),
                },
                Transition::Keep,
            ),
            _ => routed(Action::UnsupportedScrapeTarget, Transition::Keep),
        };
    }

    // Rule 8: bare URL. Social post, then social page, then map, then
    // generic webpage.
    if let Some(url) = patterns::extract_url(text) {
        let url = url.to_string();
        return match patterns::detect_social_platform(&url) {
            Some((platform, patterns::UrlKind::Post)) => {
                routed(Action::AnalyzeSocialPost { url, platform }, Transition::Keep)
            }
            Some((platform, patterns::UrlKind::Page)) => routed(
                Action::AskScrapeCount,
                Transition::Enter(SessionMode::AwaitingScrapeCount { url, platform }),
            ),
            None if patterns::is_map_url(&url) => {
                routed(Action::AnalyzeMapPlace { url }, Transition::Keep)
            }
            None => routed(Action::SummarizeWebpage { url }, Transition::Keep),
        };
    }

    // Rule 9: everything else is free text to summarize.
    routed(Action::SummarizeText { text: text.to_string() }, Transition::Keep)
}
