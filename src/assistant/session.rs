//! Per-user conversational state with automatic expiry.
//!
//! A session exists only while the user is inside a mode; returning to idle
//! removes the entry. The router and the sweeper go through the same store,
//! and no store operation touches the network while the lock is held.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::assistant::patterns::Platform;

/// How often the sweeper scans for stale sessions.
pub const SWEEP_INTERVAL_SECS: u64 = 30;

/// Inactivity after which a session is evicted.
pub const SESSION_TIMEOUT_SECS: i64 = 300;

/// The mode a user's session is in. Idle is represented by the absence of a
/// session, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Waiting for the user to pick a target language.
    AwaitingLanguageChoice,
    /// Translating everything the user sends into `language`.
    AwaitingTranslationInput { language: String },
    /// Waiting for a post count for a pending page scrape.
    AwaitingScrapeCount { url: String, platform: Platform },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: SessionMode,
    /// Last state-establishing or state-refreshing event.
    pub entered_at: DateTime<Utc>,
}

impl Session {
    pub fn new(mode: SessionMode, now: DateTime<Utc>) -> Self {
        Self { mode, entered_at: now }
    }
}

/// The state transition a routed action asks the caller to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Leave the session untouched.
    Keep,
    /// Reset `entered_at`, keeping mode and payload (extends the deadline).
    Refresh,
    /// Replace the session with a new mode.
    Enter(SessionMode),
    /// Remove the session (back to idle).
    Clear,
}

/// Map from user id to session. All access goes through one async mutex, so
/// the router and the sweeper can never interleave on the same entry.
pub struct SessionStore {
    inner: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashMap::new()) }
    }

    pub async fn get(&self, user_id: i64) -> Option<Session> {
        self.inner.lock().await.get(&user_id).cloned()
    }

    pub async fn set(&self, user_id: i64, session: Session) {
        self.inner.lock().await.insert(user_id, session);
    }

    pub async fn remove(&self, user_id: i64) {
        self.inner.lock().await.remove(&user_id);
    }

    /// Point-in-time copy of all live sessions, for the sweeper.
    pub async fn snapshot(&self) -> Vec<(i64, Session)> {
        self.inner
            .lock()
            .await
            .iter()
            .map(|(id, s)| (*id, s.clone()))
            .collect()
    }

    /// Delete the entry only if its timestamp still matches `entered_at`.
    /// Guards against evicting a session that was refreshed between the
    /// sweeper's snapshot and its delete. Returns whether a delete happened.
    pub async fn remove_if_entered_at(&self, user_id: i64, entered_at: DateTime<Utc>) -> bool {
        let mut map = self.inner.lock().await;
        match map.get(&user_id) {
            Some(session) if session.entered_at == entered_at => {
                map.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    /// Route a message and apply its transition under a single lock
    /// acquisition, so get-route-apply is atomic per user.
    pub async fn dispatch(&self, user_id: i64, text: &str, now: DateTime<Utc>) -> super::router::Action {
        let mut map = self.inner.lock().await;
        let routed = super::router::route(map.get(&user_id), text);
        match routed.transition {
            Transition::Keep => {}
            Transition::Refresh => {
                if let Some(session) = map.get_mut(&user_id) {
                    session.entered_at = now;
                }
            }
            Transition::Enter(mode) => {
                map.insert(user_id, Session::new(mode, now));
            }
            Transition::Clear => {
                map.remove(&user_id);
            }
        }
        routed.action
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One sweeper pass: evict every session idle for `SESSION_TIMEOUT_SECS` or
/// longer, returning the evicted user ids so the caller can notify them.
/// A refreshed entry fails the timestamp guard and survives.
pub async fn sweep_expired(store: &SessionStore, now: DateTime<Utc>) -> Vec<i64> {
    let mut evicted = Vec::new();
    for (user_id, session) in store.snapshot().await {
        let idle_secs = (now - session.entered_at).num_seconds();
        if idle_secs >= SESSION_TIMEOUT_SECS
            && store.remove_if_entered_at(user_id, session.entered_at).await
        {
            evicted.push(user_id);
        }
    }
    evicted
}
