use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use nanoid::nanoid;
use tokio::sync::{Mutex, RwLock};

use crate::models::{SessionSnapshot, Suggestion, Turn};
use crate::mood::MoodSuggestionCounter;

/// Mutable state of one conversation. Owned by the [`SessionStore`] and only
/// touched while the session lock is held.
#[derive(Debug)]
pub struct SessionContext {
    pub id: String,
    pub turns: Vec<Turn>,
    pub counter: MoodSuggestionCounter,
    pub pending_suggestion: Option<Suggestion>,
    /// Sticky: once raised it stays raised for the session.
    pub crisis_flag: bool,
    pub crisis_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(id: impl Into<String>, threshold: u32) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            turns: Vec::new(),
            counter: MoodSuggestionCounter::new(threshold),
            pending_suggestion: None,
            crisis_flag: false,
            crisis_keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.updated_at = turn.timestamp;
        self.turns.push(turn);
    }

    /// The last `window` turns, or all of them when `window` is 0.
    pub fn recent_turns(&self, window: usize) -> &[Turn] {
        if window == 0 || self.turns.len() <= window {
            &self.turns
        } else {
            &self.turns[self.turns.len() - window..]
        }
    }

    pub fn raise_crisis(&mut self, keywords: &[String]) {
        self.crisis_flag = true;
        for keyword in keywords {
            if !self.crisis_keywords.contains(keyword) {
                self.crisis_keywords.push(keyword.clone());
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            turns: self.turns.clone(),
            mood_counts: self.counter.counts(),
            threshold: self.counter.threshold(),
            pending_suggestion: self.pending_suggestion.clone(),
            crisis_flag: self.crisis_flag,
            crisis_keywords: self.crisis_keywords.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub type SessionHandle = Arc<Mutex<SessionContext>>;

type SessionMap = HashMap<String, SessionHandle>;

/// Live sessions keyed by id. Sessions are in-memory only.
///
/// Sessions idle longer than the idle timeout are dropped by
/// [`SessionStore::prune_idle`], and registering a session beyond the cap
/// evicts the least recently active one. Sessions whose lock is held (a turn
/// is running) are never evicted.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<SessionMap>>,
    threshold: u32,
    idle_timeout: Option<Duration>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(threshold: u32) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            threshold,
            idle_timeout: None,
            max_sessions: usize::MAX,
        }
    }

    /// `idle_timeout` of `None` disables expiry.
    pub fn with_limits(mut self, idle_timeout: Option<Duration>, max_sessions: usize) -> Self {
        self.idle_timeout = idle_timeout;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn create(&self) -> SessionHandle {
        let id = nanoid!();
        let handle = Arc::new(Mutex::new(SessionContext::new(id.clone(), self.threshold)));
        let mut sessions = self.sessions.write().await;
        self.make_room(&mut sessions);
        sessions.insert(id.clone(), handle.clone());
        tracing::debug!(session_id = %id, "Session created");
        handle
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Existing session for `id`, or a fresh one registered under that id.
    pub async fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.get(id).await {
            return handle;
        }

        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(id) {
            return handle.clone();
        }

        self.make_room(&mut sessions);
        tracing::debug!(session_id = %id, "Session created on first message");
        let handle = Arc::new(Mutex::new(SessionContext::new(id, self.threshold)));
        sessions.insert(id.to_string(), handle.clone());
        handle
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle past the timeout. Returns how many were removed.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.remove_idle(&mut sessions)
    }

    fn idle_cutoff(&self) -> Option<DateTime<Utc>> {
        let timeout = chrono::Duration::from_std(self.idle_timeout?).ok()?;
        Utc::now().checked_sub_signed(timeout)
    }

    fn remove_idle(&self, sessions: &mut SessionMap) -> usize {
        let Some(cutoff) = self.idle_cutoff() else {
            return 0;
        };

        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(ctx) => ctx.updated_at >= cutoff,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "Expired idle sessions");
        }
        removed
    }

    fn make_room(&self, sessions: &mut SessionMap) {
        if sessions.len() < self.max_sessions {
            return;
        }
        self.remove_idle(sessions);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter_map(|(id, handle)| {
                    handle.try_lock().ok().map(|ctx| (ctx.updated_at, id.clone()))
                })
                .min();
            let Some((_, id)) = oldest else {
                break;
            };
            sessions.remove(&id);
            tracing::info!(session_id = %id, "Session cap reached, evicted least recently active session");
        }
    }
}
