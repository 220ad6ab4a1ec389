//! Play-session tracker
//!
//! State machine per session: **NoSession → Active → Ended** (expiry is an
//! Ended transition with [`EndReason::Timeout`]).
//!
//! The tracker is an ordinary service object: construct it once with a store
//! and a clock and pass it by reference (or share it behind a mutex with the
//! [`ExpiryWatcher`](crate::ExpiryWatcher)).
//!
//! The inactivity timer is a single deadline. Every state-changing call
//! replaces it, ending a session clears it, and every public call checks it
//! before doing anything else, so a session can never be resumed or extended
//! past its deadline.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{SessionConfig, CURRENT_SESSION_KEY, SESSION_HISTORY_KEY};
use crate::session::{EndReason, Session, SessionEvent, SessionStats};
use crate::store::{KeyValueStore, StorageError};

/// Subscriber callback
pub type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Token returned by [`SessionTracker::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct SessionTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    current: Option<Session>,
    /// Armed inactivity deadline (ms); `None` when no timer is pending
    deadline: Option<u64>,
    history: VecDeque<Session>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    /// Set after a storage failure; writes are skipped until the next session
    degraded: bool,
}

impl SessionTracker {
    /// Create a tracker and recover whatever state the store holds.
    ///
    /// A stored active session past its deadline is finalized with
    /// `end_time = start_time + timeout`; a younger one is resumed with its
    /// deadline still at `start_time + timeout`.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        let mut tracker = Self {
            store,
            clock,
            config,
            current: None,
            deadline: None,
            history: VecDeque::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            degraded: false,
        };
        tracker.history = tracker.load_history().unwrap_or_default();
        if let Some(stored) = tracker.load_current().flatten() {
            tracker.adopt(stored);
            if tracker.poll_deadline(EndReason::Recovered) {
                info!("finalized stale session recovered from storage");
            } else if let Some(session) = &tracker.current {
                info!(id = %session.id, "resumed session from storage");
            }
        }
        tracker
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register `listener` for every future transition
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Begin a new session, finalizing any active one first
    pub fn start_session(&mut self) -> Session {
        let now = self.clock.now_ms();
        self.poll_deadline(EndReason::Timeout);
        self.finalize(now, EndReason::Replaced);

        // A new session gets a fresh chance at durable storage.
        self.degraded = false;
        let session = Session::new(Uuid::new_v4().to_string(), now);
        info!(id = %session.id, "session started");
        self.current = Some(session.clone());
        self.arm(now);
        self.persist_current();
        self.notify(SessionEvent::Started(session.clone()));
        session
    }

    /// Record a game start, lazily starting a session if none is active
    pub fn on_game_start(&mut self) -> Session {
        self.poll_deadline(EndReason::Timeout);
        if self.current.is_none() {
            self.start_session();
        }
        let now = self.clock.now_ms();
        let mut session = self
            .current
            .take()
            .unwrap_or_else(|| Session::new(Uuid::new_v4().to_string(), now));
        session.game_count += 1;
        self.current = Some(session.clone());
        debug!(id = %session.id, games = session.game_count, "game started");
        self.arm(now);
        self.persist_current();
        self.notify(SessionEvent::GameStarted(session.clone()));
        session
    }

    /// End the active session by caller request
    pub fn end_current_session(&mut self) -> Option<Session> {
        self.end_with(EndReason::Manual)
    }

    /// The host context is unloading: end the session now
    pub fn handle_unload(&mut self) -> Option<Session> {
        self.end_with(EndReason::Unload)
    }

    fn end_with(&mut self, reason: EndReason) -> Option<Session> {
        if self.poll_deadline(EndReason::Timeout) {
            return None;
        }
        let now = self.clock.now_ms();
        self.finalize(now, reason)
    }

    /// Active session after applying any pending expiry
    pub fn get_current_session(&mut self) -> Option<Session> {
        self.poll_deadline(EndReason::Timeout);
        self.current.clone()
    }

    /// Active session as last observed, without checking the deadline
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Completed sessions, oldest first
    pub fn history(&self) -> &VecDeque<Session> {
        &self.history
    }

    /// Pending inactivity deadline, if a session is active
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// True while storage writes are suspended after a failure
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Fire the inactivity timer if it is due. Returns true if a session expired.
    pub fn poll_timeout(&mut self) -> bool {
        self.poll_deadline(EndReason::Timeout)
    }

    /// Re-read both keys from storage; the last writer wins.
    ///
    /// Used when another execution context may have changed the session.
    pub fn refresh_from_storage(&mut self) {
        // Storage lags memory while degraded, so it cannot win.
        if self.degraded {
            debug!("skipping refresh while storage is degraded");
            return;
        }
        if let Some(history) = self.load_history() {
            self.history = history;
        }
        let Some(stored) = self.load_current() else {
            return;
        };

        match stored {
            Some(session) => {
                let same = self.current.as_ref().is_some_and(|c| c.id == session.id);
                if same {
                    self.current = Some(session);
                } else {
                    self.adopt(session);
                }
                self.poll_deadline(EndReason::Recovered);
            }
            None => {
                if self.current.take().is_some() {
                    debug!("active session was ended elsewhere");
                }
                self.deadline = None;
            }
        }
        self.notify(SessionEvent::Synced(self.current.clone()));
    }

    /// Totals over history plus the active session
    pub fn stats(&self) -> SessionStats {
        let now = self.clock.now_ms();
        let mut stats = SessionStats::default();
        for session in self.history.iter().chain(self.current.iter()) {
            stats.total_sessions += 1;
            stats.total_games += u64::from(session.game_count);
            let end = session.end_time.unwrap_or(now);
            stats.total_play_time_ms += end.saturating_sub(session.start_time);
        }
        if stats.total_sessions > 0 {
            stats.average_session_ms = stats.total_play_time_ms / stats.total_sessions as u64;
        }
        stats
    }

    /// Adopt a stored session; inactive records are ignored
    fn adopt(&mut self, session: Session) {
        if !session.is_active {
            self.current = None;
            self.deadline = None;
            return;
        }
        self.deadline = Some(session.start_time.saturating_add(self.config.timeout_ms));
        self.current = Some(session);
    }

    /// Replace any pending timer with one `timeout` after `now`
    fn arm(&mut self, now: u64) {
        self.deadline = Some(now.saturating_add(self.config.timeout_ms));
    }

    fn poll_deadline(&mut self, reason: EndReason) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if self.current.is_none() || self.clock.now_ms() < deadline {
            return false;
        }
        self.finalize(deadline, reason).is_some()
    }

    /// Move the active session into history
    fn finalize(&mut self, end_time: u64, reason: EndReason) -> Option<Session> {
        self.deadline = None;
        let mut session = self.current.take()?;
        session.end_time = Some(end_time);
        session.is_active = false;
        info!(
            id = %session.id,
            games = session.game_count,
            duration_ms = session.duration_ms().unwrap_or(0),
            ?reason,
            "session ended"
        );

        self.history.push_back(session.clone());
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }

        self.persist_current();
        self.persist_history();
        self.notify(SessionEvent::Ended {
            session: session.clone(),
            reason,
        });
        Some(session)
    }

    fn notify(&mut self, event: SessionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn load_current(&self) -> Option<Option<Session>> {
        self.read_json(CURRENT_SESSION_KEY)
    }

    /// Stored history, trimmed to the configured cap oldest first
    fn load_history(&self) -> Option<VecDeque<Session>> {
        let mut history = self
            .read_json::<VecDeque<Session>>(SESSION_HISTORY_KEY)?
            .unwrap_or_default();
        if history.len() > self.config.history_limit {
            debug!(
                stored = history.len(),
                limit = self.config.history_limit,
                "trimming stored session history"
            );
        }
        while history.len() > self.config.history_limit {
            history.pop_front();
        }
        Some(history)
    }

    /// `None` when the read failed; `Some(None)` when the key is absent
    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<Option<T>> {
        let result = self.store.get(key).and_then(|raw| {
            raw.map(|s| serde_json::from_str(&s).map_err(StorageError::from))
                .transpose()
        });
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "failed to read session storage");
                None
            }
        }
    }

    fn persist_current(&mut self) {
        let value = match &self.current {
            Some(session) => serde_json::to_string(session).map(Some),
            None => Ok(None),
        };
        self.write(CURRENT_SESSION_KEY, value);
    }

    fn persist_history(&mut self) {
        let value = serde_json::to_string(&self.history).map(Some);
        self.write(SESSION_HISTORY_KEY, value);
    }

    fn write(&mut self, key: &str, value: Result<Option<String>, serde_json::Error>) {
        if self.degraded {
            return;
        }
        let result = value.map_err(StorageError::from).and_then(|v| match v {
            Some(json) => self.store.set(key, &json),
            None => self.store.remove(key),
        });
        if let Err(e) = result {
            warn!(key, error = %e, "session storage unavailable; continuing in memory");
            self.degraded = true;
        }
    }
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("current", &self.current)
            .field("deadline", &self.deadline)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .field("degraded", &self.degraded)
            .finish()
    }
}
