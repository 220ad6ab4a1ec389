//! Play-session tracking
//!
//! A session groups consecutive games. It starts explicitly or lazily on the
//! first game, ends on request, on host unload, or after an inactivity
//! window, and is mirrored to a [`KeyValueStore`] so a restarted host can
//! pick it up again.
//!
//! ```
//! use std::sync::Arc;
//! use tetris_sim_session::{ManualClock, MemoryStore, SessionConfig, SessionTracker};
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let mut tracker = SessionTracker::new(
//!     Arc::new(MemoryStore::new()),
//!     clock.clone(),
//!     SessionConfig::default(),
//! );
//!
//! let session = tracker.on_game_start();
//! assert_eq!(session.game_count, 1);
//!
//! clock.advance(SessionConfig::default().timeout_ms);
//! assert!(tracker.get_current_session().is_none());
//! assert_eq!(tracker.history().len(), 1);
//! ```

pub mod config;
pub mod session;
pub mod store;
pub mod tracker;
pub mod watcher;

pub use tetris_sim_core::clock;
pub use tetris_sim_core::types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, CURRENT_SESSION_KEY, SESSION_HISTORY_KEY};
pub use session::{EndReason, Session, SessionEvent, SessionStats};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use tracker::{Listener, SessionTracker, SubscriptionId};
pub use watcher::{ExpiryWatcher, SharedTracker};
