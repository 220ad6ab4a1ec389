//! Session tracker configuration

use std::time::Duration;

use crate::types::{SESSION_HISTORY_LIMIT, SESSION_TIMEOUT_MS};

/// Storage key holding the active session
pub const CURRENT_SESSION_KEY: &str = "current-session";

/// Storage key holding completed sessions
pub const SESSION_HISTORY_KEY: &str = "session-history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Inactivity window before an active session expires
    pub timeout_ms: u64,
    /// Completed sessions kept in history (oldest evicted first)
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: SESSION_TIMEOUT_MS,
            history_limit: SESSION_HISTORY_LIMIT,
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    ///
    /// - `TETRIS_SESSION_TIMEOUT_SECS`: inactivity timeout (default 1800)
    /// - `TETRIS_SESSION_HISTORY_LIMIT`: history cap (default 100)
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let timeout_ms = env::var("TETRIS_SESSION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| parse_timeout_ms(&s))
            .unwrap_or(defaults.timeout_ms);
        let history_limit = env::var("TETRIS_SESSION_HISTORY_LIMIT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.history_limit);

        Self {
            timeout_ms,
            history_limit,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Seconds to milliseconds; zero, garbage and overflow are rejected
fn parse_timeout_ms(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&secs| secs > 0)
        .and_then(|secs| secs.checked_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30 * 60));
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(parse_timeout_ms(" 90 "), Some(90_000));
        assert_eq!(parse_timeout_ms("0"), None);
        assert_eq!(parse_timeout_ms("soon"), None);
        assert_eq!(parse_timeout_ms(&u64::MAX.to_string()), None);
        assert_eq!(parse_timeout_ms(&(u64::MAX / 1000 + 1).to_string()), None);
        assert_eq!(
            parse_timeout_ms(&(u64::MAX / 1000).to_string()),
            Some(u64::MAX / 1000 * 1000)
        );
    }
}
