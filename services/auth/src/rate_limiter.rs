//! Rate limiter for preventing brute force attacks on login

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum number of failed attempts allowed inside the window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300, // 5 minutes
            ban_seconds: 900,    // 15 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Load from `LOGIN_MAX_ATTEMPTS`, `LOGIN_WINDOW_SECONDS` and
    /// `LOGIN_BAN_SECONDS`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("max_attempts", defaults.max_attempts)?
            .set_default("window_seconds", defaults.window_seconds)?
            .set_default("ban_seconds", defaults.ban_seconds)?
            .add_source(Environment::with_prefix("LOGIN").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    attempts: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    /// Neither banned nor inside an open window
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        match self.ban_expires {
            Some(expires) => now >= expires,
            None => now.duration_since(self.window_start) >= window,
        }
    }
}

/// In-memory failure counter keyed by username
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `key` may attempt to log in now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let ban_expires = entries.get(key).and_then(|entry| entry.ban_expires);

        match ban_expires {
            Some(expires) if now < expires => false,
            Some(_) => {
                entries.remove(key);
                true
            }
            None => true,
        }
    }

    /// Record a failed attempt, banning the key once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        entries.retain(|_, entry| !entry.is_expired(now, window));

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            window_start: now,
            ban_expires: None,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        entry.attempts += 1;

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_seconds));
            warn!(
                "Too many failed logins for {}, locked for {} seconds",
                key, self.config.ban_seconds
            );
        }
    }

    /// Forget the failures of `key` after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}
