//! Tunable economy constants
//!
//! The credits-per-hour baseline changed between releases (10, later 30), so
//! it is a deployment setting rather than a literal in the settlement code.

use chrono::Duration;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Economy configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Credits awarded for sixty focused minutes at an effective rate of 1.0
    pub base_credits_per_hour: f64,
    /// Reward for completing a personal task
    pub personal_task_reward: f64,
    /// Reward for completing a weekly task
    pub weekly_task_reward: f64,
    /// How long a trade request waits for the target's answer
    pub trade_request_ttl_hours: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_credits_per_hour: 10.0,
            personal_task_reward: 3.0,
            weekly_task_reward: 10.0,
            trade_request_ttl_hours: 24,
        }
    }
}

impl EconomyConfig {
    /// Load the configuration from `ECONOMY_*` environment variables
    ///
    /// # Environment Variables
    /// - `ECONOMY_BASE_CREDITS_PER_HOUR` (default: 10)
    /// - `ECONOMY_PERSONAL_TASK_REWARD` (default: 3)
    /// - `ECONOMY_WEEKLY_TASK_REWARD` (default: 10)
    /// - `ECONOMY_TRADE_REQUEST_TTL_HOURS` (default: 24)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config: Self = Config::builder()
            .set_default("base_credits_per_hour", defaults.base_credits_per_hour)?
            .set_default("personal_task_reward", defaults.personal_task_reward)?
            .set_default("weekly_task_reward", defaults.weekly_task_reward)?
            .set_default("trade_request_ttl_hours", defaults.trade_request_ttl_hours)?
            .add_source(Environment::with_prefix("ECONOMY").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let amounts = [
            ("base_credits_per_hour", self.base_credits_per_hour),
            ("personal_task_reward", self.personal_task_reward),
            ("weekly_task_reward", self.weekly_task_reward),
        ];

        for (key, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        if self.trade_request_ttl_hours <= 0 {
            return Err(ConfigError::Message(format!(
                "trade_request_ttl_hours must be positive, got {}",
                self.trade_request_ttl_hours
            )));
        }

        Ok(())
    }

    /// Credits per focused minute at an effective rate of 1.0
    pub fn credits_per_minute(&self) -> f64 {
        self.base_credits_per_hour / 60.0
    }

    pub fn trade_request_ttl(&self) -> Duration {
        Duration::hours(self.trade_request_ttl_hours)
    }
}
