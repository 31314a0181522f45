//! Social multiplier
//!
//! Everyone earns faster while more people focus at the same time. The
//! count must be read fresh for every computation; a user who just stopped
//! must no longer lift anyone's rate.

use serde::Serialize;

use crate::config::EconomyConfig;

/// Shared multiplier for `active_focusing_users` concurrent sessions
///
/// Equals the head count, with a floor of 1.0 for zero or one user.
pub fn social_multiplier(active_focusing_users: i64) -> f64 {
    (active_focusing_users.max(0) as f64).max(1.0)
}

/// Snapshot returned by the social-rate query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialRate {
    pub active_users_count: i64,
    pub social_multiplier: f64,
    /// What a player with a personal rate of 1.0 earns per hour right now
    pub credits_per_hour: f64,
}

impl SocialRate {
    pub fn from_active_count(active_focusing_users: i64, config: &EconomyConfig) -> Self {
        let multiplier = social_multiplier(active_focusing_users);
        Self {
            active_users_count: active_focusing_users.max(0),
            social_multiplier: multiplier,
            credits_per_hour: config.base_credits_per_hour * multiplier,
        }
    }
}
