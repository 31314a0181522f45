//! The economic state of one user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as seen by the game rules
///
/// Credentials and profile text live elsewhere; this is only the part of a
/// user that sessions, passes and tasks read and write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    /// Balance, never negative, may be fractional
    pub credits: f64,
    /// Minutes spent focusing, only ever grows
    pub total_focus_time: i64,
    pub level: i32,
    /// Permanent personal multiplier
    pub credit_rate_multiplier: f64,
    pub completed_tasks: i32,
    pub is_focusing: bool,
    pub current_session_start: Option<DateTime<Utc>>,
}

impl Player {
    /// A freshly registered player
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            credits: 0.0,
            total_focus_time: 0,
            level: 1,
            credit_rate_multiplier: 1.0,
            completed_tasks: 0,
            is_focusing: false,
            current_session_start: None,
        }
    }

    pub fn can_afford(&self, price: f64) -> bool {
        self.credits >= price
    }

    /// Add credits to the balance; negative amounts are ignored
    pub fn award(&mut self, amount: f64) {
        if amount > 0.0 {
            self.credits += amount;
        }
    }

    /// Take `amount` from the balance, never going below zero
    pub(crate) fn charge(&mut self, amount: f64) {
        self.credits = (self.credits - amount).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_at_level_one_with_unit_multiplier() {
        let player = Player::new(Uuid::new_v4(), "ada");
        assert_eq!(player.level, 1);
        assert_eq!(player.credit_rate_multiplier, 1.0);
        assert_eq!(player.credits, 0.0);
        assert!(!player.is_focusing);
    }

    #[test]
    fn test_balance_never_goes_negative() {
        let mut player = Player::new(Uuid::new_v4(), "ada");
        player.award(10.0);
        player.award(-50.0);
        assert_eq!(player.credits, 10.0);

        player.charge(25.0);
        assert_eq!(player.credits, 0.0);
    }
}
