//! Effective rate resolution
//!
//! `effective = max(0, permanent + running temporary effects) * social`

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::effects::{self, TemporaryEffect};
use crate::player::Player;
use crate::social::social_multiplier;

/// Every factor that went into a player's rate, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateBreakdown {
    /// Permanent multiplier from the player record
    pub personal_multiplier: f64,
    /// Sum of running temporary effects
    pub temporary_modifier: f64,
    /// `personal_multiplier + temporary_modifier`, floored at zero
    pub personal_rate: f64,
    pub active_users_count: i64,
    pub social_multiplier: f64,
    pub effective_rate: f64,
}

/// Resolve a player's rate at `now`
///
/// Effects belonging to other users or already expired are ignored, so the
/// caller may pass an unfiltered slice.
pub fn resolve(
    player: &Player,
    effects: &[TemporaryEffect],
    active_focusing_users: i64,
    now: DateTime<Utc>,
) -> RateBreakdown {
    let temporary_modifier = effects::temporary_modifier(effects, player.id, now);
    let personal_rate = (player.credit_rate_multiplier + temporary_modifier).max(0.0);
    let social = social_multiplier(active_focusing_users);

    RateBreakdown {
        personal_multiplier: player.credit_rate_multiplier,
        temporary_modifier,
        personal_rate,
        active_users_count: active_focusing_users.max(0),
        social_multiplier: social,
        effective_rate: personal_rate * social,
    }
}

pub fn effective_rate(
    player: &Player,
    effects: &[TemporaryEffect],
    active_focusing_users: i64,
    now: DateTime<Utc>,
) -> f64 {
    resolve(player, effects, active_focusing_users, now).effective_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use chrono::Duration;
    use uuid::Uuid;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn player() -> Player {
        Player::new(Uuid::new_v4(), "grace")
    }

    #[test]
    fn test_new_player_alone_earns_at_the_floor() {
        assert_eq!(effective_rate(&player(), &[], 0, start()), 1.0);
        assert_eq!(effective_rate(&player(), &[], 1, start()), 1.0);
    }

    #[test]
    fn test_social_multiplier_scales_personal_rate() {
        let mut p = player();
        p.credit_rate_multiplier = 1.5;
        assert_eq!(effective_rate(&p, &[], 2, start()), 3.0);
    }

    #[test]
    fn test_progression_then_degression_cancels_until_expiry() {
        let mut p = player();
        p.credit_rate_multiplier += 0.5;
        let degression = TemporaryEffect::new(
            p.id,
            EffectKind::Degression,
            -0.5,
            Uuid::new_v4(),
            start(),
            Duration::hours(24),
        );
        let effects = [degression];

        let during = resolve(&p, &effects, 1, start() + Duration::hours(12));
        assert_eq!(during.personal_rate, 1.0);

        let after = resolve(&p, &effects, 1, start() + Duration::hours(24));
        assert_eq!(after.personal_rate, 1.5);
        assert_eq!(after.temporary_modifier, 0.0);
    }

    #[test]
    fn test_personal_rate_is_clamped_at_zero() {
        let mut p = player();
        p.credit_rate_multiplier = 0.0;
        let effects: Vec<_> = (0..3)
            .map(|_| {
                TemporaryEffect::new(
                    p.id,
                    EffectKind::Degression,
                    -0.5,
                    Uuid::new_v4(),
                    start(),
                    Duration::hours(24),
                )
            })
            .collect();

        let breakdown = resolve(&p, &effects, 4, start());
        assert_eq!(breakdown.temporary_modifier, -1.5);
        assert_eq!(breakdown.personal_rate, 0.0);
        assert_eq!(breakdown.effective_rate, 0.0);
    }

    #[test]
    fn test_ally_bonus_window_is_three_hours() {
        let p = player();
        let ally = TemporaryEffect::new(
            p.id,
            EffectKind::AllyBoost,
            1.0,
            Uuid::new_v4(),
            start(),
            Duration::hours(3),
        );
        let effects = [ally];

        let inside = start() + Duration::hours(2) + Duration::minutes(59);
        let outside = start() + Duration::hours(3) + Duration::minutes(1);
        assert_eq!(effective_rate(&p, &effects, 1, inside), 2.0);
        assert_eq!(effective_rate(&p, &effects, 1, outside), 1.0);
    }

    #[test]
    fn test_rate_is_monotonic_in_focusing_count() {
        let mut p = player();
        p.credit_rate_multiplier = 0.75;
        let rates: Vec<f64> = (0..10)
            .map(|count| effective_rate(&p, &[], count, start()))
            .collect();

        assert!(rates.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
