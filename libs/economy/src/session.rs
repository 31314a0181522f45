//! Focus session start and settlement
//!
//! Durations are truncated to whole minutes before paying out, so a session
//! shorter than one minute earns nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::config::EconomyConfig;
use crate::effects::TemporaryEffect;
use crate::error::{EconomyError, EconomyResult};
use crate::notification::{Notification, NotificationKind};
use crate::player::Player;
use crate::rate;

/// Result of closing a focus session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub credits_earned: f64,
    pub duration_minutes: i64,
    pub effective_rate: f64,
    /// Balance after the payout
    pub total_credits: f64,
    /// `None` when the session was stuck without a start time
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
    #[serde(skip)]
    pub notification: Notification,
}

/// Mark `player` as focusing from `now`
///
/// A player flagged as focusing but with no start time is a leftover from an
/// interrupted write; that flag is discarded and a fresh session begins.
pub fn start_session(player: &mut Player, now: DateTime<Utc>) -> EconomyResult<()> {
    if player.is_focusing {
        if player.current_session_start.is_some() {
            return Err(EconomyError::SessionAlreadyActive);
        }
        warn!(user_id = %player.id, "Discarding stuck focus flag without a start time");
    }

    player.is_focusing = true;
    player.current_session_start = Some(now);
    Ok(())
}

/// Whole minutes between `start` and `now`, never negative
pub fn elapsed_minutes(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_minutes().max(0)
}

/// Credits paid for `duration_minutes` at `effective_rate`
pub fn credits_for(duration_minutes: i64, effective_rate: f64, config: &EconomyConfig) -> f64 {
    duration_minutes as f64 * config.credits_per_minute() * effective_rate
}

/// Close the player's session and pay it out
///
/// `active_focusing_users` is the live count read in the same transaction and
/// still includes `player`. A stuck session (focusing without a start time)
/// is closed with a zero payout instead of failing.
pub fn end_session(
    player: &mut Player,
    effects: &[TemporaryEffect],
    active_focusing_users: i64,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> EconomyResult<Settlement> {
    if !player.is_focusing {
        return Err(EconomyError::NoActiveSession);
    }

    let effective_rate = rate::effective_rate(player, effects, active_focusing_users, now);
    let started_at = player.current_session_start;

    let (duration_minutes, credits_earned) = match started_at {
        Some(start) => {
            let minutes = elapsed_minutes(start, now);
            (minutes, credits_for(minutes, effective_rate, config))
        }
        None => {
            warn!(user_id = %player.id, "Closing stuck focus session with no start time");
            (0, 0.0)
        }
    };

    player.award(credits_earned);
    player.total_focus_time += duration_minutes;
    player.is_focusing = false;
    player.current_session_start = None;

    let notification = Notification::new(
        player.id,
        NotificationKind::SessionCompleted,
        format!(
            "Focus session complete: {} minutes, {:.2} credits earned",
            duration_minutes, credits_earned
        ),
        None,
        now,
    );

    Ok(Settlement {
        credits_earned,
        duration_minutes,
        effective_rate,
        total_credits: player.credits,
        started_at,
        ended_at: now,
        notification,
    })
}
