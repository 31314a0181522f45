//! Temporary rate modifiers
//!
//! An effect counts while `now < expires_at`. Nothing sweeps expired rows
//! for correctness: every read filters on the clock it is given.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// What created an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Rate penalty from a Degression Pass
    Degression,
    /// Rate bonus shared by both parties of an Ally Token
    AllyBoost,
}

impl EffectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Degression => "degression",
            EffectKind::AllyBoost => "ally_boost",
        }
    }
}

impl FromStr for EffectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "degression" => Ok(EffectKind::Degression),
            "ally_boost" => Ok(EffectKind::AllyBoost),
            other => Err(format!("unknown effect kind: {}", other)),
        }
    }
}

/// A time-boxed additive modifier on one user's personal rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    pub id: Uuid,
    /// Owner of the effect
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Signed delta added to the personal rate
    pub magnitude: f64,
    /// User whose purchase created the effect
    pub applied_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TemporaryEffect {
    pub fn new(
        user_id: Uuid,
        kind: EffectKind,
        magnitude: f64,
        applied_by: Uuid,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            magnitude,
            applied_by,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Effects owned by `user_id` that are still running at `now`
pub fn active_for<'a>(
    effects: &'a [TemporaryEffect],
    user_id: Uuid,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a TemporaryEffect> + 'a {
    effects
        .iter()
        .filter(move |effect| effect.user_id == user_id && effect.is_active(now))
}

/// Sum of the magnitudes of the user's running effects
pub fn temporary_modifier(effects: &[TemporaryEffect], user_id: Uuid, now: DateTime<Utc>) -> f64 {
    active_for(effects, user_id, now)
        .map(|effect| effect.magnitude)
        .sum()
}

/// Ids of effects that have run out at `now`, for physical deletion
pub fn expired_ids(effects: &[TemporaryEffect], now: DateTime<Utc>) -> Vec<Uuid> {
    effects
        .iter()
        .filter(|effect| !effect.is_active(now))
        .map(|effect| effect.id)
        .collect()
}
