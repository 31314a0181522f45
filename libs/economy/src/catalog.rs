//! The pass catalog
//!
//! Each purchasable pass maps to one [`PassEffect`] variant, and the shop
//! applies it through a single exhaustive match. Passes that are announced
//! but have no agreed mechanics yet have no definition and cannot be bought.

use serde::Serialize;
use std::str::FromStr;

use crate::effects::EffectKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    LevelPass,
    ProgressionPass,
    DegressionPass,
    ResetPass,
    AllyToken,
    TradePass,
    MirrorPass,
    DominancePass,
    TimeLoopPass,
    ImmunityPass,
    AssassinPass,
    FreezePass,
    InversionPass,
}

impl PassKind {
    pub const ALL: [PassKind; 13] = [
        PassKind::LevelPass,
        PassKind::ProgressionPass,
        PassKind::DegressionPass,
        PassKind::ResetPass,
        PassKind::AllyToken,
        PassKind::TradePass,
        PassKind::MirrorPass,
        PassKind::DominancePass,
        PassKind::TimeLoopPass,
        PassKind::ImmunityPass,
        PassKind::AssassinPass,
        PassKind::FreezePass,
        PassKind::InversionPass,
    ];

    /// Identifier used by clients and stored on purchases
    pub fn id(&self) -> &'static str {
        match self {
            PassKind::LevelPass => "level_pass",
            PassKind::ProgressionPass => "progression_pass",
            PassKind::DegressionPass => "degression_pass",
            PassKind::ResetPass => "reset_pass",
            PassKind::AllyToken => "ally_token",
            PassKind::TradePass => "trade_pass",
            PassKind::MirrorPass => "mirror_pass",
            PassKind::DominancePass => "dominance_pass",
            PassKind::TimeLoopPass => "time_loop_pass",
            PassKind::ImmunityPass => "immunity_pass",
            PassKind::AssassinPass => "assassin_pass",
            PassKind::FreezePass => "freeze_pass",
            PassKind::InversionPass => "inversion_pass",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PassKind::LevelPass => "Level Pass",
            PassKind::ProgressionPass => "Progression Pass",
            PassKind::DegressionPass => "Degression Pass",
            PassKind::ResetPass => "Reset Pass",
            PassKind::AllyToken => "Ally Token",
            PassKind::TradePass => "Trade Pass",
            PassKind::MirrorPass => "Mirror Pass",
            PassKind::DominancePass => "Dominance Pass",
            PassKind::TimeLoopPass => "Time Loop Pass",
            PassKind::ImmunityPass => "Immunity Pass",
            PassKind::AssassinPass => "Assassin Pass",
            PassKind::FreezePass => "Freeze Pass",
            PassKind::InversionPass => "Inversion Pass",
        }
    }

    /// The pass's rules, or `None` while its mechanics are undefined
    pub fn definition(&self) -> Option<PassDefinition> {
        let (description, price, item_type, requires_target, effect) = match self {
            PassKind::LevelPass => (
                "Instantly gain one level",
                100.0,
                ItemType::Boost,
                false,
                PassEffect::LevelUp { levels: 1 },
            ),
            PassKind::ProgressionPass => (
                "Permanently raise your credit rate by 0.5",
                80.0,
                ItemType::Boost,
                false,
                PassEffect::PermanentRate { delta: 0.5 },
            ),
            PassKind::DegressionPass => (
                "Lower a rival's credit rate by 0.5 for 24 hours",
                120.0,
                ItemType::Sabotage,
                true,
                PassEffect::TemporaryRate {
                    kind: EffectKind::Degression,
                    delta: -0.5,
                    duration_hours: 24,
                    recipients: Recipients::Target,
                },
            ),
            PassKind::ResetPass => (
                "Wipe out a rival's credit balance",
                500.0,
                ItemType::Sabotage,
                true,
                PassEffect::ResetCredits,
            ),
            PassKind::AllyToken => (
                "You and an ally both earn +1.0 rate for 3 hours",
                60.0,
                ItemType::Special,
                true,
                PassEffect::TemporaryRate {
                    kind: EffectKind::AllyBoost,
                    delta: 1.0,
                    duration_hours: 3,
                    recipients: Recipients::BuyerAndTarget,
                },
            ),
            PassKind::TradePass => (
                "Propose swapping credit rates with another player",
                50.0,
                ItemType::Special,
                true,
                PassEffect::TradeRequest,
            ),
            PassKind::MirrorPass
            | PassKind::DominancePass
            | PassKind::TimeLoopPass
            | PassKind::ImmunityPass
            | PassKind::AssassinPass
            | PassKind::FreezePass
            | PassKind::InversionPass => return None,
        };

        Some(PassDefinition {
            kind: *self,
            id: self.id(),
            name: self.name(),
            description,
            price,
            item_type,
            requires_target,
            effect,
        })
    }
}

impl FromStr for PassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PassKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown pass: {}", s))
    }
}

/// Shop category of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Boost,
    Sabotage,
    Special,
    Defensive,
}

/// Who receives a temporary effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipients {
    Target,
    BuyerAndTarget,
}

/// What buying a pass does
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PassEffect {
    /// Raise the buyer's level
    LevelUp { levels: i32 },
    /// Add to the buyer's permanent multiplier
    PermanentRate { delta: f64 },
    /// Attach a timed modifier to the recipients
    TemporaryRate {
        kind: EffectKind,
        delta: f64,
        duration_hours: i64,
        recipients: Recipients,
    },
    /// Set the target's balance to zero
    ResetCredits,
    /// Open a pending trade that the target must accept
    TradeRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassDefinition {
    #[serde(skip)]
    pub kind: PassKind,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub item_type: ItemType,
    pub requires_target: bool,
    pub effect: PassEffect,
}

impl PassDefinition {
    /// Whether the effect waits for the target's consent
    pub fn requires_consent(&self) -> bool {
        matches!(self.effect, PassEffect::TradeRequest)
    }
}

/// Every pass that can currently be bought, in display order
pub fn catalog() -> Vec<PassDefinition> {
    PassKind::ALL
        .iter()
        .filter_map(PassKind::definition)
        .collect()
}
