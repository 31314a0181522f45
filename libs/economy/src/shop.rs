//! Buying and applying passes
//!
//! `purchase` runs every check before it touches either player, so an error
//! always means nothing changed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{PassDefinition, PassEffect, PassKind, Recipients};
use crate::config::EconomyConfig;
use crate::effects::TemporaryEffect;
use crate::error::{EconomyError, EconomyResult};
use crate::notification::{Notification, NotificationKind};
use crate::player::Player;
use crate::trade::TradeRequest;

/// Row appended to the purchase log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pass_id: String,
    pub target_user_id: Option<Uuid>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Everything a successful purchase produced, for the caller to persist
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOutcome {
    pub pass: PassDefinition,
    pub record: PurchaseRecord,
    pub new_effects: Vec<TemporaryEffect>,
    pub trade_request: Option<TradeRequest>,
    pub notifications: Vec<Notification>,
    pub requires_consent: bool,
}

/// Look up a pass that can be bought right now
pub fn find_pass(pass_id: &str) -> EconomyResult<PassDefinition> {
    let kind: PassKind = pass_id
        .parse()
        .map_err(|_| EconomyError::UnknownPass(pass_id.to_string()))?;

    kind.definition()
        .ok_or_else(|| EconomyError::PassUnavailable(kind.name().to_string()))
}

/// Check a purchase without applying it
///
/// `target` is the row loaded for `target_id`, or `None` if no such user
/// exists. Targets passed to untargeted passes are ignored.
pub fn validate(
    buyer: &Player,
    pass_id: &str,
    target_id: Option<Uuid>,
    target: Option<&Player>,
) -> EconomyResult<PassDefinition> {
    let pass = find_pass(pass_id)?;

    if pass.requires_target {
        let target_id = target_id.ok_or_else(|| EconomyError::MissingTarget(pass.name.to_string()))?;
        if target_id == buyer.id {
            return Err(EconomyError::SelfTarget(pass.name.to_string()));
        }
        match target {
            Some(found) if found.id == target_id => {}
            _ => return Err(EconomyError::TargetNotFound(target_id)),
        }
    }

    if !buyer.can_afford(pass.price) {
        return Err(EconomyError::InsufficientCredits {
            required: pass.price,
            available: buyer.credits,
        });
    }

    Ok(pass)
}

/// Buy `pass_id` for `buyer`, optionally aimed at `target`
pub fn purchase(
    buyer: &mut Player,
    pass_id: &str,
    target_id: Option<Uuid>,
    target: Option<&mut Player>,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> EconomyResult<PurchaseOutcome> {
    let pass = validate(buyer, pass_id, target_id, target.as_deref())?;
    let target = match target {
        Some(target) if pass.requires_target => Some(target),
        None if pass.requires_target => {
            return Err(EconomyError::MissingTarget(pass.name.to_string()));
        }
        _ => None,
    };

    let record = PurchaseRecord {
        id: Uuid::new_v4(),
        user_id: buyer.id,
        pass_id: pass.id.to_string(),
        target_user_id: target.as_ref().map(|t| t.id),
        price: pass.price,
        created_at: now,
    };

    let mut new_effects = Vec::new();
    let mut trade_request = None;
    let mut notifications = Vec::new();

    // Effects are applied before the charge; the only failing arm runs
    // before either player is touched.
    match (pass.effect, target) {
        (PassEffect::LevelUp { levels }, _) => {
            buyer.level += levels;
        }
        (PassEffect::PermanentRate { delta }, _) => {
            buyer.credit_rate_multiplier += delta;
        }
        (
            PassEffect::TemporaryRate {
                kind,
                delta,
                duration_hours,
                recipients,
            },
            Some(target),
        ) => {
            let lifetime = Duration::hours(duration_hours);
            new_effects.push(TemporaryEffect::new(
                target.id, kind, delta, buyer.id, now, lifetime,
            ));

            match recipients {
                Recipients::Target => {
                    notifications.push(Notification::new(
                        target.id,
                        NotificationKind::PassUsed,
                        format!("{} used {} on you", buyer.username, pass.name),
                        Some(buyer.id),
                        now,
                    ));
                }
                Recipients::BuyerAndTarget => {
                    new_effects.push(TemporaryEffect::new(
                        buyer.id, kind, delta, buyer.id, now, lifetime,
                    ));
                    notifications.push(Notification::new(
                        target.id,
                        NotificationKind::AllyFormed,
                        format!(
                            "{} formed an alliance with you: +{:.1}x for {} hours",
                            buyer.username, delta, duration_hours
                        ),
                        Some(buyer.id),
                        now,
                    ));
                }
            }
        }
        (PassEffect::ResetCredits, Some(target)) => {
            target.credits = 0.0;
            notifications.push(Notification::new(
                target.id,
                NotificationKind::PassUsed,
                format!("{} used {} on you", buyer.username, pass.name),
                Some(buyer.id),
                now,
            ));
        }
        (PassEffect::TradeRequest, Some(target)) => {
            trade_request = Some(TradeRequest::new(
                record.id,
                buyer.id,
                target.id,
                now,
                config.trade_request_ttl(),
            ));
            notifications.push(Notification::new(
                target.id,
                NotificationKind::TradeRequested,
                format!("{} wants to trade credit rates with you", buyer.username),
                Some(buyer.id),
                now,
            ));
        }
        (PassEffect::TemporaryRate { .. }, None)
        | (PassEffect::ResetCredits, None)
        | (PassEffect::TradeRequest, None) => {
            return Err(EconomyError::MissingTarget(pass.name.to_string()));
        }
    }

    buyer.charge(pass.price);

    info!(
        buyer_id = %buyer.id,
        pass_id = pass.id,
        target_id = ?record.target_user_id,
        price = pass.price,
        "Pass purchased"
    );

    Ok(PurchaseOutcome {
        requires_consent: pass.requires_consent(),
        pass,
        record,
        new_effects,
        trade_request,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use crate::rate;
    use crate::trade::TradeStatus;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn rich(name: &str) -> Player {
        let mut player = Player::new(Uuid::new_v4(), name);
        player.credits = 1_000.0;
        player
    }

    fn buy(
        buyer: &mut Player,
        pass_id: &str,
        target: Option<&mut Player>,
    ) -> EconomyResult<PurchaseOutcome> {
        let target_id = target.as_ref().map(|t| t.id);
        purchase(buyer, pass_id, target_id, target, t0(), &EconomyConfig::default())
    }

    #[test]
    fn test_level_pass_raises_level_and_charges_price() {
        let mut buyer = rich("alice");
        let outcome = buy(&mut buyer, "level_pass", None).unwrap();

        assert_eq!(buyer.level, 2);
        assert_eq!(buyer.credits, 900.0);
        assert_eq!(outcome.record.price, 100.0);
        assert!(outcome.notifications.is_empty());
        assert!(!outcome.requires_consent);
    }

    #[test]
    fn test_progression_pass_stacks_without_bound() {
        let mut buyer = rich("alice");
        for _ in 0..3 {
            buy(&mut buyer, "progression_pass", None).unwrap();
        }
        assert_eq!(buyer.credit_rate_multiplier, 2.5);
        assert_eq!(buyer.credits, 760.0);
    }

    #[test]
    fn test_untargeted_pass_ignores_a_supplied_target() {
        let mut buyer = rich("alice");
        let mut bystander = rich("bob");
        let outcome = buy(&mut buyer, "level_pass", Some(&mut bystander)).unwrap();

        assert_eq!(outcome.record.target_user_id, None);
        assert_eq!(bystander.level, 1);
    }

    #[test]
    fn test_degression_targets_only_the_rival() {
        let mut buyer = rich("alice");
        let mut rival = rich("bob");
        let outcome = buy(&mut buyer, "degression_pass", Some(&mut rival)).unwrap();

        assert_eq!(outcome.new_effects.len(), 1);
        let effect = &outcome.new_effects[0];
        assert_eq!(effect.user_id, rival.id);
        assert_eq!(effect.kind, EffectKind::Degression);
        assert_eq!(effect.magnitude, -0.5);
        assert_eq!(effect.expires_at, t0() + Duration::hours(24));
        assert_eq!(effect.applied_by, buyer.id);
        assert_eq!(outcome.notifications[0].user_id, rival.id);
        assert_eq!(outcome.notifications[0].kind, NotificationKind::PassUsed);
    }

    #[test]
    fn test_progression_then_degression_nets_out() {
        let mut me = rich("alice");
        let mut rival = rich("bob");
        buy(&mut me, "progression_pass", None).unwrap();
        let outcome = buy(&mut rival, "degression_pass", Some(&mut me)).unwrap();

        let during = rate::resolve(&me, &outcome.new_effects, 1, t0() + Duration::hours(1));
        assert_eq!(during.personal_rate, 1.0);
        let after = rate::resolve(&me, &outcome.new_effects, 1, t0() + Duration::hours(24));
        assert_eq!(after.personal_rate, 1.5);
    }

    #[test]
    fn test_reset_pass_zeroes_target_balance() {
        let mut buyer = rich("alice");
        let mut rival = rich("bob");
        buy(&mut buyer, "reset_pass", Some(&mut rival)).unwrap();

        assert_eq!(rival.credits, 0.0);
        assert_eq!(buyer.credits, 500.0);
    }

    #[test]
    fn test_ally_token_boosts_both_parties_for_three_hours() {
        let mut buyer = rich("alice");
        let mut ally = rich("bob");
        let outcome = buy(&mut buyer, "ally_token", Some(&mut ally)).unwrap();

        let owners: Vec<_> = outcome.new_effects.iter().map(|e| e.user_id).collect();
        assert!(owners.contains(&buyer.id));
        assert!(owners.contains(&ally.id));

        let inside = t0() + Duration::hours(2) + Duration::minutes(59);
        let outside = t0() + Duration::hours(3) + Duration::minutes(1);
        for player in [&buyer, &ally] {
            assert_eq!(rate::effective_rate(player, &outcome.new_effects, 1, inside), 2.0);
            assert_eq!(rate::effective_rate(player, &outcome.new_effects, 1, outside), 1.0);
        }
        assert_eq!(outcome.notifications[0].kind, NotificationKind::AllyFormed);
    }

    #[test]
    fn test_trade_pass_opens_pending_request_only() {
        let mut buyer = rich("alice");
        let mut partner = rich("bob");
        partner.credit_rate_multiplier = 3.0;
        let outcome = buy(&mut buyer, "trade_pass", Some(&mut partner)).unwrap();

        let request = outcome.trade_request.unwrap();
        assert!(outcome.requires_consent);
        assert_eq!(request.status, TradeStatus::Pending);
        assert_eq!(request.purchase_id, outcome.record.id);
        assert_eq!(request.expires_at, t0() + Duration::hours(24));
        assert_eq!(buyer.credit_rate_multiplier, 1.0);
        assert_eq!(partner.credit_rate_multiplier, 3.0);
    }

    #[test]
    fn test_validation_order_unknown_pass_first() {
        let mut buyer = Player::new(Uuid::new_v4(), "alice");
        let err = buy(&mut buyer, "golden_pass", None).unwrap_err();
        assert_eq!(err, EconomyError::UnknownPass("golden_pass".into()));
    }

    #[test]
    fn test_undefined_pass_cannot_be_bought() {
        let mut buyer = rich("alice");
        let err = buy(&mut buyer, "mirror_pass", None).unwrap_err();
        assert_eq!(err, EconomyError::PassUnavailable("Mirror Pass".into()));
        assert_eq!(buyer.credits, 1_000.0);
    }

    #[test]
    fn test_missing_target_reported_before_insufficient_credits() {
        let mut broke = Player::new(Uuid::new_v4(), "alice");
        let err = buy(&mut broke, "degression_pass", None).unwrap_err();
        assert_eq!(err, EconomyError::MissingTarget("Degression Pass".into()));
    }

    #[test]
    fn test_self_target_is_rejected() {
        let mut buyer = rich("alice");
        let own_id = buyer.id;
        let err = purchase(
            &mut buyer,
            "reset_pass",
            Some(own_id),
            None,
            t0(),
            &EconomyConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err, EconomyError::SelfTarget("Reset Pass".into()));
        assert_eq!(buyer.credits, 1_000.0);
    }

    #[test]
    fn test_unknown_target_reported_before_insufficient_credits() {
        let mut broke = Player::new(Uuid::new_v4(), "alice");
        let ghost = Uuid::new_v4();
        let err = purchase(
            &mut broke,
            "ally_token",
            Some(ghost),
            None,
            t0(),
            &EconomyConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err, EconomyError::TargetNotFound(ghost));
    }

    #[test]
    fn test_insufficient_credits_changes_nothing() {
        let mut buyer = Player::new(Uuid::new_v4(), "alice");
        buyer.credits = 499.0;
        let mut rival = rich("bob");
        let (buyer_before, rival_before) = (buyer.clone(), rival.clone());

        let err = buy(&mut buyer, "reset_pass", Some(&mut rival)).unwrap_err();

        assert_eq!(
            err,
            EconomyError::InsufficientCredits {
                required: 500.0,
                available: 499.0
            }
        );
        assert_eq!(buyer, buyer_before);
        assert_eq!(rival, rival_before);
    }

    #[test]
    fn test_targeted_pass_without_loaded_target_changes_nothing() {
        let mut buyer = rich("alice");
        let before = buyer.clone();

        for pass_id in ["degression_pass", "reset_pass", "ally_token", "trade_pass"] {
            let err = purchase(
                &mut buyer,
                pass_id,
                Some(Uuid::new_v4()),
                None,
                t0(),
                &EconomyConfig::default(),
            )
            .unwrap_err();

            assert!(matches!(err, EconomyError::TargetNotFound(_)), "{pass_id}");
            assert_eq!(buyer, before, "{pass_id}");
        }
    }

    #[test]
    fn test_sequential_purchases_cannot_overspend() {
        let mut buyer = Player::new(Uuid::new_v4(), "alice");
        buyer.credits = 150.0;

        buy(&mut buyer, "level_pass", None).unwrap();
        let err = buy(&mut buyer, "progression_pass", None).unwrap_err();

        assert!(matches!(err, EconomyError::InsufficientCredits { .. }));
        assert_eq!(buyer.credits, 50.0);
        assert_eq!(buyer.credit_rate_multiplier, 1.0);
    }

    #[test]
    fn test_exact_balance_is_enough() {
        let mut buyer = Player::new(Uuid::new_v4(), "alice");
        buyer.credits = 80.0;
        buy(&mut buyer, "progression_pass", None).unwrap();
        assert_eq!(buyer.credits, 0.0);
    }
}
