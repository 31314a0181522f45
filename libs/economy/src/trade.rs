//! Consent-based rate trades
//!
//! A Trade Pass only opens a request. Nothing changes hands until the target
//! accepts; a request nobody answers expires after the configured TTL. The
//! pass price is spent either way.
//!
//! ```text
//! pending -> accepted | rejected | expired
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{EconomyError, EconomyResult};
use crate::notification::{Notification, NotificationKind};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Accepted => "accepted",
            TradeStatus::Rejected => "rejected",
            TradeStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TradeStatus::Pending),
            "accepted" => Ok(TradeStatus::Accepted),
            "rejected" => Ok(TradeStatus::Rejected),
            "expired" => Ok(TradeStatus::Expired),
            other => Err(format!("unknown trade status: {}", other)),
        }
    }
}

/// The target's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub id: Uuid,
    /// Purchase that paid for the request
    pub purchase_id: Uuid,
    pub proposer_id: Uuid,
    pub target_id: Uuid,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TradeRequest {
    pub fn new(
        purchase_id: Uuid,
        proposer_id: Uuid,
        target_id: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            purchase_id,
            proposer_id,
            target_id,
            status: TradeStatus::Pending,
            created_at: now,
            expires_at: now + ttl,
            resolved_at: None,
        }
    }

    /// Pending but past its deadline
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status == TradeStatus::Pending && now >= self.expires_at
    }

    fn close(&mut self, status: TradeStatus, now: DateTime<Utc>) {
        self.status = status;
        self.resolved_at = Some(now);
    }
}

/// Outcome of answering a trade request
#[derive(Debug, Clone, PartialEq)]
pub struct TradeResolution {
    pub status: TradeStatus,
    pub notifications: Vec<Notification>,
}

/// Move a stale request to `Expired`, returning the proposer's notice
///
/// Returns `None` and leaves the request untouched when it is not stale.
pub fn expire_if_stale(trade: &mut TradeRequest, now: DateTime<Utc>) -> Option<Notification> {
    if !trade.is_stale(now) {
        return None;
    }

    trade.close(TradeStatus::Expired, now);
    Some(Notification::new(
        trade.proposer_id,
        NotificationKind::TradeExpired,
        "Your trade request expired without an answer",
        Some(trade.target_id),
        now,
    ))
}

/// Answer a pending trade request on behalf of `responder_id`
///
/// Accepting swaps the two players' permanent multipliers. A request found
/// stale at this point expires instead, whatever the decision.
pub fn respond(
    trade: &mut TradeRequest,
    responder_id: Uuid,
    decision: TradeDecision,
    proposer: &mut Player,
    target: &mut Player,
    now: DateTime<Utc>,
) -> EconomyResult<TradeResolution> {
    if responder_id != trade.target_id {
        return Err(EconomyError::NotTradeTarget);
    }
    if trade.status.is_terminal() {
        return Err(EconomyError::TradeAlreadyResolved(trade.status));
    }
    if proposer.id != trade.proposer_id {
        return Err(EconomyError::UserNotFound(trade.proposer_id));
    }
    if target.id != trade.target_id {
        return Err(EconomyError::UserNotFound(trade.target_id));
    }

    if let Some(notice) = expire_if_stale(trade, now) {
        info!(trade_id = %trade.id, "Trade request expired before it was answered");
        return Ok(TradeResolution {
            status: TradeStatus::Expired,
            notifications: vec![notice],
        });
    }

    let notice = match decision {
        TradeDecision::Accept => {
            std::mem::swap(
                &mut proposer.credit_rate_multiplier,
                &mut target.credit_rate_multiplier,
            );
            trade.close(TradeStatus::Accepted, now);
            info!(
                trade_id = %trade.id,
                proposer_id = %proposer.id,
                target_id = %target.id,
                "Trade accepted, credit rates swapped"
            );
            Notification::new(
                proposer.id,
                NotificationKind::TradeAccepted,
                format!(
                    "{} accepted your trade: your credit rate is now {:.1}x",
                    target.username, proposer.credit_rate_multiplier
                ),
                Some(target.id),
                now,
            )
        }
        TradeDecision::Reject => {
            trade.close(TradeStatus::Rejected, now);
            info!(trade_id = %trade.id, "Trade rejected");
            Notification::new(
                proposer.id,
                NotificationKind::TradeRejected,
                format!("{} rejected your trade", target.username),
                Some(target.id),
                now,
            )
        }
    };

    Ok(TradeResolution {
        status: trade.status,
        notifications: vec![notice],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn setup() -> (TradeRequest, Player, Player) {
        let mut proposer = Player::new(Uuid::new_v4(), "alice");
        proposer.credit_rate_multiplier = 1.0;
        let mut target = Player::new(Uuid::new_v4(), "bob");
        target.credit_rate_multiplier = 2.5;
        let trade = TradeRequest::new(
            Uuid::new_v4(),
            proposer.id,
            target.id,
            t0(),
            Duration::hours(24),
        );
        (trade, proposer, target)
    }

    #[test]
    fn test_accept_swaps_permanent_rates() {
        let (mut trade, mut proposer, mut target) = setup();
        let target_id = target.id;

        let resolution = respond(
            &mut trade,
            target_id,
            TradeDecision::Accept,
            &mut proposer,
            &mut target,
            t0() + Duration::hours(1),
        )
        .unwrap();

        assert_eq!(resolution.status, TradeStatus::Accepted);
        assert_eq!(proposer.credit_rate_multiplier, 2.5);
        assert_eq!(target.credit_rate_multiplier, 1.0);
        assert_eq!(trade.resolved_at, Some(t0() + Duration::hours(1)));
        assert_eq!(resolution.notifications[0].user_id, proposer.id);
    }

    #[test]
    fn test_reject_leaves_rates_alone() {
        let (mut trade, mut proposer, mut target) = setup();
        let target_id = target.id;

        let resolution = respond(
            &mut trade,
            target_id,
            TradeDecision::Reject,
            &mut proposer,
            &mut target,
            t0(),
        )
        .unwrap();

        assert_eq!(resolution.status, TradeStatus::Rejected);
        assert_eq!(proposer.credit_rate_multiplier, 1.0);
        assert_eq!(target.credit_rate_multiplier, 2.5);
    }

    #[test]
    fn test_only_the_target_may_answer() {
        let (mut trade, mut proposer, mut target) = setup();
        let proposer_id = proposer.id;

        let err = respond(
            &mut trade,
            proposer_id,
            TradeDecision::Accept,
            &mut proposer,
            &mut target,
            t0(),
        )
        .unwrap_err();

        assert_eq!(err, EconomyError::NotTradeTarget);
        assert_eq!(trade.status, TradeStatus::Pending);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let (mut trade, mut proposer, mut target) = setup();
        let target_id = target.id;
        respond(
            &mut trade,
            target_id,
            TradeDecision::Reject,
            &mut proposer,
            &mut target,
            t0(),
        )
        .unwrap();

        let err = respond(
            &mut trade,
            target_id,
            TradeDecision::Accept,
            &mut proposer,
            &mut target,
            t0(),
        )
        .unwrap_err();

        assert_eq!(err, EconomyError::TradeAlreadyResolved(TradeStatus::Rejected));
        assert_eq!(proposer.credit_rate_multiplier, 1.0);
    }

    #[test]
    fn test_late_acceptance_expires_instead() {
        let (mut trade, mut proposer, mut target) = setup();
        let target_id = target.id;

        let resolution = respond(
            &mut trade,
            target_id,
            TradeDecision::Accept,
            &mut proposer,
            &mut target,
            t0() + Duration::hours(25),
        )
        .unwrap();

        assert_eq!(resolution.status, TradeStatus::Expired);
        assert_eq!(trade.status, TradeStatus::Expired);
        assert_eq!(proposer.credit_rate_multiplier, 1.0);
        assert_eq!(
            resolution.notifications[0].kind,
            NotificationKind::TradeExpired
        );
    }

    #[test]
    fn test_expire_if_stale_ignores_fresh_requests() {
        let (mut trade, _, _) = setup();
        assert!(expire_if_stale(&mut trade, t0() + Duration::hours(23)).is_none());
        assert_eq!(trade.status, TradeStatus::Pending);
        assert!(expire_if_stale(&mut trade, t0() + Duration::hours(24)).is_some());
        assert_eq!(trade.status, TradeStatus::Expired);
    }
}
