//! Request and response bodies of the game API

use chrono::{DateTime, Utc};
use economy::{
    Notification, PassDefinition, Player, RateBreakdown, SocialRate, TaskKind, TemporaryEffect,
    TradeDecision,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a player, with any effects still running
#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfile {
    #[serde(flatten)]
    pub player: Player,
    pub active_effects: Vec<TemporaryEffect>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusStarted {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Social rate including the caller
    pub social: SocialRate,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentRate {
    #[serde(flatten)]
    pub breakdown: RateBreakdown,
    pub credits_per_hour: f64,
    pub is_focusing: bool,
    pub current_session_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    #[serde(alias = "pass_id")]
    pub item_id: String,
    pub target_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub purchase_id: Uuid,
    pub item_id: String,
    pub item_name: String,
    pub credits_spent: f64,
    pub target_user_id: Option<Uuid>,
    pub requires_consent: bool,
    pub remaining_credits: f64,
    pub trade_request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopItems {
    pub items: Vec<PassDefinition>,
}

/// One line of the purchase activity feed
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseFeedItem {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub buyer_username: String,
    pub item_id: String,
    pub target_user_id: Option<Uuid>,
    pub target_username: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeResponseRequest {
    pub decision: TradeDecision,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: TaskKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkReadRequest {
    /// Notification ids to mark; all of the caller's when absent
    #[serde(default)]
    pub ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}
