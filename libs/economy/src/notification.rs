//! In-app notifications produced by game events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A pass was used on the recipient
    PassUsed,
    /// The recipient is now part of an Ally Token pair
    AllyFormed,
    TradeRequested,
    TradeAccepted,
    TradeRejected,
    TradeExpired,
    TaskCompleted,
    SessionCompleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PassUsed => "pass_used",
            NotificationKind::AllyFormed => "ally_formed",
            NotificationKind::TradeRequested => "trade_requested",
            NotificationKind::TradeAccepted => "trade_accepted",
            NotificationKind::TradeRejected => "trade_rejected",
            NotificationKind::TradeExpired => "trade_expired",
            NotificationKind::TaskCompleted => "task_completed",
            NotificationKind::SessionCompleted => "session_completed",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass_used" => Ok(NotificationKind::PassUsed),
            "ally_formed" => Ok(NotificationKind::AllyFormed),
            "trade_requested" => Ok(NotificationKind::TradeRequested),
            "trade_accepted" => Ok(NotificationKind::TradeAccepted),
            "trade_rejected" => Ok(NotificationKind::TradeRejected),
            "trade_expired" => Ok(NotificationKind::TradeExpired),
            "task_completed" => Ok(NotificationKind::TaskCompleted),
            "session_completed" => Ok(NotificationKind::SessionCompleted),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    #[serde(rename = "notification_type")]
    pub kind: NotificationKind,
    pub message: String,
    /// User whose action caused the notification, if any
    pub from_user_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
        from_user_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            message: message.into(),
            from_user_id,
            is_read: false,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_kind_as_notification_type() {
        let notification = Notification::new(
            Uuid::new_v4(),
            NotificationKind::PassUsed,
            "bob used Degression Pass on you",
            Some(Uuid::new_v4()),
            Utc::now(),
        );

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["notification_type"], "pass_used");
        assert_eq!(json["is_read"], false);
    }

    #[test]
    fn test_column_values_parse_back() {
        assert_eq!(
            "ally_formed".parse::<NotificationKind>(),
            Ok(NotificationKind::AllyFormed)
        );
        assert_eq!(
            NotificationKind::TradeExpired.as_str().parse::<NotificationKind>(),
            Ok(NotificationKind::TradeExpired)
        );
        assert!("poke".parse::<NotificationKind>().is_err());
    }
}
