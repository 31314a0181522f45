//! Focus Credit economy
//!
//! Pure game rules with no I/O: how fast a player earns credits, how a focus
//! session is settled, what each shop pass does, how trades resolve and how
//! tasks pay out. Callers load the affected rows, hand them to these
//! functions, and persist whatever the functions mutated, all inside one
//! transaction.
//!
//! Every function that depends on the clock takes `now` explicitly.

pub mod catalog;
pub mod config;
pub mod effects;
pub mod error;
pub mod leaderboard;
pub mod notification;
pub mod player;
pub mod rate;
pub mod session;
pub mod shop;
pub mod social;
pub mod tasks;
pub mod trade;

pub use catalog::{ItemType, PassDefinition, PassEffect, PassKind, Recipients};
pub use config::EconomyConfig;
pub use effects::{EffectKind, TemporaryEffect};
pub use error::{EconomyError, EconomyResult, ErrorKind};
pub use notification::{Notification, NotificationKind};
pub use player::Player;
pub use rate::RateBreakdown;
pub use session::Settlement;
pub use shop::{PurchaseOutcome, PurchaseRecord};
pub use social::SocialRate;
pub use tasks::{Task, TaskCompletion, TaskKind};
pub use trade::{TradeDecision, TradeRequest, TradeResolution, TradeStatus};
