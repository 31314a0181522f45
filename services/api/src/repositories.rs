//! Repositories for database operations
//!
//! Every function takes a connection rather than the pool, so the game
//! layer can run several of them inside one transaction.

pub mod effects;
pub mod notifications;
pub mod players;
pub mod purchases;
pub mod sessions;
pub mod tasks;
pub mod trades;

pub use effects::EffectRepo;
pub use notifications::NotificationRepo;
pub use players::PlayerRepo;
pub use purchases::PurchaseRepo;
pub use sessions::FocusSessionRepo;
pub use tasks::TaskRepo;
pub use trades::TradeRepo;

/// Turn a stored enum label back into its Rust value
pub(crate) fn parse_column<T>(value: String, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}
