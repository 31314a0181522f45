//! Focus Royale game API
//!
//! Focus sessions, the pass shop, trades, tasks, notifications and the
//! leaderboard, served over HTTP on top of the `economy` rules.

pub mod error;
pub mod game;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use routes::create_router;
pub use state::AppState;
