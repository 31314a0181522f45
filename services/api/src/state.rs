//! Application state shared across handlers

use common::token::TokenVerifier;
use economy::EconomyConfig;
use sqlx::PgPool;

use crate::game::GameService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub game: GameService,
    /// Verifies access tokens issued by the authentication service
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(db_pool: PgPool, economy: EconomyConfig, verifier: TokenVerifier) -> Self {
        Self {
            game: GameService::new(db_pool, economy),
            verifier,
        }
    }
}
