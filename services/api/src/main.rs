use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{
    AppState, create_router,
    sweeper::{DEFAULT_SCHEDULE, Sweeper},
};
use common::{
    database,
    token::{TokenVerifier, load_key_material},
};
use economy::EconomyConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let economy = EconomyConfig::from_env()?;
    info!(
        "Economy: {} credits per hour, trade requests live {} hours",
        economy.base_credits_per_hour, economy.trade_request_ttl_hours
    );

    let public_key = load_key_material("JWT_PUBLIC_KEY", env!("CARGO_MANIFEST_DIR"))?;
    let verifier = TokenVerifier::from_rsa_pem(&public_key)?;

    let schedule =
        std::env::var("CLEANUP_SCHEDULE").unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string());
    let _scheduler = Sweeper::new(pool.clone()).start(&schedule).await?;

    let app_state = AppState::new(pool, economy, verifier);

    info!("API service initialized successfully");

    let app = create_router(app_state);

    let addr = std::env::var("API_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
