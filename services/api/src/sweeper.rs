//! Periodic cleanup
//!
//! Nothing here is needed for correctness: effects are filtered by time on
//! every read and stale trades expire when answered. The sweep only keeps
//! tables small and tells proposers their trade lapsed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use economy::trade;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::repositories::{EffectRepo, FocusSessionRepo, NotificationRepo, TradeRepo};

/// Every fifteen minutes, at second zero
pub const DEFAULT_SCHEDULE: &str = "0 */15 * * * *";

/// What one sweep removed or closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_effects: u64,
    pub expired_trades: u64,
    pub closed_sessions: u64,
}

#[derive(Clone)]
pub struct Sweeper {
    pool: PgPool,
}

impl Sweeper {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run one sweep in a single transaction
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut tx = self.pool.begin().await?;

        let expired_effects = EffectRepo::delete_expired(&mut tx, now).await?;

        let mut expired_trades = 0;
        for mut request in TradeRepo::stale_for_update(&mut tx, now).await? {
            if let Some(notice) = trade::expire_if_stale(&mut request, now) {
                TradeRepo::save(&mut tx, &request).await?;
                NotificationRepo::insert_many(&mut tx, &[notice]).await?;
                expired_trades += 1;
            }
        }

        let closed_sessions = FocusSessionRepo::close_orphans(&mut tx, now).await?;

        tx.commit().await?;

        let report = SweepReport {
            expired_effects,
            expired_trades,
            closed_sessions,
        };
        info!(
            expired_effects = report.expired_effects,
            expired_trades = report.expired_trades,
            closed_sessions = report.closed_sessions,
            "Cleanup sweep finished"
        );
        Ok(report)
    }

    /// Schedule the sweep with a six-field cron expression
    ///
    /// The returned scheduler must be kept alive for the job to keep firing.
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let sweeper = self.clone();

        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                if let Err(e) = sweeper.run_once(Utc::now()).await {
                    error!("Cleanup sweep failed: {}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started cleanup scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}
