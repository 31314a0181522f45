//! Game operations
//!
//! Each operation loads the rows it needs inside one transaction, lets the
//! `economy` rules decide, then writes back whatever changed. An error from
//! the rules drops the transaction, so a rejected action leaves no trace.
//!
//! Rows are locked in a fixed order: a trade or task row first, then player
//! rows by ascending id.

use chrono::{DateTime, Utc};
use economy::{
    EconomyConfig, EconomyError, Player, Settlement, SocialRate, Task, TradeDecision,
    TradeRequest, leaderboard, rate, session, shop, tasks, trade,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{
    CurrentRate, FocusStarted, NewTaskRequest, NotificationList, PlayerProfile, PurchaseFeedItem,
    PurchaseReceipt, PurchaseRequest,
};
use crate::repositories::{
    EffectRepo, FocusSessionRepo, NotificationRepo, PlayerRepo, PurchaseRepo, TaskRepo,
    TradeRepo,
};

/// Size of the purchase activity feed
pub const RECENT_PURCHASES: i64 = 20;

#[derive(Clone)]
pub struct GameService {
    pool: PgPool,
    config: Arc<EconomyConfig>,
}

impl GameService {
    pub fn new(pool: PgPool, config: EconomyConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Current social multiplier, read fresh
    pub async fn social_rate(&self) -> ApiResult<SocialRate> {
        let mut conn = self.pool.acquire().await?;
        let count = PlayerRepo::count_focusing(&mut conn).await?;
        Ok(SocialRate::from_active_count(count, &self.config))
    }

    pub async fn focusing_players(&self) -> ApiResult<Vec<Player>> {
        let mut conn = self.pool.acquire().await?;
        Ok(PlayerRepo::list_focusing(&mut conn).await?)
    }

    pub async fn start_focus(&self, user_id: Uuid, now: DateTime<Utc>) -> ApiResult<FocusStarted> {
        let mut tx = self.pool.begin().await?;

        let mut player = PlayerRepo::find_for_update(&mut tx, user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;

        session::start_session(&mut player, now)?;

        let dangling = FocusSessionRepo::close_dangling(&mut tx, user_id, now).await?;
        if dangling > 0 {
            warn!(user_id = %user_id, "Closed {} dangling focus session rows", dangling);
        }

        PlayerRepo::save(&mut tx, &player).await?;
        let session_id = FocusSessionRepo::open(&mut tx, user_id, now).await?;
        let count = PlayerRepo::count_focusing(&mut tx).await?;

        tx.commit().await?;

        info!(user_id = %user_id, active_users = count, "Focus session started");

        Ok(FocusStarted {
            session_id,
            started_at: now,
            social: SocialRate::from_active_count(count, &self.config),
        })
    }

    /// Settle the caller's session
    ///
    /// The focusing count is read before the caller's flag is cleared, so
    /// the caller's own presence counts toward the payout.
    pub async fn end_focus(&self, user_id: Uuid, now: DateTime<Utc>) -> ApiResult<Settlement> {
        let mut tx = self.pool.begin().await?;

        let mut player = PlayerRepo::find_for_update(&mut tx, user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;
        let effects = EffectRepo::active_for_users(&mut tx, &[user_id], now).await?;
        let count = PlayerRepo::count_focusing(&mut tx).await?;

        let settlement = session::end_session(&mut player, &effects, count, now, &self.config)?;

        PlayerRepo::save(&mut tx, &player).await?;
        if !FocusSessionRepo::close(&mut tx, user_id, &settlement).await? {
            warn!(user_id = %user_id, "Settled a focus session with no history row");
        }
        NotificationRepo::insert_many(&mut tx, std::slice::from_ref(&settlement.notification))
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            minutes = settlement.duration_minutes,
            credits = settlement.credits_earned,
            rate = settlement.effective_rate,
            "Focus session settled"
        );

        Ok(settlement)
    }

    pub async fn current_rate(&self, user_id: Uuid, now: DateTime<Utc>) -> ApiResult<CurrentRate> {
        let mut conn = self.pool.acquire().await?;

        let player = PlayerRepo::find(&mut conn, user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;
        let effects = EffectRepo::active_for_users(&mut conn, &[user_id], now).await?;
        let count = PlayerRepo::count_focusing(&mut conn).await?;

        let breakdown = rate::resolve(&player, &effects, count, now);
        Ok(CurrentRate {
            credits_per_hour: breakdown.effective_rate * self.config.base_credits_per_hour,
            breakdown,
            is_focusing: player.is_focusing,
            current_session_start: player.current_session_start,
        })
    }

    /// Buy a pass, locking the buyer and the target together
    ///
    /// Two purchases by the same buyer serialize on the buyer's row, so the
    /// second one sees the balance left by the first.
    pub async fn purchase(
        &self,
        buyer_id: Uuid,
        request: &PurchaseRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<PurchaseReceipt> {
        let pass = shop::find_pass(&request.item_id)?;
        let target_id = request.target_user_id.filter(|_| pass.requires_target);

        let mut tx = self.pool.begin().await?;

        let ids: Vec<Uuid> = std::iter::once(buyer_id).chain(target_id).collect();
        let mut locked = PlayerRepo::lock_many(&mut tx, &ids).await?;

        let buyer_index = locked
            .iter()
            .position(|player| player.id == buyer_id)
            .ok_or(EconomyError::UserNotFound(buyer_id))?;
        let mut buyer = locked.swap_remove(buyer_index);
        let mut target = target_id.and_then(|id| locked.into_iter().find(|player| player.id == id));

        let outcome = shop::purchase(
            &mut buyer,
            &request.item_id,
            target_id,
            target.as_mut(),
            now,
            &self.config,
        )?;

        PlayerRepo::save(&mut tx, &buyer).await?;
        if let Some(target) = &target {
            PlayerRepo::save(&mut tx, target).await?;
        }
        PurchaseRepo::insert(&mut tx, &outcome.record).await?;
        for effect in &outcome.new_effects {
            EffectRepo::insert(&mut tx, effect).await?;
        }
        if let Some(trade) = &outcome.trade_request {
            TradeRepo::insert(&mut tx, trade).await?;
        }
        NotificationRepo::insert_many(&mut tx, &outcome.notifications).await?;

        tx.commit().await?;

        Ok(PurchaseReceipt {
            purchase_id: outcome.record.id,
            item_id: outcome.pass.id.to_string(),
            item_name: outcome.pass.name.to_string(),
            credits_spent: outcome.record.price,
            target_user_id: outcome.record.target_user_id,
            requires_consent: outcome.requires_consent,
            remaining_credits: buyer.credits,
            trade_request_id: outcome.trade_request.map(|trade| trade.id),
        })
    }

    pub async fn recent_purchases(&self) -> ApiResult<Vec<PurchaseFeedItem>> {
        let mut conn = self.pool.acquire().await?;
        Ok(PurchaseRepo::recent(&mut conn, RECENT_PURCHASES).await?)
    }

    /// Requests `user_id` sent or received, with stale ones expired first
    pub async fn trades_for(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ApiResult<Vec<TradeRequest>> {
        let mut tx = self.pool.begin().await?;

        let mut notices = Vec::new();
        for mut request in TradeRepo::stale_for_user_for_update(&mut tx, user_id, now).await? {
            if let Some(notice) = trade::expire_if_stale(&mut request, now) {
                TradeRepo::save(&mut tx, &request).await?;
                notices.push(notice);
            }
        }
        if !notices.is_empty() {
            NotificationRepo::insert_many(&mut tx, &notices).await?;
            info!(user_id = %user_id, expired = notices.len(), "Expired stale trade requests on read");
        }

        let requests = TradeRepo::list_for_user(&mut tx, user_id).await?;
        tx.commit().await?;

        Ok(requests)
    }

    /// Answer a trade request addressed to `user_id`
    pub async fn respond_trade(
        &self,
        user_id: Uuid,
        trade_id: Uuid,
        decision: TradeDecision,
        now: DateTime<Utc>,
    ) -> ApiResult<TradeRequest> {
        let mut tx = self.pool.begin().await?;

        let mut request = TradeRepo::find_for_update(&mut tx, trade_id)
            .await?
            .ok_or(EconomyError::TradeNotFound(trade_id))?;
        if request.target_id != user_id {
            return Err(EconomyError::NotTradeTarget.into());
        }

        let mut locked =
            PlayerRepo::lock_many(&mut tx, &[request.proposer_id, request.target_id]).await?;
        let mut proposer = take_player(&mut locked, request.proposer_id)?;
        let mut target = take_player(&mut locked, request.target_id)?;

        let resolution = trade::respond(
            &mut request,
            user_id,
            decision,
            &mut proposer,
            &mut target,
            now,
        )?;

        TradeRepo::save(&mut tx, &request).await?;
        if resolution.status == economy::TradeStatus::Accepted {
            PlayerRepo::save(&mut tx, &proposer).await?;
            PlayerRepo::save(&mut tx, &target).await?;
        }
        NotificationRepo::insert_many(&mut tx, &resolution.notifications).await?;

        tx.commit().await?;

        Ok(request)
    }

    pub async fn create_task(
        &self,
        user_id: Uuid,
        request: &NewTaskRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Task> {
        let task = tasks::new_task(
            user_id,
            &request.title,
            request.description.as_deref().unwrap_or_default(),
            request.task_type,
            now,
            &self.config,
        )?;

        let mut tx = self.pool.begin().await?;
        if PlayerRepo::find(&mut tx, user_id).await?.is_none() {
            return Err(EconomyError::UserNotFound(user_id).into());
        }
        TaskRepo::insert(&mut tx, &task).await?;
        tx.commit().await?;

        info!(user_id = %user_id, task_id = %task.id, kind = task.kind.as_str(), "Task created");
        Ok(task)
    }

    pub async fn tasks_for(&self, user_id: Uuid) -> ApiResult<Vec<Task>> {
        let mut conn = self.pool.acquire().await?;
        Ok(TaskRepo::list_open_for_user(&mut conn, user_id).await?)
    }

    pub async fn complete_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> ApiResult<tasks::TaskCompletion> {
        let mut tx = self.pool.begin().await?;

        let mut task = TaskRepo::find_for_update(&mut tx, task_id)
            .await?
            .ok_or(EconomyError::TaskNotFound(task_id))?;
        let mut player = PlayerRepo::find_for_update(&mut tx, user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;

        let completion = tasks::complete_task(&mut task, &mut player, now)?;

        TaskRepo::save(&mut tx, &task).await?;
        PlayerRepo::save(&mut tx, &player).await?;
        NotificationRepo::insert_many(&mut tx, std::slice::from_ref(&completion.notification))
            .await?;

        tx.commit().await?;

        Ok(completion)
    }

    pub async fn notifications_for(&self, user_id: Uuid) -> ApiResult<NotificationList> {
        let mut conn = self.pool.acquire().await?;
        let notifications = NotificationRepo::list_for_user(&mut conn, user_id).await?;
        let unread_count = notifications.iter().filter(|n| !n.is_read).count();

        Ok(NotificationList {
            notifications,
            unread_count,
        })
    }

    pub async fn mark_notifications_read(
        &self,
        user_id: Uuid,
        ids: Option<&[Uuid]>,
    ) -> ApiResult<u64> {
        let mut conn = self.pool.acquire().await?;
        Ok(NotificationRepo::mark_read(&mut conn, user_id, ids).await?)
    }

    pub async fn leaderboard(&self, limit: Option<usize>) -> ApiResult<Vec<leaderboard::Standing>> {
        let limit = leaderboard::clamp_limit(limit);
        let mut conn = self.pool.acquire().await?;
        let players = PlayerRepo::top_by_credits(&mut conn, limit).await?;
        Ok(leaderboard::rank(players, limit))
    }

    pub async fn players(&self) -> ApiResult<Vec<Player>> {
        let mut conn = self.pool.acquire().await?;
        Ok(PlayerRepo::list_all(&mut conn).await?)
    }

    pub async fn profile(&self, user_id: Uuid, now: DateTime<Utc>) -> ApiResult<PlayerProfile> {
        let mut conn = self.pool.acquire().await?;

        let player = PlayerRepo::find(&mut conn, user_id)
            .await?
            .ok_or(EconomyError::UserNotFound(user_id))?;
        let active_effects = EffectRepo::active_for_users(&mut conn, &[user_id], now).await?;

        Ok(PlayerProfile {
            player,
            active_effects,
        })
    }
}

fn take_player(locked: &mut Vec<Player>, id: Uuid) -> Result<Player, EconomyError> {
    let index = locked
        .iter()
        .position(|player| player.id == id)
        .ok_or(EconomyError::UserNotFound(id))?;
    Ok(locked.swap_remove(index))
}
