//! Leaderboard ranking

use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::player::Player;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub user_id: Uuid,
    pub username: String,
    pub credits: f64,
    pub level: i32,
    pub total_focus_time: i64,
    pub is_focusing: bool,
}

/// Clamp a requested page size into `1..=MAX_LIMIT`
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn compare(a: &Player, b: &Player) -> Ordering {
    b.credits
        .total_cmp(&a.credits)
        .then_with(|| b.level.cmp(&a.level))
        .then_with(|| a.username.cmp(&b.username))
}

/// Rank players by credits, highest first
///
/// Players with equal credits share a rank; the next distinct balance
/// takes the rank after all of them (1, 1, 3).
pub fn rank(mut players: Vec<Player>, limit: usize) -> Vec<Standing> {
    players.sort_by(compare);

    let mut standings: Vec<Standing> = Vec::with_capacity(players.len().min(limit));
    for (index, player) in players.into_iter().take(limit).enumerate() {
        let rank = match standings.last() {
            Some(previous) if previous.credits == player.credits => previous.rank,
            _ => index + 1,
        };
        standings.push(Standing {
            rank,
            user_id: player.id,
            username: player.username,
            credits: player.credits,
            level: player.level,
            total_focus_time: player.total_focus_time,
            is_focusing: player.is_focusing,
        });
    }
    standings
}
