//! Personal and weekly tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::config::EconomyConfig;
use crate::error::{EconomyError, EconomyResult};
use crate::notification::{Notification, NotificationKind};
use crate::player::Player;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Personal,
    Weekly,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Personal => "personal",
            TaskKind::Weekly => "weekly",
        }
    }

    pub fn reward(&self, config: &EconomyConfig) -> f64 {
        match self {
            TaskKind::Personal => config.personal_task_reward,
            TaskKind::Weekly => config.weekly_task_reward,
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(TaskKind::Personal),
            "weekly" => Ok(TaskKind::Weekly),
            other => Err(format!("unknown task kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "task_type")]
    pub kind: TaskKind,
    /// Credits paid on completion, fixed when the task is created
    pub reward: f64,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCompletion {
    pub credits_earned: f64,
    pub total_credits: f64,
    #[serde(skip)]
    pub notification: Notification,
}

/// Create a task for `user_id` after checking its text
pub fn new_task(
    user_id: Uuid,
    title: &str,
    description: &str,
    kind: TaskKind,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> EconomyResult<Task> {
    let title = title.trim();
    if title.is_empty() {
        return Err(EconomyError::Validation("Task title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(EconomyError::Validation(format!(
            "Task title cannot exceed {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(EconomyError::Validation(format!(
            "Task description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }

    Ok(Task {
        id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        description: description.trim().to_string(),
        kind,
        reward: kind.reward(config),
        is_completed: false,
        created_at: now,
        completed_at: None,
    })
}

/// Mark `task` done and pay its reward to `player`
///
/// Fails with `NotOwner` unless `player` owns the task, leaving both
/// untouched.
pub fn complete_task(
    task: &mut Task,
    player: &mut Player,
    now: DateTime<Utc>,
) -> EconomyResult<TaskCompletion> {
    if task.user_id != player.id {
        return Err(EconomyError::NotOwner);
    }
    if task.is_completed {
        return Err(EconomyError::AlreadyCompleted);
    }

    task.is_completed = true;
    task.completed_at = Some(now);
    player.award(task.reward);
    player.completed_tasks += 1;

    info!(user_id = %player.id, task_id = %task.id, reward = task.reward, "Task completed");

    let notification = Notification::new(
        player.id,
        NotificationKind::TaskCompleted,
        format!("Completed \"{}\": +{:.0} credits", task.title, task.reward),
        None,
        now,
    );

    Ok(TaskCompletion {
        credits_earned: task.reward,
        total_credits: player.credits,
        notification,
    })
}
