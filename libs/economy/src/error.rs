//! Errors raised by the game rules
//!
//! Every error is raised before anything is mutated, so a caller that gets
//! an `Err` can drop its transaction without further checks.

use thiserror::Error;
use uuid::Uuid;

use crate::trade::TradeStatus;

/// Broad category of an [`EconomyError`], used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InsufficientResource,
    Forbidden,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Unknown pass: {0}")]
    UnknownPass(String),

    #[error("{0} is not available in the shop yet")]
    PassUnavailable(String),

    #[error("{0} requires a target user")]
    MissingTarget(String),

    #[error("{0} cannot target yourself")]
    SelfTarget(String),

    #[error("Target user {0} not found")]
    TargetNotFound(Uuid),

    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: f64, available: f64 },

    #[error("A focus session is already active")]
    SessionAlreadyActive,

    #[error("No active focus session")]
    NoActiveSession,

    #[error("Task {0} not found")]
    TaskNotFound(Uuid),

    #[error("Only the owner can complete this task")]
    NotOwner,

    #[error("Task is already completed")]
    AlreadyCompleted,

    #[error("Trade request {0} not found")]
    TradeNotFound(Uuid),

    #[error("Only the target of a trade request can answer it")]
    NotTradeTarget,

    #[error("Trade request is already {}", .0.as_str())]
    TradeAlreadyResolved(TradeStatus),

    #[error("{0}")]
    Validation(String),
}

impl EconomyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EconomyError::UnknownPass(_)
            | EconomyError::UserNotFound(_)
            | EconomyError::TargetNotFound(_)
            | EconomyError::TaskNotFound(_)
            | EconomyError::TradeNotFound(_) => ErrorKind::NotFound,
            EconomyError::PassUnavailable(_)
            | EconomyError::MissingTarget(_)
            | EconomyError::SelfTarget(_)
            | EconomyError::Validation(_) => ErrorKind::Validation,
            EconomyError::SessionAlreadyActive
            | EconomyError::NoActiveSession
            | EconomyError::AlreadyCompleted
            | EconomyError::TradeAlreadyResolved(_) => ErrorKind::Conflict,
            EconomyError::InsufficientCredits { .. } => ErrorKind::InsufficientResource,
            EconomyError::NotOwner | EconomyError::NotTradeTarget => ErrorKind::Forbidden,
        }
    }

    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            EconomyError::UserNotFound(_) => "USER_NOT_FOUND",
            EconomyError::UnknownPass(_) => "UNKNOWN_PASS",
            EconomyError::PassUnavailable(_) => "PASS_UNAVAILABLE",
            EconomyError::MissingTarget(_) => "MISSING_TARGET",
            EconomyError::SelfTarget(_) => "SELF_TARGET",
            EconomyError::TargetNotFound(_) => "TARGET_NOT_FOUND",
            EconomyError::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            EconomyError::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            EconomyError::NoActiveSession => "NO_ACTIVE_SESSION",
            EconomyError::TaskNotFound(_) => "TASK_NOT_FOUND",
            EconomyError::NotOwner => "NOT_OWNER",
            EconomyError::AlreadyCompleted => "ALREADY_COMPLETED",
            EconomyError::TradeNotFound(_) => "TRADE_NOT_FOUND",
            EconomyError::NotTradeTarget => "NOT_TRADE_TARGET",
            EconomyError::TradeAlreadyResolved(_) => "TRADE_ALREADY_RESOLVED",
            EconomyError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

pub type EconomyResult<T> = Result<T, EconomyError>;
