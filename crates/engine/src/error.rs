//! The module contains the error the engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`], which is what callers should
//! match on when mapping an error to a response:
//!
//! - validation: [`InvalidAmount`], [`InvalidName`], [`InvalidDay`],
//!   [`InvalidSeries`], [`InvalidPatch`], [`InvalidKind`], [`InvalidScope`],
//!   [`ExistingKey`]
//! - referential: [`UnknownCard`], [`NotInSeries`], [`CardInUse`]
//! - not found: [`KeyNotFound`]
//! - persistence: [`Database`], [`CorruptRecord`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidDay`]: EngineError::InvalidDay
//!  [`InvalidSeries`]: EngineError::InvalidSeries
//!  [`InvalidPatch`]: EngineError::InvalidPatch
//!  [`InvalidKind`]: EngineError::InvalidKind
//!  [`InvalidScope`]: EngineError::InvalidScope
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`UnknownCard`]: EngineError::UnknownCard
//!  [`NotInSeries`]: EngineError::NotInSeries
//!  [`CardInUse`]: EngineError::CardInUse
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
//!  [`CorruptRecord`]: EngineError::CorruptRecord
use sea_orm::DbErr;
use thiserror::Error;

/// Broad classification of [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Referential,
    NotFound,
    Persistence,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid day: {0}")]
    InvalidDay(String),
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
    #[error("Invalid patch: {0}")]
    InvalidPatch(String),
    #[error("Invalid transaction kind: {0}")]
    InvalidKind(String),
    #[error("Invalid edit scope: {0}")]
    InvalidScope(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unknown card: {0}")]
    UnknownCard(String),
    #[error("Transaction is not part of a series: {0}")]
    NotInSeries(String),
    #[error("Card still referenced by {count} transaction(s): {card}")]
    CardInUse { card: String, count: u64 },
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::InvalidName(_)
            | Self::InvalidDay(_)
            | Self::InvalidSeries(_)
            | Self::InvalidPatch(_)
            | Self::InvalidKind(_)
            | Self::InvalidScope(_)
            | Self::ExistingKey(_) => ErrorKind::Validation,
            Self::UnknownCard(_) | Self::NotInSeries(_) | Self::CardInUse { .. } => {
                ErrorKind::Referential
            }
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::CorruptRecord(_) | Self::Database(_) => ErrorKind::Persistence,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDay(a), Self::InvalidDay(b)) => a == b,
            (Self::InvalidSeries(a), Self::InvalidSeries(b)) => a == b,
            (Self::InvalidPatch(a), Self::InvalidPatch(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidScope(a), Self::InvalidScope(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::UnknownCard(a), Self::UnknownCard(b)) => a == b,
            (Self::NotInSeries(a), Self::NotInSeries(b)) => a == b,
            (
                Self::CardInUse { card: a, count: x },
                Self::CardInUse { card: b, count: y },
            ) => a == b && x == y,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::CorruptRecord(a), Self::CorruptRecord(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
