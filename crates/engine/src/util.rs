//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same invariants before
//! anything reaches the database.

use crate::{EngineError, MoneyCents, ResultEngine, TransactionBase, TransactionPatch};

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn validate_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    Ok(())
}

/// Trim text fields and check the amount of a user-entered transaction.
pub(crate) fn normalize_base(base: TransactionBase) -> ResultEngine<TransactionBase> {
    validate_amount(base.amount)?;
    Ok(TransactionBase {
        description: normalize_required_text(&base.description, "description")?,
        category: normalize_optional_text(base.category.as_deref()),
        ..base
    })
}

/// Same checks for a patch. A blank category becomes an explicit clear
/// (`Some("")`), so callers can tell it apart from "unchanged".
pub(crate) fn normalize_patch(patch: TransactionPatch) -> ResultEngine<TransactionPatch> {
    if patch.is_empty() {
        return Err(EngineError::InvalidPatch("nothing to update".to_string()));
    }
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    let description = patch
        .description
        .as_deref()
        .map(|d| normalize_required_text(d, "description"))
        .transpose()?;
    let category = patch
        .category
        .as_deref()
        .map(|c| normalize_optional_text(Some(c)).unwrap_or_default());

    Ok(TransactionPatch {
        description,
        category,
        ..patch
    })
}
