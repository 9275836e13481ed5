//! Expansion of a user-entered transaction into its occurrences.

use serde::{Deserialize, Serialize};

use crate::{
    PaymentPlan, ResultEngine, SeriesKind, SeriesPlan, Transaction, TransactionBase,
};

/// What the user asked for when entering a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRequest {
    #[default]
    None,
    /// Split into `n` monthly installments.
    Installments(u32),
    /// Repeat `n` times, monthly.
    Recurrence(u32),
}

/// Output of [`generate`]: the plan (if any) and every occurrence, sorted by
/// date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series {
    pub plan: Option<SeriesPlan>,
    pub occurrences: Vec<Transaction>,
}

/// Expands `base` according to `request`.
///
/// Occurrence `k` (1-based) is dated `k - 1` calendar months after the base
/// date, clamped to the last day of the target month. A count of 1 still
/// creates a plan, so the single occurrence is tagged with its series.
///
/// Nothing is persisted here; the caller must write the plan and every
/// occurrence in one database transaction.
pub fn generate(base: &TransactionBase, request: SeriesRequest) -> ResultEngine<Series> {
    let (kind, total) = match request {
        SeriesRequest::None => {
            return Ok(Series {
                plan: None,
                occurrences: vec![Transaction::new(base, base.occurred_on, PaymentPlan::None)],
            });
        }
        SeriesRequest::Installments(count) => (SeriesKind::Installment, count),
        SeriesRequest::Recurrence(repetitions) => (SeriesKind::Recurrence, repetitions),
    };

    let plan = SeriesPlan::new(kind, total, base.occurred_on)?;
    let occurrences = (1..=plan.total)
        .map(|index| {
            let occurred_on = plan.occurrence_date(index)?;
            Ok(Transaction::new(base, occurred_on, plan.occurrence(index)))
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    Ok(Series {
        plan: Some(plan),
        occurrences,
    })
}
