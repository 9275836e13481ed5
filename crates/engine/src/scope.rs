//! Which occurrences an edit or a delete applies to.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Only the occurrence the user acted on.
    #[default]
    Single,
    /// The occurrence the user acted on and every later member of its series.
    FollowingInSeries,
}

impl EditScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::FollowingInSeries => "following",
        }
    }
}

impl FromStr for EditScope {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(Self::Single),
            "following" => Ok(Self::FollowingInSeries),
            other => Err(EngineError::InvalidScope(other.to_string())),
        }
    }
}

/// Ids targeted by an operation on `pivot` with the given `scope`.
///
/// `all` is the stored collection to select from (usually the pivot's
/// series). With [`EditScope::FollowingInSeries`] the result holds every
/// member of the pivot's series dated on or after the pivot, the pivot
/// included, ordered by date then occurrence index. Earlier members are
/// never selected.
///
/// Fails with [`EngineError::NotInSeries`] when a series-wide scope is asked
/// for a transaction that has no series, so nothing gets written.
pub fn resolve(
    all: &[Transaction],
    pivot: &Transaction,
    scope: EditScope,
) -> ResultEngine<Vec<Uuid>> {
    match scope {
        EditScope::Single => Ok(vec![pivot.id]),
        EditScope::FollowingInSeries => {
            let series_id = pivot
                .series_id()
                .ok_or_else(|| EngineError::NotInSeries(pivot.id.to_string()))?;

            let mut targets: Vec<&Transaction> = all
                .iter()
                .filter(|tx| tx.series_id() == Some(series_id))
                .filter(|tx| tx.occurred_on >= pivot.occurred_on)
                .filter(|tx| tx.id != pivot.id)
                .collect();
            targets.push(pivot);
            targets.sort_by_key(|tx| (tx.occurred_on, tx.plan.index(), tx.id));
            targets.dedup_by_key(|tx| tx.id);

            Ok(targets.into_iter().map(|tx| tx.id).collect())
        }
    }
}
