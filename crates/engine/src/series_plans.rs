//! Series plans: the explicit record behind installment and recurring groups.
//!
//! A `SeriesPlan` is created once, when a purchase is split into
//! installments or a charge is set to repeat. Every generated occurrence
//! carries a [`PaymentPlan`] referencing the plan by id. The reference is not
//! an ownership link: deleting occurrences never cascades through the plan.

use chrono::{Months, NaiveDate};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Installment,
    Recurrence,
}

impl SeriesKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installment => "installment",
            Self::Recurrence => "recurrence",
        }
    }
}

impl TryFrom<&str> for SeriesKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "installment" => Ok(Self::Installment),
            "recurrence" => Ok(Self::Recurrence),
            other => Err(EngineError::InvalidSeries(format!(
                "invalid series kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPlan {
    pub id: Uuid,
    pub kind: SeriesKind,
    /// Declared number of occurrences (installments or repetitions).
    pub total: u32,
    /// Date of occurrence 1. Every other occurrence is stepped from here.
    pub anchor: NaiveDate,
}

impl SeriesPlan {
    pub fn new(kind: SeriesKind, total: u32, anchor: NaiveDate) -> ResultEngine<Self> {
        if total == 0 {
            return Err(EngineError::InvalidSeries(format!(
                "{} count must be >= 1",
                kind.as_str()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            total,
            anchor,
        })
    }

    /// Date of the 1-based occurrence `index`.
    ///
    /// Always stepped from the anchor, so a plan anchored on the 31st keeps
    /// landing on month ends instead of drifting to the 28th after February.
    pub fn occurrence_date(&self, index: u32) -> ResultEngine<NaiveDate> {
        if index == 0 || index > self.total {
            return Err(EngineError::InvalidSeries(format!(
                "occurrence {index} outside 1..={}",
                self.total
            )));
        }
        self.anchor
            .checked_add_months(Months::new(index - 1))
            .ok_or_else(|| EngineError::InvalidSeries("occurrence date out of range".to_string()))
    }

    /// The payment plan tag carried by occurrence `index`.
    #[must_use]
    pub fn occurrence(&self, index: u32) -> PaymentPlan {
        match self.kind {
            SeriesKind::Installment => PaymentPlan::Installment {
                index,
                total: self.total,
                series_id: self.id,
            },
            SeriesKind::Recurrence => PaymentPlan::Recurrence {
                index,
                total: self.total,
                series_id: self.id,
            },
        }
    }
}

/// Series membership of a single transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "plan")]
pub enum PaymentPlan {
    #[default]
    None,
    Installment {
        index: u32,
        total: u32,
        series_id: Uuid,
    },
    Recurrence {
        index: u32,
        total: u32,
        series_id: Uuid,
    },
}

impl PaymentPlan {
    #[must_use]
    pub fn series_id(self) -> Option<Uuid> {
        match self {
            Self::None => None,
            Self::Installment { series_id, .. } | Self::Recurrence { series_id, .. } => {
                Some(series_id)
            }
        }
    }

    #[must_use]
    pub fn index(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Installment { index, .. } | Self::Recurrence { index, .. } => Some(index),
        }
    }

    #[must_use]
    pub fn total(self) -> Option<u32> {
        match self {
            Self::None => None,
            Self::Installment { total, .. } | Self::Recurrence { total, .. } => Some(total),
        }
    }

    #[must_use]
    pub fn kind(self) -> Option<SeriesKind> {
        match self {
            Self::None => None,
            Self::Installment { .. } => Some(SeriesKind::Installment),
            Self::Recurrence { .. } => Some(SeriesKind::Recurrence),
        }
    }

    /// Rebuild the tag from a transaction row and its joined plan row.
    pub(crate) fn from_stored(
        series_id: Option<Uuid>,
        series_index: Option<i32>,
        plan: Option<Model>,
    ) -> ResultEngine<Self> {
        match (series_id, series_index, plan) {
            (None, None, None) => Ok(Self::None),
            (Some(series_id), Some(index), Some(plan)) => {
                if plan.id != series_id {
                    return Err(EngineError::CorruptRecord(format!(
                        "series {series_id} joined to plan {}",
                        plan.id
                    )));
                }
                let plan = SeriesPlan::try_from(plan)?;
                let index = u32::try_from(index)
                    .ok()
                    .filter(|i| (1..=plan.total).contains(i))
                    .ok_or_else(|| {
                        EngineError::CorruptRecord(format!(
                            "series {series_id} has occurrence {index} outside 1..={}",
                            plan.total
                        ))
                    })?;
                Ok(plan.occurrence(index))
            }
            (Some(series_id), _, None) => Err(EngineError::CorruptRecord(format!(
                "series {series_id} not exists"
            ))),
            _ => Err(EngineError::CorruptRecord(
                "incomplete series membership".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "series_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub total: i32,
    pub anchor_on: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SeriesPlan> for ActiveModel {
    fn from(plan: &SeriesPlan) -> Self {
        Self {
            id: ActiveValue::Set(plan.id),
            kind: ActiveValue::Set(plan.kind.as_str().to_string()),
            total: ActiveValue::Set(plan.total as i32),
            anchor_on: ActiveValue::Set(plan.anchor),
        }
    }
}

impl TryFrom<Model> for SeriesPlan {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let total = u32::try_from(model.total)
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| {
                EngineError::CorruptRecord(format!("series {} has total {}", model.id, model.total))
            })?;
        Ok(Self {
            id: model.id,
            kind: SeriesKind::try_from(model.kind.as_str())
                .map_err(|err| EngineError::CorruptRecord(err.to_string()))?,
            total,
            anchor: model.anchor_on,
        })
    }
}
