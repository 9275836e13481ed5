//! Transaction primitives.
//!
//! A `Transaction` is one dated money movement. Installment purchases and
//! recurring charges are stored as one `Transaction` per occurrence, each
//! carrying a [`PaymentPlan`] that points back at its [`SeriesPlan`].
//!
//! [`SeriesPlan`]: crate::SeriesPlan

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, PaymentPlan, ResultEngine, series_plans};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(other.to_string())),
        }
    }
}

/// How a transaction was paid.
///
/// The card reference only exists on the `Card` variant, so a card payment
/// without a card (or a cash payment with one) cannot be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum PaymentMethod {
    Cash,
    InstantTransfer,
    Card { card_id: Uuid },
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::InstantTransfer => "instant_transfer",
            Self::Card { .. } => "card",
        }
    }

    #[must_use]
    pub fn card_id(self) -> Option<Uuid> {
        match self {
            Self::Card { card_id } => Some(card_id),
            Self::Cash | Self::InstantTransfer => None,
        }
    }

    /// Rebuild a payment method from its stored columns.
    pub fn from_parts(method: &str, card_id: Option<Uuid>) -> ResultEngine<Self> {
        match (method, card_id) {
            ("cash", None) => Ok(Self::Cash),
            ("instant_transfer", None) => Ok(Self::InstantTransfer),
            ("card", Some(card_id)) => Ok(Self::Card { card_id }),
            ("card", None) => Err(EngineError::CorruptRecord(
                "card payment without card reference".to_string(),
            )),
            (other @ ("cash" | "instant_transfer"), Some(_)) => Err(EngineError::CorruptRecord(
                format!("{other} payment with a card reference"),
            )),
            (other, _) => Err(EngineError::CorruptRecord(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// Every user-entered field of a transaction.
///
/// This is what the series generator expands: it has no id and no series
/// bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBase {
    pub occurred_on: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: MoneyCents,
    pub category: Option<String>,
    pub payment: PaymentMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub occurred_on: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: MoneyCents,
    pub category: Option<String>,
    pub payment: PaymentMethod,
    pub plan: PaymentPlan,
}

impl Transaction {
    /// Build a new occurrence of `base` with a fresh id.
    #[must_use]
    pub fn new(base: &TransactionBase, occurred_on: NaiveDate, plan: PaymentPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_on,
            kind: base.kind,
            description: base.description.clone(),
            amount: base.amount,
            category: base.category.clone(),
            payment: base.payment,
            plan,
        }
    }

    #[must_use]
    pub fn card_id(&self) -> Option<Uuid> {
        self.payment.card_id()
    }

    #[must_use]
    pub fn series_id(&self) -> Option<Uuid> {
        self.plan.series_id()
    }

    /// Amount as it counts against a card: expenses add, income subtracts.
    #[must_use]
    pub fn card_usage(&self) -> MoneyCents {
        match self.kind {
            TransactionKind::Expense => self.amount,
            TransactionKind::Income => -self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub occurred_on: Date,
    pub kind: String,
    pub description: String,
    pub amount_minor: i64,
    pub category: Option<String>,
    pub payment_method: String,
    pub card_id: Option<Uuid>,
    pub series_id: Option<Uuid>,
    pub series_index: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardId",
        to = "super::cards::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Card,
    #[sea_orm(
        belongs_to = "super::series_plans::Entity",
        from = "Column::SeriesId",
        to = "super::series_plans::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SeriesPlan,
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Card.def()
    }
}

impl Related<super::series_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeriesPlan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.clone()),
            payment_method: ActiveValue::Set(tx.payment.as_str().to_string()),
            card_id: ActiveValue::Set(tx.payment.card_id()),
            series_id: ActiveValue::Set(tx.plan.series_id()),
            series_index: ActiveValue::Set(tx.plan.index().map(|i| i as i32)),
        }
    }
}

/// A stored row together with the series plan it points at, as loaded by
/// `find_also_related`.
impl TryFrom<(Model, Option<series_plans::Model>)> for Transaction {
    type Error = EngineError;

    fn try_from((model, plan): (Model, Option<series_plans::Model>)) -> Result<Self, Self::Error> {
        let plan = PaymentPlan::from_stored(model.series_id, model.series_index, plan)?;
        let payment = PaymentMethod::from_parts(&model.payment_method, model.card_id)?;
        if model.amount_minor < 0 {
            return Err(EngineError::CorruptRecord(format!(
                "negative amount on transaction {}",
                model.id
            )));
        }

        Ok(Self {
            id: model.id,
            occurred_on: model.occurred_on,
            kind: TransactionKind::try_from(model.kind.as_str())
                .map_err(|err| EngineError::CorruptRecord(err.to_string()))?,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            category: model.category,
            payment,
            plan,
        })
    }
}
