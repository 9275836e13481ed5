//! The module contains `Card` struct and its implementation.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// A credit card.
///
/// Card purchases accumulate into monthly invoices bounded by the card's
/// closing day. The due day is only used to report when an invoice is due.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    /// Credit limit. `None` means the limit is not tracked.
    pub limit: Option<MoneyCents>,
    pub closing_day: u8,
    pub due_day: u8,
    pub active: bool,
}

impl Card {
    pub fn new(
        name: String,
        limit: Option<MoneyCents>,
        closing_day: u8,
        due_day: u8,
    ) -> ResultEngine<Self> {
        validate_limit(limit)?;
        validate_day_of_month(closing_day, "closing")?;
        validate_day_of_month(due_day, "due")?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            limit,
            closing_day,
            due_day,
            active: true,
        })
    }
}

pub(crate) fn validate_day_of_month(day: u8, label: &str) -> ResultEngine<()> {
    if !(1..=31).contains(&day) {
        return Err(EngineError::InvalidDay(format!(
            "{label} day must be within 1..=31, got {day}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_limit(limit: Option<MoneyCents>) -> ResultEngine<()> {
    if let Some(limit) = limit
        && limit.is_negative()
    {
        return Err(EngineError::InvalidAmount(
            "card limit must be >= 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub limit_minor: Option<i64>,
    pub closing_day: i16,
    pub due_day: i16,
    pub active: bool,
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

impl From<&Card> for ActiveModel {
    fn from(card: &Card) -> Self {
        Self {
            id: ActiveValue::Set(card.id),
            name: ActiveValue::Set(card.name.clone()),
            limit_minor: ActiveValue::Set(card.limit.map(MoneyCents::cents)),
            closing_day: ActiveValue::Set(i16::from(card.closing_day)),
            due_day: ActiveValue::Set(i16::from(card.due_day)),
            active: ActiveValue::Set(card.active),
        }
    }
}

impl TryFrom<Model> for Card {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let day = |raw: i16, label: &str| {
            u8::try_from(raw)
                .ok()
                .filter(|d| (1..=31).contains(d))
                .ok_or_else(|| {
                    EngineError::CorruptRecord(format!(
                        "card {} has {label} day {raw}",
                        model.id
                    ))
                })
        };
        let closing_day = day(model.closing_day, "closing")?;
        let due_day = day(model.due_day, "due")?;
        Ok(Self {
            closing_day,
            due_day,
            id: model.id,
            name: model.name,
            limit: model.limit_minor.map(MoneyCents::new),
            active: model.active,
        })
    }
}
