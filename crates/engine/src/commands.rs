//! Command structs for engine operations.
//!
//! These types group parameters for write operations (card creation and
//! updates, transaction creation, series-wide edits), keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    EditScope, MoneyCents, PaymentMethod, SeriesRequest, TransactionBase, TransactionKind,
};

/// Create a card.
#[derive(Clone, Debug)]
pub struct NewCardCmd {
    pub name: String,
    pub limit: Option<MoneyCents>,
    pub closing_day: u8,
    pub due_day: u8,
}

impl NewCardCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, closing_day: u8, due_day: u8) -> Self {
        Self {
            name: name.into(),
            limit: None,
            closing_day,
            due_day,
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: MoneyCents) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Change a card. Unset fields are left as they are.
///
/// Changing `closing_day` reclassifies past transactions into different
/// cycles on the next invoice computation.
#[derive(Clone, Debug)]
pub struct UpdateCardCmd {
    pub card_id: Uuid,
    pub name: Option<String>,
    /// `Some(None)` stops tracking the limit.
    pub limit: Option<Option<MoneyCents>>,
    pub closing_day: Option<u8>,
    pub due_day: Option<u8>,
    pub active: Option<bool>,
}

impl UpdateCardCmd {
    #[must_use]
    pub fn new(card_id: Uuid) -> Self {
        Self {
            card_id,
            name: None,
            limit: None,
            closing_day: None,
            due_day: None,
            active: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Option<MoneyCents>) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn closing_day(mut self, day: u8) -> Self {
        self.closing_day = Some(day);
        self
    }

    #[must_use]
    pub fn due_day(mut self, day: u8) -> Self {
        self.due_day = Some(day);
        self
    }

    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.limit.is_none()
            && self.closing_day.is_none()
            && self.due_day.is_none()
            && self.active.is_none()
    }
}

/// Create a transaction, optionally as installments or a recurring series.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub base: TransactionBase,
    pub series: SeriesRequest,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        occurred_on: NaiveDate,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            base: TransactionBase {
                occurred_on,
                kind,
                description: description.into(),
                amount,
                category: None,
                payment: PaymentMethod::Cash,
            },
            series: SeriesRequest::None,
        }
    }

    #[must_use]
    pub fn expense(
        occurred_on: NaiveDate,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self::new(TransactionKind::Expense, occurred_on, description, amount)
    }

    #[must_use]
    pub fn income(
        occurred_on: NaiveDate,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self::new(TransactionKind::Income, occurred_on, description, amount)
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.base.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.base.payment = payment;
        self
    }

    #[must_use]
    pub fn card(self, card_id: Uuid) -> Self {
        self.payment(PaymentMethod::Card { card_id })
    }

    #[must_use]
    pub fn installments(mut self, count: u32) -> Self {
        self.series = SeriesRequest::Installments(count);
        self
    }

    #[must_use]
    pub fn recurrence(mut self, repetitions: u32) -> Self {
        self.series = SeriesRequest::Recurrence(repetitions);
        self
    }
}

/// Field changes applied to every targeted occurrence.
///
/// Dates and series indices are never part of a patch. The payment method
/// (and with it the card reference) only changes when `payment` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    /// `Some("")` clears the category.
    pub category: Option<String>,
    pub amount: Option<MoneyCents>,
    pub payment: Option<PaymentMethod>,
}

impl TransactionPatch {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn payment(mut self, payment: PaymentMethod) -> Self {
        self.payment = Some(payment);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.payment.is_none()
    }
}

/// Edit one occurrence, or it and the rest of its series.
#[derive(Clone, Debug)]
pub struct UpdateTransactionsCmd {
    pub transaction_id: Uuid,
    pub scope: EditScope,
    pub patch: TransactionPatch,
}

impl UpdateTransactionsCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, scope: EditScope, patch: TransactionPatch) -> Self {
        Self {
            transaction_id,
            scope,
            patch,
        }
    }
}
