//! Card billing cycles and invoice figures.
//!
//! A cycle is the half-open date range `(previous_close, current_close]`
//! between two consecutive closing dates of a card. Closing days past the end
//! of a month (e.g. 31 in April) fall on that month's last day.
//!
//! Cycles are always derived from the card's *current* closing day: changing
//! it moves historical transactions between cycles on the next computation.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Card, EngineError, MoneyCents, ResultEngine, Transaction, cards};

/// Category label used for transactions without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Boundaries of one billing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoicePeriod {
    /// Closing date of the prior cycle (exclusive start).
    pub previous_close: NaiveDate,
    /// Closing date of this cycle (inclusive end).
    pub current_close: NaiveDate,
}

impl InvoicePeriod {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.previous_close < date && date <= self.current_close
    }

    /// The cycle that ends at this cycle's start.
    pub fn previous(&self, closing_day: u8) -> ResultEngine<InvoicePeriod> {
        let previous_close = closing_date_before(self.previous_close, closing_day)?;
        Ok(InvoicePeriod {
            previous_close,
            current_close: self.previous_close,
        })
    }

    /// First `due_day` strictly after the closing date.
    pub fn due_date(&self, due_day: u8) -> ResultEngine<NaiveDate> {
        cards::validate_day_of_month(due_day, "due")?;
        let close = self.current_close;
        let same_month = clamp_day(close.year(), close.month(), due_day)?;
        if same_month > close {
            return Ok(same_month);
        }
        let next = month_start(close)
            .checked_add_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        clamp_day(next.year(), next.month(), due_day)
    }
}

/// Billing cycle that is open on `reference`.
///
/// `current_close` is the first closing date not before `reference`, and
/// `previous_close` is the closing date of the month before it.
pub fn cycles_for(closing_day: u8, reference: NaiveDate) -> ResultEngine<InvoicePeriod> {
    cards::validate_day_of_month(closing_day, "closing")?;

    let this_month = clamp_day(reference.year(), reference.month(), closing_day)?;
    let current_close = if this_month >= reference {
        this_month
    } else {
        let next = month_start(reference)
            .checked_add_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        clamp_day(next.year(), next.month(), closing_day)?
    };
    let previous_close = closing_date_before(current_close, closing_day)?;

    Ok(InvoicePeriod {
        previous_close,
        current_close,
    })
}

/// Closing date in the month before `close`.
fn closing_date_before(close: NaiveDate, closing_day: u8) -> ResultEngine<NaiveDate> {
    let prior = month_start(close)
        .checked_sub_months(Months::new(1))
        .ok_or_else(out_of_range)?;
    clamp_day(prior.year(), prior.month(), closing_day)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// `day` in the given month, or the month's last day when it is shorter.
fn clamp_day(year: i32, month: u32, day: u8) -> ResultEngine<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(out_of_range)?;
    let day = u32::from(day).min(last.day());
    first.with_day(day).ok_or_else(out_of_range)
}

fn out_of_range() -> EngineError {
    EngineError::InvalidDay("date out of range".to_string())
}

/// Computed invoice figures for one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub period: InvoicePeriod,
    pub due_date: NaiveDate,
    /// Expenses minus payments/refunds in the open cycle.
    pub total_open_cycle: MoneyCents,
    /// `total_open_cycle` split by category label.
    pub total_by_category: BTreeMap<String, MoneyCents>,
    /// `limit - total_open_cycle`, when the card tracks a limit.
    pub available_credit: Option<MoneyCents>,
    /// Same signed total for the cycle right before the open one.
    pub previous_cycle_total: MoneyCents,
    pub transaction_count: usize,
}

/// Projects a card's transactions onto the cycle open on `reference`.
///
/// Transactions paid with other cards or methods are ignored. Expenses add
/// to the total and income (payments, refunds) subtracts from it. The
/// function does not touch storage and returns the same summary for the
/// same inputs.
pub fn aggregate(
    card: &Card,
    transactions: &[Transaction],
    reference: NaiveDate,
) -> ResultEngine<InvoiceSummary> {
    let period = cycles_for(card.closing_day, reference)?;
    let previous = period.previous(card.closing_day)?;
    let due_date = period.due_date(card.due_day)?;

    let on_card = transactions
        .iter()
        .filter(|tx| tx.card_id() == Some(card.id));

    let mut total_open_cycle = MoneyCents::ZERO;
    let mut previous_cycle_total = MoneyCents::ZERO;
    let mut total_by_category: BTreeMap<String, MoneyCents> = BTreeMap::new();
    let mut transaction_count = 0;

    for tx in on_card {
        let usage = tx.card_usage();
        if period.contains(tx.occurred_on) {
            total_open_cycle = total_open_cycle
                .checked_add(usage)
                .ok_or_else(overflow)?;
            let label = tx.category.as_deref().unwrap_or(UNCATEGORIZED);
            let entry = total_by_category
                .entry(label.to_string())
                .or_insert(MoneyCents::ZERO);
            *entry = entry.checked_add(usage).ok_or_else(overflow)?;
            transaction_count += 1;
        } else if previous.contains(tx.occurred_on) {
            previous_cycle_total = previous_cycle_total
                .checked_add(usage)
                .ok_or_else(overflow)?;
        }
    }

    let available_credit = card
        .limit
        .map(|limit| limit.checked_sub(total_open_cycle).ok_or_else(overflow))
        .transpose()?;

    Ok(InvoiceSummary {
        period,
        due_date,
        total_open_cycle,
        total_by_category,
        available_credit,
        previous_cycle_total,
        transaction_count,
    })
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("invoice total too large".to_string())
}
