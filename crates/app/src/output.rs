use std::error::Error;

use engine::{Card, InvoiceSummary, PaymentMethod, PaymentPlan, SeriesPlan, Transaction};
use serde::Serialize;

/// Print `value` as pretty JSON, or with `human` otherwise.
pub fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    human: impl FnOnce(&T),
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

pub fn card(card: &Card) {
    let limit = card
        .limit
        .map_or_else(|| "-".to_string(), |limit| limit.to_string());
    let state = if card.active { "" } else { "  (inactive)" };
    println!(
        "{}  {}  closes on {}  due on {}  limit {}{state}",
        card.id, card.name, card.closing_day, card.due_day, limit
    );
}

pub fn cards(cards: &[Card]) {
    if cards.is_empty() {
        println!("no cards");
    }
    cards.iter().for_each(card);
}

fn payment(payment: PaymentMethod) -> String {
    match payment {
        PaymentMethod::Card { card_id } => format!("card {card_id}"),
        other => other.as_str().replace('_', " "),
    }
}

fn plan(plan: PaymentPlan) -> String {
    match (plan.kind(), plan.index(), plan.total()) {
        (Some(kind), Some(index), Some(total)) => format!("  {} {index}/{total}", kind.as_str()),
        _ => String::new(),
    }
}

pub fn transaction(tx: &Transaction) {
    let category = tx.category.as_deref().unwrap_or("-");
    println!(
        "{}  {}  {:<7}  {:>10}  {}  [{category}]  {}{}",
        tx.id,
        tx.occurred_on,
        tx.kind.as_str(),
        tx.amount.to_string(),
        tx.description,
        payment(tx.payment),
        plan(tx.plan)
    );
}

pub fn transactions(txs: &[Transaction]) {
    if txs.is_empty() {
        println!("no transactions");
    }
    txs.iter().for_each(transaction);
}

pub fn series(plan: &SeriesPlan, members: &[Transaction]) {
    println!(
        "series {}  {} of {} starting {}",
        plan.id,
        plan.kind.as_str(),
        plan.total,
        plan.anchor
    );
    transactions(members);
}

pub fn ids(ids: &[uuid::Uuid]) {
    for id in ids {
        println!("{id}");
    }
}

pub fn invoice(summary: &InvoiceSummary) {
    println!(
        "cycle {} .. {}  (due {})",
        summary.period.previous_close, summary.period.current_close, summary.due_date
    );
    println!(
        "total {}  over {} transaction(s)",
        summary.total_open_cycle, summary.transaction_count
    );
    for (category, amount) in &summary.total_by_category {
        println!("  {category:<20} {:>10}", amount.to_string());
    }
    if let Some(available) = summary.available_credit {
        println!("available credit {available}");
    }
    println!("previous cycle {}", summary.previous_cycle_total);
}
