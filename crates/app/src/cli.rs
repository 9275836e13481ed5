use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{EditScope, MoneyCents};
use uuid::Uuid;

use crate::settings;

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Track card purchases, installments and invoices")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override the database: `memory` or a SQLite file path.
    #[arg(long)]
    pub database: Option<settings::Database>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage cards.
    Card(Card),
    /// Manage transactions and series.
    Tx(Tx),
    /// Show the invoice open on a date.
    Invoice(InvoiceArgs),
}

#[derive(Args, Debug)]
pub struct Card {
    #[command(subcommand)]
    pub command: CardCommand,
}

#[derive(Subcommand, Debug)]
pub enum CardCommand {
    Add(CardAddArgs),
    List {
        /// Include inactive cards.
        #[arg(long)]
        all: bool,
    },
    Show {
        id: Uuid,
    },
    Edit(CardEditArgs),
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct CardAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub closing_day: u8,
    #[arg(long)]
    pub due_day: u8,
    /// Credit limit, e.g. `1500.00`.
    #[arg(long)]
    pub limit: Option<MoneyCents>,
}

#[derive(Args, Debug)]
pub struct CardEditArgs {
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "no_limit")]
    pub limit: Option<MoneyCents>,
    /// Stop tracking the credit limit.
    #[arg(long)]
    pub no_limit: bool,
    #[arg(long)]
    pub closing_day: Option<u8>,
    #[arg(long)]
    pub due_day: Option<u8>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Args, Debug)]
pub struct Tx {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Add(TxAddArgs),
    Show {
        id: Uuid,
    },
    Edit(TxEditArgs),
    Delete {
        id: Uuid,
        /// `single` or `following`.
        #[arg(long, default_value = "single")]
        scope: EditScope,
    },
    /// List the remaining occurrences of a series.
    Series {
        series_id: Uuid,
    },
}

/// How a transaction was paid. Cash when nothing is given.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct PaymentArgs {
    /// Charge on a card.
    #[arg(long)]
    pub card: Option<Uuid>,
    #[arg(long)]
    pub instant: bool,
    #[arg(long)]
    pub cash: bool,
}

impl PaymentArgs {
    pub fn method(&self) -> Option<engine::PaymentMethod> {
        if let Some(card_id) = self.card {
            Some(engine::PaymentMethod::Card { card_id })
        } else if self.instant {
            Some(engine::PaymentMethod::InstantTransfer)
        } else if self.cash {
            Some(engine::PaymentMethod::Cash)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
pub struct TxAddArgs {
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub description: String,
    /// Non-negative amount, e.g. `12.50`.
    #[arg(long)]
    pub amount: MoneyCents,
    /// Record an income (payment, refund) instead of an expense.
    #[arg(long)]
    pub income: bool,
    #[arg(long)]
    pub category: Option<String>,
    #[command(flatten)]
    pub payment: PaymentArgs,
    /// Split into monthly installments.
    #[arg(long, conflicts_with = "recurrence")]
    pub installments: Option<u32>,
    /// Repeat monthly this many times.
    #[arg(long)]
    pub recurrence: Option<u32>,
}

#[derive(Args, Debug)]
pub struct TxEditArgs {
    pub id: Uuid,
    /// `single` or `following`.
    #[arg(long, default_value = "single")]
    pub scope: EditScope,
    #[arg(long)]
    pub description: Option<String>,
    /// An empty value clears the category.
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub amount: Option<MoneyCents>,
    #[command(flatten)]
    pub payment: PaymentArgs,
}

#[derive(Args, Debug)]
pub struct InvoiceArgs {
    pub card_id: Uuid,
    /// Reference date, today when omitted.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}
