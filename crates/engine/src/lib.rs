//! Card ledger engine.
//!
//! The crate has two layers:
//!
//! - pure functions over in-memory values: [`generate`] expands a transaction
//!   into installments or a recurring series, [`resolve`] picks the
//!   occurrences an edit or delete applies to, [`cycles_for`] and
//!   [`aggregate`] compute card billing cycles and invoice figures;
//! - [`Engine`], which validates requests, runs the pure functions and
//!   persists the result through sea-orm, one database transaction per
//!   operation.

pub use cards::Card;
pub use commands::{
    CreateTransactionCmd, NewCardCmd, TransactionPatch, UpdateCardCmd, UpdateTransactionsCmd,
};
pub use error::{EngineError, ErrorKind};
pub use invoice::{InvoicePeriod, InvoiceSummary, UNCATEGORIZED, aggregate, cycles_for};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use scope::{EditScope, resolve};
pub use series::{Series, SeriesRequest, generate};
pub use series_plans::{PaymentPlan, SeriesKind, SeriesPlan};
pub use transactions::{PaymentMethod, Transaction, TransactionBase, TransactionKind};

mod cards;
mod commands;
mod error;
mod invoice;
mod money;
mod ops;
mod scope;
mod series;
mod series_plans;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
