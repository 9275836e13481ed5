use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{InvoiceSummary, ResultEngine, aggregate};

use super::{Engine, with_tx};

impl Engine {
    /// Compute the invoice of the cycle containing `reference` for a card.
    ///
    /// Nothing is cached: the figures are derived from the stored card
    /// transactions on every call, so a changed closing day shows up here
    /// immediately.
    pub async fn card_invoice(
        &self,
        card_id: Uuid,
        reference: NaiveDate,
    ) -> ResultEngine<InvoiceSummary> {
        with_tx!(self, |db_tx| {
            let card = self.get_card(&db_tx, card_id).await?;
            let transactions = self.list_by_card(&db_tx, card_id).await?;
            let summary = aggregate(&card, &transactions, reference)?;
            tracing::debug!(
                %card_id,
                %reference,
                total = %summary.total_open_cycle,
                count = summary.transaction_count,
                "invoice computed"
            );
            Ok(summary)
        })
    }
}
