use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EditScope, ResultEngine, SeriesPlan, Transaction,
    UpdateTransactionsCmd, generate, resolve,
    util::{normalize_base, normalize_patch},
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a transaction.
    ///
    /// With a series request the transaction is expanded into its monthly
    /// occurrences and the plan plus every occurrence are written atomically.
    /// Returns the ids of the created rows, in date order.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Vec<Uuid>> {
        let base = normalize_base(cmd.base)?;
        let series = generate(&base, cmd.series)?;

        with_tx!(self, |db_tx| {
            self.require_card_reference(&db_tx, base.payment).await?;
            self.write_all(&db_tx, series.plan.as_ref(), &series.occurrences)
                .await?;

            if let Some(plan) = &series.plan {
                tracing::info!(
                    series_id = %plan.id,
                    kind = plan.kind.as_str(),
                    total = plan.total,
                    "series created"
                );
            } else {
                tracing::info!(description = %base.description, "transaction created");
            }
            Ok(series.occurrences.iter().map(|tx| tx.id).collect::<Vec<_>>())
        })
    }

    /// Return a transaction snapshot from DB.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| self.get_transaction(&db_tx, transaction_id).await)
    }

    pub async fn series_plan(&self, series_id: Uuid) -> ResultEngine<SeriesPlan> {
        with_tx!(self, |db_tx| self.get_series_plan(&db_tx, series_id).await)
    }

    /// Every remaining occurrence of a series, oldest first.
    pub async fn series_transactions(&self, series_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.get_series_plan(&db_tx, series_id).await?;
            self.list_by_group(&db_tx, series_id).await
        })
    }

    /// Every transaction charged on a card, oldest first.
    pub async fn card_transactions(&self, card_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.get_card(&db_tx, card_id).await?;
            self.list_by_card(&db_tx, card_id).await
        })
    }

    /// Apply a patch to one occurrence or to it and the following ones.
    ///
    /// Either every targeted row is updated or none is. Returns the ids that
    /// were changed.
    pub async fn update_transactions(&self, cmd: UpdateTransactionsCmd) -> ResultEngine<Vec<Uuid>> {
        let patch = normalize_patch(cmd.patch)?;
        with_tx!(self, |db_tx| {
            if let Some(payment) = patch.payment {
                self.require_card_reference(&db_tx, payment).await?;
            }
            let pivot = self.get_transaction(&db_tx, cmd.transaction_id).await?;
            let targets = self.resolve_targets(&db_tx, &pivot, cmd.scope).await?;
            self.update_all(&db_tx, &targets, &patch).await?;

            tracing::info!(
                transaction_id = %pivot.id,
                scope = cmd.scope.as_str(),
                updated = targets.len(),
                "transactions updated"
            );
            Ok(targets)
        })
    }

    /// Delete one occurrence or it and the following ones.
    ///
    /// The series plan goes away together with its last occurrence.
    pub async fn delete_transactions(
        &self,
        transaction_id: Uuid,
        scope: EditScope,
    ) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let pivot = self.get_transaction(&db_tx, transaction_id).await?;
            let targets = self.resolve_targets(&db_tx, &pivot, scope).await?;
            self.delete_all(&db_tx, &targets).await?;
            if let Some(series_id) = pivot.series_id()
                && self.prune_series(&db_tx, series_id).await?
            {
                tracing::debug!(%series_id, "series emptied, plan removed");
            }

            tracing::info!(
                %transaction_id,
                scope = scope.as_str(),
                deleted = targets.len(),
                "transactions deleted"
            );
            Ok(targets)
        })
    }

    async fn resolve_targets(
        &self,
        db: &DatabaseTransaction,
        pivot: &Transaction,
        scope: EditScope,
    ) -> ResultEngine<Vec<Uuid>> {
        let group = match (scope, pivot.series_id()) {
            (EditScope::FollowingInSeries, Some(series_id)) => {
                self.list_by_group(db, series_id).await?
            }
            _ => Vec::new(),
        };
        let targets = resolve(&group, pivot, scope).inspect_err(|err| {
            tracing::warn!(transaction_id = %pivot.id, "cannot resolve targets: {err}");
        })?;
        tracing::debug!(
            transaction_id = %pivot.id,
            scope = scope.as_str(),
            targets = targets.len(),
            "targets resolved"
        );
        Ok(targets)
    }
}
