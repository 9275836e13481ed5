//! Row-level access shared by the engine operations.
//!
//! Every helper takes the open [`DatabaseTransaction`] so a whole operation
//! (read the group, resolve the targets, write) commits or rolls back as one.

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
    sea_query::IntoCondition,
};
use uuid::Uuid;

use crate::{
    Card, EngineError, PaymentMethod, ResultEngine, SeriesPlan, Transaction, TransactionPatch,
    cards, series_plans, transactions,
};

use super::Engine;

/// Rows per `INSERT`. SQLite caps the bound parameters of one statement.
const INSERT_CHUNK: usize = 500;

impl Engine {
    pub(super) async fn get_card(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
    ) -> ResultEngine<Card> {
        let model = cards::Entity::find_by_id(card_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("card not exists".to_string()))?;
        Card::try_from(model)
    }

    /// A card payment must point at a stored card.
    pub(super) async fn require_card_reference(
        &self,
        db: &DatabaseTransaction,
        payment: PaymentMethod,
    ) -> ResultEngine<()> {
        let Some(card_id) = payment.card_id() else {
            return Ok(());
        };
        let exists = cards::Entity::find_by_id(card_id).one(db).await?.is_some();
        if !exists {
            return Err(EngineError::UnknownCard(card_id.to_string()));
        }
        Ok(())
    }

    pub(super) async fn count_card_references(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
    ) -> ResultEngine<u64> {
        transactions::Entity::find()
            .filter(transactions::Column::CardId.eq(card_id))
            .count(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn get_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        self.load_transactions(db, transactions::Column::Id.eq(transaction_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    pub(super) async fn get_series_plan(
        &self,
        db: &DatabaseTransaction,
        series_id: Uuid,
    ) -> ResultEngine<SeriesPlan> {
        let model = series_plans::Entity::find_by_id(series_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("series not exists".to_string()))?;
        SeriesPlan::try_from(model)
    }

    pub(super) async fn list_by_card(
        &self,
        db: &DatabaseTransaction,
        card_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        self.load_transactions(db, transactions::Column::CardId.eq(card_id))
            .await
    }

    pub(super) async fn list_by_group(
        &self,
        db: &DatabaseTransaction,
        series_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        self.load_transactions(db, transactions::Column::SeriesId.eq(series_id))
            .await
    }

    /// Rows matching `condition` with their plan attached, oldest first.
    async fn load_transactions(
        &self,
        db: &DatabaseTransaction,
        condition: impl IntoCondition,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(condition)
            .find_also_related(series_plans::Entity)
            .order_by_asc(transactions::Column::OccurredOn)
            .order_by_asc(transactions::Column::SeriesIndex)
            .order_by_asc(transactions::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Insert the plan (if any) and then every occurrence.
    ///
    /// Long series are written in several statements, all inside `db`.
    pub(super) async fn write_all(
        &self,
        db: &DatabaseTransaction,
        plan: Option<&SeriesPlan>,
        occurrences: &[Transaction],
    ) -> ResultEngine<()> {
        if let Some(plan) = plan {
            series_plans::ActiveModel::from(plan).insert(db).await?;
        }
        for chunk in occurrences.chunks(INSERT_CHUNK) {
            let models = chunk.iter().map(transactions::ActiveModel::from);
            transactions::Entity::insert_many(models).exec(db).await?;
        }
        Ok(())
    }

    /// Apply `patch` to every id. Fails if any id is missing.
    pub(super) async fn update_all(
        &self,
        db: &DatabaseTransaction,
        ids: &[Uuid],
        patch: &TransactionPatch,
    ) -> ResultEngine<()> {
        for id in ids {
            let mut active = transactions::ActiveModel {
                id: ActiveValue::Set(*id),
                ..Default::default()
            };
            if let Some(description) = &patch.description {
                active.description = ActiveValue::Set(description.clone());
            }
            if let Some(category) = &patch.category {
                let category = (!category.is_empty()).then(|| category.clone());
                active.category = ActiveValue::Set(category);
            }
            if let Some(amount) = patch.amount {
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(payment) = patch.payment {
                active.payment_method = ActiveValue::Set(payment.as_str().to_string());
                active.card_id = ActiveValue::Set(payment.card_id());
            }

            active.update(db).await.map_err(|err| match err {
                DbErr::RecordNotUpdated => {
                    EngineError::KeyNotFound("transaction not exists".to_string())
                }
                other => other.into(),
            })?;
        }
        Ok(())
    }

    /// Delete every id. Fails if any id is missing.
    pub(super) async fn delete_all(
        &self,
        db: &DatabaseTransaction,
        ids: &[Uuid],
    ) -> ResultEngine<()> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.is_in(ids.iter().copied()))
            .exec(db)
            .await?;
        if result.rows_affected != ids.len() as u64 {
            return Err(EngineError::KeyNotFound("transaction not exists".to_string()));
        }
        Ok(())
    }

    /// Drop the plan row once no occurrence points at it anymore.
    ///
    /// Returns whether the plan was removed.
    pub(super) async fn prune_series(
        &self,
        db: &DatabaseTransaction,
        series_id: Uuid,
    ) -> ResultEngine<bool> {
        let remaining = transactions::Entity::find()
            .filter(transactions::Column::SeriesId.eq(series_id))
            .count(db)
            .await?;
        if remaining > 0 {
            return Ok(false);
        }
        series_plans::Entity::delete_by_id(series_id).exec(db).await?;
        Ok(true)
    }
}
