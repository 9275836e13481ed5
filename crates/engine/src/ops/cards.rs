use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Card, EngineError, NewCardCmd, ResultEngine, UpdateCardCmd,
    cards::{self, validate_day_of_month, validate_limit},
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Return a card snapshot from DB.
    pub async fn card(&self, card_id: Uuid) -> ResultEngine<Card> {
        with_tx!(self, |db_tx| self.get_card(&db_tx, card_id).await)
    }

    /// List cards ordered by name.
    pub async fn cards(&self, include_inactive: bool) -> ResultEngine<Vec<Card>> {
        with_tx!(self, |db_tx| {
            let mut query = cards::Entity::find();
            if !include_inactive {
                query = query.filter(cards::Column::Active.eq(true));
            }
            query
                .order_by_asc(cards::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Card::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Register a new card. Names are unique, case-insensitively.
    pub async fn new_card(&self, cmd: NewCardCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_text(&cmd.name, "card name")?;
        let card = Card::new(name, cmd.limit, cmd.closing_day, cmd.due_day)?;
        with_tx!(self, |db_tx| {
            self.require_unique_card_name(&db_tx, &card.name, None)
                .await?;
            cards::ActiveModel::from(&card).insert(&db_tx).await?;
            tracing::info!(card_id = %card.id, name = %card.name, "card created");
            Ok(card.id)
        })
    }

    /// Change a card's settings.
    ///
    /// Stored transactions are never touched: a new closing day simply
    /// moves them into different cycles on the next invoice computation.
    pub async fn update_card(&self, cmd: UpdateCardCmd) -> ResultEngine<Card> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidPatch("nothing to update".to_string()));
        }
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "card name"))
            .transpose()?;
        if let Some(limit) = cmd.limit {
            validate_limit(limit)?;
        }
        if let Some(day) = cmd.closing_day {
            validate_day_of_month(day, "closing")?;
        }
        if let Some(day) = cmd.due_day {
            validate_day_of_month(day, "due")?;
        }

        with_tx!(self, |db_tx| {
            let mut card = self.get_card(&db_tx, cmd.card_id).await?;
            if let Some(name) = name {
                self.require_unique_card_name(&db_tx, &name, Some(card.id))
                    .await?;
                card.name = name;
            }
            if let Some(limit) = cmd.limit {
                card.limit = limit;
            }
            if let Some(day) = cmd.closing_day {
                if day != card.closing_day {
                    tracing::info!(
                        card_id = %card.id,
                        from = card.closing_day,
                        to = day,
                        "closing day changed, cycles will be recomputed"
                    );
                }
                card.closing_day = day;
            }
            if let Some(day) = cmd.due_day {
                card.due_day = day;
            }
            if let Some(active) = cmd.active {
                card.active = active;
            }

            cards::ActiveModel::from(&card).update(&db_tx).await?;
            Ok(card)
        })
    }

    /// Delete a card nothing references anymore.
    ///
    /// A card used by any transaction is refused with
    /// [`EngineError::CardInUse`]; deactivate it instead.
    pub async fn delete_card(&self, card_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.get_card(&db_tx, card_id).await?;
            let count = self.count_card_references(&db_tx, card_id).await?;
            if count > 0 {
                tracing::warn!(%card_id, count, "refusing to delete a referenced card");
                return Err(EngineError::CardInUse {
                    card: card_id.to_string(),
                    count,
                });
            }
            cards::Entity::delete_by_id(card_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn require_unique_card_name(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query =
            cards::Entity::find().filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
        if let Some(card_id) = except {
            query = query.filter(cards::Column::Id.ne(card_id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}
