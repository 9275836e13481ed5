use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreateTransactionCmd, EditScope, Engine, EngineError, ErrorKind, MoneyCents, NewCardCmd,
    PaymentMethod, SeriesKind, TransactionPatch, UNCATEGORIZED, UpdateCardCmd,
    UpdateTransactionsCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn exec_sql(db: &DatabaseConnection, sql: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap();
}

async fn new_card(engine: &Engine, closing_day: u8, due_day: u8) -> Uuid {
    engine
        .new_card(NewCardCmd::new("Visa", closing_day, due_day).limit(MoneyCents::new(100_000)))
        .await
        .unwrap()
}

#[tokio::test]
async fn installments_are_persisted_with_their_plan() {
    let (engine, db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 31), "Laptop", MoneyCents::new(10_000))
                .category("Electronics")
                .card(card_id)
                .installments(3),
        )
        .await
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(count_rows(&db, "series_plans").await, 1);
    assert_eq!(count_rows(&db, "transactions").await, 3);

    let first = engine.transaction(ids[0]).await.unwrap();
    let series_id = first.series_id().unwrap();
    let plan = engine.series_plan(series_id).await.unwrap();
    assert_eq!(plan.kind, SeriesKind::Installment);
    assert_eq!(plan.total, 3);
    assert_eq!(plan.anchor, date(2025, 1, 31));

    let members = engine.series_transactions(series_id).await.unwrap();
    let dates: Vec<_> = members.iter().map(|tx| tx.occurred_on).collect();
    assert_eq!(
        dates,
        vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]
    );
    let indexes: Vec<_> = members.iter().map(|tx| tx.plan.index()).collect();
    assert_eq!(indexes, vec![Some(1), Some(2), Some(3)]);
    assert!(members.iter().all(|tx| tx.card_id() == Some(card_id)));
    assert!(
        members
            .iter()
            .all(|tx| tx.amount == MoneyCents::new(10_000))
    );
}

#[tokio::test]
async fn single_transaction_has_no_plan() {
    let (engine, db) = engine_with_db().await;

    let ids = engine
        .create_transaction(CreateTransactionCmd::income(
            date(2025, 5, 1),
            "Salary",
            MoneyCents::new(250_000),
        ))
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(count_rows(&db, "series_plans").await, 0);

    let tx = engine.transaction(ids[0]).await.unwrap();
    assert_eq!(tx.series_id(), None);
    assert_eq!(tx.payment, PaymentMethod::Cash);
    assert_eq!(tx.category, None);
}

#[tokio::test]
async fn following_edit_leaves_earlier_occurrences_untouched() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 20), "Gym", MoneyCents::new(5_000))
                .category("Health")
                .card(card_id)
                .recurrence(6),
        )
        .await
        .unwrap();

    let updated = engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[2],
            EditScope::FollowingInSeries,
            TransactionPatch::default()
                .amount(MoneyCents::new(6_000))
                .category("Sport"),
        ))
        .await
        .unwrap();
    assert_eq!(updated, ids[2..].to_vec());

    let series_id = engine.transaction(ids[0]).await.unwrap().series_id().unwrap();
    let members = engine.series_transactions(series_id).await.unwrap();
    for tx in &members[..2] {
        assert_eq!(tx.amount, MoneyCents::new(5_000));
        assert_eq!(tx.category.as_deref(), Some("Health"));
    }
    for tx in &members[2..] {
        assert_eq!(tx.amount, MoneyCents::new(6_000));
        assert_eq!(tx.category.as_deref(), Some("Sport"));
    }
    let dates: Vec<_> = members.iter().map(|tx| tx.occurred_on).collect();
    assert_eq!(dates[2], date(2025, 3, 20));
    assert_eq!(dates[5], date(2025, 6, 20));
}

#[tokio::test]
async fn single_edit_changes_only_the_pivot() {
    let (engine, _db) = engine_with_db().await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 2, 1), "Rent", MoneyCents::new(80_000))
                .recurrence(3),
        )
        .await
        .unwrap();

    let updated = engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[1],
            EditScope::Single,
            TransactionPatch::default().description("Rent (discounted)"),
        ))
        .await
        .unwrap();
    assert_eq!(updated, vec![ids[1]]);

    assert_eq!(engine.transaction(ids[0]).await.unwrap().description, "Rent");
    assert_eq!(
        engine.transaction(ids[1]).await.unwrap().description,
        "Rent (discounted)"
    );
    assert_eq!(engine.transaction(ids[2]).await.unwrap().description, "Rent");
}

#[tokio::test]
async fn patch_can_clear_category_and_move_to_card() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 5, 12).await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 4, 2), "Books", MoneyCents::new(3_000))
                .category("Education"),
        )
        .await
        .unwrap();

    engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[0],
            EditScope::Single,
            TransactionPatch::default()
                .category("")
                .payment(PaymentMethod::Card { card_id }),
        ))
        .await
        .unwrap();

    let tx = engine.transaction(ids[0]).await.unwrap();
    assert_eq!(tx.category, None);
    assert_eq!(tx.card_id(), Some(card_id));
    assert_eq!(engine.card_transactions(card_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn following_scope_on_ungrouped_transaction_writes_nothing() {
    let (engine, _db) = engine_with_db().await;

    let ids = engine
        .create_transaction(CreateTransactionCmd::expense(
            date(2025, 3, 3),
            "Coffee",
            MoneyCents::new(350),
        ))
        .await
        .unwrap();

    let err = engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[0],
            EditScope::FollowingInSeries,
            TransactionPatch::default().amount(MoneyCents::new(400)),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotInSeries(ids[0].to_string()));
    assert_eq!(err.kind(), ErrorKind::Referential);

    let err = engine
        .delete_transactions(ids[0], EditScope::FollowingInSeries)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotInSeries(ids[0].to_string()));

    let tx = engine.transaction(ids[0]).await.unwrap();
    assert_eq!(tx.amount, MoneyCents::new(350));
}

#[tokio::test]
async fn update_with_unknown_card_is_rolled_back() {
    let (engine, _db) = engine_with_db().await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 3, 3), "Shoes", MoneyCents::new(9_000))
                .installments(2),
        )
        .await
        .unwrap();

    let missing = Uuid::new_v4();
    let err = engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[0],
            EditScope::FollowingInSeries,
            TransactionPatch::default()
                .amount(MoneyCents::new(1))
                .payment(PaymentMethod::Card { card_id: missing }),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownCard(missing.to_string()));

    for id in ids {
        let tx = engine.transaction(id).await.unwrap();
        assert_eq!(tx.amount, MoneyCents::new(9_000));
        assert_eq!(tx.payment, PaymentMethod::Cash);
    }
}

#[tokio::test]
async fn following_delete_removes_the_tail_and_then_the_plan() {
    let (engine, db) = engine_with_db().await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 15), "Phone", MoneyCents::new(2_500))
                .installments(4),
        )
        .await
        .unwrap();
    let series_id = engine.transaction(ids[0]).await.unwrap().series_id().unwrap();

    let deleted = engine
        .delete_transactions(ids[2], EditScope::FollowingInSeries)
        .await
        .unwrap();
    assert_eq!(deleted, ids[2..].to_vec());
    assert_eq!(count_rows(&db, "transactions").await, 2);
    assert_eq!(count_rows(&db, "series_plans").await, 1);

    let remaining = engine.series_transactions(series_id).await.unwrap();
    assert_eq!(
        remaining.iter().map(|tx| tx.id).collect::<Vec<_>>(),
        ids[..2].to_vec()
    );
    // Survivors still report the original plan size.
    assert!(remaining.iter().all(|tx| tx.plan.total() == Some(4)));

    engine
        .delete_transactions(ids[0], EditScope::FollowingInSeries)
        .await
        .unwrap();
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "series_plans").await, 0);
    assert_eq!(
        engine.series_plan(series_id).await.unwrap_err(),
        EngineError::KeyNotFound("series not exists".to_string())
    );
}

#[tokio::test]
async fn unknown_card_is_rejected_without_writes() {
    let (engine, db) = engine_with_db().await;

    let missing = Uuid::new_v4();
    let err = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 1), "TV", MoneyCents::new(100_000))
                .card(missing)
                .installments(10),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownCard(missing.to_string()));
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "series_plans").await, 0);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_storage() {
    let (engine, db) = engine_with_db().await;

    let err = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 1), "TV", MoneyCents::new(1_000))
                .installments(0),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = engine
        .create_transaction(CreateTransactionCmd::expense(
            date(2025, 1, 1),
            "Refund?",
            MoneyCents::new(-1),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount must be >= 0".to_string())
    );

    let err = engine
        .new_card(NewCardCmd::new("Broken", 0, 10))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "cards").await, 0);
}

#[tokio::test]
async fn card_names_are_unique() {
    let (engine, _db) = engine_with_db().await;
    new_card(&engine, 10, 17).await;

    let err = engine
        .new_card(NewCardCmd::new(" visa ", 1, 8))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("visa".to_string()));
}

#[tokio::test]
async fn card_delete_is_refused_while_referenced() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 6, 1), "Hotel", MoneyCents::new(40_000))
                .card(card_id)
                .installments(2),
        )
        .await
        .unwrap();

    let err = engine.delete_card(card_id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::CardInUse {
            card: card_id.to_string(),
            count: 2,
        }
    );
    assert_eq!(engine.card_transactions(card_id).await.unwrap().len(), 2);

    engine
        .delete_transactions(ids[0], EditScope::FollowingInSeries)
        .await
        .unwrap();
    engine.delete_card(card_id).await.unwrap();
    assert_eq!(
        engine.card(card_id).await.unwrap_err(),
        EngineError::KeyNotFound("card not exists".to_string())
    );
}

#[tokio::test]
async fn inactive_cards_are_hidden_from_default_listing() {
    let (engine, _db) = engine_with_db().await;
    let visa = new_card(&engine, 10, 17).await;
    let amex = engine
        .new_card(NewCardCmd::new("Amex", 25, 5))
        .await
        .unwrap();

    engine
        .update_card(UpdateCardCmd::new(visa).active(false))
        .await
        .unwrap();

    let active: Vec<_> = engine
        .cards(false)
        .await
        .unwrap()
        .into_iter()
        .map(|card| card.id)
        .collect();
    assert_eq!(active, vec![amex]);
    assert_eq!(engine.cards(true).await.unwrap().len(), 2);

    let err = engine
        .update_card(UpdateCardCmd::new(amex))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidPatch("nothing to update".to_string())
    );
}

#[tokio::test]
async fn card_invoice_aggregates_the_open_cycle() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    let purchases = [
        CreateTransactionCmd::expense(date(2025, 3, 5), "Market", MoneyCents::new(10_000))
            .category("Food"),
        CreateTransactionCmd::expense(date(2025, 2, 20), "Train", MoneyCents::new(3_000))
            .category("Travel"),
        CreateTransactionCmd::income(date(2025, 3, 1), "Refund", MoneyCents::new(1_000))
            .category("Food"),
        CreateTransactionCmd::expense(date(2025, 3, 10), "Kiosk", MoneyCents::new(500)),
        // Next cycle.
        CreateTransactionCmd::expense(date(2025, 3, 11), "Cinema", MoneyCents::new(2_000)),
        // Previous cycle.
        CreateTransactionCmd::expense(date(2025, 2, 10), "Dinner", MoneyCents::new(4_000)),
    ];
    for cmd in purchases {
        engine.create_transaction(cmd.card(card_id)).await.unwrap();
    }
    // Not on the card.
    engine
        .create_transaction(CreateTransactionCmd::expense(
            date(2025, 3, 6),
            "Bakery",
            MoneyCents::new(700),
        ))
        .await
        .unwrap();

    let invoice = engine.card_invoice(card_id, date(2025, 3, 8)).await.unwrap();
    assert_eq!(invoice.period.previous_close, date(2025, 2, 10));
    assert_eq!(invoice.period.current_close, date(2025, 3, 10));
    assert_eq!(invoice.due_date, date(2025, 3, 17));
    assert_eq!(invoice.total_open_cycle, MoneyCents::new(12_500));
    assert_eq!(invoice.transaction_count, 4);
    assert_eq!(invoice.total_by_category["Food"], MoneyCents::new(9_000));
    assert_eq!(invoice.total_by_category["Travel"], MoneyCents::new(3_000));
    assert_eq!(invoice.total_by_category[UNCATEGORIZED], MoneyCents::new(500));
    assert_eq!(invoice.available_credit, Some(MoneyCents::new(87_500)));
    assert_eq!(invoice.previous_cycle_total, MoneyCents::new(4_000));
}

#[tokio::test]
async fn installments_spread_over_consecutive_invoices() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 5), "Sofa", MoneyCents::new(15_000))
                .card(card_id)
                .installments(3),
        )
        .await
        .unwrap();

    for (reference, expected) in [
        (date(2025, 1, 10), 15_000),
        (date(2025, 2, 10), 15_000),
        (date(2025, 3, 10), 15_000),
        (date(2025, 4, 10), 0),
    ] {
        let invoice = engine.card_invoice(card_id, reference).await.unwrap();
        assert_eq!(invoice.total_open_cycle, MoneyCents::new(expected));
    }
}

#[tokio::test]
async fn closing_day_change_reclassifies_stored_transactions() {
    let (engine, _db) = engine_with_db().await;
    let card_id = new_card(&engine, 10, 17).await;

    engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 3, 4), "Pharmacy", MoneyCents::new(500))
                .card(card_id),
        )
        .await
        .unwrap();

    let before = engine.card_invoice(card_id, date(2025, 3, 10)).await.unwrap();
    assert_eq!(before.total_open_cycle, MoneyCents::new(500));

    let card = engine
        .update_card(UpdateCardCmd::new(card_id).closing_day(3))
        .await
        .unwrap();
    assert_eq!(card.closing_day, 3);

    let after = engine.card_invoice(card_id, date(2025, 3, 10)).await.unwrap();
    assert_eq!(after.period.previous_close, date(2025, 3, 3));
    assert_eq!(after.period.current_close, date(2025, 4, 3));
    assert_eq!(after.total_open_cycle, MoneyCents::new(500));

    let earlier = engine.card_invoice(card_id, date(2025, 3, 3)).await.unwrap();
    assert_eq!(earlier.total_open_cycle, MoneyCents::ZERO);
    assert_eq!(earlier.transaction_count, 0);
}

#[tokio::test]
async fn long_series_is_written_in_full() {
    let (engine, db) = engine_with_db().await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 15), "Mortgage", MoneyCents::new(150_000))
                .installments(3_300),
        )
        .await
        .unwrap();
    assert_eq!(ids.len(), 3_300);
    assert_eq!(count_rows(&db, "transactions").await, 3_300);
    assert_eq!(count_rows(&db, "series_plans").await, 1);

    let last = engine.transaction(ids[3_299]).await.unwrap();
    assert_eq!(last.plan.index(), Some(3_300));
    assert_eq!(last.occurred_on, date(2299, 12, 15));
}

#[tokio::test]
async fn failed_series_insert_leaves_nothing_behind() {
    let (engine, db) = engine_with_db().await;
    exec_sql(
        &db,
        "CREATE TRIGGER reject_insert BEFORE INSERT ON transactions \
         WHEN NEW.series_index = 1100 \
         BEGIN SELECT RAISE(ABORT, 'insert rejected'); END",
    )
    .await;

    let err = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 15), "Car", MoneyCents::new(40_000))
                .installments(1_200),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(count_rows(&db, "series_plans").await, 0);
}

#[tokio::test]
async fn failed_group_update_keeps_every_member() {
    let (engine, db) = engine_with_db().await;

    let ids = engine
        .create_transaction(
            CreateTransactionCmd::expense(date(2025, 1, 5), "Gym", MoneyCents::new(8_000))
                .recurrence(5),
        )
        .await
        .unwrap();
    exec_sql(
        &db,
        "CREATE TRIGGER reject_update BEFORE UPDATE ON transactions \
         WHEN OLD.series_index = 4 \
         BEGIN SELECT RAISE(ABORT, 'update rejected'); END",
    )
    .await;

    let err = engine
        .update_transactions(UpdateTransactionsCmd::new(
            ids[1],
            EditScope::FollowingInSeries,
            TransactionPatch::default()
                .description("Gym Plus")
                .amount(MoneyCents::new(9_500)),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);

    for id in ids {
        let tx = engine.transaction(id).await.unwrap();
        assert_eq!(tx.description, "Gym");
        assert_eq!(tx.amount, MoneyCents::new(8_000));
    }
}
