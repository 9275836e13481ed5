use std::error::Error;

use clap::Parser;
use engine::{
    CreateTransactionCmd, Engine, EngineError, ErrorKind, NewCardCmd, TransactionKind,
    TransactionPatch, UpdateCardCmd, UpdateTransactionsCmd,
};
use migration::{Migrator, MigratorTrait};
use settings::Database;

use cli::{CardCommand, Command, TxCommand};

mod cli;
mod output;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let mut settings = settings::Settings::new(cli.config.as_deref())?;
    if let Some(database) = cli.database.clone() {
        settings.database = database;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = parse_database(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;

    if let Err(err) = run(&engine, cli.command, cli.json).await {
        eprintln!("error: {err}");
        let code = match err.downcast_ref::<EngineError>().map(EngineError::kind) {
            Some(ErrorKind::Validation) => 2,
            Some(ErrorKind::Referential) => 3,
            Some(ErrorKind::NotFound) => 4,
            Some(ErrorKind::Persistence) | None => 1,
        };
        std::process::exit(code);
    }

    Ok(())
}

async fn run(
    engine: &Engine,
    command: Command,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::Card(card) => match card.command {
            CardCommand::Add(args) => {
                let mut cmd = NewCardCmd::new(args.name, args.closing_day, args.due_day);
                if let Some(limit) = args.limit {
                    cmd = cmd.limit(limit);
                }
                let card_id = engine.new_card(cmd).await?;
                output::emit(json, &[card_id][..], output::ids)?;
            }
            CardCommand::List { all } => {
                let cards = engine.cards(all).await?;
                output::emit(json, cards.as_slice(), output::cards)?;
            }
            CardCommand::Show { id } => {
                let card = engine.card(id).await?;
                output::emit(json, &card, output::card)?;
            }
            CardCommand::Edit(args) => {
                let mut cmd = UpdateCardCmd::new(args.id);
                cmd.name = args.name;
                cmd.closing_day = args.closing_day;
                cmd.due_day = args.due_day;
                cmd.active = args.active;
                if args.no_limit {
                    cmd = cmd.limit(None);
                } else if let Some(limit) = args.limit {
                    cmd = cmd.limit(Some(limit));
                }
                let card = engine.update_card(cmd).await?;
                output::emit(json, &card, output::card)?;
            }
            CardCommand::Delete { id } => {
                engine.delete_card(id).await?;
                output::emit(json, &[id][..], output::ids)?;
            }
        },
        Command::Tx(tx) => match tx.command {
            TxCommand::Add(args) => {
                let kind = if args.income {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                };
                let mut cmd =
                    CreateTransactionCmd::new(kind, args.date, args.description, args.amount);
                if let Some(category) = args.category {
                    cmd = cmd.category(category);
                }
                if let Some(payment) = args.payment.method() {
                    cmd = cmd.payment(payment);
                }
                if let Some(count) = args.installments {
                    cmd = cmd.installments(count);
                } else if let Some(count) = args.recurrence {
                    cmd = cmd.recurrence(count);
                }
                let ids = engine.create_transaction(cmd).await?;
                output::emit(json, ids.as_slice(), output::ids)?;
            }
            TxCommand::Show { id } => {
                let tx = engine.transaction(id).await?;
                output::emit(json, &tx, output::transaction)?;
            }
            TxCommand::Edit(args) => {
                let patch = TransactionPatch {
                    description: args.description,
                    category: args.category,
                    amount: args.amount,
                    payment: args.payment.method(),
                };
                let ids = engine
                    .update_transactions(UpdateTransactionsCmd::new(args.id, args.scope, patch))
                    .await?;
                output::emit(json, ids.as_slice(), output::ids)?;
            }
            TxCommand::Delete { id, scope } => {
                let ids = engine.delete_transactions(id, scope).await?;
                output::emit(json, ids.as_slice(), output::ids)?;
            }
            TxCommand::Series { series_id } => {
                let plan = engine.series_plan(series_id).await?;
                let members = engine.series_transactions(series_id).await?;
                if json {
                    let value = serde_json::json!({ "plan": plan, "transactions": members });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    output::series(&plan, &members);
                }
            }
        },
        Command::Invoice(args) => {
            let reference = args
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let summary = engine.card_invoice(args.card_id, reference).await?;
            output::emit(json, &summary, output::invoice)?;
        }
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(&url).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!(%url, "database ready");
    Ok(database)
}
