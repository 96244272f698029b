use std::{error::Error, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use engine::{
    Direction, Engine, EngineError, EngineSettings, HistoryOrder, Money, TransferCmd, WalletId,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "ewallet_admin")]
#[command(about = "Operator utilities for the ewallet ledger")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ewallet.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Wallet(Wallet),
    /// Move funds between two wallets.
    Transfer(TransferArgs),
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Create a wallet and print its id.
    Create(WalletCreateArgs),
    /// Print the balance of a wallet.
    Show(WalletArgs),
    /// Print the transfers of a wallet.
    History(WalletHistoryArgs),
}

#[derive(Args, Debug)]
struct WalletCreateArgs {
    /// Opening balance in currency units.
    #[arg(long, default_value = "100")]
    balance: Money,
}

#[derive(Args, Debug)]
struct WalletArgs {
    #[arg(long)]
    id: WalletId,
}

#[derive(Args, Debug)]
struct WalletHistoryArgs {
    #[arg(long)]
    id: WalletId,
    #[arg(long)]
    newest_first: bool,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: WalletId,
    #[arg(long)]
    to: WalletId,
    /// Amount in currency units, e.g. `12.50`.
    #[arg(long)]
    amount: Money,
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Map the outcome of a command to the process exit status. A rejected
/// operation is reported on stderr and fails with status 1; any other error
/// is returned to `main`.
fn exit_status(outcome: CliResult<()>) -> CliResult<ExitCode> {
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<EngineError>() {
            Some(rejected) if rejected.is_rejection() => {
                eprintln!("{rejected}");
                Ok(ExitCode::FAILURE)
            }
            _ => Err(err),
        },
    }
}

#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    exit_status(run(Cli::parse()).await)
}

async fn run(cli: Cli) -> CliResult<()> {
    let db = connect_db(&cli.database_url).await?;
    let settings = match &cli.command {
        Command::Wallet(Wallet {
            command: WalletCommand::Create(args),
        }) => EngineSettings {
            initial_balance: args.balance,
            ..EngineSettings::default()
        },
        _ => EngineSettings::default(),
    };
    let engine = Engine::builder()
        .database(db)
        .settings(settings)
        .build()
        .await?;

    match cli.command {
        Command::Wallet(Wallet {
            command: WalletCommand::Create(_),
        }) => {
            let wallet = engine.create_wallet().await?;
            println!("created wallet: {} (balance {})", wallet.id, wallet.balance);
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Show(args),
        }) => {
            let wallet = engine.wallet_status(args.id).await?;
            println!("{}\t{}", wallet.id, wallet.balance);
        }
        Command::Wallet(Wallet {
            command: WalletCommand::History(args),
        }) => {
            let order = if args.newest_first {
                HistoryOrder::NewestFirst
            } else {
                HistoryOrder::OldestFirst
            };
            let records = engine.history_ordered(args.id, order).await?;
            if records.is_empty() {
                println!("no transfers");
            }
            for record in records {
                let (sign, other) = match record.direction(args.id) {
                    Some(Direction::Outgoing) => ("-", record.to),
                    _ => ("+", record.from),
                };
                println!(
                    "#{}\t{}\t{sign}{}\t{other}",
                    record.sequence,
                    record.occurred_at.to_rfc3339(),
                    record.amount
                );
            }
        }
        Command::Transfer(args) => {
            let record = engine
                .transfer(TransferCmd::new(args.from, args.to, args.amount))
                .await?;
            println!(
                "transferred {} from {} to {} ({})",
                record.amount, record.from, record.to, record.id
            );
        }
    }

    Ok(())
}
