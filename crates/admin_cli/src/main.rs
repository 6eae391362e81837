use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Ledger;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tabsplit_admin")]
#[command(about = "Admin utilities for Tabsplit (bootstrap members, inspect balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tabsplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Member(Member),
    /// Print the per-member balance roster.
    Roster,
}

#[derive(Args, Debug)]
struct Member {
    #[command(subcommand)]
    command: MemberCommand,
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    Create(MemberCreateArgs),
    Delete(MemberDeleteArgs),
}

#[derive(Args, Debug)]
struct MemberCreateArgs {
    #[arg(long)]
    username: String,
    /// Credential hash produced by the external auth layer.
    #[arg(long)]
    password_hash: String,
    #[arg(long)]
    email: Option<String>,
    /// Create the member with admin rights.
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct MemberDeleteArgs {
    #[arg(long)]
    id: Uuid,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let ledger = Ledger::builder().database(db).build()?;

    match cli.command {
        Command::Member(Member {
            command: MemberCommand::Create(args),
        }) => {
            let email = args.email.as_deref();
            let member = if args.admin {
                ledger
                    .add_admin(&args.username, &args.password_hash, email)
                    .await
            } else {
                ledger
                    .add_member(&args.username, &args.password_hash, email)
                    .await
            };

            match member {
                Ok(member) => println!("created member: {} ({})", member.username, member.id),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Member(Member {
            command: MemberCommand::Delete(args),
        }) => {
            if let Err(err) = ledger.delete_member(args.id).await {
                eprintln!("{err}");
                std::process::exit(1);
            }
            println!("deleted member: {}", args.id);
        }
        Command::Roster => {
            for line in ledger.admin_roster().await? {
                println!(
                    "{:<24} owes {:>10.2}  owed {:>10.2}  balance {:>10.2}",
                    line.member.username, line.owes, line.owed, line.balance
                );
            }
        }
    }

    Ok(())
}
