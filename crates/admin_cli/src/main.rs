use std::error::Error;

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    Engine, Match, MoneyCents, NewMatch, NewPlayer, NewTransaction, PaymentEntry, Player, Team,
    Transaction, TransactionKind,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "clubfund_admin")]
#[command(about = "Admin utilities for the club fund (roster, matches, ledger)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./clubfund.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Player(PlayerCommand),
    #[command(subcommand)]
    Match(MatchCommand),
    #[command(subcommand)]
    Tx(TxCommand),
    #[command(subcommand)]
    Fund(FundCommand),
    #[command(subcommand)]
    Balance(BalanceCommand),
    /// Replace the payment list of a match, adjusting player balances.
    Reconcile(ReconcileArgs),
}

#[derive(Subcommand, Debug)]
enum PlayerCommand {
    Create(PlayerCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct PlayerCreateArgs {
    #[arg(long)]
    name: String,
    /// `team_a` or `team_b`.
    #[arg(long, value_parser = parse_team)]
    team: Team,
    #[arg(long)]
    batting_style: Option<String>,
    #[arg(long)]
    bowling_style: Option<String>,
}

#[derive(Subcommand, Debug)]
enum MatchCommand {
    Create(MatchCreateArgs),
    Show { id: Uuid },
}

#[derive(Args, Debug)]
struct MatchCreateArgs {
    #[arg(long)]
    ground: String,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    map_link: Option<String>,
    #[arg(long)]
    booking_fee: MoneyCents,
    #[arg(long)]
    fee_per_person: MoneyCents,
    /// RFC 3339 timestamp, defaults to now.
    #[arg(long)]
    at: Option<DateTime<FixedOffset>>,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add(TxAddArgs),
    Delete { id: Uuid },
    List,
}

#[derive(Args, Debug)]
struct TxAddArgs {
    /// `fund`, `expenditure` or `manual_update`.
    #[arg(long, value_parser = parse_kind)]
    kind: TransactionKind,
    #[arg(long, allow_hyphen_values = true)]
    amount: MoneyCents,
    #[arg(long)]
    player: Option<String>,
    #[arg(long)]
    remarks: Option<String>,
    /// RFC 3339 timestamp, defaults to now.
    #[arg(long)]
    at: Option<DateTime<FixedOffset>>,
}

#[derive(Subcommand, Debug)]
enum FundCommand {
    Show,
    /// Reset the team fund to the given value as of now.
    Set {
        #[arg(allow_hyphen_values = true)]
        value: MoneyCents,
    },
    Recompute,
}

#[derive(Subcommand, Debug)]
enum BalanceCommand {
    Adjust {
        player: Uuid,
        #[arg(allow_hyphen_values = true)]
        delta: MoneyCents,
    },
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    #[arg(long = "match")]
    match_id: Uuid,
    /// `<player_id>=<amount>`, repeat once per player.
    #[arg(long = "payment", value_parser = parse_payment)]
    payments: Vec<PaymentEntry>,
}

fn parse_team(raw: &str) -> Result<Team, String> {
    Team::try_from(raw).map_err(|err| err.to_string())
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_payment(raw: &str) -> Result<PaymentEntry, String> {
    let (player, paid) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <player_id>=<amount>, got {raw:?}"))?;
    Ok(PaymentEntry {
        player_id: player.trim().parse().map_err(|err| format!("{err}"))?,
        paid: paid.parse().map_err(|err: engine::EngineError| err.to_string())?,
    })
}

fn print_player(player: &Player) {
    println!(
        "{}  {:<20} {:<6} balance {}",
        player.id,
        player.name,
        player.team.as_str(),
        player.balance
    );
}

fn print_match(fixture: &Match) {
    println!(
        "{}  {} at {} (booking {}, per person {})",
        fixture.id,
        fixture.ground_name,
        fixture.scheduled_at.to_rfc3339(),
        fixture.booking_fee,
        fixture.fee_per_person
    );
    for payment in &fixture.players {
        println!("  {:<20} paid {}", payment.player.name, payment.paid);
    }
}

fn print_transaction(tx: &Transaction) {
    println!(
        "{}  {}  {:<13} {:>10}  fund {:>10}  {}",
        tx.id,
        tx.occurred_at.to_rfc3339(),
        tx.kind.as_str(),
        tx.amount,
        tx.running_fund,
        tx.player_name.as_deref().unwrap_or("-")
    );
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
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Player(PlayerCommand::Create(args)) => {
            let player = engine
                .new_player(NewPlayer {
                    name: args.name,
                    team: args.team,
                    batting_style: args.batting_style,
                    bowling_style: args.bowling_style,
                })
                .await?;
            println!("created player: {} ({})", player.name, player.id);
        }
        Command::Player(PlayerCommand::List) => {
            for player in engine.list_players().await? {
                print_player(&player);
            }
        }
        Command::Match(MatchCommand::Create(args)) => {
            let fixture = engine
                .new_match(NewMatch {
                    ground_name: args.ground,
                    ground_location: args.location,
                    google_map_link: args.map_link,
                    booking_fee: args.booking_fee,
                    fee_per_person: args.fee_per_person,
                    scheduled_at: args.at.map_or_else(Utc::now, |at| at.with_timezone(&Utc)),
                })
                .await?;
            println!("created match: {} ({})", fixture.ground_name, fixture.id);
        }
        Command::Match(MatchCommand::Show { id }) => {
            print_match(&engine.match_detail(id).await?);
        }
        Command::Tx(TxCommand::Add(args)) => {
            let tx = engine
                .append_transaction(NewTransaction {
                    kind: args.kind,
                    player_name: args.player,
                    amount: args.amount,
                    occurred_at: args.at.map_or_else(Utc::now, |at| at.with_timezone(&Utc)),
                    remarks: args.remarks,
                })
                .await?;
            print_transaction(&tx);
            println!("team fund: {}", engine.current_fund().await?);
        }
        Command::Tx(TxCommand::Delete { id }) => {
            let fund = engine.delete_transaction(id).await?;
            println!("deleted transaction {id}, team fund: {fund}");
        }
        Command::Tx(TxCommand::List) => {
            for tx in engine.list_transactions().await? {
                print_transaction(&tx);
            }
        }
        Command::Fund(FundCommand::Show) => {
            println!("team fund: {}", engine.current_fund().await?);
        }
        Command::Fund(FundCommand::Set { value }) => {
            let fund = engine.override_fund(value).await?;
            println!("team fund set to {fund}");
        }
        Command::Fund(FundCommand::Recompute) => {
            let fund = engine.recompute_ledger().await?;
            println!("ledger recomputed, team fund: {fund}");
        }
        Command::Balance(BalanceCommand::Adjust { player, delta }) => {
            print_player(&engine.adjust_player_balance(player, delta).await?);
        }
        Command::Reconcile(args) => {
            let fixture = engine
                .reconcile_match_payments(args.match_id, args.payments)
                .await?;
            print_match(&fixture);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_pairs_parse() {
        let id = Uuid::new_v4();
        let entry = parse_payment(&format!("{id}=12.50")).unwrap();
        assert_eq!(entry.player_id, id);
        assert_eq!(entry.paid, MoneyCents::new(1250));

        assert!(parse_payment("no-separator").is_err());
        assert!(parse_payment(&format!("{id}=ten")).is_err());
        assert!(parse_payment("not-a-uuid=1").is_err());
    }

    #[test]
    fn cli_parses_negative_adjustment() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "clubfund_admin",
            "--database-url",
            "sqlite::memory:",
            "balance",
            "adjust",
            &id.to_string(),
            "-5.00",
        ])
        .unwrap();
        match cli.command {
            Command::Balance(BalanceCommand::Adjust { player, delta }) => {
                assert_eq!(player, id);
                assert_eq!(delta, MoneyCents::new(-500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_kind() {
        let parsed = Cli::try_parse_from([
            "clubfund_admin",
            "tx",
            "add",
            "--kind",
            "refund",
            "--amount",
            "1",
        ]);
        assert!(parsed.is_err());
    }
}
