//! Initial schema migration - creates all tables from scratch.
//!
//! - `players`: the roster and each player's running balance
//! - `matches`: fixtures with their per-person fee
//! - `match_players`: what each listed player paid for a match
//! - `transactions`: the team fund ledger with its derived running fund

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Players {
    Table,
    Id,
    Name,
    Team,
    BattingStyle,
    BowlingStyle,
    BalanceMinor,
}

#[derive(Iden)]
enum Matches {
    Table,
    Id,
    GroundName,
    GroundLocation,
    GoogleMapLink,
    BookingFeeMinor,
    FeePerPersonMinor,
    ScheduledAt,
}

#[derive(Iden)]
enum MatchPlayers {
    Table,
    MatchId,
    PlayerId,
    PaidMinor,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Kind,
    PlayerName,
    AmountMinor,
    OccurredAt,
    Remarks,
    RunningFundMinor,
    Seq,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Players
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::Team).string().not_null())
                    .col(ColumnDef::new(Players::BattingStyle).string())
                    .col(ColumnDef::new(Players::BowlingStyle).string())
                    .col(
                        ColumnDef::new(Players::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Matches
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matches::GroundName).string().not_null())
                    .col(ColumnDef::new(Matches::GroundLocation).string())
                    .col(ColumnDef::new(Matches::GoogleMapLink).string())
                    .col(
                        ColumnDef::new(Matches::BookingFeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::FeePerPersonMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::ScheduledAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Match payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MatchPlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MatchPlayers::MatchId).string().not_null())
                    .col(ColumnDef::new(MatchPlayers::PlayerId).string().not_null())
                    .col(
                        ColumnDef::new(MatchPlayers::PaidMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MatchPlayers::MatchId)
                            .col(MatchPlayers::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-match_players-match_id")
                            .from(MatchPlayers::Table, MatchPlayers::MatchId)
                            .to(Matches::Table, Matches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-match_players-player_id")
                            .from(MatchPlayers::Table, MatchPlayers::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Fund ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::PlayerName).string())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Remarks).string())
                    .col(
                        ColumnDef::new(Transactions::RunningFundMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Seq)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Suffix recomputation seeks by time, ties in insertion order.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-occurred_at-seq")
                    .table(Transactions::Table)
                    .col(Transactions::OccurredAt)
                    .col(Transactions::Seq)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchPlayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        Ok(())
    }
}
