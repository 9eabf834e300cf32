//! JSON request and response bodies of the HTTP API.
//!
//! Money is always an integer number of minor units (`*_minor` fields).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Fund,
        Expenditure,
        ManualUpdate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        pub player_name: Option<String>,
        /// Magnitude for `fund`/`expenditure`, override value for
        /// `manual_update`.
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub remarks: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub player_name: Option<String>,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub remarks: Option<String>,
        pub running_fund_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod fund {
    use super::*;

    /// Body of `POST /transactions/update-fund`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundOverride {
        pub fund_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundResponse {
        pub final_fund_minor: i64,
    }
}

pub mod player {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Team {
        TeamA,
        TeamB,
    }

    /// Body of `PATCH /players/{id}/balance`. Positive or negative.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjust {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlayerView {
        pub id: Uuid,
        pub name: String,
        pub team: Team,
        pub batting_style: Option<String>,
        pub bowling_style: Option<String>,
        pub balance_minor: i64,
    }
}

pub mod matches {
    use super::*;
    use crate::player::PlayerView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub player_id: Uuid,
        pub paid_minor: i64,
    }

    /// Body of `PUT /matches/{id}/players`: the full new payment list.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchPayments {
        pub players: Vec<PaymentNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub player: PlayerView,
        pub paid_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchView {
        pub id: Uuid,
        pub ground_name: String,
        pub ground_location: Option<String>,
        pub google_map_link: Option<String>,
        pub booking_fee_minor: i64,
        pub fee_per_person_minor: i64,
        pub scheduled_at: DateTime<FixedOffset>,
        pub players: Vec<PaymentView>,
    }
}
