//! Fund transaction primitives.
//!
//! A `Transaction` is one entry of the team fund ledger. Its
//! `running_fund` is derived: it is the fund total right after the entry is
//! applied, given every earlier entry in chronological order.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid into the fund.
    Fund,
    /// Money spent from the fund.
    Expenditure,
    /// Operator override: the fund becomes the entry's amount.
    ManualUpdate,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fund => "fund",
            Self::Expenditure => "expenditure",
            Self::ManualUpdate => "manual_update",
        }
    }

    /// Applies one entry of this kind to the running `fund`.
    pub fn apply(self, fund: MoneyCents, amount: MoneyCents) -> ResultEngine<MoneyCents> {
        let overflow = || EngineError::InvalidAmount("running fund overflow".to_string());
        match self {
            Self::Fund => fund.checked_add(amount).ok_or_else(overflow),
            Self::Expenditure => fund.checked_sub(amount).ok_or_else(overflow),
            Self::ManualUpdate => Ok(amount),
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "fund" => Ok(Self::Fund),
            "expenditure" => Ok(Self::Expenditure),
            "manual_update" => Ok(Self::ManualUpdate),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Input of [`Engine::append_transaction`](crate::Engine::append_transaction).
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub player_name: Option<String>,
    /// Magnitude for `Fund`/`Expenditure`, override value for `ManualUpdate`.
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub remarks: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub player_name: Option<String>,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub remarks: Option<String>,
    pub running_fund: MoneyCents,
}

impl Transaction {
    /// Builds a new entry with a zero running fund; the ledger pass fills it.
    pub fn new(
        kind: TransactionKind,
        player_name: Option<String>,
        amount: MoneyCents,
        occurred_at: DateTime<Utc>,
        remarks: Option<String>,
    ) -> ResultEngine<Self> {
        if kind != TransactionKind::ManualUpdate && !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "{} amount must be > 0",
                kind.as_str()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            player_name,
            amount,
            occurred_at,
            remarks,
            running_fund: MoneyCents::ZERO,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub player_name: Option<String>,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub remarks: Option<String>,
    pub running_fund_minor: i64,
    /// Insertion order, breaks ties between entries at the same instant.
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            player_name: ActiveValue::Set(tx.player_name.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            remarks: ActiveValue::Set(tx.remarks.clone()),
            running_fund_minor: ActiveValue::Set(tx.running_fund.cents()),
            seq: ActiveValue::NotSet,
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            player_name: model.player_name,
            amount: MoneyCents::new(model.amount_minor),
            occurred_at: model.occurred_at,
            remarks: model.remarks,
            running_fund: MoneyCents::new(model.running_fund_minor),
        })
    }
}
