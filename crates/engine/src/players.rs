//! Roster entries.
//!
//! A player's `balance` is a running total changed only by signed deltas
//! (match reconciliation or manual adjustment). It is not backed by a log
//! and is independent from the team fund ledger.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    TeamA,
    TeamB,
}

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TeamA => "team_a",
            Self::TeamB => "team_b",
        }
    }
}

impl TryFrom<&str> for Team {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "team_a" => Ok(Self::TeamA),
            "team_b" => Ok(Self::TeamB),
            other => Err(EngineError::InvalidInput(format!("invalid team: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub team: Team,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub balance: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub team: String,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub balance_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::match_players::Entity")]
    MatchPlayers,
}

impl Related<super::match_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Player> for ActiveModel {
    fn from(player: &Player) -> Self {
        Self {
            id: ActiveValue::Set(player.id.to_string()),
            name: ActiveValue::Set(player.name.clone()),
            team: ActiveValue::Set(player.team.as_str().to_string()),
            batting_style: ActiveValue::Set(player.batting_style.clone()),
            bowling_style: ActiveValue::Set(player.bowling_style.clone()),
            balance_minor: ActiveValue::Set(player.balance.cents()),
        }
    }
}

impl TryFrom<Model> for Player {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "player")?,
            name: model.name,
            team: Team::try_from(model.team.as_str())?,
            batting_style: model.batting_style,
            bowling_style: model.bowling_style,
            balance: MoneyCents::new(model.balance_minor),
        })
    }
}
