//! Matches and their per-player payments.
//!
//! Every listed player owes `fee_per_person`; what they actually paid is
//! recorded in `match_players`. The difference `paid - fee` is what a
//! reconciliation moves onto the player's balance.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Player, util::parse_uuid};

/// Input of [`Engine::new_match`](crate::Engine::new_match).
#[derive(Clone, Debug)]
pub struct NewMatch {
    pub ground_name: String,
    pub ground_location: Option<String>,
    pub google_map_link: Option<String>,
    pub booking_fee: MoneyCents,
    pub fee_per_person: MoneyCents,
    pub scheduled_at: DateTime<Utc>,
}

/// One line of a reconciliation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub player_id: Uuid,
    pub paid: MoneyCents,
}

/// A stored payment, with the player populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPayment {
    pub player: Player,
    pub paid: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub ground_name: String,
    pub ground_location: Option<String>,
    pub google_map_link: Option<String>,
    pub booking_fee: MoneyCents,
    pub fee_per_person: MoneyCents,
    pub scheduled_at: DateTime<Utc>,
    pub players: Vec<MatchPayment>,
}

impl Match {
    /// What a payment of `paid` contributes to the payer's balance.
    pub fn contribution(&self, paid: MoneyCents) -> Result<MoneyCents, EngineError> {
        paid.checked_sub(self.fee_per_person)
            .ok_or_else(|| EngineError::InvalidAmount("payment delta overflow".to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub ground_name: String,
    pub ground_location: Option<String>,
    pub google_map_link: Option<String>,
    pub booking_fee_minor: i64,
    pub fee_per_person_minor: i64,
    pub scheduled_at: DateTimeUtc,
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

impl From<&Match> for ActiveModel {
    fn from(m: &Match) -> Self {
        Self {
            id: ActiveValue::Set(m.id.to_string()),
            ground_name: ActiveValue::Set(m.ground_name.clone()),
            ground_location: ActiveValue::Set(m.ground_location.clone()),
            google_map_link: ActiveValue::Set(m.google_map_link.clone()),
            booking_fee_minor: ActiveValue::Set(m.booking_fee.cents()),
            fee_per_person_minor: ActiveValue::Set(m.fee_per_person.cents()),
            scheduled_at: ActiveValue::Set(m.scheduled_at),
        }
    }
}

impl TryFrom<Model> for Match {
    type Error = EngineError;

    /// Converts the header only; `players` is left empty for the caller to
    /// populate.
    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "match")?,
            ground_name: model.ground_name,
            ground_location: model.ground_location,
            google_map_link: model.google_map_link,
            booking_fee: MoneyCents::new(model.booking_fee_minor),
            fee_per_person: MoneyCents::new(model.fee_per_person_minor),
            scheduled_at: model.scheduled_at,
            players: Vec::new(),
        })
    }
}
