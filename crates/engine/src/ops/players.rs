use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, MoneyCents, Player, ResultEngine, Team, players,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// Input of [`Engine::new_player`].
#[derive(Clone, Debug)]
pub struct NewPlayer {
    pub name: String,
    pub team: Team,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
}

/// Adds `delta` to a player's stored balance.
///
/// Shared by direct adjustments and match reconciliation so both go through
/// the same checks inside the caller's transaction.
pub(super) async fn apply_balance_delta<C>(
    db: &C,
    player_id: Uuid,
    delta: MoneyCents,
) -> ResultEngine<Player>
where
    C: ConnectionTrait,
{
    let model = players::Entity::find_by_id(player_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("player {player_id} not exists")))?;

    let balance = MoneyCents::new(model.balance_minor)
        .checked_add(delta)
        .ok_or_else(|| EngineError::InvalidAmount("player balance overflow".to_string()))?;

    let mut active: players::ActiveModel = model.into();
    active.balance_minor = ActiveValue::Set(balance.cents());
    let updated = active.update(db).await?;

    tracing::debug!(%player_id, %delta, %balance, "player balance adjusted");
    Player::try_from(updated)
}

impl Engine {
    /// Add a player to the roster with a zero balance.
    pub async fn new_player(&self, input: NewPlayer) -> ResultEngine<Player> {
        let player = Player {
            id: Uuid::new_v4(),
            name: normalize_required_name(&input.name, "player")?,
            team: input.team,
            batting_style: normalize_optional_text(input.batting_style.as_deref()),
            bowling_style: normalize_optional_text(input.bowling_style.as_deref()),
            balance: MoneyCents::ZERO,
        };

        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            players::ActiveModel::from(&player).insert(&db_tx).await?;
            Ok(player)
        })
    }

    /// Return a player snapshot from DB.
    pub async fn player(&self, player_id: Uuid) -> ResultEngine<Player> {
        let model = players::Entity::find_by_id(player_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("player {player_id} not exists")))?;
        Player::try_from(model)
    }

    /// The whole roster, sorted by name.
    pub async fn list_players(&self) -> ResultEngine<Vec<Player>> {
        players::Entity::find()
            .order_by_asc(players::Column::Name)
            .order_by_asc(players::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Player::try_from)
            .collect()
    }

    /// Applies a signed delta to a player's balance and returns the updated
    /// player.
    pub async fn adjust_player_balance(
        &self,
        player_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<Player> {
        let _writer = self.writer.lock().await;
        with_tx!(self, |db_tx| {
            apply_balance_delta(&db_tx, player_id, delta).await
        })
    }
}
