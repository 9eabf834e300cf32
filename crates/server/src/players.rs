//! Player balance endpoint

use api_types::player::{BalanceAdjust, PlayerView, Team as ApiTeam};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{EngineError, MoneyCents, Player, Team};

use crate::{ServerError, parse_id, server::ServerState};

pub(crate) fn view(player: Player) -> PlayerView {
    PlayerView {
        id: player.id,
        name: player.name,
        team: match player.team {
            Team::TeamA => ApiTeam::TeamA,
            Team::TeamB => ApiTeam::TeamB,
        },
        batting_style: player.batting_style,
        bowling_style: player.bowling_style,
        balance_minor: player.balance.cents(),
    }
}

/// `amount_minor` may be positive or negative; a missing or non-integer
/// amount is an invalid amount, not a malformed request.
pub async fn adjust_balance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<BalanceAdjust>, JsonRejection>,
) -> Result<Json<PlayerView>, ServerError> {
    let player_id = parse_id(&id, "player")?;
    let Json(payload) = payload.map_err(|rejection| {
        EngineError::InvalidAmount(format!("invalid balance amount: {}", rejection.body_text()))
    })?;

    let player = state
        .engine
        .adjust_player_balance(player_id, MoneyCents::new(payload.amount_minor))
        .await?;
    Ok(Json(view(player)))
}
