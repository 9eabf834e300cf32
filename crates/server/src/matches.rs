//! Match payment endpoints

use api_types::matches::{MatchPayments, MatchView, PaymentView};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::{Match, MoneyCents, PaymentEntry};

use crate::{
    ServerError, parse_id, players,
    server::{ServerState, body},
};

fn view(m: Match) -> MatchView {
    MatchView {
        id: m.id,
        ground_name: m.ground_name,
        ground_location: m.ground_location,
        google_map_link: m.google_map_link,
        booking_fee_minor: m.booking_fee.cents(),
        fee_per_person_minor: m.fee_per_person.cents(),
        scheduled_at: m.scheduled_at.fixed_offset(),
        players: m
            .players
            .into_iter()
            .map(|payment| PaymentView {
                player: players::view(payment.player),
                paid_minor: payment.paid.cents(),
            })
            .collect(),
    }
}

pub async fn reconcile(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<MatchPayments>, JsonRejection>,
) -> Result<Json<MatchView>, ServerError> {
    let match_id = parse_id(&id, "match")?;
    let payload = body(payload)?;
    let entries = payload
        .players
        .into_iter()
        .map(|entry| PaymentEntry {
            player_id: entry.player_id,
            paid: MoneyCents::new(entry.paid_minor),
        })
        .collect();

    let updated = state
        .engine
        .reconcile_match_payments(match_id, entries)
        .await?;
    Ok(Json(view(updated)))
}

pub async fn remove_player(
    State(state): State<ServerState>,
    Path((id, player_id)): Path<(String, String)>,
) -> Result<Json<MatchView>, ServerError> {
    let match_id = parse_id(&id, "match")?;
    let player_id = parse_id(&player_id, "player")?;
    let updated = state
        .engine
        .remove_match_player(match_id, player_id)
        .await?;
    Ok(Json(view(updated)))
}
