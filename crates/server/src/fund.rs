//! Team fund endpoints

use api_types::fund::{FundOverride, FundResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use engine::MoneyCents;

use crate::{
    ServerError,
    server::{ServerState, body},
};

fn response(fund: MoneyCents) -> Json<FundResponse> {
    Json(FundResponse {
        final_fund_minor: fund.cents(),
    })
}

pub async fn current(State(state): State<ServerState>) -> Result<Json<FundResponse>, ServerError> {
    Ok(response(state.engine.current_fund().await?))
}

pub async fn override_fund(
    State(state): State<ServerState>,
    payload: Result<Json<FundOverride>, JsonRejection>,
) -> Result<Json<FundResponse>, ServerError> {
    let payload = body(payload)?;
    let final_fund = state
        .engine
        .override_fund(MoneyCents::new(payload.fund_minor))
        .await?;
    Ok(response(final_fund))
}

pub async fn recompute(State(state): State<ServerState>) -> Result<Json<FundResponse>, ServerError> {
    let final_fund = state.engine.recompute_ledger().await?;
    tracing::info!(%final_fund, "ledger recomputed");
    Ok(response(final_fund))
}
