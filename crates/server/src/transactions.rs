//! Fund ledger endpoints

use api_types::{
    fund::FundResponse,
    transaction::{
        TransactionKind as ApiKind, TransactionListResponse, TransactionNew, TransactionView,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{MoneyCents, NewTransaction, Transaction, TransactionKind};

use crate::{
    ServerError, parse_id,
    server::{ServerState, body},
};

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Fund => ApiKind::Fund,
        TransactionKind::Expenditure => ApiKind::Expenditure,
        TransactionKind::ManualUpdate => ApiKind::ManualUpdate,
    }
}

fn engine_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Fund => TransactionKind::Fund,
        ApiKind::Expenditure => TransactionKind::Expenditure,
        ApiKind::ManualUpdate => TransactionKind::ManualUpdate,
    }
}

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        player_name: tx.player_name,
        amount_minor: tx.amount.cents(),
        occurred_at: tx.occurred_at.fixed_offset(),
        remarks: tx.remarks,
        running_fund_minor: tx.running_fund.cents(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .list_transactions()
        .await?
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn append(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let payload = body(payload)?;
    let tx = state
        .engine
        .append_transaction(NewTransaction {
            kind: engine_kind(payload.kind),
            player_name: payload.player_name,
            amount: MoneyCents::new(payload.amount_minor),
            occurred_at: payload.occurred_at.with_timezone(&Utc),
            remarks: payload.remarks,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<FundResponse>, ServerError> {
    let id = parse_id(&id, "transaction")?;
    let final_fund = state.engine.delete_transaction(id).await?;
    tracing::info!(transaction_id = %id, %final_fund, "transaction deleted");
    Ok(Json(FundResponse {
        final_fund_minor: final_fund.cents(),
    }))
}
