use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{delete, get, patch, post, put},
};

use std::sync::Arc;

use crate::{ServerError, fund, matches, players, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Unwrap a JSON body, reporting a malformed one as a bad request.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServerError::Generic(rejection.body_text()))
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::append),
        )
        .route("/transactions/update-fund", post(fund::override_fund))
        .route("/transactions/{id}", delete(transactions::remove))
        .route("/fund", get(fund::current))
        .route("/fund/recompute", post(fund::recompute))
        .route("/players/{id}/balance", patch(players::adjust_balance))
        .route("/matches/{id}/players", put(matches::reconcile))
        .route(
            "/matches/{id}/players/{player_id}",
            delete(matches::remove_player),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use chrono::Utc;
    use engine::{MoneyCents, NewMatch, NewPlayer, Team};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn app() -> (Router, Arc<Engine>) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Arc::new(Engine::builder().database(db).build().await.unwrap());
        let router = router(ServerState {
            engine: Arc::clone(&engine),
        });
        (router, engine)
    }

    async fn send(app: &Router, method: Method, uri: &str, payload: Option<Value>) -> (StatusCode, Value) {
        let body = payload.map_or_else(Body::empty, |value| Body::from(value.to_string()));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn append_list_and_delete_round() {
        let (app, _engine) = app().await;

        let (status, fund) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(json!({
                "kind": "fund",
                "player_name": "Ravi",
                "amount_minor": 50000,
                "occurred_at": "2024-05-01T10:00:00+05:30",
                "remarks": "season dues"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(fund["running_fund_minor"], 50000);

        let (status, spent) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(json!({
                "kind": "expenditure",
                "amount_minor": 20000,
                "occurred_at": "2024-05-01T11:00:00+05:30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(spent["running_fund_minor"], 30000);

        let (status, listed) = send(&app, Method::GET, "/transactions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["transactions"][0]["kind"], "expenditure");
        assert_eq!(listed["transactions"][1]["kind"], "fund");

        let uri = format!("/transactions/{}", spent["id"].as_str().unwrap());
        let (status, deleted) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["final_fund_minor"], 50000);

        let (_, current) = send(&app, Method::GET, "/fund", None).await;
        assert_eq!(current["final_fund_minor"], 50000);
    }

    #[tokio::test]
    async fn update_fund_returns_the_override() {
        let (app, _engine) = app().await;
        let (status, fund) = send(
            &app,
            Method::POST,
            "/transactions/update-fund",
            Some(json!({ "fund_minor": 100000 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fund["final_fund_minor"], 100000);

        let (status, fund) = send(&app, Method::POST, "/fund/recompute", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fund["final_fund_minor"], 100000);
    }

    #[tokio::test]
    async fn invalid_inputs_map_to_client_errors() {
        let (app, _engine) = app().await;

        let (status, _) = send(&app, Method::DELETE, "/transactions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/transactions/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(json!({
                "kind": "expenditure",
                "amount_minor": 0,
                "occurred_at": "2024-05-01T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("amount"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(json!({ "kind": "refund", "amount_minor": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn balance_adjustment_validates_amount() {
        let (app, engine) = app().await;
        let player = engine
            .new_player(NewPlayer {
                name: "Ravi".to_string(),
                team: Team::TeamB,
                batting_style: None,
                bowling_style: None,
            })
            .await
            .unwrap();
        let uri = format!("/players/{}/balance", player.id);

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "amount_minor": -250 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["balance_minor"], -250);
        assert_eq!(updated["team"], "team_b");

        let (status, _) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "amount_minor": "ten" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            engine.player(player.id).await.unwrap().balance,
            MoneyCents::new(-250)
        );

        let missing = format!("/players/{}/balance", uuid::Uuid::new_v4());
        let (status, _) = send(
            &app,
            Method::PATCH,
            &missing,
            Some(json!({ "amount_minor": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reconcile_and_remove_match_player() {
        let (app, engine) = app().await;
        let mut ids = Vec::new();
        for name in ["Ravi", "Sam"] {
            let player = engine
                .new_player(NewPlayer {
                    name: name.to_string(),
                    team: Team::TeamA,
                    batting_style: None,
                    bowling_style: None,
                })
                .await
                .unwrap();
            ids.push(player.id);
        }
        let fixture = engine
            .new_match(NewMatch {
                ground_name: "Riverside Oval".to_string(),
                ground_location: None,
                google_map_link: None,
                booking_fee: MoneyCents::new(2200),
                fee_per_person: MoneyCents::new(100),
                scheduled_at: Utc::now(),
            })
            .await
            .unwrap();

        let uri = format!("/matches/{}/players", fixture.id);
        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "players": [
                { "player_id": ids[0], "paid_minor": 150 },
                { "player_id": ids[1], "paid_minor": 80 }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["players"][0]["player"]["balance_minor"], 50);
        assert_eq!(updated["players"][1]["player"]["balance_minor"], -20);

        let uri = format!("/matches/{}/players/{}", fixture.id, ids[1]);
        let (status, updated) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["players"].as_array().unwrap().len(), 1);
        assert_eq!(
            engine.player(ids[1]).await.unwrap().balance,
            MoneyCents::ZERO
        );
    }
}
