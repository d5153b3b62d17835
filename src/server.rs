//! HTTP front-end for any UI that wants to run searches.
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use crate::converter::convert;
use crate::model::{GridCoords, LAT_TO_METERS, LNG_TO_METERS, SEOUL_STATION, validate_coordinates};
use crate::resolver::StopResolver;
use crate::session::{SearchState, Session};

#[derive(Clone)]
struct AppState {
    resolver: Arc<dyn StopResolver>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub stop_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct ConvertReply {
    #[serde(flatten)]
    pub coords: GridCoords,
    pub teleport_command: String,
}

pub fn router(resolver: Arc<dyn StopResolver>) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/convert", get(convert_point))
        .route("/health", get(health))
        .with_state(AppState { resolver })
}

pub async fn serve(addr: &str, resolver: Arc<dyn StopResolver>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("couldn't bind {addr}"))?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(async {
            _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Every request runs its own session, there is nothing shared between searches.
async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchState>) {
    let mut session = Session::new(state.resolver);

    match session.submit_search(&request.stop_id).await {
        None => (
            StatusCode::BAD_REQUEST,
            Json(SearchState::Failure {
                message: "Please enter a bus stop ID.".to_string(),
            }),
        ),
        Some(state) => {
            let status = match state {
                SearchState::Success(_) => StatusCode::OK,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(state.clone()))
        }
    }
}

async fn convert_point(
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertReply>, (StatusCode, String)> {
    validate_coordinates(query.lat, query.lng)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let coords = convert(
        query.lat,
        query.lng,
        &SEOUL_STATION,
        LAT_TO_METERS,
        LNG_TO_METERS,
    );

    Ok(Json(ConvertReply {
        teleport_command: coords.teleport_command(),
        coords,
    }))
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::resolver::mock::MockResolver;

    async fn spawn_app() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::new(MockResolver::default()));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_search_success() -> Result<(), anyhow::Error> {
        let base = spawn_app().await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/search"))
            .json(&json!({"stop_id": "01141"}))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await?;
        assert_eq!(body["state"], "success");
        assert_eq!(body["coords"]["x"], 88);
        assert_eq!(body["coords"]["y"], 64);
        assert_eq!(body["teleport_command"], "/tp @s 88 64 0");
        assert_eq!(body["stop"]["name"], "Seoul Station Bus Transfer Center");

        Ok(())
    }

    #[tokio::test]
    async fn test_search_failure_and_blank() -> Result<(), anyhow::Error> {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/search"))
            .json(&json!({"stop_id": "00000"}))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = response.json().await?;
        assert_eq!(body["state"], "failure");

        let response = client
            .post(format!("{base}/api/search"))
            .json(&json!({"stop_id": "  "}))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_and_health() -> Result<(), anyhow::Error> {
        let base = spawn_app().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .get(format!("{base}/api/convert?lat=37.5537&lng=126.9706"))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(body["x"], 0);
        assert_eq!(body["z"], 111);
        assert_eq!(body["teleport_command"], "/tp @s 0 64 111");

        let response = client
            .get(format!("{base}/api/convert?lat=91&lng=0"))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let health = client.get(format!("{base}/health")).send().await?.text().await?;
        assert_eq!(health, "ok");

        Ok(())
    }
}
