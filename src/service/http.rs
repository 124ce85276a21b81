//! HTTP API, health and Prometheus endpoints
//!
//! This module exposes the league over HTTP using Axum. Handlers only
//! translate requests into LeagueManager calls; error kinds map to status
//! codes in `ApiError`.

use crate::error::{league_error, LeagueError};
use crate::import::{parse_score, ImportOptions};
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::types::GameId;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// A score as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(i64),
    Text(String),
}

impl ScoreInput {
    fn parse(&self, field: &str) -> Result<u32> {
        match self {
            ScoreInput::Number(value) => parse_score(field, &value.to_string()),
            ScoreInput::Text(value) => parse_score(field, value),
        }
    }
}

/// Body of `POST /games`
#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub first_team: String,
    pub first_team_score: ScoreInput,
    pub second_team: String,
    pub second_team_score: ScoreInput,
}

/// Body of `PUT /games/{id}`
#[derive(Debug, Deserialize)]
pub struct EditGameRequest {
    pub first_team_score: ScoreInput,
    pub second_team_score: ScoreInput,
}

/// Games returned per page of `GET /games` unless `limit` is given
pub const DEFAULT_GAMES_PER_PAGE: usize = 100;

/// Upper bound on `limit` for `GET /games`
pub const MAX_GAMES_PER_PAGE: usize = 1000;

/// Query of `GET /games`; `page` is 1-based
#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Body of `POST /teams`
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Error response carrying a league error kind
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match league_error(&self.0) {
            Some(LeagueError::Validation { .. }) => StatusCode::BAD_REQUEST,
            Some(LeagueError::TeamNotFound { .. }) | Some(LeagueError::GameNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Some(LeagueError::TeamAlreadyExists { .. })
            | Some(LeagueError::StateConsistency { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = league_error(&self.0)
            .map(LeagueError::kind)
            .unwrap_or("internal");

        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        } else {
            debug!("Request rejected ({}): {}", status, self.0);
        }

        (
            status,
            Json(json!({
                "error": self.0.to_string(),
                "kind": kind,
            })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Port to bind to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// HTTP server for the league API
pub struct LeagueServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl LeagueServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Serve until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")?;

        let app = create_router(self.state.clone());
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("League API listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Ask a running server to stop accepting connections
    pub fn stop(&self) {
        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}

/// Create the Axum router with every endpoint
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/standings", get(standings_handler))
        .route("/games", get(list_games_handler).post(create_game_handler))
        .route("/games/import", post(import_handler))
        .route(
            "/games/{id}",
            get(get_game_handler)
                .put(edit_game_handler)
                .delete(delete_game_handler),
        )
        .route("/teams", post(create_team_handler))
        .route(
            "/teams/{name}",
            get(get_team_handler).delete(delete_team_handler),
        )
        .with_state(state)
}

async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.config().service.name,
        "version": crate::VERSION,
        "points_policy": state.league_manager().policy().name(),
        "endpoints": [
            "/health",
            "/metrics",
            "/standings",
            "/games",
            "/games/import",
            "/games/{id}",
            "/teams",
            "/teams/{name}"
        ]
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    match HealthCheck::check(state).await {
        Ok(health) => {
            let status = match health.status {
                HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
                HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(json!(health)))
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
        }
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let metric_families = state.metrics_collector().registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

async fn standings_handler(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.league_manager().standings()?))
}

async fn list_games_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GameListQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(LeagueError::validation("page", "must be at least 1").into());
    }
    let limit = query.limit.unwrap_or(DEFAULT_GAMES_PER_PAGE);
    if limit == 0 || limit > MAX_GAMES_PER_PAGE {
        return Err(LeagueError::validation(
            "limit",
            format!("must be between 1 and {}, got {}", MAX_GAMES_PER_PAGE, limit),
        )
        .into());
    }

    let games = state.league_manager().list_games()?;
    let total = games.len();
    let page_games: Vec<_> = games
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    Ok(Json(json!({
        "games": page_games,
        "page": page,
        "limit": limit,
        "total": total,
    })))
}

async fn create_game_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGameRequest>,
) -> ApiResult<impl IntoResponse> {
    let first_score = request.first_team_score.parse("first team score")?;
    let second_score = request.second_team_score.parse("second team score")?;

    let game = state
        .league_manager()
        .create_game(
            &request.first_team,
            first_score,
            &request.second_team,
            second_score,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(game)))
}

async fn get_game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.league_manager().get_game(game_id)?))
}

async fn edit_game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
    Json(request): Json<EditGameRequest>,
) -> ApiResult<impl IntoResponse> {
    let first_score = request.first_team_score.parse("first team score")?;
    let second_score = request.second_team_score.parse("second team score")?;

    let game = state
        .league_manager()
        .edit_game(game_id, first_score, second_score)
        .await?;

    Ok(Json(game))
}

async fn delete_game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<GameId>,
) -> ApiResult<impl IntoResponse> {
    state.league_manager().delete_game(game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let options = ImportOptions::from(&state.config().import);
    let report = state
        .league_manager()
        .import_csv(body.as_ref(), &options)
        .await;
    let standings = state.league_manager().standings()?;

    let status = if report.is_clean() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((
        status,
        Json(json!({
            "report": report,
            "standings": standings,
        })),
    ))
}

async fn create_team_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<impl IntoResponse> {
    let team = state.league_manager().create_team(&request.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

async fn get_team_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let manager = state.league_manager();
    let team = manager.get_team(&name)?;
    let games = manager.games_for_team(&name)?;
    Ok(Json(json!({ "team": team, "games": games })))
}

async fn delete_team_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted_games = state.league_manager().delete_team(&name).await?;
    Ok(Json(json!({ "team": name, "deleted_games": deleted_games })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::Standing;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt; // for oneshot

    async fn test_app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(AppConfig::default()).await.unwrap());
        let router = create_router(state.clone());
        (state, router)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let (_, app) = test_app().await;
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["points_policy"], "standard");
    }

    #[tokio::test]
    async fn test_create_game_and_standings() {
        let (_, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/games",
                json!({
                    "first_team": "Team 1",
                    "first_team_score": 2,
                    "second_team": "Team 2",
                    "second_team_score": "1"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get("/standings")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let standings: Vec<Standing> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(standings[0].name, "Team 1");
        assert_eq!(standings[0].points, 3);
        assert_eq!(standings[1].points, 0);
    }

    #[tokio::test]
    async fn test_list_games_is_paginated() {
        let (state, app) = test_app().await;
        for i in 0..5 {
            state
                .league_manager()
                .create_game(&format!("Home {}", i), 1, "Away", 0)
                .await
                .unwrap();
        }

        let response = app.clone().oneshot(get("/games")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 5);
        assert_eq!(body["limit"], DEFAULT_GAMES_PER_PAGE);
        assert_eq!(body["games"].as_array().unwrap().len(), 5);

        let response = app
            .clone()
            .oneshot(get("/games?page=2&limit=2"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let games = body["games"].as_array().unwrap();
        assert_eq!(games.len(), 2);
        let all = state.league_manager().list_games().unwrap();
        assert_eq!(games[0]["id"], json!(all[2].id()));
        assert_eq!(games[1]["id"], json!(all[3].id()));

        let response = app
            .clone()
            .oneshot(get("/games?page=4&limit=2"))
            .await
            .unwrap();
        assert!(body_json(response).await["games"].as_array().unwrap().is_empty());

        let response = app.oneshot(get("/games?limit=0")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_negative_score_is_bad_request() {
        let (state, app) = test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/games",
                json!({
                    "first_team": "Team 1",
                    "first_team_score": -1,
                    "second_team": "Team 2",
                    "second_team_score": 0
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "validation");
        assert!(state.league_manager().list_games().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_delete_game() {
        let (state, app) = test_app().await;
        let game = state
            .league_manager()
            .create_game("Team 1", 2, "Team 2", 1)
            .await
            .unwrap();
        let uri = format!("/games/{}", game.id());

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &uri,
                json!({ "first_team_score": 2, "second_team_score": 3 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.league_manager().get_team("Team 2").unwrap().points(),
            3
        );

        let delete = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            state.league_manager().get_team("Team 2").unwrap().points(),
            0
        );
    }

    #[tokio::test]
    async fn test_duplicate_team_is_conflict() {
        let (_, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/teams", json!({ "name": "Team 1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", "/teams", json!({ "name": "Team 1" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["kind"], "already_exists");
    }

    #[tokio::test]
    async fn test_import_endpoint() {
        let (_, app) = test_app().await;
        let csv = "Team_1 name,Team_1 score,Team_2 name,Team_2 score\n\
                   First Team,3,Second Team,3\n";

        let request = Request::builder()
            .method("POST")
            .uri("/games/import")
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from(csv))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report"]["imported"], 1);
        assert_eq!(body["standings"][0]["name"], "First Team");
        assert_eq!(body["standings"][0]["rank"], 1);
        assert_eq!(body["standings"][1]["name"], "Second Team");
        assert_eq!(body["standings"][1]["points"], 1);
    }

    #[tokio::test]
    async fn test_import_with_bad_row() {
        let (_, app) = test_app().await;
        let csv = "h1,h2,h3,h4\nA,1,B,0\nA,one,B,0\n";

        let request = Request::builder()
            .method("POST")
            .uri("/games/import")
            .body(Body::from(csv))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["report"]["imported"], 1);
        assert_eq!(body["report"]["failures"][0]["line"], 3);
    }

    #[tokio::test]
    async fn test_team_detail_and_delete() {
        let (state, app) = test_app().await;
        state
            .league_manager()
            .create_game("Team 1", 0, "Team 2", 0)
            .await
            .unwrap();

        let response = app.clone().oneshot(get("/teams/Team%201")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["team"]["draws"], 1);
        assert_eq!(body["games"].as_array().unwrap().len(), 1);

        let delete = Request::builder()
            .method("DELETE")
            .uri("/teams/Team%201")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["deleted_games"], 1);
        assert_eq!(
            state.league_manager().get_team("Team 2").unwrap().draws(),
            0
        );
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (state, app) = test_app().await;
        state
            .league_manager()
            .create_game("Team 1", 1, "Team 2", 0)
            .await
            .unwrap();

        let response = app.oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("sports_league_games_total{operation=\"create\"} 1"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, app) = test_app().await;

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.start().await.unwrap();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        state.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_404_handling() {
        let (_, app) = test_app().await;
        let response = app.oneshot(get("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_score_input() {
        assert_eq!(ScoreInput::Number(4).parse("score").unwrap(), 4);
        assert_eq!(ScoreInput::Text(" 2 ".to_string()).parse("score").unwrap(), 2);
        assert!(ScoreInput::Text("two".to_string()).parse("score").is_err());
        assert!(ScoreInput::Number(-3).parse("score").is_err());
    }
}
