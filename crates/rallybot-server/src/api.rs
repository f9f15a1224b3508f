use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use rallybot_core::{IncomingMessage, RallyBot};
use rallybot_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limit::RateLimiter;

pub type Bot = RallyBot<Mutex<Database>>;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/command", post(handle_command))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ServerInfoResponse {
    name: &'static str,
    version: &'static str,
    prefix: String,
    board_limit: usize,
    locales: usize,
    stages: usize,
    vehicle_classes: usize,
    rallies: usize,
}

#[derive(Serialize)]
struct CommandResponse {
    reply: Option<String>,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    let catalog = state.bot.catalog();
    Json(ServerInfoResponse {
        name: rallybot_shared::constants::APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
        prefix: state.config.prefix.clone(),
        board_limit: state.config.board_limit,
        locales: catalog.locales().len(),
        stages: catalog.stages().len(),
        vehicle_classes: catalog.vehicle_classes().len(),
        rallies: catalog.rallies().len(),
    })
}

/// Answer one relayed chat message. Messages that are not commands get a
/// `null` reply and never touch the rate limiter.
async fn handle_command(
    State(state): State<AppState>,
    body: Result<Json<IncomingMessage>, JsonRejection>,
) -> Result<Json<CommandResponse>, ServerError> {
    let Json(message) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let Some((origin, _)) = message.command(&state.bot.settings().prefix) else {
        return Ok(Json(CommandResponse { reply: None }));
    };

    if !state.rate_limiter.check(origin.guild_id, origin.user_id).await {
        debug!(guild = %origin.guild_id, user = %origin.user_id, "Rate limited");
        return Err(ServerError::RateLimited);
    }

    // The store is synchronous SQLite; keep it off the async workers.
    let bot = state.bot.clone();
    let reply = tokio::task::spawn_blocking(move || bot.handle_message(&message))
        .await
        .map_err(|e| ServerError::Internal(format!("Command task failed: {}", e)))?;

    Ok(Json(CommandResponse { reply }))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use rallybot_store::CatalogSeed;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::rate_limit::Quota;

    const SEED: &str = r#"{
        "conditions": ["Dry", "Wet", "Snow"],
        "vehicle_classes": [ { "code": "h1", "name": "H1 FWD" } ],
        "locales": [
            {
                "code": "us", "name": "USA", "surface_type": "Gravel",
                "conditions": ["Dry", "Wet"],
                "stages": [ { "code": "01", "name": "North Fork Pass" } ]
            }
        ]
    }"#;

    fn state(burst: f64) -> AppState {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_catalog(&CatalogSeed::from_json(SEED).unwrap())
            .unwrap();
        let catalog = Arc::new(db.load_catalog().unwrap());
        let config = ServerConfig::default();
        let bot = RallyBot::new(catalog, Mutex::new(db), config.bot_settings());

        AppState {
            bot: Arc::new(bot),
            rate_limiter: RateLimiter::new(Quota {
                per_second: 0.001,
                burst,
            }),
            config: Arc::new(config),
        }
    }

    fn command_request(content: &str) -> Request<Body> {
        let body = json!({
            "guild_id": "10",
            "channel_id": "20",
            "user_id": "30",
            "message_id": "40",
            "content": content,
        });
        Request::builder()
            .method("POST")
            .uri("/command")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state(5.0));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_info_reports_catalog_sizes() {
        let app = build_router(state(5.0));
        let response = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["prefix"], "!rallybot");
        assert_eq!(body["board_limit"], 10);
        assert_eq!(body["locales"], 1);
        assert_eq!(body["rallies"], 2);
    }

    #[tokio::test]
    async fn test_record_command_replies() {
        let app = build_router(state(5.0));
        let response = app
            .oneshot(command_request("!rallybot h1 us-01 1:23.456"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("#1"), "unexpected reply: {reply}");
    }

    #[tokio::test]
    async fn test_non_command_gets_null_reply() {
        let app = build_router(state(5.0));
        let response = app
            .oneshot(command_request("nice run everyone"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["reply"].is_null());
    }

    #[tokio::test]
    async fn test_rate_limited_after_burst() {
        let app = build_router(state(1.0));

        let first = app
            .clone()
            .oneshot(command_request("!rallybot help"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .clone()
            .oneshot(command_request("!rallybot help"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        // Chatter without the prefix is never limited.
        let chatter = app.oneshot(command_request("gg")).await.unwrap();
        assert_eq!(chatter.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = build_router(state(5.0));
        let request = Request::builder()
            .method("POST")
            .uri("/command")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"content": "!rallybot help"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request:"));
    }
}
