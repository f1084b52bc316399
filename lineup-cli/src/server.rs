use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;

use lineup_core::error::LineupError;
use lineup_core::manager::LineupManager;
use lineup_core::sweeper::{AutoLockSweeper, SweeperConfig};
use lineup_core::types::{CoachId, MatchId};

use crate::bootstrap::{create_manager, load_directory, StartupError};
use crate::handlers::*;
use crate::sweeper_task::{local_clock, SweeperTask};

#[derive(Clone)]
pub struct AppState {
    manager: Arc<LineupManager>,
    sweep_interval_secs: u64,
    /// Bearer token required on lineup routes; `None` leaves them open
    api_key: Option<Arc<str>>,
}

pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub storage: String,
    pub seed: Option<std::path::PathBuf>,
    pub sweeper: SweeperConfig,
    pub max_concurrency: usize,
}

pub async fn run(options: ServeOptions) -> Result<(), StartupError> {
    let directory = load_directory(options.seed.as_deref())?;
    let manager = Arc::new(create_manager(&options.storage, directory)?);

    let api_key = std::env::var("LINEUP_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .map(Arc::from);
    if api_key.is_some() {
        tracing::info!("🔐 API key authentication enabled");
    } else {
        tracing::warn!("⚠️  No LINEUP_API_KEY set — server is open (dev mode)");
    }

    let state = AppState {
        manager: Arc::clone(&manager),
        sweep_interval_secs: options.sweeper.interval.as_secs(),
        api_key,
    };

    tracing::info!(
        interval_secs = options.sweeper.interval.as_secs(),
        lead_secs = options.sweeper.window.lead().num_seconds(),
        grace_secs = options.sweeper.window.grace().num_seconds(),
        catch_up = options.sweeper.catch_up,
        "⏱️  Auto-lock window configured"
    );
    let sweeper = Arc::new(AutoLockSweeper::new(manager, options.sweeper));
    let mut sweeper_task = SweeperTask::new(sweeper, local_clock());

    let app = router(state, options.max_concurrency);
    let addr = format!("{}:{}", options.host, options.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: addr.clone(),
            source,
        })?;

    if let Err(e) = sweeper_task.start() {
        tracing::error!(error = %e, "Failed to start auto-lock sweeper");
    }
    tracing::info!("⚽ Lineup server starting on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = sweeper_task.stop().await {
        tracing::error!(error = %e, "Auto-lock sweeper did not stop cleanly");
    }

    served.map_err(StartupError::Serve)
}

pub fn router(state: AppState, max_concurrency: usize) -> Router {
    Router::new()
        // Health is always open (no auth)
        .route("/health", get(health))
        // Protected routes
        .route(
            "/coaches/{coach_id}/lineups/{match_id}",
            get(get_lineup).put(submit_lineup),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(ConcurrencyLimitLayer::new(max_concurrency))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ─── Auth Middleware ────────────────────────────────────────────────────────

async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // If no API key is configured, allow all requests (dev mode)
    let Some(expected_key) = state.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    // Always allow health check without auth
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token == expected_key {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("🚫 Unauthorized request to {}", request.uri().path());
        Err(StatusCode::UNAUTHORIZED)
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

type LineupReply = (StatusCode, Json<ApiResponse<LineupResponse>>);

/// Run a synchronous manager call off the async workers; store calls may
/// wait on a per-lineup lock.
async fn with_manager<T, F>(state: &AppState, f: F) -> Result<T, LineupError>
where
    T: Send + 'static,
    F: FnOnce(&LineupManager) -> Result<T, LineupError> + Send + 'static,
{
    let manager = Arc::clone(&state.manager);
    tokio::task::spawn_blocking(move || f(&manager))
        .await
        .map_err(|e| {
            LineupError::Store(lineup_core::error::StoreError::Backend(format!(
                "worker task failed: {}",
                e
            )))
        })?
}

fn failure(error: LineupError) -> LineupReply {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Lineup request failed");
    } else {
        tracing::info!(error = %error, "Lineup request rejected");
    }
    (status, Json(ApiResponse::from_error(&error)))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    match with_manager(&state, |m| m.drafts()).await {
        Ok(drafts) => (
            StatusCode::OK,
            Json(ApiResponse::ok(HealthResponse {
                status: "ok".to_string(),
                draft_lineups: drafts.len(),
                sweep_interval_secs: state.sweep_interval_secs,
                version: env!("CARGO_PKG_VERSION").to_string(),
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(e.to_string())),
        ),
    }
}

async fn get_lineup(
    State(state): State<AppState>,
    Path((coach_id, match_id)): Path<(CoachId, MatchId)>,
) -> LineupReply {
    match with_manager(&state, move |m| m.get_lineup(coach_id, match_id)).await {
        Ok(lineup) => (StatusCode::OK, Json(ApiResponse::ok(lineup.into()))),
        Err(e) => failure(e),
    }
}

async fn submit_lineup(
    State(state): State<AppState>,
    Path((coach_id, match_id)): Path<(CoachId, MatchId)>,
    Json(req): Json<SubmitLineupRequest>,
) -> LineupReply {
    let result = with_manager(&state, move |m| {
        m.submit_lineup(
            coach_id,
            match_id,
            req.starting_player_ids,
            req.substitute_player_ids,
        )
    })
    .await;

    match result {
        Ok(lineup) => {
            tracing::info!(
                coach_id,
                match_id,
                lineup_id = %lineup.id,
                "Lineup submitted"
            );
            (StatusCode::OK, Json(ApiResponse::ok(lineup.into())))
        }
        Err(e) => failure(e),
    }
}
