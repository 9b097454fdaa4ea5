// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod scheduler;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use live::{LiveEvent, LiveEventBroadcaster};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use gavel_api::{
    ApiError, AuctionDetailResponse, AuctionResponse, CreateAuctionRequest, CreateUserRequest,
    InvariantsResponse, LeaderboardEntryResponse, LedgerEntryResponse, PlaceBidRequest,
    PlaceBidResponse, TopupRequest, UserResponse, WinnerResponse,
};
use gavel_persistence::Persistence;

/// Gavel Server - HTTP server and settlement scheduler for the Gavel
/// auction system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an
    /// in-memory database.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Settlement scheduler tick interval in milliseconds
    #[arg(long, env = "TICK_INTERVAL_MS", default_value_t = 1000)]
    tick_interval_ms: u64,
}

/// Application state shared across handlers and the scheduler.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access, and a live event broadcaster for WebSocket
/// streaming.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Live event broadcaster for streaming state changes to clients.
    live_events: Arc<LiveEventBroadcaster>,
}

/// Current wall-clock instant in Unix milliseconds.
fn current_time_ms() -> i64 {
    i64::try_from(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000)
        .unwrap_or(i64::MAX)
}

/// Query parameters for paginated list endpoints.
#[derive(Debug, Deserialize)]
struct LimitQuery {
    /// Maximum number of rows to return.
    limit: Option<i64>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// The stable machine-readable code.
    code: String,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The stable machine-readable code.
    code: String,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            code: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = err.code(), message = err.message(), "Internal error");
        }
        Self {
            status,
            code: err.code().to_string(),
            message: err.message().to_string(),
        }
    }
}

/// Handler for POST `/users` endpoint.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), HttpError> {
    info!(username = %req.username, "Handling create_user request");

    let mut persistence = app_state.persistence.lock().await;
    let user = gavel_api::create_user(&mut persistence, &req, current_time_ms())?;
    drop(persistence);

    app_state.live_events.broadcast(&LiveEvent::UserCreated {
        user_id: user.id,
        username: user.username.clone(),
    });

    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET `/users/{id}` endpoint.
async fn handle_get_user(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let user = gavel_api::get_user(&mut persistence, user_id)?;
    Ok(Json(user))
}

/// Handler for POST `/users/{id}/topup` endpoint.
async fn handle_topup(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<TopupRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(user_id, amount_cents = req.amount_cents, "Handling topup request");

    let mut persistence = app_state.persistence.lock().await;
    let user = gavel_api::topup(&mut persistence, user_id, &req, current_time_ms())?;
    Ok(Json(user))
}

/// Handler for GET `/users/{id}/ledger` endpoint.
async fn handle_get_ledger(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LedgerEntryResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let ledger = gavel_api::get_ledger(&mut persistence, user_id, query.limit)?;
    Ok(Json(ledger))
}

/// Handler for POST `/auctions` endpoint.
async fn handle_create_auction(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateAuctionRequest>,
) -> Result<(StatusCode, Json<AuctionResponse>), HttpError> {
    info!(title = %req.title, total_items = req.total_items, "Handling create_auction request");

    let mut persistence = app_state.persistence.lock().await;
    let auction = gavel_api::create_auction(&mut persistence, &req, current_time_ms())?;
    drop(persistence);

    app_state.live_events.broadcast(&LiveEvent::AuctionCreated {
        auction_id: auction.id,
        title: auction.title.clone(),
    });

    Ok((StatusCode::CREATED, Json(auction)))
}

/// Handler for POST `/auctions/{id}/start` endpoint.
async fn handle_start_auction(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<AuctionResponse>, HttpError> {
    info!(auction_id, "Handling start_auction request");

    let mut persistence = app_state.persistence.lock().await;
    let auction = gavel_api::start_auction(&mut persistence, auction_id, current_time_ms())?;
    drop(persistence);

    app_state.live_events.broadcast(&LiveEvent::AuctionStarted {
        auction_id: auction.id,
        round_ends_at_ms: auction.current_round_ends_at_ms.unwrap_or_default(),
    });

    Ok(Json(auction))
}

/// Handler for GET `/auctions/{id}` endpoint.
async fn handle_get_auction(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<AuctionDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let detail = gavel_api::get_auction(&mut persistence, auction_id)?;
    Ok(Json(detail))
}

/// Handler for POST `/auctions/{id}/bids` endpoint.
async fn handle_place_bid(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<Json<PlaceBidResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let receipt = gavel_api::place_bid(&mut persistence, auction_id, &req, current_time_ms())?;
    drop(persistence);

    app_state.live_events.broadcast(&LiveEvent::BidPlaced {
        auction_id: receipt.auction_id,
        user_id: receipt.user_id,
        entry_id: receipt.entry_id.clone(),
        amount_cents: receipt.bid_cents,
    });

    Ok(Json(receipt))
}

/// Handler for GET `/auctions/{id}/leaderboard` endpoint.
async fn handle_get_leaderboard(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LeaderboardEntryResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let board = gavel_api::get_leaderboard(&mut persistence, auction_id, query.limit)?;
    Ok(Json(board))
}

/// Handler for GET `/auctions/{id}/winners` endpoint.
async fn handle_get_winners(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<WinnerResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let winners = gavel_api::get_winners(&mut persistence, auction_id, query.limit)?;
    Ok(Json(winners))
}

/// Handler for GET `/auctions/{id}/invariants` endpoint.
async fn handle_check_invariants(
    AxumState(app_state): AxumState<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<Json<InvariantsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let report = gavel_api::check_invariants(&mut persistence, auction_id)?;
    Ok(Json(report))
}

/// Builds the application router with all endpoints.
fn build_router(state: AppState) -> Router {
    let live_broadcaster = Arc::clone(&state.live_events);

    let api_router = Router::new()
        .route("/users", post(handle_create_user))
        .route("/users/{id}", get(handle_get_user))
        .route("/users/{id}/topup", post(handle_topup))
        .route("/users/{id}/ledger", get(handle_get_ledger))
        .route("/auctions", post(handle_create_auction))
        .route("/auctions/{id}/start", post(handle_start_auction))
        .route("/auctions/{id}", get(handle_get_auction))
        .route("/auctions/{id}/bids", post(handle_place_bid))
        .route("/auctions/{id}/leaderboard", get(handle_get_leaderboard))
        .route("/auctions/{id}/winners", get(handle_get_winners))
        .route("/auctions/{id}/invariants", get(handle_check_invariants))
        .with_state(state);

    let live_router = Router::new()
        .route("/live", axum::routing::get(live::live_events_handler))
        .with_state(live_broadcaster);

    Router::new()
        .nest("/api", api_router)
        .nest("/api", live_router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing; LOG_LEVEL controls the filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Gavel Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        live_events: Arc::new(LiveEventBroadcaster::new()),
    };

    // Start the settlement scheduler as a background daemon task.
    tokio::spawn(scheduler::run(app_state.clone(), args.tick_interval_ms));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            live_events: Arc::new(LiveEventBroadcaster::new()),
        }
    }

    async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (HttpStatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(value) => builder
                .body(Body::from(value.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("Request must complete");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body must be JSON")
        };
        (status, value)
    }

    async fn create_funded_user(app: &Router, username: &str, cents: i64) -> i64 {
        let (status, user) =
            send_json(app, "POST", "/api/users", Some(json!({ "username": username }))).await;
        assert_eq!(status, HttpStatusCode::CREATED);
        let user_id = user["id"].as_i64().expect("User id must be numeric");
        if cents > 0 {
            let (status, _) = send_json(
                app,
                "POST",
                &format!("/api/users/{user_id}/topup"),
                Some(json!({ "amountCents": cents })),
            )
            .await;
            assert_eq!(status, HttpStatusCode::OK);
        }
        user_id
    }

    async fn create_running_auction(app: &Router) -> i64 {
        let (status, auction) = send_json(
            app,
            "POST",
            "/api/auctions",
            Some(json!({
                "title": "Test drop",
                "totalItems": 2,
                "itemsPerRound": 1,
                "roundDurationSec": 60,
                "minBidCents": 1,
                "antiSnipeWindowSec": 0,
                "antiSnipeExtensionSec": 0,
                "antiSnipeMaxTotalExtensionSec": 0
            })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::CREATED);
        let auction_id = auction["id"].as_i64().expect("Auction id must be numeric");

        let (status, started) = send_json(
            app,
            "POST",
            &format!("/api/auctions/{auction_id}/start"),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(started["status"], "running");
        auction_id
    }

    #[tokio::test]
    async fn test_create_user_returns_201() {
        let app = build_router(create_test_app_state());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "alice" })),
        )
        .await;

        assert_eq!(status, HttpStatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["wallet"]["availableCents"], 0);
        assert_eq!(body["wallet"]["reservedCents"], 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_400_with_code() {
        let app = build_router(create_test_app_state());
        create_funded_user(&app, "alice", 0).await;

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "alice" })),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "USERNAME_TAKEN");
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let app = build_router(create_test_app_state());

        let (status, body) = send_json(&app, "GET", "/api/users/999", None).await;
        assert_eq!(status, HttpStatusCode::NOT_FOUND);
        assert_eq!(body["code"], "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_positive_topup_is_400() {
        let app = build_router(create_test_app_state());
        let user_id = create_funded_user(&app, "alice", 0).await;

        let (status, body) = send_json(
            &app,
            "POST",
            &format!("/api/users/{user_id}/topup"),
            Some(json!({ "amountCents": 0 })),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "AMOUNT_MUST_BE_POSITIVE");
    }

    #[tokio::test]
    async fn test_invalid_auction_config_is_400() {
        let app = build_router(create_test_app_state());

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/auctions",
            Some(json!({
                "title": "Bad config",
                "totalItems": 5,
                "itemsPerRound": 6,
                "roundDurationSec": 60,
                "minBidCents": 1
            })),
        )
        .await;

        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ITEMS_PER_ROUND_GT_TOTAL");
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_409() {
        let app = build_router(create_test_app_state());
        let user_id = create_funded_user(&app, "alice", 30).await;
        let auction_id = create_running_auction(&app).await;

        let (status, body) = send_json(
            &app,
            "POST",
            &format!("/api/auctions/{auction_id}/bids"),
            Some(json!({ "userId": user_id, "amountCents": 40 })),
        )
        .await;

        assert_eq!(status, HttpStatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_AVAILABLE_BALANCE");
    }

    #[tokio::test]
    async fn test_bid_flow_and_leaderboard() {
        let app = build_router(create_test_app_state());
        let alice = create_funded_user(&app, "alice", 10_000).await;
        let bob = create_funded_user(&app, "bob", 10_000).await;
        let auction_id = create_running_auction(&app).await;

        let (status, receipt) = send_json(
            &app,
            "POST",
            &format!("/api/auctions/{auction_id}/bids"),
            Some(json!({ "userId": alice, "amountCents": 100 })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(receipt["ok"], true);
        assert_eq!(receipt["bidCents"], 100);
        assert_eq!(receipt["entryId"], "default");

        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/api/auctions/{auction_id}/bids"),
            Some(json!({ "userId": bob, "amountCents": 150 })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, board) = send_json(
            &app,
            "GET",
            &format!("/api/auctions/{auction_id}/leaderboard?limit=10"),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        let board = board.as_array().expect("Leaderboard must be an array");
        assert_eq!(board.len(), 2);
        assert_eq!(board[0]["username"], "bob");
        assert_eq!(board[1]["username"], "alice");

        let (status, report) = send_json(
            &app,
            "GET",
            &format!("/api/auctions/{auction_id}/invariants"),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(report["ok"], true);
        assert_eq!(report["sumActiveBidsCents"], 250);
        assert_eq!(report["sumUserReservedCents"], 250);
    }

    #[tokio::test]
    async fn test_non_increasing_bid_is_400() {
        let app = build_router(create_test_app_state());
        let alice = create_funded_user(&app, "alice", 10_000).await;
        let auction_id = create_running_auction(&app).await;

        let uri = format!("/api/auctions/{auction_id}/bids");
        let (status, _) = send_json(
            &app,
            "POST",
            &uri,
            Some(json!({ "userId": alice, "amountCents": 100 })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        let (status, body) = send_json(
            &app,
            "POST",
            &uri,
            Some(json!({ "userId": alice, "amountCents": 100 })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BID_MUST_INCREASE");
    }

    #[tokio::test]
    async fn test_scheduler_tick_settles_due_round() {
        let state = create_test_app_state();
        let app = build_router(state.clone());
        let alice = create_funded_user(&app, "alice", 10_000).await;
        let auction_id = create_running_auction(&app).await;

        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/api/auctions/{auction_id}/bids"),
            Some(json!({ "userId": alice, "amountCents": 100 })),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);

        // Drive the scheduler with a clock far past the round end.
        scheduler::tick(&state, current_time_ms() + 3_600_000).await;

        let (status, detail) =
            send_json(&app, "GET", &format!("/api/auctions/{auction_id}"), None).await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(detail["auction"]["currentRound"], 2);
        assert_eq!(detail["auction"]["remainingItems"], 1);
        assert_eq!(detail["winners"][0]["giftNumber"], 1);

        let (_, winners) = send_json(
            &app,
            "GET",
            &format!("/api/auctions/{auction_id}/winners?limit=10"),
            None,
        )
        .await;
        assert_eq!(winners.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_raises_preserve_invariants() {
        let state = create_test_app_state();
        let app = build_router(state.clone());

        let auction_id = create_running_auction(&app).await;
        let mut user_ids = Vec::new();
        for i in 0..20 {
            user_ids.push(create_funded_user(&app, &format!("user{i}"), 100_000).await);
        }

        // Every user raises their own entry concurrently.
        let mut handles = Vec::new();
        for user_id in user_ids {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                for step in 1..=10_i64 {
                    let request = PlaceBidRequest {
                        user_id,
                        amount_cents: step * 100 + user_id,
                        entry_id: None,
                    };
                    let mut persistence = state.persistence.lock().await;
                    gavel_api::place_bid(
                        &mut persistence,
                        auction_id,
                        &request,
                        current_time_ms(),
                    )
                    .expect("Raise must succeed");
                }
            }));
        }
        for handle in handles {
            handle.await.expect("Task must not panic");
        }

        let (status, report) = send_json(
            &app,
            "GET",
            &format!("/api/auctions/{auction_id}/invariants"),
            None,
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK);
        assert_eq!(report["ok"], true, "invariant report: {report}");
        assert_eq!(report["mismatch"].as_array().map(Vec::len), Some(0));
        assert_eq!(report["negatives"].as_array().map(Vec::len), Some(0));
    }
}
