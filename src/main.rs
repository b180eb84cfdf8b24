use std::{path::PathBuf, sync::Arc};

use axum::{
    http::{Response, StatusCode},
    routing::{delete, get, post},
    Router,
};
use error::{ErrorKind, GameError};
use game::{handlers, Game, SystemClock};
use rand::{rngs::StdRng, SeedableRng};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

mod cards;
mod error;
mod game;
mod page;

#[derive(serde::Serialize)]
struct Resp {
    message: String,
    success: bool,
}

impl Resp {
    fn axum<S: ToString>(message: S, status: StatusCode) -> Response<String> {
        match serde_json::ser::to_string(&Self {
            message: message.to_string(),
            success: status == StatusCode::OK,
        }) {
            Ok(body) => Self::with_status(body, status),
            Err(e) => Self::encode_failure(e),
        }
    }

    fn with_status(body: String, status: StatusCode) -> Response<String> {
        let mut resp = Response::new(body);
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/json"),
        );
        resp
    }

    fn encode_failure(e: serde_json::Error) -> Response<String> {
        let mut resp = Response::new(format!("Failed to JSON encode response: {e}"));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    }

    /// Encode a successful payload.
    fn json<T: serde::Serialize>(value: &T) -> Response<String> {
        match serde_json::ser::to_string(value) {
            Ok(body) => Self::with_status(body, StatusCode::OK),
            Err(e) => Self::encode_failure(e),
        }
    }

    fn error(e: &GameError) -> Response<String> {
        match e.kind() {
            ErrorKind::Validation => Self::axum(e, StatusCode::BAD_REQUEST),
            ErrorKind::NotFound => Self::axum(e, StatusCode::NOT_FOUND),
            ErrorKind::Permission => Self::axum(e, StatusCode::FORBIDDEN),
            ErrorKind::Conflict => Self::axum(e, StatusCode::CONFLICT),
            ErrorKind::InsufficientResource => Self::e422(e),
            ErrorKind::Configuration => Self::e500(e),
        }
    }

    fn e500<S: ToString>(message: S) -> Response<String> {
        Self::axum(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn e422<S: ToString>(message: S) -> Response<String> {
        Self::axum(message, StatusCode::UNPROCESSABLE_ENTITY)
    }
}

fn build_router(game: Arc<Game>) -> Router {
    Router::new()
        .route("/api/signup", post(handlers::signup))
        .route("/api/profile", get(handlers::profile))
        .route("/api/cards", get(handlers::list_cards))
        .route("/api/cards/:card_id", get(handlers::get_card))
        .route("/api/collections", get(handlers::list_collections))
        .route("/api/collections/:collection_id", get(handlers::get_collection))
        .route("/api/my/cards", get(handlers::my_cards))
        .route("/api/my/history", get(handlers::my_history))
        .route("/api/add_card", post(handlers::add_card))
        .route(
            "/api/add_card_to_collection/:entry_id",
            post(handlers::add_card_to_collection),
        )
        .route("/api/craft_card/:card_id", post(handlers::craft_card))
        .route("/api/turn_to_dust/:entry_id", delete(handlers::turn_to_dust))
        .route("/api/cards_bulk", post(handlers::cards_bulk))
        .route(
            "/api/collection_progress/:collection_id",
            get(handlers::collection_progress),
        )
        .route("/api/user_statistics", get(handlers::user_statistics))
        .route("/api/is_addable/:entry_id", get(handlers::is_addable))
        .route(
            "/api/is_daily_card_available",
            get(handlers::is_daily_card_available),
        )
        .route("/api/is_craftable/:card_id", get(handlers::is_craftable))
        .with_state(game)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    const USAGE: &str = "Usage: collector <data path> <port> [seed]";

    let data = std::env::args().nth(1).expect(USAGE);
    let port = std::env::args()
        .nth(2)
        .map(|s| s.parse::<u16>().unwrap_or_else(|_| panic!("Invalid port number: {s}")))
        .expect(USAGE);
    let seed = std::env::args()
        .nth(3)
        .map(|s| s.parse::<u64>().unwrap_or_else(|_| panic!("Invalid seed: {s}")));

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let catalogue = match cards::catalogue::load_catalogue(&PathBuf::from(data)).await {
        Ok(db) => db,
        Err(e) => panic!("Failed to load card catalogue: {e}"),
    };
    tracing::debug!("Loaded {catalogue:?}.");

    let rng = match seed {
        Some(seed) => {
            tracing::debug!("Seeding card draws with {seed}.");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let game = Game::new(Arc::new(catalogue), Arc::new(SystemClock), rng);

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap_or_else(|e| panic!("Failed to open port {port}: {e}"));

    if let Err(e) = axum::serve(listener, build_router(Arc::new(game))).await {
        eprintln!("Closed due to error: {e}");
    }
}
