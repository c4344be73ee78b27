use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use rently_api::chat;
use rently_api::middleware::{jwt_secret, require_auth, verify_token};
use rently_api::{AppState, AppStateInner};
use rently_core::inbox::InboxAggregator;
use rently_core::resolver::ConversationResolver;
use rently_gateway::{Hub, connection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rently=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("RENTLY_DB_PATH").unwrap_or_else(|_| "rently.db".into());
    let host = std::env::var("RENTLY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("RENTLY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = Arc::new(rently_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state: the hub is created once at startup and torn down with
    // the process; sessions come and go per connection.
    let hub = Hub::new();
    let resolver = ConversationResolver::new(
        db.clone(),
        db.clone(),
        db.clone(),
        Arc::new(hub.clone()),
    );
    let inbox = InboxAggregator::new(db.clone(), db.clone());

    let state: AppState = Arc::new(AppStateInner {
        resolver,
        inbox,
        hub,
    });

    // Routes
    let protected_routes = Router::new()
        .route("/api/chat/send", post(chat::send_message))
        .route("/api/chat/messages/{rental_id}", get(chat::list_rental_conversation))
        .route(
            "/api/chat/messages/direct/{counterpart_id}",
            get(chat::list_direct_conversation),
        )
        .route("/api/chat/messages/recent/{user_id}", get(chat::recent_inbox))
        .route(
            "/api/notifications",
            get(chat::get_notifications).delete(chat::clear_notifications),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(state.clone());

    let ws_route = Router::new().route("/ws", get(ws_upgrade)).with_state(state);

    let app = Router::new()
        .merge(protected_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Rently messaging server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Deserialize)]
struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Browser WebSocket clients cannot set headers, so the token usually
/// arrives as `?token=`; non-browser clients may send a Bearer header
/// instead. The query parameter wins when both are present.
fn ws_token(query: WsQuery, headers: &HeaderMap) -> Option<String> {
    query.token.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    })
}

/// The token is verified here, at the upgrade, so the gateway only ever
/// handles identities the identity provider has signed off on.
async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = ws_token(query, &headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let Some(claims) = verify_token(&token, &jwt_secret()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    ws.on_upgrade(move |socket| connection::serve(socket, state.hub.clone(), claims.sub))
        .into_response()
}
