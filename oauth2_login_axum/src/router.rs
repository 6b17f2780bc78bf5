//! Route registration for the authentication endpoints.

use axum::{Router, routing::get};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use oauth2_login::{CALLBACK_PATH, GOOGLE_AUTH_PATH, LOGIN_PATH, LOGOUT_PATH};

use super::handlers;
use super::state::AuthState;

/// Router serving the login page, flow start, callback, and logout routes,
/// with HTTP request tracing attached.
pub fn router(state: AuthState) -> Router {
    router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`router`] without the tracing middleware, for applications that
/// attach their own.
pub fn router_no_trace(state: AuthState) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(handlers::login_page))
        .route(GOOGLE_AUTH_PATH, get(handlers::google_auth))
        .route(CALLBACK_PATH, get(handlers::callback))
        .route(LOGOUT_PATH, get(handlers::logout))
        .with_state(state)
}
