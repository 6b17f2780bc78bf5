use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use oauth2_login::LOGIN_PATH;

use super::handlers::found;
use super::state::AuthState;

/// Gate protected routes on session identity.
///
/// Passes the request through unmodified when the identity key is present
/// and non-empty; otherwise short-circuits with a redirect to the login
/// path (no query parameters) without invoking the downstream handler.
///
/// ```no_run
/// use axum::{Router, middleware, routing::get};
/// use oauth2_login_axum::{AuthState, require_login};
///
/// fn protected_routes(state: AuthState) -> Router {
///     Router::new()
///         .route("/dashboard", get(|| async { "private" }))
///         .route_layer(middleware::from_fn_with_state(state.clone(), require_login))
///         .with_state(state)
/// }
/// ```
pub async fn require_login(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let session = state.sessions().get(request.headers());
    if session.is_authenticated() {
        next.run(request).await
    } else {
        tracing::debug!("unauthenticated request to {}", request.uri().path());
        found(LOGIN_PATH)
    }
}
