//! oauth2-login-axum - axum handlers, middleware, and extractors for the
//! `oauth2-login` authorization flow.
//!
//! Mount [`router`] (or [`router_no_trace`]) into an application and wrap
//! protected routes with [`require_login`] or the [`AuthUser`] extractor:
//!
//! ```no_run
//! use axum::{Router, routing::get};
//! use oauth2_login::{AuthConfig, OAuthService, SessionStore};
//! use oauth2_login_axum::{AuthState, AuthUser, router};
//!
//! async fn protected(user: AuthUser) -> String {
//!     format!("Hello, {}!", user.email)
//! }
//!
//! # fn main() -> Result<(), oauth2_login::AuthError> {
//! let config = AuthConfig::new("client-id", "client-secret", "https://app.example.com");
//! let state = AuthState::new(OAuthService::new(config)?, SessionStore::new(b"secret".to_vec()))?;
//! let app: Router = Router::new()
//!     .route("/protected", get(protected))
//!     .with_state(state.clone())
//!     .merge(router(state));
//! # Ok(())
//! # }
//! ```

mod handlers;
mod middleware;
mod router;
mod session;
mod state;

pub use middleware::require_login;
pub use router::{router, router_no_trace};
pub use session::{AuthRedirect, AuthUser};
pub use state::AuthState;
