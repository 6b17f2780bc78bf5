//! oauth2-login - Google OAuth2 authorization-code login for Rust web applications
//!
//! This crate implements the server side of the authorization-code grant:
//! anti-forgery state handling, code-for-token exchange, conditional profile
//! lookup, and reverse-proxy-aware computation of the callback URL that is
//! advertised to the provider. Authentication status round-trips through a
//! signed client-side session cookie; the service itself holds no per-user
//! state.
//!
//! Framework integration (handlers, middleware, extractors) lives in the
//! companion `oauth2-login-axum` crate.

mod oauth2;
mod session;
mod utils;

pub use oauth2::{
    AuthConfig, AuthError, AuthorizationRequest, AuthorizedClient, IssuedToken, OAuthService,
    RedirectResolver, RequestContext, Scope, UserProfile, default_scopes,
};

pub use oauth2::config::{
    API_USER_SENTINEL, CALLBACK_PATH, ERROR_INVALID_STATE, ERROR_MISSING_CODE, ERROR_MISSING_STATE,
    ERROR_SESSION_SAVE_FAILED, ERROR_TOKEN_EXCHANGE_FAILED, ERROR_USER_INFO_FAILED,
    GOOGLE_AUTH_PATH, LOGIN_PATH, LOGOUT_PATH, SESSION_KEY_OAUTH_STATE, SESSION_KEY_OAUTH_TOKEN,
    SESSION_KEY_USER_EMAIL, SESSION_KEY_USER_NAME, SESSION_KEY_USER_PICTURE,
};

pub use session::{SESSION_COOKIE_NAME, SessionError, SessionRecord, SessionStore};

pub use utils::UtilError;
