use std::path::PathBuf;

use crate::oauth2::scopes::Scope;

/// Route served by the login page handler.
pub const LOGIN_PATH: &str = "/login";
/// Route that starts the authorization flow.
pub const GOOGLE_AUTH_PATH: &str = "/auth/google";
/// Route the provider redirects back to after consent.
pub const CALLBACK_PATH: &str = "/auth/google/callback";
/// Route that tears the session down.
pub const LOGOUT_PATH: &str = "/logout";

// Reserved session keys.
pub const SESSION_KEY_OAUTH_STATE: &str = "oauth_state";
pub const SESSION_KEY_USER_EMAIL: &str = "user_email";
pub const SESSION_KEY_USER_NAME: &str = "user_name";
pub const SESSION_KEY_USER_PICTURE: &str = "user_picture";
pub const SESSION_KEY_OAUTH_TOKEN: &str = "oauth_token";

/// Identity value stored when no profile-bearing scope was requested. The
/// session counts as authenticated for API purposes without a real profile.
pub const API_USER_SENTINEL: &str = "authenticated_api_user";

// Machine-readable `error` query values carried on flow-failure redirects.
pub const ERROR_MISSING_STATE: &str = "missing_state";
pub const ERROR_INVALID_STATE: &str = "invalid_state";
pub const ERROR_MISSING_CODE: &str = "missing_code";
pub const ERROR_TOKEN_EXCHANGE_FAILED: &str = "token_exchange_failed";
pub const ERROR_USER_INFO_FAILED: &str = "user_info_failed";
pub const ERROR_SESSION_SAVE_FAILED: &str = "session_save_failed";

pub(crate) const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub(crate) const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub(crate) const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Construction-time configuration for [`OAuthService`](super::OAuthService).
///
/// `client_id` and `client_secret` must be non-empty and `public_base_url`
/// must parse as a URL; both are validated by `OAuthService::new`. All other
/// fields have working defaults.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) public_base_url: String,
    pub(crate) post_login_path: String,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) login_template: Option<PathBuf>,
    pub(crate) logout_redirect: Option<String>,
    pub(crate) auth_url: String,
    pub(crate) token_url: String,
    pub(crate) userinfo_url: String,
}

impl AuthConfig {
    /// `public_base_url` is the externally reachable origin of the
    /// application, e.g. `"https://app.example.com"`. It is only the
    /// fallback; per-request forwarding headers take precedence when
    /// computing the callback URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            public_base_url: public_base_url.into(),
            post_login_path: "/".to_string(),
            scopes: Vec::new(),
            login_template: None,
            logout_redirect: None,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    /// Where the browser is sent after a fully successful callback.
    pub fn post_login_path(mut self, path: impl Into<String>) -> Self {
        self.post_login_path = path.into();
        self
    }

    /// Requested scopes. An empty list keeps the profile+email default.
    pub fn scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// HTML file rendered by the login page handler instead of the
    /// built-in template. The file may reference `{{ error }}`.
    pub fn login_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.login_template = Some(path.into());
        self
    }

    /// Redirect destination used after logout. Empty or whitespace-only
    /// values are ignored and the default login path is retained.
    pub fn logout_redirect(mut self, destination: impl Into<String>) -> Self {
        self.logout_redirect = Some(destination.into());
        self
    }

    pub fn auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Profile endpoint override, primarily for pointing tests at a mock
    /// server.
    pub fn userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }
}
