use std::path::Path;

use url::Url;

use crate::oauth2::config::{AuthConfig, CALLBACK_PATH, LOGIN_PATH};
use crate::oauth2::errors::AuthError;
use crate::oauth2::redirect::{RedirectResolver, RequestContext};
use crate::oauth2::scopes::{Scope, default_scopes};
use crate::oauth2::types::{IssuedToken, TokenResponse, UserProfile};
use crate::utils::gen_random_string;

/// Owns the immutable OAuth client configuration and produces per-request
/// authorization configuration. Read-only after construction and safe to
/// share across concurrent requests.
pub struct OAuthService {
    client_id: String,
    client_secret: String,
    scopes: Vec<Scope>,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
    resolver: RedirectResolver,
    post_login_path: String,
    logout_redirect: String,
    login_template: Option<std::path::PathBuf>,
    http: reqwest::Client,
}

impl OAuthService {
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            return Err(AuthError::Config(
                "missing OAuth client credentials".to_string(),
            ));
        }

        let base_url = Url::parse(&config.public_base_url)
            .map_err(|_| AuthError::Config("invalid public base URL".to_string()))?;
        let resolver = RedirectResolver::new(base_url, CALLBACK_PATH)?;

        let auth_url = parse_endpoint(&config.auth_url, "authorization")?;
        let token_url = parse_endpoint(&config.token_url, "token")?;
        let userinfo_url = parse_endpoint(&config.userinfo_url, "userinfo")?;

        let scopes = if config.scopes.is_empty() {
            default_scopes()
        } else {
            config.scopes
        };

        // Empty override values are ignored and the default is retained.
        let logout_redirect = config
            .logout_redirect
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(LOGIN_PATH)
            .to_string();

        Ok(Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            scopes,
            auth_url,
            token_url,
            userinfo_url,
            resolver,
            post_login_path: config.post_login_path,
            logout_redirect,
            login_template: config.login_template,
            http: reqwest::Client::new(),
        })
    }

    /// Cryptographically secure anti-forgery state token, 32 bytes of
    /// entropy, base64url-encoded.
    pub fn generate_state(&self) -> Result<String, AuthError> {
        gen_random_string(32).map_err(|e| AuthError::Entropy(e.to_string()))
    }

    /// Per-request authorization configuration: a value copy of the static
    /// credentials with the redirect URL resolved for this request. Shared
    /// configuration is never mutated.
    pub fn authorization_config(&self, ctx: Option<&RequestContext>) -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: self.client_id.clone(),
            auth_url: self.auth_url.clone(),
            redirect_uri: self.resolver.callback_url(ctx).to_string(),
            scopes: self.scopes.iter().map(|s| s.as_str().to_string()).collect(),
        }
    }

    /// Exchange an authorization code for a token at the provider's token
    /// endpoint. `redirect_uri` must be the per-request value the
    /// authorization URL was built with.
    pub async fn exchange_code(
        &self,
        redirect_uri: &str,
        code: &str,
    ) -> Result<IssuedToken, AuthError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::TokenExchange(status.to_string()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
        Ok(token.into())
    }

    /// Retrieve the profile associated with a token from the userinfo
    /// endpoint. Only meaningful when a profile-bearing scope was granted.
    pub async fn fetch_profile(&self, token: &IssuedToken) -> Result<UserProfile, AuthError> {
        let response = self
            .http
            .get(self.userinfo_url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AuthError::FetchUserInfo(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::FetchUserInfo(format!(
                "userinfo endpoint returned status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::FetchUserInfo(e.to_string()))?;
        let profile: UserProfile = serde_json::from_str(&body)
            .map_err(|e| AuthError::Serde(format!("failed to deserialize userinfo: {e}")))?;
        Ok(profile)
    }

    /// Obtain a fresh token via the refresh-token grant. Providers may omit
    /// the refresh token from the response; the previous one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        refresh_grant(
            &self.http,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            refresh_token,
        )
        .await
    }

    /// A bearer-injecting HTTP client for downstream API calls with the
    /// issued token. Exposed for collaborators; unused internally.
    pub fn api_client(&self, token: IssuedToken) -> AuthorizedClient {
        AuthorizedClient {
            http: self.http.clone(),
            token,
            token_url: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    /// Whether any requested scope allows a profile lookup.
    pub fn has_profile_scope(&self) -> bool {
        self.scopes.iter().any(Scope::is_profile_bearing)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn post_login_path(&self) -> &str {
        &self.post_login_path
    }

    pub fn logout_redirect(&self) -> &str {
        &self.logout_redirect
    }

    pub fn login_template(&self) -> Option<&Path> {
        self.login_template.as_deref()
    }
}

fn parse_endpoint(url: &str, what: &str) -> Result<Url, AuthError> {
    Url::parse(url).map_err(|_| AuthError::Config(format!("invalid {what} endpoint URL: {url}")))
}

async fn refresh_grant(
    http: &reqwest::Client,
    token_url: &Url,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<IssuedToken, AuthError> {
    let response = http
        .post(token_url.clone())
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AuthError::TokenExchange(status.to_string()));
    }

    let refreshed: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
    let mut token = IssuedToken::from(refreshed);
    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }
    Ok(token)
}

/// Immutable per-request clone of the authorization configuration.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    client_id: String,
    auth_url: Url,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl AuthorizationRequest {
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Provider authorization URL for the given state token.
    ///
    /// `access_type=offline` and `prompt=consent` are forced so a refresh
    /// token is issued on every consent, not only the first grant.
    pub fn auth_code_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url.into()
    }
}

/// HTTP client that injects the bearer token on every request and refreshes
/// it through the token endpoint when it is about to expire.
pub struct AuthorizedClient {
    http: reqwest::Client,
    token: IssuedToken,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

impl AuthorizedClient {
    pub async fn get(&mut self, url: &str) -> Result<reqwest::Response, AuthError> {
        self.ensure_fresh().await?;
        self.http
            .get(url)
            .bearer_auth(&self.token.access_token)
            .send()
            .await
            .map_err(|e| AuthError::FetchUserInfo(e.to_string()))
    }

    /// The current token, possibly refreshed since construction. Callers
    /// should re-serialize it into the session after API use.
    pub fn token(&self) -> &IssuedToken {
        &self.token
    }

    async fn ensure_fresh(&mut self) -> Result<(), AuthError> {
        if !self.token.is_expired() {
            return Ok(());
        }
        let Some(refresh_token) = self.token.refresh_token.clone() else {
            return Ok(());
        };
        tracing::debug!("access token expired; refreshing");
        self.token = refresh_grant(
            &self.http,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            &refresh_token,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue};

    fn config() -> AuthConfig {
        AuthConfig::new("client-id", "client-secret", "http://localhost:8080")
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let result = OAuthService::new(AuthConfig::new("", "secret", "http://localhost:8080"));
        assert!(matches!(result, Err(AuthError::Config(_))));

        let result = OAuthService::new(AuthConfig::new("id", "  ", "http://localhost:8080"));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = OAuthService::new(AuthConfig::new("id", "secret", "not a url"));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_new_rejects_invalid_endpoint_override() {
        let result = OAuthService::new(config().token_url("://broken"));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_empty_scope_list_defaults_to_profile_email() {
        let service = OAuthService::new(config()).unwrap();
        assert_eq!(service.scopes(), &[Scope::Profile, Scope::Email]);
        assert!(service.has_profile_scope());
    }

    #[test]
    fn test_api_only_scopes_have_no_profile() {
        let service =
            OAuthService::new(config().scopes(vec![Scope::YoutubeReadonly])).unwrap();
        assert!(!service.has_profile_scope());
    }

    #[test]
    fn test_generate_state_values_never_repeat() {
        let service = OAuthService::new(config()).unwrap();
        let first = service.generate_state().unwrap();
        let second = service.generate_state().unwrap();
        assert_ne!(first, second);
        assert!(first.len() >= 43);
    }

    #[test]
    fn test_logout_redirect_default_and_override() {
        let service = OAuthService::new(config()).unwrap();
        assert_eq!(service.logout_redirect(), LOGIN_PATH);

        let service = OAuthService::new(config().logout_redirect("/bye")).unwrap();
        assert_eq!(service.logout_redirect(), "/bye");

        // Whitespace-only override keeps the default.
        let service = OAuthService::new(config().logout_redirect("   ")).unwrap();
        assert_eq!(service.logout_redirect(), LOGIN_PATH);
    }

    #[test]
    fn test_authorization_config_uses_static_base_without_request() {
        let service = OAuthService::new(config()).unwrap();
        let request = service.authorization_config(None);
        assert_eq!(
            request.redirect_uri(),
            "http://localhost:8080/auth/google/callback"
        );
    }

    #[test]
    fn test_authorization_config_overrides_redirect_per_request() {
        let service = OAuthService::new(config()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("example.com"));
        let ctx = RequestContext::new(&headers);

        let request = service.authorization_config(Some(&ctx));
        assert_eq!(
            request.redirect_uri(),
            "https://example.com/auth/google/callback"
        );

        // The shared configuration is untouched.
        let request = service.authorization_config(None);
        assert_eq!(
            request.redirect_uri(),
            "http://localhost:8080/auth/google/callback"
        );
    }

    #[test]
    fn test_auth_code_url_forces_offline_consent() {
        let service = OAuthService::new(config()).unwrap();
        let url = service.authorization_config(None).auth_code_url("st4te");
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("client-id"));
        assert_eq!(get("state"), Some("st4te"));
        assert_eq!(get("scope"), Some("profile email"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("prompt"), Some("consent"));
        assert_eq!(
            get("redirect_uri"),
            Some("http://localhost:8080/auth/google/callback")
        );
    }
}
