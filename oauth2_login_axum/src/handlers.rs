use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use oauth2_login::{
    API_USER_SENTINEL, ERROR_INVALID_STATE, ERROR_MISSING_CODE, ERROR_MISSING_STATE,
    ERROR_SESSION_SAVE_FAILED, ERROR_TOKEN_EXCHANGE_FAILED, ERROR_USER_INFO_FAILED, LOGIN_PATH,
    RequestContext, SESSION_KEY_OAUTH_STATE, SESSION_KEY_OAUTH_TOKEN, SESSION_KEY_USER_EMAIL,
    SESSION_KEY_USER_NAME, SESSION_KEY_USER_PICTURE,
};

use super::state::AuthState;

/// 302 Found. The flow deliberately uses 302 for every redirect, matching
/// what browsers and the provider expect from the authorization dance.
pub(crate) fn found(location: &str) -> Response {
    found_with(HeaderMap::new(), location)
}

fn found_with(mut headers: HeaderMap, location: &str) -> Response {
    match location.parse() {
        Ok(value) => {
            headers.insert(LOCATION, value);
            (StatusCode::FOUND, headers).into_response()
        }
        Err(_) => {
            tracing::error!("invalid redirect location: {}", location);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Redirect back to the login page with a machine-readable error code.
/// Codes never carry raw error text, so nothing internal leaks to the
/// browser.
fn login_error_redirect(code: &str) -> Response {
    found(&format!("{LOGIN_PATH}?error={code}"))
}

#[derive(Deserialize)]
pub(crate) struct LoginPageQuery {
    #[serde(default)]
    error: String,
}

/// `GET /login` - renders the login page, surfacing the `error` query value
/// when a previous flow attempt failed.
pub(crate) async fn login_page(
    State(state): State<AuthState>,
    Query(query): Query<LoginPageQuery>,
) -> Response {
    match state.login_page().render(&query.error) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("failed to render login page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// `GET /auth/google` - starts the flow: generate anti-forgery state, stash
/// it in the session, and send the browser to the provider's consent page.
pub(crate) async fn google_auth(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let state_token = match state.service().generate_state() {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("failed to generate state: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    let mut session = state.sessions().get(&headers);
    session.set(SESSION_KEY_OAUTH_STATE, &state_token);

    let mut response_headers = HeaderMap::new();
    if let Err(e) = state.sessions().save(&session, &mut response_headers) {
        tracing::error!("failed to save session: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }

    let ctx = RequestContext::new(&headers);
    let auth_request = state.service().authorization_config(Some(&ctx));
    let authorization_url = auth_request.auth_code_url(&state_token);

    found_with(response_headers, &authorization_url)
}

#[derive(Deserialize)]
pub(crate) struct CallbackQuery {
    state: Option<String>,
    code: Option<String>,
}

/// `GET /auth/google/callback` - completes the flow: validate state,
/// exchange the code, resolve identity per granted scopes, populate the
/// session.
///
/// Identity and token keys are only staged after every checkpoint has
/// passed, so any error redirect leaves the persisted session untouched.
pub(crate) async fn callback(
    State(state): State<AuthState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let mut session = state.sessions().get(&headers);

    let Some(stored_state) = session.get(SESSION_KEY_OAUTH_STATE).map(str::to_string) else {
        tracing::warn!("missing state in session");
        return login_error_redirect(ERROR_MISSING_STATE);
    };

    let received_state = query.state.unwrap_or_default();
    if !bool::from(stored_state.as_bytes().ct_eq(received_state.as_bytes())) {
        tracing::warn!("state mismatch on callback");
        return login_error_redirect(ERROR_INVALID_STATE);
    }

    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        tracing::warn!("missing authorization code");
        return login_error_redirect(ERROR_MISSING_CODE);
    };

    let ctx = RequestContext::new(&headers);
    let auth_request = state.service().authorization_config(Some(&ctx));

    let token = match state
        .service()
        .exchange_code(auth_request.redirect_uri(), &code)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("token exchange failed: {}", e);
            return login_error_redirect(ERROR_TOKEN_EXCHANGE_FAILED);
        }
    };

    // Without a refresh token the session would silently lack offline
    // access; restart the flow, which forces prompt=consent and a re-grant.
    if token.refresh_token.is_none() {
        tracing::warn!("token response lacks refresh token; re-requesting consent");
        return google_auth(State(state), headers).await;
    }

    if state.service().has_profile_scope() {
        match state.service().fetch_profile(&token).await {
            Ok(profile) => {
                session.set(SESSION_KEY_USER_EMAIL, profile.email);
                session.set(SESSION_KEY_USER_NAME, profile.name);
                session.set(SESSION_KEY_USER_PICTURE, profile.picture);
            }
            Err(e) => {
                tracing::warn!("failed to fetch user info: {}", e);
                return login_error_redirect(ERROR_USER_INFO_FAILED);
            }
        }
    } else {
        // No profile scope granted: the session still counts as
        // authenticated for API purposes.
        session.set(SESSION_KEY_USER_EMAIL, API_USER_SENTINEL);
    }

    // Always store the token itself; it is the primary artifact for
    // API-driven applications.
    match serde_json::to_string(&token) {
        Ok(serialized) => session.set(SESSION_KEY_OAUTH_TOKEN, serialized),
        Err(e) => tracing::error!("failed to serialize token: {}", e),
    }

    let mut response_headers = HeaderMap::new();
    if let Err(e) = state.sessions().save(&session, &mut response_headers) {
        tracing::error!("failed to save user session: {}", e);
        return login_error_redirect(ERROR_SESSION_SAVE_FAILED);
    }

    found_with(response_headers, state.service().post_login_path())
}

/// `GET /logout` - expire the session cookie immediately and redirect to
/// the configured logout destination.
pub(crate) async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let mut session = state.sessions().get(&headers);
    session.invalidate();

    let mut response_headers = HeaderMap::new();
    if let Err(e) = state.sessions().save(&session, &mut response_headers) {
        tracing::error!("failed to clear session: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }

    found_with(response_headers, state.service().logout_redirect())
}
