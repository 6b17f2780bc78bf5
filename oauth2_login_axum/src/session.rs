use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use http::request::Parts;

use oauth2_login::{
    IssuedToken, LOGIN_PATH, SESSION_KEY_OAUTH_TOKEN, SESSION_KEY_USER_EMAIL,
    SESSION_KEY_USER_NAME, SESSION_KEY_USER_PICTURE, SessionRecord,
};

use super::handlers::found;
use super::state::AuthState;

/// Rejection for [`AuthUser`]: a 302 to the login path.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        found(LOGIN_PATH)
    }
}

/// The authenticated user, available as an axum extractor.
///
/// The required form rejects anonymous requests with a redirect to the
/// login path; `Option<AuthUser>` never rejects and yields `None` instead.
///
/// `email` holds the API-user sentinel when no profile-bearing scope was
/// requested; `name` and `picture` are empty in that case.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
    pub name: String,
    pub picture: String,
    /// The session's OAuth token, when present and decodable.
    pub token: Option<IssuedToken>,
}

impl AuthUser {
    fn from_record(record: &SessionRecord) -> Option<Self> {
        let email = record.get(SESSION_KEY_USER_EMAIL)?;
        if email.is_empty() {
            return None;
        }
        let token = record
            .get(SESSION_KEY_OAUTH_TOKEN)
            .and_then(|raw| serde_json::from_str(raw).ok());
        Some(Self {
            email: email.to_string(),
            name: record.get(SESSION_KEY_USER_NAME).unwrap_or("").to_string(),
            picture: record
                .get(SESSION_KEY_USER_PICTURE)
                .unwrap_or("")
                .to_string(),
            token,
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let record = auth_state.sessions().get(&parts.headers);
        AuthUser::from_record(&record).ok_or(AuthRedirect)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let record = auth_state.sessions().get(&parts.headers);
        Ok(AuthUser::from_record(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use http::header::{COOKIE, SET_COOKIE};
    use oauth2_login::SessionStore;

    fn store() -> SessionStore {
        SessionStore::new(b"extractor-test-secret".to_vec())
    }

    fn record_with(values: &[(&str, &str)]) -> SessionRecord {
        let store = store();
        let mut record = store.get(&HeaderMap::new());
        for (key, value) in values {
            record.set(key, *value);
        }
        // Round-trip through the cookie so the record matches what a real
        // request would carry.
        let mut response = HeaderMap::new();
        store.save(&record, &mut response).unwrap();
        let cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, pair.parse().unwrap());
        store.get(&request)
    }

    #[test]
    fn test_from_record_requires_identity() {
        assert!(AuthUser::from_record(&record_with(&[])).is_none());
        assert!(AuthUser::from_record(&record_with(&[(SESSION_KEY_USER_EMAIL, "")])).is_none());
    }

    #[test]
    fn test_from_record_with_profile_and_token() {
        let token = r#"{"access_token":"at","token_type":"Bearer","refresh_token":"rt"}"#;
        let record = record_with(&[
            (SESSION_KEY_USER_EMAIL, "e@example.com"),
            (SESSION_KEY_USER_NAME, "tester"),
            (SESSION_KEY_USER_PICTURE, "pic"),
            (SESSION_KEY_OAUTH_TOKEN, token),
        ]);
        let user = AuthUser::from_record(&record).unwrap();
        assert_eq!(user.email, "e@example.com");
        assert_eq!(user.name, "tester");
        assert_eq!(user.picture, "pic");
        let token = user.token.unwrap();
        assert_eq!(token.access_token, "at");
        assert_eq!(token.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_from_record_tolerates_undecodable_token() {
        let record = record_with(&[
            (SESSION_KEY_USER_EMAIL, "e@example.com"),
            (SESSION_KEY_OAUTH_TOKEN, "not json"),
        ]);
        let user = AuthUser::from_record(&record).unwrap();
        assert!(user.token.is_none());
    }
}
