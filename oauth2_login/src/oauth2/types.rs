use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token issued by the provider in exchange for an authorization code.
///
/// Serialized as JSON into the session under its reserved key; never
/// persisted server-side, so its lifetime is the session's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedToken {
    /// Expired or about to expire. Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at - Duration::seconds(30) < Utc::now())
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) expires_in: Option<i64>,
    pub(crate) refresh_token: Option<String>,
}

impl From<TokenResponse> for IssuedToken {
    fn from(response: TokenResponse) -> Self {
        // An out-of-range lifetime from the provider means no usable
        // expiry, not a panic in the date math.
        let expires_at = response.expires_in.and_then(|seconds| {
            Duration::try_seconds(seconds).and_then(|ttl| Utc::now().checked_add_signed(ttl))
        });
        IssuedToken {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }
}

/// Profile retrieved from the provider's userinfo endpoint. All fields are
/// required; a response missing any of them is a fetch failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub picture: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_response_deserialization() {
        let body = json!({
            "access_token": "ya29.access",
            "token_type": "Bearer",
            "expires_in": 3599,
            "refresh_token": "1//refresh",
            "scope": "email profile"
        });
        let response: TokenResponse = serde_json::from_value(body).unwrap();
        let token = IssuedToken::from(response);
        assert_eq!(token.access_token, "ya29.access");
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let body = json!({
            "access_token": "ya29.access",
            "token_type": "Bearer"
        });
        let response: TokenResponse = serde_json::from_value(body).unwrap();
        let token = IssuedToken::from(response);
        assert!(token.refresh_token.is_none());
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_out_of_range_expires_in_yields_no_expiry() {
        for lifetime in [i64::MAX, i64::MIN, i64::MAX / 1000 + 1] {
            let body = json!({
                "access_token": "ya29.access",
                "token_type": "Bearer",
                "expires_in": lifetime
            });
            let response: TokenResponse = serde_json::from_value(body).unwrap();
            let token = IssuedToken::from(response);
            assert!(token.expires_at.is_none());
            assert!(!token.is_expired());
        }
    }

    #[test]
    fn test_token_response_missing_access_token_is_rejected() {
        let body = json!({ "token_type": "Bearer", "expires_in": 3599 });
        assert!(serde_json::from_value::<TokenResponse>(body).is_err());
    }

    #[test]
    fn test_issued_token_session_roundtrip() {
        let token = IssuedToken {
            access_token: "at".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        let serialized = serde_json::to_string(&token).unwrap();
        let restored: IssuedToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored, token);
    }

    #[test]
    fn test_expired_token_is_detected() {
        let token = IssuedToken {
            access_token: "at".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now() - Duration::seconds(1)),
        };
        assert!(token.is_expired());
    }

    #[test]
    fn test_user_profile_requires_all_fields() {
        let complete = json!({
            "email": "e@example.com",
            "name": "tester",
            "picture": "pic"
        });
        let profile: UserProfile = serde_json::from_value(complete).unwrap();
        assert_eq!(profile.email, "e@example.com");

        let incomplete = json!({ "email": "e@example.com" });
        assert!(serde_json::from_value::<UserProfile>(incomplete).is_err());
    }

    #[test]
    fn test_user_profile_ignores_extra_fields() {
        let body = json!({
            "id": "123456789",
            "email": "e@example.com",
            "verified_email": true,
            "name": "tester",
            "picture": "pic",
            "locale": "en"
        });
        let profile: UserProfile = serde_json::from_value(body).unwrap();
        assert_eq!(profile.name, "tester");
    }
}
