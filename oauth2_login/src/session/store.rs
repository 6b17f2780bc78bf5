use std::collections::HashMap;

use hmac::{Hmac, Mac};
use http::HeaderMap;
use http::header::COOKIE;
use sha2::Sha256;

use crate::session::errors::SessionError;
use crate::session::types::SessionRecord;
use crate::utils::{base64url_decode, base64url_encode, header_set_cookie};

/// Default session cookie. The `__Host-` prefix makes it host-only.
pub const SESSION_COOKIE_NAME: &str = "__Host-LoginSession";

const DEFAULT_MAX_AGE: i64 = 7 * 24 * 3600;

type HmacSha256 = Hmac<Sha256>;

/// Cookie-backed session store: values are serialized to JSON, signed with
/// HMAC-SHA256, and round-trip through the client. No server-side state is
/// kept, so the store is safe for concurrent use without synchronization.
///
/// Cookie value layout: `base64url(json) "." base64url(tag)`.
pub struct SessionStore {
    cookie_name: String,
    secret: Vec<u8>,
    max_age: i64,
}

impl SessionStore {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            secret: secret.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Load the session for a request. An absent, malformed, or tampered
    /// cookie yields a fresh empty record; only forgery-proof content is
    /// ever trusted.
    pub fn get(&self, headers: &HeaderMap) -> SessionRecord {
        let values = match self.cookie_value(headers) {
            Some(value) => match self.decode(value) {
                Ok(values) => values,
                Err(e) => {
                    tracing::debug!("discarding session cookie: {}", e);
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        SessionRecord::new(values, self.max_age)
    }

    /// Serialize, sign, and emit the record as a `Set-Cookie` header on the
    /// response. An invalidated record produces an expired empty cookie.
    pub fn save(
        &self,
        record: &SessionRecord,
        headers: &mut HeaderMap,
    ) -> Result<(), SessionError> {
        let value = if record.max_age() < 0 {
            String::new()
        } else {
            self.encode(record.values())?
        };
        header_set_cookie(headers, &self.cookie_name, &value, record.max_age())?;
        Ok(())
    }

    fn encode(&self, values: &HashMap<String, String>) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(values).map_err(|e| SessionError::Serde(e.to_string()))?;
        let payload = base64url_encode(&payload);
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let tag = base64url_encode(&mac.finalize().into_bytes());
        Ok(format!("{payload}.{tag}"))
    }

    fn decode(&self, value: &str) -> Result<HashMap<String, String>, SessionError> {
        let (payload, tag) = value
            .split_once('.')
            .ok_or_else(|| SessionError::Cookie("malformed session cookie".to_string()))?;
        let tag = base64url_decode(tag).map_err(|_| SessionError::SignatureMismatch)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| SessionError::SignatureMismatch)?;

        let payload = base64url_decode(payload)?;
        serde_json::from_slice(&payload).map_err(|e| SessionError::Serde(e.to_string()))
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| SessionError::Crypto("invalid session secret".to_string()))
    }

    fn cookie_value<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
        cookie_header.split(';').map(str::trim).find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(name), Some(value)) if name == self.cookie_name => Some(value),
                _ => None,
            }
        })
    }
}
