use std::collections::HashMap;

use crate::oauth2::config::SESSION_KEY_USER_EMAIL;

/// Key/value state round-tripped through the signed session cookie.
///
/// A record is request-scoped: handlers load it, stage their writes in
/// memory, and nothing reaches the client until the store saves it. Error
/// paths that bail out before the save therefore leave the persisted
/// session untouched.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    values: HashMap<String, String>,
    max_age: i64,
}

impl SessionRecord {
    pub(crate) fn new(values: HashMap<String, String>, max_age: i64) -> Self {
        Self { values, max_age }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Clear all values and force the cookie's max-age into the past so the
    /// client drops it immediately on the next save.
    pub fn invalidate(&mut self) {
        self.values.clear();
        self.max_age = -86400;
    }

    /// Whether the identity key is present and non-empty. The value may be
    /// a real email or the API-user sentinel.
    pub fn is_authenticated(&self) -> bool {
        self.get(SESSION_KEY_USER_EMAIL)
            .is_some_and(|email| !email.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub(crate) fn max_age(&self) -> i64 {
        self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord::new(HashMap::new(), 600)
    }

    #[test]
    fn test_set_get_remove() {
        let mut record = record();
        assert!(record.is_empty());
        record.set("key", "value");
        assert_eq!(record.get("key"), Some("value"));
        record.remove("key");
        assert_eq!(record.get("key"), None);
    }

    #[test]
    fn test_is_authenticated_requires_non_empty_identity() {
        let mut record = record();
        assert!(!record.is_authenticated());
        record.set(SESSION_KEY_USER_EMAIL, "");
        assert!(!record.is_authenticated());
        record.set(SESSION_KEY_USER_EMAIL, "e@example.com");
        assert!(record.is_authenticated());
    }

    #[test]
    fn test_invalidate_clears_values_and_expires() {
        let mut record = record();
        record.set(SESSION_KEY_USER_EMAIL, "e@example.com");
        record.invalidate();
        assert!(record.is_empty());
        assert!(record.max_age() < 0);
    }
}
