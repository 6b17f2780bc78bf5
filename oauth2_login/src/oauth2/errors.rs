use crate::session::SessionError;
use crate::utils::UtilError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AuthError {
    /// Bad or missing credentials, base URL, or endpoint configuration.
    /// Fatal at construction; the service never starts in this state.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Random-source failure during state generation. Surfaced as a server
    /// fault (500), never silently degraded.
    #[error("Entropy error: {0}")]
    Entropy(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch user info error: {0}")]
    FetchUserInfo(String),

    #[error("Serde error: {0}")]
    Serde(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from session operations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
