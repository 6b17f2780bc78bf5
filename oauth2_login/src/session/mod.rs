mod errors;
mod store;
mod types;

pub use errors::SessionError;
pub use store::{SESSION_COOKIE_NAME, SessionStore};
pub use types::SessionRecord;
