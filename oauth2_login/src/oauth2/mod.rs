pub(crate) mod config;
mod errors;
mod redirect;
mod scopes;
mod service;
mod types;

pub use config::AuthConfig;
pub use errors::AuthError;
pub use redirect::{RedirectResolver, RequestContext};
pub use scopes::{Scope, default_scopes};
pub use service::{AuthorizationRequest, AuthorizedClient, OAuthService};
pub use types::{IssuedToken, UserProfile};
