use std::sync::Arc;

use askama::Template;
use askama::filters::{Escaper, Html};

use oauth2_login::{AuthError, OAuthService, SessionStore};

/// Shared handler state: the immutable OAuth service, the session store,
/// and the prepared login page. Cheap to clone; safe for concurrent
/// requests.
#[derive(Clone)]
pub struct AuthState {
    service: Arc<OAuthService>,
    sessions: Arc<SessionStore>,
    login_page: Arc<LoginPage>,
}

impl AuthState {
    /// A configured login-template override is read once here; a missing or
    /// unreadable file is a construction failure, not a per-request one.
    pub fn new(service: OAuthService, sessions: SessionStore) -> Result<Self, AuthError> {
        let login_page = match service.login_template() {
            Some(path) => {
                let body = std::fs::read_to_string(path).map_err(|e| {
                    AuthError::Config(format!(
                        "failed to read login template {}: {e}",
                        path.display()
                    ))
                })?;
                LoginPage::Custom(body)
            }
            None => LoginPage::Default,
        };
        Ok(Self {
            service: Arc::new(service),
            sessions: Arc::new(sessions),
            login_page: Arc::new(login_page),
        })
    }

    pub fn service(&self) -> &OAuthService {
        &self.service
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub(crate) fn login_page(&self) -> &LoginPage {
        &self.login_page
    }
}

#[derive(Template)]
#[template(path = "login.j2")]
struct LoginTemplate<'a> {
    error: &'a str,
}

pub(crate) enum LoginPage {
    Default,
    Custom(String),
}

impl LoginPage {
    /// The error value comes straight from the query string and is
    /// HTML-escaped on both paths.
    pub(crate) fn render(&self, error: &str) -> Result<String, askama::Error> {
        match self {
            LoginPage::Default => LoginTemplate { error }.render(),
            // Custom pages reference the error with a literal placeholder.
            LoginPage::Custom(body) => Ok(body.replace("{{ error }}", &escape_html(error))),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    // Writing into a String cannot fail.
    let _ = Html.write_escaped_str(&mut escaped, value);
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_login_page_shows_error() {
        let html = LoginPage::Default.render("invalid_state").unwrap();
        assert!(html.contains("invalid_state"));
    }

    #[test]
    fn test_default_login_page_without_error() {
        let html = LoginPage::Default.render("").unwrap();
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn test_custom_login_page_substitutes_placeholder() {
        let page = LoginPage::Custom("<p>{{ error }}</p>".to_string());
        assert_eq!(page.render("missing_code").unwrap(), "<p>missing_code</p>");
    }

    #[test]
    fn test_custom_login_page_escapes_error_value() {
        let page = LoginPage::Custom("<p>{{ error }}</p>".to_string());
        let html = page.render("<script>alert(1)</script>").unwrap();
        assert_eq!(html, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");
    }

    #[test]
    fn test_default_login_page_escapes_error_value() {
        let html = LoginPage::Default.render("<script>alert(1)</script>").unwrap();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
