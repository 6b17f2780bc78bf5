use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use oauth2_login_axum::AuthUser;

#[derive(Template)]
#[template(path = "index.j2")]
struct IndexTemplate<'a> {
    user: Option<&'a AuthUser>,
}

#[derive(Template)]
#[template(path = "protected.j2")]
struct ProtectedTemplate<'a> {
    user: &'a AuthUser,
}

fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub(crate) async fn index(user: Option<AuthUser>) -> Response {
    render(IndexTemplate {
        user: user.as_ref(),
    })
}

pub(crate) async fn protected(user: AuthUser) -> Response {
    render(ProtectedTemplate { user: &user })
}
