use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use oauth2_login::{AuthConfig, OAuthService, Scope, SessionStore};
use oauth2_login_axum::{AuthState, require_login, router};

mod handlers;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,demo_login=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let client_id = std::env::var("OAUTH_GOOGLE_CLIENT_ID")?;
    let client_secret = std::env::var("OAUTH_GOOGLE_CLIENT_SECRET")?;
    let base_url =
        std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let session_secret = std::env::var("SESSION_SECRET")?;

    let config = AuthConfig::new(client_id, client_secret, base_url)
        .scopes(vec![Scope::Profile, Scope::Email])
        .post_login_path("/protected");
    let service = OAuthService::new(config)?;
    let state = AuthState::new(service, SessionStore::new(session_secret.into_bytes()))?;

    let protected = Router::new()
        .route("/protected", get(handlers::protected))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    let app = Router::new()
        .route("/", get(handlers::index))
        .merge(protected)
        .with_state(state.clone())
        .merge(router(state));

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    tracing::info!("listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
