use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use epic_server_app::Application;
use log::info;
use tower_http::timeout::TimeoutLayer;

use crate::{app::ServiceError, auth::Auth};

mod app;
mod auth;
mod http;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

pub fn router(app: Arc<Application>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/whoami", get(who_am_i))
        .route(
            "/tournaments",
            get(http::tournaments::list).post(http::tournaments::create),
        )
        .route(
            "/tournaments/{id}",
            get(http::tournaments::get_by_id).delete(http::tournaments::delete),
        )
        .route(
            "/tournaments/{id}/status",
            put(http::tournaments::update_status),
        )
        .route("/tournaments/{id}/teams", get(http::tournaments::teams))
        .route(
            "/tournaments/{id}/register",
            post(http::registrations::register).get(http::registrations::list),
        )
        .route(
            "/registrations/{id}",
            axum::routing::delete(http::registrations::withdraw),
        )
        .route(
            "/registrations/{id}/status",
            put(http::registrations::review),
        )
        .route(
            "/registrations/{id}/payment",
            put(http::registrations::update_payment),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(AppState { app })
}

pub async fn run(
    app: Arc<Application>,
    config: HttpConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = router(app, config.request_timeout);
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    info!("HTTP API listening on {}:{}", config.host, config.port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityInfo {
    pub user_id: String,
    pub email: String,
    pub role: &'static str,
}

async fn who_am_i(Auth(identity): Auth) -> Result<Json<IdentityInfo>, ServiceError> {
    Ok(Json(IdentityInfo {
        user_id: identity.user_id.to_string(),
        email: identity.email,
        role: identity.role.as_str(),
    }))
}
