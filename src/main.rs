use std::sync::Arc;

use epic_auth_jwt::JwtAuthentication;
use epic_persistence_sea_orm::{
    DbSettings, RegistrationRepositoryImpl, TournamentRepositoryImpl, create_db_pool,
};
use epic_server_api::HttpConfig;
use epic_server_app::{
    Application, build_application,
    memory::{InMemoryRegistrationRepository, InMemoryTournamentRepository},
    ports::clock::SystemClock,
};
use log::info;

use crate::config::{ServerConfig, StorageBackend};

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

async fn compose(config: &ServerConfig) -> Result<Application, String> {
    let authentication = Arc::new(JwtAuthentication::new(config.jwt_secret.as_bytes()));
    let clock = Arc::new(SystemClock);

    match (&config.storage, &config.database) {
        (StorageBackend::Database, Some(database)) => {
            let settings = DbSettings {
                url: database.url.clone(),
                fallback_url: database.fallback_url.clone(),
                connect_timeout: database.connect_timeout,
                max_connections: database.max_connections,
            };
            let db = create_db_pool(&settings).await.map_err(|e| e.to_string())?;
            Ok(build_application(
                Arc::new(TournamentRepositoryImpl::new(db.clone())),
                Arc::new(RegistrationRepositoryImpl::new(db)),
                authentication,
                clock,
            ))
        }
        (StorageBackend::Database, None) => Err("database storage needs a database url".into()),
        (StorageBackend::Memory, _) => {
            log::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(build_application(
                Arc::new(InMemoryTournamentRepository::new()),
                Arc::new(InMemoryRegistrationRepository::new()),
                authentication,
                clock,
            ))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = logs::init_logger() {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let app = match compose(&config).await {
        Ok(app) => Arc::new(app),
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting application");

    let http_config = HttpConfig {
        host: config.host.clone(),
        port: config.http_port,
        request_timeout: config.request_timeout,
    };
    let http_app = tokio::spawn(async move {
        epic_server_api::run(app, http_config, shutdown_signal()).await
    });

    match http_app.await {
        Ok(Ok(())) => info!("HTTP API stopped"),
        Ok(Err(e)) => log::error!("HTTP API failed: {}", e),
        Err(e) => log::error!("HTTP API task failed: {}", e),
    }
}
