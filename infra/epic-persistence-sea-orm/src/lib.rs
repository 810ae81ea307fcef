use std::time::Duration;

use async_lock::OnceCell;
use epic_persistence_sea_orm_entities::{registration, tournament};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
    sea_query::Index,
};

mod mapping;
pub mod registrations;
pub mod tournaments;

pub use registrations::RegistrationRepositoryImpl;
pub use tournaments::TournamentRepositoryImpl;

#[derive(Clone, Debug)]
pub struct DbSettings {
    pub url: String,
    pub fallback_url: Option<String>,
    pub connect_timeout: Duration,
    pub max_connections: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("database unreachable: {0}")]
    Unreachable(DbErr),
    #[error("database unreachable ({primary}), fallback unreachable too ({fallback})")]
    FallbackUnreachable { primary: DbErr, fallback: DbErr },
}

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Process-wide pool, connected on first use.
pub async fn create_db_pool(settings: &DbSettings) -> Result<DatabaseConnection, ConnectionError> {
    DB_POOL
        .get_or_try_init(|| connect(settings))
        .await
        .cloned()
}

/// Tries the primary database and, if it cannot be reached, the fallback
/// with doubled timeouts.
pub async fn connect(settings: &DbSettings) -> Result<DatabaseConnection, ConnectionError> {
    let primary = match try_connect(
        &settings.url,
        settings.connect_timeout,
        settings.max_connections,
    )
    .await
    {
        Ok(db) => {
            log::info!("Connected to primary database");
            return Ok(db);
        }
        Err(e) => e,
    };

    let Some(fallback_url) = &settings.fallback_url else {
        return Err(ConnectionError::Unreachable(primary));
    };
    log::warn!("Primary database unreachable, trying fallback: {}", primary);
    match try_connect(
        fallback_url,
        settings.connect_timeout * 2,
        settings.max_connections,
    )
    .await
    {
        Ok(db) => {
            log::info!("Connected to fallback database");
            Ok(db)
        }
        Err(fallback) => Err(ConnectionError::FallbackUnreachable { primary, fallback }),
    }
}

async fn try_connect(
    url: &str,
    timeout: Duration,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(max_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.ping().await?;
    Ok(db)
}

/// Creates both tables plus the indexes that keep one active registration
/// per user and per team name in each tournament.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    db.execute(&schema.create_table_from_entity(tournament::Entity))
        .await?;
    db.execute(&schema.create_table_from_entity(registration::Entity))
        .await?;
    for index in schema.create_index_from_entity(registration::Entity) {
        db.execute(&index).await?;
    }

    let active_user = Index::create()
        .name("idx_registrations_active_user")
        .table(registration::Entity)
        .col(registration::Column::TournamentId)
        .col(registration::Column::ActiveUser)
        .unique()
        .to_owned();
    let active_team = Index::create()
        .name("idx_registrations_active_team")
        .table(registration::Entity)
        .col(registration::Column::TournamentId)
        .col(registration::Column::ActiveTeamName)
        .unique()
        .to_owned();
    db.execute(&active_user).await?;
    db.execute(&active_team).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_db() -> DatabaseConnection {
    // A single connection, since every sqlite memory connection is its own database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    create_schema(&db).await.unwrap();
    db
}
