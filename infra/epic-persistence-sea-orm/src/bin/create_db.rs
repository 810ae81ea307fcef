use std::time::Duration;

use epic_persistence_sea_orm::{DbSettings, create_db_pool, create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let settings = DbSettings {
        url: std::env::var("EPIC_DATABASE_URL").expect("EPIC_DATABASE_URL must be set"),
        fallback_url: std::env::var("EPIC_FALLBACK_DATABASE_URL").ok(),
        connect_timeout: Duration::from_secs(10),
        max_connections: 1,
    };
    let pool = create_db_pool(&settings)
        .await
        .expect("Failed to connect to database");

    create_schema(&pool)
        .await
        .expect("Failed to create database tables");

    println!("Created database tables successfully");
}
