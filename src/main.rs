use std::sync::Arc;

use dotenvy::dotenv;
use tailor_order_service::config::AppConfig;
use tailor_order_service::infrastructure::notifier::LogNotifier;
use tailor_order_service::{build_server, create_pool, postgres_state, run_migrations};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = create_pool(&config.database_url, config.db_pool_size)
        .map_err(|e| startup_error("failed to create database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("failed to migrate database", e))?;

    let state = postgres_state(pool, Arc::new(LogNotifier));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
