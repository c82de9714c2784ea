pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use handlers::AppState;

use domain::errors::DomainError;
use domain::ports::Notifier;
use infrastructure::fabric_repo::DieselFabricCatalog;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::tailor_repo::DieselTailorRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("migrations failed: {}", e)))?;
    for version in applied {
        log::info!("applied migration {}", version);
    }
    Ok(())
}

/// Application state backed by Postgres for orders, tailors and fabrics.
pub fn postgres_state(pool: DbPool, notifier: Arc<dyn Notifier>) -> AppState {
    AppState::new(
        Arc::new(DieselOrderRepository::new(pool.clone())),
        Arc::new(DieselTailorRepository::new(pool.clone())),
        Arc::new(DieselFabricCatalog::new(pool)),
        notifier,
    )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
