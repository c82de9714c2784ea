pub mod orders;
pub mod tailors;

use std::sync::Arc;

use actix_web::web;

use crate::application::matching_service::MatchingService;
use crate::application::order_service::OrderService;
use crate::domain::ports::{FabricCatalog, GeoIndex, Notifier, OrderRepository, TailorDirectory};
use crate::errors::AppError;

/// Services shared by every worker. Backends are trait objects so the same
/// routes serve Postgres in production and in-memory stores in tests.
pub struct AppState {
    pub orders: OrderService<Arc<dyn OrderRepository>>,
    pub matching: MatchingService<Arc<dyn GeoIndex>>,
    pub tailors: Arc<dyn TailorDirectory>,
}

impl AppState {
    /// Wires the services over one tailor store that serves both the
    /// directory lookups and the nearby index.
    pub fn new<T>(
        orders: Arc<dyn OrderRepository>,
        tailors: Arc<T>,
        fabrics: Arc<dyn FabricCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self
    where
        T: GeoIndex + TailorDirectory,
    {
        let directory: Arc<dyn TailorDirectory> = tailors.clone();
        let index: Arc<dyn GeoIndex> = tailors;
        Self {
            orders: OrderService::new(orders, directory.clone(), fabrics, notifier),
            matching: MatchingService::new(index),
            tailors: directory,
        }
    }
}

/// Mounts the `/api` routes. Literal segments are registered ahead of the
/// `{id}` matchers that would otherwise capture them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("malformed request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidQuery(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("malformed path: {}", err)).into()
    }))
    .service(
        web::scope("/api")
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::create_order))
                    .route("/customer", web::get().to(orders::list_customer_orders))
                    .route("/tailor", web::get().to(orders::list_tailor_orders))
                    .route("/{id}", web::get().to(orders::get_order))
                    .route(
                        "/{id}/confirm-deposit",
                        web::post().to(orders::confirm_deposit),
                    )
                    .route("/{id}/accept", web::post().to(orders::accept_order))
                    .route("/{id}/reject", web::post().to(orders::reject_order))
                    .route("/{id}/advance", web::post().to(orders::advance_order))
                    .route(
                        "/{id}/verify-delivery",
                        web::post().to(orders::verify_delivery),
                    )
                    .route("/{id}/cancel", web::post().to(orders::cancel_order)),
            )
            .service(
                web::scope("/tailors")
                    .route("/nearby", web::get().to(tailors::nearby_tailors))
                    .route(
                        "/{id}/availability",
                        web::put().to(tailors::set_availability),
                    ),
            ),
    );
}

/// Runs blocking service work on actix's thread pool.
pub(crate) async fn blocking<F, T>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, crate::domain::errors::DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(work)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

/// Decimal amounts travel as strings, e.g. `"1250.50"`.
pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<bigdecimal::BigDecimal, AppError> {
    use std::str::FromStr;
    bigdecimal::BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("{} '{}' is not a decimal amount", field, raw)))
}
