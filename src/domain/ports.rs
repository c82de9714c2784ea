use std::sync::Arc;

use uuid::Uuid;

use super::errors::DomainError;
use super::geo::GeoPoint;
use super::order::{Order, StatusFilter};
use super::tailor::{FabricListing, NearbyTailor, Tailor};

/// Durable order storage. `update` is the only mutation and is a
/// compare-and-swap on [`Order::version`].
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: &Order) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Most recently created first.
    fn list_by_customer(&self, phone: &str) -> Result<Vec<Order>, DomainError>;
    /// Most recently updated first.
    fn list_by_tailor(
        &self,
        tailor_id: Uuid,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Order>, DomainError>;
    /// Persists the status and payment of `order` if the stored version still
    /// equals `order.version`, returning the stored order with its version
    /// bumped. Fails with `Conflict` on a version mismatch.
    fn update(&self, order: &Order) -> Result<Order, DomainError>;
}

pub trait GeoIndex: Send + Sync + 'static {
    /// Active, available tailors within `radius_km` (clamped to the search
    /// maximum) of `center`, nearest first.
    fn nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyTailor>, DomainError>;
}

pub trait TailorDirectory: Send + Sync + 'static {
    fn get(&self, id: Uuid) -> Result<Option<Tailor>, DomainError>;
    fn set_availability(&self, id: Uuid, available: bool) -> Result<Tailor, DomainError>;
}

pub trait FabricCatalog: Send + Sync + 'static {
    fn find(&self, fabric_id: Uuid) -> Result<Option<FabricListing>, DomainError>;
}

#[derive(Debug, thiserror::Error)]
#[error("notification to {recipient} failed: {reason}")]
pub struct NotifyError {
    pub recipient: String,
    pub reason: String,
}

/// Fire-and-forget message delivery.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, recipient: &str, message: &str) -> Result<(), NotifyError>;
}

// Shared handles forward to the inner implementation so services can be
// built over `Arc<dyn Trait>` as well as concrete stores.

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create(&self, order: &Order) -> Result<Uuid, DomainError> {
        (**self).create(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list_by_customer(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        (**self).list_by_customer(phone)
    }

    fn list_by_tailor(
        &self,
        tailor_id: Uuid,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Order>, DomainError> {
        (**self).list_by_tailor(tailor_id, filter)
    }

    fn update(&self, order: &Order) -> Result<Order, DomainError> {
        (**self).update(order)
    }
}

impl<T: GeoIndex + ?Sized> GeoIndex for Arc<T> {
    fn nearby(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyTailor>, DomainError> {
        (**self).nearby(center, radius_km, limit)
    }
}
