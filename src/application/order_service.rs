use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::lifecycle;
use crate::domain::order::{
    FabricRequest, FabricSource, NewOrderInput, Order, OrderDraft, OrderStatus, StatusFilter,
    TailorFabric,
};
use crate::domain::ports::{FabricCatalog, Notifier, OrderRepository, TailorDirectory};
use crate::domain::tailor::AccountStatus;

pub struct OrderService<R> {
    repo: R,
    tailors: Arc<dyn TailorDirectory>,
    fabrics: Arc<dyn FabricCatalog>,
    notifier: Arc<dyn Notifier>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(
        repo: R,
        tailors: Arc<dyn TailorDirectory>,
        fabrics: Arc<dyn FabricCatalog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            tailors,
            fabrics,
            notifier,
        }
    }

    pub fn create_order(&self, input: NewOrderInput) -> Result<Order, DomainError> {
        input.validate_contact()?;
        let handover = input.handover()?;
        let fabric_request = input.fabric_request()?;

        let tailor = self
            .tailors
            .get(input.tailor_id)?
            .ok_or(DomainError::NotFound("Tailor"))?;
        if tailor.status != AccountStatus::Active {
            return Err(DomainError::Validation(format!(
                "tailor {} is not accepting orders",
                tailor.id
            )));
        }
        let fabric = self.resolve_fabric(fabric_request)?;

        let draft = OrderDraft {
            customer_id: input.customer_id,
            customer: input.customer,
            tailor_id: input.tailor_id,
            garment_type: input.garment_type,
            items: input.items,
            measurements: input.measurements,
            fabric,
            handover,
            stitching_cost: input.stitching_cost,
            deposit_amount: input.deposit_amount,
            deposit_mode: input.deposit_mode,
        };
        let order = lifecycle::open(draft, Utc::now())?;
        self.repo.create(&order)?;

        log::info!(
            "order {} created for tailor {} in status {}",
            order.id,
            order.tailor_id,
            order.status
        );
        self.notify(
            &tailor.phone,
            &format!(
                "New {} order {} from {}",
                order.garment_type, order.id, order.customer.name
            ),
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_customer_orders(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        if phone.trim().is_empty() {
            return Err(DomainError::Validation("phone is required".to_string()));
        }
        self.repo.list_by_customer(phone)
    }

    pub fn list_tailor_orders(
        &self,
        tailor_id: Uuid,
        filter: Option<StatusFilter>,
    ) -> Result<Vec<Order>, DomainError> {
        self.repo.list_by_tailor(tailor_id, filter)
    }

    pub fn confirm_deposit(&self, id: Uuid) -> Result<Order, DomainError> {
        self.apply(id, lifecycle::confirm_deposit)
    }

    pub fn accept_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.apply(id, lifecycle::accept)
    }

    pub fn reject_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.apply(id, lifecycle::reject)
    }

    pub fn advance_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.apply(id, lifecycle::advance)
    }

    pub fn verify_delivery(&self, id: Uuid, otp: &str) -> Result<Order, DomainError> {
        self.apply(id, |order| lifecycle::verify_delivery(order, otp))
    }

    pub fn cancel_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.apply(id, lifecycle::cancel)
    }

    fn resolve_fabric(&self, request: FabricRequest) -> Result<FabricSource, DomainError> {
        match request {
            FabricRequest::Customer(fabric) => Ok(FabricSource::Customer(fabric)),
            FabricRequest::Tailor(request) => {
                let listing = self
                    .fabrics
                    .find(request.fabric_id)?
                    .filter(|listing| listing.available)
                    .ok_or_else(|| {
                        DomainError::Validation(format!(
                            "fabric {} is not available",
                            request.fabric_id
                        ))
                    })?;
                Ok(FabricSource::Tailor(TailorFabric {
                    fabric_id: listing.fabric_id,
                    name: listing.name,
                    price_per_unit: listing.price_per_meter,
                    quantity: request.quantity,
                }))
            }
        }
    }

    /// Load, transition, then persist with a version check. Notification runs
    /// only after the new state is durable.
    fn apply<F>(&self, id: Uuid, transition: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&Order) -> Result<Order, DomainError>,
    {
        let current = self.get_order(id)?;
        let next = transition(&current)?;
        let saved = self.repo.update(&next)?;

        log::info!(
            "order {} moved {} -> {} (version {})",
            saved.id,
            current.status,
            saved.status,
            saved.version
        );
        if let Some(message) = customer_message(&saved) {
            let recipient = saved
                .customer
                .email
                .as_deref()
                .unwrap_or(&saved.customer.phone);
            self.notify(recipient, &message);
        }
        Ok(saved)
    }

    fn notify(&self, recipient: &str, message: &str) {
        if let Err(e) = self.notifier.notify(recipient, message) {
            log::warn!("{}", e);
        }
    }
}

fn customer_message(order: &Order) -> Option<String> {
    let text = match order.status {
        OrderStatus::Accepted => format!("Your {} order has been accepted.", order.garment_type),
        OrderStatus::Rejected => format!(
            "Your {} order was declined by the tailor.",
            order.garment_type
        ),
        OrderStatus::Ready => format!("Your {} is ready.", order.garment_type),
        OrderStatus::OutForDelivery => format!(
            "Your {} is out for delivery. Share code {} on receipt.",
            order.garment_type, order.delivery_otp
        ),
        OrderStatus::Delivered => format!("Your {} has been delivered.", order.garment_type),
        OrderStatus::Cancelled => format!("Your {} order was cancelled.", order.garment_type),
        _ => return None,
    };
    Some(text)
}
