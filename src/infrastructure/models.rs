use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::geo::GeoPoint;
use crate::domain::order::{
    CostBreakdown, CustomerContact, DepositMode, DepositStatus, Order, OrderStatus, Payment,
    PaymentStatus,
};
use crate::domain::tailor::{AccountStatus, FabricListing, Tailor};
use crate::schema::{fabrics, order_outbox, orders, tailors};

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    pub measurements: Value,
    pub fabric: Value,
    pub handover: Value,
    pub fabric_cost: BigDecimal,
    pub stitching_cost: BigDecimal,
    pub total_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub remaining_amount: BigDecimal,
    pub deposit_mode: Option<String>,
    pub deposit_status: String,
    pub payment_status: String,
    pub status: String,
    pub delivery_otp: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    pub measurements: Value,
    pub fabric: Value,
    pub handover: Value,
    pub fabric_cost: BigDecimal,
    pub stitching_cost: BigDecimal,
    pub total_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub remaining_amount: BigDecimal,
    pub deposit_mode: Option<String>,
    pub deposit_status: String,
    pub payment_status: String,
    pub status: String,
    pub delivery_otp: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only columns a lifecycle transition may change.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderTransitionChangeset {
    pub status: String,
    pub deposit_status: String,
    pub payment_status: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderTransitionChangeset {
    fn from(order: &Order) -> Self {
        Self {
            status: order.status.as_str().to_string(),
            deposit_status: order.payment.deposit_status.as_str().to_string(),
            payment_status: order.payment.payment_status.as_str().to_string(),
            version: order.version + 1,
            updated_at: Utc::now(),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

impl TryFrom<&Order> for NewOrderRow {
    type Error = DomainError;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        Ok(Self {
            id: order.id,
            customer_id: order.customer_id,
            customer_name: order.customer.name.clone(),
            customer_phone: order.customer.phone.clone(),
            customer_email: order.customer.email.clone(),
            tailor_id: order.tailor_id,
            garment_type: order.garment_type.clone(),
            items: order.items.clone(),
            measurements: order.measurements.clone(),
            fabric: to_json(&order.fabric)?,
            handover: to_json(&order.handover)?,
            fabric_cost: order.costs.fabric_cost.clone(),
            stitching_cost: order.costs.stitching_cost.clone(),
            total_cost: order.costs.total.clone(),
            total_amount: order.payment.total_amount.clone(),
            deposit_amount: order.payment.deposit_amount.clone(),
            remaining_amount: order.payment.remaining_amount.clone(),
            deposit_mode: order.payment.deposit_mode.map(|m| m.as_str().to_string()),
            deposit_status: order.payment.deposit_status.as_str().to_string(),
            payment_status: order.payment.payment_status.as_str().to_string(),
            status: order.status.as_str().to_string(),
            delivery_otp: order.delivery_otp.clone(),
            version: order.version,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

/// Rows written by older schema versions may carry labels outside the
/// current lifecycle graph; those are surfaced rather than guessed at.
fn stored_label<T>(order_id: Uuid, column: &str, label: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    label.parse().map_err(|_| {
        DomainError::Internal(format!(
            "order {} has unsupported legacy {} '{}'",
            order_id, column, label
        ))
    })
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = stored_label(row.id, "status", &row.status)?;
        let deposit_status: DepositStatus =
            stored_label(row.id, "deposit status", &row.deposit_status)?;
        let payment_status: PaymentStatus =
            stored_label(row.id, "payment status", &row.payment_status)?;
        let deposit_mode: Option<DepositMode> = row
            .deposit_mode
            .as_deref()
            .map(|mode| stored_label(row.id, "deposit mode", mode))
            .transpose()?;
        let fabric = serde_json::from_value(row.fabric)
            .map_err(|e| DomainError::Internal(format!("order {} fabric: {}", row.id, e)))?;
        let handover = serde_json::from_value(row.handover)
            .map_err(|e| DomainError::Internal(format!("order {} handover: {}", row.id, e)))?;

        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            customer: CustomerContact {
                name: row.customer_name,
                phone: row.customer_phone,
                email: row.customer_email,
            },
            tailor_id: row.tailor_id,
            garment_type: row.garment_type,
            items: row.items,
            measurements: row.measurements,
            fabric,
            handover,
            costs: CostBreakdown {
                fabric_cost: row.fabric_cost,
                stitching_cost: row.stitching_cost,
                total: row.total_cost,
            },
            payment: Payment {
                total_amount: row.total_amount,
                deposit_amount: row.deposit_amount,
                remaining_amount: row.remaining_amount,
                deposit_mode,
                deposit_status,
                payment_status,
            },
            status,
            delivery_otp: row.delivery_otp,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Outbox ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

// ── Tailors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tailors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TailorRow {
    pub id: Uuid,
    pub shop_name: String,
    pub phone: String,
    pub email: String,
    pub longitude: f64,
    pub latitude: f64,
    pub is_available: bool,
    pub status: String,
    pub rating: f64,
    pub base_price: BigDecimal,
    pub home_pickup: bool,
    pub specializations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = tailors)]
pub struct NewTailorRow {
    pub id: Uuid,
    pub shop_name: String,
    pub phone: String,
    pub email: String,
    pub longitude: f64,
    pub latitude: f64,
    pub is_available: bool,
    pub status: String,
    pub rating: f64,
    pub base_price: BigDecimal,
    pub home_pickup: bool,
    pub specializations: Vec<String>,
}

impl From<&Tailor> for NewTailorRow {
    fn from(tailor: &Tailor) -> Self {
        Self {
            id: tailor.id,
            shop_name: tailor.shop_name.clone(),
            phone: tailor.phone.clone(),
            email: tailor.email.clone(),
            longitude: tailor.location.longitude,
            latitude: tailor.location.latitude,
            is_available: tailor.available,
            status: tailor.status.as_str().to_string(),
            rating: tailor.rating,
            base_price: tailor.base_price.clone(),
            home_pickup: tailor.home_pickup,
            specializations: tailor.specializations.clone(),
        }
    }
}

impl TryFrom<TailorRow> for Tailor {
    type Error = DomainError;

    fn try_from(row: TailorRow) -> Result<Self, Self::Error> {
        let location = GeoPoint::new(row.longitude, row.latitude)
            .map_err(|e| DomainError::Internal(format!("tailor {}: {}", row.id, e)))?;
        let status = AccountStatus::from_label(&row.status).ok_or_else(|| {
            DomainError::Internal(format!(
                "tailor {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        Ok(Tailor {
            id: row.id,
            shop_name: row.shop_name,
            phone: row.phone,
            email: row.email,
            location,
            available: row.is_available,
            status,
            rating: row.rating,
            base_price: row.base_price,
            home_pickup: row.home_pickup,
            specializations: row.specializations,
        })
    }
}

// ── Fabrics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = fabrics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FabricRow {
    pub id: Uuid,
    pub tailor_id: Uuid,
    pub name: String,
    pub fabric_type: String,
    pub color: Option<String>,
    pub price_per_meter: BigDecimal,
    pub available_qty: BigDecimal,
    pub image_url: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FabricRow> for FabricListing {
    fn from(row: FabricRow) -> Self {
        let in_stock = row.available_qty > BigDecimal::from(0);
        FabricListing {
            fabric_id: row.id,
            name: row.name,
            price_per_meter: row.price_per_meter,
            available: row.is_available && in_stock,
        }
    }
}
