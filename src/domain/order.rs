use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;

/// Declares a fieldless enum whose variants round-trip through fixed
/// upper-case labels, the form they take in storage and on the wire.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(DomainError::Validation(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

labelled_enum! {
    /// Position of an order in the fulfillment workflow.
    OrderStatus {
        PendingDeposit => "PENDING_DEPOSIT",
        Placed => "PLACED",
        Accepted => "ACCEPTED",
        Cutting => "CUTTING",
        Stitching => "STITCHING",
        Finishing => "FINISHING",
        Ready => "READY",
        OutForDelivery => "OUT_FOR_DELIVERY",
        Delivered => "DELIVERED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
}

labelled_enum! {
    DepositStatus {
        NotRequired => "NOT_REQUIRED",
        Pending => "PENDING",
        Paid => "PAID",
    }
}

labelled_enum! {
    PaymentStatus {
        Unpaid => "UNPAID",
        DepositPaid => "DEPOSIT_PAID",
    }
}

labelled_enum! {
    /// How the customer intends to pay the deposit.
    DepositMode {
        Online => "ONLINE",
        Cash => "CASH",
    }
}

impl OrderStatus {
    /// Post-acceptance states that are still in progress.
    pub const ONGOING: [OrderStatus; 6] = [
        OrderStatus::Accepted,
        OrderStatus::Cutting,
        OrderStatus::Stitching,
        OrderStatus::Finishing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }
}

/// Filter accepted by tailor order listings: an exact status, or the
/// `ONGOING` meta-status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Exact(OrderStatus),
    Ongoing,
}

impl StatusFilter {
    pub fn statuses(&self) -> Vec<OrderStatus> {
        match self {
            StatusFilter::Exact(status) => vec![*status],
            StatusFilter::Ongoing => OrderStatus::ONGOING.to_vec(),
        }
    }

    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::Exact(expected) => *expected == status,
            StatusFilter::Ongoing => OrderStatus::ONGOING.contains(&status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ONGOING" {
            return Ok(StatusFilter::Ongoing);
        }
        s.parse().map(StatusFilter::Exact)
    }
}

// ── Order aggregate ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFabric {
    pub fabric_type: String,
    pub length: Option<String>,
    pub color: Option<String>,
    pub photo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorFabric {
    pub fabric_id: Uuid,
    pub name: String,
    pub price_per_unit: BigDecimal,
    pub quantity: BigDecimal,
}

/// Where the fabric for an order comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "camelCase")]
pub enum FabricSource {
    Customer(CustomerFabric),
    Tailor(TailorFabric),
}

impl FabricSource {
    pub fn is_tailor_provided(&self) -> bool {
        matches!(self, FabricSource::Tailor(_))
    }

    pub fn cost(&self) -> BigDecimal {
        match self {
            FabricSource::Customer(_) => BigDecimal::from(0),
            FabricSource::Tailor(fabric) => &fabric.price_per_unit * &fabric.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupDetails {
    pub address: String,
    pub date: String,
    pub time_window: String,
}

/// How the fabric travels from the customer to the tailor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Handover {
    Pickup(PickupDetails),
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandoverType {
    Pickup,
    Drop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub fabric_cost: BigDecimal,
    pub stitching_cost: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub total_amount: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub remaining_amount: BigDecimal,
    pub deposit_mode: Option<DepositMode>,
    pub deposit_status: DepositStatus,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// Account of the customer who placed the order.
    pub customer_id: Uuid,
    pub customer: CustomerContact,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    pub measurements: Value,
    pub fabric: FabricSource,
    pub handover: Handover,
    pub costs: CostBreakdown,
    pub payment: Payment,
    pub status: OrderStatus,
    pub delivery_otp: String,
    /// Optimistic-concurrency token; bumped by every successful store update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Creation input ───────────────────────────────────────────────────────────

/// Tailor-supplied fabric as requested by the customer, before the catalog
/// has been consulted for its name and price.
#[derive(Debug, Clone, PartialEq)]
pub struct TailorFabricRequest {
    pub fabric_id: Uuid,
    pub quantity: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FabricRequest {
    Customer(CustomerFabric),
    Tailor(TailorFabricRequest),
}

/// Order creation payload in the loose shape clients submit it: a flag plus
/// optional sub-objects for each variant.
#[derive(Debug, Clone)]
pub struct NewOrderInput {
    pub customer_id: Uuid,
    pub customer: CustomerContact,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    pub measurements: Value,
    pub is_tailor_providing_fabric: bool,
    pub customer_fabric: Option<CustomerFabric>,
    pub tailor_fabric: Option<TailorFabricRequest>,
    pub handover_type: HandoverType,
    pub pickup: Option<PickupDetails>,
    pub stitching_cost: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub deposit_mode: Option<DepositMode>,
}

impl NewOrderInput {
    /// Checks required fields that carry no variant logic.
    pub fn validate_contact(&self) -> Result<(), DomainError> {
        require("customer name", &self.customer.name)?;
        require("customer phone", &self.customer.phone)?;
        require("garment type", &self.garment_type)?;
        Ok(())
    }

    /// Collapses the flag and the two optional fabric objects into exactly
    /// one variant.
    pub fn fabric_request(&self) -> Result<FabricRequest, DomainError> {
        match (
            self.is_tailor_providing_fabric,
            &self.customer_fabric,
            &self.tailor_fabric,
        ) {
            (false, Some(fabric), None) => {
                require("fabric type", &fabric.fabric_type)?;
                Ok(FabricRequest::Customer(fabric.clone()))
            }
            (true, None, Some(fabric)) => {
                if fabric.quantity <= BigDecimal::from(0) {
                    return Err(DomainError::Validation(
                        "fabric quantity must be positive".to_string(),
                    ));
                }
                Ok(FabricRequest::Tailor(fabric.clone()))
            }
            (_, Some(_), Some(_)) => Err(DomainError::Validation(
                "exactly one fabric source may be given, got both".to_string(),
            )),
            (flag, _, _) => Err(DomainError::Validation(format!(
                "{} fabric details are required when isTailorProvidingFabric is {}",
                if flag { "tailor" } else { "customer" },
                flag
            ))),
        }
    }

    pub fn handover(&self) -> Result<Handover, DomainError> {
        match (self.handover_type, &self.pickup) {
            (HandoverType::Pickup, Some(pickup)) => {
                require("pickup address", &pickup.address)?;
                require("pickup date", &pickup.date)?;
                require("pickup time window", &pickup.time_window)?;
                Ok(Handover::Pickup(pickup.clone()))
            }
            (HandoverType::Pickup, None) => Err(DomainError::Validation(
                "pickup details are required for pickup handover".to_string(),
            )),
            (HandoverType::Drop, None) => Ok(Handover::Drop),
            (HandoverType::Drop, Some(_)) => Err(DomainError::Validation(
                "pickup details must be omitted for drop handover".to_string(),
            )),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Fully validated order contents, ready for the lifecycle to open.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Uuid,
    pub customer: CustomerContact,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    pub measurements: Value,
    pub fabric: FabricSource,
    pub handover: Handover,
    pub stitching_cost: BigDecimal,
    pub deposit_amount: BigDecimal,
    pub deposit_mode: Option<DepositMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewOrderInput {
        NewOrderInput {
            customer_id: Uuid::new_v4(),
            customer: CustomerContact {
                name: "Asha".to_string(),
                phone: "9800000000".to_string(),
                email: None,
            },
            tailor_id: Uuid::new_v4(),
            garment_type: "Kurta".to_string(),
            items: vec![],
            measurements: Value::Null,
            is_tailor_providing_fabric: false,
            customer_fabric: Some(CustomerFabric {
                fabric_type: "Cotton".to_string(),
                length: Some("2.5".to_string()),
                color: None,
                photo_path: None,
            }),
            tailor_fabric: None,
            handover_type: HandoverType::Drop,
            pickup: None,
            stitching_cost: BigDecimal::from(800),
            deposit_amount: BigDecimal::from(0),
            deposit_mode: None,
        }
    }

    #[test]
    fn status_labels_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn legacy_status_is_rejected() {
        assert!(matches!(
            "PENDING".parse::<OrderStatus>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn ongoing_filter_covers_post_acceptance_states() {
        let filter: StatusFilter = "ONGOING".parse().unwrap();
        assert!(filter.matches(OrderStatus::Ready));
        assert!(filter.matches(OrderStatus::OutForDelivery));
        assert!(!filter.matches(OrderStatus::Placed));
        assert!(!filter.matches(OrderStatus::Delivered));
        assert_eq!(filter.statuses().len(), 6);
    }

    #[test]
    fn exact_filter_parses_status() {
        let filter: StatusFilter = "READY".parse().unwrap();
        assert_eq!(filter, StatusFilter::Exact(OrderStatus::Ready));
    }

    #[test]
    fn customer_fabric_with_flag_off_is_accepted() {
        assert!(matches!(
            input().fabric_request(),
            Ok(FabricRequest::Customer(_))
        ));
    }

    #[test]
    fn both_fabric_variants_are_rejected() {
        let mut input = input();
        input.tailor_fabric = Some(TailorFabricRequest {
            fabric_id: Uuid::new_v4(),
            quantity: BigDecimal::from(2),
        });
        assert!(matches!(
            input.fabric_request(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn flag_mismatch_is_rejected() {
        let mut input = input();
        input.is_tailor_providing_fabric = true;
        assert!(matches!(
            input.fabric_request(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn pickup_requires_details() {
        let mut input = input();
        input.handover_type = HandoverType::Pickup;
        assert!(input.handover().is_err());

        input.pickup = Some(PickupDetails {
            address: "12 MG Road".to_string(),
            date: "2026-10-20".to_string(),
            time_window: "10:00-12:00".to_string(),
        });
        assert!(matches!(input.handover(), Ok(Handover::Pickup(_))));

        let complete = input.pickup.clone().unwrap();
        for (field, blank) in [
            (
                "pickup address",
                PickupDetails { address: " ".to_string(), ..complete.clone() },
            ),
            (
                "pickup date",
                PickupDetails { date: String::new(), ..complete.clone() },
            ),
            (
                "pickup time window",
                PickupDetails { time_window: "  ".to_string(), ..complete.clone() },
            ),
        ] {
            input.pickup = Some(blank);
            let err = input.handover().unwrap_err();
            assert!(err.to_string().contains(field), "{}", err);
        }
    }

    #[test]
    fn blank_phone_is_rejected() {
        let mut input = input();
        input.customer.phone = "  ".to_string();
        assert!(input.validate_contact().is_err());
    }

    #[test]
    fn tailor_fabric_cost_is_price_times_quantity() {
        let fabric = FabricSource::Tailor(TailorFabric {
            fabric_id: Uuid::new_v4(),
            name: "Giza Cotton".to_string(),
            price_per_unit: BigDecimal::from(250),
            quantity: BigDecimal::from(2),
        });
        assert_eq!(fabric.cost(), BigDecimal::from(500));
    }
}
