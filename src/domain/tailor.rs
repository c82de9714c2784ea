use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "ACTIVE" => Some(AccountStatus::Active),
            "SUSPENDED" => Some(AccountStatus::Suspended),
            _ => None,
        }
    }
}

/// A tailor as known to the core. Contact fields are internal and never
/// leave through [`TailorProjection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tailor {
    pub id: Uuid,
    pub shop_name: String,
    pub phone: String,
    pub email: String,
    pub location: GeoPoint,
    pub available: bool,
    pub status: AccountStatus,
    pub rating: f64,
    pub base_price: BigDecimal,
    pub home_pickup: bool,
    pub specializations: Vec<String>,
}

impl Tailor {
    pub fn is_discoverable(&self) -> bool {
        self.available && self.status == AccountStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyTailor {
    pub tailor: Tailor,
    pub distance_km: f64,
}

/// Customer-facing view of a nearby tailor.
#[derive(Debug, Clone, PartialEq)]
pub struct TailorProjection {
    pub tailor_id: Uuid,
    pub shop_name: String,
    pub rating: f64,
    pub distance_km: f64,
    pub base_price: BigDecimal,
    pub specializations: Vec<String>,
    pub home_pickup: bool,
}

impl From<NearbyTailor> for TailorProjection {
    fn from(hit: NearbyTailor) -> Self {
        let NearbyTailor {
            tailor,
            distance_km,
        } = hit;
        TailorProjection {
            tailor_id: tailor.id,
            shop_name: tailor.shop_name,
            rating: tailor.rating,
            distance_km,
            base_price: tailor.base_price,
            specializations: tailor.specializations,
            home_pickup: tailor.home_pickup,
        }
    }
}

/// Fabric as listed in a tailor's catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FabricListing {
    pub fabric_id: Uuid,
    pub name: String,
    pub price_per_meter: BigDecimal,
    pub available: bool,
}
