use crate::domain::errors::DomainError;
use crate::domain::geo::{self, GeoPoint};
use crate::domain::ports::GeoIndex;
use crate::domain::tailor::TailorProjection;

pub const DEFAULT_RESULT_LIMIT: usize = 20;
pub const MAX_RESULT_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct NearbySearch {
    /// Radius actually searched, after clamping.
    pub radius_km: f64,
    pub tailors: Vec<TailorProjection>,
}

impl NearbySearch {
    pub fn count(&self) -> usize {
        self.tailors.len()
    }
}

pub struct MatchingService<G> {
    index: G,
}

impl<G: GeoIndex> MatchingService<G> {
    pub fn new(index: G) -> Self {
        Self { index }
    }

    pub fn find_tailors_near(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: Option<usize>,
    ) -> Result<NearbySearch, DomainError> {
        let radius_km = geo::clamp_radius(radius_km)?;
        let limit = limit
            .unwrap_or(DEFAULT_RESULT_LIMIT)
            .clamp(1, MAX_RESULT_LIMIT);

        let hits = self.index.nearby(center, radius_km, limit)?;
        log::debug!(
            "nearby search at ({}, {}) within {} km matched {} tailors",
            center.longitude,
            center.latitude,
            radius_km,
            hits.len()
        );

        Ok(NearbySearch {
            radius_km,
            tailors: hits.into_iter().map(TailorProjection::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::*;
    use crate::domain::geo::EARTH_RADIUS_KM;
    use crate::domain::ports::TailorDirectory;
    use crate::domain::tailor::{AccountStatus, Tailor};
    use crate::infrastructure::memory::InMemoryGeoIndex;

    fn pune() -> GeoPoint {
        GeoPoint::new(73.8567, 18.5204).unwrap()
    }

    /// Point `km` due north of Pune.
    fn north_of_pune(km: f64) -> GeoPoint {
        let p = pune();
        GeoPoint::new(
            p.longitude,
            p.latitude + (km / EARTH_RADIUS_KM).to_degrees(),
        )
        .unwrap()
    }

    fn tailor(shop: &str, location: GeoPoint) -> Tailor {
        Tailor {
            id: Uuid::new_v4(),
            shop_name: shop.to_string(),
            phone: "9844444444".to_string(),
            email: format!("{}@example.com", shop),
            location,
            available: true,
            status: AccountStatus::Active,
            rating: 4.2,
            base_price: BigDecimal::from(350),
            home_pickup: false,
            specializations: vec!["Shirt".to_string(), "Pant".to_string()],
        }
    }

    fn service_with(
        tailors: Vec<Tailor>,
    ) -> (MatchingService<Arc<InMemoryGeoIndex>>, Arc<InMemoryGeoIndex>) {
        let index = Arc::new(InMemoryGeoIndex::new());
        for t in tailors {
            index.upsert(t).unwrap();
        }
        (MatchingService::new(index.clone()), index)
    }

    #[test]
    fn returns_tailors_within_radius_nearest_first() {
        let (service, _) = service_with(vec![
            tailor("half", north_of_pune(0.5)),
            tailor("two", north_of_pune(2.0)),
            tailor("nine", north_of_pune(0.9)),
        ]);

        let result = service.find_tailors_near(pune(), 1.0, None).unwrap();
        assert_eq!(result.radius_km, 1.0);
        assert_eq!(result.count(), 2);
        assert_eq!(result.tailors[0].shop_name, "half");
        assert_eq!(result.tailors[1].shop_name, "nine");
        assert!((result.tailors[0].distance_km - 0.5).abs() < 1e-6);
        assert!((result.tailors[1].distance_km - 0.9).abs() < 1e-6);
    }

    #[test]
    fn radius_request_is_clamped_to_five_km() {
        let (service, _) = service_with(vec![
            tailor("near", north_of_pune(4.5)),
            tailor("far", north_of_pune(8.0)),
        ]);
        let result = service.find_tailors_near(pune(), 50.0, None).unwrap();
        assert_eq!(result.radius_km, 5.0);
        assert_eq!(result.count(), 1);
        assert_eq!(result.tailors[0].shop_name, "near");
    }

    #[test]
    fn unavailable_and_suspended_tailors_are_hidden() {
        let mut busy = tailor("busy", north_of_pune(0.2));
        busy.available = false;
        let mut suspended = tailor("suspended", north_of_pune(0.3));
        suspended.status = AccountStatus::Suspended;
        let open = tailor("open", north_of_pune(0.4));
        let open_id = open.id;
        let (service, index) = service_with(vec![busy.clone(), suspended, open]);

        let result = service.find_tailors_near(pune(), 5.0, None).unwrap();
        assert_eq!(result.count(), 1);
        assert_eq!(result.tailors[0].tailor_id, open_id);

        index.set_availability(busy.id, true).unwrap();
        index.set_availability(open_id, false).unwrap();
        let result = service.find_tailors_near(pune(), 5.0, None).unwrap();
        assert_eq!(result.count(), 1);
        assert_eq!(result.tailors[0].tailor_id, busy.id);
    }

    #[test]
    fn empty_area_is_not_an_error() {
        let (service, _) = service_with(vec![]);
        let result = service.find_tailors_near(pune(), 3.0, Some(5)).unwrap();
        assert_eq!(result.count(), 0);
    }

    #[test]
    fn limit_truncates_and_ties_break_by_id() {
        let spot = north_of_pune(1.0);
        let (service, _) = service_with(vec![
            tailor("a", spot),
            tailor("b", spot),
            tailor("c", spot),
        ]);

        let all = service.find_tailors_near(pune(), 5.0, None).unwrap();
        let ids: Vec<Uuid> = all.tailors.iter().map(|t| t.tailor_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let limited = service.find_tailors_near(pune(), 5.0, Some(2)).unwrap();
        assert_eq!(limited.count(), 2);
        assert_eq!(limited.tailors[0].tailor_id, ids[0]);
    }

    #[test]
    fn nan_radius_is_an_invalid_query() {
        let (service, _) = service_with(vec![]);
        assert!(matches!(
            service.find_tailors_near(pune(), f64::NAN, None),
            Err(DomainError::InvalidQuery(_))
        ));
    }
}
