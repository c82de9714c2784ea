//! Great-circle geometry for tailor discovery.

use std::f64::consts::FRAC_PI_2;

use super::errors::DomainError;
use super::tailor::{NearbyTailor, Tailor};

/// Mean Earth radius (IUGG), in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Upper bound applied to every nearby search radius.
pub const MAX_SEARCH_RADIUS_KM: f64 = 5.0;

/// WGS84 position, longitude first as in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, DomainError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidQuery(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidQuery(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

/// Haversine distance between two points, in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Clamps a requested radius into `[0, MAX_SEARCH_RADIUS_KM]`.
pub fn clamp_radius(requested_km: f64) -> Result<f64, DomainError> {
    if requested_km.is_nan() {
        return Err(DomainError::InvalidQuery("radius is not a number".to_string()));
    }
    Ok(requested_km.clamp(0.0, MAX_SEARCH_RADIUS_KM))
}

/// Lat/lon rectangle enclosing a spherical cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every point within `radius_km` of `center`.
    /// Longitudes may fall outside [-180, 180] when the box crosses the
    /// antimeridian; see [`BoundingBox::longitude_ranges`].
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let angular = radius_km / EARTH_RADIUS_KM;
        let lat = center.latitude.to_radians();
        let lon = center.longitude.to_radians();
        let min_lat = lat - angular;
        let max_lat = lat + angular;

        if min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2 {
            let dlon = (angular.sin() / lat.cos()).min(1.0).asin();
            Self {
                min_lat: min_lat.to_degrees(),
                max_lat: max_lat.to_degrees(),
                min_lon: (lon - dlon).to_degrees(),
                max_lon: (lon + dlon).to_degrees(),
            }
        } else {
            // A pole lies inside the cap.
            Self {
                min_lat: min_lat.to_degrees().max(-90.0),
                max_lat: max_lat.to_degrees().min(90.0),
                min_lon: -180.0,
                max_lon: 180.0,
            }
        }
    }

    /// Longitude intervals within [-180, 180]; two when the box wraps.
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.max_lon - self.min_lon >= 360.0 {
            vec![(-180.0, 180.0)]
        } else if self.min_lon < -180.0 {
            vec![(self.min_lon + 360.0, 180.0), (-180.0, self.max_lon)]
        } else if self.max_lon > 180.0 {
            vec![(self.min_lon, 180.0), (-180.0, self.max_lon - 360.0)]
        } else {
            vec![(self.min_lon, self.max_lon)]
        }
    }
}

/// Keeps discoverable candidates within `radius_km`, nearest first with ties
/// broken by tailor id, truncated to `limit`.
pub fn rank_within<I>(
    candidates: I,
    center: GeoPoint,
    radius_km: f64,
    limit: usize,
) -> Vec<NearbyTailor>
where
    I: IntoIterator<Item = Tailor>,
{
    let mut hits: Vec<NearbyTailor> = candidates
        .into_iter()
        .filter(Tailor::is_discoverable)
        .filter_map(|tailor| {
            let distance_km = distance_km(center, tailor.location);
            (distance_km <= radius_km).then_some(NearbyTailor {
                tailor,
                distance_km,
            })
        })
        .collect();
    hits.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.tailor.id.cmp(&b.tailor.id))
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUNE: (f64, f64) = (73.8567, 18.5204);

    fn pune() -> GeoPoint {
        GeoPoint::new(PUNE.0, PUNE.1).unwrap()
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            GeoPoint::new(181.0, 0.0),
            Err(DomainError::InvalidQuery(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -90.5),
            Err(DomainError::InvalidQuery(_))
        ));
        assert!(GeoPoint::new(f64::NAN, 10.0).is_err());
        assert!(GeoPoint::new(-180.0, 90.0).is_ok());
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(pune(), pune()), 0.0);
    }

    #[test]
    fn pune_to_mumbai_is_about_120_km() {
        let mumbai = GeoPoint::new(72.8777, 19.0760).unwrap();
        let d = distance_km(pune(), mumbai);
        assert!((115.0..125.0).contains(&d), "got {}", d);
    }

    #[test]
    fn distance_is_symmetric_across_antimeridian() {
        let east = GeoPoint::new(179.99, 0.0).unwrap();
        let west = GeoPoint::new(-179.99, 0.0).unwrap();
        let d = distance_km(east, west);
        assert!(d < 2.5, "got {}", d);
        assert!((d - distance_km(west, east)).abs() < 1e-9);
    }

    #[test]
    fn radius_is_clamped() {
        assert_eq!(clamp_radius(50.0).unwrap(), MAX_SEARCH_RADIUS_KM);
        assert_eq!(clamp_radius(-3.0).unwrap(), 0.0);
        assert_eq!(clamp_radius(1.5).unwrap(), 1.5);
        assert_eq!(clamp_radius(f64::INFINITY).unwrap(), MAX_SEARCH_RADIUS_KM);
        assert!(clamp_radius(f64::NAN).is_err());
    }

    #[test]
    fn bounding_box_contains_cap_edge() {
        let bbox = BoundingBox::around(pune(), 5.0);
        let north = GeoPoint::new(PUNE.0, PUNE.1 + 5.0 / 111.2).unwrap();
        assert!(north.latitude <= bbox.max_lat);
        assert!(bbox.min_lon < PUNE.0 && bbox.max_lon > PUNE.0);
        assert_eq!(bbox.longitude_ranges().len(), 1);
    }

    #[test]
    fn bounding_box_wraps_at_antimeridian() {
        let center = GeoPoint::new(179.99, 10.0).unwrap();
        let ranges = BoundingBox::around(center, 5.0).longitude_ranges();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].0, -180.0);
    }

    #[test]
    fn bounding_box_near_pole_spans_all_longitudes() {
        let center = GeoPoint::new(10.0, 89.99).unwrap();
        let bbox = BoundingBox::around(center, 5.0);
        assert_eq!(bbox.longitude_ranges(), vec![(-180.0, 180.0)]);
        assert_eq!(bbox.max_lat, 90.0);
    }
}
