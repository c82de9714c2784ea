use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{blocking, AppState};
use crate::application::matching_service::NearbySearch;
use crate::auth::Caller;
use crate::domain::errors::DomainError;
use crate::domain::geo::{GeoPoint, MAX_SEARCH_RADIUS_KM};
use crate::domain::tailor::TailorProjection;
use crate::errors::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyParams {
    /// Longitude in degrees, -180..=180.
    pub lng: Option<f64>,
    /// Latitude in degrees, -90..=90.
    pub lat: Option<f64>,
    /// Search radius in km; values above 5 are clamped. Defaults to 5.
    pub radius: Option<f64>,
    /// Maximum number of results, 1..=100. Defaults to 20.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyTailorResponse {
    pub tailor_id: Uuid,
    pub shop_name: String,
    pub rating: f64,
    pub distance_km: f64,
    pub base_price: String,
    pub specializations: Vec<String>,
    pub home_pickup: bool,
}

impl From<TailorProjection> for NearbyTailorResponse {
    fn from(p: TailorProjection) -> Self {
        NearbyTailorResponse {
            tailor_id: p.tailor_id,
            shop_name: p.shop_name,
            rating: p.rating,
            distance_km: p.distance_km,
            base_price: p.base_price.to_string(),
            specializations: p.specializations,
            home_pickup: p.home_pickup,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    /// Radius actually searched, after clamping.
    pub radius_km: f64,
    pub count: usize,
    pub tailors: Vec<NearbyTailorResponse>,
}

impl From<NearbySearch> for NearbyResponse {
    fn from(search: NearbySearch) -> Self {
        NearbyResponse {
            radius_km: search.radius_km,
            count: search.count(),
            tailors: search.tailors.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub tailor_id: Uuid,
    pub available: bool,
}

/// GET /api/tailors/nearby?lng=&lat=&radius=&limit=
///
/// Available, active tailors within the radius, nearest first. Contact
/// details are never included.
#[utoipa::path(
    get,
    path = "/api/tailors/nearby",
    params(NearbyParams),
    responses(
        (status = 200, description = "Nearby tailors", body = NearbyResponse),
        (status = 400, description = "Missing or out-of-range coordinates"),
    ),
    tag = "tailors"
)]
pub async fn nearby_tailors(
    state: web::Data<AppState>,
    _caller: Caller,
    query: web::Query<NearbyParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (Some(lng), Some(lat)) = (params.lng, params.lat) else {
        return Err(AppError::InvalidQuery(
            "lng and lat are required".to_string(),
        ));
    };
    let center = GeoPoint::new(lng, lat)?;
    let radius = params.radius.unwrap_or(MAX_SEARCH_RADIUS_KM);

    let search = blocking(move || {
        state
            .matching
            .find_tailors_near(center, radius, params.limit)
    })
    .await?;
    Ok(HttpResponse::Ok().json(NearbyResponse::from(search)))
}

/// PUT /api/tailors/{id}/availability
///
/// Only the tailor themself may toggle their availability.
#[utoipa::path(
    put,
    path = "/api/tailors/{id}/availability",
    params(("id" = Uuid, Path, description = "Tailor UUID")),
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = AvailabilityResponse),
        (status = 403, description = "Caller is not this tailor"),
        (status = 404, description = "Tailor not found"),
    ),
    tag = "tailors"
)]
pub async fn set_availability(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<AvailabilityRequest>,
) -> Result<HttpResponse, AppError> {
    let tailor_id = path.into_inner();
    caller.require_tailor_self(tailor_id)?;
    let available = body.into_inner().available;

    let tailor = blocking(move || -> Result<_, DomainError> {
        let tailor = state.tailors.set_availability(tailor_id, available)?;
        log::info!("tailor {} availability set to {}", tailor.id, tailor.available);
        Ok(tailor)
    })
    .await?;
    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        tailor_id: tailor.id,
        available: tailor.available,
    }))
}
