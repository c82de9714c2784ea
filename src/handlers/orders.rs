use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{blocking, parse_amount, AppState};
use crate::auth::Caller;
use crate::domain::order::{
    CustomerContact, CustomerFabric, DepositMode, FabricSource, Handover, HandoverType,
    NewOrderInput, Order, PickupDetails, StatusFilter, TailorFabricRequest,
};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFabricBody {
    pub fabric_type: String,
    pub length: Option<String>,
    pub color: Option<String>,
    pub photo_path: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TailorFabricBody {
    pub fabric_id: Uuid,
    /// Metres of fabric as a decimal string, e.g. "2.5"
    pub quantity: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupBody {
    pub address: String,
    pub date: String,
    pub time_window: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub tailor_id: Uuid,
    pub garment_type: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub measurements: Value,
    pub is_tailor_providing_fabric: bool,
    pub customer_fabric: Option<CustomerFabricBody>,
    pub tailor_fabric: Option<TailorFabricBody>,
    /// "pickup" or "drop"
    pub handover_type: String,
    pub pickup: Option<PickupBody>,
    /// Decimal amount as a string, e.g. "700.00"
    pub stitching_cost: String,
    /// Decimal amount as a string. Defaults to "0".
    pub deposit_amount: Option<String>,
    /// "ONLINE" or "CASH"; required when a deposit is due.
    pub deposit_mode: Option<String>,
}

impl CreateOrderRequest {
    fn into_input(self, customer_id: Uuid) -> Result<NewOrderInput, AppError> {
        let handover_type = match self.handover_type.trim().to_ascii_lowercase().as_str() {
            "pickup" => HandoverType::Pickup,
            "drop" => HandoverType::Drop,
            other => {
                return Err(AppError::Validation(format!(
                    "handoverType must be 'pickup' or 'drop', got '{}'",
                    other
                )))
            }
        };
        let tailor_fabric = self
            .tailor_fabric
            .map(|f| {
                Ok::<_, AppError>(TailorFabricRequest {
                    fabric_id: f.fabric_id,
                    quantity: parse_amount("quantity", &f.quantity)?,
                })
            })
            .transpose()?;
        let deposit_amount = match self.deposit_amount.as_deref() {
            Some(raw) => parse_amount("depositAmount", raw)?,
            None => bigdecimal::BigDecimal::from(0),
        };
        let deposit_mode = self
            .deposit_mode
            .map(|mode| mode.trim().to_ascii_uppercase().parse::<DepositMode>())
            .transpose()?;
        let measurements = match self.measurements {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        Ok(NewOrderInput {
            customer_id,
            customer: CustomerContact {
                name: self.customer_name,
                phone: self.customer_phone,
                email: self.customer_email.filter(|e| !e.trim().is_empty()),
            },
            tailor_id: self.tailor_id,
            garment_type: self.garment_type,
            items: self.items,
            measurements,
            is_tailor_providing_fabric: self.is_tailor_providing_fabric,
            customer_fabric: self.customer_fabric.map(|f| CustomerFabric {
                fabric_type: f.fabric_type,
                length: f.length,
                color: f.color,
                photo_path: f.photo_path,
            }),
            tailor_fabric,
            handover_type,
            pickup: self.pickup.map(|p| PickupDetails {
                address: p.address,
                date: p.date,
                time_window: p.time_window,
            }),
            stitching_cost: parse_amount("stitchingCost", &self.stitching_cost)?,
            deposit_amount,
            deposit_mode,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyDeliveryRequest {
    pub otp: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FabricResponse {
    /// "customer" or "tailor"
    pub provider: String,
    pub fabric_type: Option<String>,
    pub length: Option<String>,
    pub color: Option<String>,
    pub photo_path: Option<String>,
    pub fabric_id: Option<Uuid>,
    pub name: Option<String>,
    pub price_per_unit: Option<String>,
    pub quantity: Option<String>,
}

impl From<&FabricSource> for FabricResponse {
    fn from(source: &FabricSource) -> Self {
        match source {
            FabricSource::Customer(f) => FabricResponse {
                provider: "customer".to_string(),
                fabric_type: Some(f.fabric_type.clone()),
                length: f.length.clone(),
                color: f.color.clone(),
                photo_path: f.photo_path.clone(),
                fabric_id: None,
                name: None,
                price_per_unit: None,
                quantity: None,
            },
            FabricSource::Tailor(f) => FabricResponse {
                provider: "tailor".to_string(),
                fabric_type: None,
                length: None,
                color: None,
                photo_path: None,
                fabric_id: Some(f.fabric_id),
                name: Some(f.name.clone()),
                price_per_unit: Some(f.price_per_unit.to_string()),
                quantity: Some(f.quantity.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandoverResponse {
    /// "pickup" or "drop"
    #[serde(rename = "type")]
    pub kind: String,
    pub pickup: Option<PickupBody>,
}

impl From<&Handover> for HandoverResponse {
    fn from(handover: &Handover) -> Self {
        match handover {
            Handover::Pickup(p) => HandoverResponse {
                kind: "pickup".to_string(),
                pickup: Some(PickupBody {
                    address: p.address.clone(),
                    date: p.date.clone(),
                    time_window: p.time_window.clone(),
                }),
            },
            Handover::Drop => HandoverResponse {
                kind: "drop".to_string(),
                pickup: None,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostsResponse {
    pub fabric_cost: String,
    pub stitching_cost: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub total_amount: String,
    pub deposit_amount: String,
    pub remaining_amount: String,
    pub deposit_mode: Option<String>,
    pub deposit_status: String,
    pub payment_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer: CustomerResponse,
    pub tailor_id: Uuid,
    pub garment_type: String,
    pub items: Vec<String>,
    #[schema(value_type = Object)]
    pub measurements: Value,
    pub fabric: FabricResponse,
    pub handover: HandoverResponse,
    pub costs: CostsResponse,
    pub payment: PaymentResponse,
    pub status: String,
    /// Present only for the order's customer, who hands it over at delivery.
    pub delivery_otp: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderResponse {
    fn for_caller(order: Order, caller: &Caller) -> Self {
        let delivery_otp = caller
            .is_customer_of(&order)
            .then(|| order.delivery_otp.clone());
        OrderResponse {
            id: order.id,
            fabric: FabricResponse::from(&order.fabric),
            handover: HandoverResponse::from(&order.handover),
            customer: CustomerResponse {
                name: order.customer.name,
                phone: order.customer.phone,
                email: order.customer.email,
            },
            tailor_id: order.tailor_id,
            garment_type: order.garment_type,
            items: order.items,
            measurements: order.measurements,
            costs: CostsResponse {
                fabric_cost: order.costs.fabric_cost.to_string(),
                stitching_cost: order.costs.stitching_cost.to_string(),
                total: order.costs.total.to_string(),
            },
            payment: PaymentResponse {
                total_amount: order.payment.total_amount.to_string(),
                deposit_amount: order.payment.deposit_amount.to_string(),
                remaining_amount: order.payment.remaining_amount.to_string(),
                deposit_mode: order.payment.deposit_mode.map(|m| m.as_str().to_string()),
                deposit_status: order.payment.deposit_status.as_str().to_string(),
                payment_status: order.payment.payment_status.as_str().to_string(),
            },
            status: order.status.as_str().to_string(),
            delivery_otp,
            version: order.version,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }

    fn list_for_caller(orders: Vec<Order>, caller: &Caller) -> Vec<Self> {
        orders
            .into_iter()
            .map(|o| OrderResponse::for_caller(o, caller))
            .collect()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerOrdersParams {
    /// Phone number the orders were placed with.
    pub phone: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TailorOrdersParams {
    /// Defaults to the calling tailor; any other tailor is refused.
    pub tailor_id: Option<Uuid>,
    /// An order status, or ONGOING for every accepted, unfinished order.
    pub status: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// Loads an order for an ownership check. The customer and tailor of an
/// order never change, so the check still holds for a transition that runs
/// afterwards.
async fn load_order(state: &web::Data<AppState>, id: Uuid) -> Result<Order, AppError> {
    let state = state.clone();
    blocking(move || state.orders.get_order(id)).await
}

/// POST /api/orders
///
/// Validates the request, prices tailor-supplied fabric from the catalog and
/// opens the order in PENDING_DEPOSIT or PLACED.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid order or payment"),
        (status = 403, description = "Caller is not a customer"),
        (status = 404, description = "Tailor not found"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_customer()?;
    let input = body.into_inner().into_input(caller.user_id)?;
    let order = blocking(move || state.orders.create_order(input)).await?;
    Ok(HttpResponse::Created().json(OrderResponse::for_caller(order, &caller)))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Caller is not a party to the order"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = load_order(&state, path.into_inner()).await?;
    caller.require_party(&order)?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// GET /api/orders/customer?phone=
///
/// Newest first. Only orders the caller is a party to are listed.
#[utoipa::path(
    get,
    path = "/api/orders/customer",
    params(CustomerOrdersParams),
    responses((status = 200, description = "Orders placed with this phone", body = [OrderResponse])),
    tag = "orders"
)]
pub async fn list_customer_orders(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<CustomerOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let phone = query.into_inner().phone;
    let mut orders = blocking(move || state.orders.list_customer_orders(&phone)).await?;
    orders.retain(|order| caller.is_customer_of(order) || caller.is_tailor_of(order));
    Ok(HttpResponse::Ok().json(OrderResponse::list_for_caller(orders, &caller)))
}

/// GET /api/orders/tailor?tailorId=&status=
///
/// Most recently updated first.
#[utoipa::path(
    get,
    path = "/api/orders/tailor",
    params(TailorOrdersParams),
    responses(
        (status = 200, description = "Orders assigned to the tailor", body = [OrderResponse]),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Caller is not this tailor"),
    ),
    tag = "orders"
)]
pub async fn list_tailor_orders(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<TailorOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let tailor_id = params.tailor_id.unwrap_or(caller.user_id);
    caller.require_tailor_self(tailor_id)?;
    let filter = params
        .status
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_ascii_uppercase().parse::<StatusFilter>())
        .transpose()?;

    let orders = blocking(move || state.orders.list_tailor_orders(tailor_id, filter)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::list_for_caller(orders, &caller)))
}

/// POST /api/orders/{id}/confirm-deposit
#[utoipa::path(
    post,
    path = "/api/orders/{id}/confirm-deposit",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Deposit recorded, order placed", body = OrderResponse),
        (status = 403, description = "Caller is not a party to the order"),
        (status = 409, description = "Order is not awaiting a deposit"),
    ),
    tag = "orders"
)]
pub async fn confirm_deposit(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    caller.require_party(&load_order(&state, id).await?)?;
    let order = blocking(move || state.orders.confirm_deposit(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// POST /api/orders/{id}/accept
#[utoipa::path(
    post,
    path = "/api/orders/{id}/accept",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order accepted", body = OrderResponse),
        (status = 403, description = "Caller is not the order's tailor"),
        (status = 409, description = "Order is not placed"),
    ),
    tag = "orders"
)]
pub async fn accept_order(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    caller.require_tailor()?;
    let id = path.into_inner();
    caller.require_tailor_of(&load_order(&state, id).await?)?;
    let order = blocking(move || state.orders.accept_order(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// POST /api/orders/{id}/reject
#[utoipa::path(
    post,
    path = "/api/orders/{id}/reject",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order rejected", body = OrderResponse),
        (status = 403, description = "Caller is not the order's tailor"),
        (status = 409, description = "Order is not placed"),
    ),
    tag = "orders"
)]
pub async fn reject_order(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    caller.require_tailor()?;
    let id = path.into_inner();
    caller.require_tailor_of(&load_order(&state, id).await?)?;
    let order = blocking(move || state.orders.reject_order(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// POST /api/orders/{id}/advance
///
/// Moves an accepted order one production stage forward.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/advance",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order advanced", body = OrderResponse),
        (status = 403, description = "Caller is not the order's tailor"),
        (status = 409, description = "No further stage, or a concurrent update won"),
    ),
    tag = "orders"
)]
pub async fn advance_order(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    caller.require_tailor()?;
    let id = path.into_inner();
    caller.require_tailor_of(&load_order(&state, id).await?)?;
    let order = blocking(move || state.orders.advance_order(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// POST /api/orders/{id}/verify-delivery
#[utoipa::path(
    post,
    path = "/api/orders/{id}/verify-delivery",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = VerifyDeliveryRequest,
    responses(
        (status = 200, description = "Order delivered", body = OrderResponse),
        (status = 403, description = "Caller is not a party to the order"),
        (status = 409, description = "Order is not out for delivery"),
        (status = 422, description = "Delivery code does not match"),
    ),
    tag = "orders"
)]
pub async fn verify_delivery(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<VerifyDeliveryRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    caller.require_party(&load_order(&state, id).await?)?;
    let otp = body.into_inner().otp;
    let order = blocking(move || state.orders.verify_delivery(id, &otp)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}

/// POST /api/orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 403, description = "Caller is not a party to the order"),
        (status = 409, description = "Order already finished"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    caller.require_party(&load_order(&state, id).await?)?;
    let order = blocking(move || state.orders.cancel_order(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_caller(order, &caller)))
}
