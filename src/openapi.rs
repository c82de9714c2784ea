use utoipa::OpenApi;

use crate::handlers::{orders, tailors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tailor order service",
        description = "Nearby tailor discovery and tailoring order lifecycle"
    ),
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_customer_orders,
        orders::list_tailor_orders,
        orders::confirm_deposit,
        orders::accept_order,
        orders::reject_order,
        orders::advance_order,
        orders::verify_delivery,
        orders::cancel_order,
        tailors::nearby_tailors,
        tailors::set_availability,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CustomerFabricBody,
        orders::TailorFabricBody,
        orders::PickupBody,
        orders::VerifyDeliveryRequest,
        orders::OrderResponse,
        orders::CustomerResponse,
        orders::FabricResponse,
        orders::HandoverResponse,
        orders::CostsResponse,
        orders::PaymentResponse,
        tailors::NearbyResponse,
        tailors::NearbyTailorResponse,
        tailors::AvailabilityRequest,
        tailors::AvailabilityResponse,
    )),
    tags(
        (name = "orders", description = "Order lifecycle"),
        (name = "tailors", description = "Tailor discovery and availability"),
    )
)]
pub struct ApiDoc;
