use actix_web::{web, HttpResponse};
use paybridge::paypal::MISSING_ORDER_ID;
use paybridge::Provider;

use crate::error::ApiError;
use crate::orchestrator::{self, Operation};
use crate::state::AppState;
use crate::validation::{self, CaptureOrderRequest, CreateOrderRequest};

/// POST /api/paypal/create-order
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut intent = validation::parse_body::<CreateOrderRequest>(&body)
        .and_then(validation::order_intent)
        .map_err(|e| orchestrator::rejected(Provider::DelegatedOrder, Operation::Initiate, e))?;

    let order = orchestrator::initiate(&state.paypal, &mut intent).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /api/paypal/capture-order
pub async fn capture_order(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut intent = validation::parse_body::<CaptureOrderRequest>(&body)
        .and_then(validation::capture_intent)
        .map_err(|e| orchestrator::rejected(Provider::DelegatedOrder, Operation::Capture, e))?;

    let captured = orchestrator::capture(&state.paypal, &mut intent).await?;
    Ok(HttpResponse::Ok().json(captured))
}

/// GET /api/paypal/verify/{orderId} - read-only order lookup
pub async fn verify_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let mut intent =
        validation::reference_intent(Provider::DelegatedOrder, &order_id, MISSING_ORDER_ID)
            .map_err(|e| orchestrator::rejected(Provider::DelegatedOrder, Operation::Verify, e))?;

    let details = orchestrator::verify(&state.paypal, &mut intent).await?;
    Ok(HttpResponse::Ok().json(details))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/paypal/create-order", web::post().to(create_order))
        .route("/api/paypal/capture-order", web::post().to(capture_order))
        .route("/api/paypal/verify/{orderId}", web::get().to(verify_order));
}
