use actix_web::{web, HttpResponse};
use paybridge::Provider;

use crate::error::ApiError;
use crate::orchestrator::{self, Operation};
use crate::state::AppState;
use crate::validation::{self, PayRequest, MISSING_REFERENCE};

/// POST /api/paystack/pay - initialize a transaction; replies with Paystack's
/// payload unchanged
pub async fn pay(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut intent = validation::parse_body::<PayRequest>(&body)
        .and_then(validation::pay_intent)
        .map_err(|e| orchestrator::rejected(Provider::DirectCharge, Operation::Initiate, e))?;

    let transaction = orchestrator::initiate(&state.paystack, &mut intent).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

/// GET /verify/{reference}
pub async fn verify(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let reference = path.into_inner();
    let mut intent =
        validation::reference_intent(Provider::DirectCharge, &reference, MISSING_REFERENCE)
            .map_err(|e| orchestrator::rejected(Provider::DirectCharge, Operation::Verify, e))?;

    let verification = orchestrator::verify(&state.paystack, &mut intent).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": verification })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/paystack/pay", web::post().to(pay))
        .route("/verify/{reference}", web::get().to(verify));
}
