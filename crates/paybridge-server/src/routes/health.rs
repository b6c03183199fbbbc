use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{SecondsFormat, Utc};

use crate::metrics::metrics_output;
use crate::security::constant_time_eq;
use crate::state::AppState;

/// GET /health - liveness plus which providers have credentials configured
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let credentials = &state.config.credentials;
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "services": {
            "paystack": credentials.paystack_configured(),
            "paypal": credentials.paypal_configured()
        }
    }))
}

/// GET /metrics - Prometheus metrics endpoint (auth-gated unless PUBLIC_METRICS)
pub async fn metrics(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match state.config.metrics_token {
        Some(ref expected_token) => {
            let authorized = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()))
                .unwrap_or(false);

            if !authorized {
                return HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "unauthorized",
                    "message": "Valid Bearer token required for /metrics"
                }));
            }
        }
        None if !state.config.public_metrics => {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "Set METRICS_TOKEN or PUBLIC_METRICS=true to expose /metrics"
            }));
        }
        None => {}
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics_output())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics));
}
