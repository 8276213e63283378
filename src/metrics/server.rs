use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, TextEncoder};

use crate::domain::order::OrderCommandHandler;

/// Prometheus text exposition of every registered metric
pub async fn metrics_handler(orders: web::Data<OrderCommandHandler>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = orders.metrics().registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

/// Liveness plus a store round trip
pub async fn health_handler(orders: web::Data<OrderCommandHandler>) -> impl Responder {
    let store = orders.check_health().await;
    let healthy = store.status.is_healthy();

    let body = serde_json::json!({
        "status": store.status.label(),
        "service": "cafe-orders",
        "components": [store],
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
