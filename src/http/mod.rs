// ============================================================================
// HTTP Boundary
// ============================================================================
//
// Two surfaces over the same command handler:
// - /orders      form-encoded fields (items as text), redirects on success
// - /api/orders  JSON bodies (items as a list), REST status codes
//
// Plus /metrics and /health for operations.
//
// ============================================================================

mod errors;
mod handlers;

use actix_web::web;

use crate::metrics::{health_handler, metrics_handler};

/// Register every route. `/revenue` is registered ahead of `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(handlers::list_orders))
            .route("", web::post().to(handlers::create_order))
            .route("/revenue", web::get().to(handlers::revenue_report))
            .route("/{id}", web::get().to(handlers::order_detail))
            .route("/{id}/update", web::post().to(handlers::update_order))
            .route("/{id}/delete", web::post().to(handlers::delete_order)),
    )
    .service(
        web::scope("/api/orders")
            .app_data(web::JsonConfig::default().error_handler(handlers::json_body_error))
            .route("", web::get().to(handlers::api_list_orders))
            .route("", web::post().to(handlers::api_create_order))
            .route("/revenue", web::get().to(handlers::revenue_report))
            .route("/{id}", web::get().to(handlers::api_get_order))
            .route("/{id}", web::put().to(handlers::api_replace_order))
            .route("/{id}", web::patch().to(handlers::api_patch_order))
            .route("/{id}", web::delete().to(handlers::api_delete_order)),
    )
    .route("/metrics", web::get().to(metrics_handler))
    .route("/health", web::get().to(health_handler));
}
