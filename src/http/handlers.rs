use actix_web::error::JsonPayloadError;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{
    render_items_text, Order, OrderCommandHandler, OrderError, OrderId, OrderPatch, OrderPayload,
    RawOrderFields,
};
use crate::store::OrderFilter;

const ORDER_LIST_PATH: &str = "/orders";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub count: usize,
    /// Lets a client show its "no orders" state without counting
    pub empty: bool,
}

/// Order plus its items in the editable text form
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevenueReport {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
}

fn redirect_to_list() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, ORDER_LIST_PATH))
        .finish()
}

/// Unreadable JSON bodies get the same error shape as domain rejections
pub fn json_body_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let error = OrderError::MalformedBody(err.to_string());
    match req.app_data::<web::Data<OrderCommandHandler>>() {
        Some(orders) => orders.rejected(error).into(),
        None => error.into(),
    }
}

// ============================================================================
// Form endpoints
// ============================================================================

#[tracing::instrument(name = "list_orders", skip_all, fields(q = ?query.q))]
pub async fn list_orders(
    orders: web::Data<OrderCommandHandler>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, OrderError> {
    let filter = OrderFilter::from_token(query.q.as_deref());
    let found = orders.list(&filter).await?;

    Ok(HttpResponse::Ok().json(OrderList {
        count: found.len(),
        empty: found.is_empty(),
        orders: found,
    }))
}

#[tracing::instrument(name = "create_order", skip_all)]
pub async fn create_order(
    orders: web::Data<OrderCommandHandler>,
    form: web::Form<RawOrderFields>,
) -> Result<HttpResponse, OrderError> {
    let command = form.to_create_command().map_err(|e| orders.rejected(e))?;
    orders.create(command).await?;

    Ok(redirect_to_list())
}

#[tracing::instrument(name = "order_detail", skip_all, fields(order_id = *id))]
pub async fn order_detail(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderError> {
    let order = orders.get(*id).await?;

    Ok(HttpResponse::Ok().json(OrderDetail {
        items_text: render_items_text(&order.items),
        order,
    }))
}

#[tracing::instrument(name = "update_order", skip_all, fields(order_id = *id))]
pub async fn update_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
    form: web::Form<RawOrderFields>,
) -> Result<HttpResponse, OrderError> {
    let changes = form.to_update_command().map_err(|e| orders.rejected(e))?;
    orders.update(*id, changes).await?;

    Ok(redirect_to_list())
}

#[tracing::instrument(name = "delete_order", skip_all, fields(order_id = *id))]
pub async fn delete_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderError> {
    orders.delete(*id).await?;

    Ok(redirect_to_list())
}

#[tracing::instrument(name = "revenue_report", skip_all)]
pub async fn revenue_report(
    orders: web::Data<OrderCommandHandler>,
) -> Result<HttpResponse, OrderError> {
    let total_revenue = orders.revenue_total().await?;

    Ok(HttpResponse::Ok().json(RevenueReport { total_revenue }))
}

// ============================================================================
// JSON API endpoints
// ============================================================================

#[tracing::instrument(name = "api_list_orders", skip_all, fields(q = ?query.q))]
pub async fn api_list_orders(
    orders: web::Data<OrderCommandHandler>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, OrderError> {
    let filter = OrderFilter::from_token(query.q.as_deref());
    let found = orders.list(&filter).await?;

    Ok(HttpResponse::Ok().json(found))
}

#[tracing::instrument(name = "api_create_order", skip_all)]
pub async fn api_create_order(
    orders: web::Data<OrderCommandHandler>,
    payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, OrderError> {
    let command = payload.to_create_command().map_err(|e| orders.rejected(e))?;
    let order = orders.create(command).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/orders/{}", order.id)))
        .json(order))
}

#[tracing::instrument(name = "api_get_order", skip_all, fields(order_id = *id))]
pub async fn api_get_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderError> {
    let order = orders.get(*id).await?;

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument(name = "api_replace_order", skip_all, fields(order_id = *id))]
pub async fn api_replace_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
    payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, OrderError> {
    let changes = payload.to_replace_command().map_err(|e| orders.rejected(e))?;
    let order = orders.update(*id, changes).await?;

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument(name = "api_patch_order", skip_all, fields(order_id = *id))]
pub async fn api_patch_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
    patch: web::Json<OrderPatch>,
) -> Result<HttpResponse, OrderError> {
    let changes = patch.to_update_command().map_err(|e| orders.rejected(e))?;
    let order = orders.update(*id, changes).await?;

    Ok(HttpResponse::Ok().json(order))
}

#[tracing::instrument(name = "api_delete_order", skip_all, fields(order_id = *id))]
pub async fn api_delete_order(
    orders: web::Data<OrderCommandHandler>,
    id: web::Path<OrderId>,
) -> Result<HttpResponse, OrderError> {
    orders.delete(*id).await?;

    Ok(HttpResponse::NoContent().finish())
}
