use std::sync::Arc;
use std::time::Instant;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder, ResponseError};
use prometheus::{Encoder, TextEncoder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::EventEnvelope;
use crate::domain::customer::{
    build_customer_entries, filter_and_sort, summarize, Customer, CustomerError, CustomerFilter,
    CustomerSummary, NewCustomer,
};
use crate::domain::order::{
    CustomerSnapshot, DiscountPolicy, DiscountType, HandledCommand, OrderCommand,
    OrderCommandHandler, OrderError, OrderEvent, OrderItem, OrderStatus, OrderTotals, SizeType,
};
use crate::domain::preparation::{
    aggregate, export_file_name, parse_delivery_date, parse_status_filter, render_manifest,
    PreparationError,
};
use crate::metrics::Metrics;
use crate::store::{CustomerStore, OrderStore, StoreError};

// ============================================================================
// HTTP Surface
// ============================================================================
//
// GET  /metrics                      Prometheus text format
// GET  /health                       liveness
// GET  /preparation-list/{date}      kitchen manifest, ?status=received,paid
// POST /orders                       place an order
// GET  /orders/{order_number}        priced order
// PUT  /orders/{id}/items            replace line items, reprices
// PUT  /orders/{id}/discount         change discount, reprices
// PUT  /orders/{id}/status           move through the lifecycle
// POST /customers                    register a customer
// GET  /customers                    list with order stats, filter and sort
// GET  /customers/{id}/summary       order count, spend, average
//
// Order writes go through OrderCommandHandler. An `X-Correlation-Id` header
// is carried into the returned event envelopes.
//
// ============================================================================

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub commands: Arc<OrderCommandHandler>,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Preparation(#[from] PreparationError),

    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error("Order not found: {0}")]
    OrderNumberNotFound(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Command(#[from] anyhow::Error),

    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::OrderNotFound(_) | StoreError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::DuplicateOrderNumber(_) | StoreError::DuplicatePhone(_) => StatusCode::CONFLICT,
        StoreError::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn command_status(error: &anyhow::Error) -> StatusCode {
    if let Some(e) = error.downcast_ref::<OrderError>() {
        return match e {
            OrderError::BackwardTransition { .. } | OrderError::AlreadyCreated => {
                StatusCode::CONFLICT
            }
            OrderError::NotInitialized => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
    }
    error
        .downcast_ref::<StoreError>()
        .map(store_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Preparation(_)
            | ApiError::Customer(_)
            | ApiError::InvalidId(_)
            | ApiError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            ApiError::OrderNumberNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(e) => store_status(e),
            ApiError::Command(e) => command_status(e),
            ApiError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler))
        .route("/preparation-list/{date}", web::get().to(preparation_list_handler))
        .route("/orders", web::post().to(create_order_handler))
        .route("/orders/{order_number}", web::get().to(order_handler))
        .route("/orders/{id}/items", web::put().to(update_items_handler))
        .route("/orders/{id}/discount", web::put().to(change_discount_handler))
        .route("/orders/{id}/status", web::put().to(change_status_handler))
        .route("/customers", web::post().to(register_customer_handler))
        .route("/customers", web::get().to(customer_list_handler))
        .route("/customers/{id}/summary", web::get().to(customer_summary_handler));
}

/// Start the HTTP server and run until shutdown
pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    tracing::info!("📊 Starting HTTP server on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

fn parse_id(raw: String) -> Result<Uuid, ApiError> {
    Uuid::parse_str(&raw).map_err(|_| ApiError::InvalidId(raw))
}

fn correlation_id(req: &HttpRequest) -> Uuid {
    req.headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4)
}

// ============================================================================
// Read endpoints
// ============================================================================

async fn metrics_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Encoding(e.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer))
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "catering-orders"
    }))
}

#[derive(Debug, Deserialize)]
struct PreparationQuery {
    status: Option<String>,
}

async fn preparation_list_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PreparationQuery>,
) -> Result<HttpResponse, ApiError> {
    let delivery_date = parse_delivery_date(&path)?;
    let status_filter = match query.status.as_deref() {
        Some(raw) => parse_status_filter(raw)?,
        None => None,
    };

    let orders = state.orders.orders_for_delivery_date(delivery_date).await?;

    let started = Instant::now();
    let items = aggregate(&orders, delivery_date, status_filter.as_ref());
    state
        .metrics
        .record_manifest(status_filter.is_some(), started.elapsed().as_secs_f64());

    tracing::info!(
        delivery_date = %delivery_date,
        orders = orders.len(),
        entries = items.len(),
        "Serving preparation list"
    );

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export_file_name(delivery_date))],
        })
        .body(render_manifest(delivery_date, &items)))
}

async fn order_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order_number = path.into_inner();
    let order = state
        .orders
        .find_by_order_number(&order_number)
        .await?
        .ok_or(ApiError::OrderNumberNotFound(order_number))?;

    Ok(HttpResponse::Ok().json(order))
}

async fn customer_list_handler(
    state: web::Data<AppState>,
    filter: web::Query<CustomerFilter>,
) -> Result<HttpResponse, ApiError> {
    let customers = state.customers.list_customers().await?;
    let orders = state.orders.list_orders().await?;

    let entries = filter_and_sort(build_customer_entries(customers, &orders), &filter);
    tracing::debug!(count = entries.len(), sort_by = ?filter.sort_by, "Listing customers");

    Ok(HttpResponse::Ok().json(entries))
}

#[derive(Debug, Serialize)]
struct CustomerSummaryResponse {
    customer_id: Uuid,
    name: String,
    #[serde(flatten)]
    summary: CustomerSummary,
}

async fn customer_summary_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let customer_id = parse_id(path.into_inner())?;

    let customer = state
        .customers
        .get_customer(customer_id)
        .await?
        .ok_or(StoreError::CustomerNotFound(customer_id))?;
    let orders = state.orders.orders_for_customer(customer_id).await?;

    Ok(HttpResponse::Ok().json(CustomerSummaryResponse {
        customer_id,
        name: customer.name,
        summary: summarize(&orders),
    }))
}

// ============================================================================
// Write endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemRequest {
    item_name: String,
    size_type: SizeType,
    quantity: u32,
    unit_price: Decimal,
}

impl ItemRequest {
    fn into_item(self) -> OrderItem {
        OrderItem::new(self.item_name, self.size_type, self.quantity, self.unit_price)
    }
}

/// Discount as it arrives from a form: the value may be text or a number
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiscountRequest {
    discount_type: Option<String>,
    discount_value: Option<serde_json::Value>,
}

impl DiscountRequest {
    fn into_policy(self) -> DiscountPolicy {
        let discount_type = self.discount_type.unwrap_or_default();
        match self.discount_value {
            Some(serde_json::Value::Number(n)) => DiscountPolicy::from_f64(
                DiscountType::from_form(&discount_type),
                n.as_f64().unwrap_or_default(),
            ),
            Some(serde_json::Value::String(raw)) => DiscountPolicy::from_form(&discount_type, &raw),
            _ => DiscountPolicy::from_form(&discount_type, ""),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    order_number: String,
    customer_id: Option<Uuid>,
    #[serde(default)]
    customer_name: String,
    customer_phone: Option<String>,
    delivery_date: String,
    delivery_time: Option<String>,
    items: Vec<ItemRequest>,
    #[serde(default)]
    discount: DiscountRequest,
}

#[derive(Debug, Deserialize)]
struct UpdateItemsRequest {
    items: Vec<ItemRequest>,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Debug, Serialize)]
struct OrderCommandResponse {
    order_id: Uuid,
    order_number: String,
    version: i64,
    status: OrderStatus,
    #[serde(flatten)]
    totals: OrderTotals,
    events: Vec<EventEnvelope<OrderEvent>>,
}

impl From<HandledCommand> for OrderCommandResponse {
    fn from(handled: HandledCommand) -> Self {
        let HandledCommand { order, events } = handled;
        let totals = order.totals();
        Self {
            order_id: order.id,
            order_number: order.order_number,
            version: order.version,
            status: order.status,
            totals,
            events,
        }
    }
}

async fn create_order_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let delivery_date = parse_delivery_date(&request.delivery_date)?;

    let customer = match request.customer_id {
        Some(customer_id) => {
            let record = state
                .customers
                .get_customer(customer_id)
                .await?
                .ok_or(StoreError::CustomerNotFound(customer_id))?;
            CustomerSnapshot {
                customer_id: Some(record.id),
                name: record.name,
                phone: Some(record.phone.as_str().to_string()),
            }
        }
        None => CustomerSnapshot {
            customer_id: None,
            name: request.customer_name,
            phone: request.customer_phone,
        },
    };

    let order_id = Uuid::new_v4();
    let command = OrderCommand::CreateOrder {
        order_id,
        order_number: request.order_number,
        customer,
        delivery_date,
        delivery_time: request.delivery_time,
        items: request.items.into_iter().map(ItemRequest::into_item).collect(),
        discount: request.discount.into_policy(),
    };

    let handled = state.commands.handle(order_id, command, correlation_id(&req)).await?;
    Ok(HttpResponse::Created().json(OrderCommandResponse::from(handled)))
}

async fn run_command(
    state: &AppState,
    req: &HttpRequest,
    raw_id: String,
    command: OrderCommand,
) -> Result<HttpResponse, ApiError> {
    let order_id = parse_id(raw_id)?;
    let handled = state.commands.handle(order_id, command, correlation_id(req)).await?;
    Ok(HttpResponse::Ok().json(OrderCommandResponse::from(handled)))
}

async fn update_items_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateItemsRequest>,
) -> Result<HttpResponse, ApiError> {
    let items = body.into_inner().items.into_iter().map(ItemRequest::into_item).collect();
    run_command(&state, &req, path.into_inner(), OrderCommand::UpdateItems { items }).await
}

async fn change_discount_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<DiscountRequest>,
) -> Result<HttpResponse, ApiError> {
    let discount = body.into_inner().into_policy();
    run_command(&state, &req, path.into_inner(), OrderCommand::ChangeDiscount { discount }).await
}

async fn change_status_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let status = body.status.parse::<OrderStatus>().map_err(ApiError::InvalidStatus)?;
    run_command(&state, &req, path.into_inner(), OrderCommand::ChangeStatus { status }).await
}

async fn register_customer_handler(
    state: web::Data<AppState>,
    body: web::Json<NewCustomer>,
) -> Result<HttpResponse, ApiError> {
    let customer = Customer::register(body.into_inner())?;
    state.customers.save_customer(customer.clone()).await?;

    tracing::info!(customer_id = %customer.id, name = %customer.name, "Customer registered");
    Ok(HttpResponse::Created().json(customer))
}
