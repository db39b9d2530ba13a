use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod aggregate;
mod config;
mod domain;
mod http;
mod metrics;
mod store;

use config::AppConfig;
use domain::customer::{Customer, NewCustomer};
use domain::order::{
    CustomerSnapshot, DiscountPolicy, OrderCommand, OrderCommandHandler, OrderItem, OrderStatus,
    SizeType,
};
use domain::preparation;
use store::{CustomerStore, InMemoryStore, OrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,catering_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting catering order service");

    let config = AppConfig::from_env();
    tracing::info!(
        http_port = config.http_port,
        export_dir = %config.export_dir.display(),
        transition_policy = ?config.transition_policy,
        "Configuration loaded"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 2. Record store and command handler ===
    let store = Arc::new(InMemoryStore::new());
    let handler = Arc::new(OrderCommandHandler::new(
        store.clone(),
        metrics.clone(),
        config.transition_policy,
    ));

    // === 3. Demo data ===
    if config.seed_demo_data {
        let delivery_date = Utc::now().date_naive();
        seed_demo_data(&store, &handler, delivery_date).await?;

        let orders = store.orders_for_delivery_date(delivery_date).await?;
        let items = preparation::aggregate(&orders, delivery_date, None);
        let path = preparation::write_manifest(&config.export_dir, delivery_date, &items).await?;
        tracing::info!("📝 Preparation list for {} written to {}", delivery_date, path.display());
    }

    // === 4. HTTP surface ===
    let state = http::AppState {
        orders: store.clone(),
        customers: store,
        commands: handler,
        metrics,
    };
    http::start_server(state, config.http_port).await?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}

/// Register two customers, place their orders and walk one through the
/// status lifecycle
async fn seed_demo_data(
    store: &Arc<InMemoryStore>,
    handler: &OrderCommandHandler,
    delivery_date: NaiveDate,
) -> anyhow::Result<()> {
    tracing::info!("🌱 Seeding demo data for {}", delivery_date);

    let asha = Customer::register(NewCustomer {
        name: "Asha Patel".to_string(),
        phone: "555-0101".to_string(),
        email: Some("asha@example.com".to_string()),
        address: None,
    })?;
    let ravi = Customer::register(NewCustomer {
        name: "Ravi Kumar".to_string(),
        phone: "555-0102".to_string(),
        ..Default::default()
    })?;

    let demo_orders = vec![
        (
            &asha,
            "ORD-1001",
            vec![
                OrderItem::new("Paneer Tikka", SizeType::HalfTray, 2, Decimal::new(4500, 2)),
                OrderItem::new("Jeera Rice", SizeType::FullTray, 1, Decimal::new(6000, 2)),
            ],
            DiscountPolicy::from_form("percentage", "10"),
        ),
        (
            &ravi,
            "ORD-1002",
            vec![
                OrderItem::new("Paneer Tikka", SizeType::Plate, 6, Decimal::new(1200, 2)),
                OrderItem::new("Gulab Jamun", SizeType::HalfTray, 1, Decimal::new(3000, 2)),
            ],
            DiscountPolicy::from_form("fixed", "5.00"),
        ),
    ];

    let mut first_order = None;
    for (customer, order_number, items, discount) in demo_orders {
        let order_id = Uuid::new_v4();
        let handled = handler
            .handle(
                order_id,
                OrderCommand::CreateOrder {
                    order_id,
                    order_number: order_number.to_string(),
                    customer: CustomerSnapshot {
                        customer_id: Some(customer.id),
                        name: customer.name.clone(),
                        phone: Some(customer.phone.as_str().to_string()),
                    },
                    delivery_date,
                    delivery_time: Some("12:30".to_string()),
                    items,
                    discount,
                },
                Uuid::new_v4(),
            )
            .await?;
        first_order.get_or_insert(handled.order.id);
    }

    store.save_customer(asha).await?;
    store.save_customer(ravi).await?;

    if let Some(order_id) = first_order {
        for status in [OrderStatus::Delivered, OrderStatus::Paid] {
            handler
                .handle(order_id, OrderCommand::ChangeStatus { status }, Uuid::new_v4())
                .await?;
        }
    }

    Ok(())
}
