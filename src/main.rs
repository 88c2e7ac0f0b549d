use anyhow::Context;
use tracing::{error, info, Instrument};

use order_pipeline::app_system::{setup_tracing, Config, OrderSystem};
use order_pipeline::clients::PageRequest;
use order_pipeline::domain::{OrderRequest, ProductFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    // Setup tracing once for the entire application
    setup_tracing();

    let config = Config::from_env().context("reading ORDER_PIPELINE_* configuration")?;
    info!(mode = ?config.mode, "Starting order pipeline");

    // Create the entire order system (starts all services, resumes unfinished orders)
    let system = OrderSystem::start(&config).await?;

    let seeded = system.product_client.seed_products().await?;
    let catalog = system.product_client.list_products(ProductFilter::default(), PageRequest::default()).await?;
    info!(seeded, listed = catalog.items.len(), "Catalog ready");

    let Some(product) = catalog.items.first() else {
        anyhow::bail!("catalog is empty after seeding");
    };

    let request = OrderRequest::new("Alice Example", "Alice@Example.com", product.id.clone(), 2)
        .with_phone("+1 (555) 010-0200");

    let span = tracing::info_span!("order_intake");
    let accepted = async {
        info!("Submitting demo order");
        system.order_client.accept_order(request).await
    }
    .instrument(span)
    .await;

    match accepted {
        Ok(acceptance) => {
            info!(
                order_id = %acceptance.order_id,
                window = %acceptance.estimated_window,
                "Order accepted"
            );

            // Let fulfillment run its course
            tokio::time::sleep(system.schedule().total()).await;
            let order = system.order_client.get_order(acceptance.order_id).await?;
            info!(status = %order.status, total = order.total_amount, "Order after fulfillment");
        }
        Err(e) => error!(error = %e, status = e.status_code(), "Order rejected"),
    }

    let stats = system.order_client.order_stats().await?;
    for group in &stats.by_status {
        info!(status = %group.status, count = group.count, revenue = group.total_amount, "Order stats");
    }

    for (key, timing) in system.product_client.metrics().snapshot() {
        info!(
            operation = key.operation,
            collection = key.collection,
            success = key.success,
            count = timing.count,
            max_ms = timing.max.as_secs_f64() * 1000.0,
            "Store operation timings"
        );
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
