#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::app_system::{Config, OrderSystem, RuntimeMode};
    use crate::clients::{OrderClient, PageRequest, ProductClient};
    use crate::domain::{
        Category, Order, OrderFilter, OrderRequest, OrderStatus, Product, ProductCreate, ProductPatch,
        Reservation,
    };
    use crate::fulfillment::{FulfillmentSchedule, FulfillmentScheduler};
    use crate::load_shedding::{testing::gate_with, LoadSheddingGate};
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get};
    use crate::order_actor::OrderError;
    use crate::product_actor::{ProductAction, ProductActionResult};

    fn mocked_order_client() -> (
        OrderClient,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Product>>,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Order>>,
    ) {
        let (product_client_inner, product_rx) = create_mock_client::<Product>(10);
        let (order_client_inner, order_rx) = create_mock_client::<Order>(10);

        let product_client = ProductClient::new(product_client_inner);
        let scheduler = FulfillmentScheduler::new(order_client_inner.clone(), FulfillmentSchedule::default());
        let order_client = OrderClient::new(
            order_client_inner,
            product_client,
            Arc::new(LoadSheddingGate::disabled()),
            scheduler,
        );
        (order_client, product_rx, order_rx)
    }

    #[tokio::test]
    async fn test_order_acceptance_flow() {
        // 1. Setup Mocks
        let (order_client, mut product_rx, mut order_rx) = mocked_order_client();
        let metrics = order_client.metrics().clone();

        // 2. Execute intake in background
        let order_task = tokio::spawn(async move {
            let request = OrderRequest::new("  Jane Doe ", "Jane@Example.COM", "product_1", 5);
            order_client.accept_order(request).await
        });

        // 3. Verify Interactions

        // Expect Stock Reservation (Action)
        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected Product Action");
        assert_eq!(product_id, "product_1");
        match action {
            ProductAction::ReserveStock(qty) => assert_eq!(qty, 5),
            _ => panic!("Unexpected action: {:?}", action),
        }
        responder
            .send(Ok(ProductActionResult::ReserveStock(Reservation { unit_price: 20.0, remaining: 95 })))
            .unwrap();

        // Expect Order Create, priced from the reservation
        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.customer.name, "Jane Doe");
        assert_eq!(payload.customer.email, "jane@example.com");
        assert_eq!(payload.product_id, "product_1");
        assert_eq!(payload.quantity, 5);
        assert_eq!(payload.unit_price, 20.0);
        responder.send(Ok("order_1".to_string())).unwrap();

        // 4. Verify Result
        let acceptance = order_task.await.unwrap().unwrap();
        assert_eq!(acceptance.order_id, "order_1");
        assert_eq!(acceptance.status, OrderStatus::Pending);
        assert_eq!(acceptance.estimated_window, "2-3 minutes");
        assert_eq!(metrics.summary("create", "orders", true).unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_failed_ledger_write_releases_reserved_stock() {
        let (order_client, mut product_rx, mut order_rx) = mocked_order_client();
        let metrics = order_client.metrics().clone();

        let order_task = tokio::spawn(async move {
            order_client
                .accept_order(OrderRequest::new("Jane", "jane@example.com", "product_1", 2))
                .await
        });

        let (_, _, responder) = expect_action(&mut product_rx).await.expect("Expected reservation");
        responder
            .send(Ok(ProductActionResult::ReserveStock(Reservation { unit_price: 5.0, remaining: 3 })))
            .unwrap();

        let (_, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        responder.send(Err(OrderError::DatabaseError("disk full".into()))).unwrap();

        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected release");
        assert_eq!(product_id, "product_1");
        assert!(matches!(action, ProductAction::ReleaseStock(2)));
        responder.send(Ok(ProductActionResult::ReleaseStock(5))).unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(result, Err(OrderError::DatabaseError("disk full".into())));
        assert_eq!(metrics.summary("create", "orders", false).unwrap().count, 1);
        assert!(metrics.summary("create", "orders", true).is_none());
    }

    #[tokio::test]
    async fn test_find_order_reports_absent_orders() {
        let (order_client, _product_rx, mut order_rx) = mocked_order_client();

        let find_task = tokio::spawn(async move { order_client.find_order("order_9".into()).await });

        let (id, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        assert_eq!(id, "order_9");
        responder.send(Ok(None)).unwrap();

        assert_eq!(find_task.await.unwrap(), Ok(None));
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_the_actors() {
        let (order_client, mut product_rx, _order_rx) = mocked_order_client();

        let result = order_client
            .accept_order(OrderRequest::new("", "not-an-email", "product_1", 0))
            .await;

        match result {
            Err(OrderError::ValidationError(msg)) => {
                assert!(msg.contains("Name is required"));
                assert!(msg.contains("valid email"));
                assert!(msg.contains("Quantity"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(product_rx.try_recv().is_err());
    }

    // --- Full system ---

    fn test_config() -> Config {
        Config { mode: RuntimeMode::Test, ..Config::default() }
    }

    async fn add_product(system: &OrderSystem, price: f64, stock: u32) -> String {
        system
            .product_client
            .create_product(ProductCreate {
                name: "Trail Bottle".into(),
                description: String::new(),
                category: Category::Standard,
                price,
                stock,
            })
            .await
            .unwrap()
    }

    fn request(product_id: &str, quantity: u32) -> OrderRequest {
        OrderRequest::new("Dana Buyer", "dana@example.com", product_id, quantity)
    }

    fn settle(system: &OrderSystem) -> Duration {
        system.schedule().total() + Duration::from_millis(500)
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_order_is_fulfilled() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;

        let acceptance = system.order_client.accept_order(request(&product_id, 3)).await.unwrap();
        let order = system.order_client.get_order(acceptance.order_id.clone()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 30.0);
        assert_eq!(system.product_client.check_stock(product_id).await.unwrap(), 7);

        // Catalog and ledger timings share one table.
        let metrics = system.product_client.metrics();
        assert_eq!(metrics.summary("create", "orders", true).unwrap().count, 1);
        assert_eq!(metrics.summary("find_one", "orders", true).unwrap().count, 1);
        assert_eq!(metrics.summary("create", "products", true).unwrap().count, 1);

        tokio::time::sleep(settle(&system)).await;

        let order = system.order_client.get_order(acceptance.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.processed_at.unwrap() <= order.completed_at.unwrap());
        assert!(order.created_at <= order.updated_at);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_orders_never_oversell() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 4.0, 5).await;

        let client = &system.order_client;
        let (a, b, c) = tokio::join!(
            client.accept_order(request(&product_id, 2)),
            client.accept_order(request(&product_id, 2)),
            client.accept_order(request(&product_id, 2)),
        );
        let results = [a, b, c];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(results
            .iter()
            .any(|r| *r == Err(OrderError::OutOfStock { requested: 2, available: 1 })));
        assert_eq!(system.product_client.check_stock(product_id).await.unwrap(), 1);

        let listed = client.list_orders(OrderFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(listed.pagination.total, 2);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_overloaded_system_rejects_without_side_effects() {
        let (gate, _clock, _memory) = gate_with(0.90);
        let system = OrderSystem::start_with(&test_config(), gate).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;

        let result = system.order_client.accept_order(request(&product_id, 1)).await;
        let err = result.unwrap_err();
        assert_eq!(err, OrderError::Overloaded { retry_after: Duration::from_secs(60) });
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        assert_eq!(system.product_client.check_stock(product_id).await.unwrap(), 10);
        let stats = system.order_client.order_stats().await.unwrap();
        assert_eq!(stats.total_orders, 0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_product_is_rejected() {
        let system = OrderSystem::start(&test_config()).await.unwrap();

        let result = system.order_client.accept_order(request("product_missing", 1)).await;
        assert_eq!(result, Err(OrderError::ProductNotFound("product_missing".into())));

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_orders_reject_further_transitions() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;
        let id = system.order_client.accept_order(request(&product_id, 1)).await.unwrap().order_id;

        tokio::time::sleep(settle(&system)).await;
        let completed = system.order_client.get_order(id.clone()).await.unwrap();

        let result = system.order_client.set_order_status(id.clone(), OrderStatus::Pending).await;
        assert_eq!(
            result,
            Err(OrderError::InvalidTransition { from: OrderStatus::Completed, to: OrderStatus::Pending })
        );

        // Reads of a settled order are stable.
        assert_eq!(system.order_client.get_order(id.clone()).await.unwrap(), completed);
        assert_eq!(system.order_client.get_order(id).await.unwrap(), completed);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_change_does_not_reprice_accepted_orders() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;
        let id = system.order_client.accept_order(request(&product_id, 3)).await.unwrap().order_id;

        system
            .product_client
            .update_product(product_id, ProductPatch { price: Some(99.0), ..Default::default() })
            .await
            .unwrap();

        tokio::time::sleep(settle(&system)).await;
        assert_eq!(system.order_client.get_order(id).await.unwrap().total_amount, 30.0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_observed_statuses_follow_the_lifecycle() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;
        let id = system.order_client.accept_order(request(&product_id, 1)).await.unwrap().order_id;

        let mut seen: Vec<OrderStatus> = Vec::new();
        for _ in 0..70 {
            let status = system.order_client.get_order(id.clone()).await.unwrap().status;
            if seen.last() != Some(&status) {
                seen.push(status);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(seen, vec![OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Completed]);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_cancel_and_stats() {
        let system = OrderSystem::start(&test_config()).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;
        let client = &system.order_client;

        let kept = client.accept_order(request(&product_id, 1)).await.unwrap().order_id;
        let cancelled = client.accept_order(request(&product_id, 2)).await.unwrap().order_id;
        client.set_order_status(cancelled.clone(), OrderStatus::Cancelled).await.unwrap();

        let stats = client.order_stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.last_24h, 2);
        assert_eq!(stats.by_status.len(), 2);
        assert_eq!(stats.by_status[0].status, OrderStatus::Pending);
        assert_eq!(stats.by_status[1].status, OrderStatus::Cancelled);
        assert_eq!(stats.by_status[1].total_amount, 20.0);

        // The cancelled order stays cancelled once its sequence wakes up.
        tokio::time::sleep(settle(&system)).await;
        assert_eq!(client.get_order(cancelled).await.unwrap().status, OrderStatus::Cancelled);
        assert_eq!(client.get_order(kept).await.unwrap().status, OrderStatus::Completed);

        let completed = client
            .list_orders(OrderFilter::status(OrderStatus::Completed), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(completed.items.len(), 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unfinished_orders_complete_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { journal_dir: Some(dir.path().to_path_buf()), ..test_config() };

        let system = OrderSystem::start(&config).await.unwrap();
        let product_id = add_product(&system, 10.0, 10).await;
        let id = system.order_client.accept_order(request(&product_id, 4)).await.unwrap().order_id;
        system.shutdown().await.unwrap();

        let system = OrderSystem::start(&config).await.unwrap();
        assert_eq!(system.order_client.get_order(id.clone()).await.unwrap().status, OrderStatus::Pending);
        assert_eq!(system.product_client.check_stock(product_id).await.unwrap(), 6);

        tokio::time::sleep(settle(&system)).await;
        let order = system.order_client.get_order(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.total_amount, 40.0);

        system.shutdown().await.unwrap();
    }
}
