//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to assert behavior.

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use tokio::sync::mpsc;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Client logic such as `OrderClient::accept_order` talks to two actors in a
/// fixed order. Instead of spinning up real `ResourceActor`s, the test owns
/// the receiving end of the channel, inspects each request as it arrives and
/// answers it with whatever success or failure the scenario needs.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T::Id, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request.
///
/// The filter is handed back so the test can run it against its own fixtures.
pub async fn expect_query<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(crate::actor_framework::Filter<T>, Response<Vec<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Query { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{PageRequest, ProductClient};
    use crate::domain::{Category, Product, ProductCreate, ProductFilter};
    use chrono::Utc;

    fn product(id: &str, category: Category, active: bool) -> Product {
        Product {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            category,
            price: 1.0,
            stock: 1,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        // Test Create
        let create_task = tokio::spawn(async move {
            let params = ProductCreate {
                name: "Test".to_string(),
                description: String::new(),
                category: Category::Standard,
                price: 5.0,
                stock: 3,
            };
            client.create(params).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        responder.send(Ok("product_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("product_1".to_string()));
    }

    #[tokio::test]
    async fn test_list_products_sends_one_filtered_query() {
        let (inner, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let list_task = tokio::spawn(async move {
            client.list_products(ProductFilter::category(Category::Premium), PageRequest::default()).await
        });

        let (filter, responder) = expect_query(&mut receiver).await.expect("Expected Query request");
        assert!(filter(&product("a", Category::Premium, true)));
        assert!(!filter(&product("b", Category::Premium, false)));
        assert!(!filter(&product("c", Category::Standard, true)));
        responder.send(Ok(vec![product("a", Category::Premium, true)])).unwrap();

        let page = list_task.await.unwrap().unwrap();
        assert_eq!(page.pagination.total, 1);
    }
}
