use tracing::{debug, info, instrument, warn};
use crate::domain::{Product, ProductCreate, ProductFilter, ProductPatch, Reservation};
use crate::metrics::OperationMetrics;
use crate::product_actor::{seed, ProductAction, ProductActionResult, ProductError};
use crate::actor_framework::ResourceClient;
use super::{paginate, Page, PageRequest};

const COLLECTION: &str = "products";

/// Client for the Product actor: catalog reads and writes plus the inventory
/// guard used by order intake.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    metrics: OperationMetrics,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self::with_metrics(inner, OperationMetrics::default())
    }

    pub fn with_metrics(inner: ResourceClient<Product>, metrics: OperationMetrics) -> Self {
        Self { inner, metrics }
    }

    /// Timings of catalog calls made through this client and its clones.
    pub fn metrics(&self) -> &OperationMetrics {
        &self.metrics
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        let id = self.metrics.time("create", COLLECTION, self.inner.create(params)).await?;
        info!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Active product by id. Deactivated products read as not found.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: String) -> Result<Product, ProductError> {
        debug!("Sending request");
        match self.metrics.time("find_one", COLLECTION, self.inner.get(id.clone())).await? {
            Some(product) if product.active => Ok(product),
            _ => Err(ProductError::NotFound(id)),
        }
    }

    /// Active products matching `filter`, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductError> {
        debug!("Sending request");
        let query = self.inner.query(move |p: &Product| p.active && filter.matches(p));
        let mut products = self.metrics.time("find", COLLECTION, query).await?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(products, page))
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        let product = self.metrics.time("update", COLLECTION, self.inner.update(id, patch)).await?;
        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn deactivate_product(&self, id: String) -> Result<Product, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::Deactivate).await {
            Ok(ProductActionResult::Deactivate(product)) => {
                info!(product_id = %product.id, "Product deactivated");
                Ok(product)
            }
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        self.get_product(id).await.map(|product| product.stock)
    }

    /// Takes `quantity` units out of stock in a single actor step and returns
    /// the unit price the order must be charged.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: String, quantity: u32) -> Result<Reservation, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::ReserveStock(quantity)).await {
            Ok(ProductActionResult::ReserveStock(reservation)) => Ok(reservation),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Puts `quantity` units back. Returns the new stock level.
    #[instrument(skip(self))]
    pub async fn release_stock(&self, id: String, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::ReleaseStock(quantity)).await {
            Ok(ProductActionResult::ReleaseStock(level)) => Ok(level),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Loads the starter catalog into an empty store. Returns the number of
    /// products in the catalog afterwards.
    #[instrument(skip(self))]
    pub async fn seed_products(&self) -> Result<usize, ProductError> {
        let existing = self.inner.query(|_: &Product| true).await?.len();
        if existing > 0 {
            warn!(count = existing, "Products already seeded");
            return Ok(existing);
        }

        let catalog = seed::sample_catalog();
        let count = catalog.len();
        for params in catalog {
            self.inner.create(params).await?;
        }
        info!(count, "Products seeded successfully");
        Ok(count)
    }
}

impl_client_methods!(ProductClient, Product, ProductError, product);
