use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, Reservation};
use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;

const MAX_NAME_LEN: usize = 100;

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    const KIND: &'static str = "product";

    fn id(&self) -> &String { &self.id }

    /// Creates a new, active Product from creation parameters.
    ///
    /// # Errors
    /// Rejects an empty or overlong name and a negative or non-finite price.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        let name = validate_name(&params.name)?;
        validate_price(params.price)?;

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            description: params.description,
            category: params.category,
            price: params.price,
            stock: params.stock,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the set fields of the patch.
    ///
    /// Price changes never touch orders already accepted; their totals were
    /// fixed at reservation time.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(name) = patch.name {
            self.name = validate_name(&name)?;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.touch();
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `ReserveStock(amount)`: Decrements stock and reports the unit price
    /// - `ReleaseStock(amount)`: Adds stock back after a failed order write
    /// - `Deactivate`: Marks the product inactive
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::ReserveStock(amount) => {
                if !self.active {
                    return Err(ProductError::NotFound(self.id.clone()));
                }
                if amount == 0 {
                    return Err(ProductError::InvalidQuantity(amount));
                }
                if self.stock < amount {
                    return Err(ProductError::InsufficientStock {
                        requested: amount,
                        available: self.stock,
                    });
                }
                self.stock -= amount;
                self.touch();
                Ok(ProductActionResult::ReserveStock(Reservation {
                    unit_price: self.price,
                    remaining: self.stock,
                }))
            }
            ProductAction::ReleaseStock(amount) => {
                self.stock = self
                    .stock
                    .checked_add(amount)
                    .ok_or(ProductError::InvalidQuantity(amount))?;
                self.touch();
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
            ProductAction::Deactivate => {
                self.active = false;
                self.touch();
                Ok(ProductActionResult::Deactivate(self.clone()))
            }
        }
    }
}

impl Product {
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

fn validate_name(name: &str) -> Result<String, ProductError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductError::ValidationError("Product name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProductError::ValidationError(format!(
            "Product name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_price(price: f64) -> Result<(), ProductError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ProductError::ValidationError(format!("Invalid price: {price}")));
    }
    Ok(())
}
