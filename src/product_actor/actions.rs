use crate::domain::Reservation;

/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reserves a specified amount of stock.
    ///
    /// # Arguments
    /// * `u32` - The quantity to reserve
    ///
    /// # Errors
    /// Will fail if the product is inactive or the requested amount exceeds
    /// available stock.
    ReserveStock(u32),
    /// Returns previously reserved stock.
    ReleaseStock(u32),
    /// Soft delete: the product stays on record but can no longer be ordered.
    Deactivate,
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    ReserveStock(Reservation),
    /// Stock level after the release
    ReleaseStock(u32),
    Deactivate(crate::domain::Product),
}
