use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog tier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Standard,
    Premium,
    LimitedEdition,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Standard => "standard",
            Category::Premium => "premium",
            Category::LimitedEdition => "limited-edition",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Category::Standard),
            "premium" => Ok(Category::Premium),
            "limited-edition" => Ok(Category::LimitedEdition),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub stock: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub stock: u32,
}

/// Payload for updating an existing product.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub active: Option<bool>,
}

/// Catalog listing criteria. Search terms match name or description,
/// ignoring case; a product matches when any term does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn category(category: Category) -> Self {
        Self { category: Some(category), search: None }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|category| product.category != category) {
            return false;
        }

        let terms: Vec<String> = self
            .search
            .iter()
            .flat_map(|search| search.split_whitespace())
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return true;
        }

        let name = product.name.to_lowercase();
        let description = product.description.to_lowercase();
        terms
            .iter()
            .any(|term| name.contains(term.as_str()) || description.contains(term.as_str()))
    }
}

/// Outcome of a successful stock reservation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    /// Price per unit at the moment of reservation.
    pub unit_price: f64,
    /// Stock left after the decrement.
    pub remaining: u32,
}
