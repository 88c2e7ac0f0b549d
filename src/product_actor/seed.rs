//! Starter catalog used by `ProductClient::seed_products`.

use crate::domain::{Category, ProductCreate};

pub fn sample_catalog() -> Vec<ProductCreate> {
    vec![
        ProductCreate {
            name: "EcoBottle Classic 500ml".into(),
            description: "Classic bottle made from recycled stainless steel with double-wall vacuum insulation.".into(),
            category: Category::Standard,
            price: 24.99,
            stock: 150,
        },
        ProductCreate {
            name: "EcoBottle Pro 750ml".into(),
            description: "Large capacity bottle with advanced temperature retention and an ergonomic grip.".into(),
            category: Category::Premium,
            price: 34.99,
            stock: 100,
        },
        ProductCreate {
            name: "EcoBottle Kids 350ml".into(),
            description: "Easy-grip bottle for children with a spill-proof straw lid.".into(),
            category: Category::Standard,
            price: 19.99,
            stock: 200,
        },
        ProductCreate {
            name: "EcoBottle Limited Earth Day Edition".into(),
            description: "Limited artist edition; proceeds support environmental causes.".into(),
            category: Category::LimitedEdition,
            price: 49.99,
            stock: 50,
        },
        ProductCreate {
            name: "EcoBottle Travel 1L".into(),
            description: "Extra large bottle with integrated carabiner for long trips.".into(),
            category: Category::Premium,
            price: 39.99,
            stock: 75,
        },
    ]
}
