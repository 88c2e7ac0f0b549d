//! Business domain entities. Pure data structures with no actor-specific concerns.

pub mod product;
pub mod order;

pub use product::*;
pub use order::*;
