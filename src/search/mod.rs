//! Visual search domain: public API.
//!
//! Sends a cropped selection (or an image URL) to the product search API
//! and decodes the matching products.

mod client;
pub mod types;

pub use client::{SearchError, VisualSearchClient};
pub use types::{parse_products, Price, PriceValue, Product};
