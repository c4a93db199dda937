//! Visual search response types.
//!
//! The search API answers with a JSON array of product records. Every
//! field except the name is optional in practice, so the types are lenient.

use serde::{Deserialize, Serialize};

/// A product matched by visual search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric or string id, whichever the catalogue uses.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub value: Option<PriceValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceValue {
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub original: Option<f64>,
}

impl Product {
    pub fn current_price(&self) -> Option<f64> {
        self.price.as_ref()?.value?.current
    }

    /// `Price: 29.95 EUR`, or `Price: N/A` when the record has none.
    pub fn price_label(&self) -> String {
        match self.current_price() {
            Some(current) => {
                let currency = self
                    .price
                    .as_ref()
                    .and_then(|p| p.currency.as_deref())
                    .unwrap_or_default();
                format!("Price: {} {}", current, currency).trim_end().to_string()
            }
            None => "Price: N/A".to_string(),
        }
    }

    /// True when the item is discounted from its original price.
    pub fn is_on_sale(&self) -> bool {
        match self.price.as_ref().and_then(|p| p.value) {
            Some(PriceValue {
                current: Some(current),
                original: Some(original),
            }) => current < original,
            _ => false,
        }
    }
}

/// Error body returned by the API on failure: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub detail: Option<serde_json::Value>,
}

/// Parse a search response body. `null` means no results.
pub fn parse_products(body: &str) -> Result<Vec<Product>, serde_json::Error> {
    let products: Option<Vec<Product>> = serde_json::from_str(body)?;
    Ok(products.unwrap_or_default())
}

/// Pull the human-readable failure reason out of an error response body.
pub fn api_error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .map(|d| match d {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
    detail.unwrap_or_else(|| "Unknown error occurred".to_string())
}
