//! HTTP client for the visual search endpoint.
//!
//! The crop is uploaded as a multipart form; the endpoint replies with
//! matching products. Authentication is the caller's business: a bearer
//! token is passed in with every call.

use super::types::{api_error_detail, parse_products, Product};
use crate::capture::EncodedImage;
use crate::settings::SnipSettings;
use std::time::Duration;

const VISUAL_SEARCH_PATH: &str = "search/visual/";
const UPLOAD_FIELD: &str = "file";
const UPLOAD_FILENAME: &str = "selection.jpg";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Session expired, log in again")]
    Unauthorized,

    #[error("Visual search failed ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid search response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct VisualSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl VisualSearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &SnipSettings) -> Result<Self, SearchError> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, VISUAL_SEARCH_PATH)
    }

    /// Upload a cropped selection and return the products that match it.
    pub async fn search_by_upload(
        &self,
        token: &str,
        image: &EncodedImage,
    ) -> Result<Vec<Product>, SearchError> {
        let start = std::time::Instant::now();
        log::info!(
            "[SEARCH] Uploading {}x{} selection ({} bytes)",
            image.dimensions().0,
            image.dimensions().1,
            image.len()
        );

        let part = reqwest::multipart::Part::bytes(image.bytes().to_vec())
            .file_name(UPLOAD_FILENAME)
            .mime_str(image.mime_type())?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let products = read_products(response).await?;
        log::info!(
            "[SEARCH] {} products in {}ms",
            products.len(),
            start.elapsed().as_millis()
        );
        Ok(products)
    }

    /// Search by an image already hosted somewhere.
    pub async fn search_by_url(
        &self,
        token: &str,
        image_url: &str,
    ) -> Result<Vec<Product>, SearchError> {
        let start = std::time::Instant::now();
        log::info!("[SEARCH] Searching by image URL: {}", image_url);

        let response = self
            .http
            .get(self.endpoint())
            .query(&[("image_url", image_url)])
            .bearer_auth(token)
            .send()
            .await?;

        let products = read_products(response).await?;
        log::info!(
            "[SEARCH] {} products in {}ms",
            products.len(),
            start.elapsed().as_millis()
        );
        Ok(products)
    }
}

async fn read_products(response: reqwest::Response) -> Result<Vec<Product>, SearchError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        log::warn!("[SEARCH] Token rejected (401)");
        return Err(SearchError::Unauthorized);
    }

    let body = response.text().await?;
    if !status.is_success() {
        let detail = api_error_detail(&body);
        log::error!("[SEARCH] API returned {}: {}", status, detail);
        return Err(SearchError::Api {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(parse_products(&body)?)
}
