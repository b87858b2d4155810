use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::ScrapeError;

/// Price as reported by the scraper: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

/// A product record returned by the scraping API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub link: String,
}

impl Product {
    /// Placeholder returned in place of the results when a query fails.
    pub fn error_record() -> Self {
        Self {
            name: "Error".to_string(),
            price: Some(Price::Text("N/A".to_string())),
            link: String::new(),
        }
    }
}

/// Anything that can turn a query into a list of products.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ScrapeError>;

    /// Run `search`, substituting the single error record for any failure.
    async fn fetch_products(&self, query: &str) -> Vec<Product> {
        match self.search(query).await {
            Ok(products) => products,
            Err(e) => {
                error!("Product query {:?} failed: {}", query, e);
                vec![Product::error_record()]
            }
        }
    }
}

pub struct ScrapeClient {
    endpoint: Url,
    store_name: String,
    client: reqwest::Client,
}

impl ScrapeClient {
    pub fn new(base_url: &Url, store_name: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let endpoint = base_url.join("/api/scrape")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            store_name: store_name.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProductSource for ScrapeClient {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ScrapeError> {
        let request_body = json!({
            "storeName": self.store_name,
            "query": query,
        });

        debug!("Sending request to {}: {}", self.endpoint, request_body);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Scrape request failed with status {}", status);
            return Err(ScrapeError::Status { status, body });
        }

        debug!("Received response from scraper: {}", body);

        let products: Vec<Product> = serde_json::from_str(&body)?;
        Ok(products)
    }
}
