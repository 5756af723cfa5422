//! Remote catalog source.
//!
//! The catalog is served as two independently addressable documents:
//! 1. the full course list (a JSON array of courses)
//! 2. a small "last course update" document carrying a single timestamp
//!
//! Freshness can therefore be checked without downloading the catalog.

use super::error::CatalogError;
use super::types::Course;
use crate::config::CatalogEndpoints;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Where the catalog comes from.
///
/// Implementations must not cache; [`super::CatalogCache`] owns that concern.
pub trait CatalogSource: Send + Sync {
    /// Fetches the complete course list.
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<Course>, CatalogError>> + Send;

    /// Fetches the remote "last updated" marker.
    ///
    /// `Ok(None)` means the marker document does not exist (or has no date).
    fn fetch_last_updated(
        &self,
    ) -> impl Future<Output = Result<Option<DateTime<Utc>>, CatalogError>> + Send;
}

/// Body of the last-update document.
#[derive(Debug, Deserialize)]
struct LastUpdateDocument {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

/// Catalog source backed by two HTTP JSON endpoints.
pub struct HttpCatalogSource {
    client: Client,
    catalog_url: Url,
    last_updated_url: Url,
}

impl HttpCatalogSource {
    /// Creates a new source from the configured endpoints.
    pub fn new(endpoints: &CatalogEndpoints) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("planner/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CatalogError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            catalog_url: Url::parse(&endpoints.catalog_url)?,
            last_updated_url: Url::parse(&endpoints.last_updated_url)?,
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> Result<Vec<Course>, CatalogError> {
        let start = Instant::now();
        debug!(url = %self.catalog_url, "Requesting course catalog");

        let response = self.client.get(self.catalog_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            });
        }

        // Read the whole body before decoding so a dropped connection never
        // yields a partially parsed catalog.
        let body = response.bytes().await?;
        let mut courses: Vec<Course> = serde_json::from_slice(&body)?;
        courses.sort_by(|a, b| a.id.cmp(&b.id));

        info!(
            courses = courses.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Received course catalog"
        );

        Ok(courses)
    }

    async fn fetch_last_updated(&self) -> Result<Option<DateTime<Utc>>, CatalogError> {
        let response = self
            .client
            .get(self.last_updated_url.clone())
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let document: LastUpdateDocument = response.json().await?;
                Ok(document.date)
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(CatalogError::UnexpectedResponse {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_update_document_parsing() {
        let doc: LastUpdateDocument =
            serde_json::from_str(r#"{"date":"2024-11-20T08:30:00Z"}"#).unwrap();
        assert_eq!(
            doc.date.unwrap().to_rfc3339(),
            "2024-11-20T08:30:00+00:00"
        );

        let empty: LastUpdateDocument = serde_json::from_str("{}").unwrap();
        assert!(empty.date.is_none());
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let endpoints = CatalogEndpoints {
            catalog_url: "not a url".to_string(),
            last_updated_url: "http://localhost/general/lastCourseUpdate".to_string(),
        };
        let result = HttpCatalogSource::new(&endpoints);
        assert!(matches!(result, Err(CatalogError::UrlError { .. })));
    }
}
