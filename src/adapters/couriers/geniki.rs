use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::{timestamp_or_now, RFC3339};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.taxydromiki.com";

const NAME: &str = "Geniki Taxydromiki";
const NOT_FOUND_STATUS: &str = "not_found";
const DATE_FORMATS: &[&str] = &[RFC3339, "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Serialize)]
struct TrackRequest<'a> {
    tracking_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    status: Option<String>,
    #[serde(default)]
    delivered: bool,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    timestamp: Option<String>,
    shop: Option<String>,
    description: Option<String>,
}

/// Geniki Taxydromiki tracking API (JSON POST).
///
/// The backend lists events newest first; they are kept in that order.
#[derive(Debug, Clone)]
pub struct GenikiTracker {
    client: Client,
    base_url: String,
}

impl GenikiTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "track"])?;

        tracing::debug!("📡 {}: POST {}", NAME, url);
        let response = self
            .client
            .post(url)
            .json(&TrackRequest { tracking_number })
            .send()
            .await?;
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        if data.status.as_deref() == Some(NOT_FOUND_STATUS) || data.events.is_empty() {
            return Ok(package);
        }

        package.mark_found();
        for event in data.events {
            package.push_location(Location::new(
                timestamp_or_now(NAME, event.timestamp.as_deref(), DATE_FORMATS),
                event.shop.unwrap_or_default(),
                event.description.unwrap_or_default(),
            ));
        }
        package.set_delivered(data.delivered);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for GenikiTracker {
    fn name(&self) -> &str {
        NAME
    }

    async fn track(&self, tracking_number: &str) -> Package {
        settle(NAME, tracking_number, self.fetch(tracking_number).await)
    }
}
