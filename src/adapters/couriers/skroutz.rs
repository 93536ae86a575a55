use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::{timestamp_or_now, RFC3339};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.skroutzlastmile.gr";

const NAME: &str = "Skroutz Last Mile";
const DATE_FORMATS: &[&str] = &[RFC3339, "%d/%m/%Y %H:%M"];

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default)]
    delivered: bool,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    timestamp: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SkroutzTracker {
    client: Client,
    base_url: String,
}

impl SkroutzTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let file_name = format!("{}.json", tracking_number);
        let url = endpoint(&self.base_url, &["track", &file_name])?;

        tracing::debug!("📡 {}: GET {}", NAME, url);
        let response = self.client.get(url).send().await?;

        // 404 是 Skroutz 的「查無此件」
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(package);
        }
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        if data.steps.is_empty() {
            return Ok(package);
        }

        package.mark_found();
        for step in data.steps {
            package.push_location(Location::new(
                timestamp_or_now(NAME, step.timestamp.as_deref(), DATE_FORMATS),
                step.location.unwrap_or_default(),
                step.description.unwrap_or_default(),
            ));
        }
        package.set_delivered(data.delivered);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for SkroutzTracker {
    fn name(&self) -> &str {
        NAME
    }

    async fn track(&self, tracking_number: &str) -> Package {
        settle(NAME, tracking_number, self.fetch(tracking_number).await)
    }
}
