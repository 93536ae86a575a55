use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::timestamp_or_now;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.easymail.gr";

const NAME: &str = "EasyMail";
const DELIVERED_MARKER: &str = "Παραδόθηκε";
const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackResponse {
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    tracking_details: Vec<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Detail {
    date_time: Option<String>,
    location: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EasyMailTracker {
    client: Client,
    base_url: String,
}

impl EasyMailTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "track"])?;

        tracing::debug!("📡 {}: GET {}?awb={}", NAME, url, tracking_number);
        let response = self
            .client
            .get(url)
            .query(&[("awb", tracking_number)])
            .send()
            .await?;
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        if data.status_code == 0 {
            return Ok(package);
        }

        package.mark_found();
        for detail in data.tracking_details {
            package.push_location(Location::new(
                timestamp_or_now(NAME, detail.date_time.as_deref(), DATE_FORMATS),
                detail.location.unwrap_or_default(),
                detail.status.unwrap_or_default(),
            ));
        }
        package.mark_delivered_by_marker(DELIVERED_MARKER);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for EasyMailTracker {
    fn name(&self) -> &str {
        NAME
    }

    async fn track(&self, tracking_number: &str) -> Package {
        settle(NAME, tracking_number, self.fetch(tracking_number).await)
    }
}
