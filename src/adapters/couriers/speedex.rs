use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::timestamp_or_now;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.speedex.gr";

const NAME: &str = "Speedex";
const DELIVERED_MARKER: &str = "ΠΑΡΑΔΟΘΗΚΕ";
const DATE_FORMATS: &[&str] = &["%d/%m/%Y %H:%M", "%d/%m/%Y"];

#[derive(Debug, Deserialize)]
struct TrackingResponse {
    error: Option<String>,
    #[serde(default)]
    checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Deserialize)]
struct Checkpoint {
    date: Option<String>,
    branch: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpeedexTracker {
    client: Client,
    base_url: String,
}

impl SpeedexTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "tracking", tracking_number])?;

        tracing::debug!("📡 {}: GET {}", NAME, url);
        let response = ensure_success(NAME, self.client.get(url).send().await?)?;
        let data: TrackingResponse = response.json().await?;

        if let Some(error) = data.error {
            tracing::debug!("{}: {} reported '{}'", NAME, tracking_number, error);
            return Ok(package);
        }
        if data.checkpoints.is_empty() {
            return Ok(package);
        }

        package.mark_found();
        for checkpoint in data.checkpoints {
            package.push_location(Location::new(
                timestamp_or_now(NAME, checkpoint.date.as_deref(), DATE_FORMATS),
                checkpoint.branch.unwrap_or_default(),
                checkpoint.status.unwrap_or_default(),
            ));
        }
        package.mark_delivered_by_marker(DELIVERED_MARKER);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for SpeedexTracker {
    fn name(&self) -> &str {
        NAME
    }

    async fn track(&self, tracking_number: &str) -> Package {
        settle(NAME, tracking_number, self.fetch(tracking_number).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::test_client;
    use chrono::{Datelike, Timelike};
    use httpmock::prelude::*;

    fn tracker(server: &MockServer) -> SpeedexTracker {
        SpeedexTracker::new(test_client(), server.base_url())
    }

    #[tokio::test]
    async fn test_track_delivered_by_marker() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/tracking/700012345678");
            then.status(200).json_body(serde_json::json!({
                "error": null,
                "checkpoints": [
                    {"date": "04/03/2024 18:10", "branch": "ΑΘΗΝΑ - ΡΕΝΤΗ", "status": "ΠΑΡΑΛΑΒΗ ΑΠΟ ΑΠΟΣΤΟΛΕΑ"},
                    {"date": "05/03/2024", "branch": "ΘΕΣΣΑΛΟΝΙΚΗ", "status": "ΠΑΡΑΔΟΘΗΚΕ"}
                ]
            }));
        });

        let package = tracker(&server).track("700012345678").await;

        api_mock.assert();
        assert!(package.found());
        assert!(package.delivered());
        assert_eq!(package.courier_name, "Speedex");
        assert_eq!(package.locations()[0].datetime().hour(), 18);
        assert_eq!(package.locations()[1].datetime().day(), 5);
        assert_eq!(package.locations()[1].datetime().hour(), 0);
    }

    #[tokio::test]
    async fn test_error_field_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tracking/700000000000");
            then.status(200).json_body(serde_json::json!({
                "error": "Δεν βρέθηκαν αποτελέσματα",
                "checkpoints": []
            }));
        });

        let package = tracker(&server).track("700000000000").await;
        assert_eq!(package, Package::new("Speedex"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/tracking/700012345678");
            then.status(200).body("<html>maintenance</html>");
        });

        let package = tracker(&server).track("700012345678").await;
        assert!(!package.found());
    }
}
