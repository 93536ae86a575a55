use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::timestamp_or_now;
use crate::utils::error::{Result, TrackError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.courier.gr";

const NAME: &str = "Courier Center";
const DELIVERED_MARKER: &str = "ΠΑΡΑΔΟΣΗ ΣΕ ΠΑΡΑΛΗΠΤΗ";
const DATE_FORMATS: &[&str] = &["%d/%m/%Y %H:%M", "%d/%m/%Y %H:%M:%S"];

#[derive(Debug, Serialize)]
struct TrackRequest<'a> {
    awb: &'a str,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    result: Option<Shipment>,
}

#[derive(Debug, Deserialize)]
struct Shipment {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    history: Vec<Action>,
}

#[derive(Debug, Deserialize)]
struct Action {
    date: Option<String>,
    time: Option<String>,
    area: Option<String>,
    action: Option<String>,
}

impl Action {
    fn timestamp(&self) -> Option<String> {
        match (self.date.as_deref(), self.time.as_deref()) {
            (Some(date), Some(time)) => Some(format!("{} {}", date.trim(), time.trim())),
            (Some(date), None) => Some(date.trim().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CourierCenterTracker {
    client: Client,
    base_url: String,
}

impl CourierCenterTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "shipments", "track"])?;

        tracing::debug!("📡 {}: POST {}", NAME, url);
        let response = self
            .client
            .post(url)
            .json(&TrackRequest {
                awb: tracking_number,
            })
            .send()
            .await?;
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        let shipment = data.result.ok_or_else(|| TrackError::UnexpectedResponse {
            courier: NAME.to_string(),
            message: "missing 'result' object".to_string(),
        })?;
        if !shipment.found {
            return Ok(package);
        }

        package.mark_found();
        for action in shipment.history {
            let raw = action.timestamp();
            package.push_location(Location::new(
                timestamp_or_now(NAME, raw.as_deref(), DATE_FORMATS),
                action.area.unwrap_or_default(),
                action.action.unwrap_or_default(),
            ));
        }
        package.mark_delivered_by_marker(DELIVERED_MARKER);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for CourierCenterTracker {
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
    use chrono::Timelike;
    use httpmock::prelude::*;

    fn tracker(server: &MockServer) -> CourierCenterTracker {
        CourierCenterTracker::new(test_client(), server.base_url())
    }

    #[tokio::test]
    async fn test_track_found_with_seconds_fallback() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/shipments/track")
                .json_body(serde_json::json!({"awb": "12345678901"}));
            then.status(200).json_body(serde_json::json!({
                "result": {
                    "found": true,
                    "history": [
                        {"date": "04/03/2024", "time": "09:00", "area": "ΑΣΠΡΟΠΥΡΓΟΣ", "action": "ΠΑΡΑΛΑΒΗ"},
                        {"date": "05/03/2024", "time": "13:45:10", "area": "ΗΡΑΚΛΕΙΟ", "action": "ΠΑΡΑΔΟΣΗ ΣΕ ΠΑΡΑΛΗΠΤΗ"}
                    ]
                }
            }));
        });

        let package = tracker(&server).track("12345678901").await;

        api_mock.assert();
        assert!(package.found());
        assert!(package.delivered());
        assert_eq!(package.locations()[1].datetime().second(), 10);
    }

    #[tokio::test]
    async fn test_found_false_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/shipments/track");
            then.status(200).json_body(serde_json::json!({"result": {"found": false, "history": []}}));
        });

        let package = tracker(&server).track("12345678901").await;
        assert_eq!(package, Package::new("Courier Center"));
    }

    #[tokio::test]
    async fn test_missing_result_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/shipments/track");
            then.status(200).json_body(serde_json::json!({"message": "maintenance"}));
        });

        let package = tracker(&server).track("12345678901").await;
        assert!(!package.found());
    }
}
