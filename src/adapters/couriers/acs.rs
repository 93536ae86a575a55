use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::{timestamp_or_now, RFC3339};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.acscourier.net";

const NAME: &str = "ACS";
const NOT_FOUND_NOTE: &str = "Η αποστολή δεν βρέθηκε";
const DATE_FORMATS: &[&str] = &[RFC3339, "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Parcel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Parcel {
    notes: Option<String>,
    #[serde(default)]
    is_delivered: bool,
    #[serde(default)]
    status_history: Vec<ControlPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlPoint {
    control_point_date: Option<String>,
    control_point: Option<String>,
    description: Option<String>,
}

/// ACS public parcel search (REST GET, JSON).
#[derive(Debug, Clone)]
pub struct AcsTracker {
    client: Client,
    base_url: String,
}

impl AcsTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "parcels", "search", tracking_number])?;

        tracing::debug!("📡 {}: GET {}", NAME, url);
        let response = ensure_success(NAME, self.client.get(url).send().await?)?;
        let data: SearchResponse = response.json().await?;

        let Some(parcel) = data.items.into_iter().next() else {
            return Ok(package);
        };
        if parcel.notes.as_deref() == Some(NOT_FOUND_NOTE) {
            return Ok(package);
        }

        package.mark_found();
        for point in parcel.status_history {
            package.push_location(Location::new(
                timestamp_or_now(NAME, point.control_point_date.as_deref(), DATE_FORMATS),
                point.control_point.unwrap_or_default(),
                point.description.unwrap_or_default(),
            ));
        }
        package.set_delivered(parcel.is_delivered);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for AcsTracker {
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

    fn tracker(server: &MockServer) -> AcsTracker {
        AcsTracker::new(test_client(), server.base_url())
    }

    #[tokio::test]
    async fn test_track_found_package() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/parcels/search/7401234567")
                .header("user-agent", "parcel-track-tests");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "items": [{
                        "notes": null,
                        "isDelivered": true,
                        "statusHistory": [
                            {"controlPointDate": "2024-03-05T09:15:00", "controlPoint": "ΑΘΗΝΑ", "description": "Παραλαβή αποστολής"},
                            {"controlPointDate": "2024-03-06T11:40:00.123", "controlPoint": "ΠΑΤΡΑ", "description": "Παράδοση"}
                        ]
                    }]
                }));
        });

        let package = tracker(&server).track("7401234567").await;

        api_mock.assert();
        assert!(package.found());
        assert!(package.delivered());
        assert_eq!(package.courier_name, "ACS");
        assert_eq!(package.locations().len(), 2);
        assert_eq!(package.locations()[0].location(), "ΑΘΗΝΑ");
        assert_eq!(package.locations()[0].datetime().hour(), 9);
        assert_eq!(package.locations()[1].description(), "Παράδοση");
    }

    #[tokio::test]
    async fn test_track_not_found_note() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/parcels/search/0000000000");
            then.status(200).json_body(serde_json::json!({
                "items": [{"notes": "Η αποστολή δεν βρέθηκε", "isDelivered": false, "statusHistory": []}]
            }));
        });

        let package = tracker(&server).track("0000000000").await;
        assert_eq!(package, Package::new("ACS"));
    }

    #[tokio::test]
    async fn test_track_empty_items_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/parcels/search/1111111111");
            then.status(200).json_body(serde_json::json!({"items": []}));
        });

        let package = tracker(&server).track("1111111111").await;
        assert!(!package.found());
    }

    #[tokio::test]
    async fn test_track_server_error_degrades_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/parcels/search/7401234567");
            then.status(500);
        });

        let package = tracker(&server).track("7401234567").await;
        assert!(!package.found());
        assert!(package.locations().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_and_missing_dates_are_kept() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/parcels/search/7401234567");
            then.status(200).json_body(serde_json::json!({
                "items": [{
                    "isDelivered": false,
                    "statusHistory": [
                        {"controlPointDate": "τρίτη", "controlPoint": "ΑΘΗΝΑ", "description": "Σε μεταφορά"},
                        {"controlPoint": "ΠΑΤΡΑ", "description": "Στο κατάστημα"}
                    ]
                }]
            }));
        });

        let package = tracker(&server).track("7401234567").await;
        assert!(package.found());
        assert!(!package.delivered());
        assert_eq!(package.locations().len(), 2);
        assert_eq!(package.locations()[1].description(), "Στο κατάστημα");
    }
}
