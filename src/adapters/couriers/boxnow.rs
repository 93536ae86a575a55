use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::{timestamp_or_now, RFC3339};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api-production.boxnow.gr";

const NAME: &str = "BoxNow";
const DELIVERED_STATE: &str = "delivered";
const DATE_FORMATS: &[&str] = &[RFC3339, "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default)]
    data: Vec<Parcel>,
}

#[derive(Debug, Deserialize)]
struct Parcel {
    state: Option<String>,
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    create_time: Option<String>,
    location_display_name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// BoxNow 只回傳事件代碼，轉成可讀的描述
fn describe(kind: &str) -> String {
    match kind {
        "new" => "Order created".to_string(),
        "in-depot" => "At depot".to_string(),
        "final-destination" => "Ready for pickup at locker".to_string(),
        "delivered" => "Delivered".to_string(),
        "returned" => "Returned to sender".to_string(),
        "expired" => "Pickup window expired".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BoxNowTracker {
    client: Client,
    base_url: String,
}

impl BoxNowTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["api", "v1", "parcels", "track"])?;

        tracing::debug!("📡 {}: GET {}?parcelId={}", NAME, url, tracking_number);
        let response = self
            .client
            .get(url)
            .query(&[("parcelId", tracking_number)])
            .send()
            .await?;
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        let Some(parcel) = data.data.into_iter().next() else {
            return Ok(package);
        };

        package.mark_found();
        for event in parcel.events {
            package.push_location(Location::new(
                timestamp_or_now(NAME, event.create_time.as_deref(), DATE_FORMATS),
                event.location_display_name.unwrap_or_default(),
                describe(event.kind.as_deref().unwrap_or_default()),
            ));
        }
        package.set_delivered(parcel.state.as_deref() == Some(DELIVERED_STATE));

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for BoxNowTracker {
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
    use httpmock::prelude::*;

    fn tracker(server: &MockServer) -> BoxNowTracker {
        BoxNowTracker::new(test_client(), server.base_url())
    }

    #[tokio::test]
    async fn test_track_translates_event_types() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/parcels/track")
                .query_param("parcelId", "9123456789");
            then.status(200).json_body(serde_json::json!({
                "data": [{
                    "parcelId": "9123456789",
                    "state": "final-destination",
                    "events": [
                        {"createTime": "2024-03-05T07:00:00.000Z", "locationDisplayName": "Κέντρο Διαλογής", "type": "in-depot"},
                        {"createTime": "2024-03-05T15:30:00.000Z", "locationDisplayName": "Locker Σύνταγμα", "type": "final-destination"}
                    ]
                }]
            }));
        });

        let package = tracker(&server).track("9123456789").await;

        api_mock.assert();
        assert!(package.found());
        assert!(!package.delivered());
        assert_eq!(package.locations()[0].description(), "At depot");
        assert_eq!(package.locations()[1].description(), "Ready for pickup at locker");
        assert_eq!(package.locations()[1].location(), "Locker Σύνταγμα");
    }

    #[tokio::test]
    async fn test_delivered_state() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/parcels/track");
            then.status(200).json_body(serde_json::json!({
                "data": [{
                    "state": "delivered",
                    "events": [{"createTime": "2024-03-06T10:00:00Z", "locationDisplayName": "Locker", "type": "delivered"}]
                }]
            }));
        });

        let package = tracker(&server).track("9123456789").await;
        assert!(package.delivered());
        assert_eq!(package.locations()[0].description(), "Delivered");
    }

    #[tokio::test]
    async fn test_empty_data_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/parcels/track");
            then.status(200).json_body(serde_json::json!({"data": []}));
        });

        let package = tracker(&server).track("9000000000").await;
        assert_eq!(package, Package::new("BoxNow"));
    }
}
