use crate::adapters::couriers::settle;
use crate::adapters::http::{endpoint, ensure_success};
use crate::domain::model::{Location, Package};
use crate::domain::ports::CourierTracker;
use crate::utils::datetime::timestamp_or_now;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://www.elta-courier.gr";

const NAME: &str = "ELTA";
const DELIVERED_MARKER: &str = "Η αποστολή παραδόθηκε";
const DATE_FORMATS: &[&str] = &["%d-%m-%Y %H:%M", "%d-%m-%Y"];

#[derive(Debug, Deserialize)]
struct TrackResponse {
    result: Option<Shipments>,
}

// PHP 會把空的 map 編成 []
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Shipments {
    Keyed(HashMap<String, Shipment>),
    Empty(Vec<serde_json::Value>),
}

impl Shipments {
    fn take(self, tracking_number: &str) -> Option<Shipment> {
        match self {
            Shipments::Keyed(mut shipments) => shipments.remove(tracking_number),
            Shipments::Empty(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Shipment {
    /// Only an explicit `0` means "unknown number".
    status: Option<i64>,
    #[serde(default)]
    result: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    date: Option<String>,
    time: Option<String>,
    place: Option<String>,
    status: Option<String>,
}

impl Event {
    // ELTA 偶爾只給小時 ("14:")，補上分鐘
    fn timestamp(&self) -> Option<String> {
        let date = self.date.as_deref()?.trim();
        let time = self.time.as_deref().unwrap_or("").trim();
        if time.is_empty() {
            return Some(date.to_string());
        }
        if time.ends_with(':') {
            return Some(format!("{} {}00", date, time));
        }
        Some(format!("{} {}", date, time))
    }
}

/// ELTA Courier tracking form (POST, JSON keyed by tracking number).
#[derive(Debug, Clone)]
pub struct EltaTracker {
    client: Client,
    base_url: String,
}

impl EltaTracker {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, tracking_number: &str) -> Result<Package> {
        let mut package = Package::new(NAME);
        let url = endpoint(&self.base_url, &["track.php"])?;

        tracing::debug!("📡 {}: POST {}", NAME, url);
        let response = self
            .client
            .post(url)
            .form(&[("number", tracking_number)])
            .send()
            .await?;
        let data: TrackResponse = ensure_success(NAME, response)?.json().await?;

        let Some(shipment) = data
            .result
            .and_then(|shipments| shipments.take(tracking_number))
        else {
            return Ok(package);
        };
        if shipment.status == Some(0) {
            return Ok(package);
        }

        package.mark_found();
        for event in shipment.result {
            let raw = event.timestamp();
            package.push_location(Location::new(
                timestamp_or_now(NAME, raw.as_deref(), DATE_FORMATS),
                event.place.unwrap_or_default(),
                event.status.unwrap_or_default(),
            ));
        }
        package.mark_delivered_by_marker(DELIVERED_MARKER);

        Ok(package)
    }
}

#[async_trait]
impl CourierTracker for EltaTracker {
    fn name(&self) -> &str {
        NAME
    }

    async fn track(&self, tracking_number: &str) -> Package {
        settle(NAME, tracking_number, self.fetch(tracking_number).await)
    }
}
