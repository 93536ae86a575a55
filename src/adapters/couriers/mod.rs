//! One adapter per courier backend.
//!
//! Each adapter does its own request/parse work in a private `fetch` that
//! returns `Result<Package>`; the public `track` funnels that through
//! [`settle`] so errors never escape.

pub mod acs;
pub mod boxnow;
pub mod couriercenter;
pub mod easymail;
pub mod elta;
pub mod geniki;
pub mod skroutz;
pub mod speedex;

pub use acs::AcsTracker;
pub use boxnow::BoxNowTracker;
pub use couriercenter::CourierCenterTracker;
pub use easymail::EasyMailTracker;
pub use elta::EltaTracker;
pub use geniki::GenikiTracker;
pub use skroutz::SkroutzTracker;
pub use speedex::SpeedexTracker;

use crate::domain::model::Package;
use crate::domain::ports::CourierTracker;
use crate::utils::error::Result;
use reqwest::Client;
use std::sync::Arc;

/// Identifiers of every courier shipped with the crate, in registration order.
pub const COURIER_IDS: &[&str] = &[
    "acs",
    "boxnow",
    "couriercenter",
    "easymail",
    "elta",
    "geniki",
    "skroutz",
    "speedex",
];

/// Builds the adapter registered under `id`, or `None` for an unknown id.
pub fn build_tracker(
    id: &str,
    client: Client,
    base_url: Option<&str>,
) -> Option<Arc<dyn CourierTracker>> {
    let tracker: Arc<dyn CourierTracker> = match id {
        "acs" => Arc::new(AcsTracker::new(client, base_url.unwrap_or(acs::DEFAULT_BASE_URL))),
        "boxnow" => Arc::new(BoxNowTracker::new(
            client,
            base_url.unwrap_or(boxnow::DEFAULT_BASE_URL),
        )),
        "couriercenter" => Arc::new(CourierCenterTracker::new(
            client,
            base_url.unwrap_or(couriercenter::DEFAULT_BASE_URL),
        )),
        "easymail" => Arc::new(EasyMailTracker::new(
            client,
            base_url.unwrap_or(easymail::DEFAULT_BASE_URL),
        )),
        "elta" => Arc::new(EltaTracker::new(client, base_url.unwrap_or(elta::DEFAULT_BASE_URL))),
        "geniki" => Arc::new(GenikiTracker::new(
            client,
            base_url.unwrap_or(geniki::DEFAULT_BASE_URL),
        )),
        "skroutz" => Arc::new(SkroutzTracker::new(
            client,
            base_url.unwrap_or(skroutz::DEFAULT_BASE_URL),
        )),
        "speedex" => Arc::new(SpeedexTracker::new(
            client,
            base_url.unwrap_or(speedex::DEFAULT_BASE_URL),
        )),
        _ => return None,
    };
    Some(tracker)
}

/// 失敗一律降級為「查無此件」，細節只留在日誌
pub(crate) fn settle(courier: &str, tracking_number: &str, outcome: Result<Package>) -> Package {
    match outcome {
        Ok(package) => {
            tracing::debug!(
                "{}: {} found={} locations={}",
                courier,
                tracking_number,
                package.found(),
                package.locations().len()
            );
            package
        }
        Err(e) => {
            tracing::warn!("❌ Error tracking {} package {}: {}", courier, tracking_number, e);
            Package::new(courier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::test_client;

    #[test]
    fn test_every_known_id_builds_a_tracker() {
        for id in COURIER_IDS {
            assert!(build_tracker(id, test_client(), None).is_some(), "{}", id);
        }
        assert!(build_tracker("dhl", test_client(), None).is_none());
    }

    #[test]
    fn test_settle_degrades_errors_to_empty_package() {
        let err = crate::utils::error::TrackError::HttpStatus {
            courier: "ACS".to_string(),
            status: 503,
        };
        let package = settle("ACS", "1234567890", Err(err));
        assert_eq!(package, Package::new("ACS"));
    }
}
