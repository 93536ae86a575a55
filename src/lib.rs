pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TrackerConfig};

pub use app::history::{HistoryEntry, HistoryStore};
pub use core::{
    engine::{SearchOutcome, SearchPlan, TrackingEngine},
    identification::identify,
    registry::CourierRegistry,
};
pub use domain::model::{Location, Package};
pub use domain::ports::CourierTracker;
pub use utils::error::{Result, TrackError};
