pub mod engine;
pub mod identification;
pub mod registry;

pub use crate::domain::model::{Location, Package};
pub use crate::domain::ports::{CourierTracker, Storage};
pub use crate::utils::error::Result;
