use crate::domain::model::Package;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A courier backend adapter.
///
/// `track` never fails: transport errors, bad responses and "not found"
/// answers all come back as an empty [`Package`] stamped with the courier's
/// display name. Implementations hold no per-call state, so one instance can
/// serve concurrent lookups.
#[async_trait]
pub trait CourierTracker: Send + Sync {
    /// Display name stamped on every returned package.
    fn name(&self) -> &str;

    async fn track(&self, tracking_number: &str) -> Package;
}
