use crate::core::identification::{identify, normalize};
use crate::core::registry::CourierRegistry;
use crate::domain::model::Package;
use crate::domain::ports::CourierTracker;
use crate::utils::error::{Result, TrackError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Couriers an undirected search will ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// `true` when the candidates came from the number's format,
    /// `false` when falling back to every registered courier.
    pub detected: bool,
    pub couriers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Matched { courier: String, package: Package },
    Exhausted { queried: Vec<String> },
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, SearchOutcome::Matched { .. })
    }

    /// 查無結果時回傳空包裹
    pub fn into_package(self) -> Package {
        match self {
            SearchOutcome::Matched { package, .. } => package,
            SearchOutcome::Exhausted { .. } => Package::new(""),
        }
    }
}

/// Resolves tracking numbers against the courier registry.
pub struct TrackingEngine {
    registry: Arc<CourierRegistry>,
    call_timeout: Duration,
}

impl TrackingEngine {
    pub fn new(registry: Arc<CourierRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
        }
    }

    pub fn registry(&self) -> &CourierRegistry {
        &self.registry
    }

    /// Asks exactly one courier. A not-found answer is returned as is.
    ///
    /// The courier receives the number in the same normalized form that
    /// [`identify`] matches against.
    pub async fn track_directed(&self, tracking_number: &str, courier: &str) -> Result<Package> {
        let tracker = self
            .registry
            .get(courier)
            .ok_or_else(|| TrackError::UnknownCourier {
                name: courier.to_string(),
            })?;

        let number = normalize(tracking_number);
        tracing::info!("🔍 Tracking {} with {}", number, tracker.name());
        Ok(query(tracker, number, self.call_timeout).await)
    }

    pub fn plan(&self, tracking_number: &str) -> SearchPlan {
        let detected: Vec<String> = identify(tracking_number)
            .into_iter()
            .filter(|courier| self.registry.contains(courier))
            .collect();

        if detected.is_empty() {
            SearchPlan {
                detected: false,
                couriers: self
                    .registry
                    .list_all()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }
        } else {
            SearchPlan {
                detected: true,
                couriers: detected,
            }
        }
    }

    /// Queries every candidate concurrently and returns the first courier
    /// that reports the package.
    ///
    /// Lookups still running when a match arrives are left to finish in the
    /// background; their results are dropped.
    pub async fn search(&self, tracking_number: &str) -> SearchOutcome {
        let plan = self.plan(tracking_number);
        self.search_couriers(tracking_number, &plan.couriers).await
    }

    pub async fn search_couriers(&self, tracking_number: &str, couriers: &[String]) -> SearchOutcome {
        let normalized = normalize(tracking_number);
        let tracking_number = normalized.as_str();
        let (tx, mut rx) = mpsc::channel(couriers.len().max(1));
        let mut queried = Vec::with_capacity(couriers.len());

        for courier in couriers {
            let Some(tracker) = self.registry.get(courier) else {
                tracing::warn!("Skipping unregistered courier {}", courier);
                continue;
            };
            queried.push(courier.clone());

            let tx = tx.clone();
            let courier = courier.clone();
            let number = tracking_number.to_string();
            let limit = self.call_timeout;
            tokio::spawn(async move {
                let package = query(tracker, number, limit).await;
                // 已有結果時接收端已關閉，送出失敗可忽略
                let _ = tx.send((courier, package)).await;
            });
        }
        // 只剩各任務持有 sender，全部結束後 recv 回傳 None
        drop(tx);

        tracing::info!(
            "📡 Searching {} across {} couriers",
            tracking_number,
            queried.len()
        );

        let mut remaining = queried.len();
        while let Some((courier, package)) = rx.recv().await {
            remaining = remaining.saturating_sub(1);
            if package.found() {
                tracing::info!("✅ {} found by {}", tracking_number, courier);
                return SearchOutcome::Matched { courier, package };
            }
            tracing::debug!("{} not found by {} ({} pending)", tracking_number, courier, remaining);
        }

        tracing::info!("❌ {} not found by any queried courier", tracking_number);
        SearchOutcome::Exhausted { queried }
    }

    pub async fn track_undirected(&self, tracking_number: &str) -> Package {
        self.search(tracking_number).await.into_package()
    }
}

async fn query(tracker: Arc<dyn CourierTracker>, tracking_number: String, limit: Duration) -> Package {
    match tokio::time::timeout(limit, tracker.track(&tracking_number)).await {
        Ok(package) => package,
        Err(_) => {
            tracing::warn!("⏱️ {} timed out after {:?}", tracker.name(), limit);
            Package::new(tracker.name())
        }
    }
}
