// src/services/metrics_manager.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::calculator::CalculatorKind;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MetricsData {
    /// How each chat message was handled (llm, calculator, ...).
    pub route_usage: HashMap<String, u64>,
    pub calculator_usage: HashMap<String, u64>,
    pub estimates_completed: u64,
    pub leads: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment_route(&self, route: &str) {
        let mut data = self.inner.write().await;
        *data.route_usage.entry(route.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_calculator(&self, kind: CalculatorKind) {
        let mut data = self.inner.write().await;
        *data.calculator_usage.entry(kind.as_str().to_string()).or_insert(0) += 1;
    }

    pub async fn record_estimate(&self) {
        self.inner.write().await.estimates_completed += 1;
    }

    pub async fn record_lead(&self) {
        self.inner.write().await.leads += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
