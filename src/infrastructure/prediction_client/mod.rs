pub mod http;

use crate::domain::error::Result;
use crate::domain::features::FeatureVector;
use crate::domain::prediction::PredictionResult;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpPredictionClient;

/// Outbound side of the gateway: the external prediction service.
#[async_trait]
pub trait PredictionForwarder: Send + Sync {
    /// Sends one feature vector and relays the service's verdict unchanged.
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult>;

    /// Relays the service's metrics document unchanged.
    async fn metrics(&self) -> Result<Value>;
}
