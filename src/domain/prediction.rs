use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verdict returned by the prediction service, relayed to callers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub Value);

impl PredictionResult {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for PredictionResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
