use super::PredictionForwarder;
use crate::domain::error::{AppError, Result};
use crate::domain::features::FeatureVector;
use crate::domain::prediction::PredictionResult;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub struct HttpPredictionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl PredictionForwarder for HttpPredictionClient {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let url = self.endpoint("predict");

        tracing::info!(
            url = %url,
            slots = features.len(),
            non_zero = features.non_zero_count(),
            "Forwarding feature vector to prediction service"
        );
        tracing::debug!(
            payload = %serde_json::to_string(features).unwrap_or_default(),
            "Outgoing prediction payload"
        );

        let response = self
            .client
            .post(&url)
            .json(features)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("Request failed: {}", e)))?;

        read_json(response, &url).await.map(PredictionResult::from)
    }

    async fn metrics(&self) -> Result<Value> {
        let url = self.endpoint("metrics");

        tracing::debug!(url = %url, "Fetching prediction service metrics");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("Request failed: {}", e)))?;

        read_json(response, &url).await
    }
}

async fn read_json(response: reqwest::Response, url: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AppError::DownstreamUnavailable(format!(
            "{} returned {}: {}",
            url, status, text
        )));
    }

    let body = response.bytes().await.map_err(|e| {
        AppError::DownstreamUnavailable(format!("Failed to read response from {}: {}", url, e))
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        AppError::DownstreamBadResponse(format!("Failed to parse JSON from {}: {}", url, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::schema_normalizer::SchemaNormalizer;
    use crate::domain::record::RawRow;
    use crate::domain::schema::FeatureSchema;
    use crate::test_support::{MockPredictionService, SilentPredictionService};
    use serde_json::json;
    use std::sync::Arc;

    fn sample_vector() -> FeatureVector {
        let schema = Arc::new(FeatureSchema::from_names(["wave_0", "wave_1"]).unwrap());
        let row: RawRow = [("wave_1", "3.5")].into_iter().collect();
        SchemaNormalizer::new(schema).normalize(&row)
    }

    fn client(base_url: &str) -> HttpPredictionClient {
        HttpPredictionClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[actix_web::test]
    async fn test_predict_posts_vector_and_relays_body() {
        let service =
            MockPredictionService::start(200, r#"{"prediction":"clean","score":0.12}"#).await;

        let result = client(&service.base_url).predict(&sample_vector()).await.unwrap();

        assert_eq!(result.0, json!({ "prediction": "clean", "score": 0.12 }));
        assert_eq!(
            service.last_payload(),
            Some(json!({ "wave_0": 0.0, "wave_1": 3.5 }))
        );
    }

    #[actix_web::test]
    async fn test_server_error_is_downstream_unavailable() {
        let service = MockPredictionService::start(500, r#"{"error":"model crashed"}"#).await;

        let err = client(&service.base_url)
            .predict(&sample_vector())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "downstream_unavailable");
        assert!(err.message().contains("500"));
    }

    #[actix_web::test]
    async fn test_invalid_json_is_bad_response() {
        let service = MockPredictionService::start(200, "definitely not json").await;

        let err = client(&service.base_url).metrics().await.unwrap_err();

        assert_eq!(err.kind(), "downstream_bad_response");
    }

    #[actix_web::test]
    async fn test_connection_refused_is_downstream_unavailable() {
        let err = client("http://127.0.0.1:1")
            .predict(&sample_vector())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "downstream_unavailable");
        assert!(err.message().starts_with("Request failed"));
    }

    #[actix_web::test]
    async fn test_timeout_is_downstream_unavailable() {
        let service = SilentPredictionService::start().await;
        let client =
            HttpPredictionClient::new(&service.base_url, Duration::from_millis(300)).unwrap();

        let predict = client.predict(&sample_vector()).await.unwrap_err();
        let metrics = client.metrics().await.unwrap_err();

        assert_eq!(predict.kind(), "downstream_unavailable");
        assert!(predict.message().starts_with("Request failed"));
        assert_eq!(metrics.kind(), "downstream_unavailable");
    }

    #[actix_web::test]
    async fn test_metrics_relays_body() {
        let service = MockPredictionService::start(200, r#"{"accuracy":0.97}"#).await;

        let metrics = client(&format!("{}/", service.base_url)).metrics().await.unwrap();

        assert_eq!(metrics, json!({ "accuracy": 0.97 }));
    }
}
