use std::sync::Arc;

use serde_json::Value;

use crate::application::use_cases::schema_normalizer::SchemaNormalizer;
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::PredictionResult;
use crate::domain::schema::FeatureSchema;
use crate::infrastructure::csv::RawRecordParser;
use crate::infrastructure::prediction_client::PredictionForwarder;
use crate::infrastructure::storage::UploadedFile;

/// Submit one uploaded record, get one verdict.
pub struct GatewayService {
    parser: RawRecordParser,
    normalizer: SchemaNormalizer,
    forwarder: Arc<dyn PredictionForwarder>,
}

impl GatewayService {
    pub fn new(
        parser: RawRecordParser,
        schema: Arc<FeatureSchema>,
        forwarder: Arc<dyn PredictionForwarder>,
    ) -> Self {
        Self {
            parser,
            normalizer: SchemaNormalizer::new(schema),
            forwarder,
        }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.normalizer.schema()
    }

    /// Parse, normalize and forward raw upload content.
    ///
    /// Only the first data row is forwarded; any further rows are ignored.
    pub async fn submit(&self, raw: &[u8]) -> Result<PredictionResult> {
        if raw.is_empty() {
            return Err(AppError::NoInput("No file content provided".to_string()));
        }

        let rows = self.parser.parse_bytes(raw)?;
        if rows.len() > 1 {
            tracing::warn!(
                rows = rows.len(),
                "Upload has several data rows; only the first is forwarded"
            );
        }

        let Some(first) = rows.first() else {
            return Err(AppError::EmptyInput("CSV content has no data rows".to_string()));
        };

        let (features, report) = self.normalizer.normalize_with_report(first);
        tracing::debug!(
            matched = report.matched,
            missing = report.missing,
            unparsable = report.unparsable,
            "Normalized upload row"
        );

        self.forwarder.predict(&features).await
    }

    /// Run [`GatewayService::submit`] on a buffered upload and remove the
    /// buffer afterwards, whatever the outcome.
    pub async fn submit_upload(&self, upload: UploadedFile) -> Result<PredictionResult> {
        let (upload, raw) = upload.read_all().await?;
        let result = self.submit(&raw).await;
        upload.release();
        result
    }

    pub async fn fetch_metrics(&self) -> Result<Value> {
        self.forwarder.metrics().await
    }
}
