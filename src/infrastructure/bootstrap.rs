use std::sync::Arc;

use actix_web::web;
use tracing::error;

use crate::application::GatewayService;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::GatewayConfig;
use crate::infrastructure::csv::RawRecordParser;
use crate::infrastructure::prediction_client::HttpPredictionClient;
use crate::infrastructure::storage::UploadStore;
use crate::interfaces::http::{add_log, HttpState};

/// Wire the gateway and its HTTP state from validated configuration.
pub fn setup(config: &GatewayConfig) -> Result<web::Data<HttpState>> {
    let schema = Arc::new(config.build_schema()?);

    let client =
        HttpPredictionClient::new(&config.prediction_service_url, config.request_timeout())?;

    let parser = RawRecordParser::new().with_delimiter(config.delimiter_byte());
    let gateway = GatewayService::new(parser, schema.clone(), Arc::new(client));

    let upload_dir = config.upload_dir_or_default();
    let uploads = UploadStore::new(&upload_dir, config.max_upload_bytes).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %upload_dir.display(),
            "Failed to create upload dir"
        );
        AppError::IoError(format!("Failed to create upload dir: {}", err))
    })?;

    let state = HttpState::new(
        Arc::new(gateway),
        uploads,
        config.prediction_service_url.clone(),
    );

    add_log(
        &state.logs,
        "INFO",
        "Gateway",
        &format!(
            "Forwarding {} feature slots to {} (timeout {}s)",
            schema.len(),
            config.prediction_service_url,
            config.request_timeout_secs
        ),
    );

    Ok(web::Data::new(state))
}
