use crate::application::GatewayService;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::storage::{UploadStore, UploadedFile};
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{
    dev::Server, get, post, web, App, HttpMessage, HttpRequest, HttpResponse, HttpServer,
    Responder,
};
use chrono::Local;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Multipart field carrying the CSV upload
pub const FILE_FIELD: &str = "file";

pub const NO_FILE_MESSAGE: &str = "No file uploaded.";
pub const INVALID_CSV_MESSAGE: &str = "CSV file is empty or invalid.";
pub const TOO_LARGE_MESSAGE: &str = "Uploaded file is too large.";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process the uploaded file.";
pub const METRICS_FAILED_MESSAGE: &str = "Failed to fetch metrics";

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub gateway: Arc<GatewayService>,
    pub uploads: UploadStore,
    pub prediction_service_url: String,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    pub fn new(
        gateway: Arc<GatewayService>,
        uploads: UploadStore,
        prediction_service_url: String,
    ) -> Self {
        Self {
            gateway,
            uploads,
            prediction_service_url,
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub prediction_service: String,
    pub feature_count: usize,
}

/// Maps a failed upload to its status code and user-facing message.
pub fn upload_error_response(err: &AppError) -> HttpResponse {
    let (status, message) = match err {
        AppError::NoInput(_) => (StatusCode::BAD_REQUEST, NO_FILE_MESSAGE),
        AppError::EmptyInput(_) => (StatusCode::BAD_REQUEST, INVALID_CSV_MESSAGE),
        AppError::UploadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE),
    };

    HttpResponse::build(status).json(ErrorBody {
        error: message.to_string(),
        kind: err.kind(),
    })
}

#[post("/predict")]
async fn predict(
    data: web::Data<HttpState>,
    req: HttpRequest,
    payload: Multipart,
) -> impl Responder {
    if !req.content_type().starts_with("multipart/form-data") {
        add_log(&data.logs, "WARN", "Predict", "Rejected request without multipart body");
        return upload_error_response(&AppError::NoInput(format!(
            "Unsupported content type: {}",
            req.content_type()
        )));
    }

    let upload = match receive_upload(&data.uploads, payload).await {
        Ok(upload) => upload,
        Err(e) => {
            add_log(
                &data.logs,
                "WARN",
                "Predict",
                &format!("Upload rejected: {}", e),
            );
            return upload_error_response(&e);
        }
    };

    let size = upload.size();
    add_log(
        &data.logs,
        "INFO",
        "Predict",
        &format!("Received upload ({} bytes)", size),
    );

    match data.gateway.submit_upload(upload).await {
        Ok(result) => {
            add_log(&data.logs, "INFO", "Predict", "Prediction relayed");
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Predict",
                &format!("Prediction failed: {}", e),
            );
            upload_error_response(&e)
        }
    }
}

/// Stream the `file` field of a multipart body into a request-scoped file.
///
/// Other fields, and any repeated `file` field, are drained and ignored.
async fn receive_upload(store: &UploadStore, mut payload: Multipart) -> Result<UploadedFile> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            AppError::MalformedInput(format!("Invalid multipart payload: {}", e))
        })?;

        let wanted = upload.is_none() && field.name() == Some(FILE_FIELD);
        let mut file = if wanted { Some(store.create()?) } else { None };

        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::MalformedInput(format!("Failed to read multipart field: {}", e))
            })?;
            if let Some(file) = file.as_mut() {
                file.write_chunk(&chunk)?;
            }
        }

        if file.is_some() {
            upload = file;
        }
    }

    match upload {
        Some(file) if !file.is_empty() => Ok(file),
        _ => Err(AppError::NoInput("No file uploaded".to_string())),
    }
}

#[get("/metrics")]
async fn metrics(data: web::Data<HttpState>) -> impl Responder {
    match data.gateway.fetch_metrics().await {
        Ok(metrics) => HttpResponse::Ok().json(metrics),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Metrics",
                &format!("Failed to fetch metrics: {}", e),
            );
            HttpResponse::InternalServerError().json(ErrorBody {
                error: METRICS_FAILED_MESSAGE.to_string(),
                kind: e.kind(),
            })
        }
    }
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        prediction_service: data.prediction_service_url.clone(),
        feature_count: data.gateway.schema().len(),
    })
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data
        .logs
        .lock()
        .map(|logs| logs.clone())
        .unwrap_or_default();
    HttpResponse::Ok().json(logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    match level {
        "ERROR" => tracing::error!(source, "{}", message),
        "WARN" => tracing::warn!(source, "{}", message),
        _ => tracing::info!(source, "{}", message),
    }

    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry.clone());
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(predict)
            .service(metrics)
            .service(health)
            .service(get_logs),
    );
}

pub fn start_server(state: web::Data<HttpState>, host: &str, port: u16) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
