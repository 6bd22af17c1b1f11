//! Test doubles for the prediction service.

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::{AppError, Result};
use crate::domain::features::FeatureVector;
use crate::domain::prediction::PredictionResult;
use crate::infrastructure::prediction_client::PredictionForwarder;

/// In-process prediction service answering `/predict` and `/metrics` with a
/// fixed status and body.
pub struct MockPredictionService {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockPredictionService {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let shared = received.clone();

        let server = HttpServer::new(move || {
            let shared = shared.clone();
            App::new()
                .route(
                    "/predict",
                    web::post().to(move |payload: web::Bytes| {
                        let shared = shared.clone();
                        async move {
                            if let Ok(value) = serde_json::from_slice::<Value>(&payload) {
                                shared.lock().unwrap().push(value);
                            }
                            HttpResponse::build(status)
                                .content_type("application/json")
                                .body(body)
                        }
                    }),
                )
                .route(
                    "/metrics",
                    web::get().to(move || async move {
                        HttpResponse::build(status)
                            .content_type("application/json")
                            .body(body)
                    }),
                )
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("bind mock prediction service");

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        Self {
            base_url: format!("http://{}", addr),
            received,
        }
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.received.lock().unwrap().last().cloned()
    }
}

/// Listener that accepts connections and never answers them.
pub struct SilentPredictionService {
    pub base_url: String,
}

impl SilentPredictionService {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind silent prediction service");
        let addr = listener.local_addr().expect("silent service address");

        actix_web::rt::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        Self {
            base_url: format!("http://{}", addr),
        }
    }
}

/// Forwarder that never touches the network.
pub struct StubForwarder {
    outcome: Result<Value>,
    received: Mutex<Vec<FeatureVector>>,
}

impl StubForwarder {
    pub fn replying(value: Value) -> Self {
        Self {
            outcome: Ok(value),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            outcome: Err(err),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<FeatureVector> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionForwarder for StubForwarder {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        self.received.lock().unwrap().push(features.clone());
        self.outcome.clone().map(PredictionResult::from)
    }

    async fn metrics(&self) -> Result<Value> {
        self.outcome.clone()
    }
}
