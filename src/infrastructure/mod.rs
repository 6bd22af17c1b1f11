pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod prediction_client;
pub mod storage;
