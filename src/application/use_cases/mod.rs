pub mod gateway;
pub mod schema_normalizer;
