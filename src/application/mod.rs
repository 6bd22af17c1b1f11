pub mod use_cases;

pub use use_cases::gateway::GatewayService;
pub use use_cases::schema_normalizer::{NormalizationReport, SchemaNormalizer};
