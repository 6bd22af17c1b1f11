pub mod error;
pub mod features;
pub mod prediction;
pub mod record;
pub mod schema;
