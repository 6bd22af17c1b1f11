// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Upload decoding and tolerant header-plus-data parsing

mod csv_parser;

pub use csv_parser::{RawRecordParser, FALLBACK_DELIMITER};
