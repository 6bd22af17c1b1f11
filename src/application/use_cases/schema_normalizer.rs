use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::features::FeatureVector;
use crate::domain::record::RawRow;
use crate::domain::schema::{fold_name, FeatureSchema};

/// Value used for any slot that cannot be resolved from the row
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// How each schema slot was resolved during one normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub matched: usize,
    pub missing: usize,
    pub unparsable: usize,
}

/// Maps loosely-typed rows onto the fixed feature schema.
///
/// Column matching ignores case and surrounding whitespace. Missing columns
/// and values that are not finite numbers resolve to
/// [`DEFAULT_FEATURE_VALUE`], so normalization always yields a complete
/// vector.
pub struct SchemaNormalizer {
    schema: Arc<FeatureSchema>,
    folded_names: Vec<String>,
}

impl SchemaNormalizer {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        let folded_names = schema.names().iter().map(|name| fold_name(name)).collect();
        Self {
            schema,
            folded_names,
        }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn normalize(&self, row: &RawRow) -> FeatureVector {
        self.normalize_with_report(row).0
    }

    pub fn normalize_with_report(&self, row: &RawRow) -> (FeatureVector, NormalizationReport) {
        // Last occurrence wins when two headers fold to the same name,
        // matching how `RawRow` keeps exact duplicates.
        let mut lookup: HashMap<String, (&str, &str)> = HashMap::with_capacity(row.len());
        for (key, value) in row.iter() {
            lookup.insert(fold_name(key), (key, value));
        }

        let mut report = NormalizationReport::default();
        let slots = self
            .schema
            .names()
            .iter()
            .zip(&self.folded_names)
            .map(|(name, folded)| {
                let value = match lookup.get(folded) {
                    Some((original_key, raw)) => match parse_feature_value(raw) {
                        Some(value) => {
                            report.matched += 1;
                            value
                        }
                        None => {
                            tracing::trace!(
                                column = %original_key,
                                value = %raw,
                                "Unparsable feature value, using default"
                            );
                            report.unparsable += 1;
                            DEFAULT_FEATURE_VALUE
                        }
                    },
                    None => {
                        report.missing += 1;
                        DEFAULT_FEATURE_VALUE
                    }
                };
                (Arc::clone(name), value)
            })
            .collect();

        (FeatureVector::from_slots(slots), report)
    }
}

/// Parses a cell as a finite float; `NaN` and infinities count as unparsable.
fn parse_feature_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
