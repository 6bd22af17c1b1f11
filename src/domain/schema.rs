use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::error::{AppError, Result};

pub const DEFAULT_FEATURE_PREFIX: &str = "wave_";
pub const DEFAULT_FEATURE_COUNT: usize = 100;

/// Folds a column or slot name for case- and whitespace-insensitive matching.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Ordered list of the canonical slot names the prediction model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<Arc<str>>,
}

impl FeatureSchema {
    /// Builds `prefix0 .. prefix{count-1}`.
    pub fn positional(prefix: &str, count: usize) -> Result<Self> {
        Self::from_names((0..count).map(|i| format!("{}{}", prefix, i)))
    }

    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut slots = Vec::new();

        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                return Err(AppError::ConfigError(
                    "Feature names must not be blank".to_string(),
                ));
            }
            if !seen.insert(fold_name(name)) {
                return Err(AppError::ConfigError(format!(
                    "Duplicate feature name: {}",
                    name
                )));
            }
            slots.push(Arc::from(name));
        }

        if slots.is_empty() {
            return Err(AppError::ConfigError(
                "Feature schema must contain at least one slot".to_string(),
            ));
        }

        Ok(Self { names: slots })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            names: (0..DEFAULT_FEATURE_COUNT)
                .map(|i| Arc::from(format!("{}{}", DEFAULT_FEATURE_PREFIX, i)))
                .collect(),
        }
    }
}
