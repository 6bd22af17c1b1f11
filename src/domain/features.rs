use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// A fully populated, schema-shaped set of numeric features.
///
/// Holds exactly one finite value per schema slot, in schema order, and
/// serializes as a JSON object whose keys follow that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    slots: Vec<(Arc<str>, f64)>,
}

impl FeatureVector {
    pub(crate) fn from_slots(slots: Vec<(Arc<str>, f64)>) -> Self {
        debug_assert!(slots.iter().all(|(_, value)| value.is_finite()));
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.slots
            .iter()
            .find(|(slot, _)| &**slot == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.slots.iter().map(|(name, value)| (&**name, *value))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().map(|(_, value)| *value)
    }

    pub fn non_zero_count(&self) -> usize {
        self.values().filter(|value| *value != 0.0).count()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (name, value) in &self.slots {
            map.serialize_entry(&**name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        FeatureVector::from_slots(vec![
            (Arc::from("wave_1"), 2.5),
            (Arc::from("wave_0"), 0.0),
        ])
    }

    #[test]
    fn test_serializes_in_slot_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"wave_1":2.5,"wave_0":0.0}"#);
    }

    #[test]
    fn test_lookup_and_counts() {
        let vector = sample();
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.get("wave_1"), Some(2.5));
        assert_eq!(vector.get("missing"), None);
        assert_eq!(vector.non_zero_count(), 1);
    }
}
