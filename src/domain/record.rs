// ============================================================
// RAW RECORD TYPES
// ============================================================
// Loosely-typed rows as read from an uploaded file, before any schema is applied

use serde::Serialize;

/// A single header/value pair inside a raw row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawField {
    /// Header text exactly as found in the file
    pub key: String,

    /// Cell text exactly as found in the file
    pub value: String,
}

/// One data line of an uploaded file, keyed by its header.
///
/// Keys are unique within a row and keep the order in which they first
/// appeared in the header. Inserting an existing key overwrites its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRow {
    fields: Vec<RawField>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|field| field.key == key) {
            Some(existing) => existing.value = value,
            None => self.fields.push(RawField { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.key.as_str(), field.value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key.as_str())
    }

    /// The only field of a single-column row.
    pub fn single_field(&self) -> Option<&RawField> {
        match self.fields.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position_and_last_value() {
        let row: RawRow = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();

        assert_eq!(row.len(), 2);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some("3"));
    }

    #[test]
    fn test_single_field() {
        let single: RawRow = [("a,b", "1,2")].into_iter().collect();
        let pair: RawRow = [("a", "1"), ("b", "2")].into_iter().collect();

        assert_eq!(single.single_field().map(|f| f.key.as_str()), Some("a,b"));
        assert!(pair.single_field().is_none());
        assert!(RawRow::new().single_field().is_none());
    }
}
