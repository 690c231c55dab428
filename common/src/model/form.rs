use crate::model::csv::CsvRows;
use serde::Serialize;
use std::collections::BTreeMap;

/// The value stored for one multipart field once the body has been parsed.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// A plain form field.
    Text(String),
    /// A part sent with an `application/json` content type.
    Json(serde_json::Value),
    /// The uploaded CSV file, already decoded.
    Csv(CsvRows),
}

/// Everything a CSV multipart request carried, keyed by field name.
///
/// Serializes as a flat JSON object, e.g.
/// `{"meta": {"x": 1}, "file": [["name", "age"], ["Alice", "30"]]}`.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ParsedForm {
    fields: BTreeMap<String, FieldValue>,
}

impl ParsedForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn csv(&self, name: &str) -> Option<&CsvRows> {
        match self.fields.get(name) {
            Some(FieldValue::Csv(rows)) => Some(rows),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
