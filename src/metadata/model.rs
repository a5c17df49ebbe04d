// src/metadata/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entity kind, e.g. `"dataElements"` or `"indicators"`.
pub type MetadataKind = String;

/// Summary of one metadata entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Metadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: None,
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }
}

/// Entities grouped by kind, keys in sorted order.
pub type MetadataPackage = BTreeMap<MetadataKind, Vec<Metadata>>;

/// A package exactly as the remote API returned it.
///
/// Besides one array per kind, responses may carry non-entity entries such
/// as the `system` descriptor object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetadataPackage(pub Map<String, Value>);

impl RawMetadataPackage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the entities of one kind.
    pub fn with_kind(mut self, kind: &str, items: Vec<Metadata>) -> Self {
        let items = items
            .into_iter()
            .filter_map(|item| serde_json::to_value(item).ok())
            .collect();
        self.0.insert(kind.to_string(), Value::Array(items));
        self
    }

    /// Add an arbitrary entry, e.g. the `system` object.
    pub fn with_entry(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Iterate over array-valued entries, decoding each element.
    ///
    /// Elements that are not entity summaries are skipped; non-array entries
    /// are not kinds and are not yielded at all.
    pub fn kinds(&self) -> impl Iterator<Item = (&str, Vec<Metadata>)> + '_ {
        self.0.iter().filter_map(|(key, value)| {
            let items = value.as_array()?;
            let decoded = items
                .iter()
                .filter_map(|item| Metadata::deserialize(item).ok())
                .collect();
            Some((key.as_str(), decoded))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_skip_non_arrays_and_invalid_items() {
        let raw: RawMetadataPackage = serde_json::from_value(json!({
            "system": { "id": "sys", "rev": "abc" },
            "dataElements": [
                { "id": "x1", "name": "Births", "code": "BIRTHS" },
                null,
                { "name": "no id" }
            ]
        }))
        .unwrap();

        let kinds: Vec<_> = raw.kinds().collect();
        assert_eq!(kinds.len(), 1);
        assert_eq!(kinds[0].0, "dataElements");
        assert_eq!(
            kinds[0].1,
            vec![Metadata::new("x1", "Births").with_code("BIRTHS")]
        );
    }
}
