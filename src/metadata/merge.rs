// src/metadata/merge.rs

use std::collections::{HashMap, HashSet};

use crate::metadata::model::{MetadataPackage, RawMetadataPackage};

/// Reserved response entry that never takes part in a merge.
pub const SYSTEM_KIND: &str = "system";

/// Merge raw packages into one package keyed by kind.
///
/// For every kind present in any source, the result holds the union of that
/// kind's entities de-duplicated by `id`. The first occurrence wins, scanning
/// sources in the order given. Kinds missing from every source are missing
/// from the result, and [`SYSTEM_KIND`] is always dropped.
pub fn merge_packages(sources: &[RawMetadataPackage]) -> MetadataPackage {
    let mut merged = MetadataPackage::new();
    let mut seen: HashMap<String, HashSet<String>> = HashMap::new();

    for source in sources {
        for (kind, items) in source.kinds() {
            if kind == SYSTEM_KIND {
                continue;
            }

            let bucket = merged.entry(kind.to_string()).or_default();
            let ids = seen.entry(kind.to_string()).or_default();

            for item in items {
                if ids.insert(item.id.clone()) {
                    bucket.push(item);
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::model::Metadata;
    use serde_json::json;

    #[test]
    fn code_matches_win_over_name_matches() {
        let by_code = RawMetadataPackage::new().with_kind(
            "dataElements",
            vec![Metadata::new("x1", "Births").with_code("CODE1")],
        );
        let by_name = RawMetadataPackage::new().with_kind(
            "dataElements",
            vec![Metadata::new("x1", "Births (renamed)"), Metadata::new("x2", "NAME1")],
        );

        let merged = merge_packages(&[by_code, by_name]);

        assert_eq!(
            merged["dataElements"],
            vec![
                Metadata::new("x1", "Births").with_code("CODE1"),
                Metadata::new("x2", "NAME1"),
            ]
        );
    }

    #[test]
    fn system_entry_is_never_emitted() {
        let source = RawMetadataPackage::new()
            .with_entry(SYSTEM_KIND, json!([{ "id": "sys" }]))
            .with_kind("indicators", vec![Metadata::new("i1", "Coverage")]);

        let merged = merge_packages(&[source]);

        assert!(!merged.contains_key(SYSTEM_KIND));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn kinds_absent_everywhere_stay_absent() {
        let a = RawMetadataPackage::new().with_kind("dataElements", vec![]);
        let b = RawMetadataPackage::new().with_kind("indicators", vec![Metadata::new("i1", "I")]);

        let merged = merge_packages(&[a, b]);

        assert_eq!(
            merged.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["dataElements", "indicators"]
        );
        assert!(merged["dataElements"].is_empty());
        assert!(!merged.contains_key("programs"));
    }

    #[test]
    fn merging_is_idempotent() {
        let source = RawMetadataPackage::new().with_kind(
            "dataElements",
            vec![Metadata::new("x1", "A"), Metadata::new("x1", "A again")],
        );

        let once = merge_packages(&[source.clone()]);
        let twice = merge_packages(&[source.clone(), source]);

        assert_eq!(once, twice);
        assert_eq!(once["dataElements"].len(), 1);
    }
}
