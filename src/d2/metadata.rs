// src/d2/metadata.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::d2::{D2Api, Query};
use crate::domain::{Page, Pager};
use crate::errors::Result;
use crate::metadata::{
    IdentifiableFilter, ListOptions, Metadata, MetadataApi, MetadataKind, PackageFilter,
    RawMetadataPackage,
};

const SUMMARY_FIELDS: &str = "id,name,code";
const LOOKUP_FIELDS: &str = "id,name,shortName,code";

#[derive(Debug, Clone)]
pub struct D2MetadataApi {
    api: Arc<D2Api>,
}

impl D2MetadataApi {
    pub fn new(api: Arc<D2Api>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl MetadataApi for D2MetadataApi {
    async fn list(&self, kind: &str, options: &ListOptions) -> Result<Page<Metadata>> {
        let mut query: Query = vec![
            ("fields", SUMMARY_FIELDS.to_string()),
            ("page", options.page.unwrap_or(1).to_string()),
            ("pageSize", options.page_size.unwrap_or(25).to_string()),
        ];
        if let Some(filter) = &options.filter {
            query.push(("filter", filter.clone()));
        }

        let body: Value = self.api.get_json(&format!("api/{kind}"), &query).await?;
        Ok(page_from_body(kind, &body))
    }

    async fn list_all(&self, kinds: &[MetadataKind], filter: Option<&str>) -> Result<RawMetadataPackage> {
        let mut query: Vec<(String, String)> = Vec::new();
        for kind in kinds {
            query.push(kind_param(kind, "fields", SUMMARY_FIELDS));
            if let Some(filter) = filter {
                query.push(kind_param(kind, "filter", filter));
            }
            query.push(kind_param(kind, "paging", "false"));
        }
        query.push(("paging".to_string(), "false".to_string()));

        self.api.get_json("api/metadata", &query).await
    }

    async fn find(&self, kind: &str, filter: &IdentifiableFilter) -> Result<Vec<Metadata>> {
        let query: Query = vec![
            ("fields", "id,name".to_string()),
            ("filter", identifiable_filter(filter)),
            ("paging", "false".to_string()),
        ];

        let body: Value = self.api.get_json(&format!("api/{kind}"), &query).await?;
        Ok(page_from_body(kind, &body).objects)
    }

    async fn find_package(&self, filter: &PackageFilter) -> Result<RawMetadataPackage> {
        let query: Query = vec![
            ("fields", LOOKUP_FIELDS.to_string()),
            ("filter", package_filter(filter)),
            ("paging", "false".to_string()),
        ];

        self.api.get_json("api/metadata", &query).await
    }
}

/// Per-kind parameter of the metadata endpoint, e.g. `dataElements:fields`.
fn kind_param(kind: &str, param: &str, value: &str) -> (String, String) {
    (format!("{kind}:{param}"), value.to_string())
}

pub(crate) fn identifiable_filter(filter: &IdentifiableFilter) -> String {
    match filter {
        IdentifiableFilter::Exact(query) => format!("identifiable:eq:{query}"),
        IdentifiableFilter::Token(query) => format!("identifiable:token:{query}"),
    }
}

pub(crate) fn package_filter(filter: &PackageFilter) -> String {
    let (property, values) = match filter {
        PackageFilter::CodeIn(values) => ("code", values),
        PackageFilter::NameIn(values) => ("name", values),
    };
    format!("{property}:in:[{}]", values.join(","))
}

/// Decode `{ pager, <kind>: [...] }` into a page.
pub(crate) fn page_from_body(kind: &str, body: &Value) -> Page<Metadata> {
    let pager = body
        .get("pager")
        .and_then(|p| serde_json::from_value::<Pager>(p.clone()).ok());

    let objects = RawMetadataPackage::new()
        .with_entry(kind, body.get(kind).cloned().unwrap_or(Value::Array(Vec::new())))
        .kinds()
        .flat_map(|(_, items)| items)
        .collect();

    Page { pager, objects }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_render_in_query_syntax() {
        assert_eq!(
            identifiable_filter(&IdentifiableFilter::Exact("ANC 1".into())),
            "identifiable:eq:ANC 1"
        );
        assert_eq!(
            identifiable_filter(&IdentifiableFilter::Token("anc".into())),
            "identifiable:token:anc"
        );
        assert_eq!(
            package_filter(&PackageFilter::CodeIn(vec!["CODE1".into(), "NAME1".into()])),
            "code:in:[CODE1,NAME1]"
        );
    }

    #[test]
    fn page_body_is_decoded() {
        let body = json!({
            "pager": { "page": 2, "pageCount": 4, "total": 80, "pageSize": 25 },
            "dataElements": [{ "id": "x1", "name": "Births", "code": "B" }]
        });

        let page = page_from_body("dataElements", &body);

        assert_eq!(page.pager.map(|p| p.page), Some(2));
        assert_eq!(page.objects, vec![Metadata::new("x1", "Births").with_code("B")]);
    }
}
