// tests/metadata_lookup.rs

use std::future::IntoFuture;
use std::sync::Arc;

use serde_json::json;

use predictor_scheduler::metadata::{
    ListOptions, Metadata, MetadataApi, MetadataRepository, RawMetadataPackage, SYSTEM_KIND,
};
use predictor_scheduler_test_utils::fakes::FakeMetadataApi;
use predictor_scheduler_test_utils::init_tracing;

const ELEMENTS: &str = "dataElements";

fn repository(api: &Arc<FakeMetadataApi>) -> MetadataRepository {
    MetadataRepository::new(Arc::clone(api) as Arc<dyn MetadataApi>)
}

#[tokio::test]
async fn single_exact_match_skips_token_search() {
    init_tracing();

    let api = Arc::new(
        FakeMetadataApi::new()
            .with_exact(ELEMENTS, "ANC 1st visit", vec![Metadata::new("e1", "ANC 1st visit")])
            .with_token(ELEMENTS, "ANC 1st visit", vec![Metadata::new("e9", "ANC 1st visit (old)")]),
    );

    let found = repository(&api).search(ELEMENTS, "ANC 1st visit").await.unwrap();

    assert_eq!(found, Some(Metadata::new("e1", "ANC 1st visit")));
    assert_eq!(api.exact_calls(), 1);
    assert_eq!(api.token_calls(), 0);
}

#[tokio::test]
async fn ambiguous_exact_match_falls_back_to_token_search() {
    init_tracing();

    let api = Arc::new(
        FakeMetadataApi::new()
            .with_exact(ELEMENTS, "ANC", vec![Metadata::new("e1", "ANC"), Metadata::new("e2", "ANC")])
            .with_token(ELEMENTS, "ANC", vec![Metadata::new("e3", "ANC visits"), Metadata::new("e4", "ANC total")]),
    );

    let found = repository(&api).search(ELEMENTS, "ANC").await.unwrap();

    assert_eq!(found, Some(Metadata::new("e3", "ANC visits")));
    assert_eq!(api.token_calls(), 1);
}

#[tokio::test]
async fn no_match_anywhere_is_absent_not_an_error() {
    init_tracing();

    let api = Arc::new(FakeMetadataApi::new());
    let found = repository(&api).search(ELEMENTS, "nothing").await.unwrap();

    assert_eq!(found, None);
    assert_eq!(api.exact_calls(), 1);
    assert_eq!(api.token_calls(), 1);
}

#[tokio::test]
async fn repeated_search_is_served_from_cache() {
    init_tracing();

    let api = Arc::new(
        FakeMetadataApi::new()
            .with_token(ELEMENTS, "births", vec![Metadata::new("e5", "Live births")]),
    );
    let repo = repository(&api);

    let (first, second) = futures::join!(
        repo.search(ELEMENTS, "births").into_future(),
        repo.search(ELEMENTS, "births").into_future()
    );
    let third = repo.search(ELEMENTS, "births").await;

    assert_eq!(first.unwrap(), Some(Metadata::new("e5", "Live births")));
    assert_eq!(second.unwrap(), third.unwrap());
    assert_eq!(api.exact_calls(), 1);
    assert_eq!(api.token_calls(), 1);

    // Other kinds and other repositories have their own entries.
    repo.search("indicators", "births").await.unwrap();
    repository(&api).search(ELEMENTS, "births").await.unwrap();
    assert_eq!(api.exact_calls(), 3);
}

#[tokio::test]
async fn lookup_merges_code_and_name_matches() {
    init_tracing();

    let by_code = RawMetadataPackage::new()
        .with_kind(
            ELEMENTS,
            vec![Metadata::new("x1", "A").with_short_name("A short").with_code("CODE1")],
        )
        .with_entry(SYSTEM_KIND, json!({ "version": "2.38" }));
    let by_name = RawMetadataPackage::new()
        .with_kind(
            ELEMENTS,
            vec![Metadata::new("x1", "A (renamed)"), Metadata::new("x2", "NAME1")],
        )
        .with_entry(SYSTEM_KIND, json!({ "version": "2.38" }));

    let api = Arc::new(FakeMetadataApi::new().with_packages(by_code, by_name));

    let package = repository(&api)
        .lookup(vec!["CODE1".into(), "NAME1".into()])
        .await
        .unwrap();

    assert_eq!(package.keys().collect::<Vec<_>>(), vec![ELEMENTS]);
    assert_eq!(
        package[ELEMENTS],
        vec![
            Metadata::new("x1", "A").with_short_name("A short").with_code("CODE1"),
            Metadata::new("x2", "NAME1"),
        ]
    );
    assert_eq!(api.package_calls(), 2);
}

#[tokio::test]
async fn lookup_of_nothing_makes_no_request() {
    let api = Arc::new(FakeMetadataApi::new());

    let package = repository(&api).lookup(Vec::new()).await.unwrap();

    assert!(package.is_empty());
    assert_eq!(api.package_calls(), 0);
}

#[tokio::test]
async fn lookup_failure_is_reported() {
    let api = Arc::new(FakeMetadataApi::new().failing_packages());

    let err = repository(&api).lookup(vec!["CODE1".into()]).await.unwrap_err();

    assert!(err.contains("unavailable"), "unexpected error: {err}");
}

#[tokio::test]
async fn list_applies_default_paging() {
    let api = Arc::new(
        FakeMetadataApi::new().with_listing(ELEMENTS, vec![Metadata::new("e1", "Births")]),
    );
    let repo = repository(&api);

    let page = repo.list(ELEMENTS, ListOptions::default()).await.unwrap();
    repo.list(
        ELEMENTS,
        ListOptions {
            page: Some(3),
            page_size: None,
            filter: Some("name:like:birth".into()),
        },
    )
    .await
    .unwrap();

    assert_eq!(page.objects.len(), 1);
    assert_eq!(
        *api.list_options.lock().unwrap(),
        vec![
            ListOptions {
                page: Some(1),
                page_size: Some(25),
                filter: None,
            },
            ListOptions {
                page: Some(3),
                page_size: Some(25),
                filter: Some("name:like:birth".into()),
            },
        ]
    );
}

#[tokio::test]
async fn list_all_drops_the_system_entry() {
    let all = RawMetadataPackage::new()
        .with_kind("indicators", vec![Metadata::new("i1", "Coverage"), Metadata::new("i1", "Coverage")])
        .with_kind(ELEMENTS, vec![Metadata::new("e1", "Births")])
        .with_entry(SYSTEM_KIND, json!({ "id": "sys" }));
    let api = Arc::new(FakeMetadataApi::new().with_all(all));

    let package = repository(&api)
        .list_all(vec![ELEMENTS.into(), "indicators".into()], None)
        .await
        .unwrap();

    assert_eq!(package.keys().collect::<Vec<_>>(), vec![ELEMENTS, "indicators"]);
    assert_eq!(package["indicators"].len(), 1);
}
