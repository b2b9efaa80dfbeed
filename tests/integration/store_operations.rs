//! Resource store CRUD, pagination and filtering.

use crate::common::{attrs, fixtures, init_logging, user};
use scim_suite::resource::ListRequestParams;
use scim_suite::storage::{InMemoryStore, ResourceHandler, StoreConfig};
use scim_suite::{Filter, StoreError, Value};
use serde_json::json;

#[tokio::test]
async fn test_seeded_first_page() {
    init_logging();
    let store = InMemoryStore::with_test_data(20);

    let page = store.get_all(&ListRequestParams::new(1, 1)).await.unwrap();
    assert_eq!(page.total_results, 20);
    assert_eq!(page.resources.len(), 1);
    assert_eq!(page.resources[0].get_str("userName"), Some("test01"));
}

#[tokio::test]
async fn test_last_page_boundary() {
    for n in [1, 7, 20] {
        let store = InMemoryStore::with_test_data(n);
        let page = store.get_all(&ListRequestParams::new(n, 5)).await.unwrap();
        assert_eq!(page.resources.len(), 1, "n = {n}");
        assert_eq!(page.total_results, n, "n = {n}");
    }
}

#[tokio::test]
async fn test_pages_cover_every_resource_once() {
    let store = InMemoryStore::with_test_data(20);
    let mut seen = Vec::new();
    let mut start = 1;
    loop {
        let page = store.get_all(&ListRequestParams::new(start, 6)).await.unwrap();
        if page.resources.is_empty() {
            break;
        }
        start += page.resources.len();
        seen.extend(page.resources.into_iter().map(|r| r.id));
    }
    let expected: Vec<String> = (1..=20).map(|i| format!("{:04}", i)).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_created_resource_round_trips() {
    init_logging();
    let store = InMemoryStore::new();
    let body = attrs(fixtures::user_full("bjensen"));

    let created = store.create(body.clone()).await.unwrap();
    assert_eq!(created.attributes, body);
    assert_eq!(created.external_id.as_deref(), Some("bjensen-ext"));

    let json = created.to_json().unwrap();
    assert_eq!(json["id"], json!(created.id));
    assert_eq!(json["externalId"], "bjensen-ext");
    assert_eq!(json["meta"]["version"], json!(created.meta.version.as_str()));

    assert_eq!(store.get(&created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_non_string_external_id_is_ignored() {
    let store = InMemoryStore::new();
    let created = store
        .create(attrs(json!({"userName": "x", "externalId": 42})))
        .await
        .unwrap();
    assert_eq!(created.external_id, None);
    assert_eq!(created.get("externalId"), Some(&Value::from(42i64)));
}

#[tokio::test]
async fn test_uniqueness_against_seed_data() {
    let store = InMemoryStore::with_test_data(20);

    let err = store.create(user("test05")).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::UniquenessViolation { ref attribute, ref value }
            if attribute == "userName" && value == "test05"
    ));
    assert_eq!(store.len().await, 20);

    store.create(user("test21")).await.unwrap();
    assert_eq!(store.len().await, 21);
}

#[tokio::test]
async fn test_uniqueness_key_is_case_insensitive() {
    let store = InMemoryStore::new();
    store.create(user("bjensen")).await.unwrap();

    let err = store
        .create(attrs(json!({"UserName": "bjensen"})))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniquenessViolation { .. }));

    let params = ListRequestParams::default().with_filter_str(r#"userName eq "bjensen""#);
    assert_eq!(store.get_all(&params).await.unwrap().total_results, 1);
}

#[tokio::test]
async fn test_seeded_json_keeps_attribute_order() {
    let store = InMemoryStore::with_test_data(1);
    let json = store.get("0001").await.unwrap().to_json().unwrap();

    let keys: Vec<&str> = json
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(
        keys,
        ["id", "externalId", "userName", "name", "active", "emails", "meta"]
    );
}

#[tokio::test]
async fn test_uniqueness_is_exact() {
    let store = InMemoryStore::new();
    store.create(user("bjensen")).await.unwrap();
    store.create(user("BJensen")).await.unwrap();
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_filter_by_user_name() {
    let store = InMemoryStore::with_test_data(20);

    let params = ListRequestParams::new(1, 10).with_filter(Filter::equal("userName", "test13"));
    let page = store.get_all(&params).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.resources[0].id, "0013");

    let params = ListRequestParams::new(2, 10).with_filter(Filter::equal("userName", "test13"));
    let page = store.get_all(&params).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert!(page.resources.is_empty());
}

#[tokio::test]
async fn test_filter_other_attributes() {
    let store = InMemoryStore::new();
    let created = store
        .create(attrs(json!({"userName": "a", "displayName": "Bob Is Amazing"})))
        .await
        .unwrap();
    store
        .create(attrs(json!({"userName": "b", "displayName": "Someone Else"})))
        .await
        .unwrap();

    let params = ListRequestParams::default().with_filter_str(r#"DisplayName eq "Bob Is Amazing""#);
    let page = store.get_all(&params).await.unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.resources[0].id, created.id);

    let expression = format!(r#"id eq "{}""#, created.id);
    let params = ListRequestParams::default().with_filter_str(&expression);
    assert_eq!(store.get_all(&params).await.unwrap().total_results, 1);
}

#[tokio::test]
async fn test_unsupported_filter_matches_nothing() {
    let store = InMemoryStore::with_test_data(20);
    for expression in [
        r#"userName co "test""#,
        r#"userName eq "test01" or userName eq "test02""#,
        r#"emails[type eq "work"]"#,
        "active eq true",
    ] {
        let params = ListRequestParams::default().with_filter_str(expression);
        let page = store.get_all(&params).await.unwrap();
        assert_eq!(page.total_results, 0, "{expression}");
        assert!(page.resources.is_empty(), "{expression}");
    }
}

#[tokio::test]
async fn test_page_serializes_with_resources_key() {
    let store = InMemoryStore::with_test_data(3);
    let page = store.get_all(&ListRequestParams::new(1, 2)).await.unwrap();
    let body = serde_json::to_value(&page).unwrap();

    assert_eq!(body["totalResults"], 3);
    assert_eq!(body["Resources"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["Resources"][0]["userName"], "test01");
    assert_eq!(body["Resources"][0]["meta"]["version"], "v000000001");
}

#[tokio::test]
async fn test_replace_then_delete() {
    init_logging();
    let store = InMemoryStore::with_test_data(20);

    let replaced = store
        .replace("0003", attrs(json!({"userName": "test03", "nickName": "three"})))
        .await
        .unwrap();
    assert_eq!(replaced.attributes.len(), 2);
    assert!(replaced.meta.last_modified > replaced.meta.created);

    store.delete("0003").await.unwrap();
    assert_eq!(store.delete("0003").await, Err(StoreError::not_found("0003")));

    let page = store.get_all(&ListRequestParams::new(3, 1)).await.unwrap();
    assert_eq!(page.total_results, 19);
    assert_eq!(page.resources[0].id, "0004");
}

#[tokio::test]
async fn test_not_found_leaves_store_unchanged() {
    let store = InMemoryStore::with_test_data(20);
    let before = store.get_all(&ListRequestParams::default()).await.unwrap();

    let missing = StoreError::not_found("abc");
    assert_eq!(store.get("abc").await, Err(missing.clone()));
    assert_eq!(store.replace("abc", user("x")).await, Err(missing.clone()));
    assert_eq!(store.delete("abc").await, Err(missing.clone()));
    assert_eq!(
        store
            .patch("abc", &scim_suite::PatchRequest::new(vec![]))
            .await,
        Err(missing)
    );

    let after = store.get_all(&ListRequestParams::default()).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_store_clones_share_data() {
    let store = InMemoryStore::with_config(StoreConfig::default().with_resource_type("Device"));
    let other = store.clone();

    let created = store.create(user("shared")).await.unwrap();
    assert_eq!(other.get(&created.id).await.unwrap(), created);
    assert_eq!(other.config().resource_type, "Device");
}
