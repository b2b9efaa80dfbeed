//! PATCH semantics exercised through the store.

use crate::common::{attrs, init_logging};
use scim_suite::patch::{PatchOp, PatchOperation, PatchRequest, apply_operations};
use scim_suite::resource::{ListRequestParams, Value};
use scim_suite::storage::{InMemoryStore, ResourceHandler};
use scim_suite::{PatchError, StoreError};
use serde_json::json;

fn request(body: serde_json::Value) -> PatchRequest {
    PatchRequest::from_slice(body.to_string().as_bytes()).expect("valid PATCH body")
}

fn emails(resource: &scim_suite::Resource) -> usize {
    resource
        .get("emails")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

#[tokio::test]
async fn test_add_with_path_is_idempotent() {
    init_logging();
    let store = InMemoryStore::with_test_data(1);
    let add = PatchRequest::new(vec![PatchOperation::add(
        "title",
        Value::from("Tour Guide"),
    )]);

    let once = store.patch("0001", &add).await.unwrap();
    let twice = store.patch("0001", &add).await.unwrap();
    assert_eq!(once.attributes, twice.attributes);
    assert_eq!(twice.get_str("title"), Some("Tour Guide"));
}

#[tokio::test]
async fn test_pathless_add_accumulates_and_replace_overwrites() {
    let store = InMemoryStore::with_test_data(1);
    let new_emails = json!([
        {"value": "work@example.com", "type": "work"},
        {"value": "home@example.com", "type": "home"}
    ]);

    let add = request(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [{"op": "add", "value": {"emails": new_emails}}]
    }));
    let after_first = store.patch("0001", &add).await.unwrap();
    assert_eq!(emails(&after_first), 3);
    let after_second = store.patch("0001", &add).await.unwrap();
    assert_eq!(emails(&after_second), 5);

    let replace = request(json!({
        "Operations": [{"op": "replace", "value": {"emails": new_emails}}]
    }));
    let replaced = store.patch("0001", &replace).await.unwrap();
    assert_eq!(emails(&replaced), 2);
}

#[tokio::test]
async fn test_replace_user_name_like_azure() {
    init_logging();
    let store = InMemoryStore::new();
    let created = store
        .create(attrs(json!({"userName": "di-wu", "active": true})))
        .await
        .unwrap();

    let patched = store
        .patch(
            &created.id,
            &request(json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [{"op": "Replace", "path": "userName", "value": "5b50642d-79fc"}]
            })),
        )
        .await
        .unwrap();

    assert_eq!(patched.get_str("userName"), Some("5b50642d-79fc"));
    assert_eq!(patched.meta.created, created.meta.created);
    assert_eq!(
        patched.meta.version.as_str(),
        format!("{}.1", created.meta.version)
    );
    assert!(patched.meta.last_modified >= created.meta.last_modified);
}

#[tokio::test]
async fn test_path_case_does_not_duplicate_attributes() {
    let store = InMemoryStore::with_test_data(1);
    let patched = store
        .patch(
            "0001",
            &request(json!({
                "Operations": [{"op": "replace", "path": "username", "value": "renamed"}]
            })),
        )
        .await
        .unwrap();

    assert_eq!(patched.get_str("userName"), Some("renamed"));
    assert!(patched.attributes.keys().all(|key| key != "username"));
    assert_eq!(patched.attributes.len(), 5);

    let json = patched.to_json().unwrap();
    assert_eq!(json["userName"], "renamed");
    assert!(json.get("username").is_none());

    let params = ListRequestParams::default().with_filter_str(r#"userName eq "renamed""#);
    assert_eq!(store.get_all(&params).await.unwrap().total_results, 1);
}

#[tokio::test]
async fn test_group_membership_add_and_remove() {
    let store = InMemoryStore::new();
    let group = store
        .create(attrs(json!({"displayName": "Group1DisplayName"})))
        .await
        .unwrap();

    let add_member = request(json!({
        "Operations": [{"op": "add", "path": "members", "value": [{"value": "user-4"}]}]
    }));
    let with_member = store.patch(&group.id, &add_member).await.unwrap();
    assert_eq!(
        with_member.get("members").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );

    let remove_members = request(json!({
        "Operations": [{"op": "remove", "path": "members"}]
    }));
    let emptied = store.patch(&group.id, &remove_members).await.unwrap();
    assert_eq!(emptied.get("members"), Some(&Value::Null));
    assert!(emptied.attributes.contains_key("members"));

    let again = store.patch(&group.id, &add_member).await.unwrap();
    assert_eq!(
        again.get("members").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn test_sequential_operations_in_one_request() {
    let store = InMemoryStore::with_test_data(1);
    let patched = store
        .patch(
            "0001",
            &request(json!({
                "Operations": [
                    {"op": "remove", "path": "emails"},
                    {"op": "add", "value": {"emails": [{"value": "only@example.com"}]}},
                    {"op": "replace", "path": "displayName", "value": "First"},
                    {"op": "replace", "value": {"displayName": "Second", "nickName": "2"}}
                ]
            })),
        )
        .await
        .unwrap();

    // A null tombstone is not an array, so the path-less add sets the key
    assert_eq!(emails(&patched), 1);
    assert_eq!(patched.get_str("displayName"), Some("Second"));
    assert_eq!(patched.get_str("nickName"), Some("2"));
    assert_eq!(patched.meta.version.as_str(), "v000000001.1");
}

#[tokio::test]
async fn test_invalid_batch_is_rejected_whole() {
    let store = InMemoryStore::with_test_data(1);
    let before = store.get("0001").await.unwrap();

    let cases = [
        (
            json!({"Operations": [
                {"op": "replace", "path": "displayName", "value": "x"},
                {"op": "copy", "path": "displayName"}
            ]}),
            StoreError::Patch(PatchError::UnsupportedOperation {
                op: "copy".to_string(),
            }),
        ),
        (
            json!({"Operations": [
                {"op": "add", "path": "title", "value": "x"},
                {"op": "remove"}
            ]}),
            StoreError::Patch(PatchError::InvalidOperation {
                index: 1,
                reason: String::new(),
            }),
        ),
    ];

    for (body, expected) in cases {
        let err = store.patch("0001", &request(body)).await.unwrap_err();
        match (&err, &expected) {
            (
                StoreError::Patch(PatchError::InvalidOperation { index, .. }),
                StoreError::Patch(PatchError::InvalidOperation { index: want, .. }),
            ) => assert_eq!(index, want),
            _ => assert_eq!(err, expected),
        }
    }

    assert_eq!(store.get("0001").await.unwrap(), before);
}

#[test]
fn test_rejected_shapes() {
    let attributes = attrs(json!({"userName": "a"}));
    let rejected = [
        PatchOperation::new(PatchOp::Add, None, Some(Value::from("not an object"))),
        PatchOperation::new(PatchOp::Replace, Some("displayName"), None),
        PatchOperation::new(PatchOp::Remove, Some(r#"emails[type eq "work"]"#), None),
        PatchOperation::new(PatchOp::Remove, Some(""), None),
    ];

    for operation in rejected {
        let result = apply_operations(&attributes, &PatchRequest::new(vec![operation.clone()]));
        assert!(
            matches!(result, Err(PatchError::InvalidOperation { index: 0, .. })),
            "{operation:?}"
        );
    }
}

#[test]
fn test_explicit_null_value_is_kept() {
    let attributes = attrs(json!({"userName": "a", "nickName": "n"}));
    let result = apply_operations(
        &attributes,
        &request(json!({"Operations": [{"op": "replace", "path": "nickName", "value": null}]})),
    )
    .unwrap();
    assert_eq!(result.get("nickName"), Some(&Value::Null));
}
