//! An identity-provider style provisioning run against the test server.
//!
//! Mirrors the request sequence a directory connector sends: discovery,
//! user and group creation, lookups by filter, PATCH updates, then cleanup.

use crate::common::{fixtures, init_logging};
use scim_suite::resource::ListRequestParams;
use scim_suite::schema::embedded;
use scim_suite::{ScimError, Server, StoreError};

#[tokio::test]
async fn test_discovery() {
    init_logging();
    let server = Server::test_server().unwrap();

    assert!(server.config().supports_patch);
    assert!(server.config().supports_filtering);

    let endpoints: Vec<&str> = server
        .resource_types()
        .iter()
        .map(|rt| rt.endpoint.as_str())
        .collect();
    assert_eq!(endpoints, ["/Users", "/EnterpriseUsers", "/Groups"]);

    let user_account = server
        .schemas()
        .into_iter()
        .any(|schema| schema.description.as_deref() == Some("User Account"));
    assert!(user_account);

    let users = server.resource_type("/Users").unwrap().to_json();
    assert_eq!(users["schema"], embedded::USER_SCHEMA_ID);
    assert!(users.get("schemaExtensions").is_none());

    for resource_type in server.resource_types() {
        let id = resource_type.id.clone().unwrap_or_default();
        assert!(server.resource_type_by_id(&id).is_some(), "{id}");
    }

    let config = server.config().to_json();
    assert_eq!(
        config["schemas"][0],
        "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig"
    );
    assert_eq!(config["patch"]["supported"], true);
}

#[tokio::test]
async fn test_user_lifecycle() {
    init_logging();
    let server = Server::test_server().unwrap();

    let body = fixtures::user_full("di-wu").to_string();
    let user = server.create_json("/Users", body.as_bytes()).await.unwrap();
    assert_eq!(user.external_id.as_deref(), Some("di-wu-ext"));

    let duplicate = server.create_json("/Users", body.as_bytes()).await;
    assert!(matches!(
        duplicate,
        Err(ScimError::Store(StoreError::UniquenessViolation { .. }))
    ));

    let enterprise = fixtures::enterprise_user("quint").to_string();
    let second = server
        .create_json("/EnterpriseUsers", enterprise.as_bytes())
        .await
        .unwrap();
    assert!(
        second
            .get("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
            .and_then(|v| v.as_object())
            .is_some()
    );

    let found = server
        .get_all(
            "/Users",
            &ListRequestParams::new(1, 10).with_filter_str(r#"displayName eq "di-wu""#),
        )
        .await
        .unwrap();
    assert_eq!(found.total_results, 1);
    assert_eq!(found.resources[0].id, user.id);

    let patched = server
        .patch_json(
            "/Users",
            &user.id,
            br#"{
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [
                    {"op": "replace", "path": "userName", "value": "di-wu-renamed"},
                    {"op": "replace", "path": "active", "value": false}
                ]
            }"#,
        )
        .await
        .unwrap();
    assert_eq!(patched.get_str("userName"), Some("di-wu-renamed"));
    assert_eq!(patched.get("active").and_then(|v| v.as_bool()), Some(false));

    let fetched = server.get("/Users", &user.id).await.unwrap();
    assert_eq!(fetched, patched);

    server.delete("/Users", &user.id).await.unwrap();
    assert!(matches!(
        server.get("/Users", &user.id).await,
        Err(ScimError::Store(StoreError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_group_lifecycle() {
    let server = Server::test_server().unwrap();

    let group = server
        .create_json("/Groups", br#"{"displayName": "Group1DisplayName"}"#)
        .await
        .unwrap();

    for member in ["0001", "0002"] {
        let body = format!(
            r#"{{"Operations": [{{"op": "add", "value": {{"members": [{{"value": "{}"}}]}}}}]}}"#,
            member
        );
        server
            .patch_json("/Groups", &group.id, body.as_bytes())
            .await
            .unwrap();
    }
    let with_members = server.get("/Groups", &group.id).await.unwrap();
    let members = with_members
        .get("members")
        .and_then(|v| v.as_array())
        .map(Vec::len);
    // The first path-less add sets the key; the second appends
    assert_eq!(members, Some(2));

    let renamed = server
        .replace_json(
            "/Groups",
            &group.id,
            br#"{"displayName": "Group1DisplayName-renamed"}"#,
        )
        .await
        .unwrap();
    assert_eq!(renamed.meta.created, group.meta.created);
    assert!(renamed.get("members").is_none());
}

#[tokio::test]
async fn test_endpoints_are_isolated() {
    let server = Server::test_server().unwrap();

    server
        .create_json("/Users", br#"{"userName": "only-in-users"}"#)
        .await
        .unwrap();

    let users = server.get_all("/Users", &ListRequestParams::default()).await.unwrap();
    let groups = server.get_all("/Groups", &ListRequestParams::default()).await.unwrap();
    assert_eq!(users.total_results, 21);
    assert_eq!(groups.total_results, 20);

    assert!(matches!(
        server.get_all("/Devices", &ListRequestParams::default()).await,
        Err(ScimError::UnknownEndpoint { .. })
    ));
}

#[tokio::test]
async fn test_malformed_bodies() {
    let server = Server::test_server().unwrap();

    assert!(matches!(
        server.create_json("/Users", b"{").await,
        Err(ScimError::Json(_))
    ));
    assert!(matches!(
        server.patch_json("/Users", "0001", br#"{"schemas": []}"#).await,
        Err(ScimError::Json(_))
    ));
    assert!(matches!(
        server
            .patch_json("/Users", "0001", br#"{"Operations": [{"op": "add", "value": 3}]}"#)
            .await,
        Err(ScimError::Store(StoreError::Patch(_)))
    ));
}
