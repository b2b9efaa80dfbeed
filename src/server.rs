//! Resource types and the server façade that routes endpoint calls.
//!
//! A [`Server`] owns a set of [`ResourceType`]s, each pairing an endpoint
//! such as `/Users` with its schema, schema extensions and the
//! [`ResourceHandler`] that stores its resources. The JSON helpers accept raw
//! request bodies, so a transport layer only has to pick the endpoint and
//! hand the bytes over.
//!
//! # Example
//!
//! ```rust
//! use scim_suite::Server;
//! use scim_suite::resource::ListRequestParams;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::test_server()?;
//!
//! let created = server
//!     .create_json("/Users", br#"{"userName": "bjensen"}"#)
//!     .await?;
//! let page = server
//!     .get_all("/Users", &ListRequestParams::new(1, 100))
//!     .await?;
//! assert_eq!(page.total_results, 21);
//! # let _ = created;
//! # Ok(())
//! # }
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ScimError, ScimResult};
use crate::patch::PatchRequest;
use crate::resource::{Attributes, ListRequestParams, Page, Resource};
use crate::schema::{Schema, embedded, parse_schema};
use crate::storage::{InMemoryStore, ResourceHandler, StoreConfig};

/// Schema URI of a ResourceType discovery document.
pub const RESOURCE_TYPE_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";

/// Schema URI of the ServiceProviderConfig discovery document.
pub const SERVICE_PROVIDER_CONFIG_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";

/// Number of fixture resources seeded into each test server endpoint.
const TEST_SERVER_SEED: usize = 20;

/// Service provider capabilities advertised to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderConfig {
    /// Human-readable help for the service provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_uri: Option<String>,

    /// Whether PATCH operations are supported
    pub supports_patch: bool,

    /// Whether list filtering is supported
    pub supports_filtering: bool,

    /// Upper bound on the page size of a listing
    pub max_filter_results: usize,
}

impl Default for ServiceProviderConfig {
    fn default() -> Self {
        Self {
            documentation_uri: None,
            supports_patch: true,
            supports_filtering: false,
            max_filter_results: 200,
        }
    }
}

impl ServiceProviderConfig {
    /// The RFC 7643 Section 5 discovery document.
    ///
    /// Bulk, sort, ETag and password changes are never offered.
    pub fn to_json(&self) -> serde_json::Value {
        let mut document = json!({
            "schemas": [SERVICE_PROVIDER_CONFIG_SCHEMA],
            "patch": {"supported": self.supports_patch},
            "bulk": {"supported": false, "maxOperations": 0, "maxPayloadSize": 0},
            "filter": {
                "supported": self.supports_filtering,
                "maxResults": self.max_filter_results,
            },
            "changePassword": {"supported": false},
            "sort": {"supported": false},
            "etag": {"supported": false},
            "authenticationSchemes": [],
        });
        if let Some(uri) = &self.documentation_uri {
            document["documentationUri"] = json!(uri);
        }
        document
    }
}

/// A schema extension attached to a resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaExtension {
    pub schema: Schema,
    /// Whether resources must include the extension
    pub required: bool,
}

/// A resource type served at one endpoint.
#[derive(Debug, Clone)]
pub struct ResourceType<H> {
    pub id: Option<String>,
    pub name: String,
    /// Endpoint path relative to the service base, e.g. `/Users`
    pub endpoint: String,
    pub description: Option<String>,
    pub schema: Schema,
    pub schema_extensions: Vec<SchemaExtension>,
    pub handler: H,
}

impl<H> ResourceType<H> {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        schema: Schema,
        handler: H,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            endpoint: endpoint.into(),
            description: None,
            schema,
            schema_extensions: Vec::new(),
            handler,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_extension(mut self, schema: Schema, required: bool) -> Self {
        self.schema_extensions.push(SchemaExtension { schema, required });
        self
    }

    /// The RFC 7643 Section 6 discovery document for this resource type.
    pub fn to_json(&self) -> serde_json::Value {
        let mut document = json!({
            "schemas": [RESOURCE_TYPE_SCHEMA],
            "name": self.name,
            "endpoint": self.endpoint,
            "schema": self.schema.id,
        });
        if let Some(id) = &self.id {
            document["id"] = json!(id);
        }
        if let Some(description) = &self.description {
            document["description"] = json!(description);
        }
        if !self.schema_extensions.is_empty() {
            document["schemaExtensions"] = self
                .schema_extensions
                .iter()
                .map(|extension| {
                    json!({"schema": extension.schema.id, "required": extension.required})
                })
                .collect();
        }
        document
    }
}

/// Routes resource operations to the handler registered for an endpoint.
#[derive(Debug, Clone)]
pub struct Server<H> {
    config: ServiceProviderConfig,
    resource_types: Vec<ResourceType<H>>,
}

impl<H: ResourceHandler> Server<H> {
    pub fn new(config: ServiceProviderConfig) -> Self {
        Self {
            config,
            resource_types: Vec::new(),
        }
    }

    /// Register a resource type, replacing any earlier one at the same endpoint.
    pub fn with_resource_type(mut self, resource_type: ResourceType<H>) -> Self {
        self.add_resource_type(resource_type);
        self
    }

    pub fn add_resource_type(&mut self, resource_type: ResourceType<H>) {
        info!(
            "Registering resource type {} at {}",
            resource_type.name, resource_type.endpoint
        );
        match self
            .resource_types
            .iter_mut()
            .find(|existing| existing.endpoint == resource_type.endpoint)
        {
            Some(existing) => *existing = resource_type,
            None => self.resource_types.push(resource_type),
        }
    }

    pub fn config(&self) -> &ServiceProviderConfig {
        &self.config
    }

    pub fn resource_types(&self) -> &[ResourceType<H>] {
        &self.resource_types
    }

    /// Look up the resource type served at `endpoint`.
    pub fn resource_type(&self, endpoint: &str) -> ScimResult<&ResourceType<H>> {
        self.resource_types
            .iter()
            .find(|resource_type| resource_type.endpoint == endpoint)
            .ok_or_else(|| ScimError::UnknownEndpoint {
                endpoint: endpoint.to_string(),
            })
    }

    /// Look up a resource type by its discovery `id`, falling back to its
    /// name when no id was set.
    pub fn resource_type_by_id(&self, id: &str) -> Option<&ResourceType<H>> {
        self.resource_types.iter().find(|resource_type| {
            resource_type.id.as_deref().unwrap_or(&resource_type.name) == id
        })
    }

    /// Every schema used by a registered resource type, core schemas and
    /// extensions alike, in registration order without duplicates.
    pub fn schemas(&self) -> Vec<&Schema> {
        let mut schemas: Vec<&Schema> = Vec::new();
        for resource_type in &self.resource_types {
            let used = std::iter::once(&resource_type.schema)
                .chain(resource_type.schema_extensions.iter().map(|e| &e.schema));
            for schema in used {
                if !schemas.iter().any(|known| known.id == schema.id) {
                    schemas.push(schema);
                }
            }
        }
        schemas
    }

    /// Look up a schema used by a registered resource type.
    pub fn schema(&self, id: &str) -> Option<&Schema> {
        self.schemas().into_iter().find(|schema| schema.id == id)
    }

    pub async fn create(&self, endpoint: &str, attributes: Attributes) -> ScimResult<Resource> {
        let handler = &self.resource_type(endpoint)?.handler;
        Ok(handler.create(attributes).await?)
    }

    /// Create a resource from a raw JSON request body.
    pub async fn create_json(&self, endpoint: &str, body: &[u8]) -> ScimResult<Resource> {
        let attributes: Attributes = serde_json::from_slice(body)?;
        debug!("create {} with {} attribute(s)", endpoint, attributes.len());
        self.create(endpoint, attributes).await
    }

    pub async fn get(&self, endpoint: &str, id: &str) -> ScimResult<Resource> {
        let handler = &self.resource_type(endpoint)?.handler;
        Ok(handler.get(id).await?)
    }

    /// List resources; the page size is capped at `max_filter_results`.
    pub async fn get_all(&self, endpoint: &str, params: &ListRequestParams) -> ScimResult<Page> {
        let handler = &self.resource_type(endpoint)?.handler;
        let mut params = params.clone();
        params.count = params.count.min(self.config.max_filter_results);
        Ok(handler.get_all(&params).await?)
    }

    pub async fn replace(
        &self,
        endpoint: &str,
        id: &str,
        attributes: Attributes,
    ) -> ScimResult<Resource> {
        let handler = &self.resource_type(endpoint)?.handler;
        Ok(handler.replace(id, attributes).await?)
    }

    /// Replace a resource from a raw JSON request body.
    pub async fn replace_json(
        &self,
        endpoint: &str,
        id: &str,
        body: &[u8],
    ) -> ScimResult<Resource> {
        let attributes: Attributes = serde_json::from_slice(body)?;
        self.replace(endpoint, id, attributes).await
    }

    pub async fn delete(&self, endpoint: &str, id: &str) -> ScimResult<()> {
        let handler = &self.resource_type(endpoint)?.handler;
        Ok(handler.delete(id).await?)
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        id: &str,
        request: &PatchRequest,
    ) -> ScimResult<Resource> {
        let handler = &self.resource_type(endpoint)?.handler;
        Ok(handler.patch(id, request).await?)
    }

    /// Apply a PATCH from a raw JSON request body.
    pub async fn patch_json(&self, endpoint: &str, id: &str, body: &[u8]) -> ScimResult<Resource> {
        let request = PatchRequest::from_slice(body)?;
        debug!(
            "patch {} {} with {} operation(s)",
            endpoint,
            id,
            request.operations.len()
        );
        self.patch(endpoint, id, &request).await
    }
}

impl Server<InMemoryStore> {
    /// A server mirroring the conformance fixture: `/Users`,
    /// `/EnterpriseUsers` and `/Groups`, each backed by its own store seeded
    /// with twenty users.
    pub fn test_server() -> ScimResult<Self> {
        let user = parse_schema(embedded::core_user_schema().as_bytes())?;
        let group = parse_schema(embedded::core_group_schema().as_bytes())?;
        let enterprise = parse_schema(embedded::enterprise_user_schema().as_bytes())?;

        let config = ServiceProviderConfig {
            supports_filtering: true,
            ..ServiceProviderConfig::default()
        };
        let store = |resource_type: &str| {
            InMemoryStore::with_config_and_test_data(
                StoreConfig::default().with_resource_type(resource_type),
                TEST_SERVER_SEED,
            )
        };

        Ok(Self::new(config)
            .with_resource_type(
                ResourceType::new("User", "/Users", user.clone(), store("User"))
                    .with_id("User")
                    .with_description("User Account"),
            )
            .with_resource_type(
                ResourceType::new(
                    "EnterpriseUser",
                    "/EnterpriseUsers",
                    user,
                    store("EnterpriseUser"),
                )
                .with_id("EnterpriseUser")
                .with_description("Enterprise User Account")
                .with_extension(enterprise, false),
            )
            .with_resource_type(
                ResourceType::new("Group", "/Groups", group, store("Group"))
                    .with_id("Group")
                    .with_description("Group"),
            ))
    }
}
