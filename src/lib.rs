//! SCIM 2.0 schema model, PATCH engine and resource store for Rust.
//!
//! Parses RFC 7643 schema documents into a typed attribute model, applies
//! RFC 7644 PATCH operations to stored resources, and serves them from an
//! async in-memory store with equality filtering and stable pagination.
//!
//! # Core Components
//!
//! - [`schema`] - Attribute model, [`parse_schema`] and [`SchemaRegistry`]
//! - [`patch`] - [`PatchRequest`] and the add/replace/remove engine
//! - [`filter`] - `attribute eq "value"` filters for listings
//! - [`storage`] - [`ResourceHandler`] trait and [`InMemoryStore`]
//! - [`Server`] - Routes endpoints to resource types and their handlers
//!
//! # Quick Start
//!
//! ```rust
//! use scim_suite::patch::{PatchOperation, PatchRequest};
//! use scim_suite::resource::Attributes;
//! use scim_suite::{InMemoryStore, ResourceHandler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("userName", "bjensen");
//! let user = store.create(attributes).await?;
//!
//! let request = PatchRequest::new(vec![PatchOperation::replace("displayName", "Babs")]);
//! let patched = store.patch(&user.id, &request).await?;
//! assert_eq!(patched.get_str("displayName"), Some("Babs"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod patch;
pub mod resource;
pub mod schema;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{PatchError, SchemaError, ScimError, ScimResult, StoreError, StoreResult};
pub use filter::Filter;
pub use patch::{PatchOp, PatchOperation, PatchRequest, apply_patch};
pub use resource::{Attributes, ListRequestParams, Meta, Page, Resource, Value, Version};
pub use schema::{Attribute, AttributeType, Schema, SchemaRegistry, parse_schema};
pub use server::{ResourceType, SchemaExtension, Server, ServiceProviderConfig};
pub use storage::{InMemoryStore, ResourceHandler, StoreConfig};
