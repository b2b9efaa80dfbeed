//! Resource store abstraction.
//!
//! The [`ResourceHandler`] trait is the seam between the SCIM protocol layer
//! and whatever holds resources. Its operations are HTTP-agnostic: they take
//! attribute maps, ids, list parameters and PATCH requests, and return
//! resources, pages or a [`StoreError`](crate::error::StoreError).
//!
//! # Example Usage
//!
//! ```rust
//! use scim_suite::resource::{Attributes, ListRequestParams};
//! use scim_suite::storage::{InMemoryStore, ResourceHandler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("userName", "john.doe");
//! let created = store.create(attributes).await?;
//!
//! let fetched = store.get(&created.id).await?;
//! assert_eq!(fetched.get_str("userName"), Some("john.doe"));
//!
//! let page = store
//!     .get_all(&ListRequestParams::new(1, 10).with_filter_str(r#"userName eq "john.doe""#))
//!     .await?;
//! assert_eq!(page.total_results, 1);
//!
//! store.delete(&created.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod in_memory;

pub use in_memory::InMemoryStore;

use std::future::Future;

use crate::error::StoreResult;
use crate::patch::PatchRequest;
use crate::resource::{Attributes, ListRequestParams, Page, Resource};

/// Operations a resource endpoint is backed by.
///
/// Implementations own their resources exclusively. Failures are
/// definitional (not found, uniqueness, invalid PATCH) and are never retried.
///
/// # Behavior
///
/// - `create` assigns the id and `meta`; it may reject duplicates
/// - `get`, `replace`, `delete` and `patch` fail with `NotFound` for an
///   unknown id and leave the store unchanged
/// - `get_all` filters before paginating; `totalResults` counts the
///   filtered set
/// - `patch` is all-or-nothing
pub trait ResourceHandler: Send + Sync {
    /// Store a new resource and return it with its id and `meta`.
    fn create(
        &self,
        attributes: Attributes,
    ) -> impl Future<Output = StoreResult<Resource>> + Send;

    /// Fetch a resource by id.
    fn get(&self, id: &str) -> impl Future<Output = StoreResult<Resource>> + Send;

    /// List resources, optionally filtered, one page at a time.
    fn get_all(
        &self,
        params: &ListRequestParams,
    ) -> impl Future<Output = StoreResult<Page>> + Send;

    /// Overwrite all attributes of an existing resource.
    fn replace(
        &self,
        id: &str,
        attributes: Attributes,
    ) -> impl Future<Output = StoreResult<Resource>> + Send;

    /// Remove a resource permanently.
    fn delete(&self, id: &str) -> impl Future<Output = StoreResult<()>> + Send;

    /// Apply a PATCH request to an existing resource.
    fn patch(
        &self,
        id: &str,
        request: &PatchRequest,
    ) -> impl Future<Output = StoreResult<Resource>> + Send;
}

/// Configuration for an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Attribute whose value must be distinct across resources, checked on
    /// create. `None` disables the check.
    pub unique_attribute: Option<String>,
    /// Resource type name used in log output.
    pub resource_type: String,
}

impl StoreConfig {
    pub fn with_unique_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.unique_attribute = Some(attribute.into());
        self
    }

    pub fn without_unique_attribute(mut self) -> Self {
        self.unique_attribute = None;
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            unique_attribute: Some("userName".to_string()),
            resource_type: "User".to_string(),
        }
    }
}
