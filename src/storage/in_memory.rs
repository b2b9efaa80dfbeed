//! In-memory resource store.
//!
//! A single `tokio` read/write lock guards the whole store: mutations take
//! the write half, reads share the read half. Alongside the id lookup map the
//! store keeps an insertion-ordered index so that listings and pagination
//! are stable across calls.
//!
//! # Performance Characteristics
//!
//! * GET/REPLACE/PATCH: O(1) average case
//! * CREATE: O(n) when a unique attribute is configured
//! * DELETE: O(n) to maintain the ordered index
//! * LIST: O(n) filter scan, then page slice

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ResourceHandler, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::patch::{PatchRequest, apply_patch};
use crate::resource::{Attributes, ListRequestParams, Meta, Page, Resource, Value, Version};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, Resource>,
    order: Vec<String>,
}

impl Inner {
    fn insert(&mut self, resource: Resource) {
        if self.records.insert(resource.id.clone(), resource.clone()).is_none() {
            self.order.push(resource.id);
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

/// Thread-safe in-memory implementation of [`ResourceHandler`].
///
/// Cloning is cheap and every clone shares the same data.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    config: StoreConfig,
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Create a store seeded with `count` fixture users.
    ///
    /// Ids run `0001`, `0002`, ... and user names `test01`, `test02`, ...;
    /// each entry also carries `externalId`, `name`, `active` and `emails`,
    /// plus fixed `meta` timestamps and a `v000000001`-style version.
    pub fn with_test_data(count: usize) -> Self {
        Self::with_config_and_test_data(StoreConfig::default(), count)
    }

    pub fn with_config_and_test_data(config: StoreConfig, count: usize) -> Self {
        let mut inner = Inner::default();
        for i in 1..=count {
            inner.insert(fixture(i));
        }
        debug!("Seeded {} store with {} resource(s)", config.resource_type, count);
        Self {
            config,
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored resources.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every resource (useful for testing).
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        guard.records.clear();
        guard.order.clear();
    }

    /// Reject `attributes` if another resource holds the same unique value.
    ///
    /// The attribute name matches case-insensitively on both sides.
    fn check_uniqueness(&self, inner: &Inner, attributes: &Attributes) -> StoreResult<()> {
        let Some(attribute) = &self.config.unique_attribute else {
            return Ok(());
        };
        let candidate = match attributes.get_ignore_case(attribute) {
            None | Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };
        if inner
            .iter()
            .any(|existing| existing.attributes.get_ignore_case(attribute) == Some(candidate))
        {
            let value = match candidate {
                Value::String(value) => value.clone(),
                other => serde_json::Value::from(other.clone()).to_string(),
            };
            warn!(
                "Rejected {} create: {} '{}' already in use",
                self.config.resource_type, attribute, value
            );
            return Err(StoreError::UniquenessViolation {
                attribute: attribute.clone(),
                value,
            });
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Fresh version for a full write of `attributes` under `id`.
fn content_version(id: &str, attributes: &Attributes) -> StoreResult<Version> {
    let mut content = id.as_bytes().to_vec();
    serde_json::to_writer(&mut content, attributes)
        .map_err(|e| StoreError::serialization(e.to_string()))?;
    Ok(Version::from_content(&content))
}

fn fixture(i: usize) -> Resource {
    let attributes: Attributes = [
        ("userName", Value::from(format!("test{:02}", i))),
        ("externalId", Value::from(format!("external{:02}", i))),
        (
            "name",
            Value::from(Attributes::from_iter([
                ("familyName", format!("familyName{:02}", i)),
                ("givenName", format!("givenName{:02}", i)),
            ])),
        ),
        ("active", Value::from(true)),
        (
            "emails",
            Value::from(vec![Value::from(Attributes::from_iter([(
                "value",
                format!("{:02}@example.com", i),
            )]))]),
        ),
    ]
    .into_iter()
    .collect();

    // Fixture days cycle through 1..=28 so every index yields a valid date
    let day = ((i - 1) % 28 + 1) as u32;
    let meta = Meta {
        created: fixture_time(1, day, 15, 4, 5),
        last_modified: fixture_time(2, day, 16, 5, 4),
        version: Version::from_hash(format!("v{:09}", i)),
    };
    Resource::new(format!("{:04}", i), attributes, meta)
}

/// A 2020 timestamp at UTC+07:00.
fn fixture_time(month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    FixedOffset::east_opt(7 * 3600)
        .and_then(|offset| offset.with_ymd_and_hms(2020, month, day, hour, min, sec).single())
        .map(|time| time.with_timezone(&Utc))
        .unwrap_or_default()
}

impl ResourceHandler for InMemoryStore {
    async fn create(&self, attributes: Attributes) -> StoreResult<Resource> {
        let mut guard = self.inner.write().await;
        self.check_uniqueness(&guard, &attributes)?;

        let id = Uuid::new_v4().to_string();
        let meta = Meta::new(Utc::now(), content_version(&id, &attributes)?);
        let resource = Resource::new(id, attributes, meta);
        guard.insert(resource.clone());

        info!(
            "Created {} {} (version {})",
            self.config.resource_type, resource.id, resource.meta.version
        );
        Ok(resource)
    }

    async fn get(&self, id: &str) -> StoreResult<Resource> {
        let guard = self.inner.read().await;
        match guard.records.get(id) {
            Some(resource) => {
                trace!("Found {} {}", self.config.resource_type, id);
                Ok(resource.clone())
            }
            None => {
                debug!("{} {} not found", self.config.resource_type, id);
                Err(StoreError::not_found(id))
            }
        }
    }

    async fn get_all(&self, params: &ListRequestParams) -> StoreResult<Page> {
        let guard = self.inner.read().await;
        let matching: Vec<&Resource> = match &params.filter {
            Some(filter) => guard.iter().filter(|r| filter.matches(r)).collect(),
            None => guard.iter().collect(),
        };
        let total_results = matching.len();
        let resources: Vec<Resource> = matching
            .into_iter()
            .skip(params.offset())
            .take(params.count)
            .cloned()
            .collect();

        debug!(
            "Listed {} {} of {} resource(s) from index {}",
            resources.len(),
            self.config.resource_type,
            total_results,
            params.start_index
        );
        Ok(Page {
            total_results,
            resources,
        })
    }

    async fn replace(&self, id: &str, attributes: Attributes) -> StoreResult<Resource> {
        let mut guard = self.inner.write().await;
        let existing = guard.records.get(id).ok_or_else(|| StoreError::not_found(id))?;

        let meta = existing
            .meta
            .replaced(Utc::now(), content_version(id, &attributes)?);
        let resource = Resource::new(id, attributes, meta);
        guard.insert(resource.clone());

        info!(
            "Replaced {} {} (version {})",
            self.config.resource_type, id, resource.meta.version
        );
        Ok(resource)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        if guard.records.remove(id).is_none() {
            debug!("{} {} not found for delete", self.config.resource_type, id);
            return Err(StoreError::not_found(id));
        }
        guard.order.retain(|existing| existing != id);

        info!("Deleted {} {}", self.config.resource_type, id);
        Ok(())
    }

    async fn patch(&self, id: &str, request: &PatchRequest) -> StoreResult<Resource> {
        let mut guard = self.inner.write().await;
        let existing = guard.records.get(id).ok_or_else(|| StoreError::not_found(id))?;

        let resource = apply_patch(existing, request)?;
        guard.insert(resource.clone());

        info!(
            "Patched {} {} (version {})",
            self.config.resource_type, id, resource.meta.version
        );
        Ok(resource)
    }
}
