//! Stored SCIM resources and their metadata.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::value::{Attributes, Value};
use super::version::Version;

/// A resource as returned by the store.
///
/// `external_id` is derived from the `externalId` attribute whenever that
/// attribute holds a string; any other shape leaves it empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: String,
    pub external_id: Option<String>,
    pub attributes: Attributes,
    pub meta: Meta,
}

impl Resource {
    pub fn new(id: impl Into<String>, attributes: Attributes, meta: Meta) -> Self {
        let external_id = external_id_of(&attributes);
        Self {
            id: id.into(),
            external_id,
            attributes,
            meta,
        }
    }

    /// Get an attribute value by exact name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get a string attribute value by exact name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Serialize to a `serde_json::Value` with `id`, `externalId` and `meta`
    /// alongside the client attributes.
    ///
    /// Keys come out as `id`, `externalId`, the attributes in stored order,
    /// then `meta`.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Top-level names the store owns; client attributes never shadow them.
const RESERVED: [&str; 3] = ["id", "externalId", "meta"];

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        if let Some(external_id) = &self.external_id {
            map.serialize_entry("externalId", external_id)?;
        }
        for (name, value) in self.attributes.iter() {
            if RESERVED.iter().any(|reserved| name.eq_ignore_ascii_case(reserved)) {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("meta", &self.meta)?;
        map.end()
    }
}

/// Extract `externalId` when it is present and string-typed.
pub(crate) fn external_id_of(attributes: &Attributes) -> Option<String> {
    attributes
        .get("externalId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Resource metadata maintained by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub version: Version,
}

impl Meta {
    /// Metadata for a resource written for the first time at `now`.
    pub fn new(now: DateTime<Utc>, version: Version) -> Self {
        Self {
            created: now,
            last_modified: now,
            version,
        }
    }

    /// Metadata after a PATCH: same creation time, revised version.
    pub fn patched(&self, now: DateTime<Utc>) -> Self {
        Self {
            created: self.created,
            last_modified: now,
            version: self.version.revised(),
        }
    }

    /// Metadata after a full replacement: same creation time, fresh version.
    pub fn replaced(&self, now: DateTime<Utc>, version: Version) -> Self {
        Self {
            created: self.created,
            last_modified: now,
            version,
        }
    }
}
