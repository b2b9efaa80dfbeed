//! SCIM PATCH request model and application engine.
//!
//! Implements the whole-attribute subset of RFC 7644 Section 3.5.2:
//!
//! | op        | path present              | path absent (value is an object)          |
//! |-----------|---------------------------|-------------------------------------------|
//! | `add`     | set `attributes[path]`    | per key: append to arrays, else set       |
//! | `replace` | set `attributes[path]`    | per key: set                              |
//! | `remove`  | set `attributes[path]` to null | invalid                              |
//!
//! `remove` leaves a `null` tombstone rather than deleting the key. Value
//! filter paths such as `members[value eq "2819c223"]` are rejected.
//! Attribute names match case-insensitively (RFC 7643 Section 2.1), so a
//! path of `username` updates an existing `userName` under its stored name.
//!
//! Batches are all-or-nothing: every operation is validated before any is
//! applied, operations are applied in order to a copy of the attributes,
//! and the copy is only returned once the whole batch has gone through.
//!
//! ```rust
//! use scim_suite::patch::{PatchOperation, PatchRequest, apply_operations};
//! use scim_suite::resource::{Attributes, Value};
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("userName", "bjensen");
//!
//! let request = PatchRequest::new(vec![
//!     PatchOperation::replace("displayName", "Babs"),
//!     PatchOperation::remove("userName"),
//! ]);
//! let patched = apply_operations(&attributes, &request).unwrap();
//! assert_eq!(patched.get("displayName"), Some(&Value::from("Babs")));
//! assert_eq!(patched.get("userName"), Some(&Value::Null));
//! ```

use chrono::{DateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PatchError;
use crate::resource::{Attributes, Resource, Value};

/// Schema URI identifying a PATCH request body.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// A SCIM PATCH request.
///
/// The `schemas` member is accepted but not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    /// Create a request carrying the PatchOp schema URI.
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations,
        }
    }

    /// Deserialize a request body.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Check every operation without applying any of them.
    pub fn validate(&self) -> Result<(), PatchError> {
        self.mutations().map(|_| ())
    }

    fn mutations(&self) -> Result<Vec<Mutation<'_>>, PatchError> {
        self.operations
            .iter()
            .enumerate()
            .map(|(index, operation)| operation.mutation(index))
            .collect()
    }
}

/// A single PATCH operation as it appears on the wire.
///
/// `op` is kept as the raw token so that unknown operations surface as
/// [`PatchError::UnsupportedOperation`] rather than a deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

/// Distinguish an explicit `"value": null` from a missing member.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    pub fn new(op: PatchOp, path: Option<&str>, value: Option<Value>) -> Self {
        Self {
            op: op.as_str().to_string(),
            path: path.map(str::to_string),
            value,
        }
    }

    /// `add` targeting a single attribute.
    pub fn add(path: &str, value: impl Into<Value>) -> Self {
        Self::new(PatchOp::Add, Some(path), Some(value.into()))
    }

    /// Path-less `add` merging `value` into the resource.
    pub fn add_all(value: Attributes) -> Self {
        Self::new(PatchOp::Add, None, Some(Value::Object(value)))
    }

    /// `replace` targeting a single attribute.
    pub fn replace(path: &str, value: impl Into<Value>) -> Self {
        Self::new(PatchOp::Replace, Some(path), Some(value.into()))
    }

    /// Path-less `replace` overwriting each attribute named in `value`.
    pub fn replace_all(value: Attributes) -> Self {
        Self::new(PatchOp::Replace, None, Some(Value::Object(value)))
    }

    pub fn remove(path: &str) -> Self {
        Self::new(PatchOp::Remove, Some(path), None)
    }

    /// The non-empty path, if any. An empty string counts as no path.
    fn target(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| !path.is_empty())
    }

    fn mutation(&self, index: usize) -> Result<Mutation<'_>, PatchError> {
        let op: PatchOp = self.op.parse()?;

        if let Some(path) = self.target() {
            if path.contains('[') {
                return Err(PatchError::invalid(
                    index,
                    format!("value filter paths are not supported: {}", path),
                ));
            }
        }

        match (op, self.target()) {
            (PatchOp::Remove, Some(path)) => Ok(Mutation::Tombstone(path)),
            (PatchOp::Remove, None) => Err(PatchError::invalid(index, "'remove' requires a path")),
            (op, path) => {
                let value = self.value.as_ref().ok_or_else(|| {
                    PatchError::invalid(index, format!("'{}' requires a value", op))
                })?;
                match (op, path) {
                    (_, Some(path)) => Ok(Mutation::Set(path, value)),
                    (op, None) => {
                        let map = value.as_object().ok_or_else(|| {
                            PatchError::invalid(
                                index,
                                format!(
                                    "'{}' without a path needs an object value, got {}",
                                    op,
                                    value.kind()
                                ),
                            )
                        })?;
                        Ok(if op == PatchOp::Add {
                            Mutation::Merge(map)
                        } else {
                            Mutation::Overwrite(map)
                        })
                    }
                }
            }
        }
    }
}

/// The recognized PATCH operation tokens, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }
}

impl FromStr for PatchOp {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            "remove" => Ok(Self::Remove),
            _ => Err(PatchError::UnsupportedOperation { op: s.to_string() }),
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated operation, ready to apply without further failure.
#[derive(Debug)]
enum Mutation<'a> {
    /// `add`/`replace` with a path
    Set(&'a str, &'a Value),
    /// Path-less `add`
    Merge(&'a Attributes),
    /// Path-less `replace`
    Overwrite(&'a Attributes),
    /// `remove`
    Tombstone(&'a str),
}

impl Mutation<'_> {
    fn apply(&self, attributes: &mut Attributes) {
        match self {
            Mutation::Set(path, value) => {
                attributes.insert_ignore_case(*path, (*value).clone());
            }
            Mutation::Merge(map) => {
                for (key, value) in map.iter() {
                    match attributes.get_mut_ignore_case(key) {
                        Some(Value::Array(existing)) => match value {
                            Value::Array(items) => existing.extend(items.iter().cloned()),
                            single => existing.push(single.clone()),
                        },
                        _ => {
                            attributes.insert_ignore_case(key, value.clone());
                        }
                    }
                }
            }
            Mutation::Overwrite(map) => {
                for (key, value) in map.iter() {
                    attributes.insert_ignore_case(key, value.clone());
                }
            }
            Mutation::Tombstone(path) => {
                attributes.insert_ignore_case(*path, Value::Null);
            }
        }
    }
}

/// Apply a PATCH request to a copy of `attributes`.
///
/// Later operations see the effect of earlier ones. On error `attributes` is
/// untouched and no partial result is produced.
pub fn apply_operations(
    attributes: &Attributes,
    request: &PatchRequest,
) -> Result<Attributes, PatchError> {
    let mutations = request.mutations()?;

    let mut patched = attributes.clone();
    for mutation in &mutations {
        trace!("Applying PATCH mutation {:?}", mutation);
        mutation.apply(&mut patched);
    }
    Ok(patched)
}

/// Apply a PATCH request to a resource, stamping the current time.
pub fn apply_patch(resource: &Resource, request: &PatchRequest) -> Result<Resource, PatchError> {
    apply_patch_at(resource, request, Utc::now())
}

/// Apply a PATCH request to a resource as of `now`.
///
/// `meta.created` is preserved, `meta.lastModified` becomes `now` and
/// `meta.version` is revised from the prior version.
pub fn apply_patch_at(
    resource: &Resource,
    request: &PatchRequest,
    now: DateTime<Utc>,
) -> Result<Resource, PatchError> {
    let attributes = apply_operations(&resource.attributes, request)?;
    let meta = resource.meta.patched(now);
    debug!(
        "Patched resource {} with {} operation(s), version {} -> {}",
        resource.id,
        request.operations.len(),
        resource.meta.version,
        meta.version
    );
    Ok(Resource::new(resource.id.clone(), attributes, meta))
}
