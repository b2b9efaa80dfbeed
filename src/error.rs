//! Error types for schema parsing, PATCH processing and resource storage.
//!
//! Each layer has its own error enum so callers can match on the exact
//! failure without string inspection. [`ScimError`] wraps all of them for
//! code that drives the whole crate through the [`Server`](crate::Server)
//! façade.

/// Errors produced while turning a raw schema document into a [`Schema`].
///
/// All variants are fatal to the parse call; the caller must treat the
/// schema as absent.
///
/// [`Schema`]: crate::schema::Schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Input is not valid JSON, or not a JSON object where one is required
    #[error("Malformed schema document: {message}")]
    MalformedInput { message: String },

    /// The schema `id` is missing or empty
    #[error("Schema 'id' is missing or empty")]
    MissingId,

    /// A recognized field holds a value of the wrong JSON type
    #[error("Field '{field}' has invalid type, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// The attribute `type` is not one of the RFC 7643 data types
    #[error("Unknown attribute type '{token}'")]
    UnknownAttributeType { token: String },

    /// A `mutability`, `returned` or `uniqueness` token is not recognized
    #[error("Unknown value '{token}' for '{field}'")]
    UnknownEnumValue { field: String, token: String },

    /// A complex attribute declares no sub-attributes
    #[error("Complex attribute '{attribute}' must declare at least one sub-attribute")]
    EmptySubAttributes { attribute: String },

    /// An attribute name is missing or violates the ATTRNAME grammar
    #[error("Invalid attribute name '{name}'")]
    InvalidAttributeName { name: String },

    /// A complex attribute declares a complex sub-attribute
    #[error("Complex attribute '{attribute}' cannot be nested inside another complex attribute")]
    NestedComplexAttribute { attribute: String },
}

/// Errors produced while validating or applying PATCH operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The `op` member is not `add`, `replace` or `remove`
    #[error("Unsupported PATCH operation '{op}'")]
    UnsupportedOperation { op: String },

    /// The operation is structurally invalid (missing path, missing value, ...)
    #[error("Invalid PATCH operation at index {index}: {reason}")]
    InvalidOperation { index: usize, reason: String },
}

impl PatchError {
    pub(crate) fn invalid(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            index,
            reason: reason.into(),
        }
    }
}

/// Errors produced by resource store operations.
///
/// These are definitional, not transient: callers should surface them
/// rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No resource is stored under the given identifier
    #[error("Resource {id} not found")]
    NotFound { id: String },

    /// Another resource already holds the same unique attribute value
    #[error("Attribute '{attribute}' value '{value}' is already in use")]
    UniquenessViolation { attribute: String, value: String },

    /// A PATCH request could not be applied
    #[error("PATCH failed: {0}")]
    Patch(#[from] PatchError),

    /// Resource content could not be serialized for versioning
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// SCIM `scimType` detail keyword for this error, if RFC 7644 defines one.
    pub fn scim_type(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::Serialization { .. } => None,
            Self::UniquenessViolation { .. } => Some("uniqueness"),
            Self::Patch(PatchError::UnsupportedOperation { .. }) => Some("invalidSyntax"),
            Self::Patch(PatchError::InvalidOperation { .. }) => Some("invalidValue"),
        }
    }
}

/// Umbrella error for callers that go through the [`Server`](crate::Server) façade.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Schema parsing failed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A request body could not be deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No resource type is registered for the endpoint
    #[error("No resource type is registered at endpoint '{endpoint}'")]
    UnknownEndpoint { endpoint: String },
}

impl From<PatchError> for ScimError {
    fn from(err: PatchError) -> Self {
        Self::Store(StoreError::Patch(err))
    }
}

/// Result type for schema parsing.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for façade operations.
pub type ScimResult<T> = Result<T, ScimError>;
