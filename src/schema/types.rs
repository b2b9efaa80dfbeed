//! Core schema type definitions for SCIM resources.
//!
//! This module contains the data structures that describe SCIM schemas and
//! attribute definitions as specified in RFC 7643. The types are pure data;
//! the only behavior is construction helpers that validate enum membership.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// A SCIM schema definition.
///
/// Each schema defines the attributes of a resource type like User or Group.
/// Attribute order follows the order of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Unique schema identifier (URI), never empty
    pub id: String,
    /// Human-readable schema name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Schema description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attribute definitions in document order
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Find a top-level attribute by name.
    ///
    /// Attribute names are case-insensitive per RFC 7643 Section 2.1.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Attributes that must be present on every resource.
    pub fn required_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|attr| attr.required)
    }
}

/// Definition of a SCIM attribute.
///
/// The characteristics shared by every data type live directly on the
/// struct; type-specific characteristics live in [`AttributeKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, conforming to the ATTRNAME grammar
    pub name: String,
    pub description: Option<String>,
    pub multi_valued: bool,
    pub required: bool,
    pub mutability: Mutability,
    pub returned: Returned,
    /// Always [`Uniqueness::None`] for boolean, dateTime and binary attributes
    pub uniqueness: Uniqueness,
    pub kind: AttributeKind,
}

impl Attribute {
    /// Create an attribute with RFC 7643 default characteristics.
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            multi_valued: false,
            required: false,
            mutability: Mutability::default(),
            returned: Returned::default(),
            uniqueness: Uniqueness::default(),
            kind,
        }
    }

    /// The data type of this attribute.
    pub fn attribute_type(&self) -> AttributeType {
        self.kind.attribute_type()
    }

    /// Sub-attributes of a complex attribute; empty for every other type.
    pub fn sub_attributes(&self) -> &[Attribute] {
        match &self.kind {
            AttributeKind::Complex { sub_attributes } => sub_attributes,
            _ => &[],
        }
    }

    /// Find a sub-attribute by name (case-insensitive).
    pub fn sub_attribute(&self, name: &str) -> Option<&Attribute> {
        self.sub_attributes()
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Whether string comparisons on this attribute are case-sensitive.
    pub fn case_exact(&self) -> bool {
        matches!(
            self.kind,
            AttributeKind::String {
                case_exact: true,
                ..
            }
        )
    }
}

/// Type-specific characteristics of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    String {
        case_exact: bool,
        canonical_values: Vec<String>,
    },
    Boolean,
    Decimal,
    Integer,
    DateTime,
    Binary,
    Reference {
        reference_types: Vec<ReferenceType>,
    },
    /// Holds simple sub-attributes only; never empty.
    Complex {
        sub_attributes: Vec<Attribute>,
    },
}

impl AttributeKind {
    /// The data type tag of this kind.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String { .. } => AttributeType::String,
            Self::Boolean => AttributeType::Boolean,
            Self::Decimal => AttributeType::Decimal,
            Self::Integer => AttributeType::Integer,
            Self::DateTime => AttributeType::DateTime,
            Self::Binary => AttributeType::Binary,
            Self::Reference { .. } => AttributeType::Reference,
            Self::Complex { .. } => AttributeType::Complex,
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.attribute_type().as_str())?;
        map.serialize_entry("multiValued", &self.multi_valued)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        map.serialize_entry("required", &self.required)?;
        match &self.kind {
            AttributeKind::String {
                case_exact,
                canonical_values,
            } => {
                map.serialize_entry("caseExact", case_exact)?;
                if !canonical_values.is_empty() {
                    map.serialize_entry("canonicalValues", canonical_values)?;
                }
            }
            AttributeKind::Reference { reference_types } => {
                map.serialize_entry("referenceTypes", reference_types)?;
            }
            AttributeKind::Complex { sub_attributes } => {
                map.serialize_entry("subAttributes", sub_attributes)?;
            }
            _ => {}
        }
        map.serialize_entry("mutability", self.mutability.as_str())?;
        map.serialize_entry("returned", self.returned.as_str())?;
        map.serialize_entry("uniqueness", self.uniqueness.as_str())?;
        map.end()
    }
}

/// SCIM attribute data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    String,
    Boolean,
    Decimal,
    Integer,
    DateTime,
    Binary,
    Reference,
    Complex,
}

impl AttributeType {
    /// The token used for this type in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::DateTime => "dateTime",
            Self::Binary => "binary",
            Self::Reference => "reference",
            Self::Complex => "complex",
        }
    }

    /// Whether the `uniqueness` characteristic applies to this type.
    pub fn supports_uniqueness(&self) -> bool {
        !matches!(self, Self::Boolean | Self::DateTime | Self::Binary)
    }
}

impl FromStr for AttributeType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "decimal" => Ok(Self::Decimal),
            "integer" => Ok(Self::Integer),
            "dateTime" => Ok(Self::DateTime),
            "binary" => Ok(Self::Binary),
            "reference" => Ok(Self::Reference),
            "complex" => Ok(Self::Complex),
            other => Err(SchemaError::UnknownAttributeType {
                token: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a closed set of schema tokens with `as_str`, `FromStr` and a default.
///
/// Unknown tokens are rejected with [`SchemaError::UnknownEnumValue`] naming
/// the schema field they came from.
macro_rules! characteristic {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal,
        { $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// The schema field this characteristic is read from.
            pub const FIELD: &'static str = $field;

            /// The token used for this value in schema documents.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    other => Err(SchemaError::UnknownEnumValue {
                        field: $field.to_string(),
                        token: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

characteristic! {
    /// Whether and how an attribute can be modified.
    Mutability, field = "mutability",
    {
        /// Managed by the service provider
        ReadOnly => "readOnly",
        #[default]
        ReadWrite => "readWrite",
        /// Set once, never modified
        Immutable => "immutable",
        /// Never returned (passwords and the like)
        WriteOnly => "writeOnly",
    }
}

characteristic! {
    /// When an attribute is included in responses.
    Returned, field = "returned",
    {
        Always => "always",
        Never => "never",
        #[default]
        Default => "default",
        Request => "request",
    }
}

characteristic! {
    /// Scope in which an attribute value must be distinct.
    Uniqueness, field = "uniqueness",
    {
        #[default]
        None => "none",
        Server => "server",
        Global => "global",
    }
}

/// Resource types a reference attribute may point at.
///
/// Unrecognized tokens are kept as [`ReferenceType::Custom`] so that vendor
/// extensions parse without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    External,
    Uri,
    /// A resource type name such as `User` or `Group`, or a vendor token
    Custom(String),
}

impl ReferenceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::External => "external",
            Self::Uri => "uri",
            Self::Custom(token) => token,
        }
    }
}

impl From<&str> for ReferenceType {
    fn from(token: &str) -> Self {
        match token {
            "external" => Self::External,
            "uri" => Self::Uri,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl Serialize for ReferenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Check a name against the RFC 7643 ATTRNAME grammar.
///
/// ```text
/// ATTRNAME = ALPHA *(nameChar)
/// nameChar = "$" / "-" / "_" / DIGIT / ALPHA
/// ```
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '-' | '_'))
        }
        _ => false,
    }
}
