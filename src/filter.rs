//! Attribute equality filters for resource listings.
//!
//! Only the narrowest slice of the RFC 7644 Section 3.4.2.2 grammar is
//! evaluated:
//!
//! ```text
//! filter = ATTRNAME SP "eq" SP compValue
//! compValue = string   ; JSON string literal
//! ```
//!
//! Every other expression (other operators, logical combinators, value
//! paths, non-string literals) parses to [`Filter::Unsupported`] and matches
//! nothing. This is a scope limit, not a parse error.
//!
//! ```rust
//! use scim_suite::filter::Filter;
//!
//! let filter = Filter::parse(r#"userName eq "bjensen""#);
//! assert_eq!(filter, Filter::equal("userName", "bjensen"));
//!
//! let other = Filter::parse(r#"userName sw "b""#);
//! assert!(matches!(other, Filter::Unsupported(_)));
//! ```

use std::fmt;

use crate::resource::{Resource, Value};
use crate::schema::is_valid_attribute_name;

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `attribute eq "value"` on a top-level attribute
    Equal { attribute: String, value: String },
    /// Any expression outside the supported grammar, kept verbatim
    Unsupported(String),
}

impl Filter {
    /// Build an equality filter directly.
    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Parse a filter expression. Never fails; see the module docs.
    pub fn parse(expression: &str) -> Self {
        Self::parse_equality(expression.trim())
            .unwrap_or_else(|| Self::Unsupported(expression.to_string()))
    }

    fn parse_equality(expression: &str) -> Option<Self> {
        let (attribute, rest) = expression.split_once(char::is_whitespace)?;
        let (operator, literal) = rest.trim_start().split_once(char::is_whitespace)?;

        if !operator.eq_ignore_ascii_case("eq") || !is_valid_attribute_name(attribute) {
            return None;
        }

        let literal = literal.trim();
        if !literal.starts_with('"') {
            return None;
        }
        // A JSON string literal, so escapes decode exactly as RFC 7644 defines
        let value: String = serde_json::from_str(literal).ok()?;

        Some(Self::equal(attribute, value))
    }

    /// Evaluate this filter against a resource.
    ///
    /// Attribute names compare case-insensitively; values compare exactly
    /// and only against string-typed attributes.
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            Self::Equal { attribute, value } => {
                if attribute.eq_ignore_ascii_case("id") {
                    return resource.id == *value;
                }
                matches!(
                    resource.attributes.get_ignore_case(attribute),
                    Some(Value::String(actual)) if actual == value
                )
            }
            Self::Unsupported(_) => false,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal { attribute, value } => {
                let literal = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                write!(f, "{} eq {}", attribute, literal)
            }
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

impl From<&str> for Filter {
    fn from(expression: &str) -> Self {
        Self::parse(expression)
    }
}

/// Evaluate `filter` against `resource`.
pub fn matches(resource: &Resource, filter: &Filter) -> bool {
    filter.matches(resource)
}
