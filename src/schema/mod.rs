//! Schema model and parser for RFC 7643 schema documents.
//!
//! # Key Types
//!
//! - [`Schema`] - A parsed schema with its ordered attribute definitions
//! - [`Attribute`] - One attribute, its characteristics and type-specific data
//! - [`SchemaRegistry`] - Ordered registry of parsed schemas
//!
//! # Examples
//!
//! ```rust
//! use scim_suite::schema::SchemaRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::with_embedded_schemas()?;
//! let user = registry.user_schema().expect("core User schema");
//! assert!(user.attribute("userName").is_some_and(|a| a.required));
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod parser;
pub mod registry;
pub mod types;


pub use parser::{parse_schema, parse_schema_value};
pub use registry::SchemaRegistry;
pub use types::{
    Attribute, AttributeKind, AttributeType, Mutability, ReferenceType, Returned, Schema,
    Uniqueness, is_valid_attribute_name,
};
