//! Schema registry for loading and looking up parsed schemas.

use log::info;

use super::embedded;
use super::parser::{parse_schema, parse_schema_value};
use super::types::Schema;
use crate::error::SchemaResult;

/// Ordered collection of parsed schemas keyed by schema URI.
///
/// Schemas are kept in registration order so that discovery output is
/// stable. Registering a schema whose id is already present replaces the
/// earlier definition in place.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the embedded User, Group and enterprise
    /// User schemas.
    pub fn with_embedded_schemas() -> SchemaResult<Self> {
        let mut registry = Self::new();
        for raw in [
            embedded::core_user_schema(),
            embedded::core_group_schema(),
            embedded::enterprise_user_schema(),
        ] {
            registry.add_schema(parse_schema(raw.as_bytes())?);
        }
        info!("Loaded {} embedded schema(s)", registry.len());
        Ok(registry)
    }

    /// Register an already parsed schema.
    pub fn add_schema(&mut self, schema: Schema) {
        match self.schemas.iter_mut().find(|s| s.id == schema.id) {
            Some(existing) => *existing = schema,
            None => self.schemas.push(schema),
        }
    }

    /// Parse and register a schema document, returning its id.
    pub fn add_schema_json(&mut self, raw: &[u8]) -> SchemaResult<String> {
        let schema = parse_schema(raw)?;
        let id = schema.id.clone();
        self.add_schema(schema);
        Ok(id)
    }

    /// Parse and register a schema document that is already deserialized.
    pub fn add_schema_value(&mut self, document: &serde_json::Value) -> SchemaResult<String> {
        let schema = parse_schema_value(document)?;
        let id = schema.id.clone();
        self.add_schema(schema);
        Ok(id)
    }

    /// Get a specific schema by id.
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id == id)
    }

    /// All registered schemas in registration order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The core User schema, if registered.
    pub fn user_schema(&self) -> Option<&Schema> {
        self.get_schema(embedded::USER_SCHEMA_ID)
    }

    /// The core Group schema, if registered.
    pub fn group_schema(&self) -> Option<&Schema> {
        self.get_schema(embedded::GROUP_SCHEMA_ID)
    }

    /// The enterprise User extension, if registered.
    pub fn enterprise_user_schema(&self) -> Option<&Schema> {
        self.get_schema(embedded::ENTERPRISE_USER_SCHEMA_ID)
    }
}
