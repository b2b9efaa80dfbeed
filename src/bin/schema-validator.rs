//! # SCIM Schema Validator
//!
//! Checks that RFC 7643 schema documents parse with the same parser the
//! library uses, and prints a short summary of each one.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-validator schemas/User.json
//! cargo run --bin schema-validator ./schemas/
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! Validating schema file: schemas/User.json
//! ✓ Schema is valid!
//!
//! Schema Summary:
//!   ID: urn:ietf:params:scim:schemas:core:2.0:User
//!   Name: User
//!   Attributes: 15
//!   Required attributes: userName
//!   Attribute types:
//!     - string: 10
//!     - boolean: 1
//!     - complex: 4
//! ```
//!
//! In directory mode every `*.json` file is parsed and all valid schemas are
//! loaded into one [`SchemaRegistry`] to catch duplicate ids.
//!
//! ## Exit Codes
//!
//! - `0`: All schemas are valid
//! - `1`: One or more schemas are invalid or a file could not be read

use scim_suite::schema::{Schema, SchemaRegistry, parse_schema};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <schema-file-or-directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} schemas/User.json", args[0]);
        eprintln!("  {} ./schemas/", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);

    let ok = if path.is_file() {
        validate_single_file(path)
    } else if path.is_dir() {
        validate_directory(path)
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        false
    };

    if !ok {
        process::exit(1);
    }
}

fn validate_single_file(file_path: &Path) -> bool {
    println!("Validating schema file: {}", file_path.display());

    match load_schema(file_path) {
        Ok(schema) => {
            println!("✓ Schema is valid!");
            print_schema_summary(&schema);
            true
        }
        Err(e) => {
            eprintln!("❌ Schema validation failed: {}", e);
            false
        }
    }
}

fn validate_directory(dir_path: &Path) -> bool {
    println!("Validating schemas in directory: {}", dir_path.display());

    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            return false;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut registry = SchemaRegistry::new();
    let mut valid_count = 0;
    let mut error_count = 0;

    for path in &paths {
        println!("\nValidating: {}", path.display());
        match load_schema(path) {
            Ok(schema) => {
                println!("  ✓ Valid - {} ({})", display_name(&schema), schema.id);
                if registry.get_schema(&schema.id).is_some() {
                    eprintln!("  ⚠ Duplicate schema id {}", schema.id);
                    error_count += 1;
                } else {
                    valid_count += 1;
                }
                registry.add_schema(schema);
            }
            Err(e) => {
                eprintln!("  ❌ Invalid - {}", e);
                error_count += 1;
            }
        }
    }

    println!("\nValidation Summary:");
    println!("  Valid schemas: {}", valid_count);
    println!("  Invalid schemas: {}", error_count);
    println!("  Registered schemas:");
    for schema in registry.schemas() {
        println!("    - {} ({})", display_name(schema), schema.id);
    }

    error_count == 0
}

fn load_schema(file_path: &Path) -> Result<Schema, Box<dyn std::error::Error>> {
    let content = fs::read(file_path)?;
    Ok(parse_schema(&content)?)
}

fn display_name(schema: &Schema) -> &str {
    schema.name.as_deref().unwrap_or("<unnamed>")
}

fn print_schema_summary(schema: &Schema) {
    println!();
    println!("Schema Summary:");
    println!("  ID: {}", schema.id);
    println!("  Name: {}", display_name(schema));
    if let Some(description) = &schema.description {
        println!("  Description: {}", description);
    }
    println!("  Attributes: {}", schema.attributes.len());

    let required: Vec<&str> = schema
        .required_attributes()
        .map(|attr| attr.name.as_str())
        .collect();
    if !required.is_empty() {
        println!("  Required attributes: {}", required.join(", "));
    }

    // Counted in first-seen order so the output is stable
    let mut type_counts: Vec<(&str, usize)> = Vec::new();
    for attr in &schema.attributes {
        let name = attr.attribute_type().as_str();
        match type_counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => type_counts.push((name, 1)),
        }
    }
    println!("  Attribute types:");
    for (attr_type, count) in type_counts {
        println!("    - {}: {}", attr_type, count);
    }
}
