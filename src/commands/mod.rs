pub mod config;
pub mod diff;
pub mod expand;
pub mod identity;
pub mod schema;

use crate::catalog;
use crate::paths;
use anyhow::{Context as _, Result, bail};
use attrtree::{AttributeTree, ResourceSchema};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Resolve a built-in resource schema or fail with the list of known types.
pub fn resolve_schema(resource_type: &str) -> Result<ResourceSchema> {
    match catalog::lookup(resource_type) {
        Some(schema) => Ok(schema),
        None => bail!(
            "Unknown resource type '{}'. Known types: {}",
            resource_type,
            catalog::TYPES.join(", ")
        ),
    }
}

/// Read a JSON document from a file, or stdin for `-`.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read document from stdin")?;
        buf
    } else {
        let path = paths::expand(&path.to_string_lossy());
        fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))?
    };
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read a document as an attribute tree under `schema`.
pub fn read_document(path: &Path, schema: &ResourceSchema) -> Result<AttributeTree> {
    let json = read_json(path)?;
    attrtree::from_json(&json, &schema.block).with_context(|| {
        format!(
            "{} is not a valid {} document",
            path.display(),
            schema.type_name
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_unknown_type_lists_known() {
        let err = resolve_schema("nope").unwrap_err();
        assert!(err.to_string().contains("codebuild_project"));
    }

    #[test]
    fn test_read_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"project": "acme", "location_id": "us-central"}"#).unwrap();

        let schema = resolve_schema("appengine_application").unwrap();
        let tree = read_document(&path, &schema).unwrap();
        assert_eq!(tree.get_str("location_id").unwrap(), Some("us-central"));
    }

    #[test]
    fn test_read_document_rejects_unknown_attribute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"region": "us-central"}"#).unwrap();

        let schema = resolve_schema("appengine_application").unwrap();
        let err = read_document(&path, &schema).unwrap_err();
        assert!(format!("{err:#}").contains("region"));
    }
}
