use anyhow::{Context as _, Result};
use std::path::Path;

use super::{read_document, resolve_schema};
use crate::Context;

pub fn run(_ctx: &Context, resource_type: &str, document: &Path) -> Result<()> {
    let schema = resolve_schema(resource_type)?;
    let tree = read_document(document, &schema)?;

    let model = attrtree::expand(&tree, &schema.block)
        .with_context(|| format!("Could not expand {}", document.display()))?;
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}
