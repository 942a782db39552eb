use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::{read_document, resolve_schema};
use crate::Context;
use crate::ui;

pub fn run(
    ctx: &Context,
    resource_type: &str,
    declared: &Path,
    observed: &Path,
    json: bool,
) -> Result<()> {
    let schema = resolve_schema(resource_type)?;
    let declared_tree = read_document(declared, &schema)?;
    let observed_tree = read_document(observed, &schema)?;

    let changes = attrtree::diff(&observed_tree, &declared_tree, &schema.block);

    if json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }

    if changes.is_empty() {
        if !ctx.quiet {
            ui::success("No drift");
        }
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("Drift for {}", schema.type_name));
    }
    for change in &changes {
        ui::change(change);
    }

    let replacements = changes.iter().filter(|c| c.requires_replacement).count();
    println!();
    if replacements > 0 {
        ui::warn(&format!(
            "{} changes, {} forcing replacement",
            changes.len(),
            replacements.to_string().red().bold()
        ));
    } else {
        ui::info(&format!("{} changes, all in place", changes.len()));
    }
    Ok(())
}
