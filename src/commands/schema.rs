use anyhow::Result;
use attrtree::{AttrKind, AttrSchema, BlockSchema, Presence};
use colored::Colorize;

use super::resolve_schema;
use crate::Context;
use crate::catalog;
use crate::ui;

pub fn types(ctx: &Context) -> Result<()> {
    if !ctx.quiet {
        ui::header("Resource Types");
    }
    for name in catalog::TYPES {
        println!("  {name}");
    }
    Ok(())
}

pub fn run(ctx: &Context, resource_type: &str, json: bool) -> Result<()> {
    let schema = resolve_schema(resource_type)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    ui::header(&schema.type_name);
    ui::kv("Identifier field", &schema.id_field);
    if let Some(flag) = &schema.retain_flag {
        ui::kv("Retain flag", flag);
    }

    ui::section("Attributes");
    print_block(&schema.block, 1, ctx.verbose > 0);
    Ok(())
}

fn print_block(block: &BlockSchema, depth: usize, show_wire: bool) {
    for attr in block.attrs() {
        println!("{}{}", "  ".repeat(depth), describe(attr, show_wire));
        if let Some(nested) = attr.kind.block() {
            print_block(nested, depth + 1, show_wire);
        }
    }
}

fn describe(attr: &AttrSchema, show_wire: bool) -> String {
    let kind = match &attr.kind {
        AttrKind::Scalar { scalar } => scalar.name().to_string(),
        AttrKind::Map => "map".to_string(),
        AttrKind::Strings => "list of strings".to_string(),
        AttrKind::List { single: true, .. } => "block".to_string(),
        AttrKind::List { .. } => "list".to_string(),
        AttrKind::Set {
            identity,
            single,
            ..
        } => format!(
            "{} by [{}]",
            if *single { "block" } else { "set" },
            identity.join(", ")
        ),
    };

    let mut flags = Vec::new();
    match attr.presence {
        Presence::Required => flags.push("required".yellow().to_string()),
        Presence::Optional => {}
        Presence::Computed => flags.push("computed".dimmed().to_string()),
        Presence::OptionalComputed => flags.push("optional+computed".dimmed().to_string()),
    }
    if attr.immutable {
        flags.push("forces replacement".red().to_string());
    }
    match (&attr.wire_name, show_wire) {
        (None, _) => flags.push("local".cyan().to_string()),
        (Some(wire), true) => flags.push(format!("→ {wire}")),
        (Some(_), false) => {}
    }

    format!("{} {} {}", attr.name.bold(), kind.dimmed(), flags.join(" "))
        .trim_end()
        .to_string()
}
