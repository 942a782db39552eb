use anyhow::Result;
use attrtree::{AttrKind, AttributeTree, BlockSchema, Value, identities};
use std::path::Path;

use super::{read_document, resolve_schema};
use crate::Context;
use crate::ui;

/// One block set member and its content identity.
#[derive(Debug, PartialEq, Eq)]
pub struct MemberIdentity {
    pub path: String,
    pub digest: String,
    /// `field=value` pairs of the identity-bearing fields
    pub fields: Vec<String>,
}

pub fn run(ctx: &Context, resource_type: &str, document: &Path) -> Result<()> {
    let schema = resolve_schema(resource_type)?;
    let tree = read_document(document, &schema)?;

    let members = collect(&tree, &schema.block, "", ctx.verbose > 0);
    if members.is_empty() {
        if !ctx.quiet {
            ui::info("Document has no block set members");
        }
        return Ok(());
    }

    if !ctx.quiet {
        ui::header("Block Set Identities");
    }
    for member in &members {
        ui::kv(&member.path, &member.digest);
        ui::dim(&member.fields.join(" "));
    }
    Ok(())
}

/// Walk `tree` and list every block set member's identity.
pub fn collect(
    tree: &AttributeTree,
    schema: &BlockSchema,
    path: &str,
    full_digest: bool,
) -> Vec<MemberIdentity> {
    let mut out = Vec::new();
    for attr in schema.attrs() {
        let attr_path = if path.is_empty() {
            attr.name.clone()
        } else {
            format!("{path}.{}", attr.name)
        };

        match (&attr.kind, tree.get(&attr.name)) {
            (
                AttrKind::Set {
                    block, identity, ..
                },
                Some(Value::Set(set)),
            ) => {
                for (id, member) in identities(set, identity) {
                    let member_path = format!("{attr_path}.{}", id.short());
                    out.push(MemberIdentity {
                        path: member_path.clone(),
                        digest: if full_digest { id.to_hex() } else { id.short() },
                        fields: identity
                            .iter()
                            .map(|f| {
                                let value = member
                                    .get(f)
                                    .and_then(Value::scalar_text)
                                    .unwrap_or_default();
                                format!("{f}={value:?}")
                            })
                            .collect(),
                    });
                    out.extend(collect(member, block, &member_path, full_digest));
                }
            }
            (AttrKind::List { block, .. }, Some(Value::List(items))) => {
                for (i, item) in items.iter().enumerate() {
                    out.extend(collect(item, block, &format!("{attr_path}.{i}"), full_digest));
                }
            }
            _ => {}
        }
    }
    out
}
