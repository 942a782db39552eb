//! Drift detection between two attribute trees
//!
//! `diff(before, after)` lists what must change to turn `before` (usually
//! the last observed tree) into `after` (the declared tree). Block set
//! members are matched by content identity, list items by position.
//! Computed attributes the caller did not declare are not drift.

use crate::error::join_path;
use crate::identity::identity;
use crate::schema::{AttrKind, AttrSchema, BlockSchema};
use crate::value::{AttributeTree, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of change for one attribute path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Added => "+",
            Self::Removed => "-",
            Self::Modified => "~",
        }
    }
}

/// A single attribute difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    /// Dotted path; list items use their index, set members a short digest
    pub path: String,
    pub kind: ChangeKind,
    pub before: Option<String>,
    pub after: Option<String>,
    /// The attribute (or an enclosing block) cannot change in place
    pub requires_replacement: bool,
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.path)?;
        match (&self.before, &self.after) {
            (Some(b), Some(a)) => write!(f, ": {b} → {a}")?,
            (None, Some(a)) => write!(f, ": {a}")?,
            (Some(b), None) => write!(f, ": {b}")?,
            (None, None) => {}
        }
        if self.requires_replacement {
            write!(f, " (forces replacement)")?;
        }
        Ok(())
    }
}

/// Compute the changes needed to go from `before` to `after`.
pub fn diff(before: &AttributeTree, after: &AttributeTree, schema: &BlockSchema) -> Vec<AttributeChange> {
    let mut changes = Vec::new();
    diff_block(before, after, schema, "", false, &mut changes);
    changes
}

/// Whether any change forces the remote object to be replaced.
pub fn requires_replacement(changes: &[AttributeChange]) -> bool {
    changes.iter().any(|c| c.requires_replacement)
}

fn diff_block(
    before: &AttributeTree,
    after: &AttributeTree,
    schema: &BlockSchema,
    path: &str,
    forced: bool,
    out: &mut Vec<AttributeChange>,
) {
    for attr in schema.attrs() {
        let attr_path = join_path(path, &attr.name);
        let replace = forced || attr.immutable;
        let old = before.get(&attr.name);
        let new = after.get(&attr.name);

        match (old, new) {
            (None, None) => {}
            // Remote-assigned values the caller did not declare
            (Some(_), None) if attr.presence.is_computed() => {}
            (Some(_), Some(_)) if !attr.presence.accepts_input() => {}
            (None, Some(v)) => out.push(change(attr_path, ChangeKind::Added, None, Some(v), replace)),
            (Some(v), None) => out.push(change(attr_path, ChangeKind::Removed, Some(v), None, replace)),
            (Some(old), Some(new)) => diff_value(old, new, attr, &attr_path, replace, out),
        }
    }
}

fn diff_value(
    old: &Value,
    new: &Value,
    attr: &AttrSchema,
    path: &str,
    replace: bool,
    out: &mut Vec<AttributeChange>,
) {
    match (&attr.kind, old, new) {
        (AttrKind::List { block, .. }, Value::List(a), Value::List(b)) => {
            for i in 0..a.len().max(b.len()) {
                let item_path = join_path(path, &i.to_string());
                match (a.get(i), b.get(i)) {
                    (Some(x), Some(y)) => diff_block(x, y, block, &item_path, replace, out),
                    (Some(x), None) => out.push(block_change(item_path, ChangeKind::Removed, x, replace)),
                    (None, Some(y)) => out.push(block_change(item_path, ChangeKind::Added, y, replace)),
                    (None, None) => {}
                }
            }
        }
        (
            AttrKind::Set {
                block,
                identity: fields,
                ..
            },
            Value::Set(a),
            Value::Set(b),
        ) => {
            let keyed_a: BTreeMap<_, _> = a.iter().map(|m| (identity(m, fields), m)).collect();
            let keyed_b: BTreeMap<_, _> = b.iter().map(|m| (identity(m, fields), m)).collect();

            for (id, x) in &keyed_a {
                let member_path = join_path(path, &id.short());
                match keyed_b.get(id) {
                    Some(y) => diff_block(x, y, block, &member_path, replace, out),
                    None => out.push(block_change(member_path, ChangeKind::Removed, x, replace)),
                }
            }
            for (id, y) in &keyed_b {
                if !keyed_a.contains_key(id) {
                    let member_path = join_path(path, &id.short());
                    out.push(block_change(member_path, ChangeKind::Added, y, replace));
                }
            }
        }
        _ => {
            if old != new {
                out.push(change(
                    path.to_string(),
                    ChangeKind::Modified,
                    Some(old),
                    Some(new),
                    replace,
                ));
            }
        }
    }
}

fn change(
    path: String,
    kind: ChangeKind,
    before: Option<&Value>,
    after: Option<&Value>,
    requires_replacement: bool,
) -> AttributeChange {
    AttributeChange {
        path,
        kind,
        before: before.map(Value::summary),
        after: after.map(Value::summary),
        requires_replacement,
    }
}

fn block_change(path: String, kind: ChangeKind, block: &AttributeTree, replace: bool) -> AttributeChange {
    let rendered = Some(block.to_string());
    let (before, after) = match kind {
        ChangeKind::Removed => (rendered, None),
        _ => (None, rendered),
    };
    AttributeChange {
        path,
        kind,
        before,
        after,
        requires_replacement: replace,
    }
}
