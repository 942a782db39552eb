//! Schema descriptions for attribute trees
//!
//! A [`ResourceSchema`] describes one remote resource type: its attributes,
//! how each maps to a wire field, which ones the caller must supply, which
//! ones the remote computes, and which ones can never change after creation.
//! The same schema drives both expand and flatten.

use crate::error::{Error, Result, join_path};
use crate::identity::canonical_fields;
use crate::wire::RemoteModel;
use serde::Serialize;
use std::collections::HashSet;

/// Scalar attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Int,
    Bool,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Must be declared
    Required,
    /// May be declared; absent means absent on the wire
    Optional,
    /// Set by the remote only; never sent
    Computed,
    /// May be declared; the remote fills it in otherwise
    OptionalComputed,
}

impl Presence {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Whether the caller may supply a value
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::Computed)
    }

    /// Whether the remote may supply a value the caller did not declare
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed | Self::OptionalComputed)
    }
}

/// Shape of an attribute's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AttrKind {
    Scalar {
        scalar: ScalarType,
    },
    /// String-to-string map
    Map,
    /// Ordered list of plain strings
    Strings,
    /// Ordered list of nested blocks
    List {
        block: BlockSchema,
        /// Exactly one element, sent as a nested wire object
        single: bool,
    },
    /// Unordered set of nested blocks keyed by content identity
    Set {
        block: BlockSchema,
        /// Canonical (sorted) identity-bearing field names
        identity: Vec<String>,
        /// Exactly one element ("oneof" sub-object), sent as a nested wire object
        single: bool,
    },
}

impl AttrKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar { scalar } => scalar.name(),
            Self::Map => "map",
            Self::Strings => "strings",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
        }
    }

    /// Nested block schema for list and set attributes
    pub fn block(&self) -> Option<&BlockSchema> {
        match self {
            Self::List { block, .. } | Self::Set { block, .. } => Some(block),
            _ => None,
        }
    }
}

/// Schema for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttrSchema {
    /// Name in the declarative tree
    pub name: String,
    /// Name on the wire; `None` for local-only attributes that are never sent
    pub wire_name: Option<String>,
    pub kind: AttrKind,
    pub presence: Presence,
    /// Changing this attribute requires replacing the remote object
    pub immutable: bool,
}

impl AttrSchema {
    /// Create an optional attribute whose wire name equals its name
    pub fn new(name: &str, kind: AttrKind) -> Self {
        Self {
            name: name.to_string(),
            wire_name: Some(name.to_string()),
            kind,
            presence: Presence::Optional,
            immutable: false,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(
            name,
            AttrKind::Scalar {
                scalar: ScalarType::String,
            },
        )
    }

    pub fn int(name: &str) -> Self {
        Self::new(
            name,
            AttrKind::Scalar {
                scalar: ScalarType::Int,
            },
        )
    }

    pub fn bool(name: &str) -> Self {
        Self::new(
            name,
            AttrKind::Scalar {
                scalar: ScalarType::Bool,
            },
        )
    }

    pub fn map(name: &str) -> Self {
        Self::new(name, AttrKind::Map)
    }

    pub fn strings(name: &str) -> Self {
        Self::new(name, AttrKind::Strings)
    }

    pub fn list(name: &str, block: BlockSchema) -> Self {
        Self::new(
            name,
            AttrKind::List {
                block,
                single: false,
            },
        )
    }

    /// A list holding exactly one block, sent as a nested object
    pub fn single_list(name: &str, block: BlockSchema) -> Self {
        Self::new(name, AttrKind::List { block, single: true })
    }

    pub fn set<S: AsRef<str>>(name: &str, block: BlockSchema, identity: &[S]) -> Self {
        Self::new(
            name,
            AttrKind::Set {
                block,
                identity: canonical_fields(identity),
                single: false,
            },
        )
    }

    /// A set holding exactly one block, sent as a nested object
    pub fn single_set<S: AsRef<str>>(name: &str, block: BlockSchema, identity: &[S]) -> Self {
        Self::new(
            name,
            AttrKind::Set {
                block,
                identity: canonical_fields(identity),
                single: true,
            },
        )
    }

    /// Set the wire name
    pub fn wire(mut self, wire_name: &str) -> Self {
        self.wire_name = Some(wire_name.to_string());
        self
    }

    /// Mark as local-only (never sent, never read back)
    pub fn local(mut self) -> Self {
        self.wire_name = None;
        self
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Whether this attribute is a single-element block
    pub fn is_single_block(&self) -> bool {
        matches!(
            self.kind,
            AttrKind::List { single: true, .. } | AttrKind::Set { single: true, .. }
        )
    }
}

/// Schema for a block: an ordered list of attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockSchema {
    attrs: Vec<AttrSchema>,
}

impl BlockSchema {
    pub fn new(attrs: Vec<AttrSchema>) -> Self {
        Self { attrs }
    }

    pub fn attrs(&self) -> &[AttrSchema] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&AttrSchema> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Check names are unique and identity fields name scalar attributes.
    pub fn validate(&self, path: &str) -> Result<()> {
        let mut names = HashSet::new();
        let mut wire_names = HashSet::new();

        for attr in &self.attrs {
            let attr_path = join_path(path, &attr.name);
            if attr.name.is_empty() {
                return Err(invalid(path, "attribute with empty name"));
            }
            if !names.insert(attr.name.as_str()) {
                return Err(invalid(&attr_path, "duplicate attribute name"));
            }
            if let Some(wire) = &attr.wire_name
                && !wire_names.insert(wire.as_str())
            {
                return Err(invalid(
                    &attr_path,
                    format!("duplicate wire name {wire:?}"),
                ));
            }

            match &attr.kind {
                AttrKind::Scalar { .. } | AttrKind::Map | AttrKind::Strings => {}
                AttrKind::List { block, .. } => block.validate(&attr_path)?,
                AttrKind::Set {
                    block, identity, ..
                } => {
                    block.validate(&attr_path)?;
                    if identity.is_empty() {
                        return Err(invalid(&attr_path, "block set without identity fields"));
                    }
                    for field in identity {
                        match block.attr(field) {
                            Some(a) if matches!(a.kind, AttrKind::Scalar { .. }) => {}
                            Some(_) => {
                                return Err(invalid(
                                    &attr_path,
                                    format!("identity field {field:?} is not a scalar"),
                                ));
                            }
                            None => {
                                return Err(invalid(
                                    &attr_path,
                                    format!("identity field {field:?} is not an attribute"),
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(path: &str, message: impl Into<String>) -> Error {
    Error::InvalidSchema {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        message: message.into(),
    }
}

/// Schema for a whole remote resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    /// Resource type name, e.g. `codebuild_project`
    pub type_name: String,
    /// Top-level wire field carrying the remote object's canonical identifier
    pub id_field: String,
    /// Local boolean attribute that, when true, makes delete leave the remote object
    pub retain_flag: Option<String>,
    pub block: BlockSchema,
}

impl ResourceSchema {
    pub fn new(type_name: &str, id_field: &str, block: BlockSchema) -> Self {
        Self {
            type_name: type_name.to_string(),
            id_field: id_field.to_string(),
            retain_flag: None,
            block,
        }
    }

    pub fn with_retain_flag(mut self, attr: &str) -> Self {
        self.retain_flag = Some(attr.to_string());
        self
    }

    /// Validate the block schema and the resource-level settings.
    pub fn validate(&self) -> Result<()> {
        if self.id_field.is_empty() {
            return Err(invalid(&self.type_name, "empty id field"));
        }
        self.block.validate("")?;

        if let Some(flag) = &self.retain_flag {
            match self.block.attr(flag) {
                Some(AttrSchema {
                    wire_name: None,
                    kind:
                        AttrKind::Scalar {
                            scalar: ScalarType::Bool,
                        },
                    ..
                }) => {}
                _ => {
                    return Err(invalid(
                        flag,
                        "retain flag must be a local-only bool attribute",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Extract the remote object's identifier from a response.
    pub fn identifier(&self, model: &RemoteModel) -> Option<String> {
        model
            .get(&self.id_field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Names of top-level attributes that are never sent.
    pub fn local_attrs(&self) -> impl Iterator<Item = &AttrSchema> {
        self.block.attrs().iter().filter(|a| a.wire_name.is_none())
    }
}
