//! # attrtree
//!
//! Schema-driven attribute trees for declarative resource descriptions.
//!
//! This crate provides functionality for:
//! - A tagged value model (scalars, ordered block lists, unordered block sets, maps)
//! - Content identity for block set members over their identity-bearing fields
//! - Expanding a tree into a remote wire model and flattening it back
//! - Detecting drift between a declared and an observed tree
//!
//! ## Example
//!
//! ```
//! use attrtree::{AttrSchema, AttributeTree, BlockSchema, BlockSet, expand, flatten};
//!
//! let schema = BlockSchema::new(vec![AttrSchema::single_set(
//!     "artifacts",
//!     BlockSchema::new(vec![
//!         AttrSchema::string("type").wire("Type").required(),
//!         AttrSchema::string("location").wire("Location"),
//!     ]),
//!     &["type"],
//! )
//! .wire("Artifacts")
//! .required()]);
//!
//! let artifact = AttributeTree::new()
//!     .with("type", "S3")
//!     .with("location", "bucket-a");
//! let tree = AttributeTree::new().with("artifacts", BlockSet::new().with(artifact));
//!
//! let model = expand(&tree, &schema).unwrap();
//! assert_eq!(model.get("Artifacts").unwrap()["Type"], "S3");
//! assert_eq!(flatten(&model, &schema).unwrap(), tree);
//! ```

mod codec;
mod diff;
mod document;
mod error;
mod identity;
mod schema;
mod value;
mod wire;

pub use codec::{expand, flatten};
pub use diff::{AttributeChange, ChangeKind, diff, requires_replacement};
pub use document::{from_json, to_json};
pub use error::{Error, ErrorCategory, Result};
pub use identity::{BlockIdentity, canonical_fields, identities, identity};
pub use schema::{AttrKind, AttrSchema, BlockSchema, Presence, ResourceSchema, ScalarType};
pub use value::{AttributeTree, BlockSet, Value};
pub use wire::RemoteModel;
