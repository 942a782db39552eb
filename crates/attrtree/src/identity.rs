//! Content identity for block set members
//!
//! A member's identity is a blake3 digest over its identity-bearing fields
//! only. Each field contributes a length-prefixed name frame and a
//! length-prefixed value frame, so no value can forge a field boundary.
//! Absent fields hash as the empty string.

use crate::value::{AttributeTree, BlockSet, Value};
use std::fmt;

/// Fixed-width digest identifying a block set member by content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockIdentity([u8; 32]);

impl BlockIdentity {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex encoding
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// First 12 hex characters, used in diff paths
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Display for BlockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockIdentity({})", self.short())
    }
}

/// Compute the identity of a block from the given fields, in the order given.
///
/// Schemas canonicalise their identity field lists (see
/// [`canonical_fields`]), so callers going through a schema never depend on
/// declaration order.
pub fn identity(block: &AttributeTree, identity_fields: &[String]) -> BlockIdentity {
    let mut hasher = blake3::Hasher::new();
    for field in identity_fields {
        write_frame(&mut hasher, field.as_bytes());
        match block.get(field) {
            None => write_frame(&mut hasher, b""),
            Some(value) => write_value(&mut hasher, value),
        }
    }
    BlockIdentity(*hasher.finalize().as_bytes())
}

/// Identities of every member of a set, in iteration order.
pub fn identities<'a>(
    set: &'a BlockSet,
    identity_fields: &[String],
) -> Vec<(BlockIdentity, &'a AttributeTree)> {
    set.iter()
        .map(|member| (identity(member, identity_fields), member))
        .collect()
}

/// Sort and deduplicate an identity field list.
pub fn canonical_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let mut out: Vec<String> = fields.iter().map(|f| f.as_ref().to_string()).collect();
    out.sort();
    out.dedup();
    out
}

fn write_value(hasher: &mut blake3::Hasher, value: &Value) {
    match value.scalar_text() {
        Some(text) => write_frame(hasher, text.as_bytes()),
        // Schemas reject non-scalar identity fields; keep the function total anyway
        None => {
            hasher.update(&[0xff]);
            write_frame(hasher, value.kind_name().as_bytes());
        }
    }
}

fn write_frame(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identity_ignores_insertion_order() {
        let mut a = AttributeTree::new();
        a.insert("type", "LINUX_CONTAINER");
        a.insert("image", "aws/codebuild/ubuntu-base:14.04");

        let mut b = AttributeTree::new();
        b.insert("image", "aws/codebuild/ubuntu-base:14.04");
        b.insert("type", "LINUX_CONTAINER");

        let f = fields(&["image", "type"]);
        assert_eq!(identity(&a, &f), identity(&b, &f));
    }

    #[test]
    fn test_identity_only_uses_identity_fields() {
        let a = AttributeTree::new()
            .with("type", "S3")
            .with("location", "bucket-a");
        let b = AttributeTree::new()
            .with("type", "S3")
            .with("location", "bucket-b");
        let c = AttributeTree::new().with("type", "CODEPIPELINE");

        let f = fields(&["type"]);
        assert_eq!(identity(&a, &f), identity(&b, &f));
        assert_ne!(identity(&a, &f), identity(&c, &f));
    }

    #[test]
    fn test_absent_hashes_as_empty_string() {
        let absent = AttributeTree::new().with("type", "S3");
        let empty = AttributeTree::new()
            .with("type", "S3")
            .with("location", "");

        let f = fields(&["location", "type"]);
        assert_eq!(identity(&absent, &f), identity(&empty, &f));
    }

    #[test]
    fn test_frames_cannot_be_forged() {
        // "a-" + "b" and "a" + "-b" must not collide
        let one = AttributeTree::new().with("x", "a-").with("y", "b");
        let two = AttributeTree::new().with("x", "a").with("y", "-b");

        let f = fields(&["x", "y"]);
        assert_ne!(identity(&one, &f), identity(&two, &f));
    }

    #[test]
    fn test_canonical_fields() {
        assert_eq!(
            canonical_fields(&["type", "image", "type", "compute_type"]),
            fields(&["compute_type", "image", "type"])
        );
    }

    #[test]
    fn test_hex_forms() {
        let id = identity(&AttributeTree::new(), &[]);
        assert_eq!(id.to_hex().len(), 64);
        assert_eq!(id.short().len(), 12);
        assert!(id.to_hex().starts_with(&id.short()));
    }
}
