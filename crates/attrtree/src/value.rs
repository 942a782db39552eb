//! Attribute tree values
//!
//! An [`AttributeTree`] is a map of unique field names to [`Value`]s. Values
//! are a tagged union: scalars, ordered string lists, ordered lists of
//! nested trees, unordered block sets, and string maps (tags/labels). Typed accessors fail closed
//! with [`Error::TypeMismatch`] instead of panicking on the wrong kind.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Ordered list of plain strings
    Strings(Vec<String>),
    /// Ordered list of nested blocks; position is significant
    List(Vec<AttributeTree>),
    /// Unordered collection of nested blocks
    Set(BlockSet),
    /// String-to-string map (tags, labels)
    Map(BTreeMap<String, String>),
}

impl Value {
    /// Name of this value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Strings(_) => "strings",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    /// Whether this value is a scalar (string, int or bool).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Int(_) | Value::Bool(_))
    }

    /// Textual form of a scalar value, `None` for nested values.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Short human-readable rendering for diffs and logs.
    pub fn summary(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Strings(items) => format!("{items:?}"),
            Value::List(items) => format!("({} blocks)", items.len()),
            Value::Set(set) => format!("({} blocks)", set.len()),
            Value::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v:?}")).collect();
                format!("{{{}}}", pairs.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Strings(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::Strings(value.into_iter().map(str::to_string).collect())
    }
}

impl From<BlockSet> for Value {
    fn from(value: BlockSet) -> Self {
        Value::Set(value)
    }
}

impl From<Vec<AttributeTree>> for Value {
    fn from(value: Vec<AttributeTree>) -> Self {
        Value::List(value)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(value: BTreeMap<String, String>) -> Self {
        Value::Map(value)
    }
}

/// A recursive tree of named attributes.
///
/// Field names are unique; insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTree {
    fields: BTreeMap<String, Value>,
}

impl AttributeTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an attribute, returning the previous value
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.to_string(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a string attribute
    pub fn get_str(&self, name: &str) -> Result<Option<&str>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(name, "string", other)),
        }
    }

    /// Get an integer attribute
    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(mismatch(name, "int", other)),
        }
    }

    /// Get a boolean attribute
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(name, "bool", other)),
        }
    }

    /// Get an ordered string list attribute
    pub fn get_strings(&self, name: &str) -> Result<Option<&[String]>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Strings(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(name, "strings", other)),
        }
    }

    /// Get an ordered list attribute
    pub fn get_list(&self, name: &str) -> Result<Option<&[AttributeTree]>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(items)),
            Some(other) => Err(mismatch(name, "list", other)),
        }
    }

    /// Get a block set attribute
    pub fn get_set(&self, name: &str) -> Result<Option<&BlockSet>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Set(set)) => Ok(Some(set)),
            Some(other) => Err(mismatch(name, "set", other)),
        }
    }

    /// Get a string map attribute
    pub fn get_map(&self, name: &str) -> Result<Option<&BTreeMap<String, String>>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Map(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(name, "map", other)),
        }
    }
}

fn mismatch(name: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        path: name.to_string(),
        expected,
        found: found.kind_name(),
    }
}

impl fmt::Display for AttributeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={}", v.summary()))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// An unordered collection of nested blocks.
///
/// Members keep their declaration order for iteration (the first member of a
/// single-element set is the one that gets sent), but equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    members: Vec<AttributeTree>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push
    pub fn with(mut self, member: AttributeTree) -> Self {
        self.members.push(member);
        self
    }

    pub fn push(&mut self, member: AttributeTree) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeTree> {
        self.members.iter()
    }

    /// First member in iteration order
    pub fn first(&self) -> Option<&AttributeTree> {
        self.members.first()
    }

    pub fn members(&self) -> &[AttributeTree] {
        &self.members
    }
}

impl PartialEq for BlockSet {
    fn eq(&self, other: &Self) -> bool {
        if self.members.len() != other.members.len() {
            return false;
        }
        // Multiset comparison: each member of self consumes one equal member of other
        let mut unmatched: Vec<&AttributeTree> = other.members.iter().collect();
        for member in &self.members {
            match unmatched.iter().position(|m| *m == member) {
                Some(idx) => {
                    unmatched.swap_remove(idx);
                }
                None => return false,
            }
        }
        true
    }
}

impl Eq for BlockSet {}

impl FromIterator<AttributeTree> for BlockSet {
    fn from_iter<I: IntoIterator<Item = AttributeTree>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BlockSet {
    type Item = AttributeTree;
    type IntoIter = std::vec::IntoIter<AttributeTree>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
