//! JSON documents keyed by attribute name
//!
//! Declared and observed trees are stored as plain JSON objects using the
//! declarative attribute names (not wire names). Lists and sets are both
//! arrays of objects; the schema decides which one a field becomes. String
//! lists are arrays of strings.

use crate::error::{Error, Result, join_path};
use crate::schema::{AttrKind, BlockSchema, ScalarType};
use crate::value::{AttributeTree, BlockSet, Value};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// Read a JSON object as an attribute tree.
pub fn from_json(json: &Json, schema: &BlockSchema) -> Result<AttributeTree> {
    let obj = json.as_object().ok_or_else(|| Error::Document {
        path: "<root>".to_string(),
        message: "expected an object".to_string(),
    })?;
    read_block(obj, schema, "")
}

/// Render an attribute tree as a JSON object.
pub fn to_json(tree: &AttributeTree) -> Json {
    Json::Object(
        tree.iter()
            .map(|(name, value)| (name.to_string(), value_to_json(value)))
            .collect(),
    )
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Str(s) => Json::String(s.clone()),
        Value::Int(i) => Json::from(*i),
        Value::Bool(b) => Json::Bool(*b),
        Value::Strings(items) => Json::Array(items.iter().cloned().map(Json::String).collect()),
        Value::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Set(set) => Json::Array(set.iter().map(to_json).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
        ),
    }
}

fn read_block(obj: &Map<String, Json>, schema: &BlockSchema, path: &str) -> Result<AttributeTree> {
    let mut tree = AttributeTree::new();
    for (name, json) in obj {
        let attr_path = join_path(path, name);
        let attr = schema.attr(name).ok_or_else(|| Error::UnknownAttribute {
            path: attr_path.clone(),
        })?;
        if json.is_null() {
            continue;
        }

        let value = match &attr.kind {
            AttrKind::Scalar { scalar } => read_scalar(*scalar, json, &attr_path)?,
            AttrKind::Map => {
                let entries = json
                    .as_object()
                    .ok_or_else(|| doc_error(&attr_path, "expected an object"))?;
                let mut map = BTreeMap::new();
                for (k, v) in entries {
                    let s = v
                        .as_str()
                        .ok_or_else(|| doc_error(&join_path(&attr_path, k), "expected a string"))?;
                    map.insert(k.clone(), s.to_string());
                }
                Value::Map(map)
            }
            AttrKind::Strings => {
                let items = json
                    .as_array()
                    .ok_or_else(|| doc_error(&attr_path, "expected an array of strings"))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let s = item.as_str().ok_or_else(|| {
                        doc_error(&join_path(&attr_path, &i.to_string()), "expected a string")
                    })?;
                    out.push(s.to_string());
                }
                Value::Strings(out)
            }
            AttrKind::List { block, .. } => {
                Value::List(read_blocks(json, block, &attr_path)?)
            }
            AttrKind::Set { block, .. } => {
                Value::Set(read_blocks(json, block, &attr_path)?.into_iter().collect::<BlockSet>())
            }
        };
        tree.insert(name, value);
    }
    Ok(tree)
}

fn read_blocks(json: &Json, schema: &BlockSchema, path: &str) -> Result<Vec<AttributeTree>> {
    // A lone object is accepted as a one-element block list
    if let Some(obj) = json.as_object() {
        return Ok(vec![read_block(obj, schema, &join_path(path, "0"))?]);
    }
    let items = json
        .as_array()
        .ok_or_else(|| doc_error(path, "expected an array of objects"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = join_path(path, &i.to_string());
            let obj = item
                .as_object()
                .ok_or_else(|| doc_error(&item_path, "expected an object"))?;
            read_block(obj, schema, &item_path)
        })
        .collect()
}

fn read_scalar(scalar: ScalarType, json: &Json, path: &str) -> Result<Value> {
    match scalar {
        ScalarType::String => json.as_str().map(|s| Value::Str(s.to_string())),
        ScalarType::Int => json.as_i64().map(Value::Int),
        ScalarType::Bool => json.as_bool().map(Value::Bool),
    }
    .ok_or_else(|| doc_error(path, format!("expected {}", scalar.name())))
}

fn doc_error(path: &str, message: impl Into<String>) -> Error {
    Error::Document {
        path: path.to_string(),
        message: message.into(),
    }
}
