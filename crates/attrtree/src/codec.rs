//! Expand and flatten: attribute tree <-> remote wire model
//!
//! Both directions are driven by the same [`BlockSchema`]:
//!
//! - [`expand`] turns a declared tree into a request. Absent optional
//!   attributes are omitted, never zero-filled. Computed-only and local-only
//!   attributes are never sent. Single-element blocks become nested objects.
//! - [`flatten`] turns a response back into a tree. Null or absent fields
//!   stay absent. Block sets are rebuilt keyed by content identity.
//!
//! For any tree valid under a schema, `flatten(expand(t))` equals `t` up to
//! block set member order.

use crate::error::{Error, Result, join_path};
use crate::identity::identity;
use crate::schema::{AttrKind, AttrSchema, BlockSchema, ScalarType};
use crate::value::{AttributeTree, BlockSet, Value};
use crate::wire::RemoteModel;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

/// Expand a declared tree into a wire request.
pub fn expand(tree: &AttributeTree, schema: &BlockSchema) -> Result<RemoteModel> {
    expand_block(tree, schema, "").map(RemoteModel::from)
}

/// Flatten a wire response into an attribute tree.
pub fn flatten(model: &RemoteModel, schema: &BlockSchema) -> Result<AttributeTree> {
    flatten_block(model.as_map(), schema, "")
}

// ============================================================================
// Expand
// ============================================================================

fn expand_block(tree: &AttributeTree, schema: &BlockSchema, path: &str) -> Result<Map<String, Json>> {
    for (name, _) in tree.iter() {
        if schema.attr(name).is_none() {
            return Err(Error::UnknownAttribute {
                path: join_path(path, name),
            });
        }
    }

    let mut out = Map::new();
    for attr in schema.attrs() {
        let attr_path = join_path(path, &attr.name);
        let value = tree.get(&attr.name);

        if !attr.presence.accepts_input() {
            if value.is_some() {
                log::debug!("Ignoring declared value for computed attribute {attr_path}");
            }
            continue;
        }

        let Some(value) = value else {
            if attr.presence.is_required() {
                return Err(Error::MissingRequired { path: attr_path });
            }
            continue;
        };

        // Local-only attributes are still type-checked
        let wire = expand_value(value, attr, &attr_path)?;
        if let Some(wire_name) = &attr.wire_name {
            out.insert(wire_name.clone(), wire);
        }
    }
    Ok(out)
}

fn expand_value(value: &Value, attr: &AttrSchema, path: &str) -> Result<Json> {
    match (&attr.kind, value) {
        (AttrKind::Scalar { scalar }, v) => expand_scalar(*scalar, v, path),
        (AttrKind::Map, Value::Map(map)) => Ok(Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
        )),
        (AttrKind::Strings, Value::Strings(items)) => {
            Ok(Json::Array(items.iter().cloned().map(Json::String).collect()))
        }
        (AttrKind::List { block, single }, Value::List(items)) => {
            if *single {
                let first = single_member(items.iter(), items.len(), path)?;
                return Ok(Json::Object(expand_block(first, block, &join_path(path, "0"))?));
            }
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(Json::Object(expand_block(
                    item,
                    block,
                    &join_path(path, &i.to_string()),
                )?));
            }
            Ok(Json::Array(out))
        }
        (
            AttrKind::Set {
                block,
                identity: fields,
                single,
            },
            Value::Set(set),
        ) => {
            let members = distinct_members(set, fields, path)?;
            if *single {
                let first = single_member(members.iter().copied(), members.len(), path)?;
                return Ok(Json::Object(expand_block(first, block, &join_path(path, "0"))?));
            }
            let mut out = Vec::with_capacity(members.len());
            for member in members {
                let member_path = join_path(path, &identity(member, fields).short());
                out.push(Json::Object(expand_block(member, block, &member_path)?));
            }
            Ok(Json::Array(out))
        }
        (kind, other) => Err(Error::TypeMismatch {
            path: path.to_string(),
            expected: kind.name(),
            found: other.kind_name(),
        }),
    }
}

fn expand_scalar(scalar: ScalarType, value: &Value, path: &str) -> Result<Json> {
    match (scalar, value) {
        (ScalarType::String, Value::Str(s)) => Ok(Json::String(s.clone())),
        (ScalarType::Int, Value::Int(i)) => Ok(Json::from(*i)),
        (ScalarType::Bool, Value::Bool(b)) => Ok(Json::Bool(*b)),
        (scalar, other) => Err(Error::TypeMismatch {
            path: path.to_string(),
            expected: scalar.name(),
            found: other.kind_name(),
        }),
    }
}

/// First member of a single-element block; zero members is a contract violation.
fn single_member<'a>(
    mut members: impl Iterator<Item = &'a AttributeTree>,
    count: usize,
    path: &str,
) -> Result<&'a AttributeTree> {
    let first = members.next().ok_or_else(|| Error::EmptySingleBlock {
        path: path.to_string(),
    })?;
    if count > 1 {
        log::warn!("{path} holds {count} blocks but accepts one; only the first is sent");
    }
    Ok(first)
}

/// Drop exact duplicates; reject members that share an identity but differ.
fn distinct_members<'a>(
    set: &'a BlockSet,
    fields: &[String],
    path: &str,
) -> Result<Vec<&'a AttributeTree>> {
    let mut seen: BTreeMap<_, &AttributeTree> = BTreeMap::new();
    let mut out = Vec::with_capacity(set.len());
    for member in set.iter() {
        let id = identity(member, fields);
        match seen.get(&id) {
            Some(existing) if *existing == member => {}
            Some(_) => {
                return Err(Error::DuplicateIdentity {
                    path: path.to_string(),
                    identity: id.short(),
                });
            }
            None => {
                seen.insert(id, member);
                out.push(member);
            }
        }
    }
    Ok(out)
}

// ============================================================================
// Flatten
// ============================================================================

fn flatten_block(map: &Map<String, Json>, schema: &BlockSchema, path: &str) -> Result<AttributeTree> {
    let mut tree = AttributeTree::new();
    for attr in schema.attrs() {
        let Some(wire_name) = &attr.wire_name else {
            continue;
        };
        let attr_path = join_path(path, &attr.name);

        match map.get(wire_name) {
            None | Some(Json::Null) => {
                if attr.presence.is_required() {
                    return Err(Error::malformed(
                        &attr_path,
                        format!("required field {wire_name:?} is absent"),
                    ));
                }
            }
            Some(json) => {
                tree.insert(&attr.name, flatten_value(json, attr, &attr_path)?);
            }
        }
    }
    Ok(tree)
}

fn flatten_value(json: &Json, attr: &AttrSchema, path: &str) -> Result<Value> {
    match &attr.kind {
        AttrKind::Scalar { scalar } => flatten_scalar(*scalar, json, path),
        AttrKind::Map => {
            let obj = json
                .as_object()
                .ok_or_else(|| Error::malformed(path, "expected an object"))?;
            let mut out = BTreeMap::new();
            for (k, v) in obj {
                let s = v.as_str().ok_or_else(|| {
                    Error::malformed(&join_path(path, k), "expected a string")
                })?;
                out.insert(k.clone(), s.to_string());
            }
            Ok(Value::Map(out))
        }
        AttrKind::Strings => {
            let items = json
                .as_array()
                .ok_or_else(|| Error::malformed(path, "expected an array"))?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let s = item.as_str().ok_or_else(|| {
                    Error::malformed(&join_path(path, &i.to_string()), "expected a string")
                })?;
                out.push(s.to_string());
            }
            Ok(Value::Strings(out))
        }
        AttrKind::List { block, single } => {
            let mut items = Vec::new();
            for (i, obj) in nested_objects(json, *single, path)?.into_iter().enumerate() {
                items.push(flatten_block(obj, block, &join_path(path, &i.to_string()))?);
            }
            Ok(Value::List(items))
        }
        AttrKind::Set {
            block,
            identity: fields,
            single,
        } => {
            let mut seen = BTreeMap::new();
            let mut set = BlockSet::new();
            for (i, obj) in nested_objects(json, *single, path)?.into_iter().enumerate() {
                let member = flatten_block(obj, block, &join_path(path, &i.to_string()))?;
                let id = identity(&member, fields);
                match seen.get(&id) {
                    None => {
                        seen.insert(id, member.clone());
                        set.push(member);
                    }
                    Some(existing) if *existing == member => {}
                    Some(_) => {
                        log::warn!(
                            "{path}: remote returned a second member with identity {} and \
                             different content; keeping the first",
                            id.short()
                        );
                    }
                }
            }
            Ok(Value::Set(set))
        }
    }
}

fn flatten_scalar(scalar: ScalarType, json: &Json, path: &str) -> Result<Value> {
    match scalar {
        ScalarType::String => json
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(|| Error::malformed(path, "expected a string")),
        // 64-bit integers often travel as decimal strings
        ScalarType::Int => json
            .as_i64()
            .or_else(|| json.as_str().and_then(|s| s.parse().ok()))
            .map(Value::Int)
            .ok_or_else(|| Error::malformed(path, "expected an integer")),
        ScalarType::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| Error::malformed(path, "expected a boolean")),
    }
}

/// Single blocks arrive as one object, repeated blocks as an array of objects.
fn nested_objects<'a>(json: &'a Json, single: bool, path: &str) -> Result<Vec<&'a Map<String, Json>>> {
    if single {
        return json
            .as_object()
            .map(|obj| vec![obj])
            .ok_or_else(|| Error::malformed(path, "expected an object"));
    }
    let items = json
        .as_array()
        .ok_or_else(|| Error::malformed(path, "expected an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .ok_or_else(|| Error::malformed(&join_path(path, &i.to_string()), "expected an object"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::identities;
    use serde_json::json;

    fn project_schema() -> BlockSchema {
        let artifacts = BlockSchema::new(vec![
            AttrSchema::string("type").wire("Type").required(),
            AttrSchema::string("location").wire("Location"),
            AttrSchema::string("name").wire("Name"),
        ]);
        let env_var = BlockSchema::new(vec![
            AttrSchema::string("name").wire("Name").required(),
            AttrSchema::string("value").wire("Value").required(),
        ]);
        let environment = BlockSchema::new(vec![
            AttrSchema::string("compute_type").wire("ComputeType").required(),
            AttrSchema::string("image").wire("Image").required(),
            AttrSchema::string("type").wire("Type").required(),
            AttrSchema::set("environment_variable", env_var, &["name", "value"])
                .wire("EnvironmentVariables"),
        ]);
        BlockSchema::new(vec![
            AttrSchema::string("name").wire("Name").required().immutable(),
            AttrSchema::string("description")
                .wire("Description")
                .optional_computed(),
            AttrSchema::int("timeout").wire("TimeoutInMinutes"),
            AttrSchema::map("tags").wire("Tags"),
            AttrSchema::single_set("artifacts", artifacts, &["type"])
                .wire("Artifacts")
                .required(),
            AttrSchema::single_set("environment", environment, &["type", "compute_type", "image"])
                .wire("Environment"),
            AttrSchema::string("arn").wire("Arn").computed(),
            AttrSchema::bool("retain_on_delete").local(),
        ])
    }

    fn artifact(kind: &str, location: &str) -> AttributeTree {
        AttributeTree::new()
            .with("type", kind)
            .with("location", location)
    }

    fn env_var(name: &str, value: &str) -> AttributeTree {
        AttributeTree::new().with("name", name).with("value", value)
    }

    fn declared() -> AttributeTree {
        let environment = AttributeTree::new()
            .with("compute_type", "BUILD_GENERAL1_SMALL")
            .with("image", "aws/codebuild/ubuntu-base:14.04")
            .with("type", "LINUX_CONTAINER")
            .with(
                "environment_variable",
                BlockSet::new()
                    .with(env_var("SOME_KEY", "SOME_VALUE"))
                    .with(env_var("OTHER", "1")),
            );
        let mut tags = BTreeMap::new();
        tags.insert("team".to_string(), "build".to_string());

        AttributeTree::new()
            .with("name", "proj")
            .with("timeout", 5_i64)
            .with("tags", tags)
            .with("artifacts", BlockSet::new().with(artifact("S3", "bucket-a")))
            .with("environment", BlockSet::new().with(environment))
    }

    #[test]
    fn test_expand_single_set_becomes_object() {
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("artifacts", BlockSet::new().with(artifact("S3", "bucket-a")));
        let model = expand(&tree, &project_schema()).unwrap();

        assert_eq!(
            model.get("Artifacts"),
            Some(&json!({"Type": "S3", "Location": "bucket-a"}))
        );
        assert_eq!(model.get("Name"), Some(&json!("proj")));
    }

    #[test]
    fn test_expand_omits_absent_optional_fields() {
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("artifacts", BlockSet::new().with(AttributeTree::new().with("type", "NO_ARTIFACTS")));
        let model = expand(&tree, &project_schema()).unwrap();

        assert!(!model.contains("Description"));
        assert!(!model.contains("TimeoutInMinutes"));
        assert!(!model.contains("Environment"));
        assert_eq!(model.get("Artifacts"), Some(&json!({"Type": "NO_ARTIFACTS"})));
    }

    #[test]
    fn test_expand_skips_computed_and_local() {
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("arn", "arn:aws:codebuild:proj")
            .with("retain_on_delete", true)
            .with("artifacts", BlockSet::new().with(artifact("S3", "x")));
        let model = expand(&tree, &project_schema()).unwrap();

        assert!(!model.contains("Arn"));
        assert!(!model.contains("retain_on_delete"));
    }

    #[test]
    fn test_expand_missing_required() {
        let tree = AttributeTree::new().with("name", "proj");
        let err = expand(&tree, &project_schema()).unwrap_err();
        assert_eq!(
            err,
            Error::MissingRequired {
                path: "artifacts".to_string()
            }
        );
    }

    #[test]
    fn test_expand_empty_single_block_fails_fast() {
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("artifacts", BlockSet::new());
        let err = expand(&tree, &project_schema()).unwrap_err();
        assert_eq!(
            err,
            Error::EmptySingleBlock {
                path: "artifacts".to_string()
            }
        );
    }

    #[test]
    fn test_expand_rejects_conflicting_identities() {
        let env = AttributeTree::new()
            .with("compute_type", "BUILD_GENERAL1_SMALL")
            .with("image", "img")
            .with("type", "LINUX_CONTAINER")
            .with(
                "environment_variable",
                BlockSet::new()
                    .with(env_var("A", "1"))
                    .with(env_var("A", "1")),
            );
        let schema = project_schema();
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("artifacts", BlockSet::new().with(artifact("S3", "x")))
            .with("environment", BlockSet::new().with(env));
        // exact duplicates collapse
        let model = expand(&tree, &schema).unwrap();
        assert_eq!(
            model.get("Environment").unwrap()["EnvironmentVariables"],
            json!([{"Name": "A", "Value": "1"}])
        );

        let artifacts_schema = BlockSchema::new(vec![AttrSchema::set(
            "artifacts",
            BlockSchema::new(vec![
                AttrSchema::string("type").required(),
                AttrSchema::string("location"),
            ]),
            &["type"],
        )]);
        let conflicting = AttributeTree::new().with(
            "artifacts",
            BlockSet::new()
                .with(artifact("S3", "bucket-a"))
                .with(artifact("S3", "bucket-b")),
        );
        let err = expand(&conflicting, &artifacts_schema).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentity { ref path, .. } if path == "artifacts"));
    }

    #[test]
    fn test_expand_unknown_attribute() {
        let tree = AttributeTree::new().with("nmae", "typo");
        let err = expand(&tree, &project_schema()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownAttribute {
                path: "nmae".to_string()
            }
        );
    }

    #[test]
    fn test_expand_type_mismatch() {
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("timeout", "five")
            .with("artifacts", BlockSet::new().with(artifact("S3", "x")));
        let err = expand(&tree, &project_schema()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref path, expected: "int", found: "string" } if path == "timeout"));
    }

    #[test]
    fn test_flatten_omits_null_fields() {
        let model = RemoteModel::from_value(json!({
            "Name": "proj",
            "Description": null,
            "Artifacts": {"Type": "S3", "Location": "bucket-a"},
            "Arn": "arn:aws:codebuild:us-east-1:1:project/proj",
            "Unrelated": 7
        }))
        .unwrap();
        let tree = flatten(&model, &project_schema()).unwrap();

        assert!(!tree.contains("description"));
        assert!(!tree.contains("timeout"));
        assert_eq!(
            tree.get_str("arn").unwrap(),
            Some("arn:aws:codebuild:us-east-1:1:project/proj")
        );
        let artifacts = tree.get_set("artifacts").unwrap().unwrap();
        assert_eq!(artifacts.len(), 1);
        assert!(!artifacts.first().unwrap().contains("name"));
    }

    #[test]
    fn test_flatten_missing_required_is_malformed() {
        let model = RemoteModel::from_value(json!({"Name": "proj"})).unwrap();
        let err = flatten(&model, &project_schema()).unwrap_err();
        assert_eq!(
            err,
            Error::Malformed {
                path: "artifacts".to_string(),
                message: "required field \"Artifacts\" is absent".to_string(),
            }
        );
    }

    #[test]
    fn test_flatten_wrong_type_is_malformed() {
        let model = RemoteModel::from_value(json!({
            "Name": "proj",
            "TimeoutInMinutes": "sixty",
            "Artifacts": {"Type": "S3"}
        }))
        .unwrap();
        let err = flatten(&model, &project_schema()).unwrap_err();
        assert!(matches!(err, Error::Malformed { ref path, .. } if path == "timeout"));
    }

    #[test]
    fn test_flatten_accepts_decimal_string_integers() {
        let model = RemoteModel::from_value(json!({
            "Name": "proj",
            "TimeoutInMinutes": "9007199254740993",
            "Artifacts": {"Type": "S3"}
        }))
        .unwrap();
        let tree = flatten(&model, &project_schema()).unwrap();
        assert_eq!(tree.get_int("timeout").unwrap(), Some(9_007_199_254_740_993));
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let schema = project_schema();
        let tree = declared();
        let back = flatten(&expand(&tree, &schema).unwrap(), &schema).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_round_trip_preserves_member_digests() {
        let schema = project_schema();
        let tree = declared();
        let back = flatten(&expand(&tree, &schema).unwrap(), &schema).unwrap();

        let fields = vec!["name".to_string(), "value".to_string()];
        let env_before = tree.get_set("environment").unwrap().unwrap().first().unwrap();
        let env_after = back.get_set("environment").unwrap().unwrap().first().unwrap();

        let mut before: Vec<_> = identities(env_before.get_set("environment_variable").unwrap().unwrap(), &fields)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let mut after: Vec<_> = identities(env_after.get_set("environment_variable").unwrap().unwrap(), &fields)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_round_trip_keeps_absent_fields_absent() {
        let schema = project_schema();
        let tree = AttributeTree::new()
            .with("name", "proj")
            .with("artifacts", BlockSet::new().with(AttributeTree::new().with("type", "S3")));
        let back = flatten(&expand(&tree, &schema).unwrap(), &schema).unwrap();

        let member = back.get_set("artifacts").unwrap().unwrap().first().unwrap();
        assert!(!member.contains("location"));
        assert!(!back.contains("tags"));
        assert_eq!(back, tree);
    }

    #[test]
    fn test_single_list_round_trip() {
        let partitioning = BlockSchema::new(vec![
            AttrSchema::string("type").required(),
            AttrSchema::int("expiration_ms").wire("expirationMs"),
        ]);
        let schema = BlockSchema::new(vec![
            AttrSchema::single_list("time_partitioning", partitioning).wire("timePartitioning"),
        ]);
        let tree = AttributeTree::new().with(
            "time_partitioning",
            vec![AttributeTree::new().with("type", "DAY").with("expiration_ms", 1000_i64)],
        );

        let model = expand(&tree, &schema).unwrap();
        assert_eq!(
            model.get("timePartitioning"),
            Some(&json!({"type": "DAY", "expirationMs": 1000}))
        );
        assert_eq!(flatten(&model, &schema).unwrap(), tree);
    }

    #[test]
    fn test_string_list_keeps_order() {
        let schema = BlockSchema::new(vec![AttrSchema::strings("inbound_services").wire("inboundServices")]);
        let tree = AttributeTree::new().with("inbound_services", vec!["INBOUND_SERVICE_MAIL", "INBOUND_SERVICE_WARMUP"]);

        let model = expand(&tree, &schema).unwrap();
        assert_eq!(
            model.get("inboundServices"),
            Some(&json!(["INBOUND_SERVICE_MAIL", "INBOUND_SERVICE_WARMUP"]))
        );
        assert_eq!(flatten(&model, &schema).unwrap(), tree);

        let mixed = RemoteModel::from_value(json!({"inboundServices": ["INBOUND_SERVICE_MAIL", 3]})).unwrap();
        let err = flatten(&mixed, &schema).unwrap_err();
        assert!(matches!(err, Error::Malformed { ref path, .. } if path == "inbound_services.1"));
    }

    #[test]
    fn test_flatten_keeps_first_of_colliding_members() {
        let schema = BlockSchema::new(vec![AttrSchema::set(
            "artifacts",
            BlockSchema::new(vec![
                AttrSchema::string("type").required(),
                AttrSchema::string("location"),
            ]),
            &["type"],
        )]);
        let model = RemoteModel::from_value(json!({
            "artifacts": [
                {"type": "S3", "location": "bucket-a"},
                {"type": "S3", "location": "bucket-b"}
            ]
        }))
        .unwrap();
        let tree = flatten(&model, &schema).unwrap();
        let set = tree.get_set("artifacts").unwrap().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.first().unwrap().get_str("location").unwrap(), Some("bucket-a"));
    }
}
