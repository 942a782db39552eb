//! Table in a hosted data warehouse.
//!
//! Tables can be left behind on delete by setting the local-only
//! `retain_on_delete` flag. Large counters are reported by the service as
//! decimal strings; read-only counters are kept as strings, while the
//! declarable expirations are integers parsed from either form.

use attrtree::{AttrSchema, BlockSchema, ResourceSchema};

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "bigquery_table",
        "id",
        BlockSchema::new(vec![
            AttrSchema::string("table_id").wire("tableId").required().immutable(),
            AttrSchema::string("dataset_id")
                .wire("datasetId")
                .required()
                .immutable(),
            AttrSchema::string("project")
                .wire("projectId")
                .optional_computed()
                .immutable(),
            AttrSchema::string("description").wire("description"),
            AttrSchema::int("expiration_time").wire("expirationTime"),
            AttrSchema::string("friendly_name").wire("friendlyName"),
            AttrSchema::map("labels").wire("labels"),
            AttrSchema::string("schema").wire("schema").optional_computed(),
            AttrSchema::single_list(
                "time_partitioning",
                BlockSchema::new(vec![
                    AttrSchema::string("type").wire("type").required(),
                    AttrSchema::int("expiration_ms").wire("expirationMs"),
                ]),
            )
            .wire("timePartitioning"),
            AttrSchema::bool("retain_on_delete").local(),
            AttrSchema::string("id").wire("id").computed(),
            AttrSchema::string("creation_time").wire("creationTime").computed(),
            AttrSchema::string("etag").wire("etag").computed(),
            AttrSchema::string("kind").wire("kind").computed(),
            AttrSchema::string("last_modified_time")
                .wire("lastModifiedTime")
                .computed(),
            AttrSchema::string("location").wire("location").computed(),
            AttrSchema::string("num_bytes").wire("numBytes").computed(),
            AttrSchema::string("num_long_term_bytes")
                .wire("numLongTermBytes")
                .computed(),
            AttrSchema::string("num_rows").wire("numRows").computed(),
            AttrSchema::string("self_link").wire("selfLink").computed(),
            AttrSchema::string("type").wire("type").computed(),
        ]),
    )
    .with_retain_flag("retain_on_delete")
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrtree::{AttributeTree, RemoteModel, diff, expand, flatten};
    use serde_json::json;

    #[test]
    fn test_retain_flag_is_not_sent() {
        let tree = AttributeTree::new()
            .with("table_id", "events")
            .with("dataset_id", "analytics")
            .with("retain_on_delete", true)
            .with(
                "time_partitioning",
                vec![AttributeTree::new().with("type", "DAY")],
            );

        let model = expand(&tree, &schema().block).unwrap();
        assert_eq!(
            model.into_value(),
            json!({
                "tableId": "events",
                "datasetId": "analytics",
                "timePartitioning": {"type": "DAY"}
            })
        );
    }

    #[test]
    fn test_flatten_reads_computed_fields() {
        let model = RemoteModel::from_value(json!({
            "id": "proj:analytics.events",
            "tableId": "events",
            "datasetId": "analytics",
            "numRows": "1024",
            "type": "TABLE",
            "etag": null
        }))
        .unwrap();

        let tree = flatten(&model, &schema().block).unwrap();
        assert_eq!(tree.get_str("num_rows").unwrap(), Some("1024"));
        assert_eq!(tree.get_str("type").unwrap(), Some("TABLE"));
        assert!(!tree.contains("etag"));
        assert_eq!(schema().identifier(&model).as_deref(), Some("proj:analytics.events"));
    }

    #[test]
    fn test_flatten_string_encoded_expirations() {
        let model = RemoteModel::from_value(json!({
            "id": "proj:analytics.events",
            "tableId": "events",
            "datasetId": "analytics",
            "expirationTime": "1893456000000",
            "timePartitioning": {"type": "DAY", "expirationMs": "86400000"}
        }))
        .unwrap();

        let tree = flatten(&model, &schema().block).unwrap();
        assert_eq!(tree.get_int("expiration_time").unwrap(), Some(1_893_456_000_000));
        let partitioning = tree.get_list("time_partitioning").unwrap().unwrap();
        assert_eq!(partitioning[0].get_int("expiration_ms").unwrap(), Some(86_400_000));
    }

    #[test]
    fn test_undeclared_project_is_not_a_replacement() {
        let observed = flatten(
            &RemoteModel::from_value(json!({
                "id": "proj:analytics.events",
                "tableId": "events",
                "datasetId": "analytics",
                "projectId": "proj"
            }))
            .unwrap(),
            &schema().block,
        )
        .unwrap();
        let declared = AttributeTree::new()
            .with("table_id", "events")
            .with("dataset_id", "analytics")
            .with("description", "clickstream");

        let changes = diff(&observed, &declared, &schema().block);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "description");
        assert!(!changes[0].requires_replacement);

        let moved = declared.with("project", "other");
        assert!(attrtree::requires_replacement(&diff(&observed, &moved, &schema().block)));
    }
}
