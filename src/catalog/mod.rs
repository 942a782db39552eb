//! Built-in resource schemas.

mod appengine_application;
mod appengine_version;
mod bigquery_table;
mod codebuild_project;
mod codepipeline;

use attrtree::ResourceSchema;

/// Names of all built-in resource types
pub const TYPES: &[&str] = &[
    "appengine_application",
    "appengine_version",
    "bigquery_table",
    "codebuild_project",
    "codepipeline",
];

/// Look up a built-in resource schema by type name.
pub fn lookup(type_name: &str) -> Option<ResourceSchema> {
    match type_name {
        "appengine_application" => Some(appengine_application::schema()),
        "appengine_version" => Some(appengine_version::schema()),
        "bigquery_table" => Some(bigquery_table::schema()),
        "codebuild_project" => Some(codebuild_project::schema()),
        "codepipeline" => Some(codepipeline::schema()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_resolves_and_validates() {
        for name in TYPES {
            let schema = lookup(name).unwrap();
            assert_eq!(schema.type_name, *name);
            schema.validate().unwrap();
        }
    }

    #[test]
    fn test_unknown_type() {
        assert!(lookup("s3_bucket").is_none());
    }
}
