//! Build project on a hosted CI service.
//!
//! Artifacts, environment and source are single-element block sets sent as
//! nested objects. Their identity fields follow how the service keys them:
//! an artifacts block is identified by its type alone, so two artifact
//! declarations differing only in location are the same member.

use attrtree::{AttrSchema, BlockSchema, ResourceSchema};

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "codebuild_project",
        "Name",
        BlockSchema::new(vec![
            AttrSchema::string("name").wire("Name").required().immutable(),
            AttrSchema::string("description")
                .wire("Description")
                .optional_computed(),
            AttrSchema::string("encryption_key")
                .wire("EncryptionKey")
                .optional_computed(),
            AttrSchema::string("service_role")
                .wire("ServiceRole")
                .optional_computed(),
            AttrSchema::int("timeout").wire("TimeoutInMinutes"),
            AttrSchema::map("tags").wire("Tags"),
            AttrSchema::single_set("artifacts", artifacts(), &["type"])
                .wire("Artifacts")
                .required(),
            AttrSchema::single_set("environment", environment(), &["type", "compute_type", "image"])
                .wire("Environment")
                .required(),
            AttrSchema::single_set("source", source(), &["type", "buildspec", "location"])
                .wire("Source")
                .required(),
            AttrSchema::string("arn").wire("Arn").computed(),
        ]),
    )
}

fn artifacts() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("type").wire("Type").required(),
        AttrSchema::string("name").wire("Name"),
        AttrSchema::string("location").wire("Location"),
        AttrSchema::string("namespace_type").wire("NamespaceType"),
        AttrSchema::string("packaging").wire("Packaging"),
        AttrSchema::string("path").wire("Path"),
    ])
}

fn environment() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("type").wire("Type").required(),
        AttrSchema::string("compute_type").wire("ComputeType").required(),
        AttrSchema::string("image").wire("Image").required(),
        AttrSchema::set(
            "environment_variable",
            BlockSchema::new(vec![
                AttrSchema::string("name").wire("Name").required(),
                AttrSchema::string("value").wire("Value").required(),
            ]),
            &["name", "value"],
        )
        .wire("EnvironmentVariables"),
    ])
}

fn source() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("type").wire("Type").required(),
        AttrSchema::string("buildspec").wire("Buildspec"),
        AttrSchema::string("location").wire("Location"),
        AttrSchema::single_set(
            "auth",
            BlockSchema::new(vec![
                AttrSchema::string("type").wire("Type").required(),
                AttrSchema::string("resource").wire("Resource"),
            ]),
            &["type"],
        )
        .wire("Auth"),
    ])
}
