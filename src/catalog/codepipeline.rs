//! Release pipeline on a hosted delivery service.
//!
//! Stages and their actions run in declaration order, so both are ordered
//! lists. The service bumps `version` on every update.

use attrtree::{AttrSchema, BlockSchema, ResourceSchema};

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "codepipeline",
        "name",
        BlockSchema::new(vec![
            AttrSchema::string("name").wire("name").required().immutable(),
            AttrSchema::string("role_arn").wire("roleArn").required(),
            AttrSchema::int("version").wire("version").computed(),
            AttrSchema::single_list("artifact_store", artifact_store())
                .wire("artifactStore")
                .required(),
            AttrSchema::list("stage", stage()).wire("stages").required(),
        ]),
    )
}

fn artifact_store() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("location").wire("location").required(),
        AttrSchema::string("type").wire("type").required(),
        AttrSchema::single_list(
            "encryption_key",
            BlockSchema::new(vec![
                AttrSchema::string("id").wire("id").required(),
                AttrSchema::string("type").wire("type").required(),
            ]),
        )
        .wire("encryptionKey"),
    ])
}

fn stage() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("name").wire("name").required(),
        AttrSchema::list("action", action()).wire("actions").required(),
    ])
}

fn action() -> BlockSchema {
    let artifact = || BlockSchema::new(vec![AttrSchema::string("name").wire("name").required()]);
    BlockSchema::new(vec![
        AttrSchema::string("name").wire("name").required(),
        AttrSchema::single_list(
            "action_type_id",
            BlockSchema::new(vec![
                AttrSchema::string("category").wire("category").required(),
                AttrSchema::string("owner").wire("owner").required(),
                AttrSchema::string("provider").wire("provider").required(),
                AttrSchema::string("version").wire("version").required(),
            ]),
        )
        .wire("actionTypeId")
        .required(),
        AttrSchema::map("configuration").wire("configuration"),
        AttrSchema::list("input_artifact", artifact()).wire("inputArtifacts"),
        AttrSchema::list("output_artifact", artifact()).wire("outputArtifacts"),
        AttrSchema::string("role_arn").wire("roleArn"),
        AttrSchema::int("run_order").wire("runOrder").optional_computed(),
    ])
}
