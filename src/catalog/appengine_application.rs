//! Serverless application container for a cloud project.
//!
//! Creation is asynchronous on the service side; the application is named
//! `apps/<project>` once it exists.

use attrtree::{AttrSchema, BlockSchema, ResourceSchema};

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "appengine_application",
        "name",
        BlockSchema::new(vec![
            AttrSchema::string("project").wire("id").immutable(),
            AttrSchema::string("location_id")
                .wire("locationId")
                .required()
                .immutable(),
            AttrSchema::string("name").wire("name").computed(),
            AttrSchema::string("auth_domain").wire("authDomain").computed(),
            AttrSchema::string("code_bucket").wire("codeBucket").computed(),
            AttrSchema::string("serving_status")
                .wire("servingStatus")
                .computed(),
        ]),
    )
}
