//! Deployed version of a serverless application service.
//!
//! Versions are created through a long-running operation. `apps_id` and
//! `services_id` name the parent application and service in the request
//! path, so they are local-only. The scaling blocks are mutually exclusive
//! and cannot be changed in place.

use attrtree::{AttrSchema, BlockSchema, ResourceSchema};

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(
        "appengine_version",
        "name",
        BlockSchema::new(vec![
            AttrSchema::string("apps_id").local().required().immutable(),
            AttrSchema::string("services_id").local().immutable(),
            AttrSchema::string("version").wire("id").immutable(),
            AttrSchema::string("runtime").wire("runtime").required(),
            AttrSchema::bool("threadsafe").wire("threadsafe"),
            AttrSchema::strings("inbound_services").wire("inboundServices"),
            AttrSchema::map("env_variables").wire("envVariables"),
            AttrSchema::map("beta_settings").wire("betaSettings"),
            AttrSchema::single_list("automatic_scaling", automatic_scaling())
                .wire("automaticScaling")
                .immutable(),
            AttrSchema::single_list("basic_scaling", basic_scaling())
                .wire("basicScaling")
                .immutable(),
            AttrSchema::single_list("deployment", deployment()).wire("deployment"),
            AttrSchema::string("name").wire("name").computed(),
            AttrSchema::string("create_time").wire("createTime").computed(),
            AttrSchema::string("created_by").wire("createdBy").computed(),
            AttrSchema::string("serving_status")
                .wire("servingStatus")
                .computed(),
            AttrSchema::string("version_url").wire("versionUrl").computed(),
        ]),
    )
}

fn automatic_scaling() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("cooldown_period").wire("coolDownPeriod"),
        AttrSchema::single_list(
            "cpu_utilization",
            BlockSchema::new(vec![
                AttrSchema::string("aggregation_window_length").wire("aggregationWindowLength"),
                AttrSchema::int("target_utilization").wire("targetUtilization"),
            ]),
        )
        .wire("cpuUtilization"),
        AttrSchema::single_list(
            "disk_utilization",
            BlockSchema::new(vec![
                AttrSchema::int("target_read_bytes_per_second").wire("targetReadBytesPerSecond"),
                AttrSchema::int("target_read_ops_per_second").wire("targetReadOpsPerSecond"),
                AttrSchema::int("target_write_bytes_per_second").wire("targetWriteBytesPerSecond"),
                AttrSchema::int("target_write_ops_per_second").wire("targetWriteOpsPerSecond"),
            ]),
        )
        .wire("diskUtilization"),
        AttrSchema::int("max_concurrent_requests").wire("maxConcurrentRequests"),
        AttrSchema::int("max_idle_instances").wire("maxIdleInstances"),
        AttrSchema::string("max_pending_latency")
            .wire("maxPendingLatency")
            .optional_computed(),
        AttrSchema::int("max_total_instances").wire("maxTotalInstances"),
        AttrSchema::int("min_idle_instances").wire("minIdleInstances"),
        AttrSchema::string("min_pending_latency")
            .wire("minPendingLatency")
            .optional_computed(),
        AttrSchema::int("min_total_instances").wire("minTotalInstances"),
        AttrSchema::single_list(
            "network_utilization",
            BlockSchema::new(vec![
                AttrSchema::int("target_received_bytes_per_second")
                    .wire("targetReceivedBytesPerSecond"),
                AttrSchema::int("target_received_packets_per_second")
                    .wire("targetReceivedPacketsPerSecond"),
                AttrSchema::int("target_sent_bytes_per_second").wire("targetSentBytesPerSecond"),
                AttrSchema::int("target_sent_packets_per_second")
                    .wire("targetSentPacketsPerSecond"),
            ]),
        )
        .wire("networkUtilization"),
        AttrSchema::single_list(
            "request_utilization",
            BlockSchema::new(vec![
                AttrSchema::int("target_concurrent_requests").wire("targetConcurrentRequests"),
                AttrSchema::int("target_request_count_per_second")
                    .wire("targetRequestCountPerSecond"),
            ]),
        )
        .wire("requestUtilization"),
    ])
}

fn basic_scaling() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::string("idle_timeout").wire("idleTimeout"),
        AttrSchema::int("max_instances").wire("maxInstances"),
    ])
}

fn deployment() -> BlockSchema {
    BlockSchema::new(vec![
        AttrSchema::single_list(
            "container",
            BlockSchema::new(vec![AttrSchema::string("image").wire("image")]),
        )
        .wire("container"),
    ])
}
