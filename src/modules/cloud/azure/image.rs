//! Virtual machine images (`Microsoft.Compute/images`).
//!
//! An image is captured from a generalized VM, or assembled from an OS disk
//! (blob, managed disk or snapshot) plus optional data disks.

use super::managed_disk::OS_TYPES;
use crate::schema::{Compare, DefaultValue, FieldSpec, ResourceSchema, SegmentSpec};

const CACHING: &[&str] = &["None", "ReadOnly", "ReadWrite"];

const OS_DISK: &[FieldSpec] = &[
    FieldSpec::string("os_type", &["osType"])
        .choices(OS_TYPES)
        .required(),
    FieldSpec::string("os_state", &["osState"])
        .choices(&["Generalized", "Specialized"])
        .default_value(DefaultValue::Str("Generalized")),
    FieldSpec::string("blob_uri", &["blobUri"]),
    FieldSpec::string("managed_disk_id", &["managedDisk", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("snapshot_id", &["snapshot", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("caching", &["caching"]).choices(CACHING),
    FieldSpec::string("storage_account_type", &["storageAccountType"]),
    FieldSpec::int("disk_size_gb", &["diskSizeGB"]),
];

const DATA_DISK: &[FieldSpec] = &[
    FieldSpec::int("lun", &["lun"]).required(),
    FieldSpec::string("blob_uri", &["blobUri"]),
    FieldSpec::string("managed_disk_id", &["managedDisk", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("snapshot_id", &["snapshot", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("caching", &["caching"]).choices(CACHING),
    FieldSpec::string("storage_account_type", &["storageAccountType"]),
    FieldSpec::int("disk_size_gb", &["diskSizeGB"]),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "image",
    display_name: "image",
    description: "Use either source_virtual_machine or os_disk.",
    provider: "Microsoft.Compute",
    api_version: "2023-03-01",
    segments: &[SegmentSpec::fixed("images", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::string(
            "source_virtual_machine",
            &["properties", "sourceVirtualMachine", "id"],
        )
        .compare(Compare::ResourceId)
        .not_updatable(),
        FieldSpec::dict("os_disk", &["properties", "storageProfile", "osDisk"], OS_DISK),
        FieldSpec::dict_list(
            "data_disks",
            &["properties", "storageProfile", "dataDisks"],
            DATA_DISK,
        ),
        FieldSpec::bool("zone_resilient", &["properties", "storageProfile", "zoneResilient"]),
        FieldSpec::string("hyper_v_generation", &["properties", "hyperVGeneration"])
            .choices(&["V1", "V2"])
            .not_updatable(),
    ],
};
