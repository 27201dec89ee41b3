//! Disk snapshots (`Microsoft.Compute/snapshots`).

use super::managed_disk::{NETWORK_ACCESS, OS_TYPES, PUBLIC_ACCESS};
use crate::schema::{Compare, FieldSpec, ResourceSchema, SegmentSpec};

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "snapshot",
    display_name: "snapshot",
    description: "A snapshot is taken from a disk (Copy) or imported from a blob (Import).",
    provider: "Microsoft.Compute",
    api_version: "2023-04-02",
    segments: &[SegmentSpec::fixed("snapshots", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::string("sku", &["sku", "name"])
            .choices(&["Standard_LRS", "Premium_LRS", "Standard_ZRS"]),
        FieldSpec::bool("incremental", &["properties", "incremental"]).not_updatable(),
        FieldSpec::string("create_option", &["properties", "creationData", "createOption"])
            .choices(&["Copy", "Import", "CopyStart"])
            .not_updatable()
            .required(),
        FieldSpec::string("source_uri", &["properties", "creationData", "sourceUri"])
            .not_updatable(),
        FieldSpec::string(
            "source_resource_id",
            &["properties", "creationData", "sourceResourceId"],
        )
        .compare(Compare::ResourceId)
        .not_updatable(),
        FieldSpec::string(
            "storage_account_id",
            &["properties", "creationData", "storageAccountId"],
        )
        .compare(Compare::ResourceId)
        .not_updatable(),
        FieldSpec::string("os_type", &["properties", "osType"]).choices(OS_TYPES),
        FieldSpec::int("disk_size_gb", &["properties", "diskSizeGB"]),
        FieldSpec::string("network_access_policy", &["properties", "networkAccessPolicy"])
            .choices(NETWORK_ACCESS),
        FieldSpec::string("public_network_access", &["properties", "publicNetworkAccess"])
            .choices(PUBLIC_ACCESS),
    ],
};
