//! Managed disks (`Microsoft.Compute/disks`).

use crate::schema::{Compare, DefaultValue, FieldSpec, ResourceSchema, SegmentSpec};

pub(crate) const DISK_SKUS: &[&str] = &[
    "Standard_LRS",
    "Premium_LRS",
    "StandardSSD_LRS",
    "UltraSSD_LRS",
    "Premium_ZRS",
    "StandardSSD_ZRS",
    "PremiumV2_LRS",
];

pub(crate) const OS_TYPES: &[&str] = &["Linux", "Windows"];

pub(crate) const NETWORK_ACCESS: &[&str] = &["AllowAll", "AllowPrivate", "DenyAll"];

pub(crate) const PUBLIC_ACCESS: &[&str] = &["Enabled", "Disabled"];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "manageddisk",
    display_name: "managed disk",
    description: "Source options only apply when the disk is created.",
    provider: "Microsoft.Compute",
    api_version: "2023-04-02",
    segments: &[SegmentSpec::fixed("disks", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::string("sku", &["sku", "name"]).choices(DISK_SKUS),
        FieldSpec::strings("zones", &["zones"]).not_updatable(),
        FieldSpec::string("create_option", &["properties", "creationData", "createOption"])
            .choices(&["Empty", "Import", "Copy", "FromImage", "Restore"])
            .default_value(DefaultValue::Str("Empty"))
            .not_updatable(),
        FieldSpec::string("source_uri", &["properties", "creationData", "sourceUri"])
            .not_updatable()
            .doc("Blob URI to import from (create_option: Import)"),
        FieldSpec::string(
            "source_resource_id",
            &["properties", "creationData", "sourceResourceId"],
        )
        .compare(Compare::ResourceId)
        .not_updatable()
        .doc("Disk or snapshot to copy (create_option: Copy)"),
        FieldSpec::string(
            "storage_account_id",
            &["properties", "creationData", "storageAccountId"],
        )
        .compare(Compare::ResourceId)
        .not_updatable(),
        FieldSpec::string(
            "image_reference_id",
            &["properties", "creationData", "imageReference", "id"],
        )
        .compare(Compare::ResourceId)
        .not_updatable(),
        FieldSpec::int("disk_size_gb", &["properties", "diskSizeGB"]),
        FieldSpec::string("os_type", &["properties", "osType"]).choices(OS_TYPES),
        FieldSpec::int("disk_iops_read_write", &["properties", "diskIOPSReadWrite"]),
        FieldSpec::int("disk_mbps_read_write", &["properties", "diskMBpsReadWrite"]),
        FieldSpec::int("max_shares", &["properties", "maxShares"]),
        FieldSpec::string("network_access_policy", &["properties", "networkAccessPolicy"])
            .choices(NETWORK_ACCESS),
        FieldSpec::string("public_network_access", &["properties", "publicNetworkAccess"])
            .choices(PUBLIC_ACCESS),
        FieldSpec::string(
            "disk_encryption_set_id",
            &["properties", "encryption", "diskEncryptionSetId"],
        )
        .compare(Compare::ResourceId),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::find_drift;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_resize_is_drift_but_zone_is_not() {
        let params: HashMap<String, serde_json::Value> = serde_json::from_value(json!({
            "location": "East US",
            "disk_size_gb": 64,
            "zones": ["1"]
        }))
        .unwrap();
        let desired = SCHEMA.build_payload(&params).unwrap();
        let observed = json!({
            "location": "eastus",
            "zones": ["2"],
            "properties": {"diskSizeGB": 32, "creationData": {"createOption": "Empty"}}
        });
        let drift = find_drift(SCHEMA.fields, &desired, &observed).unwrap();
        assert_eq!(drift.path, "disk_size_gb");
    }
}
