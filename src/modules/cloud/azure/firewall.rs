//! Azure Firewall (`Microsoft.Network/azureFirewalls`).

use crate::schema::{Compare, FieldSpec, ResourceSchema, SegmentSpec};

const SKU: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).choices(&["AZFW_VNet", "AZFW_Hub"]),
    FieldSpec::string("tier", &["tier"]).choices(&["Basic", "Standard", "Premium"]),
];

const IP_CONFIGURATION: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).required(),
    FieldSpec::string("subnet", &["properties", "subnet", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("public_ip_address", &["properties", "publicIPAddress", "id"])
        .compare(Compare::ResourceId),
];

const APPLICATION_RULES: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).required(),
    FieldSpec::int("priority", &["properties", "priority"]).required(),
    FieldSpec::string("action", &["properties", "action", "type"]).choices(&["Allow", "Deny"]),
    FieldSpec::json("rules", &["properties", "rules"]),
];

const NAT_RULES: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).required(),
    FieldSpec::int("priority", &["properties", "priority"]).required(),
    FieldSpec::string("action", &["properties", "action", "type"]).choices(&["Dnat", "Snat"]),
    FieldSpec::json("rules", &["properties", "rules"]),
];

const NETWORK_RULES: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).required(),
    FieldSpec::int("priority", &["properties", "priority"]).required(),
    FieldSpec::string("action", &["properties", "action", "type"]).choices(&["Allow", "Deny"]),
    FieldSpec::json("rules", &["properties", "rules"]),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "azurefirewall",
    display_name: "Azure Firewall",
    description: "Rule collections are matched by name.",
    provider: "Microsoft.Network",
    api_version: "2023-05-01",
    segments: &[SegmentSpec::fixed("azureFirewalls", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::strings("zones", &["zones"]).not_updatable(),
        FieldSpec::dict("sku", &["properties", "sku"], SKU),
        FieldSpec::string("threat_intel_mode", &["properties", "threatIntelMode"])
            .choices(&["Alert", "Deny", "Off"]),
        FieldSpec::string("firewall_policy", &["properties", "firewallPolicy", "id"])
            .compare(Compare::ResourceId),
        FieldSpec::dict_list(
            "ip_configurations",
            &["properties", "ipConfigurations"],
            IP_CONFIGURATION,
        ),
        FieldSpec::dict(
            "management_ip_configuration",
            &["properties", "managementIpConfiguration"],
            IP_CONFIGURATION,
        ),
        FieldSpec::dict_list(
            "application_rule_collections",
            &["properties", "applicationRuleCollections"],
            APPLICATION_RULES,
        ),
        FieldSpec::dict_list(
            "nat_rule_collections",
            &["properties", "natRuleCollections"],
            NAT_RULES,
        ),
        FieldSpec::dict_list(
            "network_rule_collections",
            &["properties", "networkRuleCollections"],
            NETWORK_RULES,
        ),
    ],
};
