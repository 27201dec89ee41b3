//! ExpressRoute circuits (`Microsoft.Network/expressRouteCircuits`).

use crate::schema::{Compare, FieldSpec, ResourceSchema, SegmentSpec};

const SKU: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).doc("`{tier}_{family}`, e.g. Standard_MeteredData"),
    FieldSpec::string("tier", &["tier"])
        .choices(&["Local", "Basic", "Standard", "Premium"])
        .required(),
    FieldSpec::string("family", &["family"])
        .choices(&["MeteredData", "UnlimitedData"])
        .required(),
];

const SERVICE_PROVIDER: &[FieldSpec] = &[
    FieldSpec::string("service_provider_name", &["serviceProviderName"])
        .compare(Compare::CaseInsensitive)
        .not_updatable(),
    FieldSpec::string("peering_location", &["peeringLocation"])
        .compare(Compare::CaseInsensitive)
        .not_updatable(),
    FieldSpec::int("bandwidth_in_mbps", &["bandwidthInMbps"]),
];

const AUTHORIZATION: &[FieldSpec] = &[FieldSpec::string("name", &["name"]).required()];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "expressroutecircuit",
    display_name: "ExpressRoute circuit",
    description: "Circuits through a connectivity provider or on an ExpressRoute port.",
    provider: "Microsoft.Network",
    api_version: "2023-05-01",
    segments: &[SegmentSpec::fixed("expressRouteCircuits", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::dict("sku", &["sku"], SKU),
        FieldSpec::dict(
            "service_provider_properties",
            &["properties", "serviceProviderProperties"],
            SERVICE_PROVIDER,
        ),
        FieldSpec::bool("allow_classic_operations", &["properties", "allowClassicOperations"]),
        FieldSpec::bool("global_reach_enabled", &["properties", "globalReachEnabled"]),
        FieldSpec::string("express_route_port", &["properties", "expressRoutePort", "id"])
            .compare(Compare::ResourceId)
            .not_updatable(),
        FieldSpec::json("bandwidth_in_gbps", &["properties", "bandwidthInGbps"]),
        FieldSpec::dict_list("authorizations", &["properties", "authorizations"], AUTHORIZATION),
    ],
};
