//! Virtual network gateways (`Microsoft.Network/virtualNetworkGateways`).
//!
//! Provisioning a gateway routinely takes 30+ minutes; ARM accepts the PUT
//! and the poller waits for `provisioningState` to settle.

use crate::schema::{Compare, DefaultValue, FieldSpec, ResourceSchema, SegmentSpec};

const IP_CONFIGURATION: &[FieldSpec] = &[
    FieldSpec::string("name", &["name"]).required(),
    FieldSpec::string(
        "private_ip_allocation_method",
        &["properties", "privateIPAllocationMethod"],
    )
    .choices(&["Dynamic", "Static"])
    .default_value(DefaultValue::Str("Dynamic")),
    FieldSpec::string("subnet", &["properties", "subnet", "id"]).compare(Compare::ResourceId),
    FieldSpec::string("public_ip_address", &["properties", "publicIPAddress", "id"])
        .compare(Compare::ResourceId),
];

const BGP_SETTINGS: &[FieldSpec] = &[
    FieldSpec::int("asn", &["asn"]),
    FieldSpec::string("bgp_peering_address", &["bgpPeeringAddress"]),
    FieldSpec::int("peer_weight", &["peerWeight"]),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "virtualnetworkgateway",
    display_name: "virtual network gateway",
    description: "VPN and ExpressRoute gateways.",
    provider: "Microsoft.Network",
    api_version: "2023-05-01",
    segments: &[SegmentSpec::fixed("virtualNetworkGateways", "name")],
    fields: &[
        FieldSpec::string("location", &["location"])
            .compare(Compare::Location)
            .not_updatable()
            .required(),
        FieldSpec::map("tags", &["tags"]),
        FieldSpec::dict_list(
            "ip_configurations",
            &["properties", "ipConfigurations"],
            IP_CONFIGURATION,
        ),
        FieldSpec::string("gateway_type", &["properties", "gatewayType"])
            .choices(&["Vpn", "ExpressRoute"])
            .default_value(DefaultValue::Str("Vpn"))
            .not_updatable(),
        FieldSpec::string("vpn_type", &["properties", "vpnType"])
            .choices(&["RouteBased", "PolicyBased"])
            .default_value(DefaultValue::Str("RouteBased"))
            .not_updatable(),
        FieldSpec::string("sku", &["properties", "sku", "name"])
            .choices(&[
                "Basic",
                "VpnGw1",
                "VpnGw2",
                "VpnGw3",
                "VpnGw4",
                "VpnGw5",
                "VpnGw1AZ",
                "VpnGw2AZ",
                "VpnGw3AZ",
                "Standard",
                "HighPerformance",
                "UltraPerformance",
                "ErGw1AZ",
                "ErGw2AZ",
                "ErGw3AZ",
            ])
            .default_value(DefaultValue::Str("VpnGw1")),
        FieldSpec::string("vpn_gateway_generation", &["properties", "vpnGatewayGeneration"])
            .choices(&["Generation1", "Generation2", "None"]),
        FieldSpec::bool("enable_bgp", &["properties", "enableBgp"])
            .default_value(DefaultValue::Bool(false)),
        FieldSpec::bool("active_active", &["properties", "activeActive"]),
        FieldSpec::dict("bgp_settings", &["properties", "bgpSettings"], BGP_SETTINGS),
    ],
};
