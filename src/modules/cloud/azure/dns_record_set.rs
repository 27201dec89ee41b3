//! DNS record sets (`Microsoft.Network/dnsZones/{recordType}`).
//!
//! The record type is part of the resource id, so it is an identity
//! parameter rather than a field. Info lookups without `record_type` list
//! every record set in the zone.

use crate::schema::{Compare, DefaultValue, FieldSpec, ResourceSchema, SegmentSpec};

const A_RECORD: &[FieldSpec] = &[FieldSpec::string("ipv4_address", &["ipv4Address"]).required()];

const AAAA_RECORD: &[FieldSpec] =
    &[FieldSpec::string("ipv6_address", &["ipv6Address"]).required()];

const CNAME_RECORD: &[FieldSpec] = &[FieldSpec::string("cname", &["cname"]).required()];

const MX_RECORD: &[FieldSpec] = &[
    FieldSpec::int("preference", &["preference"]).required(),
    FieldSpec::string("exchange", &["exchange"]).required(),
];

const NS_RECORD: &[FieldSpec] = &[FieldSpec::string("nsdname", &["nsdname"]).required()];

const PTR_RECORD: &[FieldSpec] = &[FieldSpec::string("ptrdname", &["ptrdname"]).required()];

const SRV_RECORD: &[FieldSpec] = &[
    FieldSpec::int("priority", &["priority"]).required(),
    FieldSpec::int("weight", &["weight"]).required(),
    FieldSpec::int("port", &["port"]).required(),
    FieldSpec::string("target", &["target"]).required(),
];

const TXT_RECORD: &[FieldSpec] = &[FieldSpec::strings("value", &["value"]).required()];

const CAA_RECORD: &[FieldSpec] = &[
    FieldSpec::int("flags", &["flags"]).required(),
    FieldSpec::string("tag", &["tag"]).required(),
    FieldSpec::string("value", &["value"]).required(),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    kind: "dnsrecordset",
    display_name: "DNS record set",
    description: "Records are replaced as a whole set; the record lists below are exact.",
    provider: "Microsoft.Network",
    api_version: "2018-05-01",
    segments: &[
        SegmentSpec::fixed("dnsZones", "zone_name"),
        SegmentSpec::from_param("record_type", "recordsets", "relative_name"),
    ],
    fields: &[
        FieldSpec::int("ttl", &["properties", "TTL"])
            .default_value(DefaultValue::Int(3600))
            .doc("Time to live in seconds"),
        FieldSpec::map("metadata", &["properties", "metadata"]),
        FieldSpec::dict_list("a_records", &["properties", "ARecords"], A_RECORD),
        FieldSpec::dict_list("aaaa_records", &["properties", "AAAARecords"], AAAA_RECORD),
        FieldSpec::dict("cname_record", &["properties", "CNAMERecord"], CNAME_RECORD),
        FieldSpec::dict_list("mx_records", &["properties", "MXRecords"], MX_RECORD),
        FieldSpec::dict_list("ns_records", &["properties", "NSRecords"], NS_RECORD),
        FieldSpec::dict_list("ptr_records", &["properties", "PTRRecords"], PTR_RECORD),
        FieldSpec::dict_list("srv_records", &["properties", "SRVRecords"], SRV_RECORD),
        FieldSpec::dict_list("txt_records", &["properties", "TXTRecords"], TXT_RECORD),
        FieldSpec::dict_list("caa_records", &["properties", "caaRecords"], CAA_RECORD),
        FieldSpec::string("target_resource", &["properties", "targetResource", "id"])
            .compare(Compare::ResourceId)
            .doc("Alias target (Azure resource id)"),
    ],
};
