// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn raw(fields: &[(&str, &str)]) -> RawRecord {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

fn full_row() -> RawRecord {
    raw(&[
        ("Corp Number", "X100"),
        ("Legal Name", "ACME Widgets LLC"),
        ("Corporation Type", "Domestic LLC"),
        ("Effective Date", "03/15/2019"),
        ("Registered Agent", "Jane Smith"),
        ("RA Address 1", "100 Main St"),
        ("RA City", "Des Moines"),
        ("RA State", "IA"),
        ("RA Zip", "50309"),
        ("HO Address 1", "200 Grand Ave"),
        ("HO City", "Des Moines"),
        ("HO State", "IA"),
        ("HO Zip", "50309"),
        ("HO Location", "POINT (-93.62 41.59)"),
    ])
}

fn parse(loader: &BusinessRegistryLoader, raw: &RawRecord) -> Option<BusinessRecord> {
    loader
        .parse_record(raw)
        .unwrap()
        .map(|value| serde_json::from_value(value).unwrap())
}

#[test]
fn parse_full_row() {
    let loader = BusinessRegistryLoader::new();
    let record = parse(&loader, &full_row()).unwrap();

    assert_eq!(record.corp_number.as_deref(), Some("X100"));
    assert_eq!(record.legal_name, "ACME Widgets LLC");
    assert_eq!(record.registered_agent.name.as_deref(), Some("Jane Smith"));
    assert_eq!(record.home_office.coordinates, Some((-93.62, 41.59)));
}

#[yare::parameterized(
    no_name = { "Legal Name" },
    no_type = { "Corporation Type" },
)]
fn parse_skips_rows_missing_required(field: &str) {
    let loader = BusinessRegistryLoader::new();
    let mut row = full_row();
    row.insert(field.to_string(), serde_json::Value::String("  ".into()));
    assert!(parse(&loader, &row).is_none());
}

#[test]
fn parse_strips_quotes_and_whitespace() {
    let loader = BusinessRegistryLoader::new();
    let mut row = full_row();
    row.insert("Legal Name".into(), serde_json::Value::String("  \"ACME\" Widgets  ".into()));
    let record = parse(&loader, &row).unwrap();
    assert_eq!(record.legal_name, "ACME Widgets");
}

#[yare::parameterized(
    plain_point  = { "POINT (-93.62 41.59)", Some((-93.62, 41.59)) },
    srid_point   = { "SRID=4326;POINT(-93.6 41.5)", Some((-93.6, 41.5)) },
    not_a_point  = { "Des Moines", None },
    empty        = { "", None },
)]
fn point_parsing(input: &str, expected: Option<(f64, f64)>) {
    assert_eq!(parse_point(input), expected);
}

#[yare::parameterized(
    llc         = { "ACME Holdings LLC",        NodeType::Company },
    inc_dotted  = { "Registered Agents Inc.",   NodeType::Company },
    corporation = { "CT CORPORATION SYSTEM",    NodeType::Company },
    person      = { "Jane Smith",               NodeType::Person },
    cory        = { "Cory Smith",               NodeType::Person },
)]
fn agent_classification(name: &str, expected: NodeType) {
    assert_eq!(classify_agent(name), expected);
}

#[test]
fn validation_accepts_full_row() {
    let loader = BusinessRegistryLoader::new();
    let value = loader.parse_record(&full_row()).unwrap().unwrap();
    assert!(loader.validate_record(&value).is_empty());
}

#[test]
fn validation_flags_bad_date_and_zip() {
    let loader = BusinessRegistryLoader::new();
    let mut row = full_row();
    row.insert("Effective Date".into(), serde_json::Value::String("13/45/2019".into()));
    row.insert("HO Zip".into(), serde_json::Value::String("5030".into()));
    let value = loader.parse_record(&row).unwrap().unwrap();
    let errors = loader.validate_record(&value);
    assert_eq!(errors.len(), 2);
}

#[test]
fn company_fact_shape() {
    let loader = BusinessRegistryLoader::new();
    let record = parse(&loader, &full_row()).unwrap();
    let fact = company_state_fact(&record);

    assert_eq!(fact.source.node_type, NodeType::Company);
    assert_eq!(fact.relationship, RelationshipType::IncorporatedIn);
    assert_eq!(fact.target, Entity::new(NodeType::State, "Iowa"));
    assert_eq!(fact.relationship_strength, 0.98);
    let attrs = fact.source_attributes.unwrap();
    assert_eq!(attrs.get("business_id").map(String::as_str), Some("X100"));
    assert_eq!(attrs.get("entity_type").map(String::as_str), Some("Domestic LLC"));
    assert_eq!(attrs.get("incorporation_date").map(String::as_str), Some("03/15/2019"));
}

#[test]
fn agent_fact_shape() {
    let loader = BusinessRegistryLoader::new();
    let record = parse(&loader, &full_row()).unwrap();
    let fact = registered_agent_fact(&record).unwrap();

    assert_eq!(fact.source, Entity::new(NodeType::Person, "Jane Smith"));
    assert_eq!(fact.relationship, RelationshipType::RegisteredAgent);
    assert_eq!(fact.target, Entity::new(NodeType::Company, "ACME Widgets LLC"));
    let attrs = fact.source_attributes.unwrap();
    assert_eq!(attrs.get("role").map(String::as_str), Some("Registered Agent"));
    assert_eq!(attrs.get("address").map(String::as_str), Some("100 Main St"));
    assert_eq!(attrs.get("location").map(String::as_str), Some("Des Moines, IA, 50309"));
    assert_eq!(fact.relationship_metadata.unwrap()["corp_number"], "X100");
}

#[test]
fn agent_fact_absent_without_agent() {
    let loader = BusinessRegistryLoader::new();
    let mut row = full_row();
    row.remove("Registered Agent");
    let record = parse(&loader, &row).unwrap();
    assert!(registered_agent_fact(&record).is_none());
}

#[test]
fn record_id_is_corp_number() {
    let loader = BusinessRegistryLoader::new();
    assert_eq!(loader.record_id(&full_row()).as_deref(), Some("X100"));
}

#[test]
fn descriptor_identity() {
    let loader = BusinessRegistryLoader::new();
    assert_eq!(loader.descriptor().source_type, "iowa_business");
    assert_eq!(loader.descriptor().format, RecordFormat::Csv);
}
