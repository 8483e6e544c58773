// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn unchecked(source_type: &str, target_type: &str, relationship: &str) -> UncheckedFact {
    UncheckedFact {
        source_type: source_type.into(),
        source_name: "Alice Johnson".into(),
        target_type: target_type.into(),
        target_name: "TechStart LLC".into(),
        relationship: relationship.into(),
        origin_name: "Employee Directory".into(),
        origin_type: "hr_system".into(),
        source_attributes: None,
        target_attributes: None,
        relationship_strength: 0.95,
        provenance_confidence: 0.9,
    }
}

#[test]
fn check_accepts_valid_types() {
    let fact = unchecked("Person", "Company", "Employment").check().unwrap();
    assert_eq!(fact.source.node_type, gl_core::NodeType::Person);
    assert_eq!(fact.relationship, gl_core::RelationshipType::Employment);
    assert_eq!(fact.relationship_strength, 0.95);
}

#[yare::parameterized(
    bad_relationship = { "Person", "Company", "Owns",       "invalid relationship type" },
    bad_source       = { "Robot",  "Company", "Employment", "invalid source node type" },
    bad_target       = { "Person", "Planet",  "Employment", "invalid target node type" },
)]
fn check_synthesizes_failure(
    source_type: &str,
    target_type: &str,
    relationship: &str,
    expected: &str,
) {
    let failure = unchecked(source_type, target_type, relationship).check().unwrap_err();
    assert!(!failure.success);
    assert_eq!(failure.status, gl_core::ProposeStatus::Error);
    assert!(failure.error_message.unwrap().contains(expected));
}

#[test]
fn unchecked_fact_deserializes_with_defaults() {
    let fact: UncheckedFact = serde_json::from_value(serde_json::json!({
        "source_type": "Person",
        "source_name": "Bob Wilson",
        "target_type": "Company",
        "target_name": "Legal Partners Inc",
        "relationship": "Employment",
        "origin_name": "Business Card",
        "origin_type": "business_cards"
    }))
    .unwrap();
    assert_eq!(fact.relationship_strength, 1.0);
    assert_eq!(fact.provenance_confidence, 0.9);
}

#[test]
fn attributes_wire_form_is_typed_array() {
    let mut attrs = std::collections::BTreeMap::new();
    attrs.insert("title".to_string(), "Partner".to_string());
    attrs.insert("nameAlias".to_string(), "B. Wilson".to_string());

    let wire = attributes_to_wire(Some(&attrs));
    let items = wire.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // BTreeMap keeps keys ordered.
    assert_eq!(items[0]["type"], "nameAlias");
    assert_eq!(items[0]["value"], "B. Wilson");
    assert_eq!(items[1]["type"], "title");
}

#[test]
fn missing_attributes_serialize_as_empty_array() {
    assert_eq!(attributes_to_wire(None), serde_json::json!([]));
}
