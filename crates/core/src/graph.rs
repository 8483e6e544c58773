// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph taxonomy and the propose-fact data contract.
//!
//! Node and relationship types form closed sets: the client validates every
//! proposal against them before touching the store, so a typo'd relationship
//! never costs a round-trip. The sets mirror what the store's fact API
//! accepts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Valid node types in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Person,
    Company,
    LawFirm,
    Country,
    State,
    City,
    County,
    ZipCode,
    Address,
    Thing,
    Event,
    MedicalFacility,
}

impl NodeType {
    pub const ALL: [NodeType; 12] = [
        NodeType::Person,
        NodeType::Company,
        NodeType::LawFirm,
        NodeType::Country,
        NodeType::State,
        NodeType::City,
        NodeType::County,
        NodeType::ZipCode,
        NodeType::Address,
        NodeType::Thing,
        NodeType::Event,
        NodeType::MedicalFacility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Person => "Person",
            NodeType::Company => "Company",
            NodeType::LawFirm => "LawFirm",
            NodeType::Country => "Country",
            NodeType::State => "State",
            NodeType::City => "City",
            NodeType::County => "County",
            NodeType::ZipCode => "ZipCode",
            NodeType::Address => "Address",
            NodeType::Thing => "Thing",
            NodeType::Event => "Event",
            NodeType::MedicalFacility => "MedicalFacility",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Geographic types participate in the containment hierarchy and are
    /// eligible for the loader-side geographic cache.
    pub fn is_geographic(&self) -> bool {
        matches!(
            self,
            NodeType::Country
                | NodeType::State
                | NodeType::City
                | NodeType::County
                | NodeType::ZipCode
                | NodeType::Address
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valid relationship types in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    // Legal
    LegalCounsel,
    OpposingCounsel,
    ClientRelationship,
    Conflict,
    Client,
    OpposingParty,
    PotentialClient,
    // Geographic (bidirectional pairs)
    LocatedIn,
    Contains,
    LocatedAt,
    LocationOf,
    // Corporate
    IncorporatedIn,
    RegisteredAgent,
    Subsidiary,
    Ownership,
    // Professional
    BoardMember,
    Employment,
    Partnership,
    AdvisoryBoard,
    // Personal
    Family,
    // Activity
    Participation,
    Organizer,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 22] = [
        RelationshipType::LegalCounsel,
        RelationshipType::OpposingCounsel,
        RelationshipType::ClientRelationship,
        RelationshipType::Conflict,
        RelationshipType::Client,
        RelationshipType::OpposingParty,
        RelationshipType::PotentialClient,
        RelationshipType::LocatedIn,
        RelationshipType::Contains,
        RelationshipType::LocatedAt,
        RelationshipType::LocationOf,
        RelationshipType::IncorporatedIn,
        RelationshipType::RegisteredAgent,
        RelationshipType::Subsidiary,
        RelationshipType::Ownership,
        RelationshipType::BoardMember,
        RelationshipType::Employment,
        RelationshipType::Partnership,
        RelationshipType::AdvisoryBoard,
        RelationshipType::Family,
        RelationshipType::Participation,
        RelationshipType::Organizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::LegalCounsel => "Legal_Counsel",
            RelationshipType::OpposingCounsel => "Opposing_Counsel",
            RelationshipType::ClientRelationship => "Client_Relationship",
            RelationshipType::Conflict => "Conflict",
            RelationshipType::Client => "Client",
            RelationshipType::OpposingParty => "Opposing_Party",
            RelationshipType::PotentialClient => "Potential_Client",
            RelationshipType::LocatedIn => "Located_In",
            RelationshipType::Contains => "Contains",
            RelationshipType::LocatedAt => "Located_At",
            RelationshipType::LocationOf => "Location_Of",
            RelationshipType::IncorporatedIn => "Incorporated_In",
            RelationshipType::RegisteredAgent => "Registered_Agent",
            RelationshipType::Subsidiary => "Subsidiary",
            RelationshipType::Ownership => "Ownership",
            RelationshipType::BoardMember => "Board_Member",
            RelationshipType::Employment => "Employment",
            RelationshipType::Partnership => "Partnership",
            RelationshipType::AdvisoryBoard => "Advisory_Board",
            RelationshipType::Family => "Family",
            RelationshipType::Participation => "Participation",
            RelationshipType::Organizer => "Organizer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Relationship types whose coexistence with `self` between the same
    /// entity pair is semantically incompatible.
    pub fn conflicts_with(&self) -> &'static [RelationshipType] {
        match self {
            RelationshipType::LegalCounsel => &[RelationshipType::OpposingCounsel],
            RelationshipType::OpposingCounsel => &[RelationshipType::LegalCounsel],
            _ => &[],
        }
    }

    /// Whether the relationship reads the same (or has a paired inverse) in
    /// both directions.
    pub fn is_bidirectional(&self) -> bool {
        matches!(
            self,
            RelationshipType::LocatedIn
                | RelationshipType::Contains
                | RelationshipType::LocatedAt
                | RelationshipType::LocationOf
                | RelationshipType::Partnership
                | RelationshipType::Family
                | RelationshipType::Conflict
        )
    }

    /// The inverse of a paired geographic relationship, if any.
    pub fn inverse(&self) -> Option<RelationshipType> {
        match self {
            RelationshipType::LocatedIn => Some(RelationshipType::Contains),
            RelationshipType::Contains => Some(RelationshipType::LocatedIn),
            RelationshipType::LocatedAt => Some(RelationshipType::LocationOf),
            RelationshipType::LocationOf => Some(RelationshipType::LocatedAt),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed entity reference: `(node_type, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub node_type: NodeType,
    pub name: String,
}

impl Entity {
    pub fn new(node_type: NodeType, name: impl Into<String>) -> Self {
        Self { node_type, name: name.into() }
    }
}

/// One proposed fact: "source and target are related by `relationship`,
/// asserted by `source_name`/`source_type` with the given confidence."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub source: Entity,
    pub target: Entity,
    pub relationship: RelationshipType,
    pub source_name: String,
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attributes: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attributes: Option<BTreeMap<String, String>>,
    pub relationship_strength: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<chrono::NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<chrono::NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_metadata: Option<serde_json::Value>,
    pub provenance_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance_metadata: Option<serde_json::Value>,
}

impl Fact {
    pub fn new(
        source: Entity,
        relationship: RelationshipType,
        target: Entity,
        source_name: impl Into<String>,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            relationship,
            source_name: source_name.into(),
            source_type: source_type.into(),
            source_attributes: None,
            target_attributes: None,
            relationship_strength: 1.0,
            valid_from: None,
            valid_to: None,
            relationship_metadata: None,
            provenance_confidence: 0.9,
            provenance_metadata: None,
        }
    }

    pub fn source_attributes(mut self, attrs: BTreeMap<String, String>) -> Self {
        self.source_attributes = Some(attrs);
        self
    }

    pub fn target_attributes(mut self, attrs: BTreeMap<String, String>) -> Self {
        self.target_attributes = Some(attrs);
        self
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.relationship_strength = strength;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.provenance_confidence = confidence;
        self
    }

    pub fn relationship_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.relationship_metadata = Some(metadata);
        self
    }

    pub fn validity(
        mut self,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }
}

/// Outcome class of a propose-fact call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposeStatus {
    Success,
    Conflicts,
    Error,
}

impl ProposeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposeStatus::Success => "success",
            ProposeStatus::Conflicts => "conflicts",
            ProposeStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(ProposeStatus::Success),
            "conflicts" => Some(ProposeStatus::Conflicts),
            "error" => Some(ProposeStatus::Error),
            _ => None,
        }
    }
}

crate::simple_display! {
    ProposeStatus {
        Success => "success",
        Conflicts => "conflicts",
        Error => "error",
    }
}

/// Response from the store's fact API.
///
/// `conflicts` is still a success: the fact was recorded and the conflicting
/// relationships are reported alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeResponse {
    pub success: bool,
    pub status: ProposeStatus,
    pub overall_confidence: f64,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
    #[serde(default)]
    pub conflicts: Vec<serde_json::Value>,
    #[serde(default)]
    pub provenance_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProposeResponse {
    /// Synthetic failure produced without a store round-trip.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: ProposeStatus::Error,
            overall_confidence: 0.0,
            actions: Vec::new(),
            conflicts: Vec::new(),
            provenance_ids: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty() || self.status == ProposeStatus::Conflicts
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
