// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Professional-license roll loader.
//!
//! Each row asserts the licensee's registration in the state, carrying the
//! license attributes, and a county residence when the roll includes one.

use async_trait::async_trait;
use gl_client::ProposeClient;
use gl_core::{validate, Entity, Fact, NodeType, ProposeResponse, RelationshipType};
use gl_loader::{
    Loader, LoaderDescriptor, ParseError, ParsedRecord, ProcessError, RawRecord, RecordFormat,
};
use serde::{Deserialize, Serialize};

const SOURCE_TYPE: &str = "iowa_asbestos";
const SOURCE_NAME: &str = "Iowa Asbestos Licenses";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub license_number: Option<String>,
    pub full_name: String,
    pub license_type: Option<String>,
    pub county: Option<String>,
    pub issue_date: Option<String>,
    pub expiration_date: Option<String>,
}

fn clean(value: Option<&serde_json::Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// The licensee-registration fact.
pub fn license_fact(record: &LicenseRecord) -> Fact {
    let mut attrs = std::collections::BTreeMap::new();
    if let Some(number) = &record.license_number {
        attrs.insert("license_number".to_string(), number.clone());
    }
    if let Some(kind) = &record.license_type {
        attrs.insert("license_type".to_string(), kind.clone());
    }
    if let Some(date) = &record.issue_date {
        attrs.insert("issue_date".to_string(), date.clone());
    }
    if let Some(date) = &record.expiration_date {
        attrs.insert("expiration_date".to_string(), date.clone());
    }

    Fact::new(
        Entity::new(NodeType::Person, record.full_name.clone()),
        RelationshipType::IncorporatedIn,
        Entity::new(NodeType::State, "Iowa"),
        SOURCE_NAME,
        SOURCE_TYPE,
    )
    .source_attributes(attrs)
    .strength(0.95)
    .confidence(0.9)
}

/// The county-residence fact, when the roll includes a county.
pub fn county_fact(record: &LicenseRecord) -> Option<Fact> {
    let county = record.county.as_deref()?;
    Some(
        Fact::new(
            Entity::new(NodeType::Person, record.full_name.clone()),
            RelationshipType::LocatedIn,
            Entity::new(NodeType::County, county),
            SOURCE_NAME,
            SOURCE_TYPE,
        )
        .strength(0.9)
        .confidence(0.85),
    )
}

#[derive(Debug)]
pub struct LicenseRollLoader {
    descriptor: LoaderDescriptor,
}

impl LicenseRollLoader {
    pub fn new() -> Self {
        Self {
            descriptor: LoaderDescriptor::new(SOURCE_TYPE, SOURCE_NAME)
                .format(RecordFormat::Csv),
        }
    }

    pub fn from_config(_config: &serde_json::Value) -> Self {
        Self::new()
    }

    fn parse_typed(&self, raw: &RawRecord) -> Option<LicenseRecord> {
        let full_name = clean(raw.get("Name"))?;
        Some(LicenseRecord {
            license_number: clean(raw.get("License Number")),
            full_name,
            license_type: clean(raw.get("License Type")),
            county: clean(raw.get("County")),
            issue_date: clean(raw.get("Issue Date")),
            expiration_date: clean(raw.get("Expiration Date")),
        })
    }
}

impl Default for LicenseRollLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for LicenseRollLoader {
    fn descriptor(&self) -> &LoaderDescriptor {
        &self.descriptor
    }

    fn parse_record(&self, raw: &RawRecord) -> Result<Option<ParsedRecord>, ParseError> {
        match self.parse_typed(raw) {
            Some(record) => serde_json::to_value(record)
                .map(Some)
                .map_err(|e| ParseError(e.to_string())),
            None => Ok(None),
        }
    }

    fn validate_record(&self, record: &ParsedRecord) -> Vec<String> {
        let record: LicenseRecord = match serde_json::from_value(record.clone()) {
            Ok(record) => record,
            Err(e) => return vec![format!("malformed parsed record: {}", e)],
        };

        let mut errors = validate::validate_entity_name(&record.full_name);
        if let Some(date) = &record.issue_date {
            errors.extend(validate::validate_date(date, "issue_date"));
        }
        if let Some(date) = &record.expiration_date {
            errors.extend(validate::validate_date(date, "expiration_date"));
        }
        errors
    }

    async fn process_record(
        &self,
        client: &ProposeClient,
        record: &ParsedRecord,
    ) -> Result<Vec<ProposeResponse>, ProcessError> {
        let record: LicenseRecord =
            serde_json::from_value(record.clone()).map_err(|e| ProcessError(e.to_string()))?;

        let mut responses = vec![client.propose_fact(&license_fact(&record)).await];
        if let Some(fact) = county_fact(&record) {
            responses.push(client.propose_fact(&fact).await);
        }
        Ok(responses)
    }

    fn record_id(&self, raw: &RawRecord) -> Option<String> {
        clean(raw.get("License Number"))
    }
}

#[cfg(test)]
#[path = "license_tests.rs"]
mod tests;
