// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Medical-facilities loader (nationwide provider directory).
//!
//! Column names vary across directory vintages, so the CSV field mapping is
//! part of the job config rather than hard-coded.

use async_trait::async_trait;
use gl_client::ProposeClient;
use gl_core::{validate, Entity, Fact, NodeType, ProposeResponse, RelationshipType};
use gl_loader::{
    Loader, LoaderDescriptor, ParseError, ParsedRecord, ProcessError, RawRecord, RecordFormat,
};
use serde::{Deserialize, Serialize};

const SOURCE_TYPE: &str = "medical_facilities";
const SOURCE_NAME: &str = "CMS Provider of Services";

/// Which CSV columns carry each logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub business_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            business_name: "FAC_NAME".to_string(),
            street_address: "ST_ADR".to_string(),
            city: "CITY_NAME".to_string(),
            state: "STATE_CD".to_string(),
            zip_code: "ZIP_CD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: String,
    pub zip_code: Option<String>,
}

/// The facility-location fact.
pub fn facility_fact(record: &FacilityRecord) -> Fact {
    let mut attrs = std::collections::BTreeMap::new();
    if let Some(address) = &record.street_address {
        attrs.insert("street_address".to_string(), address.clone());
    }
    if let Some(city) = &record.city {
        attrs.insert("city".to_string(), city.clone());
    }
    if let Some(zip) = &record.zip_code {
        attrs.insert("zip_code".to_string(), zip.clone());
    }

    Fact::new(
        Entity::new(NodeType::MedicalFacility, record.name.clone()),
        RelationshipType::LocatedIn,
        Entity::new(NodeType::State, record.state.clone()),
        SOURCE_NAME,
        SOURCE_TYPE,
    )
    .source_attributes(attrs)
    .strength(0.95)
    .confidence(0.9)
}

#[derive(Debug)]
pub struct MedicalFacilitiesLoader {
    descriptor: LoaderDescriptor,
    mapping: FieldMapping,
}

impl MedicalFacilitiesLoader {
    pub fn new() -> Self {
        Self::with_mapping(FieldMapping::default())
    }

    pub fn with_mapping(mapping: FieldMapping) -> Self {
        Self {
            descriptor: LoaderDescriptor::new(SOURCE_TYPE, SOURCE_NAME)
                .format(RecordFormat::Csv),
            mapping,
        }
    }

    /// Read `field_mapping` from the job config, falling back per field.
    pub fn from_config(config: &serde_json::Value) -> Self {
        let mapping = config
            .get("field_mapping")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();
        Self::with_mapping(mapping)
    }

    fn field(&self, raw: &RawRecord, column: &str) -> Option<String> {
        let text = raw.get(column)?.as_str()?;
        let cleaned = validate::sanitize(text, 500);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    fn parse_typed(&self, raw: &RawRecord) -> Option<FacilityRecord> {
        let name = self.field(raw, &self.mapping.business_name)?;
        let state = self.field(raw, &self.mapping.state)?;
        Some(FacilityRecord {
            name,
            street_address: self.field(raw, &self.mapping.street_address),
            city: self.field(raw, &self.mapping.city),
            state,
            zip_code: self.field(raw, &self.mapping.zip_code),
        })
    }
}

impl Default for MedicalFacilitiesLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for MedicalFacilitiesLoader {
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
        let record: FacilityRecord = match serde_json::from_value(record.clone()) {
            Ok(record) => record,
            Err(e) => return vec![format!("malformed parsed record: {}", e)],
        };

        let mut errors = validate::validate_entity_name(&record.name);
        errors.extend(validate::validate_address(
            record.city.as_deref(),
            Some(&record.state),
            record.zip_code.as_deref(),
        ));
        errors
    }

    async fn process_record(
        &self,
        client: &ProposeClient,
        record: &ParsedRecord,
    ) -> Result<Vec<ProposeResponse>, ProcessError> {
        let record: FacilityRecord =
            serde_json::from_value(record.clone()).map_err(|e| ProcessError(e.to_string()))?;
        Ok(vec![client.propose_fact(&facility_fact(&record)).await])
    }

    fn record_id(&self, raw: &RawRecord) -> Option<String> {
        self.field(raw, &self.mapping.business_name)
    }
}

#[cfg(test)]
#[path = "facility_tests.rs"]
mod tests;
