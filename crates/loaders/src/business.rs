// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Business-registry loader.
//!
//! Each CSV row asserts the company's incorporation in the state and,
//! when a registered agent is on file, the agent relationship, with the
//! agent classified Person vs Company by a name-suffix heuristic.

use async_trait::async_trait;
use gl_client::{GeoCache, ProposeClient};
use gl_core::{validate, Entity, Fact, NodeType, ProposeResponse, RelationshipType};
use gl_loader::{
    Loader, LoaderDescriptor, ParseError, ParsedRecord, ProcessError, RawRecord, RecordFormat,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const SOURCE_TYPE: &str = "iowa_business";
const SOURCE_NAME: &str = "Iowa Business Entities";

/// Name suffixes that mark a registered agent as a business entity.
const BUSINESS_SUFFIXES: [&str; 7] = ["LLC", "INC", "CORP", "LTD", "CO", "COMPANY", "CORPORATION"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfficeInfo {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    /// `(longitude, latitude)` when the registry publishes a location point.
    pub coordinates: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub corp_number: Option<String>,
    pub legal_name: String,
    pub corp_type: String,
    pub effective_date: Option<String>,
    pub registered_agent: AgentInfo,
    pub home_office: OfficeInfo,
}

/// Classify a registered agent by name suffix.
pub fn classify_agent(name: &str) -> NodeType {
    let upper = name.to_uppercase();
    let is_business = BUSINESS_SUFFIXES
        .iter()
        .any(|suffix| upper.split_whitespace().any(|word| word.trim_matches('.') == *suffix));
    if is_business {
        NodeType::Company
    } else {
        NodeType::Person
    }
}

fn clean(value: Option<&serde_json::Value>) -> Option<String> {
    let text = value?.as_str()?.trim().replace(['"', '\''], "");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Pull `(lon, lat)` out of a `POINT (-93.6 41.6)` style location field.
pub fn parse_point(location: &str) -> Option<(f64, f64)> {
    let start = location.find("POINT")?;
    let numbers: Vec<f64> = location[start..]
        .split(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
        .filter(|s| !s.is_empty() && *s != "-" && *s != ".")
        .filter_map(|s| s.parse().ok())
        .collect();
    match numbers.as_slice() {
        [lon, lat, ..] => Some((*lon, *lat)),
        _ => None,
    }
}

/// The incorporation fact for a parsed record.
pub fn company_state_fact(record: &BusinessRecord) -> Fact {
    let mut attrs = std::collections::BTreeMap::new();
    if let Some(corp_number) = &record.corp_number {
        attrs.insert("business_id".to_string(), corp_number.clone());
    }
    attrs.insert("entity_type".to_string(), record.corp_type.clone());
    if let Some(date) = &record.effective_date {
        attrs.insert("incorporation_date".to_string(), date.clone());
    }

    Fact::new(
        Entity::new(NodeType::Company, record.legal_name.clone()),
        RelationshipType::IncorporatedIn,
        Entity::new(NodeType::State, "Iowa"),
        SOURCE_NAME,
        SOURCE_TYPE,
    )
    .source_attributes(attrs)
    .strength(0.98)
    .confidence(0.92)
}

/// The registered-agent fact, when an agent is on file.
pub fn registered_agent_fact(record: &BusinessRecord) -> Option<Fact> {
    let agent = &record.registered_agent;
    let name = agent.name.as_deref()?;

    let mut attrs = std::collections::BTreeMap::new();
    attrs.insert("role".to_string(), "Registered Agent".to_string());
    let address: Vec<&str> =
        [agent.address1.as_deref(), agent.address2.as_deref()].into_iter().flatten().collect();
    if !address.is_empty() {
        attrs.insert("address".to_string(), address.join(", "));
    }
    let location: Vec<&str> = [agent.city.as_deref(), agent.state.as_deref(), agent.zip.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !location.is_empty() {
        attrs.insert("location".to_string(), location.join(", "));
    }

    let mut fact = Fact::new(
        Entity::new(classify_agent(name), name),
        RelationshipType::RegisteredAgent,
        Entity::new(NodeType::Company, record.legal_name.clone()),
        SOURCE_NAME,
        SOURCE_TYPE,
    )
    .source_attributes(attrs)
    .strength(0.95)
    .confidence(0.92);
    if let Some(corp_number) = &record.corp_number {
        fact = fact.relationship_metadata(serde_json::json!({ "corp_number": corp_number }));
    }
    Some(fact)
}

/// The city-containment fact, proposed only on a geographic-cache miss.
pub fn city_containment_fact(city: &str, state: &str) -> Fact {
    Fact::new(
        Entity::new(NodeType::City, city),
        RelationshipType::LocatedIn,
        Entity::new(NodeType::State, state),
        SOURCE_NAME,
        SOURCE_TYPE,
    )
    .strength(0.99)
    .confidence(0.95)
}

#[derive(Debug)]
pub struct BusinessRegistryLoader {
    descriptor: LoaderDescriptor,
    geo_cache: Option<Mutex<GeoCache>>,
}

impl BusinessRegistryLoader {
    pub fn new() -> Self {
        Self {
            descriptor: LoaderDescriptor::new(SOURCE_TYPE, SOURCE_NAME)
                .format(RecordFormat::Csv),
            geo_cache: None,
        }
    }

    pub fn from_config(_config: &serde_json::Value) -> Self {
        Self::new()
    }

    /// Attach a preloaded geographic cache; city containment proposals are
    /// then skipped for cities already in the graph.
    pub fn with_geo_cache(mut self, cache: GeoCache) -> Self {
        self.geo_cache = Some(Mutex::new(cache));
        self
    }

    fn parse_typed(&self, raw: &RawRecord) -> Option<BusinessRecord> {
        let legal_name = clean(raw.get("Legal Name"))?;
        let corp_type = clean(raw.get("Corporation Type"))?;

        let coordinates = clean(raw.get("HO Location")).and_then(|loc| parse_point(&loc));

        Some(BusinessRecord {
            corp_number: clean(raw.get("Corp Number")),
            legal_name,
            corp_type,
            effective_date: clean(raw.get("Effective Date")),
            registered_agent: AgentInfo {
                name: clean(raw.get("Registered Agent")),
                address1: clean(raw.get("RA Address 1")),
                address2: clean(raw.get("RA Address 2")),
                city: clean(raw.get("RA City")),
                state: clean(raw.get("RA State")),
                zip: clean(raw.get("RA Zip")),
            },
            home_office: OfficeInfo {
                address1: clean(raw.get("HO Address 1")),
                address2: clean(raw.get("HO Address 2")),
                city: clean(raw.get("HO City")),
                state: clean(raw.get("HO State")),
                zip: clean(raw.get("HO Zip")),
                country: clean(raw.get("HO Country")),
                coordinates,
            },
        })
    }
}

impl Default for BusinessRegistryLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for BusinessRegistryLoader {
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
        let record: BusinessRecord = match serde_json::from_value(record.clone()) {
            Ok(record) => record,
            Err(e) => return vec![format!("malformed parsed record: {}", e)],
        };

        let mut errors = validate::validate_entity_name(&record.legal_name);
        if record.corp_type.is_empty() {
            errors.push("missing corporation type".to_string());
        }
        if let Some(date) = &record.effective_date {
            errors.extend(validate::validate_date(date, "effective_date"));
        }
        let office = &record.home_office;
        errors.extend(validate::validate_address(
            office.city.as_deref(),
            office.state.as_deref(),
            office.zip.as_deref(),
        ));
        if let Some((lon, lat)) = office.coordinates {
            errors.extend(validate::validate_coordinates(lon, lat));
        }
        let agent = &record.registered_agent;
        if agent.name.is_some() {
            errors.extend(validate::validate_address(
                agent.city.as_deref(),
                agent.state.as_deref(),
                agent.zip.as_deref(),
            ));
        }
        errors
    }

    async fn process_record(
        &self,
        client: &ProposeClient,
        record: &ParsedRecord,
    ) -> Result<Vec<ProposeResponse>, ProcessError> {
        let record: BusinessRecord =
            serde_json::from_value(record.clone()).map_err(|e| ProcessError(e.to_string()))?;

        let mut responses = Vec::new();
        responses.push(client.propose_fact(&company_state_fact(&record)).await);

        // City containment goes through the cache: a hit means the city is
        // already in the graph and the proposal would be a no-op round-trip.
        if let (Some(cache), Some(city)) = (&self.geo_cache, record.home_office.city.as_deref()) {
            let mut cache = cache.lock().await;
            if cache.city(city).is_none() {
                let state = record.home_office.state.as_deref().unwrap_or("Iowa");
                responses.push(client.propose_fact(&city_containment_fact(city, state)).await);
                if let Err(error) = cache.refresh_city(client.pool(), city).await {
                    tracing::warn!(%error, city, "city cache refresh failed");
                }
            }
        }

        if let Some(fact) = registered_agent_fact(&record) {
            responses.push(client.propose_fact(&fact).await);
        }
        Ok(responses)
    }

    fn record_id(&self, raw: &RawRecord) -> Option<String> {
        clean(raw.get("Corp Number"))
    }
}

#[cfg(test)]
#[path = "business_tests.rs"]
mod tests;
