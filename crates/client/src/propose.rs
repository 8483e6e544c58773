// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Propose-fact client.
//!
//! `propose_fact` never returns `Err`: store failures are folded into a
//! [`ProposeResponse`] with `status = error`, the same shape the stored
//! function reports. Proposals are at-least-once; the store owns
//! de-duplication, so a duplicate call simply yields the same provenance.

use gl_core::retry::RetryPolicy;
use gl_core::{Entity, Fact, NodeType, ProposeResponse, ProposeStatus, RelationshipType};
use gl_store::{retry_transient, StoreError, StorePool};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A fact whose entity and relationship types arrived as strings (job
/// config, DLQ payloads). `check()` validates them against the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncheckedFact {
    pub source_type: String,
    pub source_name: String,
    pub target_type: String,
    pub target_name: String,
    pub relationship: String,
    pub origin_name: String,
    pub origin_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attributes: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attributes: Option<BTreeMap<String, String>>,
    #[serde(default = "default_strength")]
    pub relationship_strength: f64,
    #[serde(default = "default_confidence")]
    pub provenance_confidence: f64,
}

fn default_strength() -> f64 {
    1.0
}

fn default_confidence() -> f64 {
    0.9
}

impl UncheckedFact {
    /// Validate against the taxonomy. The failure carries the synthetic
    /// error response the client returns without a round-trip.
    pub fn check(self) -> Result<Fact, Box<ProposeResponse>> {
        let relationship = match RelationshipType::parse(&self.relationship) {
            Some(rel) => rel,
            None => {
                return Err(Box::new(ProposeResponse::failure(format!(
                    "invalid relationship type: {:?}",
                    self.relationship
                ))))
            }
        };
        let source_type = match NodeType::parse(&self.source_type) {
            Some(t) => t,
            None => {
                return Err(Box::new(ProposeResponse::failure(format!(
                    "invalid source node type: {:?}",
                    self.source_type
                ))))
            }
        };
        let target_type = match NodeType::parse(&self.target_type) {
            Some(t) => t,
            None => {
                return Err(Box::new(ProposeResponse::failure(format!(
                    "invalid target node type: {:?}",
                    self.target_type
                ))))
            }
        };

        let mut fact = Fact::new(
            Entity::new(source_type, self.source_name),
            relationship,
            Entity::new(target_type, self.target_name),
            self.origin_name,
            self.origin_type,
        )
        .strength(self.relationship_strength)
        .confidence(self.provenance_confidence);
        if let Some(attrs) = self.source_attributes {
            fact = fact.source_attributes(attrs);
        }
        if let Some(attrs) = self.target_attributes {
            fact = fact.target_attributes(attrs);
        }
        Ok(fact)
    }
}

/// Serialize an attribute map to the store's wire form:
/// a JSONB array of `{"type": …, "value": …}` objects.
pub(crate) fn attributes_to_wire(attrs: Option<&BTreeMap<String, String>>) -> serde_json::Value {
    match attrs {
        Some(attrs) => serde_json::Value::Array(
            attrs
                .iter()
                .map(|(attr_type, value)| {
                    serde_json::json!({"type": attr_type, "value": value})
                })
                .collect(),
        ),
        None => serde_json::Value::Array(Vec::new()),
    }
}

/// Client for the store's intelligent fact-ingestion API.
#[derive(Clone)]
pub struct ProposeClient {
    pool: StorePool,
    retry: RetryPolicy,
}

impl ProposeClient {
    pub fn new(pool: StorePool) -> Self {
        Self { pool, retry: RetryPolicy::default() }
    }

    /// Override the transient-error retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn pool(&self) -> &StorePool {
        &self.pool
    }

    /// Propose a single fact. Transient store errors are retried per the
    /// policy; conflicts are reported, not failed.
    pub async fn propose_fact(&self, fact: &Fact) -> ProposeResponse {
        match retry_transient(&self.retry, || self.call_propose(fact)).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, "propose_fact store error");
                ProposeResponse::failure(format!("store error: {}", error))
            }
        }
    }

    /// Validate an unchecked fact, then propose it. Taxonomy failures are
    /// synthesized without a round-trip.
    pub async fn propose_unchecked(&self, fact: UncheckedFact) -> ProposeResponse {
        match fact.check() {
            Ok(fact) => self.propose_fact(&fact).await,
            Err(failure) => *failure,
        }
    }

    /// Propose a batch in order. One fact's failure never aborts the rest.
    pub async fn batch_propose_facts(&self, facts: &[Fact]) -> Vec<ProposeResponse> {
        let mut responses = Vec::with_capacity(facts.len());
        for (i, fact) in facts.iter().enumerate() {
            responses.push(self.propose_fact(fact).await);
            if (i + 1) % 100 == 0 {
                tracing::info!(processed = i + 1, total = facts.len(), "batch propose progress");
            }
        }
        responses
    }

    /// Provenance rows for an entity, newest first.
    pub async fn get_entity_provenance(
        &self,
        entity_id: &str,
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT to_jsonb(x) FROM ( \
                 SELECT p.*, st.description AS source_description \
                 FROM provenance p \
                 LEFT JOIN source_types st ON p.source_type = st.source_type \
                 WHERE p.asset_id = $1 AND p.asset_type = 'node' \
                 ORDER BY p.created_at DESC \
             ) x",
        )
        .bind(entity_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("select entity provenance"))?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    /// Active legal-counsel / opposing-counsel pairs between two entities.
    pub async fn get_relationship_conflicts(
        &self,
        entity1_id: &str,
        entity2_id: &str,
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT to_jsonb(x) FROM ( \
                 SELECT r1.relationship_type AS rel1_type, r2.relationship_type AS rel2_type, \
                        r1.strength AS rel1_strength, r2.strength AS rel2_strength, \
                        r1.created_at AS rel1_created, r2.created_at AS rel2_created \
                 FROM relationships r1 \
                 JOIN relationships r2 ON ( \
                     (r1.source_node_id = r2.source_node_id AND r1.target_node_id = r2.target_node_id) OR \
                     (r1.source_node_id = r2.target_node_id AND r1.target_node_id = r2.source_node_id) \
                 ) \
                 WHERE r1.relationship_id != r2.relationship_id \
                   AND ((r1.source_node_id = $1 AND r1.target_node_id = $2) OR \
                        (r1.source_node_id = $2 AND r1.target_node_id = $1)) \
                   AND r1.status = 'active' AND r2.status = 'active' \
                   AND ( \
                       (r1.relationship_type = 'Legal_Counsel' AND r2.relationship_type = 'Opposing_Counsel') OR \
                       (r1.relationship_type = 'Opposing_Counsel' AND r2.relationship_type = 'Legal_Counsel') \
                   ) \
             ) x",
        )
        .bind(entity1_id)
        .bind(entity2_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("select relationship conflicts"))?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    async fn call_propose(&self, fact: &Fact) -> Result<ProposeResponse, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(
            "SELECT status, overall_confidence::float8 AS overall_confidence, \
                    actions, conflicts, provenance_ids \
             FROM propose_fact( \
                 $1, $2, \
                 $3, $4, \
                 $5, \
                 $6, $7, \
                 $8::jsonb, $9::jsonb, \
                 $10, \
                 $11, $12, \
                 $13::jsonb, \
                 $14, \
                 $15::jsonb \
             )",
        )
        .bind(fact.source.node_type.as_str())
        .bind(&fact.source.name)
        .bind(fact.target.node_type.as_str())
        .bind(&fact.target.name)
        .bind(fact.relationship.as_str())
        .bind(&fact.source_name)
        .bind(&fact.source_type)
        .bind(attributes_to_wire(fact.source_attributes.as_ref()))
        .bind(attributes_to_wire(fact.target_attributes.as_ref()))
        .bind(fact.relationship_strength)
        .bind(fact.valid_from)
        .bind(fact.valid_to)
        .bind(&fact.relationship_metadata)
        .bind(fact.provenance_confidence)
        .bind(&fact.provenance_metadata)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::query("propose_fact"))?;

        let Some(row) = row else {
            return Ok(ProposeResponse::failure("no response from store"));
        };
        Ok(shape_response(&row))
    }
}

/// Shape one row of the stored function's result set.
fn shape_response(row: &sqlx::postgres::PgRow) -> ProposeResponse {
    let status_text: String = row.try_get("status").unwrap_or_else(|_| "error".to_string());
    let status = ProposeStatus::parse(&status_text).unwrap_or(ProposeStatus::Error);
    let success = matches!(status, ProposeStatus::Success | ProposeStatus::Conflicts);

    let overall_confidence: f64 = row.try_get("overall_confidence").unwrap_or(0.0);
    let actions = json_array(row, "actions");
    let conflicts = json_array(row, "conflicts");
    let provenance_ids = json_array(row, "provenance_ids")
        .into_iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect();

    // On error the stored function reports the cause inside the first action.
    let error_message = if status == ProposeStatus::Error {
        actions.first().and_then(|action| {
            action
                .get("error")
                .or_else(|| action.get("message"))
                .and_then(|v| v.as_str())
                .map(String::from)
        })
    } else {
        None
    };

    ProposeResponse {
        success,
        status,
        overall_confidence,
        actions,
        conflicts,
        provenance_ids,
        error_message,
    }
}

fn json_array(row: &sqlx::postgres::PgRow, column: &str) -> Vec<serde_json::Value> {
    match row.try_get::<serde_json::Value, _>(column) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(serde_json::Value::Null) | Err(_) => Vec::new(),
        Ok(other) => vec![other],
    }
}

#[cfg(test)]
#[path = "propose_tests.rs"]
mod tests;
