// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory cache of geographic nodes.
//!
//! Loaders that touch the geographic hierarchy on most records can preload
//! every City/State/County/ZipCode node once at startup and skip a lookup
//! round-trip per record. Correctness never depends on the cache: a miss
//! just means the propose call does the work, after which the single key is
//! refreshed.

use crate::propose::ClientError;
use gl_store::{StoreError, StorePool};
use std::collections::HashMap;

/// Normalize a name the way the store does for matching.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Node-id index for the four cached geographic types.
#[derive(Debug, Default)]
pub struct GeoCache {
    cities: HashMap<String, String>,
    states: HashMap<String, String>,
    counties: HashMap<String, String>,
    zipcodes: HashMap<String, String>,
}

impl GeoCache {
    /// Preload every geographic node currently in the store.
    pub async fn load(pool: &StorePool) -> Result<Self, ClientError> {
        let mut conn = pool.acquire().await?;
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT node_id, node_type, normalized_name, primary_name \
             FROM nodes \
             WHERE node_type IN ('City', 'State', 'County', 'ZipCode')",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("load geographic cache"))?;

        let mut cache = Self::default();
        for (node_id, node_type, normalized_name, primary_name) in rows {
            match node_type.as_str() {
                "City" => cache.cities.insert(normalized_name, node_id),
                "State" => cache.states.insert(normalized_name, node_id),
                "County" => cache.counties.insert(normalized_name, node_id),
                // Zip codes match on the code itself, not a normalized name.
                "ZipCode" => cache.zipcodes.insert(primary_name, node_id),
                _ => None,
            };
        }

        tracing::info!(
            cities = cache.cities.len(),
            states = cache.states.len(),
            counties = cache.counties.len(),
            zipcodes = cache.zipcodes.len(),
            "loaded geographic cache"
        );
        Ok(cache)
    }

    pub fn city(&self, name: &str) -> Option<&str> {
        self.cities.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn state(&self, name: &str) -> Option<&str> {
        self.states.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn county(&self, name: &str) -> Option<&str> {
        self.counties.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn zipcode(&self, code: &str) -> Option<&str> {
        self.zipcodes.get(code).map(String::as_str)
    }

    /// Re-query one city after a propose that may have created it.
    pub async fn refresh_city(&mut self, pool: &StorePool, name: &str) -> Result<(), ClientError> {
        let normalized = normalize_name(name);
        let mut conn = pool.acquire().await?;
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT node_id FROM nodes \
             WHERE node_type = 'City' AND normalized_name = $1 \
             LIMIT 1",
        )
        .bind(&normalized)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::query("refresh city cache"))?;

        if let Some((node_id,)) = row {
            self.cities.insert(normalized, node_id);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn insert_city(&mut self, name: &str, node_id: &str) {
        self.cities.insert(normalize_name(name), node_id.to_string());
    }
}

#[cfg(test)]
#[path = "geo_tests.rs"]
mod tests;
