// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loader registry.
//!
//! Discovery is a startup-time concern: each deployment registers the typed
//! constructors it ships, keyed by job_type. Lookup also tries the legacy
//! `<job_type>_loader` alias so older submissions keep resolving; a miss
//! reports both names searched.

use crate::business::BusinessRegistryLoader;
use crate::facility::MedicalFacilitiesLoader;
use crate::license::LicenseRollLoader;
use gl_loader::Loader;
use std::collections::HashMap;
use thiserror::Error;

/// Constructor for one loader type, from the job's config blob.
pub type LoaderCtor = fn(&serde_json::Value) -> Box<dyn Loader>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no loader for job type {job_type:?} (searched {job_type:?} and legacy alias {alias:?})")]
    UnknownJobType { job_type: String, alias: String },
}

/// Registry of loader constructors keyed by job_type.
pub struct LoaderRegistry {
    ctors: HashMap<String, LoaderCtor>,
}

impl LoaderRegistry {
    pub fn empty() -> Self {
        Self { ctors: HashMap::new() }
    }

    /// The loaders built into this deployment.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("iowa_business", |config| {
            Box::new(BusinessRegistryLoader::from_config(config))
        });
        registry.register("iowa_asbestos", |config| {
            Box::new(LicenseRollLoader::from_config(config))
        });
        registry.register("medical_facilities", |config| {
            Box::new(MedicalFacilitiesLoader::from_config(config))
        });
        registry
    }

    pub fn register(&mut self, job_type: impl Into<String>, ctor: LoaderCtor) {
        self.ctors.insert(job_type.into(), ctor);
    }

    /// Job types this registry can execute (a worker's capabilities).
    pub fn job_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.ctors.keys().cloned().collect();
        types.sort();
        types
    }

    /// Instantiate the loader for a job type.
    pub fn resolve(
        &self,
        job_type: &str,
        config: &serde_json::Value,
    ) -> Result<Box<dyn Loader>, RegistryError> {
        if let Some(ctor) = self.ctors.get(job_type) {
            return Ok(ctor(config));
        }

        // Legacy submissions named the loader module rather than the type.
        let alias = legacy_alias(job_type);
        if let Some(ctor) = self.ctors.get(&alias) {
            tracing::debug!(job_type, alias = %alias, "resolved loader via legacy alias");
            return Ok(ctor(config));
        }

        Err(RegistryError::UnknownJobType { job_type: job_type.to_string(), alias })
    }
}

/// The legacy naming convention: `<type>_loader`, or the type with that
/// suffix stripped when the submission already used the module name.
fn legacy_alias(job_type: &str) -> String {
    match job_type.strip_suffix("_loader") {
        Some(stripped) => stripped.to_string(),
        None => format!("{}_loader", job_type),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
