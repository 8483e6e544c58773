// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builtin_types_are_sorted_capabilities() {
    let registry = LoaderRegistry::with_builtin();
    assert_eq!(
        registry.job_types(),
        vec!["iowa_asbestos", "iowa_business", "medical_facilities"]
    );
}

#[test]
fn resolves_direct_name() {
    let registry = LoaderRegistry::with_builtin();
    let loader = registry.resolve("iowa_business", &serde_json::json!({})).unwrap();
    assert_eq!(loader.descriptor().source_type, "iowa_business");
}

#[test]
fn resolves_legacy_module_name() {
    let registry = LoaderRegistry::with_builtin();
    let loader = registry.resolve("iowa_business_loader", &serde_json::json!({})).unwrap();
    assert_eq!(loader.descriptor().source_type, "iowa_business");
}

#[test]
fn miss_reports_both_search_paths() {
    let registry = LoaderRegistry::with_builtin();
    let error = registry.resolve("ohio_business", &serde_json::json!({})).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("\"ohio_business\""));
    assert!(message.contains("\"ohio_business_loader\""));
}

#[test]
fn custom_registration() {
    let mut registry = LoaderRegistry::empty();
    registry.register("iowa_asbestos", |config| {
        Box::new(crate::license::LicenseRollLoader::from_config(config))
    });
    assert!(registry.resolve("iowa_asbestos", &serde_json::json!({})).is_ok());
    assert!(registry.resolve("iowa_business", &serde_json::json!({})).is_err());
}
