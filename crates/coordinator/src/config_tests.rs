// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
#[serial_test::serial(reaper_env)]
fn default_bind() {
    std::env::remove_var("GL_COORDINATOR_BIND");
    std::env::remove_var("GL_REAPER_INTERVAL_SECS");
    let config = CoordinatorConfig::from_env().unwrap();
    assert_eq!(config.bind_addr.port(), 8080);
    assert!(config.reaper.is_none());
}

#[test]
#[serial_test::serial(reaper_env)]
fn custom_bind() {
    std::env::set_var("GL_COORDINATOR_BIND", "127.0.0.1:9999");
    let config = CoordinatorConfig::from_env().unwrap();
    assert_eq!(config.bind_addr.port(), 9999);
    std::env::remove_var("GL_COORDINATOR_BIND");
}

#[test]
#[serial_test::serial(reaper_env)]
fn invalid_bind_is_an_error() {
    std::env::set_var("GL_COORDINATOR_BIND", "not-an-addr");
    assert!(CoordinatorConfig::from_env().is_err());
    std::env::remove_var("GL_COORDINATOR_BIND");
}
