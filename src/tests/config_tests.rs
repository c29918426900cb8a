// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::{Config, MAX_BUFFER_CAPACITY, MAX_CREDENTIAL_LEN, MAX_ENDPOINT_LEN};
use crate::error::{status_code, KernelError};
use crate::types::id::MachineId;
use std::string::String;

fn config(machine_id: u32, capacity: u32) -> Config {
    Config {
        machine_id: MachineId(machine_id),
        buffer_capacity: capacity,
        ..Config::default()
    }
}

#[test]
fn test_default_config_is_admissible() {
    let cfg = Config::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.buffer_capacity, 1000);
    assert_eq!(cfg.aggregation_interval_seconds, 3600);
    assert_eq!(cfg.max_retry_attempts, 3);
    assert!(!cfg.enable_external_sync);
}

#[test]
fn test_zero_machine_id_rejected() {
    assert_eq!(config(0, 100).validate(), Err(KernelError::InvalidConfig));
}

#[test]
fn test_capacity_bounds() {
    assert_eq!(config(1, 0).validate(), Err(KernelError::InvalidConfig));
    assert!(config(1, 1).validate().is_ok());
    assert!(config(1, MAX_BUFFER_CAPACITY).validate().is_ok());
    assert_eq!(
        config(1, MAX_BUFFER_CAPACITY + 1).validate(),
        Err(KernelError::InvalidConfig)
    );
}

#[test]
fn test_other_fields_unconstrained() {
    let cfg = Config {
        aggregation_interval_seconds: 0,
        max_retry_attempts: 0,
        endpoint: String::new(),
        ..config(5, 10)
    };
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.send_attempts(), 1);
}

#[test]
fn test_runtime_update_rejects_capacity_change() {
    let current = config(22222, 100);

    let mut next = current.clone();
    next.aggregation_interval_seconds = 1800;
    assert!(current.check_runtime_update(&next).is_ok());

    next.buffer_capacity = 200;
    assert_eq!(current.check_runtime_update(&next), Err(KernelError::InvalidParameter));

    // Invalid config wins over the capacity rule.
    let bad = config(0, 200);
    assert_eq!(current.check_runtime_update(&bad), Err(KernelError::InvalidConfig));
}

#[test]
fn test_debug_redacts_credential() {
    let cfg = Config {
        credential: "s3cret-token".into(),
        ..Config::default()
    };
    let rendered = format!("{:?}", cfg);
    assert!(!rendered.contains("s3cret-token"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_error_codes_and_strings() {
    assert_eq!(KernelError::InvalidConfig.code(), 1);
    assert_eq!(KernelError::InvalidParameter.code(), 6);
    assert_eq!(KernelError::from_code(4), Some(KernelError::ApiError));
    assert_eq!(KernelError::from_code(0), None);
    assert_eq!(KernelError::MemoryError.describe(), "Memory allocation error");
    assert_eq!(format!("{}", KernelError::StorageFull), "Storage full");

    assert_eq!(status_code(&Ok::<(), KernelError>(())), 0);
    assert_eq!(status_code::<()>(&Err(KernelError::ApiError)), 4);
    assert!(!crate::VERSION.is_empty());
}

#[test]
fn test_string_field_limits() {
    let at_limit = Config {
        endpoint: "e".repeat(MAX_ENDPOINT_LEN),
        credential: "c".repeat(MAX_CREDENTIAL_LEN),
        ..Config::default()
    };
    assert!(at_limit.validate().is_ok());

    let long_endpoint = Config {
        endpoint: "e".repeat(MAX_ENDPOINT_LEN + 1),
        ..Config::default()
    };
    assert_eq!(long_endpoint.validate(), Err(KernelError::InvalidConfig));

    let long_credential = Config {
        credential: "c".repeat(MAX_CREDENTIAL_LEN + 1),
        ..Config::default()
    };
    assert_eq!(long_credential.validate(), Err(KernelError::InvalidConfig));

    let embedded_nul = Config {
        credential: String::from("abc\0def"),
        ..Config::default()
    };
    assert_eq!(embedded_nul.validate(), Err(KernelError::InvalidConfig));

    // A runtime update is refused before anything is applied.
    let current = Config::default();
    assert_eq!(current.check_runtime_update(&long_endpoint), Err(KernelError::InvalidConfig));
}
