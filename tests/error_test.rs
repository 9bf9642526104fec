//! Tests for error types

use trueno_pipeline::adapter::AdapterKind;
use trueno_pipeline::keys::ProcessType;
use trueno_pipeline::packet::PacketKind;
use trueno_pipeline::Error;

#[test]
fn test_key_not_found_error() {
    let error = Error::KeyNotFound("TableKey(trainer, epoch, train)".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Key not found"));
    assert!(error_str.contains("TableKey(trainer, epoch, train)"));
}

#[test]
fn test_adapter_not_found_error() {
    let error = Error::AdapterNotFound {
        kind: AdapterKind::Trainer,
        name: "t9".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("No trainer adapter registered under name 't9'"));
    assert!(error_str.contains("RunRegistry::register_trainer()"));
}

#[test]
fn test_invalid_packet_type_error() {
    let error = Error::InvalidPacketType {
        station: "finisher",
        expected: PacketKind::Visualized,
        found: PacketKind::Start,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Station 'finisher'"));
    assert!(error_str.contains("VisualizedRun"));
    assert!(error_str.contains("StartRun"));
}

#[test]
fn test_unsupported_process_error() {
    let error = Error::UnsupportedProcess(ProcessType::Validation);
    let error_str = format!("{error}");
    assert!(error_str.contains("'validation' is not supported"));
}

#[test]
fn test_adapter_error_keeps_source() {
    let error = Error::adapter("m1", std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
    let error_str = format!("{error}");
    assert!(error_str.contains("Adapter 'm1' failed"));
    assert!(error_str.contains("disk gone"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_adapter_error_keeps_anyhow_chain() {
    let failure = anyhow::anyhow!("loss diverged").context("epoch 2 failed");
    let error = trueno_pipeline::adapter::adapter_failure("t1", failure);

    assert!(matches!(error, Error::Adapter { ref adapter, .. } if adapter == "t1"));
    let source = std::error::Error::source(&error).unwrap();
    assert!(source.to_string().contains("epoch 2 failed"));
    assert_eq!(source.source().unwrap().to_string(), "loss diverged");
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file exists".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file exists"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::InvalidConfig("max_epochs must be at least 1".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("InvalidConfig"));
}

#[test]
fn test_result_type_alias() {
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> trueno_pipeline::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> trueno_pipeline::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
