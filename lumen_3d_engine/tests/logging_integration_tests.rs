//! Integration tests for the engine logging facade and macros
//!
//! Exercises the public API only. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use lumen_3d_engine::lumen3d::log::{format_entry, LogEntry, LogSeverity, Logger};
use lumen_3d_engine::lumen3d::{Engine, Error};
use lumen_3d_engine::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_warn};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Captures entries for inspection
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

fn install_capture_logger() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });
    Engine::set_min_severity(LogSeverity::Trace);
    entries
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn teardown() {
    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
#[serial]
fn test_integration_macros_route_through_engine() {
    let entries = install_capture_logger();

    engine_debug!("lumen3d::test", "chain {} rebuilt", 3);
    engine_info!("lumen3d::test", "{}x{}", 800, 600);
    engine_warn!("lumen3d::test", "validation unavailable");

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 3);
    assert_eq!(captured[0].severity, LogSeverity::Debug);
    assert_eq!(captured[0].message, "chain 3 rebuilt");
    assert_eq!(captured[1].message, "800x600");
    assert_eq!(captured[2].severity, LogSeverity::Warn);
    assert!(captured.iter().all(|entry| entry.source == "lumen3d::test"));
    assert!(captured.iter().all(|entry| entry.file.is_none()));
    drop(captured);

    teardown();
}

#[test]
#[serial]
fn test_integration_error_macro_records_location() {
    let entries = install_capture_logger();

    engine_error!("lumen3d::test", "device lost");

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some_and(|file| file.ends_with("logging_integration_tests.rs")));
    assert!(captured[0].line.is_some());
    drop(captured);

    teardown();
}

#[test]
#[serial]
fn test_integration_engine_err_logs_and_yields_backend_error() {
    let entries = install_capture_logger();

    fn failing_call() -> lumen_3d_engine::lumen3d::Result<()> {
        engine_bail!("lumen3d::test", "queue submit failed: {}", -4);
    }

    let error = engine_err!("lumen3d::test", "begin failed");
    assert!(matches!(error, Error::BackendError(ref message) if message == "begin failed"));
    assert!(matches!(failing_call(), Err(Error::BackendError(_))));

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[1].message, "queue submit failed: -4");
    drop(captured);

    teardown();
}

// ============================================================================
// FILTERING AND FORMATTING
// ============================================================================

#[test]
#[serial]
fn test_integration_min_severity_filters_entries() {
    let entries = install_capture_logger();
    Engine::set_min_severity(LogSeverity::Warn);

    engine_debug!("lumen3d::test", "dropped");
    engine_info!("lumen3d::test", "dropped");
    engine_warn!("lumen3d::test", "kept");
    engine_error!("lumen3d::test", "kept");

    assert_eq!(Engine::min_severity(), LogSeverity::Warn);
    assert_eq!(entries.lock().unwrap().len(), 2);

    teardown();
}

#[test]
#[serial]
fn test_integration_reset_logger_stops_capture() {
    let entries = install_capture_logger();
    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());

    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
    teardown();
}

#[test]
#[serial]
fn test_integration_format_entry_layout() {
    let entries = install_capture_logger();
    Engine::log_detailed(LogSeverity::Error, "lumen3d::vulkan", "boom".to_string(), "device.rs", 42);

    let line = format_entry(&entries.lock().unwrap()[0]);
    assert!(line.ends_with("[ERROR] [lumen3d::vulkan] boom (device.rs:42)"), "{}", line);

    teardown();
}
