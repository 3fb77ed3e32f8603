//! Unit tests for the Engine singleton
//!
//! ENGINE_STATE and LOGGER are process-wide: every test here is #[serial].

use crate::config::EngineConfig;
use crate::device::mock_device::MockDevice;
use crate::device::{Device, ObjectKind};
use crate::error::Error;
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::sciray::Engine;
use glam::UVec2;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
#[derive(Clone)]
struct TestLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String)>>>,
}

impl TestLogger {
    fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(Vec::new())) }
    }

    fn contains(&self, severity: LogSeverity, text: &str) -> bool {
        self.entries.lock().unwrap().iter()
            .any(|(entry_severity, message)| *entry_severity == severity && message.contains(text))
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push((entry.severity, entry.message.clone()));
    }
}

fn setup() {
    Engine::reset_for_testing();
    let _ = Engine::initialize();
}

fn mock_with_modules(modules: &[&str]) -> MockDevice {
    let mut device = MockDevice::new();
    device.available_modules = modules.iter().map(|module| module.to_string()).collect();
    device
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
#[serial]
fn test_initialize_idempotent() {
    setup();
    Engine::initialize().unwrap();
    Engine::initialize().unwrap();
    assert!(Engine::create_device(MockDevice::new()).is_ok());
}

#[test]
#[serial]
fn test_shutdown_clears_device_and_config() {
    setup();
    Engine::set_config(EngineConfig { app_name: "viewer".to_string(), ..EngineConfig::default() }).unwrap();
    Engine::create_device(MockDevice::new()).unwrap();

    Engine::shutdown();

    assert!(matches!(Engine::device(), Err(Error::InitializationFailed(_))));
    assert_eq!(Engine::config().unwrap().app_name, "sciray");
}

// ============================================================================
// DEVICE
// ============================================================================

#[test]
#[serial]
fn test_create_and_use_device() {
    setup();
    Engine::create_device(MockDevice::new()).unwrap();

    let device = Engine::device().unwrap();
    let handle = device.lock().unwrap().create_object(ObjectKind::World, "world").unwrap();
    device.lock().unwrap().commit(handle).unwrap();
}

#[test]
#[serial]
fn test_create_device_twice_fails() {
    setup();
    Engine::create_device(MockDevice::new()).unwrap();
    assert!(matches!(Engine::create_device(MockDevice::new()), Err(Error::InitializationFailed(_))));
}

#[test]
#[serial]
fn test_device_before_creation_fails() {
    setup();
    assert!(matches!(Engine::device(), Err(Error::InitializationFailed(_))));
}

#[test]
#[serial]
fn test_destroy_device_allows_recreation() {
    setup();
    Engine::create_device(MockDevice::new()).unwrap();
    let kept = Engine::device().unwrap();

    Engine::destroy_device().unwrap();
    assert!(Engine::device().is_err());
    assert!(kept.lock().is_ok());

    Engine::create_device(MockDevice::new()).unwrap();
    assert!(Engine::device().is_ok());
}

#[test]
#[serial]
fn test_errors_are_logged() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    let _ = Engine::device();
    assert!(logger.contains(LogSeverity::Error, "Device not created"));

    Engine::reset_logger();
}

// ============================================================================
// MODULES
// ============================================================================

#[test]
#[serial]
fn test_load_module_soft_fails() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    assert!(!Engine::load_module("volumes"));

    Engine::create_device(mock_with_modules(&["volumes"])).unwrap();
    assert!(Engine::load_module("volumes"));
    assert!(!Engine::load_module("circuits"));
    assert!(logger.contains(LogSeverity::Warn, "Cannot load module 'circuits'"));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_create_device_loads_configured_modules() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());
    let config = EngineConfig {
        modules: vec!["volumes".to_string(), "missing".to_string()],
        ..EngineConfig::default()
    };
    Engine::set_config(config).unwrap();

    Engine::create_device(mock_with_modules(&["volumes"])).unwrap();

    assert!(logger.contains(LogSeverity::Info, "Loaded module 'volumes'"));
    assert!(logger.contains(LogSeverity::Warn, "Cannot load module 'missing'"));
    Engine::reset_logger();
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
#[serial]
fn test_set_config_validates() {
    setup();
    let invalid = EngineConfig { frame_size: UVec2::new(32, 32), ..EngineConfig::default() };
    assert!(matches!(Engine::set_config(invalid), Err(Error::InvalidArgument(_))));
    assert_eq!(Engine::config().unwrap().frame_size, UVec2::new(800, 600));

    let valid = EngineConfig { frame_size: UVec2::new(1024, 768), ..EngineConfig::default() };
    Engine::set_config(valid).unwrap();
    assert_eq!(Engine::config().unwrap().frame_size, UVec2::new(1024, 768));
}

#[test]
#[serial]
fn test_set_config_keeps_custom_logger() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());
    Engine::set_config(EngineConfig { log_severity: LogSeverity::Error, ..EngineConfig::default() }).unwrap();

    crate::engine_info!("sciray::test", "still captured");
    assert!(logger.contains(LogSeverity::Info, "still captured"));
    Engine::reset_logger();
}

// ============================================================================
// LOGGING
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_macro_output() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    crate::engine_warn!("sciray::test", "value = {}", 42);
    crate::engine_error!("sciray::test", "broken");

    assert!(logger.contains(LogSeverity::Warn, "value = 42"));
    assert!(logger.contains(LogSeverity::Error, "broken"));
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_logger_handle_shares_current_logger() {
    setup();
    let logger = TestLogger::new();
    Engine::set_logger(logger.clone());

    let shared = Engine::logger();
    crate::engine_debug!(shared, "sciray::test", "through handle");
    assert!(logger.contains(LogSeverity::Debug, "through handle"));

    Engine::reset_logger();
    crate::engine_debug!("sciray::test", "after reset");
    assert!(!logger.contains(LogSeverity::Debug, "after reset"));
}
