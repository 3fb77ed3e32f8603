/// Sciray Engine - process-wide singleton state
///
/// The backend device is the only global piece of rendering state: every
/// session, scene and model receives the device explicitly at commit time,
/// and this module just keeps the shared instance (plus the active config
/// and the default logger) reachable from anywhere.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use crate::config::EngineConfig;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::log::{emit, DefaultLogger, LogSeverity, Logger, SharedLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger at Info)
static LOGGER: OnceLock<RwLock<LoggerSlot>> = OnceLock::new();

struct EngineState {
    /// Device singleton (wrapped in Mutex for thread-safe mutable access)
    device: RwLock<Option<Arc<Mutex<dyn Device>>>>,
    /// Active configuration
    config: RwLock<EngineConfig>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            device: RwLock::new(None),
            config: RwLock::new(EngineConfig::default()),
        }
    }
}

struct LoggerSlot {
    logger: SharedLogger,
    /// Set by `set_logger`; a custom logger is never replaced by config changes
    custom: bool,
}

impl LoggerSlot {
    fn default_with(severity: LogSeverity) -> Self {
        Self {
            logger: Arc::new(DefaultLogger::with_min_severity(severity)),
            custom: false,
        }
    }
}

fn logger_slot() -> &'static RwLock<LoggerSlot> {
    LOGGER.get_or_init(|| RwLock::new(LoggerSlot::default_with(LogSeverity::Info)))
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use sciray_engine::sciray::{Engine, EngineConfig};
/// use sciray_device_cpu::CpuDevice;
///
/// Engine::initialize()?;
/// Engine::set_config(EngineConfig::default())?;
/// Engine::create_device(CpuDevice::new())?;
///
/// let device = Engine::device()?;
/// // Commit and render sessions with device.lock()...
///
/// Engine::shutdown();
/// # Ok::<(), sciray_engine::sciray::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log an error before returning it
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("sciray::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("sciray::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("sciray::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// Idempotent. Must be called before creating the device.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Destroy the device and restore the default configuration
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.device.write() {
                *device = None;
            }
            if let Ok(mut config) = state.config.write() {
                *config = EngineConfig::default();
            }
        }
    }

    // ===== DEVICE API =====

    /// Register the backend device singleton, then load the modules listed
    /// in the active config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device already exists
    /// - The device lock is poisoned
    ///
    /// A module that fails to load is only logged.
    pub fn create_device<D: Device + 'static>(device: D) -> Result<()> {
        let state = Self::state()?;
        let device: Arc<Mutex<dyn Device>> = Arc::new(Mutex::new(device));

        {
            let mut lock = state.device.write()
                .map_err(|_| Self::log_and_return_error(
                    Error::BackendError("Device lock poisoned".to_string())
                ))?;

            if lock.is_some() {
                return Err(Self::log_and_return_error(
                    Error::InitializationFailed("Device already exists. Call Engine::destroy_device() first.".to_string())
                ));
            }
            *lock = Some(device);
        }

        crate::engine_info!("sciray::Engine", "Device singleton created successfully");

        for module in Self::config()?.modules {
            Self::load_module(&module);
        }
        Ok(())
    }

    /// Get the device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the device was
    /// not created.
    pub fn device() -> Result<Arc<Mutex<dyn Device>>> {
        let state = Self::state()?;

        let lock = state.device.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Device not created. Call Engine::create_device() first.".to_string())
            ))
    }

    /// Destroy the device singleton
    ///
    /// Existing device references stay valid until dropped.
    pub fn destroy_device() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("sciray::Engine", "Device singleton destroyed");

        Ok(())
    }

    /// Load an optional backend module.
    ///
    /// Failures (no device, unknown module) are logged as warnings and
    /// reported as false.
    pub fn load_module(name: &str) -> bool {
        let device = match Self::device() {
            Ok(device) => device,
            Err(_) => return false,
        };
        let result = match device.lock() {
            Ok(mut device) => device.load_module(name),
            Err(_) => Err(Error::BackendError("Device mutex poisoned".to_string())),
        };

        match result {
            Ok(()) => {
                crate::engine_info!("sciray::Engine", "Loaded module '{}'", name);
                true
            }
            Err(error) => {
                crate::engine_warn!("sciray::Engine", "Cannot load module '{}': {}", name, error);
                false
            }
        }
    }

    // ===== CONFIG API =====

    /// Validate and store the configuration.
    ///
    /// The default logger follows `log_severity`; a custom logger is kept.
    pub fn set_config(config: EngineConfig) -> Result<()> {
        config.validate()?;
        let state = Self::state()?;

        if let Ok(mut slot) = logger_slot().write() {
            if !slot.custom {
                *slot = LoggerSlot::default_with(config.log_severity);
            }
        }

        let mut lock = state.config.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Config lock poisoned".to_string())
            ))?;
        crate::engine_debug!("sciray::Engine", "Configuration set for '{}'", config.app_name);
        *lock = config;
        Ok(())
    }

    /// Copy of the active configuration
    pub fn config() -> Result<EngineConfig> {
        let state = Self::state()?;
        let lock = state.config.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Config lock poisoned".to_string())
            ))?;
        Ok(lock.clone())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
        Self::reset_logger();
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sciray_engine::sciray::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut slot) = logger_slot().write() {
            *slot = LoggerSlot { logger: Arc::new(logger), custom: true };
        }
    }

    /// Reset logger to the default console logger
    pub fn reset_logger() {
        let severity = ENGINE_STATE.get()
            .and_then(|state| state.config.read().ok().map(|config| config.log_severity))
            .unwrap_or(LogSeverity::Info);
        if let Ok(mut slot) = logger_slot().write() {
            *slot = LoggerSlot::default_with(severity);
        }
    }

    /// Shareable handle on the current logger, for constructor injection
    pub fn logger() -> SharedLogger {
        match logger_slot().read() {
            Ok(slot) => slot.logger.clone(),
            Err(_) => Arc::new(DefaultLogger::new()),
        }
    }

    /// Log without file:line (used by the engine_* macros)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(slot) = logger_slot().read() {
            emit(&*slot.logger, severity, source, message, None);
        }
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(slot) = logger_slot().read() {
            emit(&*slot.logger, severity, source, message, Some((file, line)));
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
