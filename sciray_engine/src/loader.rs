/// Loader boundary - turning files and blobs into models
///
/// Loaders are producers of `Model`s; `ModelManager::add` is the only way
/// their output enters a scene. Long-running loaders report progress
/// through a rate-limited `LoaderProgress` and check a `CancellationToken`
/// between units of work. A cancelled load is not an error: it returns an
/// empty model list.

use std::fmt;
use std::path::Path;
use std::time::Duration;
use glam::Vec3;
use crate::engine_err;
use crate::engine_info;
use crate::error::Result;
use crate::geometry::{Geometry, ModelBuilder, Sphere};
use crate::log::SharedLogger;
use crate::model::Model;
use crate::utils::{CancellationToken, RateLimiter};

// ===== BLOB =====

/// In-memory file content
#[derive(Clone, Default)]
pub struct Blob {
    /// Original file name
    pub name: String,
    /// Format hint: an extension ("xyz") or a MIME-like type ("chemical/x-xyz")
    pub type_: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(name: impl Into<String>, type_: impl Into<String>, data: Vec<u8>) -> Self {
        Self { name: name.into(), type_: type_.into(), data }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("name", &self.name)
            .field("type_", &self.type_)
            .field("size", &self.data.len())
            .finish()
    }
}

// ===== PROGRESS =====

/// Progress callback: (message, fraction in [0, 1])
pub type ProgressCallback = Box<dyn FnMut(&str, f32) + Send>;

/// Rate-limited progress reporting
pub struct LoaderProgress {
    callback: ProgressCallback,
    limiter: RateLimiter,
}

impl LoaderProgress {
    /// Default minimum delay between two notifications
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new<F: FnMut(&str, f32) + Send + 'static>(callback: F) -> Self {
        Self::with_interval(callback, Self::DEFAULT_INTERVAL)
    }

    pub fn with_interval<F: FnMut(&str, f32) + Send + 'static>(callback: F, interval: Duration) -> Self {
        Self {
            callback: Box::new(callback),
            limiter: RateLimiter::new(interval),
        }
    }

    /// Progress that goes nowhere
    pub fn silent() -> Self {
        Self::with_interval(|_, _| {}, Duration::ZERO)
    }

    /// Notify progress, unless the previous notification is too recent.
    ///
    /// Returns true if the callback ran.
    pub fn update(&mut self, message: &str, fraction: f32) -> bool {
        let callback = &mut self.callback;
        self.limiter.call(|| callback(message, fraction.clamp(0.0, 1.0)))
    }

    /// Final notification at 100%, never rate-limited
    pub fn finish(&mut self, message: &str) {
        (self.callback)(message, 1.0);
    }
}

impl fmt::Debug for LoaderProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderProgress")
            .field("interval", &self.limiter.interval())
            .finish()
    }
}

// ===== LOADER =====

pub trait Loader: Send + Sync {
    fn name(&self) -> &str;

    /// Lowercase file extensions handled, without dot
    fn extensions(&self) -> &[&'static str];

    /// Build models from an in-memory file
    fn load_blob(&self, blob: &Blob, progress: &mut LoaderProgress, cancel: &CancellationToken) -> Result<Vec<Model>>;

    /// Build models from a file on disk.
    ///
    /// Default implementation reads the file into a `Blob`.
    fn load_file(&self, path: &Path, progress: &mut LoaderProgress, cancel: &CancellationToken) -> Result<Vec<Model>> {
        let data = std::fs::read(path)
            .map_err(|error| engine_err!("sciray::Loader", NotFound =>
                "Cannot read '{}': {}", path.display(), error))?;
        let name = path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let type_ = path.extension()
            .map(|extension| extension.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.load_blob(&Blob::new(name, type_, data), progress, cancel)
    }

    fn supports(&self, format: &str) -> bool {
        let format = normalize_format(format);
        self.extensions().iter().any(|extension| *extension == format)
    }
}

/// "XYZ", ".xyz" and "chemical/x-xyz" all give "xyz"
fn normalize_format(format: &str) -> String {
    let format = format.rsplit('/').next().unwrap_or(format);
    let format = format.trim_start_matches('.');
    let format = format.strip_prefix("x-").unwrap_or(format);
    format.to_ascii_lowercase()
}

// ===== REGISTRY =====

/// Loaders by supported format
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
    logger: SharedLogger,
}

impl LoaderRegistry {
    /// Registry without any loader
    pub fn new(logger: SharedLogger) -> Self {
        Self { loaders: Vec::new(), logger }
    }

    /// Registry with the built-in loaders
    pub fn with_defaults(logger: SharedLogger) -> Self {
        let mut registry = Self::new(logger.clone());
        registry.register(Box::new(XyzLoader::new(logger)));
        registry
    }

    /// Add a loader. Later loaders win for formats handled twice.
    pub fn register(&mut self, loader: Box<dyn Loader>) {
        engine_info!(self.logger, "sciray::LoaderRegistry",
            "Registered loader '{}' ({})", loader.name(), loader.extensions().join(", "));
        self.loaders.push(loader);
    }

    pub fn names(&self) -> Vec<&str> {
        self.loaders.iter().map(|loader| loader.name()).collect()
    }

    /// Every supported extension, sorted and deduplicated
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self.loaders.iter()
            .flat_map(|loader| loader.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Loader handling `format`. Fails with NotFound if none does.
    pub fn get(&self, format: &str) -> Result<&dyn Loader> {
        self.loaders.iter()
            .rev()
            .find(|loader| loader.supports(format))
            .map(|loader| &**loader)
            .ok_or_else(|| engine_err!("sciray::LoaderRegistry", NotFound =>
                "No loader for format '{}'", format))
    }

    /// Load a blob, picking the loader from its type, else its name extension
    pub fn load_blob(&self, blob: &Blob, progress: &mut LoaderProgress, cancel: &CancellationToken) -> Result<Vec<Model>> {
        let loader = match self.get(&blob.type_) {
            Ok(loader) => loader,
            Err(error) => {
                let extension = Path::new(&blob.name).extension()
                    .map(|extension| extension.to_string_lossy().into_owned());
                match extension {
                    Some(extension) => self.get(&extension)?,
                    None => return Err(error),
                }
            }
        };
        let models = loader.load_blob(blob, progress, cancel)?;
        engine_info!(self.logger, "sciray::LoaderRegistry",
            "Loaded {} model(s) from '{}' with '{}'", models.len(), blob.name, loader.name());
        Ok(models)
    }

    /// Load a file, picking the loader from its extension
    pub fn load_file(&self, path: &Path, progress: &mut LoaderProgress, cancel: &CancellationToken) -> Result<Vec<Model>> {
        let extension = path.extension()
            .map(|extension| extension.to_string_lossy().into_owned())
            .unwrap_or_default();
        let loader = self.get(&extension)?;
        let models = loader.load_file(path, progress, cancel)?;
        engine_info!(self.logger, "sciray::LoaderRegistry",
            "Loaded {} model(s) from '{}' with '{}'", models.len(), path.display(), loader.name());
        Ok(models)
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("loaders", &self.names())
            .finish()
    }
}

// ===== XYZ =====

/// Point cloud text format: one `x y z [radius]` point per line.
///
/// Empty lines and lines starting with `#` are skipped. Points without
/// radius use `default_radius`. The result is a single sphere model.
pub struct XyzLoader {
    default_radius: f32,
    logger: SharedLogger,
}

impl XyzLoader {
    pub const DEFAULT_RADIUS: f32 = 0.5;

    pub fn new(logger: SharedLogger) -> Self {
        Self { default_radius: Self::DEFAULT_RADIUS, logger }
    }

    pub fn default_radius(&self) -> f32 {
        self.default_radius
    }

    /// Fails with InvalidArgument unless strictly positive
    pub fn set_default_radius(&mut self, radius: f32) -> Result<()> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(engine_err!("sciray::XyzLoader", InvalidArgument =>
                "Default radius must be positive, got {}", radius));
        }
        self.default_radius = radius;
        Ok(())
    }

    fn parse_line(&self, line: &str, number: usize) -> Result<Sphere> {
        let values = line.split_whitespace()
            .map(str::parse::<f32>)
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|error| engine_err!("sciray::XyzLoader", InvalidArgument =>
                "Line {}: {}", number, error))?;

        match values.as_slice() {
            [x, y, z] => Ok(Sphere { center: Vec3::new(*x, *y, *z), radius: self.default_radius }),
            [x, y, z, radius] if *radius > 0.0 => Ok(Sphere { center: Vec3::new(*x, *y, *z), radius: *radius }),
            [_, _, _, radius] => Err(engine_err!("sciray::XyzLoader", InvalidArgument =>
                "Line {}: radius must be positive, got {}", number, radius)),
            _ => Err(engine_err!("sciray::XyzLoader", InvalidArgument =>
                "Line {}: expected 'x y z [radius]', got {} values", number, values.len())),
        }
    }
}

impl Loader for XyzLoader {
    fn name(&self) -> &str {
        "xyz"
    }

    fn extensions(&self) -> &[&'static str] {
        &["xyz"]
    }

    fn load_blob(&self, blob: &Blob, progress: &mut LoaderProgress, cancel: &CancellationToken) -> Result<Vec<Model>> {
        let text = std::str::from_utf8(&blob.data)
            .map_err(|error| engine_err!("sciray::XyzLoader", InvalidArgument =>
                "'{}' is not UTF-8 text: {}", blob.name, error))?;

        let lines: Vec<&str> = text.lines().collect();
        let mut spheres = Vec::with_capacity(lines.len());
        let message = format!("Loading {}", blob.name);

        for (index, line) in lines.iter().enumerate() {
            if cancel.is_cancelled() {
                engine_info!(self.logger, "sciray::XyzLoader",
                    "Loading of '{}' cancelled after {} points", blob.name, spheres.len());
                return Ok(Vec::new());
            }

            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                spheres.push(self.parse_line(line, index + 1)?);
            }
            progress.update(&message, (index + 1) as f32 / lines.len() as f32);
        }

        if spheres.is_empty() {
            return Err(engine_err!("sciray::XyzLoader", InvalidArgument =>
                "'{}' contains no point", blob.name));
        }

        progress.finish(&message);
        let model = ModelBuilder::new("xyz")
            .geometry(Geometry::spheres(spheres))
            .build();
        Ok(vec![model])
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
