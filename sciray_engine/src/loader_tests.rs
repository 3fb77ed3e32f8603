use super::*;
use std::sync::{Arc, Mutex};
use crate::error::Error;
use crate::geometry::{Geometries, Primitives};
use crate::log::{DefaultLogger, LogSeverity};

fn logger() -> SharedLogger {
    Arc::new(DefaultLogger::with_min_severity(LogSeverity::Error))
}

fn xyz_blob(text: &str) -> Blob {
    Blob::new("points.xyz", "xyz", text.as_bytes().to_vec())
}

fn spheres_of(model: &Model) -> Vec<Sphere> {
    let geometries = model.get_component::<Geometries>().unwrap();
    match geometries.get(0).unwrap().primitives() {
        Primitives::Spheres(spheres) => spheres.clone(),
        other => panic!("expected spheres, got {:?}", other),
    }
}

// ============================================================================
// Progress
// ============================================================================

#[test]
fn test_progress_rate_limited() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let mut progress = LoaderProgress::with_interval(
        move |message: &str, fraction| sink.lock().unwrap().push((message.to_string(), fraction)),
        Duration::from_secs(60),
    );

    assert!(progress.update("step", 0.1));
    assert!(!progress.update("step", 0.2));
    progress.finish("done");

    let calls = calls.lock().unwrap();
    assert_eq!(*calls, vec![("step".to_string(), 0.1), ("done".to_string(), 1.0)]);
}

#[test]
fn test_progress_fraction_clamped() {
    let last = Arc::new(Mutex::new(0.0));
    let sink = last.clone();
    let mut progress = LoaderProgress::with_interval(move |_: &str, fraction| *sink.lock().unwrap() = fraction, Duration::ZERO);
    progress.update("over", 3.0);
    assert_eq!(*last.lock().unwrap(), 1.0);
}

// ============================================================================
// XYZ
// ============================================================================

#[test]
fn test_xyz_parses_points_and_radii() {
    let loader = XyzLoader::new(logger());
    let blob = xyz_blob("# header\n0 0 0\n\n1 2 3 0.25\n");
    let models = loader.load_blob(&blob, &mut LoaderProgress::silent(), &CancellationToken::new()).unwrap();

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].model_type(), "xyz");
    let spheres = spheres_of(&models[0]);
    assert_eq!(spheres.len(), 2);
    assert_eq!(spheres[0].radius, XyzLoader::DEFAULT_RADIUS);
    assert_eq!(spheres[1].center, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(spheres[1].radius, 0.25);
}

#[test]
fn test_xyz_rejects_malformed_lines() {
    let loader = XyzLoader::new(logger());
    let token = CancellationToken::new();
    for text in ["1 2\n", "1 2 3 4 5\n", "a b c\n", "1 2 3 -1\n", "", "# only a comment\n"] {
        let result = loader.load_blob(&xyz_blob(text), &mut LoaderProgress::silent(), &token);
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "accepted {:?}", text);
    }
}

#[test]
fn test_xyz_rejects_binary_data() {
    let loader = XyzLoader::new(logger());
    let blob = Blob::new("points.xyz", "xyz", vec![0xff, 0xfe, 0x00]);
    let result = loader.load_blob(&blob, &mut LoaderProgress::silent(), &CancellationToken::new());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_xyz_cancelled_returns_no_model() {
    let loader = XyzLoader::new(logger());
    let token = CancellationToken::new();
    token.cancel();
    let models = loader.load_blob(&xyz_blob("0 0 0\n"), &mut LoaderProgress::silent(), &token).unwrap();
    assert!(models.is_empty());
}

#[test]
fn test_xyz_default_radius_validation() {
    let mut loader = XyzLoader::new(logger());
    assert!(matches!(loader.set_default_radius(0.0), Err(Error::InvalidArgument(_))));
    assert!(matches!(loader.set_default_radius(f32::NAN), Err(Error::InvalidArgument(_))));
    loader.set_default_radius(2.0).unwrap();

    let models = loader.load_blob(&xyz_blob("0 0 0"), &mut LoaderProgress::silent(), &CancellationToken::new()).unwrap();
    assert_eq!(spheres_of(&models[0])[0].radius, 2.0);
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_lookup_normalizes_format() {
    let registry = LoaderRegistry::with_defaults(logger());
    for format in ["xyz", "XYZ", ".xyz", "chemical/x-xyz"] {
        assert_eq!(registry.get(format).unwrap().name(), "xyz");
    }
    assert_eq!(registry.supported_extensions(), vec!["xyz"]);
}

#[test]
fn test_registry_unknown_format_not_found() {
    let registry = LoaderRegistry::with_defaults(logger());
    assert!(matches!(registry.get("nrrd"), Err(Error::NotFound(_))));
    assert!(matches!(LoaderRegistry::new(logger()).get("xyz"), Err(Error::NotFound(_))));
}

#[test]
fn test_registry_blob_falls_back_to_name_extension() {
    let registry = LoaderRegistry::with_defaults(logger());
    let blob = Blob::new("cloud.xyz", "application/octet-stream", b"1 1 1\n".to_vec());
    let models = registry.load_blob(&blob, &mut LoaderProgress::silent(), &CancellationToken::new()).unwrap();
    assert_eq!(models.len(), 1);

    let blob = Blob::new("cloud", "application/octet-stream", b"1 1 1\n".to_vec());
    let result = registry.load_blob(&blob, &mut LoaderProgress::silent(), &CancellationToken::new());
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_registry_load_file() {
    let path = std::env::temp_dir().join(format!("sciray_loader_{}.xyz", std::process::id()));
    std::fs::write(&path, "0 0 0\n1 0 0\n2 0 0\n").unwrap();

    let registry = LoaderRegistry::with_defaults(logger());
    let models = registry.load_file(&path, &mut LoaderProgress::silent(), &CancellationToken::new());
    std::fs::remove_file(&path).unwrap();

    let models = models.unwrap();
    assert_eq!(spheres_of(&models[0]).len(), 3);
}

#[test]
fn test_registry_missing_file_not_found() {
    let registry = LoaderRegistry::with_defaults(logger());
    let path = std::env::temp_dir().join("sciray_loader_missing_file.xyz");
    let result = registry.load_file(&path, &mut LoaderProgress::silent(), &CancellationToken::new());
    assert!(matches!(result, Err(Error::NotFound(_))));
}
