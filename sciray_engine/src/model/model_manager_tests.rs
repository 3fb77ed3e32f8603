use super::*;
use std::sync::Mutex;
use glam::Vec3;
use crate::device::mock_device::MockDevice;
use crate::device::{ObjectKind, ParamValue};
use crate::error::Error;
use crate::log::{LogEntry, Logger};
use crate::math::Transform;
use crate::model::components::Component;
use crate::model::systems::BoundsSystem;
use crate::model::components::Components;

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct CaptureLogger {
    messages: Mutex<Vec<String>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.messages.lock().unwrap().push(entry.message.clone());
    }
}

struct Center(Vec3);

impl Component for Center {}

struct UnitBox;

impl BoundsSystem for UnitBox {
    fn compute(&self, transform: &Transform, components: &mut Components) -> Bounds {
        let center = components.find::<Center>().map_or(Vec3::ZERO, |center| center.0);
        Bounds::new(center - Vec3::ONE, center + Vec3::ONE).transformed(&transform.to_matrix())
    }
}

fn model(kind: &str) -> Model {
    let mut model = Model::new(kind);
    model.add_component(Center(Vec3::ZERO));
    model.systems_mut().set_bounds_system(UnitBox);
    model
}

fn manager() -> ModelManager {
    ModelManager::new(Arc::new(CaptureLogger::default()))
}

fn ids(manager: &ModelManager) -> Vec<u32> {
    manager.get_all_model_instances().iter().map(|instance| instance.id()).collect()
}

// ============================================================================
// Add / remove scenario
// ============================================================================

#[test]
fn test_add_remove_scenario() {
    let mut manager = manager();
    for _ in 0..3 {
        manager.add(model("box")).unwrap();
    }
    assert_eq!(ids(&manager), vec![0, 1, 2]);

    manager.remove_model_instances_by_id(&[1]).unwrap();
    assert_eq!(ids(&manager), vec![0, 2]);

    manager.remove_all_model_instances();
    assert_eq!(manager.instance_count(), 0);
    assert!(manager.is_empty());
}

#[test]
fn test_add_rejects_model_without_components() {
    let mut manager = manager();
    let result = manager.add(Model::new("empty"));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(manager.instance_count(), 0);
}

#[test]
fn test_add_models_is_atomic() {
    let mut manager = manager();
    let result = manager.add_models(vec![model("a"), Model::new("empty"), model("c")]);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(manager.instance_count(), 0);

    let added = manager.add_models(vec![model("a"), model("b")]).unwrap();
    assert_eq!(added, vec![0, 1]);
}

#[test]
fn test_ids_are_recycled_and_unique() {
    let mut manager = manager();
    for _ in 0..4 {
        manager.add(model("box")).unwrap();
    }
    manager.remove_model_instances_by_id(&[1, 3]).unwrap();
    manager.add(model("box")).unwrap();
    manager.add(model("box")).unwrap();
    manager.add(model("box")).unwrap();

    let mut live = ids(&manager);
    assert_eq!(live.len(), 5);
    live.sort_unstable();
    live.dedup();
    assert_eq!(live, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_removed_ids_reused_lowest_first() {
    let mut manager = manager();
    for _ in 0..5 {
        manager.add(model("box")).unwrap();
    }
    manager.remove_model_instances_by_id(&[3, 1]).unwrap();

    assert_eq!(manager.add(model("box")).unwrap().id(), 1);
    assert_eq!(manager.add(model("box")).unwrap().id(), 3);
    assert_eq!(manager.add(model("box")).unwrap().id(), 5);
}

#[test]
fn test_ids_unique_over_mixed_sequence() {
    let mut manager = manager();
    for step in 0..60u32 {
        if step % 3 == 2 {
            let victim = manager.get_all_model_instances()[0].id();
            manager.remove_model_instances_by_id(&[victim]).unwrap();
        } else if step % 5 == 0 && !manager.is_empty() {
            let source = manager.get_all_model_instances()[0].id();
            manager.create_instances(source, 2).unwrap();
        } else {
            manager.add(model("box")).unwrap();
        }

        let mut live = ids(&manager);
        let count = live.len();
        live.sort_unstable();
        live.dedup();
        assert_eq!(live.len(), count, "duplicate id after step {}", step);
    }
}

#[test]
fn test_remove_unknown_id_removes_nothing() {
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.add(model("box")).unwrap();

    let result = manager.remove_model_instances_by_id(&[0, 42]);
    assert!(matches!(result, Err(Error::NotFound(_))));
    assert_eq!(ids(&manager), vec![0, 1]);
}

#[test]
fn test_remove_by_predicate() {
    let mut manager = manager();
    manager.add(model("neuron")).unwrap();
    manager.add(model("light")).unwrap();
    manager.add(model("neuron")).unwrap();

    let removed = manager.remove_model_instances(|instance| {
        instance.model_type().map_or(false, |kind| kind == "neuron")
    });
    assert_eq!(removed, 2);
    assert_eq!(ids(&manager), vec![1]);
}

#[test]
fn test_get_model_instance_not_found() {
    let mut manager = manager();
    manager.add(model("box")).unwrap();

    assert_eq!(manager.get_model_instance(0).unwrap().id(), 0);
    match manager.get_model_instance(7) {
        Err(Error::NotFound(message)) => assert!(message.contains("Model not found")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_logger_receives_events() {
    let logger = Arc::new(CaptureLogger::default());
    let mut manager = ModelManager::new(logger.clone());
    manager.add(model("box")).unwrap();
    manager.remove_all_model_instances();

    let messages = logger.messages.lock().unwrap();
    assert!(messages.iter().any(|message| message.contains("Added model instance 0")));
    assert!(messages.iter().any(|message| message.contains("Removed 1 model instances")));
}

// ============================================================================
// Instances share models
// ============================================================================

#[test]
fn test_create_instances_share_model() {
    let mut manager = manager();
    manager.add(model("box")).unwrap();

    let created: Vec<u32> = manager.create_instances(0, 2).unwrap()
        .iter().map(|instance| instance.id()).collect();
    assert_eq!(created, vec![1, 2]);

    let first = manager.get_model_instance(0).unwrap().model().clone();
    for id in [1, 2] {
        let instance = manager.get_model_instance(id).unwrap();
        assert!(Arc::ptr_eq(instance.model(), &first));
        assert_eq!(instance.transform(), &Transform::IDENTITY);
        assert!(instance.is_visible());
    }

    assert!(matches!(manager.create_instances(9, 1), Err(Error::NotFound(_))));
}

#[test]
fn test_bounds_union_of_visible_instances() {
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.create_instances(0, 2).unwrap();
    manager.get_model_instance_mut(1).unwrap()
        .set_transform(Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    let hidden = manager.get_model_instance_mut(2).unwrap();
    hidden.set_transform(Transform::from_translation(Vec3::new(-50.0, 0.0, 0.0)));
    hidden.set_visible(false);

    let bounds = manager.bounds().unwrap();
    assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
    assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn test_commit_idempotent() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();

    assert!(manager.is_modified().unwrap());
    assert!(manager.commit(&mut device).unwrap());
    assert!(!manager.is_modified().unwrap());
    assert!(!manager.commit(&mut device).unwrap());
}

#[test]
fn test_commit_shared_model_once() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.create_instances(0, 3).unwrap();

    manager.commit(&mut device).unwrap();

    assert_eq!(device.count(ObjectKind::Group), 1);
    assert_eq!(device.count(ObjectKind::Instance), 4);
    let group = lock_model(manager.get_model_instance(0).unwrap().model()).unwrap().group().unwrap();
    assert_eq!(device.commit_count(group), 1);
    assert_eq!(manager.visible_handles().len(), 4);
}

#[test]
fn test_commit_pushes_transform() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.commit(&mut device).unwrap();

    let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
    manager.get_model_instance_mut(0).unwrap().set_transform(transform);
    assert!(manager.is_modified().unwrap());
    assert!(manager.commit(&mut device).unwrap());

    let handle = manager.get_model_instance(0).unwrap().handle().unwrap();
    assert_eq!(device.param(handle, "transform"), Some(&ParamValue::Mat4(transform.to_matrix())));
    assert_eq!(device.commit_count(handle), 2);
}

#[test]
fn test_removal_releases_backend_objects_at_commit() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.add(model("box")).unwrap();
    manager.commit(&mut device).unwrap();
    assert_eq!(device.live_object_count(), 4);

    manager.remove_model_instances_by_id(&[0]).unwrap();
    assert_eq!(device.live_object_count(), 4);

    assert!(manager.commit(&mut device).unwrap());
    assert_eq!(device.live_object_count(), 2);
    assert_eq!(device.released.len(), 2);
}

#[test]
fn test_shared_model_survives_partial_removal() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.create_instances(0, 1).unwrap();
    manager.commit(&mut device).unwrap();

    manager.remove_model_instances_by_id(&[0]).unwrap();
    manager.commit(&mut device).unwrap();

    assert_eq!(device.count(ObjectKind::Group), 1);
    assert_eq!(device.count(ObjectKind::Instance), 1);

    manager.remove_all_model_instances();
    manager.commit(&mut device).unwrap();
    assert_eq!(device.live_object_count(), 0);
}

#[test]
fn test_hidden_instance_not_in_visible_handles() {
    let mut device = MockDevice::new();
    let mut manager = manager();
    manager.add(model("box")).unwrap();
    manager.add(model("box")).unwrap().set_visible(false);
    manager.commit(&mut device).unwrap();

    let visible = manager.visible_handles();
    assert_eq!(visible.len(), 1);
    assert_eq!(Some(visible[0]), manager.get_model_instance(0).unwrap().handle());
}
