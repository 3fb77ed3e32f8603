/// Components - per-model, type-keyed storage of heterogeneous data
///
/// A `Components` container holds at most one instance per type. Plural data
/// must be wrapped in a container type (e.g. `Geometries`). Each stored value
/// implements `Component`, whose lifecycle hooks (create/commit/destroy) are
/// driven by the owning `Model`.

use std::any::{type_name, Any, TypeId};
use rustc_hash::FxHashMap;
use crate::device::{Device, ObjectHandle};
use crate::error::Result;
use crate::engine_err;
use crate::modified::ModifiedFlag;

// ===== ANY HELPERS =====

/// Object-safe access to `Any` for trait objects
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===== COMPONENT LIFECYCLE =====

/// Backend access given to a component during its lifecycle hooks.
///
/// `components` holds every sibling component of the same model (the one
/// being called is temporarily taken out of the container).
pub struct ComponentContext<'a> {
    pub device: &'a mut dyn Device,
    /// Backend group of the owning model
    pub group: ObjectHandle,
    pub components: &'a mut Components,
}

/// A typed payload attached to a Model.
///
/// Pure data components keep the default (no-op) hooks. Components that own
/// backend objects create them in `on_create`, sync them in `commit` and
/// release them in `on_destroy`.
pub trait Component: AsAny + Send + Sync + 'static {
    /// Called once, before the first commit
    fn on_create(&mut self, _context: &mut ComponentContext) -> Result<()> {
        Ok(())
    }

    /// Called every frame. Returns true if backend state changed and the
    /// model's group must be re-committed.
    fn commit(&mut self, _context: &mut ComponentContext) -> Result<bool> {
        Ok(false)
    }

    /// Called once, before the component is dropped
    fn on_destroy(&mut self, _context: &mut ComponentContext) {}
}

/// A stored component and whether its `on_create` already ran
pub(crate) struct ComponentEntry {
    pub(crate) component: Box<dyn Component>,
    pub(crate) created: bool,
}

fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

// ===== COMPONENTS =====

/// Type-keyed component container owned by exactly one Model.
///
/// Adding a component of a type already present replaces it: the container
/// is marked modified and the previous component is retired, so that its
/// `on_destroy` hook runs at the next model commit.
pub struct Components {
    entries: FxHashMap<TypeId, ComponentEntry>,
    /// Insertion order, used to run lifecycle hooks deterministically
    order: Vec<TypeId>,
    /// Replaced/removed components waiting for on_destroy
    retired: Vec<ComponentEntry>,
    /// Entry taken out while its own hook runs, and whether the hook removed it
    taken: Option<(TypeId, bool)>,
    flag: ModifiedFlag,
}

impl Components {
    /// Create an empty container
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
            retired: Vec::new(),
            taken: None,
            flag: ModifiedFlag::new(),
        }
    }

    /// Store a component, replacing any previous one of the same type.
    ///
    /// Returns a mutable reference to the stored value.
    pub fn add<T: Component>(&mut self, component: T) -> &mut T {
        let key = TypeId::of::<T>();
        let entry = ComponentEntry { component: Box::new(component), created: false };

        if let Some(previous) = self.entries.insert(key, entry) {
            self.retired.push(previous);
        }
        // the key may be known already while its entry is taken out for a hook
        if !self.order.contains(&key) {
            self.order.push(key);
        }
        self.flag.mark_modified();

        let entry = self.entries.get_mut(&key)
            .expect("component inserted above");
        downcast_mut::<T>(&mut *entry.component)
            .expect("component stored under its own TypeId")
    }

    /// Get a component, failing with NotFound if absent
    pub fn get<T: Component>(&self) -> Result<&T> {
        self.find::<T>()
            .ok_or_else(|| engine_err!("sciray::Components", NotFound =>
                "Component not found: {}", type_name::<T>()))
    }

    /// Get a mutable component, failing with NotFound if absent
    pub fn get_mut<T: Component>(&mut self) -> Result<&mut T> {
        self.find_mut::<T>()
            .ok_or_else(|| engine_err!("sciray::Components", NotFound =>
                "Component not found: {}", type_name::<T>()))
    }

    /// Get a component if present (never fails)
    pub fn find<T: Component>(&self) -> Option<&T> {
        self.entries.get(&TypeId::of::<T>())
            .and_then(|entry| downcast_ref::<T>(&*entry.component))
    }

    /// Get a mutable component if present (never fails)
    pub fn find_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.entries.get_mut(&TypeId::of::<T>())
            .and_then(|entry| downcast_mut::<T>(&mut *entry.component))
    }

    /// Whether a component of type T is stored
    pub fn has<T: Component>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Remove a component, retiring it for on_destroy.
    ///
    /// A component may remove itself from one of its own hooks; it is
    /// retired once the hook returns. While a hook runs, `has`/`find` do not
    /// see the component running it.
    ///
    /// Returns true if a component was removed.
    pub fn remove<T: Component>(&mut self) -> bool {
        let key = TypeId::of::<T>();
        let removed = match self.entries.remove(&key) {
            Some(entry) => {
                self.retired.push(entry);
                true
            }
            None => match &mut self.taken {
                Some((taken, removed)) if *taken == key && !*removed => {
                    *removed = true;
                    true
                }
                _ => false,
            },
        };
        if removed {
            self.order.retain(|stored| *stored != key);
            self.flag.mark_modified();
        }
        removed
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether components were added/replaced/removed since the last reset
    pub fn is_modified(&self) -> bool {
        self.flag.is_modified()
    }

    pub fn reset_modified(&self) {
        self.flag.reset_modified();
    }

    // ===== LIFECYCLE (driven by Model) =====

    /// Stored type keys in insertion order
    pub(crate) fn keys(&self) -> Vec<TypeId> {
        self.order.clone()
    }

    /// Temporarily take an entry out so that it can access its siblings
    pub(crate) fn take_entry(&mut self, key: TypeId) -> Option<ComponentEntry> {
        let entry = self.entries.remove(&key)?;
        self.taken = Some((key, false));
        Some(entry)
    }

    /// Put back an entry previously taken with `take_entry`.
    ///
    /// The entry is retired instead if it was removed meanwhile, or if a
    /// component of the same type was added (the newer one wins).
    pub(crate) fn restore_entry(&mut self, key: TypeId, entry: ComponentEntry) {
        let removed = matches!(self.taken.take(), Some((taken, true)) if taken == key);
        if removed || self.entries.contains_key(&key) {
            self.retired.push(entry);
        } else {
            self.entries.insert(key, entry);
        }
    }

    pub(crate) fn take_retired(&mut self) -> Vec<ComponentEntry> {
        std::mem::take(&mut self.retired)
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;
