/// Dirty-tracking primitives.
///
/// `ModifiedFlag` is the atomic dirty bit every backend-synchronized object
/// carries. Setters go through `ModifiedFlag::update`, which only replaces the
/// stored value (and marks the owner dirty) when the new value actually
/// differs, so an unchanged setter call never triggers a backend re-sync.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use glam::{Mat4, Quat, UVec2, Vec2, Vec3, Vec4};

/// Absolute tolerance used when comparing floating-point members
pub const EPSILON: f32 = 1e-6;

// ===== APPROXIMATE EQUALITY =====

/// Equality used by `ModifiedFlag::update`.
///
/// Floating-point types (and glam vectors/matrices) compare with an absolute
/// epsilon of `EPSILON`; every other type compares with `==`.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() <= EPSILON
    }
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() <= EPSILON as f64
    }
}

macro_rules! impl_approx_eq_glam {
    ($($ty:ty),*) => {
        $(
            impl ApproxEq for $ty {
                fn approx_eq(&self, other: &Self) -> bool {
                    self.abs_diff_eq(*other, EPSILON)
                }
            }
        )*
    };
}

impl_approx_eq_glam!(Vec2, Vec3, Vec4, Quat, Mat4);

/// Implement `ApproxEq` through `PartialEq` for types without a tolerance.
///
/// Exported so that downstream types (enums, descriptors) can be stored
/// behind a `ModifiedFlag`.
#[macro_export]
macro_rules! impl_exact_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::sciray::ApproxEq for $ty {
                fn approx_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_exact_eq!(bool, u8, u16, u32, u64, usize, i8, i16, i32, i64, String, UVec2);

impl<T: ApproxEq> ApproxEq for Option<T> {
    fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.approx_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ApproxEq> ApproxEq for Vec<T> {
    fn approx_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.approx_eq(b))
    }
}

impl<T: ApproxEq, const N: usize> ApproxEq for [T; N] {
    fn approx_eq(&self, other: &Self) -> bool {
        self.iter().zip(other).all(|(a, b)| a.approx_eq(b))
    }
}

// ===== MODIFIED FLAG =====

/// Observer invoked every time a flag is marked modified (cascading dirtiness)
pub type ModifiedCallback = Arc<dyn Fn() + Send + Sync>;

/// Atomic dirty bit.
///
/// Modified from construction until `reset_modified()` is called, which
/// normally happens once per commit cycle after the backend sync succeeded.
///
/// Cloning produces a flag that is modified and carries no callback: a copied
/// object has to resync with the backend exactly once.
pub struct ModifiedFlag {
    modified: AtomicBool,
    callback: Option<ModifiedCallback>,
}

impl ModifiedFlag {
    /// Create a flag in the modified state
    pub fn new() -> Self {
        Self {
            modified: AtomicBool::new(true),
            callback: None,
        }
    }

    /// Whether the owner changed since the last `reset_modified()`
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    /// Set the dirty bit and notify the registered observer
    pub fn mark_modified(&self) {
        self.mark(true);
    }

    /// Set the dirty bit, optionally notifying the registered observer
    pub fn mark(&self, trigger_callback: bool) {
        self.modified.store(true, Ordering::Release);
        if trigger_callback {
            if let Some(callback) = &self.callback {
                callback();
            }
        }
    }

    /// Clear the dirty bit
    pub fn reset_modified(&self) {
        self.modified.store(false, Ordering::Release);
    }

    /// Register the observer called by `mark_modified()`
    pub fn set_callback(&mut self, callback: ModifiedCallback) {
        self.callback = Some(callback);
    }

    /// Remove the observer
    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// Store `value` into `member` and mark modified, only if they differ.
    ///
    /// Returns true if the member changed.
    pub fn update<T: ApproxEq>(&self, member: &mut T, value: T) -> bool {
        self.update_with(member, value, true)
    }

    /// Same as `update()`, with explicit control over the observer call
    pub fn update_with<T: ApproxEq>(&self, member: &mut T, value: T, trigger_callback: bool) -> bool {
        if member.approx_eq(&value) {
            return false;
        }
        *member = value;
        self.mark(trigger_callback);
        true
    }
}

impl Default for ModifiedFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ModifiedFlag {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModifiedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifiedFlag")
            .field("modified", &self.is_modified())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

// ===== BASE OBJECT =====

/// Any object synchronized with the backend through a `ModifiedFlag`.
pub trait BaseObject {
    /// The object's dirty bit
    fn modified_flag(&self) -> &ModifiedFlag;

    fn is_modified(&self) -> bool {
        self.modified_flag().is_modified()
    }

    fn mark_modified(&self) {
        self.modified_flag().mark_modified();
    }

    fn reset_modified(&self) {
        self.modified_flag().reset_modified();
    }
}

#[cfg(test)]
#[path = "modified_tests.rs"]
mod tests;
