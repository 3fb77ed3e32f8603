/// IdFactory - network-visible model ids
///
/// Ids are unique among live owners. A released id is handed out again
/// before any fresh one, lowest first, so a client that removes and adds
/// models sees small, predictable ids. Releasing the highest live id
/// shrinks the range instead of growing the free set.

use std::collections::BTreeSet;
use crate::engine_err;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct IdFactory {
    /// Free ids below `end`
    released: BTreeSet<u32>,
    /// Every id in `0..end` is either live or in `released`
    end: u32,
}

impl IdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest free id
    pub fn generate(&mut self) -> u32 {
        if let Some(id) = self.released.pop_first() {
            return id;
        }
        let id = self.end;
        self.end += 1;
        id
    }

    /// Return a live id to the pool.
    ///
    /// Fails with InvalidArgument if `id` is not live (never generated or
    /// already released); the pool is left untouched.
    pub fn release(&mut self, id: u32) -> Result<()> {
        if !self.is_live(id) {
            return Err(engine_err!("sciray::IdFactory", InvalidArgument =>
                "Id {} is not live", id));
        }
        self.released.insert(id);
        while self.end > 0 && self.released.remove(&(self.end - 1)) {
            self.end -= 1;
        }
        Ok(())
    }

    pub fn is_live(&self, id: u32) -> bool {
        id < self.end && !self.released.contains(&id)
    }

    /// Highest live id + 1 (0 when empty)
    pub fn high_water_mark(&self) -> u32 {
        self.end
    }

    /// Number of live ids
    pub fn len(&self) -> u32 {
        self.end - self.released.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every id; the next generated id is 0 again
    pub fn clear(&mut self) {
        self.released.clear();
        self.end = 0;
    }
}

#[cfg(test)]
#[path = "id_factory_tests.rs"]
mod tests;
