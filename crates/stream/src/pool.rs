use roadstream_common::{UnitFactory, UnitHandle};
use std::collections::{BTreeSet, VecDeque};

/// Recycles ground tile units in FIFO order.
///
/// Units handed out by [`acquire`](Self::acquire) are tracked as active
/// until they come back through [`release`](Self::release). With pooling
/// disabled every acquire constructs and every release destroys.
#[derive(Debug)]
pub struct TilePool {
    enabled: bool,
    free: VecDeque<UnitHandle>,
    active: BTreeSet<UnitHandle>,
    constructed: usize,
    destroyed: usize,
}

impl TilePool {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            free: VecDeque::new(),
            active: BTreeSet::new(),
            constructed: 0,
            destroyed: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Construct `count` inactive units up front. No-op when pooling is disabled.
    pub fn prewarm<F: UnitFactory + ?Sized>(&mut self, factory: &mut F, count: usize) {
        if !self.enabled {
            return;
        }
        for _ in 0..count {
            let unit = factory.instantiate_unit();
            factory.set_active(unit, false);
            self.constructed += 1;
            self.free.push_back(unit);
        }
        tracing::debug!(count, pooled = self.free.len(), "tile pool prewarmed");
    }

    /// Hand out the oldest pooled unit, or construct a new one.
    ///
    /// The unit comes back inactive and unparented; the caller places it.
    pub fn acquire<F: UnitFactory + ?Sized>(&mut self, factory: &mut F) -> UnitHandle {
        let reused = if self.enabled {
            self.free.pop_front()
        } else {
            None
        };
        let unit = match reused {
            Some(unit) => unit,
            None => {
                self.constructed += 1;
                factory.instantiate_unit()
            }
        };
        self.active.insert(unit);
        unit
    }

    /// Take a unit back. Returns `false` if the unit was not handed out by
    /// this pool or has already been returned.
    pub fn release<F: UnitFactory + ?Sized>(&mut self, factory: &mut F, unit: UnitHandle) -> bool {
        if !self.active.remove(&unit) {
            tracing::warn!(%unit, "release of a unit that is not active ignored");
            return false;
        }
        if self.enabled {
            factory.set_active(unit, false);
            factory.set_parent(unit, None);
            self.free.push_back(unit);
        } else {
            factory.destroy_unit(unit);
            self.destroyed += 1;
        }
        true
    }

    /// Units waiting in the pool.
    pub fn pooled_len(&self) -> usize {
        self.free.len()
    }

    /// Units currently owned by segments.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, unit: UnitHandle) -> bool {
        self.active.contains(&unit)
    }

    pub fn is_pooled(&self, unit: UnitHandle) -> bool {
        self.free.contains(&unit)
    }

    /// Units ever constructed through this pool.
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    /// Units constructed and not yet destroyed. Always equals
    /// `active_len() + pooled_len()`.
    pub fn live_count(&self) -> usize {
        self.constructed - self.destroyed
    }
}

impl Default for TilePool {
    fn default() -> Self {
        Self::new(true)
    }
}
