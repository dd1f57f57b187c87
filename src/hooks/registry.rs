use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::runtime::{ComponentId, Dispatcher};

pub(crate) type AnySlot = dyn Any + Send + Sync;
pub type Cleanup = Box<dyn FnOnce() + Send + Sync>;

#[derive(Default)]
pub struct HookRegistry {
    stores: Mutex<HashMap<ComponentId, Arc<Mutex<HookStore>>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn store_for(&self, id: &ComponentId) -> Arc<Mutex<HookStore>> {
        let mut guard = self.stores.lock();
        guard
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(HookStore::default())))
            .clone()
    }

    pub fn component_count(&self) -> usize {
        self.stores.lock().len()
    }

    /// Drops the hook state of every component not in `live`, running its
    /// effect cleanups in hook order. Returns the number of components
    /// removed.
    pub fn prune(&self, live: &HashSet<ComponentId>) -> usize {
        let removed: Vec<(ComponentId, Arc<Mutex<HookStore>>)> = {
            let mut guard = self.stores.lock();
            let stale: Vec<ComponentId> = guard
                .keys()
                .filter(|id| !live.contains(*id))
                .cloned()
                .collect();
            stale
                .into_iter()
                .filter_map(|id| guard.remove(&id).map(|store| (id, store)))
                .collect()
        };
        let count = removed.len();
        for (id, store) in removed {
            let cleanups = store.lock().drain();
            debug!(component = %id, cleanups = cleanups.len(), "component unmounted");
            for cleanup in cleanups {
                cleanup();
            }
        }
        count
    }

    pub fn with_effect_slot<F, R>(&self, id: &ComponentId, slot_index: usize, f: F) -> R
    where
        F: FnOnce(&mut EffectHook) -> R,
    {
        let store = self.store_for(id);
        let mut guard = store.lock();
        let slot = guard.slot(slot_index);
        if !matches!(slot, HookSlot::Effect(_)) {
            if matches!(slot, HookSlot::Vacant) {
                *slot = HookSlot::Effect(EffectHook::default());
            } else {
                panic!("effect slot type mismatch");
            }
        }
        match slot {
            HookSlot::Effect(effect) => f(effect),
            _ => unreachable!(),
        }
    }
}

#[derive(Default)]
pub(crate) struct HookStore {
    slots: Vec<HookSlot>,
}

impl HookStore {
    pub(crate) fn slot(&mut self, index: usize) -> &mut HookSlot {
        while self.slots.len() <= index {
            self.slots.push(HookSlot::Vacant);
        }
        &mut self.slots[index]
    }

    /// Empties the store, handing back pending cleanups so they can run
    /// without the store locked.
    pub(crate) fn drain(&mut self) -> Vec<Cleanup> {
        let cleanups = self
            .slots
            .iter_mut()
            .filter_map(|slot| match slot {
                HookSlot::Effect(effect) => effect.take_cleanup(),
                _ => None,
            })
            .collect();
        self.slots.clear();
        cleanups
    }
}

#[derive(Default)]
pub(crate) enum HookSlot {
    #[default]
    Vacant,
    State(Box<AnySlot>),
    Effect(EffectHook),
    RefCell(Box<AnySlot>),
}

#[derive(Default)]
pub struct EffectHook {
    pub(crate) deps: Option<Box<AnySlot>>,
    cleanup: Option<Cleanup>,
}

impl EffectHook {
    pub(crate) fn take_cleanup(&mut self) -> Option<Cleanup> {
        self.cleanup.take()
    }

    pub(crate) fn set_cleanup(&mut self, cleanup: Option<Cleanup>) {
        self.cleanup = cleanup;
    }

    pub(crate) fn set_deps(&mut self, deps: Box<AnySlot>) {
        self.deps = Some(deps);
    }
}

pub struct EffectInvocation {
    pub component_id: ComponentId,
    pub slot_index: usize,
    pub deps: Box<AnySlot>,
    pub task: Box<dyn FnOnce(Dispatcher) -> Option<Cleanup> + Send + Sync>,
}
