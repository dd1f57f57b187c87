use std::sync::Arc;

use parking_lot::Mutex;

use crate::platform::Platform;
use crate::runtime::{ComponentId, Dispatcher};

use super::handles::{Latest, NodeRef, RefHandle, StateHandle};
use super::registry::{Cleanup, EffectHook, EffectInvocation, HookSlot, HookStore};

/// Per-render access to a component's hooks. Hooks must be called in the
/// same order on every render.
pub struct Scope {
    component_id: ComponentId,
    store: Arc<Mutex<HookStore>>,
    dispatcher: Dispatcher,
    platform: Platform,
    hook_cursor: usize,
    pending_effects: Vec<EffectInvocation>,
}

impl Scope {
    pub(crate) fn new(
        component_id: ComponentId,
        store: Arc<Mutex<HookStore>>,
        dispatcher: Dispatcher,
        platform: Platform,
    ) -> Self {
        Self {
            component_id,
            store,
            dispatcher,
            platform,
            hook_cursor: 0,
            pending_effects: Vec::new(),
        }
    }

    pub fn use_state<T, F>(&mut self, init: F) -> (T, StateHandle<T>)
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T,
    {
        let index = self.next_index();
        let shared = {
            let mut store = self.store.lock();
            let slot = store.slot(index);
            match slot {
                HookSlot::Vacant => {
                    let state = Arc::new(Mutex::new(init()));
                    *slot = HookSlot::State(Box::new(state.clone()));
                    state
                }
                HookSlot::State(existing) => existing
                    .downcast_ref::<Arc<Mutex<T>>>()
                    .expect("use_state hook order mismatch")
                    .clone(),
                _ => panic!("use_state hook order mismatch"),
            }
        };
        let value = shared.lock().clone();
        let handle = StateHandle::new(shared, self.dispatcher.clone());
        (value, handle)
    }

    /// Schedules `effect` to run after commit when `deps` differ from the
    /// previous run. The cleanup it returns runs before the next run and on
    /// unmount.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + Clone + Send + Sync + 'static,
        F: FnOnce(Dispatcher) -> Option<Cleanup> + Send + Sync + 'static,
    {
        let index = self.next_index();
        let should_run = {
            let mut store = self.store.lock();
            let slot = store.slot(index);
            match slot {
                HookSlot::Vacant => {
                    *slot = HookSlot::Effect(EffectHook::default());
                    true
                }
                HookSlot::Effect(effect_slot) => effect_slot
                    .deps
                    .as_ref()
                    .and_then(|value| value.downcast_ref::<D>())
                    .map(|existing| existing != &deps)
                    .unwrap_or(true),
                _ => panic!("use_effect hook order mismatch"),
            }
        };

        if should_run {
            self.pending_effects.push(EffectInvocation {
                component_id: self.component_id.clone(),
                slot_index: index,
                deps: Box::new(deps),
                task: Box::new(effect),
            });
        }
    }

    pub fn use_ref<T, Init>(&mut self, init: Init) -> RefHandle<T>
    where
        T: Send + 'static,
        Init: FnOnce() -> T,
    {
        let index = self.next_index();
        let shared = {
            let mut store = self.store.lock();
            let slot = store.slot(index);
            match slot {
                HookSlot::Vacant => {
                    let handle = Arc::new(Mutex::new(init()));
                    *slot = HookSlot::RefCell(Box::new(handle.clone()));
                    handle
                }
                HookSlot::RefCell(entry) => entry
                    .downcast_ref::<Arc<Mutex<T>>>()
                    .expect("use_ref hook order mismatch")
                    .clone(),
                _ => panic!("use_ref hook order mismatch"),
            }
        };
        RefHandle::new(shared)
    }

    /// A [`NodeRef`] that keeps its identity for the component's lifetime.
    pub fn use_node_ref(&mut self) -> NodeRef {
        self.use_ref(NodeRef::new).with(NodeRef::clone)
    }

    /// Stores `value` in a stable cell, overwriting what the previous render
    /// stored.
    pub fn use_latest<T>(&mut self, value: T) -> Latest<T>
    where
        T: Send + 'static,
    {
        let mut pending = Some(value);
        let cell = self.use_ref(|| pending.take().expect("initial value"));
        if let Some(value) = pending {
            cell.set(value);
        }
        Latest::new(cell)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn component_id(&self) -> &ComponentId {
        &self.component_id
    }

    pub(crate) fn take_effects(&mut self) -> Vec<EffectInvocation> {
        std::mem::take(&mut self.pending_effects)
    }

    fn next_index(&mut self) -> usize {
        let current = self.hook_cursor;
        self.hook_cursor += 1;
        current
    }
}
