use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, trace};

use crate::dom::{NodeKind, NodeSpec};
use crate::hooks::{EffectInvocation, HookRegistry, NodeRef, Scope};
use crate::platform::Platform;

use super::component::{ComponentElement, ComponentId};
use super::dispatcher::Dispatcher;
use super::element::Element;

/// What one render pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderPass {
    pub components: usize,
    pub effects: usize,
    pub nodes_removed: usize,
    pub refs_changed: bool,
    pub notifications: usize,
}

struct Binding {
    key: String,
    node_ref: NodeRef,
}

#[derive(Default)]
struct PassState {
    live: HashSet<ComponentId>,
    effects: Vec<EffectInvocation>,
    bindings: Vec<Binding>,
}

/// Renders the component tree into the platform document and drives the
/// hook lifecycle: commit, ref attachment, unmount cleanups, then effects.
pub(crate) struct Reconciler {
    root: ComponentElement,
    hooks: Arc<HookRegistry>,
    platform: Platform,
    dispatcher: Dispatcher,
    bound: Vec<NodeRef>,
}

impl Reconciler {
    pub(crate) fn new(root: ComponentElement, platform: Platform, dispatcher: Dispatcher) -> Self {
        Self {
            root,
            hooks: Arc::new(HookRegistry::new()),
            platform,
            dispatcher,
            bound: Vec::new(),
        }
    }

    pub(crate) fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub(crate) fn render(&mut self) -> Result<RenderPass> {
        let mut state = PassState::default();
        let mut path = vec![0usize];
        let specs = self.render_element(Element::from(self.root.clone()), &mut path, &mut state);

        let summary = self.platform.commit(specs);
        let refs_changed = self.attach_refs(&state.bindings);
        self.hooks.prune(&state.live);

        let effects = state.effects.len();
        self.run_effects(state.effects);
        let notifications = self.platform.evaluate_intersections();

        if refs_changed {
            trace!("node refs changed, scheduling another pass");
            self.dispatcher.request_render();
        }
        let pass = RenderPass {
            components: state.live.len(),
            effects,
            nodes_removed: summary.removed.len(),
            refs_changed,
            notifications,
        };
        trace!(?pass, "render pass completed");
        Ok(pass)
    }

    /// Tears down every component, running all cleanups, and empties the
    /// document.
    pub(crate) fn unmount(&mut self) {
        let removed = self.hooks.prune(&HashSet::new());
        for node_ref in self.bound.drain(..) {
            node_ref.set(None);
        }
        let summary = self.platform.commit(Vec::new());
        debug!(
            components = removed,
            nodes = summary.removed.len(),
            "tree unmounted"
        );
    }

    fn attach_refs(&mut self, bindings: &[Binding]) -> bool {
        let mut changed = false;
        let current: Vec<NodeRef> = {
            let document = self.platform.document();
            bindings
                .iter()
                .map(|binding| {
                    changed |= binding.node_ref.set(document.node_for_key(&binding.key));
                    binding.node_ref.clone()
                })
                .collect()
        };
        for stale in self.bound.iter().filter(|old| !current.contains(old)) {
            changed |= stale.set(None);
        }
        self.bound = current;
        changed
    }

    fn run_effects(&self, effects: Vec<EffectInvocation>) {
        for effect in effects {
            let EffectInvocation {
                component_id,
                slot_index,
                deps,
                task,
            } = effect;
            let previous = self
                .hooks
                .with_effect_slot(&component_id, slot_index, |slot| slot.take_cleanup());
            if let Some(cleanup) = previous {
                trace!(component = %component_id, slot_index, "running effect cleanup");
                cleanup();
            }
            trace!(component = %component_id, slot_index, "invoking effect task");
            let cleanup = task(self.dispatcher.clone());
            self.hooks
                .with_effect_slot(&component_id, slot_index, |slot| {
                    slot.set_deps(deps);
                    slot.set_cleanup(cleanup);
                });
        }
    }

    fn render_element(
        &self,
        element: Element,
        path: &mut Vec<usize>,
        state: &mut PassState,
    ) -> Vec<NodeSpec> {
        match element {
            Element::Empty => Vec::new(),
            Element::Text(node) => vec![NodeSpec {
                key: path_key(path),
                kind: NodeKind::Text(node.content),
                children: Vec::new(),
            }],
            Element::Node(node) => {
                let key = path_key(path);
                if let Some(node_ref) = node.binding {
                    state.bindings.push(Binding {
                        key: key.clone(),
                        node_ref,
                    });
                }
                let children = self.render_children(node.children, path, state);
                vec![NodeSpec {
                    key,
                    kind: NodeKind::Element(node.data),
                    children,
                }]
            }
            Element::Fragment(children) => self.render_children(children, path, state),
            Element::Component(component) => self.render_component(component, path, state),
        }
    }

    fn render_children(
        &self,
        children: Vec<Element>,
        path: &mut Vec<usize>,
        state: &mut PassState,
    ) -> Vec<NodeSpec> {
        let mut specs = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            path.push(index);
            specs.extend(self.render_element(child, path, state));
            path.pop();
        }
        specs
    }

    fn render_component(
        &self,
        component: ComponentElement,
        path: &mut Vec<usize>,
        state: &mut PassState,
    ) -> Vec<NodeSpec> {
        let id = ComponentId::new(path, component.name, component.key.as_deref());
        state.live.insert(id.clone());
        let store = self.hooks.store_for(&id);
        let mut scope = Scope::new(
            id,
            store,
            self.dispatcher.clone(),
            self.platform.clone(),
        );
        let child = (component.render)(&mut scope);
        state.effects.extend(scope.take_effects());
        self.render_element(child, path, state)
    }
}

fn path_key(path: &[usize]) -> String {
    path.iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
