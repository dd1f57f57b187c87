mod click_outside;
mod handles;
mod intersection;
mod registry;
mod scope;
mod timeout;
#[cfg(test)]
mod tests;

pub use click_outside::ClickCallback;
pub use handles::{Latest, NodeRef, RefHandle, StateHandle};
pub use intersection::{IntersectionConfig, VisibilityCallback};
pub use registry::{Cleanup, EffectHook, EffectInvocation, HookRegistry};
pub use scope::Scope;
pub use timeout::{TimeoutCallback, TimeoutHandle};
