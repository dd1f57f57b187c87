pub mod dom;
pub mod events;
pub mod hooks;
pub mod platform;
pub mod renderer;
pub mod runtime;

pub use dom::{Bounds, Document, NodeId};
pub use events::{
    ClickEvent, EventTarget, FrameworkEvent, click_position, is_ctrl_c, is_key, is_mouse_click,
    mouse_position, mouse_scroll_delta,
};
pub use hooks::{IntersectionConfig, Latest, NodeRef, RefHandle, Scope, StateHandle, TimeoutHandle};
pub use platform::{ManualClock, Platform, RootMargin};
pub use runtime::{
    App, AppConfig, ComponentElement, Dispatcher, Element, FlexDirection, Headless, NodeElement,
    component,
};
