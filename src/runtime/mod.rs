mod app;
mod component;
mod dispatcher;
mod element;
mod headless;
mod reconciler;
mod tasks;
#[cfg(test)]
mod tests;

pub use ratatui::style::Color;

pub use crate::dom::FlexDirection;
pub use app::{App, AppConfig, EVENT_BUFFER_ENV, TICK_RATE_ENV};
pub use component::{ComponentElement, ComponentFn, ComponentId, component};
pub use dispatcher::{AppMessage, Dispatcher};
pub use element::{Element, NodeElement, TextNode};
pub use headless::Headless;
pub use reconciler::RenderPass;
pub use tasks::{DefaultRuntimeDriver, RuntimeDriver};
