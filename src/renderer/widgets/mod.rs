mod block;
mod text;

pub use block::render_element;
pub use text::render_text;
