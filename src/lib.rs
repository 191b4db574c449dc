pub mod data;
pub mod layout;
pub mod logging;
pub mod overlay;
pub mod server;
pub mod settings;

pub use layout::{FontWeight, LayoutRequest, LayoutResult, layout_text};
pub use overlay::{Align, ComposeRequest, OverlayStyle, compose};
