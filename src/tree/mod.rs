//! Widget tree: identity, per-widget data, hierarchy and lifecycle,
//! toplevel window list.

pub mod node;
pub mod tree;
pub mod windows;

pub use node::{Direction, WidgetData, WidgetId};
pub use tree::WidgetTree;
pub use windows::WindowList;
