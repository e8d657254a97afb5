//! Source-side drag site data.

use super::{DragAction, TargetList};

/// The icon shown under the pointer during a drag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragIcon {
    /// Backend-provided default drag icon.
    #[default]
    Default,
    /// Raster image data, identified by an opaque pixbuf handle.
    Pixbuf(u64),
    /// A named icon from the icon theme.
    Named(String),
    /// Theme lookup over fallback names, first hit wins.
    Themed(Vec<String>),
    /// An application-provided surface, identified by an opaque handle.
    Surface(u64),
}

/// A drag source attached to a widget.
#[derive(Debug, Clone)]
pub struct SourceSite {
    /// Pointer button that may start the drag; 0 accepts any.
    pub start_button: u32,
    /// Content types this source can provide, in preference order.
    pub targets: TargetList,
    /// Actions the source permits.
    pub actions: DragAction,
    pub icon: DragIcon,
}

impl SourceSite {
    /// Whether a press of `button` may begin a drag from this site.
    pub fn accepts_button(&self, button: u32) -> bool {
        self.start_button == 0 || self.start_button == button
    }
}
