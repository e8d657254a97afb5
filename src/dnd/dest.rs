//! Destination-side drop site data.

use bitflags::bitflags;

use super::{DragAction, TargetList};

bitflags! {
    /// Default behaviors a destination opts into.
    pub struct DestDefaults: u8 {
        /// Answer drag-motion with action negotiation.
        const MOTION = 1 << 0;
        /// Show the drop-active highlight while a compatible drag hovers.
        const HIGHLIGHT = 1 << 1;
        /// Accept drops and request the data.
        const DROP = 1 << 2;
    }
}

/// A drop destination attached to a widget.
#[derive(Debug, Clone)]
pub struct DestSite {
    pub flags: DestDefaults,
    /// Content types this destination accepts.
    pub targets: TargetList,
    /// Actions the destination permits.
    pub actions: DragAction,
    /// Report motion even when no target matches.
    pub track_motion: bool,
    /// Whether the drop-active highlight is currently shown.
    pub highlighted: bool,
}
