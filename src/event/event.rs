//! The event union and its payloads.

use bitflags::bitflags;

use crate::backend::{DeviceId, SurfaceId};
use crate::geometry::{Point, Size};

bitflags! {
    /// Keyboard and pointer-button modifier state carried by input events.
    pub struct Modifiers: u16 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
    }
}

/// Why a crossing (enter/leave) event was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingMode {
    /// Real pointer motion.
    Normal,
    /// Synthesized when a grab was installed.
    Grab,
    /// Synthesized when a grab was released.
    Ungrab,
}

/// Where the pointer went relative to the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDetail {
    /// Entered/left the widget itself.
    Normal,
    /// Crossed into/out of a descendant.
    Inferior,
}

/// Whether an event handler consumed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

impl Handled {
    pub fn is_handled(self) -> bool {
        self == Handled::Yes
    }
}

/// Drag-and-drop actions a drag may perform.
pub use crate::dnd::DragAction;

/// An input or lifecycle event delivered by the backend.
///
/// Coordinates are in the delivering surface's frame until target lookup
/// translates them.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PointerMotion {
        surface: SurfaceId,
        position: Point,
        state: Modifiers,
        device: DeviceId,
    },
    ButtonPress {
        surface: SurfaceId,
        position: Point,
        button: u32,
        state: Modifiers,
        device: DeviceId,
    },
    ButtonRelease {
        surface: SurfaceId,
        position: Point,
        button: u32,
        state: Modifiers,
        device: DeviceId,
    },
    TouchBegin {
        surface: SurfaceId,
        position: Point,
        sequence: u32,
        device: DeviceId,
    },
    TouchUpdate {
        surface: SurfaceId,
        position: Point,
        sequence: u32,
        device: DeviceId,
    },
    TouchEnd {
        surface: SurfaceId,
        position: Point,
        sequence: u32,
        device: DeviceId,
    },
    TouchCancel {
        surface: SurfaceId,
        sequence: u32,
        device: DeviceId,
    },
    TouchpadPinch {
        surface: SurfaceId,
        position: Point,
        scale: f64,
        device: DeviceId,
    },
    TouchpadSwipe {
        surface: SurfaceId,
        position: Point,
        delta_x: f64,
        delta_y: f64,
        device: DeviceId,
    },
    Scroll {
        surface: SurfaceId,
        position: Point,
        delta_x: f64,
        delta_y: f64,
        state: Modifiers,
        device: DeviceId,
    },
    KeyPress {
        surface: SurfaceId,
        keyval: u32,
        state: Modifiers,
        device: DeviceId,
    },
    KeyRelease {
        surface: SurfaceId,
        keyval: u32,
        state: Modifiers,
        device: DeviceId,
    },
    FocusChange {
        surface: SurfaceId,
        focus_in: bool,
    },
    Enter {
        surface: SurfaceId,
        position: Point,
        mode: CrossingMode,
        detail: CrossingDetail,
        device: DeviceId,
    },
    Leave {
        surface: SurfaceId,
        position: Point,
        mode: CrossingMode,
        detail: CrossingDetail,
        device: DeviceId,
    },
    DragEnter {
        surface: SurfaceId,
        position: Point,
    },
    DragLeave {
        surface: SurfaceId,
    },
    DragMotion {
        surface: SurfaceId,
        position: Point,
        state: Modifiers,
    },
    Drop {
        surface: SurfaceId,
        position: Point,
    },
    DragStatus {
        surface: SurfaceId,
        action: Option<DragAction>,
    },
    DragFinished {
        surface: SurfaceId,
        success: bool,
    },
    Configure {
        surface: SurfaceId,
        size: Size,
    },
    Destroy {
        surface: SurfaceId,
    },
    GrabBroken {
        surface: SurfaceId,
        device: DeviceId,
    },
}

impl Event {
    /// The delivering surface.
    pub fn surface(&self) -> SurfaceId {
        match self {
            Event::PointerMotion { surface, .. }
            | Event::ButtonPress { surface, .. }
            | Event::ButtonRelease { surface, .. }
            | Event::TouchBegin { surface, .. }
            | Event::TouchUpdate { surface, .. }
            | Event::TouchEnd { surface, .. }
            | Event::TouchCancel { surface, .. }
            | Event::TouchpadPinch { surface, .. }
            | Event::TouchpadSwipe { surface, .. }
            | Event::Scroll { surface, .. }
            | Event::KeyPress { surface, .. }
            | Event::KeyRelease { surface, .. }
            | Event::FocusChange { surface, .. }
            | Event::Enter { surface, .. }
            | Event::Leave { surface, .. }
            | Event::DragEnter { surface, .. }
            | Event::DragLeave { surface }
            | Event::DragMotion { surface, .. }
            | Event::Drop { surface, .. }
            | Event::DragStatus { surface, .. }
            | Event::DragFinished { surface, .. }
            | Event::Configure { surface, .. }
            | Event::Destroy { surface }
            | Event::GrabBroken { surface, .. } => *surface,
        }
    }

    /// The event position, for events that carry one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::PointerMotion { position, .. }
            | Event::ButtonPress { position, .. }
            | Event::ButtonRelease { position, .. }
            | Event::TouchBegin { position, .. }
            | Event::TouchUpdate { position, .. }
            | Event::TouchEnd { position, .. }
            | Event::TouchpadPinch { position, .. }
            | Event::TouchpadSwipe { position, .. }
            | Event::Scroll { position, .. }
            | Event::Enter { position, .. }
            | Event::Leave { position, .. }
            | Event::DragEnter { position, .. }
            | Event::DragMotion { position, .. }
            | Event::Drop { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Shift the carried position (used when translating into a widget's
    /// local frame).
    pub fn translated(&self, dx: f64, dy: f64) -> Event {
        let mut event = self.clone();
        match &mut event {
            Event::PointerMotion { position, .. }
            | Event::ButtonPress { position, .. }
            | Event::ButtonRelease { position, .. }
            | Event::TouchBegin { position, .. }
            | Event::TouchUpdate { position, .. }
            | Event::TouchEnd { position, .. }
            | Event::TouchpadPinch { position, .. }
            | Event::TouchpadSwipe { position, .. }
            | Event::Scroll { position, .. }
            | Event::Enter { position, .. }
            | Event::Leave { position, .. }
            | Event::DragEnter { position, .. }
            | Event::DragMotion { position, .. }
            | Event::Drop { position, .. } => {
                position.x += dx;
                position.y += dy;
            }
            _ => {}
        }
        event
    }

    /// The originating device, for input events.
    pub fn device(&self) -> Option<DeviceId> {
        match self {
            Event::PointerMotion { device, .. }
            | Event::ButtonPress { device, .. }
            | Event::ButtonRelease { device, .. }
            | Event::TouchBegin { device, .. }
            | Event::TouchUpdate { device, .. }
            | Event::TouchEnd { device, .. }
            | Event::TouchCancel { device, .. }
            | Event::TouchpadPinch { device, .. }
            | Event::TouchpadSwipe { device, .. }
            | Event::Scroll { device, .. }
            | Event::KeyPress { device, .. }
            | Event::KeyRelease { device, .. }
            | Event::Enter { device, .. }
            | Event::Leave { device, .. }
            | Event::GrabBroken { device, .. } => Some(*device),
            _ => None,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Event::KeyPress { .. } | Event::KeyRelease { .. })
    }

    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            Event::TouchBegin { .. }
                | Event::TouchUpdate { .. }
                | Event::TouchEnd { .. }
                | Event::TouchCancel { .. }
        )
    }

    pub fn is_drag(&self) -> bool {
        matches!(
            self,
            Event::DragEnter { .. }
                | Event::DragLeave { .. }
                | Event::DragMotion { .. }
                | Event::Drop { .. }
                | Event::DragStatus { .. }
                | Event::DragFinished { .. }
        )
    }

    /// Events that still reach the event widget when a toolkit grab is
    /// active: lifecycle and focus notifications, plus drags which are
    /// never redirected.
    pub fn exempt_from_grab(&self) -> bool {
        self.is_drag()
            || matches!(
                self,
                Event::Destroy { .. } | Event::FocusChange { .. } | Event::Configure { .. }
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::Key;

    fn surface() -> SurfaceId {
        SurfaceId::null()
    }

    #[test]
    fn position_translation() {
        let event = Event::ButtonPress {
            surface: surface(),
            position: Point::new(10.0, 20.0),
            button: 1,
            state: Modifiers::empty(),
            device: DeviceId::CORE_POINTER,
        };
        let moved = event.translated(-3.0, -5.0);
        assert_eq!(moved.position(), Some(Point::new(7.0, 15.0)));
        // The original is untouched.
        assert_eq!(event.position(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn keys_have_no_position() {
        let event = Event::KeyPress {
            surface: surface(),
            keyval: 0x61,
            state: Modifiers::empty(),
            device: DeviceId::CORE_KEYBOARD,
        };
        assert!(event.is_key());
        assert_eq!(event.position(), None);
        assert_eq!(event.device(), Some(DeviceId::CORE_KEYBOARD));
    }

    #[test]
    fn grab_exemptions() {
        assert!(Event::Destroy { surface: surface() }.exempt_from_grab());
        assert!(Event::DragLeave { surface: surface() }.exempt_from_grab());
        let motion = Event::PointerMotion {
            surface: surface(),
            position: Point::new(0.0, 0.0),
            state: Modifiers::empty(),
            device: DeviceId::CORE_POINTER,
        };
        assert!(!motion.exempt_from_grab());
    }

    #[test]
    fn touch_classification() {
        let touch = Event::TouchBegin {
            surface: surface(),
            position: Point::new(0.0, 0.0),
            sequence: 1,
            device: DeviceId(5),
        };
        assert!(touch.is_touch());
        assert!(!touch.is_drag());
    }
}
