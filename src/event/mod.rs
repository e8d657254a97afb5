//! Input events: the event union, toolkit grabs, controllers and
//! gestures, tooltips, and the dispatch pipeline.

pub mod dispatch;
#[allow(clippy::module_inception)]
pub mod event;
pub mod gesture;
pub mod grab;
pub mod tooltip;

pub use dispatch::{DispatchOutcome, Dispatcher, EventCtx, KeySnooper};
pub use event::{CrossingDetail, CrossingMode, Event, Handled, Modifiers};
pub use gesture::{
    ControllerSet, DragEvent, EventController, GestureDrag, Phase, SequenceState, DRAG_THRESHOLD,
};
pub use grab::{DeviceGrab, GrabNotify, WindowGroup};
pub use tooltip::{
    ShownTooltip, TooltipManager, BROWSE_DISABLE_TIMEOUT, BROWSE_TIMEOUT, HOVER_TIMEOUT,
};
