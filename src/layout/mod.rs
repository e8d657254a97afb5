//! The layout protocol: measure on one axis, allocate a rectangle, and
//! propagate clips.

pub mod allocate;
pub mod measure;

pub use allocate::{allocations_contained, layout_toplevel, LayoutCtx, MeasureCtx};
pub use measure::{Measurement, Orientation, SizeRequestMode};
