//! Widget behavior: the `Widget` trait and the behavior store.
//!
//! The `Widget` trait is the core abstraction for all UI elements. The
//! tree owns structural data ([`crate::tree::WidgetData`]); behavior
//! lives in boxed `Widget` values keyed by [`WidgetId`] in a
//! [`WidgetStore`]. The trait is object-safe; downcasting goes through
//! `as_any`.

use std::any::Any;

use slotmap::SecondaryMap;

use crate::event::{Event, EventCtx, Handled};
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::geometry::Rect;
use crate::tree::WidgetId;

/// Core trait implemented by all widgets.
///
/// Object-safe: measure takes `&self`, allocate and event take `&mut
/// self` through the store's take/put discipline.
pub trait Widget {
    /// The CSS element name for this widget (e.g. `label`, `stack`).
    fn element(&self) -> &str;

    /// Default CSS for this widget type, applied at the fallback band.
    /// Returns an empty string if none.
    fn default_css(&self) -> &str {
        ""
    }

    /// How this widget prefers to be measured.
    fn request_mode(&self) -> SizeRequestMode {
        SizeRequestMode::ConstantSize
    }

    /// Measure one axis. With `for_size == -1` return the intrinsic
    /// sizes; otherwise assume the opposite axis is `for_size`.
    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement;

    /// Take the given rect (parent-relative), lay out children in local
    /// coordinates, and return the clip in the parent's frame.
    ///
    /// The default covers leaves: the clip is the allocation itself.
    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        baseline: i32,
    ) -> Rect {
        let _ = (ctx, id, baseline);
        rect
    }

    /// Handle an event in the target or bubble phase.
    fn event(&mut self, ctx: &mut EventCtx<'_>, id: WidgetId, event: &Event) -> Handled {
        let _ = (ctx, id, event);
        Handled::No
    }

    /// Handle an event in the capture phase (root towards target).
    fn captured_event(&mut self, ctx: &mut EventCtx<'_>, id: WidgetId, event: &Event) -> Handled {
        let _ = (ctx, id, event);
        Handled::No
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Maps widget ids to their boxed behavior.
///
/// `take`/`put` let a container's `allocate` borrow itself mutably while
/// the layout context holds the rest of the store.
#[derive(Default)]
pub struct WidgetStore {
    widgets: SecondaryMap<WidgetId, Box<dyn Widget>>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WidgetId, widget: Box<dyn Widget>) {
        self.widgets.insert(id, widget);
    }

    pub fn remove(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        self.widgets.remove(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets.get(id).map(Box::as_ref)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Box<dyn Widget>> {
        self.widgets.get_mut(id)
    }

    /// Temporarily remove a widget's behavior for a `&mut self` call.
    /// Pair with [`WidgetStore::put`].
    pub fn take(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        self.widgets.remove(id)
    }

    /// Return a taken widget to the store.
    pub fn put(&mut self, id: WidgetId, widget: Box<dyn Widget>) {
        self.widgets.insert(id, widget);
    }

    /// Downcast an immutable view of a concrete widget.
    pub fn downcast<W: Widget + 'static>(&self, id: WidgetId) -> Option<&W> {
        self.get(id)?.as_any().downcast_ref::<W>()
    }

    /// Downcast a mutable view of a concrete widget.
    pub fn downcast_mut<W: Widget + 'static>(&mut self, id: WidgetId) -> Option<&mut W> {
        self.get_mut(id)?.as_any_mut().downcast_mut::<W>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{WidgetData, WidgetTree};

    struct Fixed {
        width: i32,
        height: i32,
    }

    impl Widget for Fixed {
        fn element(&self) -> &str {
            "fixed"
        }

        fn measure(
            &self,
            _ctx: &MeasureCtx<'_>,
            _id: WidgetId,
            orientation: Orientation,
            _for_size: i32,
        ) -> Measurement {
            match orientation {
                Orientation::Horizontal => Measurement::new(self.width, self.width),
                Orientation::Vertical => Measurement::new(self.height, self.height),
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn store_take_put_round_trip() {
        let mut tree = WidgetTree::new();
        let id = tree.create(WidgetData::new("fixed"));
        let mut store = WidgetStore::new();
        store.insert(
            id,
            Box::new(Fixed {
                width: 10,
                height: 4,
            }),
        );
        assert!(store.contains(id));
        let taken = store.take(id).unwrap();
        assert!(!store.contains(id));
        store.put(id, taken);
        assert!(store.contains(id));
    }

    #[test]
    fn downcast_reaches_concrete_type() {
        let mut tree = WidgetTree::new();
        let id = tree.create(WidgetData::new("fixed"));
        let mut store = WidgetStore::new();
        store.insert(
            id,
            Box::new(Fixed {
                width: 10,
                height: 4,
            }),
        );
        assert_eq!(store.downcast::<Fixed>(id).unwrap().width, 10);
        store.downcast_mut::<Fixed>(id).unwrap().width = 12;
        assert_eq!(store.downcast::<Fixed>(id).unwrap().width, 12);
    }

    #[test]
    fn widget_is_object_safe() {
        let boxed: Box<dyn Widget> = Box::new(Fixed {
            width: 1,
            height: 1,
        });
        assert_eq!(boxed.element(), "fixed");
        assert_eq!(boxed.request_mode(), SizeRequestMode::ConstantSize);
    }
}
