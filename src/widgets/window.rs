//! Toplevel window widget.

use std::any::Any;

use crate::geometry::{Rect, Size};
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::tree::{WidgetData, WidgetId, WidgetTree};
use crate::widget::{Widget, WidgetStore};

/// A toplevel: owns a backing surface once realized, fills itself with
/// its single content child.
pub struct Window {
    title: String,
    default_size: Size,
}

impl Window {
    /// Build a window widget. Like all widgets it starts hidden; showing
    /// it is the application's job.
    pub fn create(tree: &mut WidgetTree, store: &mut WidgetStore, title: &str) -> WidgetId {
        let id = tree.create(WidgetData::new("window"));
        store.insert(
            id,
            Box::new(Window {
                title: title.to_owned(),
                default_size: Size::new(640, 480),
            }),
        );
        id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn default_size(&self) -> Size {
        self.default_size
    }

    pub fn set_default_size(&mut self, size: Size) {
        self.default_size = size;
    }
}

impl Widget for Window {
    fn element(&self) -> &str {
        "window"
    }

    fn default_css(&self) -> &str {
        "window { background-color: #fafafa; color: #2e3436; }"
    }

    fn request_mode(&self) -> SizeRequestMode {
        SizeRequestMode::HeightForWidth
    }

    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement {
        let mut result = Measurement::ZERO;
        for &child in ctx.tree.children(id) {
            result = result.max(ctx.measure(child, orientation, for_size));
        }
        result
    }

    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        _baseline: i32,
    ) -> Rect {
        let children: Vec<WidgetId> = ctx.tree.children(id).to_vec();
        for child in children {
            ctx.allocate_child(child, Rect::new(0, 0, rect.width, rect.height), -1);
        }
        rect
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
