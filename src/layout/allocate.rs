//! Layout contexts: measurement (shared) and allocation (take/put).
//!
//! `MeasureCtx` borrows everything immutably; measure recursion is plain
//! `&self` calls. `AllocateCtx` holds the tree and store mutably; a
//! container's `allocate` runs with its own behavior temporarily taken
//! out of the store so it can allocate children through the context.

use crate::backend::FontMetrics;
use crate::geometry::Rect;
use crate::style::{ComputedStyle, PropertyId, StyleTree};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::WidgetStore;

use super::measure::{Measurement, Orientation, SizeRequestMode};

/// Immutable context for size negotiation.
pub struct MeasureCtx<'a> {
    pub tree: &'a WidgetTree,
    pub store: &'a WidgetStore,
    pub styles: &'a StyleTree,
    pub fonts: &'a dyn FontMetrics,
}

impl<'a> MeasureCtx<'a> {
    /// The computed style of a widget, if its style node is validated.
    pub fn style(&self, id: WidgetId) -> Option<&ComputedStyle> {
        let node = self.tree.get(id)?.style_node?;
        self.styles.get(node)?.computed.as_ref()
    }

    /// The computed font size for a widget, with the engine default when
    /// unstyled.
    pub fn font_size(&self, id: WidgetId) -> f64 {
        self.style(id).map(|s| s.font_size()).unwrap_or(14.0)
    }

    fn style_px(&self, id: WidgetId, property: PropertyId) -> i32 {
        self.style(id)
            .and_then(|s| s.get(property).as_px())
            .map(|v| v.round() as i32)
            .unwrap_or(0)
    }

    /// CSS min-size floor along an axis.
    pub fn css_min(&self, id: WidgetId, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.style_px(id, PropertyId::MinWidth),
            Orientation::Vertical => self.style_px(id, PropertyId::MinHeight),
        }
    }

    /// Sum of both margins along an axis.
    pub fn margins(&self, id: WidgetId, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => {
                self.style_px(id, PropertyId::MarginLeft)
                    + self.style_px(id, PropertyId::MarginRight)
            }
            Orientation::Vertical => {
                self.style_px(id, PropertyId::MarginTop)
                    + self.style_px(id, PropertyId::MarginBottom)
            }
        }
    }

    /// Measure a widget along an axis, applying the CSS min-size floor
    /// and margins. Invisible or behavior-less widgets measure zero.
    pub fn measure(&self, id: WidgetId, orientation: Orientation, for_size: i32) -> Measurement {
        if !self.tree.get(id).is_some_and(|d| d.visible) {
            return Measurement::ZERO;
        }
        let Some(widget) = self.store.get(id) else {
            return Measurement::ZERO;
        };
        // The widget itself is measured for the space inside its margins.
        let for_size = if for_size >= 0 {
            (for_size - self.margins(id, orientation.opposite())).max(0)
        } else {
            for_size
        };
        widget
            .measure(self, id, orientation, for_size)
            .clamp_min(self.css_min(id, orientation))
            .expand(self.margins(id, orientation))
    }

    /// Minimum and natural size on both axes, honoring the widget's
    /// request mode.
    pub fn preferred_size(&self, id: WidgetId) -> (crate::geometry::Size, crate::geometry::Size) {
        use crate::geometry::Size;
        let mode = self
            .store
            .get(id)
            .map(|w| w.request_mode())
            .unwrap_or_default();
        match mode {
            SizeRequestMode::HeightForWidth | SizeRequestMode::ConstantSize => {
                let width = self.measure(id, Orientation::Horizontal, -1);
                let for_min = if mode == SizeRequestMode::ConstantSize {
                    -1
                } else {
                    width.minimum
                };
                let for_nat = if mode == SizeRequestMode::ConstantSize {
                    -1
                } else {
                    width.natural
                };
                let height_min = self.measure(id, Orientation::Vertical, for_min);
                let height_nat = self.measure(id, Orientation::Vertical, for_nat);
                (
                    Size::new(width.minimum, height_min.minimum),
                    Size::new(width.natural, height_nat.natural),
                )
            }
            SizeRequestMode::WidthForHeight => {
                let height = self.measure(id, Orientation::Vertical, -1);
                let width_min = self.measure(id, Orientation::Horizontal, height.minimum);
                let width_nat = self.measure(id, Orientation::Horizontal, height.natural);
                (
                    Size::new(width_min.minimum, height.minimum),
                    Size::new(width_nat.natural, height.natural),
                )
            }
        }
    }
}

/// Mutable context for the allocate pass.
pub struct LayoutCtx<'a> {
    pub tree: &'a mut WidgetTree,
    pub store: &'a mut WidgetStore,
    pub styles: &'a StyleTree,
    pub fonts: &'a dyn FontMetrics,
}

impl<'a> LayoutCtx<'a> {
    /// A measurement view over the same state.
    pub fn measure_ctx(&self) -> MeasureCtx<'_> {
        MeasureCtx {
            tree: self.tree,
            store: self.store,
            styles: self.styles,
            fonts: self.fonts,
        }
    }

    /// Allocate `rect` (in the caller's frame) to a widget.
    ///
    /// Margins are carved off the rect first; the widget's behavior is
    /// taken out of the store for the `&mut self` call and put back
    /// after. Stores allocation and clip on the widget and returns the
    /// clip in the caller's frame.
    pub fn allocate_child(&mut self, id: WidgetId, rect: Rect, baseline: i32) -> Rect {
        if !self.tree.get(id).is_some_and(|d| d.visible) {
            return Rect::zero();
        }

        let content = self.shrink_by_margins(id, rect);
        if let Some(data) = self.tree.get_mut(id) {
            data.allocation = content;
        }

        let clip = match self.store.take(id) {
            Some(mut widget) => {
                let clip = widget.allocate(self, id, content, baseline);
                self.store.put(id, widget);
                clip.union(&content)
            }
            None => content,
        };

        if let Some(data) = self.tree.get_mut(id) {
            data.clip = clip;
        }
        clip
    }

    /// The clip a container reports: its own rect plus all child clips
    /// translated from the container-local frame into `rect`'s frame.
    pub fn clip_with_children(&self, id: WidgetId, rect: Rect) -> Rect {
        let mut clip = rect;
        for &child in self.tree.children(id) {
            let child_clip = self
                .tree
                .get(child)
                .map(|d| d.clip)
                .unwrap_or_else(Rect::zero);
            clip = clip.union(&child_clip.translate(rect.x, rect.y));
        }
        clip
    }

    fn shrink_by_margins(&self, id: WidgetId, rect: Rect) -> Rect {
        let ctx = MeasureCtx {
            tree: self.tree,
            store: self.store,
            styles: self.styles,
            fonts: self.fonts,
        };
        let left = ctx.style_px(id, PropertyId::MarginLeft);
        let right = ctx.style_px(id, PropertyId::MarginRight);
        let top = ctx.style_px(id, PropertyId::MarginTop);
        let bottom = ctx.style_px(id, PropertyId::MarginBottom);
        Rect::new(
            rect.x + left,
            rect.y + top,
            (rect.width - left - right).max(0),
            (rect.height - top - bottom).max(0),
        )
    }
}

/// Run a full allocate pass on a toplevel at the given size.
pub fn layout_toplevel(ctx: &mut LayoutCtx<'_>, root: WidgetId, size: crate::geometry::Size) {
    ctx.allocate_child(root, Rect::new(0, 0, size.width, size.height), -1);
}

/// Check the containment invariant: every visible child's allocation
/// (parent-relative) lies inside its parent's extent.
pub fn allocations_contained(tree: &WidgetTree, root: WidgetId) -> bool {
    tree.walk_depth_first(root).into_iter().all(|id| {
        let Some(parent) = tree.parent(id) else {
            return true;
        };
        let (Some(data), Some(parent_data)) = (tree.get(id), tree.get(parent)) else {
            return true;
        };
        if !data.visible || data.allocation.is_empty() {
            return true;
        }
        let parent_extent = Rect::new(
            0,
            0,
            parent_data.allocation.width,
            parent_data.allocation.height,
        );
        parent_extent.contains_rect(&data.allocation)
    })
}
