//! Linear box container.

use std::any::Any;

use crate::geometry::Rect;
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::tree::WidgetId;
use crate::widget::Widget;

/// Packs children along one axis with optional spacing.
///
/// Homogeneous boxes give every visible child the same share; otherwise
/// children get their natural size and any surplus goes to the last
/// expanding region (this container keeps it simple and pins children to
/// their natural main-axis size).
pub struct BoxContainer {
    orientation: Orientation,
    spacing: i32,
    homogeneous: bool,
}

impl BoxContainer {
    pub fn new(orientation: Orientation, spacing: i32) -> Self {
        Self {
            orientation,
            spacing,
            homogeneous: false,
        }
    }

    pub fn homogeneous(mut self) -> Self {
        self.homogeneous = true;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous
    }

    fn visible_children(&self, ctx: &MeasureCtx<'_>, id: WidgetId) -> Vec<WidgetId> {
        ctx.tree
            .children(id)
            .iter()
            .copied()
            .filter(|&c| ctx.tree.get(c).is_some_and(|d| d.visible))
            .collect()
    }
}

impl Widget for BoxContainer {
    fn element(&self) -> &str {
        "box"
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
        let children = self.visible_children(ctx, id);
        if children.is_empty() {
            return Measurement::ZERO;
        }
        let main_axis = orientation == self.orientation;
        let mut result = Measurement::ZERO;
        for &child in &children {
            let m = ctx.measure(child, orientation, for_size);
            result = if main_axis {
                if self.homogeneous {
                    result.max(m)
                } else {
                    result.add(m)
                }
            } else {
                result.max(m)
            };
        }
        if main_axis {
            if self.homogeneous {
                let count = children.len() as i32;
                result = Measurement::new(result.minimum * count, result.natural * count);
            }
            let gaps = self.spacing * (children.len() as i32 - 1);
            result = result.expand(gaps);
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
        let children: Vec<WidgetId> = {
            let mctx = ctx.measure_ctx();
            self.visible_children(&mctx, id)
        };
        if children.is_empty() {
            return rect;
        }

        let total_main = match self.orientation {
            Orientation::Horizontal => rect.width,
            Orientation::Vertical => rect.height,
        };
        let gaps = self.spacing * (children.len() as i32 - 1);
        let available = (total_main - gaps).max(0);

        // Main-axis extents per child.
        let sizes: Vec<i32> = if self.homogeneous {
            let share = available / children.len() as i32;
            vec![share; children.len()]
        } else {
            let cross = match self.orientation {
                Orientation::Horizontal => rect.height,
                Orientation::Vertical => rect.width,
            };
            children
                .iter()
                .map(|&c| {
                    ctx.measure_ctx()
                        .measure(c, self.orientation, cross)
                        .natural
                })
                .collect()
        };

        let mut offset = 0;
        for (&child, &size) in children.iter().zip(&sizes) {
            let child_rect = match self.orientation {
                Orientation::Horizontal => Rect::new(offset, 0, size, rect.height),
                Orientation::Vertical => Rect::new(0, offset, rect.width, size),
            };
            ctx.allocate_child(child, child_rect, -1);
            offset += size + self.spacing;
        }
        ctx.clip_with_children(id, rect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
