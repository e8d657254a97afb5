//! Action bar: a bottom toolbar with start/center/end packing and an
//! animated reveal.

use std::any::Any;

use crate::backend::FrameClock;
use crate::diag::TkError;
use crate::geometry::Rect;
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::tree::{WidgetData, WidgetId, WidgetTree};
use crate::widget::{Widget, WidgetStore};
use crate::widgets::revealer::Revealer;

/// Packs start children from the left, end children from the right, and
/// centers the center child against the full width (shifted only when
/// the sides would overlap it).
pub struct CenterBox {
    spacing: i32,
    start: Vec<WidgetId>,
    end: Vec<WidgetId>,
    center: Option<WidgetId>,
}

impl CenterBox {
    pub fn new(spacing: i32) -> Self {
        Self {
            spacing,
            start: Vec::new(),
            end: Vec::new(),
            center: None,
        }
    }

    fn side_width(&self, ctx: &MeasureCtx<'_>, children: &[WidgetId], height: i32) -> i32 {
        let mut width = 0;
        for &child in children {
            let m = ctx.measure(child, Orientation::Horizontal, height);
            if m.natural > 0 {
                width += m.natural + self.spacing;
            }
        }
        width
    }
}

impl Widget for CenterBox {
    fn element(&self) -> &str {
        "box"
    }

    fn request_mode(&self) -> SizeRequestMode {
        SizeRequestMode::HeightForWidth
    }

    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        _id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement {
        match orientation {
            Orientation::Horizontal => {
                let start = self.side_width(ctx, &self.start, for_size);
                let end = self.side_width(ctx, &self.end, for_size);
                let center = self
                    .center
                    .map(|c| ctx.measure(c, Orientation::Horizontal, for_size).natural)
                    .unwrap_or(0);
                // Centering against the full width needs symmetric room
                // for the wider side.
                let sides = start.max(end) * 2;
                Measurement::new(start + end + center, sides + center)
            }
            Orientation::Vertical => {
                let mut result = Measurement::ZERO;
                for &child in self.start.iter().chain(&self.end).chain(&self.center) {
                    result = result.max(ctx.measure(child, Orientation::Vertical, for_size));
                }
                result
            }
        }
    }

    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        _baseline: i32,
    ) -> Rect {
        let mut x = 0;
        for &child in &self.start {
            let width = ctx
                .measure_ctx()
                .measure(child, Orientation::Horizontal, rect.height)
                .natural;
            if width == 0 {
                continue;
            }
            ctx.allocate_child(child, Rect::new(x, 0, width, rect.height), -1);
            x += width + self.spacing;
        }
        let start_edge = x;

        let mut right = rect.width;
        for &child in &self.end {
            let width = ctx
                .measure_ctx()
                .measure(child, Orientation::Horizontal, rect.height)
                .natural;
            if width == 0 {
                continue;
            }
            right -= width;
            ctx.allocate_child(child, Rect::new(right, 0, width, rect.height), -1);
            right -= self.spacing;
        }
        let end_edge = right;

        if let Some(center) = self.center {
            let width = ctx
                .measure_ctx()
                .measure(center, Orientation::Horizontal, rect.height)
                .natural;
            // Centered on the full bar, nudged inward when a side
            // intrudes.
            let mut cx = (rect.width - width) / 2;
            cx = cx.max(start_edge).min(end_edge - width).max(start_edge);
            ctx.allocate_child(center, Rect::new(cx, 0, width, rect.height), -1);
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

/// The action bar proper: an internal revealer wrapping an internal
/// center box. Public children route into the box; `foreach` without
/// internals hides the plumbing.
pub struct ActionBar {
    revealer: WidgetId,
    center_box: WidgetId,
}

impl ActionBar {
    /// Build an action bar with its internal widgets. Revealed by
    /// default.
    pub fn create(tree: &mut WidgetTree, store: &mut WidgetStore) -> WidgetId {
        let bar = tree.create(WidgetData::new("actionbar").visible(true));
        let revealer = tree.create(WidgetData::new("revealer").visible(true).internal());
        let center_box = tree.create(WidgetData::new("box").visible(true).internal());
        tree.add(bar, revealer).expect("fresh widgets");
        tree.add(revealer, center_box).expect("fresh widgets");

        store.insert(revealer, Box::new(Revealer::new_revealed()));
        store.insert(center_box, Box::new(CenterBox::new(6)));
        store.insert(
            bar,
            Box::new(ActionBar {
                revealer,
                center_box,
            }),
        );
        bar
    }

    pub fn revealer_id(&self) -> WidgetId {
        self.revealer
    }

    pub fn center_box_id(&self) -> WidgetId {
        self.center_box
    }

    fn with_box<R>(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        bar: WidgetId,
        f: impl FnOnce(&mut WidgetTree, &mut WidgetStore, WidgetId, &mut CenterBox) -> R,
    ) -> Result<R, TkError> {
        let center_box = store
            .downcast::<ActionBar>(bar)
            .ok_or(TkError::NoSuchWidget)?
            .center_box;
        let mut boxed = store.take(center_box).ok_or(TkError::NoSuchWidget)?;
        let result = {
            let center = boxed
                .as_any_mut()
                .downcast_mut::<CenterBox>()
                .ok_or(TkError::NoSuchWidget)?;
            f(tree, store, center_box, center)
        };
        store.put(center_box, boxed);
        Ok(result)
    }

    /// Pack a child at the start (left in LTR).
    pub fn pack_start(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        bar: WidgetId,
        child: WidgetId,
    ) -> Result<(), TkError> {
        Self::with_box(tree, store, bar, |tree, _, center_box, center| {
            tree.add(center_box, child)?;
            center.start.push(child);
            Ok(())
        })?
    }

    /// Pack a child at the end (right in LTR).
    pub fn pack_end(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        bar: WidgetId,
        child: WidgetId,
    ) -> Result<(), TkError> {
        Self::with_box(tree, store, bar, |tree, _, center_box, center| {
            tree.add(center_box, child)?;
            center.end.push(child);
            Ok(())
        })?
    }

    /// Set or clear the center child.
    pub fn set_center(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        bar: WidgetId,
        child: Option<WidgetId>,
    ) -> Result<(), TkError> {
        Self::with_box(tree, store, bar, |tree, _, center_box, center| {
            if let Some(old) = center.center.take() {
                tree.remove(center_box, old)?;
            }
            if let Some(child) = child {
                tree.add(center_box, child)?;
                center.center = Some(child);
            }
            Ok(())
        })?
    }

    /// Slide the bar's content in or out.
    pub fn set_revealed(
        store: &mut WidgetStore,
        bar: WidgetId,
        revealed: bool,
        clock: &FrameClock,
    ) -> Result<(), TkError> {
        let revealer = store
            .downcast::<ActionBar>(bar)
            .ok_or(TkError::NoSuchWidget)?
            .revealer;
        store
            .downcast_mut::<Revealer>(revealer)
            .ok_or(TkError::NoSuchWidget)?
            .set_reveal_child(revealed, clock);
        Ok(())
    }

    /// Whether the bar's content is targeted to be shown.
    pub fn revealed(store: &WidgetStore, bar: WidgetId) -> bool {
        store
            .downcast::<ActionBar>(bar)
            .and_then(|b| store.downcast::<Revealer>(b.revealer))
            .map(|r| r.reveal_child())
            .unwrap_or(false)
    }
}

impl Widget for ActionBar {
    fn element(&self) -> &str {
        "actionbar"
    }

    fn default_css(&self) -> &str {
        "actionbar > revealer > box { padding: 6px; }"
    }

    fn request_mode(&self) -> SizeRequestMode {
        SizeRequestMode::HeightForWidth
    }

    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        _id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement {
        ctx.measure(self.revealer, orientation, for_size)
    }

    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        _baseline: i32,
    ) -> Rect {
        ctx.allocate_child(self.revealer, Rect::new(0, 0, rect.width, rect.height), -1);
        ctx.clip_with_children(id, rect)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixedFontMetrics;
    use crate::geometry::Size;
    use crate::layout::layout_toplevel;
    use crate::style::StyleTree;
    use crate::widgets::label::Label;

    struct Fixture {
        tree: WidgetTree,
        store: WidgetStore,
        styles: StyleTree,
        bar: WidgetId,
    }

    fn fixture() -> Fixture {
        let mut tree = WidgetTree::new();
        let mut store = WidgetStore::new();
        let bar = ActionBar::create(&mut tree, &mut store);
        Fixture {
            tree,
            store,
            styles: StyleTree::new(),
            bar,
        }
    }

    fn label(f: &mut Fixture, text: &str) -> WidgetId {
        let id = f.tree.create(WidgetData::new("label").visible(true));
        f.store.insert(id, Box::new(Label::new(text)));
        id
    }

    fn layout(f: &mut Fixture, width: i32, height: i32) {
        let fonts = FixedFontMetrics;
        let mut ctx = LayoutCtx {
            tree: &mut f.tree,
            store: &mut f.store,
            styles: &f.styles,
            fonts: &fonts,
        };
        layout_toplevel(&mut ctx, f.bar, Size::new(width, height));
    }

    /// Parent-relative allocation accumulated up to the bar's frame.
    fn absolute_x(f: &Fixture, id: WidgetId) -> i32 {
        let mut x = 0;
        let mut current = Some(id);
        while let Some(w) = current {
            x += f.tree.get(w).unwrap().allocation.x;
            current = f.tree.parent(w);
        }
        x
    }

    #[test]
    fn internals_hidden_from_foreach() {
        let f = fixture();
        assert!(f.tree.foreach(f.bar, false).is_empty());
        assert_eq!(f.tree.foreach(f.bar, true).len(), 1);
    }

    #[test]
    fn revealed_by_default() {
        let f = fixture();
        assert!(ActionBar::revealed(&f.store, f.bar));
    }

    #[test]
    fn center_child_is_centered_on_full_width() {
        let mut f = fixture();
        let start = label(&mut f, "s");
        let center = label(&mut f, "cc");
        let bar = f.bar;
        ActionBar::pack_start(&mut f.tree, &mut f.store, bar, start).unwrap();
        ActionBar::set_center(&mut f.tree, &mut f.store, bar, Some(center)).unwrap();
        layout(&mut f, 200, 30);
        // "cc" is 17px wide; ideal centered origin on 200 is 91.
        let x = absolute_x(&f, center);
        assert!((x - 91).abs() <= 1, "center x = {x}");
    }

    #[test]
    fn end_children_pack_from_the_right() {
        let mut f = fixture();
        let end = label(&mut f, "e");
        let bar = f.bar;
        ActionBar::pack_end(&mut f.tree, &mut f.store, bar, end).unwrap();
        layout(&mut f, 200, 30);
        let x = absolute_x(&f, end);
        let width = f.tree.get(end).unwrap().allocation.width;
        assert_eq!(x + width, 200);
    }

    #[test]
    fn packing_a_parented_child_fails() {
        let mut f = fixture();
        let child = label(&mut f, "x");
        let bar = f.bar;
        ActionBar::pack_start(&mut f.tree, &mut f.store, bar, child).unwrap();
        assert_eq!(
            ActionBar::pack_end(&mut f.tree, &mut f.store, bar, child),
            Err(TkError::AlreadyParented)
        );
    }

    #[test]
    fn hide_slides_the_bar_away() {
        let mut f = fixture();
        let start = label(&mut f, "s");
        let bar = f.bar;
        ActionBar::pack_start(&mut f.tree, &mut f.store, bar, start).unwrap();
        let mut clock = FrameClock::new();
        clock.stop();
        ActionBar::set_revealed(&mut f.store, bar, false, &clock).unwrap();
        let fonts = FixedFontMetrics;
        let ctx = MeasureCtx {
            tree: &f.tree,
            store: &f.store,
            styles: &f.styles,
            fonts: &fonts,
        };
        assert_eq!(ctx.measure(bar, Orientation::Vertical, -1).natural, 0);
    }
}
