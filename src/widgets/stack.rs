//! Stack: one visible child at a time, with animated switching.

use std::any::Any;
use std::time::Duration;

use crate::backend::FrameClock;
use crate::diag::TkError;
use crate::geometry::Rect;
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::style::animation::{Easing, ProgressTracker};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::{Widget, WidgetStore};

/// Default switch duration.
pub const STACK_TRANSITION_DURATION: Duration = Duration::from_millis(200);

/// How the stack switches between children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackTransition {
    #[default]
    None,
    Crossfade,
    SlideLeft,
    SlideRight,
    /// Slide left or right depending on the relative page order.
    SlideLeftRight,
}

/// The direction actually used once resolved against page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveTransition {
    Crossfade,
    SlideLeft,
    SlideRight,
}

struct Page {
    widget: WidgetId,
    name: Option<String>,
}

struct RunningTransition {
    kind: ActiveTransition,
    tracker: ProgressTracker,
    /// Cached eased progress, updated by `tick`.
    progress: f64,
}

/// Shows exactly one of its named children.
pub struct Stack {
    pages: Vec<Page>,
    visible: Option<WidgetId>,
    /// Previous child, kept on screen while a transition runs.
    last_visible: Option<WidgetId>,
    transition: StackTransition,
    duration: Duration,
    running: Option<RunningTransition>,
    hhomogeneous: bool,
    vhomogeneous: bool,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            visible: None,
            last_visible: None,
            transition: StackTransition::None,
            duration: STACK_TRANSITION_DURATION,
            running: None,
            hhomogeneous: true,
            vhomogeneous: true,
        }
    }

    pub fn with_transition(mut self, transition: StackTransition) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn set_homogeneous(&mut self, horizontal: bool, vertical: bool) {
        self.hhomogeneous = horizontal;
        self.vhomogeneous = vertical;
    }

    pub fn visible_child(&self) -> Option<WidgetId> {
        self.visible
    }

    pub fn visible_child_name(&self) -> Option<&str> {
        let visible = self.visible?;
        self.pages
            .iter()
            .find(|p| p.widget == visible)
            .and_then(|p| p.name.as_deref())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn transition_running(&self) -> bool {
        self.running.is_some()
    }

    fn page_index(&self, widget: WidgetId) -> Option<usize> {
        self.pages.iter().position(|p| p.widget == widget)
    }

    fn child_by_name(&self, name: &str) -> Option<WidgetId> {
        self.pages
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .map(|p| p.widget)
    }

    /// Add an unnamed page. The first page becomes the visible child.
    pub fn add(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        stack: WidgetId,
        child: WidgetId,
    ) -> Result<(), TkError> {
        Self::add_page(tree, store, stack, child, None)
    }

    /// Add a page addressable by name. Duplicate names fail.
    pub fn add_named(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        stack: WidgetId,
        child: WidgetId,
        name: &str,
    ) -> Result<(), TkError> {
        Self::add_page(tree, store, stack, child, Some(name.to_owned()))
    }

    fn add_page(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        stack: WidgetId,
        child: WidgetId,
        name: Option<String>,
    ) -> Result<(), TkError> {
        let this = store
            .downcast_mut::<Stack>(stack)
            .ok_or(TkError::NoSuchWidget)?;
        if let Some(name) = name.as_deref() {
            if this.child_by_name(name).is_some() {
                return Err(TkError::DuplicateChildName(name.to_owned()));
            }
        }
        tree.add(stack, child)?;
        let this = store
            .downcast_mut::<Stack>(stack)
            .ok_or(TkError::NoSuchWidget)?;
        this.pages.push(Page {
            widget: child,
            name,
        });
        if this.visible.is_none() {
            this.visible = Some(child);
        } else if let Some(data) = tree.get_mut(child) {
            // Only the visible page participates in input picking.
            data.mapped = false;
        }
        Ok(())
    }

    /// Remove a page. Clears the visible child if it was showing.
    pub fn remove(
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        stack: WidgetId,
        child: WidgetId,
    ) -> Result<(), TkError> {
        tree.remove(stack, child)?;
        let this = store
            .downcast_mut::<Stack>(stack)
            .ok_or(TkError::NoSuchWidget)?;
        this.pages.retain(|p| p.widget != child);
        if this.visible == Some(child) {
            this.visible = this.pages.first().map(|p| p.widget);
        }
        if this.last_visible == Some(child) {
            this.last_visible = None;
            this.running = None;
        }
        Ok(())
    }

    /// Switch to a page. Switching to the current child, or to a widget
    /// that is not a page, is a no-op.
    pub fn set_visible_child(
        store: &mut WidgetStore,
        stack: WidgetId,
        child: WidgetId,
        clock: &FrameClock,
    ) -> Result<(), TkError> {
        let this = store
            .downcast_mut::<Stack>(stack)
            .ok_or(TkError::NoSuchWidget)?;
        this.switch_to(child, clock);
        Ok(())
    }

    /// Switch to the page registered under `name`; unknown names are a
    /// no-op.
    pub fn set_visible_child_name(
        store: &mut WidgetStore,
        stack: WidgetId,
        name: &str,
        clock: &FrameClock,
    ) -> Result<(), TkError> {
        let this = store
            .downcast_mut::<Stack>(stack)
            .ok_or(TkError::NoSuchWidget)?;
        if let Some(child) = this.child_by_name(name) {
            this.switch_to(child, clock);
        }
        Ok(())
    }

    fn switch_to(&mut self, child: WidgetId, clock: &FrameClock) {
        if self.visible == Some(child) || self.page_index(child).is_none() {
            return;
        }
        let previous = self.visible;
        let kind = self.resolve_transition(previous, child);
        self.last_visible = previous;
        self.visible = Some(child);

        match kind {
            Some(kind) if clock.is_running() && !self.duration.is_zero() => {
                self.running = Some(RunningTransition {
                    kind,
                    tracker: ProgressTracker::new(clock.now(), self.duration, Easing::EaseOutCubic),
                    progress: 0.0,
                });
            }
            _ => {
                self.last_visible = None;
                self.running = None;
            }
        }
    }

    /// Pick the concrete direction for this switch. Order-dependent
    /// slides fall back to an instant switch when either page is
    /// unknown.
    fn resolve_transition(
        &self,
        from: Option<WidgetId>,
        to: WidgetId,
    ) -> Option<ActiveTransition> {
        match self.transition {
            StackTransition::None => None,
            StackTransition::Crossfade => Some(ActiveTransition::Crossfade),
            StackTransition::SlideLeft => Some(ActiveTransition::SlideLeft),
            StackTransition::SlideRight => Some(ActiveTransition::SlideRight),
            StackTransition::SlideLeftRight => {
                let from_index = self.page_index(from?)?;
                let to_index = self.page_index(to)?;
                if to_index > from_index {
                    Some(ActiveTransition::SlideLeft)
                } else {
                    Some(ActiveTransition::SlideRight)
                }
            }
        }
    }

    /// Advance the transition. Returns true while still running.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(running) = self.running.as_mut() else {
            return false;
        };
        running.progress = running.tracker.eased(now);
        if running.tracker.is_finished(now) {
            self.running = None;
            self.last_visible = None;
            return false;
        }
        true
    }

    fn measure_axis(
        &self,
        ctx: &MeasureCtx<'_>,
        orientation: Orientation,
        for_size: i32,
        homogeneous: bool,
    ) -> Measurement {
        if homogeneous {
            let mut result = Measurement::ZERO;
            for page in &self.pages {
                result = result.max(ctx.measure(page.widget, orientation, for_size));
            }
            return result;
        }
        let current = match self.visible {
            Some(visible) => ctx.measure(visible, orientation, for_size),
            None => Measurement::ZERO,
        };
        // While switching, blend from the previous page's size.
        match (self.last_visible, self.running.as_ref()) {
            (Some(last), Some(running)) => {
                let previous = ctx.measure(last, orientation, for_size);
                let blend = |a: i32, b: i32| {
                    (a as f64 + (b as f64 - a as f64) * running.progress).round() as i32
                };
                Measurement::new(
                    blend(previous.minimum, current.minimum),
                    blend(previous.natural, current.natural),
                )
            }
            _ => current,
        }
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Stack {
    fn element(&self) -> &str {
        "stack"
    }

    fn request_mode(&self) -> SizeRequestMode {
        SizeRequestMode::ConstantSize
    }

    fn measure(
        &self,
        ctx: &MeasureCtx<'_>,
        _id: WidgetId,
        orientation: Orientation,
        for_size: i32,
    ) -> Measurement {
        let homogeneous = match orientation {
            Orientation::Horizontal => self.hhomogeneous,
            Orientation::Vertical => self.vhomogeneous,
        };
        self.measure_axis(ctx, orientation, for_size, homogeneous)
    }

    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        _baseline: i32,
    ) -> Rect {
        let Some(visible) = self.visible else {
            return rect;
        };
        let full = Rect::new(0, 0, rect.width, rect.height);
        match (self.last_visible, self.running.as_ref()) {
            (Some(last), Some(running)) => {
                let t = running.progress;
                match running.kind {
                    ActiveTransition::Crossfade => {
                        ctx.allocate_child(last, full, -1);
                        ctx.allocate_child(visible, full, -1);
                    }
                    ActiveTransition::SlideLeft => {
                        // The old page slides out to the left, the new
                        // one follows from the right.
                        let offset = (-(rect.width as f64) * t).round() as i32;
                        ctx.allocate_child(last, full.translate(offset, 0), -1);
                        ctx.allocate_child(visible, full.translate(offset + rect.width, 0), -1);
                    }
                    ActiveTransition::SlideRight => {
                        let offset = (rect.width as f64 * t).round() as i32;
                        ctx.allocate_child(last, full.translate(offset, 0), -1);
                        ctx.allocate_child(visible, full.translate(offset - rect.width, 0), -1);
                    }
                }
            }
            _ => {
                ctx.allocate_child(visible, full, -1);
            }
        }
        // The stack clips sliding pages to its own extent.
        rect
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
