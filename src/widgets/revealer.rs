//! Animated reveal container.

use std::any::Any;
use std::time::Duration;

use crate::backend::FrameClock;
use crate::geometry::Rect;
use crate::layout::{LayoutCtx, MeasureCtx, Measurement, Orientation, SizeRequestMode};
use crate::style::animation::{Easing, ProgressTracker};
use crate::tree::WidgetId;
use crate::widget::Widget;

/// Default slide duration.
pub const REVEAL_DURATION: Duration = Duration::from_millis(250);

/// Shows or hides its child with a vertical slide.
///
/// The revealed fraction animates between 0 and 1; measurement scales
/// the child's height by the current fraction so surrounding layout
/// follows the animation. While the frame clock is stopped, or with a
/// zero duration, changes apply instantly.
pub struct Revealer {
    reveal: bool,
    duration: Duration,
    fraction: f64,
    animation: Option<RevealAnimation>,
}

struct RevealAnimation {
    from: f64,
    to: f64,
    tracker: ProgressTracker,
}

impl Revealer {
    pub fn new() -> Self {
        Self {
            reveal: false,
            duration: REVEAL_DURATION,
            fraction: 0.0,
            animation: None,
        }
    }

    /// A revealer that starts fully revealed.
    pub fn new_revealed() -> Self {
        Self {
            reveal: true,
            fraction: 1.0,
            ..Self::new()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// The target state.
    pub fn reveal_child(&self) -> bool {
        self.reveal
    }

    /// Whether the child is fully revealed.
    pub fn child_revealed(&self) -> bool {
        self.fraction >= 1.0
    }

    /// Current revealed fraction in [0, 1].
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Change the target state. Starts an animation from the presented
    /// fraction when the clock runs and the duration is non-zero.
    pub fn set_reveal_child(&mut self, reveal: bool, clock: &FrameClock) {
        if reveal == self.reveal {
            return;
        }
        self.reveal = reveal;
        let target = if reveal { 1.0 } else { 0.0 };
        if !clock.is_running() || self.duration.is_zero() {
            self.fraction = target;
            self.animation = None;
            return;
        }
        self.animation = Some(RevealAnimation {
            from: self.fraction,
            to: target,
            tracker: ProgressTracker::new(clock.now(), self.duration, Easing::EaseOutCubic),
        });
    }

    /// Advance the animation. Returns true while still animating.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(animation) = self.animation.as_ref() else {
            return false;
        };
        let t = animation.tracker.eased(now);
        self.fraction = animation.from + (animation.to - animation.from) * t;
        if animation.tracker.is_finished(now) {
            self.fraction = animation.to;
            self.animation = None;
            return false;
        }
        true
    }

    fn child(&self, ctx: &MeasureCtx<'_>, id: WidgetId) -> Option<WidgetId> {
        ctx.tree.children(id).first().copied()
    }
}

impl Default for Revealer {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Revealer {
    fn element(&self) -> &str {
        "revealer"
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
        let Some(child) = self.child(ctx, id) else {
            return Measurement::ZERO;
        };
        let m = ctx.measure(child, orientation, for_size);
        match orientation {
            Orientation::Horizontal => m,
            Orientation::Vertical => Measurement::new(
                (m.minimum as f64 * self.fraction).round() as i32,
                (m.natural as f64 * self.fraction).round() as i32,
            ),
        }
    }

    fn allocate(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        id: WidgetId,
        rect: Rect,
        _baseline: i32,
    ) -> Rect {
        let Some(child) = ctx.tree.children(id).first().copied() else {
            return rect;
        };
        if self.fraction <= 0.0 {
            return rect;
        }
        // The child keeps its full height and slides up from the bottom
        // edge; the revealer's rect clips the hidden part.
        let full_height = ctx
            .measure_ctx()
            .measure(child, Orientation::Vertical, rect.width)
            .natural
            .max(rect.height);
        ctx.allocate_child(
            child,
            Rect::new(0, rect.height - full_height, rect.width, full_height),
            -1,
        );
        rect
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
