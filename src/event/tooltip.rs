//! Tooltip timing and visibility.
//!
//! Tooltips are driven by the frame clock: hovering a widget with
//! tooltip content arms a timer, and once one tooltip has been shown the
//! manager enters browse mode where the next tooltip appears much
//! faster. Browse mode decays after the pointer has left tooltip
//! territory for a while.

use std::time::Duration;

use crate::event::event::Event;
use crate::geometry::{Point, Rect};
use crate::tree::{WidgetId, WidgetTree};

/// Delay before the first tooltip appears.
pub const HOVER_TIMEOUT: Duration = Duration::from_millis(500);
/// Delay between tooltips while browsing.
pub const BROWSE_TIMEOUT: Duration = Duration::from_millis(60);
/// How long browse mode survives after the last tooltip hid.
pub const BROWSE_DISABLE_TIMEOUT: Duration = Duration::from_millis(500);

/// A tooltip that became visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownTooltip {
    pub widget: WidgetId,
    pub content: String,
    /// Positioned for keyboard focus rather than the pointer.
    pub keyboard_mode: bool,
}

/// Tracks hover timing and decides when tooltips show and hide.
pub struct TooltipManager {
    /// Widget under the pointer that has tooltip content.
    hovered: Option<WidgetId>,
    /// Deadline for showing the hovered widget's tooltip.
    show_at: Option<Duration>,
    /// The tooltip currently on screen.
    visible: Option<ShownTooltip>,
    /// Region the pointer may roam without hiding the visible tooltip,
    /// in surface coordinates.
    tip_area: Option<Rect>,
    /// Keyboard tooltips toggled on; focus changes drive show/hide.
    keyboard_mode: bool,
    browse_mode: bool,
    /// When browse mode expires, if no tooltip shows before then.
    browse_expires_at: Option<Duration>,
    /// Touch input suppresses tooltips until the next pointer motion.
    suppressed: bool,
}

impl TooltipManager {
    pub fn new() -> Self {
        Self {
            hovered: None,
            show_at: None,
            visible: None,
            tip_area: None,
            keyboard_mode: false,
            browse_mode: false,
            browse_expires_at: None,
            suppressed: false,
        }
    }

    /// The tooltip currently shown, if any.
    pub fn visible(&self) -> Option<&ShownTooltip> {
        self.visible.as_ref()
    }

    pub fn is_browsing(&self) -> bool {
        self.browse_mode
    }

    /// Whether keyboard tooltips are toggled on.
    pub fn keyboard_mode(&self) -> bool {
        self.keyboard_mode
    }

    /// Constrain the visible tooltip to `area`: pointer motion outside
    /// it hides the tooltip. Cleared whenever the tooltip hides or a new
    /// one shows.
    pub fn set_tip_area(&mut self, area: Option<Rect>) {
        self.tip_area = area;
    }

    /// Feed a dispatched event. `target` is the widget the event resolved
    /// to, `now` the frame clock position.
    pub fn handle_event(
        &mut self,
        tree: &WidgetTree,
        target: Option<WidgetId>,
        event: &Event,
        now: Duration,
    ) {
        match event {
            Event::PointerMotion { position, .. } | Event::Enter { position, .. } => {
                self.suppressed = false;
                self.leave_tip_area(*position, now);
                self.pointer_over(tree, target, now);
            }
            Event::FocusChange { focus_in, .. } if self.keyboard_mode => {
                match target.and_then(|t| self.tooltip_owner(tree, t)) {
                    Some(owner) if *focus_in => self.show(tree, owner, true),
                    _ => self.hide(now),
                }
            }
            Event::Leave { .. } => {
                self.hovered = None;
                self.show_at = None;
                self.hide(now);
            }
            Event::TouchBegin { .. } | Event::TouchUpdate { .. } => {
                self.suppressed = true;
                self.hovered = None;
                self.show_at = None;
                self.hide(now);
            }
            Event::KeyPress { .. }
            | Event::KeyRelease { .. }
            | Event::Scroll { .. }
            | Event::ButtonPress { .. }
            | Event::ButtonRelease { .. }
            | Event::DragEnter { .. }
            | Event::GrabBroken { .. } => {
                self.show_at = None;
                self.hide(now);
            }
            _ => {}
        }
    }

    /// Advance timers; may show a pending tooltip.
    pub fn tick(&mut self, tree: &WidgetTree, now: Duration) {
        if let Some(expiry) = self.browse_expires_at {
            if now >= expiry {
                self.browse_mode = false;
                self.browse_expires_at = None;
            }
        }
        let Some(deadline) = self.show_at else {
            return;
        };
        if now < deadline {
            return;
        }
        self.show_at = None;
        let Some(widget) = self.hovered else {
            return;
        };
        self.show(tree, widget, false);
    }

    /// Toggle keyboard tooltips. Turning the toggle on shows the focus
    /// widget's tooltip immediately; turning it off hides. While on,
    /// focus changes show the newly focused widget's tooltip and hide
    /// the old one.
    pub fn keyboard_query(&mut self, tree: &WidgetTree, focus: Option<WidgetId>, now: Duration) {
        if self.keyboard_mode {
            self.keyboard_mode = false;
            self.hide(now);
            return;
        }
        self.keyboard_mode = true;
        if let Some(owner) = focus.and_then(|f| self.tooltip_owner(tree, f)) {
            self.show(tree, owner, true);
        }
    }

    /// Hide any visible tooltip and forget pending timers.
    pub fn hide_now(&mut self, now: Duration) {
        self.hovered = None;
        self.show_at = None;
        self.hide(now);
    }

    fn leave_tip_area(&mut self, position: Point, now: Duration) {
        let Some(area) = self.tip_area else {
            return;
        };
        if self.visible.is_some() && !area.contains(position) {
            self.hide(now);
            self.hovered = None;
            self.show_at = None;
        }
    }

    fn pointer_over(&mut self, tree: &WidgetTree, target: Option<WidgetId>, now: Duration) {
        if self.suppressed {
            return;
        }
        // The tooltip widget is the target or its nearest ancestor with
        // tooltip content.
        let owner = target.and_then(|t| self.tooltip_owner(tree, t));
        if owner == self.hovered {
            return;
        }
        if self.visible.as_ref().is_some_and(|v| Some(v.widget) != owner) {
            self.hide(now);
        }
        self.hovered = owner;
        self.show_at = owner.map(|_| {
            now + if self.browse_mode {
                BROWSE_TIMEOUT
            } else {
                HOVER_TIMEOUT
            }
        });
    }

    fn tooltip_owner(&self, tree: &WidgetTree, target: WidgetId) -> Option<WidgetId> {
        let mut current = Some(target);
        while let Some(id) = current {
            if tree
                .get(id)
                .is_some_and(|d| d.has_tooltip && d.tooltip_content().is_some())
            {
                return Some(id);
            }
            current = tree.parent(id);
        }
        None
    }

    fn show(&mut self, tree: &WidgetTree, widget: WidgetId, keyboard_mode: bool) {
        let Some(content) = tree.get(widget).and_then(|d| d.tooltip_content()) else {
            return;
        };
        self.tip_area = None;
        self.visible = Some(ShownTooltip {
            widget,
            content: content.to_owned(),
            keyboard_mode,
        });
        self.browse_mode = true;
        self.browse_expires_at = None;
    }

    fn hide(&mut self, now: Duration) {
        self.tip_area = None;
        if self.visible.take().is_some() {
            self.browse_expires_at = Some(now + BROWSE_DISABLE_TIMEOUT);
        }
    }
}

impl Default for TooltipManager {
    fn default() -> Self {
        Self::new()
    }
}
