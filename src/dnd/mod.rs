//! Drag-and-drop: per-widget source and destination sites, target
//! matching, and action negotiation.

pub mod dest;
pub mod source;

use bitflags::bitflags;

pub use dest::{DestDefaults, DestSite};
pub use source::{DragIcon, SourceSite};

use slotmap::SecondaryMap;

use crate::diag::TkError;
use crate::style::{StateFlags, StyleTree};
use crate::tree::{WidgetId, WidgetTree};

bitflags! {
    /// Actions a drag may perform on the data.
    pub struct DragAction: u8 {
        const COPY = 1 << 0;
        const MOVE = 1 << 1;
        const LINK = 1 << 2;
    }
}

impl DragAction {
    /// Pick one action from a set: copy if allowed, else move, else link.
    pub fn preferred(self) -> Option<DragAction> {
        for candidate in [DragAction::COPY, DragAction::MOVE, DragAction::LINK] {
            if self.contains(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

bitflags! {
    /// Restrictions on who may match a target entry. Empty means no
    /// restriction.
    pub struct TargetFlags: u8 {
        /// Only drags originating in this application.
        const SAME_APP = 1 << 0;
        /// Only drags originating in the same widget.
        const SAME_WIDGET = 1 << 1;
        /// Only drags originating in another application.
        const OTHER_APP = 1 << 2;
        /// Only drags originating in a different widget.
        const OTHER_WIDGET = 1 << 3;
    }
}

/// One supported content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    /// Content type name, e.g. `text/uri-list`.
    pub target: String,
    pub flags: TargetFlags,
    /// Application-defined tag passed back on data requests.
    pub info: u32,
}

impl TargetEntry {
    pub fn new(target: impl Into<String>, flags: TargetFlags, info: u32) -> Self {
        Self {
            target: target.into(),
            flags,
            info,
        }
    }

    fn admits(&self, source: Option<WidgetId>, dest: WidgetId) -> bool {
        if self.flags.contains(TargetFlags::SAME_APP) && source.is_none() {
            return false;
        }
        if self.flags.contains(TargetFlags::OTHER_APP) && source.is_some() {
            return false;
        }
        if self.flags.contains(TargetFlags::SAME_WIDGET) && source != Some(dest) {
            return false;
        }
        if self.flags.contains(TargetFlags::OTHER_WIDGET) && source == Some(dest) {
            return false;
        }
        true
    }
}

/// An ordered list of supported content types. Order is preference
/// order; matching returns the first common entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    entries: Vec<TargetEntry>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<TargetEntry>) -> Self {
        Self { entries }
    }

    pub fn add(&mut self, entry: TargetEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.entries.iter().any(|e| e.target == target)
    }
}

/// The state of one in-flight drag.
#[derive(Debug, Clone)]
pub struct DragContext {
    /// The source widget; `None` for drags from another application.
    pub source: Option<WidgetId>,
    pub targets: TargetList,
    /// Actions the source permits.
    pub actions: DragAction,
    /// Action most recently negotiated with a destination.
    pub selected_action: Option<DragAction>,
    /// Destination currently under the drag.
    pub over: Option<WidgetId>,
}

/// Find the first content type the drag offers that the destination
/// accepts, honoring per-entry restrictions.
pub fn find_target(
    context: &DragContext,
    dest_widget: WidgetId,
    dest_targets: &TargetList,
) -> Option<String> {
    context.targets.entries().iter().find_map(|offered| {
        dest_targets
            .entries()
            .iter()
            .find(|accepted| {
                accepted.target == offered.target && accepted.admits(context.source, dest_widget)
            })
            .map(|accepted| accepted.target.clone())
    })
}

/// Intersect source and destination actions and pick one.
pub fn negotiate_action(offered: DragAction, permitted: DragAction) -> Option<DragAction> {
    (offered & permitted).preferred()
}

/// What a completed drop asks the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRequest {
    pub dest: WidgetId,
    pub target: String,
    pub action: DragAction,
    /// The `info` tag from the matched destination entry.
    pub info: u32,
}

/// Owns every source and destination site plus the active drag.
#[derive(Default)]
pub struct DndManager {
    sources: SecondaryMap<WidgetId, SourceSite>,
    dests: SecondaryMap<WidgetId, DestSite>,
    active: Option<DragContext>,
}

impl DndManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a drag source site. The caller installs the matching drag
    /// gesture on the widget.
    pub fn source_set(
        &mut self,
        widget: WidgetId,
        start_button: u32,
        targets: TargetList,
        actions: DragAction,
    ) {
        self.sources.insert(
            widget,
            SourceSite {
                start_button,
                targets,
                actions,
                icon: DragIcon::Default,
            },
        );
    }

    pub fn source_unset(&mut self, widget: WidgetId) {
        self.sources.remove(widget);
    }

    pub fn source(&self, widget: WidgetId) -> Option<&SourceSite> {
        self.sources.get(widget)
    }

    /// Set the icon shown while dragging from `widget`.
    pub fn source_set_icon(&mut self, widget: WidgetId, icon: DragIcon) -> Result<(), TkError> {
        let site = self
            .sources
            .get_mut(widget)
            .ok_or(TkError::NoSuchWidget)?;
        site.icon = icon;
        Ok(())
    }

    /// Attach a drop destination site.
    pub fn dest_set(
        &mut self,
        widget: WidgetId,
        flags: DestDefaults,
        targets: TargetList,
        actions: DragAction,
    ) {
        self.dests.insert(
            widget,
            DestSite {
                flags,
                targets,
                actions,
                track_motion: false,
                highlighted: false,
            },
        );
    }

    pub fn dest_unset(&mut self, widget: WidgetId) {
        self.dests.remove(widget);
    }

    pub fn dest(&self, widget: WidgetId) -> Option<&DestSite> {
        self.dests.get(widget)
    }

    /// Replace the target list of an existing destination site.
    pub fn dest_set_targets(
        &mut self,
        widget: WidgetId,
        targets: TargetList,
    ) -> Result<(), TkError> {
        let site = self
            .dests
            .get_mut(widget)
            .ok_or(TkError::NotADropDestination)?;
        site.targets = targets;
        Ok(())
    }

    /// Make a destination report motion even without a target match.
    pub fn dest_set_track_motion(
        &mut self,
        widget: WidgetId,
        track: bool,
    ) -> Result<(), TkError> {
        let site = self
            .dests
            .get_mut(widget)
            .ok_or(TkError::NotADropDestination)?;
        site.track_motion = track;
        Ok(())
    }

    /// The drag in flight, if any.
    pub fn active_drag(&self) -> Option<&DragContext> {
        self.active.as_ref()
    }

    /// Start a drag from a registered source widget (the drag gesture
    /// recognized with a matching button).
    pub fn begin_drag(&mut self, widget: WidgetId) -> Result<&DragContext, TkError> {
        let site = self.sources.get(widget).ok_or(TkError::NoSuchWidget)?;
        self.active = Some(DragContext {
            source: Some(widget),
            targets: site.targets.clone(),
            actions: site.actions,
            selected_action: None,
            over: None,
        });
        Ok(self.active.as_ref().expect("just set"))
    }

    /// Start a drag offered by another application.
    pub fn begin_external_drag(&mut self, targets: TargetList, actions: DragAction) {
        self.active = Some(DragContext {
            source: None,
            targets,
            actions,
            selected_action: None,
            over: None,
        });
    }

    /// Drag motion over a widget. Negotiates an action when the widget
    /// is a destination with a matching target, updating drop-active
    /// highlight state as the drag crosses site boundaries.
    pub fn motion(
        &mut self,
        tree: &WidgetTree,
        styles: &mut StyleTree,
        widget: WidgetId,
    ) -> Option<DragAction> {
        let previous = self.active.as_ref()?.over;
        if previous != Some(widget) {
            if let Some(prev) = previous {
                self.set_highlight(tree, styles, prev, false);
            }
        }
        self.active.as_mut()?.over = Some(widget);

        let context = self.active.clone()?;
        let Some(site) = self.dests.get(widget) else {
            self.active.as_mut()?.selected_action = None;
            return None;
        };
        if !site.flags.contains(DestDefaults::MOTION) {
            return None;
        }
        let matched = find_target(&context, widget, &site.targets);
        if matched.is_none() && !site.track_motion {
            self.active.as_mut()?.selected_action = None;
            return None;
        }
        let action = negotiate_action(context.actions, site.actions);
        let highlight = action.is_some() && site.flags.contains(DestDefaults::HIGHLIGHT);
        self.active.as_mut()?.selected_action = action;
        if highlight {
            self.set_highlight(tree, styles, widget, true);
        }
        action
    }

    /// The drag left the widget it was over.
    pub fn leave(&mut self, tree: &WidgetTree, styles: &mut StyleTree) {
        let Some(context) = self.active.as_mut() else {
            return;
        };
        let previous = context.over.take();
        context.selected_action = None;
        if let Some(prev) = previous {
            self.set_highlight(tree, styles, prev, false);
        }
    }

    /// Drop on a widget. Fails when the widget is not a registered
    /// destination; returns `None` when no target matches (the drop is
    /// refused and the drag stays active for the backend to cancel).
    pub fn drop(
        &mut self,
        tree: &WidgetTree,
        styles: &mut StyleTree,
        widget: WidgetId,
    ) -> Result<Option<DropRequest>, TkError> {
        let site = self
            .dests
            .get(widget)
            .ok_or(TkError::NotADropDestination)?;
        if !site.flags.contains(DestDefaults::DROP) {
            return Ok(None);
        }
        let Some(context) = self.active.as_ref() else {
            return Ok(None);
        };
        let Some(target) = find_target(context, widget, &site.targets) else {
            return Ok(None);
        };
        let action = context
            .selected_action
            .or_else(|| negotiate_action(context.actions, site.actions));
        let Some(action) = action else {
            return Ok(None);
        };
        let info = site
            .targets
            .entries()
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.info)
            .unwrap_or(0);
        self.set_highlight(tree, styles, widget, false);
        self.active = None;
        Ok(Some(DropRequest {
            dest: widget,
            target,
            action,
            info,
        }))
    }

    /// Abandon the active drag, clearing any highlight.
    pub fn cancel(&mut self, tree: &WidgetTree, styles: &mut StyleTree) {
        if let Some(context) = self.active.take() {
            if let Some(over) = context.over {
                self.set_highlight(tree, styles, over, false);
            }
        }
    }

    /// Drop site data for a destroyed widget.
    pub fn forget_widget(&mut self, widget: WidgetId) {
        self.sources.remove(widget);
        self.dests.remove(widget);
        if let Some(context) = self.active.as_mut() {
            if context.source == Some(widget) {
                self.active = None;
            } else if context.over == Some(widget) {
                context.over = None;
            }
        }
    }

    fn set_highlight(
        &mut self,
        tree: &WidgetTree,
        styles: &mut StyleTree,
        widget: WidgetId,
        on: bool,
    ) {
        if let Some(site) = self.dests.get_mut(widget) {
            site.highlighted = on;
        }
        if let Some(node) = tree.get(widget).and_then(|d| d.style_node) {
            styles.set_state(node, StateFlags::DROP_ACTIVE, on);
        }
    }
}
