//! The toplevel window list and per-window focus bookkeeping.

use slotmap::SecondaryMap;

use super::node::WidgetId;
use super::tree::WidgetTree;

/// All toplevels, most-recently-active first.
///
/// Focus-in moves a window to the head; removal preserves the relative
/// order of the rest. Each window remembers its focus widget so focus is
/// restored when the window becomes active again.
#[derive(Default)]
pub struct WindowList {
    /// MRU order: index 0 is the active (or last-active) window.
    order: Vec<WidgetId>,
    /// The focus widget within each window.
    focus: SecondaryMap<WidgetId, WidgetId>,
}

impl WindowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a toplevel. New windows start at the back of the MRU list.
    pub fn register(&mut self, window: WidgetId) {
        if !self.order.contains(&window) {
            self.order.push(window);
        }
    }

    /// Forget a toplevel and its focus entry.
    pub fn unregister(&mut self, window: WidgetId) {
        self.order.retain(|&w| w != window);
        self.focus.remove(window);
    }

    /// Windows in most-recently-active order.
    pub fn iter(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.order.iter().copied()
    }

    /// The active window, if any.
    pub fn active(&self) -> Option<WidgetId> {
        self.order.first().copied()
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Mark a window active: moves it to the head of the MRU list.
    pub fn activate(&mut self, window: WidgetId) {
        if let Some(pos) = self.order.iter().position(|&w| w == window) {
            let w = self.order.remove(pos);
            self.order.insert(0, w);
        }
    }

    /// The focus widget of a window.
    pub fn focus_widget(&self, window: WidgetId) -> Option<WidgetId> {
        self.focus.get(window).copied()
    }

    /// Move keyboard focus within a window.
    ///
    /// Clears the previous focus widget's flag, sets the new one, and marks
    /// the window active. Passing `None` just clears focus.
    pub fn set_focus(
        &mut self,
        tree: &mut WidgetTree,
        window: WidgetId,
        target: Option<WidgetId>,
    ) {
        if let Some(old) = self.focus.get(window).copied() {
            if let Some(data) = tree.get_mut(old) {
                data.has_focus = false;
            }
        }
        match target {
            Some(target) => {
                self.focus.insert(window, target);
                if let Some(data) = tree.get_mut(target) {
                    data.has_focus = true;
                }
                self.activate(window);
            }
            None => {
                self.focus.remove(window);
            }
        }
    }

    /// Drop any focus entries that point at dead widgets.
    pub fn prune(&mut self, tree: &WidgetTree) {
        self.order.retain(|&w| tree.alive(w));
        let stale: Vec<WidgetId> = self
            .focus
            .iter()
            .filter(|&(_, &f)| !tree.alive(f))
            .map(|(w, _)| w)
            .collect();
        for w in stale {
            self.focus.remove(w);
        }
    }
}
