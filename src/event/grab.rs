//! Toolkit grabs.
//!
//! A window group carries a stack of grab widgets; while a grab is
//! active, events targeted outside the grab widget's subtree are
//! redirected to it. Device grabs restrict a single device and may
//! additionally block every other device.

use std::collections::HashMap;

use crate::backend::DeviceId;
use crate::tree::{WidgetId, WidgetTree};

/// A widget's shadow state changed because a grab was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabNotify {
    pub widget: WidgetId,
    /// True when the widget just became unreachable for input.
    pub shadowed: bool,
}

/// A per-device grab within a group.
#[derive(Debug, Clone, Copy)]
pub struct DeviceGrab {
    pub widget: WidgetId,
    /// When set, events from all other devices are also confined to the
    /// grab widget.
    pub block_others: bool,
}

/// A set of windows sharing one grab stack.
///
/// The newest grab wins. Adding then removing a grab leaves the stack
/// exactly as it was.
#[derive(Default)]
pub struct WindowGroup {
    grabs: Vec<WidgetId>,
    device_grabs: HashMap<DeviceId, DeviceGrab>,
}

impl WindowGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently effective grab widget, if any.
    pub fn current_grab(&self) -> Option<WidgetId> {
        self.grabs.last().copied()
    }

    /// Whether any toolkit grab is active.
    pub fn has_grab(&self) -> bool {
        !self.grabs.is_empty()
    }

    /// Depth of the grab stack.
    pub fn grab_depth(&self) -> usize {
        self.grabs.len()
    }

    /// Push a grab. Returns notifications for widgets whose reachability
    /// flipped: everything outside the new grab widget's subtree becomes
    /// shadowed, and if the previous grab was narrower, widgets inside
    /// the new subtree become reachable again.
    pub fn grab_add(&mut self, tree: &WidgetTree, widget: WidgetId) -> Vec<GrabNotify> {
        let previous = self.current_grab();
        self.grabs.push(widget);
        self.notify_diff(tree, previous, Some(widget))
    }

    /// Pop the newest matching grab. Returns reachability notifications
    /// mirroring the ones from the corresponding add.
    pub fn grab_remove(&mut self, tree: &WidgetTree, widget: WidgetId) -> Vec<GrabNotify> {
        let Some(index) = self.grabs.iter().rposition(|&g| g == widget) else {
            return Vec::new();
        };
        let was_current = index + 1 == self.grabs.len();
        self.grabs.remove(index);
        if !was_current {
            // Removing a shadowed grab changes nothing observable.
            return Vec::new();
        }
        self.notify_diff(tree, Some(widget), self.current_grab())
    }

    /// Drop every grab held by widgets that are no longer alive.
    pub fn prune(&mut self, tree: &WidgetTree) {
        self.grabs.retain(|&g| tree.alive(g));
        self.device_grabs.retain(|_, grab| tree.alive(grab.widget));
    }

    /// Whether `widget` can receive input under the current grab stack.
    pub fn is_reachable(&self, tree: &WidgetTree, widget: WidgetId) -> bool {
        match self.current_grab() {
            Some(grab) => tree.is_ancestor_or_self(grab, widget),
            None => true,
        }
    }

    /// Install a device grab.
    pub fn device_grab_add(&mut self, device: DeviceId, widget: WidgetId, block_others: bool) {
        self.device_grabs.insert(
            device,
            DeviceGrab {
                widget,
                block_others,
            },
        );
    }

    /// Release a device grab.
    pub fn device_grab_remove(&mut self, device: DeviceId) {
        self.device_grabs.remove(&device);
    }

    /// The grab for a device, if one is installed.
    pub fn device_grab(&self, device: DeviceId) -> Option<&DeviceGrab> {
        self.device_grabs.get(&device)
    }

    /// Where events from `device` must be delivered, honoring both this
    /// device's grab and blocking grabs held by other devices.
    pub fn device_redirect(&self, device: DeviceId) -> Option<WidgetId> {
        if let Some(grab) = self.device_grabs.get(&device) {
            return Some(grab.widget);
        }
        self.device_grabs
            .values()
            .find(|grab| grab.block_others)
            .map(|grab| grab.widget)
    }

    fn notify_diff(
        &self,
        tree: &WidgetTree,
        old: Option<WidgetId>,
        new: Option<WidgetId>,
    ) -> Vec<GrabNotify> {
        let mut out = Vec::new();
        for root in tree.roots() {
            for id in tree.walk_depth_first(root) {
                let was = old.is_none_or(|g| tree.is_ancestor_or_self(g, id));
                let now = new.is_none_or(|g| tree.is_ancestor_or_self(g, id));
                if was != now {
                    out.push(GrabNotify {
                        widget: id,
                        shadowed: !now,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{WidgetData, WidgetTree};

    fn build() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.create(WidgetData::new("window"));
        let a = tree.create(WidgetData::new("button"));
        let b = tree.create(WidgetData::new("dialog"));
        tree.add(root, a).unwrap();
        tree.add(root, b).unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn newest_grab_wins() {
        let (tree, _root, a, b) = build();
        let mut group = WindowGroup::new();
        group.grab_add(&tree, a);
        group.grab_add(&tree, b);
        assert_eq!(group.current_grab(), Some(b));
        group.grab_remove(&tree, b);
        assert_eq!(group.current_grab(), Some(a));
    }

    #[test]
    fn add_remove_restores_stack() {
        let (tree, _root, a, b) = build();
        let mut group = WindowGroup::new();
        group.grab_add(&tree, a);
        let depth = group.grab_depth();
        group.grab_add(&tree, b);
        group.grab_remove(&tree, b);
        assert_eq!(group.grab_depth(), depth);
        assert_eq!(group.current_grab(), Some(a));
    }

    #[test]
    fn grab_shadows_outsiders() {
        let (tree, root, a, b) = build();
        let mut group = WindowGroup::new();
        let notifies = group.grab_add(&tree, b);
        assert!(notifies.contains(&GrabNotify {
            widget: a,
            shadowed: true
        }));
        assert!(notifies.contains(&GrabNotify {
            widget: root,
            shadowed: true
        }));
        assert!(!notifies.iter().any(|n| n.widget == b));
        assert!(!group.is_reachable(&tree, a));
        assert!(group.is_reachable(&tree, b));
    }

    #[test]
    fn removing_grab_unshadows() {
        let (tree, _root, a, b) = build();
        let mut group = WindowGroup::new();
        group.grab_add(&tree, b);
        let notifies = group.grab_remove(&tree, b);
        assert!(notifies.contains(&GrabNotify {
            widget: a,
            shadowed: false
        }));
        assert!(group.is_reachable(&tree, a));
    }

    #[test]
    fn removing_shadowed_grab_is_silent() {
        let (tree, _root, a, b) = build();
        let mut group = WindowGroup::new();
        group.grab_add(&tree, a);
        group.grab_add(&tree, b);
        let notifies = group.grab_remove(&tree, a);
        assert!(notifies.is_empty());
        assert_eq!(group.current_grab(), Some(b));
    }

    #[test]
    fn device_grab_redirects() {
        let (tree, _root, a, b) = build();
        let _ = tree;
        let mut group = WindowGroup::new();
        let pen = DeviceId(7);
        group.device_grab_add(pen, a, false);
        assert_eq!(group.device_redirect(pen), Some(a));
        // A non-blocking grab leaves other devices alone.
        assert_eq!(group.device_redirect(DeviceId::CORE_POINTER), None);
        group.device_grab_add(pen, b, true);
        assert_eq!(group.device_redirect(DeviceId::CORE_POINTER), Some(b));
        group.device_grab_remove(pen);
        assert_eq!(group.device_redirect(pen), None);
    }

    #[test]
    fn prune_drops_dead_grabs() {
        let (mut tree, _root, a, _b) = build();
        let mut group = WindowGroup::new();
        group.grab_add(&tree, a);
        tree.destroy(a);
        group.prune(&tree);
        assert_eq!(group.current_grab(), None);
    }
}
