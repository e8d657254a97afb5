//! The widget tree: ownership, child lists, realize/map lifecycle, destroy.
//!
//! All widgets live in a single slotmap arena. Parent/child relationships are
//! stored in secondary maps so that lookup is O(1) and teardown is
//! O(subtree size). The lifecycle state machine is
//! `unrealized → realized+unmapped → mapped` and back, with the invariant
//! that a widget is mapped only if it is realized, visible, and its parent
//! (if any) is mapped.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{Direction, WidgetData, WidgetId};
use crate::backend::SurfaceId;
use crate::diag::TkError;

const EMPTY_CHILDREN: &[WidgetId] = &[];

/// The central widget tree.
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetData>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    /// Destroyed widgets in teardown order (children before parents), for
    /// observers to drop their references.
    destroy_log: Vec<WidgetId>,
}

impl WidgetTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            destroy_log: Vec::new(),
        }
    }

    /// Insert an unparented widget.
    pub fn create(&mut self, data: WidgetData) -> WidgetId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Immutable access to a widget's data.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetData> {
        self.nodes.get(id)
    }

    /// Mutable access to a widget's data.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetData> {
        self.nodes.get_mut(id)
    }

    /// Whether the id resolves to a live (non-tombstone) widget.
    pub fn alive(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|d| !d.destroyed)
    }

    /// The parent of a widget, if any.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// The ordered children of a widget.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        if ancestor == id {
            return true;
        }
        self.ancestors(id).contains(&ancestor)
    }

    /// The toplevel this widget hangs under (itself if unparented).
    pub fn toplevel(&self, id: WidgetId) -> WidgetId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// All live unparented widgets.
    pub fn roots(&self) -> Vec<WidgetId> {
        self.nodes
            .iter()
            .filter(|(id, data)| !data.destroyed && !self.parent.contains_key(*id))
            .map(|(id, _)| id)
            .collect()
    }

    /// Pre-order depth-first traversal from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Enumerate a container's children.
    ///
    /// Internal children (e.g. the action bar's box and revealer) appear
    /// only when `include_internals` is set.
    pub fn foreach(&self, container: WidgetId, include_internals: bool) -> Vec<WidgetId> {
        self.children(container)
            .iter()
            .copied()
            .filter(|&c| {
                include_internals || !self.nodes.get(c).map(|d| d.internal).unwrap_or(false)
            })
            .collect()
    }

    /// Append `child` to `parent`'s children.
    ///
    /// Fails if the child already has a parent, or if either widget is
    /// missing or destroyed. If the parent is mapped and the child visible,
    /// the child is realized and mapped.
    pub fn add(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TkError> {
        self.add_at(parent, child, -1)
    }

    /// Insert `child` into `parent`'s children at `position`.
    ///
    /// Positions past the end, and any negative position, append.
    pub fn add_at(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        position: i32,
    ) -> Result<(), TkError> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(TkError::NoSuchWidget);
        }
        if self.nodes[parent].destroyed || self.nodes[child].destroyed {
            return Err(TkError::Destroyed);
        }
        if self.parent.contains_key(child) {
            return Err(TkError::AlreadyParented);
        }

        self.parent.insert(child, parent);
        let siblings = self
            .children
            .get_mut(parent)
            .expect("parent must have a children vec");
        if position < 0 || position as usize >= siblings.len() {
            siblings.push(child);
        } else {
            siblings.insert(position as usize, child);
        }

        if self.nodes[parent].mapped && self.nodes[child].visible {
            self.realize(child);
            self.map(child);
        }
        Ok(())
    }

    /// Remove `child` from `parent`.
    ///
    /// Fails if `child`'s parent is not `parent`. The child is unmapped and
    /// unrealized bottom-up, and its parent link is cleared before the
    /// parent's child list drops the reference.
    pub fn remove(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TkError> {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return Err(TkError::NoSuchWidget);
        }
        if self.parent.get(child).copied() != Some(parent) {
            return Err(TkError::NotAChild);
        }

        self.unmap(child);
        self.unrealize(child);

        self.parent.remove(child);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&c| c != child);
        }
        Ok(())
    }

    /// Destroy a widget and its whole subtree.
    ///
    /// Terminal and idempotent: children are destroyed depth-first before
    /// the widget itself, each destruction is recorded for observers, and
    /// the widget is left as a tombstone on which further operations fail.
    pub fn destroy(&mut self, id: WidgetId) {
        if !self.alive(id) {
            return;
        }

        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for child in kids {
            self.destroy(child);
        }

        self.unmap(id);
        self.unrealize(id);

        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&c| c != id);
            }
        }
        if let Some(kids) = self.children.get_mut(id) {
            kids.clear();
        }
        self.nodes[id].destroyed = true;
        self.destroy_log.push(id);
    }

    /// Drain the destroy notifications accumulated so far, in teardown
    /// order (children before parents).
    pub fn drain_destroyed(&mut self) -> Vec<WidgetId> {
        std::mem::take(&mut self.destroy_log)
    }

    // ── Realize / map state machine ──────────────────────────────────

    /// Realize a widget: allocate (inherit) a backing surface.
    ///
    /// Ancestors are realized first so the surface propagates down. No-op
    /// for already-realized or dead widgets.
    pub fn realize(&mut self, id: WidgetId) {
        if !self.alive(id) || self.nodes[id].realized {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.realize(parent);
            if self.nodes[id].surface.is_none() {
                self.nodes[id].surface = self.nodes[parent].surface;
            }
        }
        self.nodes[id].realized = true;
    }

    /// Attach a toplevel surface and realize the widget.
    pub fn realize_toplevel(&mut self, id: WidgetId, surface: SurfaceId) {
        if !self.alive(id) {
            return;
        }
        self.nodes[id].surface = Some(surface);
        self.realize(id);
    }

    /// Unrealize a widget; all descendants are unrealized first.
    pub fn unrealize(&mut self, id: WidgetId) {
        if !self.nodes.contains_key(id) || !self.nodes[id].realized {
            return;
        }
        self.unmap(id);
        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for child in kids {
            self.unrealize(child);
        }
        let data = &mut self.nodes[id];
        data.realized = false;
        data.surface = None;
    }

    /// Map a widget if it is realized, visible, and its parent is mapped.
    ///
    /// Visible children are realized and mapped recursively.
    pub fn map(&mut self, id: WidgetId) {
        if !self.alive(id) {
            return;
        }
        let data = &self.nodes[id];
        if data.mapped || !data.realized || !data.visible {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if !self.nodes[parent].mapped {
                return;
            }
        }
        self.nodes[id].mapped = true;

        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for child in kids {
            if self.nodes.get(child).is_some_and(|d| d.visible) {
                self.realize(child);
                self.map(child);
            }
        }
    }

    /// Unmap a widget and all mapped descendants (children first).
    pub fn unmap(&mut self, id: WidgetId) {
        if !self.nodes.contains_key(id) || !self.nodes[id].mapped {
            return;
        }
        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for child in kids {
            self.unmap(child);
        }
        self.nodes[id].mapped = false;
    }

    /// Make a widget visible; maps it if the lifecycle preconditions hold.
    pub fn show(&mut self, id: WidgetId) {
        if !self.alive(id) {
            return;
        }
        self.nodes[id].visible = true;
        let parent_mapped = match self.parent(id) {
            Some(p) => self.nodes[p].mapped,
            // Toplevels map as soon as they are realized and visible.
            None => true,
        };
        if parent_mapped && self.nodes[id].realized {
            self.map(id);
        } else if parent_mapped {
            if let Some(p) = self.parent(id) {
                if self.nodes[p].mapped {
                    self.realize(id);
                    self.map(id);
                }
            }
        }
    }

    /// Hide a widget; unmaps it and its descendants.
    pub fn hide(&mut self, id: WidgetId) {
        if !self.alive(id) {
            return;
        }
        self.nodes[id].visible = false;
        self.unmap(id);
    }

    // ── Derived state ────────────────────────────────────────────────

    /// Effective sensitivity: a widget is sensitive only if it and every
    /// ancestor are sensitive.
    pub fn is_sensitive(&self, id: WidgetId) -> bool {
        if !self.nodes.get(id).is_some_and(|d| d.sensitive) {
            return false;
        }
        self.ancestors(id)
            .iter()
            .all(|&a| self.nodes.get(a).is_some_and(|d| d.sensitive))
    }

    /// Resolve the effective text direction through the parent chain.
    /// Unresolved `Inherit` at the root defaults to LTR.
    pub fn resolve_direction(&self, id: WidgetId) -> Direction {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.nodes.get(c).map(|d| d.direction) {
                Some(Direction::Ltr) => return Direction::Ltr,
                Some(Direction::Rtl) => return Direction::Rtl,
                Some(Direction::Inherit) => current = self.parent(c),
                None => break,
            }
        }
        Direction::Ltr
    }

    /// Verify the map invariant for every widget:
    /// `mapped ⇒ realized ∧ visible ∧ (no parent ∨ parent mapped)`.
    pub fn map_invariant_holds(&self) -> bool {
        self.nodes.iter().all(|(id, data)| {
            if !data.mapped {
                return true;
            }
            let parent_ok = match self.parent(id) {
                Some(p) => self.nodes[p].mapped,
                None => true,
            };
            data.realized && data.visible && parent_ok
        })
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (WidgetTree, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.create(WidgetData::new("window").visible(true));
        let a = tree.create(WidgetData::new("box").visible(true));
        let b = tree.create(WidgetData::new("box").visible(true));
        let c = tree.create(WidgetData::new("button").visible(true));
        let d = tree.create(WidgetData::new("label").visible(true));
        tree.add(root, a).unwrap();
        tree.add(root, b).unwrap();
        tree.add(a, c).unwrap();
        tree.add(a, d).unwrap();
        (tree, root, a, b, c, d)
    }

    fn mapped_tree() -> (WidgetTree, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let (mut tree, root, a, b, c, d) = build_tree();
        tree.realize(root);
        tree.map(root);
        (tree, root, a, b, c, d)
    }

    #[test]
    fn add_links_parent_and_children() {
        let (tree, root, a, b, c, _d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.children(root), &[a, b]);
    }

    #[test]
    fn add_fails_if_already_parented() {
        let (mut tree, _root, a, b, c, _d) = build_tree();
        assert_eq!(tree.add(b, c), Err(TkError::AlreadyParented));
        // The original parent link is untouched.
        assert_eq!(tree.parent(c), Some(a));
    }

    #[test]
    fn add_fails_on_destroyed() {
        let mut tree = WidgetTree::new();
        let p = tree.create(WidgetData::new("box"));
        let c = tree.create(WidgetData::new("button"));
        tree.destroy(c);
        assert_eq!(tree.add(p, c), Err(TkError::Destroyed));
    }

    #[test]
    fn add_at_position() {
        let mut tree = WidgetTree::new();
        let p = tree.create(WidgetData::new("box"));
        let a = tree.create(WidgetData::new("x"));
        let b = tree.create(WidgetData::new("y"));
        let c = tree.create(WidgetData::new("z"));
        tree.add(p, a).unwrap();
        tree.add(p, b).unwrap();
        tree.add_at(p, c, 1).unwrap();
        assert_eq!(tree.children(p), &[a, c, b]);
    }

    #[test]
    fn add_at_negative_appends() {
        let mut tree = WidgetTree::new();
        let p = tree.create(WidgetData::new("box"));
        let a = tree.create(WidgetData::new("x"));
        let b = tree.create(WidgetData::new("y"));
        tree.add(p, a).unwrap();
        tree.add_at(p, b, -5).unwrap();
        assert_eq!(tree.children(p), &[a, b]);
    }

    #[test]
    fn remove_requires_matching_parent() {
        let (mut tree, _root, _a, b, c, _d) = build_tree();
        assert_eq!(tree.remove(b, c), Err(TkError::NotAChild));
    }

    #[test]
    fn add_remove_round_trip_preserves_siblings() {
        let (mut tree, _root, a, _b, c, d) = build_tree();
        let extra = tree.create(WidgetData::new("entry"));
        tree.add(a, extra).unwrap();
        tree.remove(a, extra).unwrap();
        assert_eq!(tree.children(a), &[c, d]);
        assert_eq!(tree.parent(extra), None);
    }

    #[test]
    fn remove_unmaps_and_unrealizes() {
        let (mut tree, _root, a, _b, c, _d) = mapped_tree();
        assert!(tree.get(c).unwrap().mapped);
        tree.remove(a, c).unwrap();
        let data = tree.get(c).unwrap();
        assert!(!data.mapped);
        assert!(!data.realized);
        assert!(tree.map_invariant_holds());
    }

    #[test]
    fn destroy_is_bottom_up() {
        let (mut tree, root, a, b, c, d) = build_tree();
        tree.destroy(root);
        let log = tree.drain_destroyed();
        assert_eq!(log, vec![c, d, a, b, root]);
    }

    #[test]
    fn destroy_is_idempotent() {
        let (mut tree, root, ..) = build_tree();
        tree.destroy(root);
        tree.drain_destroyed();
        tree.destroy(root);
        assert!(tree.drain_destroyed().is_empty());
    }

    #[test]
    fn destroyed_widget_is_tombstone() {
        let (mut tree, root, a, ..) = build_tree();
        tree.destroy(a);
        assert!(!tree.alive(a));
        assert!(tree.get(a).unwrap().destroyed);
        // Operations on the tombstone fail or no-op.
        let fresh = tree.create(WidgetData::new("x"));
        assert_eq!(tree.add(a, fresh), Err(TkError::Destroyed));
        assert!(!tree.children(root).contains(&a));
    }

    #[test]
    fn realize_propagates_surface() {
        let (mut tree, root, a, _b, c, _d) = build_tree();
        let mut backend = crate::backend::HeadlessBackend::new();
        let surface = {
            use crate::backend::DisplayBackend;
            backend.create_surface().unwrap()
        };
        tree.realize_toplevel(root, surface);
        tree.map(root);
        assert_eq!(tree.get(a).unwrap().surface, Some(surface));
        assert_eq!(tree.get(c).unwrap().surface, Some(surface));
    }

    #[test]
    fn map_requires_visible() {
        let (mut tree, root, ..) = build_tree();
        tree.get_mut(root).unwrap().visible = false;
        tree.realize(root);
        tree.map(root);
        assert!(!tree.get(root).unwrap().mapped);
    }

    #[test]
    fn map_recurses_to_visible_children() {
        let (tree, root, a, b, c, d) = mapped_tree();
        for id in [root, a, b, c, d] {
            assert!(tree.get(id).unwrap().mapped, "{id:?} should be mapped");
        }
        assert!(tree.map_invariant_holds());
    }

    #[test]
    fn hidden_child_not_mapped() {
        let (mut tree, root, ..) = build_tree();
        let hidden = tree.create(WidgetData::new("label"));
        tree.add(root, hidden).unwrap();
        tree.realize(root);
        tree.map(root);
        assert!(!tree.get(hidden).unwrap().mapped);
        assert!(tree.map_invariant_holds());
    }

    #[test]
    fn show_maps_under_mapped_parent() {
        let (mut tree, root, ..) = mapped_tree();
        let late = tree.create(WidgetData::new("label"));
        tree.add(root, late).unwrap();
        assert!(!tree.get(late).unwrap().mapped);
        tree.show(late);
        assert!(tree.get(late).unwrap().mapped);
    }

    #[test]
    fn hide_unmaps_subtree() {
        let (mut tree, _root, a, _b, c, d) = mapped_tree();
        tree.hide(a);
        assert!(!tree.get(a).unwrap().mapped);
        assert!(!tree.get(c).unwrap().mapped);
        assert!(!tree.get(d).unwrap().mapped);
        assert!(tree.map_invariant_holds());
    }

    #[test]
    fn unrealize_descends_first() {
        let (mut tree, root, a, b, c, d) = mapped_tree();
        tree.unrealize(root);
        for id in [root, a, b, c, d] {
            let data = tree.get(id).unwrap();
            assert!(!data.realized);
            assert!(!data.mapped);
        }
    }

    #[test]
    fn foreach_skips_internals_by_default() {
        let mut tree = WidgetTree::new();
        let bar = tree.create(WidgetData::new("actionbar"));
        let internal = tree.create(WidgetData::new("revealer").internal());
        let public = tree.create(WidgetData::new("button"));
        tree.add(bar, internal).unwrap();
        tree.add(bar, public).unwrap();
        assert_eq!(tree.foreach(bar, false), vec![public]);
        assert_eq!(tree.foreach(bar, true), vec![internal, public]);
    }

    #[test]
    fn effective_sensitivity() {
        let (mut tree, _root, a, _b, c, _d) = build_tree();
        assert!(tree.is_sensitive(c));
        tree.get_mut(a).unwrap().sensitive = false;
        assert!(!tree.is_sensitive(c));
        assert!(!tree.is_sensitive(a));
    }

    #[test]
    fn direction_resolution() {
        let (mut tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.resolve_direction(c), Direction::Ltr);
        tree.get_mut(root).unwrap().direction = Direction::Rtl;
        assert_eq!(tree.resolve_direction(c), Direction::Rtl);
        tree.get_mut(a).unwrap().direction = Direction::Ltr;
        assert_eq!(tree.resolve_direction(c), Direction::Ltr);
    }

    #[test]
    fn toplevel_lookup() {
        let (tree, root, _a, _b, c, _d) = build_tree();
        assert_eq!(tree.toplevel(c), root);
        assert_eq!(tree.toplevel(root), root);
    }

    #[test]
    fn walk_depth_first_order() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
    }
}
