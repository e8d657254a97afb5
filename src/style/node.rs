//! The style-node tree: the style engine's mirror of the widget tree.
//!
//! Every widget owns a style node; widgets may also declare "gadget"
//! nodes for style-addressable sub-parts (the revealer inside an action
//! bar), and transient nodes exist for animation snapshots. Nodes carry
//! element name, classes, state flags, and the cached computed style.

use bitflags::bitflags;
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::tree::WidgetId;

use super::value::ComputedStyle;

new_key_type! {
    /// Identifier of a node in the style tree.
    pub struct StyleNodeId;
}

bitflags! {
    /// Widget states addressable from state pseudo-classes.
    pub struct StateFlags: u16 {
        const HOVER = 1 << 0;
        const ACTIVE = 1 << 1;
        const FOCUSED = 1 << 2;
        const DISABLED = 1 << 3;
        const BACKDROP = 1 << 4;
        const CHECKED = 1 << 5;
        const DROP_ACTIVE = 1 << 6;
        const SELECTED = 1 << 7;
        const INSENSITIVE = 1 << 8;
    }
}

bitflags! {
    /// What changed at a node since the last validation.
    pub struct ChangeMask: u8 {
        const STATE = 1 << 0;
        const NAME = 1 << 1;
        const CLASS = 1 << 2;
        const POSITION = 1 << 3;
        const PARENT = 1 << 4;
        const SOURCE = 1 << 5;
    }
}

/// Where a style node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Mirrors a widget.
    WidgetBacked(WidgetId),
    /// A style-addressable sub-part declared by a widget.
    Gadget,
    /// A short-lived node backing an animation snapshot.
    Transient,
}

/// A node in the style tree.
#[derive(Debug, Clone)]
pub struct StyleNode {
    /// CSS element name.
    pub element: String,
    /// Optional `#id`.
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub state: StateFlags,
    pub provenance: Provenance,
    /// Accumulated changes awaiting revalidation.
    pub pending: ChangeMask,
    /// The last validated computed style, if any.
    pub computed: Option<ComputedStyle>,
}

impl StyleNode {
    pub fn new(element: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            element: element.into(),
            id: None,
            classes: Vec::new(),
            state: StateFlags::empty(),
            provenance,
            pending: ChangeMask::empty(),
            computed: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// The style tree arena.
pub struct StyleTree {
    nodes: SlotMap<StyleNodeId, StyleNode>,
    children: SecondaryMap<StyleNodeId, Vec<StyleNodeId>>,
    parent: SecondaryMap<StyleNodeId, StyleNodeId>,
}

const EMPTY: &[StyleNodeId] = &[];

impl StyleTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    pub fn create(&mut self, node: StyleNode) -> StyleNodeId {
        let id = self.nodes.insert(node);
        self.children.insert(id, Vec::new());
        id
    }

    pub fn get(&self, id: StyleNodeId) -> Option<&StyleNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: StyleNodeId) -> Option<&mut StyleNode> {
        self.nodes.get_mut(id)
    }

    pub fn parent(&self, id: StyleNodeId) -> Option<StyleNodeId> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: StyleNodeId) -> &[StyleNodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY)
    }

    /// Attach `child` under `parent` at `position` (clamped to the end).
    /// Siblings from the insertion point on pick up a POSITION change.
    pub fn attach(&mut self, parent: StyleNodeId, child: StyleNodeId, position: usize) {
        self.parent.insert(child, parent);
        let siblings = self.children.entry(parent).expect("live key").or_default();
        let position = position.min(siblings.len());
        siblings.insert(position, child);
        let affected: Vec<StyleNodeId> = siblings[position..].to_vec();
        for id in affected {
            self.mark(id, ChangeMask::POSITION);
        }
        self.mark(child, ChangeMask::PARENT);
    }

    /// Detach `child` from its parent. Following siblings pick up a
    /// POSITION change.
    pub fn detach(&mut self, child: StyleNodeId) {
        if let Some(parent) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(parent) {
                if let Some(pos) = siblings.iter().position(|&c| c == child) {
                    siblings.remove(pos);
                    let affected: Vec<StyleNodeId> = siblings[pos..].to_vec();
                    for id in affected {
                        self.mark(id, ChangeMask::POSITION);
                    }
                }
            }
        }
    }

    /// Remove a node (and recursively its children) from the arena.
    pub fn remove(&mut self, id: StyleNodeId) {
        self.detach(id);
        let kids: Vec<StyleNodeId> = self.children(id).to_vec();
        for child in kids {
            self.parent.remove(child);
            self.remove(child);
        }
        self.children.remove(id);
        self.nodes.remove(id);
    }

    /// Zero-based position among siblings; 0 for a root.
    pub fn position(&self, id: StyleNodeId) -> usize {
        match self.parent(id) {
            Some(p) => self
                .children(p)
                .iter()
                .position(|&c| c == id)
                .unwrap_or(0),
            None => 0,
        }
    }

    pub fn is_first_child(&self, id: StyleNodeId) -> bool {
        match self.parent(id) {
            Some(p) => self.children(p).first() == Some(&id),
            None => true,
        }
    }

    pub fn is_last_child(&self, id: StyleNodeId) -> bool {
        match self.parent(id) {
            Some(p) => self.children(p).last() == Some(&id),
            None => true,
        }
    }

    /// The previous sibling, if any.
    pub fn prev_sibling(&self, id: StyleNodeId) -> Option<StyleNodeId> {
        let p = self.parent(id)?;
        let siblings = self.children(p);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|i| siblings[i])
    }

    /// All preceding siblings, nearest first.
    pub fn preceding_siblings(&self, id: StyleNodeId) -> Vec<StyleNodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(prev) = self.prev_sibling(current) {
            result.push(prev);
            current = prev;
        }
        result
    }

    /// Record a pending change on a node.
    pub fn mark(&mut self, id: StyleNodeId, change: ChangeMask) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.pending |= change;
        }
    }

    /// Update a node's state flags, recording a STATE change if anything
    /// actually flipped. Returns the flags that changed.
    pub fn set_state(&mut self, id: StyleNodeId, state: StateFlags, on: bool) -> StateFlags {
        let Some(node) = self.nodes.get_mut(id) else {
            return StateFlags::empty();
        };
        let before = node.state;
        if on {
            node.state |= state;
        } else {
            node.state &= !state;
        }
        let flipped = before ^ node.state;
        if !flipped.is_empty() {
            node.pending |= ChangeMask::STATE;
        }
        flipped
    }

    pub fn add_class(&mut self, id: StyleNodeId, class: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.has_class(class) {
            node.classes.push(class.to_owned());
            node.pending |= ChangeMask::CLASS;
        }
    }

    pub fn remove_class(&mut self, id: StyleNodeId, class: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.has_class(class) {
            node.classes.retain(|c| c != class);
            node.pending |= ChangeMask::CLASS;
        }
    }

    /// Pre-order traversal from `start`.
    pub fn walk_depth_first(&self, start: StyleNodeId) -> Vec<StyleNodeId> {
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

    /// All roots (nodes without a parent).
    pub fn roots(&self) -> Vec<StyleNodeId> {
        self.nodes
            .keys()
            .filter(|&id| !self.parent.contains_key(id))
            .collect()
    }

    /// Nodes with a non-empty pending change mask.
    pub fn pending_nodes(&self) -> Vec<StyleNodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| !n.pending.is_empty())
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for StyleTree {
    fn default() -> Self {
        Self::new()
    }
}
