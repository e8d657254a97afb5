//! Provider compilation, selector matching and the cascade.
//!
//! Providers are compiled stylesheets tagged with a priority band. For a
//! given style node the engine collects every declaration whose selector
//! matches, orders them by [`Specificity`], and merges them into a
//! [`ComputedStyle`], resolving `inherit`, named defaults, and relative
//! lengths along the way.

use crate::diag::{Diagnostic, DiagnosticSink, SourceLocation};

use super::model::{Combinator, CompoundSelector, Selector, SelectorComponent, SelectorPart};
use super::model::{Parity, Structural};
use super::node::{ChangeMask, StyleNodeId, StyleTree};
use super::parser::parse_css;
use super::properties::resolve_declaration;
use super::specificity::Specificity;
use super::value::{Affects, ComputedStyle, PropertyId, Value};

/// Provider priority bands, lowest first. Higher bands win the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    Fallback = 0,
    Theme = 1,
    Settings = 2,
    Application = 3,
    User = 4,
}

/// A selector with its pre-resolved declarations.
#[derive(Debug, Clone)]
struct CompiledRule {
    selector: Selector,
    /// `(property, value, important)` triples.
    declarations: Vec<(PropertyId, Value, bool)>,
    source_order: u32,
}

/// A compiled stylesheet in a priority band.
#[derive(Debug)]
struct Provider {
    priority: Priority,
    rules: Vec<CompiledRule>,
}

/// The per-node outcome of a revalidation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleChange {
    pub node: StyleNodeId,
    pub changed: Vec<PropertyId>,
    pub affects: Affects,
}

/// The style engine: an ordered set of providers plus root font metrics.
pub struct StyleEngine {
    providers: Vec<Provider>,
    /// Base for `rem` resolution.
    pub root_font_size: f64,
}

impl StyleEngine {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            root_font_size: 16.0,
        }
    }

    /// Parse and compile a stylesheet into a provider.
    ///
    /// Parse and value-grammar problems are reported to `sink` with their
    /// source location; the offending declarations are skipped and the
    /// rest of the sheet is kept.
    pub fn add_provider(&mut self, priority: Priority, css: &str, sink: &dyn DiagnosticSink) {
        let output = parse_css(css);
        for diagnostic in output.diagnostics {
            sink.report(diagnostic);
        }

        let mut rules = Vec::new();
        let mut source_order = 0u32;
        for rule in &output.stylesheet.rules {
            let mut declarations = Vec::new();
            for declaration in &rule.declarations {
                match resolve_declaration(declaration) {
                    Ok(resolved) => {
                        for (property, value) in resolved {
                            declarations.push((property, value, declaration.important));
                        }
                    }
                    Err(message) => {
                        sink.report(Diagnostic::parse_warning(
                            message,
                            SourceLocation::at(css, declaration.offset),
                        ));
                    }
                }
            }
            for selector in &rule.selectors {
                rules.push(CompiledRule {
                    selector: selector.clone(),
                    declarations: declarations.clone(),
                    source_order,
                });
                source_order += 1;
            }
        }

        self.providers.push(Provider { priority, rules });
    }

    /// Drop all providers in a band (used when the theme is swapped).
    pub fn remove_providers(&mut self, priority: Priority) {
        self.providers.retain(|p| p.priority != priority);
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    // ── Matching ─────────────────────────────────────────────────────

    fn compound_matches(tree: &StyleTree, node: StyleNodeId, compound: &CompoundSelector) -> bool {
        let Some(data) = tree.get(node) else {
            return false;
        };
        compound.components.iter().all(|component| match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(name) => data.element == *name,
            SelectorComponent::Class(name) => data.has_class(name),
            SelectorComponent::Id(name) => data.id.as_deref() == Some(name.as_str()),
            SelectorComponent::State(state) => data.state.contains(*state),
            SelectorComponent::Structural(structural) => match structural {
                Structural::FirstChild => tree.is_first_child(node),
                Structural::LastChild => tree.is_last_child(node),
                Structural::NthChild(parity) => {
                    // 1-based child index parity.
                    let index = tree.position(node) + 1;
                    match parity {
                        Parity::Odd => index % 2 == 1,
                        Parity::Even => index % 2 == 0,
                    }
                }
            },
        })
    }

    /// Right-to-left selector matching: the key compound must match the
    /// subject node, then each combinator is verified walking leftwards.
    pub fn selector_matches(tree: &StyleTree, node: StyleNodeId, selector: &Selector) -> bool {
        Self::match_parts(tree, node, &selector.parts)
    }

    fn match_parts(tree: &StyleTree, node: StyleNodeId, parts: &[SelectorPart]) -> bool {
        let Some((SelectorPart::Compound(compound), rest)) = parts.split_last() else {
            return false;
        };
        if !Self::compound_matches(tree, node, compound) {
            return false;
        }
        let Some((SelectorPart::Combinator(combinator), rest)) = rest.split_last() else {
            // No combinator left: the whole chain matched.
            return rest.is_empty();
        };
        match combinator {
            Combinator::Child => match tree.parent(node) {
                Some(parent) => Self::match_parts(tree, parent, rest),
                None => false,
            },
            Combinator::Descendant => {
                let mut current = tree.parent(node);
                while let Some(ancestor) = current {
                    if Self::match_parts(tree, ancestor, rest) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
            Combinator::NextSibling => match tree.prev_sibling(node) {
                Some(prev) => Self::match_parts(tree, prev, rest),
                None => false,
            },
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node)
                .into_iter()
                .any(|sibling| Self::match_parts(tree, sibling, rest)),
        }
    }

    // ── Cascade ──────────────────────────────────────────────────────

    /// Compute the style of one node given its parent's computed style.
    pub fn compute(
        &self,
        tree: &StyleTree,
        node: StyleNodeId,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        // Collect matching declarations with their specificity.
        let mut candidates: Vec<(Specificity, PropertyId, &Value)> = Vec::new();
        for provider in &self.providers {
            for rule in &provider.rules {
                if !Self::selector_matches(tree, node, &rule.selector) {
                    continue;
                }
                for (property, value, important) in &rule.declarations {
                    let specificity = Specificity::from_selector(
                        &rule.selector,
                        provider.priority,
                        rule.source_order,
                        *important,
                    );
                    candidates.push((specificity, *property, value));
                }
            }
        }
        // Ascending sort; applying in order leaves the winner in place.
        candidates.sort_by_key(|(specificity, ..)| *specificity);

        let mut declared: [Option<&Value>; PropertyId::COUNT] = [None; PropertyId::COUNT];
        for (_, property, value) in &candidates {
            declared[property.index()] = Some(value);
        }

        let parent_font = parent.map(|p| p.font_size()).unwrap_or(self.root_font_size);

        let mut computed = ComputedStyle::initial();
        // Font size first so nothing resolves against a stale base.
        let mut order: Vec<PropertyId> = vec![PropertyId::FontSize];
        order.extend(
            PropertyId::ALL
                .iter()
                .copied()
                .filter(|p| *p != PropertyId::FontSize),
        );
        for property in order {
            let value = match declared[property.index()] {
                Some(value) => {
                    Self::resolve(value.clone(), parent_font, self.root_font_size)
                }
                None => {
                    if property.is_inherited() {
                        match parent {
                            Some(parent) => parent.get(property).clone(),
                            None => property.initial(),
                        }
                    } else {
                        property.initial()
                    }
                }
            };
            computed.set(property, value);
        }
        computed
    }

    fn resolve(value: Value, parent_font: f64, root_font: f64) -> Value {
        match value {
            Value::Length(length) => Value::Px(length.resolve(parent_font, root_font)),
            other => other,
        }
    }

    // ── Invalidation and revalidation ────────────────────────────────

    /// Spread pending change masks to the nodes whose match results could
    /// be affected, per the change kind.
    pub fn propagate_invalidations(&self, tree: &mut StyleTree) {
        let pending: Vec<(StyleNodeId, ChangeMask)> = tree
            .pending_nodes()
            .into_iter()
            .filter_map(|id| tree.get(id).map(|n| (id, n.pending)))
            .collect();

        for (node, mask) in pending {
            if mask.contains(ChangeMask::SOURCE) {
                // New provider: everything reachable from every root.
                for root in tree.roots() {
                    for id in tree.walk_depth_first(root) {
                        tree.mark(id, ChangeMask::SOURCE);
                    }
                }
                continue;
            }
            if mask.intersects(ChangeMask::STATE | ChangeMask::CLASS | ChangeMask::NAME) {
                // Descendants whose selectors reference states/classes may
                // rematch against this node through a combinator.
                let descendants: Vec<StyleNodeId> =
                    tree.walk_depth_first(node).into_iter().skip(1).collect();
                for id in descendants {
                    if self.any_selector_depends(tree, id, mask) {
                        tree.mark(id, mask & !ChangeMask::PARENT);
                    }
                }
            }
            if mask.contains(ChangeMask::POSITION) {
                // Structural pseudo-classes look at sibling positions.
                if let Some(parent) = tree.parent(node) {
                    let siblings: Vec<StyleNodeId> = tree.children(parent).to_vec();
                    for id in siblings {
                        if self.any_selector_structural(tree, id) {
                            tree.mark(id, ChangeMask::POSITION);
                        }
                    }
                }
            }
        }
    }

    fn any_selector_depends(&self, tree: &StyleTree, node: StyleNodeId, mask: ChangeMask) -> bool {
        if tree.get(node).is_none() {
            return false;
        }
        self.providers.iter().any(|provider| {
            provider.rules.iter().any(|rule| {
                (mask.contains(ChangeMask::STATE)
                    && !rule.selector.referenced_states().is_empty())
                    || (mask.contains(ChangeMask::CLASS)
                        && !rule.selector.referenced_classes().is_empty())
                    || (mask.contains(ChangeMask::NAME) && rule.selector.parts.len() > 1)
            })
        })
    }

    fn any_selector_structural(&self, _tree: &StyleTree, _node: StyleNodeId) -> bool {
        self.providers
            .iter()
            .any(|p| p.rules.iter().any(|r| r.selector.has_structural()))
    }

    /// Revalidate every pending node (top-down so inherited values flow),
    /// diff against the cached computed style, cache the new one, clear
    /// the change mask, and report what changed.
    pub fn revalidate(&self, tree: &mut StyleTree) -> Vec<StyleChange> {
        self.propagate_invalidations(tree);

        let mut changes = Vec::new();
        for root in tree.roots() {
            self.revalidate_subtree(tree, root, None, false, &mut changes);
        }
        changes
    }

    fn revalidate_subtree(
        &self,
        tree: &mut StyleTree,
        node: StyleNodeId,
        parent: Option<&ComputedStyle>,
        parent_changed: bool,
        changes: &mut Vec<StyleChange>,
    ) {
        let pending = tree.get(node).map(|n| n.pending).unwrap_or(ChangeMask::empty());
        let needs_compute =
            !pending.is_empty() || parent_changed || tree.get(node).is_none_or(|n| n.computed.is_none());

        let (style, this_changed) = if needs_compute {
            let fresh = self.compute(tree, node, parent);
            let data = tree.get_mut(node).expect("live node");
            let changed: Vec<PropertyId> = match &data.computed {
                Some(old) => old.diff(&fresh),
                None => PropertyId::ALL.to_vec(),
            };
            let had_cache = data.computed.is_some();
            data.computed = Some(fresh.clone());
            data.pending = ChangeMask::empty();
            if !changed.is_empty() && had_cache {
                let affects = changed
                    .iter()
                    .fold(Affects::empty(), |acc, p| acc | p.affects());
                changes.push(StyleChange {
                    node,
                    changed: changed.clone(),
                    affects,
                });
            }
            (fresh, !changed.is_empty())
        } else {
            (
                tree.get(node)
                    .and_then(|n| n.computed.clone())
                    .expect("checked above"),
                false,
            )
        };

        let kids: Vec<StyleNodeId> = tree.children(node).to_vec();
        for child in kids {
            self.revalidate_subtree(tree, child, Some(&style), this_changed, changes);
        }
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}
