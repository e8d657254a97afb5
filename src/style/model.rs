//! CSS AST: selectors, declarations, rule sets.

use super::node::StateFlags;

/// Parity argument of `:nth-child()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Odd,
    Even,
}

/// A structural pseudo-class: matches on sibling position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structural {
    FirstChild,
    LastChild,
    NthChild(Parity),
}

/// A single CSS selector component.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Element selector: matches the style node's element name
    /// (e.g. `actionbar`, `stack`, `button`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// State pseudo-class: `:hover`, `:focus`, `:backdrop`, etc.
    State(StateFlags),
    /// Structural pseudo-class: `:first-child`, `:nth-child(odd)`, etc.
    Structural(Structural),
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Next-sibling combinator: `A + B`.
    NextSibling,
    /// Subsequent-sibling combinator: `A ~ B`.
    SubsequentSibling,
}

/// A single compound selector: a sequence of components without combinators.
///
/// For example, `button.suggested:hover` is one `CompoundSelector` with
/// components `Type("button")`, `Class("suggested")`, `State(HOVER)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// The union of all state flags this compound references.
    pub fn referenced_states(&self) -> StateFlags {
        let mut states = StateFlags::empty();
        for component in &self.components {
            if let SelectorComponent::State(s) = component {
                states |= *s;
            }
        }
        states
    }

    /// Whether this compound contains a structural pseudo-class.
    pub fn has_structural(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, SelectorComponent::Structural(_)))
    }
}

/// One element in a selector chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full CSS selector: compound selectors joined by combinators.
///
/// `window > box.linked:hover` becomes
/// `[Compound(window), Combinator(Child), Compound(box.linked:hover)]`.
/// Parts always start and end with a `Compound`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The right-most compound selector, the one matched against the
    /// subject node.
    pub fn key_compound(&self) -> Option<&CompoundSelector> {
        self.parts.iter().rev().find_map(|p| match p {
            SelectorPart::Compound(c) => Some(c),
            SelectorPart::Combinator(_) => None,
        })
    }

    /// The union of state flags referenced anywhere in the selector.
    pub fn referenced_states(&self) -> StateFlags {
        let mut states = StateFlags::empty();
        for part in &self.parts {
            if let SelectorPart::Compound(c) = part {
                states |= c.referenced_states();
            }
        }
        states
    }

    /// The classes referenced anywhere in the selector.
    pub fn referenced_classes(&self) -> Vec<&str> {
        let mut classes = Vec::new();
        for part in &self.parts {
            if let SelectorPart::Compound(c) = part {
                for component in &c.components {
                    if let SelectorComponent::Class(name) = component {
                        classes.push(name.as_str());
                    }
                }
            }
        }
        classes
    }

    /// Whether any compound contains a structural pseudo-class.
    pub fn has_structural(&self) -> bool {
        self.parts.iter().any(|p| match p {
            SelectorPart::Compound(c) => c.has_structural(),
            SelectorPart::Combinator(_) => false,
        })
    }
}

/// A value token within a declaration, before property-level validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// An identifier like `red`, `bold`, `slide-left`.
    Ident(String),
    /// A bare number like `10`, `0.5`.
    Number(f64),
    /// A number with a unit suffix: `12px`, `1.5em`, `50%`, `250ms`.
    Dimension(f64, String),
    /// A hex color string without the `#` prefix, e.g. `"ff00aa"`.
    Color(String),
    /// A quoted string value.
    String(String),
}

/// A single property declaration, e.g. `color: red !important`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
    /// Byte offset of the property name in the source, for diagnostics.
    pub offset: usize,
}

/// A CSS rule: selectors paired with declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed CSS stylesheet.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }
}
