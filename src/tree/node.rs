//! Widget identity and per-widget data.

use slotmap::new_key_type;

use crate::backend::SurfaceId;
use crate::geometry::Rect;
use crate::style::node::StyleNodeId;

new_key_type! {
    /// Unique identifier for a widget. Copy, lightweight (u64).
    ///
    /// Slotmap keys are generational, so a stored `WidgetId` whose widget has
    /// been dropped simply stops resolving; this is the weak-reference
    /// mechanism used e.g. by the stack's last-focused back-reference.
    pub struct WidgetId;
}

/// Text direction of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Ltr,
    Rtl,
    /// Resolve against the parent (the default).
    #[default]
    Inherit,
}

/// Data associated with a single widget in the tree.
#[derive(Debug, Clone)]
pub struct WidgetData {
    /// CSS element name (e.g. `actionbar`, `stack`, `button`).
    pub element: String,
    /// Optional unique id (CSS `#id` selector).
    pub id: Option<String>,
    /// CSS classes (for `.class` selectors).
    pub classes: Vec<String>,
    /// Text direction; `Inherit` resolves through the parent chain.
    pub direction: Direction,
    /// Whether the widget wants to be shown. Widgets start hidden.
    pub visible: bool,
    /// Insensitive widgets ignore most input.
    pub sensitive: bool,
    /// Whether this widget can receive keyboard focus.
    pub can_focus: bool,
    /// Whether this widget currently has focus.
    pub has_focus: bool,
    /// Whether the widget participates in tooltip queries.
    pub has_tooltip: bool,
    /// Plain tooltip text.
    pub tooltip_text: Option<String>,
    /// Marked-up tooltip text; wins over `tooltip_text` when both are set.
    pub tooltip_markup: Option<String>,
    /// Internal children are visible to `foreach` only on request; public
    /// add/remove route around them.
    pub internal: bool,
    /// A backing surface has been allocated.
    pub realized: bool,
    /// The widget is eligible for display.
    pub mapped: bool,
    /// Terminal tombstone flag; set once by destroy.
    pub destroyed: bool,
    /// Allocation in parent-relative coordinates.
    pub allocation: Rect,
    /// Clip covering this widget's ink and its descendants' clips.
    pub clip: Rect,
    /// The backing surface, inherited from the toplevel.
    pub surface: Option<SurfaceId>,
    /// Back-reference into the style-node tree.
    pub style_node: Option<StyleNodeId>,
}

impl WidgetData {
    /// Create widget data with the given element name and defaults.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            id: None,
            classes: Vec::new(),
            direction: Direction::Inherit,
            visible: false,
            sensitive: true,
            can_focus: false,
            has_focus: false,
            has_tooltip: false,
            tooltip_text: None,
            tooltip_markup: None,
            internal: false,
            realized: false,
            mapped: false,
            destroyed: false,
            allocation: Rect::zero(),
            clip: Rect::zero(),
            surface: None,
            style_node: None,
        }
    }

    /// Set the CSS id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set visibility (builder).
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set sensitivity (builder).
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Set focusability (builder).
    pub fn can_focus(mut self, can_focus: bool) -> Self {
        self.can_focus = can_focus;
        self
    }

    /// Mark as an internal child (builder).
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Set the tooltip text and the has-tooltip flag (builder).
    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip_text = Some(text.into());
        self.has_tooltip = true;
        self
    }

    /// Check whether this widget has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// The effective tooltip content: markup wins over plain text.
    pub fn tooltip_content(&self) -> Option<&str> {
        self.tooltip_markup
            .as_deref()
            .or(self.tooltip_text.as_deref())
    }
}
