//! The application aggregate: one place that owns the widget tree, the
//! style engine, windows, input state and the backend, and keeps them
//! consistent.
//!
//! Frame order is fixed: the clock advances, animations tick, style
//! changes are computed and delivered, then layout runs. Style-change
//! consumers therefore always see a validated style tree before the
//! next allocate pass.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::backend::{
    DisplayBackend, FixedFontMetrics, FontMetrics, FrameClock, HeadlessBackend, SurfaceId,
};
use crate::context::Context;
use crate::diag::{BackendError, CollectingSink, TkError};
use crate::dnd::DndManager;
use crate::event::{DispatchOutcome, Dispatcher, Event, TooltipManager, WindowGroup};
use crate::geometry::Size;
use crate::layout::{layout_toplevel, LayoutCtx, MeasureCtx};
use crate::style::animation::{Easing, TransitionSet};
use crate::style::theme;
use crate::style::{
    Affects, ChangeMask, ComputedStyle, Priority, PropertyId, Provenance, StateFlags, StyleChange,
    StyleEngine, StyleNode, StyleNodeId, StyleTree, Value,
};
use crate::tree::{WidgetData, WidgetId, WidgetTree, WindowList};
use crate::widget::{Widget, WidgetStore};
use crate::widgets::{Revealer, Stack, Window};

/// The result of one frame advance.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub style_changes: Vec<StyleChange>,
    /// Whether anything is still animating after this frame.
    pub animating: bool,
    /// Whether a layout pass ran.
    pub laid_out: bool,
}

/// Owns all toolkit state for one application.
pub struct App {
    pub context: Context,
    pub tree: WidgetTree,
    pub store: WidgetStore,
    pub styles: StyleTree,
    pub engine: StyleEngine,
    pub windows: WindowList,
    pub group: WindowGroup,
    pub dispatcher: Dispatcher,
    pub tooltips: TooltipManager,
    pub dnd: DndManager,
    pub sink: CollectingSink,
    backend: Box<dyn DisplayBackend>,
    fonts: Box<dyn FontMetrics>,
    /// Property transitions per style node.
    transitions: HashMap<StyleNodeId, TransitionSet>,
    /// Window content sizes from the latest configure.
    window_sizes: HashMap<WidgetId, Size>,
    /// Elements whose default CSS is already installed.
    default_css_installed: HashSet<String>,
}

impl App {
    /// An app against the in-process backend and fixed font metrics,
    /// with the built-in fallback style installed.
    pub fn new_headless() -> Self {
        let sink = CollectingSink::new();
        let mut engine = StyleEngine::new();
        theme::install_fallback(&mut engine, &sink);
        Self {
            context: Context::default(),
            tree: WidgetTree::new(),
            store: WidgetStore::new(),
            styles: StyleTree::new(),
            engine,
            windows: WindowList::new(),
            group: WindowGroup::new(),
            dispatcher: Dispatcher::new(),
            tooltips: TooltipManager::new(),
            dnd: DndManager::new(),
            sink,
            backend: Box::new(HeadlessBackend::new()),
            fonts: Box::new(FixedFontMetrics),
            transitions: HashMap::new(),
            window_sizes: HashMap::new(),
            default_css_installed: HashSet::new(),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        self.backend.clock()
    }

    pub fn backend_mut(&mut self) -> &mut dyn DisplayBackend {
        self.backend.as_mut()
    }

    // ── Widget construction ──

    /// Register a widget behavior under a fresh tree node, mirror it
    /// with a style node, and install the widget type's default CSS the
    /// first time the element appears.
    pub fn create(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let element = widget.element().to_owned();
        let default_css = widget.default_css().to_owned();
        let id = self.tree.create(WidgetData::new(element.as_str()));
        let node = self
            .styles
            .create(StyleNode::new(element.as_str(), Provenance::WidgetBacked(id)));
        self.tree.get_mut(id).expect("just created").style_node = Some(node);
        self.store.insert(id, widget);
        if !default_css.is_empty() && self.default_css_installed.insert(element) {
            self.engine
                .add_provider(Priority::Fallback, &default_css, &self.sink);
            self.styles.mark(node, ChangeMask::SOURCE);
        }
        id
    }

    /// Adopt a widget that was built through a factory which already
    /// created its tree nodes (action bars, windows). Mirrors the whole
    /// subtree with style nodes.
    pub fn adopt(&mut self, id: WidgetId) {
        for widget in self.tree.walk_depth_first(id) {
            if self.tree.get(widget).is_some_and(|d| d.style_node.is_some()) {
                continue;
            }
            let element = self
                .store
                .get(widget)
                .map(|w| w.element().to_owned())
                .or_else(|| self.tree.get(widget).map(|d| d.element.clone()))
                .unwrap_or_default();
            let node = self.styles.create(StyleNode::new(
                element.as_str(),
                Provenance::WidgetBacked(widget),
            ));
            self.tree.get_mut(widget).expect("walked").style_node = Some(node);
            if let Some(css) = self.store.get(widget).map(|w| w.default_css().to_owned()) {
                if !css.is_empty() && self.default_css_installed.insert(element) {
                    self.engine.add_provider(Priority::Fallback, &css, &self.sink);
                    self.styles.mark(node, ChangeMask::SOURCE);
                }
            }
            if let Some(parent) = self.tree.parent(widget) {
                if let Some(parent_node) = self.tree.get(parent).and_then(|d| d.style_node) {
                    let position = self
                        .tree
                        .children(parent)
                        .iter()
                        .position(|&c| c == widget)
                        .unwrap_or(0);
                    self.styles.attach(parent_node, node, position);
                }
            }
        }
    }

    /// A toplevel window registered with the window list.
    pub fn create_window(&mut self, title: &str) -> WidgetId {
        let id = Window::create(&mut self.tree, &mut self.store, title);
        self.adopt(id);
        self.windows.register(id);
        id
    }

    // ── Tree mutation with style mirroring ──

    /// Append a child, keeping the style tree in step.
    pub fn add(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TkError> {
        self.add_at(parent, child, -1)
    }

    /// Insert a child at a position (negative appends).
    pub fn add_at(&mut self, parent: WidgetId, child: WidgetId, position: i32) -> Result<(), TkError> {
        self.tree.add_at(parent, child, position)?;
        let (Some(parent_node), Some(child_node)) = (
            self.tree.get(parent).and_then(|d| d.style_node),
            self.tree.get(child).and_then(|d| d.style_node),
        ) else {
            return Ok(());
        };
        let style_position = self
            .tree
            .children(parent)
            .iter()
            .position(|&c| c == child)
            .unwrap_or(0);
        self.styles.attach(parent_node, child_node, style_position);
        Ok(())
    }

    /// Remove a child, detaching its style node.
    pub fn remove(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TkError> {
        self.tree.remove(parent, child)?;
        if let Some(node) = self.tree.get(child).and_then(|d| d.style_node) {
            self.styles.detach(node);
        }
        Ok(())
    }

    /// Destroy a widget subtree and drop every registration that
    /// pointed into it.
    pub fn destroy(&mut self, widget: WidgetId) {
        let subtree = self.tree.walk_depth_first(widget);
        self.tree.destroy(widget);
        for id in subtree {
            if let Some(node) = self.tree.get(id).and_then(|d| d.style_node) {
                self.transitions.remove(&node);
                self.styles.remove(node);
            }
            if let Some(data) = self.tree.get_mut(id) {
                data.style_node = None;
            }
            self.store.remove(id);
            self.dispatcher.forget_widget(id);
            self.dnd.forget_widget(id);
            self.window_sizes.remove(&id);
        }
        self.windows.prune(&self.tree);
        self.group.prune(&self.tree);
    }

    // ── Windows ──

    /// Show a window: make it visible, realize it against a fresh
    /// backend surface, and map it.
    pub fn show_window(&mut self, window: WidgetId) -> Result<SurfaceId, BackendError> {
        let surface = match self.tree.get(window).and_then(|d| d.surface) {
            Some(existing) => existing,
            None => self.backend.create_surface()?,
        };
        if let Some(data) = self.tree.get_mut(window) {
            data.visible = true;
        }
        self.tree.realize_toplevel(window, surface);
        self.tree.map(window);
        self.windows.activate(window);
        Ok(surface)
    }

    /// Hide a window and release its surface.
    pub fn hide_window(&mut self, window: WidgetId) {
        self.tree.hide(window);
        self.tree.unrealize(window);
        if let Some(surface) = self.tree.get(window).and_then(|d| d.surface) {
            self.backend.destroy_surface(surface);
        }
        if let Some(data) = self.tree.get_mut(window) {
            data.surface = None;
        }
    }

    /// The size a window lays out at: the last configure, or the widget
    /// default.
    pub fn window_size(&self, window: WidgetId) -> Size {
        self.window_sizes.get(&window).copied().unwrap_or_else(|| {
            self.store
                .downcast::<Window>(window)
                .map(|w| w.default_size())
                .unwrap_or(Size::new(640, 480))
        })
    }

    // ── State plumbing ──

    /// Flip style state flags on a widget's style node.
    pub fn set_state(&mut self, widget: WidgetId, state: StateFlags, on: bool) {
        if let Some(node) = self.tree.get(widget).and_then(|d| d.style_node) {
            self.styles.set_state(node, state, on);
        }
    }

    /// Set widget sensitivity, mirroring the insensitive style state.
    pub fn set_sensitive(&mut self, widget: WidgetId, sensitive: bool) {
        if let Some(data) = self.tree.get_mut(widget) {
            data.sensitive = sensitive;
        }
        self.set_state(widget, StateFlags::INSENSITIVE, !sensitive);
    }

    /// Install application-level CSS.
    pub fn add_css(&mut self, css: &str) {
        self.engine.add_provider(Priority::Application, css, &self.sink);
        for root in self.styles.roots() {
            self.styles.mark(root, ChangeMask::SOURCE);
        }
    }

    /// Switch to a named theme from the standard search paths.
    pub fn set_theme(&mut self, name: &str) -> bool {
        let installed = theme::install_theme(
            &mut self.engine,
            name,
            &theme::default_search_paths(),
            &self.sink,
        );
        if installed {
            for root in self.styles.roots() {
                self.styles.mark(root, ChangeMask::SOURCE);
            }
        }
        installed
    }

    // ── Events ──

    /// Route one backend event through the pipeline, then update
    /// crossing-derived state, tooltips and drag-and-drop.
    pub fn dispatch(&mut self, event: &Event) -> DispatchOutcome {
        if let Event::Configure { surface, size } = event {
            if let Some(window) = self.dispatcher.surface_toplevel(&self.tree, *surface) {
                self.window_sizes.insert(window, *size);
            }
        }

        let outcome = self.dispatcher.dispatch(
            &mut self.tree,
            &mut self.store,
            &mut self.styles,
            &self.windows,
            &mut self.group,
            event,
        );

        match event {
            Event::Enter { .. } => {
                if let Some(target) = outcome.target {
                    self.set_state(target, StateFlags::HOVER, true);
                }
            }
            Event::Leave { .. } => {
                if let Some(target) = outcome.target {
                    self.set_state(target, StateFlags::HOVER, false);
                }
            }
            Event::FocusChange { surface, focus_in } => {
                if let Some(window) = self.dispatcher.surface_toplevel(&self.tree, *surface) {
                    if *focus_in {
                        self.windows.activate(window);
                        for candidate in self.windows.iter().collect::<Vec<_>>() {
                            if let Some(node) =
                                self.tree.get(candidate).and_then(|d| d.style_node)
                            {
                                self.styles.set_state(
                                    node,
                                    StateFlags::BACKDROP,
                                    candidate != window,
                                );
                            }
                        }
                    } else if let Some(node) =
                        self.tree.get(window).and_then(|d| d.style_node)
                    {
                        self.styles.set_state(node, StateFlags::BACKDROP, true);
                    }
                }
            }
            Event::DragMotion { .. } => {
                if let Some(target) = outcome.target {
                    self.dnd.motion(&self.tree, &mut self.styles, target);
                }
            }
            Event::DragLeave { .. } => {
                self.dnd.leave(&self.tree, &mut self.styles);
            }
            Event::Drop { .. } => {
                if let Some(target) = outcome.target {
                    // A refused drop is not an application error here;
                    // the site check already warned.
                    let _ = self.dnd.drop(&self.tree, &mut self.styles, target);
                }
            }
            Event::GrabBroken { .. } => {
                self.dnd.cancel(&self.tree, &mut self.styles);
            }
            _ => {}
        }

        self.tooltips
            .handle_event(&self.tree, outcome.target, event, self.backend.clock().now());
        outcome
    }

    // ── Frame advance ──

    /// Advance the frame clock and run one frame: animations, style
    /// revalidation (with transitions), then layout.
    pub fn advance(&mut self, delta: Duration) -> FrameReport {
        let now = self.backend.clock_mut().advance(delta);
        let mut report = FrameReport::default();

        report.animating |= self.tick_widget_animations(now);
        report.animating |= self.tick_transitions(now);

        self.tooltips.tick(&self.tree, now);

        // Snapshot cached styles so transitions can start from the old
        // value once revalidation reports a change. Revalidation spreads
        // invalidations itself, so the snapshot covers every node rather
        // than just the ones already marked.
        let mut old: HashMap<StyleNodeId, ComputedStyle> = HashMap::new();
        for root in self.styles.roots() {
            for node in self.styles.walk_depth_first(root) {
                if let Some(computed) = self.styles.get(node).and_then(|n| n.computed.clone()) {
                    old.insert(node, computed);
                }
            }
        }

        report.style_changes = self.engine.revalidate(&mut self.styles);
        self.start_transitions(&report.style_changes, &old);

        report.laid_out = report.animating
            || !self.window_sizes.is_empty()
            || report
                .style_changes
                .iter()
                .any(|c| c.affects.contains(Affects::SIZE));
        if report.laid_out {
            self.layout();
        }
        report
    }

    /// Run the allocate pass over every visible window.
    pub fn layout(&mut self) {
        let windows: Vec<WidgetId> = self
            .windows
            .iter()
            .filter(|&w| self.tree.get(w).is_some_and(|d| d.visible))
            .collect();
        for window in windows {
            let size = self.window_size(window);
            let mut ctx = LayoutCtx {
                tree: &mut self.tree,
                store: &mut self.store,
                styles: &self.styles,
                fonts: self.fonts.as_ref(),
            };
            layout_toplevel(&mut ctx, window, size);
        }
    }

    /// A measurement context over the current state.
    pub fn measure_ctx(&self) -> MeasureCtx<'_> {
        MeasureCtx {
            tree: &self.tree,
            store: &self.store,
            styles: &self.styles,
            fonts: self.fonts.as_ref(),
        }
    }

    /// The presented value of a property on a widget: the transition
    /// value while one runs, the computed value otherwise.
    pub fn presented_value(&self, widget: WidgetId, property: PropertyId) -> Option<Value> {
        let node = self.tree.get(widget)?.style_node?;
        let now = self.backend.clock().now();
        if let Some(value) = self
            .transitions
            .get(&node)
            .and_then(|set| set.presented(property, now))
        {
            return Some(value);
        }
        Some(
            self.styles
                .get(node)?
                .computed
                .as_ref()?
                .get(property)
                .clone(),
        )
    }

    fn tick_widget_animations(&mut self, now: Duration) -> bool {
        let mut animating = false;
        for id in self.tree.roots() {
            for widget in self.tree.walk_depth_first(id) {
                if let Some(revealer) = self.store.downcast_mut::<Revealer>(widget) {
                    animating |= revealer.tick(now);
                } else if let Some(stack) = self.store.downcast_mut::<Stack>(widget) {
                    animating |= stack.tick(now);
                }
            }
        }
        animating
    }

    fn tick_transitions(&mut self, now: Duration) -> bool {
        self.transitions.retain(|_, set| {
            set.advance(now);
            !set.is_empty()
        });
        !self.transitions.is_empty()
    }

    /// Start transitions for animatable property changes on nodes whose
    /// new style carries a non-zero transition duration.
    fn start_transitions(
        &mut self,
        changes: &[StyleChange],
        old: &HashMap<StyleNodeId, ComputedStyle>,
    ) {
        for change in changes {
            let Some(previous) = old.get(&change.node) else {
                continue;
            };
            let Some(current) = self
                .styles
                .get(change.node)
                .and_then(|n| n.computed.as_ref())
            else {
                continue;
            };
            let duration = current
                .get(PropertyId::TransitionDuration)
                .as_ms()
                .unwrap_or(0.0);
            if duration <= 0.0 {
                continue;
            }
            let duration = Duration::from_millis(
                self.context.animation_duration(duration.round() as u64),
            );
            let easing = current
                .get(PropertyId::TransitionTimingFunction)
                .as_keyword()
                .and_then(Easing::from_keyword)
                .unwrap_or(Easing::Ease);
            for &property in &change.changed {
                if !property.is_animatable() {
                    continue;
                }
                self.transitions.entry(change.node).or_default().start(
                    self.backend.clock(),
                    property,
                    previous.get(property).clone(),
                    current.get(property).clone(),
                    duration,
                    easing,
                );
            }
        }
    }
}
