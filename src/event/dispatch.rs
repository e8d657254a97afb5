//! The event pipeline: target lookup, grab redirection, key snooping,
//! then capture / target / bubble propagation.

use slotmap::SecondaryMap;

use crate::backend::SurfaceId;
use crate::diag::TkError;
use crate::event::event::{Event, Handled};
use crate::event::gesture::{ControllerSet, EventController, Phase};
use crate::event::grab::WindowGroup;
use crate::geometry::Point;
use crate::style::StyleTree;
use crate::tree::{WidgetId, WidgetTree, WindowList};
use crate::widget::WidgetStore;

/// Left Alt; pressing it toggles mnemonic visibility.
const KEYVAL_ALT_L: u32 = 0xffe9;

/// Mutable toolkit state handed to widget event handlers.
pub struct EventCtx<'a> {
    pub tree: &'a mut WidgetTree,
    pub styles: &'a mut StyleTree,
    redraw_requested: bool,
    relayout_requested: bool,
}

impl<'a> EventCtx<'a> {
    pub fn new(tree: &'a mut WidgetTree, styles: &'a mut StyleTree) -> Self {
        Self {
            tree,
            styles,
            redraw_requested: false,
            relayout_requested: false,
        }
    }

    /// Ask for a repaint after dispatch.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Ask for a fresh layout pass after dispatch.
    pub fn request_relayout(&mut self) {
        self.relayout_requested = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    pub fn relayout_requested(&self) -> bool {
        self.relayout_requested
    }
}

/// Sees key events before normal dispatch; returning `true` swallows.
pub trait KeySnooper {
    fn snoop(&mut self, target: Option<WidgetId>, event: &Event) -> bool;
}

impl<F: FnMut(Option<WidgetId>, &Event) -> bool> KeySnooper for F {
    fn snoop(&mut self, target: Option<WidgetId>, event: &Event) -> bool {
        self(target, event)
    }
}

/// What happened to one dispatched event.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// The widget the event resolved to after grab rewriting.
    pub target: Option<WidgetId>,
    /// Every handler invocation, in order.
    pub delivered: Vec<(WidgetId, Phase)>,
    /// The widget that consumed the event, if any.
    pub handled_by: Option<WidgetId>,
    /// A key snooper swallowed the event before propagation.
    pub snooped: bool,
    /// A toolkit grab redirected the event away from its natural target.
    pub redirected: bool,
    pub redraw_requested: bool,
    pub relayout_requested: bool,
}

/// Routes backend events through grabs, snoopers and the three
/// propagation phases.
pub struct Dispatcher {
    /// LIFO stack of events currently being dispatched; reentrant
    /// dispatch from a handler pushes on top.
    current: Vec<Event>,
    snoopers: Vec<(u32, Box<dyn KeySnooper>)>,
    /// Runs before every registered snooper.
    accessibility_snooper: Option<Box<dyn KeySnooper>>,
    next_cookie: u32,
    controllers: SecondaryMap<WidgetId, ControllerSet>,
    mnemonics_visible: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            snoopers: Vec::new(),
            accessibility_snooper: None,
            next_cookie: 1,
            controllers: SecondaryMap::new(),
            mnemonics_visible: false,
        }
    }

    /// The event being dispatched right now, if any.
    pub fn current_event(&self) -> Option<&Event> {
        self.current.last()
    }

    pub fn mnemonics_visible(&self) -> bool {
        self.mnemonics_visible
    }

    /// Register a key snooper. Returns a cookie for removal.
    pub fn add_key_snooper(&mut self, snooper: Box<dyn KeySnooper>) -> u32 {
        let cookie = self.next_cookie;
        self.next_cookie += 1;
        self.snoopers.push((cookie, snooper));
        cookie
    }

    /// Remove a key snooper by cookie.
    pub fn remove_key_snooper(&mut self, cookie: u32) -> Result<(), TkError> {
        let before = self.snoopers.len();
        self.snoopers.retain(|(c, _)| *c != cookie);
        if self.snoopers.len() == before {
            return Err(TkError::InvalidInhibitorCookie(cookie));
        }
        Ok(())
    }

    /// Install the accessibility snooper, which runs first.
    pub fn set_accessibility_snooper(&mut self, snooper: Box<dyn KeySnooper>) {
        self.accessibility_snooper = Some(snooper);
    }

    /// Attach an event controller to a widget.
    pub fn add_controller(&mut self, widget: WidgetId, controller: Box<dyn EventController>) {
        self.controllers
            .entry(widget)
            .expect("live key")
            .or_default()
            .push(controller);
    }

    /// The controllers attached to a widget.
    pub fn controllers_mut(&mut self, widget: WidgetId) -> Option<&mut ControllerSet> {
        self.controllers.get_mut(widget)
    }

    /// Drop controller state for a destroyed widget.
    pub fn forget_widget(&mut self, widget: WidgetId) {
        self.controllers.remove(widget);
    }

    /// The toplevel whose surface delivered the event.
    pub fn surface_toplevel(&self, tree: &WidgetTree, surface: SurfaceId) -> Option<WidgetId> {
        tree.roots()
            .into_iter()
            .find(|&root| tree.get(root).and_then(|d| d.surface) == Some(surface))
    }

    /// The deepest mapped widget whose allocation contains `position`
    /// (toplevel-relative), with the position in that widget's frame.
    pub fn pick(
        &self,
        tree: &WidgetTree,
        toplevel: WidgetId,
        position: Point,
    ) -> (WidgetId, Point) {
        let mut current = toplevel;
        let mut local = position;
        'descend: loop {
            for &child in tree.children(current).iter().rev() {
                let Some(data) = tree.get(child) else {
                    continue;
                };
                if !data.mapped {
                    continue;
                }
                let alloc = data.allocation;
                if local.x >= alloc.x as f64
                    && local.x < (alloc.x + alloc.width) as f64
                    && local.y >= alloc.y as f64
                    && local.y < (alloc.y + alloc.height) as f64
                {
                    local = Point::new(local.x - alloc.x as f64, local.y - alloc.y as f64);
                    current = child;
                    continue 'descend;
                }
            }
            return (current, local);
        }
    }

    /// Absolute origin of a widget within its toplevel.
    fn absolute_origin(&self, tree: &WidgetTree, widget: WidgetId) -> Point {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut current = Some(widget);
        while let Some(id) = current {
            if let Some(data) = tree.get(id) {
                x += data.allocation.x as f64;
                y += data.allocation.y as f64;
            }
            current = tree.parent(id);
        }
        Point::new(x, y)
    }

    /// Run the full pipeline for one backend event.
    pub fn dispatch(
        &mut self,
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        styles: &mut StyleTree,
        windows: &WindowList,
        group: &mut WindowGroup,
        event: &Event,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        if let Event::KeyPress { keyval, .. } = event {
            if *keyval == KEYVAL_ALT_L {
                self.mnemonics_visible = true;
            }
        }
        if let Event::KeyRelease { keyval, .. } = event {
            if *keyval == KEYVAL_ALT_L {
                self.mnemonics_visible = false;
            }
        }

        // Target lookup. Keys go to the focus widget of the active
        // window; positioned events hit-test the surface's toplevel.
        let natural_target = if event.is_key() || matches!(event, Event::FocusChange { .. }) {
            windows
                .active()
                .and_then(|w| windows.focus_widget(w))
                .or_else(|| self.surface_toplevel(tree, event.surface()))
        } else if let Some(position) = event.position() {
            self.surface_toplevel(tree, event.surface())
                .map(|toplevel| self.pick(tree, toplevel, position).0)
        } else {
            self.surface_toplevel(tree, event.surface())
        };

        let mut target = natural_target;

        // Backend device grabs rewrite the target first.
        if let Some(device) = event.device() {
            if let Some(redirect) = group.device_redirect(device) {
                if target != Some(redirect) {
                    target = Some(redirect);
                    outcome.redirected = true;
                }
            }
        }

        self.current.push(event.clone());

        // Key snoopers run before propagation; the accessibility snooper
        // always goes first.
        if event.is_key() {
            let mut swallowed = false;
            if let Some(snooper) = self.accessibility_snooper.as_mut() {
                swallowed = snooper.snoop(target, event);
            }
            if !swallowed {
                for (_, snooper) in &mut self.snoopers {
                    if snooper.snoop(target, event) {
                        swallowed = true;
                        break;
                    }
                }
            }
            if swallowed {
                outcome.target = target;
                outcome.snooped = true;
                self.current.pop();
                return outcome;
            }
        }

        // Toolkit grab: everything outside the grab subtree is
        // redirected to the grab widget, with a short exemption list.
        if let Some(grab) = group.current_grab() {
            if !event.exempt_from_grab() {
                if let Some(t) = target {
                    if !tree.is_ancestor_or_self(grab, t) {
                        target = Some(grab);
                        outcome.redirected = true;
                    }
                }
            }
        }

        outcome.target = target;
        let Some(target) = target else {
            self.current.pop();
            return outcome;
        };

        let mut ctx_flags = (false, false);
        let handled_by = self.propagate(
            tree,
            store,
            styles,
            target,
            event,
            &mut outcome.delivered,
            &mut ctx_flags,
        );
        outcome.handled_by = handled_by;
        outcome.redraw_requested = ctx_flags.0;
        outcome.relayout_requested = ctx_flags.1;

        self.current.pop();
        outcome
    }

    fn propagate(
        &mut self,
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        styles: &mut StyleTree,
        target: WidgetId,
        event: &Event,
        delivered: &mut Vec<(WidgetId, Phase)>,
        ctx_flags: &mut (bool, bool),
    ) -> Option<WidgetId> {
        // Path from the toplevel down to the target, inclusive.
        let mut path = tree.ancestors(target);
        path.reverse();
        path.push(target);

        // Capture phase: root towards the target. Every widget on the
        // path sees the event, sensitivity only gates consumption at the
        // target and bubble stages.
        for &id in &path {
            delivered.push((id, Phase::Capture));
            if self.offer_widget(tree, store, styles, id, event, Phase::Capture, true, ctx_flags) {
                return Some(id);
            }
        }

        // Target phase. An insensitive target never consumes.
        if tree.is_sensitive(target) {
            delivered.push((target, Phase::Target));
            if self.offer_widget(tree, store, styles, target, event, Phase::Target, true, ctx_flags)
            {
                return Some(target);
            }
        }

        // Bubble phase: starts at the target (its bubble controllers,
        // the handler already ran), then ancestors towards the root.
        // Insensitive widgets are skipped but never stop the walk, so
        // e.g. scrolls keep rising until a sensitive ancestor takes
        // them.
        for &id in path.iter().rev() {
            if !tree.is_sensitive(id) {
                continue;
            }
            delivered.push((id, Phase::Bubble));
            let run_handler = id != target;
            if self.offer_widget(
                tree,
                store,
                styles,
                id,
                event,
                Phase::Bubble,
                run_handler,
                ctx_flags,
            ) {
                return Some(id);
            }
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn offer_widget(
        &mut self,
        tree: &mut WidgetTree,
        store: &mut WidgetStore,
        styles: &mut StyleTree,
        id: WidgetId,
        event: &Event,
        phase: Phase,
        run_handler: bool,
        ctx_flags: &mut (bool, bool),
    ) -> bool {
        let origin = self.absolute_origin(tree, id);
        let local = event.translated(-origin.x, -origin.y);

        if let Some(set) = self.controllers.get_mut(id) {
            if set.offer(phase, &local).is_handled() {
                return true;
            }
        }
        if !run_handler {
            return false;
        }

        let Some(mut widget) = store.take(id) else {
            return false;
        };
        let mut ctx = EventCtx::new(tree, styles);
        let handled = match phase {
            Phase::Capture => widget.captured_event(&mut ctx, id, &local),
            _ => widget.event(&mut ctx, id, &local),
        };
        ctx_flags.0 |= ctx.redraw_requested();
        ctx_flags.1 |= ctx.relayout_requested();
        store.put(id, widget);
        handled.is_handled()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::backend::DeviceId;
    use crate::event::event::Modifiers;
    use crate::geometry::Rect;
    use crate::layout::{MeasureCtx, Measurement, Orientation};
    use crate::tree::WidgetData;
    use crate::widget::Widget;

    /// Records every handler call; consumes according to configuration.
    struct Recorder {
        log: Rc<RefCell<Vec<(WidgetId, Phase)>>>,
        consume_target: bool,
        consume_capture: bool,
    }

    impl Recorder {
        fn new(log: Rc<RefCell<Vec<(WidgetId, Phase)>>>) -> Self {
            Self {
                log,
                consume_target: false,
                consume_capture: false,
            }
        }
    }

    impl Widget for Recorder {
        fn element(&self) -> &str {
            "recorder"
        }

        fn measure(
            &self,
            _ctx: &MeasureCtx<'_>,
            _id: WidgetId,
            _orientation: Orientation,
            _for_size: i32,
        ) -> Measurement {
            Measurement::ZERO
        }

        fn event(&mut self, _ctx: &mut EventCtx<'_>, id: WidgetId, _event: &Event) -> Handled {
            self.log.borrow_mut().push((id, Phase::Target));
            if self.consume_target {
                Handled::Yes
            } else {
                Handled::No
            }
        }

        fn captured_event(
            &mut self,
            _ctx: &mut EventCtx<'_>,
            id: WidgetId,
            _event: &Event,
        ) -> Handled {
            self.log.borrow_mut().push((id, Phase::Capture));
            if self.consume_capture {
                Handled::Yes
            } else {
                Handled::No
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Fixture {
        tree: WidgetTree,
        store: WidgetStore,
        styles: StyleTree,
        windows: WindowList,
        group: WindowGroup,
        dispatcher: Dispatcher,
        log: Rc<RefCell<Vec<(WidgetId, Phase)>>>,
        surface: SurfaceId,
        root: WidgetId,
        middle: WidgetId,
        leaf: WidgetId,
    }

    /// window(200x200) > box(10,10,100x100) > button(5,5,50x50).
    fn fixture() -> Fixture {
        let mut tree = WidgetTree::new();
        let mut store = WidgetStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let root = tree.create(WidgetData::new("window"));
        let middle = tree.create(WidgetData::new("box"));
        let leaf = tree.create(WidgetData::new("button"));
        tree.add(root, middle).unwrap();
        tree.add(middle, leaf).unwrap();

        let mut backend = crate::backend::HeadlessBackend::new();
        let surface = crate::backend::DisplayBackend::create_surface(&mut backend).unwrap();
        tree.get_mut(root).unwrap().visible = true;
        tree.get_mut(middle).unwrap().visible = true;
        tree.get_mut(leaf).unwrap().visible = true;
        tree.realize_toplevel(root, surface);
        tree.map(root);

        tree.get_mut(root).unwrap().allocation = Rect::new(0, 0, 200, 200);
        tree.get_mut(middle).unwrap().allocation = Rect::new(10, 10, 100, 100);
        tree.get_mut(leaf).unwrap().allocation = Rect::new(5, 5, 50, 50);

        for id in [root, middle, leaf] {
            store.insert(id, Box::new(Recorder::new(log.clone())));
        }

        let mut windows = WindowList::new();
        windows.register(root);

        Fixture {
            tree,
            store,
            styles: StyleTree::new(),
            windows,
            group: WindowGroup::new(),
            dispatcher: Dispatcher::new(),
            log,
            surface,
            root,
            middle,
            leaf,
        }
    }

    fn click(surface: SurfaceId, x: f64, y: f64) -> Event {
        Event::ButtonPress {
            surface,
            position: Point::new(x, y),
            button: 1,
            state: Modifiers::empty(),
            device: DeviceId::CORE_POINTER,
        }
    }

    impl Fixture {
        fn dispatch(&mut self, event: &Event) -> DispatchOutcome {
            self.dispatcher.dispatch(
                &mut self.tree,
                &mut self.store,
                &mut self.styles,
                &self.windows,
                &mut self.group,
                event,
            )
        }
    }

    #[test]
    fn picks_deepest_widget_under_pointer() {
        let f = fixture();
        let (hit, local) = f.dispatcher.pick(&f.tree, f.root, Point::new(20.0, 20.0));
        assert_eq!(hit, f.leaf);
        assert_eq!(local, Point::new(5.0, 5.0));
        let (hit, _) = f.dispatcher.pick(&f.tree, f.root, Point::new(150.0, 150.0));
        assert_eq!(hit, f.root);
    }

    #[test]
    fn capture_then_target_then_bubble() {
        let mut f = fixture();
        let outcome = f.dispatch(&click(f.surface, 20.0, 20.0));
        assert_eq!(outcome.target, Some(f.leaf));
        assert_eq!(outcome.handled_by, None);
        assert_eq!(
            *f.log.borrow(),
            vec![
                (f.root, Phase::Capture),
                (f.middle, Phase::Capture),
                (f.leaf, Phase::Capture),
                (f.leaf, Phase::Target),
                (f.middle, Phase::Target),
                (f.root, Phase::Target),
            ]
        );
        // The dispatcher's own record distinguishes bubble invocations,
        // which start at the target for its controllers.
        assert_eq!(outcome.delivered[4], (f.leaf, Phase::Bubble));
        assert_eq!(outcome.delivered[5], (f.middle, Phase::Bubble));
        assert_eq!(outcome.delivered[6], (f.root, Phase::Bubble));
    }

    #[test]
    fn capture_consumption_stops_descent() {
        let mut f = fixture();
        f.store.downcast_mut::<Recorder>(f.middle).unwrap().consume_capture = true;
        let outcome = f.dispatch(&click(f.surface, 20.0, 20.0));
        assert_eq!(outcome.handled_by, Some(f.middle));
        assert_eq!(
            *f.log.borrow(),
            vec![(f.root, Phase::Capture), (f.middle, Phase::Capture)]
        );
    }

    #[test]
    fn target_consumption_stops_bubble() {
        let mut f = fixture();
        f.store.downcast_mut::<Recorder>(f.leaf).unwrap().consume_target = true;
        let outcome = f.dispatch(&click(f.surface, 20.0, 20.0));
        assert_eq!(outcome.handled_by, Some(f.leaf));
        assert_eq!(f.log.borrow().len(), 4);
    }

    #[test]
    fn insensitive_target_skipped_but_captured() {
        let mut f = fixture();
        f.tree.get_mut(f.leaf).unwrap().sensitive = false;
        let outcome = f.dispatch(&click(f.surface, 20.0, 20.0));
        assert_eq!(outcome.target, Some(f.leaf));
        // Capture ran on all three, target phase skipped, bubble hits
        // the sensitive ancestors.
        assert_eq!(
            *f.log.borrow(),
            vec![
                (f.root, Phase::Capture),
                (f.middle, Phase::Capture),
                (f.leaf, Phase::Capture),
                (f.middle, Phase::Target),
                (f.root, Phase::Target),
            ]
        );
    }

    #[test]
    fn scroll_passes_insensitive_chain() {
        let mut f = fixture();
        f.tree.get_mut(f.leaf).unwrap().sensitive = false;
        f.tree.get_mut(f.middle).unwrap().sensitive = false;
        let scroll = Event::Scroll {
            surface: f.surface,
            position: Point::new(20.0, 20.0),
            delta_x: 0.0,
            delta_y: 3.0,
            state: Modifiers::empty(),
            device: DeviceId::CORE_POINTER,
        };
        let outcome = f.dispatch(&scroll);
        // Only the sensitive root gets a bubble-phase chance.
        let bubbles: Vec<_> = outcome
            .delivered
            .iter()
            .filter(|(_, p)| *p == Phase::Bubble)
            .collect();
        assert_eq!(bubbles, vec![&(f.root, Phase::Bubble)]);
    }

    #[test]
    fn grab_redirects_outside_clicks() {
        let mut f = fixture();
        f.group.grab_add(&f.tree, f.leaf);
        // Click lands on the root's empty corner; grab pulls it to leaf.
        let outcome = f.dispatch(&click(f.surface, 150.0, 150.0));
        assert_eq!(outcome.target, Some(f.leaf));
        assert!(outcome.redirected);
    }

    #[test]
    fn grab_leaves_inside_clicks_alone() {
        let mut f = fixture();
        f.group.grab_add(&f.tree, f.middle);
        let outcome = f.dispatch(&click(f.surface, 20.0, 20.0));
        assert_eq!(outcome.target, Some(f.leaf));
        assert!(!outcome.redirected);
    }

    #[test]
    fn destroy_is_exempt_from_grab() {
        let mut f = fixture();
        f.group.grab_add(&f.tree, f.leaf);
        let outcome = f.dispatch(&Event::Destroy { surface: f.surface });
        assert_eq!(outcome.target, Some(f.root));
        assert!(!outcome.redirected);
    }

    #[test]
    fn key_events_go_to_focus_widget() {
        let mut f = fixture();
        let leaf = f.leaf;
        let root = f.root;
        f.windows.set_focus(&mut f.tree, root, Some(leaf));
        let key = Event::KeyPress {
            surface: f.surface,
            keyval: 0x61,
            state: Modifiers::empty(),
            device: DeviceId::CORE_KEYBOARD,
        };
        let outcome = f.dispatch(&key);
        assert_eq!(outcome.target, Some(leaf));
    }

    #[test]
    fn snoopers_run_in_order_and_swallow() {
        let mut f = fixture();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = order.clone();
        f.dispatcher.set_accessibility_snooper(Box::new(
            move |_: Option<WidgetId>, _: &Event| {
                o1.borrow_mut().push("a11y");
                false
            },
        ));
        let o2 = order.clone();
        f.dispatcher
            .add_key_snooper(Box::new(move |_: Option<WidgetId>, _: &Event| {
                o2.borrow_mut().push("first");
                true
            }));
        let o3 = order.clone();
        f.dispatcher
            .add_key_snooper(Box::new(move |_: Option<WidgetId>, _: &Event| {
                o3.borrow_mut().push("second");
                false
            }));
        let key = Event::KeyPress {
            surface: f.surface,
            keyval: 0x61,
            state: Modifiers::empty(),
            device: DeviceId::CORE_KEYBOARD,
        };
        let outcome = f.dispatch(&key);
        assert!(outcome.snooped);
        assert_eq!(*order.borrow(), vec!["a11y", "first"]);
        assert!(f.log.borrow().is_empty());
    }

    #[test]
    fn snooper_cookie_removal() {
        let mut dispatcher = Dispatcher::new();
        let cookie =
            dispatcher.add_key_snooper(Box::new(|_: Option<WidgetId>, _: &Event| false));
        assert!(dispatcher.remove_key_snooper(cookie).is_ok());
        assert_eq!(
            dispatcher.remove_key_snooper(cookie),
            Err(TkError::InvalidInhibitorCookie(cookie))
        );
    }

    #[test]
    fn current_event_stack_is_lifo() {
        let mut f = fixture();
        assert!(f.dispatcher.current_event().is_none());
        f.dispatch(&click(f.surface, 20.0, 20.0));
        // After dispatch the stack unwinds fully.
        assert!(f.dispatcher.current_event().is_none());
    }

    #[test]
    fn alt_toggles_mnemonics() {
        let mut f = fixture();
        let press = Event::KeyPress {
            surface: f.surface,
            keyval: KEYVAL_ALT_L,
            state: Modifiers::empty(),
            device: DeviceId::CORE_KEYBOARD,
        };
        f.dispatch(&press);
        assert!(f.dispatcher.mnemonics_visible());
        let release = Event::KeyRelease {
            surface: f.surface,
            keyval: KEYVAL_ALT_L,
            state: Modifiers::empty(),
            device: DeviceId::CORE_KEYBOARD,
        };
        f.dispatch(&release);
        assert!(!f.dispatcher.mnemonics_visible());
    }

    #[test]
    fn device_grab_rewrites_target() {
        let mut f = fixture();
        let pen = DeviceId(7);
        f.group.device_grab_add(pen, f.middle, false);
        let event = Event::PointerMotion {
            surface: f.surface,
            position: Point::new(150.0, 150.0),
            state: Modifiers::empty(),
            device: pen,
        };
        let outcome = f.dispatch(&event);
        assert_eq!(outcome.target, Some(f.middle));
        assert!(outcome.redirected);
        // The core pointer is unaffected by a non-blocking grab.
        let outcome = f.dispatch(&click(f.surface, 150.0, 150.0));
        assert_eq!(outcome.target, Some(f.root));
    }
}
