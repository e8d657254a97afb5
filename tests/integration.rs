//! Integration tests for ctk.
//!
//! These tests exercise the public API from outside the crate, driving
//! whole scenarios through the `App` aggregate: building a window,
//! dispatching backend events, advancing the frame clock, and checking
//! the resulting allocations, styles and input state.

use std::time::Duration;

use pretty_assertions::assert_eq;

use ctk::app::App;
use ctk::backend::{DeviceId, SurfaceId};
use ctk::dnd::{DestDefaults, DragAction, TargetEntry, TargetFlags, TargetList};
use ctk::event::{Event, GestureDrag, Modifiers, Phase};
use ctk::geometry::{Point, Size};
use ctk::layout::{allocations_contained, Orientation};
use ctk::style::{PropertyId, StateFlags, Value};
use ctk::tree::{WidgetData, WidgetId};
use ctk::widgets::{ActionBar, BoxContainer, Label, Stack, StackTransition};
use ctk::TkError;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A shown window configured to `size`, ready for hit-testing.
fn shown_window(app: &mut App, size: Size) -> (WidgetId, SurfaceId) {
    let window = app.create_window("test");
    let surface = app.show_window(window).unwrap();
    app.dispatch(&Event::Configure { surface, size });
    (window, surface)
}

/// A label inserted directly into the tree, visible from the start.
fn label(app: &mut App, text: &str) -> WidgetId {
    let id = app.tree.create(WidgetData::new("label").visible(true));
    app.store.insert(id, Box::new(Label::new(text)));
    id
}

fn press(surface: SurfaceId, x: f64, y: f64) -> Event {
    Event::ButtonPress {
        surface,
        position: Point::new(x, y),
        button: 1,
        state: Modifiers::empty(),
        device: DeviceId::CORE_POINTER,
    }
}

fn motion(surface: SurfaceId, x: f64, y: f64) -> Event {
    Event::PointerMotion {
        surface,
        position: Point::new(x, y),
        state: Modifiers::empty(),
        device: DeviceId::CORE_POINTER,
    }
}

fn scroll(surface: SurfaceId, x: f64, y: f64) -> Event {
    Event::Scroll {
        surface,
        position: Point::new(x, y),
        delta_x: 0.0,
        delta_y: -1.0,
        state: Modifiers::empty(),
        device: DeviceId::CORE_POINTER,
    }
}

/// window > box > label, laid out at 200x200. The label sits at the
/// origin of the box, so small coordinates hit it.
fn simple_ui(app: &mut App) -> (WidgetId, SurfaceId, WidgetId, WidgetId) {
    let (window, surface) = shown_window(app, Size::new(200, 200));
    let container = app.create(Box::new(BoxContainer::new(Orientation::Vertical, 0)));
    let inner = label(app, "hello");
    app.adopt(inner);
    app.add(window, container).unwrap();
    app.add(container, inner).unwrap();
    app.tree.show(container);
    app.tree.show(inner);
    app.advance(Duration::from_millis(16));
    (window, surface, container, inner)
}

// ---------------------------------------------------------------------------
// Lifecycle and layout invariants
// ---------------------------------------------------------------------------

#[test]
fn test_map_invariant_and_containment_after_layout() {
    let mut app = App::new_headless();
    let (window, _, _, _) = simple_ui(&mut app);
    assert!(app.tree.map_invariant_holds());
    assert!(allocations_contained(&app.tree, window));
}

#[test]
fn test_hide_window_unmaps_subtree() {
    let mut app = App::new_headless();
    let (window, _, container, inner) = simple_ui(&mut app);
    app.hide_window(window);
    assert!(!app.tree.get(window).unwrap().mapped);
    assert!(!app.tree.get(container).unwrap().mapped);
    assert!(!app.tree.get(inner).unwrap().mapped);
    // Visibility is remembered across the hide.
    assert!(app.tree.get(inner).unwrap().visible);
}

#[test]
fn test_destroy_is_idempotent() {
    let mut app = App::new_headless();
    let (window, _, _, inner) = simple_ui(&mut app);
    app.destroy(window);
    app.destroy(window);
    assert!(!app.tree.alive(window));
    assert!(!app.tree.alive(inner));
}

// ---------------------------------------------------------------------------
// Action bar
// ---------------------------------------------------------------------------

#[test]
fn test_action_bar_centers_the_center_child() {
    let mut app = App::new_headless();
    let (window, _) = shown_window(&mut app, Size::new(200, 100));
    let bar = ActionBar::create(&mut app.tree, &mut app.store);
    let start = label(&mut app, "ab");
    let end = label(&mut app, "cd");
    let center = label(&mut app, "cc");
    ActionBar::pack_start(&mut app.tree, &mut app.store, bar, start).unwrap();
    ActionBar::pack_end(&mut app.tree, &mut app.store, bar, end).unwrap();
    ActionBar::set_center(&mut app.tree, &mut app.store, bar, Some(center)).unwrap();
    app.adopt(bar);
    app.add(window, bar).unwrap();
    app.tree.show(bar);
    app.advance(Duration::from_millis(16));

    // "cc" measures 17px; centering on 200 lands at 91 or 92.
    let x = app.tree.get(center).unwrap().allocation.x;
    assert!((90..=92).contains(&x), "center at {x}");
    // The end child hugs the right edge.
    let end_alloc = app.tree.get(end).unwrap().allocation;
    assert_eq!(end_alloc.x + end_alloc.width, 200);
}

#[test]
fn test_action_bar_reveal_collapses_over_time() {
    let mut app = App::new_headless();
    let (window, _) = shown_window(&mut app, Size::new(200, 100));
    let bar = ActionBar::create(&mut app.tree, &mut app.store);
    let child = label(&mut app, "ab");
    ActionBar::pack_start(&mut app.tree, &mut app.store, bar, child).unwrap();
    app.adopt(bar);
    app.add(window, bar).unwrap();
    app.tree.show(bar);
    app.advance(Duration::from_millis(16));

    let full = app
        .measure_ctx()
        .measure(bar, Orientation::Vertical, 200)
        .natural;
    assert!(full > 0);

    let clock = app.clock().clone();
    ActionBar::set_revealed(&mut app.store, bar, false, &clock).unwrap();
    assert!(!ActionBar::revealed(&app.store, bar));

    // Halfway through the slide the bar is partially collapsed.
    app.advance(Duration::from_millis(125));
    let partial = app
        .measure_ctx()
        .measure(bar, Orientation::Vertical, 200)
        .natural;
    assert!(partial > 0 && partial < full, "partial {partial} of {full}");

    // After the full duration it takes no space at all.
    app.advance(Duration::from_millis(200));
    let collapsed = app
        .measure_ctx()
        .measure(bar, Orientation::Vertical, 200)
        .natural;
    assert_eq!(collapsed, 0);
}

// ---------------------------------------------------------------------------
// Stack transitions
// ---------------------------------------------------------------------------

#[test]
fn test_stack_slide_left_offsets_both_pages() {
    let mut app = App::new_headless();
    let (window, _) = shown_window(&mut app, Size::new(120, 100));
    let stack = app.create(Box::new(
        Stack::new().with_transition(StackTransition::SlideLeft),
    ));
    let first = label(&mut app, "one");
    let second = label(&mut app, "two");
    Stack::add_named(&mut app.tree, &mut app.store, stack, first, "one").unwrap();
    Stack::add_named(&mut app.tree, &mut app.store, stack, second, "two").unwrap();
    app.add(window, stack).unwrap();
    app.tree.show(stack);
    app.advance(Duration::from_millis(16));
    assert_eq!(app.tree.get(first).unwrap().allocation.x, 0);

    let clock = app.clock().clone();
    Stack::set_visible_child_name(&mut app.store, stack, "two", &clock).unwrap();
    app.advance(Duration::from_millis(100));

    // Halfway: the outgoing page has slid partway off to the left and
    // the incoming page trails it by exactly one stack width.
    let old_x = app.tree.get(first).unwrap().allocation.x;
    let new_x = app.tree.get(second).unwrap().allocation.x;
    assert!(old_x < 0 && old_x > -120, "old page at {old_x}");
    assert_eq!(new_x, old_x + 120);

    app.advance(Duration::from_millis(150));
    assert_eq!(app.tree.get(second).unwrap().allocation.x, 0);
    assert!(!app
        .store
        .downcast::<Stack>(stack)
        .unwrap()
        .transition_running());
}

#[test]
fn test_stack_duplicate_page_name_fails() {
    let mut app = App::new_headless();
    let stack = app.create(Box::new(Stack::new()));
    let first = label(&mut app, "one");
    let second = label(&mut app, "two");
    Stack::add_named(&mut app.tree, &mut app.store, stack, first, "page").unwrap();
    let err = Stack::add_named(&mut app.tree, &mut app.store, stack, second, "page");
    assert_eq!(err, Err(TkError::DuplicateChildName("page".into())));
}

#[test]
fn test_stack_switch_to_current_is_a_noop() {
    let mut app = App::new_headless();
    let stack = app.create(Box::new(
        Stack::new().with_transition(StackTransition::Crossfade),
    ));
    let first = label(&mut app, "one");
    Stack::add(&mut app.tree, &mut app.store, stack, first).unwrap();
    let clock = app.clock().clone();
    Stack::set_visible_child(&mut app.store, stack, first, &clock).unwrap();
    let this = app.store.downcast::<Stack>(stack).unwrap();
    assert_eq!(this.visible_child(), Some(first));
    assert!(!this.transition_running());
}

// ---------------------------------------------------------------------------
// Event dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_capture_runs_before_target_and_bubble() {
    let mut app = App::new_headless();
    let (window, surface, container, inner) = simple_ui(&mut app);
    let outcome = app.dispatch(&press(surface, 5.0, 5.0));
    assert_eq!(outcome.target, Some(inner));
    assert_eq!(
        outcome.delivered,
        vec![
            (window, Phase::Capture),
            (container, Phase::Capture),
            (inner, Phase::Capture),
            (inner, Phase::Target),
            (inner, Phase::Bubble),
            (container, Phase::Bubble),
            (window, Phase::Bubble),
        ]
    );
}

#[test]
fn test_insensitive_widgets_see_capture_but_not_bubble() {
    let mut app = App::new_headless();
    let (window, surface, container, inner) = simple_ui(&mut app);
    app.set_sensitive(container, false);

    // A scroll still reaches the window even though the chain under the
    // pointer is insensitive.
    let outcome = app.dispatch(&scroll(surface, 5.0, 5.0));
    assert_eq!(outcome.target, Some(inner));
    assert_eq!(
        outcome.delivered,
        vec![
            (window, Phase::Capture),
            (container, Phase::Capture),
            (inner, Phase::Capture),
            (window, Phase::Bubble),
        ]
    );
}

#[test]
fn test_toolkit_grab_redirects_outside_events() {
    let mut app = App::new_headless();
    let (_, surface, _, inner) = simple_ui(&mut app);
    let grabber = label(&mut app, "modal");
    app.adopt(grabber);

    app.group.grab_add(&app.tree, grabber);
    let outcome = app.dispatch(&press(surface, 5.0, 5.0));
    assert!(outcome.redirected);
    assert_eq!(outcome.target, Some(grabber));
    assert_ne!(outcome.target, Some(inner));
}

#[test]
fn test_grab_stack_restores_on_remove() {
    let mut app = App::new_headless();
    let a = label(&mut app, "a");
    let b = label(&mut app, "b");
    app.group.grab_add(&app.tree, a);
    app.group.grab_add(&app.tree, b);
    assert_eq!(app.group.current_grab(), Some(b));
    app.group.grab_remove(&app.tree, b);
    assert_eq!(app.group.current_grab(), Some(a));
    app.group.grab_remove(&app.tree, a);
    assert_eq!(app.group.current_grab(), None);
}

#[test]
fn test_removing_a_shadowed_grab_is_silent() {
    let mut app = App::new_headless();
    let a = label(&mut app, "a");
    let b = label(&mut app, "b");
    app.group.grab_add(&app.tree, a);
    app.group.grab_add(&app.tree, b);
    let notifies = app.group.grab_remove(&app.tree, a);
    assert!(notifies.is_empty());
    assert_eq!(app.group.current_grab(), Some(b));
}

#[test]
fn test_key_snoopers_swallow_before_propagation() {
    let mut app = App::new_headless();
    let (window, surface, _, inner) = simple_ui(&mut app);
    app.windows.set_focus(&mut app.tree, window, Some(inner));

    let cookie = app
        .dispatcher
        .add_key_snooper(Box::new(|_target: Option<WidgetId>, _event: &Event| true));
    let outcome = app.dispatch(&Event::KeyPress {
        surface,
        keyval: 0x61,
        state: Modifiers::empty(),
        device: DeviceId::CORE_KEYBOARD,
    });
    assert!(outcome.snooped);
    assert!(outcome.delivered.is_empty());

    app.dispatcher.remove_key_snooper(cookie).unwrap();
    assert_eq!(
        app.dispatcher.remove_key_snooper(cookie),
        Err(TkError::InvalidInhibitorCookie(cookie))
    );
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

#[test]
fn test_drag_gesture_recognizes_past_the_threshold() {
    let mut app = App::new_headless();
    let (_, surface, _, inner) = simple_ui(&mut app);
    app.dispatcher
        .add_controller(inner, Box::new(GestureDrag::new(1)));

    app.dispatch(&press(surface, 5.0, 5.0));
    // 3-4-5: distance 5 stays under the threshold of 8.
    app.dispatch(&motion(surface, 8.0, 9.0));
    let gesture = app
        .dispatcher
        .controllers_mut(inner)
        .unwrap()
        .find_mut::<GestureDrag>()
        .unwrap();
    assert!(!gesture.is_recognized());

    app.dispatch(&motion(surface, 13.0, 5.0));
    let gesture = app
        .dispatcher
        .controllers_mut(inner)
        .unwrap()
        .find_mut::<GestureDrag>()
        .unwrap();
    assert!(gesture.is_recognized());
    assert_eq!(gesture.offset(), Some(Point::new(8.0, 0.0)));
}

// ---------------------------------------------------------------------------
// Tooltips
// ---------------------------------------------------------------------------

#[test]
fn test_tooltip_shows_after_hover_delay() {
    let mut app = App::new_headless();
    let (_, surface, _, inner) = simple_ui(&mut app);
    {
        let data = app.tree.get_mut(inner).unwrap();
        data.has_tooltip = true;
        data.tooltip_text = Some("Saves the file".into());
    }

    app.dispatch(&motion(surface, 5.0, 5.0));
    app.advance(Duration::from_millis(400));
    assert!(app.tooltips.visible().is_none());

    app.advance(Duration::from_millis(150));
    let shown = app.tooltips.visible().expect("tooltip after the delay");
    assert_eq!(shown.widget, inner);
    assert_eq!(shown.content, "Saves the file");
    assert!(app.tooltips.is_browsing());
}

#[test]
fn test_tooltip_browse_mode_shortens_the_delay() {
    let mut app = App::new_headless();
    let (window, surface, container, first) = simple_ui(&mut app);
    let second = label(&mut app, "other");
    app.adopt(second);
    app.add(container, second).unwrap();
    app.tree.show(second);
    let _ = window;
    for id in [first, second] {
        let data = app.tree.get_mut(id).unwrap();
        data.has_tooltip = true;
        data.tooltip_text = Some("tip".into());
    }
    app.advance(Duration::from_millis(16));

    // First tooltip needs the full hover delay.
    app.dispatch(&motion(surface, 5.0, 5.0));
    app.advance(Duration::from_millis(550));
    assert!(app.tooltips.visible().is_some());

    // Moving to a sibling while browsing shows almost immediately.
    app.dispatch(&motion(surface, 5.0, 25.0));
    app.advance(Duration::from_millis(70));
    let shown = app.tooltips.visible().expect("browse-mode tooltip");
    assert_eq!(shown.widget, second);
}

// ---------------------------------------------------------------------------
// Drag-and-drop
// ---------------------------------------------------------------------------

fn plain_text_targets() -> TargetList {
    TargetList::from_entries(vec![TargetEntry::new(
        "text/plain",
        TargetFlags::empty(),
        7,
    )])
}

#[test]
fn test_drop_negotiates_action_and_clears_highlight() {
    let mut app = App::new_headless();
    let (window, surface, container, source) = simple_ui(&mut app);
    let dest = label(&mut app, "drop here");
    app.adopt(dest);
    app.add(container, dest).unwrap();
    app.tree.show(dest);
    let _ = window;
    app.advance(Duration::from_millis(16));

    app.dnd.source_set(
        source,
        1,
        plain_text_targets(),
        DragAction::COPY | DragAction::MOVE,
    );
    app.dnd
        .dest_set(dest, DestDefaults::all(), plain_text_targets(), DragAction::COPY);
    app.dnd.begin_drag(source).unwrap();

    // The second row of the box is the destination label.
    app.dispatch(&Event::DragMotion {
        surface,
        position: Point::new(5.0, 25.0),
        state: Modifiers::empty(),
    });
    let node = app.tree.get(dest).unwrap().style_node.unwrap();
    assert!(app
        .styles
        .get(node)
        .unwrap()
        .state
        .contains(StateFlags::DROP_ACTIVE));

    let request = app
        .dnd
        .drop(&app.tree, &mut app.styles, dest)
        .unwrap()
        .expect("matching target");
    assert_eq!(request.dest, dest);
    assert_eq!(request.target, "text/plain");
    assert_eq!(request.action, DragAction::COPY);
    assert_eq!(request.info, 7);
    assert!(app.dnd.active_drag().is_none());
    assert!(!app
        .styles
        .get(node)
        .unwrap()
        .state
        .contains(StateFlags::DROP_ACTIVE));
}

#[test]
fn test_drop_on_a_non_destination_fails() {
    let mut app = App::new_headless();
    let (_, _, _, inner) = simple_ui(&mut app);
    let err = app.dnd.drop(&app.tree, &mut app.styles, inner);
    assert_eq!(err, Err(TkError::NotADropDestination));
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[test]
fn test_application_css_reaches_widgets() {
    let mut app = App::new_headless();
    let (_, _, _, inner) = simple_ui(&mut app);
    app.add_css("label { opacity: 0.5; }");
    app.advance(Duration::from_millis(16));
    assert_eq!(
        app.presented_value(inner, PropertyId::Opacity),
        Some(Value::Number(0.5))
    );
}

#[test]
fn test_revalidation_is_idempotent() {
    let mut app = App::new_headless();
    let _ = simple_ui(&mut app);
    app.add_css("label { opacity: 0.5; }");
    app.advance(Duration::from_millis(16));
    let report = app.advance(Duration::from_millis(16));
    assert!(report.style_changes.is_empty());
}
