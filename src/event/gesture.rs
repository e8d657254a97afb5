//! Event controllers and the drag gesture.
//!
//! Controllers attach to a widget at a propagation phase. Gestures are
//! controllers with per-sequence claim state: a claimed sequence cancels
//! every other gesture tracking it on the same widget.

use std::any::Any;

use crate::event::event::{Event, Handled};
use crate::geometry::Point;

/// Distance in pixels a press must travel before a drag is recognized.
pub const DRAG_THRESHOLD: f64 = 8.0;

/// When a controller sees events relative to its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Never run automatically.
    None,
    /// On the way down, before descendants.
    Capture,
    /// At the target only.
    Target,
    /// On the way back up.
    #[default]
    Bubble,
}

/// Claim state of an event sequence within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// The gesture owns the sequence; others tracking it are cancelled.
    Claimed,
    /// The gesture gave up on the sequence.
    Denied,
}

/// A reusable event handler attached to a widget.
pub trait EventController {
    /// The propagation phase this controller runs in.
    fn phase(&self) -> Phase;

    /// Offer an event, already translated to the widget's frame.
    fn handle(&mut self, event: &Event) -> Handled;

    /// Abandon any in-progress recognition.
    fn reset(&mut self);

    /// Whether the controller claimed the current sequence with this
    /// event. Claim cancels sibling gestures.
    fn claimed(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Drag lifecycle notifications, drained by the owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// The pointer travelled past the threshold; `start` is the press
    /// point.
    Begin { start: Point },
    /// Offset from the press point.
    Update { offset: Point },
    /// Final offset at release.
    End { offset: Point },
}

struct ActiveDrag {
    /// Touch sequence, `None` for pointer input.
    sequence: Option<u32>,
    start: Point,
    last: Point,
    recognized: bool,
    state: Option<SequenceState>,
}

/// Recognizes press-move-release drags on one pointer or touch sequence.
///
/// No drag begins until the pointer travels more than [`DRAG_THRESHOLD`]
/// (or the configured threshold) from the press point.
pub struct GestureDrag {
    phase: Phase,
    /// Pointer button that starts the drag; 0 accepts any.
    button: u32,
    threshold: f64,
    active: Option<ActiveDrag>,
    events: Vec<DragEvent>,
    just_claimed: bool,
}

impl GestureDrag {
    pub fn new(button: u32) -> Self {
        Self {
            phase: Phase::Bubble,
            button,
            threshold: DRAG_THRESHOLD,
            active: None,
            events: Vec::new(),
            just_claimed: false,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The press point of the active drag.
    pub fn start_point(&self) -> Option<Point> {
        self.active.as_ref().map(|a| a.start)
    }

    /// Current offset from the press point.
    pub fn offset(&self) -> Option<Point> {
        self.active
            .as_ref()
            .map(|a| Point::new(a.last.x - a.start.x, a.last.y - a.start.y))
    }

    /// Whether a drag has been recognized (threshold exceeded).
    pub fn is_recognized(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.recognized)
    }

    /// Claim or deny the active sequence. Denying cancels recognition.
    pub fn set_state(&mut self, state: SequenceState) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.state == Some(SequenceState::Denied) {
            return;
        }
        active.state = Some(state);
        match state {
            SequenceState::Claimed => self.just_claimed = true,
            SequenceState::Denied => {
                self.active = None;
                self.just_claimed = false;
            }
        }
    }

    /// Drain pending drag notifications in emission order.
    pub fn drain_events(&mut self) -> Vec<DragEvent> {
        std::mem::take(&mut self.events)
    }

    fn accepts_button(&self, button: u32) -> bool {
        self.button == 0 || self.button == button
    }

    fn begin(&mut self, sequence: Option<u32>, position: Point) -> Handled {
        self.active = Some(ActiveDrag {
            sequence,
            start: position,
            last: position,
            recognized: false,
            state: None,
        });
        Handled::No
    }

    fn update(&mut self, sequence: Option<u32>, position: Point) -> Handled {
        let threshold = self.threshold;
        let Some(active) = self.active.as_mut() else {
            return Handled::No;
        };
        if active.sequence != sequence {
            return Handled::No;
        }
        active.last = position;
        let dx = position.x - active.start.x;
        let dy = position.y - active.start.y;
        if !active.recognized {
            if (dx * dx + dy * dy).sqrt() <= threshold {
                return Handled::No;
            }
            active.recognized = true;
            let start = active.start;
            if active.state.is_none() {
                active.state = Some(SequenceState::Claimed);
                self.just_claimed = true;
            }
            self.events.push(DragEvent::Begin { start });
        }
        self.events.push(DragEvent::Update {
            offset: Point::new(dx, dy),
        });
        Handled::Yes
    }

    fn end(&mut self, sequence: Option<u32>) -> Handled {
        let Some(active) = self.active.as_ref() else {
            return Handled::No;
        };
        if active.sequence != sequence {
            return Handled::No;
        }
        let recognized = active.recognized;
        let offset = Point::new(
            active.last.x - active.start.x,
            active.last.y - active.start.y,
        );
        self.active = None;
        if recognized {
            self.events.push(DragEvent::End { offset });
            Handled::Yes
        } else {
            Handled::No
        }
    }
}

impl EventController for GestureDrag {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn handle(&mut self, event: &Event) -> Handled {
        self.just_claimed = false;
        match event {
            Event::ButtonPress {
                position, button, ..
            } if self.accepts_button(*button) && self.active.is_none() => {
                self.begin(None, *position)
            }
            Event::PointerMotion { position, .. } => self.update(None, *position),
            Event::ButtonRelease { button, .. } if self.accepts_button(*button) => self.end(None),
            Event::TouchBegin {
                position, sequence, ..
            } if self.active.is_none() => self.begin(Some(*sequence), *position),
            Event::TouchUpdate {
                position, sequence, ..
            } => self.update(Some(*sequence), *position),
            Event::TouchEnd { sequence, .. } => self.end(Some(*sequence)),
            Event::TouchCancel { sequence, .. } => {
                if self.active.as_ref().is_some_and(|a| a.sequence == Some(*sequence)) {
                    self.reset();
                }
                Handled::No
            }
            Event::GrabBroken { .. } => {
                self.reset();
                Handled::No
            }
            _ => Handled::No,
        }
    }

    fn reset(&mut self) {
        self.active = None;
        self.just_claimed = false;
    }

    fn claimed(&self) -> bool {
        self.just_claimed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The controllers attached to one widget.
///
/// Offering an event runs every controller registered for the given
/// phase; when one claims its sequence, the others are reset.
#[derive(Default)]
pub struct ControllerSet {
    controllers: Vec<Box<dyn EventController>>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, controller: Box<dyn EventController>) {
        self.controllers.push(controller);
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn EventController>> {
        self.controllers.get_mut(index)
    }

    /// Downcast the first controller of a concrete type.
    pub fn find_mut<C: EventController + 'static>(&mut self) -> Option<&mut C> {
        self.controllers
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<C>())
    }

    /// Run the controllers registered for `phase` against an event.
    pub fn offer(&mut self, phase: Phase, event: &Event) -> Handled {
        let mut handled = Handled::No;
        let mut claimant = None;
        for (index, controller) in self.controllers.iter_mut().enumerate() {
            if controller.phase() != phase {
                continue;
            }
            if controller.handle(event).is_handled() {
                handled = Handled::Yes;
            }
            if controller.claimed() {
                claimant = Some(index);
            }
        }
        if let Some(winner) = claimant {
            for (index, controller) in self.controllers.iter_mut().enumerate() {
                if index != winner {
                    controller.reset();
                }
            }
        }
        handled
    }

    /// Cancel every in-progress recognition.
    pub fn reset_all(&mut self) {
        for controller in &mut self.controllers {
            controller.reset();
        }
    }
}
