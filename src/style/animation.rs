//! Timed style transitions: easing curves, progress trackers and value
//! interpolation.
//!
//! A transition is created when an animatable property's cascaded value
//! changes while the frame clock is running. Queries for the property
//! return `interpolate(v0, v1, ease(t))`; once `t` reaches 1 the tracker
//! is retired and the end value sticks.

use std::collections::HashMap;
use std::time::Duration;

use crate::backend::FrameClock;

use super::value::{PropertyId, Rgba, Value};

/// The recognized easing functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Used by stack size interpolation.
    EaseOutCubic,
}

impl Easing {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "linear" => Easing::Linear,
            "ease" => Easing::Ease,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "ease-out-cubic" => Easing::EaseOutCubic,
            _ => return None,
        })
    }

    /// Map linear progress `t` in [0, 1] to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            // Quadratic approximations of the CSS cubic-bezier presets.
            Easing::Ease | Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Tracks the progress of one timed transition against the frame clock.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    start: Duration,
    duration: Duration,
    easing: Easing,
}

impl ProgressTracker {
    pub fn new(start: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            duration,
            easing,
        }
    }

    /// Linear progress in [0, 1] at clock time `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased progress in [0, 1] at clock time `now`.
    pub fn eased(&self, now: Duration) -> f64 {
        self.easing.apply(self.progress(now))
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Interpolate between two values of the same shape. Non-numeric values
/// snap to the end value at `t >= 0.5`.
pub fn interpolate(from: &Value, to: &Value, t: f64) -> Value {
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    match (from, to) {
        (Value::Px(a), Value::Px(b)) => Value::Px(lerp(*a, *b)),
        (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b)),
        (Value::Ms(a), Value::Ms(b)) => Value::Ms(lerp(*a, *b)),
        (Value::Color(a), Value::Color(b)) => Value::Color(Rgba::new(
            lerp(a.red, b.red),
            lerp(a.green, b.green),
            lerp(a.blue, b.blue),
            lerp(a.alpha, b.alpha),
        )),
        _ => {
            if t < 0.5 {
                from.clone()
            } else {
                to.clone()
            }
        }
    }
}

/// One running property transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: Value,
    pub to: Value,
    pub tracker: ProgressTracker,
}

impl Transition {
    /// The current presented value at clock time `now`.
    pub fn value_at(&self, now: Duration) -> Value {
        interpolate(&self.from, &self.to, self.tracker.eased(now))
    }
}

/// The set of running transitions on one style node.
#[derive(Debug, Default)]
pub struct TransitionSet {
    running: HashMap<PropertyId, Transition>,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a transition for a property.
    ///
    /// No transition starts when the clock is stopped, the duration is
    /// zero, or the property is not animatable; the value just snaps.
    pub fn start(
        &mut self,
        clock: &FrameClock,
        property: PropertyId,
        from: Value,
        to: Value,
        duration: Duration,
        easing: Easing,
    ) {
        if !clock.is_running() || duration.is_zero() || !property.is_animatable() {
            self.running.remove(&property);
            return;
        }
        // Restarting from the currently presented value avoids a jump.
        let from = match self.running.get(&property) {
            Some(existing) => existing.value_at(clock.now()),
            None => from,
        };
        self.running.insert(
            property,
            Transition {
                from,
                to,
                tracker: ProgressTracker::new(clock.now(), duration, easing),
            },
        );
    }

    /// The presented value of a property, if a transition is running.
    pub fn presented(&self, property: PropertyId, now: Duration) -> Option<Value> {
        self.running.get(&property).map(|t| t.value_at(now))
    }

    /// Retire finished trackers; returns the properties that completed.
    pub fn advance(&mut self, now: Duration) -> Vec<PropertyId> {
        let finished: Vec<PropertyId> = self
            .running
            .iter()
            .filter(|(_, t)| t.tracker.is_finished(now))
            .map(|(p, _)| *p)
            .collect();
        for property in &finished {
            self.running.remove(property);
        }
        finished
    }

    /// Drop all running transitions (backend failure, widget unmap).
    pub fn cancel_all(&mut self) {
        self.running.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [
            Easing::Linear,
            Easing::Ease,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::EaseOutCubic,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn ease_out_cubic_midpoint() {
        // 1 - 0.5^3 = 0.875
        assert!((Easing::EaseOutCubic.apply(0.5) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn easing_keyword_lookup() {
        assert_eq!(Easing::from_keyword("linear"), Some(Easing::Linear));
        assert_eq!(
            Easing::from_keyword("ease-out-cubic"),
            Some(Easing::EaseOutCubic)
        );
        assert_eq!(Easing::from_keyword("bounce"), None);
    }

    #[test]
    fn tracker_progress_clamps() {
        let tracker = ProgressTracker::new(MS(100), MS(200), Easing::Linear);
        assert_eq!(tracker.progress(MS(50)), 0.0);
        assert_eq!(tracker.progress(MS(100)), 0.0);
        assert_eq!(tracker.progress(MS(200)), 0.5);
        assert_eq!(tracker.progress(MS(300)), 1.0);
        assert_eq!(tracker.progress(MS(999)), 1.0);
        assert!(tracker.is_finished(MS(300)));
        assert!(!tracker.is_finished(MS(299)));
    }

    #[test]
    fn zero_duration_is_immediately_finished() {
        let tracker = ProgressTracker::new(MS(0), Duration::ZERO, Easing::Linear);
        assert_eq!(tracker.progress(MS(0)), 1.0);
    }

    #[test]
    fn interpolate_px_and_color() {
        let mid = interpolate(&Value::Px(0.0), &Value::Px(10.0), 0.25);
        assert_eq!(mid, Value::Px(2.5));
        let color = interpolate(
            &Value::Color(Rgba::BLACK),
            &Value::Color(Rgba::WHITE),
            0.5,
        );
        assert_eq!(color, Value::Color(Rgba::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn interpolate_mismatched_snaps() {
        let a = Value::Keyword("left".into());
        let b = Value::Keyword("right".into());
        assert_eq!(interpolate(&a, &b, 0.2), a);
        assert_eq!(interpolate(&a, &b, 0.8), b);
    }

    #[test]
    fn transition_set_runs_and_retires() {
        let mut clock = FrameClock::new();
        let mut set = TransitionSet::new();
        set.start(
            &clock,
            PropertyId::Opacity,
            Value::Number(0.0),
            Value::Number(1.0),
            MS(200),
            Easing::Linear,
        );
        assert_eq!(set.len(), 1);

        clock.advance(MS(100));
        assert_eq!(
            set.presented(PropertyId::Opacity, clock.now()),
            Some(Value::Number(0.5))
        );
        assert!(set.advance(clock.now()).is_empty());

        clock.advance(MS(100));
        let finished = set.advance(clock.now());
        assert_eq!(finished, vec![PropertyId::Opacity]);
        assert!(set.is_empty());
        assert_eq!(set.presented(PropertyId::Opacity, clock.now()), None);
    }

    #[test]
    fn stopped_clock_starts_no_transition() {
        let mut clock = FrameClock::new();
        clock.stop();
        let mut set = TransitionSet::new();
        set.start(
            &clock,
            PropertyId::Opacity,
            Value::Number(0.0),
            Value::Number(1.0),
            MS(200),
            Easing::Linear,
        );
        assert!(set.is_empty());
    }

    #[test]
    fn non_animatable_property_snaps() {
        let clock = FrameClock::new();
        let mut set = TransitionSet::new();
        set.start(
            &clock,
            PropertyId::FontFamily,
            Value::Keyword("serif".into()),
            Value::Keyword("monospace".into()),
            MS(200),
            Easing::Linear,
        );
        assert!(set.is_empty());
    }

    #[test]
    fn restart_continues_from_presented_value() {
        let mut clock = FrameClock::new();
        let mut set = TransitionSet::new();
        set.start(
            &clock,
            PropertyId::MinWidth,
            Value::Px(0.0),
            Value::Px(100.0),
            MS(100),
            Easing::Linear,
        );
        clock.advance(MS(50));
        // Reverse direction mid-flight: starts from 50px, not 100px.
        set.start(
            &clock,
            PropertyId::MinWidth,
            Value::Px(100.0),
            Value::Px(0.0),
            MS(100),
            Easing::Linear,
        );
        assert_eq!(
            set.presented(PropertyId::MinWidth, clock.now()),
            Some(Value::Px(50.0))
        );
    }

    #[test]
    fn cancel_all_clears() {
        let clock = FrameClock::new();
        let mut set = TransitionSet::new();
        set.start(
            &clock,
            PropertyId::Opacity,
            Value::Number(0.0),
            Value::Number(1.0),
            MS(200),
            Easing::Linear,
        );
        set.cancel_all();
        assert!(set.is_empty());
    }
}
