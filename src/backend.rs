//! Display backend abstraction.
//!
//! The backend owns surfaces, device grabs and the frame clock. The core
//! never talks to a windowing system directly; it goes through
//! [`DisplayBackend`], and tests use [`HeadlessBackend`] with a manually
//! advanced clock. Font shaping is likewise behind the [`FontMetrics`]
//! collaborator.

use std::collections::HashSet;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::diag::BackendError;

new_key_type! {
    /// A backing surface handle.
    pub struct SurfaceId;
}

/// An input device identifier. Device 0 is the core pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// The core pointer device.
    pub const CORE_POINTER: DeviceId = DeviceId(0);
    /// The core keyboard device.
    pub const CORE_KEYBOARD: DeviceId = DeviceId(1);
}

/// The frame clock: a monotonically advancing timeline since startup.
///
/// Transitions and tooltip timers read the clock; the host (or a test)
/// advances it. While the clock is not running, no new transitions start.
#[derive(Debug, Clone)]
pub struct FrameClock {
    now: Duration,
    running: bool,
}

impl FrameClock {
    /// A running clock at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            running: true,
        }
    }

    /// Current timeline position.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Whether the clock is ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the clock. Running transitions keep their state but no new
    /// ones start.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Resume the clock.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Advance the timeline by `delta`.
    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.now += delta;
        self.now
    }

    /// Jump the timeline to an absolute position. Time never goes backwards.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The pluggable display backend.
pub trait DisplayBackend {
    /// Allocate a backing surface for a toplevel.
    fn create_surface(&mut self) -> Result<SurfaceId, BackendError>;

    /// Release a surface. Unknown ids are ignored.
    fn destroy_surface(&mut self, surface: SurfaceId);

    /// Whether the surface is still alive.
    fn surface_alive(&self, surface: SurfaceId) -> bool;

    /// Install a backend-level grab for a device on a surface.
    fn grab_device(&mut self, device: DeviceId, surface: SurfaceId);

    /// Release a backend-level device grab.
    fn ungrab_device(&mut self, device: DeviceId);

    /// Hi-DPI scale factor for a surface.
    fn scale_factor(&self, surface: SurfaceId) -> i32 {
        let _ = surface;
        1
    }

    /// Pointer cursor theme size in pixels.
    fn pointer_theme_size(&self) -> i32 {
        24
    }

    /// The frame clock.
    fn clock(&self) -> &FrameClock;

    /// Mutable access to the frame clock.
    fn clock_mut(&mut self) -> &mut FrameClock;
}

/// In-process backend for tests: surfaces are slotmap keys, the clock is
/// advanced by hand.
pub struct HeadlessBackend {
    surfaces: SlotMap<SurfaceId, ()>,
    device_grabs: HashSet<DeviceId>,
    clock: FrameClock,
    /// When set, `create_surface` fails; used to exercise backend-failure
    /// paths.
    pub fail_surface_creation: bool,
}

impl HeadlessBackend {
    /// A headless backend with a running clock at time zero.
    pub fn new() -> Self {
        Self {
            surfaces: SlotMap::with_key(),
            device_grabs: HashSet::new(),
            clock: FrameClock::new(),
            fail_surface_creation: false,
        }
    }

    /// Number of live surfaces.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether the backend holds a grab for `device`.
    pub fn has_device_grab(&self, device: DeviceId) -> bool {
        self.device_grabs.contains(&device)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for HeadlessBackend {
    fn create_surface(&mut self) -> Result<SurfaceId, BackendError> {
        if self.fail_surface_creation {
            return Err(BackendError::SurfaceCreationFailed(
                "headless backend configured to fail".into(),
            ));
        }
        Ok(self.surfaces.insert(()))
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(surface);
    }

    fn surface_alive(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(surface)
    }

    fn grab_device(&mut self, device: DeviceId, _surface: SurfaceId) {
        self.device_grabs.insert(device);
    }

    fn ungrab_device(&mut self, device: DeviceId) {
        self.device_grabs.remove(&device);
    }

    fn clock(&self) -> &FrameClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }
}

/// Font metrics collaborator: the layout component treats text as opaque and
/// only needs advances and line metrics.
pub trait FontMetrics {
    /// Horizontal advance of a string at the given font size.
    fn text_width(&self, text: &str, font_size: f64) -> i32;

    /// Line height at the given font size.
    fn line_height(&self, font_size: f64) -> i32;

    /// Baseline (ascent) from the top of the line box.
    fn ascent(&self, font_size: f64) -> i32;
}

/// Fixed-metric font backend for tests: every char advances by 0.6em.
#[derive(Debug, Default)]
pub struct FixedFontMetrics;

impl FontMetrics for FixedFontMetrics {
    fn text_width(&self, text: &str, font_size: f64) -> i32 {
        (text.chars().count() as f64 * font_size * 0.6).ceil() as i32
    }

    fn line_height(&self, font_size: f64) -> i32 {
        (font_size * 1.2).ceil() as i32
    }

    fn ascent(&self, font_size: f64) -> i32 {
        (font_size * 0.8).ceil() as i32
    }
}
