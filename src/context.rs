//! Toolkit context: debug flags, environment, argument parsing.
//!
//! The context is an explicit value threaded through entry points in place of
//! process globals. It carries the debug-flag bag, the animation slowdown
//! multiplier, the diagnostic sink, and the display lock used when foreign
//! processes invoke actions.

use std::cell::Cell;
use std::rc::Rc;

use crate::diag::{CollectingSink, Diagnostic, DiagnosticSink, LogSink};

bitflags::bitflags! {
    /// The debug-flag bag consulted via `CTK_DEBUG` / `--debug`.
    pub struct DebugFlags: u32 {
        const MISC          = 1 << 0;
        const PLUGSOCKET    = 1 << 1;
        const TEXT          = 1 << 2;
        const TREE          = 1 << 3;
        const UPDATES       = 1 << 4;
        const KEYBINDINGS   = 1 << 5;
        const MULTIHEAD     = 1 << 6;
        const MODULES       = 1 << 7;
        const GEOMETRY      = 1 << 8;
        const ICONTHEME     = 1 << 9;
        const PRINTING      = 1 << 10;
        const BUILDER       = 1 << 11;
        const SIZE_REQUEST  = 1 << 12;
        const NO_CSS_CACHE  = 1 << 13;
        const BASELINES     = 1 << 14;
        const PIXEL_CACHE   = 1 << 15;
        const NO_PIXEL_CACHE = 1 << 16;
        const INTERACTIVE   = 1 << 17;
        const TOUCHSCREEN   = 1 << 18;
        const ACTIONS       = 1 << 19;
        const RESIZE        = 1 << 20;
        const LAYOUT        = 1 << 21;
    }
}

impl DebugFlags {
    /// Parse a single flag name. `all` turns on everything.
    fn from_name(name: &str) -> Option<DebugFlags> {
        Some(match name {
            "misc" => DebugFlags::MISC,
            "plugsocket" => DebugFlags::PLUGSOCKET,
            "text" => DebugFlags::TEXT,
            "tree" => DebugFlags::TREE,
            "updates" => DebugFlags::UPDATES,
            "keybindings" => DebugFlags::KEYBINDINGS,
            "multihead" => DebugFlags::MULTIHEAD,
            "modules" => DebugFlags::MODULES,
            "geometry" => DebugFlags::GEOMETRY,
            "icontheme" => DebugFlags::ICONTHEME,
            "printing" => DebugFlags::PRINTING,
            "builder" => DebugFlags::BUILDER,
            "size-request" => DebugFlags::SIZE_REQUEST,
            "no-css-cache" => DebugFlags::NO_CSS_CACHE,
            "baselines" => DebugFlags::BASELINES,
            "pixel-cache" => DebugFlags::PIXEL_CACHE,
            "no-pixel-cache" => DebugFlags::NO_PIXEL_CACHE,
            "interactive" => DebugFlags::INTERACTIVE,
            "touchscreen" => DebugFlags::TOUCHSCREEN,
            "actions" => DebugFlags::ACTIONS,
            "resize" => DebugFlags::RESIZE,
            "layout" => DebugFlags::LAYOUT,
            "all" => DebugFlags::all(),
            _ => return None,
        })
    }

    /// Parse a `:` or `,` separated flag list. Unknown names are ignored.
    pub fn parse_list(list: &str) -> DebugFlags {
        let mut flags = DebugFlags::empty();
        for name in list.split([':', ',']) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(flag) = Self::from_name(name) {
                flags |= flag;
            }
        }
        flags
    }
}

/// The settings a context is built from: debug flags, module list, slowdown
/// multiplier, touchscreen simulation, fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSettings {
    pub debug: DebugFlags,
    pub modules: Vec<String>,
    /// Multiplier applied to every animation duration. `1.0` is real time.
    pub slowdown: f64,
    pub simulate_touchscreen: bool,
    pub fatal_warnings: bool,
    pub enable_animations: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            debug: DebugFlags::empty(),
            modules: Vec::new(),
            slowdown: 1.0,
            simulate_touchscreen: false,
            fatal_warnings: false,
            enable_animations: true,
        }
    }
}

impl ContextSettings {
    /// Read settings from the process environment.
    ///
    /// Consults `CTK_DEBUG`, `CTK_NO_DEBUG` (subtractive), `CTK_MODULES`,
    /// `CTK_SLOWDOWN`, `CTK_TEST_TOUCHSCREEN` and `CTK_FATAL_WARNINGS`.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(v) = std::env::var("CTK_DEBUG") {
            settings.debug |= DebugFlags::parse_list(&v);
        }
        if let Ok(v) = std::env::var("CTK_NO_DEBUG") {
            settings.debug -= DebugFlags::parse_list(&v);
        }
        if let Ok(v) = std::env::var("CTK_MODULES") {
            settings.modules = split_modules(&v);
        }
        if let Ok(v) = std::env::var("CTK_SLOWDOWN") {
            if let Ok(mult) = v.parse::<f64>() {
                if mult > 0.0 {
                    settings.slowdown = mult;
                }
            }
        }
        if std::env::var_os("CTK_TEST_TOUCHSCREEN").is_some() {
            settings.simulate_touchscreen = true;
        }
        if std::env::var_os("CTK_FATAL_WARNINGS").is_some() {
            settings.fatal_warnings = true;
        }
        settings
    }

    /// Consume toolkit options from an argv-style vector.
    ///
    /// Recognizes `--module=NAMES`, `--debug=FLAGS`, `--no-debug=FLAGS` and
    /// `--g-fatal-warnings`; recognized options are removed from `args`, the
    /// rest is left for the application.
    pub fn parse_args(&mut self, args: &mut Vec<String>) {
        args.retain(|arg| {
            if let Some(list) = arg.strip_prefix("--debug=") {
                self.debug |= DebugFlags::parse_list(list);
                false
            } else if let Some(list) = arg.strip_prefix("--no-debug=") {
                self.debug -= DebugFlags::parse_list(list);
                false
            } else if let Some(names) = arg.strip_prefix("--module=") {
                self.modules.extend(split_modules(names));
                false
            } else if arg == "--g-fatal-warnings" {
                self.fatal_warnings = true;
                false
            } else {
                true
            }
        });
    }
}

fn split_modules(list: &str) -> Vec<String> {
    list.split([':', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// The toolkit context threaded through entry points.
pub struct Context {
    pub settings: ContextSettings,
    sink: Box<dyn DiagnosticSink>,
    display_lock: Rc<Cell<bool>>,
}

impl Context {
    /// Create a context with the given settings and the default log sink.
    pub fn new(settings: ContextSettings) -> Self {
        Self {
            settings,
            sink: Box::new(LogSink),
            display_lock: Rc::new(Cell::new(false)),
        }
    }

    /// Create a context with a collecting sink, returning both.
    pub fn with_collector() -> (Self, CollectingSink) {
        let sink = CollectingSink::new();
        let ctx = Self {
            settings: ContextSettings::default(),
            sink: Box::new(sink.clone()),
            display_lock: Rc::new(Cell::new(false)),
        };
        (ctx, sink)
    }

    /// Report a diagnostic through the sink.
    ///
    /// Panics if fatal warnings are enabled, matching `--g-fatal-warnings`.
    pub fn warn(&self, diagnostic: Diagnostic) {
        let fatal = self.settings.fatal_warnings;
        let message = diagnostic.message.clone();
        self.sink.report(diagnostic);
        if fatal {
            panic!("fatal warning: {message}");
        }
    }

    /// Animation durations scaled by the slowdown multiplier, or zero when
    /// animations are disabled.
    pub fn animation_duration(&self, base_ms: u64) -> u64 {
        if !self.settings.enable_animations {
            return 0;
        }
        (base_ms as f64 * self.settings.slowdown).round() as u64
    }

    /// Acquire the display lock for a foreign action invocation.
    ///
    /// The lock is released when the guard drops, on every exit path.
    pub fn lock_display(&self) -> DisplayLockGuard {
        assert!(
            !self.display_lock.get(),
            "display lock is not reentrant"
        );
        self.display_lock.set(true);
        DisplayLockGuard {
            lock: Rc::clone(&self.display_lock),
        }
    }

    /// Whether the display lock is currently held.
    pub fn display_locked(&self) -> bool {
        self.display_lock.get()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextSettings::default())
    }
}

/// RAII guard for the display lock.
pub struct DisplayLockGuard {
    lock: Rc<Cell<bool>>,
}

impl Drop for DisplayLockGuard {
    fn drop(&mut self) {
        self.lock.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_flag() {
        assert_eq!(DebugFlags::parse_list("tree"), DebugFlags::TREE);
    }

    #[test]
    fn parse_colon_separated() {
        let flags = DebugFlags::parse_list("tree:geometry:layout");
        assert_eq!(
            flags,
            DebugFlags::TREE | DebugFlags::GEOMETRY | DebugFlags::LAYOUT
        );
    }

    #[test]
    fn parse_comma_separated() {
        let flags = DebugFlags::parse_list("misc,updates");
        assert_eq!(flags, DebugFlags::MISC | DebugFlags::UPDATES);
    }

    #[test]
    fn parse_all() {
        assert_eq!(DebugFlags::parse_list("all"), DebugFlags::all());
    }

    #[test]
    fn parse_unknown_ignored() {
        assert_eq!(
            DebugFlags::parse_list("tree:bogus"),
            DebugFlags::TREE
        );
    }

    #[test]
    fn parse_hyphenated_names() {
        let flags = DebugFlags::parse_list("size-request:no-css-cache");
        assert_eq!(
            flags,
            DebugFlags::SIZE_REQUEST | DebugFlags::NO_CSS_CACHE
        );
    }

    #[test]
    fn args_debug_and_no_debug() {
        let mut settings = ContextSettings::default();
        let mut args = vec![
            "app".to_owned(),
            "--debug=tree:misc".to_owned(),
            "--no-debug=misc".to_owned(),
            "file.txt".to_owned(),
        ];
        settings.parse_args(&mut args);
        assert_eq!(settings.debug, DebugFlags::TREE);
        assert_eq!(args, vec!["app", "file.txt"]);
    }

    #[test]
    fn args_modules() {
        let mut settings = ContextSettings::default();
        let mut args = vec!["--module=canberra:gail".to_owned()];
        settings.parse_args(&mut args);
        assert_eq!(settings.modules, vec!["canberra", "gail"]);
        assert!(args.is_empty());
    }

    #[test]
    fn args_fatal_warnings() {
        let mut settings = ContextSettings::default();
        let mut args = vec!["--g-fatal-warnings".to_owned()];
        settings.parse_args(&mut args);
        assert!(settings.fatal_warnings);
    }

    #[test]
    fn animation_duration_scaled() {
        let mut settings = ContextSettings::default();
        settings.slowdown = 2.0;
        let ctx = Context::new(settings);
        assert_eq!(ctx.animation_duration(250), 500);
    }

    #[test]
    fn animation_duration_disabled() {
        let mut settings = ContextSettings::default();
        settings.enable_animations = false;
        let ctx = Context::new(settings);
        assert_eq!(ctx.animation_duration(250), 0);
    }

    #[test]
    fn warn_reports_to_sink() {
        let (ctx, sink) = Context::with_collector();
        ctx.warn(Diagnostic::warning("child already parented"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    #[should_panic(expected = "fatal warning")]
    fn warn_fatal_panics() {
        let (mut ctx, _sink) = Context::with_collector();
        ctx.settings.fatal_warnings = true;
        ctx.warn(Diagnostic::warning("boom"));
    }

    #[test]
    fn display_lock_released_on_drop() {
        let ctx = Context::default();
        {
            let _guard = ctx.lock_display();
            assert!(ctx.display_locked());
        }
        assert!(!ctx.display_locked());
    }

    #[test]
    fn display_lock_released_on_panic_path() {
        let ctx = Context::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ctx.lock_display();
            panic!("action failed");
        }));
        assert!(result.is_err());
        assert!(!ctx.display_locked());
    }
}
