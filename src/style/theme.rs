//! Theme discovery and loading.
//!
//! A theme is a directory `NAME/ctk-MAJOR.MINOR/ctk.css` under one of the
//! search paths. Discovery prefers the highest minor version no newer
//! than the library's, stepping down by 2 (theme dirs are versioned per
//! stable series). A failed load falls back to the next provider in
//! priority order, ultimately the built-in fallback sheet.

use std::path::{Path, PathBuf};

use crate::diag::{Diagnostic, DiagnosticSink};

use super::cascade::{Priority, StyleEngine};

/// Library style series; theme directories are matched against it.
pub const STYLE_MAJOR: u32 = 4;
pub const STYLE_MINOR: u32 = 12;

/// The built-in fallback stylesheet, installed at the lowest band so a
/// broken or absent theme still yields a usable style.
pub const FALLBACK_CSS: &str = "\
* {
  color: black;
  background-color: transparent;
  font-size: 14px;
}
window {
  background-color: white;
}
tooltip {
  background-color: #343434;
  color: white;
  padding: 4px;
}
actionbar {
  background-color: #e8e8e8;
  min-height: 36px;
}
";

/// Default theme search paths: data dirs, then the user data dir, then
/// `~/.themes`.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(data_dirs) = std::env::var("XDG_DATA_DIRS") {
        for dir in std::env::split_paths(&data_dirs) {
            paths.push(dir.join("themes"));
        }
    }
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        paths.push(PathBuf::from(data_home).join("themes"));
    }
    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".themes"));
    }
    paths
}

/// Find the stylesheet for `theme` under `search_paths`.
///
/// For each path, checks `theme/ctk-MAJOR.MINOR/ctk.css` starting at the
/// library minor and stepping down by 2; the first regular file wins.
pub fn find_theme_css(theme: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    for base in search_paths {
        let theme_dir = base.join(theme);
        if !theme_dir.is_dir() {
            continue;
        }
        let mut minor = STYLE_MINOR;
        loop {
            let candidate = theme_dir
                .join(format!("ctk-{STYLE_MAJOR}.{minor}"))
                .join("ctk.css");
            if candidate.is_file() {
                return Some(candidate);
            }
            if minor < 2 {
                break;
            }
            minor -= 2;
        }
    }
    None
}

/// List the theme names available under `search_paths`: immediate
/// subdirectories containing a versioned stylesheet.
pub fn available_themes(search_paths: &[PathBuf]) -> Vec<String> {
    let mut names = Vec::new();
    for base in search_paths {
        let Ok(entries) = std::fs::read_dir(base) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if names.contains(&name) {
                continue;
            }
            if find_theme_css(&name, std::slice::from_ref(base)).is_some() {
                names.push(name);
            }
        }
    }
    names.sort();
    names
}

/// Install the built-in fallback provider. Called once at engine setup.
pub fn install_fallback(engine: &mut StyleEngine, sink: &dyn DiagnosticSink) {
    engine.add_provider(Priority::Fallback, FALLBACK_CSS, sink);
}

/// Load `theme` from disk into the theme band.
///
/// Returns `false` (after a warning) when the theme cannot be found or
/// read; the cascade then falls through to lower bands.
pub fn install_theme(
    engine: &mut StyleEngine,
    theme: &str,
    search_paths: &[PathBuf],
    sink: &dyn DiagnosticSink,
) -> bool {
    let Some(path) = find_theme_css(theme, search_paths) else {
        sink.report(Diagnostic::warning(format!("theme '{theme}' not found")));
        return false;
    };
    match std::fs::read_to_string(&path) {
        Ok(css) => {
            engine.remove_providers(Priority::Theme);
            engine.add_provider(Priority::Theme, &css, sink);
            true
        }
        Err(err) => {
            sink.report(Diagnostic::warning(format!(
                "failed to read theme '{}': {err}",
                path.display()
            )));
            false
        }
    }
}
