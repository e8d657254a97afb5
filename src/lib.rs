//! # ctk
//!
//! A retained-mode widget toolkit core: a slotmap-backed widget tree
//! with explicit lifecycle, a CSS style engine with cascade and
//! transitions, a two-pass measure/allocate layout protocol, capturing
//! and bubbling event dispatch with grabs and gestures, and an
//! in-process drag-and-drop protocol.
//!
//! ## Core Systems
//!
//! - **[`tree`]** — Slotmap-backed widget arena: hierarchy, visibility,
//!   realize/map lifecycle, destruction
//! - **[`style`]** — CSS engine: tokenizer, parser, specificity,
//!   cascade, invalidation, transitions, themes
//! - **[`layout`]** — Measure/allocate protocol with height-for-width
//!   tradeoffs, margins and clips
//! - **[`widget`]** — The `Widget` trait and the behavior store
//! - **[`widgets`]** — Built-in widgets: Window, Box, Label, Revealer,
//!   Stack, ActionBar
//! - **[`event`]** — Event dispatch: picking, grabs, key snoopers,
//!   gesture controllers, tooltips
//! - **[`dnd`]** — Drag sources, drop sites, target negotiation
//! - **[`app`]** — Application struct tying everything together
//! - **[`backend`]** — Display backend trait, frame clock, font metrics
//! - **[`context`]** — Debug flags, environment settings, display lock
//! - **[`geometry`]** — Point, Size, Rect primitives

// Foundation
pub mod context;
pub mod diag;
pub mod geometry;

// Backend seam
pub mod backend;

// Core systems
pub mod layout;
pub mod style;
pub mod tree;

// Widget system
pub mod widget;
pub mod widgets;

// Input
pub mod dnd;
pub mod event;

// Application
pub mod app;

pub use app::App;
pub use diag::TkError;
