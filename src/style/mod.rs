//! The style engine: CSS parsing, the style-node tree, the cascade,
//! transitions and theme loading.

pub mod animation;
pub mod cascade;
pub mod model;
pub mod node;
pub mod parser;
pub mod properties;
pub mod specificity;
pub mod theme;
pub mod tokenizer;
pub mod value;

pub use cascade::{Priority, StyleChange, StyleEngine};
pub use node::{ChangeMask, Provenance, StateFlags, StyleNode, StyleNodeId, StyleTree};
pub use value::{Affects, ComputedStyle, PropertyId, Rgba, Value};
