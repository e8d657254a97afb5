//! Concrete widgets built on the core protocols.

pub mod actionbar;
pub mod container;
pub mod label;
pub mod revealer;
pub mod stack;
pub mod window;

pub use actionbar::{ActionBar, CenterBox};
pub use container::BoxContainer;
pub use label::Label;
pub use revealer::{Revealer, REVEAL_DURATION};
pub use stack::{Stack, StackTransition, STACK_TRANSITION_DURATION};
pub use window::Window;
