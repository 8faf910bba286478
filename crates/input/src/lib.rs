//! Pointer input module (engine-facing).
//!
//! Turns raw per-frame pointer samples into semantic gestures:
//!
//! - [`gesture`]: tap / hold / swipe classification with tunable thresholds
//! - [`grid`]: mapping of screen positions onto a padded column/row grid
//! - [`bus`]: single-subscriber delivery of classified gestures to the active module
//! - [`map`]: crossterm mouse events to [`PointerSample`](crate::types::PointerSample)s
//!
//! The module is independent of any UI framework apart from the optional
//! crossterm mapping used by terminal front ends.

pub mod bus;
pub mod gesture;
pub mod grid;
pub mod map;

pub use playkit_types as types;

pub use bus::{GestureBus, SubscriptionId};
pub use gesture::{GestureConfig, GestureOutput, GestureRecognizer};
pub use grid::{GridLayout, GridPadding};
pub use map::PointerTracker;
