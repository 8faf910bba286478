//! View/transition coordination.
//!
//! Owns the registry of full-screen panels and overlays and guarantees that at
//! most one primary (non-overlay) view is visible and accepting input at a
//! time. Switching views is a sequential, time-driven routine:
//!
//! ```text
//! show(target)
//!   ├─ outgoing.on_hide()      input disabled on both views
//!   ├─ fade/slide out          outgoing transition duration
//!   ├─ target.on_show()
//!   ├─ fade/slide in           target transition duration
//!   └─ target accepts input
//! ```
//!
//! Requests arriving while a transition is running are dropped, not queued.
//! Transitions advance on wall-clock time passed to
//! [`ViewCoordinator::tick`](coordinator::ViewCoordinator::tick), independent
//! of gameplay pausing.
//!
//! - [`view`]: the [`View`] trait, keys and per-view configuration
//! - [`transition`]: easing curves and tweens
//! - [`coordinator`]: the registry and transition state machine

pub mod coordinator;
pub mod transition;
pub mod view;

pub use playkit_types as types;

pub use coordinator::{Presentation, ViewCoordinator};
pub use transition::{Easing, SlideEdge, TransitionConfig, TransitionKind, Tween};
pub use view::{AsAny, View, ViewConfig, ViewKey, Visibility};
