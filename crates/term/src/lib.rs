//! Terminal rendering for playkit hosts.
//!
//! A small framebuffer renderer: views paint into a [`FrameBuffer`] through
//! a [`Layer`] that applies their transition state, and
//! [`TerminalRenderer`] flushes the changed cells to the terminal.
//!
//! Goals:
//! - Keep painters pure (no I/O) and unit-testable
//! - Let fade and slide transitions show without per-view code
//! - Keep pointer hit areas and drawn boards in one place ([`Board`])

pub mod fb;
pub mod layer;
pub mod renderer;

pub use playkit_input as input;
pub use playkit_types as types;
pub use playkit_view as view;

pub use fb::{Cell, CellStyle, Emphasis, FrameBuffer, Rgb};
pub use layer::{Board, Layer, Viewport, BACKDROP};
pub use renderer::{changed_spans, write_changes, write_frame, Span, TerminalRenderer};
