//! Mouse mapping from terminal events to pointer samples.
//!
//! Terminals only report mouse changes (press, drag, release), never "still
//! held" frames. [`PointerTracker`] remembers the pressed state and emits a
//! synthetic `Held` sample on frames without a real event, which is what hold
//! detection needs.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{PointerPhase, PointerSample, Vec2};

/// Tracks the left mouse button across frames.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    /// Size of one terminal cell in pixels.
    cell_size: Vec2,
    pressed: bool,
    last: Vec2,
    sampled_this_frame: bool,
}

impl PointerTracker {
    pub fn new(cell_w: f32, cell_h: f32) -> Self {
        Self {
            cell_size: Vec2::new(cell_w, cell_h),
            pressed: false,
            last: Vec2::ZERO,
            sampled_this_frame: false,
        }
    }

    /// Pixel position of the centre of a terminal cell.
    pub fn cell_to_pixels(&self, column: u16, row: u16) -> Vec2 {
        Vec2::new(
            (column as f32 + 0.5) * self.cell_size.x,
            (row as f32 + 0.5) * self.cell_size.y,
        )
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Begins a new frame, clearing per-frame state.
    pub fn begin_frame(&mut self) {
        self.sampled_this_frame = false;
    }

    /// Convert a terminal mouse event. Only the left button is tracked.
    pub fn handle_mouse(&mut self, ev: MouseEvent, time: f32) -> Option<PointerSample> {
        let pos = self.cell_to_pixels(ev.column, ev.row);
        let phase = match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = true;
                PointerPhase::Down
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed => PointerPhase::Held,
            MouseEventKind::Up(MouseButton::Left) if self.pressed => {
                self.pressed = false;
                PointerPhase::Up
            }
            _ => return None,
        };
        self.last = pos;
        self.sampled_this_frame = true;
        Some(PointerSample::new(pos, phase, time))
    }

    /// Synthetic `Held` sample for a frame in which the button stayed down
    /// without any terminal event.
    pub fn frame_sample(&mut self, time: f32) -> Option<PointerSample> {
        if !self.pressed || self.sampled_this_frame {
            return None;
        }
        self.sampled_this_frame = true;
        Some(PointerSample::new(self.last, PointerPhase::Held, time))
    }

    /// Forget the pressed state (focus loss, pause).
    pub fn reset(&mut self) {
        self.pressed = false;
        self.sampled_this_frame = false;
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        // Typical terminal glyph is roughly twice as tall as it is wide.
        Self::new(8.0, 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_press_drag_release() {
        let mut t = PointerTracker::new(10.0, 20.0);

        let s = t
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 2, 1), 0.0)
            .unwrap();
        assert_eq!(s.phase, PointerPhase::Down);
        assert_eq!(s.position, Vec2::new(25.0, 30.0));

        let s = t
            .handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 3, 1), 0.1)
            .unwrap();
        assert_eq!(s.phase, PointerPhase::Held);

        let s = t
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 3, 1), 0.2)
            .unwrap();
        assert_eq!(s.phase, PointerPhase::Up);
        assert!(!t.is_pressed());
    }

    #[test]
    fn test_ignores_other_buttons_and_moves() {
        let mut t = PointerTracker::default();
        assert!(t
            .handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 0, 0), 0.0)
            .is_none());
        assert!(t.handle_mouse(mouse(MouseEventKind::Moved, 0, 0), 0.0).is_none());
        // Release without a tracked press.
        assert!(t
            .handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0), 0.0)
            .is_none());
    }

    #[test]
    fn test_synthesizes_held_once_per_quiet_frame() {
        let mut t = PointerTracker::default();
        t.begin_frame();
        t.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), 0.0);
        // Real event already sampled this frame.
        assert!(t.frame_sample(0.0).is_none());

        t.begin_frame();
        let s = t.frame_sample(0.016).unwrap();
        assert_eq!(s.phase, PointerPhase::Held);
        assert!(t.frame_sample(0.016).is_none());

        t.reset();
        t.begin_frame();
        assert!(t.frame_sample(0.032).is_none());
    }
}
