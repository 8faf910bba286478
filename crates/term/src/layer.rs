//! Per-view drawing with transition state applied.
//!
//! A [`Layer`] wraps the framebuffer for one view. Every write is shifted by
//! the view's slide offset and blended towards the backdrop by its alpha, so
//! view painters draw as if they were fully shown.

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::input::GridLayout;
use crate::types::{GridCell, Rect, Vec2};
use crate::view::Presentation;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

pub const BACKDROP: Rgb = Rgb::new(0, 0, 0);

pub struct Layer<'a> {
    fb: &'a mut FrameBuffer,
    viewport: Viewport,
    dx: i32,
    dy: i32,
    alpha: f32,
}

impl<'a> Layer<'a> {
    pub fn new(fb: &'a mut FrameBuffer, viewport: Viewport, presentation: &Presentation) -> Self {
        Self {
            fb,
            viewport,
            dx: (presentation.offset.x * viewport.width as f32).round() as i32,
            dy: (presentation.offset.y * viewport.height as f32).round() as i32,
            alpha: presentation.alpha,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn style(&self, style: CellStyle) -> CellStyle {
        style.faded(self.alpha, BACKDROP)
    }

    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) {
        let style = self.style(style);
        self.fb
            .put_str(x as i32 + self.dx, y as i32 + self.dy, s, style);
    }

    /// Text centered horizontally on row `y`.
    pub fn put_centered(&mut self, y: u16, s: &str, style: CellStyle) {
        let w = s.chars().count() as u16;
        let x = self.viewport.width.saturating_sub(w) / 2;
        self.put_str(x, y, s, style);
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        let style = self.style(style);
        self.fb
            .fill_rect(x as i32 + self.dx, y as i32 + self.dy, w, h, ch, style);
    }

    pub fn border(&mut self, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }
        let style = self.style(style);
        let (x, y) = (x as i32 + self.dx, y as i32 + self.dy);
        let (w, h) = (w as i32, h as i32);

        self.fb.put_char(x, y, '┌', style);
        self.fb.put_char(x + w - 1, y, '┐', style);
        self.fb.put_char(x, y + h - 1, '└', style);
        self.fb.put_char(x + w - 1, y + h - 1, '┘', style);
        for i in 1..w - 1 {
            self.fb.put_char(x + i, y, '─', style);
            self.fb.put_char(x + i, y + h - 1, '─', style);
        }
        for i in 1..h - 1 {
            self.fb.put_char(x, y + i, '│', style);
            self.fb.put_char(x + w - 1, y + i, '│', style);
        }
    }
}

/// Placement of a grid board, centered in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    /// Top-left terminal cell of the frame (border included).
    pub x: u16,
    pub y: u16,
    pub columns: u16,
    pub rows: u16,
    /// Terminal columns and rows per grid cell.
    pub cell_w: u16,
    pub cell_h: u16,
}

impl Board {
    pub fn centered(grid: &GridLayout, cell_w: u16, cell_h: u16, viewport: Viewport) -> Self {
        let columns = grid.columns as u16;
        let rows = grid.rows as u16;
        let frame_w = columns * cell_w + 2;
        let frame_h = rows * cell_h + 2;
        Self {
            x: viewport.width.saturating_sub(frame_w) / 2,
            y: viewport.height.saturating_sub(frame_h) / 2,
            columns,
            rows,
            cell_w,
            cell_h,
        }
    }

    pub fn frame_size(&self) -> (u16, u16) {
        (self.columns * self.cell_w + 2, self.rows * self.cell_h + 2)
    }

    /// Terminal cell of the top-left corner of grid cell `cell`.
    pub fn cell_origin(&self, cell: GridCell) -> (u16, u16) {
        (
            self.x + 1 + cell.col as u16 * self.cell_w,
            self.y + 1 + cell.row as u16 * self.cell_h,
        )
    }

    /// Inner board area in pointer pixel space, for the gesture recognizer.
    ///
    /// `pixel` is the size of one terminal cell in pixels.
    pub fn input_area(&self, pixel: Vec2) -> Rect {
        Rect::new(
            (self.x + 1) as f32 * pixel.x,
            (self.y + 1) as f32 * pixel.y,
            (self.columns * self.cell_w) as f32 * pixel.x,
            (self.rows * self.cell_h) as f32 * pixel.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Visibility;

    fn presentation(alpha: f32, offset: Vec2) -> Presentation {
        Presentation {
            visibility: Visibility::Showing,
            alpha,
            offset,
            accepts_input: false,
            overlay: false,
        }
    }

    #[test]
    fn test_layer_applies_slide_offset() {
        let vp = Viewport::new(10, 4);
        let mut fb = FrameBuffer::new(10, 4);
        let p = presentation(1.0, Vec2::new(0.5, 0.0));
        Layer::new(&mut fb, vp, &p).put_str(0, 1, "ab", CellStyle::default());

        assert_eq!(fb.get(5, 1).unwrap().ch, 'a');
        assert_eq!(fb.get(0, 1).unwrap().ch, ' ');
    }

    #[test]
    fn test_board_input_area_covers_inner_cells() {
        let grid = GridLayout::new(4, 4);
        let board = Board::centered(&grid, 4, 2, Viewport::new(40, 20));
        assert_eq!(board.frame_size(), (18, 10));
        assert_eq!((board.x, board.y), (11, 5));
        assert_eq!(board.cell_origin(GridCell::new(1, 2)), (16, 10));

        let area = board.input_area(Vec2::new(8.0, 16.0));
        assert_eq!(area, Rect::new(96.0, 96.0, 128.0, 128.0));
    }
}
