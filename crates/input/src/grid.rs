//! Grid mapping: screen position → (column, row) inside a padded input area.

use serde::Deserialize;

use crate::types::{GridCell, Rect, SwipeDirection, Vec2};

/// Padding removed from each edge of the input area before mapping.
///
/// Values are fractions of the area size (`0.1` = 10% of the width/height).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GridPadding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl GridPadding {
    pub fn uniform(p: f32) -> Self {
        Self {
            left: p,
            right: p,
            top: p,
            bottom: p,
        }
    }

    /// Negative padding, or padding that leaves no inner area, is invalid.
    pub fn is_valid(&self) -> bool {
        self.left >= 0.0
            && self.right >= 0.0
            && self.top >= 0.0
            && self.bottom >= 0.0
            && self.left + self.right < 1.0
            && self.top + self.bottom < 1.0
    }
}

/// Column/row layout laid over the input area.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub padding: GridPadding,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: 1,
            padding: GridPadding::default(),
        }
    }
}

impl GridLayout {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            padding: GridPadding::default(),
        }
    }

    pub fn with_padding(mut self, padding: GridPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.columns > 0 && self.rows > 0 && self.padding.is_valid()
    }

    /// Map a screen position to a cell.
    ///
    /// Fails closed (`None`) when the area is degenerate, the padding is
    /// invalid, the grid has no cells, or `pos` falls outside the inner
    /// (padded) rectangle. Successful results always satisfy
    /// `col < columns` and `row < rows`.
    pub fn map(&self, area: &Rect, pos: Vec2) -> Option<GridCell> {
        if !self.is_valid() {
            return None;
        }
        let n = area.normalize(pos)?;

        let inner_w = 1.0 - self.padding.left - self.padding.right;
        let inner_h = 1.0 - self.padding.top - self.padding.bottom;

        let ix = (n.x - self.padding.left) / inner_w;
        let iy = (n.y - self.padding.top) / inner_h;
        if !(0.0..=1.0).contains(&ix) || !(0.0..=1.0).contains(&iy) {
            return None;
        }

        let col = ((ix * self.columns as f32).floor() as u32).min(self.columns - 1);
        let row = ((iy * self.rows as f32).floor() as u32).min(self.rows - 1);
        Some(GridCell::new(col, row))
    }

    /// The 4-neighbour of `cell` in `direction`, clamped to the grid bounds.
    pub fn neighbor(&self, cell: GridCell, direction: SwipeDirection) -> GridCell {
        let (dc, dr) = direction.grid_step();
        let max_col = self.columns.saturating_sub(1) as i64;
        let max_row = self.rows.saturating_sub(1) as i64;
        let col = (cell.col as i64 + dc as i64).clamp(0, max_col);
        let row = (cell.row as i64 + dr as i64).clamp(0, max_row);
        GridCell::new(col as u32, row as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 200.0)
    }

    #[test]
    fn test_maps_corners_into_bounds() {
        let grid = GridLayout::new(4, 2);

        assert_eq!(grid.map(&area(), Vec2::new(0.0, 0.0)), Some(GridCell::new(0, 0)));
        // The far edge is inside the area and clamps onto the last cell.
        assert_eq!(grid.map(&area(), Vec2::new(400.0, 200.0)), Some(GridCell::new(3, 1)));
        assert_eq!(grid.map(&area(), Vec2::new(150.0, 120.0)), Some(GridCell::new(1, 1)));
    }

    #[test]
    fn test_outside_area_fails() {
        let grid = GridLayout::new(4, 2);
        assert_eq!(grid.map(&area(), Vec2::new(-1.0, 10.0)), None);
        assert_eq!(grid.map(&area(), Vec2::new(10.0, 201.0)), None);
    }

    #[test]
    fn test_padding_shrinks_inner_area() {
        let grid = GridLayout::new(2, 2).with_padding(GridPadding::uniform(0.1));

        // 10% of 400 = 40px dead zone on the left.
        assert_eq!(grid.map(&area(), Vec2::new(39.0, 100.0)), None);
        assert_eq!(grid.map(&area(), Vec2::new(41.0, 100.0)), Some(GridCell::new(0, 1)));
        assert_eq!(grid.map(&area(), Vec2::new(361.0, 100.0)), None);
    }

    #[test]
    fn test_degenerate_configuration_fails_closed() {
        let inverted = GridLayout::new(2, 2).with_padding(GridPadding {
            left: 0.6,
            right: 0.5,
            top: 0.0,
            bottom: 0.0,
        });
        assert_eq!(inverted.map(&area(), Vec2::new(200.0, 100.0)), None);

        let negative = GridLayout::new(2, 2).with_padding(GridPadding::uniform(-0.1));
        assert_eq!(negative.map(&area(), Vec2::new(200.0, 100.0)), None);

        let empty = GridLayout::new(0, 2);
        assert_eq!(empty.map(&area(), Vec2::new(200.0, 100.0)), None);

        let grid = GridLayout::new(2, 2);
        let flat = Rect::new(0.0, 0.0, 100.0, 0.0);
        assert_eq!(grid.map(&flat, Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_mapping_stays_in_bounds_over_a_sweep() {
        let grid = GridLayout::new(7, 5).with_padding(GridPadding::uniform(0.05));
        let mut y = -20.0;
        while y < 220.0 {
            let mut x = -20.0;
            while x < 420.0 {
                if let Some(cell) = grid.map(&area(), Vec2::new(x, y)) {
                    assert!(cell.col < 7, "col out of range at ({x},{y})");
                    assert!(cell.row < 5, "row out of range at ({x},{y})");
                }
                x += 3.7;
            }
            y += 3.1;
        }
    }

    #[test]
    fn test_neighbor_clamps_at_edges() {
        let grid = GridLayout::new(4, 3);
        assert_eq!(
            grid.neighbor(GridCell::new(1, 1), SwipeDirection::Right),
            GridCell::new(2, 1)
        );
        assert_eq!(
            grid.neighbor(GridCell::new(3, 1), SwipeDirection::Right),
            GridCell::new(3, 1)
        );
        assert_eq!(
            grid.neighbor(GridCell::new(0, 0), SwipeDirection::Up),
            GridCell::new(0, 0)
        );
        assert_eq!(
            grid.neighbor(GridCell::new(0, 0), SwipeDirection::Down),
            GridCell::new(0, 1)
        );
    }
}
