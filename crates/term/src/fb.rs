//! Cell grid that screens paint into before it reaches the terminal.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix towards `other`; `t = 0` keeps `self`, `t = 1` gives `other`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Text weight of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Bold,
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub emphasis: Emphasis,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::new(Rgb::new(220, 220, 220), Rgb::BLACK)
    }
}

impl CellStyle {
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            emphasis: Emphasis::Normal,
        }
    }

    pub const fn bold(self) -> Self {
        self.with_emphasis(Emphasis::Bold)
    }

    pub const fn dim(self) -> Self {
        self.with_emphasis(Emphasis::Dim)
    }

    pub const fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Style of a view at opacity `alpha` over `backdrop`.
    ///
    /// A view fading out ends up drawn in the backdrop color on both planes,
    /// so the last frames of a fade read as the screen emptying.
    pub fn faded(self, alpha: f32, backdrop: Rgb) -> Self {
        if alpha >= 1.0 {
            return self;
        }
        let t = 1.0 - alpha;
        Self {
            fg: self.fg.lerp(backdrop, t),
            bg: self.bg.lerp(backdrop, t),
            ..self
        }
    }

    pub fn into_cell(self, ch: char) -> Cell {
        Cell { ch, style: self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Cell {
    pub fn blank() -> Self {
        CellStyle::default().into_cell(' ')
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// Row-major grid of styled cells.
///
/// Writes take signed coordinates: a sliding view may start left of or
/// above the screen, and whatever falls outside is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Match the viewport size. Contents are left for the next clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (self.width, self.height) != (width, height) {
            self.width = width;
            self.height = height;
            self.cells
                .resize(width as usize * height as usize, Cell::blank());
        }
    }

    /// One row of cells; empty past the bottom edge.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u16::try_from(x).ok()?, u16::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.offset(x as i32, y as i32).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.offset(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn put_char(&mut self, x: i32, y: i32, ch: char, style: CellStyle) {
        self.set(x, y, style.into_cell(ch));
    }

    pub fn put_str(&mut self, x: i32, y: i32, s: &str, style: CellStyle) {
        for (col, ch) in (x..).zip(s.chars()) {
            self.put_char(col, y, ch, style);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16, ch: char, style: CellStyle) {
        let cell = style.into_cell(ch);
        for row in y..y + h as i32 {
            for col in x..x + w as i32 {
                self.set(col, row, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_off_buffer_are_clipped() {
        let mut fb = FrameBuffer::new(4, 2);
        let style = CellStyle::default();
        fb.put_str(-2, 0, "abcd", style);
        fb.put_char(9, 9, 'x', style);
        fb.fill_rect(3, -1, 4, 2, '#', style);

        assert_eq!(fb.get(0, 0).unwrap().ch, 'c');
        assert_eq!(fb.get(1, 0).unwrap().ch, 'd');
        assert_eq!(fb.get(2, 0).unwrap().ch, ' ');
        assert_eq!(fb.get(3, 0).unwrap().ch, '#');
        assert_eq!(fb.get(3, 1).unwrap().ch, ' ');
    }

    #[test]
    fn test_rows_follow_resize() {
        let mut fb = FrameBuffer::new(3, 2);
        assert_eq!(fb.row(1).len(), 3);
        assert!(fb.row(2).is_empty());

        fb.resize(5, 4);
        assert_eq!(fb.row(3).len(), 5);
        assert_eq!(fb.get(4, 3), Some(Cell::blank()));
    }

    #[test]
    fn test_faded_style_moves_towards_backdrop() {
        let style = CellStyle::new(Rgb::new(200, 100, 0), Rgb::BLACK).bold();
        assert_eq!(style.faded(1.0, Rgb::default()), style);

        let half = style.faded(0.5, Rgb::BLACK);
        assert_eq!(half.fg, Rgb::new(100, 50, 0));
        assert_eq!(half.emphasis, Emphasis::Bold);
        assert_eq!(style.faded(0.0, Rgb::new(9, 9, 9)).fg, Rgb::new(9, 9, 9));
    }
}
