//! Pushes painted frames to the real terminal.
//!
//! Each frame is compared row by row with the one before it and only the
//! changed spans are written. Mouse capture stays on between `enter` and
//! `exit` so presses and drags reach the gesture recognizer.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{Cell, CellStyle, Emphasis, FrameBuffer, Rgb};

/// Horizontal run of cells that differ from the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub y: u16,
    pub len: u16,
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    shown: Option<FrameBuffer>,
    out: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            shown: None,
            out: Vec::with_capacity(32 * 1024),
        }
    }

    /// Raw mode, alternate screen, mouse capture.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.out.clear();
        self.out.queue(terminal::EnterAlternateScreen)?;
        self.out.queue(EnableMouseCapture)?;
        self.out.queue(cursor::Hide)?;
        self.out.queue(terminal::DisableLineWrap)?;
        self.flush()
    }

    pub fn exit(&mut self) -> Result<()> {
        self.out.clear();
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(terminal::EnableLineWrap)?;
        self.out.queue(cursor::Show)?;
        self.out.queue(DisableMouseCapture)?;
        self.out.queue(terminal::LeaveAlternateScreen)?;
        self.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Repaint everything on the next draw. Call after a resize.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    /// Show `fb`, then hand back the previously shown frame in its place.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.out.clear();
        let shown = self
            .shown
            .take()
            .filter(|s| (s.width(), s.height()) == (fb.width(), fb.height()));
        let recycled = match shown {
            Some(shown) => {
                write_changes(&shown, fb, &mut self.out)?;
                shown
            }
            None => {
                write_frame(fb, &mut self.out)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush()?;
        self.shown = Some(std::mem::replace(fb, recycled));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.write_all(&self.out)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Queue a clear followed by every cell of `fb`.
pub fn write_frame(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut pen = Pen::default();
    for y in 0..fb.height() {
        out.queue(cursor::MoveTo(0, y))?;
        pen.print(out, fb.row(y))?;
    }
    pen.finish(out)
}

/// Queue only the spans of `next` that differ from `prev`.
pub fn write_changes(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut pen = Pen::default();
    for span in changed_spans(prev, next) {
        let row = next.row(span.y);
        let start = span.x as usize;
        out.queue(cursor::MoveTo(span.x, span.y))?;
        pen.print(out, &row[start..start + span.len as usize])?;
    }
    pen.finish(out)
}

/// Spans where `next` differs from `prev`. Frames of different size are
/// reported as whole rows.
pub fn changed_spans(prev: &FrameBuffer, next: &FrameBuffer) -> Vec<Span> {
    let mut spans = Vec::new();
    let same_size = (prev.width(), prev.height()) == (next.width(), next.height());
    for y in 0..next.height() {
        if !same_size {
            spans.push(Span {
                x: 0,
                y,
                len: next.width(),
            });
            continue;
        }
        let mut open: Option<u16> = None;
        for (x, (a, b)) in (0u16..).zip(prev.row(y).iter().zip(next.row(y))) {
            match (a != b, open) {
                (true, None) => open = Some(x),
                (false, Some(start)) => {
                    spans.push(Span { x: start, y, len: x - start });
                    open = None;
                }
                _ => {}
            }
        }
        if let Some(start) = open {
            spans.push(Span {
                x: start,
                y,
                len: next.width() - start,
            });
        }
    }
    spans
}

/// Tracks the terminal's current colors so repeats are not re-sent.
#[derive(Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    emphasis: Option<Emphasis>,
}

impl Pen {
    fn print(&mut self, out: &mut Vec<u8>, cells: &[Cell]) -> Result<()> {
        for cell in cells {
            self.apply(out, cell.style)?;
            out.queue(Print(cell.ch))?;
        }
        Ok(())
    }

    fn apply(&mut self, out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
        if self.emphasis != Some(style.emphasis) {
            // Attribute::Reset also drops colors.
            out.queue(SetAttribute(Attribute::Reset))?;
            match style.emphasis {
                Emphasis::Normal => {}
                Emphasis::Bold => {
                    out.queue(SetAttribute(Attribute::Bold))?;
                }
                Emphasis::Dim => {
                    out.queue(SetAttribute(Attribute::Dim))?;
                }
            }
            self.emphasis = Some(style.emphasis);
            self.fg = None;
            self.bg = None;
        }
        if self.fg != Some(style.fg) {
            out.queue(SetForegroundColor(color(style.fg)))?;
            self.fg = Some(style.fg);
        }
        if self.bg != Some(style.bg) {
            out.queue(SetBackgroundColor(color(style.bg)))?;
            self.bg = Some(style.bg);
        }
        Ok(())
    }

    fn finish(self, out: &mut Vec<u8>) -> Result<()> {
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
