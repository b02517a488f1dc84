#![forbid(unsafe_code)]

//! Character-grid canvas.
//!
//! Maps the surface onto a `cols x rows` grid. Each cell takes the state of
//! the surface point at its center: dimmed cells are drawn with shade
//! characters, cleared cells are blank. Frames can be compared by BLAKE3
//! checksum for golden tests.

use spotlight::{Canvas, Cutout};
use spotlight_core::{Point, Rect, Rgba, Size};

const CHECKSUM_PREFIX: &str = "blake3:";

#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    cols: usize,
    rows: usize,
    cell: Size,
    alpha: f32,
    blurred: bool,
    cells: Vec<char>,
}

impl AsciiCanvas {
    /// A grid of `cols x rows` covering a surface of `surface` pixels.
    pub fn new(cols: usize, rows: usize, surface: Size) -> Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        Self {
            cols,
            rows,
            cell: Size::new(surface.width / cols as f32, surface.height / rows as f32),
            alpha: 1.0,
            blurred: false,
            cells: vec![' '; cols * rows],
        }
    }

    fn cell_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            (col as f32 + 0.5) * self.cell.width,
            (row as f32 + 0.5) * self.cell.height,
        )
    }

    /// Draw a card outline at `bounds` with `title` on its first inner row.
    pub fn draw_card(&mut self, bounds: Rect, title: &str) {
        let col = |x: f32| ((x / self.cell.width).floor().max(0.0) as usize).min(self.cols - 1);
        let row = |y: f32| ((y / self.cell.height).floor().max(0.0) as usize).min(self.rows - 1);
        let (left, right) = (col(bounds.left()), col(bounds.right()));
        let (top, bottom) = (row(bounds.top()), row(bounds.bottom()));

        for r in top..=bottom {
            for c in left..=right {
                let ch = match (r == top || r == bottom, c == left || c == right) {
                    (true, true) => '+',
                    (true, false) => '-',
                    (false, true) => '|',
                    (false, false) => ' ',
                };
                self.cells[r * self.cols + c] = ch;
            }
        }

        if bottom > top + 1 && right > left + 1 {
            let r = top + 1;
            for (offset, ch) in title.chars().take(right - left - 1).enumerate() {
                self.cells[r * self.cols + left + 1 + offset] = ch;
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn char_at(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    pub fn is_blurred(&self) -> bool {
        self.blurred
    }

    /// The grid as text, one line per row.
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// BLAKE3 checksum of the grid contents, prefixed with `blake3:`.
    pub fn checksum(&self) -> String {
        let hash = blake3::hash(self.to_text().as_bytes());
        format!("{CHECKSUM_PREFIX}{}", hash.to_hex())
    }
}

impl Canvas for AsciiCanvas {
    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn apply_blur(&mut self, _radius: f32) {
        self.blurred = true;
    }

    fn fill(&mut self, color: Rgba) {
        let coverage = self.alpha * f32::from(color.a()) / 255.0;
        let shade = if coverage >= 0.5 {
            '#'
        } else if coverage > 0.0 {
            ':'
        } else {
            return;
        };
        self.cells.fill(shade);
    }

    fn clear(&mut self, cutout: &Cutout) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if cutout.contains(self.cell_center(col, row)) {
                    self.cells[row * self.cols + col] = ' ';
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_clear() {
        let mut canvas = AsciiCanvas::new(10, 5, Size::new(100.0, 50.0));
        canvas.set_alpha(1.0);
        canvas.fill(Rgba::from_argb(0xB300_0000));
        canvas.clear(&Cutout::Rect {
            bounds: Rect::new(20.0, 10.0, 30.0, 20.0),
        });
        assert_eq!(canvas.char_at(0, 0), Some('#'));
        assert_eq!(canvas.char_at(3, 2), Some(' '));
        assert_eq!(canvas.char_at(6, 2), Some('#'));
        assert_eq!(canvas.char_at(10, 0), None);
    }

    #[test]
    fn light_fill_at_low_alpha() {
        let mut canvas = AsciiCanvas::new(4, 2, Size::new(40.0, 20.0));
        canvas.set_alpha(0.2);
        canvas.fill(Rgba::BLACK);
        assert_eq!(canvas.char_at(1, 1), Some(':'));
    }

    #[test]
    fn card_outline_and_title() {
        let mut canvas = AsciiCanvas::new(20, 6, Size::new(200.0, 60.0));
        canvas.draw_card(Rect::new(10.0, 10.0, 100.0, 30.0), "Hello world");
        let text = canvas.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(&lines[1][1..12], "+---------+");
        assert_eq!(&lines[2][1..11], "|Hello wor");
    }

    #[test]
    fn checksum_tracks_content() {
        let mut a = AsciiCanvas::new(8, 4, Size::new(80.0, 40.0));
        let b = a.clone();
        assert_eq!(a.checksum(), b.checksum());
        assert!(a.checksum().starts_with("blake3:"));
        a.fill(Rgba::BLACK);
        assert_ne!(a.checksum(), b.checksum());
    }
}
