//! Turns glyphs into frames, either one whole character at a time or one scrolled column at a time.
//!
//! # Orientation
//!
//! The matrix is mounted rotated 90° relative to the font, so both strategies write glyph
//! row `r`, glyph column `c` to output cell `(x = r, y = W - 1 - c)`, where column 0 is the
//! glyph's left edge. A glyph that has scrolled fully into view therefore reads out exactly
//! like its static render, only offset by the columns that followed it.
//!
//! # Scrolling
//!
//! The scroll matrix is kept in storage orientation (`matrix[row][column]`, column 0 on the
//! left). Each [`Compositor::scroll_step`] shifts every column one place toward column 0,
//! discards the old column 0, and fills the trailing column from the current glyph. Offsets
//! `0..W` take glyph columns left to right; offset `W` inserts the blank gap column between
//! characters, so one character occupies `W + 1` steps.

use smart_leds::RGB8;

use crate::{
    MATRIX_HEIGHT, MATRIX_WIDTH,
    font::{Glyph, bit, column_lit},
    frame::MatrixFrame,
};

const OFF: RGB8 = RGB8::new(0, 0, 0);

/// Frame compositor holding the persisted scroll matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compositor {
    matrix: [[RGB8; MATRIX_WIDTH]; MATRIX_HEIGHT],
}

impl Compositor {
    /// Create a compositor with an all-off scroll matrix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            matrix: [[OFF; MATRIX_WIDTH]; MATRIX_HEIGHT],
        }
    }

    /// Turn every pixel of the scroll matrix off.
    pub fn reset(&mut self) {
        self.matrix = [[OFF; MATRIX_WIDTH]; MATRIX_HEIGHT];
    }

    /// Render one character as a full frame. Does not touch the scroll matrix.
    #[must_use]
    pub fn render_character(glyph: &Glyph, color: RGB8) -> MatrixFrame {
        let mut frame = MatrixFrame::new();
        for (column, frame_row) in frame.iter_mut().enumerate() {
            for (row, pixel) in frame_row.iter_mut().enumerate() {
                let row_bits = glyph.rows.get(row).copied().unwrap_or(0);
                *pixel = if bit(row_bits, column) { color } else { OFF };
            }
        }
        frame
    }

    /// Shift the scroll matrix one column and pull in glyph column `column_offset`.
    ///
    /// `column_offset` of `MATRIX_WIDTH` or more inserts a blank gap column. Returns the
    /// scroll matrix read out in output orientation.
    pub fn scroll_step(&mut self, glyph: &Glyph, column_offset: usize, color: RGB8) -> MatrixFrame {
        for (matrix_row, row_bits) in self.matrix.iter_mut().zip(glyph.rows) {
            matrix_row.rotate_left(1);
            let lit = column_offset < MATRIX_WIDTH && column_lit(row_bits, column_offset);
            if let Some(trailing) = matrix_row.last_mut() {
                *trailing = if lit { color } else { OFF };
            }
        }
        self.read_out()
    }

    /// The scroll matrix in output orientation, rows and columns swapped.
    #[must_use]
    pub fn read_out(&self) -> MatrixFrame {
        let mut frame = MatrixFrame::new();
        for (frame_row, source_column) in frame.iter_mut().zip((0..MATRIX_WIDTH).rev()) {
            for (matrix_row, pixel) in self.matrix.iter().zip(frame_row.iter_mut()) {
                if let Some(source) = matrix_row.get(source_column) {
                    *pixel = *source;
                }
            }
        }
        frame
    }

    /// Whether every pixel of the scroll matrix is off.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.matrix.iter().flatten().all(|pixel| *pixel == OFF)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}
