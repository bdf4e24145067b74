//! Frames handed to the LED driver.
//!
//! See [`Frame2d`] for the cell order and [`MatrixFrame`] for the frame size the engine renders.

use core::ops::{Deref, DerefMut, Index, IndexMut};

use smart_leds::RGB8;

use crate::{Error, MATRIX_HEIGHT, MATRIX_WIDTH, Result};

const OFF: RGB8 = RGB8::new(0, 0, 0);

/// A frame the size of the LED matrix. This is what the engine emits once per rendering tick.
pub type MatrixFrame = Frame2d<MATRIX_WIDTH, MATRIX_HEIGHT>;

/// 2D array of RGB pixels in the order the LED driver consumes them.
///
/// The outer array holds rows (`y`), the inner array holds cells (`x`), and a driver reads
/// the frame row by row. Index with a tuple `(x, y)`; `(0, 0)` is the first cell sent.
///
/// The engine fills frames in the matrix's own orientation, which is rotated 90° relative to
/// the font: output cell `(x, y)` shows glyph row `x`, glyph column `y`. See
/// [`compositor`](crate::compositor).
///
/// ```rust
/// use led_msgboard::{colors, frame::MatrixFrame};
///
/// let mut frame = MatrixFrame::new();
/// frame[(1, 0)] = colors::RED;
/// assert_eq!(frame.cells().nth(1), Some(colors::RED));
/// assert_eq!(frame.lit_count(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame2d<const W: usize, const H: usize>(pub [[RGB8; W]; H]);

impl<const W: usize, const H: usize> Frame2d<W, H> {
    /// Frame2d width in pixels (cells per row).
    pub const WIDTH: usize = W;
    /// Frame2d height in pixels (rows).
    pub const HEIGHT: usize = H;
    /// Total number of pixels (WIDTH × HEIGHT).
    pub const LEN: usize = W * H;
    /// Size of [`write_display_buffer`](Self::write_display_buffer) output: width, height,
    /// then three bytes per pixel.
    pub const DISPLAY_BUFFER_LEN: usize = 2 + 3 * W * H;

    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([[OFF; W]; H])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: RGB8) -> Self {
        Self([[color; W]; H])
    }

    /// Pixels in driver order: row 0 left to right, then row 1, and so on.
    pub fn cells(&self) -> impl Iterator<Item = RGB8> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    /// Number of pixels that are not off.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.cells().filter(|pixel| *pixel != OFF).count()
    }

    /// Whether every pixel is off.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.lit_count() == 0
    }

    /// Encode the frame in the matrix driver's buffer layout: `[W, H, r, g, b, r, g, b, ...]`.
    ///
    /// Pixels follow [`cells`](Self::cells) order and each pixel is red, green, blue. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `buffer` is shorter than
    /// [`DISPLAY_BUFFER_LEN`](Self::DISPLAY_BUFFER_LEN), and [`Error::InvalidParameter`] if a
    /// dimension does not fit in a byte.
    pub fn write_display_buffer(&self, buffer: &mut [u8]) -> Result<usize> {
        let needed = Self::DISPLAY_BUFFER_LEN;
        if buffer.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }
        let width = u8::try_from(W).map_err(|_| Error::InvalidParameter { what: "width" })?;
        let height = u8::try_from(H).map_err(|_| Error::InvalidParameter { what: "height" })?;

        let (header, body) = buffer.split_at_mut(2);
        header.copy_from_slice(&[width, height]);
        for (chunk, pixel) in body.chunks_exact_mut(3).zip(self.cells()) {
            chunk.copy_from_slice(&[pixel.r, pixel.g, pixel.b]);
        }
        Ok(needed)
    }
}

impl<const W: usize, const H: usize> Deref for Frame2d<W, H> {
    type Target = [[RGB8; W]; H];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const W: usize, const H: usize> DerefMut for Frame2d<W, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const W: usize, const H: usize> Index<(usize, usize)> for Frame2d<W, H> {
    type Output = RGB8;

    fn index(&self, (x_index, y_index): (usize, usize)) -> &Self::Output {
        assert!(x_index < W, "x_index must be within width");
        assert!(y_index < H, "y_index must be within height");
        &self.0[y_index][x_index]
    }
}

impl<const W: usize, const H: usize> IndexMut<(usize, usize)> for Frame2d<W, H> {
    fn index_mut(&mut self, (x_index, y_index): (usize, usize)) -> &mut Self::Output {
        assert!(x_index < W, "x_index must be within width");
        assert!(y_index < H, "y_index must be within height");
        &mut self.0[y_index][x_index]
    }
}

impl<const W: usize, const H: usize> From<[[RGB8; W]; H]> for Frame2d<W, H> {
    fn from(array: [[RGB8; W]; H]) -> Self {
        Self(array)
    }
}

impl<const W: usize, const H: usize> From<Frame2d<W, H>> for [[RGB8; W]; H] {
    fn from(frame: Frame2d<W, H>) -> Self {
        frame.0
    }
}

impl<const W: usize, const H: usize> Default for Frame2d<W, H> {
    fn default() -> Self {
        Self::new()
    }
}
