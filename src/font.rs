//! The fixed 5×5 bitmap font and the glyph decoder.
//!
//! Each glyph is five row bitmasks, top row first. Within a row, bit 4 is the leftmost
//! column and bit 0 the rightmost, so `0b10001` lights the two outer pixels. The
//! [`compositor`](crate::compositor) reads bits in exactly this order.
//!
//! The table covers the printable ASCII range `0x20..=0x7F`; `0x7F` is drawn as a solid block.

use crate::{Error, Result};

/// Glyph width in pixels.
pub const GLYPH_WIDTH: usize = 5;

/// Glyph height in pixels.
pub const GLYPH_HEIGHT: usize = 5;

/// First character code in the font.
pub const FIRST_CODE: u8 = 0x20;

/// Last character code in the font.
pub const LAST_CODE: u8 = 0x7F;

/// Number of glyphs in the font, one per code in `FIRST_CODE..=LAST_CODE`.
pub const GLYPH_COUNT: usize = 0x60;

/// Bitmap of one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    /// Row bitmasks, top row first.
    pub rows: [u8; GLYPH_HEIGHT],
}

impl Glyph {
    /// The all-off glyph (also the space character).
    pub const BLANK: Self = Self {
        rows: [0; GLYPH_HEIGHT],
    };

    /// Whether the pixel at `(column, row)` is lit, with column 0 on the left.
    ///
    /// Out-of-range coordinates are never lit.
    #[must_use]
    pub fn is_lit(&self, column: usize, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|bits| column_lit(*bits, column))
    }
}

/// Test bit `bit_index` of a row bitmask.
#[must_use]
pub(crate) fn bit(row_bits: u8, bit_index: usize) -> bool {
    u32::try_from(bit_index)
        .ok()
        .and_then(|shift| row_bits.checked_shr(shift))
        .is_some_and(|shifted| shifted & 1 == 1)
}

/// Whether glyph column `column` of a row bitmask is lit, with column 0 on the left.
///
/// Columns past the glyph are never lit.
#[must_use]
pub(crate) fn column_lit(row_bits: u8, column: usize) -> bool {
    GLYPH_WIDTH
        .checked_sub(1)
        .and_then(|last| last.checked_sub(column))
        .is_some_and(|bit_index| bit(row_bits, bit_index))
}

/// Look up the glyph for `code`.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] when `code` is outside `0x20..=0x7F`.
pub fn decode(code: u8) -> Result<Glyph> {
    if !(FIRST_CODE..=LAST_CODE).contains(&code) {
        return Err(Error::OutOfRange { code });
    }
    code.checked_sub(FIRST_CODE)
        .and_then(|index| FONT_5X5.get(usize::from(index)))
        .map(|rows| Glyph { rows: *rows })
        .ok_or(Error::OutOfRange { code })
}

#[rustfmt::skip]
const FONT_5X5: [[u8; GLYPH_HEIGHT]; GLYPH_COUNT] = [
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000], // ' '
    [0b00100, 0b00100, 0b00100, 0b00000, 0b00100], // '!'
    [0b01010, 0b01010, 0b00000, 0b00000, 0b00000], // '"'
    [0b01010, 0b11111, 0b01010, 0b11111, 0b01010], // '#'
    [0b01111, 0b10100, 0b01110, 0b00101, 0b11110], // '$'
    [0b11001, 0b11010, 0b00100, 0b01011, 0b10011], // '%'
    [0b01100, 0b10010, 0b01101, 0b10010, 0b01101], // '&'
    [0b00100, 0b00100, 0b00000, 0b00000, 0b00000], // '''
    [0b00010, 0b00100, 0b00100, 0b00100, 0b00010], // '('
    [0b01000, 0b00100, 0b00100, 0b00100, 0b01000], // ')'
    [0b10101, 0b01110, 0b11111, 0b01110, 0b10101], // '*'
    [0b00100, 0b00100, 0b11111, 0b00100, 0b00100], // '+'
    [0b00000, 0b00000, 0b00000, 0b00100, 0b01000], // ','
    [0b00000, 0b00000, 0b11111, 0b00000, 0b00000], // '-'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00100], // '.'
    [0b00001, 0b00010, 0b00100, 0b01000, 0b10000], // '/'
    [0b01110, 0b10011, 0b10101, 0b11001, 0b01110], // '0'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // '1'
    [0b11110, 0b00001, 0b01110, 0b10000, 0b11111], // '2'
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // '3'
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010], // '4'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // '5'
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110], // '6'
    [0b11111, 0b00010, 0b00100, 0b01000, 0b01000], // '7'
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // '8'
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // '9'
    [0b00000, 0b00100, 0b00000, 0b00100, 0b00000], // ':'
    [0b00000, 0b00100, 0b00000, 0b00100, 0b01000], // ';'
    [0b00010, 0b00100, 0b01000, 0b00100, 0b00010], // '<'
    [0b00000, 0b11111, 0b00000, 0b11111, 0b00000], // '='
    [0b01000, 0b00100, 0b00010, 0b00100, 0b01000], // '>'
    [0b01110, 0b00001, 0b00110, 0b00000, 0b00100], // '?'
    [0b01110, 0b10001, 0b10111, 0b10000, 0b01110], // '@'
    [0b01110, 0b10001, 0b11111, 0b10001, 0b10001], // 'A'
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // 'B'
    [0b01111, 0b10000, 0b10000, 0b10000, 0b01111], // 'C'
    [0b11110, 0b10001, 0b10001, 0b10001, 0b11110], // 'D'
    [0b11111, 0b10000, 0b11110, 0b10000, 0b11111], // 'E'
    [0b11111, 0b10000, 0b11110, 0b10000, 0b10000], // 'F'
    [0b01111, 0b10000, 0b10011, 0b10001, 0b01111], // 'G'
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // 'H'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b01110], // 'I'
    [0b00111, 0b00010, 0b00010, 0b10010, 0b01100], // 'J'
    [0b10010, 0b10100, 0b11000, 0b10100, 0b10010], // 'K'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // 'L'
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // 'M'
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // 'N'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 'O'
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // 'P'
    [0b01110, 0b10001, 0b10101, 0b10010, 0b01101], // 'Q'
    [0b11110, 0b10001, 0b11110, 0b10100, 0b10010], // 'R'
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // 'S'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // 'T'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 'U'
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // 'V'
    [0b10001, 0b10001, 0b10101, 0b11011, 0b10001], // 'W'
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // 'X'
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // 'Y'
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // 'Z'
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01110], // '['
    [0b10000, 0b01000, 0b00100, 0b00010, 0b00001], // '\'
    [0b01110, 0b00010, 0b00010, 0b00010, 0b01110], // ']'
    [0b00100, 0b01010, 0b10001, 0b00000, 0b00000], // '^'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b11111], // '_'
    [0b01000, 0b00100, 0b00000, 0b00000, 0b00000], // '`'
    [0b00000, 0b01110, 0b10010, 0b10010, 0b01111], // 'a'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b11110], // 'b'
    [0b00000, 0b01111, 0b10000, 0b10000, 0b01111], // 'c'
    [0b00001, 0b00001, 0b01111, 0b10001, 0b01111], // 'd'
    [0b01110, 0b10001, 0b11111, 0b10000, 0b01110], // 'e'
    [0b00110, 0b01000, 0b11100, 0b01000, 0b01000], // 'f'
    [0b01111, 0b10001, 0b01111, 0b00001, 0b01110], // 'g'
    [0b10000, 0b10000, 0b11110, 0b10001, 0b10001], // 'h'
    [0b00100, 0b00000, 0b00100, 0b00100, 0b00100], // 'i'
    [0b00010, 0b00000, 0b00010, 0b10010, 0b01100], // 'j'
    [0b10000, 0b10010, 0b11100, 0b10010, 0b10001], // 'k'
    [0b01000, 0b01000, 0b01000, 0b01000, 0b00110], // 'l'
    [0b00000, 0b11010, 0b10101, 0b10101, 0b10101], // 'm'
    [0b00000, 0b11110, 0b10001, 0b10001, 0b10001], // 'n'
    [0b00000, 0b01110, 0b10001, 0b10001, 0b01110], // 'o'
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // 'p'
    [0b01111, 0b10001, 0b01111, 0b00001, 0b00001], // 'q'
    [0b00000, 0b01011, 0b01100, 0b01000, 0b01000], // 'r'
    [0b00000, 0b01111, 0b11000, 0b00011, 0b11110], // 's'
    [0b01000, 0b11110, 0b01000, 0b01000, 0b00110], // 't'
    [0b00000, 0b10001, 0b10001, 0b10001, 0b01110], // 'u'
    [0b00000, 0b10001, 0b10001, 0b01010, 0b00100], // 'v'
    [0b00000, 0b10001, 0b10101, 0b10101, 0b01010], // 'w'
    [0b00000, 0b10010, 0b01100, 0b01100, 0b10010], // 'x'
    [0b10001, 0b10001, 0b01111, 0b00001, 0b01110], // 'y'
    [0b00000, 0b11111, 0b00010, 0b01100, 0b11111], // 'z'
    [0b00110, 0b00100, 0b01000, 0b00100, 0b00110], // '{'
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // '|'
    [0b01100, 0b00100, 0b00010, 0b00100, 0b01100], // '}'
    [0b00000, 0b01000, 0b10101, 0b00010, 0b00000], // '~'
    [0b11111, 0b11111, 0b11111, 0b11111, 0b11111], // DEL
];
