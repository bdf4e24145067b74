//! The message store: what to show, in which color, how fast, and in which display mode.

use heapless::Vec;
use smart_leds::RGB8;

use crate::{Error, Result};

/// How a message is shown and what happens after its last character.
///
/// The numeric codes (`0..=4`) are the ones used by callers that pass modes as integers,
/// see [`DisplayMode::try_from`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DisplayMode {
    /// Nothing is shown.
    #[default]
    Idle = 0,
    /// One character at a time, message shown once.
    NormalOnce = 1,
    /// Characters scroll in column by column, message shown once.
    ScrollOnce = 2,
    /// One character at a time, repeating forever.
    NormalRepeat = 3,
    /// Characters scroll in column by column, repeating forever.
    ScrollRepeat = 4,
}

impl DisplayMode {
    /// Whether characters scroll in one column per tick.
    #[must_use]
    pub const fn is_scroll(self) -> bool {
        matches!(self, Self::ScrollOnce | Self::ScrollRepeat)
    }

    /// Whether characters are switched whole, one per period.
    #[must_use]
    pub const fn is_per_character(self) -> bool {
        matches!(self, Self::NormalOnce | Self::NormalRepeat)
    }

    /// Whether the message loops back to its first character instead of ending.
    #[must_use]
    pub const fn is_repeat(self) -> bool {
        matches!(self, Self::NormalRepeat | Self::ScrollRepeat)
    }
}

impl TryFrom<u8> for DisplayMode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Idle),
            1 => Ok(Self::NormalOnce),
            2 => Ok(Self::ScrollOnce),
            3 => Ok(Self::NormalRepeat),
            4 => Ok(Self::ScrollRepeat),
            _ => Err(Error::InvalidParameter {
                what: "display mode",
            }),
        }
    }
}

/// Build a color from wide integer channels, as received from a command line or serial link.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if any channel is outside `0..=255`.
pub fn rgb_from_channels(red: i32, green: i32, blue: i32) -> Result<RGB8> {
    let channel = |value: i32| {
        u8::try_from(value).map_err(|_| Error::InvalidParameter {
            what: "color channel",
        })
    };
    Ok(RGB8::new(channel(red)?, channel(green)?, channel(blue)?))
}

/// Scroll tick period for a per-character period: one character spans `MATRIX_WIDTH + 1` ticks.
#[must_use]
pub const fn scroll_tick_period_ms(period_ms: u32) -> u32 {
    match period_ms.checked_div(SCROLL_TICKS_PER_CHARACTER) {
        Some(tick_ms) => tick_ms,
        None => 0,
    }
}

/// Scroll steps per character: one per glyph column plus the gap column (`MATRIX_WIDTH + 1`).
pub const SCROLL_TICKS_PER_CHARACTER: u32 = 6;

/// A validated message, immutable once built.
///
/// `MAX_CAPACITY` is the size of the fixed text buffer. Text longer than the capacity given
/// to [`Message::new`] is truncated, never buffered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message<const MAX_CAPACITY: usize> {
    text: Vec<u8, MAX_CAPACITY>,
    mode: DisplayMode,
    color: RGB8,
    period_ms: u32,
}

impl<const MAX_CAPACITY: usize> Message<MAX_CAPACITY> {
    /// Validate and build a message, truncating `text` to `capacity` bytes.
    ///
    /// Text is stored as bytes; characters outside the font render as blanks.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `text` is empty.
    /// - [`Error::InvalidParameter`] if `period_ms` is zero, if a scroll mode's period is too
    ///   short to give each column at least 1 ms, or if `capacity` is zero.
    /// - [`Error::ResourceExhausted`] if `capacity` exceeds `MAX_CAPACITY`.
    pub fn new(
        text: &[u8],
        mode: DisplayMode,
        color: RGB8,
        period_ms: u32,
        capacity: usize,
    ) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidArgument { what: "text" });
        }
        check_capacity::<MAX_CAPACITY>(capacity)?;
        if period_ms == 0 {
            return Err(Error::InvalidParameter { what: "period" });
        }
        if mode.is_scroll() && scroll_tick_period_ms(period_ms) == 0 {
            return Err(Error::InvalidParameter {
                what: "scroll period",
            });
        }

        let kept = text.get(..capacity).unwrap_or(text);
        let text = Vec::from_slice(kept).map_err(|()| Error::ResourceExhausted {
            requested: kept.len(),
            max: MAX_CAPACITY,
        })?;
        Ok(Self {
            text,
            mode,
            color,
            period_ms,
        })
    }

    /// The (possibly truncated) text.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Text length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always `false`: empty messages are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character code at `index`, or `None` past the end.
    #[must_use]
    pub fn code_at(&self, index: usize) -> Option<u8> {
        self.text.get(index).copied()
    }

    /// Display mode.
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Pixel color.
    #[must_use]
    pub const fn color(&self) -> RGB8 {
        self.color
    }

    /// Time each character is shown, in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }
}

/// Check a runtime capacity against the fixed buffer size.
pub(crate) const fn check_capacity<const MAX_CAPACITY: usize>(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::InvalidParameter { what: "capacity" });
    }
    if capacity > MAX_CAPACITY {
        return Err(Error::ResourceExhausted {
            requested: capacity,
            max: MAX_CAPACITY,
        });
    }
    Ok(())
}
