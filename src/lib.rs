//! Text message engine for small square RGB LED matrices (for example the 5×5 matrix on an M5 Atom).
//!
//! A message is rendered one 5×5 glyph at a time, either switching whole characters
//! (`Normal*` modes) or scrolling them in one column per tick (`Scroll*` modes), once or
//! repeating. The engine is driven by a periodic [`tick`](engine::DisplayEngine::tick) and
//! writes every frame it renders to an injected [`FrameSink`](engine::FrameSink).
//!
//! See [`engine`] for the state machine and [`msg_board`] for the embassy device task that
//! owns an engine and lets other tasks change the message.
//!
//! # Glossary
//!
//! - **Glyph:** the 5×5 bitmap of one character, see [`font`].
//! - **Tick:** one invocation of the periodic driver.
//! - **Scroll step:** one column-wide shift of the scroll matrix plus one new column from the
//!   current glyph.
//! - **One-shot vs repeat:** one-shot ends after showing the message once; repeat loops back to
//!   the first character forever.
#![cfg_attr(not(any(test, feature = "host")), no_std)]

// Logging macros must be defined before the modules that use them.
#[macro_use]
mod fmt;

pub mod compositor;
pub mod engine;
mod error;
pub mod font;
pub mod frame;
pub mod message;
pub mod msg_board;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

/// RGB color type used by every frame.
pub use smart_leds::RGB8;

/// Number of LED columns on the matrix.
pub const MATRIX_WIDTH: usize = font::GLYPH_WIDTH;

/// Number of LED rows on the matrix.
pub const MATRIX_HEIGHT: usize = font::GLYPH_HEIGHT;

// The scroll read-out swaps rows and columns, which only keeps its shape on a square panel.
const _: () = assert!(MATRIX_WIDTH == MATRIX_HEIGHT, "the LED matrix must be square");
