use derive_more::{Display, Error};

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the message engine and its device task.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// `initialize` was called on an engine that is already initialized.
    #[display("message engine is already initialized")]
    AlreadyInitialized,

    /// The operation needs an initialized engine.
    #[display("message engine is not initialized")]
    InvalidState,

    /// A required input was empty.
    #[display("invalid argument: {what}")]
    InvalidArgument {
        /// Which input was rejected.
        what: &'static str,
    },

    /// A value was outside its allowed domain (mode, color channel, capacity, period).
    #[display("invalid parameter: {what}")]
    InvalidParameter {
        /// Which parameter was rejected.
        what: &'static str,
    },

    /// The character code has no glyph in the 5×5 font.
    #[display("character code {code:#04x} is outside the font")]
    OutOfRange {
        /// The rejected character code.
        code: u8,
    },

    /// The requested message capacity does not fit in the fixed text buffer.
    #[display("message capacity {requested} exceeds the {max} byte buffer")]
    ResourceExhausted {
        /// Capacity asked for at initialization.
        requested: usize,
        /// Size of the fixed text buffer.
        max: usize,
    },

    /// An output buffer was too small for an encoded frame.
    #[display("buffer holds {actual} bytes but {needed} are needed")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        actual: usize,
    },

    /// The frame sink (LED driver) failed to accept a frame.
    #[display("frame sink rejected the frame")]
    Sink,

    /// The embassy executor could not spawn the device task.
    #[display("failed to spawn the device task")]
    TaskSpawn,
}
