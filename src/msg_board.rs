//! A device abstraction that runs a [`DisplayEngine`] in its own embassy task.
//!
//! The task owns the engine (and with it the LED driver and the event handler), so only the
//! task ever touches the message, cursor, or scroll matrix. Other tasks talk to it through a
//! [`MsgBoard`] handle: each request is sent as a [`Command`] over a signal and applied
//! between two ticks, never in the middle of one. The handle then waits for the engine's
//! answer, so validation errors come back to the caller.
//!
//! See [`msg_board!`](crate::msg_board!) for the macro that generates the task and a
//! constructor.
//!
//! # Example
//!
//! ```rust,ignore
//! use led_msgboard::{colors, engine::DisplayEvent, message::DisplayMode, msg_board};
//!
//! msg_board! {
//!     pub AtomMatrix {
//!         sink: AtomMatrixSink,          // your FrameSink for the 5×5 LEDs
//!         handler: fn(DisplayEvent),     // event handler type
//!         max_capacity: 64,              // size of the fixed text buffer
//!         capacity: 32,                  // message length limit (≤ max_capacity)
//!         tick_period_ms: 100,           // tick for per-character modes
//!     }
//! }
//!
//! async fn example(spawner: embassy_executor::Spawner, sink: AtomMatrixSink) -> led_msgboard::Result<()> {
//!     let board = AtomMatrix::new(sink, |_event| {}, spawner)?;
//!     board
//!         .set_message("Hello", DisplayMode::ScrollRepeat, colors::CYAN, 600)
//!         .await?;
//!     Ok(())
//! }
//! ```

use core::convert::Infallible;

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Instant, Timer};
use heapless::Vec;
use smart_leds::RGB8;

use crate::{
    Error, Result,
    engine::{DisplayEngine, DisplayState, EventHandler, FrameSink},
    message::DisplayMode,
};

// Re-export for macro use
#[doc(hidden)]
pub use paste;

#[doc(hidden)]
// Public so macro expansions in downstream crates can share the command signal type.
pub type MsgBoardCommandSignal<const MAX_CAPACITY: usize> =
    Signal<CriticalSectionRawMutex, Command<MAX_CAPACITY>>;
#[doc(hidden)]
// Public so macro expansions in downstream crates can share the completion signal type.
pub type MsgBoardCompletionSignal = Signal<CriticalSectionRawMutex, Result<()>>;

/// Request sent from a [`MsgBoard`] handle to the device task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<const MAX_CAPACITY: usize> {
    /// Replace the message, see [`DisplayEngine::set_message`].
    SetMessage {
        /// Text, already truncated to `MAX_CAPACITY` bytes.
        text: Vec<u8, MAX_CAPACITY>,
        /// Display mode.
        mode: DisplayMode,
        /// Pixel color.
        color: RGB8,
        /// Time per character in milliseconds.
        period_ms: u32,
    },
    /// Blank the display, see [`DisplayEngine::clear`].
    Clear,
}

impl<S, E, const MAX_CAPACITY: usize> DisplayEngine<S, E, MAX_CAPACITY>
where
    S: FrameSink,
    E: EventHandler,
{
    /// Apply a [`Command`] received from a [`MsgBoard`] handle.
    ///
    /// # Errors
    ///
    /// Returns whatever [`set_message_bytes`](Self::set_message_bytes) or
    /// [`clear`](Self::clear) returns.
    pub fn apply(&mut self, command: Command<MAX_CAPACITY>) -> Result<()> {
        match command {
            Command::SetMessage {
                text,
                mode,
                color,
                period_ms,
            } => self.set_message_bytes(&text, mode, color, period_ms),
            Command::Clear => self.clear(),
        }
    }
}

/// Static resources for one [`MsgBoard`].
///
/// Most users should use the [`msg_board!`](crate::msg_board!) macro, which declares this
/// static for them.
pub struct MsgBoardStatic<const MAX_CAPACITY: usize> {
    /// Requests from the [`MsgBoard`] handle to the device task.
    pub command_signal: MsgBoardCommandSignal<MAX_CAPACITY>,
    /// The engine's answer to the most recent request.
    pub completion_signal: MsgBoardCompletionSignal,
}

impl<const MAX_CAPACITY: usize> MsgBoardStatic<MAX_CAPACITY> {
    /// Create the signals for a `static`.
    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            command_signal: Signal::new(),
            completion_signal: Signal::new(),
        }
    }
}

/// Handle for changing the message shown by a device task.
///
/// Requests from several tasks are not queued: issue one request at a time.
#[derive(Clone, Copy)]
pub struct MsgBoard<const MAX_CAPACITY: usize> {
    command_signal: &'static MsgBoardCommandSignal<MAX_CAPACITY>,
    completion_signal: &'static MsgBoardCompletionSignal,
}

impl<const MAX_CAPACITY: usize> MsgBoard<MAX_CAPACITY> {
    /// Create a handle on the given static resources. The device task must use the same ones.
    #[must_use]
    pub const fn new(msg_board_static: &'static MsgBoardStatic<MAX_CAPACITY>) -> Self {
        Self {
            command_signal: &msg_board_static.command_signal,
            completion_signal: &msg_board_static.completion_signal,
        }
    }

    /// Replace the message shown by the device task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for empty text without contacting the task, and
    /// otherwise the engine's answer (see [`DisplayEngine::set_message`]).
    pub async fn set_message(
        &self,
        text: &str,
        mode: DisplayMode,
        color: RGB8,
        period_ms: u32,
    ) -> Result<()> {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Err(Error::InvalidArgument { what: "text" });
        }
        let kept = bytes.get(..MAX_CAPACITY).unwrap_or(bytes);
        let text = Vec::from_slice(kept).map_err(|()| Error::ResourceExhausted {
            requested: kept.len(),
            max: MAX_CAPACITY,
        })?;
        self.send(Command::SetMessage {
            text,
            mode,
            color,
            period_ms,
        })
        .await
    }

    /// Blank the display and stop the current message.
    ///
    /// # Errors
    ///
    /// Returns the LED driver's error if the blank frame cannot be written.
    pub async fn clear(&self) -> Result<()> {
        self.send(Command::Clear).await
    }

    async fn send(&self, command: Command<MAX_CAPACITY>) -> Result<()> {
        self.completion_signal.reset();
        self.command_signal.signal(command);
        self.completion_signal.wait().await
    }
}

// Must be `pub` (not `pub(crate)`) because called by macro-generated code that expands at the call site in downstream crates.
#[doc(hidden)]
/// Device loop for a message board. Called by macro-generated code.
///
/// Since embassy tasks cannot be generic, the macros generate a concrete wrapper task
/// that calls this function.
pub async fn msg_board_device_loop<S, E, const MAX_CAPACITY: usize>(
    command_signal: &'static MsgBoardCommandSignal<MAX_CAPACITY>,
    completion_signal: &'static MsgBoardCompletionSignal,
    mut engine: DisplayEngine<S, E, MAX_CAPACITY>,
) -> Infallible
where
    S: FrameSink,
    E: EventHandler,
{
    info!("msg_board_device_loop: task started");
    let mut next_tick = Instant::now();
    loop {
        if !engine.is_active() {
            debug!("msg_board_device_loop: waiting for command");
            let command = command_signal.wait().await;
            if apply_command(&mut engine, command, completion_signal) {
                next_tick = Instant::now();
            }
            continue;
        }

        match select(command_signal.wait(), Timer::at(next_tick)).await {
            Either::First(command) => {
                debug!("msg_board_device_loop: applying command between ticks");
                // Only a restarted message moves the schedule; rejected commands leave it alone.
                if apply_command(&mut engine, command, completion_signal) {
                    next_tick = Instant::now();
                }
            }
            Either::Second(()) => {
                let report = engine.tick();
                trace!("msg_board_device_loop: {:?}", report);
                next_tick = next_tick
                    .checked_add(engine.tick_period())
                    .unwrap_or(Instant::MAX);
            }
        }
    }
}

/// Apply `command`, report the result to the caller, and return whether a new message
/// was armed and should be rendered from its first tick.
fn apply_command<S, E, const MAX_CAPACITY: usize>(
    engine: &mut DisplayEngine<S, E, MAX_CAPACITY>,
    command: Command<MAX_CAPACITY>,
    completion_signal: &MsgBoardCompletionSignal,
) -> bool
where
    S: FrameSink,
    E: EventHandler,
{
    let result = engine.apply(command);
    let restarted = result.is_ok() && engine.state() == DisplayState::ReadyToDisplay;
    if let Err(err) = result {
        debug!("msg_board_device_loop: command rejected: {:?}", err);
    }
    completion_signal.signal(result);
    restarted
}

#[doc(hidden)]
#[macro_export]
macro_rules! msg_board_device_task {
    (
        $vis:vis $task_name:ident,
        $sink_ty:ty,
        $handler_ty:ty,
        $max_capacity:expr $(,)?
    ) => {
        #[::embassy_executor::task]
        $vis async fn $task_name(
            command_signal: &'static $crate::msg_board::MsgBoardCommandSignal<$max_capacity>,
            completion_signal: &'static $crate::msg_board::MsgBoardCompletionSignal,
            engine: $crate::engine::DisplayEngine<$sink_ty, $handler_ty, $max_capacity>,
        ) {
            match $crate::msg_board::msg_board_device_loop(command_signal, completion_signal, engine)
                .await
            {}
        }
    };
}

#[doc(hidden)]
pub use msg_board_device_task;

/// Macro to generate a message board type whose `new` spawns the device task.
///
/// All fields are required:
///
/// - `sink`: concrete [`FrameSink`] type (the LED driver)
/// - `handler`: concrete [`EventHandler`] type, for example `fn(DisplayEvent)` or
///   [`NoEvents`](crate::engine::NoEvents)
/// - `max_capacity`: size of the fixed text buffer
/// - `capacity`: message length limit passed to
///   [`DisplayEngine::initialize`] (at most `max_capacity`)
/// - `tick_period_ms`: tick period for per-character modes
///
/// The generated `new(sink, handler, spawner)` returns a [`MsgBoard`] handle. It can succeed
/// only once per type because the task and its signals are singletons.
///
/// See the [module docs](mod@crate::msg_board) for an example.
#[macro_export]
macro_rules! msg_board {
    (
        $vis:vis $name:ident {
            sink: $sink_ty:ty,
            handler: $handler_ty:ty,
            max_capacity: $max_capacity:expr,
            capacity: $capacity:expr,
            tick_period_ms: $tick_period_ms:expr $(,)?
        }
    ) => {
        $crate::msg_board::paste::paste! {
            $crate::msg_board::msg_board_device_task!(
                [<$name:snake _device_task>],
                $sink_ty,
                $handler_ty,
                $max_capacity
            );

            #[doc = concat!("Message board `", stringify!($name), "` generated by `msg_board!`.")]
            $vis struct $name;

            impl $name {
                /// Maximum message length in bytes.
                pub const CAPACITY: usize = $capacity;

                /// Initialize the engine, spawn its device task, and return the handle.
                $vis fn new(
                    sink: $sink_ty,
                    handler: $handler_ty,
                    spawner: ::embassy_executor::Spawner,
                ) -> $crate::Result<$crate::msg_board::MsgBoard<$max_capacity>> {
                    static MSG_BOARD_STATIC: $crate::msg_board::MsgBoardStatic<$max_capacity> =
                        $crate::msg_board::MsgBoardStatic::new_static();

                    let config = $crate::engine::EngineConfig::new()
                        .with_tick_period_ms($tick_period_ms);
                    let mut engine = $crate::engine::DisplayEngine::new(sink, config);
                    engine.initialize(Self::CAPACITY, handler)?;

                    let token = [<$name:snake _device_task>](
                        &MSG_BOARD_STATIC.command_signal,
                        &MSG_BOARD_STATIC.completion_signal,
                        engine,
                    );
                    spawner
                        .spawn(token)
                        .map_err(|_| $crate::Error::TaskSpawn)?;
                    Ok($crate::msg_board::MsgBoard::new(&MSG_BOARD_STATIC))
                }
            }
        }
    };
}

#[doc(inline)]
pub use msg_board;
