//! The display engine: message store, render cursor, and the tick-driven state machine.
//!
//! A [`DisplayEngine`] is created with a [`FrameSink`] (the LED driver), initialized once with
//! a text capacity and an [`EventHandler`], and then given messages with
//! [`DisplayEngine::set_message`]. Something periodic (an embassy task, see
//! [`msg_board`](crate::msg_board), or a plain thread) calls [`DisplayEngine::tick`] every
//! [`DisplayEngine::tick_period`].
//!
//! # Example: a one-shot message
//!
//! ```rust
//! use led_msgboard::{
//!     Result, colors,
//!     engine::{DisplayEngine, DisplayEvent, DisplayState, EngineConfig},
//!     frame::MatrixFrame,
//!     message::DisplayMode,
//! };
//!
//! # fn main() -> Result<()> {
//! let mut frames = 0;
//! let sink = |_frame: &MatrixFrame| -> Result<()> {
//!     frames += 1;
//!     Ok(())
//! };
//! let mut engine: DisplayEngine<_, _, 16> = DisplayEngine::new(sink, EngineConfig::new());
//! engine.initialize(16, |event: DisplayEvent| assert_eq!(event, DisplayEvent::EndOfMessage))?;
//!
//! // Show "Go" in red, one character per 200 ms.
//! engine.set_message("Go", DisplayMode::NormalOnce, colors::RED, 200)?;
//! while engine.state() != DisplayState::Ended {
//!     let _ = engine.tick();
//! }
//! # drop(engine);
//! // 'G', 'o', then a blank frame as the message ends.
//! assert_eq!(frames, 3);
//! # Ok(())
//! # }
//! ```
//!
//! # Timing
//!
//! Per-character modes tick every [`EngineConfig::tick_period_ms`] (100 ms by default) and show
//! a new character whenever the elapsed-time counter wraps at the message period. Scroll modes
//! tick every `period_ms / (MATRIX_WIDTH + 1)` and move one column per tick, so one character
//! takes about `period_ms`.
//!
//! # End of message
//!
//! After the last character, per-character modes show one blank character (the cursor steps
//! one past the end) before a one-shot message ends or a repeating message starts over.
//! Scroll modes end a one-shot message as soon as the last character has fully scrolled in,
//! so a message of N characters takes exactly `N * (MATRIX_WIDTH + 1)` scroll steps.

use embassy_time::Duration;
use smart_leds::RGB8;

use crate::{
    Error, MATRIX_WIDTH, Result,
    compositor::Compositor,
    font::{self, Glyph},
    frame::MatrixFrame,
    message::{DisplayMode, Message, check_capacity, scroll_tick_period_ms},
};

/// Driver period used by per-character modes unless configured otherwise.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 100;

/// Time between two frames the engine renders for a message.
///
/// Scroll modes render on every scroll step. Per-character modes render once per
/// `period_ms` rounded up to a whole number of `tick_period_ms` ticks.
#[must_use]
pub const fn render_interval_ms(mode: DisplayMode, period_ms: u32, tick_period_ms: u32) -> u32 {
    if mode.is_scroll() {
        return scroll_tick_period_ms(period_ms);
    }
    match period_ms.checked_next_multiple_of(tick_period_ms) {
        Some(interval_ms) => interval_ms,
        None => u32::MAX,
    }
}

const BLANK_CODE: u8 = b' ';

/// Receives every frame the engine renders (the LED driver).
///
/// Implemented for any `FnMut(&MatrixFrame) -> Result<()>`.
pub trait FrameSink {
    /// Push one frame to the display.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the hardware rejects the frame. The engine then
    /// enters [`DisplayState::Failed`].
    fn write_frame(&mut self, frame: &MatrixFrame) -> Result<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(&MatrixFrame) -> Result<()>,
{
    fn write_frame(&mut self, frame: &MatrixFrame) -> Result<()> {
        self(frame)
    }
}

/// Notifications sent to the [`EventHandler`] from inside [`DisplayEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayEvent {
    /// A one-shot message has been shown completely; the engine is now [`DisplayState::Ended`].
    EndOfMessage,
    /// A repeating message reached its end and starts over.
    EndOfContent,
    /// Sent once by [`DisplayEngine::initialize`] when [`EngineConfig::announce`] is set.
    TestEvent,
}

/// Receives [`DisplayEvent`]s. Called synchronously from the tick, so it must not block.
///
/// Implemented for any `FnMut(DisplayEvent)`; use [`NoEvents`] to ignore events.
pub trait EventHandler {
    /// Handle one event.
    fn on_event(&mut self, event: DisplayEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(DisplayEvent),
{
    fn on_event(&mut self, event: DisplayEvent) {
        self(event);
    }
}

/// An [`EventHandler`] that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvents;

impl EventHandler for NoEvents {
    fn on_event(&mut self, _event: DisplayEvent) {}
}

/// Engine lifecycle.
///
/// `Created → Initialized → ReadyToDisplay → Running → Ended`. A new message re-arms
/// `Running`, `Ended`, or `Failed` back to `ReadyToDisplay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    /// Constructed, not yet initialized.
    #[default]
    Created,
    /// Initialized, no message yet.
    Initialized,
    /// A message is set; nothing rendered yet.
    ReadyToDisplay,
    /// At least one frame of the current message has been rendered.
    Running,
    /// A one-shot message finished (or was cleared).
    Ended,
    /// The frame sink failed; ticks do nothing until the next message.
    Failed,
}

/// Where the engine is within the current message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderCursor {
    /// Character index, `0..=len + 1`. `len` itself renders as a blank.
    pub index: usize,
    /// Milliseconds spent on the current character, wrapped at the message period.
    pub elapsed_ms: u32,
    /// Scroll column within the current character, `0..=MATRIX_WIDTH`.
    pub column: usize,
}

/// Engine settings fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Tick period for per-character modes and `Idle`, in milliseconds.
    pub tick_period_ms: u32,
    /// Send [`DisplayEvent::TestEvent`] to the handler during initialization.
    pub announce: bool,
}

impl EngineConfig {
    /// Default settings: 100 ms tick, no test event.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            announce: false,
        }
    }

    /// Use a different per-character tick period.
    #[must_use]
    pub const fn with_tick_period_ms(self, tick_period_ms: u32) -> Self {
        Self {
            tick_period_ms,
            ..self
        }
    }

    /// Send a [`DisplayEvent::TestEvent`] during initialization.
    #[must_use]
    pub const fn with_announce(self, announce: bool) -> Self {
        Self { announce, ..self }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What one [`DisplayEngine::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum TickReport {
    /// No message is being shown.
    Inactive,
    /// Per-character mode between character boundaries; nothing rendered.
    Hold,
    /// A frame was rendered and written to the sink.
    Rendered {
        /// Character code the frame was rendered from.
        code: u8,
        /// The code had no glyph and a blank was rendered instead.
        blank_substituted: bool,
    },
    /// The sink rejected the frame; the engine is now [`DisplayState::Failed`].
    Failed,
}

/// Message display engine for a `MATRIX_WIDTH × MATRIX_HEIGHT` LED matrix.
///
/// `S` is the frame sink, `E` the event handler, and `MAX_CAPACITY` the size of the fixed
/// text buffer. See the [module docs](self) for an example.
pub struct DisplayEngine<S, E, const MAX_CAPACITY: usize> {
    sink: S,
    handler: Option<E>,
    config: EngineConfig,
    capacity: usize,
    message: Option<Message<MAX_CAPACITY>>,
    cursor: RenderCursor,
    compositor: Compositor,
    state: DisplayState,
    tick_period_ms: u32,
}

impl<S, E, const MAX_CAPACITY: usize> DisplayEngine<S, E, MAX_CAPACITY>
where
    S: FrameSink,
    E: EventHandler,
{
    /// Create an engine writing to `sink`. Call [`initialize`](Self::initialize) before use.
    #[must_use]
    pub const fn new(sink: S, config: EngineConfig) -> Self {
        Self {
            sink,
            handler: None,
            config,
            capacity: 0,
            message: None,
            cursor: RenderCursor {
                index: 0,
                elapsed_ms: 0,
                column: 0,
            },
            compositor: Compositor::new(),
            state: DisplayState::Created,
            tick_period_ms: config.tick_period_ms,
        }
    }

    /// Fix the message capacity (in bytes) and install the event handler.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInitialized`] on a second call.
    /// - [`Error::InvalidParameter`] if `capacity` is zero or the configured tick period is zero.
    /// - [`Error::ResourceExhausted`] if `capacity` exceeds `MAX_CAPACITY`.
    pub fn initialize(&mut self, capacity: usize, handler: E) -> Result<()> {
        info!("DisplayEngine::initialize: capacity {}", capacity);
        if self.state != DisplayState::Created {
            warn!("DisplayEngine::initialize: already initialized");
            return Err(Error::AlreadyInitialized);
        }
        check_capacity::<MAX_CAPACITY>(capacity)?;
        if self.config.tick_period_ms == 0 {
            return Err(Error::InvalidParameter {
                what: "tick period",
            });
        }

        self.capacity = capacity;
        self.state = DisplayState::Initialized;
        let handler = self.handler.insert(handler);
        if self.config.announce {
            debug!("DisplayEngine::initialize: sending test event");
            handler.on_event(DisplayEvent::TestEvent);
        }
        Ok(())
    }

    /// Replace the current message and restart rendering from its first character.
    ///
    /// Text longer than the capacity is truncated. On error nothing changes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] before [`initialize`](Self::initialize).
    /// - [`Error::InvalidArgument`] if `text` is empty.
    /// - [`Error::InvalidParameter`] for a zero period, or a scroll period shorter than
    ///   `MATRIX_WIDTH + 1` ms.
    pub fn set_message(
        &mut self,
        text: &str,
        mode: DisplayMode,
        color: RGB8,
        period_ms: u32,
    ) -> Result<()> {
        self.set_message_bytes(text.as_bytes(), mode, color, period_ms)
    }

    /// Like [`set_message`](Self::set_message), for raw character codes.
    ///
    /// # Errors
    ///
    /// See [`set_message`](Self::set_message).
    pub fn set_message_bytes(
        &mut self,
        text: &[u8],
        mode: DisplayMode,
        color: RGB8,
        period_ms: u32,
    ) -> Result<()> {
        if self.state == DisplayState::Created {
            return Err(Error::InvalidState);
        }
        let message = Message::new(text, mode, color, period_ms, self.capacity)?;

        self.tick_period_ms = if mode.is_scroll() {
            scroll_tick_period_ms(period_ms)
        } else {
            self.config.tick_period_ms
        };
        info!(
            "DisplayEngine::set_message: {} bytes, mode {:?}, tick period {} ms",
            message.len(),
            mode,
            self.tick_period_ms
        );
        self.message = Some(message);
        self.cursor = RenderCursor::default();
        self.compositor.reset();
        self.state = DisplayState::ReadyToDisplay;
        Ok(())
    }

    /// Blank the display and stop the current message without sending an event.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the blank frame cannot be written.
    pub fn clear(&mut self) -> Result<()> {
        debug!("DisplayEngine::clear");
        self.compositor.reset();
        self.sink.write_frame(&MatrixFrame::new())?;
        if matches!(
            self.state,
            DisplayState::ReadyToDisplay | DisplayState::Running
        ) {
            self.state = DisplayState::Ended;
        }
        Ok(())
    }

    /// Advance the message by one tick, rendering at most one frame.
    pub fn tick(&mut self) -> TickReport {
        if !matches!(
            self.state,
            DisplayState::ReadyToDisplay | DisplayState::Running
        ) {
            return TickReport::Inactive;
        }
        let Some((mode, color, period_ms)) = self
            .message
            .as_ref()
            .map(|message| (message.mode(), message.color(), message.period_ms()))
        else {
            return TickReport::Inactive;
        };

        let report = if mode.is_scroll() {
            self.scroll_tick(mode, color)
        } else if !mode.is_per_character() {
            TickReport::Inactive
        } else if self.cursor.elapsed_ms == 0 {
            self.character_tick(mode, color)
        } else {
            TickReport::Hold
        };

        self.cursor.elapsed_ms = self.cursor.elapsed_ms.saturating_add(self.tick_period_ms);
        if self.cursor.elapsed_ms >= period_ms {
            self.cursor.elapsed_ms = 0;
        }
        report
    }

    fn character_tick(&mut self, mode: DisplayMode, color: RGB8) -> TickReport {
        let (code, glyph, blank_substituted) = self.glyph_at_cursor();
        let frame = Compositor::render_character(&glyph, color);
        if !self.emit(&frame) {
            return TickReport::Failed;
        }
        self.state = DisplayState::Running;
        self.cursor.index = self.cursor.index.saturating_add(1);
        if self.cursor.index > self.message_len() {
            self.finish_pass(mode);
        }
        TickReport::Rendered {
            code,
            blank_substituted,
        }
    }

    fn scroll_tick(&mut self, mode: DisplayMode, color: RGB8) -> TickReport {
        let (code, glyph, blank_substituted) = self.glyph_at_cursor();
        let frame = self
            .compositor
            .scroll_step(&glyph, self.cursor.column, color);
        if !self.emit(&frame) {
            return TickReport::Failed;
        }
        self.state = DisplayState::Running;
        self.cursor.column = self.cursor.column.saturating_add(1);
        if self.cursor.column > MATRIX_WIDTH {
            self.cursor.column = 0;
            self.cursor.index = self.cursor.index.saturating_add(1);
        }

        let len = self.message_len();
        let pass_done = if mode.is_repeat() {
            self.cursor.index > len
        } else {
            self.cursor.index >= len
        };
        if pass_done {
            self.finish_pass(mode);
        }
        TickReport::Rendered {
            code,
            blank_substituted,
        }
    }

    /// End a one-shot message or rewind a repeating one.
    fn finish_pass(&mut self, mode: DisplayMode) {
        if mode.is_repeat() {
            debug!("DisplayEngine::tick: end of content, starting over");
            self.cursor.index = 0;
            self.notify(DisplayEvent::EndOfContent);
        } else {
            info!("DisplayEngine::tick: end of message");
            self.state = DisplayState::Ended;
            self.notify(DisplayEvent::EndOfMessage);
        }
    }

    /// Glyph for the character under the cursor: a space past the end, a blank if undecodable.
    fn glyph_at_cursor(&self) -> (u8, Glyph, bool) {
        let code = self
            .message
            .as_ref()
            .and_then(|message| message.code_at(self.cursor.index))
            .unwrap_or(BLANK_CODE);
        match font::decode(code) {
            Ok(glyph) => (code, glyph, false),
            Err(err) => {
                warn!(
                    "DisplayEngine::tick: {:?} at index {}, rendering blank",
                    err,
                    self.cursor.index
                );
                (code, Glyph::BLANK, true)
            }
        }
    }

    fn emit(&mut self, frame: &MatrixFrame) -> bool {
        trace!("DisplayEngine::tick: writing frame, {} lit", frame.lit_count());
        match self.sink.write_frame(frame) {
            Ok(()) => true,
            Err(err) => {
                error!("DisplayEngine::tick: frame sink failed: {:?}", err);
                self.state = DisplayState::Failed;
                false
            }
        }
    }

    fn notify(&mut self, event: DisplayEvent) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_event(event);
        }
    }

    fn message_len(&self) -> usize {
        self.message.as_ref().map_or(0, Message::len)
    }

    /// Whether ticks currently render anything. The device task sleeps while this is false.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            DisplayState::ReadyToDisplay | DisplayState::Running
        ) && self
            .message
            .as_ref()
            .is_some_and(|message| message.mode() != DisplayMode::Idle)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DisplayState {
        self.state
    }

    /// Current render cursor.
    #[must_use]
    pub const fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    /// The current message, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&Message<MAX_CAPACITY>> {
        self.message.as_ref()
    }

    /// Capacity fixed at initialization (0 before).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// How often [`tick`](Self::tick) should be called for the current message, in ms.
    #[must_use]
    pub const fn tick_period_ms(&self) -> u32 {
        self.tick_period_ms
    }

    /// How often [`tick`](Self::tick) should be called for the current message.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_period_ms))
    }

    /// The scroll matrix compositor.
    #[must_use]
    pub const fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The frame sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The frame sink, mutably.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The event handler, once initialized.
    #[must_use]
    pub const fn handler(&self) -> Option<&E> {
        self.handler.as_ref()
    }
}
