#![allow(missing_docs)]
use led_msgboard::{
    Error, MATRIX_WIDTH, Result, colors,
    compositor::Compositor,
    engine::{
        DisplayEngine, DisplayEvent, DisplayState, EngineConfig, EventHandler, FrameSink,
        RenderCursor, TickReport, render_interval_ms,
    },
    font::decode,
    frame::MatrixFrame,
    message::DisplayMode,
};

/// Keeps every frame; fails the next write when `fail_next` is set.
#[derive(Default)]
struct Recorder {
    frames: Vec<MatrixFrame>,
    fail_next: bool,
}

impl FrameSink for Recorder {
    fn write_frame(&mut self, frame: &MatrixFrame) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(Error::Sink);
        }
        self.frames.push(*frame);
        Ok(())
    }
}

#[derive(Default)]
struct EventLog(Vec<DisplayEvent>);

impl EventHandler for EventLog {
    fn on_event(&mut self, event: DisplayEvent) {
        self.0.push(event);
    }
}

type TestEngine = DisplayEngine<Recorder, EventLog, 32>;

fn engine_with(config: EngineConfig, capacity: usize) -> Result<TestEngine> {
    let mut engine = TestEngine::new(Recorder::default(), config);
    engine.initialize(capacity, EventLog::default())?;
    Ok(engine)
}

fn engine() -> Result<TestEngine> {
    engine_with(EngineConfig::new(), 32)
}

fn events(engine: &TestEngine) -> &[DisplayEvent] {
    engine
        .handler()
        .map(|log| log.0.as_slice())
        .unwrap_or_default()
}

fn frames(engine: &TestEngine) -> &[MatrixFrame] {
    &engine.sink().frames
}

fn rendered(code: u8) -> TickReport {
    TickReport::Rendered {
        code,
        blank_substituted: false,
    }
}

#[test]
fn normal_once_hi_scenario() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("HI", DisplayMode::NormalOnce, colors::RED, 1000)?;
    assert_eq!(engine.state(), DisplayState::ReadyToDisplay);

    let reports: Vec<TickReport> = (0..21).map(|_| engine.tick()).collect();

    assert_eq!(reports[0], rendered(b'H'));
    assert!(reports[1..10].iter().all(|report| *report == TickReport::Hold));
    assert_eq!(reports[10], rendered(b'I'));
    assert!(reports[11..20].iter().all(|report| *report == TickReport::Hold));
    assert_eq!(reports[20], rendered(b' '));
    assert_eq!(engine.state(), DisplayState::Ended);
    assert_eq!(events(&engine), [DisplayEvent::EndOfMessage]);
    assert_eq!(
        frames(&engine)[0],
        Compositor::render_character(&decode(b'H')?, colors::RED)
    );
    assert!(frames(&engine)[2].is_blank());
    Ok(())
}

#[test]
fn nothing_renders_after_end_until_new_message() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("A", DisplayMode::NormalOnce, colors::RED, 100)?;
    while engine.state() != DisplayState::Ended {
        let _ = engine.tick();
    }
    let frame_count = frames(&engine).len();

    for _ in 0..10 {
        assert_eq!(engine.tick(), TickReport::Inactive);
    }
    assert_eq!(frames(&engine).len(), frame_count);
    assert!(!engine.is_active());

    engine.set_message("B", DisplayMode::NormalOnce, colors::RED, 100)?;
    assert_eq!(engine.tick(), rendered(b'B'));
    Ok(())
}

#[test]
fn normal_repeat_cycles_with_one_event_per_cycle() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("AB", DisplayMode::NormalRepeat, colors::BLUE, 100)?;

    let codes: Vec<Option<u8>> = (0..9)
        .map(|_| match engine.tick() {
            TickReport::Rendered { code, .. } => Some(code),
            _ => None,
        })
        .collect();

    let cycle = [Some(b'A'), Some(b'B'), Some(b' ')];
    assert_eq!(codes, [cycle, cycle, cycle].concat());
    assert_eq!(events(&engine), [DisplayEvent::EndOfContent; 3]);
    assert_eq!(engine.state(), DisplayState::Running);
    Ok(())
}

#[test]
fn scroll_once_takes_width_plus_gap_steps_per_character() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("AB", DisplayMode::ScrollOnce, colors::GREEN, 600)?;

    let mut steps = 0;
    while engine.state() != DisplayState::Ended {
        assert!(matches!(engine.tick(), TickReport::Rendered { .. }));
        steps += 1;
        assert!(steps <= 100, "scroll never ended");
    }

    assert_eq!(steps, 2 * (MATRIX_WIDTH + 1));
    assert_eq!(frames(&engine).len(), steps);
    assert_eq!(events(&engine), [DisplayEvent::EndOfMessage]);
    Ok(())
}

#[test]
fn scroll_once_single_character_scenario() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("A", DisplayMode::ScrollOnce, colors::GREEN, 600)?;
    assert_eq!(engine.tick_period_ms(), 100);

    for _ in 0..5 {
        let _ = engine.tick();
    }
    // Fully scrolled in, it reads out like the static glyph.
    assert_eq!(
        frames(&engine)[4],
        Compositor::render_character(&decode(b'A')?, colors::GREEN)
    );
    assert_eq!(engine.state(), DisplayState::Running);

    let _ = engine.tick();

    assert_eq!(engine.state(), DisplayState::Ended);
    assert_eq!(frames(&engine).len(), 6);
    assert_eq!(engine.tick(), TickReport::Inactive);
    Ok(())
}

#[test]
fn scroll_repeat_scrolls_a_blank_separator_between_cycles() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("A", DisplayMode::ScrollRepeat, colors::GREEN, 600)?;

    for _ in 0..(2 * (MATRIX_WIDTH + 1)) {
        let _ = engine.tick();
    }
    assert_eq!(events(&engine), [DisplayEvent::EndOfContent]);
    assert_eq!(engine.cursor().index, 0);

    for _ in 0..(2 * (MATRIX_WIDTH + 1)) {
        let _ = engine.tick();
    }
    assert_eq!(events(&engine), [DisplayEvent::EndOfContent; 2]);
    assert_eq!(engine.state(), DisplayState::Running);
    Ok(())
}

#[test]
fn undecodable_character_renders_blank_and_continues() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message_bytes(&[b'H', 0xC3, b'I'], DisplayMode::NormalOnce, colors::RED, 100)?;

    let first = engine.tick();
    let second = engine.tick();
    let third = engine.tick();

    assert_eq!(first, rendered(b'H'));
    assert_eq!(
        second,
        TickReport::Rendered {
            code: 0xC3,
            blank_substituted: true
        }
    );
    assert_eq!(third, rendered(b'I'));
    assert!(frames(&engine)[1].is_blank());
    Ok(())
}

#[test]
fn sink_failure_stops_rendering_until_next_message() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("HI", DisplayMode::NormalRepeat, colors::RED, 100)?;
    engine.sink_mut().fail_next = true;

    assert_eq!(engine.tick(), TickReport::Failed);
    assert_eq!(engine.state(), DisplayState::Failed);
    assert_eq!(engine.tick(), TickReport::Inactive);
    assert!(frames(&engine).is_empty());

    engine.set_message("HI", DisplayMode::NormalRepeat, colors::RED, 100)?;

    assert_eq!(engine.tick(), rendered(b'H'));
    assert_eq!(engine.state(), DisplayState::Running);
    Ok(())
}

#[test]
fn empty_text_leaves_current_message_untouched() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("AB", DisplayMode::NormalRepeat, colors::RED, 100)?;
    let _ = engine.tick();
    let cursor = engine.cursor();

    let result = engine.set_message("", DisplayMode::NormalOnce, colors::BLUE, 100);

    assert_eq!(result, Err(Error::InvalidArgument { what: "text" }));
    assert_eq!(engine.state(), DisplayState::Running);
    assert_eq!(engine.cursor(), cursor);
    assert_eq!(engine.message().map(|message| message.text()), Some(&b"AB"[..]));
    Ok(())
}

#[test]
fn overlong_text_is_truncated_to_initialized_capacity() -> Result<()> {
    let mut engine = engine_with(EngineConfig::new(), 4)?;

    engine.set_message("HELLO", DisplayMode::NormalOnce, colors::RED, 100)?;

    assert_eq!(engine.capacity(), 4);
    assert_eq!(engine.message().map(|message| message.text()), Some(&b"HELL"[..]));
    Ok(())
}

#[test]
fn new_message_restarts_from_first_character() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("ABC", DisplayMode::ScrollRepeat, colors::RED, 600)?;
    for _ in 0..8 {
        let _ = engine.tick();
    }
    assert_ne!(engine.cursor(), RenderCursor::default());

    engine.set_message("XY", DisplayMode::NormalOnce, colors::RED, 300)?;

    assert_eq!(engine.cursor(), RenderCursor::default());
    assert!(engine.compositor().is_blank());
    assert_eq!(engine.tick_period_ms(), 100);
    assert_eq!(engine.tick(), rendered(b'X'));
    Ok(())
}

#[test]
fn initialize_validates_and_runs_once() -> Result<()> {
    let mut engine = engine()?;
    assert_eq!(
        engine.initialize(8, EventLog::default()),
        Err(Error::AlreadyInitialized)
    );

    let mut oversized = TestEngine::new(Recorder::default(), EngineConfig::new());
    assert_eq!(
        oversized.initialize(33, EventLog::default()),
        Err(Error::ResourceExhausted {
            requested: 33,
            max: 32
        })
    );
    assert_eq!(
        oversized.initialize(0, EventLog::default()),
        Err(Error::InvalidParameter { what: "capacity" })
    );
    assert_eq!(oversized.state(), DisplayState::Created);

    let mut no_tick = TestEngine::new(
        Recorder::default(),
        EngineConfig::new().with_tick_period_ms(0),
    );
    assert_eq!(
        no_tick.initialize(8, EventLog::default()),
        Err(Error::InvalidParameter {
            what: "tick period"
        })
    );
    Ok(())
}

#[test]
fn set_message_before_initialize_is_invalid_state() {
    let mut engine = TestEngine::new(Recorder::default(), EngineConfig::new());

    let result = engine.set_message("A", DisplayMode::NormalOnce, colors::RED, 100);

    assert_eq!(result, Err(Error::InvalidState));
    assert_eq!(engine.tick(), TickReport::Inactive);
}

#[test]
fn announce_sends_test_event_at_initialize() -> Result<()> {
    let engine = engine_with(EngineConfig::new().with_announce(true), 8)?;

    assert_eq!(events(&engine), [DisplayEvent::TestEvent]);
    assert_eq!(engine.state(), DisplayState::Initialized);
    Ok(())
}

#[test]
fn idle_mode_is_accepted_but_renders_nothing() -> Result<()> {
    let mut engine = engine()?;

    engine.set_message("X", DisplayMode::Idle, colors::RED, 100)?;

    assert_eq!(engine.state(), DisplayState::ReadyToDisplay);
    assert!(!engine.is_active());
    assert_eq!(engine.tick(), TickReport::Inactive);
    assert!(frames(&engine).is_empty());
    Ok(())
}

#[test]
fn clear_blanks_display_and_ends_message_silently() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("HI", DisplayMode::NormalRepeat, colors::RED, 100)?;
    let _ = engine.tick();

    engine.clear()?;

    assert_eq!(engine.state(), DisplayState::Ended);
    assert!(frames(&engine).last().is_some_and(MatrixFrame::is_blank));
    assert!(events(&engine).is_empty());
    assert_eq!(engine.tick(), TickReport::Inactive);
    Ok(())
}

#[test]
fn configured_tick_period_drives_per_character_modes() -> Result<()> {
    let mut engine = engine_with(EngineConfig::new().with_tick_period_ms(50), 8)?;
    engine.set_message("AB", DisplayMode::NormalOnce, colors::RED, 200)?;

    let reports: Vec<TickReport> = (0..5).map(|_| engine.tick()).collect();

    assert_eq!(engine.tick_period_ms(), 50);
    assert_eq!(reports[0], rendered(b'A'));
    assert_eq!(reports[1..4], [TickReport::Hold; 3]);
    assert_eq!(reports[4], rendered(b'B'));
    Ok(())
}

#[test]
fn per_character_period_rounds_up_to_whole_ticks() -> Result<()> {
    let mut engine = engine()?;
    engine.set_message("ABC", DisplayMode::NormalRepeat, colors::RED, 250)?;

    let rendered_at: Vec<usize> = (0..7)
        .filter(|_| matches!(engine.tick(), TickReport::Rendered { .. }))
        .collect();

    assert_eq!(rendered_at, [0, 3, 6]);
    assert_eq!(render_interval_ms(DisplayMode::NormalRepeat, 250, 100), 300);
    assert_eq!(render_interval_ms(DisplayMode::NormalOnce, 50, 100), 100);
    assert_eq!(render_interval_ms(DisplayMode::NormalOnce, 400, 100), 400);
    assert_eq!(render_interval_ms(DisplayMode::ScrollOnce, 600, 100), 100);
    Ok(())
}
