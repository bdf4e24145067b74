#![allow(missing_docs)]
#![cfg(feature = "host-executor")]
//! Console message board: renders every frame of the 5×5 matrix as text on stdout.
//!
//! Run with `cargo run --bin demo_console_msgboard --features host-executor`.

use std::io::Write as _;

use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};
use led_msgboard::{
    Error, Result, colors,
    engine::{DisplayEvent, FrameSink},
    frame::MatrixFrame,
    message::DisplayMode,
    msg_board,
};

/// Prints frames as rows of `#` (lit) and `.` (off).
struct ConsoleSink;

impl FrameSink for ConsoleSink {
    fn write_frame(&mut self, frame: &MatrixFrame) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        for row in frame.iter() {
            let line: String = row
                .iter()
                .map(|pixel| if *pixel == colors::BLACK { '.' } else { '#' })
                .collect();
            writeln!(stdout, "{line}").map_err(|_| Error::Sink)?;
        }
        writeln!(stdout).map_err(|_| Error::Sink)
    }
}

static EVENTS: Signal<CriticalSectionRawMutex, DisplayEvent> = Signal::new();

fn on_event(event: DisplayEvent) {
    log::info!("display event: {event:?}");
    EVENTS.signal(event);
}

msg_board! {
    ConsoleBoard {
        sink: ConsoleSink,
        handler: fn(DisplayEvent),
        max_capacity: 64,
        capacity: 32,
        tick_period_ms: 100,
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    if let Err(err) = inner_main(spawner).await {
        panic!("{err}");
    }
}

async fn inner_main(spawner: Spawner) -> Result<()> {
    let board = ConsoleBoard::new(ConsoleSink, on_event, spawner)?;

    board
        .set_message("Rust", DisplayMode::ScrollOnce, colors::CYAN, 600)
        .await?;
    while EVENTS.wait().await != DisplayEvent::EndOfMessage {}

    board
        .set_message("Hi!", DisplayMode::NormalRepeat, colors::ORANGE, 500)
        .await?;
    for _ in 0..2 {
        while EVENTS.wait().await != DisplayEvent::EndOfContent {}
    }

    // Rejected without disturbing the running message.
    let rejected = board
        .set_message("", DisplayMode::NormalOnce, colors::RED, 500)
        .await;
    log::info!("empty message: {rejected:?}");

    Timer::after(Duration::from_millis(700)).await;
    board.clear().await
}
