#![forbid(unsafe_code)]

//! Headless Spotlight walkthrough.
//!
//! Runs the five-step sample tour on an in-memory host with virtual time,
//! prints one ASCII frame per step, and taps through to the end.
//!
//! Logging goes to stderr; set `RUST_LOG` to override the default
//! `info,spotlight=debug` filter.

mod app;

use std::rc::Rc;
use std::time::Duration;

use spotlight::{ShapeAnimationKind, Spotlight, SpotlightState};
use spotlight_core::Size;
use spotlight_core::animation::FRAME_INTERVAL;
use spotlight_core::scheduler::Scheduler;
use spotlight_harness::{AsciiCanvas, FakeSurface, RecordingListener, TestHost};
use tracing_subscriber::EnvFilter;

use crate::app::{SCREEN, SampleApp};

const GRID_COLS: usize = 54;
const GRID_ROWS: usize = 48;
/// How long each step stays up before the demo taps.
const DWELL: Duration = Duration::from_millis(900);
/// Safety stop in case a step never resolves.
const MAX_RUN: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spotlight=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> spotlight::Result<()> {
    init_tracing();

    let host = TestHost::with_surface(FakeSurface::new(SCREEN));
    let mut app = SampleApp::new();
    let events = RecordingListener::new();

    let tour = Spotlight::builder(host.host())
        .steps(app.steps())
        .highlight_padding(12.0)
        .shape_animation(ShapeAnimationKind::Pulse)
        .listener(Rc::clone(&events))
        .build()?;
    tour.start();

    let mut shown_at: Option<(usize, Duration)> = None;
    while tour.state() != SpotlightState::Finished && host.scheduler.now() < MAX_RUN {
        host.advance(FRAME_INTERVAL);
        app.pump(&host.scheduler);

        let now = host.scheduler.now();
        let index = match (tour.is_interactive(), tour.current_index()) {
            (true, Some(index)) => index,
            _ => continue,
        };
        match shown_at {
            Some((shown, since)) if shown == index => {
                if now.saturating_sub(since) >= DWELL {
                    print_frame(&host, index);
                    tour.tap();
                    shown_at = None;
                }
            }
            _ => shown_at = Some((index, now)),
        }
    }

    tracing::info!(
        message = "demo.done",
        state = ?tour.state(),
        steps_shown = events.shown_titles().len(),
        elapsed_ms = host.scheduler.now().as_millis() as u64
    );
    Ok(())
}

fn print_frame(host: &TestHost, index: usize) {
    tracing::debug!(message = "demo.frame", index);
    let mut canvas = AsciiCanvas::new(GRID_COLS, GRID_ROWS, Size::new(SCREEN.width, SCREEN.height));
    host.surface.render(&mut canvas);
    if let Some(overlay) = host.surface.current() {
        let card = overlay.card();
        if let Some(bounds) = overlay.card_bounds(spotlight_harness::fake::DEFAULT_CARD_SIZE) {
            canvas.draw_card(bounds, &card.title);
        }
        println!("[{}] {}: {}", card.progress(), card.title, card.description);
    }
    println!("{}", canvas.to_text());
    println!("{}\n", canvas.checksum());
}
