#![forbid(unsafe_code)]

//! Test harness for Spotlight tours.
//!
//! # Role in the workspace
//! Provides an in-memory host so tours can run deterministically without a
//! UI toolkit:
//!
//! - [`fake`]: elements, recycled lists, tab strips, and a surface that
//!   records every attach/detach.
//! - [`recording`]: a canvas that records draw calls and a listener that
//!   records tour events.
//! - [`ascii`]: a character-grid canvas for eyeballing frames and comparing
//!   them by checksum.
//!
//! Time is driven by [`ManualScheduler`]; nothing here sleeps.

pub mod ascii;
pub mod fake;
pub mod recording;

pub use ascii::AsciiCanvas;
pub use fake::{FakeElement, FakeList, FakeSurface, FakeTabStrip, SurfaceEvent, TestHost};
pub use recording::{DrawOp, ListenerEvent, RecordingCanvas, RecordingListener};

pub use spotlight_core::scheduler::ManualScheduler;
