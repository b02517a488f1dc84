#![forbid(unsafe_code)]

//! Core: geometry, colors, easing, and the scheduling port.
//!
//! # Role in Spotlight
//! `spotlight-core` holds everything the tour engine needs that does not know
//! about tours: window-space rectangles, packed colors, keyframe tracks and
//! easing curves, and the [`Scheduler`](scheduler::Scheduler) port through
//! which every timer and animation frame is requested from the host.
//!
//! # Primary responsibilities
//! - **Geometry**: `Rect`, `Point`, `Size` in f32 window space.
//! - **Color**: `Rgba` packed colors with hex parsing.
//! - **Animation**: easing functions, `Keyframes`, `Track`, and the
//!   `Animator` that plays tracks through a scheduler.
//! - **Scheduling**: the single-threaded `Scheduler` trait, plus a virtual-time
//!   `ManualScheduler` behind the `test-helpers` feature.
//!
//! # How it fits in the system
//! The `spotlight` crate consumes these primitives to resolve targets, draw
//! the highlight, and sequence steps. Nothing here allocates threads or talks
//! to a real clock; the host supplies time through its scheduler.

pub mod animation;
pub mod color;
pub mod geometry;
pub mod scheduler;

pub use color::Rgba;
pub use geometry::{Point, Rect, Size};
