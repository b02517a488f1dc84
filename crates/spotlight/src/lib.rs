#![forbid(unsafe_code)]

//! Guided-tour spotlight overlays.
//!
//! A [`Spotlight`] walks an ordered list of [`Step`]s. Each step dims the
//! screen, punches an animated cutout around a target element, and shows an
//! info card next to it. Targets can be plain elements, items of a recycled
//! list that may not exist yet, or tabs of a tab strip.
//!
//! # Role in the workspace
//! `spotlight` is the engine. It depends on `spotlight-core` for geometry,
//! colors, animation, and the scheduler port, and talks to the UI toolkit
//! only through the traits in [`host`].
//!
//! # How it fits in the system
//! A host implements [`HostSurface`], [`Element`], [`RecycledList`], and
//! [`TabStrip`] over its widget tree, supplies a [`Scheduler`], and builds a
//! tour with [`Spotlight::builder`]. The host draws attached overlays with
//! [`OverlayHandle::render`] and forwards taps and button presses to
//! [`Spotlight::tap`], [`Spotlight::next`], and [`Spotlight::skip`].
//!
//! [`Scheduler`]: spotlight_core::scheduler::Scheduler

pub mod card;
pub mod config;
pub mod error;
pub mod host;
pub mod listener;
pub mod model;
pub mod overlay;
pub mod positioner;
pub mod renderer;
pub mod resolver;
pub mod sequencer;
pub mod shape;

pub use card::{CardContent, CardLayout, FontWeight, TextStyle};
pub use config::{SpotlightBuilder, SpotlightConfig};
pub use error::{Result, SpotlightError};
pub use host::{
    Callback, Canvas, Element, Host, HostSurface, ListenerId, OverlayId, RecycledList, TabStrip,
};
pub use listener::{NoopListener, SpotlightListener};
pub use model::{
    CardPosition, ElementRef, ListRef, ShapeAnimationKind, ShapeKind, Step, TabStripRef,
    TargetKind, TargetRef,
};
pub use overlay::OverlayHandle;
pub use positioner::{CardSide, Placement};
pub use sequencer::{Spotlight, SpotlightState};
pub use shape::Cutout;

pub use spotlight_core::{Point, Rect, Rgba, Size};
