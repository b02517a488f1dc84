#![forbid(unsafe_code)]

//! Tour configuration and the builder that produces a [`Spotlight`].
//!
//! [`SpotlightConfig`] holds the visual and timing knobs shared by every
//! step. With the `serde` feature it can be loaded from JSON/TOML; missing
//! fields take their defaults and durations are written in milliseconds.
//!
//! # Example
//!
//! ```ignore
//! let spotlight = Spotlight::builder(host)
//!     .add_step(Step::new(TargetRef::element(fab), "Create", "Tap to add", ShapeKind::Circle))
//!     .card_position(CardPosition::Auto)
//!     .shape_animation(ShapeAnimationKind::Pulse)
//!     .listener(my_listener)
//!     .build()?;
//! spotlight.start();
//! ```

use std::rc::Rc;
use std::time::Duration;

use spotlight_core::Rgba;

use crate::card::{FontWeight, TextStyle};
use crate::error::{Result, SpotlightError};
use crate::host::Host;
use crate::listener::{NoopListener, SpotlightListener};
use crate::model::{CardPosition, ShapeAnimationKind, Step};
use crate::positioner::DEFAULT_CARD_MARGIN_DP;
use crate::resolver::{DEFAULT_POLL_INTERVAL, DEFAULT_RESOLVE_TIMEOUT};
use crate::sequencer::Spotlight;
use crate::shape::DEFAULT_CORNER_RADIUS;

/// Visual and timing configuration shared by all steps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpotlightConfig {
    /// Dim layer color.
    pub overlay_color: Rgba,
    pub card_background: Rgba,
    pub title_style: TextStyle,
    pub description_style: TextStyle,
    /// Extra space around the target inside the cutout, in pixels.
    pub highlight_padding: f32,
    /// Rounded-rect cutout corner radius, in pixels.
    pub corner_radius: f32,
    pub show_buttons: bool,
    pub card_position: CardPosition,
    /// Gap between target and card in density-independent units.
    pub card_margin: f32,
    pub shape_animation: ShapeAnimationKind,
    pub use_blur: bool,
    /// Maximum wait for a list item to be realized.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub resolve_timeout: Duration,
    /// Poll interval while waiting for a list item.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub poll_interval: Duration,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            overlay_color: Rgba::from_argb(0xB300_0000),
            card_background: Rgba::from_argb(0xCC33_3333),
            title_style: TextStyle::TITLE,
            description_style: TextStyle::DESCRIPTION,
            highlight_padding: 0.0,
            corner_radius: DEFAULT_CORNER_RADIUS,
            show_buttons: false,
            card_position: CardPosition::Auto,
            card_margin: DEFAULT_CARD_MARGIN_DP,
            shape_animation: ShapeAnimationKind::Pulse,
            use_blur: false,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SpotlightConfig {
    /// Reject values that cannot produce a sensible overlay.
    pub fn validate(&self) -> Result<()> {
        fn finite_non_negative(name: &str, value: f32) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SpotlightError::invalid_config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )))
            }
        }

        finite_non_negative("highlight_padding", self.highlight_padding)?;
        finite_non_negative("corner_radius", self.corner_radius)?;
        finite_non_negative("card_margin", self.card_margin)?;
        finite_non_negative("title_style.size", self.title_style.size)?;
        finite_non_negative("description_style.size", self.description_style.size)?;
        if self.resolve_timeout.is_zero() {
            return Err(SpotlightError::invalid_config(
                "resolve_timeout must be greater than zero",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(SpotlightError::invalid_config(
                "poll_interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Collects steps and configuration, then validates them into a
/// [`Spotlight`].
pub struct SpotlightBuilder {
    host: Host,
    steps: Vec<Step>,
    config: SpotlightConfig,
    listener: Option<Rc<dyn SpotlightListener>>,
}

impl std::fmt::Debug for SpotlightBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotlightBuilder")
            .field("host", &self.host)
            .field("steps", &self.steps.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SpotlightBuilder {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            steps: Vec::new(),
            config: SpotlightConfig::default(),
            listener: None,
        }
    }

    #[must_use]
    pub fn add_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: SpotlightConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn overlay_color(mut self, color: Rgba) -> Self {
        self.config.overlay_color = color;
        self
    }

    #[must_use]
    pub fn card_background(mut self, color: Rgba) -> Self {
        self.config.card_background = color;
        self
    }

    #[must_use]
    pub fn title_style(mut self, size: f32, color: Rgba, weight: FontWeight) -> Self {
        self.config.title_style = TextStyle::new(size, color, weight);
        self
    }

    #[must_use]
    pub fn desc_style(mut self, size: f32, color: Rgba, weight: FontWeight) -> Self {
        self.config.description_style = TextStyle::new(size, color, weight);
        self
    }

    #[must_use]
    pub fn highlight_padding(mut self, padding: f32) -> Self {
        self.config.highlight_padding = padding;
        self
    }

    #[must_use]
    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.config.corner_radius = radius;
        self
    }

    #[must_use]
    pub fn shape_animation(mut self, animation: ShapeAnimationKind) -> Self {
        self.config.shape_animation = animation;
        self
    }

    #[must_use]
    pub fn use_blur_overlay(mut self, enabled: bool) -> Self {
        self.config.use_blur = enabled;
        self
    }

    #[must_use]
    pub fn card_position(mut self, position: CardPosition) -> Self {
        self.config.card_position = position;
        self
    }

    #[must_use]
    pub fn card_margin(mut self, margin_dp: f32) -> Self {
        self.config.card_margin = margin_dp;
        self
    }

    #[must_use]
    pub fn show_buttons(mut self, show: bool) -> Self {
        self.config.show_buttons = show;
        self
    }

    #[must_use]
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.config.resolve_timeout = timeout;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn listener(mut self, listener: impl SpotlightListener + 'static) -> Self {
        self.listener = Some(Rc::new(listener));
        self
    }

    /// Validate the host and configuration and create the tour.
    ///
    /// # Errors
    ///
    /// - [`SpotlightError::InvalidHostContext`] when the surface cannot host
    ///   overlays or has no area.
    /// - [`SpotlightError::InvalidConfig`] for out-of-range settings.
    pub fn build(self) -> Result<Spotlight> {
        if !self.host.surface.supports_overlays() {
            return Err(SpotlightError::invalid_host(
                "surface cannot attach overlay nodes",
            ));
        }
        if self.host.surface.bounds().is_empty() {
            return Err(SpotlightError::invalid_host("surface has no area"));
        }
        self.config.validate()?;

        let listener = self
            .listener
            .unwrap_or_else(|| Rc::new(NoopListener) as Rc<dyn SpotlightListener>);
        Ok(Spotlight::new(self.host, self.steps, self.config, listener))
    }
}
