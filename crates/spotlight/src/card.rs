#![forbid(unsafe_code)]

//! Info card content and styling.
//!
//! The engine never lays out text itself: the host measures and draws the
//! card from a [`CardContent`] snapshot and reports its size back through
//! [`HostSurface::card_size`](crate::host::HostSurface::card_size).

use spotlight_core::Rgba;

use crate::config::SpotlightConfig;
use crate::model::Step;
use crate::positioner::Placement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontWeight {
    #[default]
    Normal,
    Medium,
    Bold,
}

/// Text appearance for the card's title or description.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Size in scale-independent units.
    pub size: f32,
    pub color: Rgba,
    pub weight: FontWeight,
}

impl TextStyle {
    pub const TITLE: TextStyle = TextStyle::new(18.0, Rgba::WHITE, FontWeight::Bold);
    pub const DESCRIPTION: TextStyle = TextStyle::new(14.0, Rgba::WHITE, FontWeight::Normal);

    pub const fn new(size: f32, color: Rgba, weight: FontWeight) -> Self {
        Self {
            size,
            color,
            weight,
        }
    }
}

/// Everything the host needs to draw the card for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    pub title_style: TextStyle,
    pub description_style: TextStyle,
    pub background: Rgba,
    pub corner_radius: f32,
    /// Show Skip/Next buttons. Without them, tapping the overlay advances.
    pub show_buttons: bool,
    pub step_index: usize,
    pub step_count: usize,
}

impl CardContent {
    pub fn for_step(step: &Step, index: usize, count: usize, config: &SpotlightConfig) -> Self {
        Self {
            title: step.title().to_owned(),
            description: step.description().to_owned(),
            title_style: config.title_style,
            description_style: config.description_style,
            background: config.card_background,
            corner_radius: config.corner_radius,
            show_buttons: config.show_buttons,
            step_index: index,
            step_count: count,
        }
    }

    /// "2 of 5" style progress label.
    pub fn progress(&self) -> String {
        format!("{} of {}", self.step_index + 1, self.step_count)
    }

    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.step_count
    }

    /// Label for the primary button.
    pub fn next_label(&self) -> &'static str {
        if self.is_last() { "Finish" } else { "Next" }
    }

    /// Label for the secondary button.
    pub fn skip_label(&self) -> &'static str {
        "Skip"
    }
}

/// Animated card state, read by the host when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    /// `None` until the host has measured the card.
    pub placement: Option<Placement>,
    pub alpha: f32,
    /// Vertical slide offset applied on top of the placement.
    pub offset_y: f32,
}

impl CardLayout {
    pub const HIDDEN: CardLayout = CardLayout {
        placement: None,
        alpha: 0.0,
        offset_y: 0.0,
    };

    /// Whether the card has been placed and should be drawn.
    pub fn is_visible(&self) -> bool {
        self.placement.is_some()
    }
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::HIDDEN
    }
}
