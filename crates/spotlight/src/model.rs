#![forbid(unsafe_code)]

//! Tour data model: steps, targets, shapes, and policies.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use spotlight_core::animation::{
    EasingFn, Keyframes, LoopCount, Track, accelerate_decelerate, bounce, ease_in_out,
};

use crate::host::{Element, RecycledList, TabStrip};

pub type ElementRef = Rc<dyn Element>;
pub type ListRef = Rc<dyn RecycledList>;
pub type TabStripRef = Rc<dyn TabStrip>;

/// The UI element a step highlights.
///
/// A lookup relation, never ownership: the element may not exist yet when the
/// step is built (a list item that has not been realized, for instance).
#[derive(Clone)]
pub enum TargetRef {
    /// A single element.
    Element(ElementRef),
    /// The item at `index` of a recycled/virtualized list.
    ListItem { list: ListRef, index: usize },
    /// The tab at `index` of a tab strip.
    TabItem { strip: TabStripRef, index: usize },
}

impl TargetRef {
    pub fn element(element: ElementRef) -> Self {
        Self::Element(element)
    }

    pub fn list_item(list: ListRef, index: usize) -> Self {
        Self::ListItem { list, index }
    }

    pub fn tab(strip: TabStripRef, index: usize) -> Self {
        Self::TabItem { strip, index }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Element(_) => TargetKind::Element,
            Self::ListItem { index, .. } => TargetKind::ListItem(*index),
            Self::TabItem { index, .. } => TargetKind::TabItem(*index),
        }
    }
}

impl fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetRef").field(&self.kind()).finish()
    }
}

/// Target variant without the host references, for logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Element,
    ListItem(usize),
    TabItem(usize),
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => f.write_str("element"),
            Self::ListItem(index) => write!(f, "list item #{index}"),
            Self::TabItem(index) => write!(f, "tab #{index}"),
        }
    }
}

/// Cutout shape around the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Circle,
    #[default]
    Rectangle,
    RoundedRect,
    Oval,
}

/// Where the info card goes relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardPosition {
    /// Below when it fits above the lower screen edge, otherwise above.
    #[default]
    Auto,
    Above,
    Below,
    Left,
    Right,
    /// Centered on screen, ignoring the target.
    Center,
}

/// Repeating scale animation applied to the cutout while a step is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeAnimationKind {
    None,
    #[default]
    Pulse,
    Breathing,
    Bounce,
}

impl ShapeAnimationKind {
    /// The infinitely repeating scale track, or `None` for a static cutout.
    pub fn track(self) -> Option<Track> {
        let (frames, millis, easing): (&[f32], u64, EasingFn) = match self {
            Self::None => return None,
            Self::Pulse => (&[1.0, 1.08, 1.0], 900, accelerate_decelerate),
            Self::Breathing => (&[1.0, 1.15, 0.95, 1.0], 2000, ease_in_out),
            Self::Bounce => (&[1.0, 1.2, 1.0], 700, bounce),
        };
        Some(
            Track::new(Keyframes::new(frames), Duration::from_millis(millis))
                .easing(easing)
                .loop_count(LoopCount::Infinite),
        )
    }
}

/// One stage of the tour.
#[derive(Debug, Clone)]
pub struct Step {
    target: TargetRef,
    title: String,
    description: String,
    shape: ShapeKind,
}

impl Step {
    pub fn new(
        target: TargetRef,
        title: impl Into<String>,
        description: impl Into<String>,
        shape: ShapeKind,
    ) -> Self {
        Self {
            target,
            title: title.into(),
            description: description.into(),
            shape,
        }
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_kind_display() {
        assert_eq!(TargetKind::Element.to_string(), "element");
        assert_eq!(TargetKind::TabItem(1).to_string(), "tab #1");
    }

    #[test]
    fn animation_tracks_match_their_keyframes() {
        assert!(ShapeAnimationKind::None.track().is_none());

        let pulse = ShapeAnimationKind::Pulse.track().unwrap();
        assert_eq!(pulse.duration(), Duration::from_millis(900));
        assert_eq!(pulse.keyframes().max(), 1.08);

        let breathing = ShapeAnimationKind::Breathing.track().unwrap();
        assert_eq!(breathing.duration(), Duration::from_millis(2000));
        assert_eq!(breathing.keyframes().min(), 0.95);

        let bounce = ShapeAnimationKind::Bounce.track().unwrap();
        assert_eq!(bounce.duration(), Duration::from_millis(700));
        assert_eq!(bounce.keyframes().max(), 1.2);
        assert_eq!(bounce.total_duration(), None);
    }
}
