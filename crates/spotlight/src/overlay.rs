#![forbid(unsafe_code)]

//! The overlay node: highlight layer plus info card.
//!
//! An [`Overlay`] is created per shown step and handed to the host as an
//! [`OverlayHandle`]. The host draws it with [`OverlayHandle::render`] and
//! the card from [`OverlayHandle::card`] at [`OverlayHandle::card_layout`].
//!
//! # Transitions
//!
//! | Transition | Root alpha | Card                    | Duration |
//! |------------|------------|-------------------------|----------|
//! | Enter      | 0 → 1      | slides up 50px, fades in | 400ms    |
//! | Exit       | 1 → 0      | fades out               | 250ms    |
//!
//! The exit transition also cross-fades the highlight layer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spotlight_core::animation::{AnimationHandle, Animator, Track, accelerate_decelerate, ease_out};
use spotlight_core::{Rect, Size};

use crate::card::{CardContent, CardLayout};
use crate::host::Canvas;
use crate::positioner::Placement;
use crate::renderer::HighlightRenderer;
use crate::shape::Cutout;

pub const ENTER_DURATION: Duration = Duration::from_millis(400);
pub const EXIT_DURATION: Duration = Duration::from_millis(250);
/// Distance the card slides up during the enter transition, in pixels.
pub const CARD_SLIDE_DISTANCE: f32 = 50.0;

#[derive(Debug)]
pub struct Overlay {
    renderer: HighlightRenderer,
    card: CardContent,
    target: Rect,
    alpha: f32,
    card_layout: CardLayout,
    transition: Option<AnimationHandle>,
}

impl Overlay {
    pub fn new(renderer: HighlightRenderer, card: CardContent, target: Rect) -> Self {
        Self {
            renderer,
            card,
            target,
            alpha: 0.0,
            card_layout: CardLayout::HIDDEN,
            transition: None,
        }
    }

    fn apply_enter(&mut self, progress: f32) {
        self.alpha = progress;
        self.card_layout.alpha = progress;
        self.card_layout.offset_y = CARD_SLIDE_DISTANCE * (1.0 - progress);
    }

    fn apply_exit(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.card_layout.alpha = alpha;
    }
}

/// Shared handle to an [`Overlay`].
///
/// Cloning is cheap; the host keeps one clone while the overlay is attached.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    inner: Rc<RefCell<Overlay>>,
}

impl OverlayHandle {
    pub fn new(overlay: Overlay) -> Self {
        Self {
            inner: Rc::new(RefCell::new(overlay)),
        }
    }

    /// Draw the highlight layer at the overlay's current opacity.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let overlay = self.inner.borrow();
        overlay.renderer.render_with_opacity(canvas, overlay.alpha);
    }

    pub fn card(&self) -> CardContent {
        self.inner.borrow().card.clone()
    }

    pub fn card_layout(&self) -> CardLayout {
        self.inner.borrow().card_layout
    }

    /// Card bounds for a measured `size`, including the slide offset.
    pub fn card_bounds(&self, size: Size) -> Option<Rect> {
        let layout = self.card_layout();
        layout
            .placement
            .map(|placement| placement.bounds(size).translate(0.0, layout.offset_y))
    }

    /// Window-space bounds of the highlighted element.
    pub fn target(&self) -> Rect {
        self.inner.borrow().target
    }

    pub fn cutout(&self) -> Option<Cutout> {
        self.inner.borrow().renderer.cutout()
    }

    /// Root opacity of the whole overlay.
    pub fn alpha(&self) -> f32 {
        self.inner.borrow().alpha
    }

    pub fn scale(&self) -> f32 {
        self.inner.borrow().renderer.scale()
    }

    pub fn is_blurred(&self) -> bool {
        self.inner.borrow().renderer.is_blurred()
    }

    /// Whether any animation (shape or transition) is still running.
    pub fn is_animating(&self) -> bool {
        let overlay = self.inner.borrow();
        overlay.renderer.is_animating()
            || overlay
                .transition
                .as_ref()
                .is_some_and(AnimationHandle::is_active)
    }

    pub(crate) fn set_placement(&self, placement: Placement) {
        self.inner.borrow_mut().card_layout.placement = Some(placement);
    }

    pub(crate) fn play_enter(&self, animator: &Animator) {
        let weak = self.downgrade();
        let handle = animator.play(
            Track::tween(0.0, 1.0, ENTER_DURATION).easing(ease_out),
            move |progress| with_overlay(&weak, |overlay| overlay.apply_enter(progress)),
            || {},
        );
        self.inner.borrow_mut().transition = Some(handle);
    }

    /// Fade everything out, then call `on_complete`.
    pub(crate) fn play_exit(&self, animator: &Animator, on_complete: impl FnOnce() + 'static) {
        let from = {
            let mut overlay = self.inner.borrow_mut();
            overlay.transition = None;
            overlay.renderer.crossfade_out(|| {});
            overlay.alpha
        };
        let weak = self.downgrade();
        let handle = animator.play(
            Track::tween(from, 0.0, EXIT_DURATION).easing(accelerate_decelerate),
            move |alpha| with_overlay(&weak, |overlay| overlay.apply_exit(alpha)),
            on_complete,
        );
        self.inner.borrow_mut().transition = Some(handle);
    }

    /// Stop every animation. The overlay keeps its last drawn state.
    pub(crate) fn teardown(&self) {
        let mut overlay = self.inner.borrow_mut();
        overlay.transition = None;
        overlay.renderer.teardown();
    }

    fn downgrade(&self) -> Weak<RefCell<Overlay>> {
        Rc::downgrade(&self.inner)
    }

    /// Whether two handles refer to the same overlay.
    pub fn ptr_eq(&self, other: &OverlayHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

fn with_overlay(weak: &Weak<RefCell<Overlay>>, f: impl FnOnce(&mut Overlay)) {
    if let Some(overlay) = weak.upgrade()
        && let Ok(mut overlay) = overlay.try_borrow_mut()
    {
        f(&mut overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpotlightConfig;
    use crate::model::ShapeAnimationKind;
    use crate::positioner::CardSide;
    use spotlight_core::Point;
    use spotlight_core::animation::FRAME_INTERVAL;
    use spotlight_core::scheduler::ManualScheduler;
    use std::cell::Cell;

    fn overlay(scheduler: &Rc<ManualScheduler>) -> (Animator, OverlayHandle) {
        let animator = Animator::new(scheduler.clone());
        let mut renderer = HighlightRenderer::new(animator.clone(), ShapeAnimationKind::None, false);
        renderer.set_target(Rect::new(10.0, 10.0, 20.0, 20.0), Default::default(), 0.0);
        let config = SpotlightConfig::default();
        let card = CardContent {
            title: "Hello".into(),
            description: "World".into(),
            title_style: config.title_style,
            description_style: config.description_style,
            background: config.card_background,
            corner_radius: config.corner_radius,
            show_buttons: false,
            step_index: 0,
            step_count: 1,
        };
        let handle = OverlayHandle::new(Overlay::new(renderer, card, Rect::new(10.0, 10.0, 20.0, 20.0)));
        (animator, handle)
    }

    #[test]
    fn enter_fades_in_and_slides_card() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (animator, handle) = overlay(&scheduler);
        handle.play_enter(&animator);
        assert_eq!(handle.alpha(), 0.0);
        assert_eq!(handle.card_layout().offset_y, CARD_SLIDE_DISTANCE);

        scheduler.advance(ENTER_DURATION + FRAME_INTERVAL);
        assert_eq!(handle.alpha(), 1.0);
        assert_eq!(handle.card_layout().offset_y, 0.0);
        assert!(!handle.is_animating());
    }

    #[test]
    fn exit_fades_out_and_completes() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (animator, handle) = overlay(&scheduler);
        handle.play_enter(&animator);
        scheduler.advance(ENTER_DURATION + FRAME_INTERVAL);

        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        handle.play_exit(&animator, move || flag.set(true));
        scheduler.advance(EXIT_DURATION + FRAME_INTERVAL);
        assert!(done.get());
        assert_eq!(handle.alpha(), 0.0);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn teardown_stops_transitions() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (animator, handle) = overlay(&scheduler);
        handle.play_enter(&animator);
        handle.teardown();
        assert!(scheduler.is_idle());
    }

    #[test]
    fn card_bounds_follow_placement() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (_animator, handle) = overlay(&scheduler);
        assert_eq!(handle.card_bounds(Size::new(100.0, 40.0)), None);
        handle.set_placement(Placement {
            origin: Point::new(5.0, 60.0),
            side: CardSide::Below,
        });
        assert_eq!(
            handle.card_bounds(Size::new(100.0, 40.0)),
            Some(Rect::new(5.0, 60.0, 100.0, 40.0))
        );
    }
}
