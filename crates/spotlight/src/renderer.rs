#![forbid(unsafe_code)]

//! Highlight renderer: the dimmed layer with a transparent cutout.
//!
//! The renderer owns two animations, both held as [`AnimationHandle`]s so
//! they stop when the renderer is torn down or dropped:
//!
//! - the repeating shape scale ([`ShapeAnimationKind`]);
//! - the opacity fade (in on `set_target`, out on `crossfade_out`).
//!
//! Rendering is a pure read of the current state. Each draw fills the layer,
//! then clears the cutout; nothing is drawn before a target is set.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use spotlight_core::animation::{AnimationHandle, Animator, Track, accelerate_decelerate};
use spotlight_core::{Rect, Rgba};

use crate::error::{Result, SpotlightError};
use crate::host::Canvas;
use crate::model::{ShapeAnimationKind, ShapeKind};
use crate::shape::{Cutout, DEFAULT_CORNER_RADIUS, cutout};

/// Opacity fade-in when a target is set.
pub const FADE_IN: Duration = Duration::from_millis(300);
/// Opacity fade-out in [`HighlightRenderer::crossfade_out`].
pub const CROSSFADE_OUT: Duration = Duration::from_millis(220);
/// Blur radius used when the host supports blurring.
pub const BLUR_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Copy)]
struct Highlight {
    target: Rect,
    shape: ShapeKind,
    padding: f32,
}

#[derive(Debug)]
struct RenderState {
    highlight: Option<Highlight>,
    scale: f32,
    alpha: f32,
    overlay_color: Rgba,
    blur: bool,
}

pub struct HighlightRenderer {
    state: Rc<RefCell<RenderState>>,
    animator: Animator,
    animation: ShapeAnimationKind,
    blur_supported: bool,
    corner_radius: f32,
    pulse: Option<AnimationHandle>,
    fade: Option<AnimationHandle>,
}

impl std::fmt::Debug for HighlightRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightRenderer")
            .field("state", &self.state.borrow())
            .field("animation", &self.animation)
            .field("pulsing", &self.is_animating())
            .finish_non_exhaustive()
    }
}

impl HighlightRenderer {
    pub fn new(animator: Animator, animation: ShapeAnimationKind, blur_supported: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(RenderState {
                highlight: None,
                scale: 1.0,
                alpha: 0.0,
                overlay_color: Rgba::from_argb(0xB300_0000),
                blur: false,
            })),
            animator,
            animation,
            blur_supported,
            corner_radius: DEFAULT_CORNER_RADIUS,
            pulse: None,
            fade: None,
        }
    }

    /// Set the rounded-rect corner radius (builder pattern).
    #[must_use]
    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn set_overlay_color(&mut self, color: Rgba) {
        self.state.borrow_mut().overlay_color = color;
    }

    /// Request a blurred backdrop. Hosts without blur support degrade to a
    /// plain dim; the outcome is reported by [`Self::is_blurred`].
    pub fn set_blur_enabled(&mut self, enabled: bool) {
        let blur = match self.check_blur(enabled) {
            Ok(blur) => blur,
            Err(err) => {
                tracing::debug!(message = "spotlight.blur.unsupported", error = %err);
                false
            }
        };
        self.state.borrow_mut().blur = blur;
    }

    fn check_blur(&self, enabled: bool) -> Result<bool> {
        if enabled && !self.blur_supported {
            return Err(SpotlightError::BlurUnsupported);
        }
        Ok(enabled)
    }

    /// Highlight `target`, restarting the shape animation and fading in.
    pub fn set_target(&mut self, target: Rect, shape: ShapeKind, padding: f32) {
        {
            let mut state = self.state.borrow_mut();
            state.highlight = Some(Highlight {
                target,
                shape,
                padding,
            });
            state.scale = 1.0;
        }

        self.pulse = self.animation.track().map(|track| {
            let weak = Rc::downgrade(&self.state);
            self.animator.play(
                track,
                move |scale| {
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().scale = scale;
                    }
                },
                || {},
            )
        });

        let from = self.state.borrow().alpha;
        self.fade = Some(self.fade_to(from, 1.0, FADE_IN, || {}));
    }

    /// Fade to transparent, then call `on_complete`.
    pub fn crossfade_out(&mut self, on_complete: impl FnOnce() + 'static) {
        let from = self.state.borrow().alpha;
        self.fade = Some(self.fade_to(from, 0.0, CROSSFADE_OUT, on_complete));
    }

    fn fade_to(
        &self,
        from: f32,
        to: f32,
        duration: Duration,
        on_complete: impl FnOnce() + 'static,
    ) -> AnimationHandle {
        let weak = Rc::downgrade(&self.state);
        self.animator.play(
            Track::tween(from, to, duration).easing(accelerate_decelerate),
            move |alpha| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().alpha = alpha;
                }
            },
            on_complete,
        )
    }

    /// Cancel every running animation and reset the scale. Idempotent.
    pub fn teardown(&mut self) {
        self.pulse = None;
        self.fade = None;
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.scale = 1.0;
        }
    }

    /// Current cutout, or `None` before a target is set.
    pub fn cutout(&self) -> Option<Cutout> {
        let state = self.state.borrow();
        state.highlight.map(|h| {
            cutout(h.target, h.shape, h.padding, state.scale, self.corner_radius)
        })
    }

    pub fn scale(&self) -> f32 {
        self.state.borrow().scale
    }

    pub fn alpha(&self) -> f32 {
        self.state.borrow().alpha
    }

    pub fn is_blurred(&self) -> bool {
        self.state.borrow().blur
    }

    /// Whether the shape animation is running.
    pub fn is_animating(&self) -> bool {
        self.pulse.as_ref().is_some_and(AnimationHandle::is_active)
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.render_with_opacity(canvas, 1.0);
    }

    /// Draw with an extra opacity factor from an enclosing layer.
    pub fn render_with_opacity(&self, canvas: &mut dyn Canvas, opacity: f32) {
        let Some(hole) = self.cutout() else {
            return;
        };
        let _span = tracing::trace_span!("spotlight.render").entered();
        let state = self.state.borrow();
        canvas.set_alpha((state.alpha * opacity).clamp(0.0, 1.0));
        if state.blur {
            canvas.apply_blur(BLUR_RADIUS);
        }
        canvas.fill(state.overlay_color);
        canvas.clear(&hole);
    }
}

impl Drop for HighlightRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}
