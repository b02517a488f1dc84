#![forbid(unsafe_code)]

//! Step sequencing.
//!
//! [`Spotlight`] walks its steps in order. For each step it resolves the
//! target, attaches an overlay, waits for a trigger (tap, Next, Skip, or
//! dismiss), plays the exit transition, detaches, and moves on.
//!
//! # State Machine
//!
//! ```text
//!  Idle ──start──▶ Resolving(i) ──ready──▶ Shown(i) ──tap/next──▶ Leaving(i)
//!                      │  ▲                    │                     │
//!              failure │  └──── Settling(i) ◀──┼──────exit done──────┘
//!                      ▼            │          │ skip/dismiss
//!                  (skip step)      ▼          ▼
//!                               Finished ◀── Leaving(i, end)
//! ```
//!
//! # Invariants
//!
//! 1. At most one overlay is attached at any time.
//! 2. Every asynchronous callback carries the epoch it was scheduled in and
//!    is ignored once the phase has moved on.
//! 3. `on_finished` fires exactly once.
//! 4. Listener callbacks run with no internal borrow held, so listeners may
//!    call back into the tour.
//! 5. Triggers are accepted only in `Shown`. The enter transition can be
//!    interrupted; the exit starts from the current opacity. Triggers during
//!    an exit transition, or while resolving, are ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use spotlight_core::Rect;
use spotlight_core::animation::{Animator, FRAME_INTERVAL};
use spotlight_core::scheduler::TaskId;

use crate::card::CardContent;
use crate::config::{SpotlightBuilder, SpotlightConfig};
use crate::error::Result;
use crate::host::{Host, HostSurface, OverlayId};
use crate::listener::SpotlightListener;
use crate::model::Step;
use crate::overlay::{Overlay, OverlayHandle};
use crate::positioner;
use crate::renderer::HighlightRenderer;
use crate::resolver::{Resolution, Resolver};

/// Externally visible tour state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotlightState {
    NotStarted,
    /// Step `index` is being resolved, shown, or transitioned out.
    ShowingStep(usize),
    Finished,
}

/// Why a step is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Advance,
    Skip,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Resolving(usize),
    Shown(usize),
    Leaving { index: usize, exit: Exit },
    /// Overlay gone, `on_step_dismissed` delivered, next step not started.
    Settling(usize),
    Finished,
}

enum Notice {
    Shown(usize),
    Dismissed(usize),
    Next(usize),
    Skipped(usize),
    Finished,
}

struct Attached {
    id: OverlayId,
    overlay: OverlayHandle,
    target: Rect,
    placement_task: Option<TaskId>,
}

struct Inner {
    steps: Rc<[Step]>,
    config: Rc<SpotlightConfig>,
    surface: Rc<dyn HostSurface>,
    animator: Animator,
    resolver: Resolver,
    listener: Rc<dyn SpotlightListener>,
    phase: Phase,
    epoch: u64,
    resolution: Option<Resolution>,
    attached: Option<Attached>,
    finished_notified: bool,
}

impl Inner {
    /// Enter `phase`, invalidating every callback from earlier phases.
    fn transition(&mut self, phase: Phase) -> u64 {
        self.phase = phase;
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    fn release_overlay(&mut self) {
        if let Some(attached) = self.attached.take() {
            if let Some(task) = attached.placement_task {
                self.animator.scheduler().cancel(task);
            }
            attached.overlay.teardown();
            self.surface.detach(attached.id);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.resolution = None;
        self.release_overlay();
    }
}

/// A guided tour over a host UI.
///
/// Single-threaded: all calls, host callbacks, and scheduled tasks must run
/// on the thread that owns the host. Dropping the tour detaches any overlay
/// and cancels every pending callback without notifying the listener.
pub struct Spotlight {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Spotlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Spotlight")
            .field("steps", &inner.steps.len())
            .field("phase", &inner.phase)
            .field("epoch", &inner.epoch)
            .finish_non_exhaustive()
    }
}

impl Spotlight {
    pub fn builder(host: Host) -> SpotlightBuilder {
        SpotlightBuilder::new(host)
    }

    pub(crate) fn new(
        host: Host,
        steps: Vec<Step>,
        config: SpotlightConfig,
        listener: Rc<dyn SpotlightListener>,
    ) -> Self {
        let resolver = Resolver::new(Rc::clone(&host.scheduler)).poll_interval(config.poll_interval);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                steps: steps.into(),
                config: Rc::new(config),
                surface: host.surface,
                animator: Animator::new(host.scheduler),
                resolver,
                listener,
                phase: Phase::Idle,
                epoch: 0,
                resolution: None,
                attached: None,
                finished_notified: false,
            })),
        }
    }

    /// Begin the tour at step 0. Ignored unless the tour has not started.
    pub fn start(&self) {
        let count = {
            let inner = self.inner.borrow();
            if inner.phase != Phase::Idle {
                tracing::warn!(message = "spotlight.start.ignored", phase = ?inner.phase);
                return;
            }
            inner.steps.len()
        };
        tracing::info!(message = "spotlight.start", steps = count);
        advance_to(&self.inner, 0);
    }

    /// Overlay tap. Advances only when the card has no buttons.
    ///
    /// Returns whether the tap was acted on.
    pub fn tap(&self) -> bool {
        let (phase, show_buttons) = {
            let inner = self.inner.borrow();
            (inner.phase, inner.config.show_buttons)
        };
        match phase {
            Phase::Shown(index) if !show_buttons => {
                begin_leave(&self.inner, index, Exit::Advance);
                true
            }
            _ => false,
        }
    }

    /// Next button: report it, then advance.
    pub fn next(&self) -> bool {
        let Phase::Shown(index) = self.inner.borrow().phase else {
            return false;
        };
        begin_leave(&self.inner, index, Exit::Advance);
        notify(&self.inner, Notice::Next(index));
        true
    }

    /// Skip button: report it and end the tour after the exit transition.
    pub fn skip(&self) -> bool {
        let Phase::Shown(index) = self.inner.borrow().phase else {
            return false;
        };
        begin_leave(&self.inner, index, Exit::Skip);
        notify(&self.inner, Notice::Skipped(index));
        true
    }

    /// End the tour from any state. Idempotent; a no-op before `start`.
    ///
    /// A shown step fades out first. `on_step_dismissed` is not reported for
    /// it; only `on_finished` is.
    pub fn dismiss(&self) {
        let phase = self.inner.borrow().phase;
        match phase {
            Phase::Idle | Phase::Finished => {
                tracing::debug!(message = "spotlight.dismiss.ignored", phase = ?phase);
            }
            Phase::Shown(index) => begin_leave(&self.inner, index, Exit::Dismiss),
            Phase::Leaving {
                index,
                exit: Exit::Advance,
            } => {
                // Same epoch: the running exit transition now ends the tour.
                self.inner.borrow_mut().phase = Phase::Leaving {
                    index,
                    exit: Exit::Dismiss,
                };
            }
            Phase::Leaving { .. } => {}
            Phase::Resolving(_) | Phase::Settling(_) => finish(&self.inner),
        }
    }

    pub fn state(&self) -> SpotlightState {
        match self.inner.borrow().phase {
            Phase::Idle => SpotlightState::NotStarted,
            Phase::Finished => SpotlightState::Finished,
            Phase::Resolving(index)
            | Phase::Shown(index)
            | Phase::Leaving { index, .. }
            | Phase::Settling(index) => SpotlightState::ShowingStep(index),
        }
    }

    /// Index of the step in progress, if any.
    pub fn current_index(&self) -> Option<usize> {
        match self.state() {
            SpotlightState::ShowingStep(index) => Some(index),
            SpotlightState::NotStarted | SpotlightState::Finished => None,
        }
    }

    /// Whether the current step's overlay is up and accepting triggers.
    pub fn is_interactive(&self) -> bool {
        matches!(self.inner.borrow().phase, Phase::Shown(_))
    }

    pub fn step_count(&self) -> usize {
        self.inner.borrow().steps.len()
    }

    pub fn config(&self) -> Rc<SpotlightConfig> {
        Rc::clone(&self.inner.borrow().config)
    }

    /// The attached overlay, if a step is on screen.
    pub fn overlay(&self) -> Option<OverlayHandle> {
        self.inner
            .borrow()
            .attached
            .as_ref()
            .map(|attached| attached.overlay.clone())
    }
}

fn notify(rc: &Rc<RefCell<Inner>>, notice: Notice) {
    let (listener, steps) = {
        let inner = rc.borrow();
        (Rc::clone(&inner.listener), Rc::clone(&inner.steps))
    };
    match notice {
        Notice::Shown(index) => listener.on_step_shown(index, &steps[index]),
        Notice::Dismissed(index) => listener.on_step_dismissed(index, &steps[index]),
        Notice::Next(index) => listener.on_step_next(index, &steps[index]),
        Notice::Skipped(index) => listener.on_step_skipped(index, &steps[index]),
        Notice::Finished => listener.on_finished(),
    }
}

/// Show step `index`, or finish when past the last step.
fn advance_to(rc: &Rc<RefCell<Inner>>, index: usize) {
    if index >= rc.borrow().steps.len() {
        finish(rc);
        return;
    }

    let (epoch, resolver, target, timeout) = {
        let mut inner = rc.borrow_mut();
        let epoch = inner.transition(Phase::Resolving(index));
        (
            epoch,
            inner.resolver.clone(),
            inner.steps[index].target().clone(),
            inner.config.resolve_timeout,
        )
    };
    tracing::debug!(message = "spotlight.step.resolving", index, target = %target.kind());

    let weak = Rc::downgrade(rc);
    let resolution = resolver.resolve(&target, timeout, move |result| {
        if let Some(rc) = weak.upgrade() {
            on_resolved(&rc, epoch, index, result);
        }
    });

    let mut inner = rc.borrow_mut();
    if inner.epoch == epoch && !resolution.is_settled() {
        inner.resolution = Some(resolution);
    }
}

fn on_resolved(rc: &Rc<RefCell<Inner>>, epoch: u64, index: usize, result: Result<Rect>) {
    let stale = {
        let mut inner = rc.borrow_mut();
        let stale = inner.epoch != epoch;
        if !stale {
            inner.resolution = None;
        }
        stale
    };
    if stale {
        return;
    }

    match result {
        Ok(bounds) => present(rc, index, bounds),
        Err(err) => {
            tracing::warn!(message = "spotlight.step.unavailable", index, error = %err);
            advance_to(rc, index + 1);
        }
    }
}

fn present(rc: &Rc<RefCell<Inner>>, index: usize, target: Rect) {
    let epoch = {
        let mut inner = rc.borrow_mut();
        // Never stack overlays.
        inner.release_overlay();

        let config = Rc::clone(&inner.config);
        let steps = Rc::clone(&inner.steps);
        let step = &steps[index];
        let mut renderer = HighlightRenderer::new(
            inner.animator.clone(),
            config.shape_animation,
            inner.surface.supports_blur(),
        )
        .corner_radius(config.corner_radius);
        renderer.set_overlay_color(config.overlay_color);
        renderer.set_blur_enabled(config.use_blur);
        renderer.set_target(target, step.shape(), config.highlight_padding);

        let card = CardContent::for_step(step, index, steps.len(), &config);
        let overlay = OverlayHandle::new(Overlay::new(renderer, card, target));
        let id = inner.surface.attach(overlay.clone());
        overlay.play_enter(&inner.animator);

        inner.attached = Some(Attached {
            id,
            overlay,
            target,
            placement_task: None,
        });
        inner.transition(Phase::Shown(index))
    };

    tracing::debug!(
        message = "spotlight.step.shown",
        index,
        x = target.x,
        y = target.y,
        width = target.width,
        height = target.height
    );
    schedule_placement(rc, epoch, Duration::ZERO);
    notify(rc, Notice::Shown(index));
}

/// Poll the host for the measured card size, one frame at a time.
fn schedule_placement(rc: &Rc<RefCell<Inner>>, epoch: u64, delay: Duration) {
    let weak = Rc::downgrade(rc);
    let scheduler = Rc::clone(rc.borrow().animator.scheduler());
    let task = scheduler.schedule(
        delay,
        Box::new(move || {
            if let Some(rc) = weak.upgrade() {
                place_card(&rc, epoch);
            }
        }),
    );
    let mut guard = rc.borrow_mut();
    let inner = &mut *guard;
    match inner.attached.as_mut() {
        Some(attached) if inner.epoch == epoch => attached.placement_task = Some(task),
        _ => {
            scheduler.cancel(task);
        }
    }
}

fn place_card(rc: &Rc<RefCell<Inner>>, epoch: u64) {
    let measured = {
        let mut guard = rc.borrow_mut();
        let inner = &mut *guard;
        if inner.epoch != epoch {
            return;
        }
        let Some(attached) = inner.attached.as_mut() else {
            return;
        };
        attached.placement_task = None;

        match inner
            .surface
            .card_size(attached.id)
            .filter(|size| !size.is_empty())
        {
            Some(size) => {
                let margin = inner.config.card_margin * inner.surface.density();
                let placement = positioner::place(
                    size,
                    attached.target,
                    inner.surface.bounds(),
                    inner.config.card_position,
                    margin,
                );
                attached.overlay.set_placement(placement);
                tracing::debug!(
                    message = "spotlight.card.placed",
                    side = ?placement.side,
                    x = placement.origin.x,
                    y = placement.origin.y
                );
                true
            }
            None => false,
        }
    };
    if !measured {
        schedule_placement(rc, epoch, FRAME_INTERVAL);
    }
}

fn begin_leave(rc: &Rc<RefCell<Inner>>, index: usize, exit: Exit) {
    let (epoch, overlay, animator) = {
        let mut inner = rc.borrow_mut();
        let epoch = inner.transition(Phase::Leaving { index, exit });
        let scheduler = Rc::clone(inner.animator.scheduler());
        let overlay = inner.attached.as_mut().map(|attached| {
            if let Some(task) = attached.placement_task.take() {
                scheduler.cancel(task);
            }
            attached.overlay.clone()
        });
        (epoch, overlay, inner.animator.clone())
    };
    tracing::debug!(message = "spotlight.step.leaving", index, exit = ?exit);

    let weak = Rc::downgrade(rc);
    let on_left = move || {
        if let Some(rc) = weak.upgrade() {
            left(&rc, epoch);
        }
    };
    match overlay {
        Some(overlay) => overlay.play_exit(&animator, on_left),
        None => on_left(),
    }
}

/// The exit transition for the current step has finished.
fn left(rc: &Rc<RefCell<Inner>>, epoch: u64) {
    let (index, exit, settled) = {
        let mut inner = rc.borrow_mut();
        if inner.epoch != epoch {
            return;
        }
        let Phase::Leaving { index, exit } = inner.phase else {
            return;
        };
        inner.release_overlay();
        let settled = match exit {
            Exit::Advance => inner.transition(Phase::Settling(index)),
            Exit::Skip | Exit::Dismiss => inner.epoch,
        };
        (index, exit, settled)
    };

    match exit {
        Exit::Advance => {
            tracing::debug!(message = "spotlight.step.dismissed", index);
            notify(rc, Notice::Dismissed(index));
            // The listener may have dismissed the tour.
            if rc.borrow().epoch == settled {
                advance_to(rc, index + 1);
            }
        }
        Exit::Skip | Exit::Dismiss => finish(rc),
    }
}

fn finish(rc: &Rc<RefCell<Inner>>) {
    let first = {
        let mut inner = rc.borrow_mut();
        if inner.phase == Phase::Finished {
            return;
        }
        inner.transition(Phase::Finished);
        inner.resolution = None;
        inner.release_overlay();
        !std::mem::replace(&mut inner.finished_notified, true)
    };
    if first {
        tracing::info!(message = "spotlight.finished");
        notify(rc, Notice::Finished);
    }
}
