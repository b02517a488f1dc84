#![forbid(unsafe_code)]

//! Plays [`Track`]s through a [`Scheduler`].
//!
//! The animator emits one frame immediately, then one per frame interval until
//! the track completes. The final frame always carries the track's end value,
//! followed by the completion callback.
//!
//! Playback is owned by the returned [`AnimationHandle`]: dropping it cancels
//! the pending frame, so an animation can never outlive the component that
//! started it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::Track;
use crate::scheduler::{Scheduler, TaskId};

/// Default frame interval (~60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type FrameFn = Box<dyn FnMut(f32)>;
type DoneFn = Box<dyn FnOnce()>;

struct Playback {
    track: Track,
    started: Duration,
    on_frame: Option<FrameFn>,
    on_complete: Option<DoneFn>,
    task: Option<TaskId>,
    done: bool,
}

/// Starts animations on a host scheduler.
#[derive(Clone)]
pub struct Animator {
    scheduler: Rc<dyn Scheduler>,
    frame_interval: Duration,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("frame_interval", &self.frame_interval)
            .finish_non_exhaustive()
    }
}

impl Animator {
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            frame_interval: FRAME_INTERVAL,
        }
    }

    /// Override the frame interval (builder pattern). Zero is clamped to 1ms.
    #[must_use]
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// Play `track`, calling `on_frame` with each sampled value and
    /// `on_complete` once the track finishes. Infinite tracks never complete.
    #[must_use = "dropping the handle cancels the animation"]
    pub fn play(
        &self,
        track: Track,
        on_frame: impl FnMut(f32) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> AnimationHandle {
        let playback = Rc::new(RefCell::new(Playback {
            track,
            started: self.scheduler.now(),
            on_frame: Some(Box::new(on_frame)),
            on_complete: Some(Box::new(on_complete)),
            task: None,
            done: false,
        }));
        let handle = AnimationHandle {
            playback: Rc::clone(&playback),
            scheduler: Rc::downgrade(&self.scheduler),
        };
        frame(
            &Rc::downgrade(&playback),
            &Rc::downgrade(&self.scheduler),
            self.frame_interval,
        );
        handle
    }
}

fn frame(playback: &Weak<RefCell<Playback>>, scheduler: &Weak<dyn Scheduler>, interval: Duration) {
    let (Some(pb), Some(sched)) = (playback.upgrade(), scheduler.upgrade()) else {
        return;
    };

    let (value, complete, callback) = {
        let mut p = pb.borrow_mut();
        if p.done {
            return;
        }
        p.task = None;
        let elapsed = sched.now().saturating_sub(p.started);
        (
            p.track.value_at(elapsed),
            p.track.is_complete(elapsed),
            p.on_frame.take(),
        )
    };

    // The callback runs without the borrow held so it may cancel this playback.
    if let Some(mut callback) = callback {
        callback(value);
        let mut p = pb.borrow_mut();
        if p.done {
            return;
        }
        p.on_frame = Some(callback);
    }

    if complete {
        let done = {
            let mut p = pb.borrow_mut();
            p.done = true;
            p.on_frame = None;
            p.on_complete.take()
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "animation.complete",
            elapsed_ms = sched.now().saturating_sub(pb.borrow().started).as_millis() as u64
        );
        if let Some(done) = done {
            done();
        }
        return;
    }

    let (next_pb, next_sched) = (Rc::downgrade(&pb), scheduler.clone());
    let id = sched.schedule(
        interval,
        Box::new(move || frame(&next_pb, &next_sched, interval)),
    );
    pb.borrow_mut().task = Some(id);
}

/// Owner of a running animation. Dropping it cancels the animation.
pub struct AnimationHandle {
    playback: Rc<RefCell<Playback>>,
    scheduler: Weak<dyn Scheduler>,
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

impl AnimationHandle {
    /// Stop the animation without invoking the completion callback.
    ///
    /// Idempotent; a no-op once the animation has completed.
    pub fn cancel(&self) {
        let task = {
            let Ok(mut p) = self.playback.try_borrow_mut() else {
                return;
            };
            if p.done {
                return;
            }
            p.done = true;
            p.on_frame = None;
            p.on_complete = None;
            p.task.take()
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "animation.cancelled", pending = task.is_some());
        if let (Some(id), Some(scheduler)) = (task, self.scheduler.upgrade()) {
            scheduler.cancel(id);
        }
    }

    /// Whether frames are still being produced.
    pub fn is_active(&self) -> bool {
        self.playback.try_borrow().map(|p| !p.done).unwrap_or(true)
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
