#![forbid(unsafe_code)]

//! Target resolution: turn a [`TargetRef`] into on-screen bounds.
//!
//! Resolution is asynchronous. A target that is ready right away settles
//! synchronously; otherwise the resolver registers host listeners (and, for
//! list items, a bounded poll) and settles when the target becomes ready.
//!
//! # Invariants
//!
//! 1. The completion callback runs at most once.
//! 2. Every listener and timer registered for a resolution is released when
//!    it settles or is cancelled, exactly once.
//! 3. A list item that never appears fails at the timeout, never earlier and
//!    never later than one poll interval after it.
//!
//! Plain elements and tabs wait for their first layout without a timeout.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spotlight_core::Rect;
use spotlight_core::scheduler::{Scheduler, TaskId};

use crate::error::{Result, SpotlightError};
use crate::host::ListenerId;
use crate::model::{ElementRef, ListRef, TargetKind, TargetRef};

pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(40);

type ReadyFn = Box<dyn FnOnce(Result<Rect>)>;

enum Registration {
    Layout(ElementRef, ListenerId),
    List(ListRef, ListenerId),
    Timer(Rc<dyn Scheduler>, TaskId),
}

impl Registration {
    fn release(self) {
        match self {
            Self::Layout(element, id) => element.remove_layout_listener(id),
            Self::List(list, id) => list.remove_listener(id),
            Self::Timer(scheduler, id) => {
                scheduler.cancel(id);
            }
        }
    }
}

struct Pending {
    on_ready: Option<ReadyFn>,
    registrations: Vec<Registration>,
    settled: bool,
}

type Shared = Rc<RefCell<Pending>>;

/// Settle `pending` with `result` (or silently, for cancellation).
fn settle(pending: &Shared, result: Option<Result<Rect>>) {
    let (callback, registrations) = {
        let mut p = pending.borrow_mut();
        if p.settled {
            return;
        }
        p.settled = true;
        (p.on_ready.take(), std::mem::take(&mut p.registrations))
    };
    for registration in registrations {
        registration.release();
    }
    if let (Some(callback), Some(result)) = (callback, result) {
        callback(result);
    }
}

/// Track a registration, releasing it at once if already settled.
fn register(pending: &Shared, registration: Registration) {
    let mut p = pending.borrow_mut();
    if p.settled {
        drop(p);
        registration.release();
    } else {
        p.registrations.push(registration);
    }
}

/// An in-flight resolution. Dropping it cancels the resolution.
#[must_use = "dropping a Resolution cancels it"]
pub struct Resolution {
    pending: Shared,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Resolution {
    /// Release every registration without invoking the callback. Idempotent.
    pub fn cancel(&self) {
        settle(&self.pending, None);
    }

    pub fn is_settled(&self) -> bool {
        self.pending.try_borrow().map(|p| p.settled).unwrap_or(false)
    }
}

impl Drop for Resolution {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Resolves targets on a host scheduler.
#[derive(Clone)]
pub struct Resolver {
    scheduler: Rc<dyn Scheduler>,
    poll_interval: Duration,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the list poll interval (builder pattern). Zero is clamped to 1ms.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Resolve `target`, calling `on_ready` exactly once with its bounds or
    /// an error, unless the returned [`Resolution`] is cancelled first.
    ///
    /// `timeout` bounds the wait for list items only.
    pub fn resolve(
        &self,
        target: &TargetRef,
        timeout: Duration,
        on_ready: impl FnOnce(Result<Rect>) + 'static,
    ) -> Resolution {
        let pending = Rc::new(RefCell::new(Pending {
            on_ready: Some(Box::new(on_ready)),
            registrations: Vec::new(),
            settled: false,
        }));

        match target {
            TargetRef::Element(element) => await_element(&pending, element),
            TargetRef::TabItem { strip, index } => match strip.tab_at(*index) {
                Some(tab) => await_element(&pending, &tab),
                None => {
                    tracing::debug!(message = "spotlight.resolve.no_tab", index);
                    settle(
                        &pending,
                        Some(Err(SpotlightError::unavailable(
                            TargetKind::TabItem(*index),
                            Duration::ZERO,
                        ))),
                    );
                }
            },
            TargetRef::ListItem { list, index } => {
                self.await_list_item(&pending, list, *index, timeout);
            }
        }

        Resolution { pending }
    }

    fn await_list_item(&self, pending: &Shared, list: &ListRef, index: usize, timeout: Duration) {
        if !list.scroll_to(index) {
            tracing::debug!(message = "spotlight.resolve.scroll_refused", index);
        }

        let watch = Rc::new(ListWatch {
            list: Rc::downgrade(list),
            pending: Rc::downgrade(pending),
            scheduler: Rc::downgrade(&self.scheduler),
            index,
            started: self.scheduler.now(),
            timeout,
            poll_interval: self.poll_interval,
        });
        if watch.check() {
            return;
        }

        let on_child = Rc::clone(&watch);
        let child = list.on_child_attached(Box::new(move || {
            on_child.check();
        }));
        register(pending, Registration::List(Rc::clone(list), child));

        let on_layout = Rc::clone(&watch);
        let layout = list.on_layout(Box::new(move || {
            on_layout.check();
        }));
        register(pending, Registration::List(Rc::clone(list), layout));

        watch.schedule_poll();
    }
}

fn await_element(pending: &Shared, element: &ElementRef) {
    if element.is_ready() {
        settle(pending, Some(Ok(element.bounds())));
        return;
    }

    let (weak_pending, watched) = (Rc::downgrade(pending), Rc::downgrade(element));
    let id = element.on_layout(Box::new(move || {
        let (Some(pending), Some(element)) = (weak_pending.upgrade(), watched.upgrade()) else {
            return;
        };
        if element.is_ready() {
            settle(&pending, Some(Ok(element.bounds())));
        }
    }));
    register(pending, Registration::Layout(Rc::clone(element), id));
}

/// Waits for a list item to be realized and laid out.
struct ListWatch {
    list: Weak<dyn crate::host::RecycledList>,
    pending: Weak<RefCell<Pending>>,
    scheduler: Weak<dyn Scheduler>,
    index: usize,
    started: Duration,
    timeout: Duration,
    poll_interval: Duration,
}

impl ListWatch {
    /// Settle if the item is ready. Returns `true` once nothing is left to do.
    fn check(&self) -> bool {
        let (Some(pending), Some(list)) = (self.pending.upgrade(), self.list.upgrade()) else {
            return true;
        };
        if pending.borrow().settled {
            return true;
        }
        match list.item_at(self.index) {
            Some(item) if item.is_ready() => {
                settle(&pending, Some(Ok(item.bounds())));
                true
            }
            _ => false,
        }
    }

    fn schedule_poll(self: &Rc<Self>) {
        let (Some(scheduler), Some(pending)) = (self.scheduler.upgrade(), self.pending.upgrade())
        else {
            return;
        };
        let elapsed = scheduler.now().saturating_sub(self.started);
        let delay = self.poll_interval.min(self.timeout.saturating_sub(elapsed));
        let watch = Rc::clone(self);
        let id = scheduler.schedule(delay, Box::new(move || watch.poll()));
        register(&pending, Registration::Timer(scheduler, id));
    }

    fn poll(self: &Rc<Self>) {
        if self.check() {
            return;
        }
        let (Some(scheduler), Some(pending)) = (self.scheduler.upgrade(), self.pending.upgrade())
        else {
            return;
        };
        // The timer that got us here has fired; forget it.
        pending
            .borrow_mut()
            .registrations
            .retain(|r| !matches!(r, Registration::Timer(..)));

        let waited = scheduler.now().saturating_sub(self.started);
        if waited >= self.timeout {
            tracing::warn!(
                message = "spotlight.resolve.timeout",
                index = self.index,
                waited_ms = waited.as_millis() as u64
            );
            settle(
                &pending,
                Some(Err(SpotlightError::unavailable(
                    TargetKind::ListItem(self.index),
                    waited,
                ))),
            );
            return;
        }
        self.schedule_poll();
    }
}
