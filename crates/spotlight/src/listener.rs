#![forbid(unsafe_code)]

use std::rc::Rc;

use crate::model::Step;

/// Observer of tour progress. Every method defaults to a no-op.
///
/// Callbacks run after the sequencer has released its internal state, so a
/// listener may call back into the [`Spotlight`](crate::Spotlight) (for
/// example to dismiss it).
pub trait SpotlightListener {
    fn on_step_shown(&self, _index: usize, _step: &Step) {}

    fn on_step_dismissed(&self, _index: usize, _step: &Step) {}

    /// The Next button was pressed on step `index`.
    fn on_step_next(&self, _index: usize, _step: &Step) {}

    /// The Skip button was pressed on step `index`.
    fn on_step_skipped(&self, _index: usize, _step: &Step) {}

    /// The tour ended: all steps done, skipped, or dismissed.
    fn on_finished(&self) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl SpotlightListener for NoopListener {}

impl<T: SpotlightListener + ?Sized> SpotlightListener for Rc<T> {
    fn on_step_shown(&self, index: usize, step: &Step) {
        (**self).on_step_shown(index, step);
    }

    fn on_step_dismissed(&self, index: usize, step: &Step) {
        (**self).on_step_dismissed(index, step);
    }

    fn on_step_next(&self, index: usize, step: &Step) {
        (**self).on_step_next(index, step);
    }

    fn on_step_skipped(&self, index: usize, step: &Step) {
        (**self).on_step_skipped(index, step);
    }

    fn on_finished(&self) {
        (**self).on_finished();
    }
}
