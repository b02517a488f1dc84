#![forbid(unsafe_code)]

//! Recorders for draw calls and tour events.

use std::cell::RefCell;
use std::rc::Rc;

use spotlight::{Canvas, Cutout, SpotlightListener, Step};
use spotlight_core::Rgba;

/// A recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    SetAlpha(f32),
    Blur(f32),
    Fill(Rgba),
    Clear(Cutout),
}

/// Canvas that records every call.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Every cutout cleared so far.
    pub fn clears(&self) -> Vec<Cutout> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Clear(cutout) => Some(*cutout),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(DrawOp::SetAlpha(alpha));
    }

    fn apply_blur(&mut self, radius: f32) {
        self.ops.push(DrawOp::Blur(radius));
    }

    fn fill(&mut self, color: Rgba) {
        self.ops.push(DrawOp::Fill(color));
    }

    fn clear(&mut self, cutout: &Cutout) {
        self.ops.push(DrawOp::Clear(*cutout));
    }
}

/// A recorded listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Shown(usize),
    Dismissed(usize),
    Next(usize),
    Skipped(usize),
    Finished,
}

type Hook = Box<dyn Fn(&ListenerEvent)>;

/// Listener that records events in order.
///
/// Pass a clone of the `Rc` to the builder and keep one to inspect:
///
/// ```ignore
/// let events = RecordingListener::new();
/// let tour = Spotlight::builder(host).listener(Rc::clone(&events)).build()?;
/// ```
#[derive(Default)]
pub struct RecordingListener {
    events: RefCell<Vec<ListenerEvent>>,
    titles: RefCell<Vec<String>>,
    hook: RefCell<Option<Hook>>,
}

impl std::fmt::Debug for RecordingListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingListener")
            .field("events", &self.events.borrow())
            .finish_non_exhaustive()
    }
}

impl RecordingListener {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.borrow().clone()
    }

    /// Titles of the steps reported as shown, in order.
    pub fn shown_titles(&self) -> Vec<String> {
        self.titles.borrow().clone()
    }

    pub fn count(&self, event: &ListenerEvent) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    /// Run `hook` after every recorded event. Use it to re-enter the tour.
    pub fn set_hook(&self, hook: impl Fn(&ListenerEvent) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    fn record(&self, event: ListenerEvent) {
        self.events.borrow_mut().push(event.clone());
        let hook = self.hook.borrow_mut().take();
        if let Some(hook) = hook {
            hook(&event);
            let mut slot = self.hook.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

impl SpotlightListener for RecordingListener {
    fn on_step_shown(&self, index: usize, step: &Step) {
        self.titles.borrow_mut().push(step.title().to_owned());
        self.record(ListenerEvent::Shown(index));
    }

    fn on_step_dismissed(&self, index: usize, _step: &Step) {
        self.record(ListenerEvent::Dismissed(index));
    }

    fn on_step_next(&self, index: usize, _step: &Step) {
        self.record(ListenerEvent::Next(index));
    }

    fn on_step_skipped(&self, index: usize, _step: &Step) {
        self.record(ListenerEvent::Skipped(index));
    }

    fn on_finished(&self) {
        self.record(ListenerEvent::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn hook_runs_once_per_event_and_survives() {
        let listener = RecordingListener::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        listener.set_hook(move |_| counter.set(counter.get() + 1));
        let step = Step::new(
            spotlight::TargetRef::element(crate::fake::FakeElement::new(spotlight_core::Rect::new(
                0.0, 0.0, 10.0, 10.0,
            ))),
            "title",
            "",
            spotlight::ShapeKind::Rectangle,
        );
        listener.on_step_next(0, &step);
        listener.on_finished();
        assert_eq!(calls.get(), 2);
        assert_eq!(
            listener.events(),
            vec![ListenerEvent::Next(0), ListenerEvent::Finished]
        );
        assert_eq!(listener.count(&ListenerEvent::Finished), 1);
    }

    #[test]
    fn canvas_collects_clears() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_alpha(1.0);
        canvas.fill(Rgba::BLACK);
        let hole = Cutout::Rect {
            bounds: spotlight_core::Rect::new(1.0, 2.0, 3.0, 4.0),
        };
        canvas.clear(&hole);
        assert_eq!(canvas.clears(), vec![hole]);
        assert_eq!(canvas.ops().len(), 3);
        canvas.reset();
        assert!(canvas.ops().is_empty());
    }
}
