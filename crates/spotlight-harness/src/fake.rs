#![forbid(unsafe_code)]

//! In-memory host implementations.
//!
//! Fakes never invoke callbacks on registration; layout and attachment
//! events fire only when a test calls [`FakeElement::layout`],
//! [`FakeList::realize`], or [`FakeList::layout`]. Callbacks may remove
//! themselves while firing.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use spotlight::host::{Callback, Element, HostSurface, ListenerId, OverlayId, RecycledList, TabStrip};
use spotlight::{Canvas, ElementRef, Host, OverlayHandle};
use spotlight_core::scheduler::ManualScheduler;
use spotlight_core::{Rect, Size};

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

fn next_listener_id() -> ListenerId {
    ListenerId::new(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
}

type SharedCallback = Rc<RefCell<Callback>>;

/// A set of registered callbacks.
#[derive(Default)]
struct Listeners {
    entries: RefCell<Vec<(ListenerId, SharedCallback)>>,
}

impl Listeners {
    fn add(&self, callback: Callback) -> ListenerId {
        let id = next_listener_id();
        self.entries
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(callback))));
        id
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    fn fire(&self) {
        let snapshot: Vec<(ListenerId, SharedCallback)> = self.entries.borrow().clone();
        for (id, callback) in snapshot {
            // Skip callbacks removed by an earlier one in this pass.
            let live = self.entries.borrow().iter().any(|(existing, _)| *existing == id);
            if live && let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)();
            }
        }
    }
}

/// A fake UI element.
#[derive(Default)]
pub struct FakeElement {
    attached: Cell<bool>,
    bounds: Cell<Rect>,
    layout: Listeners,
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeElement")
            .field("attached", &self.attached.get())
            .field("bounds", &self.bounds.get())
            .field("listeners", &self.layout.len())
            .finish()
    }
}

impl FakeElement {
    /// An attached, laid-out element.
    pub fn new(bounds: Rect) -> Rc<Self> {
        Rc::new(Self {
            attached: Cell::new(true),
            bounds: Cell::new(bounds),
            layout: Listeners::default(),
        })
    }

    /// An element that is not in the tree yet.
    pub fn detached() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Attach with `bounds` and run a layout pass.
    pub fn attach(&self, bounds: Rect) {
        self.attached.set(true);
        self.bounds.set(bounds);
        self.layout();
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.set(attached);
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.bounds.set(bounds);
    }

    /// Fire layout listeners.
    pub fn layout(&self) {
        self.layout.fire();
    }

    pub fn listener_count(&self) -> usize {
        self.layout.len()
    }
}

impl Element for FakeElement {
    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn on_layout(&self, callback: Callback) -> ListenerId {
        self.layout.add(callback)
    }

    fn remove_layout_listener(&self, id: ListenerId) {
        self.layout.remove(id);
    }
}

/// A fake recycled list. Items exist only once realized.
pub struct FakeList {
    items: RefCell<BTreeMap<usize, Rc<FakeElement>>>,
    scrolls: RefCell<Vec<usize>>,
    accept_scroll: Cell<bool>,
    child_attached: Listeners,
    layout: Listeners,
}

impl std::fmt::Debug for FakeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeList")
            .field("realized", &self.items.borrow().keys().collect::<Vec<_>>())
            .field("scrolls", &self.scrolls.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl FakeList {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            items: RefCell::new(BTreeMap::new()),
            scrolls: RefCell::new(Vec::new()),
            accept_scroll: Cell::new(true),
            child_attached: Listeners::default(),
            layout: Listeners::default(),
        })
    }

    /// Make `scroll_to` report failure, as a list without a layout manager.
    pub fn refuse_scroll(&self) {
        self.accept_scroll.set(false);
    }

    /// Realize item `index` at `bounds` and fire child-attached listeners.
    pub fn realize(&self, index: usize, bounds: Rect) -> Rc<FakeElement> {
        let item = FakeElement::new(bounds);
        self.items.borrow_mut().insert(index, Rc::clone(&item));
        self.child_attached.fire();
        item
    }

    /// Realize item `index` without reporting it to listeners.
    pub fn realize_silently(&self, index: usize, bounds: Rect) -> Rc<FakeElement> {
        let item = FakeElement::new(bounds);
        self.items.borrow_mut().insert(index, Rc::clone(&item));
        item
    }

    /// Drop item `index` from the realized set.
    pub fn recycle(&self, index: usize) {
        if let Some(item) = self.items.borrow_mut().remove(&index) {
            item.set_attached(false);
        }
    }

    /// Fire layout listeners.
    pub fn layout(&self) {
        self.layout.fire();
    }

    /// Indices passed to `scroll_to`, in call order.
    pub fn scroll_requests(&self) -> Vec<usize> {
        self.scrolls.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.child_attached.len() + self.layout.len()
    }
}

impl RecycledList for FakeList {
    fn scroll_to(&self, index: usize) -> bool {
        self.scrolls.borrow_mut().push(index);
        self.accept_scroll.get()
    }

    fn item_at(&self, index: usize) -> Option<ElementRef> {
        let item = self.items.borrow().get(&index).cloned()?;
        Some(item)
    }

    fn on_child_attached(&self, callback: Callback) -> ListenerId {
        self.child_attached.add(callback)
    }

    fn on_layout(&self, callback: Callback) -> ListenerId {
        self.layout.add(callback)
    }

    fn remove_listener(&self, id: ListenerId) {
        if !self.child_attached.remove(id) {
            self.layout.remove(id);
        }
    }
}

/// A fake tab strip over fixed tabs.
#[derive(Debug, Default)]
pub struct FakeTabStrip {
    tabs: Vec<Rc<FakeElement>>,
}

impl FakeTabStrip {
    pub fn new(tabs: Vec<Rc<FakeElement>>) -> Rc<Self> {
        Rc::new(Self { tabs })
    }

    /// Evenly sized tabs laid out left to right inside `bounds`.
    pub fn evenly(bounds: Rect, count: usize) -> Rc<Self> {
        let width = bounds.width / count.max(1) as f32;
        let tabs = (0..count)
            .map(|i| {
                FakeElement::new(Rect::new(
                    bounds.x + width * i as f32,
                    bounds.y,
                    width,
                    bounds.height,
                ))
            })
            .collect();
        Self::new(tabs)
    }

    pub fn tab(&self, index: usize) -> Option<&Rc<FakeElement>> {
        self.tabs.get(index)
    }
}

impl TabStrip for FakeTabStrip {
    fn tab_at(&self, index: usize) -> Option<ElementRef> {
        let tab = self.tabs.get(index).cloned()?;
        Some(tab)
    }
}

/// Attach/detach history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Attached(OverlayId),
    Detached(OverlayId),
}

/// A fake top-level surface.
pub struct FakeSurface {
    bounds: Rect,
    density: f32,
    blur: bool,
    overlays: bool,
    card_size: Cell<Option<Size>>,
    attached: RefCell<Vec<(OverlayId, OverlayHandle)>>,
    events: RefCell<Vec<SurfaceEvent>>,
    next_id: Cell<u64>,
    peak: Cell<usize>,
}

impl std::fmt::Debug for FakeSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSurface")
            .field("bounds", &self.bounds)
            .field("attached", &self.attached_count())
            .field("events", &self.events.borrow())
            .finish_non_exhaustive()
    }
}

/// Card size reported by default, as if the host measured a typical card.
pub const DEFAULT_CARD_SIZE: Size = Size::new(280.0, 120.0);

impl FakeSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            density: 1.0,
            blur: false,
            overlays: true,
            card_size: Cell::new(Some(DEFAULT_CARD_SIZE)),
            attached: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            peak: Cell::new(0),
        }
    }

    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn with_blur(mut self, blur: bool) -> Self {
        self.blur = blur;
        self
    }

    /// A surface that cannot host overlays (no window, for instance).
    #[must_use]
    pub fn without_overlays(mut self) -> Self {
        self.overlays = false;
        self
    }

    /// Size reported by `card_size`; `None` means "not measured yet".
    pub fn set_card_size(&self, size: Option<Size>) {
        self.card_size.set(size);
    }

    pub fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }

    /// Largest number of overlays ever attached at once.
    pub fn peak_attached(&self) -> usize {
        self.peak.get()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    /// The most recently attached overlay still on screen.
    pub fn current(&self) -> Option<OverlayHandle> {
        self.attached
            .borrow()
            .last()
            .map(|(_, overlay)| overlay.clone())
    }

    /// Draw every attached overlay, bottom to top.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let overlays: Vec<OverlayHandle> = self
            .attached
            .borrow()
            .iter()
            .map(|(_, overlay)| overlay.clone())
            .collect();
        for overlay in overlays {
            overlay.render(canvas);
        }
    }
}

impl HostSurface for FakeSurface {
    fn supports_overlays(&self) -> bool {
        self.overlays
    }

    fn supports_blur(&self) -> bool {
        self.blur
    }

    fn density(&self) -> f32 {
        self.density
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn attach(&self, overlay: OverlayHandle) -> OverlayId {
        let id = OverlayId::new(self.next_id.get());
        self.next_id.set(id.get() + 1);
        let count = {
            let mut attached = self.attached.borrow_mut();
            attached.push((id, overlay));
            attached.len()
        };
        self.peak.set(self.peak.get().max(count));
        self.events.borrow_mut().push(SurfaceEvent::Attached(id));
        tracing::trace!(message = "harness.surface.attach", id = id.get(), count);
        id
    }

    fn detach(&self, id: OverlayId) {
        let removed = {
            let mut attached = self.attached.borrow_mut();
            let before = attached.len();
            attached.retain(|(existing, _)| *existing != id);
            attached.len() != before
        };
        if removed {
            self.events.borrow_mut().push(SurfaceEvent::Detached(id));
            tracing::trace!(message = "harness.surface.detach", id = id.get());
        }
    }

    fn card_size(&self, id: OverlayId) -> Option<Size> {
        let known = self.attached.borrow().iter().any(|(existing, _)| *existing == id);
        if known { self.card_size.get() } else { None }
    }
}

/// A fake surface plus the virtual-time scheduler driving it.
#[derive(Debug, Clone)]
pub struct TestHost {
    pub scheduler: Rc<ManualScheduler>,
    pub surface: Rc<FakeSurface>,
}

impl TestHost {
    /// A 1080x1920 portrait surface at density 1.
    pub fn new() -> Self {
        Self::with_surface(FakeSurface::new(Rect::new(0.0, 0.0, 1080.0, 1920.0)))
    }

    pub fn with_surface(surface: FakeSurface) -> Self {
        Self {
            scheduler: Rc::new(ManualScheduler::new()),
            surface: Rc::new(surface),
        }
    }

    /// Host ports for `Spotlight::builder`.
    pub fn host(&self) -> Host {
        Host::new(self.surface.clone(), self.scheduler.clone())
    }

    /// Advance virtual time.
    pub fn advance(&self, dt: Duration) {
        self.scheduler.advance(dt);
    }

    /// Advance by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_can_remove_themselves_while_firing() {
        let element = FakeElement::detached();
        let fired = Rc::new(Cell::new(0));
        let id_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let (count, slot, target) = (Rc::clone(&fired), Rc::clone(&id_slot), Rc::clone(&element));
        let id = element.on_layout(Box::new(move || {
            count.set(count.get() + 1);
            if let Some(id) = slot.get() {
                target.remove_layout_listener(id);
            }
        }));
        id_slot.set(Some(id));

        element.layout();
        element.layout();
        assert_eq!(fired.get(), 1);
        assert_eq!(element.listener_count(), 0);
    }

    #[test]
    fn list_removes_from_either_registry() {
        let list = FakeList::new();
        let a = list.on_child_attached(Box::new(|| {}));
        let b = list.on_layout(Box::new(|| {}));
        assert_ne!(a, b);
        assert_eq!(list.listener_count(), 2);
        list.remove_listener(b);
        list.remove_listener(a);
        assert_eq!(list.listener_count(), 0);
    }

    #[test]
    fn recycled_items_disappear() {
        let list = FakeList::new();
        list.realize(3, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(list.item_at(3).is_some_and(|item| item.is_ready()));
        list.recycle(3);
        assert!(list.item_at(3).is_none());
    }

    #[test]
    fn tabs_are_laid_out_evenly() {
        let strip = FakeTabStrip::evenly(Rect::new(0.0, 100.0, 300.0, 48.0), 3);
        let second = strip.tab_at(1).map(|tab| tab.bounds());
        assert_eq!(second, Some(Rect::new(100.0, 100.0, 100.0, 48.0)));
        assert!(strip.tab_at(3).is_none());
    }
}
