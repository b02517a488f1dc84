#![forbid(unsafe_code)]

//! Host ports.
//!
//! The engine never touches a UI toolkit directly. Hosts implement these
//! traits over their own element tree and hand them to the builder together
//! with a [`Scheduler`].
//!
//! # Callback rules
//!
//! - Registration methods (`on_layout`, `on_child_attached`) must not invoke
//!   the callback synchronously.
//! - Removing a listener from inside its own callback must be allowed.
//! - All calls happen on the thread that owns the host.

use std::fmt;
use std::rc::Rc;

use spotlight_core::scheduler::Scheduler;
use spotlight_core::{Rect, Rgba, Size};

use crate::model::ElementRef;
use crate::overlay::OverlayHandle;
use crate::shape::Cutout;

/// A host callback fired on layout or attachment changes.
pub type Callback = Box<dyn FnMut()>;

/// Identifier for a listener registered on a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifier for an overlay attached to a [`HostSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A host UI element that can be highlighted.
pub trait Element {
    /// Whether the element is currently part of the live tree.
    fn is_attached(&self) -> bool;

    /// Window-space bounds. The size is the element's measured size.
    fn bounds(&self) -> Rect;

    /// Register a callback for every layout pass of this element.
    fn on_layout(&self, callback: Callback) -> ListenerId;

    fn remove_layout_listener(&self, id: ListenerId);

    /// Attached with a non-zero measured size.
    fn is_ready(&self) -> bool {
        self.is_attached() && !self.bounds().is_empty()
    }
}

/// A virtualized list that only realizes visible items.
pub trait RecycledList {
    /// Request a scroll so `index` becomes visible. Returns `false` when the
    /// list refuses (no layout manager, index out of range).
    fn scroll_to(&self, index: usize) -> bool;

    /// The realized element for `index`, if currently present.
    fn item_at(&self, index: usize) -> Option<ElementRef>;

    /// Register a callback for every child view attached to the list.
    fn on_child_attached(&self, callback: Callback) -> ListenerId;

    /// Register a callback for every layout pass of the list.
    fn on_layout(&self, callback: Callback) -> ListenerId;

    /// Remove a listener registered with either method above.
    fn remove_listener(&self, id: ListenerId);
}

/// A tab strip whose individual tabs can be highlighted.
pub trait TabStrip {
    fn tab_at(&self, index: usize) -> Option<ElementRef>;
}

/// The top-level surface overlays are attached to.
pub trait HostSurface {
    /// Whether this surface can host overlay nodes at all.
    fn supports_overlays(&self) -> bool {
        true
    }

    /// Whether the surface can blur what is behind an overlay.
    fn supports_blur(&self) -> bool {
        false
    }

    /// Pixels per density-independent unit.
    fn density(&self) -> f32 {
        1.0
    }

    /// Window-space bounds of the surface.
    fn bounds(&self) -> Rect;

    /// Attach an overlay on top of all content, covering the whole surface.
    fn attach(&self, overlay: OverlayHandle) -> OverlayId;

    /// Remove an attached overlay. Unknown ids are ignored.
    fn detach(&self, id: OverlayId);

    /// Measured size of the overlay's info card, once the host has laid it
    /// out. Returns `None` until then.
    fn card_size(&self, id: OverlayId) -> Option<Size>;
}

/// Drawing operations used by the highlight renderer.
pub trait Canvas {
    /// Opacity applied to everything drawn after this call.
    fn set_alpha(&mut self, alpha: f32);

    /// Blur what lies behind the overlay.
    fn apply_blur(&mut self, radius: f32);

    /// Fill the whole overlay with `color`.
    fn fill(&mut self, color: Rgba);

    /// Punch a fully transparent hole in what has been filled.
    fn clear(&mut self, cutout: &Cutout);
}

/// A host context: the surface plus the scheduler driving it.
#[derive(Clone)]
pub struct Host {
    pub surface: Rc<dyn HostSurface>,
    pub scheduler: Rc<dyn Scheduler>,
}

impl Host {
    pub fn new(surface: Rc<dyn HostSurface>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self { surface, scheduler }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("bounds", &self.surface.bounds())
            .field("density", &self.surface.density())
            .finish_non_exhaustive()
    }
}
