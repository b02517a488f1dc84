#![forbid(unsafe_code)]

//! A fake sample screen: top tab strip, a product list, a submit button,
//! and a floating action button.

use std::rc::Rc;
use std::time::Duration;

use spotlight::{RecycledList, ShapeKind, Step, TargetRef};
use spotlight_core::Rect;
use spotlight_core::scheduler::Scheduler;
use spotlight_harness::{FakeElement, FakeList, FakeTabStrip, ManualScheduler};

pub const SCREEN: Rect = Rect::new(0.0, 0.0, 1080.0, 1920.0);

const TAB_STRIP: Rect = Rect::new(0.0, 0.0, 1080.0, 144.0);
const LIST_TOP: f32 = 160.0;
const ROW_HEIGHT: f32 = 220.0;
/// Rows 0..VISIBLE_ROWS are on screen before any scrolling.
const VISIBLE_ROWS: usize = 3;
/// Time the list takes to settle after a scroll request.
const SCROLL_SETTLE: Duration = Duration::from_millis(120);

pub struct SampleApp {
    pub fab: Rc<FakeElement>,
    pub tabs: Rc<FakeTabStrip>,
    pub list: Rc<FakeList>,
    pub submit: Rc<FakeElement>,
    scrolling_to: Option<usize>,
}

impl SampleApp {
    pub fn new() -> Self {
        let list = FakeList::new();
        for index in 0..VISIBLE_ROWS {
            list.realize_silently(index, row_bounds(index, 0));
        }
        Self {
            fab: FakeElement::new(Rect::new(888.0, 1536.0, 144.0, 144.0)),
            tabs: FakeTabStrip::evenly(TAB_STRIP, 2),
            list,
            submit: FakeElement::new(Rect::new(80.0, 1736.0, 920.0, 132.0)),
            scrolling_to: None,
        }
    }

    /// The five-step walkthrough.
    pub fn steps(&self) -> Vec<Step> {
        vec![
            Step::new(
                TargetRef::element(self.fab.clone()),
                "Create",
                "Tap here to add a new item to your list.",
                ShapeKind::Circle,
            ),
            Step::new(
                TargetRef::tab(self.tabs.clone(), 0),
                "Products",
                "Browse everything in the catalog from this tab.",
                ShapeKind::Rectangle,
            ),
            Step::new(
                TargetRef::list_item(self.list.clone(), 4),
                "Item details",
                "Each row shows price and stock at a glance.",
                ShapeKind::Rectangle,
            ),
            Step::new(
                TargetRef::tab(self.tabs.clone(), 1),
                "Favorites",
                "Items you star end up here.",
                ShapeKind::RoundedRect,
            ),
            Step::new(
                TargetRef::element(self.submit.clone()),
                "Submit",
                "Send your order when you are done.",
                ShapeKind::RoundedRect,
            ),
        ]
    }

    /// React to scroll requests the way a real list would: scroll, then
    /// realize the requested row a little later.
    pub fn pump(&mut self, scheduler: &Rc<ManualScheduler>) {
        let Some(&index) = self.list.scroll_requests().last() else {
            return;
        };
        if self.scrolling_to == Some(index) || self.list.item_at(index).is_some() {
            return;
        }
        self.scrolling_to = Some(index);
        let first_visible = index.saturating_sub(1);
        for row in 0..VISIBLE_ROWS {
            self.list.recycle(row);
        }
        let list = Rc::clone(&self.list);
        scheduler.schedule(
            SCROLL_SETTLE,
            Box::new(move || {
                for row in first_visible..first_visible + VISIBLE_ROWS {
                    list.realize(row, row_bounds(row, first_visible));
                }
                list.layout();
            }),
        );
    }
}

fn row_bounds(index: usize, first_visible: usize) -> Rect {
    let offset = index.saturating_sub(first_visible) as f32;
    Rect::new(24.0, LIST_TOP + offset * ROW_HEIGHT, 1032.0, ROW_HEIGHT - 16.0)
}
