#![forbid(unsafe_code)]

//! Info card placement.
//!
//! Placement works in window coordinates. The card is put on the requested
//! side of the target, then clamped into the screen so it never renders
//! off-screen when it fits; a card larger than the screen is pinned to the
//! screen's top-left corner on the overflowing axis.
//!
//! `Auto` prefers below the target and flips above when the card's bottom
//! edge would reach the screen's bottom edge.

use spotlight_core::{Point, Rect, Size};

use crate::model::CardPosition;

/// Default gap between target and card, in density-independent units.
pub const DEFAULT_CARD_MARGIN_DP: f32 = 32.0;

/// The side of the target the card ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardSide {
    Above,
    Below,
    Left,
    Right,
    Center,
}

/// Where the card goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub origin: Point,
    pub side: CardSide,
}

impl Placement {
    /// Card bounds for a card of `size` at this placement.
    pub fn bounds(&self, size: Size) -> Rect {
        Rect::new(self.origin.x, self.origin.y, size.width, size.height)
    }
}

/// Resolve `policy` to a concrete side.
pub fn resolve_side(card: Size, target: Rect, screen: Rect, policy: CardPosition, margin: f32) -> CardSide {
    match policy {
        CardPosition::Auto => {
            if target.bottom() + card.height + margin < screen.bottom() {
                CardSide::Below
            } else {
                CardSide::Above
            }
        }
        CardPosition::Above => CardSide::Above,
        CardPosition::Below => CardSide::Below,
        CardPosition::Left => CardSide::Left,
        CardPosition::Right => CardSide::Right,
        CardPosition::Center => CardSide::Center,
    }
}

/// Compute the card origin for `card` next to `target` within `screen`.
pub fn place(card: Size, target: Rect, screen: Rect, policy: CardPosition, margin: f32) -> Placement {
    let side = resolve_side(card, target, screen, policy, margin);
    let center = target.center();

    let (x, y) = match side {
        CardSide::Below => (
            center.x - card.width / 2.0,
            target.bottom() + margin,
        ),
        CardSide::Above => (
            center.x - card.width / 2.0,
            (target.top() - card.height - margin).max(screen.top()),
        ),
        CardSide::Left => (
            (target.left() - card.width - margin).max(screen.left()),
            center.y - card.height / 2.0,
        ),
        CardSide::Right => (
            // Available strip: max(0, screen.right - target.right - margin).
            target.right() + margin,
            center.y - card.height / 2.0,
        ),
        CardSide::Center => {
            let screen_center = screen.center();
            (
                screen_center.x - card.width / 2.0,
                screen_center.y - card.height / 2.0,
            )
        }
    };

    // Left already stops at the screen edge; no extra inset.
    let inset_x = if side == CardSide::Left { 0.0 } else { margin };
    Placement {
        origin: Point::new(
            clamp_axis(x, card.width, screen.left(), screen.right(), inset_x),
            clamp_axis(y, card.height, screen.top(), screen.bottom(), 0.0),
        ),
        side,
    }
}

/// Clamp `pos` so `[pos, pos + len]` lies in `[lo, hi]`, keeping `inset` from
/// both edges when there is room for it.
fn clamp_axis(pos: f32, len: f32, lo: f32, hi: f32, inset: f32) -> f32 {
    let span = hi - lo;
    if len >= span {
        return lo;
    }
    let inset = inset.min((span - len) / 2.0).max(0.0);
    pos.max(lo + inset).min(hi - len - inset)
}
