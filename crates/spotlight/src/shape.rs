#![forbid(unsafe_code)]

//! Cutout geometry.
//!
//! A [`Cutout`] describes the transparent hole punched in the overlay. It is
//! derived from the target bounds inflated by the highlight padding, then
//! scaled about its center by the current animation scale.

use spotlight_core::{Point, Rect};

use crate::model::ShapeKind;

/// Default corner radius for [`ShapeKind::RoundedRect`], in pixels.
pub const DEFAULT_CORNER_RADIUS: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutout {
    Circle { center: Point, radius: f32 },
    Rect { bounds: Rect },
    RoundedRect { bounds: Rect, corner_radius: f32 },
    /// Ellipse inscribed in `bounds`.
    Oval { bounds: Rect },
}

impl Cutout {
    /// Axis-aligned bounding box of the hole.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Self::Rect { bounds } | Self::RoundedRect { bounds, .. } | Self::Oval { bounds } => {
                bounds
            }
        }
    }

    /// Whether `point` lies inside the hole.
    pub fn contains(&self, point: Point) -> bool {
        match *self {
            Self::Circle { center, radius } => {
                let (dx, dy) = (point.x - center.x, point.y - center.y);
                dx * dx + dy * dy <= radius * radius
            }
            Self::Rect { bounds } => bounds.contains(point),
            Self::RoundedRect {
                bounds,
                corner_radius,
            } => {
                if !bounds.contains(point) {
                    return false;
                }
                // Distance to the nearest corner circle center.
                let cx = point
                    .x
                    .max(bounds.left() + corner_radius)
                    .min(bounds.right() - corner_radius);
                let cy = point
                    .y
                    .max(bounds.top() + corner_radius)
                    .min(bounds.bottom() - corner_radius);
                let (dx, dy) = (point.x - cx, point.y - cy);
                dx * dx + dy * dy <= corner_radius * corner_radius
            }
            Self::Oval { bounds } => {
                let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let c = bounds.center();
                let (nx, ny) = ((point.x - c.x) / rx, (point.y - c.y) / ry);
                nx * nx + ny * ny <= 1.0
            }
        }
    }
}

/// Cutout for `target`, inflated by `padding` and scaled about its center.
///
/// The circle's diameter is the larger side of the padded rectangle, so its
/// bounding box always covers the padded target. Scales below 1 are allowed
/// (breathing dips to 0.95) and shrink the hole accordingly.
pub fn cutout(target: Rect, shape: ShapeKind, padding: f32, scale: f32, corner_radius: f32) -> Cutout {
    let padded = target.inflate(padding);
    match shape {
        ShapeKind::Circle => Cutout::Circle {
            center: padded.center(),
            radius: padded.width.max(padded.height) / 2.0 * scale,
        },
        ShapeKind::Rectangle => Cutout::Rect {
            bounds: padded.scale_from_center(scale),
        },
        ShapeKind::RoundedRect => {
            let bounds = padded.scale_from_center(scale);
            let limit = (bounds.width.min(bounds.height) / 2.0).max(0.0);
            Cutout::RoundedRect {
                bounds,
                corner_radius: corner_radius.clamp(0.0, limit),
            }
        }
        ShapeKind::Oval => Cutout::Oval {
            bounds: padded.scale_from_center(scale),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_uses_larger_side() {
        let hole = cutout(Rect::new(10.0, 10.0, 40.0, 20.0), ShapeKind::Circle, 0.0, 1.0, 0.0);
        assert_eq!(
            hole,
            Cutout::Circle {
                center: Point::new(30.0, 20.0),
                radius: 20.0
            }
        );
        assert_eq!(hole.bounds(), Rect::new(10.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn padding_then_scale() {
        let hole = cutout(Rect::new(100.0, 100.0, 80.0, 40.0), ShapeKind::Rectangle, 10.0, 1.5, 0.0);
        // padded: 90,90 100x60 ; scaled 150x90 about (140,120)
        assert_eq!(hole.bounds(), Rect::new(65.0, 75.0, 150.0, 90.0));
    }

    #[test]
    fn rounded_radius_clamped_to_half_side() {
        let hole = cutout(Rect::new(0.0, 0.0, 100.0, 20.0), ShapeKind::RoundedRect, 0.0, 1.0, 24.0);
        let Cutout::RoundedRect { corner_radius, .. } = hole else {
            panic!("expected rounded rect, got {hole:?}");
        };
        assert_eq!(corner_radius, 10.0);
    }

    #[test]
    fn rounded_rect_excludes_corners() {
        let hole = cutout(Rect::new(0.0, 0.0, 100.0, 100.0), ShapeKind::RoundedRect, 0.0, 1.0, 24.0);
        assert!(hole.contains(Point::new(50.0, 50.0)));
        assert!(hole.contains(Point::new(50.0, 1.0)));
        assert!(!hole.contains(Point::new(1.0, 1.0)));
    }

    #[test]
    fn oval_contains_center_not_corner() {
        let hole = cutout(Rect::new(0.0, 0.0, 200.0, 100.0), ShapeKind::Oval, 0.0, 1.0, 0.0);
        assert!(hole.contains(Point::new(100.0, 50.0)));
        assert!(hole.contains(Point::new(199.0, 50.0)));
        assert!(!hole.contains(Point::new(2.0, 2.0)));
    }
}
