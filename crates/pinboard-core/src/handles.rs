//! Hit regions on a placed object: the drag header and the resize handles.

use crate::geometry::Direction;
use kurbo::{Point, Rect};

/// Side length of a square resize handle.
pub const HANDLE_SIZE: f64 = 12.0;

/// Height of the drag header strip along the top edge.
pub const HEADER_HEIGHT: f64 = 40.0;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A resize handle; starts a resize.
    Handle(Direction),
    /// The header strip; starts a drag.
    Header,
    /// Content area; no gesture.
    Body,
}

/// A resize handle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub direction: Direction,
    pub rect: Rect,
}

impl Handle {
    pub fn hit_test(&self, point: Point) -> bool {
        self.rect.contains(point)
    }
}

/// The eight resize handles, drawn inside the object's bounds.
pub fn handles(bounds: Rect) -> Vec<Handle> {
    let half = HANDLE_SIZE / 2.0;
    let center = bounds.center();
    let left = bounds.x0;
    let right = bounds.x1 - HANDLE_SIZE;
    let top = bounds.y0;
    let bottom = bounds.y1 - HANDLE_SIZE;

    Direction::ALL
        .into_iter()
        .map(|direction| {
            let x = if direction.has_west() {
                left
            } else if direction.has_east() {
                right
            } else {
                center.x - half
            };
            let y = if direction.has_north() {
                top
            } else if direction.has_south() {
                bottom
            } else {
                center.y - half
            };
            Handle {
                direction,
                rect: Rect::new(x, y, x + HANDLE_SIZE, y + HANDLE_SIZE),
            }
        })
        .collect()
}

/// The header strip of an object.
pub fn header(bounds: Rect) -> Rect {
    Rect::new(bounds.x0, bounds.y0, bounds.x1, (bounds.y0 + HEADER_HEIGHT).min(bounds.y1))
}

/// Classify a point against an object's bounds. Handles win over the header.
pub fn hit_test(bounds: Rect, point: Point) -> Option<HitTarget> {
    if !bounds.contains(point) {
        return None;
    }
    if let Some(handle) = handles(bounds).into_iter().find(|h| h.hit_test(point)) {
        return Some(HitTarget::Handle(handle.direction));
    }
    if header(bounds).contains(point) {
        return Some(HitTarget::Header);
    }
    Some(HitTarget::Body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rect {
        Rect::new(100.0, 100.0, 300.0, 300.0)
    }

    #[test]
    fn test_eight_handles() {
        let all = handles(bounds());
        assert_eq!(all.len(), 8);
        for handle in &all {
            assert!((handle.rect.width() - HANDLE_SIZE).abs() < f64::EPSILON);
            assert!(bounds().contains(handle.rect.origin()));
        }
    }

    #[test]
    fn test_corner_hits() {
        assert_eq!(hit_test(bounds(), Point::new(101.0, 101.0)), Some(HitTarget::Handle(Direction::NW)));
        assert_eq!(hit_test(bounds(), Point::new(299.0, 299.0)), Some(HitTarget::Handle(Direction::SE)));
        assert_eq!(hit_test(bounds(), Point::new(295.0, 105.0)), Some(HitTarget::Handle(Direction::NE)));
    }

    #[test]
    fn test_edge_hits() {
        assert_eq!(hit_test(bounds(), Point::new(200.0, 102.0)), Some(HitTarget::Handle(Direction::N)));
        assert_eq!(hit_test(bounds(), Point::new(105.0, 200.0)), Some(HitTarget::Handle(Direction::W)));
        assert_eq!(hit_test(bounds(), Point::new(295.0, 200.0)), Some(HitTarget::Handle(Direction::E)));
        assert_eq!(hit_test(bounds(), Point::new(200.0, 298.0)), Some(HitTarget::Handle(Direction::S)));
    }

    #[test]
    fn test_header_and_body() {
        assert_eq!(hit_test(bounds(), Point::new(150.0, 120.0)), Some(HitTarget::Header));
        assert_eq!(hit_test(bounds(), Point::new(150.0, 250.0)), Some(HitTarget::Body));
        assert_eq!(hit_test(bounds(), Point::new(50.0, 50.0)), None);
    }
}
