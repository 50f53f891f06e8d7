//! Geometry for drag and resize gestures.
//!
//! Every function here is pure: the result depends only on the arguments,
//! which are always measured from the state captured at gesture start. The
//! viewport is the containment rectangle `[0, 0] .. viewport`.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compass direction of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// All handle directions, clockwise from north-west.
    pub const ALL: [Direction; 8] = [
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
    ];

    pub fn has_north(self) -> bool {
        matches!(self, Direction::N | Direction::NE | Direction::NW)
    }

    pub fn has_south(self) -> bool {
        matches!(self, Direction::S | Direction::SE | Direction::SW)
    }

    pub fn has_east(self) -> bool {
        matches!(self, Direction::E | Direction::NE | Direction::SE)
    }

    pub fn has_west(self) -> bool {
        matches!(self, Direction::W | Direction::NW | Direction::SW)
    }

    /// Whether the handle moves a vertical edge.
    pub fn is_horizontal(self) -> bool {
        self.has_east() || self.has_west()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::NE => "ne",
            Direction::E => "e",
            Direction::SE => "se",
            Direction::S => "s",
            Direction::SW => "sw",
            Direction::W => "w",
            Direction::NW => "nw",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|dir| dir.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown handle direction '{}'", s))
    }
}

/// Position and size of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub position: Point,
    pub size: Size,
}

impl Frame {
    pub fn new(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Whether the frame lies entirely inside `[0, 0] .. viewport`.
    pub fn is_within(&self, viewport: Size) -> bool {
        const EPS: f64 = 1e-9;
        self.position.x >= -EPS
            && self.position.y >= -EPS
            && self.position.x + self.size.width <= viewport.width + EPS
            && self.position.y + self.size.height <= viewport.height + EPS
    }
}

/// Everything a resize needs, captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    /// Frame at gesture start.
    pub start: Frame,
    /// Active handle.
    pub direction: Direction,
    /// Minimum size of the object's kind.
    pub min_size: Size,
    /// Width / height ratio to preserve; `None` for free resizing.
    pub aspect_ratio: Option<f64>,
}

/// Clamp a top-left corner so an object of `size` stays inside the viewport.
pub fn clamp_position(position: Point, size: Size, viewport: Size) -> Point {
    Point::new(
        position.x.clamp(0.0, (viewport.width - size.width).max(0.0)),
        position.y.clamp(0.0, (viewport.height - size.height).max(0.0)),
    )
}

/// New position after dragging by `delta` from `start`.
pub fn drag(start: Point, size: Size, delta: Vec2, viewport: Size) -> Point {
    clamp_position(start + delta, size, viewport)
}

/// New frame after dragging the `params.direction` handle by `delta`.
///
/// The edge opposite the handle stays anchored. When the result would leave
/// the viewport, free resizes are clamped per axis and aspect-locked resizes
/// are scaled down uniformly.
pub fn resize(params: &ResizeParams, delta: Vec2, viewport: Size) -> Frame {
    let ResizeParams {
        start,
        direction,
        min_size,
        aspect_ratio,
    } = *params;

    let right = start.position.x + start.size.width;
    let bottom = start.position.y + start.size.height;

    let mut size = match aspect_ratio {
        Some(ratio) => locked_size(start.size, direction, delta, min_size, ratio),
        None => free_size(start.size, direction, delta, min_size),
    };

    // Room between the anchored edge and the viewport boundary it grows toward.
    let room_w = if direction.has_west() {
        right
    } else {
        viewport.width - start.position.x
    };
    let room_h = if direction.has_north() {
        bottom
    } else {
        viewport.height - start.position.y
    };
    let room = Size::new(
        room_w.clamp(0.0, viewport.width.max(0.0)),
        room_h.clamp(0.0, viewport.height.max(0.0)),
    );

    size = match aspect_ratio {
        Some(_) => scale_into(size, room),
        None => Size::new(size.width.min(room.width), size.height.min(room.height)),
    };

    let x = if direction.has_west() {
        right - size.width
    } else {
        start.position.x
    };
    let y = if direction.has_north() {
        bottom - size.height
    } else {
        start.position.y
    };

    Frame::new(clamp_position(Point::new(x, y), size, viewport), size)
}

/// Bring an arbitrary frame back inside the viewport.
///
/// Sizes are floored at `min_size`, then shrunk to fit the viewport, then the
/// position is clamped. When `aspect_locked`, both steps scale uniformly so
/// the width over height ratio survives.
pub fn contain(frame: Frame, min_size: Size, aspect_locked: bool, viewport: Size) -> Frame {
    let bounds = Size::new(viewport.width.max(0.0), viewport.height.max(0.0));
    let size = if aspect_locked {
        scale_into(floor_uniform(frame.size, min_size), bounds)
    } else {
        Size::new(
            frame.size.width.max(min_size.width).min(bounds.width),
            frame.size.height.max(min_size.height).min(bounds.height),
        )
    };
    Frame::new(clamp_position(frame.position, size, viewport), size)
}

/// Grow `size` by a single factor until both axes reach `min_size`.
fn floor_uniform(size: Size, min_size: Size) -> Size {
    if size.width <= 0.0 || size.height <= 0.0 {
        return Size::new(size.width.max(min_size.width), size.height.max(min_size.height));
    }
    let k = 1f64
        .max(min_size.width / size.width)
        .max(min_size.height / size.height);
    Size::new(size.width * k, size.height * k)
}

/// Top-left corner that centers `size` in the viewport.
pub fn centered(size: Size, viewport: Size) -> Point {
    clamp_position(
        Point::new(
            (viewport.width - size.width) / 2.0,
            (viewport.height - size.height) / 2.0,
        ),
        size,
        viewport,
    )
}

fn locked_size(start: Size, direction: Direction, delta: Vec2, min: Size, ratio: f64) -> Size {
    let ratio = ratio.max(f64::EPSILON);
    // Floors that keep both axes above the minimum once the other is derived.
    let min_w = min.width.max(min.height * ratio);
    let min_h = min.height.max(min.width / ratio);

    if direction.is_horizontal() {
        let width = if direction.has_east() {
            start.width + delta.x
        } else {
            start.width - delta.x
        };
        let width = width.max(min_w);
        Size::new(width, width / ratio)
    } else {
        let height = if direction.has_south() {
            start.height + delta.y
        } else {
            start.height - delta.y
        };
        let height = height.max(min_h);
        Size::new(height * ratio, height)
    }
}

fn free_size(start: Size, direction: Direction, delta: Vec2, min: Size) -> Size {
    let width = if direction.has_east() {
        start.width + delta.x
    } else if direction.has_west() {
        start.width - delta.x
    } else {
        start.width
    };
    let height = if direction.has_south() {
        start.height + delta.y
    } else if direction.has_north() {
        start.height - delta.y
    } else {
        start.height
    };
    Size::new(width.max(min.width), height.max(min.height))
}

fn scale_into(size: Size, room: Size) -> Size {
    if size.width <= 0.0 || size.height <= 0.0 {
        return Size::new(size.width.min(room.width), size.height.min(room.height));
    }
    let k = (room.width / size.width).min(room.height / size.height).min(1.0);
    Size::new(size.width * k, size.height * k)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1000.0, 800.0);

    fn params(x: f64, y: f64, w: f64, h: f64, direction: Direction, min: Size, aspect: Option<f64>) -> ResizeParams {
        ResizeParams {
            start: Frame::new(Point::new(x, y), Size::new(w, h)),
            direction,
            min_size: min,
            aspect_ratio: aspect,
        }
    }

    #[test]
    fn test_drag_applies_delta() {
        let pos = drag(Point::new(400.0, 300.0), Size::new(200.0, 200.0), Vec2::new(50.0, 50.0), VIEWPORT);
        assert_eq!(pos, Point::new(450.0, 350.0));
    }

    #[test]
    fn test_drag_clamps_each_axis() {
        let size = Size::new(200.0, 200.0);
        let pos = drag(Point::new(400.0, 300.0), size, Vec2::new(900.0, -900.0), VIEWPORT);
        assert_eq!(pos, Point::new(800.0, 0.0));

        let pos = drag(Point::new(400.0, 300.0), size, Vec2::new(-900.0, 900.0), VIEWPORT);
        assert_eq!(pos, Point::new(0.0, 600.0));
    }

    #[test]
    fn test_drag_object_larger_than_viewport() {
        let pos = drag(Point::new(10.0, 10.0), Size::new(2000.0, 50.0), Vec2::new(30.0, 0.0), VIEWPORT);
        assert_eq!(pos.x, 0.0);
    }

    #[test]
    fn test_free_resize_southeast() {
        let p = params(400.0, 300.0, 200.0, 200.0, Direction::SE, Size::new(100.0, 100.0), None);
        let frame = resize(&p, Vec2::new(80.0, 40.0), VIEWPORT);
        assert_eq!(frame.size, Size::new(280.0, 240.0));
        assert_eq!(frame.position, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_free_resize_floors_at_minimum() {
        let p = params(400.0, 300.0, 200.0, 200.0, Direction::SE, Size::new(100.0, 100.0), None);
        let frame = resize(&p, Vec2::new(-500.0, -150.0), VIEWPORT);
        assert_eq!(frame.size, Size::new(100.0, 100.0));
    }

    #[test]
    fn test_free_resize_single_edge_keeps_other_axis() {
        let p = params(100.0, 100.0, 200.0, 150.0, Direction::S, Size::new(100.0, 100.0), None);
        let frame = resize(&p, Vec2::new(500.0, 30.0), VIEWPORT);
        assert_eq!(frame.size, Size::new(200.0, 180.0));
    }

    #[test]
    fn test_west_and_north_keep_opposite_edge() {
        let p = params(300.0, 300.0, 200.0, 200.0, Direction::NW, Size::new(100.0, 100.0), None);
        let frame = resize(&p, Vec2::new(-50.0, -20.0), VIEWPORT);
        assert_eq!(frame.size, Size::new(250.0, 220.0));
        assert_eq!(frame.position, Point::new(250.0, 280.0));
        let bounds = frame.bounds();
        assert!((bounds.x1 - 500.0).abs() < 1e-9);
        assert!((bounds.y1 - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_west_resize_stops_at_left_edge() {
        let p = params(10.0, 100.0, 985.0, 200.0, Direction::W, Size::new(100.0, 100.0), None);
        let frame = resize(&p, Vec2::new(-100.0, 0.0), VIEWPORT);
        assert_eq!(frame.position.x, 0.0);
        assert!((frame.size.width - 995.0).abs() < 1e-9);
        assert!(frame.is_within(VIEWPORT));
    }

    #[test]
    fn test_locked_east_derives_height() {
        let ratio = 16.0 / 9.0;
        let p = params(100.0, 100.0, 320.0, 180.0, Direction::E, Size::new(280.0, 157.0), Some(ratio));
        let frame = resize(&p, Vec2::new(80.0, 999.0), VIEWPORT);
        assert!((frame.size.width - 400.0).abs() < 1e-9);
        assert!((frame.size.height - 400.0 / ratio).abs() < 1e-9);
        assert_eq!(frame.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_locked_west_derives_height_and_anchors_right() {
        let ratio = 2.0;
        let p = params(500.0, 100.0, 200.0, 100.0, Direction::W, Size::new(50.0, 50.0), Some(ratio));
        let frame = resize(&p, Vec2::new(-60.0, 0.0), VIEWPORT);
        assert!((frame.size.width - 260.0).abs() < 1e-9);
        assert!((frame.size.height - 130.0).abs() < 1e-9);
        assert!((frame.position.x - 440.0).abs() < 1e-9);
        assert_eq!(frame.position.y, 100.0);
    }

    #[test]
    fn test_locked_north_derives_width() {
        let p = params(100.0, 400.0, 200.0, 100.0, Direction::N, Size::new(50.0, 50.0), Some(2.0));
        let frame = resize(&p, Vec2::new(0.0, -50.0), VIEWPORT);
        assert!((frame.size.height - 150.0).abs() < 1e-9);
        assert!((frame.size.width - 300.0).abs() < 1e-9);
        assert!((frame.position.y - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_corner_width_has_priority() {
        let p = params(100.0, 100.0, 200.0, 100.0, Direction::SE, Size::new(50.0, 50.0), Some(2.0));
        let frame = resize(&p, Vec2::new(20.0, 300.0), VIEWPORT);
        assert!((frame.size.width - 220.0).abs() < 1e-9);
        assert!((frame.size.height - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_minimum_respects_both_axes() {
        // Very wide image: height would drop below 50 if width alone were floored.
        let p = params(0.0, 0.0, 400.0, 100.0, Direction::E, Size::new(50.0, 50.0), Some(4.0));
        let frame = resize(&p, Vec2::new(-1000.0, 0.0), VIEWPORT);
        assert!((frame.size.height - 50.0).abs() < 1e-9);
        assert!((frame.size.width - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_resize_scales_into_viewport() {
        let p = params(600.0, 500.0, 200.0, 100.0, Direction::SE, Size::new(50.0, 50.0), Some(2.0));
        let frame = resize(&p, Vec2::new(1000.0, 0.0), VIEWPORT);
        assert!(frame.is_within(VIEWPORT));
        assert!((frame.size.width / frame.size.height - 2.0).abs() < 1e-9);
        assert!((frame.size.width - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_always_within_viewport() {
        let deltas = [-700.0, -120.0, -3.5, 0.0, 45.0, 333.0, 1500.0];
        let starts = [(0.0, 0.0), (120.0, 640.0), (700.0, 50.0), (890.0, 690.0)];
        for &(x, y) in &starts {
            for direction in Direction::ALL {
                for aspect in [None, Some(16.0 / 9.0), Some(0.5)] {
                    for &dx in &deltas {
                        for &dy in &deltas {
                            let p = params(x, y, 110.0, 110.0, direction, Size::new(50.0, 50.0), aspect);
                            let frame = resize(&p, Vec2::new(dx, dy), VIEWPORT);
                            assert!(
                                frame.is_within(VIEWPORT),
                                "{:?} {:?} ({}, {}) -> {:?}",
                                direction,
                                aspect,
                                dx,
                                dy,
                                frame
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_resize_is_deterministic() {
        let p = params(120.0, 80.0, 300.0, 200.0, Direction::SW, Size::new(50.0, 50.0), Some(1.5));
        let a = resize(&p, Vec2::new(-37.25, 12.5), VIEWPORT);
        let b = resize(&p, Vec2::new(-37.25, 12.5), VIEWPORT);
        assert_eq!(a, b);
    }

    #[test]
    fn test_contain_shrinks_to_new_viewport() {
        let frame = Frame::new(Point::new(700.0, 500.0), Size::new(400.0, 300.0));
        let small = Size::new(600.0, 400.0);

        let free = contain(frame, Size::new(100.0, 100.0), false, small);
        assert!(free.is_within(small));
        assert_eq!(free.size, Size::new(400.0, 300.0));
        assert_eq!(free.position, Point::new(200.0, 100.0));

        let locked = contain(Frame::new(Point::ZERO, Size::new(800.0, 400.0)), Size::new(50.0, 50.0), true, small);
        assert!((locked.size.width - 600.0).abs() < 1e-9);
        assert!((locked.size.height - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_contain_floors_locked_size_uniformly() {
        let wide = Frame::new(Point::new(100.0, 100.0), Size::new(200.0, 20.0));
        let floored = contain(wide, Size::new(50.0, 50.0), true, VIEWPORT);
        assert!((floored.size.width - 500.0).abs() < 1e-9);
        assert!((floored.size.height - 50.0).abs() < 1e-9);

        // Flooring and fitting together still keep the ratio.
        let narrow = contain(wide, Size::new(50.0, 50.0), true, Size::new(300.0, 400.0));
        assert!((narrow.size.width / narrow.size.height - 10.0).abs() < 1e-9);
        assert!((narrow.size.width - 300.0).abs() < 1e-9);

        let free = contain(wide, Size::new(50.0, 50.0), false, VIEWPORT);
        assert_eq!(free.size, Size::new(200.0, 50.0));
    }

    #[test]
    fn test_centered() {
        assert_eq!(centered(Size::new(200.0, 200.0), VIEWPORT), Point::new(400.0, 300.0));
        assert_eq!(centered(Size::new(2000.0, 200.0), VIEWPORT), Point::new(0.0, 300.0));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("se".parse::<Direction>(), Ok(Direction::SE));
        assert_eq!("NW".parse::<Direction>(), Ok(Direction::NW));
        assert!("up".parse::<Direction>().is_err());
        assert!(Direction::SE.has_east() && Direction::SE.has_south());
        assert!(!Direction::N.is_horizontal());
    }
}
