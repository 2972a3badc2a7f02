//! Integer circle outline rasterizer
//!
//! Incremental error-accumulator walk over one octant, reflected eight ways.
//! Only integer additions and comparisons; cost is O(radius).

use embedded_graphics::prelude::Point;
use heapless::Vec;

/// Largest radius accepted (keeps the error term far from overflow)
pub const MAX_RADIUS: u32 = 1 << 20;

/// Iterator over the pixels of a circle outline
///
/// Each step of the octant walk yields up to eight reflected points. Points
/// that coincide within a step (on the axes and the diagonals) are yielded
/// once, so the whole outline contains no duplicates.
#[derive(Debug, Clone)]
pub struct CircleOutline {
    center: Point,
    diameter: i32,
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    err: i32,
    step: Vec<Point, 8>,
    cursor: usize,
}

/// Pixels of the circle outline around `center`
///
/// # Panics
///
/// If `radius` is zero or larger than [`MAX_RADIUS`].
pub fn outline_pixels(center: Point, radius: u32) -> CircleOutline {
    assert!(
        radius > 0 && radius <= MAX_RADIUS,
        "circle radius out of range"
    );
    let radius = radius as i32;
    let diameter = radius << 1;

    CircleOutline {
        center,
        diameter,
        x: radius - 1,
        y: 0,
        dx: 1,
        dy: 1,
        err: 1 - diameter,
        step: Vec::new(),
        cursor: 0,
    }
}

impl CircleOutline {
    /// Collect the reflections of the current octant point
    fn fill_step(&mut self) {
        let Point { x: cx, y: cy } = self.center;
        let (x, y) = (self.x, self.y);
        let reflections = [
            Point::new(cx + x, cy + y),
            Point::new(cx + y, cy + x),
            Point::new(cx - y, cy + x),
            Point::new(cx - x, cy + y),
            Point::new(cx - x, cy - y),
            Point::new(cx - y, cy - x),
            Point::new(cx + y, cy - x),
            Point::new(cx + x, cy - y),
        ];

        self.step.clear();
        self.cursor = 0;
        for point in reflections {
            if !self.step.contains(&point) {
                // Capacity is exactly eight
                let _ = self.step.push(point);
            }
        }
    }

    /// Move the octant pointers one step along the arc
    fn advance(&mut self) {
        if self.err <= 0 {
            self.y += 1;
            self.err += self.dy;
            self.dy += 2;
        }
        if self.err > 0 {
            self.x -= 1;
            self.dx += 2;
            self.err += self.dx - self.diameter;
        }
    }
}

impl Iterator for CircleOutline {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        loop {
            if let Some(point) = self.step.get(self.cursor) {
                self.cursor += 1;
                return Some(*point);
            }
            if self.x < self.y {
                return None;
            }
            self.fill_step();
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::vec::Vec as StdVec;

    fn relative(center: Point, radius: u32) -> StdVec<(i32, i32)> {
        outline_pixels(center, radius)
            .map(|p| (p.x - center.x, p.y - center.y))
            .collect()
    }

    #[test]
    fn test_radius_five() {
        let points = relative(Point::zero(), 5);
        assert_eq!(points.len(), 28);

        let set: HashSet<_> = points.iter().copied().collect();
        for expected in [(4, 0), (0, 4), (-4, 0), (0, -4), (4, 3), (3, 4), (-3, -4)] {
            assert!(set.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn test_radius_one_is_center() {
        let points: StdVec<_> = outline_pixels(Point::new(7, 9), 1).collect();
        assert_eq!(points, [Point::new(7, 9)]);
    }

    #[test]
    fn test_translated_by_center() {
        let at_origin = relative(Point::zero(), 12);
        let elsewhere = relative(Point::new(64, 32), 12);
        assert_eq!(at_origin, elsewhere);
    }

    #[test]
    #[should_panic]
    fn test_zero_radius_panics() {
        let _ = outline_pixels(Point::zero(), 0);
    }

    #[test]
    fn test_cost_is_linear() {
        // Never more than eight points per step and at most `radius` steps
        for radius in [10u32, 100, 1_000] {
            assert!(outline_pixels(Point::zero(), radius).count() <= 8 * radius as usize);
        }
    }

    proptest! {
        #[test]
        fn prop_outline_is_symmetric(radius in 1u32..300) {
            let points = relative(Point::zero(), radius);
            let set: HashSet<_> = points.iter().copied().collect();
            for &(a, b) in &set {
                for reflected in [(a, -b), (-a, b), (-a, -b), (b, a), (-b, a), (b, -a), (-b, -a)] {
                    prop_assert!(set.contains(&reflected));
                }
            }
        }

        #[test]
        fn prop_outline_has_no_duplicates(radius in 1u32..300) {
            let points = relative(Point::zero(), radius);
            let set: HashSet<_> = points.iter().copied().collect();
            prop_assert_eq!(set.len(), points.len());
        }

        #[test]
        fn prop_points_lie_near_radius(radius in 2i32..300) {
            for (a, b) in relative(Point::zero(), radius as u32) {
                let d2 = a * a + b * b;
                prop_assert!(d2 >= (radius - 2) * (radius - 2));
                prop_assert!(d2 <= (radius + 1) * (radius + 1));
            }
        }
    }
}
