// Copyright 2025 the Quadtree Index Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Rect;

/// Overlaps of at most this much in either axis are treated as floating-point
/// noise and reported as non-intersections.
pub(crate) const INTERSECT_TOLERANCE: f64 = 1e-7;

pub(crate) fn is_finite_rect(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

/// Tolerance-aware intersection test.
///
/// Rectangles that merely touch at an edge do not intersect, and neither do
/// rectangles whose overlap is within [`INTERSECT_TOLERANCE`] in either axis.
/// The test is written edge-against-opposite-edge so that degenerate
/// rectangles (zero width or height) still intersect rectangles that properly
/// straddle them.
pub(crate) fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x1 > b.x0 + INTERSECT_TOLERANCE
        && b.x1 > a.x0 + INTERSECT_TOLERANCE
        && a.y1 > b.y0 + INTERSECT_TOLERANCE
        && b.y1 > a.y0 + INTERSECT_TOLERANCE
}

/// Whether `outer` fully contains `inner`, edges included. No tolerance.
pub(crate) fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Whether all four coordinates of the rectangles agree within
/// [`INTERSECT_TOLERANCE`].
pub(crate) fn rects_approx_equal(a: Rect, b: Rect) -> bool {
    approx_eq(a.x0, b.x0) && approx_eq(a.y0, b.y0) && approx_eq(a.x1, b.x1) && approx_eq(a.y1, b.y1)
}

// Written without `abs` so it stays core-only under no_std.
fn approx_eq(a: f64, b: f64) -> bool {
    let d = a - b;
    (-INTERSECT_TOLERANCE..=INTERSECT_TOLERANCE).contains(&d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_intersect(a, b), "shared edge must not intersect");
        assert!(!rects_intersect(b, a), "shared edge must not intersect");
    }

    #[test]
    fn overlap_below_tolerance_does_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0 - 1e-8, 0.0, 20.0, 10.0);
        assert!(!rects_intersect(a, b), "1e-8 overlap is noise");
    }

    #[test]
    fn overlap_above_tolerance_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0 - 1e-6, 0.0, 20.0, 10.0);
        assert!(rects_intersect(a, b), "1e-6 overlap is real");
    }

    #[test]
    fn degenerate_rect_intersects_straddling_rect() {
        let segment = Rect::new(5.0, 0.0, 5.0, 10.0);
        let q = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(
            rects_intersect(segment, q),
            "zero-width segment inside a rect must intersect it"
        );
        assert!(rects_intersect(q, segment), "intersection is symmetric");
    }

    #[test]
    fn containment_is_inclusive() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(
            rect_contains_rect(outer, outer),
            "a rect contains itself, edges included"
        );
        assert!(rect_contains_rect(outer, Rect::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!rect_contains_rect(
            outer,
            Rect::new(2.0, 2.0, 10.0 + 1e-9, 3.0)
        ));
    }

    #[test]
    fn approx_equal_uses_per_coordinate_tolerance() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(1e-8, -1e-8, 10.0 + 1e-8, 10.0);
        assert!(rects_approx_equal(a, b), "1e-8 per coordinate is equal");
        let c = Rect::new(1e-6, 0.0, 10.0, 10.0);
        assert!(!rects_approx_equal(a, c), "1e-6 per coordinate is not");
    }

    #[test]
    fn non_finite_rects_are_rejected() {
        assert!(is_finite_rect(Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(!is_finite_rect(Rect::new(f64::NAN, 0.0, 1.0, 1.0)));
        assert!(!is_finite_rect(Rect::new(0.0, 0.0, f64::INFINITY, 1.0)));
        assert!(!is_finite_rect(Rect::new(
            0.0,
            f64::NEG_INFINITY,
            1.0,
            1.0
        )));
    }
}
