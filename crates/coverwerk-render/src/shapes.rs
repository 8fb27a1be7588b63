// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clip-shape masks for overlay images. The parametric constants (star
// spike count and inner/outer ratio, triangle vertices) are fixed for
// visual compatibility with existing covers; do not "improve" them.

use coverwerk_core::ClipShape;
use image::GrayImage;

/// Build the alpha mask for `shape` over a `w`×`h` bounding box, or `None`
/// when the shape clips nothing (`None` and `Rectangle` cover the full box).
pub(crate) fn shape_mask(shape: ClipShape, w: u32, h: u32) -> Option<GrayImage> {
    let inside: Box<dyn Fn(f32, f32) -> bool> = match shape {
        ClipShape::None | ClipShape::Rectangle => return None,
        ClipShape::Circle => {
            let r = w.min(h) as f32 / 2.0;
            Box::new(move |dx, dy| dx * dx + dy * dy <= r * r)
        }
        ClipShape::Oval => {
            let rx = w as f32 / 2.0;
            let ry = h as f32 / 2.0;
            Box::new(move |dx, dy| {
                let nx = dx / rx;
                let ny = dy / ry;
                nx * nx + ny * ny <= 1.0
            })
        }
        ClipShape::Square => {
            let half = w.min(h) as f32 / 2.0;
            Box::new(move |dx, dy| dx.abs() <= half && dy.abs() <= half)
        }
        ClipShape::Triangle => {
            let poly = triangle_points(w as f32, h as f32);
            Box::new(move |dx, dy| point_in_polygon(&poly, dx, dy))
        }
        ClipShape::Star => {
            let poly = star_points(w as f32);
            Box::new(move |dx, dy| point_in_polygon(&poly, dx, dy))
        }
    };

    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let mut mask = GrayImage::new(w, h);
    for (x, y, px) in mask.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        px.0[0] = if inside(dx, dy) { 255 } else { 0 };
    }
    Some(mask)
}

/// Apex up, base along the bottom edge.
fn triangle_points(w: f32, h: f32) -> Vec<(f32, f32)> {
    vec![(0.0, -h / 2.0), (-w / 2.0, h / 2.0), (w / 2.0, h / 2.0)]
}

/// Five-spike star: outer radius w/2, inner radius outer/2.5, first spike
/// pointing up (start angle 3π/2), stepping π/5 between vertices.
fn star_points(w: f32) -> Vec<(f32, f32)> {
    const SPIKES: usize = 5;
    let outer = w / 2.0;
    let inner = outer / 2.5;
    let step = std::f32::consts::PI / SPIKES as f32;

    let mut rot = std::f32::consts::PI / 2.0 * 3.0;
    let mut points = Vec::with_capacity(SPIKES * 2);
    for _ in 0..SPIKES {
        points.push((rot.cos() * outer, rot.sin() * outer));
        rot += step;
        points.push((rot.cos() * inner, rot.sin() * inner));
        rot += step;
    }
    points
}

/// Even-odd ray-crossing test.
fn point_in_polygon(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(mask: &GrayImage, x: u32, y: u32) -> bool {
        mask.get_pixel(x, y).0[0] == 255
    }

    #[test]
    fn none_and_rectangle_clip_nothing() {
        assert!(shape_mask(ClipShape::None, 40, 20).is_none());
        assert!(shape_mask(ClipShape::Rectangle, 40, 20).is_none());
    }

    #[test]
    fn circle_uses_the_short_axis() {
        let mask = shape_mask(ClipShape::Circle, 40, 20).unwrap();
        assert!(on(&mask, 20, 10));
        // Inside vertically, outside the r=10 disc horizontally.
        assert!(!on(&mask, 5, 10));
        assert!(!on(&mask, 0, 0));
    }

    #[test]
    fn oval_fills_both_half_axes() {
        let mask = shape_mask(ClipShape::Oval, 40, 20).unwrap();
        assert!(on(&mask, 20, 10));
        assert!(on(&mask, 3, 10));
        assert!(on(&mask, 20, 2));
        assert!(!on(&mask, 2, 2));
    }

    #[test]
    fn square_is_centered_on_the_short_side() {
        let mask = shape_mask(ClipShape::Square, 40, 20).unwrap();
        assert!(on(&mask, 20, 10));
        assert!(on(&mask, 12, 3));
        assert!(!on(&mask, 5, 10));
        assert!(!on(&mask, 35, 10));
    }

    #[test]
    fn triangle_has_apex_up_and_full_base() {
        let mask = shape_mask(ClipShape::Triangle, 40, 40).unwrap();
        assert!(on(&mask, 20, 3));
        assert!(on(&mask, 3, 38));
        assert!(on(&mask, 36, 38));
        assert!(!on(&mask, 2, 2));
        assert!(!on(&mask, 38, 2));
    }

    #[test]
    fn star_keeps_the_center_and_drops_the_corners() {
        let mask = shape_mask(ClipShape::Star, 40, 40).unwrap();
        assert!(on(&mask, 20, 20));
        assert!(on(&mask, 20, 3), "top spike points up");
        for (x, y) in [(1, 1), (38, 1), (1, 38), (38, 38)] {
            assert!(!on(&mask, x, y), "corner ({x},{y}) must be clipped");
        }
    }

    #[test]
    fn star_waist_is_narrower_than_its_spikes() {
        let mask = shape_mask(ClipShape::Star, 100, 100).unwrap();
        // Directly right of center at the spike radius: between two spikes,
        // so outside; the inner radius (20) stays inside.
        assert!(!on(&mask, 95, 50));
        assert!(on(&mask, 62, 50));
    }
}
