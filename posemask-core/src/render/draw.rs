//! Joint and bone stamping shared by the pose rasterizer and the rig-mask composer.
//!
//! Everything is generic over the target canvas so the same
//! normalized-to-pixel mapping feeds RGB control images and single-channel masks.

use glam::{IVec2, Vec2};
use image::GenericImage;

use crate::error::Result;
use crate::skeleton::Skeleton;

/// Map a normalized point onto a `width` x `height` canvas: `round(v * dim)`.
pub fn to_pixel(point: Vec2, width: u32, height: u32) -> IVec2 {
    let scaled = point * Vec2::new(width as f32, height as f32);
    scaled.round().as_ivec2()
}

/// Inclusive pixel bounds of `[lo, hi]` clipped to `0..dim`, or `None` when fully outside.
fn clip_span(lo: i64, hi: i64, dim: u32) -> Option<(u32, u32)> {
    let lo = lo.max(0);
    let hi = hi.min(dim as i64 - 1);
    (lo <= hi).then_some((lo as u32, hi as u32))
}

/// Filled disk of `radius` pixels centered on `center`.
pub fn draw_joint<I: GenericImage>(canvas: &mut I, center: IVec2, radius: u32, color: I::Pixel) {
    let (w, h) = canvas.dimensions();
    // Any radius beyond w + h already covers the whole canvas; clamping keeps r * r in range.
    let r = (radius as i64).min(w as i64 + h as i64);
    let (cx, cy) = (center.x as i64, center.y as i64);
    let (Some((x0, x1)), Some((y0, y1))) = (clip_span(cx - r, cx + r, w), clip_span(cy - r, cy + r, h))
    else {
        return;
    };
    for y in y0..=y1 {
        let dy = y as i64 - cy;
        for x in x0..=x1 {
            let dx = x as i64 - cx;
            if dx * dx + dy * dy <= r * r {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Round-capped stroke of `width` pixels from `a` to `b`.
pub fn draw_bone<I: GenericImage>(canvas: &mut I, a: IVec2, b: IVec2, width: u32, color: I::Pixel) {
    let (w, h) = canvas.dimensions();
    let pad = (width as i64 + 1) / 2 + 1;
    let xs = clip_span(a.x.min(b.x) as i64 - pad, a.x.max(b.x) as i64 + pad, w);
    let ys = clip_span(a.y.min(b.y) as i64 - pad, a.y.max(b.y) as i64 + pad, h);
    let (Some((x0, x1)), Some((y0, y1))) = (xs, ys) else {
        return;
    };

    let (fa, fb) = (a.as_vec2(), b.as_vec2());
    for y in y0..=y1 {
        for x in x0..=x1 {
            if stroke_covers(Vec2::new(x as f32, y as f32), fa, fb, width) {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Whether pixel `p` lies inside a `width`-pixel stroke from `a` to `b`.
///
/// Even widths have no center row, so pixels are sampled half a pixel off
/// the segment; a horizontal stroke then covers exactly `width` rows.
pub(crate) fn stroke_covers(p: Vec2, a: Vec2, b: Vec2, width: u32) -> bool {
    let offset = if width % 2 == 0 { Vec2::splat(0.5) } else { Vec2::ZERO };
    distance_to_segment(p + offset, a, b) <= width as f32 / 2.0
}

pub(crate) fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Draw every bone of `skeleton`, scaled to the canvas dimensions.
pub fn draw_bones<I: GenericImage>(
    canvas: &mut I,
    skeleton: &Skeleton,
    width: u32,
    color: I::Pixel,
) -> Result<()> {
    let (w, h) = canvas.dimensions();
    for &bone in skeleton.bones() {
        let (a, b) = skeleton.endpoints(bone)?;
        draw_bone(canvas, to_pixel(a, w, h), to_pixel(b, w, h), width, color);
    }
    Ok(())
}

/// Draw every joint of `skeleton`, scaled to the canvas dimensions.
pub fn draw_joints<I: GenericImage>(canvas: &mut I, skeleton: &Skeleton, radius: u32, color: I::Pixel) {
    let (w, h) = canvas.dimensions();
    for &p in skeleton.joints().values() {
        draw_joint(canvas, to_pixel(p, w, h), radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn pixel_mapping_rounds() {
        assert_eq!(to_pixel(Vec2::new(0.5, 0.08), 1024, 1024), IVec2::new(512, 82));
        assert_eq!(to_pixel(Vec2::new(0.25, 0.5), 10, 7), IVec2::new(3, 4));
        assert_eq!(to_pixel(Vec2::ONE, 64, 32), IVec2::new(64, 32));
    }

    #[test]
    fn joint_is_clipped_at_edges() {
        let mut canvas = GrayImage::new(16, 16);
        draw_joint(&mut canvas, IVec2::new(16, 16), 3, Luma([255]));
        assert_eq!(canvas.get_pixel(15, 15).0[0], 255);
        assert_eq!(canvas.get_pixel(0, 0).0[0], 0);

        let mut far = GrayImage::new(8, 8);
        draw_joint(&mut far, IVec2::new(-50, -50), 3, Luma([255]));
        assert!(far.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn horizontal_bone_covers_its_band() {
        let mut canvas = GrayImage::new(32, 32);
        draw_bone(&mut canvas, IVec2::new(4, 16), IVec2::new(28, 16), 6, Luma([255]));
        for x in 4..=27 {
            let rows = (0..32).filter(|&y| canvas.get_pixel(x, y).0[0] == 255).collect::<Vec<_>>();
            assert_eq!(rows, (13..=18).collect::<Vec<_>>(), "column {x}");
        }
    }

    #[test]
    fn odd_width_bone_is_centered() {
        let mut canvas = GrayImage::new(32, 32);
        draw_bone(&mut canvas, IVec2::new(16, 4), IVec2::new(16, 28), 5, Luma([255]));
        for y in 4..=28 {
            let cols = (0..32).filter(|&x| canvas.get_pixel(x, y).0[0] == 255).count();
            assert_eq!(cols, 5, "row {y}");
        }
    }

    #[test]
    fn huge_sizes_cover_canvas_without_overflow() {
        let mut canvas = GrayImage::new(16, 16);
        draw_joint(&mut canvas, IVec2::new(3, 3), u32::MAX, Luma([255]));
        assert!(canvas.pixels().all(|p| p.0[0] == 255));

        let mut canvas = GrayImage::new(16, 16);
        draw_bone(&mut canvas, IVec2::new(0, 0), IVec2::new(15, 15), u32::MAX, Luma([255]));
        assert!(canvas.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn zero_length_bone_is_a_dot() {
        let mut canvas = GrayImage::new(9, 9);
        draw_bone(&mut canvas, IVec2::new(4, 4), IVec2::new(4, 4), 2, Luma([9]));
        assert_eq!(canvas.get_pixel(4, 4).0[0], 9);
        assert_eq!(canvas.get_pixel(0, 0).0[0], 0);
    }
}
