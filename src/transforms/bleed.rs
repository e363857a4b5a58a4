//! Bleed generation: pad an image with mirrored copies of itself or a solid color.

use crate::core::error::{BleedError, BleedResult};
use crate::core::types::{Color, Mirror, RasterBuffer};

/// Named reflection used by [`add_bleed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleedMirror {
    pub name: &'static str,
    pub mirror: Mirror,
}

/// The eight reflections painted by [`add_bleed`], in paint order.
///
/// Edges come first (left, right, top, bottom), then the corners
/// (top-left, top-right, bottom-left, bottom-right). Later entries overwrite
/// earlier ones where they overlap.
pub fn mirrors(width: u32, height: u32, padding: u32) -> [BleedMirror; 8] {
    let (w, h, p) = (width as i64, height as i64, padding as i64);
    let near = p - 1;
    let far_x = p + 2 * w - 1;
    let far_y = p + 2 * h - 1;

    [
        BleedMirror { name: "left", mirror: Mirror::new(-1, 1, near, p) },
        BleedMirror { name: "right", mirror: Mirror::new(-1, 1, far_x, p) },
        BleedMirror { name: "top", mirror: Mirror::new(1, -1, p, near) },
        BleedMirror { name: "bottom", mirror: Mirror::new(1, -1, p, far_y) },
        BleedMirror { name: "top-left", mirror: Mirror::new(-1, -1, near, near) },
        BleedMirror { name: "top-right", mirror: Mirror::new(-1, -1, far_x, near) },
        BleedMirror { name: "bottom-left", mirror: Mirror::new(-1, -1, near, far_y) },
        BleedMirror { name: "bottom-right", mirror: Mirror::new(-1, -1, far_x, far_y) },
    ]
}

/// Canvas size of a `width` x `height` image padded by `padding` on every side.
pub fn padded_size(width: u32, height: u32, padding: u32) -> BleedResult<(u32, u32)> {
    let grow = |side: u32| padding.checked_mul(2).and_then(|border| side.checked_add(border));
    match (grow(width), grow(height)) {
        (Some(padded_width), Some(padded_height)) => Ok((padded_width, padded_height)),
        _ => Err(BleedError::PaddingTooLarge {
            padding,
            width,
            height,
        }),
    }
}

/// Pad `source` by `padding` pixels on every side with reflected copies of itself.
///
/// The output is `(width + 2 * padding, height + 2 * padding)`. The source sits
/// untouched at `(padding, padding)`. Border pixels farther than one image
/// width (or height) from the source stay transparent.
pub fn add_bleed(source: &RasterBuffer, padding: u32) -> BleedResult<RasterBuffer> {
    let (width, height) = source.dimensions();
    let (padded_width, padded_height) = padded_size(width, height, padding)?;
    let mut canvas = RasterBuffer::new(padded_width, padded_height);
    canvas.paste(source, padding as i64, padding as i64);

    if padding == 0 {
        return Ok(canvas);
    }

    for entry in mirrors(width, height, padding) {
        canvas.paint_mirrored(source, entry.mirror);
    }

    log::debug!(
        "Added {}px mirrored bleed: {}x{} -> {}x{}",
        padding,
        width,
        height,
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}

/// Pad `source` by `padding` pixels on every side with a uniform `fill` color.
pub fn add_bleed_solid(
    source: &RasterBuffer,
    padding: u32,
    fill: Color,
) -> BleedResult<RasterBuffer> {
    let (width, height) = source.dimensions();
    let (padded_width, padded_height) = padded_size(width, height, padding)?;
    let mut canvas = RasterBuffer::filled(padded_width, padded_height, fill);
    canvas.paste(source, padding as i64, padding as i64);
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Every pixel distinct so reflections are unambiguous.
    fn gradient(width: u32, height: u32) -> RasterBuffer {
        let pixels: Vec<Color> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Color::rgb(x as u8, y as u8, 7)))
            .collect();
        RasterBuffer::from_pixels(width, height, &pixels).unwrap()
    }

    #[test]
    fn test_mirror_paint_order() {
        let names: Vec<_> = mirrors(4, 4, 2).iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec![
                "left",
                "right",
                "top",
                "bottom",
                "top-left",
                "top-right",
                "bottom-left",
                "bottom-right"
            ]
        );
    }

    #[test]
    fn test_zero_padding_is_copy() {
        let source = gradient(5, 3);
        assert_eq!(add_bleed(&source, 0).unwrap(), source);
    }

    #[test]
    fn test_corner_reflections() {
        let source = gradient(4, 3);
        let p = 2;
        let out = add_bleed(&source, p).unwrap();
        let (w, h) = (4, 3);

        for k in 0..p {
            for m in 0..p {
                // top-left
                assert_eq!(out.get_pixel(p - 1 - k, p - 1 - m), source.get_pixel(k, m));
                // top-right
                assert_eq!(out.get_pixel(p + w + k, p - 1 - m), source.get_pixel(w - 1 - k, m));
                // bottom-left
                assert_eq!(out.get_pixel(p - 1 - k, p + h + m), source.get_pixel(k, h - 1 - m));
                // bottom-right
                assert_eq!(
                    out.get_pixel(p + w + k, p + h + m),
                    source.get_pixel(w - 1 - k, h - 1 - m)
                );
            }
        }
    }

    #[test]
    fn test_padding_wider_than_image_leaves_transparent_margin() {
        let source = gradient(2, 2);
        let out = add_bleed(&source, 3).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        // left mirror covers columns 1..=2; column 0 is beyond one image width
        assert_eq!(out.get_pixel(0, 3), Color::TRANSPARENT);
        assert_eq!(out.get_pixel(1, 3), source.get_pixel(1, 0));
        assert_eq!(out.get_pixel(2, 3), source.get_pixel(0, 0));
    }

    #[test]
    fn test_solid_bleed() {
        let source = gradient(3, 2);
        let fill = Color::new(10, 20, 30, 255);
        let out = add_bleed_solid(&source, 2, fill).unwrap();

        assert_eq!(out.dimensions(), (7, 6));
        for (x, y, color) in out.pixels() {
            let inside = (2..5).contains(&x) && (2..4).contains(&y);
            if inside {
                assert_eq!(color, source.get_pixel(x - 2, y - 2));
            } else {
                assert_eq!(color, fill);
            }
        }
    }

    #[test]
    fn test_padding_past_canvas_limit_is_rejected() {
        assert_eq!(padded_size(3, 2, 4).unwrap(), (11, 10));
        assert_eq!(padded_size(1, 1, u32::MAX / 2 - 1).unwrap(), (u32::MAX - 2, u32::MAX - 2));
        assert!(matches!(
            padded_size(2, 1, u32::MAX / 2),
            Err(BleedError::PaddingTooLarge { padding, width: 2, height: 1 }) if padding == u32::MAX / 2
        ));
        assert!(padded_size(0, 0, u32::MAX / 2 + 1).is_err());

        let source = gradient(2, 2);
        assert!(matches!(
            add_bleed(&source, u32::MAX / 2 + 1),
            Err(BleedError::PaddingTooLarge { .. })
        ));
        assert!(matches!(
            add_bleed_solid(&source, u32::MAX, Color::WHITE),
            Err(BleedError::PaddingTooLarge { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_bleed_dimensions_and_interior(w in 1u32..8, h in 1u32..8, p in 0u32..6) {
            let source = gradient(w, h);
            let out = add_bleed(&source, p).unwrap();

            prop_assert_eq!(out.dimensions(), (w + 2 * p, h + 2 * p));
            for y in 0..h {
                for x in 0..w {
                    prop_assert_eq!(out.get_pixel(p + x, p + y), source.get_pixel(x, y));
                }
            }
        }

        #[test]
        fn prop_edge_reflections(w in 1u32..8, h in 1u32..8, p in 1u32..6) {
            let source = gradient(w, h);
            let out = add_bleed(&source, p).unwrap();

            for k in 0..p.min(w) {
                for j in 0..h {
                    // left
                    prop_assert_eq!(out.get_pixel(p - 1 - k, p + j), source.get_pixel(k, j));
                    // right
                    prop_assert_eq!(out.get_pixel(p + w + k, p + j), source.get_pixel(w - 1 - k, j));
                }
            }
            for k in 0..p.min(h) {
                for i in 0..w {
                    // top
                    prop_assert_eq!(out.get_pixel(p + i, p - 1 - k), source.get_pixel(i, k));
                    // bottom
                    prop_assert_eq!(out.get_pixel(p + i, p + h + k), source.get_pixel(i, h - 1 - k));
                }
            }
        }
    }
}
