//! Directional edge extension driven by a control image.
//!
//! Each opaque control pixel names a direction; the source pixel under it is
//! stretched from its position to the matching image edge.

use crate::core::error::{BleedError, BleedResult};
use crate::core::types::{Color, RasterBuffer};

/// Direction decoded from a control pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Fill columns `[0, x)` of the anchor's row.
    Left,
    /// Fill rows `[0, y)` of the anchor's column.
    Up,
    /// Fill columns `(x, width)` of the anchor's row.
    Right,
    /// Fill rows `(y, height)` of the anchor's column.
    Down,
}

impl Directive {
    /// Decode a control pixel. Transparent pixels carry no directive.
    ///
    /// Priority is fixed: red, then green, then blue; any other opaque color
    /// means [`Directive::Down`].
    pub fn decode(color: Color) -> Option<Self> {
        if color.is_transparent() {
            None
        } else if color.r == 255 {
            Some(Directive::Left)
        } else if color.g == 255 {
            Some(Directive::Up)
        } else if color.b == 255 {
            Some(Directive::Right)
        } else {
            Some(Directive::Down)
        }
    }
}

/// Stretch source pixels toward the image edges as directed by `control`.
///
/// Only coordinates inside `control` are visited, row by row; a control image
/// smaller than the source leaves the rest of the source alone. The anchor
/// pixel itself is never written, so running the same control twice changes
/// nothing the first run did not.
pub fn extend_sides(source: &mut RasterBuffer, control: &RasterBuffer) -> BleedResult<()> {
    let (width, height) = source.dimensions();
    if control.width() > width || control.height() > height {
        return Err(BleedError::ControlTooLarge {
            source_width: width,
            source_height: height,
            control_width: control.width(),
            control_height: control.height(),
        });
    }

    let mut applied = 0usize;
    for (x, y, marker) in control.pixels() {
        let Some(directive) = Directive::decode(marker) else {
            continue;
        };
        let color = source.get_pixel(x, y);
        match directive {
            Directive::Left => (0..x).for_each(|i| source.set_pixel(i, y, color)),
            Directive::Up => (0..y).for_each(|j| source.set_pixel(x, j, color)),
            Directive::Right => (x + 1..width).for_each(|i| source.set_pixel(i, y, color)),
            Directive::Down => (y + 1..height).for_each(|j| source.set_pixel(x, j, color)),
        }
        applied += 1;
    }

    log::debug!("Applied {} side directives over {}x{}", applied, width, height);
    Ok(())
}

/// Owning variant of [`extend_sides`] for use in pipelines.
pub fn extend_sides_owned(mut source: RasterBuffer, control: &RasterBuffer) -> BleedResult<RasterBuffer> {
    extend_sides(&mut source, control)?;
    Ok(source)
}
