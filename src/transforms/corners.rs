//! Radial corner reconstruction.
//!
//! The image and its control image are split into four quadrants. In each
//! quadrant the control image marks one CENTER pixel, a set of EDGE pixels
//! whose source colors are sampled, and the TARGET pixels to repaint. Every
//! target gets the color found by interpolating the edge samples by angle
//! around the center.

use crate::core::error::{BleedError, BleedResult};
use crate::core::types::{Color, Quadrant, RasterBuffer, Region};
use std::f64::consts::PI;

/// Marker colors recognised in a corner control image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Center,
    Edge,
    Target,
}

impl Marker {
    pub const CENTER: Color = Color::rgb(0, 255, 0);
    pub const EDGE: Color = Color::rgb(255, 0, 255);
    pub const TARGET: Color = Color::rgb(0, 0, 0);

    /// Decode a control pixel; only exact RGBA matches count.
    pub fn decode(color: Color) -> Option<Self> {
        match color {
            Self::CENTER => Some(Marker::Center),
            Self::EDGE => Some(Marker::Edge),
            Self::TARGET => Some(Marker::Target),
            _ => None,
        }
    }
}

/// An edge color sampled at a given angle around the quadrant center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub angle: f64,
    pub color: [f64; 4],
}

/// Split a `width` x `height` area into quadrants at `ceil(width / 2)`, `ceil(height / 2)`.
pub fn quadrant_regions(width: u32, height: u32) -> [(Quadrant, Region); 4] {
    let cutoff_x = width.div_ceil(2);
    let cutoff_y = height.div_ceil(2);
    let (right, bottom) = (width - cutoff_x, height - cutoff_y);

    [
        (Quadrant::TopLeft, Region::new(0, 0, cutoff_x, cutoff_y)),
        (Quadrant::TopRight, Region::new(cutoff_x, 0, right, cutoff_y)),
        (Quadrant::BottomLeft, Region::new(0, cutoff_y, cutoff_x, bottom)),
        (Quadrant::BottomRight, Region::new(cutoff_x, cutoff_y, right, bottom)),
    ]
}

/// Angle of `(x, y)` around `center`, with y pointing up.
///
/// Bottom-half angles are kept in `[-2π, 0)` and top-half angles in `[0, 2π)`
/// so a quadrant's span never straddles the ±π seam.
pub fn adjusted_angle(center: (u32, u32), x: u32, y: u32, is_bottom_half: bool) -> f64 {
    let dy = center.1 as f64 - y as f64;
    let dx = x as f64 - center.0 as f64;
    let angle = dy.atan2(dx);

    if is_bottom_half && angle >= 0.0 {
        angle - 2.0 * PI
    } else if !is_bottom_half && angle < 0.0 {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Locate the CENTER marker. With several, the last one in row-major order wins.
pub fn find_center(control: &RasterBuffer) -> Option<(u32, u32)> {
    let mut found = 0usize;
    let mut center = None;
    for (x, y, color) in control.pixels() {
        if Marker::decode(color) == Some(Marker::Center) {
            found += 1;
            center = Some((x, y));
        }
    }

    if found > 1 {
        log::warn!("Control quadrant has {} center markers; using the last one", found);
    }
    center
}

/// Sample the source under every EDGE marker, sorted by ascending angle.
pub fn collect_samples(
    source: &RasterBuffer,
    control: &RasterBuffer,
    center: (u32, u32),
    is_bottom_half: bool,
) -> Vec<Sample> {
    let mut samples: Vec<Sample> = control
        .pixels()
        .filter(|&(_, _, c)| Marker::decode(c) == Some(Marker::Edge))
        .map(|(x, y, _)| Sample {
            angle: adjusted_angle(center, x, y, is_bottom_half),
            color: source.get_pixel(x, y).to_f64_array(),
        })
        .collect();

    samples.sort_by(|a, b| a.angle.total_cmp(&b.angle));
    samples
}

/// Color at `angle`, interpolated between the bracketing samples.
///
/// Angles outside the sampled span clamp to the nearest extreme sample.
/// Returns `None` when there are no samples.
pub fn interpolate(samples: &[Sample], angle: f64) -> Option<Color> {
    let first = samples.first()?;
    let last = samples.last()?;

    // samples are sorted: partition_point gives the count with angle <= t / angle < t
    let at_or_below = samples.partition_point(|s| s.angle <= angle);
    let below = samples.partition_point(|s| s.angle < angle);

    let (lower_idx, lower) = match at_or_below.checked_sub(1) {
        Some(i) => (i, &samples[i]),
        None => (0, first),
    };
    let (upper_idx, upper) = match samples.get(below) {
        Some(s) => (below, s),
        None => (samples.len() - 1, last),
    };

    let span = upper.angle - lower.angle;
    // distinct entries can share an angle when two edges lie on one ray
    if lower_idx == upper_idx || span <= 0.0 {
        return Some(Color::from_f64_array(lower.color));
    }

    let lower_weight = (upper.angle - angle) / span;
    let upper_weight = 1.0 - lower_weight;

    let mut channels = [0.0; 4];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = lower.color[i] * lower_weight + upper.color[i] * upper_weight;
    }
    Some(Color::from_f64_array(channels))
}

/// Reconstruct one quadrant.
///
/// Returns a copy of `source` with every TARGET pixel of `control` repainted.
/// Fails with [`BleedError::MissingCenter`] when `control` has no CENTER marker.
pub fn refill_corner(
    source: &RasterBuffer,
    control: &RasterBuffer,
    is_bottom_half: bool,
) -> BleedResult<RasterBuffer> {
    let center = find_center(control).ok_or(BleedError::MissingCenter { quadrant: None })?;
    let samples = collect_samples(source, control, center, is_bottom_half);

    let mut output = source.clone();
    let mut painted = 0usize;
    for (x, y, marker) in control.pixels() {
        if Marker::decode(marker) != Some(Marker::Target) {
            continue;
        }
        let angle = adjusted_angle(center, x, y, is_bottom_half);
        match interpolate(&samples, angle) {
            Some(color) => {
                output.set_pixel(x, y, color);
                painted += 1;
            }
            None => {
                log::warn!("Target ({}, {}) has no edge samples to interpolate from", x, y);
            }
        }
    }

    log::debug!(
        "Refilled corner around ({}, {}): {} samples, {} targets",
        center.0,
        center.1,
        samples.len(),
        painted
    );
    Ok(output)
}

/// Reconstruct all four corners of `source` as marked in `control`.
///
/// `control` must match the source dimensions. A quadrant without a CENTER
/// marker aborts the whole call.
pub fn extend_corners(source: &RasterBuffer, control: &RasterBuffer) -> BleedResult<RasterBuffer> {
    if source.dimensions() != control.dimensions() {
        return Err(BleedError::DimensionMismatch {
            source_width: source.width(),
            source_height: source.height(),
            control_width: control.width(),
            control_height: control.height(),
        });
    }

    let mut output = source.clone();
    for (quadrant, region) in quadrant_regions(source.width(), source.height()) {
        if region.is_empty() {
            continue;
        }
        let source_q = source.crop(region)?;
        let control_q = control.crop(region)?;
        let refilled = refill_corner(&source_q, &control_q, quadrant.is_bottom_half()).map_err(
            |err| match err {
                BleedError::MissingCenter { .. } => BleedError::MissingCenter {
                    quadrant: Some(quadrant),
                },
                other => other,
            },
        )?;
        output.paste(&refilled, region.x as i64, region.y as i64);
    }
    Ok(output)
}
