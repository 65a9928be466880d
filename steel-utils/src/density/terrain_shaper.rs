//! Full vanilla TerrainProvider implementation.
//!
//! This module implements the exact spline system used by vanilla Minecraft
//! for terrain shaping. The splines control offset (base height), factor
//! (height variation), and jaggedness (peak sharpness).

// Spline code uses mathematical single-letter variables (f, g, h, i, j)
#![allow(clippy::many_single_char_names)]

use crate::error::WorldgenError;

use super::cubic_spline::{CubicSpline, SplineCoordinate};

type Transform = fn(f32) -> f32;

const NO_TRANSFORM: Transform = no_transform;
const AMPLIFIED_OFFSET: Transform = amplified_offset;
const AMPLIFIED_FACTOR: Transform = amplified_factor;
const AMPLIFIED_JAGGEDNESS: Transform = amplified_jaggedness;

fn no_transform(f: f32) -> f32 {
    f
}

fn amplified_offset(f: f32) -> f32 {
    if f < 0.0 { f } else { f * 2.0 }
}

fn amplified_factor(f: f32) -> f32 {
    1.25 - 6.25 / (f + 5.0)
}

fn amplified_jaggedness(f: f32) -> f32 {
    f * 2.0
}

/// Folds weirdness (ridges) into the peaks and valleys range `[-1, 1]`.
#[must_use]
pub fn peaks_and_valleys(weirdness: f32) -> f32 {
    -((weirdness.abs() - 0.666_666_7).abs() - 0.333_333_34) * 3.0
}

/// Creates the overworld offset spline.
/// This controls the base terrain height.
pub fn overworld_offset(
    continents: SplineCoordinate,
    erosion: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    amplified: bool,
) -> Result<CubicSpline, WorldgenError> {
    let transform = if amplified {
        AMPLIFIED_OFFSET
    } else {
        NO_TRANSFORM
    };

    let spline1 = build_erosion_offset_spline(
        erosion,
        ridges_folded,
        -0.15,
        0.0,
        0.0,
        0.1,
        0.0,
        -0.03,
        false,
        false,
        transform,
    )?;
    let spline2 = build_erosion_offset_spline(
        erosion,
        ridges_folded,
        -0.1,
        0.03,
        0.1,
        0.1,
        0.01,
        -0.03,
        false,
        false,
        transform,
    )?;
    let spline3 = build_erosion_offset_spline(
        erosion,
        ridges_folded,
        -0.1,
        0.03,
        0.1,
        0.7,
        0.01,
        -0.03,
        true,
        true,
        transform,
    )?;
    let spline4 = build_erosion_offset_spline(
        erosion,
        ridges_folded,
        -0.05,
        0.03,
        0.1,
        1.0,
        0.01,
        0.01,
        true,
        true,
        transform,
    )?;

    CubicSpline::builder(continents, transform)
        .point(-1.1, 0.044)?
        .point(-1.02, -0.222_2)?
        .point(-0.51, -0.222_2)?
        .point(-0.44, -0.12)?
        .point(-0.18, -0.12)?
        .spline(-0.16, spline1.clone())?
        .spline(-0.15, spline1)?
        .spline(-0.1, spline2)?
        .spline(0.25, spline3)?
        .spline(1.0, spline4)?
        .build()
}

/// Creates the overworld factor spline.
/// This controls the terrain height variation/scale.
pub fn overworld_factor(
    continents: SplineCoordinate,
    erosion: SplineCoordinate,
    ridges: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    amplified: bool,
) -> Result<CubicSpline, WorldgenError> {
    let transform = if amplified {
        AMPLIFIED_FACTOR
    } else {
        NO_TRANSFORM
    };

    CubicSpline::builder(continents, NO_TRANSFORM)
        .point(-0.19, 3.95)?
        .spline(
            -0.15,
            erosion_factor(erosion, ridges, ridges_folded, 6.25, true, NO_TRANSFORM)?,
        )?
        .spline(
            -0.1,
            erosion_factor(erosion, ridges, ridges_folded, 5.47, true, transform)?,
        )?
        .spline(
            0.03,
            erosion_factor(erosion, ridges, ridges_folded, 5.08, true, transform)?,
        )?
        .spline(
            0.06,
            erosion_factor(erosion, ridges, ridges_folded, 4.69, false, transform)?,
        )?
        .build()
}

/// Creates the overworld jaggedness spline.
/// This controls the sharpness of mountain peaks.
pub fn overworld_jaggedness(
    continents: SplineCoordinate,
    erosion: SplineCoordinate,
    ridges: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    amplified: bool,
) -> Result<CubicSpline, WorldgenError> {
    let transform = if amplified {
        AMPLIFIED_JAGGEDNESS
    } else {
        NO_TRANSFORM
    };

    CubicSpline::builder(continents, transform)
        .point(-0.11, 0.0)?
        .spline(
            0.03,
            erosion_jaggedness_spline(
                erosion,
                ridges,
                ridges_folded,
                1.0,
                0.5,
                0.0,
                0.0,
                transform,
            )?,
        )?
        .spline(
            0.65,
            erosion_jaggedness_spline(
                erosion,
                ridges,
                ridges_folded,
                1.0,
                1.0,
                1.0,
                0.0,
                transform,
            )?,
        )?
        .build()
}

#[allow(clippy::too_many_arguments)] // Spline building requires multiple control point values
fn erosion_jaggedness_spline(
    erosion: SplineCoordinate,
    ridges: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    high_erosion_high_weirdness: f32,
    low_erosion_high_weirdness: f32,
    high_erosion_mid_weirdness: f32,
    low_erosion_mid_weirdness: f32,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let high = ridge_jaggedness_spline(
        ridges,
        ridges_folded,
        high_erosion_high_weirdness,
        high_erosion_mid_weirdness,
        transform,
    )?;
    let low = ridge_jaggedness_spline(
        ridges,
        ridges_folded,
        low_erosion_high_weirdness,
        low_erosion_mid_weirdness,
        transform,
    )?;

    CubicSpline::builder(erosion, transform)
        .spline(-1.0, high)?
        .spline(-0.78, low.clone())?
        .spline(-0.577_5, low)?
        .point(-0.375, 0.0)?
        .build()
}

fn ridge_jaggedness_spline(
    ridges: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    high_weirdness_magnitude: f32,
    mid_weirdness_magnitude: f32,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let pv_low = peaks_and_valleys(0.4);
    let pv_high = peaks_and_valleys(0.566_666_66);
    let pv_mid = (pv_low + pv_high) / 2.0;

    let mut builder = CubicSpline::builder(ridges_folded, transform).point(pv_low, 0.0)?;

    builder = if mid_weirdness_magnitude > 0.0 {
        builder.spline(
            pv_mid,
            weirdness_jaggedness_spline(ridges, mid_weirdness_magnitude, transform)?,
        )?
    } else {
        builder.point(pv_mid, 0.0)?
    };

    builder = if high_weirdness_magnitude > 0.0 {
        builder.spline(
            1.0,
            weirdness_jaggedness_spline(ridges, high_weirdness_magnitude, transform)?,
        )?
    } else {
        builder.point(1.0, 0.0)?
    };

    builder.build()
}

fn weirdness_jaggedness_spline(
    ridges: SplineCoordinate,
    magnitude: f32,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    CubicSpline::builder(ridges, transform)
        .point(-0.01, 0.63 * magnitude)?
        .point(0.01, 0.3 * magnitude)?
        .build()
}

fn erosion_factor(
    erosion: SplineCoordinate,
    ridges: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    value: f32,
    higher_values: bool,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let base = CubicSpline::builder(ridges, transform)
        .point(-0.2, 6.3)?
        .point(0.2, value)?
        .build()?;

    let mut builder = CubicSpline::builder(erosion, transform)
        .spline(-0.6, base.clone())?
        .spline(
            -0.5,
            CubicSpline::builder(ridges, transform)
                .point(-0.05, 6.3)?
                .point(0.05, 2.67)?
                .build()?,
        )?
        .spline(-0.35, base.clone())?
        .spline(-0.25, base.clone())?
        .spline(
            -0.1,
            CubicSpline::builder(ridges, transform)
                .point(-0.05, 2.67)?
                .point(0.05, 6.3)?
                .build()?,
        )?
        .spline(0.03, base.clone())?;

    if higher_values {
        let ridge_spline = CubicSpline::builder(ridges, transform)
            .point(0.0, value)?
            .point(0.1, 0.625)?
            .build()?;
        let folded = CubicSpline::builder(ridges_folded, transform)
            .point(-0.9, value)?
            .spline(-0.69, ridge_spline)?
            .build()?;

        builder = builder
            .point(0.35, value)?
            .spline(0.45, folded.clone())?
            .spline(0.55, folded)?
            .point(0.62, value)?;
    } else {
        let valley = CubicSpline::builder(ridges_folded, transform)
            .spline(-0.7, base.clone())?
            .point(-0.15, 1.37)?
            .build()?;
        let peak = CubicSpline::builder(ridges_folded, transform)
            .spline(0.45, base)?
            .point(0.7, 1.56)?
            .build()?;

        builder = builder
            .spline(0.05, peak.clone())?
            .spline(0.4, peak)?
            .spline(0.45, valley.clone())?
            .spline(0.55, valley)?
            .point(0.58, value)?;
    }

    builder.build()
}

#[allow(clippy::too_many_arguments)] // Spline building requires multiple control point values
fn build_erosion_offset_spline(
    erosion: SplineCoordinate,
    ridges_folded: SplineCoordinate,
    ridge_base_offset: f32,
    ridge_mid_offset: f32,
    ridge_peak_offset: f32,
    magnitude: f32,
    ridge_inner_offset: f32,
    ridge_outer_offset: f32,
    extended: bool,
    use_max_slope: bool,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let spline1 = mountain_ridge_spline(
        ridges_folded,
        lerp(magnitude, 0.6, 1.5),
        use_max_slope,
        transform,
    )?;
    let spline2 = mountain_ridge_spline(
        ridges_folded,
        lerp(magnitude, 0.6, 1.0),
        use_max_slope,
        transform,
    )?;
    let spline3 = mountain_ridge_spline(ridges_folded, magnitude, use_max_slope, transform)?;

    let spline4 = ridge_spline(
        ridges_folded,
        ridge_base_offset - 0.15,
        0.5 * magnitude,
        lerp(0.5, 0.5, 0.5) * magnitude,
        0.5 * magnitude,
        0.6 * magnitude,
        0.5,
        transform,
    )?;
    let spline5 = ridge_spline(
        ridges_folded,
        ridge_base_offset,
        ridge_inner_offset * magnitude,
        ridge_mid_offset * magnitude,
        0.5 * magnitude,
        0.6 * magnitude,
        0.5,
        transform,
    )?;
    let spline6 = ridge_spline(
        ridges_folded,
        ridge_base_offset,
        ridge_inner_offset,
        ridge_inner_offset,
        ridge_mid_offset,
        ridge_peak_offset,
        0.5,
        transform,
    )?;
    let spline7 = spline6.clone();
    let spline8 = CubicSpline::builder(ridges_folded, transform)
        .point(-1.0, ridge_base_offset)?
        .spline(-0.4, spline6.clone())?
        .point(0.0, ridge_peak_offset + 0.07)?
        .build()?;
    let spline9 = ridge_spline(
        ridges_folded,
        -0.02,
        ridge_outer_offset,
        ridge_outer_offset,
        ridge_mid_offset,
        ridge_peak_offset,
        0.0,
        transform,
    )?;

    let mut builder = CubicSpline::builder(erosion, transform)
        .spline(-0.85, spline1)?
        .spline(-0.7, spline2)?
        .spline(-0.4, spline3)?
        .spline(-0.35, spline4)?
        .spline(-0.1, spline5)?
        .spline(0.2, spline6)?;

    if extended {
        builder = builder
            .spline(0.4, spline7.clone())?
            .spline(0.45, spline8.clone())?
            .spline(0.55, spline8)?
            .spline(0.58, spline7)?;
    }

    builder.spline(0.7, spline9)?.build()
}

fn mountain_ridge_spline(
    ridges_folded: SplineCoordinate,
    magnitude: f32,
    use_max_slope: bool,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let h = mountain_continentalness(-1.0, magnitude, -0.7);
    let j = mountain_continentalness(1.0, magnitude, -0.7);
    let k = mountain_ridge_zero_continentalness_point(magnitude);

    let mut builder = CubicSpline::builder(ridges_folded, transform);

    if -0.65 < k && k < 1.0 {
        let m = mountain_continentalness(-0.65, magnitude, -0.7);
        let o = mountain_continentalness(-0.75, magnitude, -0.7);
        let p = slope(h, o, -1.0, -0.75);
        builder = builder
            .point_with_derivative(-1.0, h, p)?
            .point(-0.75, o)?
            .point(-0.65, m)?;

        let q = mountain_continentalness(k, magnitude, -0.7);
        let r = slope(q, j, k, 1.0);
        builder = builder
            .point(k - 0.01, q)?
            .point_with_derivative(k, q, r)?
            .point_with_derivative(1.0, j, r)?;
    } else {
        let m = slope(h, j, -1.0, 1.0);
        builder = if use_max_slope {
            builder
                .point(-1.0, 0.2_f32.max(h))?
                .point_with_derivative(0.0, lerp(0.5, h, j), m)?
        } else {
            builder.point_with_derivative(-1.0, h, m)?
        };
        builder = builder.point_with_derivative(1.0, j, m)?;
    }

    builder.build()
}

fn mountain_continentalness(height_factor: f32, magnitude: f32, cutoff_height: f32) -> f32 {
    let h = 1.0 - (1.0 - magnitude) * 0.5;
    let i = 0.5 * (1.0 - magnitude);
    let j = (height_factor + 1.17) * 0.460_829_47;
    let k = j * h - i;

    if height_factor < cutoff_height {
        k.max(-0.222_2)
    } else {
        k.max(0.0)
    }
}

fn mountain_ridge_zero_continentalness_point(magnitude: f32) -> f32 {
    let h = 1.0 - (1.0 - magnitude) * 0.5;
    let i = 0.5 * (1.0 - magnitude);
    i / (0.460_829_47 * h) - 1.17
}

#[allow(clippy::too_many_arguments)] // Spline building requires multiple control point values
fn ridge_spline(
    ridges_folded: SplineCoordinate,
    y1: f32,
    y2: f32,
    y3: f32,
    y4: f32,
    y5: f32,
    min_smoothing: f32,
    transform: Transform,
) -> Result<CubicSpline, WorldgenError> {
    let f = (0.5 * (y2 - y1)).max(min_smoothing);
    let g = 5.0 * (y3 - y2);

    CubicSpline::builder(ridges_folded, transform)
        .point_with_derivative(-1.0, y1, f)?
        .point_with_derivative(-0.4, y2, f.min(g))?
        .point_with_derivative(0.0, y3, g)?
        .point_with_derivative(0.4, y4, 2.0 * (y4 - y3))?
        .point_with_derivative(1.0, y5, 0.7 * (y5 - y4))?
        .build()
}

fn slope(y1: f32, y2: f32, x1: f32, x2: f32) -> f32 {
    (y2 - y1) / (x2 - x1)
}

fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::{NodeId, cubic_spline::SplineFloat};

    fn coordinate(node: u32) -> SplineCoordinate {
        SplineCoordinate {
            node: NodeId(node),
            min: SplineFloat(-1.0),
            max: SplineFloat(1.0),
        }
    }

    #[test]
    fn peaks_and_valleys_folds_weirdness() {
        assert!((peaks_and_valleys(0.4) - 0.2).abs() < 1e-6);
        assert!((peaks_and_valleys(0.566_666_66) - 0.7).abs() < 1e-6);
        assert!((peaks_and_valleys(0.0) + 1.0).abs() < 1e-6);
        assert!((peaks_and_valleys(2.0 / 3.0) - 1.0).abs() < 1e-6);
        assert_eq!(
            peaks_and_valleys(-0.3).to_bits(),
            peaks_and_valleys(0.3).to_bits()
        );
    }

    #[test]
    fn overworld_splines_build() {
        let (c, e, r, f) = (coordinate(0), coordinate(1), coordinate(2), coordinate(3));
        for amplified in [false, true] {
            overworld_offset(c, e, f, amplified).expect("offset spline");
            overworld_factor(c, e, r, f, amplified).expect("factor spline");
            overworld_jaggedness(c, e, r, f, amplified).expect("jaggedness spline");
        }
    }

    #[test]
    fn deep_ocean_offset_is_the_constant_floor() {
        let (c, e, f) = (coordinate(0), coordinate(1), coordinate(3));
        let offset = overworld_offset(c, e, f, false).expect("offset spline");

        // Continentalness well below -1.02 sits on the flat ocean floor section.
        let value = offset.apply(&mut |node| if node == NodeId(0) { -0.8 } else { 0.0 });
        assert!((value - -0.222_2).abs() < 1e-6, "{value}");
    }

    #[test]
    fn jaggedness_is_zero_inland_of_the_coast() {
        let (c, e, r, f) = (coordinate(0), coordinate(1), coordinate(2), coordinate(3));
        let jaggedness = overworld_jaggedness(c, e, r, f, false).expect("jaggedness spline");
        let value = jaggedness.apply(&mut |node| if node == NodeId(0) { -0.5 } else { 0.0 });
        assert_eq!(value.to_bits(), 0.0_f32.to_bits());
        assert!(jaggedness.min_value() <= 0.0);
        assert!(jaggedness.max_value() > 0.0);
    }
}
