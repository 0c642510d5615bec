// colormap.rs — Piecewise-linear colormap interpolation (CPU reference).
//
// Given a scalar value v and a table of K non-decreasing stop levels with
// K index-aligned RGB triples, the kernel:
//   1. clamps v to [stops[0], stops[K-1]];
//   2. finds the first adjacent bracket with stops[i] <= v <= stops[i+1];
//   3. computes t = (v - stops[i]) / (stops[i+1] - stops[i]), with t = 0
//      on a degenerate bracket (duplicate adjacent stops are valid input);
//   4. blends: out[c] = colors[i][c] * (1 - t) + colors[i+1][c] * t.
//
// The map is pure and per-element: no state between calls, no ordering
// dependency between elements. The GPU kernel in gpu::colormap implements
// the same steps and is validated against this module.
//
// Table-shape problems (length mismatch, empty tables) are caller bugs and
// fail fast with ColorMapError before any output is produced. Out-of-range
// field values are NOT errors — they clamp.

use std::fmt;

use crate::field::{Field, RgbField};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Invalid-argument errors from colormap table validation.
///
/// Both variants are configuration errors: the call produces no partial
/// output and retrying without fixing the tables cannot succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMapError {
    /// Stop and color tables have different lengths.
    LengthMismatch { stops: usize, colors: usize },
    /// Both tables are empty (K = 0).
    EmptyTable,
}

impl fmt::Display for ColorMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMapError::LengthMismatch { stops, colors } => write!(
                f,
                "stop table length ({stops}) does not match color table length ({colors})"
            ),
            ColorMapError::EmptyTable => {
                write!(f, "colormap tables must contain at least one stop")
            }
        }
    }
}

impl std::error::Error for ColorMapError {}

/// Check the table-shape preconditions shared by every entry point.
fn validate_tables(stops: &[f32], colors: &[[f32; 3]]) -> Result<(), ColorMapError> {
    if stops.len() != colors.len() {
        return Err(ColorMapError::LengthMismatch {
            stops: stops.len(),
            colors: colors.len(),
        });
    }
    if stops.is_empty() {
        return Err(ColorMapError::EmptyTable);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scalar kernel
// ---------------------------------------------------------------------------

/// Map a single scalar through the stop/color tables.
///
/// This is the per-element kernel shared (in semantics) with the GPU path.
/// Tables must already satisfy the shape preconditions: equal lengths,
/// K >= 1. Use [`color_map`] or [`ColorMap`] for checked entry points.
///
/// # Panics
/// Panics (on indexing) if `stops` is empty.
#[inline]
pub fn map_value(v: f32, stops: &[f32], colors: &[[f32; 3]]) -> [f32; 3] {
    let k = stops.len();
    let v = v.clamp(stops[0], stops[k - 1]);

    // First adjacent bracket with stops[i] <= v <= stops[i+1]. After the
    // clamp v >= stops[0], so advancing only while v exceeds the upper
    // stop preserves the lower bound.
    let mut i = 0;
    while i + 1 < k && v > stops[i + 1] {
        i += 1;
    }
    if i + 1 >= k {
        // K = 1: degenerate table, constant color.
        return colors[i];
    }

    let span = stops[i + 1] - stops[i];
    // t = 0 on a degenerate (zero-width) bracket — no division by zero.
    let t = if span > 0.0 { (v - stops[i]) / span } else { 0.0 };

    let lo = colors[i];
    let hi = colors[i + 1];
    [
        lo[0] * (1.0 - t) + hi[0] * t,
        lo[1] * (1.0 - t) + hi[1] * t,
        lo[2] * (1.0 - t) + hi[2] * t,
    ]
}

// ---------------------------------------------------------------------------
// Field entry points
// ---------------------------------------------------------------------------

/// Map every element of `field` through the stop/color tables, producing a
/// freshly allocated RGB field of the same shape.
///
/// Tables are borrowed for the duration of the call only; nothing is
/// retained between calls.
///
/// # Errors
/// [`ColorMapError::LengthMismatch`] if the tables differ in length,
/// [`ColorMapError::EmptyTable`] if K = 0. No output is produced on error.
pub fn color_map(
    field: &Field<f32>,
    stops: &[f32],
    colors: &[[f32; 3]],
) -> Result<RgbField, ColorMapError> {
    validate_tables(stops, colors)?;

    let mut out = RgbField::new(field.width(), field.height());
    for (x, y, v) in field.elements() {
        out.set(x, y, map_value(v, stops, colors));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// ColorMap — validated, reusable table pair
// ---------------------------------------------------------------------------

/// A validated stop/color table pair.
///
/// Validation happens once in [`ColorMap::new`]; [`ColorMap::apply`] and
/// [`ColorMap::map_value`] are then infallible. The GPU path
/// (`gpu::colormap::GpuColorMap`) takes a `&ColorMap` for the same reason:
/// table-shape errors are caught CPU-side before any dispatch.
#[derive(Debug, Clone)]
pub struct ColorMap {
    stops: Vec<f32>,
    colors: Vec<[f32; 3]>,
}

impl ColorMap {
    /// Build a colormap from stop levels and index-aligned RGB triples.
    ///
    /// # Errors
    /// Same table-shape rules as [`color_map`].
    pub fn new(stops: Vec<f32>, colors: Vec<[f32; 3]>) -> Result<Self, ColorMapError> {
        validate_tables(&stops, &colors)?;
        Ok(ColorMap { stops, colors })
    }

    /// The seven-stop heat ramp: black, navy, cyan, green, yellow, red,
    /// white at levels 0.0, 0.2, 0.4, 0.6, 0.8, 0.97, 1.0.
    pub fn heat() -> Self {
        ColorMap {
            stops: vec![0.0, 0.2, 0.4, 0.6, 0.8, 0.97, 1.0],
            colors: vec![
                [0.0, 0.0, 0.0], // black
                [0.0, 0.0, 0.5], // navy
                [0.0, 1.0, 1.0], // cyan
                [0.0, 1.0, 0.0], // green
                [1.0, 1.0, 0.0], // yellow
                [1.0, 0.0, 0.0], // red
                [1.0, 1.0, 1.0], // white
            ],
        }
    }

    /// Number of stops (K >= 1 by construction).
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        false // K >= 1 enforced by new()
    }

    pub fn stops(&self) -> &[f32] {
        &self.stops
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Map a single scalar.
    #[inline]
    pub fn map_value(&self, v: f32) -> [f32; 3] {
        map_value(v, &self.stops, &self.colors)
    }

    /// Map every element of `field`, producing a fresh RGB field.
    pub fn apply(&self, field: &Field<f32>) -> RgbField {
        let mut out = RgbField::new(field.width(), field.height());
        for (x, y, v) in field.elements() {
            out.set(x, y, map_value(v, &self.stops, &self.colors));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_rgb_eq(got: [f32; 3], want: [f32; 3]) {
        for c in 0..3 {
            assert!(
                (got[c] - want[c]).abs() < EPS,
                "channel {c}: got {got:?}, want {want:?}"
            );
        }
    }

    #[test]
    fn test_midpoint_between_black_and_green() {
        // The worked example: stops [0, 0.5, 1], colors black/green/white,
        // input 0.25 → midpoint between black and green.
        let stops = [0.0, 0.5, 1.0];
        let colors = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 1.0]];
        assert_rgb_eq(map_value(0.25, &stops, &colors), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_exact_stops_return_table_colors() {
        let map = ColorMap::heat();
        for (i, &s) in map.stops().iter().enumerate() {
            assert_rgb_eq(map.map_value(s), map.colors()[i]);
        }
    }

    #[test]
    fn test_clamp_below_first_stop() {
        let map = ColorMap::heat();
        assert_rgb_eq(map.map_value(-5.0), map.colors()[0]);
    }

    #[test]
    fn test_clamp_above_last_stop() {
        let map = ColorMap::heat();
        assert_rgb_eq(map.map_value(5.0), *map.colors().last().unwrap());
    }

    #[test]
    fn test_single_stop_is_constant() {
        let stops = [0.5];
        let colors = [[0.2, 0.4, 0.6]];
        assert_rgb_eq(map_value(0.0, &stops, &colors), [0.2, 0.4, 0.6]);
        assert_rgb_eq(map_value(0.5, &stops, &colors), [0.2, 0.4, 0.6]);
        assert_rgb_eq(map_value(1.0, &stops, &colors), [0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_duplicate_adjacent_stops_take_first_bracket() {
        // At the tie, the first bracket containing 0.5 is (0.0, 0.5) with
        // t = 1, so the first of the two colors at that level wins.
        let stops = [0.0, 0.5, 0.5, 1.0];
        let colors = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
        ];
        assert_rgb_eq(map_value(0.5, &stops, &colors), [1.0, 0.0, 0.0]);
        // Just above the step, interpolation runs green → white.
        let just_above = map_value(0.75, &stops, &colors);
        assert_rgb_eq(just_above, [0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_output_stays_in_unit_range() {
        // Convex combination: in-range color tables keep output in [0, 1].
        let map = ColorMap::heat();
        let mut v = -0.2f32;
        while v <= 1.2 {
            let [r, g, b] = map.map_value(v);
            for c in [r, g, b] {
                assert!((0.0..=1.0).contains(&c), "value {v}: channel {c} escaped [0,1]");
            }
            v += 0.01;
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let field = Field::from_vec(1, 1, vec![0.5f32]);
        let stops = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0]; // 6 stops
        let colors = [[0.0; 3]; 7]; // 7 colors
        let err = color_map(&field, &stops, &colors).unwrap_err();
        assert_eq!(err, ColorMapError::LengthMismatch { stops: 6, colors: 7 });
    }

    #[test]
    fn test_empty_tables_rejected() {
        let field = Field::from_vec(1, 1, vec![0.5f32]);
        let err = color_map(&field, &[], &[]).unwrap_err();
        assert_eq!(err, ColorMapError::EmptyTable);

        assert_eq!(ColorMap::new(vec![], vec![]).unwrap_err(), ColorMapError::EmptyTable);
    }

    #[test]
    fn test_field_mapping_matches_scalar_kernel() {
        let data = vec![0.1f32, 0.2, 0.33, 0.44, 0.55, 0.66];
        let field = Field::from_vec(3, 2, data.clone());
        let map = ColorMap::heat();
        let rgb = map.apply(&field);
        assert_eq!(rgb.width(), 3);
        assert_eq!(rgb.height(), 2);
        for (x, y, v) in field.elements() {
            assert_rgb_eq(rgb.get(x, y), map.map_value(v));
        }
        // Free function agrees with the struct path.
        let rgb2 = color_map(&field, map.stops(), map.colors()).unwrap();
        assert_eq!(rgb.as_slice(), rgb2.as_slice());
    }

    #[test]
    fn test_apply_allocates_fresh_output() {
        let field = Field::from_vec(2, 1, vec![0.3f32, 0.7]);
        let map = ColorMap::heat();
        let a = map.apply(&field);
        let b = map.apply(&field);
        // Same contents, distinct allocations.
        assert_eq!(a.as_slice(), b.as_slice());
        assert_ne!(a.as_slice().as_ptr(), b.as_slice().as_ptr());
    }

    #[test]
    fn test_error_display() {
        let e = ColorMapError::LengthMismatch { stops: 6, colors: 7 };
        let msg = e.to_string();
        assert!(msg.contains('6') && msg.contains('7'), "unhelpful message: {msg}");
    }
}
