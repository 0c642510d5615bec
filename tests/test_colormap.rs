// tests/test_colormap.rs — Integration tests for the colormap through the
// public API only.
//
// Run with `cargo test --test test_colormap`.

use tintfield::colormap::{color_map, ColorMap, ColorMapError};
use tintfield::field::Field;

const EPS: f32 = 1e-6;

fn assert_rgb(got: [f32; 3], want: [f32; 3]) {
    for c in 0..3 {
        assert!(
            (got[c] - want[c]).abs() < EPS,
            "channel {c}: got {got:?}, want {want:?}"
        );
    }
}

// ===== The worked example =====

#[test]
fn midpoint_between_stops_blends_linearly() {
    let field = Field::from_vec(1, 1, vec![0.25f32]);
    let stops = [0.0, 0.5, 1.0];
    let colors = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 1.0]];
    let rgb = color_map(&field, &stops, &colors).unwrap();
    assert_rgb(rgb.get(0, 0), [0.0, 0.5, 0.0]);
}

// ===== The demo's sample matrix through the heat ramp =====

#[test]
fn heat_ramp_on_sample_matrix() {
    // 2 rows × 3 cols, row-major.
    let field = Field::from_vec(3, 2, vec![0.1f32, 0.2, 0.33, 0.44, 0.55, 0.66]);
    let map = ColorMap::heat();
    let rgb = map.apply(&field);

    assert_eq!(rgb.width(), 3);
    assert_eq!(rgb.height(), 2);

    // 0.2 sits exactly on the navy stop.
    assert_rgb(rgb.get(1, 0), [0.0, 0.0, 0.5]);
    // 0.1 is halfway between black (0.0) and navy (0.2).
    assert_rgb(rgb.get(0, 0), [0.0, 0.0, 0.25]);
    // 0.44 is 20% of the way from cyan (0.4) to green (0.6).
    assert_rgb(rgb.get(0, 1), [0.0, 1.0, 0.8]);
}

// ===== Table-shape errors =====

#[test]
fn mismatched_table_lengths_fail_fast() {
    let field = Field::from_vec(2, 2, vec![0.1f32, 0.2, 0.3, 0.4]);
    let stops = vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    let colors = vec![[0.0f32; 3]; 7];
    assert_eq!(
        color_map(&field, &stops, &colors).unwrap_err(),
        ColorMapError::LengthMismatch { stops: 6, colors: 7 }
    );
    assert!(ColorMap::new(stops, colors).is_err());
}

#[test]
fn empty_tables_fail_fast() {
    let field = Field::from_vec(1, 1, vec![0.0f32]);
    assert_eq!(
        color_map(&field, &[], &[]).unwrap_err(),
        ColorMapError::EmptyTable
    );
}

// ===== Degenerate-but-valid tables =====

#[test]
fn single_stop_table_is_constant() {
    let field = Field::from_vec(2, 2, vec![0.0f32, 0.3, 0.7, 1.0]);
    let map = ColorMap::new(vec![0.5], vec![[0.9, 0.1, 0.4]]).unwrap();
    let rgb = map.apply(&field);
    for (_, _, px) in rgb.pixels() {
        assert_rgb(px, [0.9, 0.1, 0.4]);
    }
}

#[test]
fn duplicate_adjacent_stops_are_permitted() {
    let field = Field::from_vec(1, 1, vec![0.5f32]);
    let stops = [0.0, 0.5, 0.5, 1.0];
    let colors = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
    ];
    // The first bracket containing 0.5 wins the tie, selecting the first
    // of the two colors stacked at that level.
    let rgb = color_map(&field, &stops, &colors).unwrap();
    assert_rgb(rgb.get(0, 0), [1.0, 0.0, 0.0]);
}

// ===== Clamping =====

#[test]
fn out_of_range_values_clamp_not_error() {
    let field = Field::from_vec(2, 1, vec![-3.0f32, 42.0]);
    let map = ColorMap::heat();
    let rgb = map.apply(&field);
    assert_rgb(rgb.get(0, 0), map.colors()[0]);
    assert_rgb(rgb.get(1, 0), *map.colors().last().unwrap());
}

// ===== Convexity over a dense sweep =====

#[test]
fn output_channels_stay_in_unit_range() {
    let n = 1024usize;
    let data: Vec<f32> = (0..n).map(|i| i as f32 / (n - 1) as f32 * 1.4 - 0.2).collect();
    let field = Field::from_vec(n, 1, data);
    let map = ColorMap::heat();
    let rgb = map.apply(&field);
    for (x, _, px) in rgb.pixels() {
        for c in px {
            assert!((0.0..=1.0).contains(&c), "column {x}: channel {c} escaped [0,1]");
        }
    }
}

// ===== Exact-stop idempotence for every stop =====

#[test]
fn exact_stop_values_map_to_table_colors() {
    let map = ColorMap::heat();
    let field = Field::from_vec(map.len(), 1, map.stops().to_vec());
    let rgb = map.apply(&field);
    for (i, &color) in map.colors().iter().enumerate() {
        assert_rgb(rgb.get(i, 0), color);
    }
}
