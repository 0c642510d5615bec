// convert.rs — Layout and format conversions.
//
// Everything a caller needs to move between the crate's canonical layout
// (row-major, interleaved HWC, f32) and the representations neighbouring
// systems want: planar channel-first (CHW) float planes, interleaved u8
// for display/storage, and normalized [0, 255] ↔ [0, 1] field conversions.
//
// The interleaved HWC layout is the canonical one; CHW exists only through
// these explicit conversions (see the crate-level axis convention note).

use crate::field::{Field, RgbField, Scalar};

// ---------------------------------------------------------------------------
// Grayscale → RGB
// ---------------------------------------------------------------------------

/// Expand a single-channel field into an RGB field by replicating the
/// channel three times.
pub fn gray_to_rgb(src: &Field<f32>) -> RgbField {
    let mut out = RgbField::new(src.width(), src.height());
    for (x, y, v) in src.elements() {
        out.set(x, y, [v, v, v]);
    }
    out
}

// ---------------------------------------------------------------------------
// Interleaved (HWC) ↔ planar (CHW)
// ---------------------------------------------------------------------------

/// Reorder an interleaved RGB field into planar channel-first layout.
///
/// Output length is `3 * width * height`: the full R plane (row-major),
/// then the G plane, then the B plane.
pub fn rgb_to_planar(src: &RgbField) -> Vec<f32> {
    let plane = src.width() * src.height();
    let mut out = vec![0.0f32; plane * 3];
    for (x, y, rgb) in src.pixels() {
        let i = y * src.width() + x;
        out[i] = rgb[0];
        out[plane + i] = rgb[1];
        out[2 * plane + i] = rgb[2];
    }
    out
}

/// Reassemble an interleaved RGB field from planar channel-first data.
///
/// # Panics
/// Panics if `planes.len() != 3 * width * height`.
pub fn planar_to_rgb(width: usize, height: usize, planes: &[f32]) -> RgbField {
    let plane = width * height;
    assert_eq!(
        planes.len(),
        plane * 3,
        "planar data length ({}) must equal 3 * width * height ({})",
        planes.len(),
        plane * 3,
    );
    let mut out = RgbField::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            out.set(x, y, [planes[i], planes[plane + i], planes[2 * plane + i]]);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Quantization
// ---------------------------------------------------------------------------

/// Quantize an RGB field with [0, 1] channels to interleaved u8.
///
/// Channels are scaled by 255, clamped, and rounded. Output is row-major
/// `[r, g, b, r, g, b, ...]` — the layout display surfaces and image
/// encoders expect.
pub fn rgb_to_u8(src: &RgbField) -> Vec<u8> {
    src.as_slice()
        .iter()
        .map(|&c| (c * 255.0).clamp(0.0, 255.0).round() as u8)
        .collect()
}

/// Convert a u8 field to f32 normalized to [0, 1] (0 → 0.0, 255 → 1.0).
pub fn u8_to_field_normalized(src: &Field<u8>) -> Field<f32> {
    let mut dst = Field::new(src.width(), src.height());
    for (x, y, v) in src.elements() {
        dst.set(x, y, v as f32 / 255.0);
    }
    dst
}

/// Convert a [0, 1] f32 field to u8, clamping and rounding.
pub fn field_to_u8_normalized(src: &Field<f32>) -> Field<u8> {
    let mut dst = Field::new(src.width(), src.height());
    for (x, y, v) in src.elements() {
        dst.set(x, y, (v * 255.0).clamp(0.0, 255.0).round() as u8);
    }
    dst
}

/// Generic raw conversion between any two element types via f32.
///
/// Monomorphized per (S, D) pair; goes through the raw `to_f32`/`from_f32`
/// path defined on each `Scalar` impl (no normalization).
pub fn convert_field<S: Scalar, D: Scalar>(src: &Field<S>) -> Field<D> {
    let mut dst = Field::new(src.width(), src.height());
    for (x, y, v) in src.elements() {
        dst.set(x, y, D::from_f32(v.to_f32()));
    }
    dst
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_to_rgb_replicates_channel() {
        let field = Field::from_vec(2, 1, vec![0.25f32, 0.75]);
        let rgb = gray_to_rgb(&field);
        assert_eq!(rgb.get(0, 0), [0.25, 0.25, 0.25]);
        assert_eq!(rgb.get(1, 0), [0.75, 0.75, 0.75]);
    }

    #[test]
    fn test_planar_reorder_roundtrip() {
        // 2×2 with distinct channel values everywhere.
        let mut rgb = RgbField::new(2, 2);
        rgb.set(0, 0, [0.1, 0.2, 0.3]);
        rgb.set(1, 0, [0.4, 0.5, 0.6]);
        rgb.set(0, 1, [0.7, 0.8, 0.9]);
        rgb.set(1, 1, [1.0, 0.0, 0.5]);

        let planes = rgb_to_planar(&rgb);
        // R plane first, row-major.
        assert_eq!(&planes[0..4], &[0.1, 0.4, 0.7, 1.0]);
        // G plane.
        assert_eq!(&planes[4..8], &[0.2, 0.5, 0.8, 0.0]);
        // B plane.
        assert_eq!(&planes[8..12], &[0.3, 0.6, 0.9, 0.5]);

        let back = planar_to_rgb(2, 2, &planes);
        assert_eq!(back.as_slice(), rgb.as_slice());
    }

    #[test]
    #[should_panic(expected = "planar data length")]
    fn test_planar_to_rgb_wrong_length() {
        let _ = planar_to_rgb(2, 2, &[0.0; 11]);
    }

    #[test]
    fn test_rgb_to_u8_scales_and_clamps() {
        let mut rgb = RgbField::new(2, 1);
        rgb.set(0, 0, [0.0, 0.5, 1.0]);
        rgb.set(1, 0, [-0.5, 1.5, 0.2509804]); // out-of-range channels clamp
        let bytes = rgb_to_u8(&rgb);
        assert_eq!(bytes, vec![0, 128, 255, 0, 255, 64]);
    }

    #[test]
    fn test_normalized_u8_roundtrip() {
        let field = Field::from_vec(2, 2, vec![0u8, 128, 255, 42]);
        let f = u8_to_field_normalized(&field);
        assert!((f.get(0, 0) - 0.0).abs() < 1e-6);
        assert!((f.get(1, 0) - 128.0 / 255.0).abs() < 1e-6);
        assert!((f.get(0, 1) - 1.0).abs() < 1e-6);

        let back = field_to_u8_normalized(&f);
        assert_eq!(back.get(0, 0), 0);
        assert_eq!(back.get(1, 0), 128);
        assert_eq!(back.get(0, 1), 255);
        assert_eq!(back.get(1, 1), 42);
    }

    #[test]
    fn test_generic_convert_raw() {
        let field = Field::from_vec(2, 1, vec![0u8, 200]);
        let f: Field<f32> = convert_field(&field);
        assert!((f.get(1, 0) - 200.0).abs() < 1e-6);
        let back: Field<u8> = convert_field(&f);
        assert_eq!(back.get(1, 0), 200);
    }
}
