// tintfield — colormap (heat map) rendering for scalar fields.
//
// A scalar field (2D matrix of floats, values in [0, 1]) goes in; an RGB
// image comes out, colored by piecewise-linear interpolation over a table
// of (level, color) stops. The CPU implementation in `colormap` is the
// authoritative reference; the wgpu compute kernel in `gpu::colormap` is
// validated against it element-for-element.
//
// AXIS CONVENTION (fixed, crate-wide):
//   - Fields are row-major: x is the column, y is the row, rows are
//     contiguous (up to stride padding).
//   - RGB output is interleaved with the channel as the trailing,
//     fastest-varying dimension: [r, g, b, r, g, b, ...] (HWC).
//   - The planar channel-first layout (CHW) exists only as an explicit
//     conversion in `convert` — never as an implicit representation.

pub mod colormap;
pub mod convert;
pub mod field;
pub mod gpu;
