// gpu/mod.rs — wgpu execution substrate for the colormap.
//
// The CPU implementation in `crate::colormap` is the authoritative
// reference; the compute kernel here implements the identical per-element
// steps and is validated against it element-for-element.
//
// The colormap is embarrassingly parallel: each output element depends
// only on its own input value and the two read-only tables, so the kernel
// needs no atomics and no inter-thread communication — one thread per
// element, a dense output buffer, one readback at the end.

pub mod colormap;
pub mod device;
pub mod field;
