// field.rs — Scalar field containers.
//
// `Field<T>` is a runtime-sized 2D matrix of scalar values, row-major with
// an explicit stride (in elements) so rows can carry alignment padding for
// GPU upload. `RgbField` is the colormap output: the same 2D shape with a
// trailing interleaved channel dimension of size 3.
//
// `ScalarKind` is a plain runtime tag for the supported element types,
// mapped to and from behaviour with ordinary `match` — no type-level
// machinery.

use std::fmt;

// ---------------------------------------------------------------------------
// ScalarKind
// ---------------------------------------------------------------------------

/// Runtime tag for the element types a `Field` can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    U8,
    U16,
    F32,
}

impl ScalarKind {
    /// Size of one element in bytes.
    pub fn size_of(self) -> usize {
        match self {
            ScalarKind::U8 => 1,
            ScalarKind::U16 => 2,
            ScalarKind::F32 => 4,
        }
    }

    /// Short lowercase name, stable across releases.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::F32 => "f32",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Scalar trait
// ---------------------------------------------------------------------------

/// Trait for types that can serve as elements of a `Field`.
///
/// `to_f32`/`from_f32` are raw conversions (u8 42 → 42.0). Normalized
/// [0, 255] ↔ [0, 1] mapping lives in `convert`.
pub trait Scalar: Copy + Default + Send + Sync + PartialOrd + 'static {
    /// The runtime tag for this element type.
    const KIND: ScalarKind;

    fn to_f32(self) -> f32;

    /// Construct from f32, clamping and rounding as appropriate.
    fn from_f32(v: f32) -> Self;
}

impl Scalar for u8 {
    const KIND: ScalarKind = ScalarKind::U8;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 255.0).round() as u8
    }
}

impl Scalar for u16 {
    const KIND: ScalarKind = ScalarKind::U16;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 65535.0).round() as u16
    }
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::F32;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

// ---------------------------------------------------------------------------
// Field<T>
// ---------------------------------------------------------------------------

/// A 2D scalar field with runtime dimensions, generic over element type `T`.
///
/// Row-major, contiguous buffer with explicit stride. Elements for row y
/// start at index `y * stride`; `stride >= width`, measured in elements.
pub struct Field<T: Scalar> {
    /// Element data in row-major order. Length = height * stride.
    data: Vec<T>,
    width: usize,
    height: usize,
    /// Row stride in elements (not bytes).
    stride: usize,
}

impl<T: Scalar> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field {
            data: self.data.clone(),
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

impl<T: Scalar> Field<T> {
    /// Create a zero-initialized field. Stride equals width (no padding).
    pub fn new(width: usize, height: usize) -> Self {
        Self::new_with_stride(width, height, width)
    }

    /// Create a zero-initialized field with an explicit stride.
    ///
    /// # Panics
    /// Panics if `stride < width`.
    pub fn new_with_stride(width: usize, height: usize, stride: usize) -> Self {
        assert!(
            stride >= width,
            "stride ({stride}) must be >= width ({width})"
        );
        Field {
            data: vec![T::default(); height * stride],
            width,
            height,
            stride,
        }
    }

    /// Create a field from an existing element vector. Stride is set equal
    /// to width.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        Field {
            data,
            width,
            height,
            stride: width,
        }
    }

    /// Create a field from raw data with explicit stride.
    ///
    /// # Panics
    /// Panics if `data.len() != height * stride` or `stride < width`.
    pub fn from_vec_with_stride(
        width: usize,
        height: usize,
        stride: usize,
        data: Vec<T>,
    ) -> Self {
        assert!(stride >= width, "stride ({stride}) must be >= width ({width})");
        assert_eq!(
            data.len(),
            height * stride,
            "data length ({}) must equal height * stride ({})",
            data.len(),
            height * stride,
        );
        Field {
            data,
            width,
            height,
            stride,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The runtime tag for this field's element type.
    pub fn kind(&self) -> ScalarKind {
        T::KIND
    }

    /// Get the element at (x, y). x is column, y is row.
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.bounds_check(x, y);
        self.data[y * self.stride + x]
    }

    /// Mutable reference to the element at (x, y).
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        self.bounds_check(x, y);
        let idx = y * self.stride + x;
        &mut self.data[idx]
    }

    /// Set the element at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    /// Borrow a single row as a slice (padding excluded).
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Iterate over all elements as `(x, y, value)` tuples, row-major,
    /// skipping stride padding.
    pub fn elements(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.data[y * self.stride + x]))
        })
    }

    /// The underlying buffer, including stride padding.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the underlying buffer.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Total number of elements in the buffer (including stride padding).
    pub fn buffer_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "element ({x},{y}) out of bounds for field {}×{}",
            self.width,
            self.height,
        );
    }
}

impl<T: Scalar + fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Field<{}> {{ {}×{}, stride={} }}",
            T::KIND,
            self.width,
            self.height,
            self.stride,
        )?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(16) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(x, y))?;
            }
            if self.width > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

impl<T: Scalar> std::ops::Index<(usize, usize)> for Field<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.bounds_check(x, y);
        &self.data[y * self.stride + x]
    }
}

impl<T: Scalar> std::ops::IndexMut<(usize, usize)> for Field<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.bounds_check(x, y);
        let idx = y * self.stride + x;
        &mut self.data[idx]
    }
}

// ---------------------------------------------------------------------------
// RgbField
// ---------------------------------------------------------------------------

/// An RGB image with the same 2D shape as its source field and a trailing
/// channel dimension of size 3.
///
/// Layout is interleaved row-major (HWC): `[r, g, b, r, g, b, ...]`, no
/// stride padding. Channel values are f32, in [0, 1] when produced by the
/// colormap from a table with in-range colors.
#[derive(Clone)]
pub struct RgbField {
    /// Interleaved channel data. Length = width * height * 3.
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl RgbField {
    /// Create a black (all-zero) RGB field.
    pub fn new(width: usize, height: usize) -> Self {
        RgbField {
            data: vec![0.0; width * height * 3],
            width,
            height,
        }
    }

    /// Create an RGB field from an interleaved channel vector.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height * 3`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width * height * 3,
            "data length ({}) must equal width * height * 3 ({})",
            data.len(),
            width * height * 3,
        );
        RgbField {
            data,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the RGB triple at (x, y).
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.bounds_check(x, y);
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Set the RGB triple at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, rgb: [f32; 3]) {
        self.bounds_check(x, y);
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Iterate over all triples as `(x, y, [r, g, b])`, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, [f32; 3])> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y, self.get(x, y))))
    }

    /// The interleaved channel buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the interleaved channel buffer.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for rgb field {}×{}",
            self.width,
            self.height,
        );
    }
}

impl fmt::Debug for RgbField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RgbField {{ {}×{}×3 }}", self.width, self.height)?;
        for y in 0..self.height.min(4) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(6) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                let [r, g, b] = self.get(x, y);
                write!(f, "({r:.3}, {g:.3}, {b:.3})")?;
            }
            if self.width > 6 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 4 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
