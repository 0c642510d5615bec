// gpu/field.rs — GPU field representation and CPU→GPU upload.
//
// `GpuField` holds a `Field<f32>` on the GPU as an `R32Float` 2D texture,
// ready to bind to the colormap kernel. Upload compacts away any stride
// padding; readback (tests/debug only) returns a flat, padding-free vector.
//
// THE STRIDE-COMPACTION PROBLEM
// A CPU field may have stride > width (alignment padding per row), and
// wgpu's `copy_buffer_to_texture` requires `bytes_per_row` to be a
// multiple of 256. Neither layout matches the other, so every upload goes
// through a staging buffer: each row's active elements are copied
// contiguously into rows padded up to the 256-byte boundary.

use wgpu::util::DeviceExt;

use crate::field::{Field, ScalarKind};
use crate::gpu::device::GpuDevice;

/// wgpu requires buffer↔texture copies to have `bytes_per_row` aligned to
/// this value.
const COPY_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Texture format for a field of the given element kind.
///
/// A plain tag → format lookup; extend the match when a new `ScalarKind`
/// is added (the compiler will insist).
pub(crate) fn format_for(kind: ScalarKind) -> wgpu::TextureFormat {
    match kind {
        ScalarKind::U8 => wgpu::TextureFormat::R8Unorm,
        ScalarKind::U16 => wgpu::TextureFormat::R16Uint,
        ScalarKind::F32 => wgpu::TextureFormat::R32Float,
    }
}

/// A scalar field resident on the GPU as a single-channel f32 texture.
///
/// Created via [`GpuField::upload`]. Owns its wgpu resources; dropping it
/// releases the texture memory.
pub struct GpuField {
    pub texture: wgpu::Texture,
    /// Default view (full texture), bound to compute pipelines.
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl GpuField {
    /// Upload a CPU `Field<f32>` to the GPU.
    ///
    /// Allocates an `R32Float` texture, compacts the field rows into a
    /// 256-byte-row-aligned staging buffer (stride padding stripped), and
    /// submits the copy. Returns immediately — the copy runs on the GPU
    /// timeline and is ordered before any later submission on the same
    /// queue.
    pub fn upload(gpu: &GpuDevice, src: &Field<f32>) -> Self {
        let width = src.width() as u32;
        let height = src.height() as u32;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("GpuField"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format_for(src.kind()),
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Staging layout: rows of `width` f32s, each row padded out to the
        // 256-byte copy alignment.
        let row_bytes = width * 4;
        let aligned_bytes_per_row = align_to(row_bytes, COPY_ALIGNMENT);
        let elems_per_row = (aligned_bytes_per_row / 4) as usize;

        let mut staging = vec![0.0f32; elems_per_row * height as usize];
        let src_data = src.as_slice();
        let src_stride = src.stride();
        for y in 0..height as usize {
            let src_start = y * src_stride;
            let dst_start = y * elems_per_row;
            staging[dst_start..dst_start + width as usize]
                .copy_from_slice(&src_data[src_start..src_start + width as usize]);
        }

        let staging_buf = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GpuField::staging"),
                contents: bytemuck::cast_slice(&staging),
                usage: wgpu::BufferUsages::COPY_SRC,
            });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuField::upload"),
            });

        encoder.copy_buffer_to_texture(
            wgpu::ImageCopyBuffer {
                buffer: &staging_buf,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));

        GpuField {
            texture,
            view,
            width,
            height,
        }
    }

    /// Read the GPU texture back to CPU memory.
    ///
    /// Expensive and synchronous — stalls until the copy completes. Tests
    /// and debug tools only, never the hot path.
    ///
    /// Returns a flat `Vec<f32>` of length `width * height`, row-major,
    /// no padding.
    pub fn readback(&self, gpu: &GpuDevice) -> Vec<f32> {
        let row_bytes = self.width * 4;
        let aligned_bytes_per_row = align_to(row_bytes, COPY_ALIGNMENT);
        let readback_size = (aligned_bytes_per_row * self.height) as u64;

        let readback_buf = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GpuField::readback"),
            size: readback_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuField::readback"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback_buf,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let buf_slice = readback_buf.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buf_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).expect("readback channel closed");
        });

        gpu.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .expect("readback map callback never fired")
            .expect("readback map failed");

        // Strip the alignment padding from each row.
        let mapped = buf_slice.get_mapped_range();
        let floats: &[f32] = bytemuck::cast_slice(&mapped);
        let elems_per_row = (aligned_bytes_per_row / 4) as usize;
        let mut out = vec![0.0f32; (self.width * self.height) as usize];
        for y in 0..self.height as usize {
            let src_start = y * elems_per_row;
            let dst_start = y * self.width as usize;
            out[dst_start..dst_start + self.width as usize]
                .copy_from_slice(&floats[src_start..src_start + self.width as usize]);
        }
        drop(mapped);
        readback_buf.unmap();

        out
    }
}

/// Round `value` up to the next multiple of `alignment`.
#[inline]
pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) / alignment * alignment
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
