// gpu/colormap.rs — GPU colormap kernel.
//
// OUTPUT STRATEGY: dense rgb buffer (no atomics)
// Each thread writes its element's three channels to its own slot in a
// flat storage buffer — no contention, no synchronisation. The map is a
// pure per-element function of the input value and the two read-only
// tables, so nothing else is needed.
//
// Table-shape validation happens CPU-side: the kernel only accepts a
// `ColorMap`, which enforced the rules at construction. Nothing invalid
// ever reaches a dispatch.
//
// Buffer size: width × height × 3 × 4 bytes (≈3.7 MB for a 640×480 field).

use wgpu::util::DeviceExt;

use crate::colormap::ColorMap;
use crate::field::RgbField;
use crate::gpu::device::GpuDevice;
use crate::gpu::field::GpuField;

// ---------------------------------------------------------------------------
// Uniform params (must match WGSL struct Params exactly)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    n_stops: u32,
    _pad: u32,
}

// ---------------------------------------------------------------------------
// GpuColorMap
// ---------------------------------------------------------------------------

/// GPU colormap pipeline.
///
/// Create once per device; call [`apply`](GpuColorMap::apply) per field.
/// The stop/color tables are uploaded per call — they are small (K triples)
/// and the contract says they arrive fresh each time.
pub struct GpuColorMap {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl GpuColorMap {
    pub fn new(gpu: &GpuDevice) -> Self {
        let shader_template = include_str!("../shaders/colormap.wgsl");
        let shader_src = shader_template
            .replace("{{WG_X}}", &gpu.workgroup_size.x.to_string())
            .replace("{{WG_Y}}", &gpu.workgroup_size.y.to_string());

        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("colormap.wgsl"),
                source: wgpu::ShaderSource::Wgsl(shader_src.into()),
            });

        let bgl = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("GpuColorMap BGL"),
                entries: &[
                    // 0 — input field texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        },
                        count: None,
                    },
                    // 1 — stop levels (storage read)
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // 2 — colors, interleaved rgb (storage read)
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // 3 — dense rgb output (storage read_write)
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // 4 — params uniform
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("GpuColorMap pipeline layout"),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });

        let pipeline = gpu
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("color_map"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: "color_map",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        GpuColorMap { pipeline, bgl }
    }

    /// Map every element of an uploaded field through `map`'s tables and
    /// read the result back as a freshly allocated `RgbField`.
    ///
    /// One dispatch covering the field, one buffer readback. Agrees with
    /// `ColorMap::apply` element-for-element to float tolerance.
    pub fn apply(&self, gpu: &GpuDevice, field: &GpuField, map: &ColorMap) -> RgbField {
        let w = field.width;
        let h = field.height;
        let n_out = (w * h) as usize * 3;
        let out_size = (n_out * std::mem::size_of::<f32>()) as u64;

        let stops_buf = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GpuColorMap stops"),
                contents: bytemuck::cast_slice(map.stops()),
                usage: wgpu::BufferUsages::STORAGE,
            });

        // [[f32; 3]] flattens to 3K contiguous floats.
        let colors_buf = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GpuColorMap colors"),
                contents: bytemuck::cast_slice(map.colors()),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let out_buf = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GpuColorMap output"),
            size: out_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = Params {
            width: w,
            height: h,
            n_stops: map.len() as u32,
            _pad: 0,
        };
        let params_buf = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GpuColorMap params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GpuColorMap BG"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&field.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: stops_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: out_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_buf.as_entire_binding(),
                },
            ],
        });

        let (wg_x, wg_y) = gpu.dispatch_size(w, h);
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuColorMap dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("color_map"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(wg_x, wg_y, 1);
        }

        let rb = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GpuColorMap readback"),
            size: out_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        encoder.copy_buffer_to_buffer(&out_buf, 0, &rb, 0, out_size);
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = rb.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).expect("colormap readback channel closed");
        });
        gpu.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .expect("colormap readback callback never fired")
            .expect("colormap readback failed");

        let mapped = slice.get_mapped_range();
        let data: Vec<f32> = bytemuck::cast_slice(&mapped).to_vec();
        drop(mapped);
        rb.unmap();

        RgbField::from_vec(w as usize, h as usize, data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
