use std::borrow::Cow;

use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, BufferSize, BufferUsages,
    Device, Queue, ShaderStages,
};

use crate::scene::{Region, SceneBuffers};

/// Binding slot of the scene summary uniform. Storage regions follow it
/// in the order of `SceneBuffers::regions`.
pub const SUMMARY_BINDING: u32 = 0;

fn binding_type(binding: u32, stride: usize) -> BindingType {
    let ty = if binding == SUMMARY_BINDING {
        BufferBindingType::Uniform
    } else {
        BufferBindingType::Storage { read_only: true }
    };
    BindingType::Buffer {
        ty,
        has_dynamic_offset: false,
        min_binding_size: BufferSize::new(stride as u64),
    }
}

fn usage(binding: u32) -> BufferUsages {
    if binding == SUMMARY_BINDING {
        BufferUsages::UNIFORM | BufferUsages::COPY_DST
    } else {
        BufferUsages::STORAGE | BufferUsages::COPY_DST
    }
}

/// Zero-sized bindings are rejected, so an empty region is uploaded as a
/// single zeroed record. The summary counts keep the shader from reading it.
fn padded<'a>(region: &Region<'a>) -> Cow<'a, [u8]> {
    if region.bytes.is_empty() {
        Cow::Owned(vec![0; region.stride])
    } else {
        Cow::Borrowed(region.bytes)
    }
}

impl SceneBuffers {
    /// Layout entries matching `upload`, visible to compute shaders.
    pub fn bind_group_layout_entries(&self) -> Vec<BindGroupLayoutEntry> {
        self.regions()
            .iter()
            .zip(0u32..)
            .map(|(region, binding)| BindGroupLayoutEntry {
                binding,
                visibility: ShaderStages::COMPUTE,
                ty: binding_type(binding, region.stride),
                count: None,
            })
            .collect()
    }

    /// Creates one GPU buffer per region, initialised with the packed bytes.
    pub fn upload(&self, device: &Device) -> GpuScene {
        let buffers = self
            .regions()
            .iter()
            .zip(0u32..)
            .map(|(region, binding)| {
                let contents = padded(region);
                let buffer = device.create_buffer_init(&BufferInitDescriptor {
                    label: Some(region.name),
                    contents: &contents,
                    usage: usage(binding),
                });
                log::debug!(
                    "uploaded {} ({} bytes) to binding {binding}",
                    region.name,
                    contents.len()
                );
                buffer
            })
            .collect();
        GpuScene {
            layout_entries: self.bind_group_layout_entries(),
            buffers,
        }
    }
}

/// Scene buffers resident on the GPU.
pub struct GpuScene {
    layout_entries: Vec<BindGroupLayoutEntry>,
    buffers: Vec<Buffer>,
}

impl GpuScene {
    pub fn bind_group_layout_entries(&self) -> &[BindGroupLayoutEntry] {
        &self.layout_entries
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn create_bind_group_layout(&self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene"),
            entries: &self.layout_entries,
        })
    }

    pub fn create_bind_group(&self, device: &Device, layout: &BindGroupLayout) -> BindGroup {
        let entries: Vec<BindGroupEntry> = self
            .buffers
            .iter()
            .zip(0u32..)
            .map(|(buffer, binding)| BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene"),
            layout,
            entries: &entries,
        })
    }

    /// Overwrites the summary uniform, e.g. after the scene was repacked
    /// with the same buffer sizes.
    pub fn write_summary(&self, queue: &Queue, scene: &SceneBuffers) {
        if let Some(buffer) = self.buffers.first() {
            queue.write_buffer(buffer, 0, scene.summary_bytes());
        }
    }
}
