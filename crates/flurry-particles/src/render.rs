//! Handing particle state to a renderer
//!
//! Two outputs: per-shape instance batches of `Pod` records ready for a GPU
//! upload, and a [`RenderSink`] callback per particle for renderers that set
//! transforms and colors one instance at a time.

use crate::field::ParticleField;
use crate::particle::{ParticleInstance, ParticleShape, ParticleTransform};
use serde::Serialize;

const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Receives one callback per particle per frame.
pub trait RenderSink {
    fn particle(
        &mut self,
        index: usize,
        shape: ParticleShape,
        instance: usize,
        transform: ParticleTransform,
        color: [f32; 3],
    );

    /// Called once after the last particle of a frame
    fn finish(&mut self) {}
}

/// Feed every particle of `field` to `sink`.
pub fn emit(field: &ParticleField, sink: &mut dyn RenderSink) {
    for (index, instance) in field.instances().iter().enumerate() {
        let [x, y, z, size] = instance.pos_size;
        let [r, g, b, _] = instance.color;
        sink.particle(
            index,
            ParticleShape::for_index(index),
            ParticleShape::instance_slot(index),
            ParticleTransform {
                position: [x, y, z],
                rotation: IDENTITY_ROTATION,
                scale: size,
            },
            [r, g, b],
        );
    }
    sink.finish();
}

/// Instances grouped by shape, one draw call each
pub struct ShapeBatches {
    batches: [Vec<ParticleInstance>; ParticleShape::COUNT],
}

impl ShapeBatches {
    pub fn new() -> Self {
        Self {
            batches: Default::default(),
        }
    }

    /// Re-pack from the field's latest instances. Buffers keep their
    /// capacity across frames.
    pub fn pack(&mut self, instances: &[ParticleInstance]) {
        for batch in &mut self.batches {
            batch.clear();
        }
        for (index, instance) in instances.iter().enumerate() {
            self.batches[index % ParticleShape::COUNT].push(*instance);
        }
    }

    pub fn batch(&self, shape: ParticleShape) -> &[ParticleInstance] {
        &self.batches[shape as usize]
    }

    /// Raw bytes of one batch for a vertex buffer upload
    pub fn bytes(&self, shape: ParticleShape) -> &[u8] {
        bytemuck::cast_slice(self.batch(shape))
    }

    pub fn total(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

impl Default for ShapeBatches {
    fn default() -> Self {
        Self::new()
    }
}

/// One sink callback, as recorded by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkRecord {
    pub index: usize,
    pub shape: ParticleShape,
    pub instance: usize,
    pub transform: ParticleTransform,
    pub color: [f32; 3],
}

/// Sink that keeps every callback, optionally only every `stride`-th
/// particle, for frame dumps and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<SinkRecord>,
    pub frames: usize,
    stride: usize,
}

impl RecordingSink {
    pub fn with_stride(stride: usize) -> Self {
        Self {
            records: Vec::new(),
            frames: 0,
            stride: stride.max(1),
        }
    }
}

impl RenderSink for RecordingSink {
    fn particle(
        &mut self,
        index: usize,
        shape: ParticleShape,
        instance: usize,
        transform: ParticleTransform,
        color: [f32; 3],
    ) {
        if index % self.stride.max(1) != 0 {
            return;
        }
        self.records.push(SinkRecord {
            index,
            shape,
            instance,
            transform,
            color,
        });
    }

    fn finish(&mut self) {
        self.frames += 1;
    }
}
