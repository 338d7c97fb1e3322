use crate::{
    DiwaResult, Topology,
    core::{LayerRaw, zeroed_buffer},
};

/// Scratch buffer for back propagation, one delta per non-input neuron.
///
/// Sized to the neuron count of the topology; the trailing `n_inputs` slots are never touched.
#[derive(Debug, Clone, Default)]
pub struct DeltaBuffer {
    layers: Box<[LayerRaw]>,
    buffer: Box<[f64]>,
}

impl DeltaBuffer {
    pub fn create(topology: &Topology) -> DiwaResult<Self> {
        let buffer = zeroed_buffer(topology.neuron_count())?;
        let mut layers = Vec::with_capacity(topology.n_layers());
        let mut counter = 0usize;
        for u in 0..topology.n_layers() {
            let n = topology.layer_width(u);
            layers.push(LayerRaw {
                n,
                n_previous: topology.previous_width(u),
                offset: counter,
            });
            counter += n;
        }
        debug_assert!(counter <= buffer.len());
        Ok(Self {
            layers: layers.into_boxed_slice(),
            buffer,
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// # Panics
    ///
    /// If `index` is out of range.
    #[track_caller]
    pub fn layer(&self, index: usize) -> &[f64] {
        let LayerRaw { n, offset, .. } = self.layers[index];
        &self.buffer[offset..offset + n]
    }

    /// # Panics
    ///
    /// If `index` is out of range.
    #[track_caller]
    pub fn layer_mut(&mut self, index: usize) -> &mut [f64] {
        let LayerRaw { n, offset, .. } = self.layers[index];
        &mut self.buffer[offset..offset + n]
    }

    /// Mutable deltas of layer `index` together with the deltas of the layer after it.
    ///
    /// # Panics
    ///
    /// If `index + 1` is out of range.
    #[track_caller]
    pub fn layer_and_next_mut(&mut self, index: usize) -> (&mut [f64], &[f64]) {
        let this = self.layers[index];
        let next = self.layers[index + 1];
        let (head, tail) = self.buffer.split_at_mut(next.offset);
        (
            &mut head[this.offset..this.offset + this.n],
            &tail[..next.n],
        )
    }
}
