use crate::{
    DiwaResult, Topology,
    core::{LayerRaw, zeroed_buffer},
};

/// Buffer for storing neuron outputs: the inputs first, then every layer in order.
#[derive(Debug, Clone, Default)]
pub struct ActivationBuffer {
    n_inputs: usize,
    layers: Box<[LayerRaw]>,
    buffer: Box<[f64]>,
}

impl ActivationBuffer {
    pub fn create(topology: &Topology) -> DiwaResult<Self> {
        let buffer = zeroed_buffer(topology.neuron_count())?;
        let mut layers = Vec::with_capacity(topology.n_layers());
        let mut counter = topology.n_inputs();
        for u in 0..topology.n_layers() {
            let n = topology.layer_width(u);
            layers.push(LayerRaw {
                n,
                n_previous: topology.previous_width(u),
                offset: counter,
            });
            counter += n;
        }
        debug_assert_eq!(counter, buffer.len());
        Ok(Self {
            n_inputs: topology.n_inputs(),
            layers: layers.into_boxed_slice(),
            buffer,
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of non-input layers.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// The copy of the last input vector.
    pub fn inputs(&self) -> &[f64] {
        &self.buffer[..self.n_inputs]
    }

    /// # Panics
    ///
    /// If `index` is out of range.
    #[track_caller]
    pub fn layer(&self, index: usize) -> &[f64] {
        let LayerRaw { n, offset, .. } = self.layers[index];
        &self.buffer[offset..offset + n]
    }

    /// Outputs of the last layer, or nothing for a network without layers.
    pub fn outputs(&self) -> &[f64] {
        match self.layers.last() {
            Some(&LayerRaw { n, offset, .. }) => &self.buffer[offset..offset + n],
            None => &[],
        }
    }
}
