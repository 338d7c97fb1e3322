use std::slice::{ChunksExact, ChunksExactMut};

use crate::{
    DiwaResult, RandomSource, Topology,
    core::{LayerRaw, zeroed_buffer},
};

/// Immutable view of a layer's weights.
///
/// Rows are neuron-major, each `n_previous + 1` long with the bias weight at index 0.
#[derive(Debug, Clone, Copy)]
pub struct LayerRef<'a> {
    /// Number of neurons in this layer.
    pub n: usize,
    /// Number of neurons in the previous layer.
    pub n_previous: usize,
    pub w: &'a [f64],
}

impl<'a> LayerRef<'a> {
    pub fn stride(&self) -> usize {
        self.n_previous + 1
    }

    pub fn row(&self, k: usize) -> &'a [f64] {
        let stride = self.stride();
        &self.w[k * stride..(k + 1) * stride]
    }

    pub fn rows(&self) -> ChunksExact<'a, f64> {
        self.w.chunks_exact(self.stride())
    }
}

/// Mutable view of a layer's weights.
#[derive(Debug)]
pub struct LayerMut<'a> {
    /// Number of neurons in this layer.
    pub n: usize,
    /// Number of neurons in the previous layer.
    pub n_previous: usize,
    pub w: &'a mut [f64],
}

impl LayerMut<'_> {
    pub fn stride(&self) -> usize {
        self.n_previous + 1
    }

    pub fn row_mut(&mut self, k: usize) -> &mut [f64] {
        let stride = self.stride();
        &mut self.w[k * stride..(k + 1) * stride]
    }

    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, f64> {
        let stride = self.stride();
        self.w.chunks_exact_mut(stride)
    }
}

/// Buffer for storing the weights of a network, hidden layers first, output layer last.
#[derive(Debug, Clone, Default)]
pub struct WeightBuffer {
    layers: Box<[LayerRaw]>,
    buffer: Box<[f64]>,
}

impl WeightBuffer {
    /// Allocates `topology.weight_count()` zeroed weights.
    ///
    /// `topology` must have passed [`Topology::checked_counts`].
    pub fn create(topology: &Topology) -> DiwaResult<Self> {
        let buffer = zeroed_buffer(topology.weight_count())?;
        let mut layers = Vec::with_capacity(topology.n_layers());
        let mut counter = 0usize;
        for u in 0..topology.n_layers() {
            let n = topology.layer_width(u);
            let n_previous = topology.previous_width(u);
            layers.push(LayerRaw {
                n,
                n_previous,
                offset: counter,
            });
            counter += n * (n_previous + 1);
        }
        debug_assert_eq!(counter, buffer.len());
        Ok(Self {
            layers: layers.into_boxed_slice(),
            buffer,
        })
    }

    /// Fills every weight with an independent value in `[-0.5, 0.5)`.
    pub fn randomize<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        for w in self.as_mut_slice() {
            *w = rng.next_unit() - 0.5;
        }
    }

    /// Direct access to the underlying buffer.
    /// Useful for dumping/loading weights from file.
    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    /// Direct access to the underlying buffer.
    /// Useful for dumping/loading weights from file.
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

    /// # Panics
    ///
    /// If `index` is out of range.
    #[track_caller]
    pub fn layer(&self, index: usize) -> LayerRef<'_> {
        let LayerRaw {
            n,
            n_previous,
            offset,
        } = self.layers[index];
        LayerRef {
            n,
            n_previous,
            w: &self.buffer[offset..offset + n * (n_previous + 1)],
        }
    }

    /// # Panics
    ///
    /// If `index` is out of range.
    #[track_caller]
    pub fn layer_mut(&mut self, index: usize) -> LayerMut<'_> {
        let LayerRaw {
            n,
            n_previous,
            offset,
        } = self.layers[index];
        LayerMut {
            n,
            n_previous,
            w: &mut self.buffer[offset..offset + n * (n_previous + 1)],
        }
    }

    /// Get a immutable view of a layer.
    /// Returns `None` if `index` is out of range.
    pub fn get_layer(&self, index: usize) -> Option<LayerRef<'_>> {
        (index < self.n_layers()).then(|| self.layer(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_tile_the_buffer() {
        let topology = Topology::new(3, 2, 4, 2);
        let weights = WeightBuffer::create(&topology).unwrap();
        assert_eq!(weights.len(), topology.weight_count());
        assert_eq!(weights.n_layers(), 3);

        let widths: Vec<_> = (0..3).map(|u| weights.layer(u).w.len()).collect();
        assert_eq!(widths, [4 * 4, 4 * 5, 2 * 5]);
        assert_eq!(widths.iter().sum::<usize>(), weights.len());
        assert!(weights.get_layer(3).is_none());
    }

    #[test]
    fn rows_are_previous_width_plus_bias() {
        let topology = Topology::new(5, 0, 0, 3);
        let mut weights = WeightBuffer::create(&topology).unwrap();
        for (i, w) in weights.as_mut_slice().iter_mut().enumerate() {
            *w = i as f64;
        }
        let layer = weights.layer(0);
        assert_eq!(layer.rows().count(), 3);
        assert!(layer.rows().all(|row| row.len() == 6));
        assert_eq!(layer.row(1)[0], 6.0);

        let mut layer = weights.layer_mut(0);
        layer.row_mut(2)[5] = -1.0;
        assert_eq!(weights.as_slice()[17], -1.0);
    }
}
