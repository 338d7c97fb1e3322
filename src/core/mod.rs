//! Core parts of the algorithms without abstraction.
//!
//! The buffers here are the arena of a network: weights, activations and deltas, each owned
//! separately but indexed with the same layer arithmetic.

pub mod activation_buffer;
pub mod delta_buffer;
pub mod weight_buffer;

pub use activation_buffer::ActivationBuffer;
pub use delta_buffer::DeltaBuffer;
pub use weight_buffer::WeightBuffer;

mod back_propagation;
mod forward;

pub use back_propagation::*;
pub use forward::*;

use crate::{DiwaError, DiwaResult};

/// Span of one non-input layer inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayerRaw {
    /// Number of neurons in this layer.
    pub(crate) n: usize,
    /// Number of neurons in the previous layer.
    pub(crate) n_previous: usize,
    pub(crate) offset: usize,
}

pub(crate) fn zeroed_buffer(n_floats: usize) -> DiwaResult<Box<[f64]>> {
    bytemuck::try_zeroed_slice_box(n_floats).map_err(|()| DiwaError::AllocationFailed { n_floats })
}
