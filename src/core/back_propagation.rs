use std::iter;

use crate::{
    DynActivationFunction, Topology,
    core::{ActivationBuffer, DeltaBuffer, WeightBuffer, forward},
};

/// One online gradient descent step on a single sample.
///
/// Runs [`forward`], computes the delta of every non-input neuron from the output layer
/// backwards, then moves each weight by `learning_rate * delta * input_of_that_weight`
/// (the bias input being `-1`). Activations and deltas are overwritten as scratch.
///
/// Does nothing for the empty topology.
///
/// # Panics
///
/// - if `input` is shorter than `topology.n_inputs()` or `target` is shorter than
///   `topology.n_outputs()`
/// - if the buffers were not created from `topology`
#[allow(clippy::too_many_arguments)]
pub fn back_propagate(
    topology: &Topology,
    phi: &DynActivationFunction,
    weights: &mut WeightBuffer,
    activations: &mut ActivationBuffer,
    deltas: &mut DeltaBuffer,
    learning_rate: f64,
    input: &[f64],
    target: &[f64],
) {
    if topology.is_empty() {
        return;
    }
    debug_assert_eq!(target.len(), topology.n_outputs());
    debug_assert_eq!(deltas.len(), topology.neuron_count());
    forward(topology, phi, weights, activations, input);
    let output_layer = topology.n_layers() - 1;

    // Output layer: error times the slope of the activation.
    let a = activations.layer(output_layer);
    let d = deltas.layer_mut(output_layer);
    for ((d_k, &a_k), &y_k) in iter::zip(iter::zip(d, a), &target[..a.len()]) {
        *d_k = (y_k - a_k) * phi.deriv(a_k);
    }

    // Hidden layers, last one first. Row `k` of the next layer holds the weight from unit `j`
    // of this layer at `j + 1`, after the bias.
    for u in (0..output_layer).rev() {
        let w_next = weights.layer(u + 1);
        let (d, d_next) = deltas.layer_and_next_mut(u);
        let a = activations.layer(u);
        for (j, (d_j, &a_j)) in iter::zip(d, a).enumerate() {
            let mut sum = 0.0;
            for (row, &d_k) in iter::zip(w_next.rows(), d_next) {
                sum += d_k * row[j + 1];
            }
            *d_j = phi.deriv(a_j) * sum;
        }
    }

    // Weight update, output layer first.
    for u in (0..=output_layer).rev() {
        let a_prev = match u.checked_sub(1) {
            None => activations.inputs(),
            Some(u_prev) => activations.layer(u_prev),
        };
        let d = deltas.layer(u);
        let mut layer = weights.layer_mut(u);
        for (row, &d_k) in iter::zip(layer.rows_mut(), d) {
            row[0] += learning_rate * d_k * -1.0;
            for (w_g, &a_g) in iter::zip(&mut row[1..], a_prev) {
                *w_g += learning_rate * d_k * a_g;
            }
        }
    }
}
