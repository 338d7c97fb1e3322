use crate::{
    DynActivationFunction, Topology,
    core::{ActivationBuffer, WeightBuffer},
};

/// Evaluates the network for one input vector, returning the outputs of the last layer.
///
/// Weights are consumed by a single cursor in storage order: for every neuron its bias
/// (multiplied by a constant `-1`) and then one weight per unit of the previous layer.
///
/// # Panics
///
/// - if `input` is shorter than `topology.n_inputs()`
/// - if `weights` or `activations` were not created from `topology`
pub fn forward<'a>(
    topology: &Topology,
    phi: &DynActivationFunction,
    weights: &WeightBuffer,
    activations: &'a mut ActivationBuffer,
    input: &[f64],
) -> &'a [f64] {
    let n_inputs = topology.n_inputs();
    debug_assert_eq!(input.len(), n_inputs);
    debug_assert_eq!(weights.len(), topology.weight_count());
    debug_assert_eq!(activations.len(), topology.neuron_count());
    let w = weights.as_slice();
    let a = activations.as_mut_slice();
    a[..n_inputs].copy_from_slice(&input[..n_inputs]);
    let mut cursor = 0usize;
    let mut previous = 0..n_inputs;
    for u in 0..topology.n_layers() {
        let n = topology.layer_width(u);
        let (done, rest) = a.split_at_mut(previous.end);
        let a_prev = &done[previous.clone()];
        for a_k in &mut rest[..n] {
            let mut sum = w[cursor] * -1.0;
            cursor += 1;
            for &a_g in a_prev {
                sum += w[cursor] * a_g;
                cursor += 1;
            }
            *a_k = phi.apply(sum);
        }
        previous = previous.end..previous.end + n;
    }
    debug_assert_eq!(cursor, w.len());
    &a[previous]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation_functions::{Identity, Sigmoid};

    #[test]
    fn bias_multiplies_minus_one() {
        let topology = Topology::new(2, 0, 0, 1);
        let mut weights = WeightBuffer::create(&topology).unwrap();
        weights.as_mut_slice().copy_from_slice(&[0.5, 2.0, 3.0]);
        let mut activations = ActivationBuffer::create(&topology).unwrap();
        let phi = DynActivationFunction::new(Identity);
        let output = forward(&topology, &phi, &weights, &mut activations, &[1.0, -1.0]);
        assert_eq!(output, &[-0.5 + 2.0 - 3.0]);
        assert_eq!(activations.inputs(), &[1.0, -1.0]);
    }

    #[test]
    fn hidden_layers_feed_forward_in_order() {
        // 1 input -> 2 hidden -> 2 hidden -> 1 output, identity activation.
        let topology = Topology::new(1, 2, 2, 1);
        let mut weights = WeightBuffer::create(&topology).unwrap();
        #[rustfmt::skip]
        let values = [
            0.0, 1.0,       // h1_0 = x
            -1.0, 2.0,      // h1_1 = 1 + 2x
            0.0, 1.0, 1.0,  // h2_0 = h1_0 + h1_1
            1.0, 0.0, 1.0,  // h2_1 = -1 + h1_1
            0.0, 1.0, -1.0, // o = h2_0 - h2_1
        ];
        weights.as_mut_slice().copy_from_slice(&values);
        let mut activations = ActivationBuffer::create(&topology).unwrap();
        let phi = DynActivationFunction::new(Identity);
        let output = forward(&topology, &phi, &weights, &mut activations, &[3.0]);
        // h1 = [3, 7], h2 = [10, 6], o = 4
        assert_eq!(output, &[4.0]);
        assert_eq!(activations.as_slice(), &[3.0, 3.0, 7.0, 10.0, 6.0, 4.0]);
    }

    #[test]
    fn zero_weights_give_half_through_sigmoid() {
        let topology = Topology::new(3, 1, 2, 2);
        let weights = WeightBuffer::create(&topology).unwrap();
        let mut activations = ActivationBuffer::create(&topology).unwrap();
        let phi = DynActivationFunction::new(Sigmoid);
        let output = forward(&topology, &phi, &weights, &mut activations, &[9.0, -4.0, 1.0]);
        assert_eq!(output, &[0.5, 0.5]);
    }
}
