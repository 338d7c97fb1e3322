use std::{iter, path::Path};

use faer::prelude::*;
use rand::rngs::ThreadRng;

use crate::{
    ActivationFunction, ByteSink, ByteSource, DiwaError, DiwaResult, DynActivationFunction,
    PrettyPrintWeights, RandomSource, codec,
    core::{ActivationBuffer, DeltaBuffer, WeightBuffer, back_propagate, forward},
};

/// Shape of a network: inputs, `n_hidden_layers` hidden layers of `hidden_width` neurons each,
/// and the outputs.
///
/// With zero hidden layers the inputs connect directly to the outputs. Every neuron has one
/// extra bias weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Topology {
    n_inputs: usize,
    n_hidden_layers: usize,
    hidden_width: usize,
    n_outputs: usize,
}

impl Topology {
    pub const fn new(
        n_inputs: usize,
        n_hidden_layers: usize,
        hidden_width: usize,
        n_outputs: usize,
    ) -> Self {
        Self {
            n_inputs,
            n_hidden_layers,
            hidden_width,
            n_outputs,
        }
    }

    /// The all-zero topology of a network waiting for a model to be loaded.
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    pub fn n_hidden_layers(&self) -> usize {
        self.n_hidden_layers
    }

    pub fn hidden_width(&self) -> usize {
        self.hidden_width
    }

    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Number of layers that own weights: the hidden layers plus the output layer.
    pub fn n_layers(&self) -> usize {
        self.n_hidden_layers + 1
    }

    /// Width of non-input layer `u`.
    pub fn layer_width(&self, u: usize) -> usize {
        if u < self.n_hidden_layers {
            self.hidden_width
        } else {
            self.n_outputs
        }
    }

    /// Width of the layer feeding non-input layer `u`.
    pub fn previous_width(&self, u: usize) -> usize {
        if u == 0 {
            self.n_inputs
        } else {
            self.hidden_width
        }
    }

    pub fn hidden_weight_count(&self) -> usize {
        match self.n_hidden_layers {
            0 => 0,
            n => {
                (self.n_inputs + 1) * self.hidden_width
                    + (n - 1) * (self.hidden_width + 1) * self.hidden_width
            }
        }
    }

    pub fn output_weight_count(&self) -> usize {
        (self.previous_width(self.n_hidden_layers) + 1) * self.n_outputs
    }

    pub fn weight_count(&self) -> usize {
        self.hidden_weight_count() + self.output_weight_count()
    }

    pub fn neuron_count(&self) -> usize {
        self.n_inputs + self.hidden_width * self.n_hidden_layers + self.n_outputs
    }

    /// `(weight_count, neuron_count)`, or `None` if the arena for this topology would not fit
    /// in `usize`.
    pub fn checked_counts(&self) -> Option<(usize, usize)> {
        let hidden = match self.n_hidden_layers {
            0 => 0,
            n => (self.n_inputs.checked_add(1)?)
                .checked_mul(self.hidden_width)?
                .checked_add(
                    (n - 1)
                        .checked_mul(self.hidden_width.checked_add(1)?)?
                        .checked_mul(self.hidden_width)?,
                )?,
        };
        let output = (self.previous_width(self.n_hidden_layers).checked_add(1)?)
            .checked_mul(self.n_outputs)?;
        let weights = hidden.checked_add(output)?;
        let neurons = self
            .n_inputs
            .checked_add(self.hidden_width.checked_mul(self.n_hidden_layers)?)?
            .checked_add(self.n_outputs)?;
        weights
            .checked_add(neurons.checked_mul(2)?)?
            .checked_mul(size_of::<f64>())?;
        Some((weights, neurons))
    }

    /// Rule-of-thumb hidden width, `floor(sqrt(n_inputs * n_outputs))`.
    ///
    /// `None` if the topology has no inputs or no outputs.
    pub fn recommended_hidden_neuron_count(&self) -> Option<usize> {
        if self.n_inputs == 0 || self.n_outputs == 0 {
            return None;
        }
        let product = self.n_inputs.checked_mul(self.n_outputs)?;
        Some((product as f64).sqrt() as usize)
    }

    /// Rule-of-thumb hidden layer count for `n_samples` training samples,
    /// `floor(n_samples / (alpha * (n_inputs + n_outputs)))`.
    ///
    /// `None` if any factor is zero or fewer than one layer comes out.
    pub fn recommended_hidden_layer_count(&self, n_samples: usize, alpha: usize) -> Option<usize> {
        if self.n_inputs == 0 || self.n_outputs == 0 || n_samples == 0 || alpha == 0 {
            return None;
        }
        let divisor = alpha.checked_mul(self.n_inputs + self.n_outputs)?;
        match n_samples / divisor {
            0 => None,
            count => Some(count),
        }
    }
}

/// A feedforward network with a fixed topology, evaluated and trained in place.
///
/// A fresh network is empty (all-zero topology, nothing allocated) until it is initialized
/// or a model is loaded into it.
#[derive(Debug, Clone, Default)]
pub struct NeuralNetwork {
    topology: Topology,
    phi: DynActivationFunction,
    weights: WeightBuffer,
    activations: ActivationBuffer,
    deltas: DeltaBuffer,
}

impl NeuralNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and initializes a network, drawing its weights from `rng`.
    pub fn with_topology(topology: Topology, rng: &mut impl RandomSource) -> DiwaResult<Self> {
        let mut nn = Self::new();
        nn.initialize_with_rng(topology, rng)?;
        Ok(nn)
    }

    /// Allocates the buffers for `topology`, randomizing the weights with the thread-local
    /// generator if `randomize` is set and leaving them zeroed otherwise.
    ///
    /// Initializing with the empty topology succeeds without touching the network. On error
    /// the network is left as it was.
    pub fn initialize(&mut self, topology: Topology, randomize: bool) -> DiwaResult<()> {
        match randomize {
            true => {
                let mut rng = ThreadRng::default();
                self.initialize_impl(topology, Some(&mut rng as &mut dyn RandomSource))
            }
            false => self.initialize_impl(topology, None),
        }
    }

    /// Like [`initialize`](Self::initialize), with weights drawn from `rng`.
    pub fn initialize_with_rng(
        &mut self,
        topology: Topology,
        rng: &mut impl RandomSource,
    ) -> DiwaResult<()> {
        self.initialize_impl(topology, Some(rng as &mut dyn RandomSource))
    }

    fn initialize_impl(
        &mut self,
        topology: Topology,
        rng: Option<&mut dyn RandomSource>,
    ) -> DiwaResult<()> {
        if topology.is_empty() {
            return Ok(());
        }
        let mut weights = WeightBuffer::create(&Self::check_topology(topology)?)?;
        if let Some(rng) = rng {
            weights.randomize(rng);
        }
        self.install(topology, weights)
    }

    pub(crate) fn check_topology(topology: Topology) -> DiwaResult<Topology> {
        let (weight_count, neuron_count) = topology.checked_counts().ok_or_else(|| {
            DiwaError::invalid_params(format!("topology {topology:?} does not fit in memory"))
        })?;
        log::debug!(
            "topology {topology:?}: {weight_count} weights, {neuron_count} neurons, {} floats",
            weight_count + 2 * neuron_count,
        );
        Ok(topology)
    }

    /// Replaces topology and weights, allocating fresh activation and delta buffers.
    ///
    /// `weights` must be created from `topology`. On error the network is left as it was.
    pub(crate) fn install(&mut self, topology: Topology, weights: WeightBuffer) -> DiwaResult<()> {
        debug_assert_eq!(weights.len(), topology.weight_count());
        let activations = ActivationBuffer::create(&topology)?;
        let deltas = DeltaBuffer::create(&topology)?;
        self.topology = topology;
        self.weights = weights;
        self.activations = activations;
        self.deltas = deltas;
        Ok(())
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn n_inputs(&self) -> usize {
        self.topology().n_inputs()
    }

    pub fn n_outputs(&self) -> usize {
        self.topology().n_outputs()
    }

    pub fn is_empty(&self) -> bool {
        self.topology().is_empty()
    }

    /// Runs the network on `input`.
    ///
    /// The returned outputs live in the network's own activation buffer and are overwritten
    /// by the next call to `inference` or `train`.
    ///
    /// # Panics
    ///
    /// If `input` has fewer than `n_inputs` elements.
    pub fn inference(&mut self, input: &[f64]) -> ColRef<'_, f64> {
        let outputs = forward(
            &self.topology,
            &self.phi,
            &self.weights,
            &mut self.activations,
            input,
        );
        ColRef::from_slice(outputs)
    }

    /// One online gradient descent step on a single `(input, target)` sample.
    ///
    /// An empty network is left as it is.
    ///
    /// # Panics
    ///
    /// If `input` has fewer than `n_inputs` or `target` fewer than `n_outputs` elements.
    pub fn train(&mut self, learning_rate: f64, input: &[f64], target: &[f64]) {
        back_propagate(
            &self.topology,
            &self.phi,
            &mut self.weights,
            &mut self.activations,
            &mut self.deltas,
            learning_rate,
            input,
            target,
        );
    }

    /// An inference counts as correct unless some output with a non-zero target stays
    /// below `0.5`.
    fn test_inference(&mut self, input: &[f64], expected: &[f64]) -> bool {
        let outputs = self.inference(input);
        iter::zip(outputs.iter(), expected).all(|(&a, &y)| a >= 0.5 || y == 0.0)
    }

    /// Fraction of `trials` inferences on `input` that are correct.
    ///
    /// Zero trials give an accuracy of `0.0`.
    pub fn calculate_accuracy(&mut self, input: &[f64], expected: &[f64], trials: usize) -> f64 {
        if trials == 0 {
            return 0.0;
        }
        let n_correct = (0..trials)
            .filter(|_| self.test_inference(input, expected))
            .count();
        n_correct as f64 / trials as f64
    }

    /// `1.0 - calculate_accuracy(..)`.
    pub fn calculate_loss(&mut self, input: &[f64], expected: &[f64], trials: usize) -> f64 {
        1.0 - self.calculate_accuracy(input, expected, trials)
    }

    /// Replaces the activation function and, with it, the derivative used by `train`.
    pub fn set_activation_function(&mut self, phi: DynActivationFunction) {
        self.phi = phi;
    }

    pub fn set_activation(&mut self, phi: impl ActivationFunction) {
        self.set_activation_function(DynActivationFunction::new(phi));
    }

    pub fn activation_function(&self) -> DynActivationFunction {
        self.phi
    }

    pub fn recommended_hidden_neuron_count(&self) -> Option<usize> {
        self.topology().recommended_hidden_neuron_count()
    }

    pub fn recommended_hidden_layer_count(&self, n_samples: usize, alpha: usize) -> Option<usize> {
        self.topology()
            .recommended_hidden_layer_count(n_samples, alpha)
    }

    pub fn weights(&self) -> &WeightBuffer {
        &self.weights
    }

    /// Weights as a flat slice in storage order.
    pub fn weights_as_slice(&self) -> &[f64] {
        self.weights.as_slice()
    }

    /// Weights as a mutable flat slice; the length is fixed by the topology.
    pub fn weights_mut(&mut self) -> &mut [f64] {
        self.weights.as_mut_slice()
    }

    pub fn activations(&self) -> &ActivationBuffer {
        &self.activations
    }

    pub fn randomize_weights(&mut self, rng: &mut impl RandomSource) {
        self.weights.randomize(rng);
    }

    pub fn pretty_print_layer(&self, index: usize) -> Option<PrettyPrintWeights<'_>> {
        let layer = self.weights.get_layer(index)?;
        Some(PrettyPrintWeights::new(index, layer, self.phi))
    }

    /// Writes the model to `sink`. See [`codec`] for the format.
    pub fn save_to_file(&self, sink: &mut impl ByteSink) -> DiwaResult<()> {
        codec::save(self, sink)
    }

    /// Replaces this network with the model read from `source`. On error the network is left
    /// as it was.
    pub fn load_from_file(&mut self, source: &mut impl ByteSource) -> DiwaResult<()> {
        codec::load(self, source)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> DiwaResult<()> {
        codec::save_to_path(self, path.as_ref())
    }

    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> DiwaResult<()> {
        codec::load_from_path(self, path.as_ref())
    }
}
