//! A small feedforward neural network for memory-constrained targets.
//!
//! The shape is fixed at initialization: inputs, any number of hidden layers sharing one
//! width, and outputs. Evaluation and training happen in place on buffers owned by the
//! network, training is plain online gradient descent one sample at a time, and models are
//! persisted through a compact binary format (see [`codec`]).

pub use faer;

mod activation;
pub mod codec;
pub mod core;
mod error;
mod gym;
mod host;
mod nn;
mod pretty_print;

pub use activation::*;
pub use error::*;
pub use gym::*;
pub use host::*;
pub use nn::*;
pub use pretty_print::*;
