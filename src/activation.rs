use std::fmt::{self, Debug};

/// Inputs at or below this are mapped to exactly `0.0` by
/// [`Sigmoid`](activation_functions::Sigmoid).
pub const SIGMOID_LOWER_BOUND: f64 = -30.0;
/// Inputs at or above this are mapped to exactly `1.0` by
/// [`Sigmoid`](activation_functions::Sigmoid).
pub const SIGMOID_UPPER_BOUND: f64 = 30.0;

/// An activation function paired with its derivative, stored as plain function pointers so the
/// network can swap it at runtime.
#[derive(Clone, Copy)]
pub struct DynActivationFunction {
    name: &'static str,
    apply: fn(f64) -> f64,
    deriv: fn(f64) -> f64,
}

impl Debug for DynActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Debug::fmt(self.name, f)
    }
}

impl Default for DynActivationFunction {
    fn default() -> Self {
        Self::new(activation_functions::Sigmoid)
    }
}

impl DynActivationFunction {
    pub fn new<Phi: ActivationFunction>(_: Phi) -> Self {
        Self {
            name: Phi::NAME,
            apply: Phi::apply,
            deriv: Phi::deriv,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, x: f64) -> f64 {
        (self.apply)(x)
    }

    /// Derivative at the point where the function produced `a`.
    pub fn deriv(&self, a: f64) -> f64 {
        (self.deriv)(a)
    }
}

pub trait ActivationFunction: Send + Sync + 'static {
    const NAME: &'static str;

    fn apply(x: f64) -> f64;

    /// Derivative expressed in terms of the output `a = apply(x)`.
    ///
    /// Back propagation only keeps neuron outputs around, never the weighted sums, so the
    /// derivative has to be recoverable from the output alone.
    fn deriv(a: f64) -> f64;
}

pub mod activation_functions {
    use super::{ActivationFunction, SIGMOID_LOWER_BOUND, SIGMOID_UPPER_BOUND};

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Identity;
    impl ActivationFunction for Identity {
        const NAME: &'static str = "identity";

        fn apply(x: f64) -> f64 {
            x
        }

        fn deriv(_: f64) -> f64 {
            1.0
        }
    }

    /// Logistic sigmoid, saturated outside of
    /// [`SIGMOID_LOWER_BOUND`]..[`SIGMOID_UPPER_BOUND`] so `exp` never overflows.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Sigmoid;
    impl ActivationFunction for Sigmoid {
        const NAME: &'static str = "sigmoid";

        fn apply(x: f64) -> f64 {
            if x <= SIGMOID_LOWER_BOUND {
                0.0
            } else if x >= SIGMOID_UPPER_BOUND {
                1.0
            } else {
                1.0 / (1.0 + f64::exp(-x))
            }
        }

        fn deriv(a: f64) -> f64 {
            a * (1.0 - a)
        }
    }

    /// `exp(-x²)`, exactly `0.0` outside of
    /// [`SIGMOID_LOWER_BOUND`]..[`SIGMOID_UPPER_BOUND`].
    ///
    /// The output is even in `x`, so the sign of the weighted sum cannot be recovered from it.
    /// [`deriv`](ActivationFunction::deriv) gives the slope for non-negative sums, which makes
    /// this function suited to inference with weights trained elsewhere, not to `train`.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Gaussian;
    impl ActivationFunction for Gaussian {
        const NAME: &'static str = "gaussian";

        fn apply(x: f64) -> f64 {
            if x <= SIGMOID_LOWER_BOUND || x >= SIGMOID_UPPER_BOUND {
                0.0
            } else {
                f64::exp(-(x * x))
            }
        }

        fn deriv(a: f64) -> f64 {
            if a <= 0.0 {
                return 0.0;
            }
            -2.0 * f64::sqrt(-f64::ln(a)) * a
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Tanh;
    impl ActivationFunction for Tanh {
        const NAME: &'static str = "tanh";

        fn apply(x: f64) -> f64 {
            f64::tanh(x)
        }

        fn deriv(a: f64) -> f64 {
            1.0 - a.powi(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{activation_functions::*, *};

    #[test]
    fn sigmoid_saturates_at_bounds() {
        let phi = DynActivationFunction::new(Sigmoid);
        assert_eq!(phi.apply(SIGMOID_LOWER_BOUND), 0.0);
        assert_eq!(phi.apply(SIGMOID_LOWER_BOUND - 1.0), 0.0);
        assert_eq!(phi.apply(f64::NEG_INFINITY), 0.0);
        assert_eq!(phi.apply(SIGMOID_UPPER_BOUND), 1.0);
        assert_eq!(phi.apply(SIGMOID_UPPER_BOUND + 1.0), 1.0);
        assert_eq!(phi.apply(f64::INFINITY), 1.0);
    }

    #[test]
    fn sigmoid_inside_bounds() {
        let phi = DynActivationFunction::new(Sigmoid);
        assert_eq!(phi.apply(0.0), 0.5);
        let a = phi.apply(29.9);
        assert!(a > 0.999 && a < 1.0);
        let a = phi.apply(-29.9);
        assert!(a > 0.0 && a < 0.001);
        assert_eq!(phi.deriv(0.5), 0.25);
    }

    #[test]
    fn derivative_travels_with_function() {
        let phi = DynActivationFunction::new(Tanh);
        assert_eq!(phi.name(), "tanh");
        let a = phi.apply(0.3);
        let expected = 1.0 - f64::tanh(0.3).powi(2);
        assert!((phi.deriv(a) - expected).abs() < 1e-12);

        let phi = DynActivationFunction::new(Identity);
        assert_eq!(phi.apply(-2.5), -2.5);
        assert_eq!(phi.deriv(123.0), 1.0);
    }

    #[test]
    fn gaussian_is_a_clamped_bell() {
        let phi = DynActivationFunction::new(Gaussian);
        assert_eq!(phi.apply(0.0), 1.0);
        assert_eq!(phi.apply(1.0), f64::exp(-1.0));
        assert_eq!(phi.apply(-1.0), phi.apply(1.0));
        assert_eq!(phi.apply(SIGMOID_LOWER_BOUND), 0.0);
        assert_eq!(phi.apply(SIGMOID_UPPER_BOUND), 0.0);
        assert_eq!(phi.apply(f64::INFINITY), 0.0);

        let a = phi.apply(1.5);
        let expected = -2.0 * 1.5 * f64::exp(-2.25);
        assert!((phi.deriv(a) - expected).abs() < 1e-12);
        assert_eq!(phi.deriv(0.0), 0.0);
        assert_eq!(phi.deriv(1.0), 0.0);
    }

    #[test]
    fn default_is_sigmoid() {
        assert_eq!(DynActivationFunction::default().name(), Sigmoid::NAME);
        assert_eq!(format!("{:?}", DynActivationFunction::default()), "\"sigmoid\"");
    }
}
