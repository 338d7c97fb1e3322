use std::fmt::{self, Debug, Display};

use crate::{DynActivationFunction, core::weight_buffer};

/// Renders one layer as `a_u = phi([W] a_{u-1} - [b])`, one neuron per line.
pub struct PrettyPrintWeights<'a> {
    i_layer: usize,
    layer: weight_buffer::LayerRef<'a>,
    phi: DynActivationFunction,
}

impl<'a> PrettyPrintWeights<'a> {
    pub fn new(
        i_layer: usize,
        layer: weight_buffer::LayerRef<'a>,
        phi: DynActivationFunction,
    ) -> Self {
        Self {
            i_layer,
            layer,
            phi,
        }
    }
}

impl Debug for PrettyPrintWeights<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

fn n_digits(u: usize) -> usize {
    match u {
        0 => 1,
        u => ((u as f64).log10() + 1.0) as usize,
    }
}

fn write_element(f: &mut fmt::Formatter, element: f64) -> fmt::Result {
    if element.is_sign_positive() {
        write!(f, " {:.04?}", element)
    } else {
        write!(f, "{:.04?}", element)
    }
}

impl Display for PrettyPrintWeights<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Weight layer `u` produces activation `a_{u+1}`; `a_0` is the input `x`.
        let i_output = self.i_layer + 1;
        let center_line = self.layer.n / 2;
        let phi = self.phi.name();
        let input_name = match self.i_layer {
            0 => "x".to_string(),
            i => format!("a_{i}"),
        };
        for (i_line, row) in self.layer.rows().enumerate() {
            if i_line == center_line {
                write!(f, "a_{i_output} = {phi}(")?;
            } else {
                write!(f, "{:width$}", "", width = 6 + phi.len() + n_digits(i_output))?;
            }
            write!(f, "[")?;
            let mut iter = row[1..].iter();
            while let Some(&element) = iter.next() {
                write_element(f, element)?;
                if iter.size_hint().0 != 0 {
                    write!(f, " ")?;
                }
            }
            write!(f, "]")?;
            if i_line == center_line {
                write!(f, " {input_name} - ")?;
            } else {
                write!(f, "{:width$}", "", width = input_name.len() + 4)?;
            }
            write!(f, "[")?;
            write_element(f, row[0])?;
            write!(f, "]")?;
            if i_line == center_line {
                write!(f, ")")?;
            }
            if i_line + 1 != self.layer.n {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
