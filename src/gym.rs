use crate::NeuralNetwork;

/// Mean accuracy and loss of a network over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Evaluation {
    pub accuracy: f64,
    pub loss: f64,
}

/// Drives online training of a network over a fixed set of samples.
///
/// Every sample is one gradient descent step; an epoch is one pass over all samples in order.
pub struct Gym<'a> {
    nn: &'a mut NeuralNetwork,
    eta: f64,
}

impl<'a> Gym<'a> {
    pub fn new(nn: &'a mut NeuralNetwork, eta: f64) -> Self {
        Self { nn, eta }
    }

    pub fn nn(&mut self) -> &mut NeuralNetwork {
        self.nn
    }

    /// The learning rate.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn train_epoch(&mut self, samples: &[(&[f64], &[f64])]) {
        for (x_i, y_i) in samples {
            self.nn.train(self.eta, x_i, y_i);
        }
    }

    /// Averages `calculate_accuracy` and `calculate_loss` over `samples`, `trials` inferences
    /// each. No samples evaluate to an accuracy of `0.0`.
    pub fn evaluate(&mut self, samples: &[(&[f64], &[f64])], trials: usize) -> Evaluation {
        if samples.is_empty() {
            return Evaluation {
                accuracy: 0.0,
                loss: 1.0,
            };
        }
        let mut accuracy = 0.0f64;
        let mut loss = 0.0f64;
        for (x_i, y_i) in samples {
            accuracy += self.nn.calculate_accuracy(x_i, y_i, trials);
            loss += self.nn.calculate_loss(x_i, y_i, trials);
        }
        let n = samples.len() as f64;
        Evaluation {
            accuracy: accuracy / n,
            loss: loss / n,
        }
    }

    /// Trains for `n_epochs`, logging an evaluation `n_logs` times along the way.
    ///
    /// Returns the evaluation after the last epoch.
    pub fn fit(
        &mut self,
        samples: &[(&[f64], &[f64])],
        n_epochs: usize,
        n_logs: usize,
    ) -> Evaluation {
        for i_epoch in 0..n_epochs {
            self.train_epoch(samples);
            if n_logs == 0 {
                continue;
            }
            if i_epoch % (n_epochs / n_epochs.min(n_logs)) == 0 || i_epoch == n_epochs - 1 {
                let Evaluation { accuracy, loss } = self.evaluate(samples, 1);
                let percentage = (i_epoch as f64) / (n_epochs as f64) * 100.0;
                log::info!(
                    "[{percentage:.0}%] epoch {i_epoch}: accuracy = {:.2}%, loss = {:.2}%",
                    accuracy * 100.0,
                    loss * 100.0,
                );
            }
        }
        self.evaluate(samples, 1)
    }
}
