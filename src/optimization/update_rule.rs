use ndarray::{Array2, ArrayView2, Ix2};

/// Defines how a gradient is turned into the step added to the coefficients.
pub trait UpdateRule {
    /// Returns the values to add to the coefficients for the given gradient.
    ///
    /// # Arguments
    /// * `grad` - The gradient, shaped like the coefficients.
    /// * `learning_rate` - The current learning rate.
    fn updates(&mut self, grad: ArrayView2<f64>, learning_rate: f64) -> Array2<f64>;

    /// The coefficient shape this rule keeps per-coefficient state for, if any.
    fn shape(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Plain gradient descent: a step of length `learning_rate` against the gradient.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStep;

impl UpdateRule for PlainStep {
    fn updates(&mut self, grad: ArrayView2<f64>, learning_rate: f64) -> Array2<f64> {
        grad.mapv(|g| -learning_rate * g)
    }
}

/// Gradient descent with momentum.
///
/// `velocity = momentum * velocity - learning_rate * grad`, the update being the
/// new velocity.
#[derive(Debug, Clone)]
pub struct Momentum {
    momentum: f64,
    velocity: Array2<f64>,
}

impl Momentum {
    /// Creates a new `Momentum` rule with a zeroed velocity.
    ///
    /// # Arguments
    /// * `shape` - The shape of the coefficients this rule will update.
    /// * `momentum` - The fraction of the previous update carried to the next one.
    pub fn new(shape: Ix2, momentum: f64) -> Self {
        Self {
            momentum,
            velocity: Array2::zeros(shape),
        }
    }

    pub fn velocity(&self) -> &Array2<f64> {
        &self.velocity
    }
}

impl UpdateRule for Momentum {
    fn updates(&mut self, grad: ArrayView2<f64>, learning_rate: f64) -> Array2<f64> {
        let mu = self.momentum;

        self.velocity
            .zip_mut_with(&grad, |v, &g| *v = mu * *v - learning_rate * g);

        self.velocity.clone()
    }

    fn shape(&self) -> Option<(usize, usize)> {
        Some(self.velocity.dim())
    }
}
