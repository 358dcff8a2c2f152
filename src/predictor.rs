use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Result, SirErr};

/// Applies trained coefficients to new features: `y = x . coef`.
///
/// The predictor only borrows the coefficients, it never trains them.
#[derive(Debug, Clone, Copy)]
pub struct LinearPredictor<'a> {
    coef: ArrayView2<'a, f64>,
}

impl<'a> LinearPredictor<'a> {
    /// Creates a new `LinearPredictor`.
    ///
    /// # Arguments
    /// * `coef` - A `features x targets` coefficient matrix.
    pub fn new(coef: ArrayView2<'a, f64>) -> Self {
        Self { coef }
    }

    /// Predicts one row of targets for every row of `x`.
    ///
    /// # Returns
    /// `SirErr::SizeMismatch` if `x` doesn't have one column per coefficient row.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.coef.nrows() {
            return Err(SirErr::SizeMismatch {
                a: "x columns",
                b: "coef rows",
                got: x.ncols(),
                expected: self.coef.nrows(),
            });
        }

        Ok(x.dot(&self.coef))
    }
}

/// `||x . coef - y||^2` over a whole dataset.
pub fn squared_loss(coef: ArrayView2<f64>, x: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
    (x.dot(&coef) - y).mapv(|r| r.powi(2)).sum()
}

/// The gradient of `||x . coef - y||^2` for a single sample, `2 * x (x . coef - y)^T`.
pub fn squared_loss_grad(
    coef: ArrayView2<f64>,
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
) -> Array2<f64> {
    let residual = x.dot(&coef) - y;
    let x = x.insert_axis(Axis(1));
    let residual = residual.insert_axis(Axis(0));

    x.dot(&residual) * 2.
}
