use ndarray::{Array2, Ix2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;

use crate::error::Result;

/// Draws initial coefficients from `N(0, std_dev^2)`.
///
/// # Arguments
/// * `shape` - `(features, targets)`.
/// * `std_dev` - The standard deviation of the distribution.
/// * `rng` - A random number generator.
///
/// # Returns
/// An error if `std_dev` is negative or NaN.
pub fn normal_coef<R: Rng>(
    shape: (usize, usize),
    std_dev: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let normal = Normal::new(0., std_dev)?;
    Ok(Array2::random_using(Ix2(shape.0, shape.1), normal, rng))
}
