use ndarray::{Array1, ArrayView1};

use crate::{error::Result, model::CompartmentModel};

/// A simulated step: the state reached and the instantaneous rate of change at that state.
///
/// Applying `derivative` to `state` gives the state of the following step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: Array1<f64>,
    pub derivative: Array1<f64>,
}

/// Advances `state` by one unit forward Euler step, `state + derivative(state)`, and
/// evaluates the derivative at the state reached.
///
/// The model is only read, its own state is left untouched.
pub fn step<M: CompartmentModel>(model: &M, state: ArrayView1<f64>) -> Result<Step> {
    let state = &state + &model.derivative(state)?;
    let derivative = model.derivative(state.view())?;

    Ok(Step { state, derivative })
}
