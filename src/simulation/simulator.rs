use log::trace;
use ndarray::{Array1, Array2};

use super::{Step, step};
use crate::{
    config::SimulationConfig,
    error::{Result, SirErr},
    model::CompartmentModel,
};

/// Drives a model forward in time, one unit step at a time.
///
/// The simulator owns the model: the model's state is the cursor every pass starts
/// from, and every pass leaves the model at its last simulated state.
#[derive(Debug, Clone)]
pub struct Simulator<M: CompartmentModel> {
    model: M,
    horizon: usize,
}

impl<M: CompartmentModel> Simulator<M> {
    /// Creates a new `Simulator` running the default horizon.
    pub fn new(model: M) -> Self {
        Self::with_config(model, SimulationConfig::default())
    }

    pub fn with_config(model: M, config: SimulationConfig) -> Self {
        Self {
            model,
            horizon: config.horizon,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// The basic reproduction number of the simulated model.
    pub fn r0(&self) -> f64 {
        self.model.r0()
    }

    /// Starts a new pass from the model's current state, yielding the step pairs.
    pub fn iterate_derivatives(&mut self) -> Simulation<'_, M> {
        Simulation {
            model: &mut self.model,
            remaining: self.horizon,
            done: 0,
        }
    }

    /// Starts a new pass from the model's current state, yielding only the states.
    pub fn iterate(&mut self) -> impl Iterator<Item = Result<Array1<f64>>> + '_ {
        self.iterate_derivatives().map(|res| res.map(|s| s.state))
    }

    /// Runs a pass and stacks the states, one row per step.
    pub fn states_array(&mut self) -> Result<Array2<f64>> {
        let states = self.iterate().collect::<Result<Vec<_>>>()?;
        stack(&states, self.width())
    }

    /// Runs a pass and stacks the states (features) and the derivatives (targets).
    ///
    /// Both arrays have one row per step and one column per compartment, every target
    /// row being the rate of change at the matching feature row.
    pub fn training_arrays(&mut self) -> Result<(Array2<f64>, Array2<f64>)> {
        let steps = self.iterate_derivatives().collect::<Result<Vec<_>>>()?;
        let (states, derivatives): (Vec<_>, Vec<_>) = steps
            .into_iter()
            .map(|Step { state, derivative }| (state, derivative))
            .unzip();

        let width = self.width();
        Ok((stack(&states, width)?, stack(&derivatives, width)?))
    }

    fn width(&self) -> usize {
        self.model.registry().q().len()
    }
}

/// A single simulation pass.
///
/// Every yielded step has already been written back into the model, so dropping the
/// pass early leaves the model at the last yielded state. A pass can't be restarted.
#[derive(Debug)]
pub struct Simulation<'m, M: CompartmentModel> {
    model: &'m mut M,
    remaining: usize,
    done: usize,
}

impl<M: CompartmentModel> Iterator for Simulation<'_, M> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let current = self.model.state();
        let advanced = step(&*self.model, current.view())
            .and_then(|s| self.model.set_state(s.state.view()).map(|_| s));

        match &advanced {
            Ok(_) => {
                self.remaining -= 1;
                self.done += 1;
                trace!(step = self.done; "advanced simulation");
            }
            Err(_) => self.remaining = 0,
        }

        Some(advanced)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

fn stack(rows: &[Array1<f64>], width: usize) -> Result<Array2<f64>> {
    let mut out = Array2::zeros((rows.len(), width));
    for (row, mut target) in rows.iter().zip(out.rows_mut()) {
        if row.len() != width {
            return Err(SirErr::SizeMismatch {
                a: "row",
                b: "compartments",
                got: row.len(),
                expected: width,
            });
        }
        target.assign(row);
    }

    Ok(out)
}
