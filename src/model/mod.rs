mod covid_sir;
mod dot;
mod flow;
mod sir;

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub use covid_sir::CovidSir;
pub use flow::Flow;
pub use sir::Sir;

use crate::{
    error::{Result, SirErr},
    registry::{ParameterRegistry, QuantityClass},
};

/// A compartmental model: a set of compartments (the Q entries of its registry) and
/// the flows moving population between them.
///
/// Implementors only describe the structure and the rate of every flow; the
/// derivative, the state accessors and the rendering are derived from that.
pub trait CompartmentModel {
    fn registry(&self) -> &ParameterRegistry;

    fn registry_mut(&mut self) -> &mut ParameterRegistry;

    /// The flow edges between compartments.
    fn flows(&self) -> &[Flow];

    /// Computes the rate of every flow, in the order of [`CompartmentModel::flows`], at
    /// the given state. `state` holds one value per compartment.
    fn flow_rates(&self, state: ArrayView1<f64>) -> Vec<f64>;

    /// The basic reproduction number, in closed form.
    fn r0(&self) -> f64;

    /// Constants computed from the current parameters that are not stored in the registry.
    fn derived_constants(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    /// The compartment names, in declaration order.
    fn compartments(&self) -> Vec<&str> {
        self.registry().q().iter().map(|q| q.name()).collect()
    }

    /// Snapshot of the current state, one value per compartment.
    fn state(&self) -> Array1<f64> {
        self.registry().q().iter().map(|q| q.value()).collect()
    }

    /// Overwrites the whole state.
    fn set_state(&mut self, state: ArrayView1<f64>) -> Result<()> {
        self.registry_mut()
            .set_class(QuantityClass::Quantity, state.iter().copied())
    }

    /// Snapshot of the current state keyed by compartment name.
    fn get(&self) -> BTreeMap<String, f64> {
        self.registry()
            .q()
            .iter()
            .map(|q| (q.name().to_string(), q.value()))
            .collect()
    }

    /// Overwrites any registered value by name. Nothing is written if a name is unknown.
    fn update<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.registry_mut().set_many(values)
    }

    /// The current parameters and constants, including the derived ones.
    fn cst_param(&self) -> BTreeMap<String, f64> {
        let registry = self.registry();
        registry
            .p()
            .iter()
            .chain(registry.c())
            .map(|q| (q.name().to_string(), q.value()))
            .chain(
                self.derived_constants()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value)),
            )
            .collect()
    }

    /// The instantaneous rate of change of every compartment at `state`.
    ///
    /// Every flow subtracts its rate from its source and adds it to its destination.
    fn derivative(&self, state: ArrayView1<f64>) -> Result<Array1<f64>> {
        let expected = self.registry().q().len();
        if state.len() != expected {
            return Err(SirErr::SizeMismatch {
                a: "state",
                b: "compartments",
                got: state.len(),
                expected,
            });
        }

        let mut diff = Array1::zeros(expected);
        for (flow, rate) in self.flows().iter().zip(self.flow_rates(state)) {
            diff[flow.from()] -= rate;
            diff[flow.to()] += rate;
        }

        Ok(diff)
    }

    /// Evaluates the derivative keyed by compartment name.
    ///
    /// Entries in `state` override the current value of the matching compartment, the
    /// others keep their current value.
    fn eval_diff(&self, state: Option<&BTreeMap<String, f64>>) -> Result<BTreeMap<String, f64>> {
        let compartments = self.compartments();
        let mut current = self.state();

        for (name, &value) in state.into_iter().flatten() {
            let idx = compartments
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| SirErr::UnknownName { name: name.clone() })?;
            current[idx] = value;
        }

        let diff = self.derivative(current.view())?;
        Ok(compartments
            .into_iter()
            .map(str::to_string)
            .zip(diff)
            .collect())
    }

    /// Evaluates the derivative for every row of `states`.
    fn predict(&self, states: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut out = Array2::zeros(states.raw_dim());
        for (row, mut target) in states.outer_iter().zip(out.outer_iter_mut()) {
            target.assign(&self.derivative(row)?);
        }

        Ok(out)
    }

    /// Renders the flow graph in DOT format.
    ///
    /// `verbose` labels the edges with their rate, `full` also draws the self loop
    /// carrying the net outflow of every compartment.
    fn to_dot(&self, verbose: bool, full: bool) -> String {
        dot::DotGraph {
            compartments: &self.compartments(),
            flows: self.flows(),
            verbose,
            full,
        }
        .to_string()
    }
}
