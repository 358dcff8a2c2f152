use ndarray::ArrayView1;

use super::{CompartmentModel, Flow};
use crate::{
    error::Result,
    registry::{ParameterRegistry, Slot},
};

const FLOWS: [Flow; 2] = [Flow::new(0, 1, "beta*I*S/N"), Flow::new(1, 2, "gamma*I")];

/// The classic three compartment SIR model.
///
/// The recovery rate `gamma` is not a free parameter: it is derived from the mean
/// infectious `duration` every time it is needed.
#[derive(Debug, Clone)]
pub struct Sir {
    registry: ParameterRegistry,
    beta: Slot,
    duration: Slot,
    n: Slot,
}

impl Sir {
    /// Creates a new `Sir` model.
    ///
    /// # Arguments
    /// * `population` - The constant population size `N`.
    /// * `infected` - The initial amount of infected people, the rest is susceptible.
    /// * `beta` - The transmission rate.
    /// * `duration` - The mean infectious period.
    ///
    /// # Returns
    /// An error if any value isn't finite.
    pub fn new(population: f64, infected: f64, beta: f64, duration: f64) -> Result<Self> {
        let p = [
            ("beta", beta, "transmission rate"),
            ("duration", duration, "mean infectious period"),
        ];
        let q = [
            ("S", population - infected, "susceptible"),
            ("I", infected, "infected"),
            ("R", 0., "recovered"),
        ];
        let c = [("N", population, "population")];

        let registry = ParameterRegistry::new(p, q, c)?;

        Ok(Self {
            beta: registry.slot("beta")?,
            duration: registry.slot("duration")?,
            n: registry.slot("N")?,
            registry,
        })
    }

    /// The recovery rate, `1 / duration`.
    pub fn gamma(&self) -> f64 {
        1. / self.registry.value(self.duration)
    }
}

impl CompartmentModel for Sir {
    fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut ParameterRegistry {
        &mut self.registry
    }

    fn flows(&self) -> &[Flow] {
        &FLOWS
    }

    fn flow_rates(&self, state: ArrayView1<f64>) -> Vec<f64> {
        let beta = self.registry.value(self.beta);
        let n = self.registry.value(self.n);
        let (s, i) = (state[0], state[1]);

        vec![beta * i * s / n, self.gamma() * i]
    }

    fn r0(&self) -> f64 {
        self.registry.value(self.beta) / self.gamma()
    }

    fn derived_constants(&self) -> Vec<(&'static str, f64)> {
        vec![("gamma", self.gamma())]
    }
}
