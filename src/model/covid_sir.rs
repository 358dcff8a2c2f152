use ndarray::ArrayView1;

use super::{CompartmentModel, Flow};
use crate::{
    error::{Result, SirErr},
    registry::{NamedQuantity, ParameterRegistry, Slot},
};

/// SIR model with a death compartment: susceptible, infected, recovered and dead.
///
/// ```text
///   S -- beta*I*S/N --> I -- mu*I --> R
///                       I -- nu*I --> D
/// ```
#[derive(Debug, Clone)]
pub struct CovidSir {
    registry: ParameterRegistry,
    flows: Vec<Flow>,
    beta: Slot,
    mu: Slot,
    nu: Slot,
    n: Slot,
    s: usize,
    i: usize,
}

impl CovidSir {
    /// Builds the model on top of an existing registry.
    ///
    /// The registry must declare the parameters `beta`, `mu` and `nu`, the quantities
    /// `S`, `I`, `R` and `D` and the constant `N`.
    pub fn from_registry(registry: ParameterRegistry) -> Result<Self> {
        let compartments: Vec<_> = registry.q().iter().map(NamedQuantity::name).collect();
        let position = |name: &str| {
            compartments
                .iter()
                .position(|&c| c == name)
                .ok_or_else(|| SirErr::UnknownName {
                    name: name.to_string(),
                })
        };

        let (s, i, r, d) = (position("S")?, position("I")?, position("R")?, position("D")?);
        if compartments.len() != 4 {
            return Err(SirErr::SizeMismatch {
                a: "quantities",
                b: "CovidSir compartments",
                got: compartments.len(),
                expected: 4,
            });
        }

        let flows = vec![
            Flow::new(s, i, "beta*I*S/N"),
            Flow::new(i, r, "mu*I"),
            Flow::new(i, d, "nu*I"),
        ];

        Ok(Self {
            beta: registry.slot("beta")?,
            mu: registry.slot("mu")?,
            nu: registry.slot("nu")?,
            n: registry.slot("N")?,
            registry,
            flows,
            s,
            i,
        })
    }

    /// Creates the model with its default parameters: 10 infected people out of a
    /// population of 10000, `beta = 0.5`, `mu = 1/14` and `nu = 1/21`.
    pub fn new() -> Result<Self> {
        Self::default_registry().and_then(Self::from_registry)
    }

    fn default_registry() -> Result<ParameterRegistry> {
        let p = [
            ("beta", 0.5, "transmission rate within the population"),
            ("mu", 1. / 14., "1/. : mean duration until recovery"),
            ("nu", 1. / 21., "1/. : mean duration until death"),
        ];
        let q = [
            ("S", 9990., "people not yet infected"),
            ("I", 10., "people infected or contagious"),
            ("R", 0., "recovered people"),
            ("D", 0., "deceased people"),
        ];
        let c = [("N", 10000., "population")];

        Ok(ParameterRegistry::new(p, q, c)?
            .with_info("SIR model with a death compartment, constant population"))
    }
}

impl CompartmentModel for CovidSir {
    fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut ParameterRegistry {
        &mut self.registry
    }

    fn flows(&self) -> &[Flow] {
        &self.flows
    }

    fn flow_rates(&self, state: ArrayView1<f64>) -> Vec<f64> {
        let r = &self.registry;
        let (beta, mu, nu, n) = (
            r.value(self.beta),
            r.value(self.mu),
            r.value(self.nu),
            r.value(self.n),
        );
        let (s, i) = (state[self.s], state[self.i]);

        vec![beta * i * s / n, mu * i, nu * i]
    }

    /// `beta / (mu + nu)`
    fn r0(&self) -> f64 {
        let r = &self.registry;
        r.value(self.beta) / (r.value(self.mu) + r.value(self.nu))
    }
}
