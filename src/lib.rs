//! Compartmental epidemic models, their discrete simulation and a linear surrogate
//! trained on the simulated dynamics with momentum SGD.

pub mod config;
pub mod error;
pub mod model;
pub mod optimization;
pub mod predictor;
pub mod registry;
pub mod simulation;

pub use config::{LrScheduleKind, SgdConfig, SimulationConfig};
pub use error::{Result, SirErr};
pub use model::{CompartmentModel, CovidSir, Flow, Sir};
pub use optimization::{Sgd, SgdOptimizer, TrainOptions};
pub use predictor::LinearPredictor;
pub use registry::{NamedQuantity, ParameterRegistry, QuantityClass};
pub use simulation::{Simulation, Simulator, Step};
