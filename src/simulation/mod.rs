mod simulator;
mod step;

pub use simulator::{Simulation, Simulator};
pub use step::{Step, step};
