pub mod init;
mod schedule;
mod sgd;
mod update_rule;

pub use schedule::{Adaptive, Constant, InvScaling, LrSchedule, Schedule};
pub use sgd::{Sgd, SgdOptimizer, TrainOptions};
pub use update_rule::{Momentum, PlainStep, UpdateRule};
