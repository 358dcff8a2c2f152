use log::debug;

use crate::config::{LrScheduleKind, SgdConfig};

/// Decides the learning rate to use for the next epoch.
pub trait LrSchedule {
    /// Called once at the end of every epoch.
    ///
    /// # Arguments
    /// * `time_step` - The amount of samples trained on so far.
    /// * `loss` - The loss over the whole dataset at the end of the epoch.
    /// * `rate` - The learning rate used during the epoch.
    ///
    /// # Returns
    /// The learning rate for the next epoch.
    fn adjust_rate(&mut self, time_step: usize, loss: f64, rate: f64) -> f64;
}

/// Keeps the learning rate untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

impl LrSchedule for Constant {
    fn adjust_rate(&mut self, _time_step: usize, _loss: f64, rate: f64) -> f64 {
        rate
    }
}

/// `learning_rate_init / (time_step + 1) ^ power_t`
#[derive(Debug, Clone, Copy)]
pub struct InvScaling {
    learning_rate_init: f64,
    power_t: f64,
}

impl InvScaling {
    pub fn new(learning_rate_init: f64, power_t: f64) -> Self {
        Self {
            learning_rate_init,
            power_t,
        }
    }
}

impl LrSchedule for InvScaling {
    fn adjust_rate(&mut self, time_step: usize, _loss: f64, _rate: f64) -> f64 {
        self.learning_rate_init / ((time_step + 1) as f64).powf(self.power_t)
    }
}

/// Divides the learning rate by `factor` every time `patience` consecutive epochs fail to
/// improve the best loss seen so far by at least `tol`.
#[derive(Debug, Clone, Copy)]
pub struct Adaptive {
    tol: f64,
    patience: usize,
    factor: f64,
    best: f64,
    stalled: usize,
}

impl Adaptive {
    pub fn new(tol: f64, patience: usize, factor: f64) -> Self {
        Self {
            tol,
            patience: patience.max(1),
            factor,
            best: f64::INFINITY,
            stalled: 0,
        }
    }
}

impl LrSchedule for Adaptive {
    fn adjust_rate(&mut self, time_step: usize, loss: f64, rate: f64) -> f64 {
        if loss > self.best - self.tol {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.best = self.best.min(loss);

        if self.stalled < self.patience {
            return rate;
        }

        self.stalled = 0;
        let rate = rate / self.factor;
        debug!(time_step = time_step, rate = rate; "loss stalled, reducing learning rate");
        rate
    }
}

/// A schedule picked at runtime from an [`SgdConfig`].
#[derive(Debug, Clone, Copy)]
pub enum Schedule {
    Constant(Constant),
    InvScaling(InvScaling),
    Adaptive(Adaptive),
}

impl Schedule {
    pub fn from_config(config: &SgdConfig) -> Self {
        match config.lr_schedule {
            LrScheduleKind::Constant => Self::Constant(Constant),
            LrScheduleKind::InvScaling => {
                Self::InvScaling(InvScaling::new(config.learning_rate_init, config.power_t))
            }
            LrScheduleKind::Adaptive => Self::Adaptive(Adaptive::new(
                config.adaptive_tol,
                config.adaptive_patience,
                config.adaptive_factor,
            )),
        }
    }
}

impl LrSchedule for Schedule {
    fn adjust_rate(&mut self, time_step: usize, loss: f64, rate: f64) -> f64 {
        match self {
            Self::Constant(s) => s.adjust_rate(time_step, loss, rate),
            Self::InvScaling(s) => s.adjust_rate(time_step, loss, rate),
            Self::Adaptive(s) => s.adjust_rate(time_step, loss, rate),
        }
    }
}
