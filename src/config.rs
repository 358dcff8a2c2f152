use serde::Deserialize;

use crate::error::Result;

/// How the learning rate evolves between epochs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LrScheduleKind {
    /// The learning rate stays at its initial value.
    #[default]
    Constant,
    /// `learning_rate_init / (t + 1) ^ power_t`, `t` being the amount of samples seen.
    InvScaling,
    /// Divided by `adaptive_factor` each time the loss stalls for `adaptive_patience` epochs.
    Adaptive,
}

/// Hyperparameters of the momentum SGD optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SgdConfig {
    pub learning_rate_init: f64,
    pub lr_schedule: LrScheduleKind,
    pub momentum: f64,
    pub power_t: f64,
    pub early_th: Option<f64>,
    pub adaptive_tol: f64,
    pub adaptive_patience: usize,
    pub adaptive_factor: f64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            learning_rate_init: 0.1,
            lr_schedule: LrScheduleKind::Constant,
            momentum: 0.9,
            power_t: 0.5,
            early_th: None,
            adaptive_tol: 1e-4,
            adaptive_patience: 2,
            adaptive_factor: 5.,
        }
    }
}

impl SgdConfig {
    /// Parses a configuration from JSON, missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Bounds of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The amount of discrete steps produced by every pass.
    pub horizon: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { horizon: 10 }
    }
}

impl SimulationConfig {
    /// Parses a configuration from JSON, missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SirErr;

    #[test]
    fn missing_fields_take_defaults() {
        let config = SgdConfig::from_json(r#"{"lr_schedule": "invscaling", "power_t": 0.25}"#)
            .unwrap();
        assert_eq!(config.lr_schedule, LrScheduleKind::InvScaling);
        assert_eq!(config.power_t, 0.25);
        assert_eq!(config.learning_rate_init, 0.1);
        assert_eq!(config.momentum, 0.9);
        assert_eq!(config.early_th, None);

        assert_eq!(SimulationConfig::from_json("{}").unwrap().horizon, 10);
    }

    #[test]
    fn unknown_schedule_is_rejected() {
        let res = SgdConfig::from_json(r#"{"lr_schedule": "cosine"}"#);
        assert!(matches!(res, Err(SirErr::Config(_))));
    }
}
