use log::{Level, debug, log};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use super::{LrSchedule, Momentum, Schedule, UpdateRule};
use crate::{
    config::SgdConfig,
    error::{Result, SirErr},
};

/// Bounds of a single `train` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// The maximum amount of epochs.
    pub max_iter: usize,
    /// Training stops as soon as the loss goes below or equal to this threshold.
    pub early_th: Option<f64>,
    /// Logs every epoch at `info` level instead of `debug`.
    pub verbose: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            max_iter: 100,
            early_th: None,
            verbose: false,
        }
    }
}

/// Per sample stochastic gradient descent.
///
/// The optimizer owns the coefficients it trains, `U` decides how every gradient is
/// turned into an update and `S` how the learning rate evolves between epochs.
#[derive(Debug, Clone)]
pub struct Sgd<U: UpdateRule, S: LrSchedule> {
    coef: Array2<f64>,
    learning_rate_init: f64,
    learning_rate: f64,
    early_th: Option<f64>,
    rule: U,
    schedule: S,
    iterations: usize,
}

/// The momentum optimizer with a schedule chosen at runtime.
pub type SgdOptimizer = Sgd<Momentum, Schedule>;

impl SgdOptimizer {
    /// Creates a momentum optimizer from its configuration.
    pub fn from_config(coef: Array2<f64>, config: &SgdConfig) -> Self {
        let rule = Momentum::new(coef.raw_dim(), config.momentum);
        let schedule = Schedule::from_config(config);

        Sgd::assemble(coef, config.learning_rate_init, rule, schedule)
            .with_early_th(config.early_th)
    }
}

impl<U: UpdateRule, S: LrSchedule> Sgd<U, S> {
    /// Creates a new `Sgd` optimizer.
    ///
    /// # Arguments
    /// * `coef` - The initial coefficients.
    /// * `learning_rate_init` - The initial length of the steps.
    /// * `rule` - The update rule.
    /// * `schedule` - The learning rate schedule.
    ///
    /// # Returns
    /// `SirErr::SizeMismatch` if `rule` keeps state for coefficients of another shape.
    pub fn new(
        coef: Array2<f64>,
        learning_rate_init: f64,
        rule: U,
        schedule: S,
    ) -> Result<Self> {
        if let Some((rows, cols)) = rule.shape()
            && (rows, cols) != coef.dim()
        {
            let (got, expected) = if rows != coef.nrows() {
                (rows, coef.nrows())
            } else {
                (cols, coef.ncols())
            };

            return Err(SirErr::SizeMismatch {
                a: "update rule",
                b: "coef",
                got,
                expected,
            });
        }

        Ok(Self::assemble(coef, learning_rate_init, rule, schedule))
    }

    fn assemble(coef: Array2<f64>, learning_rate_init: f64, rule: U, schedule: S) -> Self {
        Self {
            coef,
            learning_rate_init,
            learning_rate: learning_rate_init,
            early_th: None,
            rule,
            schedule,
            iterations: 0,
        }
    }

    /// Sets the threshold used when a `train` call doesn't provide its own.
    pub fn with_early_th(mut self, early_th: Option<f64>) -> Self {
        self.early_th = early_th;
        self
    }

    pub fn coef(&self) -> &Array2<f64> {
        &self.coef
    }

    pub fn into_coef(self) -> Array2<f64> {
        self.coef
    }

    pub fn learning_rate_init(&self) -> f64 {
        self.learning_rate_init
    }

    /// The learning rate used for the next update.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// The amount of epochs completed by the last `train` call.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Applies one gradient to the coefficients.
    ///
    /// # Returns
    /// `SirErr::SizeMismatch` if `grad` isn't shaped like the coefficients, in which case
    /// nothing is modified.
    pub fn update_coef(&mut self, grad: ArrayView2<f64>) -> Result<()> {
        if grad.dim() != self.coef.dim() {
            let (got, expected) = if grad.nrows() != self.coef.nrows() {
                (grad.nrows(), self.coef.nrows())
            } else {
                (grad.ncols(), self.coef.ncols())
            };

            return Err(SirErr::SizeMismatch {
                a: "grad",
                b: "coef",
                got,
                expected,
            });
        }

        let update = self.rule.updates(grad, self.learning_rate);
        self.coef += &update;

        Ok(())
    }

    /// Hook called at the end of every epoch.
    ///
    /// # Arguments
    /// * `time_step` - The amount of samples trained on so far.
    /// * `loss` - The loss reached at the end of the epoch.
    pub fn iteration_ends(&mut self, time_step: usize, loss: f64) {
        self.learning_rate = self
            .schedule
            .adjust_rate(time_step, loss, self.learning_rate);
    }

    /// Optimizes the coefficients.
    ///
    /// Every epoch draws `x.nrows()` rows with replacement and applies the gradient of
    /// each of them, then evaluates the loss over the whole dataset.
    ///
    /// # Arguments
    /// * `x` - The features, one sample per row.
    /// * `y` - The expected targets, one sample per row.
    /// * `loss_fn` - `loss_fn(coef, x, y)`, the loss over a whole dataset.
    /// * `grad_fn` - `grad_fn(coef, x_row, y_row)`, the gradient for a single sample.
    /// * `options` - Bounds of the training.
    /// * `rng` - The random source used for resampling.
    ///
    /// # Returns
    /// The last computed loss, or an error if `x` and `y` don't have the same amount of
    /// rows or if a gradient isn't shaped like the coefficients.
    pub fn train<L, G, R>(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView2<f64>,
        loss_fn: L,
        grad_fn: G,
        options: TrainOptions,
        rng: &mut R,
    ) -> Result<f64>
    where
        L: Fn(ArrayView2<f64>, ArrayView2<f64>, ArrayView2<f64>) -> f64,
        G: Fn(ArrayView2<f64>, ArrayView1<f64>, ArrayView1<f64>) -> Array2<f64>,
        R: Rng,
    {
        if x.nrows() != y.nrows() {
            return Err(SirErr::SizeMismatch {
                a: "x rows",
                b: "y rows",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        let TrainOptions {
            max_iter,
            early_th,
            verbose,
        } = options;
        let early_th = early_th.or(self.early_th);
        let level = if verbose { Level::Info } else { Level::Debug };
        let rows = x.nrows();

        let mut loss = loss_fn(self.coef.view(), x, y);
        log!(level, epoch = 0, max_iter = max_iter, loss = loss; "training started");

        self.iterations = 0;
        let mut n_samples = 0;
        for epoch in 1..=max_iter {
            for _ in 0..rows {
                let row = rng.random_range(0..rows);
                let grad = grad_fn(self.coef.view(), x.row(row), y.row(row));
                self.update_coef(grad.view())?;
                n_samples += 1;
            }

            loss = loss_fn(self.coef.view(), x, y);
            self.iteration_ends(n_samples, loss);
            self.iterations = epoch;

            log!(
                level,
                epoch = epoch,
                max_iter = max_iter,
                loss = loss,
                lr = self.learning_rate;
                "epoch finished"
            );

            if early_th.is_some_and(|th| loss <= th) {
                debug!(epoch = epoch, loss = loss; "loss below threshold, stopping");
                break;
            }
        }

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, Ix2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        optimization::{Constant, InvScaling, PlainStep},
        predictor::{squared_loss, squared_loss_grad},
    };

    fn dataset() -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        let x = array![
            [0.5, -0.2, 0.9],
            [-0.7, 0.4, 0.1],
            [0.3, 0.8, -0.6],
            [-0.1, -0.9, 0.4],
            [0.9, 0.2, 0.3],
            [-0.4, 0.6, -0.8],
            [0.2, -0.5, -0.3],
            [-0.8, -0.3, 0.7],
        ];
        let coef = array![[0.5], [0.6], [-0.7]];
        let y = x.dot(&coef);

        (x, y, coef)
    }

    #[test]
    fn mismatched_grad_is_rejected_untouched() {
        let coef = array![[1.0], [2.0], [3.0]];
        let mut sgd = SgdOptimizer::from_config(coef.clone(), &SgdConfig::default());

        let res = sgd.update_coef(array![[1.0], [1.0]].view());
        assert!(matches!(
            res,
            Err(SirErr::SizeMismatch { got: 2, expected: 3, .. })
        ));

        let res = sgd.update_coef(array![[1.0, 1.0, 1.0]].view());
        assert!(matches!(res, Err(SirErr::SizeMismatch { .. })));
        assert_eq!(sgd.coef(), &coef);
    }

    #[test]
    fn rule_shaped_for_other_coefficients_is_rejected() {
        let rule = Momentum::new(Ix2(2, 2), 0.9);
        let res = Sgd::new(Array2::zeros((3, 1)), 0.1, rule, Constant);
        assert!(matches!(
            res,
            Err(SirErr::SizeMismatch { got: 2, expected: 3, .. })
        ));

        let rule = Momentum::new(Ix2(3, 2), 0.9);
        let res = Sgd::new(Array2::zeros((3, 1)), 0.1, rule, Constant);
        assert!(matches!(
            res,
            Err(SirErr::SizeMismatch { got: 2, expected: 1, .. })
        ));

        let rule = Momentum::new(Ix2(3, 1), 0.9);
        let mut sgd = Sgd::new(Array2::zeros((3, 1)), 0.1, rule, Constant).unwrap();
        sgd.update_coef(array![[1.0], [1.0], [1.0]].view()).unwrap();
        assert_eq!(sgd.coef(), &array![[-0.1], [-0.1], [-0.1]]);
    }

    #[test]
    fn update_adds_the_momentum_step() {
        let config = SgdConfig {
            learning_rate_init: 0.5,
            momentum: 0.5,
            ..SgdConfig::default()
        };
        let mut sgd = SgdOptimizer::from_config(array![[1.0, 1.0]], &config);

        sgd.update_coef(array![[1.0, 2.0]].view()).unwrap();
        assert_eq!(sgd.coef(), &array![[0.5, 0.0]]);

        sgd.update_coef(array![[1.0, 2.0]].view()).unwrap();
        assert_eq!(sgd.coef(), &array![[-0.25, -1.5]]);
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let (x, y, _) = dataset();
        let mut sgd = SgdOptimizer::from_config(Array2::zeros((3, 1)), &SgdConfig::default());
        let mut rng = StdRng::seed_from_u64(0);

        let res = sgd.train(
            x.view(),
            y.slice(ndarray::s![..4, ..]),
            squared_loss,
            squared_loss_grad,
            TrainOptions::default(),
            &mut rng,
        );
        assert!(matches!(res, Err(SirErr::SizeMismatch { .. })));
    }

    #[test]
    fn early_threshold_stops_training() {
        let (x, y, _) = dataset();
        let config = SgdConfig {
            learning_rate_init: 0.02,
            ..SgdConfig::default()
        };
        let mut sgd = SgdOptimizer::from_config(Array2::zeros((3, 1)), &config);
        let mut rng = StdRng::seed_from_u64(42);

        let options = TrainOptions {
            max_iter: 1000,
            early_th: Some(1e-10),
            verbose: true,
        };
        let loss = sgd
            .train(x.view(), y.view(), squared_loss, squared_loss_grad, options, &mut rng)
            .unwrap();

        assert!(loss <= 1e-10, "got loss: {loss}");
        assert!(sgd.iterations() < 1000, "ran {} epochs", sgd.iterations());
    }

    #[test]
    fn config_threshold_is_the_fallback() {
        let (x, y, _) = dataset();
        let config = SgdConfig {
            learning_rate_init: 0.02,
            early_th: Some(1e-6),
            ..SgdConfig::default()
        };
        let mut sgd = SgdOptimizer::from_config(Array2::zeros((3, 1)), &config);
        let mut rng = StdRng::seed_from_u64(7);

        let options = TrainOptions {
            max_iter: 1000,
            ..TrainOptions::default()
        };
        let loss = sgd
            .train(x.view(), y.view(), squared_loss, squared_loss_grad, options, &mut rng)
            .unwrap();

        assert!(loss <= 1e-6);
        assert!(sgd.iterations() < 1000);
    }

    #[test]
    fn runs_every_epoch_without_threshold() {
        let (x, y, _) = dataset();
        let mut sgd = Sgd::new(Array2::zeros((3, 1)), 0.05, PlainStep, Constant).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let options = TrainOptions {
            max_iter: 15,
            ..TrainOptions::default()
        };
        let initial = squared_loss(sgd.coef().view(), x.view(), y.view());
        let loss = sgd
            .train(x.view(), y.view(), squared_loss, squared_loss_grad, options, &mut rng)
            .unwrap();

        assert_eq!(sgd.iterations(), 15);
        assert!(loss < initial);
        assert_eq!(sgd.learning_rate(), 0.05);
    }

    #[test]
    fn invscaling_uses_the_sample_count() {
        let (x, y, _) = dataset();
        let mut sgd = Sgd::new(
            Array2::zeros((3, 1)),
            0.1,
            PlainStep,
            InvScaling::new(0.1, 0.5),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let options = TrainOptions {
            max_iter: 3,
            ..TrainOptions::default()
        };
        sgd.train(x.view(), y.view(), squared_loss, squared_loss_grad, options, &mut rng)
            .unwrap();

        // 3 epochs of 8 samples
        let expected = 0.1 / 25f64.sqrt();
        assert!((sgd.learning_rate() - expected).abs() < 1e-15);
    }

    #[test]
    fn same_seed_same_coefficients() {
        let (x, y, _) = dataset();
        let train = |seed| {
            let mut sgd = SgdOptimizer::from_config(Array2::zeros((3, 1)), &SgdConfig::default());
            let mut rng = StdRng::seed_from_u64(seed);
            let options = TrainOptions {
                max_iter: 5,
                ..TrainOptions::default()
            };
            sgd.train(x.view(), y.view(), squared_loss, squared_loss_grad, options, &mut rng)
                .unwrap();
            sgd.into_coef()
        };

        assert_eq!(train(11), train(11));
    }
}
