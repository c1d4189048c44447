//! Support-vector classifier.
//!
//! Two solvers share one config:
//! - [`Kernel::Linear`] solves the L1-loss dual by coordinate descent over a
//!   shuffled sample order, with the bias folded in as a constant feature.
//!   The fitted model is a dense weight vector.
//! - [`Kernel::Rbf`] runs SMO with maximal-violating-pair selection on
//!   `K(a, b) = exp(-gamma * |a - b|^2)`. The fitted model keeps the support
//!   vectors and their signed dual coefficients.

use crate::error::{LexiglotError, Result};
use crate::matrix::{FeatureMatrix, Row};
use crate::model::{signed, validate_training_data, Classifier, InferenceModel};
use crate::Label;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Quadratic coefficient floor for SMO steps on non-PSD pairs.
const TAU: f64 = 1e-12;

/// Default epoch cap for the linear solver.
const LINEAR_MAX_EPOCHS: usize = 1000;

/// Kernel width for [`Kernel::Rbf`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Gamma {
    /// `1 / (n_features * variance(X))`, or `1.0` for constant `X`.
    Scale,
    Value(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    Rbf(Gamma),
}

/// Configuration for [`SvcClassifier`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvcConfig {
    /// Box constraint on the dual variables.
    pub c: f64,
    pub kernel: Kernel,
    /// Stopping tolerance on the maximal KKT violation.
    pub tol: f64,
    /// Epochs for the linear solver, pair updates for the kernel solver.
    /// `None` picks a size-dependent default.
    pub max_iter: Option<usize>,
    /// Seed for the linear solver's sample order.
    pub seed: u64,
}

impl Default for SvcConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: Kernel::Rbf(Gamma::Scale),
            tol: 1e-3,
            max_iter: None,
            seed: 0,
        }
    }
}

/// Support-vector classifier (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SvcClassifier {
    config: SvcConfig,
}

impl SvcClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.config.kernel = kernel;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.config.tol = tol;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = Some(max_iter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn config(&self) -> &SvcConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        if !(self.config.c.is_finite() && self.config.c > 0.0) {
            return Err(LexiglotError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.config.c
            )));
        }
        if !(self.config.tol.is_finite() && self.config.tol > 0.0) {
            return Err(LexiglotError::InvalidParameter(format!(
                "tol must be positive, got {}",
                self.config.tol
            )));
        }
        if let Kernel::Rbf(Gamma::Value(g)) = self.config.kernel {
            if !(g.is_finite() && g > 0.0) {
                return Err(LexiglotError::InvalidParameter(format!(
                    "gamma must be positive, got {g}"
                )));
            }
        }
        Ok(())
    }

    fn fit_linear(&self, x: &FeatureMatrix, y: &[Label]) -> SvcModel {
        let (n, d) = x.shape();
        let c = self.config.c;
        let max_epochs = self.config.max_iter.unwrap_or(LINEAR_MAX_EPOCHS);
        let ys: Vec<f64> = y.iter().map(|&l| signed(l)).collect();
        // bias column is a constant 1, hence the +1
        let qd: Vec<f64> = x.rows().map(|r| r.squared_norm() + 1.0).collect();

        let mut weights = vec![0.0; d];
        let mut bias = 0.0;
        let mut alpha = vec![0.0; n];
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut converged = false;
        let mut epochs = 0;
        while epochs < max_epochs {
            epochs += 1;
            order.shuffle(&mut rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let row = x.row(i);
                let g = ys[i] * (row.dot_dense(&weights) + bias) - 1.0;
                let pg = if alpha[i] <= 0.0 {
                    g.min(0.0)
                } else if alpha[i] >= c {
                    g.max(0.0)
                } else {
                    g
                };
                pg_max = pg_max.max(pg);
                pg_min = pg_min.min(pg);

                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - g / qd[i]).clamp(0.0, c);
                    let step = (alpha[i] - old) * ys[i];
                    for (j, v) in row.iter() {
                        weights[j] += step * v;
                    }
                    bias += step;
                }
            }

            if pg_max - pg_min <= self.config.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(epochs, "linear SVC reached the epoch cap before converging");
        }
        debug!(epochs, features = d, "fitted linear SVC");
        SvcModel::Linear { weights, bias }
    }

    fn fit_rbf(&self, x: &FeatureMatrix, y: &[Label], gamma: Gamma) -> SvcModel {
        let n = x.n_rows();
        let c = self.config.c;
        let gamma = match gamma {
            Gamma::Value(g) => g,
            Gamma::Scale => {
                let spread = x.n_cols() as f64 * x.variance();
                if spread > 0.0 {
                    1.0 / spread
                } else {
                    1.0
                }
            }
        };
        let max_iter = self
            .config
            .max_iter
            .unwrap_or_else(|| 10_000_000usize.max(100 * n));
        let ys: Vec<f64> = y.iter().map(|&l| signed(l)).collect();
        let kernel = |a: usize, b: usize| (-gamma * x.row(a).squared_distance(&x.row(b))).exp();
        // Q_ij = y_i y_j K_ij
        let q_row = |i: usize| -> Vec<f64> { (0..n).map(|k| ys[i] * ys[k] * kernel(i, k)).collect() };

        let mut alpha = vec![0.0; n];
        let mut grad = vec![-1.0; n];
        let mut iter = 0;

        while iter < max_iter {
            let Some((i, j)) = select_working_set(&alpha, &grad, &ys, c, self.config.tol) else {
                break;
            };
            iter += 1;

            let qi = q_row(i);
            let qj = q_row(j);
            let (old_ai, old_aj) = (alpha[i], alpha[j]);
            let (mut ai, mut aj) = (old_ai, old_aj);

            if ys[i] != ys[j] {
                let quad = positive(qi[i] + qj[j] + 2.0 * qi[j]);
                let delta = (-grad[i] - grad[j]) / quad;
                let diff = ai - aj;
                ai += delta;
                aj += delta;
                if diff > 0.0 {
                    if aj < 0.0 {
                        aj = 0.0;
                        ai = diff;
                    }
                } else if ai < 0.0 {
                    ai = 0.0;
                    aj = -diff;
                }
                if diff > 0.0 {
                    if ai > c {
                        ai = c;
                        aj = c - diff;
                    }
                } else if aj > c {
                    aj = c;
                    ai = c + diff;
                }
            } else {
                let quad = positive(qi[i] + qj[j] - 2.0 * qi[j]);
                let delta = (grad[i] - grad[j]) / quad;
                let sum = ai + aj;
                ai -= delta;
                aj += delta;
                if sum > c {
                    if ai > c {
                        ai = c;
                        aj = sum - c;
                    }
                } else if aj < 0.0 {
                    aj = 0.0;
                    ai = sum;
                }
                if sum > c {
                    if aj > c {
                        aj = c;
                        ai = sum - c;
                    }
                } else if ai < 0.0 {
                    ai = 0.0;
                    aj = sum;
                }
            }

            alpha[i] = ai;
            alpha[j] = aj;
            let (dai, daj) = (ai - old_ai, aj - old_aj);
            for ((g, a), b) in grad.iter_mut().zip(&qi).zip(&qj) {
                *g += a * dai + b * daj;
            }
        }

        if iter >= max_iter {
            warn!(iter, "RBF SVC reached the iteration cap before converging");
        }

        let rho = compute_rho(&alpha, &grad, &ys, c);
        let support: Vec<usize> = (0..n).filter(|&i| alpha[i] > 0.0).collect();
        let dual_coef = support.iter().map(|&i| alpha[i] * ys[i]).collect();
        debug!(
            iter,
            support_vectors = support.len(),
            gamma,
            "fitted RBF SVC"
        );
        SvcModel::Kernel {
            support: x.select_rows(&support),
            dual_coef,
            rho,
            gamma,
        }
    }
}

fn positive(quad: f64) -> f64 {
    if quad > 0.0 {
        quad
    } else {
        TAU
    }
}

/// Maximal violating pair, or `None` once the KKT gap is below `tol`.
fn select_working_set(
    alpha: &[f64],
    grad: &[f64],
    ys: &[f64],
    c: f64,
    tol: f64,
) -> Option<(usize, usize)> {
    let mut g_max = f64::NEG_INFINITY;
    let mut g_max2 = f64::NEG_INFINITY;
    let mut i_best = None;
    let mut j_best = None;

    for t in 0..alpha.len() {
        let in_up = if ys[t] > 0.0 { alpha[t] < c } else { alpha[t] > 0.0 };
        let in_low = if ys[t] > 0.0 { alpha[t] > 0.0 } else { alpha[t] < c };
        let score = -ys[t] * grad[t];
        if in_up && score >= g_max {
            g_max = score;
            i_best = Some(t);
        }
        if in_low && -score >= g_max2 {
            g_max2 = -score;
            j_best = Some(t);
        }
    }

    match (i_best, j_best) {
        (Some(i), Some(j)) if g_max + g_max2 >= tol => Some((i, j)),
        _ => None,
    }
}

/// Offset of the decision function from the final gradient.
fn compute_rho(alpha: &[f64], grad: &[f64], ys: &[f64], c: f64) -> f64 {
    let mut ub = f64::INFINITY;
    let mut lb = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;

    for t in 0..alpha.len() {
        let yg = ys[t] * grad[t];
        if alpha[t] >= c {
            if ys[t] < 0.0 {
                ub = ub.min(yg);
            } else {
                lb = lb.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if ys[t] > 0.0 {
                ub = ub.min(yg);
            } else {
                lb = lb.max(yg);
            }
        } else {
            free_count += 1;
            free_sum += yg;
        }
    }

    if free_count > 0 {
        free_sum / free_count as f64
    } else {
        (ub + lb) / 2.0
    }
}

impl Classifier for SvcClassifier {
    type Params = SvcParams;
    type Fitted = SvcModel;

    fn fit(&self, x: &FeatureMatrix, y: &[Label]) -> Result<Self::Fitted> {
        self.validate()?;
        validate_training_data(x, y)?;
        Ok(match self.config.kernel {
            Kernel::Linear => self.fit_linear(x, y),
            Kernel::Rbf(gamma) => self.fit_rbf(x, y, gamma),
        })
    }
}

/// Fitted support-vector classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SvcModel {
    Linear {
        weights: Vec<f64>,
        bias: f64,
    },
    Kernel {
        support: FeatureMatrix,
        /// `alpha_i * y_i` per support vector.
        dual_coef: Vec<f64>,
        rho: f64,
        gamma: f64,
    },
}

/// Serializable parameters; the fitted model is plain data already.
pub type SvcParams = SvcModel;

impl SvcModel {
    /// Signed distance-like score; positive means English.
    pub fn decision_function(&self, row: &Row<'_>) -> f64 {
        match self {
            SvcModel::Linear { weights, bias } => row.dot_dense(weights) + bias,
            SvcModel::Kernel {
                support,
                dual_coef,
                rho,
                gamma,
            } => {
                support
                    .rows()
                    .zip(dual_coef)
                    .map(|(sv, coef)| coef * (-gamma * sv.squared_distance(row)).exp())
                    .sum::<f64>()
                    - rho
            }
        }
    }

    /// Number of support vectors; zero for the linear solver.
    pub fn n_support(&self) -> usize {
        match self {
            SvcModel::Linear { .. } => 0,
            SvcModel::Kernel { support, .. } => support.n_rows(),
        }
    }
}

impl InferenceModel for SvcModel {
    type Params = SvcParams;

    fn predict(&self, row: &Row<'_>) -> Label {
        if self.decision_function(row) > 0.0 {
            1
        } else {
            0
        }
    }

    fn n_features_in(&self) -> usize {
        match self {
            SvcModel::Linear { weights, .. } => weights.len(),
            SvcModel::Kernel { support, .. } => support.n_cols(),
        }
    }

    fn extract_params(&self) -> Self::Params {
        self.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self> {
        if let SvcModel::Kernel {
            support,
            dual_coef,
            ..
        } = &params
        {
            if support.n_rows() != dual_coef.len() {
                return Err(LexiglotError::InvalidParameter(format!(
                    "{} support vectors but {} dual coefficients",
                    support.n_rows(),
                    dual_coef.len()
                )));
            }
        }
        Ok(params)
    }
}
