// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Least-squares minimisation.
//!
//! A fit is described by implementing [`LeastSquares`]: a set of residuals, each already divided
//! by its uncertainty, so that χ² is the sum of their squares. [`minimize`] runs a
//! Levenberg–Marquardt iteration with a numerical Jacobian and reports the parameter errors from
//! the inverse of `JᵀJ`.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{Error, Result};

/// Normalised residuals of a χ² fit.
pub trait LeastSquares {
    /// Number of residuals (data points that take part in the fit).
    fn n_residuals(&self) -> usize;

    /// Number of free parameters.
    fn n_params(&self) -> usize;

    /// `(observed - model) / uncertainty` for residual `i`.
    fn residual(&self, i: usize, params: &[f64]) -> f64;

    /// All residuals at `params`.
    fn residuals(&self, params: &[f64]) -> DVector<f64> {
        DVector::from_iterator(
            self.n_residuals(),
            (0..self.n_residuals()).map(|i| self.residual(i, params)),
        )
    }

    /// Jacobian of the residuals by central differences.
    fn jacobian(&self, params: &[f64]) -> DMatrix<f64> {
        let n = self.n_residuals();
        let m = params.len();
        let mut jac = DMatrix::zeros(n, m);
        let mut shifted = params.to_vec();
        for j in 0..m {
            let eps = 1e-7 * params[j].abs().max(1.0);
            shifted[j] = params[j] + eps;
            let plus = self.residuals(&shifted);
            shifted[j] = params[j] - eps;
            let minus = self.residuals(&shifted);
            shifted[j] = params[j];
            jac.set_column(j, &((plus - minus) / (2.0 * eps)));
        }
        jac
    }
}

/// Configuration of [`minimize`].
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Maximum number of accepted steps.
    pub max_iter: usize,
    /// Relative χ² decrease below which the fit is considered converged.
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Parameter names, `p0`, `p1`, ... unless the caller provides better ones.
    pub names: Vec<String>,
    /// Best-fit parameters.
    pub parameters: Vec<f64>,
    /// One-sigma uncertainties.
    pub errors: Vec<f64>,
    /// χ² at the minimum.
    pub chi2: f64,
    /// Number of degrees of freedom, points minus parameters.
    pub ndf: usize,
    /// Probability of a χ² at least this large.
    pub probability: f64,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Whether the χ² stopped decreasing before `max_iter`.
    pub converged: bool,
    /// False when `JᵀJ` was singular and the errors come from a pseudo-inverse.
    pub covariance_valid: bool,
}

impl FitResult {
    /// Replaces the leading parameter names.
    #[must_use]
    pub fn with_names(mut self, names: &[String]) -> Self {
        for (slot, name) in self.names.iter_mut().zip(names) {
            slot.clone_from(name);
        }
        self
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "****************************************")?;
        writeln!(f, "Minimizer is Levenberg-Marquardt")?;
        writeln!(f, "Chi2                      = {:>12.6}", self.chi2)?;
        writeln!(f, "NDf                       = {:>12}", self.ndf)?;
        writeln!(f, "Prob                      = {:>12.6}", self.probability)?;
        writeln!(f, "Iterations                = {:>12}", self.iterations)?;
        if !self.converged {
            writeln!(f, "WARNING: fit did not converge")?;
        }
        if !self.covariance_valid {
            writeln!(f, "WARNING: covariance matrix is singular")?;
        }
        for ((name, value), error) in self.names.iter().zip(&self.parameters).zip(&self.errors) {
            writeln!(f, "{name:<25} = {value:>12.6} +/- {error:<12.6}")?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss)]
fn chi2_probability(chi2: f64, ndf: usize) -> f64 {
    if ndf == 0 || !chi2.is_finite() {
        return 0.0;
    }
    match ChiSquared::new(ndf as f64) {
        Ok(distr) => (1.0 - distr.cdf(chi2)).clamp(0.0, 1.0),
        Err(_) => 0.0,
    }
}

/// Solves `(A + λ·diag(A)) δ = -g`.
fn damped_step(a: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut damped = a.clone();
    for j in 0..a.nrows() {
        damped[(j, j)] += lambda * a[(j, j)].max(1e-12);
    }
    let rhs = -g.clone();
    match damped.clone().cholesky() {
        Some(chol) => Some(chol.solve(&rhs)),
        None => damped.lu().solve(&rhs),
    }
}

/// Inverse of `JᵀJ`, falling back to the pseudo-inverse when it is singular.
fn covariance(a: &DMatrix<f64>) -> (DMatrix<f64>, bool) {
    let eigen = a.clone().symmetric_eigen();
    let max = eigen.eigenvalues.iter().copied().fold(0.0, f64::max);
    let min = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    if max > 0.0 && min > max * 1e-12 {
        if let Some(inv) = a.clone().try_inverse() {
            return (inv, true);
        }
    }
    let pinv = a
        .clone()
        .pseudo_inverse(max * 1e-12)
        .unwrap_or_else(|_| DMatrix::from_element(a.nrows(), a.ncols(), f64::NAN));
    (pinv, false)
}

/// Minimises χ² starting from `initial`.
///
/// # Errors
/// Returns [`Error::EmptyData`] when the problem has no residuals,
/// [`Error::DimensionMismatch`] when `initial` does not match the parameter count, and
/// [`Error::InvalidParameter`] when χ² is not finite at the starting point.
pub fn minimize(
    problem: &impl LeastSquares,
    initial: &[f64],
    config: &FitConfig,
) -> Result<FitResult> {
    let n = problem.n_residuals();
    let m = problem.n_params();
    if n == 0 {
        return Err(Error::EmptyData("nothing to fit".into()));
    }
    if initial.len() != m {
        return Err(Error::DimensionMismatch {
            expected: m,
            actual: initial.len(),
        });
    }

    let mut params = initial.to_vec();
    let mut chi2 = problem.residuals(&params).norm_squared();
    if !chi2.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "chi2 is not finite at the starting parameters {params:?}"
        )));
    }

    let mut lambda = 1e-3;
    let mut iterations = 0;
    let mut converged = m == 0;
    while !converged && iterations < config.max_iter {
        let jac = problem.jacobian(&params);
        let residuals = problem.residuals(&params);
        let a = jac.transpose() * &jac;
        let g = jac.transpose() * residuals;

        let mut accepted = None;
        while lambda < 1e16 {
            if let Some(step) = damped_step(&a, &g, lambda) {
                let candidate: Vec<f64> =
                    params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
                let candidate_chi2 = problem.residuals(&candidate).norm_squared();
                if candidate_chi2.is_finite() && candidate_chi2 <= chi2 {
                    accepted = Some((candidate, candidate_chi2));
                    lambda = (lambda / 10.0).max(1e-12);
                    break;
                }
            }
            lambda *= 10.0;
        }

        match accepted {
            Some((candidate, candidate_chi2)) => {
                iterations += 1;
                let decrease = chi2 - candidate_chi2;
                params = candidate;
                chi2 = candidate_chi2;
                if decrease <= config.tolerance * chi2.max(1.0) {
                    converged = true;
                }
            }
            // No step lowers χ² any further.
            None => converged = true,
        }
    }

    let jac = problem.jacobian(&params);
    let (cov, covariance_valid) = covariance(&(jac.transpose() * &jac));
    let errors = (0..m).map(|j| cov[(j, j)].max(0.0).sqrt()).collect();
    let ndf = n.saturating_sub(m);
    tracing::debug!(iterations, chi2, ndf, converged, "minimization finished");

    Ok(FitResult {
        names: (0..m).map(|i| format!("p{i}")).collect(),
        parameters: params,
        errors,
        chi2,
        ndf,
        probability: chi2_probability(chi2, ndf),
        iterations,
        converged,
        covariance_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Straight line through points with unit errors.
    struct Line {
        points: Vec<(f64, f64)>,
    }

    impl LeastSquares for Line {
        fn n_residuals(&self) -> usize {
            self.points.len()
        }

        fn n_params(&self) -> usize {
            2
        }

        fn residual(&self, i: usize, params: &[f64]) -> f64 {
            let (x, y) = self.points[i];
            y - (params[0] + params[1] * x)
        }
    }

    #[test]
    fn exact_line_is_recovered() {
        let points = (0..10).map(|i| (f64::from(i), 1.5 + 2.0 * f64::from(i))).collect();
        let result = minimize(&Line { points }, &[0.0, 0.0], &FitConfig::default()).unwrap();
        assert!(result.converged);
        assert!(result.covariance_valid);
        assert_relative_eq!(result.parameters[0], 1.5, epsilon = 1e-6);
        assert_relative_eq!(result.parameters[1], 2.0, epsilon = 1e-6);
        assert!(result.chi2 < 1e-10);
        assert_eq!(result.ndf, 8);
    }

    #[test]
    fn errors_match_analytic_line_fit() {
        // For unit errors, var(slope) = 1 / Σ(x - x̄)².
        let points: Vec<(f64, f64)> = [(0.0, 0.1), (1.0, 0.9), (2.0, 2.2), (3.0, 2.8)].to_vec();
        let result = minimize(&Line { points }, &[0.0, 1.0], &FitConfig::default()).unwrap();
        assert_relative_eq!(result.errors[1], (1.0f64 / 5.0).sqrt(), epsilon = 1e-5);
        assert!(result.probability > 0.0 && result.probability <= 1.0);
    }

    /// Only the product of the two parameters is constrained.
    struct Product;

    impl LeastSquares for Product {
        fn n_residuals(&self) -> usize {
            5
        }

        fn n_params(&self) -> usize {
            2
        }

        fn residual(&self, i: usize, params: &[f64]) -> f64 {
            let x = f64::from(u32::try_from(i).unwrap_or_default());
            3.0 * x - params[0] * params[1] * x
        }
    }

    #[test]
    fn degenerate_parameters_flag_the_covariance() {
        let result = minimize(&Product, &[1.0, 1.0], &FitConfig::default()).unwrap();
        assert_relative_eq!(result.parameters[0] * result.parameters[1], 3.0, epsilon = 1e-5);
        assert!(!result.covariance_valid);
    }

    #[test]
    fn bad_inputs() {
        let empty = Line { points: Vec::new() };
        assert!(matches!(
            minimize(&empty, &[0.0, 0.0], &FitConfig::default()),
            Err(Error::EmptyData(_))
        ));
        let line = Line { points: vec![(0.0, 1.0)] };
        assert!(matches!(
            minimize(&line, &[0.0], &FitConfig::default()),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn display_lists_parameters() {
        let points = (0..5).map(|i| (f64::from(i), f64::from(i))).collect();
        let result = minimize(&Line { points }, &[0.0, 0.0], &FitConfig::default())
            .unwrap()
            .with_names(&["offset".to_string(), "slope".to_string()]);
        let text = result.to_string();
        assert!(text.contains("offset"));
        assert!(text.contains("slope"));
        assert!(text.contains("NDf"));
    }
}
