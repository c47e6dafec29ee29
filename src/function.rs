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

//! Functions of one and two variables defined by a [`Formula`] and a parameter vector.

use crate::error::{Error, Result};
use crate::fit::FitResult;
use crate::formula::Formula;
use crate::hist::split_title;
use crate::random::Random;
use crate::render::{Color, DrawStyle};

fn check_range(lo: f64, hi: f64, what: &str) -> Result<()> {
    if lo < hi && lo.is_finite() && hi.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("{what} range [{lo}, {hi}] is empty")))
    }
}

fn default_style() -> DrawStyle {
    DrawStyle {
        line_color: Color::Red,
        line_width: 2,
        ..DrawStyle::default()
    }
}

/// Step used for numerical derivatives, scaled to the magnitude of `x`.
fn derivative_step(x: f64) -> f64 {
    1e-4 * x.abs().max(1e-2)
}

/// A parametric function of `x` on a fixed range.
#[derive(Debug, Clone)]
pub struct Function1D {
    /// Identifier used in legends.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Label of the x axis.
    pub x_title: String,
    /// Label of the y axis.
    pub y_title: String,
    /// Number of segments used to draw the curve.
    pub npx: usize,
    /// Line attributes.
    pub style: DrawStyle,
    formula: Formula,
    params: Vec<f64>,
    errors: Vec<f64>,
    names: Vec<String>,
    xmin: f64,
    xmax: f64,
    fit: Option<FitResult>,
}

impl Function1D {
    /// Compiles `expression` and constructs a function on `[xmin, xmax]` with all parameters
    /// set to zero.
    ///
    /// # Errors
    /// Returns [`Error::Formula`] if the expression does not compile or uses `y`, and
    /// [`Error::InvalidParameter`] for an empty range.
    pub fn new(name: &str, expression: &str, xmin: f64, xmax: f64) -> Result<Self> {
        let formula = Formula::compile(expression)?;
        if formula.dimension() != 1 {
            return Err(Error::Formula(format!(
                "'{expression}' is not a function of x alone"
            )));
        }
        check_range(xmin, xmax, "x")?;
        let n = formula.n_params();
        Ok(Self {
            name: name.to_string(),
            title: expression.to_string(),
            x_title: String::new(),
            y_title: String::new(),
            npx: 100,
            style: default_style(),
            formula,
            params: vec![0.0; n],
            errors: vec![0.0; n],
            names: (0..n).map(|i| format!("p{i}")).collect(),
            xmin,
            xmax,
            fit: None,
        })
    }

    /// Sets the title; text after `;` sets the axis titles.
    pub fn set_title(&mut self, full: &str) {
        let (title, x, y) = split_title(full);
        self.title = title;
        if let Some(x) = x {
            self.x_title = x;
        }
        if let Some(y) = y {
            self.y_title = y;
        }
    }

    /// Sets parameter `index`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the formula has no such parameter.
    pub fn set_parameter(&mut self, index: usize, value: f64) -> Result<()> {
        let slot = self.params.get_mut(index).ok_or_else(|| {
            Error::InvalidParameter(format!("'{}' has no parameter {index}", self.name))
        })?;
        *slot = value;
        Ok(())
    }

    /// Sets the leading parameters from `values`.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if more values than parameters are given.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<()> {
        if values.len() > self.params.len() {
            return Err(Error::DimensionMismatch {
                expected: self.params.len(),
                actual: values.len(),
            });
        }
        self.params[..values.len()].copy_from_slice(values);
        Ok(())
    }

    /// Renames the leading parameters.
    pub fn set_parameter_names(&mut self, names: &[&str]) {
        for (slot, name) in self.names.iter_mut().zip(names) {
            *slot = (*name).to_string();
        }
    }

    /// Value of parameter `index`, or NaN if there is none.
    #[must_use]
    pub fn parameter(&self, index: usize) -> f64 {
        self.params.get(index).copied().unwrap_or(f64::NAN)
    }

    /// All parameter values.
    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.params
    }

    /// Uncertainties from the last fit, zero before any fit.
    #[must_use]
    pub fn parameter_errors(&self) -> &[f64] {
        &self.errors
    }

    /// Parameter names, `p0`, `p1`, ... unless renamed.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.names
    }

    /// Drawing and fitting range.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.xmin, self.xmax)
    }

    /// The expression text.
    #[must_use]
    pub fn expression(&self) -> &str {
        self.formula.text()
    }

    /// Value at `x` with the current parameters.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        self.formula.eval(&[x], &self.params)
    }

    /// Value at `x` with the given parameters.
    #[must_use]
    pub fn eval_with(&self, x: f64, params: &[f64]) -> f64 {
        self.formula.eval(&[x], params)
    }

    /// Central-difference derivative at `x` with the given parameters.
    #[must_use]
    pub fn derivative_with(&self, x: f64, params: &[f64]) -> f64 {
        let h = derivative_step(x);
        (self.eval_with(x + h, params) - self.eval_with(x - h, params)) / (2.0 * h)
    }

    /// Central-difference derivative at `x` with the current parameters.
    #[must_use]
    pub fn derivative(&self, x: f64) -> f64 {
        self.derivative_with(x, &self.params)
    }

    /// `npx + 1` equally spaced samples over the range. Non-finite values are dropped.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn points(&self) -> Vec<(f64, f64)> {
        let n = self.npx.max(1);
        let step = (self.xmax - self.xmin) / n as f64;
        (0..=n)
            .map(|i| {
                let x = self.xmin + step * i as f64;
                (x, self.eval(x))
            })
            .filter(|(_, y)| y.is_finite())
            .collect()
    }

    /// Writes the fitted parameters back and keeps `result` for display.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if `result` has a different parameter count.
    pub fn apply_fit(&mut self, result: &FitResult) -> Result<()> {
        if result.parameters.len() != self.params.len() {
            return Err(Error::DimensionMismatch {
                expected: self.params.len(),
                actual: result.parameters.len(),
            });
        }
        self.params.copy_from_slice(&result.parameters);
        self.errors.copy_from_slice(&result.errors);
        self.fit = Some(result.clone());
        Ok(())
    }

    /// Result of the last fit that updated this function.
    #[must_use]
    pub fn fit_result(&self) -> Option<&FitResult> {
        self.fit.as_ref()
    }
}

/// A parametric function of `x` and `y` on a rectangle.
#[derive(Debug, Clone)]
pub struct Function2D {
    /// Identifier used in legends.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Label of the x axis.
    pub x_title: String,
    /// Label of the y axis.
    pub y_title: String,
    /// Label of the z axis.
    pub z_title: String,
    /// Grid cells along x, for drawing and sampling.
    pub npx: usize,
    /// Grid cells along y, for drawing and sampling.
    pub npy: usize,
    /// Line attributes of the surface mesh.
    pub style: DrawStyle,
    formula: Formula,
    params: Vec<f64>,
    errors: Vec<f64>,
    range: [f64; 4],
    fit: Option<FitResult>,
    // Cumulative cell weights for `random2` and the grid they were built on.
    integral: Option<((usize, usize), Vec<f64>)>,
}

impl Function2D {
    /// Compiles `expression` and constructs a function on `[xmin, xmax] × [ymin, ymax]`.
    ///
    /// # Errors
    /// Returns [`Error::Formula`] if the expression does not compile and
    /// [`Error::InvalidParameter`] for an empty range.
    pub fn new(
        name: &str,
        expression: &str,
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    ) -> Result<Self> {
        let formula = Formula::compile(expression)?;
        check_range(xmin, xmax, "x")?;
        check_range(ymin, ymax, "y")?;
        let n = formula.n_params();
        Ok(Self {
            name: name.to_string(),
            title: expression.to_string(),
            x_title: String::new(),
            y_title: String::new(),
            z_title: String::new(),
            npx: 30,
            npy: 30,
            style: default_style(),
            formula,
            params: vec![0.0; n],
            errors: vec![0.0; n],
            range: [xmin, xmax, ymin, ymax],
            fit: None,
            integral: None,
        })
    }

    /// Sets the leading parameters from `values`.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if more values than parameters are given.
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<()> {
        if values.len() > self.params.len() {
            return Err(Error::DimensionMismatch {
                expected: self.params.len(),
                actual: values.len(),
            });
        }
        self.params[..values.len()].copy_from_slice(values);
        self.integral = None;
        Ok(())
    }

    /// Value of parameter `index`, or NaN if there is none.
    #[must_use]
    pub fn parameter(&self, index: usize) -> f64 {
        self.params.get(index).copied().unwrap_or(f64::NAN)
    }

    /// All parameter values.
    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.params
    }

    /// Uncertainties from the last fit.
    #[must_use]
    pub fn parameter_errors(&self) -> &[f64] {
        &self.errors
    }

    /// `(xmin, xmax, ymin, ymax)`.
    #[must_use]
    pub fn range(&self) -> (f64, f64, f64, f64) {
        let [a, b, c, d] = self.range;
        (a, b, c, d)
    }

    /// Value at `(x, y)` with the current parameters.
    #[must_use]
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.formula.eval(&[x, y], &self.params)
    }

    /// Value at `(x, y)` with the given parameters.
    #[must_use]
    pub fn eval_with(&self, x: f64, y: f64, params: &[f64]) -> f64 {
        self.formula.eval(&[x, y], params)
    }

    /// Central-difference partial derivatives `(∂f/∂x, ∂f/∂y)` with the given parameters.
    #[must_use]
    pub fn gradient_with(&self, x: f64, y: f64, params: &[f64]) -> (f64, f64) {
        let hx = derivative_step(x);
        let hy = derivative_step(y);
        let dx =
            (self.eval_with(x + hx, y, params) - self.eval_with(x - hx, y, params)) / (2.0 * hx);
        let dy =
            (self.eval_with(x, y + hy, params) - self.eval_with(x, y - hy, params)) / (2.0 * hy);
        (dx, dy)
    }

    /// Values on an `(npx + 1) × (npy + 1)` grid of points, row-major in x.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn grid(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let [xmin, xmax, ymin, ymax] = self.range;
        let nx = self.npx.max(1);
        let ny = self.npy.max(1);
        let xs: Vec<f64> = (0..=nx)
            .map(|i| xmin + (xmax - xmin) * i as f64 / nx as f64)
            .collect();
        let ys: Vec<f64> = (0..=ny)
            .map(|j| ymin + (ymax - ymin) * j as f64 / ny as f64)
            .collect();
        let zs = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| (x, y)))
            .map(|(x, y)| self.eval(x, y))
            .collect();
        (xs, ys, zs)
    }

    #[allow(clippy::cast_precision_loss)]
    fn build_integral(&self) -> Result<Vec<f64>> {
        let [xmin, xmax, ymin, ymax] = self.range;
        let nx = self.npx.max(1);
        let ny = self.npy.max(1);
        let dx = (xmax - xmin) / nx as f64;
        let dy = (ymax - ymin) / ny as f64;
        let mut cumulative = Vec::with_capacity(nx * ny);
        let mut total = 0.0;
        for j in 0..ny {
            for i in 0..nx {
                let x = xmin + (i as f64 + 0.5) * dx;
                let y = ymin + (j as f64 + 0.5) * dy;
                let v = self.eval(x, y);
                // Negative and undefined regions are never sampled.
                if v.is_finite() && v > 0.0 {
                    total += v;
                }
                cumulative.push(total);
            }
        }
        if total <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "'{}' is nowhere positive on its range",
                self.name
            )));
        }
        Ok(cumulative)
    }

    /// Draws a point with probability proportional to the function value.
    ///
    /// A grid cell is chosen from the cumulative cell weights, then the point is placed uniformly
    /// inside the cell.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the function is nowhere positive.
    #[allow(clippy::cast_precision_loss)]
    pub fn random2(&mut self, rng: &mut Random) -> Result<(f64, f64)> {
        let grid = (self.npx.max(1), self.npy.max(1));
        if !matches!(&self.integral, Some((built, _)) if *built == grid) {
            self.integral = Some((grid, self.build_integral()?));
        }
        let cumulative = self.integral.as_ref().map_or(&[][..], |(_, c)| c.as_slice());
        let total = cumulative.last().copied().unwrap_or(0.0);
        let target = rng.uniform() * total;
        let cell = cumulative
            .partition_point(|&c| c <= target)
            .min(cumulative.len() - 1);
        let nx = self.npx.max(1);
        let (i, j) = (cell % nx, cell / nx);
        let [xmin, xmax, ymin, ymax] = self.range;
        let dx = (xmax - xmin) / nx as f64;
        let dy = (ymax - ymin) / self.npy.max(1) as f64;
        let x = xmin + (i as f64 + rng.uniform()) * dx;
        let y = ymin + (j as f64 + rng.uniform()) * dy;
        Ok((x, y))
    }

    /// Writes the fitted parameters back and keeps `result` for display.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if `result` has a different parameter count.
    pub fn apply_fit(&mut self, result: &FitResult) -> Result<()> {
        if result.parameters.len() != self.params.len() {
            return Err(Error::DimensionMismatch {
                expected: self.params.len(),
                actual: result.parameters.len(),
            });
        }
        self.params.copy_from_slice(&result.parameters);
        self.errors.copy_from_slice(&result.errors);
        self.fit = Some(result.clone());
        self.integral = None;
        Ok(())
    }

    /// Result of the last fit that updated this function.
    #[must_use]
    pub fn fit_result(&self) -> Option<&FitResult> {
        self.fit.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parameters_drive_evaluation() {
        let mut f = Function1D::new("f2", "[0]*sin([1]*x)/x", 0.0, 10.0).unwrap();
        f.set_parameter(0, 0.5).unwrap();
        f.set_parameter(1, 2.0).unwrap();
        assert_relative_eq!(f.eval(1.0), 0.5 * 2f64.sin(), epsilon = 1e-12);
        assert!(f.set_parameter(2, 1.0).is_err());
        assert!(f.set_parameters(&[1.0, 2.0, 3.0]).is_err());
        assert!(f.parameter(5).is_nan());
    }

    #[test]
    fn points_skip_singularity() {
        let mut f = Function1D::new("f2", "[0]*sin([1]*x)/x", 0.0, 10.0).unwrap();
        f.set_parameters(&[1.0, 1.0]).unwrap();
        let points = f.points();
        // x = 0 gives 0/0 and is dropped.
        assert_eq!(points.len(), f.npx);
        assert!(points.iter().all(|(_, y)| y.is_finite()));
    }

    #[test]
    fn derivative_of_line() {
        let mut f = Function1D::new("lin", "[0]+x*[1]", 0.0, 10.0).unwrap();
        f.set_parameters(&[1.0, 3.0]).unwrap();
        assert_relative_eq!(f.derivative(4.0), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_second_variable_and_empty_range() {
        assert!(Function1D::new("f", "x*y", 0.0, 1.0).is_err());
        assert!(Function1D::new("f", "x", 1.0, 0.0).is_err());
        assert!(Function2D::new("f", "x*y", 0.0, 1.0, 2.0, 2.0).is_err());
    }

    #[test]
    fn random2_stays_in_range_and_follows_weight() {
        // All the weight sits at x > 0.
        let mut f = Function2D::new("f", "max(x, 0)", -1.0, 1.0, -1.0, 1.0).unwrap();
        let mut rng = Random::new(42);
        for _ in 0..500 {
            let (x, y) = f.random2(&mut rng).unwrap();
            assert!((0.0..=1.0).contains(&x), "x = {x}");
            assert!((-1.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn random2_follows_grid_changes() {
        let mut f = Function2D::new("f", "1 + 0*x*y", 0.0, 1.0, 0.0, 1.0).unwrap();
        let mut rng = Random::new(7);
        f.random2(&mut rng).unwrap();
        f.npx = 3;
        f.npy = 50;
        for _ in 0..2000 {
            let (x, y) = f.random2(&mut rng).unwrap();
            assert!((0.0..=1.0).contains(&x), "x = {x}");
            assert!((0.0..=1.0).contains(&y), "y = {y}");
        }
    }

    #[test]
    fn random2_needs_positive_region() {
        let mut f = Function2D::new("f", "-1 - x*x", -1.0, 1.0, -1.0, 1.0).unwrap();
        let mut rng = Random::new(1);
        assert!(f.random2(&mut rng).is_err());
    }

    #[test]
    fn gradient_of_plane() {
        let f = Function2D::new("p", "[0]*x + [1]*y", 0.0, 1.0, 0.0, 1.0).unwrap();
        let (dx, dy) = f.gradient_with(0.3, 0.6, &[2.0, -5.0]);
        assert_relative_eq!(dx, 2.0, epsilon = 1e-6);
        assert_relative_eq!(dy, -5.0, epsilon = 1e-6);
    }
}
