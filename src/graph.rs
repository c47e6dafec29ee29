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

//! Point series with per-point errors, in two and three dimensions.

use std::fmt;
use std::fs;
use std::path::Path;

use statrs::statistics::Statistics;

use crate::error::{Error, Result};
use crate::fit::{self, FitConfig, FitResult, LeastSquares};
use crate::function::{Function1D, Function2D};
use crate::hist::{split_title, Histogram1D};
use crate::render::DrawStyle;

/// Selects a coordinate of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coord {
    /// The first coordinate.
    X,
    /// The second coordinate.
    Y,
}

/// Points `(x, y)` with symmetric errors `(ex, ey)`.
#[derive(Debug, Clone, Default)]
pub struct GraphErrors {
    /// Identifier used in legends.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Label of the x axis.
    pub x_title: String,
    /// Label of the y axis.
    pub y_title: String,
    /// Line, marker and fill attributes.
    pub style: DrawStyle,
    x: Vec<f64>,
    y: Vec<f64>,
    ex: Vec<f64>,
    ey: Vec<f64>,
    fit: Option<Function1D>,
}

fn check_len(expected: usize, values: &[f64]) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected,
            actual: values.len(),
        })
    }
}

impl GraphErrors {
    /// Builds a graph from values and optional errors. Missing errors are zero.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] unless every given array has the length of `x`.
    pub fn new(x: &[f64], y: &[f64], ex: Option<&[f64]>, ey: Option<&[f64]>) -> Result<Self> {
        let n = x.len();
        check_len(n, y)?;
        let zeros = vec![0.0; n];
        let ex = ex.unwrap_or(&zeros);
        let ey = ey.unwrap_or(&zeros);
        check_len(n, ex)?;
        check_len(n, ey)?;
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            ex: ex.to_vec(),
            ey: ey.to_vec(),
            ..Self::default()
        })
    }

    /// Reads whitespace-separated columns from a text file.
    ///
    /// Two columns are `x y`, three are `x y ey` and four are `x y ex ey`. Blank lines and
    /// lines starting with `#` are skipped. Every data row must have the same number of columns.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`] for a malformed row.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut graph = Self::parse(&text, path)?;
        graph.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), points = graph.len(), "graph loaded");
        Ok(graph)
    }

    fn parse(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |line: usize, message: String| Error::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };
        let mut columns: Option<usize> = None;
        let mut graph = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let values = line
                .split_whitespace()
                .map(|field| {
                    field
                        .parse::<f64>()
                        .map_err(|_| parse_error(index + 1, format!("invalid number '{field}'")))
                })
                .collect::<Result<Vec<f64>>>()?;
            if !(2..=4).contains(&values.len()) {
                return Err(parse_error(
                    index + 1,
                    format!("expected 2 to 4 columns, found {}", values.len()),
                ));
            }
            match columns {
                Some(n) if n != values.len() => {
                    return Err(parse_error(
                        index + 1,
                        format!("expected {n} columns, found {}", values.len()),
                    ));
                }
                _ => columns = Some(values.len()),
            }
            let (ex, ey) = match values.len() {
                2 => (0.0, 0.0),
                3 => (0.0, values[2]),
                _ => (values[2], values[3]),
            };
            graph.push(values[0], values[1], ex, ey);
        }
        Ok(graph)
    }

    /// Appends a point.
    pub fn push(&mut self, x: f64, y: f64, ex: f64, ey: f64) {
        self.x.push(x);
        self.y.push(y);
        self.ex.push(ex);
        self.ey.push(ey);
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

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the graph has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// x values.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y values.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// x errors.
    #[must_use]
    pub fn ex(&self) -> &[f64] {
        &self.ex
    }

    /// y errors.
    #[must_use]
    pub fn ey(&self) -> &[f64] {
        &self.ey
    }

    fn values(&self, coord: Coord) -> &[f64] {
        match coord {
            Coord::X => &self.x,
            Coord::Y => &self.y,
        }
    }

    /// Mean of a coordinate over the points.
    #[must_use]
    pub fn mean(&self, coord: Coord) -> f64 {
        Statistics::mean(self.values(coord))
    }

    /// Root mean square deviation of a coordinate from its mean.
    #[must_use]
    pub fn rms(&self, coord: Coord) -> f64 {
        Statistics::population_std_dev(self.values(coord))
    }

    /// `(min, max)` of `values ± errors`, or `None` for an empty graph.
    #[must_use]
    pub fn extent(&self, coord: Coord) -> Option<(f64, f64)> {
        let (values, errors) = match coord {
            Coord::X => (&self.x, &self.ex),
            Coord::Y => (&self.y, &self.ey),
        };
        values.iter().zip(errors).fold(None, |acc, (&v, &e)| {
            let (lo, hi) = (v - e, v + e);
            Some(match acc {
                None => (lo, hi),
                Some((a, b)) => (f64::min(a, lo), f64::max(b, hi)),
            })
        })
    }

    /// Fits `function` to the points by χ² with the effective variance
    /// `ey² + (f'(x)·ex)²`, restricted to the function range.
    ///
    /// Points with zero total error are ignored, unless every point has zero error, in which case
    /// all points get unit weight. A point whose effective variance vanishes at the current
    /// parameters also gets unit weight. The parameters are written back into `function`; a copy is
    /// kept for the fit box.
    ///
    /// # Errors
    /// Returns [`Error::EmptyData`] if no point lies in the function range.
    pub fn fit(&mut self, function: &mut Function1D) -> Result<FitResult> {
        let (lo, hi) = function.range();
        let in_range: Vec<usize> = (0..self.len())
            .filter(|&i| self.x[i] >= lo && self.x[i] <= hi)
            .collect();
        let all_zero = in_range.iter().all(|&i| self.ex[i] == 0.0 && self.ey[i] == 0.0);
        let used: Vec<usize> = if all_zero {
            in_range
        } else {
            in_range
                .into_iter()
                .filter(|&i| self.ex[i] > 0.0 || self.ey[i] > 0.0)
                .collect()
        };
        if used.is_empty() {
            return Err(Error::EmptyData(format!(
                "graph '{}' has no points in [{lo}, {hi}]",
                self.name
            )));
        }
        let problem = EffectiveVariance {
            graph: &*self,
            used: &used,
            unit_errors: all_zero,
            function: &*function,
        };
        let result = fit::minimize(&problem, function.parameters(), &FitConfig::default())?
            .with_names(function.parameter_names());
        function.apply_fit(&result)?;
        tracing::info!(
            graph = %self.name,
            function = %function.name,
            chi2 = result.chi2,
            ndf = result.ndf,
            "graph fit complete"
        );
        self.fit = Some(function.clone());
        Ok(result)
    }

    /// The function fitted by the last [`GraphErrors::fit`].
    #[must_use]
    pub fn fitted_function(&self) -> Option<&Function1D> {
        self.fit.as_ref()
    }
}

struct EffectiveVariance<'a> {
    graph: &'a GraphErrors,
    used: &'a [usize],
    unit_errors: bool,
    function: &'a Function1D,
}

impl LeastSquares for EffectiveVariance<'_> {
    fn n_residuals(&self) -> usize {
        self.used.len()
    }

    fn n_params(&self) -> usize {
        self.function.parameters().len()
    }

    fn residual(&self, i: usize, params: &[f64]) -> f64 {
        let k = self.used[i];
        let (x, y) = (self.graph.x[k], self.graph.y[k]);
        let model = self.function.eval_with(x, params);
        if self.unit_errors {
            return y - model;
        }
        let ex = self.graph.ex[k];
        let slope = if ex > 0.0 {
            self.function.derivative_with(x, params)
        } else {
            0.0
        };
        let variance = self.graph.ey[k].powi(2) + (slope * ex).powi(2);
        // A flat function over a point with only x errors has no variance; weigh it as one.
        if variance > 0.0 {
            (y - model) / variance.sqrt()
        } else {
            y - model
        }
    }
}

impl fmt::Display for GraphErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            writeln!(
                f,
                "x[{i}]={}, y[{i}]={}, ex[{i}]={}, ey[{i}]={}",
                self.x[i], self.y[i], self.ex[i], self.ey[i]
            )?;
        }
        Ok(())
    }
}

/// Points `(x, y, z)` with errors `(ex, ey, ez)`.
#[derive(Debug, Clone, Default)]
pub struct Graph2DErrors {
    /// Identifier used in legends.
    pub name: String,
    /// Marker attributes.
    pub style: DrawStyle,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    ex: Vec<f64>,
    ey: Vec<f64>,
    ez: Vec<f64>,
}

impl Graph2DErrors {
    /// Number of bins along the projected coordinate in [`Graph2DErrors::project`].
    pub const PROJECTION_BINS: usize = 40;

    /// Constructs `n` points at the origin with zero errors, to be set with
    /// [`Graph2DErrors::set_point`].
    #[must_use]
    pub fn with_len(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
            ex: vec![0.0; n],
            ey: vec![0.0; n],
            ez: vec![0.0; n],
            ..Self::default()
        }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the graph has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Sets point `i`, growing the graph if needed.
    pub fn set_point(&mut self, i: usize, x: f64, y: f64, z: f64) {
        if i >= self.len() {
            let columns = [
                &mut self.x,
                &mut self.y,
                &mut self.z,
                &mut self.ex,
                &mut self.ey,
                &mut self.ez,
            ];
            for v in columns {
                v.resize(i + 1, 0.0);
            }
        }
        self.x[i] = x;
        self.y[i] = y;
        self.z[i] = z;
    }

    /// Sets the errors of point `i`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the point does not exist.
    pub fn set_point_error(&mut self, i: usize, ex: f64, ey: f64, ez: f64) -> Result<()> {
        if i >= self.len() {
            return Err(Error::InvalidParameter(format!(
                "point {i} does not exist in a graph of {} points",
                self.len()
            )));
        }
        self.ex[i] = ex;
        self.ey[i] = ey;
        self.ez[i] = ez;
        Ok(())
    }

    /// Point `i` as `(x, y, z)`.
    #[must_use]
    pub fn point(&self, i: usize) -> Option<(f64, f64, f64)> {
        (i < self.len()).then(|| (self.x[i], self.y[i], self.z[i]))
    }

    /// Errors of point `i` as `(ex, ey, ez)`.
    #[must_use]
    pub fn point_error(&self, i: usize) -> Option<(f64, f64, f64)> {
        (i < self.len()).then(|| (self.ex[i], self.ey[i], self.ez[i]))
    }

    /// Fits `function` by χ² with the effective variance
    /// `ez² + (∂f/∂x·ex)² + (∂f/∂y·ey)²`. Points with zero total error are ignored; a point
    /// whose effective variance vanishes at the current parameters gets unit weight.
    ///
    /// # Errors
    /// Returns [`Error::EmptyData`] if no point has a non-zero error.
    pub fn fit(&self, function: &mut Function2D) -> Result<FitResult> {
        let used: Vec<usize> = (0..self.len())
            .filter(|&i| self.ex[i] > 0.0 || self.ey[i] > 0.0 || self.ez[i] > 0.0)
            .collect();
        if used.is_empty() {
            return Err(Error::EmptyData(format!(
                "graph '{}' has no points with errors",
                self.name
            )));
        }
        let problem = EffectiveVariance2D {
            graph: self,
            used: &used,
            function: &*function,
        };
        let result = fit::minimize(&problem, function.parameters(), &FitConfig::default())?;
        function.apply_fit(&result)?;
        tracing::info!(
            graph = %self.name,
            function = %function.name,
            chi2 = result.chi2,
            ndf = result.ndf,
            "2D graph fit complete"
        );
        Ok(result)
    }

    /// Histogram of one coordinate weighted by z, with
    /// [`Graph2DErrors::PROJECTION_BINS`] bins spanning the data.
    ///
    /// # Errors
    /// Returns [`Error::EmptyData`] for an empty graph.
    pub fn project(&self, coord: Coord) -> Result<Histogram1D> {
        let values = match coord {
            Coord::X => &self.x,
            Coord::Y => &self.y,
        };
        let (lo, hi) = values
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, &v| {
                Some(acc.map_or((v, v), |(a, b)| (a.min(v), b.max(v))))
            })
            .ok_or_else(|| Error::EmptyData(format!("graph '{}' has no points", self.name)))?;
        // Widen slightly so the largest value lands inside the last bin.
        let pad = if hi > lo { (hi - lo) * 1e-6 } else { 0.5 };
        let suffix = match coord {
            Coord::X => "x",
            Coord::Y => "y",
        };
        let mut hist = Histogram1D::new(
            &format!("{}_{suffix}", self.name),
            &format!("Projection on {suffix}"),
            Self::PROJECTION_BINS,
            lo - pad,
            hi + pad,
        )?;
        hist.x_axis.title = suffix.to_string();
        for (&v, &z) in values.iter().zip(&self.z) {
            hist.fill_weighted(v, z);
        }
        Ok(hist)
    }
}

struct EffectiveVariance2D<'a> {
    graph: &'a Graph2DErrors,
    used: &'a [usize],
    function: &'a Function2D,
}

impl LeastSquares for EffectiveVariance2D<'_> {
    fn n_residuals(&self) -> usize {
        self.used.len()
    }

    fn n_params(&self) -> usize {
        self.function.parameters().len()
    }

    fn residual(&self, i: usize, params: &[f64]) -> f64 {
        let k = self.used[i];
        let g = self.graph;
        let model = self.function.eval_with(g.x[k], g.y[k], params);
        let (dx, dy) = if g.ex[k] > 0.0 || g.ey[k] > 0.0 {
            self.function.gradient_with(g.x[k], g.y[k], params)
        } else {
            (0.0, 0.0)
        };
        let variance = g.ez[k].powi(2) + (dx * g.ex[k]).powi(2) + (dy * g.ey[k]).powi(2);
        if variance > 0.0 {
            (g.z[k] - model) / variance.sqrt()
        } else {
            g.z[k] - model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const X: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    const Y: [f64; 10] = [6.0, 12.0, 14.0, 20.0, 22.0, 24.0, 35.0, 45.0, 44.0, 53.0];
    const EY: [f64; 10] = [5.0, 5.0, 4.7, 4.5, 4.2, 5.1, 2.9, 4.1, 4.8, 5.43];

    #[test]
    fn lengths_must_agree() {
        assert!(GraphErrors::new(&X, &Y[..9], None, None).is_err());
        assert!(GraphErrors::new(&X, &Y, None, Some(&EY[..3])).is_err());
        let g = GraphErrors::new(&X, &Y, None, Some(&EY)).unwrap();
        assert_eq!(g.len(), 10);
        assert!(g.ex().iter().all(|&e| e == 0.0));
    }

    #[test]
    fn parse_three_columns_verbatim() {
        let text = "# x y ey\n1 6 5\n\n2 12 5\n3 14 4.7\n";
        let g = GraphErrors::parse(text, Path::new("mem.txt")).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.x(), &[1.0, 2.0, 3.0]);
        assert_eq!(g.y(), &[6.0, 12.0, 14.0]);
        assert_eq!(g.ey(), &[5.0, 5.0, 4.7]);
        assert_eq!(g.ex(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn parse_four_columns() {
        let g = GraphErrors::parse("1 2 0.1 0.2\n3 4 0.3 0.4\n", Path::new("m")).unwrap();
        assert_eq!(g.ex(), &[0.1, 0.3]);
        assert_eq!(g.ey(), &[0.2, 0.4]);
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let err = GraphErrors::parse("1 2 3\n4 five 6\n", Path::new("bad.txt")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");
        let err = GraphErrors::parse("1 2 3\n4 5\n", Path::new("bad.txt")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");
        let err = GraphErrors::parse("1\n", Path::new("bad.txt")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn title_splits_axis_titles() {
        let mut g = GraphErrors::default();
        g.set_title("Measurement XYZ;length [cm];Arb.Units");
        assert_eq!(g.title, "Measurement XYZ");
        assert_eq!(g.x_title, "length [cm]");
        assert_eq!(g.y_title, "Arb.Units");
    }

    #[test]
    fn linear_fit_matches_weighted_least_squares() {
        let mut g = GraphErrors::new(&X, &Y, None, Some(&EY)).unwrap();
        let mut f = Function1D::new("Linear law", "[0]+x*[1]", 0.5, 10.5).unwrap();
        let result = g.fit(&mut f).unwrap();

        // Closed-form weighted linear regression.
        let w: Vec<f64> = EY.iter().map(|e| 1.0 / (e * e)).collect();
        let s: f64 = w.iter().sum();
        let sx: f64 = w.iter().zip(&X).map(|(w, x)| w * x).sum();
        let sy: f64 = w.iter().zip(&Y).map(|(w, y)| w * y).sum();
        let sxx: f64 = w.iter().zip(&X).map(|(w, x)| w * x * x).sum();
        let sxy: f64 = w.iter().zip(X.iter().zip(&Y)).map(|(w, (x, y))| w * x * y).sum();
        let delta = s * sxx - sx * sx;
        let slope = (s * sxy - sx * sy) / delta;
        let offset = (sxx * sy - sx * sxy) / delta;

        assert!(result.converged);
        assert_relative_eq!(f.parameter(0), offset, epsilon = 1e-5);
        assert_relative_eq!(f.parameter(1), slope, epsilon = 1e-6);
        assert_relative_eq!(result.errors[1], (s / delta).sqrt(), epsilon = 1e-5);
        assert_eq!(result.ndf, 8);
        assert!(g.fitted_function().is_some());
    }

    #[test]
    fn zero_errors_fall_back_to_unit_weights() {
        let mut g = GraphErrors::new(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0], None, None).unwrap();
        let mut f = Function1D::new("lin", "[0]+x*[1]", -1.0, 3.0).unwrap();
        g.fit(&mut f).unwrap();
        assert_relative_eq!(f.parameter(1), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn constant_fit_with_only_x_errors() {
        let mut g = GraphErrors::new(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0], Some(&[0.1; 3][..]), None)
            .unwrap();
        let mut f = Function1D::new("level", "[0]", 0.0, 4.0).unwrap();
        f.set_parameter(0, 1.0).unwrap();
        let result = g.fit(&mut f).unwrap();
        assert_relative_eq!(f.parameter(0), 4.0, epsilon = 1e-6);
        assert_eq!(result.ndf, 2);
        assert!(result.chi2.is_finite());
    }

    #[test]
    fn flat_surface_fit_with_only_xy_errors() {
        let mut g = Graph2DErrors::with_len(4);
        for (i, (x, y, z)) in [(0.0, 0.0, 1.0), (1.0, 0.0, 3.0), (0.0, 1.0, 3.0), (1.0, 1.0, 5.0)]
            .into_iter()
            .enumerate()
        {
            g.set_point(i, x, y, z);
            g.set_point_error(i, 0.1, 0.1, 0.0).unwrap();
        }
        let mut f = Function2D::new("level", "[0] + 0*x*y", -1.0, 2.0, -1.0, 2.0).unwrap();
        let result = g.fit(&mut f).unwrap();
        assert_relative_eq!(f.parameter(0), 3.0, epsilon = 1e-6);
        assert_eq!(result.ndf, 3);
    }

    #[test]
    fn display_lists_points() {
        let g = GraphErrors::new(&[1.0], &[6.0], None, Some(&[5.0][..])).unwrap();
        assert_eq!(g.to_string(), "x[0]=1, y[0]=6, ex[0]=0, ey[0]=5\n");
    }

    #[test]
    fn graph2d_fit_recovers_plane() {
        let mut g = Graph2DErrors::with_len(0);
        let mut i = 0;
        for xi in 0..6 {
            for yi in 0..6 {
                let (x, y) = (f64::from(xi), f64::from(yi));
                g.set_point(i, x, y, 2.0 * x - 0.5 * y + 1.0);
                g.set_point_error(i, 0.0, 0.0, 0.1).unwrap();
                i += 1;
            }
        }
        let mut f = Function2D::new("plane", "[0]*x + [1]*y + [2]", 0.0, 5.0, 0.0, 5.0).unwrap();
        let result = g.fit(&mut f).unwrap();
        assert_relative_eq!(f.parameter(0), 2.0, epsilon = 1e-6);
        assert_relative_eq!(f.parameter(1), -0.5, epsilon = 1e-6);
        assert_relative_eq!(f.parameter(2), 1.0, epsilon = 1e-6);
        assert_eq!(result.ndf, 33);
    }

    #[test]
    fn projection_sums_z() {
        let mut g = Graph2DErrors::with_len(3);
        g.set_point(0, 0.0, 0.0, 1.0);
        g.set_point(1, 1.0, 5.0, 2.0);
        g.set_point(2, 2.0, 2.0, 4.0);
        assert!(g.set_point_error(3, 0.0, 0.0, 0.0).is_err());
        let px = g.project(Coord::X).unwrap();
        assert_relative_eq!(px.integral(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(px.bin_content(px.nbins() + 1), 0.0);
        let py = g.project(Coord::Y).unwrap();
        assert_relative_eq!(py.integral(), 7.0, epsilon = 1e-12);
    }
}
