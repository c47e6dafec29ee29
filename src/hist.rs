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

//! One-dimensional histograms with fixed-width bins.
//!
//! Bins are numbered the usual way for physics histograms: bin `0` is the underflow, bins
//! `1..=nbins` cover the axis range and bin `nbins + 1` is the overflow.

use std::fmt;

use crate::error::{Error, Result};
use crate::fit::{self, FitConfig, FitResult, LeastSquares};
use crate::function::Function1D;
use crate::render::DrawStyle;
use crate::simulation::Fill;

/// A fixed-width binning of `[min, max)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    nbins: usize,
    min: f64,
    max: f64,
    /// Label drawn along the axis.
    pub title: String,
}

impl Axis {
    /// Constructs an axis with `nbins` equal bins over `[min, max)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `nbins` is zero or `min >= max`.
    pub fn new(nbins: usize, min: f64, max: f64) -> Result<Self> {
        if nbins == 0 {
            return Err(Error::InvalidParameter("number of bins must be positive".into()));
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "axis range [{min}, {max}) is empty"
            )));
        }
        Ok(Self {
            nbins,
            min,
            max,
            title: String::new(),
        })
    }

    /// Number of in-range bins.
    #[must_use]
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// Lower edge of the first bin.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the last bin.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of every bin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.nbins as f64
    }

    /// Bin holding `x`. The upper edge and NaN go to the overflow.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.min {
            return 0;
        }
        if !(x < self.max) {
            return self.nbins + 1;
        }
        let bin = ((x - self.min) / self.bin_width()) as usize + 1;
        bin.min(self.nbins)
    }

    /// Centre of `bin`. Flow bins get the centre of a virtual bin just outside the range.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_center(&self, bin: usize) -> f64 {
        self.min + (bin as f64 - 0.5) * self.bin_width()
    }

    /// Lower edge of `bin`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_low_edge(&self, bin: usize) -> f64 {
        self.min + (bin as f64 - 1.0) * self.bin_width()
    }

    fn same_binning(&self, other: &Axis) -> bool {
        self.nbins == other.nbins && self.min == other.min && self.max == other.max
    }
}

/// Splits a title of the form `"title;x title;y title"`.
pub(crate) fn split_title(full: &str) -> (String, Option<String>, Option<String>) {
    let mut parts = full.split(';');
    let title = parts.next().unwrap_or_default().to_string();
    let x = parts.next().map(str::to_string);
    let y = parts.next().map(str::to_string);
    (title, x, y)
}

/// Running sums over in-range fills, used for the moments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Stats {
    sumw: f64,
    sumw2: f64,
    sumwx: f64,
    sumwx2: f64,
}

/// A one-dimensional histogram of `f64` values with optional weights.
#[derive(Debug, Clone)]
pub struct Histogram1D {
    /// Identifier used in legends and the statistics box.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Binning along x.
    pub x_axis: Axis,
    /// Label of the vertical axis.
    pub y_title: String,
    /// Line, marker and fill attributes.
    pub style: DrawStyle,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
    entries: f64,
    stats: Stats,
    fit: Option<Function1D>,
}

impl Histogram1D {
    /// Constructs an empty histogram.
    ///
    /// `title` may carry axis titles separated by `;`, as in `"Count Rate;N;# occurrences"`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for an empty binning.
    pub fn new(name: &str, title: &str, nbins: usize, min: f64, max: f64) -> Result<Self> {
        let x_axis = Axis::new(nbins, min, max)?;
        let mut hist = Self {
            name: name.to_string(),
            title: String::new(),
            x_axis,
            y_title: String::new(),
            style: DrawStyle::default(),
            contents: vec![0.0; nbins + 2],
            sumw2: vec![0.0; nbins + 2],
            entries: 0.0,
            stats: Stats::default(),
            fit: None,
        };
        hist.set_title(title);
        Ok(hist)
    }

    /// Builds a histogram directly from per-bin contents and squared errors, flows included.
    pub(crate) fn from_bins(
        name: &str,
        x_axis: Axis,
        contents: Vec<f64>,
        sumw2: Vec<f64>,
        entries: f64,
    ) -> Self {
        debug_assert_eq!(contents.len(), x_axis.nbins + 2);
        let mut hist = Self {
            name: name.to_string(),
            title: String::new(),
            x_axis,
            y_title: String::new(),
            style: DrawStyle::default(),
            contents,
            sumw2,
            entries,
            stats: Stats::default(),
            fit: None,
        };
        hist.reset_stats();
        hist
    }

    /// Sets the title; text after `;` sets the x and y axis titles.
    pub fn set_title(&mut self, full: &str) {
        let (title, x, y) = split_title(full);
        self.title = title;
        if let Some(x) = x {
            self.x_axis.title = x;
        }
        if let Some(y) = y {
            self.y_title = y;
        }
    }

    /// Adds `x` with unit weight and returns the bin it went to.
    pub fn fill(&mut self, x: f64) -> usize {
        self.fill_weighted(x, 1.0)
    }

    /// Adds `x` with weight `w` and returns the bin it went to.
    ///
    /// Under- and overflow fills are counted in [`Histogram1D::entries`] but do not contribute
    /// to the moments.
    pub fn fill_weighted(&mut self, x: f64, w: f64) -> usize {
        let bin = self.x_axis.find_bin(x);
        self.contents[bin] += w;
        self.sumw2[bin] += w * w;
        self.entries += 1.0;
        if bin >= 1 && bin <= self.x_axis.nbins {
            self.stats.sumw += w;
            self.stats.sumw2 += w * w;
            self.stats.sumwx += w * x;
            self.stats.sumwx2 += w * x * x;
        }
        bin
    }

    /// Number of in-range bins.
    #[must_use]
    pub fn nbins(&self) -> usize {
        self.x_axis.nbins
    }

    /// Content of `bin` (0 = underflow, `nbins + 1` = overflow). Out of range bins read as zero.
    #[must_use]
    pub fn bin_content(&self, bin: usize) -> f64 {
        self.contents.get(bin).copied().unwrap_or(0.0)
    }

    /// Statistical error of `bin`: the square root of the sum of squared weights.
    #[must_use]
    pub fn bin_error(&self, bin: usize) -> f64 {
        self.sumw2.get(bin).copied().unwrap_or(0.0).sqrt()
    }

    /// Every bin content, underflow first and overflow last.
    #[must_use]
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Number of fill calls, including those that landed in the flow bins.
    #[must_use]
    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Sum of in-range bin contents.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.contents[1..=self.x_axis.nbins].iter().sum()
    }

    /// Largest in-range bin content.
    #[must_use]
    pub fn maximum(&self) -> f64 {
        self.contents[1..=self.x_axis.nbins]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest in-range bin content.
    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.contents[1..=self.x_axis.nbins]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Mean of the in-range fills.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.stats.sumw == 0.0 {
            return 0.0;
        }
        self.stats.sumwx / self.stats.sumw
    }

    /// Standard deviation of the in-range fills.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.stats.sumw == 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.stats.sumwx2 / self.stats.sumw - mean * mean).abs().sqrt()
    }

    /// Effective number of entries, `(Σw)² / Σw²`.
    #[must_use]
    pub fn effective_entries(&self) -> f64 {
        if self.stats.sumw2 == 0.0 {
            return 0.0;
        }
        self.stats.sumw * self.stats.sumw / self.stats.sumw2
    }

    /// Error of [`Histogram1D::mean`].
    #[must_use]
    pub fn mean_error(&self) -> f64 {
        let neff = self.effective_entries();
        if neff == 0.0 {
            return 0.0;
        }
        self.std_dev() / neff.sqrt()
    }

    /// Error of [`Histogram1D::std_dev`], valid for a normal parent distribution.
    #[must_use]
    pub fn std_dev_error(&self) -> f64 {
        let neff = self.effective_entries();
        if neff == 0.0 {
            return 0.0;
        }
        self.std_dev() / (2.0 * neff).sqrt()
    }

    fn central_moment(&self, order: i32) -> f64 {
        let mean = self.mean();
        let mut sum = 0.0;
        let mut moment = 0.0;
        for bin in 1..=self.x_axis.nbins {
            let w = self.contents[bin];
            let d = self.x_axis.bin_center(bin) - mean;
            sum += w;
            moment += w * d.powi(order);
        }
        if sum == 0.0 {
            0.0
        } else {
            moment / sum
        }
    }

    /// Skewness computed from the bin centres.
    #[must_use]
    pub fn skewness(&self) -> f64 {
        let sigma = self.std_dev();
        if sigma == 0.0 {
            return 0.0;
        }
        self.central_moment(3) / sigma.powi(3)
    }

    /// Excess kurtosis computed from the bin centres; zero for a normal distribution.
    #[must_use]
    pub fn kurtosis(&self) -> f64 {
        let sigma = self.std_dev();
        if sigma == 0.0 {
            return 0.0;
        }
        self.central_moment(4) / sigma.powi(4) - 3.0
    }

    /// A copy with a new name.
    #[must_use]
    pub fn clone_named(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy
    }

    /// Adds `c` times `other` bin by bin, flows included.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the binnings differ.
    pub fn add(&mut self, other: &Histogram1D, c: f64) -> Result<()> {
        self.check_compatible(other)?;
        for bin in 0..self.contents.len() {
            self.contents[bin] += c * other.contents[bin];
            self.sumw2[bin] += c * c * other.sumw2[bin];
        }
        self.entries += other.entries;
        self.stats.sumw += c * other.stats.sumw;
        self.stats.sumw2 += c * c * other.stats.sumw2;
        self.stats.sumwx += c * other.stats.sumwx;
        self.stats.sumwx2 += c * other.stats.sumwx2;
        Ok(())
    }

    /// Divides bin by bin by `other`. Bins where `other` is empty become zero.
    ///
    /// Errors are propagated assuming uncorrelated numerator and denominator. The moments are
    /// recomputed from the resulting bin contents.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the binnings differ.
    pub fn divide(&mut self, other: &Histogram1D) -> Result<()> {
        self.check_compatible(other)?;
        for bin in 0..self.contents.len() {
            let a = self.contents[bin];
            let b = other.contents[bin];
            if b == 0.0 {
                self.contents[bin] = 0.0;
                self.sumw2[bin] = 0.0;
                continue;
            }
            let b2 = b * b;
            self.contents[bin] = a / b;
            self.sumw2[bin] = (self.sumw2[bin] * b2 + other.sumw2[bin] * a * a) / (b2 * b2);
        }
        self.reset_stats();
        Ok(())
    }

    /// Recomputes the moment sums from the in-range bin contents.
    fn reset_stats(&mut self) {
        let mut stats = Stats::default();
        for bin in 1..=self.x_axis.nbins {
            let w = self.contents[bin];
            let x = self.x_axis.bin_center(bin);
            stats.sumw += w;
            stats.sumw2 += self.sumw2[bin];
            stats.sumwx += w * x;
            stats.sumwx2 += w * x * x;
        }
        self.stats = stats;
    }

    fn check_compatible(&self, other: &Histogram1D) -> Result<()> {
        if self.x_axis.same_binning(&other.x_axis) {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "histograms '{}' and '{}' have different binning",
                self.name, other.name
            )))
        }
    }

    /// Fits `function` to the non-empty bins, using the bin errors as uncertainties.
    ///
    /// The fitted parameters are written back into `function`, and the function and result are
    /// kept for the fit box.
    ///
    /// # Errors
    /// Returns [`Error::EmptyData`] when no bin inside the function range has entries, or
    /// [`Error::DimensionMismatch`] if the function needs more parameters than it has.
    pub fn fit(&mut self, function: &mut Function1D) -> Result<FitResult> {
        let (lo, hi) = function.range();
        let points: Vec<(f64, f64, f64)> = (1..=self.x_axis.nbins)
            .filter_map(|bin| {
                let x = self.x_axis.bin_center(bin);
                let err = self.bin_error(bin);
                (x >= lo && x <= hi && self.contents[bin] != 0.0 && err > 0.0)
                    .then(|| (x, self.contents[bin], err))
            })
            .collect();
        if points.is_empty() {
            return Err(Error::EmptyData(format!("histogram '{}' has no filled bins", self.name)));
        }
        let problem = BinnedChi2 {
            points: &points,
            function: &*function,
        };
        let result = fit::minimize(&problem, function.parameters(), &FitConfig::default())?
            .with_names(function.parameter_names());
        function.apply_fit(&result)?;
        tracing::info!(
            histogram = %self.name,
            chi2 = result.chi2,
            ndf = result.ndf,
            "histogram fit complete"
        );
        self.fit = Some(function.clone());
        Ok(result)
    }

    /// The function fitted by the last [`Histogram1D::fit`], carrying its [`FitResult`].
    #[must_use]
    pub fn fitted_function(&self) -> Option<&Function1D> {
        self.fit.as_ref()
    }
}

struct BinnedChi2<'a> {
    points: &'a [(f64, f64, f64)],
    function: &'a Function1D,
}

impl LeastSquares for BinnedChi2<'_> {
    fn n_residuals(&self) -> usize {
        self.points.len()
    }

    fn n_params(&self) -> usize {
        self.function.parameters().len()
    }

    fn residual(&self, i: usize, params: &[f64]) -> f64 {
        let (x, y, err) = self.points[i];
        (y - self.function.eval_with(x, params)) / err
    }
}

impl Fill<f64> for Histogram1D {
    fn fill_value(&mut self, value: f64) {
        self.fill(value);
    }
}

impl fmt::Display for Histogram1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Histogram1D {}: {} bins in [{}, {}), entries = {}",
            self.name, self.x_axis.nbins, self.x_axis.min, self.x_axis.max, self.entries
        )?;
        for bin in 0..self.contents.len() {
            writeln!(
                f,
                " fSumw[{bin}]={}, x={}, error={}",
                self.contents[bin],
                self.x_axis.bin_center(bin),
                self.bin_error(bin)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn count_rate() -> Histogram1D {
        Histogram1D::new("h", "Count Rate;N_{Counts};# occurrences", 16, -0.5, 15.5).unwrap()
    }

    #[test]
    fn title_carries_axis_titles() {
        let h = count_rate();
        assert_eq!(h.title, "Count Rate");
        assert_eq!(h.x_axis.title, "N_{Counts}");
        assert_eq!(h.y_title, "# occurrences");
    }

    #[test]
    fn find_bin_edges() {
        let axis = Axis::new(10, 0.0, 10.0).unwrap();
        assert_eq!(axis.find_bin(-0.1), 0);
        assert_eq!(axis.find_bin(0.0), 1);
        assert_eq!(axis.find_bin(9.999), 10);
        assert_eq!(axis.find_bin(10.0), 11);
        assert_eq!(axis.find_bin(f64::NAN), 11);
        assert_relative_eq!(axis.bin_center(1), 0.5);
        assert_relative_eq!(axis.bin_low_edge(3), 2.0);
    }

    #[test]
    fn invalid_binning() {
        assert!(Histogram1D::new("h", "", 0, 0.0, 1.0).is_err());
        assert!(Histogram1D::new("h", "", 5, 1.0, 1.0).is_err());
        assert!(Histogram1D::new("h", "", 5, 2.0, 1.0).is_err());
    }

    #[test]
    fn moments_of_known_fills() {
        let mut h = count_rate();
        for v in [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0] {
            h.fill(v);
        }
        h.fill(40.0);
        assert_relative_eq!(h.entries(), 8.0);
        assert_relative_eq!(h.integral(), 7.0);
        assert_relative_eq!(h.bin_content(17), 1.0);
        let mean = 18.0 / 7.0;
        assert_relative_eq!(h.mean(), mean, epsilon = 1e-12);
        let var = (1.0 + 4.0 * 2.0 + 9.0 * 3.0 + 16.0) / 7.0 - mean * mean;
        assert_relative_eq!(h.std_dev(), var.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(h.mean_error(), var.sqrt() / 7f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(h.std_dev_error(), var.sqrt() / 14f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn symmetric_fills_have_no_skew() {
        let mut h = count_rate();
        for v in [3.0, 4.0, 4.0, 5.0] {
            h.fill(v);
        }
        assert_relative_eq!(h.skewness(), 0.0, epsilon = 1e-12);
        // Two-point-like shape is flatter than a gaussian.
        assert!(h.kurtosis() < 0.0);
    }

    #[test]
    fn add_is_elementwise() {
        let mut a = Histogram1D::new("a", "", 5, 0.0, 5.0).unwrap();
        let mut b = Histogram1D::new("b", "", 5, 0.0, 5.0).unwrap();
        for v in [0.5, 1.5, 1.5, 7.0] {
            a.fill(v);
        }
        for v in [1.5, 4.5, -1.0] {
            b.fill(v);
        }
        let mut sum = a.clone_named("sum");
        sum.add(&b, 1.0).unwrap();
        for bin in 0..=6 {
            assert_relative_eq!(sum.bin_content(bin), a.bin_content(bin) + b.bin_content(bin));
        }
        assert_relative_eq!(sum.bin_error(2), 3f64.sqrt());
        assert_relative_eq!(sum.entries(), 7.0);
    }

    #[test]
    fn divide_is_elementwise_with_zero_guard() {
        let mut a = Histogram1D::new("a", "", 3, 0.0, 3.0).unwrap();
        let mut b = Histogram1D::new("b", "", 3, 0.0, 3.0).unwrap();
        a.fill_weighted(0.5, 2.0);
        a.fill_weighted(1.5, 3.0);
        b.fill_weighted(0.5, 4.0);
        let mut ratio = a.clone_named("ratio");
        ratio.divide(&b).unwrap();
        assert_relative_eq!(ratio.bin_content(1), 0.5);
        assert_relative_eq!(ratio.bin_content(2), 0.0);
        // (4 * 16 + 16 * 4) / 256
        assert_relative_eq!(ratio.bin_error(1), 0.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(ratio.mean(), 0.5);
    }

    #[test]
    fn incompatible_binning_is_rejected() {
        let mut a = Histogram1D::new("a", "", 3, 0.0, 3.0).unwrap();
        let b = Histogram1D::new("b", "", 4, 0.0, 3.0).unwrap();
        assert!(a.add(&b, 1.0).is_err());
        assert!(a.divide(&b).is_err());
    }

    #[test]
    fn fit_constant_to_flat_histogram() {
        let mut h = Histogram1D::new("flat", "", 10, 0.0, 10.0).unwrap();
        for bin in 0..10 {
            for _ in 0..(20 + bin % 2) {
                h.fill(f64::from(bin) + 0.5);
            }
        }
        let mut f = Function1D::new("c", "[0]", 0.0, 10.0).unwrap();
        f.set_parameter(0, 1.0).unwrap();
        f.set_parameter_names(&["level"]);
        let result = h.fit(&mut f).unwrap();
        assert!(result.converged);
        assert_eq!(result.names, ["level"]);
        assert_relative_eq!(f.parameter(0), 20.5, epsilon = 0.1);
        assert_eq!(result.ndf, 9);
        assert!(h.fitted_function().and_then(Function1D::fit_result).is_some());
    }

    #[test]
    fn fit_empty_histogram_is_an_error() {
        let mut h = Histogram1D::new("empty", "", 10, 0.0, 10.0).unwrap();
        let mut f = Function1D::new("c", "[0]", 0.0, 10.0).unwrap();
        assert!(matches!(h.fit(&mut f), Err(Error::EmptyData(_))));
    }
}
