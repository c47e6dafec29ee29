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

//! Readings of a Geiger counter: Poisson counts histogrammed, with their moments printed.

use rand::distributions::Distribution as _;
use rand_distr::Poisson;

use crate::error::{Error, Result};
use crate::hist::Histogram1D;
use crate::lessons::{LessonContext, Report};
use crate::render::Canvas;
use crate::simulation::{Distribution, Sample, Simulation};

/// Mean number of counts per reading.
pub const MEAN_COUNTS: f64 = 3.6;
/// Number of readings.
pub const READINGS: usize = 400;

/// One reading of a counter with Poisson-distributed counts.
pub struct Reading {
    distr: Poisson<f64>,
    counts: f64,
}

impl Reading {
    /// A counter with `mean` counts per reading.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] unless `mean` is positive.
    pub fn new(mean: f64) -> Result<Self> {
        let distr = Poisson::new(mean)
            .map_err(|e| Error::InvalidParameter(format!("count rate {mean}: {e}")))?;
        Ok(Self { distr, counts: 0.0 })
    }
}

impl Sample for Reading {
    type Value = f64;

    fn generate(&mut self, rng: &mut impl rand::Rng) {
        self.counts = self.distr.sample(rng);
    }

    fn evaluate(&self) -> f64 {
        self.counts
    }
}

/// Histogram of [`READINGS`] readings, one bin per count from 0 to 15.
///
/// # Errors
/// Never fails for the built-in constants.
pub fn simulate(seed: u64) -> Result<Histogram1D> {
    let mut hist = Histogram1D::new(
        "count_rate",
        "Count Rate;N_{Counts};# occurrences",
        16,
        -0.5,
        15.5,
    )?;
    Simulation::with_seed(Reading::new(MEAN_COUNTS)?, seed)
        .iterations(READINGS)
        .fill(&mut hist);
    Ok(hist)
}

/// The unbinned readings of [`simulate`] with the same seed.
///
/// # Errors
/// Never fails for the built-in constants.
pub fn readings(seed: u64) -> Result<Distribution> {
    Ok(Simulation::with_seed(Reading::new(MEAN_COUNTS)?, seed)
        .iterations(READINGS)
        .simulate())
}

/// Draws the count histogram and prints its moments.
///
/// # Errors
/// Fails if the canvas cannot be saved.
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut report = Report::default();
    let hist = simulate(ctx.seed)?;
    let raw = readings(ctx.seed)?;

    let mut canvas = Canvas::new("c1", "Count rate", 700, 500).with_style(&ctx.style);
    canvas.draw(&hist, "");
    ctx.save(&canvas, "count_rate.svg", &mut report)?;

    report.text = format!(
        "Moments of Distribution:\n \
         - Mean     = {:.3} +- {:.3}\n \
         - Std Dev  = {:.3} +- {:.3}\n \
         - Skewness = {:.3}\n \
         - Kurtosis = {:.3}\n",
        hist.mean(),
        hist.mean_error(),
        hist.std_dev(),
        hist.std_dev_error(),
        hist.skewness(),
        hist.kurtosis(),
    );

    report.set("entries", hist.entries());
    report.set("total", hist.contents().iter().sum());
    report.set("mean", hist.mean());
    report.set("mean_error", hist.mean_error());
    report.set("std_dev", hist.std_dev());
    report.set("std_dev_error", hist.std_dev_error());
    report.set("skewness", hist.skewness());
    report.set("kurtosis", hist.kurtosis());
    report.set("raw_mean", raw.mean());
    report.set("median", raw.quantile_of(0.5).unwrap_or(f64::NAN));
    report.set("zero_fraction", raw.pvalue(0.0));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Random;
    use approx::assert_relative_eq;

    #[test]
    fn every_reading_is_counted() {
        let hist = simulate(Random::DEFAULT_SEED).unwrap();
        assert_relative_eq!(hist.entries(), 400.0);
        assert_relative_eq!(hist.contents().iter().sum::<f64>(), 400.0);
    }

    #[test]
    fn binned_mean_matches_readings() {
        let hist = simulate(7).unwrap();
        let raw = readings(7).unwrap();
        // Integer counts sit on bin centres, so binning loses nothing below the overflow bin.
        if hist.bin_content(17) == 0.0 {
            assert_relative_eq!(hist.mean(), raw.mean(), epsilon = 1e-9);
        }
        assert!((raw.mean() - MEAN_COUNTS).abs() < 0.5);
    }

    #[test]
    fn moments_are_printed() {
        let report = run(&LessonContext::default()).unwrap();
        assert!(report.text.starts_with("Moments of Distribution:"));
        assert!(report.text.contains("Kurtosis"));
        let sd = report.value("std_dev").unwrap();
        assert!((sd - MEAN_COUNTS.sqrt()).abs() < 0.5);
    }
}
