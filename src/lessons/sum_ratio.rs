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

//! A Gaussian signal on an exponential background: their sum and their ratio.

use rand::distributions::Distribution as _;
use rand_distr::{Exp, Normal};

use crate::error::{Error, Result};
use crate::hist::Histogram1D;
use crate::lessons::{LessonContext, Report};
use crate::render::{Canvas, Color};
use crate::simulation::{Fill, Sample, Simulation};

/// Number of background draws.
pub const ITERATIONS: usize = 10_000;
/// A signal value is drawn on every iteration divisible by this.
pub const SIGNAL_EVERY: usize = 10;

/// One background value and, on every [`SIGNAL_EVERY`]-th iteration, one signal value.
pub struct SignalOverBackground {
    background: Exp<f64>,
    signal: Normal<f64>,
    iteration: usize,
    value: (f64, Option<f64>),
}

impl SignalOverBackground {
    /// Background with mean `tau`, signal centred on `mean` with width `sigma`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] unless `tau` and `sigma` are positive.
    pub fn new(tau: f64, mean: f64, sigma: f64) -> Result<Self> {
        let background = Exp::new(1.0 / tau)
            .map_err(|e| Error::InvalidParameter(format!("background tau {tau}: {e}")))?;
        let signal = Normal::new(mean, sigma)
            .map_err(|e| Error::InvalidParameter(format!("signal ({mean}, {sigma}): {e}")))?;
        Ok(Self {
            background,
            signal,
            iteration: 0,
            value: (0.0, None),
        })
    }
}

impl Sample for SignalOverBackground {
    type Value = (f64, Option<f64>);

    fn generate(&mut self, rng: &mut impl rand::Rng) {
        let background = self.background.sample(rng);
        let signal = (self.iteration % SIGNAL_EVERY == 0).then(|| self.signal.sample(rng));
        self.iteration += 1;
        self.value = (background, signal);
    }

    fn evaluate(&self) -> (f64, Option<f64>) {
        self.value
    }
}

/// The four histograms of the lesson.
#[derive(Debug, Clone)]
pub struct SumRatio {
    /// Signal values.
    pub signal: Histogram1D,
    /// Background values.
    pub background: Histogram1D,
    /// Background plus signal.
    pub sum: Histogram1D,
    /// Signal over background.
    pub ratio: Histogram1D,
}

struct SignalAndBackground {
    signal: Histogram1D,
    background: Histogram1D,
}

impl Fill<(f64, Option<f64>)> for SignalAndBackground {
    fn fill_value(&mut self, (background, signal): (f64, Option<f64>)) {
        self.background.fill(background);
        if let Some(signal) = signal {
            self.signal.fill(signal);
        }
    }
}

fn with_line(mut hist: Histogram1D, color: Color) -> Histogram1D {
    hist.style.line_width = 3;
    hist.style.line_color = color;
    hist
}

/// Fills the signal and background histograms and derives their sum and ratio.
///
/// # Errors
/// Never fails for the built-in constants.
pub fn build(seed: u64) -> Result<SumRatio> {
    let mut sink = SignalAndBackground {
        signal: Histogram1D::new("sig_h", "Signal Histo", 50, 0.0, 10.0)?,
        background: Histogram1D::new("exp_h", "Exponential Histo", 50, 0.0, 10.0)?,
    };
    Simulation::with_seed(SignalOverBackground::new(4.0, 5.0, 0.5)?, seed)
        .iterations(ITERATIONS)
        .fill(&mut sink);

    let signal = with_line(sink.signal, Color::from_index(1));
    let background = with_line(sink.background, Color::from_index(2));

    let mut sum = background.clone_named("sum");
    sum.add(&signal, 1.0)?;
    sum.set_title("Exponential + Signal;X;N");
    sum.style.line_color = Color::Blue;

    let mut ratio = signal.clone_named("ratio");
    ratio.divide(&background)?;
    ratio.set_title("S/B Ratio;X;Ratio");
    ratio.style.line_color = Color::Orange;

    Ok(SumRatio {
        signal,
        background,
        sum,
        ratio,
    })
}

/// Draws the sum with its two components, and the ratio below it.
///
/// # Errors
/// Fails if the canvas cannot be saved.
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut style = ctx.style.clone();
    style.opt_stat = 0;

    let mut report = Report::default();
    let histos = build(ctx.seed)?;

    let mut canvas = Canvas::new("c", "Sum and ratio", 600, 800).with_style(&style);
    canvas.divide(1, 2)?;
    canvas.cd(1)?;
    canvas.draw(&histos.sum, "hist");
    canvas.draw(&histos.background, "SameHist");
    canvas.draw(&histos.signal, "SameHist");
    canvas.cd(2)?;
    canvas.draw(&histos.ratio, "E");
    ctx.save(&canvas, "sum_ratio.svg", &mut report)?;

    report.set("signal_entries", histos.signal.entries());
    report.set("background_entries", histos.background.entries());
    report.set("sum_integral", histos.sum.integral());
    report.set("ratio_integral", histos.ratio.integral());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_tenth_iteration_adds_signal() {
        let h = build(1).unwrap();
        assert_relative_eq!(h.background.entries(), 10_000.0);
        assert_relative_eq!(h.signal.entries(), 1_000.0);
        assert_relative_eq!(h.sum.entries(), 11_000.0);
    }

    #[test]
    fn sum_and_ratio_are_bin_by_bin() {
        let h = build(2).unwrap();
        for bin in 0..=51 {
            let s = h.signal.bin_content(bin);
            let b = h.background.bin_content(bin);
            assert_relative_eq!(h.sum.bin_content(bin), s + b);
            let expected = if b == 0.0 { 0.0 } else { s / b };
            assert_relative_eq!(h.ratio.bin_content(bin), expected);
        }
    }

    #[test]
    fn signal_peaks_at_five() {
        let h = build(3).unwrap();
        assert!((h.signal.mean() - 5.0).abs() < 0.1);
        assert_eq!(h.ratio.style.line_color, Color::Orange);
        assert_eq!(h.background.style.line_color, Color::Red);
    }
}
