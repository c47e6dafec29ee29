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

//! A weighted 2D histogram shown as contours, colour map, lego and surface, then projected and
//! profiled.

use rand::distributions::Distribution as _;
use rand_distr::{Exp, Normal};

use crate::error::{Error, Result};
use crate::hist2d::Histogram2D;
use crate::lessons::{LessonContext, Report};
use crate::render::{Canvas, Palette};
use crate::simulation::{Sample, Simulation};

/// Number of fills.
pub const FILLS: usize = 500_000;
/// Weight of every fill.
pub const WEIGHT: f64 = 0.1;

/// A Gaussian x and an exponentially falling y, mirrored below 10.
pub struct GaussExp {
    x: Normal<f64>,
    y: Exp<f64>,
    value: (f64, f64, f64),
}

impl GaussExp {
    /// x from `Gaus(0, sigma)`, y as `10 - Exp(tau)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] unless `sigma` and `tau` are positive.
    pub fn new(sigma: f64, tau: f64) -> Result<Self> {
        let x = Normal::new(0.0, sigma)
            .map_err(|e| Error::InvalidParameter(format!("x sigma {sigma}: {e}")))?;
        let y = Exp::new(1.0 / tau)
            .map_err(|e| Error::InvalidParameter(format!("y tau {tau}: {e}")))?;
        Ok(Self {
            x,
            y,
            value: (0.0, 0.0, WEIGHT),
        })
    }
}

impl Sample for GaussExp {
    type Value = (f64, f64, f64);

    fn generate(&mut self, rng: &mut impl rand::Rng) {
        let x = self.x.sample(rng);
        let y = 10.0 - self.y.sample(rng);
        self.value = (x, y, WEIGHT);
    }

    fn evaluate(&self) -> (f64, f64, f64) {
        self.value
    }
}

/// The filled 30×30 histogram over `[-5, 5] × [0, 10]`.
///
/// # Errors
/// Never fails for the built-in constants.
pub fn fill(seed: u64, fills: usize) -> Result<Histogram2D> {
    let mut hist = Histogram2D::new(
        "bidi_h",
        "2D Histo;Gaussian Vals;Exp. Vals",
        (30, -5.0, 5.0),
        (30, 0.0, 10.0),
    )?;
    Simulation::with_seed(GaussExp::new(2.0, 4.0)?, seed)
        .iterations(fills)
        .fill(&mut hist);
    Ok(hist)
}

/// Draws four views of the histogram, then its projections and profiles.
///
/// # Errors
/// Fails if a canvas cannot be saved.
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut style = ctx.style.clone();
    style.palette = Palette::Bird;
    style.opt_stat = 0;
    style.opt_title = false;

    let mut report = Report::default();
    let hist = fill(ctx.seed, FILLS)?;

    let mut views = Canvas::new("Canvas", "Canvas", 800, 800).with_style(&style);
    views.divide(2, 2)?;
    for (pad, option) in ["Cont1", "Colz", "Lego2", "Surf3"].into_iter().enumerate() {
        views.cd(pad + 1)?;
        views.draw(&hist, option);
    }
    ctx.save(&views, "bidim.svg", &mut report)?;

    let projection_x = hist.projection_x();
    let projection_y = hist.projection_y();
    let profile_x = hist.profile_x();
    let profile_y = hist.profile_y();

    let mut slices = Canvas::new("Canvas2", "Canvas2", 800, 800).with_style(&style);
    slices.divide(2, 2)?;
    slices.cd(1)?;
    slices.draw(&projection_x, "");
    slices.cd(2)?;
    slices.draw(&projection_y, "");
    slices.cd(3)?;
    slices.draw(profile_x, "");
    slices.cd(4)?;
    slices.draw(profile_y, "");
    ctx.save(&slices, "bidim_projections.svg", &mut report)?;

    report.set("entries", hist.entries());
    report.set("total", hist.total());
    report.set("integral", hist.integral());
    report.set("projection_x_total", projection_x.contents().iter().sum());
    report.set("projection_y_total", projection_y.contents().iter().sum());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Coord;
    use approx::assert_relative_eq;

    #[test]
    fn weights_add_up() {
        let hist = fill(5, 20_000).unwrap();
        assert_relative_eq!(hist.entries(), 20_000.0);
        assert_relative_eq!(hist.total(), 2_000.0, max_relative = 1e-9);
        let px: f64 = hist.projection_x().contents().iter().sum();
        assert_relative_eq!(px, hist.total(), max_relative = 1e-9);
    }

    #[test]
    fn shapes_follow_the_generators() {
        let hist = fill(6, 50_000).unwrap();
        assert!(hist.mean(Coord::X).abs() < 0.1);
        // Nothing can land above 10, and the mean of 10 - Exp(4) clipped to [0, 10] is near 6.9.
        let py = hist.projection_y();
        assert_relative_eq!(py.bin_content(31), 0.0);
        assert!(hist.mean(Coord::Y) > 6.0 && hist.mean(Coord::Y) < 7.5);
    }
}
