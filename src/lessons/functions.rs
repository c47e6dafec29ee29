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

//! One parametric function drawn with four parameter sets, one per pad.

use crate::error::Result;
use crate::function::Function1D;
use crate::lessons::{LessonContext, Report};
use crate::render::{Canvas, Palette};

/// Amplitude and frequency of each pad.
pub const PARAMETER_SETS: [(f64, f64); 4] = [
    (1.0, 1.0),
    (1.0 / 2.0, 2.0),
    (1.0 / 3.0, 3.0),
    (1.0 / 4.0, 4.0),
];

/// The damped sine `[0]*sin([1]*x)/x` on `[0, 10]`.
///
/// # Errors
/// Never fails for the built-in expression; the error is that of [`Function1D::new`].
pub fn damped_sine() -> Result<Function1D> {
    let mut f = Function1D::new("f2", "[0]*sin([1]*x)/x", 0.0, 10.0)?;
    f.set_parameter_names(&["amplitude", "frequency"]);
    Ok(f)
}

/// Draws [`damped_sine`] with every entry of [`PARAMETER_SETS`] on a 2×2 canvas.
///
/// # Errors
/// Fails if the canvas cannot be saved.
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut style = ctx.style.clone();
    style.opt_stat = 111_111;
    style.opt_fit = 1111;
    style.opt_title = false;
    style.palette = Palette::Bird;

    let mut report = Report::default();
    let mut canvas = Canvas::new("c1", "Damped sine", 400, 300).with_style(&style);
    canvas.divide(2, 2)?;

    let mut f = damped_sine()?;
    for (pad, &(amplitude, frequency)) in PARAMETER_SETS.iter().enumerate() {
        f.set_parameters(&[amplitude, frequency])?;
        canvas.cd(pad + 1)?;
        canvas.draw(&f, "");

        let peak = f
            .points()
            .iter()
            .map(|&(_, y)| y)
            .fold(f64::NEG_INFINITY, f64::max);
        tracing::debug!(pad = pad + 1, amplitude, frequency, peak, "function drawn");
        report.set(&format!("pad{}_peak", pad + 1), peak);
    }
    report.set("pads", 4.0);

    ctx.save(&canvas, "functions.svg", &mut report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_pad_has_the_curve() {
        let report = run(&LessonContext::default()).unwrap();
        assert!(report.files.is_empty());
        for pad in 1..=4 {
            let peak = report.value(&format!("pad{pad}_peak")).unwrap();
            assert!(peak.is_finite());
        }
    }

    #[test]
    fn limit_at_zero_is_amplitude_times_frequency() {
        let mut f = damped_sine().unwrap();
        for &(a, k) in &PARAMETER_SETS {
            f.set_parameters(&[a, k]).unwrap();
            assert_relative_eq!(f.eval(1e-6), 1.0, epsilon = 1e-6);
            assert_relative_eq!(a * k, 1.0, epsilon = 1e-12);
        }
    }
}
