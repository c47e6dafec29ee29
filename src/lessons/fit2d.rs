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

//! Points sampled from a 2D function, smeared, and fitted back with the function.

use crate::error::Result;
use crate::fit::FitResult;
use crate::function::Function2D;
use crate::graph::{Coord, Graph2DErrors};
use crate::lessons::{LessonContext, Report};
use crate::random::Random;
use crate::render::{Canvas, Color, Palette};

/// Number of sampled points.
pub const POINTS: usize = 500;
/// Half-width of the relative smearing of z.
pub const SMEARING: f64 = 0.3;

/// Product of two damped sines on a constant floor, over `[-6, 6]²`.
///
/// # Errors
/// Never fails for the built-in expression.
pub fn surface() -> Result<Function2D> {
    Function2D::new(
        "f2",
        "1000*(([0]*sin(x)/x)*([1]*sin(y)/y))+200",
        -6.0,
        6.0,
        -6.0,
        6.0,
    )
}

/// Samples [`POINTS`] points from [`surface`] with both parameters at 1, smears z by a uniform
/// relative amount in `±SMEARING` and attaches errors.
///
/// The z error is the absolute smearing, the x and y errors are uniform in `[0, 0.05)`.
///
/// # Errors
/// Fails if the function cannot be sampled.
pub fn generate(rng: &mut Random) -> Result<Graph2DErrors> {
    let mut f = surface()?;
    f.set_parameters(&[1.0, 1.0])?;

    let mut points = Graph2DErrors::with_len(POINTS);
    points.name = "dte".to_string();
    for i in 0..POINTS {
        let (x, y) = f.random2(rng)?;
        let rnd = rng.uniform_range(-SMEARING, SMEARING);
        let z = f.eval(x, y) * (1.0 + rnd);
        points.set_point(i, x, y, z);
        let ex = 0.05 * rng.uniform();
        let ey = 0.05 * rng.uniform();
        let ez = (z * rnd).abs();
        points.set_point_error(i, ex, ey, ez)?;
    }
    Ok(points)
}

/// Fits [`surface`], started from `(0.7, 1.5)`, to `points`.
///
/// # Errors
/// Fails if no point has errors.
pub fn fit(points: &Graph2DErrors) -> Result<(Function2D, FitResult)> {
    let mut f = surface()?;
    f.set_parameters(&[0.7, 1.5])?;
    f.title = "Fitted 2D function".to_string();
    let result = points.fit(&mut f)?;
    Ok((f, result))
}

/// Generates, fits and draws the surface with the points, then the projections of the points.
///
/// # Errors
/// Fails if the fit fails or a canvas cannot be saved.
#[allow(clippy::cast_precision_loss)]
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut style = ctx.style.clone();
    style.palette = Palette::Bird;

    let mut report = Report::default();
    let mut rng = Random::new(ctx.seed);
    let points = generate(&mut rng)?;
    let (mut f, result) = fit(&points)?;

    f.style.line_width = 1;
    f.style.line_color = Color::Blue.offset(-5);
    f.x_title = "X Title".to_string();
    f.y_title = "Y Title".to_string();
    f.z_title = "Z Title".to_string();

    let mut canvas = Canvas::new("c1", "Fitted 2D function", 700, 500).with_style(&style);
    canvas.draw(&f, "Surf1");
    canvas.draw(&points, "P0 Same");
    ctx.save(&canvas, "fit2d.svg", &mut report)?;

    let mut projections = Canvas::new("ProjCan", "The Projections", 1000, 400).with_style(&style);
    projections.divide(2, 1)?;
    projections.cd(1)?;
    projections.draw(points.project(Coord::X)?, "");
    projections.cd(2)?;
    projections.draw(points.project(Coord::Y)?, "");
    ctx.save(&projections, "fit2d_projections.svg", &mut report)?;

    report.set("points", points.len() as f64);
    report.set("p0", result.parameters[0]);
    report.set("p1", result.parameters[1]);
    report.set("chi2", result.chi2);
    report.set("ndf", result.ndf as f64);
    report.text = result.to_string();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_points_follow_the_surface() {
        let mut rng = Random::new(Random::DEFAULT_SEED);
        let points = generate(&mut rng).unwrap();
        assert_eq!(points.len(), POINTS);
        let f = {
            let mut f = surface().unwrap();
            f.set_parameters(&[1.0, 1.0]).unwrap();
            f
        };
        for i in 0..points.len() {
            let (x, y, z) = points.point(i).unwrap();
            let (ex, ey, ez) = points.point_error(i).unwrap();
            assert!((-6.0..=6.0).contains(&x) && (-6.0..=6.0).contains(&y));
            assert!((0.0..0.05).contains(&ex) && (0.0..0.05).contains(&ey));
            let truth = f.eval(x, y);
            assert!((z - truth).abs() <= SMEARING * truth.abs() + 1e-9);
            assert!(ez <= SMEARING * z.abs() / (1.0 - SMEARING) + 1e-9);
        }
    }

    #[test]
    fn fit_recovers_the_amplitude_product() {
        let mut rng = Random::new(Random::DEFAULT_SEED);
        let points = generate(&mut rng).unwrap();
        let (f, result) = fit(&points).unwrap();
        assert_eq!(result.ndf, POINTS - 2);
        let product = f.parameter(0) * f.parameter(1);
        assert!((product - 1.0).abs() < 0.15, "p0*p1 = {product}");
    }
}
