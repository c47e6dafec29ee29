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

//! A straight line fitted to ten measurements, annotated with a legend, an arrow and a label.

use crate::error::Result;
use crate::function::Function1D;
use crate::graph::GraphErrors;
use crate::lessons::{LessonContext, Report};
use crate::render::{Arrow, Canvas, Color, Latex, Legend, LineStyle, MarkerStyle};

/// Positions along the sample, in cm.
pub const LENGTHS: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// Measured values.
pub const VALUES: [f64; 10] = [6.0, 12.0, 14.0, 20.0, 22.0, 24.0, 35.0, 45.0, 44.0, 53.0];
/// Uncertainties of [`VALUES`].
pub const ERRORS: [f64; 10] = [5.0, 5.0, 4.7, 4.5, 4.2, 5.1, 2.9, 4.1, 4.8, 5.43];

/// The measurements as a graph with y errors.
///
/// # Errors
/// Never fails for the built-in arrays.
pub fn measurements() -> Result<GraphErrors> {
    let mut graph = GraphErrors::new(&LENGTHS, &VALUES, None, Some(&ERRORS[..]))?;
    graph.name = "measurements".to_string();
    graph.set_title("Measurement XYZ;length [cm];Arb.Units");
    graph.style.marker_style = MarkerStyle::OpenCircle;
    graph.style.marker_color = Color::Blue;
    graph.style.line_color = Color::Blue;
    Ok(graph)
}

/// Fits `[0]+x*[1]` to the measurements and draws the result.
///
/// # Errors
/// Fails if the fit has no points or the canvas cannot be saved.
#[allow(clippy::cast_precision_loss)]
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut report = Report::default();
    let mut graph = measurements()?;

    let mut law = Function1D::new("Linear law", "[0]+x*[1]", 0.5, 10.5)?;
    law.style.line_color = Color::Red;
    law.style.line_style = LineStyle::Dashed;
    let result = graph.fit(&mut law)?;

    let mut canvas = Canvas::new("c", "Graph with law", 800, 600).with_style(&ctx.style);
    canvas.draw(&graph, "APE");
    canvas.draw(&law, "Same");

    let mut legend = Legend::new(0.1, 0.7, 0.3, 0.9, "Lab. Lesson 1");
    legend.add_entry(&graph.style, "Exp. Points", "");
    legend.add_entry(&law.style, "Th. Law", "");
    canvas.draw(legend, "");

    let mut arrow = Arrow::new(8.0, 8.0, 6.2, 23.0, 0.02, "|>");
    arrow.style.line_width = 2;
    canvas.draw(arrow, "");
    canvas.draw(Latex::new(8.2, 7.5, "#splitline{Maximum}{Deviation}"), "");

    ctx.save(&canvas, "graph_with_law.svg", &mut report)?;

    report.set("points", graph.len() as f64);
    report.set("intercept", result.parameters[0]);
    report.set("slope", result.parameters[1]);
    report.set("intercept_error", result.errors[0]);
    report.set("slope_error", result.errors[1]);
    report.set("chi2", result.chi2);
    report.set("ndf", result.ndf as f64);
    report.text = result.to_string();
    Ok(report)
}
