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

//! Measured points read from a file, drawn over the expected values as a band.

use crate::error::Result;
use crate::graph::GraphErrors;
use crate::lessons::{LessonContext, Report};
use crate::render::{Canvas, Color, Legend, MarkerStyle};

/// File with the expected values, `x y ey` per row.
pub const EXPECTED_FILE: &str = "macro2_input_expected.txt";
/// File with the measured values, `x y ey` per row.
pub const MEASURED_FILE: &str = "macro2_input.txt";

/// Reads the expected and the measured graph from the data directory.
///
/// # Errors
/// Returns [`crate::Error::Io`] or [`crate::Error::Parse`] if a file is missing or malformed.
pub fn load(ctx: &LessonContext) -> Result<(GraphErrors, GraphErrors)> {
    let mut expected = GraphErrors::from_file(ctx.data_dir.join(EXPECTED_FILE))?;
    expected.set_title("Measurement XYZ and Expectation;length [cm];Arb.Units");
    expected.style.fill_color = Some(Color::Yellow);

    let mut measured = GraphErrors::from_file(ctx.data_dir.join(MEASURED_FILE))?;
    measured.style.marker_style = MarkerStyle::OpenCircle;
    Ok((expected, measured))
}

/// Draws the expectation band with its central line, then the measured points on top.
///
/// # Errors
/// Fails if an input file cannot be read or the canvas cannot be saved.
#[allow(clippy::cast_precision_loss)]
pub fn run(ctx: &LessonContext) -> Result<Report> {
    let mut report = Report::default();
    let (expected, measured) = load(ctx)?;

    let mut canvas =
        Canvas::new("c1", "Measurement and expectation", 700, 500).with_style(&ctx.style);
    canvas.set_grid();
    canvas.draw(&expected, "E3AL");
    canvas.draw(&measured, "PESame");

    let mut legend = Legend::new(0.1, 0.7, 0.3, 0.9, "Lab. Lesson 2");
    legend.add_entry(&expected.style, "Expected Points", "");
    legend.add_entry(&measured.style, "Measured Points", "");
    canvas.draw(legend, "");

    ctx.save(&canvas, "overlay.svg", &mut report)?;

    report.set("expected_points", expected.len() as f64);
    report.set("measured_points", measured.len() as f64);
    report.text = measured.to_string();
    Ok(report)
}
