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

//! The lesson programs: each builds its objects, fits or aggregates them and saves its canvases.
//!
//! Every lesson is a function `run(&LessonContext) -> Result<Report>`. The [`Report`] lists the
//! files written and the numbers a reader would check by eye on the plots, so the lessons can be
//! tested without looking at images.

pub mod bidim;
pub mod count_rate;
pub mod fit2d;
pub mod functions;
pub mod graph_fit;
pub mod overlay;
pub mod sum_ratio;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::random::Random;
use crate::render::{Canvas, Style};

/// Inputs shared by every lesson.
#[derive(Debug, Clone)]
pub struct LessonContext {
    /// Where canvases are saved. With `None` the canvases are built but not written.
    pub out_dir: Option<PathBuf>,
    /// Where the input text files are read from.
    pub data_dir: PathBuf,
    /// Seed of every random stream of the lesson.
    pub seed: u64,
    /// Display options the lesson starts from.
    pub style: Style,
}

impl Default for LessonContext {
    fn default() -> Self {
        Self {
            out_dir: None,
            data_dir: PathBuf::from("data"),
            seed: Random::DEFAULT_SEED,
            style: Style::default(),
        }
    }
}

impl LessonContext {
    /// Saves `canvas` as `file` in the output directory, if there is one, and records it.
    pub(crate) fn save(&self, canvas: &Canvas, file: &str, report: &mut Report) -> Result<()> {
        if let Some(dir) = &self.out_dir {
            let path = dir.join(file);
            canvas.save_as(&path)?;
            report.files.push(path);
        }
        Ok(())
    }
}

/// What a lesson produced.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Files written, in order.
    pub files: Vec<PathBuf>,
    /// Named results, e.g. fit parameters or fill counts.
    pub values: BTreeMap<String, f64>,
    /// Text the lesson prints for the reader.
    pub text: String,
}

impl Report {
    /// Records a named result.
    pub fn set(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), value);
    }

    /// A named result.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// The lessons, in the order they are taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lesson {
    /// A parametric function with four parameter sets on a 2×2 canvas.
    Functions,
    /// A straight-line fit to ten measurements.
    GraphFit,
    /// Measurements read from a file over an expectation band.
    Overlay,
    /// A fit of a 2D function to sampled points with errors.
    Fit2d,
    /// Counts of a Geiger counter.
    CountRate,
    /// Sum and ratio of a signal and a background histogram.
    SumRatio,
    /// A weighted 2D histogram in many views.
    Bidim,
}

impl Lesson {
    /// Every lesson.
    pub const ALL: [Lesson; 7] = [
        Lesson::Functions,
        Lesson::GraphFit,
        Lesson::Overlay,
        Lesson::Fit2d,
        Lesson::CountRate,
        Lesson::SumRatio,
        Lesson::Bidim,
    ];

    /// Command-line name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Lesson::Functions => "functions",
            Lesson::GraphFit => "graph-fit",
            Lesson::Overlay => "overlay",
            Lesson::Fit2d => "fit2d",
            Lesson::CountRate => "count-rate",
            Lesson::SumRatio => "sum-ratio",
            Lesson::Bidim => "bidim",
        }
    }

    /// Runs the lesson.
    ///
    /// # Errors
    /// Propagates the first error of the lesson: unreadable inputs, failed fits or failed saves.
    pub fn run(self, ctx: &LessonContext) -> Result<Report> {
        let _span = tracing::info_span!("lesson", name = self.name()).entered();
        let report = match self {
            Lesson::Functions => functions::run(ctx),
            Lesson::GraphFit => graph_fit::run(ctx),
            Lesson::Overlay => overlay::run(ctx),
            Lesson::Fit2d => fit2d::run(ctx),
            Lesson::CountRate => count_rate::run(ctx),
            Lesson::SumRatio => sum_ratio::run(ctx),
            Lesson::Bidim => bidim::run(ctx),
        }?;
        tracing::info!(files = report.files.len(), "lesson finished");
        Ok(report)
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
