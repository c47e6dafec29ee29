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

//! primer CLI

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use primer::lessons::{Lesson, LessonContext};
use primer::random::Random;
use primer::render::Style;

#[derive(Parser)]
#[command(name = "primer")]
#[command(about = "Histogramming, fitting and plotting lessons")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// JSON file with display options (opt_stat, opt_fit, opt_title, palette, grid)
    #[arg(long, global = true)]
    style: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// A damped sine with four parameter sets on a 2x2 canvas
    Functions(RunArgs),
    /// Straight-line fit to ten measurements with legend, arrow and label
    GraphFit(RunArgs),
    /// Measured points from a file over the expected band
    Overlay(RunArgs),
    /// Fit of a 2D function to 500 sampled points, with projections
    Fit2d(RunArgs),
    /// Histogram of 400 Poisson counts and its moments
    CountRate(RunArgs),
    /// Sum and ratio of a signal and an exponential background
    SumRatio(RunArgs),
    /// A weighted 2D histogram in four views, with projections and profiles
    Bidim(RunArgs),
    /// Every lesson in order
    All(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory the canvases are saved to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Directory the input text files are read from
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Seed of the random streams
    #[arg(long, default_value_t = Random::DEFAULT_SEED)]
    seed: u64,

    /// Build every canvas but write no files
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let style = match &cli.style {
        Some(path) => Style::from_json_file(path)
            .with_context(|| format!("reading style {}", path.display()))?,
        None => Style::default(),
    };

    let (lessons, args): (Vec<Lesson>, RunArgs) = match cli.command {
        Commands::Functions(args) => (vec![Lesson::Functions], args),
        Commands::GraphFit(args) => (vec![Lesson::GraphFit], args),
        Commands::Overlay(args) => (vec![Lesson::Overlay], args),
        Commands::Fit2d(args) => (vec![Lesson::Fit2d], args),
        Commands::CountRate(args) => (vec![Lesson::CountRate], args),
        Commands::SumRatio(args) => (vec![Lesson::SumRatio], args),
        Commands::Bidim(args) => (vec![Lesson::Bidim], args),
        Commands::All(args) => (Lesson::ALL.to_vec(), args),
    };

    let out_dir = if args.dry_run {
        None
    } else {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("creating {}", args.out_dir.display()))?;
        Some(args.out_dir)
    };
    let ctx = LessonContext {
        out_dir,
        data_dir: args.data_dir,
        seed: args.seed,
        style,
    };

    for lesson in lessons {
        let report = lesson.run(&ctx).with_context(|| format!("lesson {lesson} failed"))?;
        print!("{}", report.text);
        for file in &report.files {
            println!("{lesson}: wrote {}", file.display());
        }
    }
    Ok(())
}
