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

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use primer::graph::GraphErrors;
use primer::lessons::{self, Lesson, LessonContext};
use primer::Error;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn context(seed: u64) -> LessonContext {
    LessonContext {
        data_dir: data_dir(),
        seed,
        ..LessonContext::default()
    }
}

/// Data rows of a whitespace-separated text file, comments skipped.
fn rows(name: &str) -> Vec<Vec<f64>> {
    fs::read_to_string(data_dir().join(name))
        .unwrap()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
        .collect()
}

#[test]
fn overlay_points_match_the_files() {
    let (expected, measured) = lessons::overlay::load(&context(1)).unwrap();
    for (graph, file) in [
        (&expected, lessons::overlay::EXPECTED_FILE),
        (&measured, lessons::overlay::MEASURED_FILE),
    ] {
        let rows = rows(file);
        assert_eq!(graph.len(), rows.len());
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(graph.x()[i], row[0]);
            assert_eq!(graph.y()[i], row[1]);
            assert_eq!(graph.ey()[i], row[2]);
            assert_eq!(graph.ex()[i], 0.0);
        }
    }
    let report = Lesson::Overlay.run(&context(1)).unwrap();
    assert_eq!(report.value("measured_points"), Some(10.0));
    assert_eq!(report.text.lines().count(), 10);
    assert!(report.text.starts_with("x[0]=1, y[0]=6, ex[0]=0, ey[0]=5"));
}

#[test]
fn missing_input_is_reported() {
    let ctx = LessonContext {
        data_dir: PathBuf::from("/nonexistent/primer-data"),
        ..LessonContext::default()
    };
    assert!(matches!(Lesson::Overlay.run(&ctx), Err(Error::Io(_))));
}

#[test]
fn malformed_row_names_its_line() {
    let dir = std::env::temp_dir().join(format!("primer-malformed-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.txt");
    fs::write(&path, "# x y\n1 2\n3 four\n").unwrap();
    match GraphErrors::from_file(&path) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {other:?}"),
    }
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn count_rate_fills_every_reading() {
    let report = Lesson::CountRate.run(&context(11)).unwrap();
    assert_eq!(report.value("entries"), Some(400.0));
    assert_relative_eq!(report.value("total").unwrap(), 400.0);
    assert_relative_eq!(
        report.value("mean").unwrap(),
        report.value("raw_mean").unwrap(),
        epsilon = 1e-9
    );
}

#[test]
fn sum_ratio_fill_counts() {
    let h = lessons::sum_ratio::build(21).unwrap();
    let flows = |hist: &primer::hist::Histogram1D| hist.contents().iter().sum::<f64>();
    assert_relative_eq!(flows(&h.background), 10_000.0);
    assert_relative_eq!(flows(&h.signal), 1_000.0);
    assert_relative_eq!(flows(&h.sum), 11_000.0);
}

#[test]
fn bidim_weights_sum_to_a_tenth_of_the_fills() {
    let report = Lesson::Bidim.run(&context(31)).unwrap();
    assert_eq!(report.value("entries"), Some(500_000.0));
    assert_relative_eq!(report.value("total").unwrap(), 50_000.0, max_relative = 1e-9);
    assert_relative_eq!(
        report.value("projection_x_total").unwrap(),
        report.value("total").unwrap(),
        max_relative = 1e-9
    );
    assert_relative_eq!(
        report.value("projection_y_total").unwrap(),
        report.value("total").unwrap(),
        max_relative = 1e-9
    );
}

#[test]
fn fixed_seed_reproduces_every_lesson() {
    for lesson in Lesson::ALL {
        let a = lesson.run(&context(99)).unwrap();
        let b = lesson.run(&context(99)).unwrap();
        assert_eq!(a.values, b.values, "{lesson}");
        assert_eq!(a.text, b.text, "{lesson}");
        assert!(a.files.is_empty());
    }
}

#[test]
fn lessons_save_into_the_output_dir() {
    let out_dir = std::env::temp_dir().join(format!("primer-lessons-{}", std::process::id()));
    fs::create_dir_all(&out_dir).unwrap();
    let ctx = LessonContext {
        out_dir: Some(out_dir.clone()),
        ..context(5)
    };
    let mut written = 0;
    for lesson in Lesson::ALL {
        let report = lesson.run(&ctx).unwrap();
        let expected = match lesson {
            Lesson::Fit2d | Lesson::Bidim => 2,
            _ => 1,
        };
        assert_eq!(report.files.len(), expected, "{lesson}");
        for file in &report.files {
            assert!(file.starts_with(&out_dir));
            assert!(fs::metadata(file).unwrap().len() > 0, "{}", file.display());
        }
        written += report.files.len();
    }
    assert_eq!(written, 9);
    fs::remove_dir_all(&out_dir).unwrap();
}

#[test]
fn different_seeds_give_different_samples() {
    let a = Lesson::CountRate.run(&context(1)).unwrap();
    let b = Lesson::CountRate.run(&context(2)).unwrap();
    assert_ne!(a.values, b.values);
}
