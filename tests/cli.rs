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
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_primer"))
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("primer_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

#[test]
fn count_rate_prints_moments() {
    let out = run(&["count-rate", "--dry-run", "--seed", "7"]);
    assert!(
        out.status.success(),
        "count-rate should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Moments of Distribution:"), "stdout={stdout}");
    for label in ["Mean", "Std Dev", "Skewness", "Kurtosis"] {
        assert!(stdout.contains(label), "missing {label}: {stdout}");
    }
    assert!(!stdout.contains("wrote"));
}

#[test]
fn same_seed_same_output() {
    let a = run(&["graph-fit", "--dry-run", "--seed", "3"]);
    let b = run(&["graph-fit", "--dry-run", "--seed", "3"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn overlay_prints_measured_points() {
    let data = data_dir();
    let out = run(&["overlay", "--dry-run", "--data-dir", data.to_string_lossy().as_ref()]);
    assert!(
        out.status.success(),
        "overlay should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 10);
    assert!(stdout.contains("x[9]=10, y[9]=53, ex[9]=0, ey[9]=5.43"));
}

#[test]
fn missing_data_dir_fails() {
    let missing = tmp_dir("missing");
    let out = run(&["overlay", "--dry-run", "--data-dir", missing.to_string_lossy().as_ref()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("lesson overlay failed"), "stderr={stderr}");
}

#[test]
fn style_file_is_read() {
    let dir = tmp_dir("style");
    fs::create_dir_all(&dir).unwrap();
    let good = dir.join("style.json");
    fs::write(&good, r#"{"opt_stat": 0, "palette": "grayscale"}"#).unwrap();
    let out = run(&["--style", good.to_string_lossy().as_ref(), "sum-ratio", "--dry-run"]);
    assert!(
        out.status.success(),
        "sum-ratio should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let bad = dir.join("bad.json");
    fs::write(&bad, "{ not json").unwrap();
    let out = run(&["--style", bad.to_string_lossy().as_ref(), "sum-ratio", "--dry-run"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("reading style"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn all_writes_every_canvas() {
    let out_dir = tmp_dir("all");
    let data = data_dir();
    let out = run(&[
        "all",
        "--out-dir",
        out_dir.to_string_lossy().as_ref(),
        "--data-dir",
        data.to_string_lossy().as_ref(),
    ]);
    assert!(
        out.status.success(),
        "all should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    for file in [
        "functions.svg",
        "graph_with_law.svg",
        "overlay.svg",
        "fit2d.svg",
        "fit2d_projections.svg",
        "count_rate.svg",
        "sum_ratio.svg",
        "bidim.svg",
        "bidim_projections.svg",
    ] {
        let path = out_dir.join(file);
        let svg = fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert!(svg.contains("<svg"), "{file} is not an SVG");
        assert!(stdout.contains(file), "{file} not reported: {stdout}");
    }
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 9);
    fs::remove_dir_all(&out_dir).unwrap();
}

#[test]
fn unknown_lesson_is_rejected() {
    let out = run(&["macro3"]);
    assert!(!out.status.success());
}
