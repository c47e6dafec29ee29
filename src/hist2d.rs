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

//! Two-dimensional histograms, their projections and profiles.

use crate::error::Result;
use crate::graph::Coord;
use crate::hist::{split_title, Axis, Histogram1D};
use crate::render::DrawStyle;
use crate::simulation::Fill;

/// A histogram of `(x, y)` pairs, flow bins included on both axes.
#[derive(Debug, Clone)]
pub struct Histogram2D {
    /// Identifier used in projections and the statistics box.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Binning along x.
    pub x_axis: Axis,
    /// Binning along y.
    pub y_axis: Axis,
    /// Label of the content axis.
    pub z_title: String,
    /// Line attributes for the lego and surface views.
    pub style: DrawStyle,
    contents: Vec<f64>,
    sumw2: Vec<f64>,
    entries: f64,
}

impl Histogram2D {
    /// Constructs an empty histogram.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidParameter`] for an empty binning on either axis.
    pub fn new(
        name: &str,
        title: &str,
        (nx, xmin, xmax): (usize, f64, f64),
        (ny, ymin, ymax): (usize, f64, f64),
    ) -> Result<Self> {
        let x_axis = Axis::new(nx, xmin, xmax)?;
        let y_axis = Axis::new(ny, ymin, ymax)?;
        let cells = (nx + 2) * (ny + 2);
        let mut hist = Self {
            name: name.to_string(),
            title: String::new(),
            x_axis,
            y_axis,
            z_title: String::new(),
            style: DrawStyle::default(),
            contents: vec![0.0; cells],
            sumw2: vec![0.0; cells],
            entries: 0.0,
        };
        hist.set_title(title);
        Ok(hist)
    }

    /// Sets the title; text after `;` sets the x, y and z axis titles.
    pub fn set_title(&mut self, full: &str) {
        let (title, x, y) = split_title(full);
        self.title = title;
        if let Some(x) = x {
            self.x_axis.title = x;
        }
        if let Some(y) = y {
            self.y_axis.title = y;
        }
        if let Some(z) = full.split(';').nth(3) {
            self.z_title = z.to_string();
        }
    }

    fn cell(&self, ix: usize, iy: usize) -> usize {
        iy * (self.x_axis.nbins() + 2) + ix
    }

    /// Adds `(x, y)` with unit weight.
    pub fn fill(&mut self, x: f64, y: f64) -> (usize, usize) {
        self.fill_weighted(x, y, 1.0)
    }

    /// Adds `(x, y)` with weight `w` and returns the `(ix, iy)` bin it went to.
    pub fn fill_weighted(&mut self, x: f64, y: f64, w: f64) -> (usize, usize) {
        let ix = self.x_axis.find_bin(x);
        let iy = self.y_axis.find_bin(y);
        let cell = self.cell(ix, iy);
        self.contents[cell] += w;
        self.sumw2[cell] += w * w;
        self.entries += 1.0;
        (ix, iy)
    }

    /// Content of bin `(ix, iy)`; 0 and `nbins + 1` are the flow bins of each axis.
    #[must_use]
    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        if ix > self.x_axis.nbins() + 1 || iy > self.y_axis.nbins() + 1 {
            return 0.0;
        }
        self.contents[self.cell(ix, iy)]
    }

    /// Statistical error of bin `(ix, iy)`.
    #[must_use]
    pub fn bin_error(&self, ix: usize, iy: usize) -> f64 {
        if ix > self.x_axis.nbins() + 1 || iy > self.y_axis.nbins() + 1 {
            return 0.0;
        }
        self.sumw2[self.cell(ix, iy)].sqrt()
    }

    /// Number of fill calls.
    #[must_use]
    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Sum of contents over every bin, flows included.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Sum of the in-range contents.
    #[must_use]
    pub fn integral(&self) -> f64 {
        let mut sum = 0.0;
        for iy in 1..=self.y_axis.nbins() {
            for ix in 1..=self.x_axis.nbins() {
                sum += self.contents[self.cell(ix, iy)];
            }
        }
        sum
    }

    /// Largest in-range bin content.
    #[must_use]
    pub fn maximum(&self) -> f64 {
        let mut max = f64::NEG_INFINITY;
        for iy in 1..=self.y_axis.nbins() {
            for ix in 1..=self.x_axis.nbins() {
                max = max.max(self.contents[self.cell(ix, iy)]);
            }
        }
        max
    }

    /// Mean of one coordinate over the in-range bins, from the bin centres.
    #[must_use]
    pub fn mean(&self, coord: Coord) -> f64 {
        let (mut sumw, mut sumwv) = (0.0, 0.0);
        for iy in 1..=self.y_axis.nbins() {
            for ix in 1..=self.x_axis.nbins() {
                let w = self.contents[self.cell(ix, iy)];
                let v = match coord {
                    Coord::X => self.x_axis.bin_center(ix),
                    Coord::Y => self.y_axis.bin_center(iy),
                };
                sumw += w;
                sumwv += w * v;
            }
        }
        if sumw == 0.0 {
            0.0
        } else {
            sumwv / sumw
        }
    }

    /// Projection onto x. Every y bin contributes, flows included.
    #[must_use]
    pub fn projection_x(&self) -> Histogram1D {
        self.project(Coord::X)
    }

    /// Projection onto y. Every x bin contributes, flows included.
    #[must_use]
    pub fn projection_y(&self) -> Histogram1D {
        self.project(Coord::Y)
    }

    fn project(&self, onto: Coord) -> Histogram1D {
        let (axis, other, suffix) = match onto {
            Coord::X => (&self.x_axis, &self.y_axis, "px"),
            Coord::Y => (&self.y_axis, &self.x_axis, "py"),
        };
        let n = axis.nbins() + 2;
        let mut contents = vec![0.0; n];
        let mut sumw2 = vec![0.0; n];
        for i in 0..n {
            for j in 0..other.nbins() + 2 {
                let cell = match onto {
                    Coord::X => self.cell(i, j),
                    Coord::Y => self.cell(j, i),
                };
                contents[i] += self.contents[cell];
                sumw2[i] += self.sumw2[cell];
            }
        }
        let mut hist = Histogram1D::from_bins(
            &format!("{}_{suffix}", self.name),
            axis.clone(),
            contents,
            sumw2,
            self.entries,
        );
        hist.title = format!("{} projection", self.title);
        hist
    }

    /// Mean of y in every x bin. Only in-range y bins contribute.
    #[must_use]
    pub fn profile_x(&self) -> Profile {
        self.profile(Coord::X)
    }

    /// Mean of x in every y bin. Only in-range x bins contribute.
    #[must_use]
    pub fn profile_y(&self) -> Profile {
        self.profile(Coord::Y)
    }

    fn profile(&self, along: Coord) -> Profile {
        let (axis, other, suffix) = match along {
            Coord::X => (&self.x_axis, &self.y_axis, "pfx"),
            Coord::Y => (&self.y_axis, &self.x_axis, "pfy"),
        };
        let mut profile = Profile::new(&format!("{}_{suffix}", self.name), axis.clone());
        profile.title = format!("{} profile", self.title);
        profile.y_title = other.title.clone();
        for i in 0..axis.nbins() + 2 {
            for j in 1..=other.nbins() {
                let cell = match along {
                    Coord::X => self.cell(i, j),
                    Coord::Y => self.cell(j, i),
                };
                let w = self.contents[cell];
                if w != 0.0 {
                    profile.accumulate(i, other.bin_center(j), w, self.sumw2[cell]);
                }
            }
        }
        profile
    }
}

impl Fill<(f64, f64, f64)> for Histogram2D {
    fn fill_value(&mut self, (x, y, w): (f64, f64, f64)) {
        self.fill_weighted(x, y, w);
    }
}

/// Per-bin mean of a second variable, with the error of the mean.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Identifier used in legends.
    pub name: String,
    /// Title drawn above the plot.
    pub title: String,
    /// Binning of the profiled variable.
    pub x_axis: Axis,
    /// Label of the averaged variable.
    pub y_title: String,
    /// Line and marker attributes.
    pub style: DrawStyle,
    sum_w: Vec<f64>,
    sum_w2: Vec<f64>,
    sum_wy: Vec<f64>,
    sum_wy2: Vec<f64>,
}

impl Profile {
    /// Constructs an empty profile over `x_axis`.
    #[must_use]
    pub fn new(name: &str, x_axis: Axis) -> Self {
        let n = x_axis.nbins() + 2;
        Self {
            name: name.to_string(),
            title: String::new(),
            x_axis,
            y_title: String::new(),
            style: DrawStyle::default(),
            sum_w: vec![0.0; n],
            sum_w2: vec![0.0; n],
            sum_wy: vec![0.0; n],
            sum_wy2: vec![0.0; n],
        }
    }

    fn accumulate(&mut self, bin: usize, y: f64, w: f64, w2: f64) {
        self.sum_w[bin] += w;
        self.sum_w2[bin] += w2;
        self.sum_wy[bin] += w * y;
        self.sum_wy2[bin] += w * y * y;
    }

    /// Adds `y` at `x` with weight `w`.
    pub fn fill_weighted(&mut self, x: f64, y: f64, w: f64) {
        let bin = self.x_axis.find_bin(x);
        self.accumulate(bin, y, w, w * w);
    }

    /// Mean of the averaged variable in `bin`, zero for an empty bin.
    #[must_use]
    pub fn bin_content(&self, bin: usize) -> f64 {
        match self.sum_w.get(bin) {
            Some(&w) if w != 0.0 => self.sum_wy[bin] / w,
            _ => 0.0,
        }
    }

    /// Sum of weights in `bin`.
    #[must_use]
    pub fn bin_entries(&self, bin: usize) -> f64 {
        self.sum_w.get(bin).copied().unwrap_or(0.0)
    }

    /// Error of the mean in `bin`: spread over the square root of the effective entries.
    #[must_use]
    pub fn bin_error(&self, bin: usize) -> f64 {
        let w = self.bin_entries(bin);
        if w == 0.0 || self.sum_w2[bin] == 0.0 {
            return 0.0;
        }
        let mean = self.sum_wy[bin] / w;
        let spread = (self.sum_wy2[bin] / w - mean * mean).abs().sqrt();
        let neff = w * w / self.sum_w2[bin];
        spread / neff.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bidi() -> Histogram2D {
        Histogram2D::new(
            "bidi_h",
            "2D Histo;Gaussian Vals;Exp. Vals",
            (30, -5.0, 5.0),
            (30, 0.0, 10.0),
        )
        .unwrap()
    }

    #[test]
    fn titles_and_bins() {
        let mut h = bidi();
        assert_eq!(h.x_axis.title, "Gaussian Vals");
        assert_eq!(h.y_axis.title, "Exp. Vals");
        let (ix, iy) = h.fill_weighted(0.1, 9.9, 0.1);
        assert_eq!((ix, iy), (16, 30));
        assert_relative_eq!(h.bin_content(16, 30), 0.1);
        assert_relative_eq!(h.bin_error(16, 30), 0.1);
        assert_eq!(h.fill(-7.0, 12.0), (0, 31));
        assert_relative_eq!(h.bin_content(99, 0), 0.0);
    }

    #[test]
    fn projections_keep_every_fill() {
        let mut h = bidi();
        let fills = [(0.0, 5.0), (1.0, -3.0), (8.0, 2.0), (-1.0, 11.0), (2.5, 2.5)];
        for (x, y) in fills {
            h.fill_weighted(x, y, 0.1);
        }
        let px = h.projection_x();
        let py = h.projection_y();
        let total_px: f64 = px.contents().iter().sum();
        let total_py: f64 = py.contents().iter().sum();
        assert_relative_eq!(total_px, 0.5, epsilon = 1e-12);
        assert_relative_eq!(total_py, 0.5, epsilon = 1e-12);
        assert_relative_eq!(h.total(), 0.5, epsilon = 1e-12);
        // The fill at y = -3 is in the y underflow but still in the x projection.
        let bin = h.x_axis.find_bin(1.0);
        assert_relative_eq!(px.bin_content(bin), 0.1, epsilon = 1e-12);
        assert_relative_eq!(px.entries(), 5.0);
    }

    #[test]
    fn profile_means() {
        let mut h = bidi();
        h.fill(0.1, 1.5);
        h.fill(0.1, 3.5);
        h.fill(0.1, 20.0);
        let pf = h.profile_x();
        let bin = h.x_axis.find_bin(0.1);
        let c1 = h.y_axis.bin_center(h.y_axis.find_bin(1.5));
        let c2 = h.y_axis.bin_center(h.y_axis.find_bin(3.5));
        assert_relative_eq!(pf.bin_content(bin), (c1 + c2) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(pf.bin_entries(bin), 2.0);
        let spread = (c2 - c1) / 2.0;
        assert_relative_eq!(pf.bin_error(bin), spread / 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(pf.bin_content(1), 0.0);
    }

    #[test]
    fn direct_profile_fill() {
        let axis = Axis::new(2, 0.0, 2.0).unwrap();
        let mut p = Profile::new("p", axis);
        p.fill_weighted(0.5, 1.0, 1.0);
        p.fill_weighted(0.5, 3.0, 1.0);
        assert_relative_eq!(p.bin_content(1), 2.0);
        assert_relative_eq!(p.bin_error(1), 1.0 / 2f64.sqrt());
    }
}
