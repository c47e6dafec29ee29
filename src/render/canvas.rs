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

//! Canvases divided into pads, and saving them to image files.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::{BitMapBackend, DrawingArea, DrawingBackend, IntoDrawingArea, SVGBackend};
use plotters::style::WHITE;

use crate::error::{Error, Result};
use crate::render::{draw, DrawOptions, Primitive, Style};

/// One display region of a canvas and what was drawn into it.
#[derive(Debug, Clone, Default)]
pub struct Pad {
    items: Vec<(Primitive, DrawOptions)>,
    grid: bool,
}

impl Pad {
    /// Drawn objects in drawing order, with their parsed options.
    #[must_use]
    pub fn items(&self) -> &[(Primitive, DrawOptions)] {
        &self.items
    }

    /// Whether the pad draws a grid.
    #[must_use]
    pub fn grid(&self) -> bool {
        self.grid
    }
}

/// A drawing surface, optionally divided into a grid of pads.
///
/// Pads are numbered from 1, left to right and top to bottom; pad 0 is the whole canvas.
/// ```
/// use primer::render::Canvas;
///
/// let mut canvas = Canvas::new("c1", "Functions", 400, 300);
/// canvas.divide(2, 2).unwrap();
/// canvas.cd(4).unwrap();
/// assert!(canvas.cd(5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Identifier of the canvas.
    pub name: String,
    /// Title of the canvas.
    pub title: String,
    width: u32,
    height: u32,
    style: Style,
    columns: usize,
    rows: usize,
    pads: Vec<Pad>,
    current: usize,
}

impl Canvas {
    /// Constructs an undivided canvas of `width × height` pixels with the default style.
    #[must_use]
    pub fn new(name: &str, title: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            width,
            height,
            style: Style::default(),
            columns: 1,
            rows: 1,
            pads: vec![Pad::default()],
            current: 0,
        }
    }

    /// Replaces the display options.
    #[must_use]
    pub fn with_style(mut self, style: &Style) -> Self {
        self.style = style.clone();
        self
    }

    /// Display options used when saving.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Clears the canvas and divides it into `nx` columns and `ny` rows of pads.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if either count is zero.
    pub fn divide(&mut self, nx: usize, ny: usize) -> Result<()> {
        if nx == 0 || ny == 0 {
            return Err(Error::InvalidParameter(format!(
                "cannot divide canvas '{}' into {nx}x{ny} pads",
                self.name
            )));
        }
        self.columns = nx;
        self.rows = ny;
        self.pads = vec![Pad::default(); nx * ny + 1];
        self.current = 0;
        Ok(())
    }

    /// Number of pads excluding the whole canvas.
    #[must_use]
    pub fn n_pads(&self) -> usize {
        self.pads.len() - 1
    }

    /// Selects pad `n`, 0 for the whole canvas.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the pad does not exist.
    pub fn cd(&mut self, n: usize) -> Result<()> {
        if n >= self.pads.len() {
            return Err(Error::InvalidParameter(format!(
                "canvas '{}' has no pad {n}",
                self.name
            )));
        }
        self.current = n;
        Ok(())
    }

    /// Pad `n`, 0 for the whole canvas.
    #[must_use]
    pub fn pad(&self, n: usize) -> Option<&Pad> {
        self.pads.get(n)
    }

    /// Turns on the grid of the selected pad.
    pub fn set_grid(&mut self) {
        self.pads[self.current].grid = true;
    }

    /// Draws a copy of `object` into the selected pad. Later changes to the object do not affect
    /// the canvas.
    ///
    /// A histogram or function drawn without `SAME`, or a graph drawn with `A`, first clears the
    /// pad. Legends, arrows and text are always added on top.
    pub fn draw(&mut self, object: impl Into<Primitive>, options: &str) {
        let primitive = object.into();
        let options = DrawOptions::parse(options);
        let clears = match primitive {
            Primitive::Legend(_) | Primitive::Arrow(_) | Primitive::Latex(_) => false,
            Primitive::Graph(_) | Primitive::Graph2D(_) => options.axis && !options.same,
            _ => !options.same,
        };
        let pad = &mut self.pads[self.current];
        if clears {
            pad.items.clear();
        }
        pad.items.push((primitive, options));
    }

    /// Renders every pad and writes the image. The format follows the extension: `.svg` or
    /// `.png`.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for other extensions and [`Error::Render`] if drawing
    /// or writing fails.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let size = (self.width, self.height);
        match extension.as_str() {
            "svg" => self.render(&SVGBackend::new(path, size).into_drawing_area())?,
            "png" => self.render(&BitMapBackend::new(path, size).into_drawing_area())?,
            _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
        }
        tracing::debug!(canvas = %self.name, path = %path.display(), "saved canvas");
        Ok(())
    }

    fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)?;
        let whole = &self.pads[0];
        if !whole.items.is_empty() {
            draw::draw_pad(root, whole, &self.style)?;
        }
        if self.pads.len() > 1 {
            let areas = root.split_evenly((self.rows, self.columns));
            for (area, pad) in areas.iter().zip(&self.pads[1..]) {
                draw::draw_pad(area, pad, &self.style)?;
            }
        }
        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Latex;

    #[test]
    fn pads() {
        let mut c = Canvas::new("c", "c", 600, 800);
        assert_eq!(c.n_pads(), 0);
        c.divide(1, 2).unwrap();
        assert_eq!(c.n_pads(), 2);
        c.cd(2).unwrap();
        c.set_grid();
        assert!(c.pad(2).unwrap().grid());
        assert!(!c.pad(1).unwrap().grid());
        assert!(c.divide(0, 1).is_err());
    }

    #[test]
    fn draw_replaces_unless_same() {
        let mut c = Canvas::new("c", "c", 400, 300);
        c.draw(Latex::new(0.0, 0.0, "a"), "");
        c.draw(Latex::new(0.0, 0.0, "b"), "same");
        assert_eq!(c.pad(0).unwrap().items().len(), 2);
        let hist = crate::hist::Histogram1D::new("h", "h", 10, 0.0, 1.0).unwrap();
        c.draw(&hist, "");
        assert_eq!(c.pad(0).unwrap().items().len(), 1);
        c.draw(&hist, "SameHist");
        c.draw(Latex::new(0.0, 0.0, "c"), "");
        assert_eq!(c.pad(0).unwrap().items().len(), 3);
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("primer-canvas-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn save_svg_with_histogram() {
        let mut h = crate::hist::Histogram1D::new("h", "Counts;x;n", 10, 0.0, 1.0).unwrap();
        for v in [0.05, 0.15, 0.15, 0.55, 0.95] {
            h.fill(v);
        }
        let mut c = Canvas::new("c", "c", 400, 300);
        c.divide(2, 1).unwrap();
        c.cd(1).unwrap();
        c.draw(&h, "hist");
        c.cd(2).unwrap();
        c.draw(&h, "E");
        let path = scratch("hist.svg");
        c.save_as(&path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"), "{svg}");
        assert!(svg.contains("</svg>"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn save_png() {
        let c = Canvas::new("c", "c", 64, 48);
        let path = scratch("blank.PNG");
        c.save_as(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unknown_extension() {
        let c = Canvas::new("c", "c", 100, 100);
        let path = std::env::temp_dir().join("primer-canvas.pdf");
        assert!(matches!(c.save_as(path), Err(Error::UnsupportedFormat(_))));
    }
}
