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

//! Display options of a canvas and attributes of drawn objects.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::{Color, Palette};

/// Display options shared by every pad of a canvas.
///
/// `opt_stat` and `opt_fit` are digit masks read from the right. For `opt_stat` the digits select
/// name, entries, mean, standard deviation, underflow, overflow, integral, skewness and kurtosis;
/// a digit of 2 on the mean or standard deviation also prints its error. For `opt_fit` they
/// select parameter values, their errors, χ²/ndf and probability.
///
/// Missing fields take their default values when a style is read from JSON:
/// ```
/// let style: primer::render::Style = serde_json::from_str(r#"{"opt_stat": 0}"#).unwrap();
/// assert_eq!(style.opt_stat, 0);
/// assert!(style.opt_title);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Statistics box contents, 0 for no box.
    pub opt_stat: u32,
    /// Fit box contents, 0 for no box.
    pub opt_fit: u32,
    /// Whether the title of the first object of a pad is drawn.
    pub opt_title: bool,
    /// Colour map of the colour-coded views.
    pub palette: Palette,
    /// Whether every pad draws a grid.
    pub grid: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opt_stat: 1111,
            opt_fit: 0,
            opt_title: true,
            palette: Palette::Bird,
            grid: false,
        }
    }
}

impl Style {
    /// Reads a style from a JSON file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be read and [`crate::Error::Json`] if it is
    /// not a valid style.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let style = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded style");
        Ok(style)
    }

    /// Digit `position` of `mask`, counted from the right starting at 0.
    pub(crate) fn digit(mask: u32, position: u32) -> u32 {
        (mask / 10u32.pow(position)) % 10
    }
}

/// Dash pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous.
    #[default]
    Solid,
    /// Long dashes.
    Dashed,
    /// Dots.
    Dotted,
}

/// Shape of a point marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    /// Filled disc.
    #[default]
    FullCircle,
    /// Circle outline.
    OpenCircle,
    /// Filled triangle.
    FullTriangle,
    /// Diagonal cross.
    Cross,
    /// A single pixel.
    Dot,
}

/// Line, marker and fill attributes of a drawn object.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    /// Colour of lines and error bars.
    pub line_color: Color,
    /// Width of lines in pixels.
    pub line_width: u32,
    /// Dash pattern of lines.
    pub line_style: LineStyle,
    /// Shape of point markers.
    pub marker_style: MarkerStyle,
    /// Colour of point markers.
    pub marker_color: Color,
    /// Radius of point markers in pixels.
    pub marker_size: u32,
    /// Fill colour of bands and boxes, `None` for hollow.
    pub fill_color: Option<Color>,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            line_color: Color::Black,
            line_width: 1,
            line_style: LineStyle::Solid,
            marker_style: MarkerStyle::FullCircle,
            marker_color: Color::Black,
            marker_size: 3,
            fill_color: None,
        }
    }
}
