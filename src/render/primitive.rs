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

//! Objects that can be drawn into a pad.

use crate::function::{Function1D, Function2D};
use crate::graph::{Graph2DErrors, GraphErrors};
use crate::hist::Histogram1D;
use crate::hist2d::{Histogram2D, Profile};
use crate::render::{Color, DrawStyle};

/// How a legend entry is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryOptions {
    /// Short line in the line colour.
    pub line: bool,
    /// Marker of the entry.
    pub marker: bool,
    /// Box in the fill colour.
    pub fill: bool,
}

impl EntryOptions {
    /// Parses `"l"`, `"p"`, `"f"` or a combination; an empty string selects all three.
    #[must_use]
    pub fn parse(options: &str) -> Self {
        let options = options.to_ascii_lowercase();
        if options.is_empty() {
            return Self {
                line: true,
                marker: true,
                fill: true,
            };
        }
        Self {
            line: options.contains('l'),
            marker: options.contains('p'),
            fill: options.contains('f'),
        }
    }
}

/// A labelled line of a [`Legend`].
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// Text next to the sample.
    pub label: String,
    /// Attributes of the object the entry describes.
    pub style: DrawStyle,
    /// Which attributes the sample shows.
    pub options: EntryOptions,
}

/// A boxed list of labelled samples, placed in coordinates normalised to the pad.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Lower-left corner, each coordinate in `[0, 1]` from the bottom left of the pad.
    pub low: (f64, f64),
    /// Upper-right corner.
    pub high: (f64, f64),
    /// Text above the entries, empty for none.
    pub header: String,
    /// Background of the box, `None` for transparent.
    pub fill_color: Option<Color>,
    entries: Vec<LegendEntry>,
}

impl Legend {
    /// Constructs an empty legend spanning `(x1, y1)`–`(x2, y2)` of the pad.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, header: &str) -> Self {
        Self {
            low: (x1.min(x2), y1.min(y2)),
            high: (x1.max(x2), y1.max(y2)),
            header: header.to_string(),
            fill_color: Some(Color::White),
            entries: Vec::new(),
        }
    }

    /// Adds an entry for an object drawn with `style`.
    pub fn add_entry(&mut self, style: &DrawStyle, label: &str, options: &str) {
        self.entries.push(LegendEntry {
            label: label.to_string(),
            style: style.clone(),
            options: EntryOptions::parse(options),
        });
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }
}

/// An arrow between two points in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    /// Tail.
    pub from: (f64, f64),
    /// Tip.
    pub to: (f64, f64),
    /// Length of the head as a fraction of the pad height.
    pub head_size: f64,
    /// Whether the head is filled (`"|>"`) or open (`">"`).
    pub filled: bool,
    /// Line attributes.
    pub style: DrawStyle,
}

impl Arrow {
    /// Constructs an arrow from `(x1, y1)` to `(x2, y2)`.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, head_size: f64, option: &str) -> Self {
        Self {
            from: (x1, y1),
            to: (x2, y2),
            head_size,
            filled: option.contains('|'),
            style: DrawStyle::default(),
        }
    }
}

/// An annotation at a point in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Latex {
    /// Anchor of the first line.
    pub at: (f64, f64),
    /// Markup, see [`crate::render::latex`].
    pub text: String,
    /// Font size in pixels.
    pub size: u32,
    /// Text colour.
    pub color: Color,
}

impl Latex {
    /// Constructs an annotation at `(x, y)`.
    #[must_use]
    pub fn new(x: f64, y: f64, text: &str) -> Self {
        Self {
            at: (x, y),
            text: text.to_string(),
            size: 16,
            color: Color::Black,
        }
    }
}

/// A snapshot of an object, taken when it is drawn into a pad.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Curve of a 1D function.
    Function1D(Function1D),
    /// Surface of a 2D function.
    Function2D(Function2D),
    /// Points with error bars or an error band.
    Graph(GraphErrors),
    /// Points in three dimensions.
    Graph2D(Graph2DErrors),
    /// 1D histogram.
    Histogram1D(Histogram1D),
    /// 2D histogram.
    Histogram2D(Histogram2D),
    /// Profile of a 2D histogram.
    Profile(Profile),
    /// Legend box.
    Legend(Legend),
    /// Arrow.
    Arrow(Arrow),
    /// Text annotation.
    Latex(Latex),
}

impl Primitive {
    /// Title with its `;`-separated axis titles, for the objects that carry one.
    pub(crate) fn titles(&self) -> Option<(&str, &str, &str)> {
        match self {
            Primitive::Function1D(f) => {
                Some((f.title.as_str(), f.x_title.as_str(), f.y_title.as_str()))
            }
            Primitive::Function2D(f) => {
                Some((f.title.as_str(), f.x_title.as_str(), f.y_title.as_str()))
            }
            Primitive::Graph(g) => Some((g.title.as_str(), g.x_title.as_str(), g.y_title.as_str())),
            Primitive::Graph2D(g) => Some((g.name.as_str(), "", "")),
            Primitive::Histogram1D(h) => {
                Some((h.title.as_str(), h.x_axis.title.as_str(), h.y_title.as_str()))
            }
            Primitive::Histogram2D(h) => {
                Some((h.title.as_str(), h.x_axis.title.as_str(), h.y_axis.title.as_str()))
            }
            Primitive::Profile(p) => {
                Some((p.title.as_str(), p.x_axis.title.as_str(), p.y_title.as_str()))
            }
            Primitive::Legend(_) | Primitive::Arrow(_) | Primitive::Latex(_) => None,
        }
    }
}

macro_rules! snapshot {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<&$ty> for Primitive {
                fn from(object: &$ty) -> Self {
                    Primitive::$variant(object.clone())
                }
            }

            impl From<$ty> for Primitive {
                fn from(object: $ty) -> Self {
                    Primitive::$variant(object)
                }
            }
        )*
    };
}

snapshot! {
    Function1D => Function1D,
    Function2D => Function2D,
    Graph => GraphErrors,
    Graph2D => Graph2DErrors,
    Histogram1D => Histogram1D,
    Histogram2D => Histogram2D,
    Profile => Profile,
    Legend => Legend,
    Arrow => Arrow,
    Latex => Latex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_options() {
        let all = EntryOptions::parse("");
        assert!(all.line && all.marker && all.fill);
        let lp = EntryOptions::parse("LP");
        assert!(lp.line && lp.marker && !lp.fill);
    }

    #[test]
    fn legend_normalises_corners() {
        let mut leg = Legend::new(0.3, 0.9, 0.1, 0.7, "Lab. Lesson 1");
        assert_eq!(leg.low, (0.1, 0.7));
        assert_eq!(leg.high, (0.3, 0.9));
        leg.add_entry(&DrawStyle::default(), "Exp. Points", "p");
        assert_eq!(leg.entries().len(), 1);
        assert!(leg.entries()[0].options.marker);
    }

    #[test]
    fn drawing_takes_a_snapshot() {
        let mut f = Function1D::new("f", "[0]*x", 0.0, 1.0).unwrap();
        f.set_parameter(0, 1.0).unwrap();
        let snap = Primitive::from(&f);
        f.set_parameter(0, 2.0).unwrap();
        let Primitive::Function1D(copy) = snap else {
            panic!("wrong primitive");
        };
        approx::assert_relative_eq!(copy.parameter(0), 1.0);
    }

    #[test]
    fn arrow_head_option() {
        assert!(Arrow::new(8.0, 8.0, 6.2, 23.0, 0.02, "|>").filled);
        assert!(!Arrow::new(0.0, 0.0, 1.0, 1.0, 0.02, ">").filled);
    }
}
