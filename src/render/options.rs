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

//! Parsing of draw option strings such as `"APE"` or `"SameHist"`.

/// Flags selected by a draw option string.
///
/// Parsing is case-insensitive and ignores characters it does not know, so `"Surf1"`,
/// `"P0 Same"` and `"e3al"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOptions {
    /// `A`: draw the axes, starting a new frame.
    pub axis: bool,
    /// `P`: draw point markers.
    pub points: bool,
    /// `E`: draw error bars.
    pub errors: bool,
    /// `L`: join the points with a line.
    pub line: bool,
    /// `E3`: draw the errors as a filled band.
    pub band: bool,
    /// `SAME`: draw on top of what is already in the pad.
    pub same: bool,
    /// `HIST`: draw a histogram as a step line without errors.
    pub hist: bool,
    /// `CONT`: contour bands of a 2D histogram.
    pub cont: bool,
    /// `COLZ`: colour map of a 2D histogram.
    pub colz: bool,
    /// `LEGO`: bars of a 2D histogram.
    pub lego: bool,
    /// `SURF`: surface of a 2D histogram or function.
    pub surf: bool,
}

impl DrawOptions {
    /// Parses an option string.
    #[must_use]
    pub fn parse(options: &str) -> Self {
        let mut rest = options.to_ascii_uppercase();
        let mut parsed = DrawOptions::default();
        for (keyword, flag) in [
            ("SAME", &mut parsed.same),
            ("HIST", &mut parsed.hist),
            ("CONT", &mut parsed.cont),
            ("COLZ", &mut parsed.colz),
            ("LEGO", &mut parsed.lego),
            ("SURF", &mut parsed.surf),
            ("E3", &mut parsed.band),
        ] {
            if rest.contains(keyword) {
                *flag = true;
                rest = rest.replace(keyword, " ");
            }
        }
        for c in rest.chars() {
            match c {
                'A' => parsed.axis = true,
                'P' => parsed.points = true,
                'E' => parsed.errors = true,
                'L' => parsed.line = true,
                _ => {}
            }
        }
        parsed
    }

    /// Whether a lego or surface view was requested.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.lego || self.surf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_options() {
        let o = DrawOptions::parse("APE");
        assert!(o.axis && o.points && o.errors && !o.line && !o.same);
        let o = DrawOptions::parse("E3AL");
        assert!(o.band && o.axis && o.line && !o.errors);
        let o = DrawOptions::parse("PESame");
        assert!(o.points && o.errors && o.same && !o.axis);
    }

    #[test]
    fn histogram_options() {
        let o = DrawOptions::parse("SameHist");
        assert!(o.same && o.hist && !o.errors);
        assert!(DrawOptions::parse("Cont1").cont);
        assert!(DrawOptions::parse("colz").colz);
        assert!(DrawOptions::parse("Lego2").is_3d());
        let o = DrawOptions::parse("P0 Same");
        assert!(o.points && o.same);
        assert_eq!(DrawOptions::parse(""), DrawOptions::default());
    }
}
