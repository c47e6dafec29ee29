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

//! Colours and colour palettes.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// A drawing colour.
///
/// The named variants follow the classic colour indices of physics plotting packages, so that
/// `Color::from_index(2)` is red and `Color::from_index(4)` is blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Index 0.
    White,
    /// Index 1.
    #[default]
    Black,
    /// Index 2.
    Red,
    /// Index 3.
    Green,
    /// Index 4.
    Blue,
    /// Index 5.
    Yellow,
    /// Index 6.
    Magenta,
    /// Index 7.
    Cyan,
    /// Index 800.
    Orange,
    /// Any other colour.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Colour of a classic colour index. Unknown indices give a mid grey.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Color::White,
            1 => Color::Black,
            2 => Color::Red,
            3 => Color::Green,
            4 => Color::Blue,
            5 => Color::Yellow,
            6 => Color::Magenta,
            7 => Color::Cyan,
            8 => Color::Rgb(89, 212, 84),
            9 => Color::Rgb(89, 84, 217),
            800 => Color::Orange,
            _ => Color::Rgb(128, 128, 128),
        }
    }

    /// Red, green and blue components.
    #[must_use]
    pub fn components(self) -> (u8, u8, u8) {
        match self {
            Color::White => (255, 255, 255),
            Color::Black => (0, 0, 0),
            Color::Red => (255, 0, 0),
            Color::Green => (0, 255, 0),
            Color::Blue => (0, 0, 255),
            Color::Yellow => (255, 255, 0),
            Color::Magenta => (255, 0, 255),
            Color::Cyan => (0, 255, 255),
            Color::Orange => (255, 204, 0),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// A shade of this colour: negative offsets are lighter, positive ones darker.
    ///
    /// `Color::Blue.offset(-5)` is the pale blue usually written `kBlue-5`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn offset(self, offset: i32) -> Self {
        let (r, g, b) = self.components();
        let shade = |c: u8| -> u8 {
            let c = f64::from(c);
            let shaded = if offset < 0 {
                let t = (f64::from(-offset) / 10.0).min(1.0);
                c + (255.0 - c) * t
            } else {
                let t = (f64::from(offset) / 5.0).min(1.0);
                c * (1.0 - 0.8 * t)
            };
            shaded.round().clamp(0.0, 255.0) as u8
        };
        Color::Rgb(shade(r), shade(g), shade(b))
    }

    pub(crate) fn rgb(self) -> RGBColor {
        let (r, g, b) = self.components();
        RGBColor(r, g, b)
    }
}

/// Colour map used for colour-coded 2D views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Blue through green to yellow.
    #[default]
    Bird,
    /// Black to white.
    Grayscale,
}

const BIRD_RED: [f64; 9] = [
    0.2082, 0.0592, 0.0780, 0.0232, 0.1802, 0.5301, 0.8186, 0.9956, 0.9764,
];
const BIRD_GREEN: [f64; 9] = [
    0.1664, 0.3599, 0.5041, 0.6419, 0.7178, 0.7492, 0.7328, 0.7862, 0.9832,
];
const BIRD_BLUE: [f64; 9] = [
    0.5293, 0.8684, 0.8385, 0.7914, 0.6425, 0.4662, 0.3499, 0.1968, 0.0539,
];

fn interpolate(stops: &[f64; 9], t: f64) -> f64 {
    let pos = t * 8.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = (pos.floor() as usize).min(7);
    let frac = pos - f64::from(u32::try_from(lower).unwrap_or(0));
    stops[lower] + (stops[lower + 1] - stops[lower]) * frac
}

impl Palette {
    /// Colour at position `t` of the map; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn color_at(self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        match self {
            Palette::Bird => Color::Rgb(
                byte(interpolate(&BIRD_RED, t)),
                byte(interpolate(&BIRD_GREEN, t)),
                byte(interpolate(&BIRD_BLUE, t)),
            ),
            Palette::Grayscale => {
                let v = byte(t);
                Color::Rgb(v, v, v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices() {
        assert_eq!(Color::from_index(1), Color::Black);
        assert_eq!(Color::from_index(2), Color::Red);
        assert_eq!(Color::from_index(800), Color::Orange);
    }

    #[test]
    fn shades() {
        assert_eq!(Color::Blue.offset(0), Color::Rgb(0, 0, 255));
        let Color::Rgb(r, g, b) = Color::Blue.offset(-5) else {
            panic!("shade is not rgb");
        };
        assert_eq!((r, g, b), (128, 128, 255));
        assert_eq!(Color::White.offset(5), Color::Rgb(51, 51, 51));
    }

    #[test]
    fn palette_ends() {
        assert_eq!(Palette::Bird.color_at(0.0), Color::Rgb(53, 42, 135));
        assert_eq!(Palette::Bird.color_at(2.0), Color::Rgb(249, 251, 14));
        assert_eq!(Palette::Grayscale.color_at(0.5), Color::Rgb(128, 128, 128));
        let json = serde_json::to_string(&Palette::Grayscale).unwrap();
        assert_eq!(json, "\"grayscale\"");
    }
}
