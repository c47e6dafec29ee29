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

//! Canvases, pads and drawing attributes.
//!
//! Objects are drawn into the selected pad of a [`Canvas`] as snapshots; nothing is rendered
//! until [`Canvas::save_as`] writes the whole canvas through `plotters`.

mod canvas;
mod color;
mod draw;
pub mod latex;
mod options;
mod primitive;
mod style;

use plotters::drawing::DrawingAreaErrorKind;

use crate::error::Error;

pub use canvas::{Canvas, Pad};
pub use color::{Color, Palette};
pub use options::DrawOptions;
pub use primitive::{Arrow, EntryOptions, Latex, Legend, LegendEntry, Primitive};
pub use style::{DrawStyle, LineStyle, MarkerStyle, Style};

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Render(err.to_string())
    }
}
