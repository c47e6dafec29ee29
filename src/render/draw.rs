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

//! Rendering of pad contents through `plotters`.

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::Cubiod;
use plotters::prelude::{
    ChartBuilder, ChartContext, Circle, Cross, DrawingArea, DrawingBackend, EmptyElement, ErrorBar,
    IntoFont, LineSeries, PathElement, Pixel, Polygon, Rectangle, SurfaceSeries, Text,
    TriangleMarker,
};
use plotters::style::{Color as _, ShapeStyle, BLACK, WHITE};

use crate::error::Result;
use crate::fit::FitResult;
use crate::function::Function2D;
use crate::graph::{Coord, Graph2DErrors, GraphErrors};
use crate::hist::Histogram1D;
use crate::hist2d::{Histogram2D, Profile};
use crate::render::canvas::Pad;
use crate::render::{latex, Arrow, DrawOptions, DrawStyle, Latex, Legend, LineStyle, MarkerStyle};
use crate::render::{Palette, Primitive, Style};

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";
const CONTOUR_LEVELS: f64 = 20.0;

#[allow(clippy::cast_possible_truncation)]
fn px(v: f64) -> i32 {
    v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// `(min, max)` of finite values.
fn span(values: impl IntoIterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|(lo, hi)| lo.is_finite() && hi.is_finite())
        .fold(None, |acc, (lo, hi)| {
            Some(acc.map_or((lo, hi), |(a, b): (f64, f64)| (a.min(lo), b.max(hi))))
        })
}

fn union(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0.min(b.0), a.1.max(b.1))
}

/// Widens a range by 5% on each side. A lower bound at exactly zero stays there.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi <= lo {
        return (lo - 1.0, hi + 1.0);
    }
    let margin = 0.05 * (hi - lo);
    let lo = if lo == 0.0 { 0.0 } else { lo - margin };
    (lo, hi + margin)
}

#[allow(clippy::cast_precision_loss)]
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    (0..=n).map(|i| lo + (hi - lo) * i as f64 / n as f64).collect()
}

fn line_shape(style: &DrawStyle) -> ShapeStyle {
    style.line_color.rgb().stroke_width(style.line_width)
}

/// Data ranges of a 2D chart and the pixel size of its plotting area.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: (f64, f64),
    y: (f64, f64),
    pixels: (u32, u32),
}

impl Frame {
    fn to_pixels(self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            (x - self.x.0) / (self.x.1 - self.x.0) * f64::from(self.pixels.0),
            (y - self.y.0) / (self.y.1 - self.y.0) * f64::from(self.pixels.1),
        )
    }

    fn from_pixels(self, (u, v): (f64, f64)) -> (f64, f64) {
        (
            self.x.0 + u / f64::from(self.pixels.0.max(1)) * (self.x.1 - self.x.0),
            self.y.0 + v / f64::from(self.pixels.1.max(1)) * (self.y.1 - self.y.0),
        )
    }
}

/// Splits a polyline into dashes of `on` pixels separated by gaps of `off` pixels.
fn dashes(points: &[(f64, f64)], frame: Frame, on: f64, off: f64) -> Vec<Vec<(f64, f64)>> {
    let lerp =
        |a: (f64, f64), b: (f64, f64), t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut drawing = true;
    let mut left = on;
    for pair in points.windows(2) {
        let a = frame.to_pixels(pair[0]);
        let b = frame.to_pixels(pair[1]);
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        let mut pos = 0.0;
        while pos < length {
            let step = left.min(length - pos);
            if drawing {
                if current.is_empty() {
                    current.push(frame.from_pixels(lerp(a, b, pos / length)));
                }
                current.push(frame.from_pixels(lerp(a, b, (pos + step) / length)));
            }
            pos += step;
            left -= step;
            if left <= 0.0 {
                if drawing {
                    segments.push(std::mem::take(&mut current));
                }
                drawing = !drawing;
                left = if drawing { on } else { off };
            }
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }
    segments
}

fn extent(primitive: &Primitive, options: &DrawOptions) -> Option<((f64, f64), (f64, f64))> {
    match primitive {
        Primitive::Function1D(f) => {
            let y = span(f.points().into_iter().map(|(_, y)| (y, y)))?;
            Some((f.range(), y))
        }
        Primitive::Graph(g) => Some((g.extent(Coord::X)?, g.extent(Coord::Y)?)),
        Primitive::Histogram1D(h) => {
            let with_errors = options.errors && !options.hist;
            let y = span((1..=h.nbins()).map(|bin| {
                let c = h.bin_content(bin);
                let e = if with_errors { h.bin_error(bin) } else { 0.0 };
                (c - e, c + e)
            }))?;
            Some(((h.x_axis.min(), h.x_axis.max()), (y.0.min(0.0), y.1)))
        }
        Primitive::Profile(p) => {
            let y = span(
                (1..=p.x_axis.nbins())
                    .filter(|&bin| p.bin_entries(bin) != 0.0)
                    .map(|bin| {
                        let (c, e) = (p.bin_content(bin), p.bin_error(bin));
                        (c - e, c + e)
                    }),
            )?;
            Some(((p.x_axis.min(), p.x_axis.max()), y))
        }
        Primitive::Histogram2D(h) => Some((
            (h.x_axis.min(), h.x_axis.max()),
            (h.y_axis.min(), h.y_axis.max()),
        )),
        _ => None,
    }
}

/// Draws everything in `pad` onto `area`.
pub(crate) fn draw_pad<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    pad: &Pad,
    style: &Style,
) -> Result<()> {
    let items = pad.items();
    if let Some((first, options)) = items.iter().find(|(p, _)| p.titles().is_some()) {
        let three_d = match first {
            Primitive::Function2D(_) | Primitive::Graph2D(_) => true,
            Primitive::Histogram2D(_) => options.is_3d(),
            _ => false,
        };
        if three_d {
            draw_3d(area, items, first, style)?;
        } else {
            draw_2d(area, items, first, style, pad.grid() || style.grid)?;
        }
    }
    for (primitive, _) in items {
        if let Primitive::Legend(legend) = primitive {
            draw_legend(area, legend)?;
        }
    }
    draw_boxes(area, items, style)
}

fn draw_2d<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(Primitive, DrawOptions)],
    first: &Primitive,
    style: &Style,
    grid: bool,
) -> Result<()> {
    let (x, y) = items
        .iter()
        .filter_map(|(p, o)| extent(p, o))
        .reduce(|a, b| (union(a.0, b.0), union(a.1, b.1)))
        .unwrap_or(((0.0, 1.0), (0.0, 1.0)));
    let (x, y) = (padded(x), padded(y));
    let (title, x_title, y_title) = first.titles().unwrap_or(("", "", ""));

    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(40).y_label_area_size(55);
    if style.opt_title && !title.is_empty() {
        builder.caption(latex::to_plain(title), (FONT, 18));
    }
    let mut chart = builder.build_cartesian_2d(x.0..x.1, y.0..y.1)?;
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(latex::to_plain(x_title))
            .y_desc(latex::to_plain(y_title))
            .x_labels(8)
            .y_labels(8);
        if !grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }
    let frame = Frame {
        x,
        y,
        pixels: chart.plotting_area().dim_in_pixel(),
    };

    for (primitive, options) in items {
        match primitive {
            Primitive::Function1D(f) => draw_curve(&mut chart, &f.points(), &f.style, frame)?,
            Primitive::Graph(g) => draw_graph(&mut chart, g, options, frame)?,
            Primitive::Histogram1D(h) => draw_histogram(&mut chart, h, options)?,
            Primitive::Profile(p) => draw_profile(&mut chart, p)?,
            Primitive::Histogram2D(h) => draw_map(&mut chart, h, options, style.palette)?,
            Primitive::Arrow(a) => draw_arrow(&mut chart, a, frame)?,
            Primitive::Latex(t) => draw_latex(&mut chart, t)?,
            Primitive::Function2D(_) | Primitive::Graph2D(_) | Primitive::Legend(_) => {}
        }
    }
    Ok(())
}

fn draw_curve<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    points: &[(f64, f64)],
    style: &DrawStyle,
    frame: Frame,
) -> Result<()> {
    let shape = line_shape(style);
    let (on, off) = match style.line_style {
        LineStyle::Solid => {
            chart.draw_series(LineSeries::new(points.iter().copied(), shape))?;
            return Ok(());
        }
        LineStyle::Dashed => (8.0, 5.0),
        LineStyle::Dotted => (2.0, 4.0),
    };
    chart.draw_series(
        dashes(points, frame, on, off)
            .into_iter()
            .map(|segment| PathElement::new(segment, shape)),
    )?;
    Ok(())
}

fn draw_markers<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    points: &[(f64, f64)],
    style: &DrawStyle,
) -> Result<()> {
    let color = style.marker_color.rgb();
    let size = style.marker_size;
    let points = points.iter().copied();
    match style.marker_style {
        MarkerStyle::FullCircle => {
            chart.draw_series(points.map(|p| Circle::new(p, size, color.filled())))?;
        }
        MarkerStyle::OpenCircle => {
            chart.draw_series(points.map(|p| Circle::new(p, size, color.stroke_width(1))))?;
        }
        MarkerStyle::FullTriangle => {
            chart.draw_series(points.map(|p| TriangleMarker::new(p, size, color.filled())))?;
        }
        MarkerStyle::Cross => {
            chart.draw_series(points.map(|p| Cross::new(p, size, color.stroke_width(1))))?;
        }
        MarkerStyle::Dot => {
            chart.draw_series(points.map(|p| Pixel::new(p, color.filled())))?;
        }
    }
    Ok(())
}

fn draw_graph<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    graph: &GraphErrors,
    options: &DrawOptions,
    frame: Frame,
) -> Result<()> {
    let points: Vec<(f64, f64)> =
        graph.x().iter().copied().zip(graph.y().iter().copied()).collect();
    if options.band {
        let upper = points.iter().zip(graph.ey()).map(|(&(x, y), &e)| (x, y + e));
        let lower = points.iter().zip(graph.ey()).rev().map(|(&(x, y), &e)| (x, y - e));
        let outline: Vec<(f64, f64)> = upper.chain(lower).collect();
        let fill = graph.style.fill_color.unwrap_or(graph.style.line_color).rgb();
        chart.draw_series(std::iter::once(Polygon::new(outline, fill.filled())))?;
    }
    if options.line {
        draw_curve(chart, &points, &graph.style, frame)?;
    }
    let plain = !options.band && !options.line && !options.points;
    if options.errors || plain {
        let shape = line_shape(&graph.style);
        chart.draw_series(
            points
                .iter()
                .zip(graph.ey())
                .filter(|(_, e)| **e > 0.0)
                .map(|(&(x, y), &e)| ErrorBar::new_vertical(x, y - e, y, y + e, shape, 6)),
        )?;
        chart.draw_series(
            points
                .iter()
                .zip(graph.ex())
                .filter(|(_, e)| **e > 0.0)
                .map(|(&(x, y), &e)| ErrorBar::new_horizontal(y, x - e, x, x + e, shape, 6)),
        )?;
    }
    if options.points || plain {
        draw_markers(chart, &points, &graph.style)?;
    }
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    hist: &Histogram1D,
    options: &DrawOptions,
) -> Result<()> {
    let shape = line_shape(&hist.style);
    let axis = &hist.x_axis;
    let bins = 1..=hist.nbins();
    if options.errors && !options.hist {
        let centers: Vec<(f64, f64)> = bins
            .clone()
            .map(|bin| (axis.bin_center(bin), hist.bin_content(bin)))
            .collect();
        chart.draw_series(bins.clone().map(|bin| {
            let (x, c) = (axis.bin_center(bin), hist.bin_content(bin));
            let e = hist.bin_error(bin);
            ErrorBar::new_vertical(x, c - e, c, c + e, shape, 0)
        }))?;
        chart.draw_series(bins.map(|bin| {
            let c = hist.bin_content(bin);
            ErrorBar::new_horizontal(
                c,
                axis.bin_low_edge(bin),
                axis.bin_center(bin),
                axis.bin_low_edge(bin + 1),
                shape,
                0,
            )
        }))?;
        if options.points {
            draw_markers(chart, &centers, &hist.style)?;
        }
        return Ok(());
    }

    let mut outline = Vec::with_capacity(2 * hist.nbins() + 2);
    outline.push((axis.min(), 0.0));
    for bin in bins {
        let c = hist.bin_content(bin);
        outline.push((axis.bin_low_edge(bin), c));
        outline.push((axis.bin_low_edge(bin + 1), c));
    }
    outline.push((axis.max(), 0.0));
    if let Some(fill) = hist.style.fill_color {
        chart.draw_series(std::iter::once(Polygon::new(outline.clone(), fill.rgb().filled())))?;
    }
    chart.draw_series(std::iter::once(PathElement::new(outline, shape)))?;
    Ok(())
}

fn draw_profile<DB: DrawingBackend>(chart: &mut Chart2d<'_, DB>, profile: &Profile) -> Result<()> {
    let shape = line_shape(&profile.style);
    let filled: Vec<usize> = (1..=profile.x_axis.nbins())
        .filter(|&bin| profile.bin_entries(bin) != 0.0)
        .collect();
    chart.draw_series(filled.iter().map(|&bin| {
        let x = profile.x_axis.bin_center(bin);
        let (c, e) = (profile.bin_content(bin), profile.bin_error(bin));
        ErrorBar::new_vertical(x, c - e, c, c + e, shape, 4)
    }))?;
    let points: Vec<(f64, f64)> = filled
        .iter()
        .map(|&bin| (profile.x_axis.bin_center(bin), profile.bin_content(bin)))
        .collect();
    draw_markers(chart, &points, &profile.style)
}

/// Colour-coded cells of a 2D histogram; contour views quantise the colours into bands.
fn draw_map<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    hist: &Histogram2D,
    options: &DrawOptions,
    palette: Palette,
) -> Result<()> {
    let max = hist.maximum();
    if max <= 0.0 {
        return Ok(());
    }
    let (xa, ya) = (&hist.x_axis, &hist.y_axis);
    let cells = (1..=ya.nbins()).flat_map(|iy| (1..=xa.nbins()).map(move |ix| (ix, iy)));
    chart.draw_series(cells.filter_map(|(ix, iy)| {
        let c = hist.bin_content(ix, iy);
        if c <= 0.0 {
            return None;
        }
        let mut t = c / max;
        if options.cont {
            t = (t * CONTOUR_LEVELS).floor() / CONTOUR_LEVELS;
            if t <= 0.0 {
                return None;
            }
        }
        Some(Rectangle::new(
            [
                (xa.bin_low_edge(ix), ya.bin_low_edge(iy)),
                (xa.bin_low_edge(ix + 1), ya.bin_low_edge(iy + 1)),
            ],
            palette.color_at(t).rgb().filled(),
        ))
    }))?;
    Ok(())
}

fn draw_arrow<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    arrow: &Arrow,
    frame: Frame,
) -> Result<()> {
    let shape = line_shape(&arrow.style);
    chart.draw_series(std::iter::once(PathElement::new(vec![arrow.from, arrow.to], shape)))?;

    let tail = frame.to_pixels(arrow.from);
    let tip = frame.to_pixels(arrow.to);
    let length = (tip.0 - tail.0).hypot(tip.1 - tail.1);
    if length == 0.0 {
        return Ok(());
    }
    let dir = ((tip.0 - tail.0) / length, (tip.1 - tail.1) / length);
    let head = arrow.head_size * f64::from(frame.pixels.1);
    let half = head * 0.577;
    let base = (tip.0 - dir.0 * head, tip.1 - dir.1 * head);
    let left = frame.from_pixels((base.0 - dir.1 * half, base.1 + dir.0 * half));
    let right = frame.from_pixels((base.0 + dir.1 * half, base.1 - dir.0 * half));
    if arrow.filled {
        chart.draw_series(std::iter::once(Polygon::new(
            vec![arrow.to, left, right],
            arrow.style.line_color.rgb().filled(),
        )))?;
    } else {
        chart.draw_series(std::iter::once(PathElement::new(vec![left, arrow.to, right], shape)))?;
    }
    Ok(())
}

fn draw_latex<DB: DrawingBackend>(chart: &mut Chart2d<'_, DB>, text: &Latex) -> Result<()> {
    let lines = latex::to_lines(&text.text);
    let line_height = px(f64::from(text.size) * 1.2);
    let n = i32::try_from(lines.len()).unwrap_or(i32::MAX);
    let color = text.color.rgb();
    for (i, line) in (0..).zip(lines) {
        // The anchor is the bottom left corner of the last line.
        let offset = (i - n) * line_height;
        chart.draw_series(std::iter::once(
            EmptyElement::at(text.at)
                + Text::new(
                    line,
                    (0, offset),
                    (FONT, f64::from(text.size)).into_font().color(&color),
                ),
        ))?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn draw_3d<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(Primitive, DrawOptions)],
    first: &Primitive,
    style: &Style,
) -> Result<()> {
    let ((x, y), z) = match first {
        Primitive::Function2D(f) => {
            let (x0, x1, y0, y1) = f.range();
            let (_, _, zs) = f.grid();
            let z = span(zs.into_iter().map(|z| (z, z))).unwrap_or((0.0, 1.0));
            (((x0, x1), (y0, y1)), z)
        }
        Primitive::Histogram2D(h) => (
            (
                (h.x_axis.min(), h.x_axis.max()),
                (h.y_axis.min(), h.y_axis.max()),
            ),
            (0.0, h.maximum().max(0.0)),
        ),
        Primitive::Graph2D(g) => (graph_extent(g).unwrap_or(((0.0, 1.0), (0.0, 1.0))), (0.0, 1.0)),
        _ => (((0.0, 1.0), (0.0, 1.0)), (0.0, 1.0)),
    };
    let z = items
        .iter()
        .filter_map(|(p, _)| match p {
            Primitive::Graph2D(g) => {
                span((0..g.len()).filter_map(|i| g.point(i)).map(|(_, _, z)| (z, z)))
            }
            _ => None,
        })
        .fold(z, union);
    let z = padded(z);
    let title = first.titles().map_or("", |(title, _, _)| title);

    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.opt_title && !title.is_empty() {
        builder.caption(latex::to_plain(title), (FONT, 18));
    }
    let mut chart = builder.build_cartesian_3d(x.0..x.1, z.0..z.1, y.0..y.1)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.7;
        pb.pitch = 0.4;
        pb.scale = 0.75;
        pb.into_matrix()
    });
    chart.configure_axes().draw()?;

    let palette = style.palette;
    let colorize =
        move |v: &f64| palette.color_at((v - z.0) / (z.1 - z.0)).rgb().mix(0.85).filled();
    for (primitive, options) in items {
        match primitive {
            Primitive::Function2D(f) => {
                chart.draw_series(
                    SurfaceSeries::xoz(
                        linspace(x.0, x.1, f.npx).into_iter(),
                        linspace(y.0, y.1, f.npy).into_iter(),
                        |u, v| surface_value(f, u, v),
                    )
                    .style_func(&colorize),
                )?;
            }
            Primitive::Histogram2D(h) if options.lego => {
                let (xa, ya) = (&h.x_axis, &h.y_axis);
                let cells = (1..=ya.nbins())
                    .flat_map(|iy| (1..=xa.nbins()).map(move |ix| (ix, iy)))
                    .filter(|&(ix, iy)| h.bin_content(ix, iy) > 0.0);
                chart.draw_series(cells.map(|(ix, iy)| {
                    let c = h.bin_content(ix, iy);
                    Cubiod::new(
                        [
                            (xa.bin_low_edge(ix), 0.0, ya.bin_low_edge(iy)),
                            (xa.bin_low_edge(ix + 1), c, ya.bin_low_edge(iy + 1)),
                        ],
                        colorize(&c),
                        &BLACK,
                    )
                }))?;
            }
            Primitive::Histogram2D(h) => {
                let xs = (1..=h.x_axis.nbins()).map(|ix| h.x_axis.bin_center(ix));
                let ys = (1..=h.y_axis.nbins()).map(|iy| h.y_axis.bin_center(iy));
                chart.draw_series(
                    SurfaceSeries::xoz(xs, ys, |u, v| {
                        h.bin_content(h.x_axis.find_bin(u), h.y_axis.find_bin(v))
                    })
                    .style_func(&colorize),
                )?;
            }
            Primitive::Graph2D(g) => {
                let color = g.style.marker_color.rgb();
                let size = g.style.marker_size;
                chart.draw_series(
                    (0..g.len())
                        .filter_map(|i| g.point(i))
                        .map(|(gx, gy, gz)| Circle::new((gx, gz, gy), size, color.filled())),
                )?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Removable singularities such as `sin(x)/x` at 0 are evaluated next to the point.
fn surface_value(f: &Function2D, x: f64, y: f64) -> f64 {
    [f.eval(x, y), f.eval(x + 1e-9, y + 1e-9)]
        .into_iter()
        .find(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn graph_extent(g: &Graph2DErrors) -> Option<((f64, f64), (f64, f64))> {
    let points: Vec<(f64, f64, f64)> = (0..g.len()).filter_map(|i| g.point(i)).collect();
    let x = span(points.iter().map(|p| (p.0, p.0)))?;
    let y = span(points.iter().map(|p| (p.1, p.1)))?;
    Some((x, y))
}

#[allow(clippy::cast_precision_loss)]
fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, legend: &Legend) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (f64::from(w), f64::from(h));
    let (x0, x1) = (px(legend.low.0 * w), px(legend.high.0 * w));
    let (top, bottom) = (px((1.0 - legend.high.1) * h), px((1.0 - legend.low.1) * h));
    if let Some(fill) = legend.fill_color {
        area.draw(&Rectangle::new([(x0, top), (x1, bottom)], fill.rgb().filled()))?;
    }
    area.draw(&Rectangle::new([(x0, top), (x1, bottom)], BLACK.stroke_width(1)))?;

    let rows = legend.entries().len() + usize::from(!legend.header.is_empty());
    if rows == 0 {
        return Ok(());
    }
    let row_height = f64::from(bottom - top) / rows as f64;
    let font = (FONT, 14).into_font();
    let mut row = 0.0;
    let center = |row: &mut f64| {
        let y = f64::from(top) + row_height * (*row + 0.5);
        *row += 1.0;
        px(y)
    };
    if !legend.header.is_empty() {
        let y = center(&mut row);
        area.draw(&Text::new(latex::to_plain(&legend.header), (x0 + 6, y - 7), font.clone()))?;
    }
    for entry in legend.entries() {
        let y = center(&mut row);
        let sample = (x0 + 6, x0 + 30);
        if entry.options.fill {
            if let Some(fill) = entry.style.fill_color {
                area.draw(&Rectangle::new(
                    [(sample.0, y - 5), (sample.1, y + 5)],
                    fill.rgb().filled(),
                ))?;
            }
        }
        if entry.options.line {
            area.draw(&PathElement::new(
                vec![(sample.0, y), (sample.1, y)],
                line_shape(&entry.style),
            ))?;
        }
        if entry.options.marker {
            let color = entry.style.marker_color.rgb();
            area.draw(&Circle::new(
                ((sample.0 + sample.1) / 2, y),
                entry.style.marker_size,
                color.filled(),
            ))?;
        }
        area.draw(&Text::new(latex::to_plain(&entry.label), (x0 + 36, y - 7), font.clone()))?;
    }
    Ok(())
}

/// Lines of the statistics box of a 1D histogram, selected by the `opt_stat` digits.
pub(crate) fn stats_lines(hist: &Histogram1D, opt_stat: u32) -> Vec<String> {
    let digit = |position| Style::digit(opt_stat, position);
    let mut lines = Vec::new();
    if digit(0) != 0 {
        lines.push(hist.name.clone());
    }
    if digit(1) != 0 {
        lines.push(format!("Entries = {}", hist.entries()));
    }
    match digit(2) {
        0 => {}
        2 => lines.push(format!("Mean = {:.4} ± {:.4}", hist.mean(), hist.mean_error())),
        _ => lines.push(format!("Mean = {:.4}", hist.mean())),
    }
    match digit(3) {
        0 => {}
        2 => lines.push(format!(
            "Std Dev = {:.4} ± {:.4}",
            hist.std_dev(),
            hist.std_dev_error()
        )),
        _ => lines.push(format!("Std Dev = {:.4}", hist.std_dev())),
    }
    if digit(4) != 0 {
        lines.push(format!("Underflow = {}", hist.bin_content(0)));
    }
    if digit(5) != 0 {
        lines.push(format!("Overflow = {}", hist.bin_content(hist.nbins() + 1)));
    }
    if digit(6) != 0 {
        lines.push(format!("Integral = {}", hist.integral()));
    }
    if digit(7) != 0 {
        lines.push(format!("Skewness = {:.4}", hist.skewness()));
    }
    if digit(8) != 0 {
        lines.push(format!("Kurtosis = {:.4}", hist.kurtosis()));
    }
    lines
}

fn stats_lines_2d(hist: &Histogram2D, opt_stat: u32) -> Vec<String> {
    let digit = |position| Style::digit(opt_stat, position);
    let mut lines = Vec::new();
    if digit(0) != 0 {
        lines.push(hist.name.clone());
    }
    if digit(1) != 0 {
        lines.push(format!("Entries = {}", hist.entries()));
    }
    if digit(2) != 0 {
        lines.push(format!("Mean x = {:.4}", hist.mean(Coord::X)));
        lines.push(format!("Mean y = {:.4}", hist.mean(Coord::Y)));
    }
    if digit(6) != 0 {
        lines.push(format!("Integral = {}", hist.integral()));
    }
    lines
}

/// Lines of the fit box, selected by the `opt_fit` digits.
pub(crate) fn fit_lines(result: &FitResult, opt_fit: u32) -> Vec<String> {
    let digit = |position| Style::digit(opt_fit, position);
    let mut lines = Vec::new();
    if digit(2) != 0 {
        lines.push(format!("χ² / ndf = {:.4} / {}", result.chi2, result.ndf));
    }
    if digit(3) != 0 {
        lines.push(format!("Prob = {:.4}", result.probability));
    }
    if digit(0) != 0 {
        let rows = result.names.iter().zip(&result.parameters).zip(&result.errors);
        for ((name, value), error) in rows {
            if digit(1) == 0 {
                lines.push(format!("{name} = {value:.4}"));
            } else {
                lines.push(format!("{name} = {value:.4} ± {error:.4}"));
            }
        }
    }
    lines
}

fn fit_of(primitive: &Primitive) -> Option<&FitResult> {
    match primitive {
        Primitive::Graph(g) => g.fitted_function().and_then(|f| f.fit_result()),
        Primitive::Histogram1D(h) => h.fitted_function().and_then(|f| f.fit_result()),
        Primitive::Function1D(f) => f.fit_result(),
        Primitive::Function2D(f) => f.fit_result(),
        _ => None,
    }
}

/// Statistics and fit boxes in the top right corner of the pad.
fn draw_boxes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    items: &[(Primitive, DrawOptions)],
    style: &Style,
) -> Result<()> {
    let mut lines = Vec::new();
    if style.opt_stat != 0 {
        let stats = items.iter().find_map(|(p, o)| match p {
            Primitive::Histogram1D(h) if !o.same => Some(stats_lines(h, style.opt_stat)),
            Primitive::Histogram2D(h) if !o.same => Some(stats_lines_2d(h, style.opt_stat)),
            _ => None,
        });
        lines.extend(stats.unwrap_or_default());
    }
    if style.opt_fit != 0 {
        if let Some(result) = items.iter().find_map(|(p, _)| fit_of(p)) {
            lines.extend(fit_lines(result, style.opt_fit));
        }
    }
    if lines.is_empty() {
        return Ok(());
    }

    let (w, _) = area.dim_in_pixel();
    let right = i32::try_from(w).unwrap_or(i32::MAX) - 10;
    let left = right - 200;
    let top = 10;
    let line_height = 16;
    let bottom = top + 6 + line_height * i32::try_from(lines.len()).unwrap_or(i32::MAX / 32);
    area.draw(&Rectangle::new([(left, top), (right, bottom)], WHITE.filled()))?;
    area.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(1)))?;
    let font = (FONT, 13).into_font();
    for (i, line) in (0..).zip(lines) {
        area.draw(&Text::new(line, (left + 6, top + 4 + i * line_height), font.clone()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(padded((0.0, 10.0)), (0.0, 10.5));
        assert_eq!(padded((2.0, 2.0)), (1.0, 3.0));
        let (lo, hi) = padded((-10.0, 10.0));
        assert!(lo < -10.0 && hi > 10.0);
    }

    #[test]
    fn dashes_cover_the_line() {
        let frame = Frame {
            x: (0.0, 100.0),
            y: (0.0, 100.0),
            pixels: (100, 100),
        };
        let segments = dashes(&[(0.0, 0.0), (100.0, 0.0)], frame, 8.0, 5.0);
        // 100 px of 13 px periods: 7 full dashes and a 9 px remainder holding an 8 px dash.
        assert_eq!(segments.len(), 8);
        assert!(segments.iter().all(|s| s.len() >= 2));
    }

    #[test]
    fn stats_box_contents() {
        let mut h = Histogram1D::new("count_rate", "Count Rate", 16, -0.5, 15.5).unwrap();
        for x in [1.0, 2.0, 3.0, 40.0] {
            h.fill(x);
        }
        let lines = stats_lines(&h, 111_111);
        assert_eq!(lines[0], "count_rate");
        assert_eq!(lines[1], "Entries = 4");
        assert_eq!(lines[2], "Mean = 2.0000");
        assert!(lines[3].starts_with("Std Dev"));
        assert_eq!(lines[4], "Underflow = 0");
        assert_eq!(lines[5], "Overflow = 1");
        assert!(stats_lines(&h, 0).is_empty());
        assert!(stats_lines(&h, 200).last().unwrap().contains('±'));
    }

    #[test]
    fn fit_box_contents() {
        let result = FitResult {
            names: vec!["p0".into(), "p1".into()],
            parameters: vec![1.0, 2.0],
            errors: vec![0.1, 0.2],
            chi2: 3.0,
            ndf: 8,
            probability: 0.93,
            iterations: 4,
            converged: true,
            covariance_valid: true,
        };
        let lines = fit_lines(&result, 1111);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "χ² / ndf = 3.0000 / 8");
        assert_eq!(lines[2], "p0 = 1.0000 ± 0.1000");
        assert_eq!(fit_lines(&result, 1), vec!["p0 = 1.0000", "p1 = 2.0000"]);
    }
}
