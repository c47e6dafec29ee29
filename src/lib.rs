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

//! Small lessons in histogramming, fitting and plotting.
//!
//! Primer contains just enough of a data-analysis toolkit to teach with: parametric functions,
//! graphs with errors, 1D and 2D histograms, a least-squares fitter and canvases that are
//! rendered to SVG or PNG. The [`lessons`] module uses them to build seven short programs, each
//! of which is also a subcommand of the `primer` binary.
//!
//! # Examples
//!
//! Datasets are generated by implementing [`Sample`] and letting a [`Simulation`] repeat it. Here
//! the counts of a detector are drawn from a Poisson distribution and collected in a histogram
//! with one bin per count:
//! ```
//! use rand::distributions::Distribution;
//! use rand::Rng;
//! use rand_distr::Poisson;
//! use primer::hist::Histogram1D;
//! use primer::simulation::{Sample, Simulation};
//!
//! struct Counter {
//!     // The distribution of the number of counts in one reading.
//!     distr: Poisson<f64>,
//!     // The last reading
//!     counts: f64,
//! }
//!
//! impl Sample for Counter {
//!     type Value = f64;
//!
//!     fn generate(&mut self, rng: &mut impl Rng) {
//!         self.counts = self.distr.sample(rng);
//!     }
//!
//!     fn evaluate(&self) -> f64 {
//!         self.counts
//!     }
//! }
//!
//! let counter = Counter {
//!     distr: Poisson::new(3.6).unwrap(),
//!     counts: 0.0,
//! };
//! let mut hist = Histogram1D::new("counts", "Counts;N;occurrences", 16, -0.5, 15.5).unwrap();
//! Simulation::with_seed(counter, 42).iterations(400).fill(&mut hist);
//!
//! // Every reading lands in some bin, the flow bins included.
//! assert_eq!(hist.entries(), 400.0);
//! println!("mean = {:.2} +- {:.2}", hist.mean(), hist.mean_error());
//! ```
//!
//! Fitting writes the parameters back into the function:
//! ```
//! use primer::function::Function1D;
//! use primer::graph::GraphErrors;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [2.1, 3.9, 6.2, 7.8];
//! let mut graph = GraphErrors::new(&x, &y, None, Some(&[0.2; 4][..])).unwrap();
//! let mut line = Function1D::new("line", "[0]+x*[1]", 0.0, 5.0).unwrap();
//! let result = graph.fit(&mut line).unwrap();
//!
//! assert_eq!(result.ndf, 2);
//! assert!((line.parameter(1) - 1.93).abs() < 0.1);
//! ```
#![deny(clippy::pedantic)]
#![deny(missing_docs)]

pub mod error;
pub mod fit;
pub mod formula;
pub mod function;
pub mod graph;
pub mod hist;
pub mod hist2d;
pub mod lessons;
pub mod random;
pub mod render;
pub mod simulation;

pub use error::{Error, Result};
pub use simulation::{Sample, Simulation};
