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

//! Contains the [`Simulation`] struct, which repeats a simulated measurement and collects the
//! results.
//!
//! A measurement is described by implementing [`Sample`]: [`Sample::generate`] draws a new
//! measurement and [`Sample::evaluate`] reports it. The reported values are either handed to a
//! [`Fill`] sink such as a histogram, or gathered into a [`Distribution`].

use std::cmp;

use rand::SeedableRng;
use statrs::statistics::Statistics;

/// A simulated measurement.
pub trait Sample {
    /// What one measurement reports.
    type Value;

    /// Draws a new measurement.
    fn generate(&mut self, rng: &mut impl rand::Rng);

    /// Reports the measurement drawn by the last call to [`Sample::generate`].
    fn evaluate(&self) -> Self::Value;
}

/// A container that accumulates measured values.
pub trait Fill<V> {
    /// Adds one value.
    fn fill_value(&mut self, value: V);
}

impl<V> Fill<V> for Vec<V> {
    fn fill_value(&mut self, value: V) {
        self.push(value);
    }
}

/// A struct to keep track of the fraction of the values less then the test value.
struct CmlRatio {
    /// Number of smaller values
    left: usize,
    /// Total number of values
    total: usize,
}

impl CmlRatio {
    fn new() -> CmlRatio {
        CmlRatio { left: 0, total: 0 }
    }

    /// Updates the ratio. `ord` describes whether the new value is less, equal or greater than the
    /// test value.
    fn update(&mut self, ord: cmp::Ordering) {
        // Only the values that are strictly less increase the ratio.
        if let cmp::Ordering::Less = ord {
            self.left += 1;
        }
        self.total += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(&self) -> f64 {
        self.left as f64 / self.total as f64
    }
}

/// Repeats the measurement described by `S` a fixed number of times.
///
/// Every iteration calls [`Sample::generate`] followed by [`Sample::evaluate`]. The random
/// generator is owned by the simulation, so a simulation built with [`Simulation::with_seed`]
/// always produces the same values.
pub struct Simulation<S> {
    /// Number of measurements performed by [`Simulation::fill`] and the other runners.
    pub iterations: usize,
    sample: S,
    /// The random generator used by `sample.generate`
    rng: rand::rngs::StdRng,
}

impl<S: Sample> Simulation<S> {
    fn simulate_iteration(&mut self) -> S::Value {
        self.sample.generate(&mut self.rng);
        self.sample.evaluate()
    }

    /// Performs `self.iterations` measurements and adds each reported value to `sink`.
    ///
    /// Can be called repeatedly; the random stream continues where the previous call stopped.
    pub fn fill<F: Fill<S::Value>>(&mut self, sink: &mut F) {
        for _ in 0..self.iterations {
            let value = self.simulate_iteration();
            sink.fill_value(value);
        }
        tracing::debug!(iterations = self.iterations, "simulation filled");
    }

    /// Runs the simulation and returns the fraction of measurements strictly less than
    /// `test_statistic`.
    pub fn simulate_pvalue(mut self, test_statistic: f64) -> f64
    where
        S::Value: Into<f64>,
    {
        let mut ratio = CmlRatio::new();
        for _ in 0..self.iterations {
            let statistic: f64 = self.simulate_iteration().into();
            ratio.update(statistic.total_cmp(&test_statistic));
        }
        ratio.ratio()
    }

    /// Runs the simulation and keeps every measured value.
    ///
    /// # Memory usage
    /// Use `self.simulate_pvalue(x)` instead of `self.simulate().pvalue(x)` to avoid storing the
    /// values.
    pub fn simulate(mut self) -> Distribution
    where
        S::Value: Into<f64>,
    {
        let full_distribution: Vec<f64> = (0..self.iterations)
            .map(|_| self.simulate_iteration().into())
            .collect();
        Distribution::new(full_distribution)
    }
}

impl<S> Simulation<S> {
    /// The default value of `self.iterations`
    pub const DEFAULT_ITERATIONS: usize = 1000;

    /// Constructs a reproducible simulation.
    pub fn with_seed(sample: S, seed: u64) -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            sample,
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// Sets `self.iterations`.
    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// The values measured by a [`Simulation`], in increasing order.
pub struct Distribution {
    distr: Vec<f64>, // distr should be sorted.
}

impl Distribution {
    fn new(mut distr: Vec<f64>) -> Self {
        distr.sort_by(f64::total_cmp);
        Self { distr }
    }

    /// Number of measured values.
    #[must_use]
    pub fn count(&self) -> usize {
        self.distr.len()
    }

    /// Returns the fraction of values not greater than `test_statistic`.
    #[must_use]
    pub fn pvalue(&self, test_statistic: f64) -> f64 {
        let index = self.distr.partition_point(|x| *x <= test_statistic);
        #[allow(clippy::cast_precision_loss)]
        return index as f64 / self.count() as f64;
    }

    /// Returns the `alpha` quantile of the values, or `None` when nothing was measured.
    #[must_use]
    pub fn quantile_of(&self, alpha: f64) -> Option<f64> {
        if self.distr.is_empty() {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index: usize = (self.count() as f64 * alpha.clamp(0.0, 1.0)) as usize;
        self.distr.get(index.min(self.count() - 1)).copied()
    }

    /// Returns the mean of the values.
    #[must_use]
    pub fn mean(&self) -> f64 {
        Statistics::mean(&self.distr)
    }

    /// Returns the unbiased standard deviation of the values.
    #[must_use]
    pub fn stdev(&self) -> f64 {
        Statistics::std_dev(&self.distr)
    }
}
