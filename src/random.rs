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

//! A seeded source of pseudo-random numbers with the handful of distributions the lessons draw
//! from.

use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, Normal, Poisson};

use crate::error::{Error, Result};

/// Pseudo-random generator used for every sampled dataset.
///
/// Two instances constructed with [`Random::new`] from the same seed produce the same stream, so
/// a lesson run with a fixed seed reproduces its output data exactly.
#[derive(Debug, Clone)]
pub struct Random {
    rng: rand::rngs::StdRng,
}

impl Random {
    /// Seed used when none is given on the command line.
    pub const DEFAULT_SEED: u64 = 4357;

    /// Constructs a reproducible generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// Gives access to the underlying generator, e.g. for [`crate::simulation::Simulation`].
    pub fn rng(&mut self) -> &mut rand::rngs::StdRng {
        &mut self.rng
    }

    /// A value uniformly distributed in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    /// A value uniformly distributed in `[a, b)`. The bounds may be given in either order.
    pub fn uniform_range(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.uniform()
    }

    /// A value from a normal distribution.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `sigma` is negative or not finite.
    pub fn gaus(&mut self, mean: f64, sigma: f64) -> Result<f64> {
        let distr = Normal::new(mean, sigma)
            .map_err(|e| Error::InvalidParameter(format!("gaus({mean}, {sigma}): {e}")))?;
        Ok(distr.sample(&mut self.rng))
    }

    /// A value from an exponential distribution with mean `tau`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] unless `tau` is positive.
    pub fn exp(&mut self, tau: f64) -> Result<f64> {
        if tau <= 0.0 || !tau.is_finite() {
            return Err(Error::InvalidParameter(format!("exp({tau}): tau must be positive")));
        }
        let distr = Exp::new(1.0 / tau)
            .map_err(|e| Error::InvalidParameter(format!("exp({tau}): {e}")))?;
        Ok(distr.sample(&mut self.rng))
    }

    /// A count from a Poisson distribution. A mean of zero always gives zero.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `mean` is negative or not finite.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn poisson(&mut self, mean: f64) -> Result<u64> {
        if mean == 0.0 {
            return Ok(0);
        }
        let distr = Poisson::new(mean)
            .map_err(|e| Error::InvalidParameter(format!("poisson({mean}): {e}")))?;
        let value: f64 = distr.sample(&mut self.rng);
        Ok(value as u64)
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Random::new(17);
        let mut b = Random::new(17);
        for _ in 0..100 {
            assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
            assert_eq!(a.poisson(3.6).unwrap(), b.poisson(3.6).unwrap());
        }
    }

    #[test]
    fn uniform_range_stays_inside() {
        let mut r = Random::new(1);
        for _ in 0..1000 {
            let v = r.uniform_range(-0.3, 0.3);
            assert!((-0.3..0.3).contains(&v));
        }
    }

    #[test]
    fn exp_mean_is_tau() {
        let mut r = Random::new(2);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| r.exp(4.0).unwrap()).sum();
        let mean = sum / f64::from(n);
        assert!((mean - 4.0).abs() < 0.15, "mean = {mean}");
    }

    #[test]
    fn invalid_parameters_are_errors() {
        let mut r = Random::new(3);
        assert!(r.exp(0.0).is_err());
        assert!(r.gaus(0.0, -1.0).is_err());
        assert!(r.poisson(-2.0).is_err());
        assert_eq!(r.poisson(0.0).unwrap(), 0);
    }
}
