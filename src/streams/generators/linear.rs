use crate::core::attributes::{AttributeSchema, AttributeSpec};
use crate::core::example::{AttributeValue, Example};
use crate::streams::stream::ExampleStream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// Regression generator: `y = slope * x + intercept + N(0, sigma)` with `x`
/// uniform over a configurable range.
#[derive(Debug)]
pub struct LinearGenerator {
    seed: u64,
    rng: StdRng,
    slope: f64,
    intercept: f64,
    noise_sigma: f64,
    x_min: f64,
    x_max: f64,
    schema: Arc<AttributeSchema>,
    max_examples: Option<usize>,
    produced: usize,
}

impl LinearGenerator {
    pub fn new(
        slope: f64,
        intercept: f64,
        noise_sigma: f64,
        x_range: (f64, f64),
        max_examples: Option<usize>,
        seed: u64,
    ) -> Result<Self, Error> {
        if !(x_range.0 < x_range.1) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "x range must be non-empty",
            ));
        }
        if noise_sigma < 0.0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "noise sigma must be non-negative",
            ));
        }

        let schema = Arc::new(
            AttributeSchema::new(
                "linear",
                vec![
                    AttributeSpec::continuous("x"),
                    AttributeSpec::continuous("y"),
                ],
            )
            .expect("linear schema is well formed"),
        );

        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            slope,
            intercept,
            noise_sigma,
            x_min: x_range.0,
            x_max: x_range.1,
            schema,
            max_examples,
            produced: 0,
        })
    }

    /// Standard normal sample via Box-Muller.
    fn standard_normal(&mut self) -> f64 {
        let u1: f64 = self.rng.random_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.random_range(0.0..1.0);
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl ExampleStream for LinearGenerator {
    fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    fn has_more_examples(&self) -> bool {
        self.max_examples.is_none_or(|max| self.produced < max)
    }

    fn next_example(&mut self) -> Option<Example> {
        if !self.has_more_examples() {
            return None;
        }
        let x = self.rng.random_range(self.x_min..self.x_max);
        let y = self.slope * x + self.intercept + self.noise_sigma * self.standard_normal();
        self.produced += 1;
        Some(Example::valued(vec![AttributeValue::Numeric(x)], y))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        Ok(())
    }
}
