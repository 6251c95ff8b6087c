use crate::core::attributes::{AttributeSchema, AttributeSpec};
use crate::core::example::{AttributeValue, Example};
use crate::streams::generators::sea::SeaFunction;
use crate::streams::stream::ExampleStream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// SEA concept generator: three numeric attributes in `[0, 10)`, class 0 iff
/// `attrib1 + attrib2 <= threshold`. The third attribute is noise by
/// construction. Supports label noise, class balancing, and an optional
/// concept switch after a fixed number of examples for drift experiments.
#[derive(Debug)]
pub struct SeaGenerator {
    seed: u64,
    rng: StdRng,
    threshold: f64,
    balance_classes: bool,
    next_class_should_be_zero: bool,
    noise_percentage: u32,
    schema: Arc<AttributeSchema>,
    max_examples: Option<usize>,
    produced: usize,
    drift: Option<(usize, SeaFunction)>,
}

impl SeaGenerator {
    pub fn new(
        function: SeaFunction,
        balance: bool,
        noise_percentage: u32,
        max_examples: Option<usize>,
        seed: u64,
    ) -> Result<Self, Error> {
        if noise_percentage > 100 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Noise percentage must be in [0, 100]",
            ));
        }

        let schema = Arc::new(
            AttributeSchema::new(
                "SEA",
                vec![
                    AttributeSpec::continuous("attrib1"),
                    AttributeSpec::continuous("attrib2"),
                    AttributeSpec::continuous("attrib3"),
                    AttributeSpec::discrete("class", ["groupA", "groupB"]),
                ],
            )
            .expect("SEA schema is well formed"),
        );

        Ok(Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            threshold: function.threshold(),
            balance_classes: balance,
            next_class_should_be_zero: false,
            noise_percentage,
            schema,
            max_examples,
            produced: 0,
            drift: None,
        })
    }

    /// Switches to `function`'s concept once `after` examples were produced.
    pub fn with_drift(mut self, after: usize, function: SeaFunction) -> Self {
        self.drift = Some((after, function));
        self
    }

    #[inline]
    fn gen_attr(&mut self) -> f64 {
        self.rng.random_range(0.0..10.0)
    }

    #[inline]
    fn current_threshold(&self) -> f64 {
        match self.drift {
            Some((after, function)) if self.produced >= after => function.threshold(),
            _ => self.threshold,
        }
    }

    #[inline]
    fn determine_class(&self, a1: f64, a2: f64) -> usize {
        usize::from(a1 + a2 > self.current_threshold())
    }

    #[inline]
    fn maybe_flip_with_noise(&mut self, cls: usize) -> usize {
        let roll: u32 = self.rng.random_range(1..=100);
        if roll <= self.noise_percentage { 1 - cls } else { cls }
    }
}

impl ExampleStream for SeaGenerator {
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

        let (a1, a2, a3, mut cls) = loop {
            let a1 = self.gen_attr();
            let a2 = self.gen_attr();
            let a3 = self.gen_attr();

            let g = self.determine_class(a1, a2);

            if !self.balance_classes {
                break (a1, a2, a3, g);
            }
            let want_zero = self.next_class_should_be_zero;
            if (want_zero && g == 0) || (!want_zero && g == 1) {
                self.next_class_should_be_zero = !self.next_class_should_be_zero;
                break (a1, a2, a3, g);
            }
        };

        cls = self.maybe_flip_with_noise(cls);

        self.produced += 1;
        Some(Example::labeled(
            vec![
                AttributeValue::Numeric(a1),
                AttributeValue::Numeric(a2),
                AttributeValue::Numeric(a3),
            ],
            cls,
        ))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.produced = 0;
        self.next_class_should_be_zero = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_shape_matches_sea() {
        let generator = SeaGenerator::new(SeaFunction::F1, false, 0, Some(1), 42).unwrap();
        let schema = generator.schema();
        assert_eq!(schema.entries().len(), 4);
        assert_eq!(schema.target().name(), "class");
        assert_eq!(schema.n_classes(), 2);
        assert_eq!(schema.entry(0).unwrap().name(), "attrib1");
        assert!(!schema.entry(0).unwrap().is_discrete());
    }

    #[test]
    fn class_rule_matches_threshold_without_noise() {
        let threshold = SeaFunction::F1.threshold();
        let mut generator = SeaGenerator::new(SeaFunction::F1, false, 0, Some(500), 123).unwrap();
        for _ in 0..200 {
            let example = generator.next_example().unwrap();
            let a1 = example.value_at(0).unwrap().as_numeric().unwrap();
            let a2 = example.value_at(1).unwrap().as_numeric().unwrap();
            let expected = usize::from(a1 + a2 > threshold);
            assert_eq!(example.label(), Some(expected));
        }
    }

    #[test]
    fn respects_max_examples() {
        let mut generator = SeaGenerator::new(SeaFunction::F2, false, 0, Some(3), 7).unwrap();
        assert!(generator.next_example().is_some());
        assert!(generator.next_example().is_some());
        assert!(generator.next_example().is_some());
        assert!(generator.next_example().is_none());
        assert!(!generator.has_more_examples());
    }

    #[test]
    fn restart_replays_the_same_sequence() {
        let mut generator = SeaGenerator::new(SeaFunction::F3, false, 10, None, 99).unwrap();
        let first: Vec<Example> = (0..20).map(|_| generator.next_example().unwrap()).collect();
        generator.restart().unwrap();
        let second: Vec<Example> = (0..20).map(|_| generator.next_example().unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn balancing_alternates_classes() {
        let mut generator = SeaGenerator::new(SeaFunction::F1, true, 0, None, 5).unwrap();
        let labels: Vec<usize> = (0..10)
            .map(|_| generator.next_example().unwrap().label().unwrap())
            .collect();
        assert_eq!(labels, vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn drift_switches_the_concept() {
        let mut generator = SeaGenerator::new(SeaFunction::F1, false, 0, None, 11)
            .unwrap()
            .with_drift(100, SeaFunction::F4);
        for _ in 0..100 {
            generator.next_example();
        }
        let threshold = SeaFunction::F4.threshold();
        for _ in 0..100 {
            let example = generator.next_example().unwrap();
            let a1 = example.value_at(0).unwrap().as_numeric().unwrap();
            let a2 = example.value_at(1).unwrap().as_numeric().unwrap();
            assert_eq!(example.label(), Some(usize::from(a1 + a2 > threshold)));
        }
    }
}
