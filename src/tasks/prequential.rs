use crate::evaluation::{LearningCurve, PerformanceEvaluator, Snapshot};
use crate::learners::Learner;
use crate::learners::adaptive_tree::TreeError;
use crate::streams::ExampleStream;
use crate::utils::system::current_rss_gb;
use std::time::Instant;

/// Prequential (test-then-train) runner: every example is first used to
/// score the learner, then to train it. Periodically snapshots the
/// evaluator's metrics into a learning curve and accounts RAM-hours.
pub struct PrequentialRunner {
    learner: Box<dyn Learner>,
    stream: Box<dyn ExampleStream>,
    evaluator: Box<dyn PerformanceEvaluator>,

    curve: LearningCurve,

    max_examples: Option<u64>,
    max_seconds: Option<u64>,
    sample_frequency: u64,
    mem_check_frequency: u64,

    processed: u64,
    start_time: Instant,
    last_mem_sample: Instant,
    ram_hours: f64,
}

impl PrequentialRunner {
    pub fn new(
        learner: Box<dyn Learner>,
        stream: Box<dyn ExampleStream>,
        evaluator: Box<dyn PerformanceEvaluator>,
        max_examples: Option<u64>,
        max_seconds: Option<u64>,
        sample_frequency: u64,
        mem_check_frequency: u64,
    ) -> Result<Self, std::io::Error> {
        if sample_frequency == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "sample_frequency must be > 0",
            ));
        }
        if mem_check_frequency == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "mem_check_frequency must be > 0",
            ));
        }

        Ok(Self {
            learner,
            stream,
            evaluator,
            curve: LearningCurve::default(),
            max_examples,
            max_seconds,
            sample_frequency,
            mem_check_frequency,
            processed: 0,
            start_time: Instant::now(),
            last_mem_sample: Instant::now(),
            ram_hours: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<(), TreeError> {
        self.start_time = Instant::now();
        self.last_mem_sample = self.start_time;

        while self.stream.has_more_examples() {
            if let Some(n) = self.max_examples {
                if self.processed >= n {
                    break;
                }
            }
            if let Some(s) = self.max_seconds {
                if self.start_time.elapsed().as_secs() >= s {
                    break;
                }
            }
            let Some(example) = self.stream.next_example() else {
                break;
            };
            self.processed += 1;

            let prediction = self.learner.predict(&example)?;
            self.evaluator.add_result(&example, prediction);
            self.learner.process(example)?;

            if self.processed % self.mem_check_frequency == 0 {
                self.bump_ram_hours();
            }
            if self.processed % self.sample_frequency == 0 {
                self.push_snapshot();
            }
        }

        self.push_snapshot();
        Ok(())
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn learner(&self) -> &dyn Learner {
        self.learner.as_ref()
    }

    fn push_snapshot(&mut self) {
        let snapshot = Snapshot {
            examples_seen: self.processed,
            metrics: self.evaluator.measurements(),
            ram_hours: self.ram_hours,
            seconds: self.start_time.elapsed().as_secs_f64(),
        };
        self.curve.push(snapshot);
    }

    fn bump_ram_hours(&mut self) {
        let now = Instant::now();
        let dt_h = (now - self.last_mem_sample).as_secs_f64() / 3600.0;
        self.last_mem_sample = now;

        let rss_gb = current_rss_gb().unwrap_or(0.0);
        self.ram_hours += rss_gb * dt_h;
    }
}
