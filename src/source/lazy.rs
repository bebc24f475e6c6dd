//! Deferred in-memory query source

use super::QuerySource;
use crate::ordering::{sort_records, OrderKey};
use crate::predicate::Predicate;
use crate::value::Record;

/// One recorded composition step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Filter(Predicate),
    OrderBy(Vec<OrderKey>),
    Skip(usize),
    Take(usize),
}

/// In-memory records plus the steps to run over them.
///
/// Nothing is evaluated until `collect`.
#[derive(Debug, Clone)]
pub struct LazyCollection<R> {
    records: Vec<R>,
    steps: Vec<Step>,
}

impl<R: Record> LazyCollection<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            steps: Vec::new(),
        }
    }

    /// Steps recorded so far, in composition order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs every recorded step in order.
    pub fn collect(self) -> Vec<R> {
        let mut records = self.records;
        for step in self.steps {
            records = match step {
                Step::Filter(predicate) => records
                    .into_iter()
                    .filter(|r| predicate.evaluate(r))
                    .collect(),
                Step::OrderBy(keys) => sort_records(records, &keys),
                Step::Skip(count) => records.into_iter().skip(count).collect(),
                Step::Take(count) => records.into_iter().take(count).collect(),
            };
        }
        records
    }
}

impl<R: Record> QuerySource for LazyCollection<R> {
    fn filter(mut self, predicate: Predicate) -> Self {
        self.steps.push(Step::Filter(predicate));
        self
    }

    fn order_by(mut self, keys: Vec<OrderKey>) -> Self {
        self.steps.push(Step::OrderBy(keys));
        self
    }

    fn skip(mut self, count: usize) -> Self {
        self.steps.push(Step::Skip(count));
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.steps.push(Step::Take(count));
        self
    }
}
