use std::fmt;

use crate::GenotypeMatrix;

use super::Stage;

/// Locus and individual counts at a point in the filter chain.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// Number of loci.
    pub loci: usize,
    /// Number of individuals.
    pub individuals: usize,
}

impl From<&GenotypeMatrix> for Counts {
    fn from(matrix: &GenotypeMatrix) -> Self {
        Self {
            loci: matrix.n_loci(),
            individuals: matrix.n_individuals(),
        }
    }
}

/// Whether a stage filtered the matrix.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// The stage was applied.
    Applied,
    /// The stage could not be applied because its metric is absent.
    Skipped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Applied => f.write_str("applied"),
            Status::Skipped => f.write_str("skipped"),
        }
    }
}

/// The outcome of a single filter stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    /// The stage.
    pub stage: Stage,
    /// Whether the stage was applied.
    pub status: Status,
    /// Counts after the stage.
    pub counts: Counts,
}

/// A record of the counts before filtering and after each stage, in order of execution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterReport {
    initial: Counts,
    entries: Vec<Entry>,
}

impl FilterReport {
    pub(super) fn new(initial: Counts) -> Self {
        Self {
            initial,
            entries: Vec::new(),
        }
    }

    pub(super) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Returns the entries, in order of execution.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the counts after the last stage.
    pub fn final_counts(&self) -> Counts {
        self.entries
            .last()
            .map(|entry| entry.counts)
            .unwrap_or(self.initial)
    }

    /// Returns the entry for a stage, if it was run.
    pub fn get(&self, stage: Stage) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.stage == stage)
    }

    /// Returns the counts before filtering.
    pub fn initial(&self) -> Counts {
        self.initial
    }
}
