//! Quality filtering of loci.

use std::fmt;

mod report;
pub use report::{Counts, Entry, FilterReport, Status};

use crate::GenotypeMatrix;

/// A filter stage, in order of execution.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    /// Drops loci with average repeatability below a threshold.
    Repeatability,
    /// Drops loci with a call rate below a threshold.
    CallRate,
    /// Drops loci without variation among non-missing calls.
    Monomorphic,
}

impl Stage {
    /// All stages, in order of execution.
    pub const ALL: [Stage; 3] = [Stage::Repeatability, Stage::CallRate, Stage::Monomorphic];

    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Repeatability => "repeatability",
            Stage::CallRate => "call_rate",
            Stage::Monomorphic => "monomorphic",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered chain of locus filters.
///
/// Each stage can be disabled independently. Enabled stages always run in the order given by
/// [`Stage::ALL`], and each appends one entry to the [`FilterReport`]. No stage removes
/// individuals.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterChain {
    repeatability: Option<f64>,
    call_rate: Option<f64>,
    monomorphic: bool,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            repeatability: Some(Self::DEFAULT_REPEATABILITY),
            call_rate: Some(Self::DEFAULT_CALL_RATE),
            monomorphic: true,
        }
    }
}

impl FilterChain {
    /// Default repeatability threshold.
    pub const DEFAULT_REPEATABILITY: f64 = 0.95;

    /// Default call rate threshold.
    pub const DEFAULT_CALL_RATE: f64 = 0.80;

    /// Returns a chain with every stage disabled.
    pub fn disabled() -> Self {
        Self {
            repeatability: None,
            call_rate: None,
            monomorphic: false,
        }
    }

    /// Runs the enabled stages, returning the filtered matrix and a report of the counts after
    /// each stage.
    pub fn run(&self, matrix: GenotypeMatrix) -> (GenotypeMatrix, FilterReport) {
        let mut report = FilterReport::new(Counts::from(&matrix));
        log::info!(
            "Filtering {} loci for {} individuals",
            matrix.n_loci(),
            matrix.n_individuals()
        );

        let mut matrix = matrix;
        for stage in Stage::ALL {
            let (filtered, status) = match stage {
                Stage::Repeatability => match self.repeatability {
                    Some(threshold) => filter_repeatability(matrix, threshold),
                    None => continue,
                },
                Stage::CallRate => match self.call_rate {
                    Some(threshold) => (filter_call_rate(matrix, threshold), Status::Applied),
                    None => continue,
                },
                Stage::Monomorphic if self.monomorphic => {
                    (filter_monomorphic(matrix), Status::Applied)
                }
                Stage::Monomorphic => continue,
            };

            let counts = Counts::from(&filtered);
            if counts.loci == 0 {
                log::warn!("No loci remain after {stage} filter");
            } else {
                log::info!(
                    "{} loci and {} individuals remain after {stage} filter",
                    counts.loci,
                    counts.individuals
                );
            }

            report.push(Entry {
                stage,
                status,
                counts,
            });
            matrix = filtered;
        }

        (matrix, report)
    }

    /// Sets the call rate threshold, or disables the stage with `None`.
    pub fn set_call_rate(mut self, threshold: Option<f64>) -> Self {
        self.call_rate = threshold;
        self
    }

    /// Enables or disables the monomorphic stage.
    pub fn set_monomorphic(mut self, enabled: bool) -> Self {
        self.monomorphic = enabled;
        self
    }

    /// Sets the repeatability threshold, or disables the stage with `None`.
    pub fn set_repeatability(mut self, threshold: Option<f64>) -> Self {
        self.repeatability = threshold;
        self
    }
}

/// Drops loci with repeatability below the threshold, or with no recorded repeatability.
///
/// If no locus records repeatability, the matrix is returned unchanged and the stage is skipped.
pub fn filter_repeatability(matrix: GenotypeMatrix, threshold: f64) -> (GenotypeMatrix, Status) {
    let has_metric = matrix
        .loci()
        .iter()
        .any(|locus| locus.repeatability().is_some());

    if !has_metric && matrix.n_loci() > 0 {
        log::warn!("Repeatability is absent from locus metadata, skipping repeatability filter");
        return (matrix, Status::Skipped);
    }

    let filtered = matrix.retain_loci(|locus| {
        locus
            .repeatability()
            .map_or(false, |repeatability| repeatability >= threshold)
    });

    (filtered, Status::Applied)
}

/// Drops loci with a fraction of non-missing calls below the threshold.
pub fn filter_call_rate(matrix: GenotypeMatrix, threshold: f64) -> GenotypeMatrix {
    matrix.retain_loci(|locus| locus.call_rate() >= threshold)
}

/// Drops loci where all non-missing calls are identical.
pub fn filter_monomorphic(matrix: GenotypeMatrix) -> GenotypeMatrix {
    matrix.retain_loci(|locus| locus.is_polymorphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{matrix::tests::matrix_from, GenotypeMatrix, Individual, Locus};

    fn ten_loci_one_sparse() -> GenotypeMatrix {
        // Locus 3 is missing for individuals d and e, giving call rate 0.6
        matrix_from(
            &["a", "b", "c", "d", "e"],
            &["p"; 5],
            &[
                &[0, 1, 2, 0, 1, 2, 0, 1, 2, 0],
                &[1, 2, 0, 1, 2, 0, 1, 2, 0, 1],
                &[2, 0, 1, 2, 0, 1, 2, 0, 1, 2],
                &[0, 1, 2, 9, 1, 2, 0, 1, 2, 0],
                &[1, 2, 0, 9, 2, 0, 1, 2, 0, 1],
            ],
        )
    }

    #[test]
    fn test_call_rate_scenario() {
        let matrix = ten_loci_one_sparse();
        assert_approx_eq!(matrix.loci()[3].call_rate(), 0.6);

        let (filtered, report) = FilterChain::default().run(matrix);

        let entry = report.get(Stage::CallRate).unwrap();
        assert_eq!(entry.counts.loci, 9);
        assert_eq!(entry.counts.individuals, 5);
        assert_eq!(filtered.n_loci(), 9);
        assert!(filtered.loci().iter().all(|locus| locus.id() != "snp3"));
    }

    #[test]
    fn test_monomorphic_regardless_of_call_rate() {
        let matrix = matrix_from(
            &["a", "b", "c"],
            &["p"; 3],
            &[&[0, 0, 1], &[0, 1, 1], &[0, 2, 9]],
        );

        let chain = FilterChain::default().set_call_rate(Some(0.0));
        let (filtered, report) = chain.run(matrix);

        assert_eq!(report.get(Stage::CallRate).unwrap().counts.loci, 3);
        assert_eq!(report.get(Stage::Monomorphic).unwrap().counts.loci, 1);
        assert_eq!(filtered.loci()[0].id(), "snp1");
    }

    #[test]
    fn test_repeatability() {
        let individuals = vec![Individual::unassigned("a"), Individual::unassigned("b")];
        let loci = vec![
            Locus::new("good", Some(0.99)),
            Locus::new("edge", Some(0.95)),
            Locus::new("bad", Some(0.80)),
            Locus::new("unknown", None),
        ];
        let rows = vec![vec![None; 4], vec![None; 4]];
        let matrix = GenotypeMatrix::from_rows(individuals, loci, rows).unwrap();

        let (filtered, status) = filter_repeatability(matrix, 0.95);

        assert_eq!(status, Status::Applied);
        let ids = filtered.loci().iter().map(Locus::id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["good", "edge"]);
    }

    #[test]
    fn test_repeatability_absent_is_skipped() {
        let individuals = vec![Individual::unassigned("a"), Individual::unassigned("b")];
        let loci = vec![Locus::new("x", None), Locus::new("y", None)];
        let z = Some(crate::Genotype::Zero);
        let t = Some(crate::Genotype::Two);
        let matrix =
            GenotypeMatrix::from_rows(individuals, loci, vec![vec![z, t], vec![t, z]]).unwrap();

        let (filtered, report) = FilterChain::default().run(matrix);

        let entry = report.get(Stage::Repeatability).unwrap();
        assert_eq!(entry.status, Status::Skipped);
        assert_eq!(entry.counts.loci, 2);
        assert_eq!(filtered.n_loci(), 2);
    }

    #[test]
    fn test_report_order_and_disabled_stages() {
        let matrix = ten_loci_one_sparse();

        let (_, report) = FilterChain::default().set_repeatability(None).run(matrix);

        let stages = report
            .entries()
            .iter()
            .map(|entry| entry.stage)
            .collect::<Vec<_>>();
        assert_eq!(stages, vec![Stage::CallRate, Stage::Monomorphic]);
        assert_eq!(report.initial().loci, 10);
        assert_eq!(report.final_counts().loci, 9);
    }

    #[test]
    fn test_disabled_chain() {
        let matrix = ten_loci_one_sparse();

        let (filtered, report) = FilterChain::disabled().run(matrix.clone());

        assert!(report.entries().is_empty());
        assert_eq!(report.final_counts(), report.initial());
        assert_eq!(filtered, matrix);
    }

    #[test]
    fn test_all_loci_removed_is_not_an_error() {
        let matrix = matrix_from(&["a", "b"], &["p"; 2], &[&[0, 2], &[0, 2]]);

        let (filtered, report) = FilterChain::default().run(matrix);

        assert!(filtered.is_empty());
        assert_eq!(filtered.n_individuals(), 2);
        assert_eq!(report.final_counts().loci, 0);
    }
}
