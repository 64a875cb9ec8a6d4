//! Population summary statistics.
//!
//! Each statistic is computed independently from a filtered [`GenotypeMatrix`] and returns its
//! own result, so that a statistic failing for lack of data does not prevent the others from
//! being computed.

use crate::{Genotype, GenotypeMatrix};

pub mod backend;
pub use backend::{Backend, Ordination, Standard};

pub mod fst;
pub use fst::PairwiseFst;

pub mod heterozygosity;
pub use heterozygosity::Heterozygosity;

pub mod pcoa;
pub use pcoa::PrincipalCoordinates;

/// Counts of calls at a single locus among a subset of individuals.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct LocusCounts {
    pub called: usize,
    pub alt_alleles: usize,
    pub heterozygous: usize,
}

impl LocusCounts {
    pub fn from_members(matrix: &GenotypeMatrix, members: &[usize], locus: usize) -> Self {
        members
            .iter()
            .filter_map(|&individual| matrix.get(individual, locus))
            .fold(Self::default(), |mut counts, genotype| {
                counts.add(genotype);
                counts
            })
    }

    fn add(&mut self, genotype: Genotype) {
        self.called += 1;
        self.alt_alleles += usize::from(genotype.alt_alleles());
        if genotype.is_heterozygous() {
            self.heterozygous += 1;
        }
    }

    /// Alternative allele frequency.
    pub fn frequency(&self) -> f64 {
        self.alt_alleles as f64 / (2 * self.called) as f64
    }

    /// Observed heterozygosity.
    pub fn heterozygosity(&self) -> f64 {
        self.heterozygous as f64 / self.called as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::matrix::tests::matrix_from;

    #[test]
    fn test_locus_counts() {
        let matrix = matrix_from(&["a", "b", "c", "d"], &["p"; 4], &[&[0], &[1], &[2], &[9]]);

        let counts = LocusCounts::from_members(&matrix, &[0, 1, 2, 3], 0);

        assert_eq!(counts.called, 3);
        assert_eq!(counts.alt_alleles, 3);
        assert_eq!(counts.heterozygous, 1);
        assert_approx_eq!(counts.frequency(), 0.5);
        assert_approx_eq!(counts.heterozygosity(), 1. / 3.);
    }
}
