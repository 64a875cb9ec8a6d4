use crate::{Error, GenotypeMatrix};

use super::LocusCounts;

/// Observed and expected heterozygosity for a single population.
///
/// Both are averaged over the loci at which the population has at least one non-missing call.
/// Observed heterozygosity at a locus is the fraction of heterozygous calls; expected
/// heterozygosity is 2p(1 - p), where p is the alternative allele frequency.
#[derive(Clone, Debug, PartialEq)]
pub struct Heterozygosity {
    /// Population name.
    pub population: String,
    /// Number of individuals in the population.
    pub individuals: usize,
    /// Number of loci with at least one call in the population.
    pub loci: usize,
    /// Mean observed heterozygosity.
    pub observed: f64,
    /// Mean expected heterozygosity.
    pub expected: f64,
}

impl Heterozygosity {
    /// Computes heterozygosity for every population in the matrix, in order of first appearance.
    ///
    /// Returns [`Error::EmptyInput`] if the matrix has no loci or individuals, and
    /// [`Error::InsufficientData`] if any population has no loci with calls.
    pub fn compute(matrix: &GenotypeMatrix) -> Result<Vec<Self>, Error> {
        if matrix.is_empty() {
            return Err(Error::empty("heterozygosity"));
        }

        matrix
            .populations()
            .iter()
            .map(|(name, members)| Self::from_members(matrix, name, members))
            .collect()
    }

    /// Computes heterozygosity for the individuals of a single population, given by row index.
    pub fn from_members(
        matrix: &GenotypeMatrix,
        population: &str,
        members: &[usize],
    ) -> Result<Self, Error> {
        if members.is_empty() {
            return Err(Error::insufficient(format!(
                "population '{population}' has no individuals"
            )));
        }

        let (loci, observed, expected) = (0..matrix.n_loci())
            .map(|locus| LocusCounts::from_members(matrix, members, locus))
            .filter(|counts| counts.called > 0)
            .fold((0, 0., 0.), |(n, ho, he), counts| {
                let p = counts.frequency();
                (n + 1, ho + counts.heterozygosity(), he + 2. * p * (1. - p))
            });

        if loci == 0 {
            return Err(Error::insufficient(format!(
                "population '{population}' has no loci with calls"
            )));
        }

        log::debug!("Population '{population}' has heterozygosity over {loci} loci");

        Ok(Self {
            population: population.to_string(),
            individuals: members.len(),
            loci,
            observed: observed / loci as f64,
            expected: expected / loci as f64,
        })
    }
}
