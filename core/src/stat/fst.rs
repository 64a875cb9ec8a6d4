use nalgebra::DMatrix;

use crate::{population, Error, GenotypeMatrix};

use super::Backend;

/// A symmetric matrix of differentiation between every pair of populations.
///
/// The diagonal is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PairwiseFst {
    populations: Vec<String>,
    values: DMatrix<f64>,
}

impl PairwiseFst {
    /// Computes the differentiation between all pairs of populations in the matrix.
    ///
    /// Returns `None` if there are fewer than two populations. Returns
    /// [`Error::InsufficientData`] if any population has fewer than two individuals. A pair of
    /// populations without informative loci gets a NaN value, and the other pairs are kept.
    pub fn compute<B>(matrix: &GenotypeMatrix, backend: &B) -> Result<Option<Self>, Error>
    where
        B: Backend + ?Sized,
    {
        let populations = matrix.populations();

        if populations.len() < 2 {
            log::info!(
                "Skipping pairwise Fst for {} population(s)",
                populations.len()
            );
            return Ok(None);
        }
        if matrix.is_empty() {
            return Err(Error::empty("pairwise Fst"));
        }
        if let Some((name, members)) = populations.iter().find(|(_, members)| members.len() < 2) {
            return Err(Error::insufficient(format!(
                "population '{name}' has {} individual(s), pairwise Fst requires at least 2",
                members.len()
            )));
        }

        let n = populations.len();
        let names = populations.names().map(String::from).collect::<Vec<_>>();
        let mut values = DMatrix::zeros(n, n);

        for i in 0..n {
            for j in 0..i {
                let first = population_members(&populations, i)?;
                let second = population_members(&populations, j)?;

                let fst = match backend.differentiation(matrix, first, second) {
                    Ok(fst) => fst,
                    Err(e) => {
                        log::warn!(
                            "Pairwise Fst between '{}' and '{}' is undefined: {e}",
                            names[i],
                            names[j]
                        );
                        f64::NAN
                    }
                };
                values[(i, j)] = fst;
                values[(j, i)] = fst;
            }
        }

        log::info!("Computed pairwise Fst for {n} populations");

        Ok(Some(Self {
            populations: names,
            values,
        }))
    }

    /// Returns the differentiation between two populations by index.
    ///
    /// The value is NaN if the pair has no informative loci.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Returns the differentiation between two populations by name.
    pub fn get_by_name(&self, first: &str, second: &str) -> Option<f64> {
        let i = self.populations.iter().position(|name| name == first)?;
        let j = self.populations.iter().position(|name| name == second)?;

        Some(self.get(i, j))
    }

    /// Returns the population names, in row and column order.
    pub fn populations(&self) -> &[String] {
        &self.populations
    }

    /// Returns the full matrix.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }
}

fn population_members(
    populations: &population::Populations,
    index: usize,
) -> Result<&[usize], Error> {
    populations
        .members(population::Id(index))
        .ok_or_else(|| Error::insufficient(format!("no population with index {index}")))
}
