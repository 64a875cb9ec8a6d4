//! Genotype matrix.

use std::collections::HashSet;

mod individual;
pub use individual::Individual;

mod locus;
pub use locus::Locus;

use crate::{Error, Genotype, Populations};

/// A matrix of genotype calls, with one row per individual and one column per locus.
///
/// The matrix is never edited in place: filtering consumes a matrix and returns a new one, with
/// the per-locus metrics recalculated.
#[derive(Clone, Debug, PartialEq)]
pub struct GenotypeMatrix {
    individuals: Vec<Individual>,
    loci: Vec<Locus>,
    calls: Vec<Option<Genotype>>,
}

impl GenotypeMatrix {
    /// Creates a new matrix from calls in row-major order, i.e. all calls for the first
    /// individual followed by all calls for the second, and so on.
    ///
    /// Returns an error if the number of calls does not match the dimensions, or if individual
    /// or locus identifiers are not unique.
    pub fn new(
        individuals: Vec<Individual>,
        loci: Vec<Locus>,
        calls: Vec<Option<Genotype>>,
    ) -> Result<Self, Error> {
        let expected = individuals.len() * loci.len();
        if calls.len() != expected {
            return Err(Error::malformed(format!(
                "expected {expected} calls for {} individuals and {} loci, found {}",
                individuals.len(),
                loci.len(),
                calls.len()
            )));
        }

        let mut matrix = Self {
            individuals,
            loci,
            calls,
        };

        matrix.check_unique_ids()?;
        matrix.recalculate_metrics();

        Ok(matrix)
    }

    /// Creates a new matrix from one vector of calls per individual.
    pub fn from_rows(
        individuals: Vec<Individual>,
        loci: Vec<Locus>,
        rows: Vec<Vec<Option<Genotype>>>,
    ) -> Result<Self, Error> {
        if rows.len() != individuals.len() {
            return Err(Error::malformed(format!(
                "expected {} rows of calls, found {}",
                individuals.len(),
                rows.len()
            )));
        }

        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != loci.len())
        {
            return Err(Error::malformed(format!(
                "expected {} calls for individual '{}', found {}",
                loci.len(),
                individuals[i].id(),
                row.len()
            )));
        }

        Self::new(individuals, loci, rows.into_iter().flatten().collect())
    }

    /// Creates a new matrix from one vector of calls per locus.
    pub fn from_columns(
        individuals: Vec<Individual>,
        loci: Vec<Locus>,
        columns: Vec<Vec<Option<Genotype>>>,
    ) -> Result<Self, Error> {
        if columns.len() != loci.len() {
            return Err(Error::malformed(format!(
                "expected {} columns of calls, found {}",
                loci.len(),
                columns.len()
            )));
        }

        if let Some((j, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != individuals.len())
        {
            return Err(Error::malformed(format!(
                "expected {} calls for locus '{}', found {}",
                individuals.len(),
                loci[j].id(),
                column.len()
            )));
        }

        let calls = (0..individuals.len())
            .flat_map(|i| columns.iter().map(move |column| column[i]))
            .collect();

        Self::new(individuals, loci, calls)
    }

    /// Returns the call for an individual at a locus.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, individual: usize, locus: usize) -> Option<Genotype> {
        assert!(locus < self.n_loci(), "locus index out of bounds");

        self.calls[individual * self.n_loci() + locus]
    }

    /// Returns the individuals, in row order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Returns `true` if the matrix has no loci or no individuals.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns an iterator over the calls at a locus, in individual order.
    pub fn locus_calls(&self, locus: usize) -> impl Iterator<Item = Option<Genotype>> + '_ {
        assert!(locus < self.n_loci(), "locus index out of bounds");

        self.calls
            .iter()
            .skip(locus)
            .step_by(self.n_loci())
            .copied()
    }

    /// Returns the loci, in column order.
    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    /// Returns the number of individuals.
    pub fn n_individuals(&self) -> usize {
        self.individuals.len()
    }

    /// Returns the number of loci.
    pub fn n_loci(&self) -> usize {
        self.loci.len()
    }

    /// Returns the populations of the individuals, in order of first appearance.
    pub fn populations(&self) -> Populations {
        Populations::from_individuals(&self.individuals)
    }

    /// Consumes the matrix and returns a new one with only the loci for which the predicate
    /// returns `true`.
    pub fn retain_loci<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&Locus) -> bool,
    {
        let mask = self.loci.iter().map(&mut keep).collect::<Vec<_>>();
        let n_loci = self.n_loci();

        let calls = self
            .calls
            .iter()
            .enumerate()
            .filter(|(i, _)| mask[i % n_loci])
            .map(|(_, call)| *call)
            .collect();

        let loci = self
            .loci
            .into_iter()
            .zip(mask)
            .filter_map(|(locus, keep)| keep.then_some(locus))
            .collect();

        let mut matrix = Self {
            individuals: self.individuals,
            loci,
            calls,
        };
        matrix.recalculate_metrics();
        matrix
    }

    /// Returns the calls of an individual, in locus order.
    pub fn row(&self, individual: usize) -> &[Option<Genotype>] {
        let n_loci = self.n_loci();

        &self.calls[individual * n_loci..(individual + 1) * n_loci]
    }

    /// Returns the dimensions and number of populations.
    pub fn summary(&self) -> Summary {
        Summary {
            individuals: self.n_individuals(),
            loci: self.n_loci(),
            populations: self.populations().len(),
        }
    }

    pub(crate) fn check_unique_ids(&self) -> Result<(), Error> {
        check_unique(self.individuals.iter().map(Individual::id), "individual")?;
        check_unique(self.loci.iter().map(Locus::id), "locus")
    }

    fn recalculate_metrics(&mut self) {
        let n_individuals = self.n_individuals();

        for j in 0..self.n_loci() {
            let mut called = 0;
            let mut first = None;
            let mut polymorphic = false;

            for genotype in self.locus_calls(j).flatten() {
                called += 1;
                match first {
                    None => first = Some(genotype),
                    Some(first) if first != genotype => polymorphic = true,
                    Some(_) => (),
                }
            }

            let call_rate = if n_individuals > 0 {
                called as f64 / n_individuals as f64
            } else {
                0.0
            };

            self.loci[j].set_metrics(call_rate, polymorphic);
        }
    }
}

fn check_unique<'a, I>(ids: I, kind: &str) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();

    for id in ids {
        if !seen.insert(id) {
            return Err(Error::malformed(format!("duplicate {kind} identifier '{id}'")));
        }
    }

    Ok(())
}

/// Dimensions of a genotype matrix.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Number of individuals.
    pub individuals: usize,
    /// Number of loci.
    pub loci: usize,
    /// Number of populations.
    pub populations: usize,
}
