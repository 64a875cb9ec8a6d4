//! Normalization of individual identifiers and populations.

use std::{io::Read, path::Path};

use crate::{input, Error, GenotypeMatrix};

/// An ordered list of literal substring substitutions applied to individual identifiers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Substitutions(Vec<(String, String)>);

impl Substitutions {
    /// Applies every substitution in order, replacing all occurrences of each.
    pub fn apply(&self, s: &str) -> String {
        self.0
            .iter()
            .fold(s.to_string(), |s, (from, to)| s.replace(from.as_str(), to))
    }

    /// Returns an iterator over patterns and their replacements, in order of application.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Returns `true` if there are no substitutions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of substitutions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reads substitutions from a two-column, comma- or tab-separated file without header.
    pub fn read_from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        log::info!("Reading substitutions from '{}'", path.display());

        let mut s = String::new();
        input::open(path)?.read_to_string(&mut s)?;

        Self::read_from_str(&s)
    }

    /// Reads substitutions from a two-column, comma- or tab-separated string without header.
    ///
    /// The delimiter is a tab if the first line contains one, and a comma otherwise.
    pub fn read_from_str(s: &str) -> Result<Self, Error> {
        let delimiter = match s.lines().next() {
            Some(line) if line.contains('\t') => b'\t',
            _ => b',',
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(s.as_bytes());

        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record?;

            match (record.get(0), record.get(1), record.len()) {
                (Some(from), Some(to), 2) => pairs.push((from.to_string(), to.to_string())),
                _ => {
                    let line = record.position().map_or(0, |position| position.line());
                    return Err(Error::malformed(format!(
                        "line {line}: expected a pattern and a replacement, found {} field(s)",
                        record.len()
                    )));
                }
            }
        }

        Self::try_from_pairs(pairs)
    }

    /// Creates substitutions from pairs of pattern and replacement.
    ///
    /// Returns an error if any pattern is empty.
    pub fn try_from_pairs<I, S, T>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(from, to)| {
                let from = from.into();

                if from.is_empty() {
                    Err(Error::malformed("substitution pattern must not be empty"))
                } else {
                    Ok((from, to.into()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Rewrites individual identifiers and derives populations from identifier prefixes.
#[derive(Clone, Debug)]
pub struct Normalizer {
    substitutions: Substitutions,
    prefix_length: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            substitutions: Substitutions::default(),
            prefix_length: Self::DEFAULT_PREFIX_LENGTH,
        }
    }
}

impl Normalizer {
    /// Default number of identifier characters used as a population label.
    pub const DEFAULT_PREFIX_LENGTH: usize = 3;

    /// Creates a new normalizer.
    pub fn new(substitutions: Substitutions, prefix_length: usize) -> Self {
        Self {
            substitutions,
            prefix_length,
        }
    }

    /// Normalizes the individuals of a matrix.
    ///
    /// Substitutions are applied to every identifier. If at most one population is present
    /// afterwards, each individual is assigned the population given by the prefix of its
    /// identifier; otherwise, existing populations are kept.
    pub fn normalize(&self, mut matrix: GenotypeMatrix) -> Result<GenotypeMatrix, Error> {
        if !self.substitutions.is_empty() {
            let mut renamed = 0;

            for individual in matrix.individuals_mut() {
                let id = self.substitutions.apply(individual.id());

                if id != individual.id() {
                    log::debug!("Renaming individual '{}' to '{id}'", individual.id());
                    individual.set_id(id);
                    renamed += 1;
                }
            }

            log::info!(
                "Renamed {renamed} individuals using {} substitutions",
                self.substitutions.len()
            );

            matrix.check_unique_ids()?;
        }

        let populations = matrix.populations().len();
        if populations <= 1 {
            for individual in matrix.individuals_mut() {
                let population = population_prefix(individual.id(), self.prefix_length);
                individual.set_population(population);
            }

            log::info!(
                "Derived {} populations from the first {} characters of identifiers",
                matrix.populations().len(),
                self.prefix_length
            );
        } else {
            log::info!("Keeping {populations} existing populations");
        }

        Ok(matrix)
    }
}

/// Returns the first `length` characters of an identifier, or the whole identifier if shorter.
pub fn population_prefix(id: &str, length: usize) -> String {
    id.chars().take(length).collect()
}
