//! Populations of individuals.

use indexmap::IndexMap;

use crate::Individual;

/// A numeric id for a population, given by its order of first appearance.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id(pub usize);

/// The individuals belonging to each population, in order of first appearance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Populations(IndexMap<String, Vec<usize>>);

impl Populations {
    /// Groups individuals by population label, recording their row indices.
    pub fn from_individuals(individuals: &[Individual]) -> Self {
        let mut map: IndexMap<String, Vec<usize>> = IndexMap::new();

        for (i, individual) in individuals.iter().enumerate() {
            map.entry(individual.population().to_string())
                .or_default()
                .push(i);
        }

        Self(map)
    }

    /// Returns the row indices of the individuals in a population.
    pub fn members(&self, id: Id) -> Option<&[usize]> {
        self.0.get_index(id.0).map(|(_, members)| members.as_slice())
    }

    /// Returns an iterator over population names and the row indices of their individuals.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.0
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    /// Returns `true` if there are no populations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of populations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over population names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
