//! Individual metadata.
//!
//! A metadata file is a comma- or tab-separated table with a header, holding at least an `id`
//! column naming individuals as in the report and a `pop` column with their population labels.
//! Other columns are ignored.

use std::{io::Read, path::Path};

use indexmap::IndexMap;

use crate::{input, Error, GenotypeMatrix};

const ID_COLUMN: &str = "id";
const POPULATION_COLUMN: &str = "pop";

/// Population labels by individual identifier, in file order.
pub type Assignments = IndexMap<String, String>;

/// Reads population assignments from a path.
pub fn read_from_path<P>(path: P) -> Result<Assignments, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    log::info!("Reading individual metadata from '{}'", path.display());

    let mut s = String::new();
    input::open(path)?.read_to_string(&mut s)?;

    read_from_str(&s)
}

/// Reads population assignments from a string.
pub fn read_from_str(s: &str) -> Result<Assignments, Error> {
    let delimiter = match s.lines().next() {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(s.as_bytes());

    let headers = reader.headers()?.clone();
    let find_column = |name: &str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::malformed(format!("metadata has no '{name}' column")))
    };
    let id_column = find_column(ID_COLUMN)?;
    let population_column = find_column(POPULATION_COLUMN)?;

    let mut assignments = Assignments::new();

    for record in reader.records() {
        let record = record?;

        let id = record[id_column].to_string();
        let population = record[population_column].to_string();

        if population.is_empty() {
            return Err(Error::malformed(format!(
                "individual '{id}' has an empty population in metadata"
            )));
        }
        if assignments.insert(id.clone(), population).is_some() {
            return Err(Error::malformed(format!(
                "individual '{id}' appears more than once in metadata"
            )));
        }
    }

    Ok(assignments)
}

/// Assigns populations to the individuals in a matrix.
///
/// Individuals absent from the assignments keep their current population. Assignments for
/// individuals absent from the matrix are an error.
pub fn assign_populations(
    mut matrix: GenotypeMatrix,
    assignments: &Assignments,
) -> Result<GenotypeMatrix, Error> {
    if let Some(unknown) = assignments
        .keys()
        .find(|id| !matrix.individuals().iter().any(|ind| ind.id() == id.as_str()))
    {
        return Err(Error::malformed(format!(
            "individual '{unknown}' in metadata not found in report"
        )));
    }

    let mut unassigned = 0;
    for individual in matrix.individuals_mut() {
        match assignments.get(individual.id()) {
            Some(population) => individual.set_population(population.clone()),
            None => unassigned += 1,
        }
    }

    if unassigned > 0 {
        log::warn!("{unassigned} individuals have no population in metadata");
    }

    Ok(matrix)
}
