/// A genotyped individual.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Individual {
    id: String,
    population: String,
}

impl Individual {
    /// Population assigned to individuals when no labels are provided.
    pub const DEFAULT_POPULATION: &'static str = "pop1";

    /// Creates a new individual.
    pub fn new<I, P>(id: I, population: P) -> Self
    where
        I: Into<String>,
        P: Into<String>,
    {
        Self {
            id: id.into(),
            population: population.into(),
        }
    }

    /// Creates a new individual in the default population.
    pub fn unassigned<I>(id: I) -> Self
    where
        I: Into<String>,
    {
        Self::new(id, Self::DEFAULT_POPULATION)
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the population label.
    pub fn population(&self) -> &str {
        &self.population
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub(crate) fn set_population(&mut self, population: String) {
        self.population = population;
    }
}
