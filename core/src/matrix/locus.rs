/// A genotyped locus with its quality metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct Locus {
    id: String,
    repeatability: Option<f64>,
    call_rate: f64,
    polymorphic: bool,
}

impl Locus {
    /// Creates a new locus.
    ///
    /// Call rate and polymorphism are derived from the calls once the locus is placed in a
    /// [`GenotypeMatrix`](super::GenotypeMatrix).
    pub fn new<I>(id: I, repeatability: Option<f64>) -> Self
    where
        I: Into<String>,
    {
        Self {
            id: id.into(),
            repeatability,
            call_rate: 0.0,
            polymorphic: false,
        }
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the average repeatability across technical replicates, if reported.
    pub fn repeatability(&self) -> Option<f64> {
        self.repeatability
    }

    /// Returns the fraction of individuals with a non-missing call.
    pub fn call_rate(&self) -> f64 {
        self.call_rate
    }

    /// Returns `true` if at least two distinct calls are observed.
    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    pub(super) fn set_metrics(&mut self, call_rate: f64, polymorphic: bool) {
        self.call_rate = call_rate;
        self.polymorphic = polymorphic;
    }
}
