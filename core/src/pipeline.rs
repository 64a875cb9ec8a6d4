//! The full quality control pipeline.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use crate::{
    genotype::Coding,
    input::report,
    matrix::Summary,
    stat::{Backend, Heterozygosity, PairwiseFst, PrincipalCoordinates, Standard},
    Error, FilterChain, FilterReport, GenotypeMatrix, Normalizer, Substitutions,
};

/// A builder for a [`Pipeline`].
#[derive(Clone, Debug)]
pub struct Builder {
    coding: Coding,
    metadata_columns: Option<usize>,
    metadata_path: Option<PathBuf>,
    substitutions: Substitutions,
    prefix_length: usize,
    filters: FilterChain,
    axes: NonZeroUsize,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            coding: Coding::default(),
            metadata_columns: None,
            metadata_path: None,
            substitutions: Substitutions::default(),
            prefix_length: Normalizer::DEFAULT_PREFIX_LENGTH,
            filters: FilterChain::default(),
            axes: NonZeroUsize::new(PrincipalCoordinates::DEFAULT_AXES)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Builder {
    /// Builds a pipeline with the default numeric backend.
    pub fn build(self) -> Pipeline {
        self.build_with_backend(Standard)
    }

    /// Builds a pipeline with a custom numeric backend.
    pub fn build_with_backend<B>(self, backend: B) -> Pipeline<B>
    where
        B: Backend,
    {
        Pipeline {
            reader: report::Builder::default()
                .set_coding(self.coding)
                .set_metadata_columns(self.metadata_columns),
            metadata_path: self.metadata_path,
            normalizer: Normalizer::new(self.substitutions, self.prefix_length),
            filters: self.filters,
            axes: self.axes,
            backend,
        }
    }

    /// Sets the number of principal coordinate axes to retain.
    pub fn set_axes(mut self, axes: NonZeroUsize) -> Self {
        self.axes = axes;
        self
    }

    /// Sets the coding of calls in the report.
    pub fn set_coding(mut self, coding: Coding) -> Self {
        self.coding = coding;
        self
    }

    /// Sets the filter chain.
    pub fn set_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the number of locus metadata columns in the report, or detects them with `None`.
    pub fn set_metadata_columns(mut self, metadata_columns: Option<usize>) -> Self {
        self.metadata_columns = metadata_columns;
        self
    }

    /// Sets a path to an individual metadata file assigning populations.
    pub fn set_metadata_path(mut self, path: Option<PathBuf>) -> Self {
        self.metadata_path = path;
        self
    }

    /// Sets the number of identifier characters used to derive populations.
    pub fn set_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Sets the identifier substitutions.
    pub fn set_substitutions(mut self, substitutions: Substitutions) -> Self {
        self.substitutions = substitutions;
        self
    }
}

/// A configured quality control pipeline.
///
/// Runs, in order, the report reader, the [`Normalizer`], the [`FilterChain`], and then each of
/// the statistics on the filtered matrix.
#[derive(Clone, Debug)]
pub struct Pipeline<B = Standard> {
    reader: report::Builder,
    metadata_path: Option<PathBuf>,
    normalizer: Normalizer,
    filters: FilterChain,
    axes: NonZeroUsize,
    backend: B,
}

impl Default for Pipeline {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl<B> Pipeline<B>
where
    B: Backend,
{
    /// Loads, normalizes and filters a report.
    ///
    /// Errors from loading and normalizing are returned immediately. Filtering never fails.
    pub fn prepare<P>(&self, path: P) -> Result<Prepared, Error>
    where
        P: AsRef<Path>,
    {
        let matrix = self
            .reader
            .clone()
            .read_with_metadata(path, self.metadata_path.as_deref())?;
        let loaded = matrix.summary();
        log::info!(
            "Loaded {} individuals, {} loci and {} populations",
            loaded.individuals,
            loaded.loci,
            loaded.populations
        );

        let matrix = self.normalizer.normalize(matrix)?;
        let normalized = matrix.summary();

        let (matrix, filter_report) = self.filters.run(matrix);

        Ok(Prepared {
            loaded,
            normalized,
            matrix,
            filter_report,
        })
    }

    /// Runs the full pipeline on a report.
    pub fn run<P>(&self, path: P) -> Result<Analysis, Error>
    where
        P: AsRef<Path>,
    {
        Ok(self.analyse(self.prepare(path)?))
    }

    /// Computes the statistics for a prepared matrix.
    ///
    /// Each statistic is computed independently, and a failure is logged and kept in the
    /// [`Analysis`] without affecting the others.
    pub fn analyse(&self, prepared: Prepared) -> Analysis {
        let matrix = &prepared.matrix;

        let heterozygosity = Heterozygosity::compute(matrix);
        if let Err(e) = &heterozygosity {
            log::warn!("Failed to compute heterozygosity: {e}");
        }

        let pcoa = PrincipalCoordinates::compute(matrix, self.axes, &self.backend);
        if let Err(e) = &pcoa {
            log::warn!("Failed to compute principal coordinates: {e}");
        }

        let fst = PairwiseFst::compute(matrix, &self.backend);
        if let Err(e) = &fst {
            log::warn!("Failed to compute pairwise Fst: {e}");
        }

        Analysis {
            prepared,
            heterozygosity,
            pcoa,
            fst,
        }
    }
}

/// A loaded, normalized and filtered matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    /// Dimensions as loaded.
    pub loaded: Summary,
    /// Dimensions after normalization, before filtering.
    pub normalized: Summary,
    /// The filtered matrix.
    pub matrix: GenotypeMatrix,
    /// Counts after each filter stage.
    pub filter_report: FilterReport,
}

impl Prepared {
    /// Returns the dimensions of the filtered matrix.
    pub fn filtered(&self) -> Summary {
        self.matrix.summary()
    }
}

/// The results of a full pipeline run.
#[derive(Debug)]
pub struct Analysis {
    /// The filtered matrix and its history.
    pub prepared: Prepared,
    /// Heterozygosity per population.
    pub heterozygosity: Result<Vec<Heterozygosity>, Error>,
    /// Principal coordinates of individuals.
    pub pcoa: Result<PrincipalCoordinates, Error>,
    /// Pairwise Fst, or `None` if there are fewer than two populations.
    pub fst: Result<Option<PairwiseFst>, Error>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::filter::Stage;

    const REPORT: &str = "\
*,*,,,,,,
AlleleID,RepAvg,AAA1,AAA2,AAA3,BBB1,BBB2,BBB3
snp1,1.0,0,0,1,2,2,1
snp2,0.99,0,1,0,2,1,2
snp3,0.5,0,1,2,0,1,2
snp4,1.0,1,1,1,1,1,1
snp5,1.0,0,-,-,-,2,0
snp6,1.0,0,0,0,0,0,0
";

    #[test]
    fn test_run() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.csv");
        fs::write(&path, REPORT)?;

        let analysis = Pipeline::default().run(&path)?;

        let prepared = &analysis.prepared;
        assert_eq!(prepared.loaded.populations, 1);
        assert_eq!(prepared.normalized.populations, 2);
        assert_eq!(
            prepared.filtered(),
            Summary {
                individuals: 6,
                loci: 2,
                populations: 2
            }
        );

        let counts = prepared
            .filter_report
            .entries()
            .iter()
            .map(|entry| (entry.stage, entry.counts.loci))
            .collect::<Vec<_>>();
        assert_eq!(
            counts,
            vec![
                (Stage::Repeatability, 5),
                (Stage::CallRate, 4),
                (Stage::Monomorphic, 2)
            ]
        );

        let heterozygosity = analysis.heterozygosity.as_ref().unwrap();
        assert_eq!(heterozygosity.len(), 2);
        assert!(analysis.pcoa.is_ok());

        let fst = analysis.fst.as_ref().unwrap().as_ref().unwrap();
        assert!(fst.get_by_name("AAA", "BBB").unwrap() > 0.);

        Ok(())
    }

    #[test]
    fn test_statistics_isolated() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.csv");
        // BBB has a single individual, so only Fst fails
        fs::write(
            &path,
            "AlleleID,RepAvg,AAA1,AAA2,BBB1\nsnp1,1.0,0,1,2\nsnp2,1.0,1,1,0\n",
        )?;

        let analysis = Pipeline::default().run(&path)?;

        assert!(analysis.heterozygosity.is_ok());
        assert!(analysis.pcoa.is_ok());
        assert!(matches!(analysis.fst, Err(Error::InsufficientData { .. })));

        Ok(())
    }

    #[test]
    fn test_all_loci_filtered() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.csv");
        fs::write(&path, "AlleleID,RepAvg,AAA1,AAA2\nsnp1,0.1,0,1\n")?;

        let analysis = Pipeline::default().run(&path)?;

        assert_eq!(analysis.prepared.filtered().loci, 0);
        assert!(matches!(analysis.heterozygosity, Err(Error::EmptyInput { .. })));
        assert!(matches!(analysis.pcoa, Err(Error::EmptyInput { .. })));
        assert!(matches!(analysis.fst, Ok(None)));

        Ok(())
    }

    #[test]
    fn test_missing_file_aborts() {
        let result = Pipeline::default().run("does/not/exist.csv");

        assert!(matches!(result, Err(Error::MissingFile { .. })));
    }

    #[test]
    fn test_builder() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.csv");
        fs::write(&path, REPORT)?;

        let pipeline = Builder::default()
            .set_filters(FilterChain::disabled())
            .set_prefix_length(1)
            .set_substitutions(Substitutions::try_from_pairs([("AAA", "X")])?)
            .set_axes(NonZeroUsize::new(2).unwrap())
            .build();
        let analysis = pipeline.run(&path)?;

        assert_eq!(analysis.prepared.filtered().loci, 6);
        let populations = analysis.prepared.matrix.populations();
        assert_eq!(populations.names().collect::<Vec<_>>(), vec!["X", "B"]);
        assert_eq!(analysis.pcoa.as_ref().unwrap().axes(), 2);

        Ok(())
    }
}
