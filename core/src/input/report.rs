//! Reading DArT-style genotype reports.
//!
//! A report is a CSV file with one row per locus. It may start with any number of descriptive
//! rows whose first field is `*`; in such rows, the leading `*` fields mark the locus metadata
//! columns. Next is a header row naming the metadata columns followed by one column per
//! individual. Every following row holds the metadata and calls for one locus.
//!
//! When there are no `*` rows and no explicit number of metadata columns is given, the first
//! column is taken to be the locus identifier, and the following columns are metadata as long as
//! their header is one of [`KNOWN_METADATA_COLUMNS`].

use std::{io, path::Path};

use crate::{
    genotype::Coding,
    input::{self, metadata},
    Error, GenotypeMatrix, Individual, Locus,
};

/// Header names recognised as locus metadata.
pub const KNOWN_METADATA_COLUMNS: [&str; 20] = [
    "AlleleID",
    "CloneID",
    "AlleleSequence",
    "TrimmedSequence",
    "SNP",
    "SnpPosition",
    "CallRate",
    "OneRatioRef",
    "OneRatioSnp",
    "FreqHomRef",
    "FreqHomSnp",
    "FreqHets",
    "PICRef",
    "PICSnp",
    "AvgPIC",
    "AvgCountRef",
    "AvgCountSnp",
    "RepAvg",
    "Chrom",
    "ChromPos",
];

/// Header of the repeatability metric column.
pub const REPEATABILITY_COLUMN: &str = "RepAvg";

const TOP_ROW_MARKER: &str = "*";

/// A builder for reading a genotype report.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    coding: Coding,
    metadata_columns: Option<usize>,
}

impl Builder {
    /// Reads a report from a path, which may be gzip-compressed.
    pub fn read_from_path<P>(self, path: P) -> Result<GenotypeMatrix, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        log::info!("Reading genotype report from '{}'", path.display());

        self.read(input::open(path)?)
    }

    /// Reads a report from a path, after which an optional individual metadata file assigns
    /// populations.
    pub fn read_with_metadata<P>(
        self,
        path: P,
        metadata_path: Option<&Path>,
    ) -> Result<GenotypeMatrix, Error>
    where
        P: AsRef<Path>,
    {
        let matrix = self.read_from_path(path)?;

        match metadata_path {
            Some(metadata_path) => {
                let assignments = metadata::read_from_path(metadata_path)?;
                metadata::assign_populations(matrix, &assignments)
            }
            None => Ok(matrix),
        }
    }

    /// Reads a report from a reader.
    pub fn read<R>(self, reader: R) -> Result<GenotypeMatrix, Error>
    where
        R: io::Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = csv_reader.records();

        let mut top_metadata_columns = None;
        let header = loop {
            match records.next() {
                Some(record) => {
                    let record = record?;

                    if record.get(0) == Some(TOP_ROW_MARKER) {
                        top_metadata_columns.get_or_insert_with(|| {
                            record.iter().take_while(|f| *f == TOP_ROW_MARKER).count()
                        });
                    } else {
                        break record;
                    }
                }
                None => return Err(Error::malformed("report has no header row")),
            }
        };

        let metadata_columns = self
            .metadata_columns
            .or(top_metadata_columns)
            .unwrap_or_else(|| detect_metadata_columns(header.iter()));

        if metadata_columns == 0 {
            return Err(Error::malformed("report has no locus identifier column"));
        }
        if metadata_columns >= header.len() {
            return Err(Error::malformed(format!(
                "report has no individual columns (found {} columns, {} of which are metadata)",
                header.len(),
                metadata_columns
            )));
        }

        let repeatability_column = header
            .iter()
            .take(metadata_columns)
            .position(|name| name == REPEATABILITY_COLUMN);
        if repeatability_column.is_none() {
            log::debug!("Report has no '{REPEATABILITY_COLUMN}' column");
        }

        let individuals = header
            .iter()
            .skip(metadata_columns)
            .map(Individual::unassigned)
            .collect::<Vec<_>>();
        log::debug!(
            "Using {metadata_columns} metadata columns and {} individual columns",
            individuals.len()
        );

        let mut loci = Vec::new();
        let mut columns = Vec::new();

        for record in records {
            let record = record?;
            let line = record.position().map_or(0, |position| position.line());

            if record.len() != header.len() {
                return Err(Error::malformed(format!(
                    "line {line}: expected {} fields, found {}",
                    header.len(),
                    record.len()
                )));
            }

            let repeatability = repeatability_column
                .and_then(|column| record.get(column))
                .map(|field| parse_metric(field, line))
                .transpose()?
                .flatten();

            let calls = record
                .iter()
                .skip(metadata_columns)
                .map(|token| {
                    self.coding
                        .parse(token)
                        .map_err(|e| Error::malformed(format!("line {line}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;

            loci.push(Locus::new(&record[0], repeatability));
            columns.push(calls);
        }

        log::info!(
            "Read {} loci for {} individuals",
            loci.len(),
            individuals.len()
        );

        GenotypeMatrix::from_columns(individuals, loci, columns)
    }

    /// Sets the coding of genotype calls.
    ///
    /// By default, calls are read as alternative allele counts.
    pub fn set_coding(mut self, coding: Coding) -> Self {
        self.coding = coding;
        self
    }

    /// Sets the number of leading locus metadata columns.
    ///
    /// By default, this is detected from the report.
    pub fn set_metadata_columns(mut self, metadata_columns: Option<usize>) -> Self {
        self.metadata_columns = metadata_columns;
        self
    }
}

fn detect_metadata_columns<'a, I>(mut header: I) -> usize
where
    I: Iterator<Item = &'a str>,
{
    match header.next() {
        Some(_) => 1 + header
            .take_while(|name| KNOWN_METADATA_COLUMNS.contains(name))
            .count(),
        None => 0,
    }
}

fn parse_metric(field: &str, line: u64) -> Result<Option<f64>, Error> {
    if input::is_missing(field) {
        Ok(None)
    } else {
        field.parse::<f64>().map(Some).map_err(|_| {
            Error::malformed(format!(
                "line {line}: invalid {REPEATABILITY_COLUMN} value '{field}'"
            ))
        })
    }
}
