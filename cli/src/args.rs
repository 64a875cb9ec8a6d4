use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::{Args, ValueEnum};

use snpqc_core::{genotype, pipeline, FilterChain, Normalizer, Substitutions};

/// Arguments shared by subcommands that load and filter a report.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Input genotype report.
    ///
    /// A DArT-style CSV file with one row per locus, optionally gzip-compressed.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory.
    ///
    /// Created if it does not exist. Existing files are overwritten.
    #[arg(short = 'o', long, default_value = "snpqc-out", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Coding of genotype calls in the report.
    #[arg(long, value_enum, default_value_t = CallCoding::Dosage, value_name = "CODING")]
    pub coding: CallCoding,

    /// Number of leading locus metadata columns in the report.
    ///
    /// By default, this is taken from leading rows of '*' in the report if present, and otherwise
    /// detected from known column names.
    #[arg(long, value_name = "INT")]
    pub metadata_columns: Option<usize>,

    /// Individual metadata file.
    ///
    /// A comma- or tab-separated file with a header including an 'id' and a 'pop' column, used to
    /// assign populations to individuals.
    #[arg(short = 'm', long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Substitution applied to individual identifiers.
    ///
    /// Every occurrence of FROM is replaced by TO. Can be given multiple times, and substitutions
    /// are applied in the order given.
    #[arg(
        short = 's',
        long = "substitute",
        value_parser = parse_substitution,
        value_name = "FROM=TO"
    )]
    pub substitutions: Vec<(String, String)>,

    /// File of substitutions applied to individual identifiers.
    ///
    /// Two columns separated by a tab or a comma, without header. Applied after any substitutions
    /// given on the command line.
    #[arg(short = 'S', long, value_name = "FILE")]
    pub substitutions_file: Option<PathBuf>,

    /// Number of identifier characters used as population label.
    ///
    /// Only used when all individuals belong to the same population after loading.
    #[arg(long, default_value_t = Normalizer::DEFAULT_PREFIX_LENGTH, value_name = "INT")]
    pub prefix_length: usize,

    /// Minimum locus repeatability.
    #[arg(
        long,
        default_value_t = FilterChain::DEFAULT_REPEATABILITY,
        value_parser = parse_unit_interval,
        value_name = "FLOAT"
    )]
    pub repeatability: f64,

    /// Minimum locus call rate.
    #[arg(
        long,
        default_value_t = FilterChain::DEFAULT_CALL_RATE,
        value_parser = parse_unit_interval,
        value_name = "FLOAT"
    )]
    pub call_rate: f64,

    /// Disable the repeatability filter.
    #[arg(long)]
    pub no_repeatability_filter: bool,

    /// Disable the call rate filter.
    #[arg(long)]
    pub no_call_rate_filter: bool,

    /// Disable the monomorphic locus filter.
    #[arg(long)]
    pub no_monomorphic_filter: bool,
}

impl PipelineArgs {
    /// Returns the filter chain.
    pub fn filter_chain(&self) -> FilterChain {
        FilterChain::default()
            .set_repeatability((!self.no_repeatability_filter).then_some(self.repeatability))
            .set_call_rate((!self.no_call_rate_filter).then_some(self.call_rate))
            .set_monomorphic(!self.no_monomorphic_filter)
    }

    /// Returns a pipeline builder configured by the arguments.
    pub fn pipeline_builder(&self) -> Result<pipeline::Builder, Error> {
        Ok(pipeline::Builder::default()
            .set_coding(self.coding.into())
            .set_metadata_columns(self.metadata_columns)
            .set_metadata_path(self.metadata.clone())
            .set_substitutions(self.substitutions()?)
            .set_prefix_length(self.prefix_length)
            .set_filters(self.filter_chain()))
    }

    /// Returns the substitutions from the command line followed by those from file.
    pub fn substitutions(&self) -> Result<Substitutions, Error> {
        let mut pairs = self.substitutions.clone();

        if let Some(path) = &self.substitutions_file {
            let from_file = Substitutions::read_from_path(path).with_context(|| {
                format!("Failed to read substitutions from '{}'", path.display())
            })?;
            pairs.extend(from_file.iter().map(|(from, to)| (from.to_string(), to.to_string())));
        }

        Ok(Substitutions::try_from_pairs(pairs)?)
    }
}

/// Coding of genotype calls.
#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallCoding {
    /// Number of alternative alleles: 0, 1 (heterozygous), 2.
    Dosage,
    /// DArT one-row SNP coding: 0 (homozygous reference), 1 (homozygous SNP), 2 (heterozygous).
    Dart,
}

impl From<CallCoding> for genotype::Coding {
    fn from(coding: CallCoding) -> Self {
        match coding {
            CallCoding::Dosage => genotype::Coding::Dosage,
            CallCoding::Dart => genotype::Coding::Dart,
        }
    }
}

fn parse_substitution(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some(("", _)) => Err(String::from("substitution pattern must not be empty")),
        Some((from, to)) => Ok((from.to_string(), to.to_string())),
        None => Err(format!("expected FROM=TO, found '{s}'")),
    }
}

fn parse_unit_interval(s: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|_| format!("'{s}' is not a number"))?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}
