use anyhow::Error;

use clap::Parser;

use snpqc_core::output::table;

use crate::{args::PipelineArgs, out_dir::OutDir};

/// Filter a genotype report without computing statistics.
///
/// Writes counts and the filtered genotypes to the output directory.
#[derive(Debug, Parser)]
pub struct Filter {
    #[command(flatten)]
    pub args: PipelineArgs,
}

impl Filter {
    pub fn run(self) -> Result<(), Error> {
        let pipeline = self.args.pipeline_builder()?.build();

        let prepared = pipeline.prepare(&self.args.input)?;
        let out_dir = OutDir::create(&self.args.out_dir)?;

        out_dir.write("info.tsv", |f| table::write_info(f, &prepared))?;
        out_dir.write("filtering.tsv", |f| {
            table::write_filtering(f, &prepared.filter_report)
        })?;
        out_dir.write("genotypes.tsv", |f| {
            table::write_genotypes(f, &prepared.matrix)
        })?;

        let counts = prepared.filter_report.final_counts();
        log::info!(
            "Kept {} of {} loci for {} individuals",
            counts.loci,
            prepared.filter_report.initial().loci,
            counts.individuals
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::error::ErrorKind as ClapErrorKind;

    use crate::{
        args::CallCoding,
        tests::{parse_subcmd, try_parse_subcmd},
    };

    #[test]
    fn test_parse() {
        let filter = parse_subcmd::<Filter>(
            "snpqc filter --coding dart --metadata-columns 18 -m pops.csv -o out report.csv",
        );

        assert_eq!(filter.args.coding, CallCoding::Dart);
        assert_eq!(filter.args.metadata_columns, Some(18));
        assert_eq!(filter.args.metadata.unwrap().to_str(), Some("pops.csv"));
        assert_eq!(filter.args.out_dir.to_str(), Some("out"));
    }

    #[test]
    fn test_no_axes() {
        let result = try_parse_subcmd::<Filter>("snpqc filter --axes 2 report.csv");

        assert_eq!(result.unwrap_err().kind(), ClapErrorKind::UnknownArgument);
    }
}
