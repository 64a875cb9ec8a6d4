use std::num::NonZeroUsize;

use anyhow::{Context, Error};

use clap::Parser;

use snpqc_core::{output::table, stat::PrincipalCoordinates, Analysis};

use crate::{args::PipelineArgs, out_dir::OutDir};

/// Run quality filtering and population statistics on a genotype report.
///
/// Writes tables of counts, heterozygosity, principal coordinates and pairwise Fst, along with
/// the filtered genotypes and a Markdown report, to the output directory.
#[derive(Debug, Parser)]
pub struct Run {
    #[command(flatten)]
    pub args: PipelineArgs,

    /// Number of principal coordinate axes to retain.
    ///
    /// Axes beyond the number of positive eigenvalues are written with zero scores.
    #[arg(
        short = 'k',
        long,
        default_value_t = NonZeroUsize::new(PrincipalCoordinates::DEFAULT_AXES).unwrap(),
        value_name = "INT"
    )]
    pub axes: NonZeroUsize,

    /// Title of the Markdown report.
    #[arg(long, default_value = "SNP quality control report", value_name = "TEXT")]
    pub title: String,
}

impl Run {
    pub fn run(self) -> Result<(), Error> {
        let pipeline = self.args.pipeline_builder()?.set_axes(self.axes).build();

        let prepared = pipeline.prepare(&self.args.input)?;
        let out_dir = OutDir::create(&self.args.out_dir)?;

        let analysis = pipeline.analyse(prepared);
        write_analysis(&out_dir, &self.title, &analysis)?;

        log::info!("Wrote results to '{}'", out_dir.path().display());

        Ok(())
    }
}

fn write_analysis(out_dir: &OutDir, title: &str, analysis: &Analysis) -> Result<(), Error> {
    let prepared = &analysis.prepared;

    out_dir.write("info.tsv", |f| table::write_info(f, prepared))?;
    out_dir.write("filtering.tsv", |f| {
        table::write_filtering(f, &prepared.filter_report)
    })?;
    out_dir.write("genotypes.tsv", |f| {
        table::write_genotypes(f, &prepared.matrix)
    })?;

    if let Ok(stats) = &analysis.heterozygosity {
        out_dir.write("heterozygosity.tsv", |f| {
            table::write_heterozygosity(f, stats)
        })?;
    }

    if let Ok(pcoa) = &analysis.pcoa {
        out_dir.write("pcoa.tsv", |f| table::write_pcoa(f, pcoa))?;
        out_dir.write("pcoa_eigenvalues.tsv", |f| {
            table::write_eigenvalues(f, pcoa)
        })?;
    }

    if let Ok(Some(fst)) = &analysis.fst {
        out_dir.write("fst.tsv", |f| table::write_fst(f, fst))?;
    }

    let report = out_dir.file("report.md")?;
    snpqc_core::output::write_markdown(report, title, analysis)
        .context("Failed to write 'report.md'")?;

    Ok(())
}
