//! Markdown report.

use std::io;

use crate::{
    filter::FilterReport,
    pipeline::{Analysis, Prepared},
    stat::{Heterozygosity, PairwiseFst, PrincipalCoordinates},
    Error,
};

use super::{format_float, MISSING};

/// Writes a Markdown report of a pipeline run.
///
/// Statistics that failed are reported by their error message in place of their table.
pub fn write_markdown<W>(mut writer: W, title: &str, analysis: &Analysis) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(writer, "# {title}")?;

    writeln!(writer, "\n## Data\n")?;
    write_info(&mut writer, &analysis.prepared)?;

    writeln!(writer, "\n## Filtering\n")?;
    write_filtering(&mut writer, &analysis.prepared.filter_report)?;

    writeln!(writer, "\n## Heterozygosity\n")?;
    match &analysis.heterozygosity {
        Ok(stats) => write_heterozygosity(&mut writer, stats)?,
        Err(e) => write_failure(&mut writer, e)?,
    }

    writeln!(writer, "\n## Principal coordinates\n")?;
    match &analysis.pcoa {
        Ok(pcoa) => write_pcoa(&mut writer, pcoa)?,
        Err(e) => write_failure(&mut writer, e)?,
    }

    writeln!(writer, "\n## Pairwise Fst\n")?;
    match &analysis.fst {
        Ok(Some(fst)) => write_fst(&mut writer, fst)?,
        Ok(None) => writeln!(writer, "Not computed: fewer than two populations.")?,
        Err(e) => write_failure(&mut writer, e)?,
    }

    writer.flush()
}

fn write_failure<W>(writer: &mut W, error: &Error) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(writer, "Not computed: {error}.")
}

fn write_row<W, I, T>(writer: &mut W, cells: I) -> io::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    write!(writer, "|")?;
    for cell in cells {
        write!(writer, " {} |", cell.as_ref().replace('|', "\\|"))?;
    }
    writeln!(writer)
}

fn write_header<W, I, T>(writer: &mut W, cells: I) -> io::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let cells = cells.into_iter().collect::<Vec<_>>();
    let n = cells.len();

    write_row(writer, cells)?;
    write_row(writer, std::iter::repeat("---").take(n))
}

fn write_info<W>(writer: &mut W, prepared: &Prepared) -> io::Result<()>
where
    W: io::Write,
{
    write_header(writer, ["", "Individuals", "Loci", "Populations"])?;

    for (step, summary) in [
        ("Loaded", prepared.loaded),
        ("Normalized", prepared.normalized),
        ("Filtered", prepared.filtered()),
    ] {
        write_row(
            writer,
            [
                step.to_string(),
                summary.individuals.to_string(),
                summary.loci.to_string(),
                summary.populations.to_string(),
            ],
        )?;
    }

    Ok(())
}

fn write_filtering<W>(writer: &mut W, report: &FilterReport) -> io::Result<()>
where
    W: io::Write,
{
    write_header(writer, ["Stage", "Status", "Loci", "Individuals"])?;

    let initial = report.initial();
    write_row(
        writer,
        [
            "loaded".to_string(),
            MISSING.to_string(),
            initial.loci.to_string(),
            initial.individuals.to_string(),
        ],
    )?;

    for entry in report.entries() {
        write_row(
            writer,
            [
                entry.stage.to_string(),
                entry.status.to_string(),
                entry.counts.loci.to_string(),
                entry.counts.individuals.to_string(),
            ],
        )?;
    }

    if report.final_counts().loci == 0 {
        writeln!(writer, "\nNo loci remain after filtering.")?;
    }

    Ok(())
}

fn write_heterozygosity<W>(writer: &mut W, stats: &[Heterozygosity]) -> io::Result<()>
where
    W: io::Write,
{
    write_header(writer, ["Population", "Individuals", "Loci", "Ho", "He"])?;

    for stat in stats {
        write_row(
            writer,
            [
                stat.population.clone(),
                stat.individuals.to_string(),
                stat.loci.to_string(),
                format_float(stat.observed),
                format_float(stat.expected),
            ],
        )?;
    }

    Ok(())
}

fn write_pcoa<W>(writer: &mut W, pcoa: &PrincipalCoordinates) -> io::Result<()>
where
    W: io::Write,
{
    write_header(writer, ["Axis", "Eigenvalue", "Explained (%)"])?;

    for (axis, (eigenvalue, percent)) in pcoa
        .eigenvalues()
        .iter()
        .zip(pcoa.explained_percent())
        .enumerate()
    {
        write_row(
            writer,
            [
                format!("PC{}", axis + 1),
                format_float(*eigenvalue),
                format!("{percent:.1}"),
            ],
        )?;
    }

    Ok(())
}

fn write_fst<W>(writer: &mut W, fst: &PairwiseFst) -> io::Result<()>
where
    W: io::Write,
{
    write_header(
        writer,
        std::iter::once("").chain(fst.populations().iter().map(String::as_str)),
    )?;

    for (i, population) in fst.populations().iter().enumerate() {
        write_row(
            writer,
            std::iter::once(population.clone())
                .chain((0..fst.populations().len()).map(|j| format_float(fst.get(i, j)))),
        )?;
    }

    Ok(())
}
