//! Tab-separated tables.

use std::io;

use crate::{
    filter::FilterReport,
    pipeline::Prepared,
    stat::{Heterozygosity, PairwiseFst, PrincipalCoordinates},
    Error, GenotypeMatrix,
};

use super::{format_float, MISSING};

fn writer<W>(writer: W) -> csv::Writer<W>
where
    W: io::Write,
{
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer)
}

/// Writes individual, locus and population counts as loaded, after normalization, and after
/// filtering.
pub fn write_info<W>(writer: W, prepared: &Prepared) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);
    writer.write_record(["step", "individuals", "loci", "populations"])?;

    for (step, summary) in [
        ("loaded", prepared.loaded),
        ("normalized", prepared.normalized),
        ("filtered", prepared.filtered()),
    ] {
        writer.write_record([
            step.to_string(),
            summary.individuals.to_string(),
            summary.loci.to_string(),
            summary.populations.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the counts before filtering and after each filter stage.
pub fn write_filtering<W>(writer: W, report: &FilterReport) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);
    writer.write_record(["stage", "status", "loci", "individuals"])?;

    let initial = report.initial();
    writer.write_record([
        "loaded".to_string(),
        MISSING.to_string(),
        initial.loci.to_string(),
        initial.individuals.to_string(),
    ])?;

    for entry in report.entries() {
        writer.write_record([
            entry.stage.to_string(),
            entry.status.to_string(),
            entry.counts.loci.to_string(),
            entry.counts.individuals.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes heterozygosity per population.
pub fn write_heterozygosity<W>(writer: W, stats: &[Heterozygosity]) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);
    writer.write_record(["population", "n_ind", "n_loc", "ho", "he"])?;

    for stat in stats {
        writer.write_record([
            stat.population.clone(),
            stat.individuals.to_string(),
            stat.loci.to_string(),
            format_float(stat.observed),
            format_float(stat.expected),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes principal coordinate scores, one row per individual.
pub fn write_pcoa<W>(writer: W, pcoa: &PrincipalCoordinates) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);

    let header = ["id".to_string(), "population".to_string()]
        .into_iter()
        .chain((1..=pcoa.axes()).map(|axis| format!("PC{axis}")));
    writer.write_record(header)?;

    for (i, individual) in pcoa.individuals().iter().enumerate() {
        let record = [individual.id().to_string(), individual.population().to_string()]
            .into_iter()
            .chain((0..pcoa.axes()).map(|axis| format_float(pcoa.score(i, axis))));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes principal coordinate eigenvalues and the percentage of variance they explain.
pub fn write_eigenvalues<W>(writer: W, pcoa: &PrincipalCoordinates) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);
    writer.write_record(["axis", "eigenvalue", "explained_percent"])?;

    for (axis, (eigenvalue, percent)) in pcoa
        .eigenvalues()
        .iter()
        .zip(pcoa.explained_percent())
        .enumerate()
    {
        writer.write_record([
            format!("PC{}", axis + 1),
            format_float(*eigenvalue),
            format!("{percent:.1}"),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes pairwise Fst as a square matrix, with population names as header and first column.
pub fn write_fst<W>(writer: W, fst: &PairwiseFst) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);

    let header = std::iter::once("population")
        .chain(fst.populations().iter().map(String::as_str));
    writer.write_record(header)?;

    for (i, population) in fst.populations().iter().enumerate() {
        let record = std::iter::once(population.clone())
            .chain((0..fst.populations().len()).map(|j| format_float(fst.get(i, j))));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes a genotype matrix with one row per individual, calls as alternative allele counts.
pub fn write_genotypes<W>(writer: W, matrix: &GenotypeMatrix) -> Result<(), Error>
where
    W: io::Write,
{
    let mut writer = self::writer(writer);

    let header = ["id", "population"]
        .into_iter()
        .chain(matrix.loci().iter().map(|locus| locus.id()));
    writer.write_record(header)?;

    for (i, individual) in matrix.individuals().iter().enumerate() {
        let record = [individual.id().to_string(), individual.population().to_string()]
            .into_iter()
            .chain(matrix.row(i).iter().map(|call| match call {
                Some(genotype) => genotype.to_string(),
                None => MISSING.to_string(),
            }));
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::num::NonZeroUsize;

    use crate::{matrix::tests::matrix_from, stat::Standard, FilterChain};

    fn to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), Error>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn matrix() -> GenotypeMatrix {
        matrix_from(
            &["a1", "a2", "b1", "b2"],
            &["A", "A", "B", "B"],
            &[&[0, 1, 0], &[0, 9, 0], &[2, 1, 0], &[2, 2, 0]],
        )
    }

    #[test]
    fn test_write_filtering() {
        let (_, report) = FilterChain::default().run(matrix());

        let s = to_string(|buf| write_filtering(buf, &report));

        assert_eq!(
            s,
            "\
stage\tstatus\tloci\tindividuals
loaded\tNA\t3\t4
repeatability\tapplied\t3\t4
call_rate\tapplied\t2\t4
monomorphic\tapplied\t1\t4
"
        );
    }

    #[test]
    fn test_write_info() {
        let matrix = matrix();
        let loaded = matrix.summary();
        let (matrix, filter_report) = FilterChain::default().run(matrix);
        let prepared = Prepared {
            loaded,
            normalized: loaded,
            matrix,
            filter_report,
        };

        let s = to_string(|buf| write_info(buf, &prepared));

        assert_eq!(
            s,
            "\
step\tindividuals\tloci\tpopulations
loaded\t4\t3\t2
normalized\t4\t3\t2
filtered\t4\t1\t2
"
        );
    }

    #[test]
    fn test_write_heterozygosity() {
        let stats = Heterozygosity::compute(&matrix()).unwrap();

        let s = to_string(|buf| write_heterozygosity(buf, &stats));

        assert_eq!(
            s,
            "\
population\tn_ind\tn_loc\tho\the
A\t2\t3\t0.333333\t0.166667
B\t2\t3\t0.166667\t0.125000
"
        );
    }

    #[test]
    fn test_write_genotypes() {
        let s = to_string(|buf| write_genotypes(buf, &matrix()));

        let lines = s.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "id\tpopulation\tsnp0\tsnp1\tsnp2");
        assert_eq!(lines[2], "a2\tA\t0\tNA\t0");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_write_pcoa() {
        let axes = NonZeroUsize::new(2).unwrap();
        let pcoa = PrincipalCoordinates::compute(&matrix(), axes, &Standard).unwrap();

        let scores = to_string(|buf| write_pcoa(buf, &pcoa));
        let eigenvalues = to_string(|buf| write_eigenvalues(buf, &pcoa));

        assert!(scores.starts_with("id\tpopulation\tPC1\tPC2\n"));
        assert_eq!(scores.lines().count(), 5);
        assert!(eigenvalues.starts_with("axis\teigenvalue\texplained_percent\nPC1\t"));
        assert_eq!(eigenvalues.lines().count(), 3);
    }

    #[test]
    fn test_write_fst() {
        let matrix = matrix_from(
            &["a1", "a2", "b1", "b2"],
            &["A", "A", "B", "B"],
            &[&[0], &[0], &[2], &[2]],
        );
        let fst = PairwiseFst::compute(&matrix, &Standard).unwrap().unwrap();

        let s = to_string(|buf| write_fst(buf, &fst));

        assert_eq!(
            s,
            "\
population\tA\tB
A\t0.000000\t1.000000
B\t1.000000\t0.000000
"
        );
    }

    #[test]
    fn test_write_fst_undefined_pair() {
        let matrix = matrix_from(
            &["a1", "a2", "b1", "b2", "c1", "c2"],
            &["A", "A", "B", "B", "C", "C"],
            &[&[0], &[0], &[0], &[0], &[2], &[2]],
        );
        let fst = PairwiseFst::compute(&matrix, &Standard).unwrap().unwrap();

        let s = to_string(|buf| write_fst(buf, &fst));

        assert_eq!(
            s,
            "\
population\tA\tB\tC
A\t0.000000\tNA\t1.000000
B\tNA\t0.000000\t1.000000
C\t1.000000\t1.000000\t0.000000
"
        );
    }
}
