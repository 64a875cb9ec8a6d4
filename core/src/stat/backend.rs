//! Numeric routines underlying the statistics.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::{Error, GenotypeMatrix};

use super::LocusCounts;

/// An eigen-decomposition of a distance matrix by classical scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct Ordination {
    /// Eigenvalues, in descending order.
    pub eigenvalues: Vec<f64>,
    /// Unit eigenvectors as columns, in the order of the eigenvalues.
    pub eigenvectors: DMatrix<f64>,
}

/// A provider of the numeric routines used by the statistics.
pub trait Backend {
    /// Returns the symmetric matrix of genetic distances between individuals.
    fn distance_matrix(&self, matrix: &GenotypeMatrix) -> Result<DMatrix<f64>, Error>;

    /// Ordinates individuals from their distance matrix.
    fn ordinate(&self, distances: &DMatrix<f64>) -> Result<Ordination, Error>;

    /// Returns the differentiation between two groups of individuals, given by their row indices.
    fn differentiation(
        &self,
        matrix: &GenotypeMatrix,
        first: &[usize],
        second: &[usize],
    ) -> Result<f64, Error>;
}

impl<B> Backend for &B
where
    B: Backend + ?Sized,
{
    fn distance_matrix(&self, matrix: &GenotypeMatrix) -> Result<DMatrix<f64>, Error> {
        (**self).distance_matrix(matrix)
    }

    fn ordinate(&self, distances: &DMatrix<f64>) -> Result<Ordination, Error> {
        (**self).ordinate(distances)
    }

    fn differentiation(
        &self,
        matrix: &GenotypeMatrix,
        first: &[usize],
        second: &[usize],
    ) -> Result<f64, Error> {
        (**self).differentiation(matrix, first, second)
    }
}

/// The default backend.
///
/// Distances are Euclidean over alternative allele counts, with missing calls imputed by the
/// locus mean. Ordination is classical scaling, and differentiation is the Weir & Cockerham
/// (1984) estimator of θ for two populations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Standard;

impl Backend for Standard {
    fn distance_matrix(&self, matrix: &GenotypeMatrix) -> Result<DMatrix<f64>, Error> {
        let dosages = imputed_dosages(matrix)?;
        let n = dosages.nrows();

        let mut distances = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..i {
                let d = dosages.row(i).metric_distance(&dosages.row(j));
                distances[(i, j)] = d;
                distances[(j, i)] = d;
            }
        }

        Ok(distances)
    }

    fn ordinate(&self, distances: &DMatrix<f64>) -> Result<Ordination, Error> {
        let n = distances.nrows();

        if n != distances.ncols() {
            return Err(Error::malformed(format!(
                "distance matrix must be square, found {n}x{}",
                distances.ncols()
            )));
        }
        if n < 2 {
            return Err(Error::insufficient(format!(
                "ordination requires at least 2 individuals, found {n}"
            )));
        }

        let decomposition = SymmetricEigen::new(double_centre(distances));

        let mut order = (0..n).collect::<Vec<_>>();
        order.sort_by(|&i, &j| {
            decomposition.eigenvalues[j].total_cmp(&decomposition.eigenvalues[i])
        });

        let eigenvalues = order
            .iter()
            .map(|&i| decomposition.eigenvalues[i])
            .collect();
        let eigenvectors = decomposition.eigenvectors.select_columns(order.iter());

        Ok(Ordination {
            eigenvalues,
            eigenvectors,
        })
    }

    fn differentiation(
        &self,
        matrix: &GenotypeMatrix,
        first: &[usize],
        second: &[usize],
    ) -> Result<f64, Error> {
        let (numerator, denominator) = (0..matrix.n_loci())
            .filter_map(|locus| {
                let first = LocusCounts::from_members(matrix, first, locus);
                let second = LocusCounts::from_members(matrix, second, locus);
                variance_components(&first, &second)
            })
            .fold((0., 0.), |(num, denom), (a, b, c)| {
                (num + a, denom + a + b + c)
            });

        if denominator > 0. {
            Ok(numerator / denominator)
        } else {
            Err(Error::insufficient(
                "no informative loci for differentiation",
            ))
        }
    }
}

/// Returns an individual by locus matrix of alternative allele counts, with missing calls
/// replaced by the locus mean. Loci without calls are left out.
pub fn imputed_dosages(matrix: &GenotypeMatrix) -> Result<DMatrix<f64>, Error> {
    if matrix.is_empty() {
        return Err(Error::empty("genetic distances"));
    }

    let columns = (0..matrix.n_loci())
        .filter_map(|locus| {
            let calls = matrix.locus_calls(locus).collect::<Vec<_>>();
            let (sum, called) = calls
                .iter()
                .flatten()
                .fold((0., 0usize), |(sum, n), genotype| {
                    (sum + genotype.dosage(), n + 1)
                });

            (called > 0).then(|| {
                let mean = sum / called as f64;
                calls
                    .into_iter()
                    .map(|call| call.map_or(mean, |genotype| genotype.dosage()))
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    if columns.is_empty() {
        return Err(Error::empty("genetic distances"));
    }

    let n = matrix.n_individuals();
    Ok(DMatrix::from_fn(n, columns.len(), |i, j| columns[j][i]))
}

/// Returns B = -½ J D² J, where J is the centring matrix.
fn double_centre(distances: &DMatrix<f64>) -> DMatrix<f64> {
    let squared = distances.map(|d| d * d);

    let row_means = squared.column_mean();
    let column_means = squared.row_mean();
    let grand_mean = squared.mean();

    DMatrix::from_fn(squared.nrows(), squared.ncols(), |i, j| {
        -0.5 * (squared[(i, j)] - row_means[i] - column_means[j] + grand_mean)
    })
}

/// Returns the Weir & Cockerham variance components (a, b, c) at a locus for two populations,
/// or `None` if the locus is uninformative.
fn variance_components(first: &LocusCounts, second: &LocusCounts) -> Option<(f64, f64, f64)> {
    if first.called == 0 || second.called == 0 {
        return None;
    }

    let (n1, n2) = (first.called as f64, second.called as f64);
    let (p1, p2) = (first.frequency(), second.frequency());
    let (h1, h2) = (first.heterozygosity(), second.heterozygosity());

    let n_sum = n1 + n2;
    let n_bar = n_sum / 2.;
    if n_bar <= 1. {
        return None;
    }
    let n_c = n_sum - (n1 * n1 + n2 * n2) / n_sum;

    let p_bar = (n1 * p1 + n2 * p2) / n_sum;
    let pq = p_bar * (1. - p_bar);
    let s2 = (n1 * (p1 - p_bar).powi(2) + n2 * (p2 - p_bar).powi(2)) / n_bar;
    let h_bar = (n1 * h1 + n2 * h2) / n_sum;

    let a = n_bar / n_c * (s2 - (pq - s2 / 2. - h_bar / 4.) / (n_bar - 1.));
    let b = n_bar / (n_bar - 1.) * (pq - s2 / 2. - (2. * n_bar - 1.) / (4. * n_bar) * h_bar);
    let c = h_bar / 2.;

    Some((a, b, c))
}
