use std::num::NonZeroUsize;

use nalgebra::DMatrix;

use crate::{Error, GenotypeMatrix, Individual};

use super::Backend;

/// Relative size below which an eigenvalue is treated as zero.
const EIGENVALUE_TOLERANCE: f64 = 1e-8;

/// A principal coordinate analysis of individuals.
///
/// Every individual has a score on each of the requested axes. Axes beyond the number of positive
/// eigenvalues have eigenvalue zero, explain nothing, and score zero for every individual.
///
/// The sign of each axis is fixed so that the individual with the largest absolute score on that
/// axis has a positive score. If several individuals share the largest absolute score, the first
/// of them decides.
#[derive(Clone, Debug, PartialEq)]
pub struct PrincipalCoordinates {
    individuals: Vec<Individual>,
    scores: DMatrix<f64>,
    eigenvalues: Vec<f64>,
    explained: Vec<f64>,
}

impl PrincipalCoordinates {
    /// Default number of axes to retain.
    pub const DEFAULT_AXES: usize = 3;

    /// Computes the principal coordinates of the individuals in a matrix.
    ///
    /// Exactly `axes` axes are returned, padded with zero axes if there are fewer positive
    /// eigenvalues.
    pub fn compute<B>(
        matrix: &GenotypeMatrix,
        axes: NonZeroUsize,
        backend: &B,
    ) -> Result<Self, Error>
    where
        B: Backend + ?Sized,
    {
        if matrix.is_empty() {
            return Err(Error::empty("principal coordinates"));
        }
        if matrix.n_individuals() < 2 {
            return Err(Error::insufficient(format!(
                "principal coordinates require at least 2 individuals, found {}",
                matrix.n_individuals()
            )));
        }

        let distances = backend.distance_matrix(matrix)?;
        if distances.iter().all(|&d| d == 0.) {
            return Err(Error::insufficient(
                "principal coordinates require individuals with distinct genotypes",
            ));
        }

        let ordination = backend.ordinate(&distances)?;

        let largest = ordination.eigenvalues.first().copied().unwrap_or(0.);
        let positive = ordination
            .eigenvalues
            .iter()
            .take_while(|&&value| value > EIGENVALUE_TOLERANCE * largest.abs())
            .count();

        if positive == 0 {
            return Err(Error::insufficient(
                "principal coordinates require at least one positive eigenvalue",
            ));
        }

        let retained = axes.get().min(positive);
        if retained < axes.get() {
            log::warn!(
                "Only {positive} positive eigenvalues, padding {} of {axes} requested axes with zeros",
                axes.get() - retained
            );
        }

        let total = ordination.eigenvalues[..positive].iter().sum::<f64>();
        let mut eigenvalues = ordination.eigenvalues[..retained].to_vec();
        eigenvalues.resize(axes.get(), 0.);
        let explained = eigenvalues.iter().map(|value| value / total).collect();

        let mut scores = DMatrix::zeros(matrix.n_individuals(), axes.get());
        scores
            .columns_mut(0, retained)
            .copy_from(&ordination.eigenvectors.columns(0, retained));
        for (mut column, value) in scores.column_iter_mut().zip(&eigenvalues).take(retained) {
            column *= value.sqrt();

            if column[index_of_largest(column.as_slice())] < 0. {
                column.neg_mut();
            }
        }

        log::info!(
            "Computed {retained} informative principal coordinate axes for {} individuals",
            matrix.n_individuals()
        );

        Ok(Self {
            individuals: matrix.individuals().to_vec(),
            scores,
            eigenvalues,
            explained,
        })
    }

    /// Returns the number of axes.
    pub fn axes(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Returns the number of axes with a positive eigenvalue.
    pub fn informative_axes(&self) -> usize {
        self.eigenvalues.iter().take_while(|&&value| value > 0.).count()
    }

    /// Returns the eigenvalues of the axes, in descending order.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Returns the fraction of the total positive eigenvalue sum explained by each axis.
    pub fn explained_fraction(&self) -> &[f64] {
        &self.explained
    }

    /// Returns the percentage of variance explained by each axis, rounded to one
    /// decimal.
    pub fn explained_percent(&self) -> Vec<f64> {
        self.explained
            .iter()
            .map(|fraction| (fraction * 1000.).round() / 10.)
            .collect()
    }

    /// Returns the individuals, in row order of the scores.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Returns the score of an individual on an axis.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn score(&self, individual: usize, axis: usize) -> f64 {
        self.scores[(individual, axis)]
    }

    /// Returns the matrix of scores, with one row per individual and one column per axis.
    pub fn scores(&self) -> &DMatrix<f64> {
        &self.scores
    }
}

/// Returns the index of the first value with the largest absolute value.
fn index_of_largest(values: &[f64]) -> usize {
    let largest = values.iter().fold(0f64, |max, value| max.max(value.abs()));
    let tolerance = EIGENVALUE_TOLERANCE * largest;

    values
        .iter()
        .position(|value| value.abs() >= largest - tolerance)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{matrix::tests::matrix_from, stat::Standard};

    fn axes(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn four_individuals() -> GenotypeMatrix {
        matrix_from(
            &["a", "b", "c", "d"],
            &["A", "A", "B", "B"],
            &[&[0, 0, 1, 2], &[0, 1, 1, 2], &[2, 2, 0, 0], &[2, 1, 9, 0]],
        )
    }

    #[test]
    fn test_explained_variance() -> Result<(), Error> {
        let pcoa = PrincipalCoordinates::compute(&four_individuals(), axes(3), &Standard)?;

        let explained = pcoa.explained_fraction();
        assert!(explained.iter().sum::<f64>() <= 1. + 1e-12);
        assert!(explained.windows(2).all(|w| w[0] >= w[1]));
        assert!(pcoa.eigenvalues().windows(2).all(|w| w[0] >= w[1]));

        let percent = pcoa.explained_percent();
        for (p, f) in percent.iter().zip(explained) {
            assert_approx_eq!(*p, (f * 1000.).round() / 10.);
        }

        Ok(())
    }

    #[test]
    fn test_line_pads_axes() -> Result<(), Error> {
        // Individuals on a line in genotype space give one positive eigenvalue
        let matrix = matrix_from(&["a", "b", "c"], &["p"; 3], &[&[0, 0], &[1, 1], &[2, 2]]);

        let pcoa = PrincipalCoordinates::compute(&matrix, axes(3), &Standard)?;

        assert_eq!(pcoa.axes(), 3);
        assert_eq!(pcoa.informative_axes(), 1);
        assert_eq!(pcoa.scores().shape(), (3, 3));
        assert_eq!(pcoa.explained_percent(), vec![100., 0., 0.]);
        assert_eq!(&pcoa.eigenvalues()[1..], &[0., 0.]);
        assert_approx_eq!(pcoa.score(1, 0), 0., epsilon = 1e-9);
        assert_approx_eq!(pcoa.score(0, 0).abs(), 2f64.sqrt(), epsilon = 1e-9);
        for i in 0..3 {
            assert_eq!(pcoa.score(i, 1), 0.);
            assert_eq!(pcoa.score(i, 2), 0.);
        }

        Ok(())
    }

    #[test]
    fn test_three_individuals_have_three_axes() -> Result<(), Error> {
        let matrix = matrix_from(&["a", "b", "c"], &["p"; 3], &[&[0, 1], &[1, 2], &[2, 2]]);

        let pcoa = PrincipalCoordinates::compute(&matrix, axes(3), &Standard)?;

        assert_eq!(pcoa.axes(), 3);
        assert_eq!(pcoa.informative_axes(), 2);
        assert_eq!(pcoa.scores().shape(), (3, 3));
        assert_eq!(pcoa.explained_percent()[2], 0.);

        Ok(())
    }

    #[test]
    fn test_sign_convention() -> Result<(), Error> {
        let matrix = matrix_from(
            &["a", "b", "c", "d"],
            &["p"; 4],
            &[&[0, 0], &[0, 1], &[1, 0], &[2, 2]],
        );

        let pcoa = PrincipalCoordinates::compute(&matrix, axes(2), &Standard)?;

        for axis in 0..pcoa.informative_axes() {
            let column = pcoa.scores().column(axis);
            let largest = index_of_largest(column.as_slice());
            assert!(pcoa.score(largest, axis) > 0.);
        }

        Ok(())
    }

    #[test]
    fn test_distances_preserved() -> Result<(), Error> {
        let matrix = four_individuals();
        let distances = Standard.distance_matrix(&matrix)?;

        let pcoa = PrincipalCoordinates::compute(&matrix, axes(4), &Standard)?;

        let scores = pcoa.scores();
        for i in 0..4 {
            for j in 0..4 {
                let d = scores.row(i).metric_distance(&scores.row(j));
                assert_approx_eq!(d, distances[(i, j)], epsilon = 1e-9);
            }
        }

        Ok(())
    }

    #[test]
    fn test_index_of_largest_ties() {
        assert_eq!(index_of_largest(&[1., -3., 3., 2.]), 1);
        assert_eq!(index_of_largest(&[0., 0.]), 0);
    }

    #[test]
    fn test_single_individual() {
        let matrix = matrix_from(&["a"], &["p"], &[&[0, 1]]);

        let result = PrincipalCoordinates::compute(&matrix, axes(3), &Standard);

        assert!(matches!(result, Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_identical_individuals() {
        let matrix = matrix_from(&["a", "b"], &["p"; 2], &[&[0, 1], &[0, 1]]);

        let result = PrincipalCoordinates::compute(&matrix, axes(3), &Standard);

        assert!(matches!(result, Err(Error::InsufficientData { .. })));
    }

    #[test]
    fn test_no_loci() {
        let matrix = four_individuals().retain_loci(|_| false);

        let result = PrincipalCoordinates::compute(&matrix, axes(3), &Standard);

        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }
}
