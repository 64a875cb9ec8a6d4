use std::num::NonZeroUsize;

use proptest::prelude::*;

use snpqc_core::{
    stat::{Heterozygosity, PairwiseFst, PrincipalCoordinates, Standard},
    FilterChain, Genotype, GenotypeMatrix, Individual, Locus,
};

const POPULATIONS: [&str; 3] = ["A", "B", "C"];

/// Raw calls, with 3 standing in for a missing call.
fn calls(individuals: usize, loci: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..4, loci), individuals)
}

fn matrix() -> impl Strategy<Value = GenotypeMatrix> {
    (2usize..10, 1usize..16)
        .prop_flat_map(|(individuals, loci)| {
            (
                calls(individuals, loci),
                prop::collection::vec(0usize..POPULATIONS.len(), individuals),
                prop::collection::vec(prop::option::of(0.5f64..1.0), loci),
            )
        })
        .prop_map(|(rows, populations, repeatability)| {
            let individuals = populations
                .iter()
                .enumerate()
                .map(|(i, &pop)| Individual::new(format!("ind{i}"), POPULATIONS[pop]))
                .collect();
            let loci = repeatability
                .into_iter()
                .enumerate()
                .map(|(j, repeatability)| Locus::new(format!("snp{j}"), repeatability))
                .collect();
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(Genotype::try_from_raw).collect())
                .collect();

            GenotypeMatrix::from_rows(individuals, loci, rows).unwrap()
        })
}

fn filter_chain() -> impl Strategy<Value = FilterChain> {
    (
        prop::option::of(0.5f64..1.0),
        prop::option::of(0.0f64..=1.0),
        any::<bool>(),
    )
        .prop_map(|(repeatability, call_rate, monomorphic)| {
            FilterChain::default()
                .set_repeatability(repeatability)
                .set_call_rate(call_rate)
                .set_monomorphic(monomorphic)
        })
}

proptest! {
    #[test]
    fn prop_filtering_is_idempotent(matrix in matrix(), chain in filter_chain()) {
        let (once, _) = chain.run(matrix);
        let (twice, report) = chain.run(once.clone());

        prop_assert_eq!(report.final_counts(), report.initial());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_call_rate_threshold_is_monotone(
        matrix in matrix(),
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        let retained = |threshold| {
            FilterChain::disabled()
                .set_call_rate(Some(threshold))
                .run(matrix.clone())
                .0
                .n_loci()
        };

        prop_assert!(retained(high) <= retained(low));
    }

    #[test]
    fn prop_filtering_keeps_individuals(matrix in matrix(), chain in filter_chain()) {
        let individuals = matrix.individuals().to_vec();

        let (filtered, report) = chain.run(matrix);

        prop_assert_eq!(filtered.individuals(), individuals.as_slice());
        for entry in report.entries() {
            prop_assert_eq!(entry.counts.individuals, individuals.len());
        }
    }

    #[test]
    fn prop_heterozygosity_in_unit_interval(matrix in matrix()) {
        if let Ok(stats) = Heterozygosity::compute(&matrix) {
            for stat in stats {
                prop_assert!((0.0..=1.0).contains(&stat.observed), "Ho = {}", stat.observed);
                prop_assert!((0.0..=0.5).contains(&stat.expected), "He = {}", stat.expected);
            }
        }
    }

    #[test]
    fn prop_explained_variance(matrix in matrix(), axes in 1usize..6) {
        let axes = NonZeroUsize::new(axes).unwrap();

        if let Ok(pcoa) = PrincipalCoordinates::compute(&matrix, axes, &Standard) {
            let explained = pcoa.explained_fraction();

            prop_assert_eq!(pcoa.axes(), axes.get());
            prop_assert!(explained.iter().sum::<f64>() <= 1.0 + 1e-9);
            prop_assert!(explained.windows(2).all(|w| w[0] >= w[1]));
            prop_assert!(pcoa.explained_percent().windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn prop_fst_is_symmetric(matrix in matrix()) {
        if let Ok(Some(fst)) = PairwiseFst::compute(&matrix, &Standard) {
            let n = fst.populations().len();

            for i in 0..n {
                prop_assert_eq!(fst.get(i, i), 0.0);
                for j in 0..n {
                    let (forward, backward) = (fst.get(i, j), fst.get(j, i));
                    prop_assert!(
                        forward == backward || (forward.is_nan() && backward.is_nan()),
                        "Fst({i}, {j}) = {forward}, Fst({j}, {i}) = {backward}"
                    );
                }
            }
        }
    }
}
