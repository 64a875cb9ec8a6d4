#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Quality filtering and population summary statistics for SNP genotyping reports.
//!
//! This serves as the core library implementation for the `snpqc` CLI, but can also be used as a
//! free-standing library for working with genotype matrices.
//!
//! # Overview
//!
//! The core struct is a [`GenotypeMatrix`] of diploid, diallelic calls, with one row per
//! [`Individual`] and one column per [`Locus`]. A run goes through four stages, each of which
//! takes the matrix by value and hands a new one on to the next:
//!
//! 1. [`input::report`] reads a DArT-style report into a matrix.
//! 2. [`Normalizer`] rewrites individual identifiers and derives populations.
//! 3. [`FilterChain`] drops loci by repeatability, call rate and polymorphism.
//! 4. [`stat`] computes heterozygosity, principal coordinates and pairwise Fst.
//!
//! The [`Pipeline`] ties the stages together.
//!
//! # Example
//!
//! ```
//! use snpqc_core::{FilterChain, input::report};
//!
//! let csv = "\
//! AlleleID,RepAvg,ind1,ind2,ind3
//! snp1,1.0,0,1,2
//! snp2,1.0,0,0,0
//! snp3,0.5,0,1,1
//! ";
//!
//! let matrix = report::Builder::default().read(csv.as_bytes())?;
//! let (filtered, filter_report) = FilterChain::default().run(matrix);
//!
//! // snp3 fails the repeatability filter, snp2 is monomorphic
//! assert_eq!(filtered.n_loci(), 1);
//! assert_eq!(filter_report.entries().len(), 3);
//! # Ok::<(), snpqc_core::Error>(())
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod error;
pub use error::Error;

pub mod filter;
pub use filter::{FilterChain, FilterReport};

pub mod genotype;
pub use genotype::Genotype;

pub mod input;

pub mod matrix;
pub use matrix::{GenotypeMatrix, Individual, Locus};

pub mod normalize;
pub use normalize::{Normalizer, Substitutions};

pub mod output;

pub mod pipeline;
pub use pipeline::{Analysis, Pipeline};

pub mod population;
pub use population::Populations;

pub mod stat;
