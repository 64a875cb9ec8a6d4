//! Diploid, diallelic genotype.

use std::fmt;

/// A diploid, diallelic genotype, coded as the number of alternative alleles.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Genotype {
    /// Homozygous reference.
    Zero = 0,
    /// Heterozygous.
    One = 1,
    /// Homozygous alternative.
    Two = 2,
}

impl Genotype {
    /// Returns a genotype from its raw representation if possible, otherwise `None`.
    pub fn try_from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// Returns the number of alternative alleles.
    pub fn alt_alleles(self) -> u8 {
        self as u8
    }

    /// Returns the number of alternative alleles as a float.
    pub fn dosage(self) -> f64 {
        f64::from(self.alt_alleles())
    }

    /// Returns `true` if the genotype carries one of each allele.
    pub fn is_heterozygous(self) -> bool {
        self == Self::One
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alt_alleles())
    }
}

/// The coding of genotype calls in an input report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Coding {
    /// Calls are the number of alternative alleles: 0, 1 (heterozygous) or 2.
    #[default]
    Dosage,
    /// DArT one-row coding: 0 homozygous reference, 1 homozygous SNP, 2 heterozygous.
    Dart,
}

impl Coding {
    /// Tokens that denote a missing call.
    pub const MISSING: [&'static str; 4] = ["-", ".", "NA", ""];

    /// Parses a single call token, returning `None` for a missing call.
    pub fn parse(self, token: &str) -> Result<Option<Genotype>, ParseCallError> {
        let token = token.trim();

        if Self::MISSING.contains(&token) {
            return Ok(None);
        }

        let genotype = match (self, token) {
            (_, "0") => Genotype::Zero,
            (Coding::Dosage, "1") | (Coding::Dart, "2") => Genotype::One,
            (Coding::Dosage, "2") | (Coding::Dart, "1") => Genotype::Two,
            _ => {
                return Err(ParseCallError {
                    token: token.to_string(),
                })
            }
        };

        Ok(Some(genotype))
    }
}

/// An error associated with parsing a genotype call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseCallError {
    token: String,
}

impl fmt::Display for ParseCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid genotype call '{}'", self.token)
    }
}

impl std::error::Error for ParseCallError {}
