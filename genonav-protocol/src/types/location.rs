//! Genomic location types shared between the daemon and browser clients

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chromosome naming convention
///
/// UCSC names carry a `chr` prefix and spell the mitochondrion `chrM`.
/// Ensembl names have no prefix and spell the mitochondrion `MT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromosomeConvention {
    #[default]
    Ucsc,
    Ensembl,
}

impl ChromosomeConvention {
    /// Wire name of the convention
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ucsc => "ucsc",
            Self::Ensembl => "ensembl",
        }
    }
}

impl fmt::Display for ChromosomeConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown convention name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genome format '{0}' (expected 'ucsc' or 'ensembl')")]
pub struct UnknownConvention(pub String);

impl FromStr for ChromosomeConvention {
    type Err = UnknownConvention;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ucsc" => Ok(Self::Ucsc),
            "ensembl" => Ok(Self::Ensembl),
            _ => Err(UnknownConvention(s.to_string())),
        }
    }
}

/// A validated genomic window
///
/// Carries the chromosome in both naming conventions so a client can switch
/// assemblies without re-resolving. `start < end` holds for every value
/// produced by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicLocation {
    /// Primary display form in the requested convention
    pub chromosome: String,
    pub chromosome_ucsc: String,
    pub chromosome_ensembl: String,
    pub start: u64,
    pub end: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
}

impl GenomicLocation {
    /// Number of bases covered by the window
    pub fn region_size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// `chr:start-end` locus string using the primary chromosome form
    pub fn locus(&self) -> String {
        format!("{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.gene_name {
            Some(gene) => write!(f, "{} ({})", gene, self.locus()),
            None => f.write_str(&self.locus()),
        }
    }
}
