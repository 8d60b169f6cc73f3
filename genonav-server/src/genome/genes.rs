//! Gene symbol lookup

use std::collections::HashMap;

/// Coordinates of a gene on the reference assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    pub symbol: String,
    /// UCSC-style chromosome name
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub description: String,
}

impl GeneRecord {
    pub fn new(
        symbol: &str,
        chromosome: &str,
        start: u64,
        end: u64,
        description: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            chromosome: chromosome.to_string(),
            start,
            end,
            description: description.to_string(),
        }
    }
}

/// Resolves a gene symbol to its record
pub trait GeneLocator: Send + Sync {
    /// Exact, case-insensitive match; misses return `None`
    fn lookup(&self, symbol: &str) -> Option<GeneRecord>;
}

/// In-memory gene table keyed by upper-cased symbol
#[derive(Debug, Clone, Default)]
pub struct StaticGeneTable {
    genes: HashMap<String, GeneRecord>,
}

impl StaticGeneTable {
    pub fn new(records: impl IntoIterator<Item = GeneRecord>) -> Self {
        let genes = records
            .into_iter()
            .map(|record| (record.symbol.trim().to_uppercase(), record))
            .collect();
        Self { genes }
    }

    /// Well-known cancer genes on GRCh38
    pub fn seeded() -> Self {
        Self::new([
            GeneRecord::new("BRCA1", "chr17", 43044295, 43125483, "Breast Cancer 1, Early Onset"),
            GeneRecord::new("BRCA2", "chr13", 32315086, 32400266, "Breast Cancer 2, Early Onset"),
            GeneRecord::new("TP53", "chr17", 7661779, 7687550, "Tumor Protein P53"),
            GeneRecord::new("EGFR", "chr7", 55019017, 55211628, "Epidermal Growth Factor Receptor"),
            GeneRecord::new("MYC", "chr8", 127735434, 127742951, "MYC Proto-Oncogene"),
        ])
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl GeneLocator for StaticGeneTable {
    fn lookup(&self, symbol: &str) -> Option<GeneRecord> {
        self.genes.get(&symbol.trim().to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_lookup() {
        let table = StaticGeneTable::seeded();
        assert_eq!(table.len(), 5);

        let brca1 = table.lookup("BRCA1").unwrap();
        assert_eq!(brca1.chromosome, "chr17");
        assert_eq!((brca1.start, brca1.end), (43044295, 43125483));
    }

    #[test]
    fn test_case_insensitive() {
        let table = StaticGeneTable::seeded();
        assert_eq!(table.lookup("tp53"), table.lookup("TP53"));
        assert!(table.lookup(" myc ").is_some());
    }

    #[test]
    fn test_no_partial_match() {
        let table = StaticGeneTable::seeded();
        assert!(table.lookup("BRCA").is_none());
        assert!(table.lookup("BRCA12").is_none());
        assert!(table.lookup("FAKEGENE").is_none());
        assert!(table.lookup("").is_none());
    }
}
