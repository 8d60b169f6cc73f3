//! Navigation orchestrator
//!
//! Turns coordinate and gene requests into validated, normalized locations
//! and records every success in the orchestrator's own history.

use std::sync::Arc;

use genonav_protocol::{ChromosomeConvention, GenomicLocation};
use tracing::{debug, info};

use crate::genome::{GeneLocator, LocusNormalizer};

use super::history::{NavigationEntry, NavigationHistory};
use super::outcome::{NavigationErrorCode, NavigationOutcome};
use super::validator::validate_coordinates;

/// Default window added to `start` when a request has no end
pub const DEFAULT_WINDOW: u64 = 10_000;

/// Per-connection navigation state over shared lookup tables
pub struct NavigationOrchestrator {
    normalizer: Arc<LocusNormalizer>,
    genes: Arc<dyn GeneLocator>,
    history: NavigationHistory,
    default_window: u64,
}

impl NavigationOrchestrator {
    pub fn new(normalizer: Arc<LocusNormalizer>, genes: Arc<dyn GeneLocator>) -> Self {
        Self {
            normalizer,
            genes,
            history: NavigationHistory::new(),
            default_window: DEFAULT_WINDOW,
        }
    }

    pub fn with_default_window(mut self, window: u64) -> Self {
        self.default_window = window;
        self
    }

    /// Navigate to explicit coordinates
    pub fn navigate_to_location(
        &mut self,
        chromosome: &str,
        start: i64,
        end: Option<i64>,
        gene_name: Option<&str>,
        convention: ChromosomeConvention,
    ) -> NavigationOutcome {
        let (start, end) = match validate_coordinates(
            &self.normalizer,
            chromosome,
            start,
            end,
            self.default_window,
        ) {
            Ok(range) => range,
            Err(rejection) => {
                debug!(
                    chromosome,
                    code = %rejection.code,
                    "Navigation rejected: {}",
                    rejection.message
                );
                return NavigationOutcome::error(rejection.code, rejection.message);
            }
        };

        let chromosome_ucsc = self
            .normalizer
            .normalize(chromosome, ChromosomeConvention::Ucsc);
        let chromosome_ensembl = self
            .normalizer
            .normalize(chromosome, ChromosomeConvention::Ensembl);
        let primary = match convention {
            ChromosomeConvention::Ucsc => chromosome_ucsc.clone(),
            ChromosomeConvention::Ensembl => chromosome_ensembl.clone(),
        };

        let location = GenomicLocation {
            chromosome: primary,
            chromosome_ucsc,
            chromosome_ensembl,
            start,
            end,
            gene_name: gene_name.map(str::to_string),
        };

        let message = format!("Successfully prepared navigation to {}", location);
        let outcome = NavigationOutcome::success(location.clone(), message);
        self.history.push(location, outcome.timestamp());

        info!(
            locus = %outcome.location().map(|l| l.locus()).unwrap_or_default(),
            %convention,
            "Navigation prepared"
        );
        outcome
    }

    /// Resolve a gene symbol and navigate to its span
    ///
    /// The gene name is carried exactly as the caller typed it.
    pub fn navigate_by_gene(
        &mut self,
        gene_name: &str,
        convention: ChromosomeConvention,
    ) -> NavigationOutcome {
        let Some(record) = self.genes.lookup(gene_name) else {
            debug!(gene = gene_name, "Gene lookup missed");
            return NavigationOutcome::error(
                NavigationErrorCode::GeneNotFound,
                format!("Gene not found: {}", gene_name),
            );
        };

        let start = i64::try_from(record.start).unwrap_or(i64::MAX);
        let end = i64::try_from(record.end).unwrap_or(i64::MAX);
        self.navigate_to_location(
            &record.chromosome,
            start,
            Some(end),
            Some(gene_name),
            convention,
        )
    }

    /// Most recent `limit` successes, newest last
    pub fn history(&self, limit: usize) -> &[NavigationEntry] {
        self.history.recent(limit)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::StaticGeneTable;

    fn orchestrator() -> NavigationOrchestrator {
        NavigationOrchestrator::new(
            Arc::new(LocusNormalizer::human()),
            Arc::new(StaticGeneTable::seeded()),
        )
    }

    #[test]
    fn test_coordinate_success_carries_both_forms() {
        let mut nav = orchestrator();
        let outcome = nav.navigate_to_location(
            "chr1",
            1_000_000,
            Some(2_000_000),
            None,
            ChromosomeConvention::Ucsc,
        );

        assert!(outcome.is_success());
        let location = outcome.location().unwrap();
        assert_eq!(location.chromosome, "chr1");
        assert_eq!(location.chromosome_ucsc, "chr1");
        assert_eq!(location.chromosome_ensembl, "1");
        assert_eq!(location.region_size(), 1_000_000);
        assert_eq!(
            outcome.message(),
            "Successfully prepared navigation to chr1:1000000-2000000"
        );
        assert_eq!(nav.history_len(), 1);
    }

    #[test]
    fn test_primary_form_follows_convention() {
        let mut nav = orchestrator();
        let outcome =
            nav.navigate_to_location("chrM", 1, Some(100), None, ChromosomeConvention::Ensembl);
        let location = outcome.location().unwrap();
        assert_eq!(location.chromosome, "MT");
        assert_eq!(location.chromosome_ucsc, "chrM");
    }

    #[test]
    fn test_default_end() {
        let mut nav = orchestrator();
        let outcome =
            nav.navigate_to_location("chr1", 1_000_000, None, None, ChromosomeConvention::Ucsc);
        assert_eq!(outcome.location().unwrap().end, 1_010_000);
    }

    #[test]
    fn test_configured_window() {
        let mut nav = orchestrator().with_default_window(500);
        let outcome = nav.navigate_to_location("2", 100, None, None, ChromosomeConvention::Ucsc);
        assert_eq!(outcome.location().unwrap().end, 600);
    }

    #[test]
    fn test_invalid_chromosome_leaves_history() {
        let mut nav = orchestrator();
        let outcome =
            nav.navigate_to_location("chr99", 100, Some(200), None, ChromosomeConvention::Ucsc);
        assert_eq!(
            outcome.error_code(),
            Some(NavigationErrorCode::InvalidChromosome)
        );
        assert_eq!(nav.history_len(), 0);
    }

    #[test]
    fn test_reversed_range() {
        let mut nav = orchestrator();
        let outcome = nav.navigate_to_location(
            "chr1",
            2_000_000,
            Some(1_000_000),
            None,
            ChromosomeConvention::Ucsc,
        );
        assert_eq!(outcome.error_code(), Some(NavigationErrorCode::InvalidRange));
        assert_eq!(nav.history_len(), 0);
    }

    #[test]
    fn test_gene_keeps_typed_name() {
        let mut nav = orchestrator();
        let outcome = nav.navigate_by_gene("brca1", ChromosomeConvention::Ucsc);

        let location = outcome.location().unwrap();
        assert_eq!(location.chromosome, "chr17");
        assert_eq!((location.start, location.end), (43044295, 43125483));
        assert_eq!(location.gene_name.as_deref(), Some("brca1"));
        assert_eq!(
            outcome.message(),
            "Successfully prepared navigation to brca1 (chr17:43044295-43125483)"
        );
    }

    #[test]
    fn test_unknown_gene() {
        let mut nav = orchestrator();
        let outcome = nav.navigate_by_gene("FAKEGENE", ChromosomeConvention::Ucsc);
        assert_eq!(outcome.error_code(), Some(NavigationErrorCode::GeneNotFound));
        assert_eq!(outcome.message(), "Gene not found: FAKEGENE");
        assert_eq!(nav.history_len(), 0);
    }

    #[test]
    fn test_history_tracks_successes_only() {
        let mut nav = orchestrator();
        nav.navigate_to_location("chr1", 100, None, None, ChromosomeConvention::Ucsc);
        nav.navigate_to_location("chr2", 200, None, None, ChromosomeConvention::Ucsc);
        nav.navigate_to_location("chr99", 1, None, None, ChromosomeConvention::Ucsc);
        nav.navigate_by_gene("TP53", ChromosomeConvention::Ucsc);

        let history = nav.history(10);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].location.chromosome, "chr1");
        assert_eq!(history[2].location.gene_name.as_deref(), Some("TP53"));

        nav.clear_history();
        assert!(nav.history(10).is_empty());
    }
}
