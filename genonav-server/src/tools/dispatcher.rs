//! Tool dispatch
//!
//! Routes model tool calls to the navigation orchestrator and renders every
//! outcome, including failures, as the text the model reads back.

use chrono::SecondsFormat;
use genonav_protocol::{ChromosomeConvention, NavigationAction};
use tracing::{debug, warn};

use crate::navigation::{NavigationOrchestrator, NavigationOutcome};

use super::definitions::{
    is_known_tool, GET_NAVIGATION_HISTORY, NAVIGATE_BY_COORDINATE, NAVIGATE_BY_GENE,
};
use super::error::ToolError;
use super::protocol::{NavigationTarget, ToolInvocationRequest, ToolInvocationResult};

/// Entries returned by `get_navigation_history` when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Parsed and validated tool parameters
enum ToolParams {
    Coordinate {
        chromosome: String,
        start: i64,
        end: Option<i64>,
        convention: ChromosomeConvention,
    },
    Gene {
        gene_name: String,
        convention: ChromosomeConvention,
    },
    History {
        limit: usize,
    },
}

/// Executes tool calls against one connection's orchestrator
pub struct ToolDispatcher {
    orchestrator: NavigationOrchestrator,
    default_convention: ChromosomeConvention,
    history_limit: usize,
}

impl ToolDispatcher {
    pub fn new(orchestrator: NavigationOrchestrator) -> Self {
        Self {
            orchestrator,
            default_convention: ChromosomeConvention::Ucsc,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_default_convention(mut self, convention: ChromosomeConvention) -> Self {
        self.default_convention = convention;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn orchestrator(&self) -> &NavigationOrchestrator {
        &self.orchestrator
    }

    /// Execute every request in order, collecting results in the same order
    pub fn dispatch_all(&mut self, requests: &[ToolInvocationRequest]) -> Vec<ToolInvocationResult> {
        requests.iter().map(|request| self.dispatch(request)).collect()
    }

    /// Execute one request; errors become textual results
    pub fn dispatch(&mut self, request: &ToolInvocationRequest) -> ToolInvocationResult {
        let name = request.tool_name.as_str();
        debug!("Tool call: {} with args: {}", name, request.arguments);

        let (result_text, navigation) = match self.dispatch_tool(name, &request.arguments) {
            Ok(done) => done,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                (e.to_result_text(name), None)
            }
        };

        ToolInvocationResult {
            tool_name: request.tool_name.clone(),
            arguments: request.arguments.clone(),
            result_text,
            navigation,
        }
    }

    fn dispatch_tool(
        &mut self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<(String, Option<NavigationTarget>), ToolError> {
        if !is_known_tool(name) {
            return Err(ToolError::UnknownTool(name.into()));
        }

        if !(arguments.is_object() || arguments.is_null()) {
            return Err(ToolError::invalid_params("arguments must be a JSON object"));
        }

        let params = match name {
            NAVIGATE_BY_COORDINATE => ToolParams::Coordinate {
                chromosome: parse_string(arguments, "chromosome")?,
                start: parse_integer(arguments, "start")?
                    .ok_or_else(|| ToolError::invalid_params("Missing 'start' parameter"))?,
                end: parse_integer(arguments, "end")?,
                convention: parse_convention(arguments, self.default_convention)?,
            },
            NAVIGATE_BY_GENE => ToolParams::Gene {
                gene_name: parse_string(arguments, "gene_name")?,
                convention: parse_convention(arguments, self.default_convention)?,
            },
            GET_NAVIGATION_HISTORY => ToolParams::History {
                limit: match parse_integer(arguments, "limit")? {
                    None => self.history_limit,
                    Some(n) if n >= 0 => usize::try_from(n).unwrap_or(usize::MAX),
                    Some(n) => {
                        return Err(ToolError::invalid_params(format!(
                            "'limit' must not be negative, got {}",
                            n
                        )))
                    }
                },
            },
            _ => return Err(ToolError::UnknownTool(name.into())),
        };

        Ok(match params {
            ToolParams::Coordinate {
                chromosome,
                start,
                end,
                convention,
            } => {
                let outcome = self.orchestrator.navigate_to_location(
                    &chromosome,
                    start,
                    end,
                    None,
                    convention,
                );
                coordinate_text(outcome)
            }
            ToolParams::Gene {
                gene_name,
                convention,
            } => {
                let outcome = self.orchestrator.navigate_by_gene(&gene_name, convention);
                gene_text(&gene_name, outcome)
            }
            ToolParams::History { limit } => (self.history_text(limit), None),
        })
    }

    fn history_text(&self, limit: usize) -> String {
        let entries = self.orchestrator.history(limit);
        if entries.is_empty() {
            return "No navigation history available.".into();
        }

        let mut lines = vec!["Recent navigation history:".to_string()];
        for (i, entry) in entries.iter().rev().enumerate() {
            let gene = entry
                .location
                .gene_name
                .as_deref()
                .map(|g| format!(" ({})", g))
                .unwrap_or_default();
            lines.push(format!(
                "{}. {}{} at {}",
                i + 1,
                entry.location.locus(),
                gene,
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        lines.join("\n")
    }
}

fn coordinate_text(outcome: NavigationOutcome) -> (String, Option<NavigationTarget>) {
    match outcome {
        NavigationOutcome::Success { location, .. } => {
            let text = format!(
                "Successfully navigated to {}. Region size: {} bp. \
                 The genome browser view has been updated.",
                location.locus(),
                format_thousands(location.region_size())
            );
            let target = NavigationTarget {
                action: NavigationAction::NavigateToLocation,
                location,
            };
            (text, Some(target))
        }
        NavigationOutcome::Error { message, .. } => (format!("Navigation failed: {}", message), None),
    }
}

fn gene_text(gene_name: &str, outcome: NavigationOutcome) -> (String, Option<NavigationTarget>) {
    match outcome {
        NavigationOutcome::Success { location, .. } => {
            let text = format!(
                "Successfully navigated to {} gene at {}. Gene region size: {} bp. \
                 The genome browser view has been updated.",
                gene_name,
                location.locus(),
                format_thousands(location.region_size())
            );
            let target = NavigationTarget {
                action: NavigationAction::NavigateToGene,
                location,
            };
            (text, Some(target))
        }
        NavigationOutcome::Error { message, .. } => {
            (format!("Gene navigation failed: {}", message), None)
        }
    }
}

/// Parse a required string argument
fn parse_string(arguments: &serde_json::Value, field: &str) -> Result<String, ToolError> {
    let value = arguments[field]
        .as_str()
        .ok_or_else(|| ToolError::invalid_params(format!("Missing '{}' parameter", field)))?;
    Ok(value.to_string())
}

/// Parse an optional integer argument
///
/// Models sometimes quote numbers or emit `1000000.0`; both are accepted.
fn parse_integer(arguments: &serde_json::Value, field: &str) -> Result<Option<i64>, ToolError> {
    let value = &arguments[field];
    if value.is_null() {
        return Ok(None);
    }
    if let Some(n) = value.as_i64() {
        return Ok(Some(n));
    }
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            return Ok(Some(f as i64));
        }
    }
    if let Some(s) = value.as_str() {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Ok(Some(n));
        }
    }
    Err(ToolError::invalid_params(format!(
        "'{}' must be an integer, got {}",
        field, value
    )))
}

fn parse_convention(
    arguments: &serde_json::Value,
    default: ChromosomeConvention,
) -> Result<ChromosomeConvention, ToolError> {
    match &arguments["genome_format"] {
        serde_json::Value::Null => Ok(default),
        serde_json::Value::String(s) => s
            .parse()
            .map_err(|e: genonav_protocol::UnknownConvention| {
                ToolError::invalid_params(e.to_string())
            }),
        other => Err(ToolError::invalid_params(format!(
            "'genome_format' must be a string, got {}",
            other
        ))),
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::genome::{LocusNormalizer, StaticGeneTable};

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(NavigationOrchestrator::new(
            Arc::new(LocusNormalizer::human()),
            Arc::new(StaticGeneTable::seeded()),
        ))
    }

    fn call(d: &mut ToolDispatcher, name: &str, args: serde_json::Value) -> ToolInvocationResult {
        d.dispatch(&ToolInvocationRequest::new(name, args))
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
        assert_eq!(format_thousands(81_188), "81,188");
    }

    #[test]
    fn test_coordinate_success_text() {
        let mut d = dispatcher();
        let result = call(
            &mut d,
            NAVIGATE_BY_COORDINATE,
            json!({"chromosome": "chr1", "start": 1000000, "end": 2000000}),
        );
        assert_eq!(
            result.result_text,
            "Successfully navigated to chr1:1000000-2000000. Region size: 1,000,000 bp. \
             The genome browser view has been updated."
        );
        let target = result.navigation.unwrap();
        assert_eq!(target.action, NavigationAction::NavigateToLocation);
        assert_eq!(target.location.chromosome_ensembl, "1");
    }

    #[test]
    fn test_coordinate_ensembl_and_quoted_numbers() {
        let mut d = dispatcher();
        let result = call(
            &mut d,
            NAVIGATE_BY_COORDINATE,
            json!({"chromosome": "chrX", "start": "5000000", "genome_format": "ensembl"}),
        );
        assert!(result.result_text.starts_with("Successfully navigated to X:5000000-5010000."));
    }

    #[test]
    fn test_coordinate_failure_text() {
        let mut d = dispatcher();
        let result = call(
            &mut d,
            NAVIGATE_BY_COORDINATE,
            json!({"chromosome": "chr99", "start": 100}),
        );
        assert_eq!(result.result_text, "Navigation failed: Invalid chromosome name: chr99");
        assert!(result.navigation.is_none());
    }

    #[test]
    fn test_gene_text() {
        let mut d = dispatcher();
        let result = call(&mut d, NAVIGATE_BY_GENE, json!({"gene_name": "BRCA1"}));
        assert_eq!(
            result.result_text,
            "Successfully navigated to BRCA1 gene at chr17:43044295-43125483. \
             Gene region size: 81,188 bp. The genome browser view has been updated."
        );
        assert_eq!(
            result.navigation.unwrap().action,
            NavigationAction::NavigateToGene
        );

        let miss = call(&mut d, NAVIGATE_BY_GENE, json!({"gene_name": "FAKEGENE"}));
        assert_eq!(miss.result_text, "Gene navigation failed: Gene not found: FAKEGENE");
        assert!(miss.navigation.is_none());
    }

    #[test]
    fn test_unknown_tool() {
        let mut d = dispatcher();
        let result = call(&mut d, "zoom_in", json!({}));
        assert_eq!(result.result_text, "Tool 'zoom_in' not found");
        assert!(result.navigation.is_none());
    }

    #[test]
    fn test_bad_arguments_are_textual() {
        let mut d = dispatcher();
        let missing = call(&mut d, NAVIGATE_BY_COORDINATE, json!({"chromosome": "chr1"}));
        assert!(missing.result_text.contains("Missing 'start' parameter"));

        let bad_format = call(
            &mut d,
            NAVIGATE_BY_GENE,
            json!({"gene_name": "TP53", "genome_format": "ncbi"}),
        );
        assert!(bad_format.result_text.starts_with("Error executing tool 'navigate_by_gene'"));

        let not_object = call(&mut d, NAVIGATE_BY_GENE, json!("TP53"));
        assert!(not_object.result_text.contains("arguments must be a JSON object"));
        assert_eq!(d.orchestrator().history_len(), 0);
    }

    #[test]
    fn test_history_newest_first() {
        let mut d = dispatcher();
        assert_eq!(
            call(&mut d, GET_NAVIGATION_HISTORY, json!({})).result_text,
            "No navigation history available."
        );

        call(&mut d, NAVIGATE_BY_COORDINATE, json!({"chromosome": "1", "start": 100}));
        call(&mut d, NAVIGATE_BY_GENE, json!({"gene_name": "tp53"}));

        let text = call(&mut d, GET_NAVIGATION_HISTORY, json!({"limit": 5})).result_text;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Recent navigation history:");
        assert!(lines[1].starts_with("1. chr17:7661779-7687550 (tp53) at "));
        assert!(lines[2].starts_with("2. chr1:100-10100 at "));

        let one = call(&mut d, GET_NAVIGATION_HISTORY, json!({"limit": 1})).result_text;
        assert_eq!(one.lines().count(), 2);
    }

    #[test]
    fn test_dispatch_all_preserves_order() {
        let mut d = dispatcher();
        let requests = vec![
            ToolInvocationRequest::new(NAVIGATE_BY_GENE, json!({"gene_name": "MYC"})),
            ToolInvocationRequest::new("nope", json!({})),
            ToolInvocationRequest::new(GET_NAVIGATION_HISTORY, json!(null)),
        ];
        let results = d.dispatch_all(&requests);
        let names: Vec<&str> = results.iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, vec![NAVIGATE_BY_GENE, "nope", GET_NAVIGATION_HISTORY]);
        assert!(results[2].result_text.contains("(MYC)"));
    }
}
