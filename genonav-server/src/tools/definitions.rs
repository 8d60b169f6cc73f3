//! Tool definitions offered to the model

use super::protocol::Tool;

pub const NAVIGATE_BY_COORDINATE: &str = "navigate_by_coordinate";
pub const NAVIGATE_BY_GENE: &str = "navigate_by_gene";
pub const GET_NAVIGATION_HISTORY: &str = "get_navigation_history";

/// Check if a tool name is known
pub fn is_known_tool(name: &str) -> bool {
    matches!(
        name,
        NAVIGATE_BY_COORDINATE | NAVIGATE_BY_GENE | GET_NAVIGATION_HISTORY
    )
}

/// Get all tool definitions
pub fn get_tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: NAVIGATE_BY_COORDINATE.into(),
            description: "Navigate the genome browser to a specific genomic location. Use this \
                when the user wants to view a region by coordinates. Chromosome names are \
                accepted in any common form (chr1, 1, chrX, X, chrM, MT) and normalized \
                automatically."
                .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "chromosome": {
                        "type": "string",
                        "description": "Chromosome name (e.g. \"chr1\", \"1\", \"X\", \"chrX\")"
                    },
                    "start": {
                        "type": "integer",
                        "description": "Start position in base pairs (positive integer)"
                    },
                    "end": {
                        "type": "integer",
                        "description": "End position in base pairs (default: start + 10000)"
                    },
                    "genome_format": {
                        "type": "string",
                        "enum": ["ucsc", "ensembl"],
                        "description": "Chromosome naming of the loaded assembly: \"ucsc\" (chr1) or \"ensembl\" (1)"
                    }
                },
                "required": ["chromosome", "start"]
            }),
        },
        Tool {
            name: NAVIGATE_BY_GENE.into(),
            description: "Navigate the genome browser to a gene by its symbol. Looks up the \
                gene's coordinates and moves the view there."
                .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "gene_name": {
                        "type": "string",
                        "description": "Gene symbol (e.g. \"BRCA1\", \"TP53\", \"EGFR\")"
                    },
                    "genome_format": {
                        "type": "string",
                        "enum": ["ucsc", "ensembl"],
                        "description": "Chromosome naming of the loaded assembly: \"ucsc\" (chr1) or \"ensembl\" (1)"
                    }
                },
                "required": ["gene_name"]
            }),
        },
        Tool {
            name: GET_NAVIGATION_HISTORY.into(),
            description: "Get the recent navigation history. Use this when the user asks about \
                locations they viewed before or wants to go back."
                .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of entries to return (default: 5)"
                    }
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_have_descriptions() {
        for tool in get_tool_definitions() {
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_all_tools_have_valid_schemas() {
        for tool in get_tool_definitions() {
            assert!(tool.input_schema.is_object());
            assert_eq!(tool.input_schema["type"], "object");
        }
    }

    #[test]
    fn test_definitions_match_known_tools() {
        let tools = get_tool_definitions();
        assert_eq!(tools.len(), 3);
        for tool in &tools {
            assert!(is_known_tool(&tool.name));
        }
        assert!(!is_known_tool("navigate_jbrowse"));
    }

    #[test]
    fn test_required_fields() {
        let tools = get_tool_definitions();
        let coordinate = tools.iter().find(|t| t.name == NAVIGATE_BY_COORDINATE).unwrap();
        assert_eq!(
            coordinate.input_schema["required"],
            serde_json::json!(["chromosome", "start"])
        );
    }
}
