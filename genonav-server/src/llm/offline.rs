//! Offline test model
//!
//! Selected by the reserved `test-key` API key. Answers from a few canned
//! texts without any network access and never requests tools.

use async_trait::async_trait;

use crate::tools::Tool;

use super::{ChatMessage, ChatRole, LanguageModel, LlmError, ModelReply};

const GENOMICS_TEXT: &str = "Genomics is the study of an organism's complete DNA sequence (its genome). It covers:

1. **Structural genomics**: the physical structure and organisation of genomes
2. **Functional genomics**: gene function and interactions between genes
3. **Comparative genomics**: comparing genomes across species

High-throughput sequencing and CRISPR editing are reshaping biomedical research.";

const BRCA_TEXT: &str = "BRCA1 gene summary:

**Basics:**
- Location: chromosome 17q21.31
- Full name: Breast Cancer 1, Early Onset
- Function: DNA repair, tumour suppression

**Clinical relevance:**
- BRCA1 mutations raise the risk of hereditary breast and ovarian cancer
- Lifetime breast cancer risk for carriers can reach 70%

**Browser:** navigate to chr17:43,044,295-43,125,483 to see its structure.";

const DNA_TEXT: &str = "DNA sequence analysis is a core genomics technique:

**Main analyses:**
1. **Alignment**: mapping reads to a reference genome
2. **Variant calling**: finding SNPs, indels and structural variants
3. **Annotation**: predicting the functional impact of variants

**Common tools:** BWA/Bowtie2 for alignment, GATK for calling, SnpEff/VEP for annotation.";

/// Canned-response model for trying the daemon without an API key
#[derive(Debug, Clone)]
pub struct OfflineModel {
    model_name: String,
}

impl OfflineModel {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }

    fn answer(query: &str) -> String {
        let lower = query.to_lowercase();
        if lower.contains("genomics") {
            GENOMICS_TEXT.to_string()
        } else if lower.contains("brca") {
            BRCA_TEXT.to_string()
        } else if lower.contains("dna") || lower.contains("sequence") {
            DNA_TEXT.to_string()
        } else {
            format!(
                "Thanks for your question: \"{}\"\n\n\
                 As a genomics assistant I can:\n\n\
                 1. **Look up genes**: location, function and disease associations\n\
                 2. **Drive the genome browser**: jump to genes or coordinates\n\
                 3. **Explain variants**: their biological significance\n\
                 4. **Explain concepts**: genomics terms and techniques\n\n\
                 Tell me which gene or concept you are interested in.",
                query
            )
        }
    }
}

#[async_trait]
impl LanguageModel for OfflineModel {
    fn model_used(&self) -> String {
        format!("{} (test mode)", self.model_name)
    }

    fn is_test_mode(&self) -> bool {
        true
    }

    async fn invoke(
        &self,
        _system_prompt: &str,
        conversation: &[ChatMessage],
        _tools: &[Tool],
    ) -> Result<ModelReply, LlmError> {
        let query = conversation
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(ModelReply::text(Self::answer(query)))
    }
}
