//! Chromosome name normalization between UCSC and Ensembl conventions

use std::collections::HashMap;

use genonav_protocol::ChromosomeConvention;

/// One chromosome and every surface form it is known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeAlias {
    /// Canonical key ("1".."22", "X", "Y", "MT")
    pub key: String,
    pub ucsc: String,
    pub ensembl: String,
    pub forms: Vec<String>,
}

impl ChromosomeAlias {
    /// Alias for a nuclear chromosome: `chrN` / `N`
    pub fn nuclear(key: &str) -> Self {
        let ucsc = format!("chr{}", key);
        Self {
            key: key.to_string(),
            forms: vec![ucsc.clone(), key.to_string()],
            ucsc,
            ensembl: key.to_string(),
        }
    }

    /// The mitochondrion, spelled `chrM` by UCSC and `MT` by Ensembl
    pub fn mitochondrial() -> Self {
        Self {
            key: "MT".into(),
            ucsc: "chrM".into(),
            ensembl: "MT".into(),
            forms: ["chrM", "M", "MT", "chrMT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn render(&self, convention: ChromosomeConvention) -> &str {
        match convention {
            ChromosomeConvention::Ucsc => &self.ucsc,
            ChromosomeConvention::Ensembl => &self.ensembl,
        }
    }
}

/// Immutable chromosome alias table
///
/// Lookups trim, upper-case and tolerate a leading `chr`. Every surface
/// form belongs to exactly one alias; a later alias claiming a form that is
/// already taken does not steal it.
#[derive(Debug, Clone)]
pub struct LocusNormalizer {
    aliases: Vec<ChromosomeAlias>,
    index: HashMap<String, usize>,
}

impl LocusNormalizer {
    /// GRCh38 human karyotype: 1-22, X, Y, MT
    pub fn human() -> Self {
        let mut aliases: Vec<ChromosomeAlias> = (1..=22)
            .map(|n| ChromosomeAlias::nuclear(&n.to_string()))
            .collect();
        aliases.push(ChromosomeAlias::nuclear("X"));
        aliases.push(ChromosomeAlias::nuclear("Y"));
        aliases.push(ChromosomeAlias::mitochondrial());
        Self::from_aliases(aliases)
    }

    pub fn from_aliases(aliases: Vec<ChromosomeAlias>) -> Self {
        let mut index = HashMap::new();
        for (i, alias) in aliases.iter().enumerate() {
            for form in alias.forms.iter().chain(std::iter::once(&alias.key)) {
                index.entry(form.trim().to_uppercase()).or_insert(i);
            }
        }
        Self { aliases, index }
    }

    fn find(&self, identifier: &str) -> Option<&ChromosomeAlias> {
        let cleaned = identifier.trim().to_uppercase();
        let stripped = cleaned.strip_prefix("CHR").unwrap_or(&cleaned);
        self.index
            .get(&cleaned)
            .or_else(|| self.index.get(stripped))
            .map(|&i| &self.aliases[i])
    }

    /// Canonical key for an identifier, if it is a known chromosome
    pub fn canonical_key(&self, identifier: &str) -> Option<&str> {
        self.find(identifier).map(|alias| alias.key.as_str())
    }

    /// Render an identifier in the target convention
    ///
    /// Unknown identifiers come back unchanged.
    pub fn normalize(&self, identifier: &str, convention: ChromosomeConvention) -> String {
        match self.find(identifier) {
            Some(alias) => alias.render(convention).to_string(),
            None => identifier.to_string(),
        }
    }

    /// Normalize into `convention`, or into the identifier's own convention
    pub fn smart_normalize(
        &self,
        identifier: &str,
        convention: Option<ChromosomeConvention>,
    ) -> String {
        let convention = convention.unwrap_or_else(|| detect_convention(identifier));
        self.normalize(identifier, convention)
    }

    /// Whether the identifier names a known chromosome
    pub fn is_valid(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// Every accepted surface form of the identifier's chromosome
    pub fn aliases_of(&self, identifier: &str) -> Vec<String> {
        match self.find(identifier) {
            Some(alias) => alias.forms.clone(),
            None => vec![identifier.to_string()],
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for LocusNormalizer {
    fn default() -> Self {
        Self::human()
    }
}

/// UCSC iff the identifier starts with `chr` (any case), else Ensembl
pub fn detect_convention(identifier: &str) -> ChromosomeConvention {
    let prefix = identifier.trim().get(..3);
    if prefix.is_some_and(|p| p.eq_ignore_ascii_case("chr")) {
        ChromosomeConvention::Ucsc
    } else {
        ChromosomeConvention::Ensembl
    }
}
