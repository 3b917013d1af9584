//! Per-record enrichment.
//!
//! All narrative text of a record (both tabs, every section regardless of
//! title) is flattened into one corpus: paragraph texts and list items in
//! page order, subtitles excluded, joined by a single space. The corpus is
//! categorized and profiled once, and the results are attached to a copy of
//! the record. The input record is never modified.

use crate::categorize::categorize;
use crate::demographics::DemographicRules;
use crate::lexicon::SymptomLexicon;
use crate::models::{ContentBlock, DiseaseRecord, EnrichedDiseaseRecord};

/// Immutable configuration shared by every enrichment call.
#[derive(Debug, Clone)]
pub struct Enricher {
    pub lexicon: SymptomLexicon,
    pub rules: DemographicRules,
}

impl Enricher {
    pub fn new(lexicon: SymptomLexicon, rules: DemographicRules) -> Self {
        Self { lexicon, rules }
    }

    pub fn enrich(&self, record: &DiseaseRecord) -> EnrichedDiseaseRecord {
        enrich_with(record, &self.lexicon, &self.rules)
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(SymptomLexicon::spanish(), DemographicRules::SPANISH)
    }
}

/// Enrich `record` against `lexicon` with the Spanish demographic tables.
pub fn enrich(record: &DiseaseRecord, lexicon: &SymptomLexicon) -> EnrichedDiseaseRecord {
    enrich_with(record, lexicon, &DemographicRules::SPANISH)
}

pub fn enrich_with(
    record: &DiseaseRecord,
    lexicon: &SymptomLexicon,
    rules: &DemographicRules,
) -> EnrichedDiseaseRecord {
    let text = corpus(record);
    EnrichedDiseaseRecord {
        record: record.clone(),
        demographics: rules.infer(&text),
        matched_symptom_categories: categorize(&text, lexicon),
    }
}

/// The record's narrative text as one space-joined string.
pub fn corpus(record: &DiseaseRecord) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    for section in record.sections() {
        for block in &section.blocks {
            match block {
                ContentBlock::Paragraph { text } => fragments.push(text),
                ContentBlock::List { items } => fragments.extend(items.iter().map(String::as_str)),
                ContentBlock::Subtitle { .. } => {}
            }
        }
    }
    fragments.retain(|f| !f.is_empty());
    fragments.join(" ")
}
