//! Core data models shared by the enrichment pipeline.
//!
//! [`DiseaseRecord`] is the collector's output after decoding (see
//! [`crate::record`]); [`EnrichedDiseaseRecord`] is that record plus the
//! derived [`DemographicProfile`] and matched symptom categories.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One narrative element of a content section, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String },
    List { items: Vec<String> },
    Subtitle { text: String },
}

/// A titled section of a disease page (e.g. "Síntomas", "Tratamiento").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

/// A disease page as produced by the external collector.
///
/// Keys the pipeline does not interpret (departments, scrape metadata, ...)
/// are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub symptoms_and_causes: Vec<ContentSection>,
    #[serde(default)]
    pub diagnosis_and_treatment: Vec<ContentSection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiseaseRecord {
    /// Both tab sections, symptoms-and-causes first.
    pub fn sections(&self) -> impl Iterator<Item = &ContentSection> {
        self.symptoms_and_causes
            .iter()
            .chain(self.diagnosis_and_treatment.iter())
    }
}

/// Named age buckets, ordered from youngest to oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeRange {
    Pediatric,
    Young,
    Adult,
    Elderly,
}

impl AgeRange {
    pub const ALL: [AgeRange; 4] = [
        AgeRange::Pediatric,
        AgeRange::Young,
        AgeRange::Adult,
        AgeRange::Elderly,
    ];

    /// Inclusive `(min, max)` age bounds of the bucket.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            AgeRange::Pediatric => (0, 17),
            AgeRange::Young => (12, 30),
            AgeRange::Adult => (18, 59),
            AgeRange::Elderly => (60, 100),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeRange::Pediatric => "pediatric",
            AgeRange::Young => "young",
            AgeRange::Adult => "adult",
            AgeRange::Elderly => "elderly",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender most affected by a disease. `Both` is the inclusive default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Both,
}

impl Gender {
    /// Whether a disease with this predominant gender is relevant to `other`.
    pub fn includes(self, other: Gender) -> bool {
        self == Gender::Both || other == Gender::Both || self == other
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Both => "Both",
        })
    }
}

/// Coarse demographic hint inferred from a disease's narrative text.
///
/// Invariants: `min_age <= max_age` and `age_range_tags` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicProfile {
    pub min_age: u32,
    pub max_age: u32,
    pub age_range_tags: BTreeSet<AgeRange>,
    pub predominant_gender: Gender,
}

impl DemographicProfile {
    /// Profile spanning every bucket in `tags`; an empty set means `{adult}`.
    pub fn from_ranges(tags: BTreeSet<AgeRange>, predominant_gender: Gender) -> Self {
        let tags = if tags.is_empty() {
            BTreeSet::from([AgeRange::Adult])
        } else {
            tags
        };
        let min_age = tags.iter().map(|r| r.bounds().0).min().unwrap_or(18);
        let max_age = tags.iter().map(|r| r.bounds().1).max().unwrap_or(59);
        Self {
            min_age,
            max_age,
            age_range_tags: tags,
            predominant_gender,
        }
    }

    pub fn covers_age(&self, age: u32) -> bool {
        self.min_age <= age && age <= self.max_age
    }
}

impl Default for DemographicProfile {
    fn default() -> Self {
        Self::from_ranges(BTreeSet::new(), Gender::Both)
    }
}

/// Category name → matched phrases, in lexicon order. Only non-empty entries.
pub type CategoryMatches = BTreeMap<String, Vec<String>>;

/// A [`DiseaseRecord`] with its derived annotations attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDiseaseRecord {
    #[serde(flatten)]
    pub record: DiseaseRecord,
    pub demographics: DemographicProfile,
    #[serde(default)]
    pub matched_symptom_categories: CategoryMatches,
}

impl EnrichedDiseaseRecord {
    pub fn summary(&self) -> DiseaseSummaryRef {
        DiseaseSummaryRef {
            id: self.record.id.clone(),
            name: self.record.name.clone(),
            url: self.record.url.clone(),
            demographics: self.demographics.clone(),
        }
    }
}

/// Lightweight projection of a disease stored in index buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseSummaryRef {
    pub id: String,
    pub name: String,
    pub url: String,
    pub demographics: DemographicProfile,
}

/// Run metadata written by the collector next to the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub record_count: usize,
}

/// An enriched collection: the input's shape with every record annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCollection {
    #[serde(default)]
    pub metadata: CollectionMetadata,
    pub diseases: Vec<EnrichedDiseaseRecord>,
}
