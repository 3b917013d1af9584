//! # Disease Index Core
//!
//! Deterministic knowledge-enrichment logic for disease-index: the record
//! model, lenient decoding of collector output, identifier derivation, text
//! normalization, lexicon-driven symptom categorization, rule-based
//! demographic inference, and the category → disease inverted index.
//!
//! This crate performs no filesystem I/O, owns no async runtime, and does no
//! logging. Every operation is a pure function of its inputs and of the
//! immutable configuration values ([`lexicon::SymptomLexicon`],
//! [`demographics::DemographicRules`], [`identifier::IdScheme`]) passed to it.
//!
//! ```text
//! DiseaseRecord ──▶ enrich ──▶ EnrichedDiseaseRecord ──▶ build_index ──▶ InvertedIndex
//!                    │  ▲                                                   │
//!          normalize─┘  └─ categorize + infer                      unify ◀──┘
//! ```

pub mod categorize;
pub mod demographics;
pub mod enrich;
pub mod error;
pub mod identifier;
pub mod index;
pub mod lexicon;
pub mod models;
pub mod normalize;
pub mod record;
pub mod section;
pub mod unify;
