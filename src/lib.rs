//! # Disease Index
//!
//! Knowledge enrichment for scraped disease descriptions.
//!
//! An external collector scrapes disease pages into a JSON collection of
//! records with titled narrative sections. Disease Index turns that
//! collection into three derived artifacts: the enriched collection (each
//! record annotated with matched symptom categories and a coarse
//! demographic profile), a category → disease inverted index, and a
//! unified knowledge base combining both. The embedding stage downstream
//! consumes the per-disease symptom text exported from it.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────────┐   ┌──────────────────────┐
//! │ collector  │──▶│  decode + audit   │──▶│ enrich (rayon pool)  │
//! │   JSON     │   │  ids, records     │   │ categorize + infer   │
//! └────────────┘   └───────────────────┘   └──────────┬───────────┘
//!                                                     │
//!                  ┌──────────────┐   ┌───────────────▼──────┐
//!                  │ stage + atomic│◀──│ index fold + unify   │
//!                  │   publish    │   └──────────────────────┘
//!                  └──────────────┘
//! ```
//!
//! The deterministic logic lives in the `disease-index-core` crate; this
//! crate adds configuration, file I/O, parallel execution, progress
//! reporting and the `dxi` command line.
//!
//! ## Quick Start
//!
//! ```bash
//! dxi ids data/lista_enfermedades.json     # fill in identifiers
//! dxi run                                  # enrich, index, unify
//! dxi stats
//! dxi lookup Dolor --age 8 --gender female
//! dxi export                               # symptom text for embeddings
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing, lexicon loading |
//! | [`collection`] | Reading the collector's input collection |
//! | [`pipeline`] | `dxi run`: parallel enrichment and publishing |
//! | [`output`] | All-or-nothing artifact staging |
//! | [`progress`] | Run progress on stderr |
//! | [`unify`] | Artifact loading and `dxi unify` |
//! | [`stats`] | Corpus statistics |
//! | [`lookup`] | Category lookup with patient filters |
//! | [`get`] | Single-disease detail |
//! | [`export`] | JSON Lines export for the embedding stage |
//! | [`ids`] | Identifier assignment for disease lists |
//! | [`analyze`] | Ad-hoc text analysis |

pub mod analyze;
pub mod collection;
pub mod config;
pub mod export;
pub mod get;
pub mod ids;
pub mod lookup;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stats;
pub mod unify;
