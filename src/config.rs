//! Configuration parsing and validation.
//!
//! `dxi` reads a single TOML file (default `./config/dxi.toml`). Every key
//! except `[paths].input` has a default, so a minimal file is:
//!
//! ```toml
//! [paths]
//! input = "data/enfermedades.json"
//! ```
//!
//! See `config/dxi.example.toml` for every option.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use disease_index_core::identifier::{IdDigest, IdScheme, DEFAULT_ID_LENGTH};
use disease_index_core::lexicon::{LexiconFile, SymptomLexicon};
use disease_index_core::section::SYMPTOMS_TITLE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub identifier: IdentifierConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Input collection and the artifacts derived from it.
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub input: PathBuf,
    #[serde(default = "default_enriched")]
    pub enriched: PathBuf,
    #[serde(default = "default_index")]
    pub index: PathBuf,
    #[serde(default = "default_unified")]
    pub unified: PathBuf,
    #[serde(default = "default_embedding_input")]
    pub embedding_input: PathBuf,
}

fn default_enriched() -> PathBuf {
    PathBuf::from("data/enfermedades_enriquecidas.json")
}
fn default_index() -> PathBuf {
    PathBuf::from("data/indice_sintomas.json")
}
fn default_unified() -> PathBuf {
    PathBuf::from("data/base_conocimiento.json")
}
fn default_embedding_input() -> PathBuf {
    PathBuf::from("data/embedding_input.jsonl")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentifierConfig {
    #[serde(default)]
    pub digest: IdDigest,
    #[serde(default = "default_id_length")]
    pub length: usize,
    /// Fail `dxi run` / `dxi ids` when two addresses truncate to one identifier.
    #[serde(default)]
    pub reject_collisions: bool,
}

fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            digest: IdDigest::default(),
            length: DEFAULT_ID_LENGTH,
            reject_collisions: false,
        }
    }
}

impl IdentifierConfig {
    pub fn scheme(&self) -> IdScheme {
        IdScheme {
            digest: self.digest,
            length: self.length,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    /// Enrichment worker threads; 0 uses every available core.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_index_shards")]
    pub index_shards: usize,
    /// Optional TOML lexicon replacing the built-in Spanish one.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

fn default_index_shards() -> usize {
    1
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            index_shards: 1,
            lexicon: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_section_title")]
    pub section_title: String,
}

fn default_section_title() -> String {
    SYMPTOMS_TITLE.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            section_title: default_section_title(),
        }
    }
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            paths: PathsConfig {
                input: PathBuf::from("data/enfermedades.json"),
                enriched: default_enriched(),
                index: default_index(),
                unified: default_unified(),
                embedding_input: default_embedding_input(),
            },
            identifier: IdentifierConfig::default(),
            enrichment: EnrichmentConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let id = &config.identifier;
    if !(6..=64).contains(&id.length) {
        bail!("identifier.length must be in [6, 64], got {}", id.length);
    }
    if id.length > id.digest.hex_len() {
        bail!(
            "identifier.length {} exceeds the {}-character {:?} digest",
            id.length,
            id.digest.hex_len(),
            id.digest
        );
    }

    if config.enrichment.index_shards == 0 {
        bail!("enrichment.index_shards must be >= 1");
    }

    if config.export.section_title.trim().is_empty() {
        bail!("export.section_title must not be empty");
    }

    let p = &config.paths;
    let outputs = [&p.enriched, &p.index, &p.unified];
    for (i, a) in outputs.iter().enumerate() {
        if *a == &p.input {
            bail!("output path {} would overwrite the input collection", a.display());
        }
        if outputs[i + 1..].contains(a) {
            bail!("output path {} is configured twice", a.display());
        }
    }

    Ok(())
}

/// The configured symptom lexicon: the TOML file named by
/// `[enrichment].lexicon`, or the built-in Spanish lexicon.
pub fn load_lexicon(config: &Config) -> Result<SymptomLexicon> {
    let Some(path) = &config.enrichment.lexicon else {
        return Ok(SymptomLexicon::spanish());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;
    let file: LexiconFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse lexicon file: {}", path.display()))?;
    SymptomLexicon::from_file(file)
        .with_context(|| format!("Invalid lexicon in {}", path.display()))
}
