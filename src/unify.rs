//! `dxi unify`: rebuild the unified artifact from the enriched collection
//! and the symptom index on disk.

use std::path::Path;

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::info;

use disease_index_core::error::UnifyError;
use disease_index_core::index::InvertedIndex;
use disease_index_core::models::EnrichedCollection;
use disease_index_core::unify::{parse_artifact, unify};

use crate::config::Config;
use crate::output::Staging;

/// Read a JSON artifact, distinguishing a missing file from a malformed one.
pub async fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, UnifyError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UnifyError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            UnifyError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_artifact(path, &text)
}

pub async fn run_unify(config: &Config) -> Result<()> {
    let enriched: EnrichedCollection = load_artifact(&config.paths.enriched).await?;
    let index: InvertedIndex = load_artifact(&config.paths.index).await?;

    let diseases = enriched.diseases.len();
    let categories = index.len();
    let unified = unify(enriched, index);

    let dest = config.paths.unified.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut staging = Staging::new();
        staging.stage_json(&dest, &unified)?;
        staging.publish()?;
        Ok(())
    })
    .await??;

    info!(diseases, categories, "unified artifact written");
    println!(
        "Unified {} diseases and {} categories into {}",
        diseases,
        categories,
        config.paths.unified.display()
    );
    Ok(())
}
