//! The unified artifact: enriched diseases plus the symptom index.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::UnifyError;
use crate::index::InvertedIndex;
use crate::models::{EnrichedCollection, EnrichedDiseaseRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedArtifact {
    pub diseases: Vec<EnrichedDiseaseRecord>,
    pub symptom_index: InvertedIndex,
}

/// Structural merge; no records are added, dropped or rewritten.
pub fn unify(enriched: EnrichedCollection, index: InvertedIndex) -> UnifiedArtifact {
    UnifiedArtifact {
        diseases: enriched.diseases,
        symptom_index: index,
    }
}

/// Parse an artifact read from `path`, reporting shape errors as [`UnifyError::Malformed`].
pub fn parse_artifact<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, UnifyError> {
    serde_json::from_str(text).map_err(|e| UnifyError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
