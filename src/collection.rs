//! Reading the collector's disease collection.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use disease_index_core::identifier::IdScheme;
use disease_index_core::record::{decode_collection, DecodedCollection};

/// Read and decode the input collection at `path`.
///
/// Structural problems with the collection as a whole are errors; problems
/// inside individual records are logged as warnings and returned in
/// [`DecodedCollection::issues`] / [`DecodedCollection::skipped`].
pub async fn read_collection(path: &Path, scheme: &IdScheme) -> Result<DecodedCollection> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input collection: {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Input collection is not valid JSON: {}", path.display()))?;

    let decoded = decode_collection(value, scheme)
        .with_context(|| format!("Unusable input collection: {}", path.display()))?;

    log_problems(&decoded);
    debug!(
        records = decoded.records.len(),
        source = decoded.metadata.source.as_deref().unwrap_or("-"),
        "decoded input collection"
    );
    Ok(decoded)
}

fn log_problems(decoded: &DecodedCollection) {
    for skipped in &decoded.skipped {
        warn!("skipped {}", skipped);
    }
    for issue in &decoded.issues {
        warn!("{}", issue);
    }
    if decoded.metadata.record_count != 0
        && decoded.metadata.record_count != decoded.records.len() + decoded.skipped.len()
    {
        warn!(
            declared = decoded.metadata.record_count,
            found = decoded.records.len() + decoded.skipped.len(),
            "metadata record count does not match the disease list"
        );
    }
}
