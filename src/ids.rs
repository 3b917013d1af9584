//! `dxi ids`: assign identifiers to a disease list.
//!
//! Accepts either a bare JSON array of disease objects (the collector's
//! list stage) or a collection object with a `diseases` / `enfermedades`
//! array. Each object with a `url` gets `id` set to the identifier derived
//! from it; everything else about the document is preserved.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::warn;

use disease_index_core::error::IdCollision;
use disease_index_core::identifier::{IdRegistry, IdScheme, Registration};

use crate::config::Config;
use crate::output::Staging;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IdAssignment {
    pub assigned: usize,
    /// Addresses listed more than once.
    pub duplicates: Vec<String>,
    pub collisions: Vec<IdCollision>,
    /// Positions of entries without a usable `url`.
    pub unaddressed: Vec<usize>,
}

fn entries_mut(doc: &mut Value) -> Option<&mut Vec<Value>> {
    match doc {
        Value::Array(items) => Some(items),
        Value::Object(obj) => {
            let key = ["diseases", "enfermedades"]
                .into_iter()
                .find(|k| obj.get(*k).is_some_and(Value::is_array))?;
            obj.get_mut(key).and_then(Value::as_array_mut)
        }
        _ => None,
    }
}

/// Fill in `id` for every addressed entry of `doc`.
pub fn assign_ids(doc: &mut Value, scheme: IdScheme) -> Result<IdAssignment> {
    let Some(entries) = entries_mut(doc) else {
        bail!("expected a JSON array or an object with a 'diseases' array");
    };

    let mut registry = IdRegistry::new(scheme);
    let mut report = IdAssignment::default();
    for (pos, entry) in entries.iter_mut().enumerate() {
        let Some(obj) = entry.as_object_mut() else {
            report.unaddressed.push(pos);
            continue;
        };
        let url = match obj.get("url").and_then(Value::as_str) {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => {
                report.unaddressed.push(pos);
                continue;
            }
        };
        match registry.insert(&url) {
            Ok(reg) => {
                if let Registration::Duplicate(_) = reg {
                    report.duplicates.push(url.clone());
                }
                obj.insert("id".into(), Value::String(reg.id().to_string()));
                report.assigned += 1;
            }
            Err(collision) => report.collisions.push(collision),
        }
    }
    Ok(report)
}

pub async fn run_ids(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read disease list: {}", input.display()))?;
    let mut doc: Value = serde_json::from_str(&text)
        .with_context(|| format!("Disease list is not valid JSON: {}", input.display()))?;

    let report = assign_ids(&mut doc, config.identifier.scheme())?;

    for pos in &report.unaddressed {
        warn!(position = pos, "entry has no url; left without an id");
    }
    for url in &report.duplicates {
        warn!(url = %url, "listed more than once");
    }
    for collision in &report.collisions {
        warn!("{}", collision);
    }
    if config.identifier.reject_collisions && !report.collisions.is_empty() {
        bail!("{} identifier collision(s); nothing written", report.collisions.len());
    }

    let dest = output.unwrap_or(input).to_path_buf();
    let published = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut staging = Staging::new();
        staging.stage_json(&dest, &doc)?;
        staging.publish()
    })
    .await
    .context("Writing task failed")??;

    println!(
        "Assigned {} identifiers ({} duplicate urls, {} collisions, {} without url)",
        report.assigned,
        report.duplicates.len(),
        report.collisions.len(),
        report.unaddressed.len()
    );
    for path in published {
        println!("  wrote {}", path.display());
    }
    Ok(())
}
