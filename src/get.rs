//! Disease retrieval by identifier.
//!
//! Used by `dxi get <id>`: looks the disease up in the unified artifact and
//! prints its profile, matched categories and overview section.

use anyhow::{bail, Result};

use disease_index_core::models::EnrichedDiseaseRecord;
use disease_index_core::section::{section_text, OVERVIEW_TITLE};
use disease_index_core::unify::UnifiedArtifact;

use crate::config::Config;
use crate::unify::load_artifact;

pub fn find_disease<'a>(artifact: &'a UnifiedArtifact, id: &str) -> Option<&'a EnrichedDiseaseRecord> {
    artifact.diseases.iter().find(|d| d.record.id == id)
}

/// CLI entry point: loads the unified artifact and prints one disease.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let artifact: UnifiedArtifact = load_artifact(&config.paths.unified).await?;
    let Some(disease) = find_disease(&artifact, id) else {
        bail!("disease not found: {}", id);
    };
    let record = &disease.record;
    let profile = &disease.demographics;

    println!("--- Disease ---");
    println!("id:          {}", record.id);
    println!("name:        {}", record.name);
    println!("url:         {}", record.url);
    println!("ages:        {}-{}", profile.min_age, profile.max_age);
    let ranges: Vec<&str> = profile.age_range_tags.iter().map(|r| r.as_str()).collect();
    println!("age ranges:  {}", ranges.join(", "));
    println!("gender:      {}", profile.predominant_gender);
    println!();

    println!(
        "--- Symptom categories ({}) ---",
        disease.matched_symptom_categories.len()
    );
    for (category, phrases) in &disease.matched_symptom_categories {
        println!("{}: {}", category, phrases.join(", "));
    }
    println!();

    println!("--- {} ---", OVERVIEW_TITLE);
    match section_text(record, OVERVIEW_TITLE) {
        Some(text) if !text.trim().is_empty() => println!("{}", text),
        _ => println!("(no overview section)"),
    }

    Ok(())
}
