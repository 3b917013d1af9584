//! Category lookup over the unified artifact.
//!
//! `dxi lookup Dolor --age 8 --gender female` lists the diseases in the
//! `Dolor` bucket whose demographic profile covers an 8-year-old female
//! patient, in bucket order. Category names match exactly first, then by
//! normalized form (`"dolor"`, `"PIEL Y ANEXOS"`).

use anyhow::{bail, Result};

use disease_index_core::index::InvertedIndex;
use disease_index_core::models::{DiseaseSummaryRef, Gender};
use disease_index_core::normalize::normalize;
use disease_index_core::unify::UnifiedArtifact;

use crate::config::Config;
use crate::unify::load_artifact;

/// Patient filter applied to a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientFilter {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
}

impl PatientFilter {
    pub fn matches(&self, summary: &DiseaseSummaryRef) -> bool {
        let profile = &summary.demographics;
        self.age.map_or(true, |age| profile.covers_age(age))
            && self
                .gender
                .map_or(true, |g| profile.predominant_gender.includes(g))
    }
}

/// Resolve `category` to a bucket: exact name, else normalized-name equality.
pub fn find_bucket<'a>(
    index: &'a InvertedIndex,
    category: &str,
) -> Option<(&'a str, &'a [DiseaseSummaryRef])> {
    if let Some((name, refs)) = index.iter().find(|(name, _)| *name == category) {
        return Some((name, refs));
    }
    let wanted = normalize(category.trim());
    index
        .iter()
        .find(|(name, _)| normalize(name) == wanted)
}

pub fn lookup<'a>(
    index: &'a InvertedIndex,
    category: &str,
    filter: PatientFilter,
) -> Option<(&'a str, Vec<&'a DiseaseSummaryRef>)> {
    let (name, refs) = find_bucket(index, category)?;
    Some((name, refs.iter().filter(|r| filter.matches(r)).collect()))
}

pub async fn run_lookup(config: &Config, category: &str, filter: PatientFilter) -> Result<()> {
    let artifact: UnifiedArtifact = load_artifact(&config.paths.unified).await?;
    let index = &artifact.symptom_index;

    let Some((name, hits)) = lookup(index, category, filter) else {
        let known: Vec<&str> = index.categories().collect();
        bail!(
            "unknown category: '{}'. Known categories: {}",
            category,
            known.join(", ")
        );
    };

    if hits.is_empty() {
        println!("No diseases in '{}' match the given filters.", name);
        return Ok(());
    }

    println!("{} ({} disease{})", name, hits.len(), if hits.len() == 1 { "" } else { "s" });
    for (i, hit) in hits.iter().enumerate() {
        let d = &hit.demographics;
        println!(
            "{}. {}  [{}]  ages {}-{}  {}",
            i + 1,
            hit.name,
            hit.id,
            d.min_age,
            d.max_age,
            d.predominant_gender
        );
        println!("    {}", hit.url);
    }
    Ok(())
}
