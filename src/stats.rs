//! Corpus statistics.
//!
//! Summarizes a unified artifact: how many diseases were processed, how
//! many categories they populate, which categories are largest and how many
//! diseases matched nothing. Printed after `dxi run` and by `dxi stats`.

use anyhow::{Context, Result};
use serde::Serialize;

use disease_index_core::unify::UnifiedArtifact;

use crate::config::Config;
use crate::unify::load_artifact;

/// Categories listed in summaries.
pub const TOP_CATEGORIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub diseases: usize,
    pub categories: usize,
    pub uncategorized: usize,
    pub top: Vec<(String, usize)>,
}

impl CorpusStats {
    pub fn from_artifact(artifact: &UnifiedArtifact) -> Self {
        Self {
            diseases: artifact.diseases.len(),
            categories: artifact.symptom_index.len(),
            uncategorized: artifact
                .diseases
                .iter()
                .filter(|d| d.matched_symptom_categories.is_empty())
                .count(),
            top: artifact
                .symptom_index
                .top_categories(TOP_CATEGORIES)
                .into_iter()
                .map(|(name, size)| (name.to_string(), size))
                .collect(),
        }
    }

    pub fn print(&self) {
        println!("  Diseases:       {}", self.diseases);
        println!("  Categories:     {}", self.categories);
        println!("  Uncategorized:  {}", self.uncategorized);
        if !self.top.is_empty() {
            println!();
            println!("  Top categories:");
            let width = self.top.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
            for (name, size) in &self.top {
                println!(
                    "    {:<width$}  {} disease{}",
                    name,
                    size,
                    if *size == 1 { "" } else { "s" },
                    width = width
                );
            }
        }
    }
}

/// Run the stats command: read the unified artifact and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let path = &config.paths.unified;
    let artifact: UnifiedArtifact = load_artifact(path).await?;

    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    let modified = meta
        .modified()
        .ok()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp());

    println!("Disease Index: Knowledge Base Stats");
    println!("===================================");
    println!();
    println!("  Artifact:       {}", path.display());
    println!("  Size:           {}", format_bytes(meta.len()));
    println!(
        "  Updated:        {}",
        modified.map(format_ts_relative).unwrap_or_else(|| "unknown".into())
    );
    println!();
    CorpusStats::from_artifact(&artifact).print();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp as a relative time string (e.g. "3 hours ago").
fn format_ts_relative(ts: i64) -> String {
    let delta = chrono::Utc::now().timestamp() - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
