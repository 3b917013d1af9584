//! `dxi run`: the full enrichment pipeline.
//!
//! ```text
//! input ──▶ decode ──▶ audit ids ──▶ enrich (rayon) ──▶ index ──▶ unify ──▶ stage ──▶ publish
//! ```
//!
//! Enrichment is a parallel map over the records, collected back in input
//! order, so the index fold always sees the same sequence. The three
//! artifacts are staged next to their destinations and renamed into place
//! only after all of them were written; a failed or cancelled run leaves
//! every previously published artifact as it was.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use disease_index_core::enrich::Enricher;
use disease_index_core::error::IdCollision;
use disease_index_core::identifier::{detect_duplicates, IdRegistry, IdScheme};
use disease_index_core::index::{build_index, build_index_sharded, InvertedIndex};
use disease_index_core::models::{
    CollectionMetadata, DiseaseRecord, EnrichedCollection, EnrichedDiseaseRecord,
};
use disease_index_core::unify::{unify, UnifiedArtifact};

use crate::collection::read_collection;
use crate::config::{load_lexicon, Config, PathsConfig};
use crate::output::Staging;
use crate::progress::{report_step, ProgressEvent, ProgressMode, ProgressReporter};
use crate::stats::CorpusStats;

/// Identifier integrity findings. None of them stop a run on their own.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdAudit {
    /// Identifiers carried by more than one record.
    pub duplicates: BTreeSet<String>,
    /// Records whose identifier is not the one their address derives.
    pub mismatched: usize,
    /// Distinct addresses whose derived identifiers collide.
    pub collisions: Vec<IdCollision>,
}

impl IdAudit {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.mismatched == 0 && self.collisions.is_empty()
    }
}

pub fn audit_identifiers(records: &[DiseaseRecord], scheme: IdScheme) -> IdAudit {
    let mut audit = IdAudit {
        duplicates: detect_duplicates(records.iter().map(|r| r.id.as_str())),
        ..Default::default()
    };
    let mut registry = IdRegistry::new(scheme);
    for record in records.iter().filter(|r| !r.url.is_empty()) {
        match registry.insert(&record.url) {
            Ok(reg) if reg.id() != record.id => audit.mismatched += 1,
            Ok(_) => {}
            Err(collision) => audit.collisions.push(collision),
        }
    }
    audit
}

/// Enrich every record on the current rayon pool, preserving input order.
///
/// Returns `None` if `cancelled` was raised before all records were done.
pub fn enrich_all(
    records: &[DiseaseRecord],
    enricher: &Enricher,
    cancelled: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> Option<Vec<EnrichedDiseaseRecord>> {
    let total = records.len() as u64;
    let step = report_step(total);
    let done = AtomicU64::new(0);

    records
        .par_iter()
        .map(|record| {
            if cancelled.load(Ordering::Relaxed) {
                return None;
            }
            let enriched = enricher.enrich(record);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % step == 0 || n == total {
                reporter.report(ProgressEvent::Enriching { n, total });
            }
            Some(enriched)
        })
        .collect()
}

/// Fold the index sequentially or over `shards` parallel shards.
pub fn index_records(records: &[EnrichedDiseaseRecord], shards: usize) -> InvertedIndex {
    if shards > 1 {
        build_index_sharded(records, shards)
    } else {
        build_index(records)
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub stats: CorpusStats,
    pub audit: IdAudit,
    pub issues: usize,
    pub skipped: usize,
    pub published: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The input held no diseases; nothing was written.
    Empty,
    /// Interrupted before publishing; nothing was written.
    Cancelled,
}

struct Artifacts {
    enriched: EnrichedCollection,
    index: InvertedIndex,
}

pub async fn run(config: &Config, progress: ProgressMode) -> Result<RunOutcome> {
    let reporter: Arc<dyn ProgressReporter> = Arc::from(progress.reporter());
    let scheme = config.identifier.scheme();

    reporter.report(ProgressEvent::Loading {
        path: config.paths.input.clone(),
    });
    let decoded = read_collection(&config.paths.input, &scheme).await?;

    if decoded.records.is_empty() {
        warn!(
            input = %config.paths.input.display(),
            "input collection has no diseases; nothing to do"
        );
        return Ok(RunOutcome::Empty);
    }

    let audit = audit_identifiers(&decoded.records, scheme);
    if !audit.duplicates.is_empty() {
        let ids: Vec<&str> = audit.duplicates.iter().map(String::as_str).collect();
        warn!(count = ids.len(), "duplicate identifiers: {}", ids.join(", "));
    }
    if audit.mismatched > 0 {
        warn!(
            count = audit.mismatched,
            "identifiers do not match the ones derived from their urls; kept as-is"
        );
    }
    for collision in &audit.collisions {
        warn!("{}", collision);
    }
    if config.identifier.reject_collisions && !audit.collisions.is_empty() {
        bail!(
            "{} identifier collision(s); increase identifier.length or disable identifier.reject_collisions",
            audit.collisions.len()
        );
    }

    let lexicon = load_lexicon(config)?;
    debug!(
        categories = lexicon.categories().len(),
        phrases = lexicon.phrase_count(),
        "lexicon loaded"
    );
    let enricher = Enricher::new(lexicon, Default::default());

    let workers = config.enrichment.workers;
    let shards = config.enrichment.index_shards;
    let metadata = CollectionMetadata {
        source: decoded.metadata.source.clone(),
        record_count: decoded.records.len(),
    };
    let issues = decoded.issues.len();
    let skipped = decoded.skipped.len();
    let records = decoded.records;

    let cancelled = Arc::new(AtomicBool::new(false));
    let task = {
        let cancelled = Arc::clone(&cancelled);
        let reporter = Arc::clone(&reporter);
        tokio::task::spawn_blocking(move || -> Result<Option<Artifacts>> {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .context("Failed to start enrichment workers")?;
            Ok(pool.install(|| {
                let diseases = enrich_all(&records, &enricher, &cancelled, reporter.as_ref())?;
                let index = index_records(&diseases, shards);
                Some(Artifacts {
                    enriched: EnrichedCollection { metadata, diseases },
                    index,
                })
            }))
        })
    };
    let Some(Artifacts { enriched, index }) = until_interrupted(task, &cancelled).await?.flatten()
    else {
        return Ok(RunOutcome::Cancelled);
    };

    let metadata = enriched.metadata.clone();
    let unified = unify(enriched, index);
    let stats = CorpusStats::from_artifact(&unified);
    info!(
        diseases = stats.diseases,
        categories = stats.categories,
        uncategorized = stats.uncategorized,
        "enrichment finished"
    );

    reporter.report(ProgressEvent::Publishing { artifacts: 3 });
    let paths = config.paths.clone();
    let staging = tokio::task::spawn_blocking(move || stage_artifacts(&unified, metadata, &paths));
    let Some(staged) = until_interrupted(staging, &cancelled).await? else {
        return Ok(RunOutcome::Cancelled);
    };

    let published = tokio::task::spawn_blocking(move || staged.publish())
        .await
        .context("Publishing task failed")??;
    for path in &published {
        info!(path = %path.display(), "published");
    }

    Ok(RunOutcome::Completed(RunReport {
        stats,
        audit,
        issues,
        skipped,
        published,
    }))
}

/// Await `task` unless Ctrl-C arrives first. On interrupt `cancelled` is
/// raised, the task is allowed to wind down and its result is dropped.
async fn until_interrupted<T>(
    mut task: JoinHandle<Result<T>>,
    cancelled: &AtomicBool,
) -> Result<Option<T>> {
    tokio::select! {
        joined = &mut task => Ok(Some(joined.context("Background task failed")??)),
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("interrupted; discarding results");
            cancelled.store(true, Ordering::Relaxed);
            let _ = task.await;
            Ok(None)
        }
    }
}

fn stage_artifacts(
    unified: &UnifiedArtifact,
    metadata: CollectionMetadata,
    paths: &PathsConfig,
) -> Result<Staging> {
    let enriched = EnrichedCollectionRef {
        metadata,
        diseases: &unified.diseases,
    };
    let mut staging = Staging::new();
    staging.stage_json(&paths.enriched, &enriched)?;
    staging.stage_json(&paths.index, &unified.symptom_index)?;
    staging.stage_json(&paths.unified, unified)?;
    Ok(staging)
}

/// Borrowed twin of [`EnrichedCollection`] so staging does not clone every record.
#[derive(serde::Serialize)]
struct EnrichedCollectionRef<'a> {
    metadata: CollectionMetadata,
    diseases: &'a [EnrichedDiseaseRecord],
}

/// Run the pipeline and print a human summary.
pub async fn run_and_report(config: &Config, progress: ProgressMode) -> Result<()> {
    match run(config, progress).await? {
        RunOutcome::Empty => {
            println!("No diseases in {}; nothing written.", config.paths.input.display());
        }
        RunOutcome::Cancelled => {
            println!("Run cancelled; no artifacts were written.");
        }
        RunOutcome::Completed(report) => {
            println!("Run complete");
            println!("============");
            println!();
            report.stats.print();
            println!();
            if report.skipped > 0 || report.issues > 0 {
                println!(
                    "  Skipped records: {}   Record issues: {}",
                    report.skipped, report.issues
                );
            }
            if !report.audit.is_clean() {
                println!(
                    "  Duplicate ids: {}   Mismatched ids: {}   Collisions: {}",
                    report.audit.duplicates.len(),
                    report.audit.mismatched,
                    report.audit.collisions.len()
                );
            }
            for path in &report.published {
                println!("  wrote {}", path.display());
            }
        }
    }
    Ok(())
}
