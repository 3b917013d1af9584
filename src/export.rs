//! Export symptom text for the embedding stage.
//!
//! Produces JSON Lines, one `{id, name, url, text}` object per disease,
//! where `text` is the disease's configured symptom section rendered with
//! list items as `- item` lines. Diseases without that section (or with an
//! empty one) are skipped and counted.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use disease_index_core::models::{EnrichedCollection, EnrichedDiseaseRecord};
use disease_index_core::section::symptom_text;

use crate::config::Config;
use crate::output::Staging;
use crate::unify::load_artifact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLine {
    pub id: String,
    pub name: String,
    pub url: String,
    pub text: String,
}

/// Lines for every disease with a non-empty `section_title` section, plus the skip count.
pub fn export_lines(diseases: &[EnrichedDiseaseRecord], section_title: &str) -> (Vec<ExportLine>, usize) {
    let mut lines = Vec::with_capacity(diseases.len());
    let mut skipped = 0;
    for disease in diseases {
        let record = &disease.record;
        match symptom_text(record, section_title) {
            Some(text) => lines.push(ExportLine {
                id: record.id.clone(),
                name: record.name.clone(),
                url: record.url.clone(),
                text,
            }),
            None => skipped += 1,
        }
    }
    (lines, skipped)
}

fn to_jsonl(lines: &[ExportLine]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for line in lines {
        serde_json::to_writer(&mut out, line)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Export the enriched collection as JSON Lines.
///
/// Writes to `output` if given (`-` for stdout), otherwise to
/// `[paths].embedding_input`.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let enriched: EnrichedCollection = load_artifact(&config.paths.enriched).await?;
    let (lines, skipped) = export_lines(&enriched.diseases, &config.export.section_title);
    let bytes = to_jsonl(&lines)?;

    let dest = output.unwrap_or(config.paths.embedding_input.as_path());
    if dest == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
        return Ok(());
    }

    let dest_owned = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut staging = Staging::new();
        staging.stage_bytes(&dest_owned, &bytes)?;
        staging.publish()?;
        Ok(())
    })
    .await
    .context("Export task failed")??;

    info!(exported = lines.len(), skipped, "embedding input written");
    eprintln!(
        "Exported {} diseases to {} ({} without a '{}' section)",
        lines.len(),
        dest.display(),
        skipped,
        config.export.section_title
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use disease_index_core::models::{
        ContentBlock, ContentSection, DemographicProfile, DiseaseRecord,
    };

    fn disease(id: &str, sections: Vec<ContentSection>) -> EnrichedDiseaseRecord {
        EnrichedDiseaseRecord {
            record: DiseaseRecord {
                id: id.into(),
                name: format!("Enfermedad {}", id),
                url: format!("https://example.org/{}", id),
                symptoms_and_causes: sections,
                diagnosis_and_treatment: vec![],
                extra: Default::default(),
            },
            demographics: DemographicProfile::default(),
            matched_symptom_categories: Default::default(),
        }
    }

    #[test]
    fn exports_symptom_sections_and_counts_the_rest() {
        let diseases = vec![
            disease(
                "a",
                vec![ContentSection {
                    title: "Síntomas".into(),
                    blocks: vec![
                        ContentBlock::Paragraph { text: "Incluyen:".into() },
                        ContentBlock::List { items: vec!["fiebre".into(), "tos".into()] },
                    ],
                }],
            ),
            disease(
                "b",
                vec![ContentSection {
                    title: "Causas".into(),
                    blocks: vec![ContentBlock::Paragraph { text: "Virus.".into() }],
                }],
            ),
            disease(
                "c",
                vec![ContentSection {
                    title: "síntomas".into(),
                    blocks: vec![ContentBlock::Subtitle { text: "Vacío".into() }],
                }],
            ),
        ];
        let (lines, skipped) = export_lines(&diseases, "síntomas");
        assert_eq!(skipped, 2);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "a");
        assert_eq!(lines[0].text, "Incluyen:\n- fiebre\n- tos");

        let bytes = to_jsonl(&lines).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        let back: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(back["name"], "Enfermedad a");
    }
}
