//! Readable text of a single named section.
//!
//! Unlike the enrichment corpus, which flattens every section, these helpers
//! pick one section by title and keep list structure (`- item` lines). The
//! symptom section rendered this way is what the embedding stage consumes.

use crate::models::{ContentBlock, ContentSection, DiseaseRecord};

pub const SYMPTOMS_TITLE: &str = "síntomas";
pub const OVERVIEW_TITLE: &str = "descripción general";

/// Paragraphs verbatim and list items as `- item`, one per line.
/// Subtitles are left out.
pub fn render_section(section: &ContentSection) -> String {
    let mut lines: Vec<String> = Vec::new();
    for block in &section.blocks {
        match block {
            ContentBlock::Paragraph { text } => lines.push(text.clone()),
            ContentBlock::List { items } => {
                lines.extend(items.iter().map(|item| format!("- {}", item)))
            }
            ContentBlock::Subtitle { .. } => {}
        }
    }
    lines.join("\n")
}

/// First section whose title equals `title`, ignoring case and outer whitespace.
pub fn find_section<'a, I>(sections: I, title: &str) -> Option<&'a ContentSection>
where
    I: IntoIterator<Item = &'a ContentSection>,
{
    let wanted = title.trim().to_lowercase();
    sections
        .into_iter()
        .find(|s| s.title.trim().to_lowercase() == wanted)
}

/// Rendered text of the section titled `title` in either tab.
pub fn section_text(record: &DiseaseRecord, title: &str) -> Option<String> {
    find_section(record.sections(), title).map(render_section)
}

/// Rendered text of the symptoms-and-causes section titled `title`,
/// or `None` when it is missing or renders empty.
pub fn symptom_text(record: &DiseaseRecord, title: &str) -> Option<String> {
    find_section(&record.symptoms_and_causes, title)
        .map(render_section)
        .filter(|text| !text.trim().is_empty())
}
