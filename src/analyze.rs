//! `dxi analyze`: run the categorizer and demographic rules on free text.

use anyhow::Result;
use serde::Serialize;

use disease_index_core::categorize::categorize_normalized;
use disease_index_core::demographics::DemographicRules;
use disease_index_core::lexicon::SymptomLexicon;
use disease_index_core::models::{CategoryMatches, DemographicProfile};
use disease_index_core::normalize::normalize;

use crate::config::{load_lexicon, Config};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub normalized: String,
    pub categories: CategoryMatches,
    pub demographics: DemographicProfile,
}

pub fn analyze(text: &str, lexicon: &SymptomLexicon, rules: &DemographicRules) -> Analysis {
    let normalized = normalize(text);
    Analysis {
        categories: categorize_normalized(&normalized, lexicon),
        demographics: rules.infer(text),
        normalized,
    }
}

pub fn run_analyze(config: &Config, text: &str, json: bool) -> Result<()> {
    let lexicon = load_lexicon(config)?;
    let analysis = analyze(text, &lexicon, &DemographicRules::SPANISH);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("normalized:  {}", analysis.normalized);
    let d = &analysis.demographics;
    let ranges: Vec<&str> = d.age_range_tags.iter().map(|r| r.as_str()).collect();
    println!(
        "profile:     ages {}-{} ({}), {}",
        d.min_age,
        d.max_age,
        ranges.join(", "),
        d.predominant_gender
    );
    if analysis.categories.is_empty() {
        println!("categories:  (none)");
    } else {
        println!("categories:");
        for (category, phrases) in &analysis.categories {
            println!("  {}: {}", category, phrases.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use disease_index_core::models::Gender;

    #[test]
    fn analyzes_free_text() {
        let lexicon = SymptomLexicon::spanish();
        let a = analyze(
            "Las mujeres embarazadas presentan Fiebre y tos seca.",
            &lexicon,
            &DemographicRules::SPANISH,
        );
        assert_eq!(a.normalized, "las mujeres embarazadas presentan fiebre y tos seca");
        assert!(a.categories.contains_key("Fiebre"));
        assert!(a.categories.contains_key("Tos"));
        assert_eq!(a.demographics.predominant_gender, Gender::Female);
    }
}
