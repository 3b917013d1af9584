//! Lexicon-driven symptom categorization.
//!
//! Text is normalized once and scanned with a single Aho-Corasick automaton
//! compiled from every phrase in the lexicon. Overlapping matches are all
//! visited, and a match only counts when it is bounded by non-word
//! characters or the ends of the text on both sides, so `"dolor abdominal"`
//! never matches inside `"dolorabdominal"`.

use std::collections::HashMap;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::error::LexiconError;
use crate::lexicon::{Category, SymptomLexicon};
use crate::models::CategoryMatches;
use crate::normalize::{is_word_char, normalize};

/// Compiled multi-pattern matcher over all lexicon phrases.
#[derive(Debug, Clone)]
pub(crate) struct PhraseMatcher {
    automaton: AhoCorasick,
    /// pattern index -> every (category, phrase) slot using that pattern
    owners: Vec<Vec<(usize, usize)>>,
}

impl PhraseMatcher {
    pub(crate) fn build(categories: &[Category]) -> Result<Self, LexiconError> {
        let mut patterns: Vec<&str> = Vec::new();
        let mut owners: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();

        for (ci, category) in categories.iter().enumerate() {
            for (pi, phrase) in category.phrases.iter().enumerate() {
                let idx = *slot.entry(phrase.as_str()).or_insert_with(|| {
                    patterns.push(phrase.as_str());
                    owners.push(Vec::new());
                    patterns.len() - 1
                });
                owners[idx].push((ci, pi));
            }
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| LexiconError::Matcher(e.to_string()))?;

        Ok(Self { automaton, owners })
    }
}

/// Categories whose phrases occur as whole words in `text`.
///
/// Only categories with at least one match are present; each value lists the
/// matched phrases in lexicon order, without duplicates.
pub fn categorize(text: &str, lexicon: &SymptomLexicon) -> CategoryMatches {
    categorize_normalized(&normalize(text), lexicon)
}

/// [`categorize`] for text that is already in normalized form.
pub fn categorize_normalized(normalized: &str, lexicon: &SymptomLexicon) -> CategoryMatches {
    let matcher = lexicon.matcher();
    let categories = lexicon.categories();
    let mut hits: Vec<Vec<bool>> = categories
        .iter()
        .map(|c| vec![false; c.phrases.len()])
        .collect();

    for m in matcher.automaton.find_overlapping_iter(normalized) {
        if !is_whole_word(normalized, m.start(), m.end()) {
            continue;
        }
        for &(ci, pi) in &matcher.owners[m.pattern().as_usize()] {
            hits[ci][pi] = true;
        }
    }

    categories
        .iter()
        .zip(hits)
        .filter_map(|(category, flags)| {
            let matched: Vec<String> = category
                .phrases
                .iter()
                .zip(flags)
                .filter(|(_, hit)| *hit)
                .map(|(phrase, _)| phrase.clone())
                .collect();
            (!matched.is_empty()).then(|| (category.name.clone(), matched))
        })
        .collect()
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> SymptomLexicon {
        SymptomLexicon::spanish()
    }

    /// Phrase-by-phrase scan used as a reference for the automaton.
    fn naive(text: &str, lexicon: &SymptomLexicon) -> CategoryMatches {
        let normalized = normalize(text);
        let mut out = CategoryMatches::new();
        for category in lexicon.categories() {
            let matched: Vec<String> = category
                .phrases
                .iter()
                .filter(|p| {
                    normalized
                        .match_indices(p.as_str())
                        .any(|(i, _)| is_whole_word(&normalized, i, i + p.len()))
                })
                .cloned()
                .collect();
            if !matched.is_empty() {
                out.insert(category.name.clone(), matched);
            }
        }
        out
    }

    #[test]
    fn whole_word_required() {
        let lex = lexicon();
        assert!(categorize("tengo dolorabdominal", &lex).is_empty());
        let hit = categorize("tengo dolor abdominal fuerte", &lex);
        assert_eq!(hit["Dolor"], vec!["dolor abdominal"]);
    }

    #[test]
    fn accents_and_punctuation_ignored() {
        let lex = lexicon();
        let hit = categorize("Náuseas, VÓMITOS y migraña.", &lex);
        assert_eq!(hit["Nauseas"], vec!["nauseas", "vomitos"]);
        assert_eq!(hit["Dolor"], vec!["migrana"]);
    }

    #[test]
    fn overlapping_phrases_all_reported() {
        let lex = lexicon();
        let hit = categorize("tos seca persistente", &lex);
        assert_eq!(hit["Tos"], vec!["tos", "tos seca"]);
        // "vomitos con sangre" also contains "vomitos"
        let hit = categorize("vomitos con sangre", &lex);
        assert_eq!(hit["Nauseas"], vec!["vomitos", "vomitos con sangre"]);
    }

    #[test]
    fn substring_of_longer_word_not_matched() {
        let lex = lexicon();
        // "tos" inside "mitosis", "pus" inside "campus"
        assert!(categorize("mitosis en el campus", &lex).is_empty());
    }

    #[test]
    fn repeated_matches_deduplicated() {
        let lex = lexicon();
        let hit = categorize("fiebre, fiebre y mas fiebre", &lex);
        assert_eq!(hit["Fiebre"], vec!["fiebre"]);
    }

    #[test]
    fn shared_phrase_credits_every_category() {
        let lex = SymptomLexicon::new([("A", ["tos"]), ("B", ["tos"])]).unwrap();
        let hit = categorize("tos", &lex);
        assert_eq!(hit.len(), 2);
    }

    #[test]
    fn soundness() {
        let lex = lexicon();
        let text = "Fiebre alta, tos productiva, dolor de garganta, ictericia, \
                    palpitaciones y piel fria; tambien vision borrosa.";
        for (category, phrases) in categorize(text, &lex) {
            for phrase in phrases {
                assert!(lex.contains(&category, &phrase), "{category}/{phrase}");
            }
        }
    }

    #[test]
    fn automaton_agrees_with_naive_scan() {
        let lex = lexicon();
        let samples = [
            "",
            "Los pacientes presentan fiebre y dolor de cabeza intensos",
            "tos seca dolor de garganta",
            "Perdida del olfato, perdida del gusto; anosmia/ageusia.",
            "dolores articulares, sin dolor articular aparente",
            "sangrado rectal y heces con sangre - hemorragia",
            "inflamacion de las articulaciones e inflamaciones",
            "ulceras llagas en la boca llagas",
            "cefalea_tensional cefalea",
        ];
        for s in samples {
            assert_eq!(categorize(s, &lex), naive(s, &lex), "mismatch for {:?}", s);
        }
    }
}
