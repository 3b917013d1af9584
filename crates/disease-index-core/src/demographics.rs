//! Rule-based demographic hints.
//!
//! Keywords are matched as plain substrings of the lowercased text (no
//! accent stripping, no word boundaries), so "niños" counts for "niño" and
//! "mayores" for "mayor". Gender evidence for both sides resolves to
//! [`Gender::Both`] regardless of the order in which the keywords appear.

use std::collections::BTreeSet;

use crate::models::{AgeRange, DemographicProfile, Gender};

/// Immutable keyword tables for [`infer`].
#[derive(Debug, Clone, Copy)]
pub struct DemographicRules {
    pub male: &'static [&'static str],
    pub female: &'static [&'static str],
    pub pediatric: &'static [&'static str],
    pub young: &'static [&'static str],
    pub adult: &'static [&'static str],
    pub elderly: &'static [&'static str],
}

impl DemographicRules {
    /// Spanish keyword tables.
    pub const SPANISH: DemographicRules = DemographicRules {
        male: &["hombre", "masculino", "varón", "prostático"],
        female: &["mujer", "femenino", "embarazo", "menopausia", "ovárico"],
        pediatric: &["niño", "bebé", "infancia"],
        young: &["joven", "adolescente", "pubertad"],
        adult: &["adulto", "mediana edad"],
        elderly: &["mayor", "anciano", "edad avanzada"],
    };

    pub fn keywords(&self, range: AgeRange) -> &'static [&'static str] {
        match range {
            AgeRange::Pediatric => self.pediatric,
            AgeRange::Young => self.young,
            AgeRange::Adult => self.adult,
            AgeRange::Elderly => self.elderly,
        }
    }

    /// Profile for `text`; empty or blank text yields the default profile.
    pub fn infer(&self, text: &str) -> DemographicProfile {
        if text.trim().is_empty() {
            return DemographicProfile::default();
        }
        let lowered = text.to_lowercase();
        let hits = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

        let gender = match (hits(self.male), hits(self.female)) {
            (true, false) => Gender::Male,
            (false, true) => Gender::Female,
            _ => Gender::Both,
        };

        let ranges: BTreeSet<AgeRange> = AgeRange::ALL
            .into_iter()
            .filter(|r| hits(self.keywords(*r)))
            .collect();

        DemographicProfile::from_ranges(ranges, gender)
    }
}

impl Default for DemographicRules {
    fn default() -> Self {
        Self::SPANISH
    }
}

/// [`DemographicRules::infer`] with the Spanish tables.
pub fn infer(text: &str) -> DemographicProfile {
    DemographicRules::SPANISH.infer(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_default() {
        let p = infer("");
        assert_eq!(p.min_age, 18);
        assert_eq!(p.max_age, 59);
        assert_eq!(p.age_range_tags, BTreeSet::from([AgeRange::Adult]));
        assert_eq!(p.predominant_gender, Gender::Both);
        assert_eq!(infer("   \n\t"), DemographicProfile::default());
    }

    #[test]
    fn no_evidence_defaults_to_adult_both() {
        assert_eq!(infer("fiebre y tos"), DemographicProfile::default());
    }

    #[test]
    fn single_gender() {
        assert_eq!(
            infer("Afecta sobre todo a Mujeres tras la menopausia").predominant_gender,
            Gender::Female
        );
        assert_eq!(
            infer("cáncer prostático en el varón").predominant_gender,
            Gender::Male
        );
    }

    #[test]
    fn both_genders_resolve_to_both_in_any_order() {
        assert_eq!(infer("hombres y mujeres").predominant_gender, Gender::Both);
        assert_eq!(infer("mujeres y hombres").predominant_gender, Gender::Both);
        assert_eq!(
            infer("durante el embarazo; también en el sexo masculino").predominant_gender,
            Gender::Both
        );
    }

    #[test]
    fn age_ranges_combine() {
        let p = infer("Frecuente en niños y en personas de edad avanzada");
        assert_eq!(
            p.age_range_tags,
            BTreeSet::from([AgeRange::Pediatric, AgeRange::Elderly])
        );
        assert_eq!((p.min_age, p.max_age), (0, 100));

        let p = infer("aparece en la pubertad");
        assert_eq!(p.age_range_tags, BTreeSet::from([AgeRange::Young]));
        assert_eq!((p.min_age, p.max_age), (12, 30));
    }

    #[test]
    fn substring_semantics() {
        // "mayores" contains "mayor"; accents are not stripped.
        assert!(infer("en mayores de 65")
            .age_range_tags
            .contains(&AgeRange::Elderly));
        assert_eq!(infer("nino").age_range_tags, BTreeSet::from([AgeRange::Adult]));
    }

    #[test]
    fn invariants_hold() {
        for text in ["", "bebé", "adolescente mujer", "anciano hombre niño joven adulto"] {
            let p = infer(text);
            assert!(p.min_age <= p.max_age);
            assert!(!p.age_range_tags.is_empty());
        }
    }
}
