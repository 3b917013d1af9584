//! The closed symptom vocabulary: category name → trigger phrases.
//!
//! A [`SymptomLexicon`] is built once at startup, validated, and then only
//! read. Phrases must already be in [`normalize`]d form so that a phrase
//! reported as matched is always a member of its configured list.

use std::collections::HashSet;

use serde::Deserialize;

use crate::categorize::PhraseMatcher;
use crate::error::LexiconError;
use crate::normalize::normalize;

/// One category and its ordered, de-duplicated trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Serialized lexicon file: a list of `[[category]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconFile {
    #[serde(rename = "category", default)]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Immutable category → phrase configuration plus its compiled matcher.
#[derive(Debug, Clone)]
pub struct SymptomLexicon {
    categories: Vec<Category>,
    matcher: PhraseMatcher,
}

impl SymptomLexicon {
    /// Validate and compile a lexicon. Category order is preserved.
    pub fn new<I, N, P, S>(entries: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories = Vec::new();
        let mut names = HashSet::new();

        for (name, phrases) in entries {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(LexiconError::EmptyCategoryName);
            }
            if !names.insert(name.clone()) {
                return Err(LexiconError::DuplicateCategory(name));
            }

            let mut seen = HashSet::new();
            let mut list = Vec::new();
            for phrase in phrases {
                let phrase: String = phrase.into();
                let normalized = normalize(&phrase);
                let normalized = normalized.trim();
                if phrase != normalized || normalized.is_empty() {
                    return Err(LexiconError::NotNormalized {
                        category: name,
                        phrase,
                        normalized: normalized.to_string(),
                    });
                }
                if seen.insert(phrase.clone()) {
                    list.push(phrase);
                }
            }
            if list.is_empty() {
                return Err(LexiconError::NoPhrases(name));
            }
            categories.push(Category { name, phrases: list });
        }

        if categories.is_empty() {
            return Err(LexiconError::Empty);
        }

        let matcher = PhraseMatcher::build(&categories)?;
        Ok(Self {
            categories,
            matcher,
        })
    }

    pub fn from_file(file: LexiconFile) -> Result<Self, LexiconError> {
        Self::new(file.categories.into_iter().map(|c| (c.name, c.phrases)))
    }

    /// The built-in Spanish symptom lexicon.
    pub fn spanish() -> Self {
        Self::new(SPANISH_LEXICON.iter().map(|(n, p)| (*n, p.iter().copied())))
            .expect("built-in lexicon is valid")
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Whether `phrase` is configured under `category`.
    pub fn contains(&self, category: &str, phrase: &str) -> bool {
        self.category(category)
            .is_some_and(|c| c.phrases.iter().any(|p| p == phrase))
    }

    pub fn phrase_count(&self) -> usize {
        self.categories.iter().map(|c| c.phrases.len()).sum()
    }

    pub(crate) fn matcher(&self) -> &PhraseMatcher {
        &self.matcher
    }
}

impl Default for SymptomLexicon {
    fn default() -> Self {
        Self::spanish()
    }
}

/// Built-in categories, in normalized form.
pub const SPANISH_LEXICON: &[(&str, &[&str])] = &[
    (
        "Dolor",
        &[
            "acidez estomacal",
            "ardor al orinar",
            "disuria",
            "ardor de ojos",
            "dolor abdominal",
            "dolor pelvico",
            "dolor al tener relaciones sexuales",
            "dispareunia",
            "dolor articular",
            "dolor de cabeza",
            "cefalea",
            "migrana",
            "dolor de espalda",
            "dolor de garganta",
            "odinofagia",
            "dolor de muelas",
            "dolor de oido",
            "otalgia",
            "dolor en el costado",
            "dolor en el pecho",
            "opresion en el pecho",
            "dolor muscular",
            "mialgia",
            "dolor oseo",
            "dolor ocular",
            "menstruacion dolorosa",
            "dismenorrea",
            "rigidez de nuca",
        ],
    ),
    ("Fiebre", &["fiebre", "febricula"]),
    (
        "Mareo",
        &["alteraciones del equilibrio", "mareos", "vertigo", "lipotimia"],
    ),
    (
        "Fatiga",
        &[
            "apatia",
            "astenia",
            "cansancio",
            "fatiga",
            "somnolencia diurna excesiva",
            "debilidad muscular",
            "debilidad",
            "lentitud de movimiento",
            "bradicinesia",
            "malestar general",
        ],
    ),
    (
        "Nauseas",
        &[
            "nauseas",
            "vomito",
            "reflujo gastroesofagico",
            "vomitos",
            "vomitos con sangre",
            "hematemesis",
        ],
    ),
    (
        "Tos",
        &["expectoracion", "flema", "tos", "tos seca", "tos productiva"],
    ),
    ("Diarrea", &["diarrea"]),
    ("Estrenimiento", &["estrenimiento"]),
    (
        "Erupcion",
        &[
            "acne",
            "dermatitis",
            "erupciones cutaneas",
            "exantema",
            "urticaria",
            "petequias",
        ],
    ),
    ("Picazon", &["picazon", "prurito"]),
    (
        "Hinchazon",
        &[
            "bultos",
            "masas",
            "distension abdominal",
            "hinchazon abdominal",
            "edema",
            "ganglios linfaticos inflamados",
            "adenopatia",
            "hemorroides",
            "hepatomegalia",
            "hinchazon en manos",
            "hinchazon en pies",
            "inflamacion",
            "gingivitis",
            "encias inflamadas",
            "inflamacion de las articulaciones",
            "rigidez articular",
        ],
    ),
    (
        "Sangrado",
        &[
            "heces negras",
            "melena",
            "heces con sangre",
            "encias sangrantes",
            "hemorragias nasales",
            "epistaxis",
            "menstruacion abundante",
            "menorragia",
            "orina con sangre",
            "hematuria",
            "sangrado entre periodos",
            "sangrado rectal",
        ],
    ),
    ("Hemorragia", &["hemorragia"]),
    ("Calambre", &["calambres musculares"]),
    (
        "Entumecimiento",
        &["adormecimiento", "entumecimiento", "hipoestesia"],
    ),
    ("Hormigueo", &["hormigueo", "parestesia"]),
    (
        "Dificultad",
        &[
            "dificultad para concentrarse",
            "dificultad para deglutir",
            "disfagia",
            "dificultad para hablar",
            "afasia",
            "disartria",
            "dificultad para respirar",
            "disnea",
            "incontinencia",
            "tenesmo vesical",
        ],
    ),
    (
        "Perdida",
        &[
            "adelgazamiento del cabello",
            "afonia",
            "perdida de la voz",
            "alteraciones de la memoria",
            "amnesia",
            "anhedonia",
            "caida del cabello",
            "alopecia",
            "desmayos",
            "sincope",
            "infertilidad",
            "perdida de apetito",
            "anorexia",
            "perdida de la libido",
            "perdida de la coordinacion",
            "ataxia",
            "perdida del gusto",
            "ageusia",
            "perdida del olfato",
            "anosmia",
            "perdida de peso inexplicable",
        ],
    ),
    (
        "Aumento",
        &[
            "aumento de la sed",
            "polidipsia",
            "aumento del apetito",
            "polifagia",
            "aumento de peso inexplicable",
            "aumento del vello corporal",
            "hirsutismo",
            "orinar con frecuencia",
            "polaquiuria",
            "nicturia",
        ],
    ),
    (
        "Secrecion",
        &[
            "exceso de gases",
            "flatulencia",
            "lagrimero excesivo",
            "epifora",
            "pus",
            "salivacion excesiva",
            "sialorrea",
            "secrecion del pezon",
            "secrecion nasal",
            "rinorrea",
            "secrecion ocular",
            "secrecion uretral",
            "secrecion vaginal",
        ],
    ),
    ("Ampollas", &["ampollas", "llagas", "ulceras", "vesiculas"]),
    ("Escalofrios", &["escalofrios", "piel fria", "piel humeda"]),
    (
        "Sudoracion",
        &["alteraciones en el sudor", "sudores nocturnos", "diaforesis"],
    ),
    (
        "Ansiedad",
        &["agitacion", "ansiedad", "nerviosismo", "inquietud"],
    ),
    (
        "Depresion",
        &["depresion", "animo bajo", "tristeza persistente"],
    ),
    ("Insomnio", &["insomnio", "dificultad para dormir"]),
    (
        "Confusion",
        &[
            "confusion",
            "desorientacion",
            "delirios",
            "despersonalizacion",
            "letargo",
        ],
    ),
    (
        "Palpitaciones",
        &["palpitaciones", "taquicardia", "bradicardia"],
    ),
    (
        "Ojos y Vision",
        &[
            "vision borrosa",
            "vision doble",
            "diplopia",
            "ojos rojos",
            "sensibilidad a la luz",
            "fotofobia",
            "ceguera",
        ],
    ),
    (
        "Oido y Audicion",
        &["tinnitus", "acufenos", "perdida de la audicion", "hipoacusia"],
    ),
    (
        "Boca y Garganta",
        &[
            "boca seca",
            "xerostomia",
            "mal aliento",
            "halitosis",
            "llagas en la boca",
        ],
    ),
    (
        "Sistema Urinario",
        &["miccion frecuente", "dolor al orinar", "orina turbia"],
    ),
    (
        "Piel y Anexos",
        &[
            "palidez",
            "piel amarillenta",
            "ictericia",
            "piel azulada",
            "cianosis",
        ],
    ),
    (
        "Estado de Animo y Comportamiento",
        &["irritabilidad", "cambios de humor", "aislamiento social"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lexicon_is_valid() {
        let lex = SymptomLexicon::spanish();
        assert_eq!(lex.categories().len(), SPANISH_LEXICON.len());
        assert!(lex.contains("Tos", "tos seca"));
        assert!(lex.contains("Dolor", "migrana"));
        assert!(!lex.contains("Tos", "fiebre"));
    }

    #[test]
    fn rejects_unnormalized_phrase() {
        let err = SymptomLexicon::new([("Dolor", ["Migraña"])]).unwrap_err();
        assert_eq!(
            err,
            LexiconError::NotNormalized {
                category: "Dolor".into(),
                phrase: "Migraña".into(),
                normalized: "migrana".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_and_empty() {
        assert_eq!(
            SymptomLexicon::new([("A", vec!["x"]), ("A", vec!["y"])]).unwrap_err(),
            LexiconError::DuplicateCategory("A".into())
        );
        assert_eq!(
            SymptomLexicon::new([("A", Vec::<String>::new())]).unwrap_err(),
            LexiconError::NoPhrases("A".into())
        );
        assert_eq!(
            SymptomLexicon::new(Vec::<(String, Vec<String>)>::new()).unwrap_err(),
            LexiconError::Empty
        );
        assert!(matches!(
            SymptomLexicon::new([("A", [" tos"])]).unwrap_err(),
            LexiconError::NotNormalized { .. }
        ));
    }

    #[test]
    fn phrases_deduplicated_in_order() {
        let lex = SymptomLexicon::new([("Tos", ["tos", "flema", "tos"])]).unwrap();
        assert_eq!(lex.categories()[0].phrases, vec!["tos", "flema"]);
    }

    #[test]
    fn builds_from_lexicon_file_shape() {
        let file: LexiconFile = file_shaped_lexicon();
        let lex = SymptomLexicon::from_file(file).unwrap();
        assert_eq!(lex.phrase_count(), 3);
    }

    fn file_shaped_lexicon() -> LexiconFile {
        serde_json::from_value(serde_json::json!({
            "category": [
                { "name": "Fiebre", "phrases": ["fiebre"] },
                { "name": "Tos", "phrases": ["tos", "tos seca"] }
            ]
        }))
        .unwrap()
    }
}
