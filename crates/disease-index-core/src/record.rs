//! Lenient decoding of collector output into typed records.
//!
//! The collector writes loosely-shaped JSON (Spanish or English keys,
//! blocks tagged by a string field). Decoding is explicit: every section and
//! block is checked against the three known block shapes, and anything that
//! does not fit is dropped and reported as a [`RecordIssue`] instead of
//! failing the record or the batch. Only a record that is not an object, or
//! that has neither an identifier nor an address, is skipped entirely.

use serde_json::{Map, Value};

use crate::error::{CollectionError, RecordError, RecordIssue};
use crate::identifier::IdScheme;
use crate::models::{CollectionMetadata, ContentBlock, ContentSection, DiseaseRecord};

const DISEASES_KEYS: &[&str] = &["diseases", "enfermedades"];
const SOURCE_KEYS: &[&str] = &["source", "fuente"];
const COUNT_KEYS: &[&str] = &["record_count", "total_registros"];
const NAME_KEYS: &[&str] = &["name", "nombre"];
const SYMPTOMS_KEYS: &[&str] = &["symptoms_and_causes", "sintomas_causas"];
const DIAGNOSIS_KEYS: &[&str] = &["diagnosis_and_treatment", "diagnostico_tratamiento"];
const TITLE_KEYS: &[&str] = &["title", "titulo"];
const BLOCKS_KEYS: &[&str] = &["blocks", "contenido"];
const TAG_KEYS: &[&str] = &["type", "tipo"];
const TEXT_KEYS: &[&str] = &["text", "contenido"];

/// Keys holding derived annotations; recomputed on every run, never carried over.
const DERIVED_KEYS: &[&str] = &[
    "demographics",
    "matched_symptom_categories",
    "demografia",
    "sintomas_compartidos",
];

/// A decoded input collection.
#[derive(Debug, Default)]
pub struct DecodedCollection {
    pub metadata: CollectionMetadata,
    pub records: Vec<DiseaseRecord>,
    pub issues: Vec<RecordIssue>,
    pub skipped: Vec<RecordError>,
}

/// Decode a whole collection. Fails only if the top level is unusable.
pub fn decode_collection(
    value: Value,
    scheme: &IdScheme,
) -> Result<DecodedCollection, CollectionError> {
    let Value::Object(mut top) = value else {
        return Err(CollectionError::NotAnObject);
    };

    let diseases = match take_first(&mut top, DISEASES_KEYS) {
        Some(Value::Array(items)) => items,
        _ => return Err(CollectionError::MissingDiseases),
    };

    let mut out = DecodedCollection {
        metadata: decode_metadata(top.remove("metadata")),
        ..Default::default()
    };

    for (position, item) in diseases.into_iter().enumerate() {
        match decode_record(item, position, scheme) {
            Ok((record, issues)) => {
                out.records.push(record);
                out.issues.extend(issues);
            }
            Err(err) => out.skipped.push(err),
        }
    }

    Ok(out)
}

fn decode_metadata(value: Option<Value>) -> CollectionMetadata {
    let Some(Value::Object(mut meta)) = value else {
        return CollectionMetadata::default();
    };
    CollectionMetadata {
        source: take_first(&mut meta, SOURCE_KEYS).and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }),
        record_count: take_first(&mut meta, COUNT_KEYS)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize,
    }
}

/// Decode one record; `position` is its index in the input array.
pub fn decode_record(
    value: Value,
    position: usize,
    scheme: &IdScheme,
) -> Result<(DiseaseRecord, Vec<RecordIssue>), RecordError> {
    let Value::Object(mut obj) = value else {
        return Err(RecordError::NotAnObject { position });
    };

    let mut issues = Vec::new();
    let raw_id = take_string(&mut obj, &["id"]);
    let raw_url = take_string(&mut obj, &["url"]);
    let label = raw_id
        .as_ref()
        .and_then(|r| r.as_ref().ok())
        .cloned()
        .unwrap_or_else(|| format!("#{}", position));

    let url = match raw_url {
        Some(Ok(url)) => url,
        Some(Err(kind)) => {
            issues.push(RecordIssue::new(&label, "url", format!("expected a string, found {}", kind)));
            String::new()
        }
        None => String::new(),
    };

    let id = match raw_id {
        Some(Ok(id)) if !id.is_empty() => id,
        other => {
            if let Some(Err(kind)) = other {
                issues.push(RecordIssue::new(&label, "id", format!("expected a string, found {}", kind)));
            }
            if url.is_empty() {
                return Err(RecordError::Unidentifiable { position });
            }
            let id = scheme.assign(&url);
            issues.push(RecordIssue::new(&label, "id", format!("missing, derived {} from url", id)));
            id
        }
    };

    let name = match take_string(&mut obj, NAME_KEYS) {
        Some(Ok(name)) => name,
        Some(Err(kind)) => {
            issues.push(RecordIssue::new(&id, "name", format!("expected a string, found {}", kind)));
            String::new()
        }
        None => {
            issues.push(RecordIssue::new(&id, "name", "missing"));
            String::new()
        }
    };
    if url.is_empty() {
        issues.push(RecordIssue::new(&id, "url", "missing"));
    }

    let symptoms_and_causes = decode_sections(
        take_first(&mut obj, SYMPTOMS_KEYS),
        &id,
        SYMPTOMS_KEYS[0],
        &mut issues,
    );
    let diagnosis_and_treatment = decode_sections(
        take_first(&mut obj, DIAGNOSIS_KEYS),
        &id,
        DIAGNOSIS_KEYS[0],
        &mut issues,
    );

    for key in DERIVED_KEYS {
        obj.remove(*key);
    }

    let record = DiseaseRecord {
        id,
        name,
        url,
        symptoms_and_causes,
        diagnosis_and_treatment,
        extra: obj,
    };
    Ok((record, issues))
}

fn decode_sections(
    value: Option<Value>,
    record: &str,
    field: &str,
    issues: &mut Vec<RecordIssue>,
) -> Vec<ContentSection> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            issues.push(RecordIssue::new(
                record,
                field,
                format!("expected an array of sections, found {}", kind_of(&other)),
            ));
            return Vec::new();
        }
    };

    let mut sections = Vec::with_capacity(items.len());
    for (si, item) in items.into_iter().enumerate() {
        let path = format!("{}[{}]", field, si);
        let mut obj = match item {
            Value::Object(obj) => obj,
            other => {
                issues.push(RecordIssue::new(
                    record,
                    &path,
                    format!("expected a section object, found {}", kind_of(&other)),
                ));
                continue;
            }
        };

        let title = match take_string(&mut obj, TITLE_KEYS) {
            Some(Ok(title)) => title,
            Some(Err(kind)) => {
                issues.push(RecordIssue::new(
                    record,
                    format!("{}.title", path),
                    format!("expected a string, found {}", kind),
                ));
                String::new()
            }
            None => String::new(),
        };

        let blocks = match take_first(&mut obj, BLOCKS_KEYS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(raw)) => raw
                .into_iter()
                .enumerate()
                .filter_map(|(bi, block)| {
                    decode_block(block, record, &format!("{}.blocks[{}]", path, bi), issues)
                })
                .collect(),
            Some(other) => {
                issues.push(RecordIssue::new(
                    record,
                    format!("{}.blocks", path),
                    format!("expected an array of blocks, found {}", kind_of(&other)),
                ));
                Vec::new()
            }
        };

        sections.push(ContentSection { title, blocks });
    }
    sections
}

fn decode_block(
    value: Value,
    record: &str,
    path: &str,
    issues: &mut Vec<RecordIssue>,
) -> Option<ContentBlock> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => {
            issues.push(RecordIssue::new(
                record,
                path,
                format!("expected a block object, found {}", kind_of(&other)),
            ));
            return None;
        }
    };

    let tag = match take_string(&mut obj, TAG_KEYS) {
        Some(Ok(tag)) => tag,
        _ => {
            issues.push(RecordIssue::new(record, path, "block has no type tag"));
            return None;
        }
    };

    match tag.as_str() {
        "paragraph" | "parrafo" | "subtitle" | "subtitulo" => {
            let text = match take_string(&mut obj, TEXT_KEYS) {
                Some(Ok(text)) => text,
                Some(Err(kind)) => {
                    issues.push(RecordIssue::new(
                        record,
                        path,
                        format!("{} text must be a string, found {}", tag, kind),
                    ));
                    return None;
                }
                None => String::new(),
            };
            if tag.starts_with("sub") {
                Some(ContentBlock::Subtitle { text })
            } else {
                Some(ContentBlock::Paragraph { text })
            }
        }
        "list" | "lista" => {
            let raw = match obj.remove("items") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(raw)) => raw,
                Some(other) => {
                    issues.push(RecordIssue::new(
                        record,
                        path,
                        format!("list items must be an array, found {}", kind_of(&other)),
                    ));
                    return None;
                }
            };
            let mut items = Vec::with_capacity(raw.len());
            for (ii, item) in raw.into_iter().enumerate() {
                match item {
                    Value::String(s) => items.push(s),
                    Value::Number(n) => items.push(n.to_string()),
                    Value::Bool(b) => items.push(b.to_string()),
                    Value::Null => {}
                    other => issues.push(RecordIssue::new(
                        record,
                        format!("{}.items[{}]", path, ii),
                        format!("expected a string, found {}", kind_of(&other)),
                    )),
                }
            }
            Some(ContentBlock::List { items })
        }
        other => {
            issues.push(RecordIssue::new(
                record,
                path,
                format!("unknown block type '{}'", other),
            ));
            None
        }
    }
}

/// Remove every alias of a key; the first present one wins.
fn take_first(obj: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(v) = obj.remove(*key) {
            if found.is_none() {
                found = Some(v);
            }
        }
    }
    found
}

/// `Some(Err(kind))` when the key is present with a non-string value.
fn take_string(
    obj: &mut Map<String, Value>,
    keys: &[&str],
) -> Option<Result<String, &'static str>> {
    match take_first(obj, keys)? {
        Value::String(s) => Some(Ok(s)),
        Value::Null => None,
        other => Some(Err(kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
