//! # Payload Schemas
//!
//! Structural validation of incoming tag-creation payloads. Each schema is a
//! plain function from a JSON value to a typed entry; services receive the
//! schema they should apply, so the rules are not tied to the storage types.
//!
//! Validation never touches the store: a payload that fails here is rejected
//! with a field-error map before any tag or verse is resolved.

use crate::{
    errors::{FieldErrors, TagError},
    types::{PurportTagEntry, TranslationTagEntry},
};
use serde_json::{Map, Value};

/// A schema for one entry of a create batch.
pub type EntrySchema<T> = fn(&Value) -> Result<T, FieldErrors>;

pub const MAX_VERSE_ID_CHARS: usize = 15;
pub const MAX_TAG_NAME_CHARS: usize = 100;
pub const MAX_REMARK_CHARS: usize = 1000;

const MISSING: &str = "Missing data for required field.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "Not a valid integer.";
const UNKNOWN_FIELD: &str = "Unknown field.";
const SCHEMA_KEY: &str = "_schema";

/// The envelope of a create request: the target verse plus its raw entries.
#[derive(Debug, Clone)]
pub struct BatchPayload {
    pub verse_id: String,
    pub entries: Vec<Value>,
}

/// Reads typed fields out of a JSON object while collecting errors.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    fn new(value: &'a Value) -> Result<Self, FieldErrors> {
        match value.as_object() {
            Some(object) => Ok(Self {
                object,
                errors: FieldErrors::new(),
            }),
            None => Err(single_error(SCHEMA_KEY, "Invalid input type.")),
        }
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    fn optional_str(&mut self, field: &str, max_chars: usize) -> Option<String> {
        let value = self.present(field)?;
        let Some(s) = value.as_str() else {
            self.push(field, NOT_A_STRING);
            return None;
        };
        if s.chars().count() > max_chars {
            self.push(field, format!("Longer than maximum length {max_chars}."));
            return None;
        }
        Some(s.to_string())
    }

    fn required_str(&mut self, field: &str, max_chars: usize) -> Option<String> {
        if self.present(field).is_none() {
            self.push(field, MISSING);
            return None;
        }
        let s = self.optional_str(field, max_chars)?;
        if s.trim().is_empty() {
            self.push(field, "Field may not be blank.");
            return None;
        }
        Some(s)
    }

    /// Integers may arrive as JSON numbers or as numeric strings. Integral
    /// floats such as `4.0` are accepted as well.
    fn optional_int(&mut self, field: &str) -> Option<i64> {
        let value = self.present(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.push(field, NOT_AN_INTEGER);
        }
        parsed
    }

    fn required_int(&mut self, field: &str) -> Option<i64> {
        if self.present(field).is_none() {
            self.push(field, MISSING);
            return None;
        }
        self.optional_int(field)
    }

    fn reject_unknown(&mut self, allowed: &[&str]) {
        let unknown: Vec<String> = self
            .object
            .keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .cloned()
            .collect();
        for key in unknown {
            self.push(&key, UNKNOWN_FIELD);
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, FieldErrors> {
        match value {
            Some(v) if self.errors.is_empty() => Ok(v),
            _ => Err(self.errors),
        }
    }
}

fn single_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.to_string()]);
    errors
}

fn tag_level(reader: &mut FieldReader<'_>) -> Option<i64> {
    let level = reader.optional_int("level")?;
    if level < 1 {
        reader.push("level", "Must be greater than or equal to 1.");
    }
    Some(level)
}

/// A blank remark carries no information and is stored as absent.
fn remark(reader: &mut FieldReader<'_>) -> Option<String> {
    reader
        .optional_str("tagger_remark", MAX_REMARK_CHARS)
        .filter(|r| !r.trim().is_empty())
}

/// Schema for one `translationtags` entry: `{tag, tagger_remark?, level?}`.
pub fn translation_tag_entry(value: &Value) -> Result<TranslationTagEntry, FieldErrors> {
    let mut reader = FieldReader::new(value)?;
    reader.reject_unknown(&["tag", "tagger_remark", "level", "verse_id"]);

    let tag = reader.required_str("tag", MAX_TAG_NAME_CHARS);
    let level = tag_level(&mut reader);
    let tagger_remark = remark(&mut reader);

    let entry = tag.map(|tag| TranslationTagEntry {
        tag,
        level,
        tagger_remark,
    });
    reader.finish(entry)
}

/// Schema for one `purporttags` entry: `{tag, start_idx, end_idx, tagger_remark?, level?}`.
pub fn purport_tag_entry(value: &Value) -> Result<PurportTagEntry, FieldErrors> {
    let mut reader = FieldReader::new(value)?;
    reader.reject_unknown(&[
        "tag",
        "start_idx",
        "end_idx",
        "tagger_remark",
        "level",
        "verse_id",
    ]);

    let tag = reader.required_str("tag", MAX_TAG_NAME_CHARS);
    let start_idx = reader.required_int("start_idx");
    let end_idx = reader.required_int("end_idx");
    let level = tag_level(&mut reader);
    let tagger_remark = remark(&mut reader);

    if let Some(start) = start_idx {
        if start < 0 {
            reader.push("start_idx", "Must be greater than or equal to 0.");
        }
        if let Some(end) = end_idx {
            if end <= start {
                reader.push("end_idx", "Must be greater than start_idx.");
            }
        }
    }

    let entry = match (tag, start_idx, end_idx) {
        (Some(tag), Some(start_idx), Some(end_idx)) => Some(PurportTagEntry {
            tag,
            level,
            start_idx,
            end_idx,
            tagger_remark,
        }),
        _ => None,
    };
    reader.finish(entry)
}

/// Schema for the batch envelope `{verse_id, <entries_key>: [...]}`.
pub fn batch_payload(value: &Value, entries_key: &str) -> Result<BatchPayload, FieldErrors> {
    let mut reader = FieldReader::new(value)?;
    reader.reject_unknown(&["verse_id", entries_key]);

    let verse_id = reader.required_str("verse_id", MAX_VERSE_ID_CHARS);
    let entries = match reader.present(entries_key) {
        None => {
            reader.push(entries_key, MISSING);
            None
        }
        Some(Value::Array(items)) => Some(items.clone()),
        Some(_) => {
            reader.push(entries_key, "Not a valid list.");
            None
        }
    };

    let payload = match (verse_id, entries) {
        (Some(verse_id), Some(entries)) => Some(BatchPayload { verse_id, entries }),
        _ => None,
    };
    reader.finish(payload)
}

/// Runs `schema` over every entry, collecting all failures under
/// `<entries_key>.<index>.<field>` keys.
pub fn validate_entries<T>(
    entries: &[Value],
    entries_key: &str,
    schema: EntrySchema<T>,
) -> Result<Vec<T>, TagError> {
    let mut validated = Vec::with_capacity(entries.len());
    let mut errors = FieldErrors::new();

    for (index, entry) in entries.iter().enumerate() {
        match schema(entry) {
            Ok(v) => validated.push(v),
            Err(entry_errors) => {
                for (field, messages) in entry_errors {
                    errors.insert(format!("{entries_key}.{index}.{field}"), messages);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(TagError::BadRequestData(errors))
    }
}
