//! Schema validation for Section and Doc payloads.
//!
//! Validators take the raw JSON body and check every field before anything touches the store.
//! All violated constraints are collected into a single [`ValidationError`] so a client can fix
//! every problem in one round trip. Unknown fields are ignored.

use docsos_types::NonEmptyText;
use serde_json::{Map, Value};
use std::fmt;

/// One violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Input failed one or more schema constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// True if `field` has at least one violation.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s): ", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects violations while reading fields out of a JSON object.
struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Value) -> Self {
        let mut reader = Self {
            object: raw.as_object(),
            violations: Vec::new(),
        };
        if reader.object.is_none() {
            reader.violate("body", "must be a JSON object");
        }
        reader
    }

    fn violate(&mut self, field: &str, message: &str) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(field))
    }

    fn required_str(&mut self, field: &str) -> Option<&'a str> {
        // A non-object body has already been reported once.
        if self.object.is_none() {
            return None;
        }
        match self.get(field) {
            None | Some(Value::Null) => {
                self.violate(field, "field required");
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.violate(field, "must be a string");
                None
            }
        }
    }

    /// Absent falls back to `default`; explicit `null` is a violation.
    fn defaulted_str(&mut self, field: &str, default: &'a str) -> &'a str {
        match self.get(field) {
            None => default,
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                self.violate(field, "must be a string");
                default
            }
        }
    }

    fn optional_str(&mut self, field: &str) -> Option<&'a str> {
        match self.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.violate(field, "must be a string or null");
                None
            }
        }
    }

    /// Integers up to the store's signed 64-bit range; negatives are rejected.
    fn optional_non_negative_int(&mut self, field: &str) -> Option<i64> {
        match self.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
                (Some(v), _) if v >= 0 => Some(v),
                (Some(_), _) => {
                    self.violate(field, "must be greater than or equal to 0");
                    None
                }
                (None, Some(_)) => {
                    self.violate(field, "must fit in a signed 64-bit integer");
                    None
                }
                (None, None) => {
                    self.violate(field, "must be an integer");
                    None
                }
            },
            Some(_) => {
                self.violate(field, "must be an integer or null");
                None
            }
        }
    }

    fn optional_string_list(&mut self, field: &str) -> Option<Vec<String>> {
        match self.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        _ => self.violate(&format!("{}[{}]", field, i), "must be a string"),
                    }
                }
                Some(out)
            }
            Some(_) => {
                self.violate(field, "must be a list of strings or null");
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationError> {
        if !self.violations.is_empty() {
            return Err(ValidationError {
                violations: self.violations,
            });
        }
        build().ok_or(ValidationError {
            violations: vec![FieldViolation {
                field: "body".into(),
                message: "invalid payload".into(),
            }],
        })
    }
}

/// A validated section payload, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    pub title: NonEmptyText,
    pub description: Option<String>,
    pub order: Option<i64>,
}

impl NewSection {
    /// Validates a raw section payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violated constraint:
    /// - `title` missing, not a string, or blank
    /// - `description` not a string
    /// - `order` not an integer, or negative
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(raw);

        let title = reader
            .required_str("title")
            .and_then(|t| match NonEmptyText::verbatim(t) {
                Ok(t) => Some(t),
                Err(_) => {
                    reader.violate("title", "must not be empty");
                    None
                }
            });
        let description = reader.optional_str("description").map(str::to_owned);
        let order = reader.optional_non_negative_int("order");

        reader.finish(|| {
            Some(NewSection {
                title: title?,
                description,
                order,
            })
        })
    }
}

/// A validated doc payload.
///
/// `section_id` is still text here: resolving it against existing sections is the repository's
/// job and fails as a reference error, not a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoc {
    pub section_id: String,
    pub title: String,
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
}

impl NewDoc {
    /// Validates a raw doc payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violated constraint.
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(raw);

        let section_id = reader.required_str("section_id").map(str::to_owned);
        let title = reader.required_str("title").map(str::to_owned);
        let content = reader.defaulted_str("content", "").to_owned();
        let tags = reader.optional_string_list("tags");
        let cover_image = reader.optional_str("cover_image").map(str::to_owned);

        reader.finish(|| {
            Some(NewDoc {
                section_id: section_id?,
                title: title?,
                content,
                tags,
                cover_image,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_minimal_payload() {
        let section = NewSection::validate(&json!({"title": "Introducción"})).unwrap();

        assert_eq!(section.title.as_str(), "Introducción");
        assert_eq!(section.description, None);
        assert_eq!(section.order, None);
    }

    #[test]
    fn test_section_full_payload() {
        let section = NewSection::validate(&json!({
            "title": "  Memoria  ",
            "description": "Paginación y segmentación",
            "order": 3,
            "ignored": true
        }))
        .unwrap();

        assert_eq!(section.title.as_str(), "  Memoria  ");
        assert_eq!(
            section.description.as_deref(),
            Some("Paginación y segmentación")
        );
        assert_eq!(section.order, Some(3));
    }

    #[test]
    fn test_section_null_optionals_are_absent() {
        let section =
            NewSection::validate(&json!({"title": "x", "description": null, "order": null}))
                .unwrap();
        assert_eq!(section.description, None);
        assert_eq!(section.order, None);
    }

    #[test]
    fn test_section_reports_every_violation() {
        let err = NewSection::validate(&json!({"description": 5, "order": -1})).unwrap_err();

        assert_eq!(err.violations().len(), 3);
        assert!(err.has_field("title"));
        assert!(err.has_field("description"));
        assert!(err.has_field("order"));
    }

    #[test]
    fn test_section_blank_title() {
        let err = NewSection::validate(&json!({"title": "   "})).unwrap_err();
        assert_eq!(
            err.violations(),
            &[FieldViolation {
                field: "title".into(),
                message: "must not be empty".into()
            }]
        );
    }

    #[test]
    fn test_section_order_must_be_integer() {
        let err = NewSection::validate(&json!({"title": "x", "order": 1.5})).unwrap_err();
        assert!(err.has_field("order"));

        let err = NewSection::validate(&json!({"title": "x", "order": "1"})).unwrap_err();
        assert!(err.has_field("order"));

        let err = NewSection::validate(&json!({"title": "x", "order": u64::MAX})).unwrap_err();
        assert!(err.has_field("order"));
    }

    #[test]
    fn test_section_order_accepts_large_values() {
        let section =
            NewSection::validate(&json!({"title": "x", "order": 5_000_000_000u64})).unwrap();
        assert_eq!(section.order, Some(5_000_000_000));

        let section = NewSection::validate(&json!({"title": "x", "order": i64::MAX})).unwrap();
        assert_eq!(section.order, Some(i64::MAX));
    }

    #[test]
    fn test_non_object_body() {
        let err = NewSection::validate(&json!(["title"])).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has_field("body"));

        let err = NewDoc::validate(&json!("nope")).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.has_field("body"));
    }

    #[test]
    fn test_doc_defaults() {
        let doc = NewDoc::validate(&json!({
            "section_id": "65f1c2a9e4b0d3a1f2c3d4e5",
            "title": "Procesos"
        }))
        .unwrap();

        assert_eq!(doc.content, "");
        assert_eq!(doc.tags, None);
        assert_eq!(doc.cover_image, None);
    }

    #[test]
    fn test_doc_does_not_check_identity_format() {
        let doc = NewDoc::validate(&json!({"section_id": "not-an-id", "title": "t"})).unwrap();
        assert_eq!(doc.section_id, "not-an-id");
    }

    #[test]
    fn test_doc_reports_every_violation() {
        let err = NewDoc::validate(&json!({
            "title": 7,
            "content": null,
            "tags": ["ok", 1, false],
            "cover_image": []
        }))
        .unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["section_id", "title", "content", "tags[1]", "tags[2]", "cover_image"]
        );
    }

    #[test]
    fn test_doc_tags_preserve_order() {
        let doc = NewDoc::validate(&json!({
            "section_id": "s",
            "title": "t",
            "tags": ["kernel", "scheduler", "kernel"]
        }))
        .unwrap();
        assert_eq!(
            doc.tags,
            Some(vec![
                "kernel".to_string(),
                "scheduler".to_string(),
                "kernel".to_string()
            ])
        );
    }

    #[test]
    fn test_display_lists_fields() {
        let err = NewDoc::validate(&json!({})).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("2 validation error(s)"));
        assert!(text.contains("section_id: field required"));
        assert!(text.contains("title: field required"));
    }
}
