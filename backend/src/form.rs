//! The CSV-aware multipart parser.
//!
//! Plain and JSON fields pass through untouched. The file uploaded under the
//! configured field name is decoded with [`csv_reader::read`] and stored as
//! `FieldValue::Csv`, raw or keyed depending on `CsvOptions::with_keys`.

use crate::csv_reader;
use crate::error::{FormError, ParseError};
use crate::multipart::{collect_parts, BodyLimits, FormPart};
use actix_multipart::Multipart;
use actix_web::web;
use common::model::csv::CsvOptions;
use common::model::form::{FieldValue, ParsedForm};

/// Builds the parsed mapping from already-decoded parts.
///
/// A missing CSV part leaves no entry behind. Two files under `file_field`
/// are rejected, files under any other name are skipped, and a repeated
/// text or JSON field keeps its last value.
pub fn build_form(
    parts: Vec<FormPart>,
    file_field: &str,
    options: &CsvOptions,
) -> Result<ParsedForm, FormError> {
    let mut form = ParsedForm::new();
    let mut csv_seen = false;

    for part in parts {
        match part {
            FormPart::Text { name, value } => {
                if form.insert(name.clone(), FieldValue::Text(value)).is_some() {
                    log::debug!("field `{}` repeated, keeping the last value", name);
                }
            }
            FormPart::Json { name, value } => {
                if form.insert(name.clone(), FieldValue::Json(value)).is_some() {
                    log::debug!("field `{}` repeated, keeping the last value", name);
                }
            }
            FormPart::File {
                name,
                filename,
                bytes,
            } if name == file_field => {
                if csv_seen {
                    return Err(FormError::DuplicateCsvPart(name));
                }
                csv_seen = true;

                let rows = csv_reader::read(&bytes, options).map_err(|source| FormError::Csv {
                    field: name.clone(),
                    source,
                })?;
                log::debug!(
                    "decoded `{}` from field `{}` into {} data rows",
                    filename,
                    name,
                    rows.data_len()
                );
                form.insert(name, FieldValue::Csv(rows));
            }
            FormPart::File { name, filename, .. } => {
                log::debug!("ignoring upload `{}` in field `{}`", filename, name);
            }
        }
    }

    Ok(form)
}

/// Reads a multipart body and returns its fields with the CSV upload decoded.
///
/// CSV decoding runs on the blocking thread pool.
pub async fn parse_csv_form(
    payload: Multipart,
    file_field: &str,
    limits: BodyLimits,
    options: CsvOptions,
) -> Result<ParsedForm, ParseError> {
    let parts = collect_parts(payload, limits).await?;
    let file_field = file_field.to_string();
    let form = web::block(move || build_form(parts, &file_field, &options)).await??;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::csv::{Cell, CsvRows};
    use serde_json::json;

    fn text(name: &str, value: &str) -> FormPart {
        FormPart::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn json_part(name: &str, value: serde_json::Value) -> FormPart {
        FormPart::Json {
            name: name.to_string(),
            value,
        }
    }

    fn file(name: &str, content: &str) -> FormPart {
        FormPart::File {
            name: name.to_string(),
            filename: "people.csv".to_string(),
            bytes: content.as_bytes().to_vec(),
        }
    }

    const PEOPLE: &str = "name,age\nAlice,30\nBob,25";

    #[test]
    fn fields_without_csv_pass_through() {
        let parts = vec![json_part("meta", json!({"x": 1})), text("note", "hello")];
        let form = build_form(parts, "file", &CsvOptions::default()).unwrap();

        assert_eq!(form.len(), 2);
        assert!(!form.contains("file"));
        assert_eq!(form.get("meta"), Some(&FieldValue::Json(json!({"x": 1}))));
        assert_eq!(
            form.get("note"),
            Some(&FieldValue::Text("hello".to_string()))
        );
    }

    #[test]
    fn empty_body_gives_empty_form() {
        let form = build_form(Vec::new(), "file", &CsvOptions::default()).unwrap();
        assert!(form.is_empty());
        assert_eq!(serde_json::to_value(&form).unwrap(), json!({}));
    }

    #[test]
    fn csv_part_is_replaced_by_raw_rows() {
        let parts = vec![json_part("meta", json!({"x": 1})), file("file", PEOPLE)];
        let form = build_form(parts, "file", &CsvOptions::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "meta": {"x": 1},
                "file": [["name", "age"], ["Alice", "30"], ["Bob", "25"]]
            })
        );
    }

    #[test]
    fn csv_part_is_replaced_by_keyed_rows() {
        let form = build_form(vec![file("file", PEOPLE)], "file", &CsvOptions::keyed()).unwrap();

        let Some(CsvRows::Keyed(rows)) = form.csv("file") else {
            panic!("expected keyed rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], Cell::text("Bob"));
        assert_eq!(rows[1]["age"], Cell::text("25"));
    }

    #[test]
    fn custom_file_field_is_honoured() {
        let parts = vec![file("file", PEOPLE), file("upload", PEOPLE)];
        let form = build_form(parts, "upload", &CsvOptions::default()).unwrap();

        assert!(form.csv("upload").is_some());
        assert!(!form.contains("file"));
    }

    #[test]
    fn second_csv_part_is_rejected() {
        let parts = vec![file("file", PEOPLE), file("file", PEOPLE)];
        let err = build_form(parts, "file", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, FormError::DuplicateCsvPart(name) if name == "file"));
    }

    #[test]
    fn csv_errors_carry_the_field_name() {
        let err = build_form(vec![file("file", "")], "file", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, FormError::Csv { field, .. } if field == "file"));
    }

    #[test]
    fn repeated_fields_keep_the_last_value() {
        let parts = vec![text("tag", "a"), text("tag", "b")];
        let form = build_form(parts, "file", &CsvOptions::default()).unwrap();
        assert_eq!(form.get("tag"), Some(&FieldValue::Text("b".to_string())));
    }

    #[test]
    fn text_field_under_file_name_stays_text() {
        let form = build_form(vec![text("file", PEOPLE)], "file", &CsvOptions::default()).unwrap();
        assert_eq!(
            form.get("file"),
            Some(&FieldValue::Text(PEOPLE.to_string()))
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let parts = vec![json_part("meta", json!({"x": 1})), file("file", PEOPLE)];
        for options in [CsvOptions::default(), CsvOptions::keyed()] {
            let first = build_form(parts.clone(), "file", &options).unwrap();
            let second = build_form(parts.clone(), "file", &options).unwrap();
            assert_eq!(first, second);
        }
    }
}
