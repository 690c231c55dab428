use crate::error::ParseError;
use actix_multipart::Multipart;
use actix_web::mime;
use futures_util::StreamExt;

/// One named part of a multipart body, fully buffered.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    Json {
        name: String,
        value: serde_json::Value,
    },
    File {
        name: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

/// Byte limits applied while buffering a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// Largest single part.
    pub part: usize,
    /// Largest sum of all parts.
    pub body: usize,
}

/// Drains `payload` into its parts.
///
/// - A part with a `filename` in its content disposition is a file.
/// - A part typed `application/json` (or any `+json` type) is parsed as JSON.
/// - Everything else is a UTF-8 text field.
///
/// No part may exceed `limits.part` and all parts together may not exceed
/// `limits.body`.
pub async fn collect_parts(
    mut payload: Multipart,
    limits: BodyLimits,
) -> Result<Vec<FormPart>, ParseError> {
    let mut parts = Vec::new();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
            .ok_or(ParseError::UnnamedPart)?;
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));
        let is_json = field.content_type().is_some_and(is_json_type);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > limits.part {
                return Err(ParseError::PartTooLarge {
                    name,
                    limit: limits.part,
                });
            }
            total += chunk.len();
            if total > limits.body {
                return Err(ParseError::BodyTooLarge { limit: limits.body });
            }
            bytes.extend_from_slice(&chunk);
        }
        log::debug!("received part `{}` ({} bytes)", name, bytes.len());

        let part = match filename {
            Some(filename) => FormPart::File {
                name,
                filename,
                bytes,
            },
            None if is_json => match serde_json::from_slice(&bytes) {
                Ok(value) => FormPart::Json { name, value },
                Err(source) => return Err(ParseError::InvalidJson { name, source }),
            },
            None => match String::from_utf8(bytes) {
                Ok(value) => FormPart::Text { name, value },
                Err(_) => return Err(ParseError::InvalidText(name)),
            },
        };
        parts.push(part);
    }

    Ok(parts)
}

fn is_json_type(content_type: &mime::Mime) -> bool {
    content_type.subtype() == mime::JSON || content_type.suffix() == Some(mime::JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_json_media_types() {
        let json: mime::Mime = "application/json".parse().unwrap();
        let problem: mime::Mime = "application/problem+json".parse().unwrap();
        let text: mime::Mime = "text/plain".parse().unwrap();
        assert!(is_json_type(&json));
        assert!(is_json_type(&problem));
        assert!(!is_json_type(&text));
    }
}
