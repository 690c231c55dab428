use crate::csv_reader::CsvReadError;
use actix_multipart::MultipartError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Failures while turning decoded parts into a `ParsedForm`.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("field `{field}`: {source}")]
    Csv {
        field: String,
        #[source]
        source: CsvReadError,
    },

    #[error("more than one file was uploaded under `{0}`")]
    DuplicateCsvPart(String),
}

/// Everything that can go wrong while parsing a CSV multipart request.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("multipart form parse error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    #[error("multipart part has no field name")]
    UnnamedPart,

    #[error("field `{name}` exceeds the {limit} byte limit")]
    PartTooLarge { name: String, limit: usize },

    #[error("field `{0}` is not valid UTF-8")]
    InvalidText(String),

    #[error("field `{name}` holds invalid JSON: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("CSV decoding was cancelled")]
    Blocking(#[from] BlockingError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ParseError {
    fn status_code(&self) -> StatusCode {
        match self {
            ParseError::PartTooLarge { .. } | ParseError::BodyTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ParseError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
