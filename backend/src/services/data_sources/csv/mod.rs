//! CSV data source endpoints.
//!
//! - `POST /api/data_sources/csv/parse`: accepts a `multipart/form-data` body
//!   that carries a CSV upload (under the configured file field, `file` by
//!   default) next to ordinary text and JSON fields. The response is a JSON
//!   object with every field; the upload is replaced by its decoded rows.
//!   Query parameters select the representation: `with_keys=true` returns one
//!   object per data row keyed by the header row, otherwise the raw rows are
//!   returned with the header first. `columns`, `lower_case_columns`,
//!   `strip_and_falsify` and `skip_blank_rows` tune the decoding.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod parse;

const API_PATH: &str = "/api/data_sources/csv";

/// Configures and returns the Actix scope for CSV data source routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to parse a multipart form with a CSV upload.
        .route("/parse", post().to(parse::process))
}
