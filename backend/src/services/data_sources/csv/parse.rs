use crate::config::AppConfig;
use crate::form::parse_csv_form;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::CsvParseQuery;

/// HTTP handler for `POST /api/data_sources/csv/parse`.
///
/// - On success: returns `200 OK` with the parsed fields as JSON.
/// - On failure: returns the error's status with `{"error": "..."}`.
pub async fn process(
    config: web::Data<AppConfig>,
    query: web::Query<CsvParseQuery>,
    payload: Multipart,
) -> impl Responder {
    let options = query.into_inner().into_options();
    match parse_csv_form(payload, &config.file_field, config.limits(), options).await {
        Ok(form) => HttpResponse::Ok().json(form),
        Err(e) => {
            log::warn!("rejected CSV upload: {}", e);
            e.error_response()
        }
    }
}
