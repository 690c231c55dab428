mod config;
mod csv_reader;
mod error;
mod form;
mod multipart;
mod services;

use crate::config::AppConfig;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind = (config.host.clone(), config.port);

    info!(
        "Server running at {} (CSV field `{}`, part limit {} bytes)",
        config.url(),
        config.file_field,
        config.max_part_bytes
    );

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .service(services::data_sources::csv::configure_routes())
    })
        .bind(bind)?
        .run()
        .await
}
