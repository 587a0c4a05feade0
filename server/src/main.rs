use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::io;
use std::path::Path;

use vidshare_server::api;
use vidshare_server::app_state::AppState;
use vidshare_server::config::{AppConfig, LoggingConfig};

fn init_logging(config: &LoggingConfig) {
    if Path::new(&config.config_file).exists() {
        match log4rs::init_file(&config.config_file, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Failed to load {}: {}, falling back to env_logger", config.config_file, e),
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_logging(&LoggingConfig::peek(AppConfig::config_path()));
    let config = AppConfig::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let state = AppState::from_config(config.clone()).map_err(|e| {
        error!("Failed to initialize application state: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    let bind = (config.server.host.clone(), config.server.port);
    let payload_limit = config.server.max_payload_size;
    info!("Starting server on {}:{} with {} workers", bind.0, bind.1, config.server.workers);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::default().limit(payload_limit))
            .configure(api::configure)
    })
    .workers(config.server.workers)
    .bind(bind)?
    .run()
    .await
}
