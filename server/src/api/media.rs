//! Serves files written by the local media backend

use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use std::io::ErrorKind;
use std::path::Path;

use crate::app_state::AppState;
use crate::config::MediaBackend;
use crate::error::ApiError;

/// Range and conditional requests are answered by `NamedFile`
pub async fn serve_local_media(
    req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let file = path.into_inner();
    if app_state.config.media.backend != MediaBackend::Local
        || file.contains(['/', '\\'])
        || file.starts_with('.')
    {
        return Err(ApiError::not_found("Media does not exist"));
    }

    let full_path = Path::new(&app_state.config.media.base_path).join(&file);
    match NamedFile::open_async(&full_path).await {
        Ok(named) => {
            debug!("Serving local media {} as {}", file, named.content_type());
            Ok(named.into_response(&req))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ApiError::not_found("Media does not exist")),
        Err(e) => {
            error!("Failed to open local media {}: {}", full_path.display(), e);
            Err(ApiError::internal("Failed to read media"))
        }
    }
}
