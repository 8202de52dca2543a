use crate::config::Config;
use actix_files as fs;
use actix_web::{error, get, web, Error};
use std::path::{Component, PathBuf};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_media);
}

/// Serves uploaded files from the media directory.
#[get("/media/{filename:.*}")]
async fn view_media(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<fs::NamedFile, Error> {
    let req_path = PathBuf::from(path.into_inner());
    if req_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(error::ErrorNotFound("File not found."));
    }

    let file = fs::NamedFile::open(config.media_dir.join(req_path))
        .map_err(|_| error::ErrorNotFound("File not found."))?;

    Ok(file.use_last_modified(true))
}
