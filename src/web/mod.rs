pub mod auth;
pub mod comment;
pub mod error;
pub mod follow;
pub mod group;
pub mod index;
pub mod media;
pub mod post;
pub mod profile;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};

/// Configures the web app
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order of traffic.
    index::configure(conf);
    post::configure(conf);
    group::configure(conf);
    profile::configure(conf);
    follow::configure(conf);
    comment::configure(conf);
    media::configure(conf);
    auth::configure(conf);
}

/// 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}

/// Path of a user's profile page.
pub fn profile_url(username: &str) -> String {
    crate::user::get_profile_url(username)
}

/// Sends a guest to the login form, which returns them here afterwards.
pub fn login_redirect(req: &HttpRequest) -> HttpResponse {
    let here = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    let next: String = url::form_urlencoded::byte_serialize(here.as_bytes()).collect();
    redirect(&format!("/auth/login/?next={}", next))
}
