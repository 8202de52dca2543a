use crate::middleware::ClientCtx;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, header::HeaderValue, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{error, HttpMessage, Result};
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    client: ClientCtx,
    status: StatusCode,
    message: Option<String>,
}

impl ErrorTemplate {
    fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Error")
    }
}

pub fn error_document<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    // The client context is in the request extensions whenever the middleware ran.
    let client = ClientCtx::from_extensions(&mut res.request().extensions_mut());
    // Server error details stay in the log.
    let message = match res.status() {
        s if s.is_server_error() => {
            if let Some(e) = res.response().error() {
                log::error!("{} {}: {}", s, res.request().path(), e);
            }
            None
        }
        _ => res.response().error().map(|e| e.to_string()),
    };

    let body = ErrorTemplate {
        client,
        status: res.status(),
        message,
    }
    .render()
    .unwrap_or_else(|e| {
        log::error!("error_document: template error: {}", e);
        String::from("Error")
    });
    let mut res: ServiceResponse<EitherBody<B>> =
        res.map_body(|_, _| EitherBody::<B, BoxBody>::right(BoxBody::new(body)));

    // Headers must be manually set because Actix-Web renders no content by default.
    let headers = res.response_mut().headers_mut();
    // Web document
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime::TEXT_HTML_UTF_8.as_ref()).map_err(error::ErrorInternalServerError)?,
    );
    // Proxies (Cloudflare) love to cache error pages permanently. Explicitly say not to do that.
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(ErrorHandlerResponse::Response(res))
}

pub fn render_404<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}

pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error_document::<B>(res)
}
