use crate::middleware::ClientCtx;
use crate::paginator::{Page, PageQuery};
use crate::post::{get_post_page, PostForTemplate};
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub client: ClientCtx,
    pub page: Page<PostForTemplate>,
}

#[get("/")]
pub async fn view_index(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    query: PageQuery,
) -> Result<impl Responder, Error> {
    let page = get_post_page(&db, query.raw())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(IndexTemplate { client, page }.to_response())
}
