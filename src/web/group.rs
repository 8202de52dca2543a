use crate::group::get_group_by_slug;
use crate::middleware::ClientCtx;
use crate::orm::groups;
use crate::paginator::{Page, PageQuery};
use crate::post::{get_group_post_page, PostForTemplate};
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_group);
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupTemplate {
    pub client: ClientCtx,
    pub group: groups::Model,
    pub page: Page<PostForTemplate>,
}

#[get("/group/{slug}/")]
pub async fn view_group(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    query: PageQuery,
) -> Result<impl Responder, Error> {
    let group = get_group_by_slug(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Group not found."))?;

    let page = get_group_post_page(&db, group.id, query.raw())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(GroupTemplate {
        client,
        group,
        page,
    }
    .to_response())
}
