use super::{login_redirect, profile_url, redirect};
use crate::follow::{follow_author, get_following_post_page, unfollow_author};
use crate::middleware::ClientCtx;
use crate::paginator::{Page, PageQuery};
use crate::post::PostForTemplate;
use crate::user::get_user_by_username;
use actix_web::{error, get, route, web, Error, HttpRequest, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_follow_index)
        .service(follow_profile)
        .service(unfollow_profile);
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub client: ClientCtx,
    pub page: Page<PostForTemplate>,
}

/// Posts by every author the client follows.
#[get("/follow/")]
pub async fn view_follow_index(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    query: PageQuery,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(&req)),
    };

    let page = get_following_post_page(&db, user_id, query.raw())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(FollowTemplate { client, page }.to_response())
}

#[route("/profile/{username}/follow/", method = "GET", method = "POST")]
pub async fn follow_profile(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(&req)),
    };

    let author = get_user_by_username(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    follow_author(&db, user_id, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(redirect(&profile_url(&author.username)))
}

#[route("/profile/{username}/unfollow/", method = "GET", method = "POST")]
pub async fn unfollow_profile(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(&req)),
    };

    let author = get_user_by_username(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    unfollow_author(&db, user_id, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(redirect(&profile_url(&author.username)))
}
