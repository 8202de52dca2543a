use super::post::render_post_detail;
use super::{login_redirect, redirect};
use crate::comment::create_comment;
use crate::middleware::ClientCtx;
use crate::post::get_post_for_template;
use crate::validation::validate_comment_text;
use actix_web::{error, post, web, Error, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_comment_submit);
}

#[derive(Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

#[post("/posts/{post_id}/comment/")]
pub async fn create_comment_submit(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Form<CommentFormData>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(&req)),
    };

    let post = get_post_for_template(&db, path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    match validate_comment_text(&form.text) {
        Ok(text) => {
            create_comment(&db, post.id, user_id, text)
                .await
                .map_err(error::ErrorInternalServerError)?;
            Ok(redirect(&post.get_url()))
        }
        Err(e) => {
            render_post_detail(client, &db, post, form.into_inner().text, Some(e.to_string()))
                .await
        }
    }
}
