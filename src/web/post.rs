use super::{login_redirect, profile_url, redirect};
use crate::attachment::{read_file_field, read_text_field, save_image, UploadPayload};
use crate::comment::{get_comments_for_post, CommentForTemplate};
use crate::config::Config;
use crate::group::get_groups;
use crate::middleware::ClientCtx;
use crate::orm::groups;
use crate::post::{
    count_posts_by_user, create_post, get_post_for_template, update_post, PostChanges,
    PostForTemplate,
};
use crate::validation::validate_post_text;
use actix_multipart::Multipart;
use actix_web::{error, get, post, web, Error, HttpRequest, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use futures::TryStreamExt;
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_post)
        .service(create_post_form)
        .service(create_post_submit)
        .service(edit_post)
        .service(update_post_submit);
}

const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub client: ClientCtx,
    pub post: PostForTemplate,
    pub author_post_count: usize,
    pub comments: Vec<CommentForTemplate>,
    pub can_edit: bool,
    /// Comment form contents, kept when the submission was refused.
    pub comment_text: String,
    pub comment_error: Option<String>,
}

/// One `<option>` of the group select.
#[derive(Debug)]
pub struct GroupChoice {
    pub id: i32,
    pub title: String,
    pub selected: bool,
}

/// Field errors of the post form.
#[derive(Debug, Default)]
pub struct PostFormErrors {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<String>,
}

impl PostFormErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none() && self.image.is_none()
    }
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub client: ClientCtx,
    pub action: String,
    pub is_edit: bool,
    pub text: String,
    pub groups: Vec<GroupChoice>,
    pub current_image: Option<String>,
    pub errors: PostFormErrors,
}

/// Raw post form submission.
#[derive(Default)]
pub struct PostFormData {
    pub text: String,
    pub group: String,
    pub image: Option<UploadPayload>,
    pub image_clear: bool,
}

impl PostFormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, Error> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.try_next().await.map_err(|e| {
            log::warn!("PostFormData: multipart error: {}", e);
            error::ErrorBadRequest("Malformed form submission.")
        })? {
            let name = field
                .content_disposition()
                .get_name()
                .unwrap_or_default()
                .to_owned();

            match name.as_str() {
                "text" => form.text = read_text_field(&mut field).await?,
                "group" => form.group = read_text_field(&mut field).await?,
                "image" => form.image = read_file_field(&mut field).await?,
                "image-clear" => {
                    read_text_field(&mut field).await?;
                    form.image_clear = true;
                }
                _ => {
                    return Err(error::ErrorBadRequest(format!(
                        "Unknown field '{}'",
                        name
                    )))
                }
            }
        }

        Ok(form)
    }

    /// The group id the user picked, even if it is not a valid choice.
    fn selected_group(&self) -> Option<i32> {
        self.group.trim().parse().ok()
    }
}

/// Resolves the group select. Empty means no group.
fn parse_group_choice(raw: &str, groups: &[groups::Model]) -> Result<Option<i32>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<i32>() {
        Ok(id) if groups.iter().any(|g| g.id == id) => Ok(Some(id)),
        _ => Err(()),
    }
}

/// Checks every field, returning the accepted text and group.
fn validate_post_form(
    form: &PostFormData,
    groups: &[groups::Model],
) -> Result<(String, Option<i32>), PostFormErrors> {
    let mut errors = PostFormErrors::default();

    let text = match validate_post_text(&form.text) {
        Ok(text) => Some(text),
        Err(e) => {
            errors.text = Some(e.to_string());
            None
        }
    };

    let group_id = match parse_group_choice(&form.group, groups) {
        Ok(group_id) => group_id,
        Err(()) => {
            errors.group = Some(INVALID_GROUP.to_owned());
            None
        }
    };

    if let Some(image) = &form.image {
        if image.image_extension().is_none() {
            errors.image = Some(INVALID_IMAGE.to_owned());
        }
    }

    match text {
        Some(text) if errors.is_empty() => Ok((text, group_id)),
        _ => Err(errors),
    }
}

fn group_choices(groups: Vec<groups::Model>, selected: Option<i32>) -> Vec<GroupChoice> {
    groups
        .into_iter()
        .map(|g| GroupChoice {
            selected: Some(g.id) == selected,
            id: g.id,
            title: g.title,
        })
        .collect()
}

/// Renders a post with its comments and the comment form.
pub(super) async fn render_post_detail(
    client: ClientCtx,
    db: &DatabaseConnection,
    post: PostForTemplate,
    comment_text: String,
    comment_error: Option<String>,
) -> Result<HttpResponse, Error> {
    let comments = get_comments_for_post(db, post.id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let author_post_count = count_posts_by_user(db, post.user_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostDetailTemplate {
        can_edit: client.can_update_post(&post),
        client,
        post,
        author_post_count,
        comments,
        comment_text,
        comment_error,
    }
    .to_response())
}

#[get("/posts/{post_id}/")]
pub async fn view_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let post = get_post_for_template(&db, path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    render_post_detail(client, &db, post, String::new(), None).await
}

#[get("/create/")]
pub async fn create_post_form(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(&req));
    }

    let groups = get_groups(&db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostFormTemplate {
        client,
        action: "/create/".to_owned(),
        is_edit: false,
        text: String::new(),
        groups: group_choices(groups, None),
        current_image: None,
        errors: PostFormErrors::default(),
    }
    .to_response())
}

#[post("/create/")]
pub async fn create_post_submit(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    multipart: Multipart,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(login_redirect(&req)),
    };

    let form = PostFormData::from_multipart(multipart).await?;
    let groups = get_groups(&db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match validate_post_form(&form, &groups) {
        Ok((text, group_id)) => {
            let image = match form.image {
                Some(payload) => Some(save_image(&config.media_dir, payload).await?),
                None => None,
            };

            create_post(
                &db,
                user_id,
                PostChanges {
                    text,
                    group_id,
                    image: Some(image),
                },
            )
            .await
            .map_err(error::ErrorInternalServerError)?;

            Ok(redirect(&profile_url(&client.get_name())))
        }
        Err(errors) => {
            let selected = form.selected_group();
            Ok(PostFormTemplate {
                client,
                action: "/create/".to_owned(),
                is_edit: false,
                text: form.text,
                groups: group_choices(groups, selected),
                current_image: None,
                errors,
            }
            .to_response())
        }
    }
}

#[get("/posts/{post_id}/edit/")]
pub async fn edit_post(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(&req));
    }

    let post = get_post_for_template(&db, path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    if !client.can_update_post(&post) {
        return Ok(redirect(&post.get_url()));
    }

    let groups = get_groups(&db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostFormTemplate {
        action: format!("/posts/{}/edit/", post.id),
        is_edit: true,
        groups: group_choices(groups, post.group_id),
        current_image: post.get_image_url(),
        text: post.text,
        client,
        errors: PostFormErrors::default(),
    }
    .to_response())
}

#[post("/posts/{post_id}/edit/")]
pub async fn update_post_submit(
    client: ClientCtx,
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    path: web::Path<i32>,
    multipart: Multipart,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(login_redirect(&req));
    }

    let post = get_post_for_template(&db, path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    if !client.can_update_post(&post) {
        return Ok(redirect(&post.get_url()));
    }

    let form = PostFormData::from_multipart(multipart).await?;
    let groups = get_groups(&db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match validate_post_form(&form, &groups) {
        Ok((text, group_id)) => {
            let image = match form.image {
                Some(payload) => Some(Some(save_image(&config.media_dir, payload).await?)),
                None if form.image_clear => Some(None),
                None => None,
            };

            update_post(
                &db,
                post.id,
                PostChanges {
                    text,
                    group_id,
                    image,
                },
            )
            .await
            .map_err(error::ErrorInternalServerError)?
            .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

            Ok(redirect(&post.get_url()))
        }
        Err(errors) => {
            let selected = form.selected_group();
            Ok(PostFormTemplate {
                client,
                action: format!("/posts/{}/edit/", post.id),
                is_edit: true,
                text: form.text,
                groups: group_choices(groups, selected),
                current_image: post.get_image_url(),
                errors,
            }
            .to_response())
        }
    }
}
