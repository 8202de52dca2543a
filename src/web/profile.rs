use crate::follow::{count_followers, count_following, is_following};
use crate::middleware::ClientCtx;
use crate::paginator::{Page, PageQuery};
use crate::post::{get_author_post_page, PostForTemplate};
use crate::user::get_user_by_username;
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_profile);
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub client: ClientCtx,
    pub author_name: String,
    pub page: Page<PostForTemplate>,
    /// Whether the client follows this author. Always false for guests.
    pub following: bool,
    pub can_follow: bool,
    pub follower_count: usize,
    pub following_count: usize,
}

impl ProfileTemplate {
    fn profile_url(&self) -> String {
        super::profile_url(&self.author_name)
    }

    fn follow_url(&self) -> String {
        format!("{}follow/", self.profile_url())
    }

    fn unfollow_url(&self) -> String {
        format!("{}unfollow/", self.profile_url())
    }
}

#[get("/profile/{username}/")]
pub async fn view_profile(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    query: PageQuery,
) -> Result<impl Responder, Error> {
    let author = get_user_by_username(&db, &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("User not found."))?;

    let page = get_author_post_page(&db, author.id, query.raw())
        .await
        .map_err(error::ErrorInternalServerError)?;

    let following = match client.get_id() {
        Some(id) => is_following(&db, id, author.id)
            .await
            .map_err(error::ErrorInternalServerError)?,
        None => false,
    };

    let follower_count = count_followers(&db, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let following_count = count_following(&db, author.id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(ProfileTemplate {
        can_follow: client.can_follow(author.id),
        client,
        author_name: author.username,
        page,
        following,
        follower_count,
        following_count,
    }
    .to_response())
}
