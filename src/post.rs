use crate::attachment::get_file_url;
use crate::orm::{groups, posts, users};
use crate::paginator::{fetch_page, Page, POSTS_PER_PAGE};
use crate::user::get_profile_url;
use chrono::Utc;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult};
use sea_orm::{PaginatorTrait, SelectModel, Selector};

/// Number of characters of text shown where a post is named in a title.
pub const POST_TITLE_CHARS: usize = 15;

/// A post joined with its author's name and its group.
#[derive(Clone, Debug, FromQueryResult)]
pub struct PostForTemplate {
    pub id: i32,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
    pub user_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
    // join users
    pub username: String,
    // join groups
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl PostForTemplate {
    pub fn get_url(&self) -> String {
        format!("/posts/{}/", self.id)
    }

    pub fn get_image_url(&self) -> Option<String> {
        self.image.as_deref().map(get_file_url)
    }

    pub fn get_author_url(&self) -> String {
        get_profile_url(&self.username)
    }

    pub fn get_group_url(&self) -> Option<String> {
        self.group_slug.as_ref().map(|slug| format!("/group/{}/", slug))
    }

    /// Leading text used as the post's title.
    pub fn get_title(&self) -> String {
        self.text.chars().take(POST_TITLE_CHARS).collect()
    }
}

/// Fields accepted from the post form, already validated.
#[derive(Debug)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i32>,
    /// None keeps the current image, Some(None) removes it.
    pub image: Option<Option<String>>,
}

/// Selects posts with the joined template data, newest first, filtered by `condition`.
pub fn select_posts_for_template(
    condition: Option<SimpleExpr>,
) -> Selector<SelectModel<PostForTemplate>> {
    let mut select = posts::Entity::find()
        .left_join(users::Entity)
        .column_as(users::Column::Username, "username")
        .left_join(groups::Entity)
        .column_as(groups::Column::Title, "group_title")
        .column_as(groups::Column::Slug, "group_slug");

    if let Some(condition) = condition {
        select = select.filter(condition);
    }

    select
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .into_model::<PostForTemplate>()
}

pub async fn get_post_for_template(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<PostForTemplate>, DbErr> {
    select_posts_for_template(Some(posts::Column::Id.eq(id)))
        .one(db)
        .await
}

/// One page of every post.
pub async fn get_post_page(
    db: &DatabaseConnection,
    page: Option<&str>,
) -> Result<Page<PostForTemplate>, DbErr> {
    fetch_page(db, select_posts_for_template(None), POSTS_PER_PAGE, page).await
}

/// One page of the posts in a group.
pub async fn get_group_post_page(
    db: &DatabaseConnection,
    group_id: i32,
    page: Option<&str>,
) -> Result<Page<PostForTemplate>, DbErr> {
    fetch_page(
        db,
        select_posts_for_template(Some(posts::Column::GroupId.eq(group_id))),
        POSTS_PER_PAGE,
        page,
    )
    .await
}

/// One page of the posts written by a user.
pub async fn get_author_post_page(
    db: &DatabaseConnection,
    user_id: i32,
    page: Option<&str>,
) -> Result<Page<PostForTemplate>, DbErr> {
    fetch_page(
        db,
        select_posts_for_template(Some(posts::Column::UserId.eq(user_id))),
        POSTS_PER_PAGE,
        page,
    )
    .await
}

pub async fn count_posts_by_user(db: &DatabaseConnection, user_id: i32) -> Result<usize, DbErr> {
    posts::Entity::find()
        .filter(posts::Column::UserId.eq(user_id))
        .count(db)
        .await
}

pub async fn create_post(
    db: &DatabaseConnection,
    user_id: i32,
    changes: PostChanges,
) -> Result<posts::Model, DbErr> {
    let post = posts::ActiveModel {
        text: Set(changes.text),
        created_at: Set(Utc::now().naive_utc()),
        user_id: Set(user_id),
        group_id: Set(changes.group_id),
        image: Set(changes.image.flatten()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::debug!("User {} created post {}", user_id, post.id);
    Ok(post)
}

/// Applies an edit. Identity, author and creation time never change.
pub async fn update_post(
    db: &DatabaseConnection,
    id: i32,
    changes: PostChanges,
) -> Result<Option<posts::Model>, DbErr> {
    let post = match posts::Entity::find_by_id(id).one(db).await? {
        Some(post) => post,
        None => return Ok(None),
    };

    let mut post: posts::ActiveModel = post.into();
    post.text = Set(changes.text);
    post.group_id = Set(changes.group_id);
    if let Some(image) = changes.image {
        post.image = Set(image);
    }

    post.update(db).await.map(Some)
}
