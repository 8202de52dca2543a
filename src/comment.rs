use crate::orm::{comments, users};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult};

/// A comment joined with its author's name.
#[derive(Clone, Debug, FromQueryResult)]
pub struct CommentForTemplate {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
    // join users
    pub username: String,
}

impl CommentForTemplate {
    pub fn get_author_url(&self) -> String {
        crate::user::get_profile_url(&self.username)
    }
}

/// Comments on a post, oldest first.
pub async fn get_comments_for_post(
    db: &DatabaseConnection,
    post_id: i32,
) -> Result<Vec<CommentForTemplate>, DbErr> {
    comments::Entity::find()
        .left_join(users::Entity)
        .column_as(users::Column::Username, "username")
        .filter(comments::Column::PostId.eq(post_id))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .into_model::<CommentForTemplate>()
        .all(db)
        .await
}

/// Inserts already validated comment text.
pub async fn create_comment(
    db: &DatabaseConnection,
    post_id: i32,
    user_id: i32,
    text: String,
) -> Result<comments::Model, DbErr> {
    comments::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(user_id),
        text: Set(text),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}
