use crate::orm::{follows, posts};
use crate::paginator::{fetch_page, Page, POSTS_PER_PAGE};
use crate::post::{select_posts_for_template, PostForTemplate};
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr};
use sea_orm::PaginatorTrait;

/// What a follow request did to the graph.
#[derive(Debug, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollow,
}

/// What an unfollow request did to the graph.
#[derive(Debug, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Deleted,
    NotFollowing,
}

pub async fn is_following(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<bool, DbErr> {
    Ok(follows::Entity::find_by_id((user_id, author_id))
        .one(db)
        .await?
        .is_some())
}

/// Adds the edge `user_id -> author_id`. Following yourself or an author already followed is a no-op.
pub async fn follow_author(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<FollowOutcome, DbErr> {
    if user_id == author_id {
        return Ok(FollowOutcome::SelfFollow);
    }

    if is_following(db, user_id, author_id).await? {
        return Ok(FollowOutcome::AlreadyFollowing);
    }

    // Executed as a plain statement; the composite key has no insert id to read back.
    let stmt = follows::Entity::insert(follows::ActiveModel {
        user_id: Set(user_id),
        author_id: Set(author_id),
        created_at: Set(Utc::now().naive_utc()),
    })
    .build(db.get_database_backend());

    match db.execute(stmt).await {
        Ok(_) => {
            log::debug!("User {} now follows {}", user_id, author_id);
            Ok(FollowOutcome::Created)
        }
        // A concurrent request inserted the same pair between the check and the insert.
        Err(e) => match is_following(db, user_id, author_id).await {
            Ok(true) => Ok(FollowOutcome::AlreadyFollowing),
            _ => Err(e),
        },
    }
}

/// Removes the edge `user_id -> author_id` if it exists.
pub async fn unfollow_author(
    db: &DatabaseConnection,
    user_id: i32,
    author_id: i32,
) -> Result<UnfollowOutcome, DbErr> {
    let res = follows::Entity::delete_many()
        .filter(follows::Column::UserId.eq(user_id))
        .filter(follows::Column::AuthorId.eq(author_id))
        .exec(db)
        .await?;

    if res.rows_affected > 0 {
        log::debug!("User {} no longer follows {}", user_id, author_id);
        Ok(UnfollowOutcome::Deleted)
    } else {
        Ok(UnfollowOutcome::NotFollowing)
    }
}

/// Number of users following `author_id`.
pub async fn count_followers(db: &DatabaseConnection, author_id: i32) -> Result<usize, DbErr> {
    follows::Entity::find()
        .filter(follows::Column::AuthorId.eq(author_id))
        .count(db)
        .await
}

/// Number of authors `user_id` follows.
pub async fn count_following(db: &DatabaseConnection, user_id: i32) -> Result<usize, DbErr> {
    follows::Entity::find()
        .filter(follows::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// One page of posts written by authors `user_id` follows, newest first.
pub async fn get_following_post_page(
    db: &DatabaseConnection,
    user_id: i32,
    page: Option<&str>,
) -> Result<Page<PostForTemplate>, DbErr> {
    let followed_authors = Query::select()
        .column(follows::Column::AuthorId)
        .from(follows::Entity)
        .and_where(follows::Column::UserId.eq(user_id))
        .to_owned();

    fetch_page(
        db,
        select_posts_for_template(Some(posts::Column::UserId.in_subquery(followed_authors))),
        POSTS_PER_PAGE,
        page,
    )
    .await
}
