#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::web::Data;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use yatube::config::Config;
use yatube::orm::{groups, posts, users};
use yatube::post::{create_post, PostChanges};

pub const PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "yatube-test-boundary";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01";

static MEDIA_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct Fixture {
    pub db: Data<DatabaseConnection>,
    pub config: Data<Config>,
}

impl Fixture {
    pub fn media_dir(&self) -> &PathBuf {
        &self.config.media_dir
    }
}

pub async fn setup() -> Fixture {
    let db = yatube::db::init_memory_db()
        .await
        .expect("in-memory database");

    let media_dir = std::env::temp_dir().join(format!(
        "yatube-test-{}-{}",
        std::process::id(),
        MEDIA_DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&media_dir).expect("media directory");

    Fixture {
        db: Data::new(db),
        config: Data::new(Config::for_media_dir(media_dir)),
    }
}

/// Builds the application the same way the binary does, with a fixed session key.
#[macro_export]
macro_rules! test_app {
    ($fixture:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($fixture.db.clone())
                .app_data($fixture.config.clone())
                .wrap(
                    actix_web::middleware::ErrorHandlers::new()
                        .handler(
                            actix_web::http::StatusCode::NOT_FOUND,
                            yatube::web::error::render_404,
                        )
                        .handler(
                            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                            yatube::web::error::render_500,
                        ),
                )
                .wrap(yatube::middleware::ClientCtx::default())
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[0u8; 64][..]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(yatube::web::configure),
        )
        .await
    };
}

/// Logs in through the form and returns the session cookie.
#[macro_export]
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/auth/login/")
            .set_form(&[("username", $username), ("password", common::PASSWORD)])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FOUND);
        resp.response()
            .cookies()
            .find(|c| c.name() == "id")
            .expect("session cookie")
            .into_owned()
    }};
}

pub async fn make_user(db: &DatabaseConnection, username: &str) -> users::Model {
    yatube::user::create_user(db, username, PASSWORD)
        .await
        .expect("create user")
}

pub async fn make_group(db: &DatabaseConnection, slug: &str) -> groups::Model {
    yatube::group::create_group(db, &format!("Group {}", slug), slug, "A test group")
        .await
        .expect("create group")
}

pub async fn make_post(
    db: &DatabaseConnection,
    author: &users::Model,
    text: &str,
    group: Option<&groups::Model>,
) -> posts::Model {
    create_post(
        db,
        author.id,
        PostChanges {
            text: text.to_owned(),
            group_id: group.map(|g| g.id),
            image: None,
        },
    )
    .await
    .expect("create post")
}

/// Encodes text fields and an optional `image` file as multipart/form-data.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn count_post_cards(body: &str) -> usize {
    body.matches("<article class=\"post\">").count()
}

pub async fn body_string<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(actix_web::test::read_body(resp).await.to_vec()).expect("utf-8 body")
}
