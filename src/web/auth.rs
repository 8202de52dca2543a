use super::redirect;
use crate::middleware::ClientCtx;
use crate::session::{login_session, logout_session};
use crate::user::{authenticate, create_user, SignupError};
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_login)
        .service(post_login)
        .service(view_signup)
        .service(post_signup)
        .service(view_logout);
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub client: ClientCtx,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub client: ClientCtx,
    pub username: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Deserialize)]
pub struct SignupFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

#[get("/auth/login/")]
pub async fn view_login(client: ClientCtx, query: web::Query<NextQuery>) -> HttpResponse {
    LoginTemplate {
        client,
        username: String::new(),
        next: query.into_inner().next.unwrap_or_default(),
        error: None,
    }
    .to_response()
}

#[post("/auth/login/")]
pub async fn post_login(
    client: ClientCtx,
    session: Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<LoginFormData>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();
    let user = authenticate(&db, &form.username, &form.password)
        .await
        .map_err(error::ErrorInternalServerError)?;

    match user {
        Some(user) => {
            login_session(&session, &user)?;
            log::info!("User {} logged in", user.id);
            Ok(redirect(safe_next(&form.next)))
        }
        None => Ok(LoginTemplate {
            client,
            username: form.username,
            next: form.next,
            error: Some(
                "Please enter a correct username and password. Note that both fields may be case-sensitive."
                    .to_owned(),
            ),
        }
        .to_response()),
    }
}

#[get("/auth/signup/")]
pub async fn view_signup(client: ClientCtx) -> HttpResponse {
    SignupTemplate {
        client,
        username: String::new(),
        error: None,
    }
    .to_response()
}

#[post("/auth/signup/")]
pub async fn post_signup(
    client: ClientCtx,
    session: Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<SignupFormData>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();

    match create_user(&db, &form.username, &form.password).await {
        Ok(user) => {
            login_session(
                &session,
                &crate::user::ClientUser {
                    id: user.id,
                    username: user.username,
                },
            )?;
            Ok(redirect("/"))
        }
        Err(e @ SignupError::Db(_)) | Err(e @ SignupError::Hash(_)) => {
            log::error!("post_signup: {}", e);
            Err(error::ErrorInternalServerError("Could not create account."))
        }
        Err(e) => Ok(SignupTemplate {
            client,
            username: form.username,
            error: Some(e.to_string()),
        }
        .to_response()),
    }
}

#[get("/auth/logout/")]
pub async fn view_logout(session: Session) -> HttpResponse {
    logout_session(&session);
    redirect("/")
}

#[cfg(test)]
mod tests {
    use super::safe_next;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/create/"), "/create/");
        assert_eq!(safe_next("/posts/1/edit/?x=1"), "/posts/1/edit/?x=1");
        assert_eq!(safe_next(""), "/");
        assert_eq!(safe_next("https://evil.example/"), "/");
        assert_eq!(safe_next("//evil.example/"), "/");
        assert_eq!(safe_next("/\\evil.example/"), "/");
    }
}
