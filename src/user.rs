use crate::orm::users;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use once_cell::sync::Lazy;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult};

pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Checked against when the username is unknown, so a login costs one argon2 verification
/// whether or not the account exists.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> = Lazy::new(|| {
    Argon2::default()
        .hash_password(b"not a real password", &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| log::error!("Could not prepare the dummy password hash: {}", e))
        .ok()
});

/// A mini struct for holding only what information we need about a client.
#[derive(Clone, Debug, FromQueryResult)]
pub struct ClientUser {
    pub id: i32,
    pub username: String,
}

/// Reasons a signup is refused.
#[derive(Debug)]
pub enum SignupError {
    InvalidUsername,
    UsernameTaken,
    PasswordTooShort,
    Hash(argon2::password_hash::Error),
    Db(DbErr),
}

impl std::fmt::Display for SignupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername => write!(
                f,
                "Enter a valid username of at most {} letters, digits and @/./+/-/_ characters.",
                USERNAME_MAX_CHARS
            ),
            Self::UsernameTaken => write!(f, "A user with that username already exists."),
            Self::PasswordTooShort => write!(
                f,
                "This password is too short. It must contain at least {} characters.",
                PASSWORD_MIN_CHARS
            ),
            Self::Hash(e) => write!(f, "Password could not be hashed: {}", e),
            Self::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl From<DbErr> for SignupError {
    fn from(e: DbErr) -> Self {
        Self::Db(e)
    }
}

pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= USERNAME_MAX_CHARS
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Path of a user's profile page.
pub fn get_profile_url(username: &str) -> String {
    let username: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("/profile/{}/", username)
}

pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
}

pub async fn get_client_user_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<ClientUser>, DbErr> {
    users::Entity::find_by_id(id)
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Username)
        .into_model::<ClientUser>()
        .one(db)
        .await
}

/// Hashes the password and inserts a new user.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, SignupError> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(SignupError::InvalidUsername);
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(SignupError::PasswordTooShort);
    }
    if get_user_by_username(db, username).await?.is_some() {
        return Err(SignupError::UsernameTaken);
    }

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map_err(SignupError::Hash)?
        .to_string();

    let insert = users::ActiveModel {
        username: Set(username.to_owned()),
        password: Set(password_hash),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await;

    let user = match insert {
        Ok(user) => user,
        // Lost a race for the name against a concurrent signup.
        Err(e) => match get_user_by_username(db, username).await {
            Ok(Some(_)) => return Err(SignupError::UsernameTaken),
            _ => return Err(SignupError::Db(e)),
        },
    };

    log::info!("Created user {} ({})", user.username, user.id);
    Ok(user)
}

/// Returns the user when the name exists and the password matches its hash.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<ClientUser>, DbErr> {
    let user = match get_user_by_username(db, username.trim()).await? {
        Some(user) => user,
        None => {
            verify_dummy_password(password);
            return Ok(None);
        }
    };

    let parsed_hash = match PasswordHash::new(&user.password) {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("Stored password hash for user {} is unreadable: {}", user.id, e);
            return Ok(None);
        }
    };

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
    {
        Ok(Some(ClientUser {
            id: user.id,
            username: user.username,
        }))
    } else {
        Ok(None)
    }
}

fn verify_dummy_password(password: &str) {
    if let Some(Ok(hash)) = DUMMY_PASSWORD_HASH.as_deref().map(PasswordHash::new) {
        // Result discarded.
        let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
    }
}
