use crate::user::{get_client_user_by_id, ClientUser};
use actix_session::Session;
use actix_web::Error;
use sea_orm::DatabaseConnection;

/// Session key holding the logged in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

pub fn get_session_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(SESSION_USER_KEY) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Unreadable session value {}: {}", SESSION_USER_KEY, e);
            None
        }
    }
}

/// Binds the session to a user. The session id is rotated first.
pub fn login_session(session: &Session, user: &ClientUser) -> Result<(), Error> {
    session.renew();
    session.insert(SESSION_USER_KEY, user.id)?;
    Ok(())
}

pub fn logout_session(session: &Session) {
    session.purge();
}

/// Loads the user the session belongs to, if any.
/// A session pointing at a deleted user counts as a guest.
pub async fn authenticate_client_by_session(
    db: &DatabaseConnection,
    session: &Session,
) -> Option<ClientUser> {
    let id = get_session_user_id(session)?;
    match get_client_user_by_id(db, id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            log::info!("Session refers to missing user {}", id);
            None
        }
        Err(e) => {
            log::error!("authenticate_client_by_session: {}", e);
            None
        }
    }
}
