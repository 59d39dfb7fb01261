use crate::errors::{ServiceError, SessionValidationError};
use crate::store;

pub use super::objects::DbConnection;
use super::SESSION_ID;
use crate::session::TokenSession;
use actix_session::Session;
use std::{str::FromStr, sync::Mutex};
use uuid::Uuid;

/// Resolves the session cookie to the login it was issued for.
pub fn validate_session(
    token_session: &actix_web::web::Data<Mutex<dyn TokenSession>>,
    session: &Session,
) -> Result<String, ServiceError> {
    let Ok(Some(uuid_string)) = session.get::<String>(SESSION_ID) else {
        return Err(SessionValidationError::NoCookie.into());
    };
    let uuid = Uuid::from_str(&uuid_string).map_err(SessionValidationError::from)?;

    let sess = token_session
        .lock()
        .map_err(|_| ServiceError::internal("session store unavailable"))?;
    let Some(usr_login) = sess.get_user(&uuid) else {
        return Err(SessionValidationError::UnknownToken.into());
    };
    Ok(usr_login)
}

pub async fn get_user_id(login: &str, db: &DbConnection) -> Result<Uuid, ServiceError> {
    match store::users::find_by_username(&db.db_connection, login).await? {
        Some(u) => Ok(u.user_id),
        None => Err(SessionValidationError::NoUser.into()),
    }
}

/// The id of the logged-in user, or `Unauthenticated`.
pub async fn authenticate(
    token_session: &actix_web::web::Data<Mutex<dyn TokenSession>>,
    session: &Session,
    db: &DbConnection,
) -> Result<Uuid, ServiceError> {
    let login = validate_session(token_session, session)?;
    get_user_id(&login, db).await
}

/// Like [`authenticate`] but anonymous requests yield `None`.
pub async fn viewer(
    token_session: &actix_web::web::Data<Mutex<dyn TokenSession>>,
    session: &Session,
    db: &DbConnection,
) -> Result<Option<Uuid>, ServiceError> {
    match authenticate(token_session, session, db).await {
        Ok(id) => Ok(Some(id)),
        Err(ServiceError::Unauthenticated { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
