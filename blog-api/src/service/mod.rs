pub mod authors;
pub mod comments;
pub mod helpers;
mod objects;
pub mod posts;
pub mod profile;
pub mod resources;
#[cfg(test)]
mod tests;

use crate::errors::ServiceError;
use crate::session::TokenSession;
use crate::storage::ImageStore;
use crate::store;
use actix_session::Session;
use actix_web::{self, web, HttpResponse};
use blog_commons::data_structures::{LoginData, RegistrationData};
use log::{error, info};
pub use objects::DbConnection;
use std::sync::Mutex;

pub const SESSION_ID: &str = "id";

pub type ServiceResult = Result<HttpResponse, ServiceError>;

pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.service(index);

    let user_scope = web::scope("/user")
        .service(user_signup)
        .service(user_login)
        .service(user_logout)
        .service(user_delete);
    cfg.service(user_scope);

    posts::configure_service(cfg);
    authors::configure_service(cfg);
    profile::configure_service(cfg);
}

/// Home page figures.
#[actix_web::get("/")]
async fn index(db: web::Data<DbConnection>) -> ServiceResult {
    let stats = store::users::stats(&db.db_connection).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[actix_web::post("/signup")]
async fn user_signup(
    creation_data: web::Json<RegistrationData>,
    db: web::Data<DbConnection>,
) -> ServiceResult {
    let user = store::users::register(&db.db_connection, creation_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(store::users::user_data(user)))
}

#[actix_web::post("/login")]
async fn user_login(
    login_data: web::Json<LoginData>,
    db: web::Data<DbConnection>,
    token_session: web::Data<Mutex<dyn TokenSession>>,
    session: Session,
) -> ServiceResult {
    let Some(user) = store::users::verify_credentials(&db.db_connection, &login_data).await?
    else {
        session.remove(SESSION_ID);
        return Ok(HttpResponse::Forbidden()
            .reason("wrong username or password")
            .finish());
    };

    let token = token_session
        .lock()
        .map_err(|_| ServiceError::internal("session store unavailable"))?
        .add_user(&user.username);
    session
        .insert(SESSION_ID, token.to_string())
        .map_err(ServiceError::internal)?;
    info!("'{}' logged in", user.username);

    Ok(HttpResponse::Accepted().json(store::users::user_data(user)))
}

#[actix_web::post("/logout")]
async fn user_logout(
    token_session: web::Data<Mutex<dyn TokenSession>>,
    session: Session,
) -> ServiceResult {
    if let Ok(Some(token)) = session.get::<String>(SESSION_ID) {
        if let Ok(token) = token.parse::<uuid::Uuid>() {
            let removed = token_session
                .lock()
                .map_err(|_| ServiceError::internal("session store unavailable"))?
                .remove_token(&token);
            if let Some(login) = removed {
                info!("'{}' logged out", login);
            }
        }
    }
    session.purge();
    Ok(HttpResponse::Ok().finish())
}

/// Deletes the caller's account and everything they own.
#[actix_web::post("/delete")]
async fn user_delete(
    db: web::Data<DbConnection>,
    token_session: web::Data<Mutex<dyn TokenSession>>,
    images: web::Data<dyn ImageStore>,
    session: Session,
) -> ServiceResult {
    let login = helpers::validate_session(&token_session, &session)?;
    let user_id = helpers::get_user_id(&login, &db).await?;
    let picture = store::users::delete(&db.db_connection, user_id).await?;

    token_session
        .lock()
        .map_err(|_| ServiceError::internal("session store unavailable"))?
        .remove_user(&login);
    session.purge();

    if let Some(reference) = picture {
        if let Err(e) = images.remove(&reference).await {
            error!("could not remove picture '{}' of deleted user: {:?}", reference, e);
        }
    }
    Ok(HttpResponse::NoContent().finish())
}
