use super::helpers;
use super::DbConnection;
use crate::errors::{ServiceError, StorageError};
use crate::session::TokenSession;
use crate::storage::{self, ImageStore, PICTURE_BYTES_MAX};
use crate::store;
use actix_session::Session;
use actix_web::{
    self,
    web::{self, Bytes},
    HttpResponse,
};
use log::{debug, error};
use std::sync::Mutex;
use uuid::Uuid;

/// Replaces the caller's profile picture with the uploaded image body.
#[actix_web::post("/picture")]
pub async fn profile_upload_picture(
    payload: Bytes,
    db: web::Data<DbConnection>,
    images: web::Data<dyn ImageStore>,
    token_session: web::Data<Mutex<dyn TokenSession>>,
    session: Session,
) -> Result<HttpResponse, ServiceError> {
    let id = helpers::authenticate(&token_session, &session, &db).await?;

    if payload.len() > PICTURE_BYTES_MAX {
        return Ok(HttpResponse::BadRequest()
            .reason("uploaded file exceeded allowed size")
            .finish());
    }
    let Some(extension) = storage::picture_extension(&payload) else {
        return Ok(HttpResponse::BadRequest()
            .reason("uploaded file was not a valid jpg or png file")
            .finish());
    };

    let reference = images.save(&payload, extension).await?;
    let (profile, previous) =
        match store::authors::set_picture(&db.db_connection, id, reference.clone()).await {
            Ok(res) => res,
            Err(e) => {
                if let Err(cleanup) = images.remove(&reference).await {
                    error!("orphaned picture '{}': {:?}", reference, cleanup);
                }
                return Err(e);
            }
        };
    if let Some(previous) = previous {
        if let Err(e) = images.remove(&previous).await {
            error!("could not remove replaced picture '{}': {:?}", previous, e);
        }
    }
    debug!("profile {} picture set to {}", profile.profile_id, reference);

    Ok(HttpResponse::Ok().json(profile))
}

#[actix_web::get("/{profile_id}/picture")]
pub async fn author_picture(
    profile_id: web::Path<Uuid>,
    db: web::Data<DbConnection>,
    images: web::Data<dyn ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let reference = store::authors::picture(&db.db_connection, profile_id.into_inner()).await?;
    let bytes = match images.load(&reference).await {
        Ok(bytes) => bytes,
        Err(StorageError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            error!("picture '{}' is referenced but missing", reference);
            return Err(ServiceError::NotFound);
        }
        Err(e) => return Err(e.into()),
    };
    let mime = infer::get(&bytes)
        .map(|t| t.mime_type())
        .unwrap_or("application/octet-stream");
    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}
