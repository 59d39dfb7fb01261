use super::helpers;
use super::DbConnection;
use super::TokenSession;
use actix_session::Session;
use actix_web::{http::header, web, HttpResponse};
use blog_commons::data_structures::CommentFormData;
use std::sync::Mutex;
use uuid::Uuid;

use crate::service::ServiceResult;
use crate::store;

/// Adds a comment and sends the client back to the post it belongs to.
#[actix_web::post("/{post_id}/comment")]
pub async fn comments_post(
    post_id: web::Path<Uuid>,
    comment: web::Json<CommentFormData>,
    db: web::Data<DbConnection>,
    session: Session,
    token_session: web::Data<Mutex<dyn TokenSession>>,
) -> ServiceResult {
    let uid = helpers::authenticate(&token_session, &session, &db).await?;
    let post_id = post_id.into_inner();
    store::comments::add(&db.db_connection, post_id, uid, comment.into_inner()).await?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/posts/{}", post_id)))
        .finish())
}
