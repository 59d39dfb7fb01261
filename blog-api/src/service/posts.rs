use actix_session::Session;
use actix_web::{
    web::{self, Data, Json, Path, Query},
    HttpResponse,
};
use blog_commons::data_structures::{PostFormData, PostsQuery};
use std::sync::Mutex;
use uuid::Uuid;

use super::{comments, helpers, DbConnection, ServiceResult};
use crate::{
    errors::ServiceError,
    session::TokenSession,
    store::{self, PostSearch},
};

pub fn configure_service(cfg: &mut web::ServiceConfig) {
    let posts_scope = web::scope("/posts")
        .service(posts_list)
        .service(posts_create)
        .service(posts_id)
        .service(comments::comments_post)
        .service(
            web::resource("/{post_id}/like")
                .route(web::post().to(posts_like))
                .default_service(web::route().to(like_method_not_allowed)),
        )
        .service(posts_update_form)
        .service(posts_update)
        .service(posts_delete_form)
        .service(posts_delete);
    cfg.service(posts_scope);
}

#[actix_web::get("")]
async fn posts_list(query: Query<PostsQuery>, db: Data<DbConnection>) -> ServiceResult {
    let query = query.into_inner();
    let search = PostSearch::new(query.q.as_deref());
    let page = store::posts::list(&db.db_connection, &search, query.page).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[actix_web::post("/create")]
async fn posts_create(
    post_data: Json<PostFormData>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let post = store::posts::create(&db.db_connection, id, post_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

#[actix_web::get("/{post_id}")]
async fn posts_id(
    post_id: Path<Uuid>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let viewer = helpers::viewer(&token_session, &session, &db).await?;
    let detail = store::posts::detail(&db.db_connection, post_id.into_inner(), viewer).await?;
    Ok(HttpResponse::Ok().json(detail))
}

async fn posts_like(
    post_id: Path<Uuid>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let toggled = store::likes::toggle(&db.db_connection, post_id.into_inner(), id).await?;
    Ok(HttpResponse::Ok().json(toggled))
}

async fn like_method_not_allowed() -> ServiceResult {
    Err(ServiceError::MethodNotAllowed)
}

/// Current values for the edit form; owner only.
#[actix_web::get("/{post_id}/update")]
async fn posts_update_form(
    post_id: Path<Uuid>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let post = store::posts::get_owned(&db.db_connection, post_id.into_inner(), id).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[actix_web::post("/{post_id}/update")]
async fn posts_update(
    post_id: Path<Uuid>,
    post_data: Json<PostFormData>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let post = store::posts::update(
        &db.db_connection,
        post_id.into_inner(),
        id,
        post_data.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// What is about to be deleted; owner only.
#[actix_web::get("/{post_id}/delete")]
async fn posts_delete_form(
    post_id: Path<Uuid>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let post = store::posts::get_owned(&db.db_connection, post_id.into_inner(), id).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[actix_web::post("/{post_id}/delete")]
async fn posts_delete(
    post_id: Path<Uuid>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    store::posts::delete(&db.db_connection, post_id.into_inner(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}
