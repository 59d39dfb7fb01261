use actix_session::Session;
use actix_web::{
    web::{self, Data, Json},
    HttpResponse,
};
use blog_commons::data_structures::ProfileFormData;
use std::sync::Mutex;

use super::{helpers, resources, DbConnection, ServiceResult};
use crate::{session::TokenSession, storage::PICTURE_BYTES_MAX, store};

pub fn configure_service(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard);
    let scope = web::scope("/profile")
        .app_data(web::PayloadConfig::new(PICTURE_BYTES_MAX))
        .service(profile_view)
        .service(profile_update)
        .service(resources::profile_upload_picture);
    cfg.service(scope);
}

#[actix_web::get("/dashboard")]
async fn dashboard(
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let data = store::dashboard::dashboard(&db.db_connection, id).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[actix_web::get("")]
async fn profile_view(
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let page = store::dashboard::profile_page(&db.db_connection, id).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[actix_web::post("/update")]
async fn profile_update(
    form: Json<ProfileFormData>,
    session: Session,
    token_session: Data<Mutex<dyn TokenSession>>,
    db: Data<DbConnection>,
) -> ServiceResult {
    let id = helpers::authenticate(&token_session, &session, &db).await?;
    let profile = store::authors::update_profile(&db.db_connection, id, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}
