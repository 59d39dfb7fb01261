use actix_web::{
    web::{self, Data, Path, Query},
    HttpResponse,
};
use blog_commons::data_structures::PageQuery;
use uuid::Uuid;

use super::{resources, DbConnection, ServiceResult};
use crate::store;

pub fn configure_service(cfg: &mut web::ServiceConfig) {
    let scope = web::scope("/authors")
        .service(authors_list)
        .service(authors_id)
        .service(resources::author_picture);
    cfg.service(scope);
}

#[actix_web::get("")]
async fn authors_list(query: Query<PageQuery>, db: Data<DbConnection>) -> ServiceResult {
    let page = store::authors::list(&db.db_connection, query.page).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[actix_web::get("/{profile_id}")]
async fn authors_id(profile_id: Path<Uuid>, db: Data<DbConnection>) -> ServiceResult {
    let detail = store::authors::detail(&db.db_connection, profile_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}
