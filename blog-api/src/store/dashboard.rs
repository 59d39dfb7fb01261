use blog_commons::data_structures::{DashboardData, ProfilePageData};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use super::{authors, comments, likes, posts, users};
use crate::errors::ServiceError;

async fn collect<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<DashboardData, ServiceError> {
    let posts = posts::by_author(db, user_id).await?;
    let total_likes = likes::total_for_author(db, user_id).await?;
    let total_comments = comments::count_by_author(db, user_id).await?;
    Ok(DashboardData {
        total_posts: posts.len() as u64,
        posts,
        total_likes,
        total_comments,
    })
}

/// The user's own posts with likes received and comments written.
pub async fn dashboard(db: &DatabaseConnection, user_id: Uuid) -> Result<DashboardData, ServiceError> {
    let txn = db.begin().await?;
    let data = collect(&txn, user_id).await?;
    txn.commit().await?;
    Ok(data)
}

/// Dashboard figures plus the account and, if provisioned, the author profile.
/// Viewing never creates a profile.
pub async fn profile_page(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<ProfilePageData, ServiceError> {
    let txn = db.begin().await?;
    let user = users::get(&txn, user_id).await?;
    let profile = authors::for_user(&txn, user_id)
        .await?
        .map(|p| authors::profile_data(p, user.username.clone()));
    let dashboard = collect(&txn, user_id).await?;
    txn.commit().await?;
    Ok(ProfilePageData {
        user: users::user_data(user),
        profile,
        dashboard,
    })
}
