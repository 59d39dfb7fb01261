use std::collections::HashMap;

use blog_commons::data_structures::LikeToggle;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{post_likes, posts, prelude::*};
use crate::errors::ServiceError;

pub async fn count_for_post<C: ConnectionTrait>(db: &C, post_id: Uuid) -> Result<u64, DbErr> {
    PostLikes::find()
        .filter(post_likes::Column::PostId.eq(post_id))
        .count(db)
        .await
}

/// Like counts for a batch of posts; posts without likes are absent.
pub async fn counts_for_posts<C: ConnectionTrait>(
    db: &C,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = PostLikes::find()
        .select_only()
        .column(post_likes::Column::PostId)
        .column_as(Expr::col(post_likes::Column::UserId).count(), "likes")
        .filter(post_likes::Column::PostId.is_in(post_ids.iter().copied()))
        .group_by(post_likes::Column::PostId)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(post_id, likes)| (post_id, likes.max(0) as u64))
        .collect())
}

pub async fn is_liked_by<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    Ok(PostLikes::find_by_id((post_id, user_id))
        .one(db)
        .await?
        .is_some())
}

/// Likes received across every post written by `user_id`.
pub async fn total_for_author<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    PostLikes::find()
        .join(
            sea_orm::JoinType::InnerJoin,
            post_likes::Relation::Posts.def(),
        )
        .filter(posts::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// Flips `user_id`'s like on the post and reports the count as re-read
/// after the change, inside the same transaction.
pub async fn toggle(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<LikeToggle, ServiceError> {
    let txn = db.begin().await?;
    if Posts::find_by_id(post_id).one(&txn).await?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let liked = match PostLikes::find_by_id((post_id, user_id)).one(&txn).await? {
        Some(like) => {
            like.delete(&txn).await?;
            false
        }
        None => {
            let like = post_likes::ActiveModel {
                post_id: ActiveValue::Set(post_id),
                user_id: ActiveValue::Set(user_id),
            };
            PostLikes::insert(like).exec_without_returning(&txn).await?;
            true
        }
    };

    let total_likes = count_for_post(&txn, post_id).await?;
    txn.commit().await?;
    debug!(
        "like toggled on post {} by {}: liked={} total={}",
        post_id, user_id, liked, total_likes
    );
    Ok(LikeToggle { liked, total_likes })
}
