use blog_commons::data_structures::{CommentData, CommentFormData};
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::entity::{comments, prelude::*};
use crate::errors::ServiceError;

/// Comments on a post, oldest first, with their authors' usernames.
pub async fn for_post<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
) -> Result<Vec<CommentData>, DbErr> {
    let rows = Comments::find()
        .find_also_related(Users)
        .filter(comments::Column::PostId.eq(post_id))
        .order_by_asc(comments::Column::Posted)
        .order_by_asc(comments::Column::CommentId)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(c, author)| CommentData {
            comment_id: c.comment_id,
            post_id: c.post_id,
            user_id: c.user_id,
            author: author.map_or_else(String::new, |a| a.username),
            posted: c.posted,
            content: c.content,
        })
        .collect())
}

pub async fn count_by_author<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    Comments::find()
        .filter(comments::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// Every call inserts a new comment; resubmitting the same form duplicates it.
pub async fn add(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
    form: CommentFormData,
) -> Result<comments::Model, ServiceError> {
    form.validate()?;
    let txn = db.begin().await?;
    if Posts::find_by_id(post_id).one(&txn).await?.is_none() {
        return Err(ServiceError::NotFound);
    }
    let comment = comments::ActiveModel {
        comment_id: ActiveValue::Set(Uuid::new_v4()),
        post_id: ActiveValue::Set(post_id),
        user_id: ActiveValue::Set(user_id),
        posted: ActiveValue::Set(Utc::now().naive_utc()),
        content: ActiveValue::Set(form.content),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    debug!("comment {} added to post {}", comment.comment_id, post_id);
    Ok(comment)
}
