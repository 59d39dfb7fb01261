use blog_commons::data_structures::{Page, PostData, PostDetail, PostFormData, POSTS_PER_PAGE};
use chrono::Utc;
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::{authors, comments, likes, resolve_page, users, PostSearch};
use crate::entity::{comments as comment_entity, post_likes, posts, prelude::*};
use crate::errors::ServiceError;

pub fn post_data(post: posts::Model, author: String, total_likes: u64) -> PostData {
    PostData {
        post_id: post.post_id,
        user_id: post.user_id,
        author,
        title: post.title,
        description: post.description,
        content: post.content,
        posted: post.posted,
        total_likes,
    }
}

async fn with_author_and_likes<C: ConnectionTrait>(
    db: &C,
    post: posts::Model,
) -> Result<PostData, ServiceError> {
    let author = users::get(db, post.user_id).await?.username;
    let total_likes = likes::count_for_post(db, post.post_id).await?;
    Ok(post_data(post, author, total_likes))
}

/// Posts matching `search`, newest first, one page at a time.
pub async fn list(
    db: &DatabaseConnection,
    search: &PostSearch,
    page: Option<u64>,
) -> Result<Page<PostData>, ServiceError> {
    let txn = db.begin().await?;
    let paginator = Posts::find()
        .find_also_related(Users)
        .filter(search.condition())
        .order_by_desc(posts::Column::Posted)
        .order_by_desc(posts::Column::PostId)
        .paginate(&txn, POSTS_PER_PAGE);
    let totals = paginator.num_items_and_pages().await?;
    let page = resolve_page(page, totals.number_of_pages)?;
    let rows = paginator.fetch_page(page - 1).await?;

    let ids = rows.iter().map(|(p, _)| p.post_id).collect::<Vec<_>>();
    let counts = likes::counts_for_posts(&txn, &ids).await?;
    txn.commit().await?;

    let items = rows
        .into_iter()
        .map(|(post, author)| {
            let total_likes = counts.get(&post.post_id).copied().unwrap_or(0);
            post_data(post, author.map_or_else(String::new, |a| a.username), total_likes)
        })
        .collect();
    Ok(Page {
        items,
        page,
        num_pages: totals.number_of_pages,
        total: totals.number_of_items,
    })
}

/// Every post by `user_id`, newest first.
pub async fn by_author<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<PostData>, ServiceError> {
    let author = users::get(db, user_id).await?.username;
    let posts = Posts::find()
        .filter(posts::Column::UserId.eq(user_id))
        .order_by_desc(posts::Column::Posted)
        .order_by_desc(posts::Column::PostId)
        .all(db)
        .await?;
    let ids = posts.iter().map(|p| p.post_id).collect::<Vec<_>>();
    let counts = likes::counts_for_posts(db, &ids).await?;
    Ok(posts
        .into_iter()
        .map(|post| {
            let total_likes = counts.get(&post.post_id).copied().unwrap_or(0);
            post_data(post, author.clone(), total_likes)
        })
        .collect())
}

pub async fn detail(
    db: &DatabaseConnection,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<PostDetail, ServiceError> {
    let txn = db.begin().await?;
    let post = Posts::find_by_id(post_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let post = with_author_and_likes(&txn, post).await?;
    let comments = comments::for_post(&txn, post_id).await?;
    let is_liked = match viewer {
        Some(user_id) => Some(likes::is_liked_by(&txn, post_id, user_id).await?),
        None => None,
    };
    txn.commit().await?;
    Ok(PostDetail {
        post,
        comments,
        is_liked,
    })
}

/// Looks the post up through its owner. A post owned by someone else is
/// reported exactly like a missing one.
async fn owned<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<posts::Model, ServiceError> {
    Posts::find_by_id(post_id)
        .filter(posts::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn get_owned(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<PostData, ServiceError> {
    let txn = db.begin().await?;
    let post = owned(&txn, post_id, user_id).await?;
    let post = with_author_and_likes(&txn, post).await?;
    txn.commit().await?;
    Ok(post)
}

/// Publishes a post, provisioning the author's profile on first use.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    form: PostFormData,
) -> Result<PostData, ServiceError> {
    form.validate()?;
    let txn = db.begin().await?;
    let author = users::get(&txn, user_id).await?;
    authors::ensure_profile(&txn, user_id).await?;

    let post = posts::ActiveModel {
        post_id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user_id),
        title: ActiveValue::Set(form.title),
        description: ActiveValue::Set(form.description),
        content: ActiveValue::Set(form.content),
        posted: ActiveValue::Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("'{}' published post {}", author.username, post.post_id);
    Ok(post_data(post, author.username, 0))
}

/// Replaces title, description and content; the timestamp is untouched.
pub async fn update(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
    form: PostFormData,
) -> Result<PostData, ServiceError> {
    form.validate()?;
    let txn = db.begin().await?;
    let mut post = owned(&txn, post_id, user_id).await?.into_active_model();
    post.title = ActiveValue::Set(form.title);
    post.description = ActiveValue::Set(form.description);
    post.content = ActiveValue::Set(form.content);
    let post = post.update(&txn).await?;
    let post = with_author_and_likes(&txn, post).await?;
    txn.commit().await?;

    info!("post {} updated", post_id);
    Ok(post)
}

pub async fn delete(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let post = owned(&txn, post_id, user_id).await?;
    PostLikes::delete_many()
        .filter(post_likes::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    Comments::delete_many()
        .filter(comment_entity::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    post.delete(&txn).await?;
    txn.commit().await?;

    info!("post {} deleted", post_id);
    Ok(())
}
