use blog_commons::data_structures::{
    AuthorDetail, AuthorSummary, Page, ProfileData, ProfileFormData, AUTHORS_PER_PAGE,
};
use log::{debug, info};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use super::{likes, posts, resolve_page, users};
use crate::entity::{author_profiles, prelude::*, users as user_entity};
use crate::errors::ServiceError;

pub fn profile_data(profile: author_profiles::Model, username: String) -> ProfileData {
    ProfileData {
        profile_id: profile.profile_id,
        user_id: profile.user_id,
        username,
        bio: profile.bio,
        has_picture: profile.picture.is_some(),
    }
}

pub async fn for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<author_profiles::Model>, ServiceError> {
    Ok(AuthorProfiles::find()
        .filter(author_profiles::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Returns the user's profile, creating an empty one if there is none yet.
pub async fn ensure_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<author_profiles::Model, ServiceError> {
    if let Some(profile) = for_user(db, user_id).await? {
        return Ok(profile);
    }
    let profile = author_profiles::ActiveModel {
        profile_id: ActiveValue::Set(Uuid::new_v4()),
        user_id: ActiveValue::Set(user_id),
        bio: ActiveValue::Set(String::new()),
        picture: ActiveValue::Set(None),
    }
    .insert(db)
    .await?;
    debug!("created author profile {} for {}", profile.profile_id, user_id);
    Ok(profile)
}

/// Every registered user by username, with a profile id when they have one.
pub async fn list(
    db: &DatabaseConnection,
    page: Option<u64>,
) -> Result<Page<AuthorSummary>, ServiceError> {
    let txn = db.begin().await?;
    let paginator = Users::find()
        .find_also_related(AuthorProfiles)
        .order_by_asc(user_entity::Column::Username)
        .paginate(&txn, AUTHORS_PER_PAGE);
    let totals = paginator.num_items_and_pages().await?;
    let page = resolve_page(page, totals.number_of_pages)?;
    let rows = paginator.fetch_page(page - 1).await?;
    txn.commit().await?;

    Ok(Page {
        items: rows
            .into_iter()
            .map(|(user, profile)| AuthorSummary {
                user_id: user.user_id,
                username: user.username,
                profile_id: profile.map(|p| p.profile_id),
            })
            .collect(),
        page,
        num_pages: totals.number_of_pages,
        total: totals.number_of_items,
    })
}

/// Profile, posts and the like total are all read fresh on every call.
pub async fn detail(
    db: &DatabaseConnection,
    profile_id: Uuid,
) -> Result<AuthorDetail, ServiceError> {
    let txn = db.begin().await?;
    let profile = AuthorProfiles::find_by_id(profile_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;
    let user = users::get(&txn, profile.user_id).await?;
    let posts = posts::by_author(&txn, user.user_id).await?;
    let total_likes = likes::total_for_author(&txn, user.user_id).await?;
    txn.commit().await?;

    Ok(AuthorDetail {
        profile: profile_data(profile, user.username),
        posts,
        total_likes,
    })
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    form: ProfileFormData,
) -> Result<ProfileData, ServiceError> {
    form.validate()?;
    let txn = db.begin().await?;
    let user = users::get(&txn, user_id).await?;
    let mut profile = ensure_profile(&txn, user_id).await?.into_active_model();
    profile.bio = ActiveValue::Set(form.bio);
    let profile = profile.update(&txn).await?;
    txn.commit().await?;

    info!("profile of '{}' updated", user.username);
    Ok(profile_data(profile, user.username))
}

/// Points the user's profile at a newly stored image and hands back the
/// reference it replaced.
pub async fn set_picture(
    db: &DatabaseConnection,
    user_id: Uuid,
    reference: String,
) -> Result<(ProfileData, Option<String>), ServiceError> {
    let txn = db.begin().await?;
    let user = users::get(&txn, user_id).await?;
    let profile = ensure_profile(&txn, user_id).await?;
    let previous = profile.picture.clone();
    let mut profile = profile.into_active_model();
    profile.picture = ActiveValue::Set(Some(reference));
    let profile = profile.update(&txn).await?;
    txn.commit().await?;

    Ok((profile_data(profile, user.username), previous))
}

/// The stored image reference of a profile, `NotFound` if the profile
/// does not exist or has no picture.
pub async fn picture(db: &DatabaseConnection, profile_id: Uuid) -> Result<String, ServiceError> {
    AuthorProfiles::find_by_id(profile_id)
        .one(db)
        .await?
        .and_then(|p| p.picture)
        .ok_or(ServiceError::NotFound)
}
