use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use blog_commons::data_structures::{LoginData, RegistrationData, SiteStats, UserData};
use log::{debug, info};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, SqlErr, TransactionTrait,
};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entity::{author_profiles, comments, post_likes, posts, prelude::*, users};
use crate::errors::ServiceError;

pub fn user_data(user: users::Model) -> UserData {
    UserData {
        user_id: user.user_id,
        username: user.username,
        email: user.email,
        joined: user.joined,
    }
}

pub async fn find_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<users::Model>, ServiceError> {
    Ok(Users::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<users::Model, ServiceError> {
    Users::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(ServiceError::internal)
}

fn username_taken() -> ValidationError {
    ValidationError::new("username_taken")
        .with_message("A user with that username already exists.".into())
}

fn email_taken() -> ValidationError {
    ValidationError::new("email_taken").with_message("This email is already registered.".into())
}

/// A signup that lost a race against another one with the same username or
/// email trips the unique index; report it like the up-front check does.
fn duplicate_account(err: DbErr) -> ServiceError {
    let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() else {
        return err.into();
    };
    let mut errors = ValidationErrors::new();
    if detail.contains("email") {
        errors.add("email", email_taken());
    } else {
        errors.add("username", username_taken());
    }
    errors.into()
}

/// Validates the form and the uniqueness of username and email, then
/// creates the account. Nothing is written unless every check passes.
pub async fn register(
    db: &DatabaseConnection,
    data: RegistrationData,
) -> Result<users::Model, ServiceError> {
    let mut errors = match data.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let txn = db.begin().await?;
    if find_by_username(&txn, &data.username).await?.is_some() {
        errors.add("username", username_taken());
    }
    let email_taken = Users::find()
        .filter(users::Column::Email.eq(data.email.as_str()))
        .one(&txn)
        .await?
        .is_some();
    if email_taken {
        errors.add("email", self::email_taken());
    }
    if !errors.errors().is_empty() {
        return Err(errors.into());
    }

    let user = users::ActiveModel {
        user_id: ActiveValue::Set(Uuid::new_v4()),
        username: ActiveValue::Set(data.username),
        email: ActiveValue::Set(data.email),
        hash: ActiveValue::Set(hash_password(&data.password1)?),
        joined: ActiveValue::Set(chrono::Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await
    .map_err(duplicate_account)?;
    txn.commit().await?;

    info!("registered user '{}' ({})", user.username, user.user_id);
    Ok(user)
}

/// `None` for an unknown user or a wrong password alike.
pub async fn verify_credentials(
    db: &DatabaseConnection,
    login: &LoginData,
) -> Result<Option<users::Model>, ServiceError> {
    let Some(user) = find_by_username(db, &login.username).await? else {
        debug!("login attempt for unknown user '{}'", login.username);
        return Ok(None);
    };
    let parsed_hash = PasswordHash::new(&user.hash).map_err(ServiceError::internal)?;
    if Argon2::default()
        .verify_password(login.password.as_bytes(), &parsed_hash)
        .is_ok()
    {
        Ok(Some(user))
    } else {
        debug!("wrong password for user '{}'", login.username);
        Ok(None)
    }
}

/// Removes the account together with everything hanging off it: likes and
/// comments it made, its posts with their comments and likes, and its
/// author profile. Returns the profile picture reference, if one was set,
/// so the caller can release the stored image.
pub async fn delete(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<String>, ServiceError> {
    let txn = db.begin().await?;
    let user = get(&txn, user_id).await?;

    let own_posts = Query::select()
        .column(posts::Column::PostId)
        .from(posts::Entity)
        .and_where(posts::Column::UserId.eq(user_id))
        .to_owned();

    PostLikes::delete_many()
        .filter(
            sea_orm::Condition::any()
                .add(post_likes::Column::UserId.eq(user_id))
                .add(post_likes::Column::PostId.in_subquery(own_posts.clone())),
        )
        .exec(&txn)
        .await?;
    Comments::delete_many()
        .filter(
            sea_orm::Condition::any()
                .add(comments::Column::UserId.eq(user_id))
                .add(comments::Column::PostId.in_subquery(own_posts)),
        )
        .exec(&txn)
        .await?;
    let removed_posts = Posts::delete_many()
        .filter(posts::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let picture = AuthorProfiles::find()
        .filter(author_profiles::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .and_then(|p| p.picture);
    AuthorProfiles::delete_many()
        .filter(author_profiles::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Users::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "deleted user '{}' ({}) with {} posts",
        user.username, user_id, removed_posts
    );
    Ok(picture)
}

pub async fn stats(db: &DatabaseConnection) -> Result<SiteStats, ServiceError> {
    let txn = db.begin().await?;
    let num_posts = Posts::find().count(&txn).await?;
    let num_authors = AuthorProfiles::find().count(&txn).await?;
    txn.commit().await?;
    Ok(SiteStats {
        num_posts,
        num_authors,
    })
}
