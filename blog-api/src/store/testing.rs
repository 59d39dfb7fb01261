use blog_commons::data_structures::{PostData, PostFormData, RegistrationData};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::entity::users;
use crate::migrator::Migrator;

pub const PASSWORD: &str = "abcdef12";

/// Fresh, fully migrated in-memory database. A single pooled connection
/// keeps every query on the same in-memory file.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("in-memory sqlite");
    Migrator::up(&db, None).await.expect("migrations apply");
    db
}

/// Makes every insert into `post_likes` fail until [`thaw_likes`] is called.
pub async fn freeze_likes(db: &DatabaseConnection) {
    db.execute_unprepared(
        "CREATE TRIGGER freeze_likes AFTER INSERT ON post_likes \
         BEGIN SELECT RAISE(ABORT, 'likes are frozen'); END;",
    )
    .await
    .expect("trigger created");
}

pub async fn thaw_likes(db: &DatabaseConnection) {
    db.execute_unprepared("DROP TRIGGER freeze_likes")
        .await
        .expect("trigger dropped");
}

pub fn registration(username: &str) -> RegistrationData {
    RegistrationData {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password1: PASSWORD.to_owned(),
        password2: PASSWORD.to_owned(),
    }
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> users::Model {
    super::users::register(db, registration(username))
        .await
        .expect("registration succeeds")
}

pub fn post_form(title: &str) -> PostFormData {
    PostFormData {
        title: title.to_owned(),
        description: None,
        content: Some(format!("{title} body")),
    }
}

pub async fn create_post(db: &DatabaseConnection, author: &users::Model, title: &str) -> PostData {
    super::posts::create(db, author.user_id, post_form(title))
        .await
        .expect("post creation succeeds")
}
